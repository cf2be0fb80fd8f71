//! Interactive chat REPL: `dfsmate chat`.
//!
//! The model never gets to confirm its own risky actions: [`CliGate`] strips
//! model-supplied confirmation flags and asks the operator at the terminal
//! before anything state-changing runs.

use std::io::{BufRead, Write};

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, Table};
use console::style;
use serde_json::Value;

use dfsmate_core::agent::{ActionEntry, Agent, GateDecision, ToolGate};
use dfsmate_core::tool::Toolbox;
use dfsmate_infra::llm::OpenRouterProvider;
use dfsmate_types::tool::{risk_for, RiskTier};

use crate::state::AppState;

/// Terminal confirmation gate.
///
/// Confirmation flags coming from the model are discarded; for any tool that
/// is not read-only (or any call requesting an overwrite) the operator is
/// prompted, and approval re-injects `confirm=true` into the arguments.
pub struct CliGate;

impl ToolGate for CliGate {
    async fn review(&self, tool: &str, risk: RiskTier, mut args: Value) -> GateDecision {
        let overwrite_requested = args
            .get("overwrite")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if let Some(map) = args.as_object_mut() {
            map.remove("confirm");
        }
        if risk == RiskTier::Safe && !overwrite_requested {
            return GateDecision::Approved(args);
        }

        let pretty = serde_json::to_string_pretty(&args).unwrap_or_else(|_| args.to_string());
        println!();
        println!(
            "  {} The agent wants to run {} ({})",
            style("!").yellow().bold(),
            style(tool).cyan().bold(),
            style(risk).yellow()
        );
        for line in pretty.lines() {
            println!("    {}", style(line).dim());
        }

        let approved = dialoguer::Confirm::new()
            .with_prompt(format!("  Allow '{tool}'?"))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !approved {
            return GateDecision::Denied("User denied confirmation".to_string());
        }
        if let Some(map) = args.as_object_mut() {
            map.insert("confirm".to_string(), Value::Bool(true));
        }
        GateDecision::Approved(args)
    }
}

/// Run the interactive chat loop.
pub async fn run_chat(state: &AppState) -> anyhow::Result<()> {
    let agent_settings = state.agent_settings().map_err(|err| {
        anyhow::anyhow!(
            "{err}\n\nSet OPENROUTER_API_KEY and OPENROUTER_MODEL (or the [agent] section \
             of config.toml) to use chat."
        )
    })?;

    let provider = OpenRouterProvider::new(agent_settings.api_key)
        .map_err(|err| anyhow::anyhow!("failed to build OpenRouter client: {err}"))?
        .with_base_url(agent_settings.base_url);
    let toolbox: Toolbox<_, _> = state.toolbox().await?;
    let mut agent = Agent::new(provider, toolbox, CliGate, agent_settings.model.clone());

    print_banner(state, &agent_settings.model);

    let stdin = std::io::stdin();
    loop {
        print!("  {} ", style("you >").green().bold());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\n  {}", style("Session ended.").dim());
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "exit" || text == "quit" {
            println!("\n  {}", style("Session ended.").dim());
            break;
        }

        match agent.run_turn(text).await {
            Ok(report) => {
                if !report.actions.is_empty() {
                    println!();
                    print_actions(&report.actions);
                }
                if let Some(reply) = &report.reply {
                    println!();
                    for line in reply.lines() {
                        println!("  {line}");
                    }
                    println!();
                } else if report.step_limited {
                    println!(
                        "\n  {} The agent hit the tool step budget without a final answer.\n",
                        style("!").yellow().bold()
                    );
                }
            }
            Err(err) => {
                println!("\n  {} {err}\n", style("error:").red().bold());
            }
        }
    }
    Ok(())
}

fn print_banner(state: &AppState, model: &str) {
    println!();
    println!(
        "  {} dfsmate chat -- HDFS administration agent",
        style("*").cyan().bold()
    );
    println!(
        "  {}",
        style(format!(
            "model {model} | container {} | strict confirm {}",
            state.settings.exec.container, state.settings.exec.strict_confirm
        ))
        .dim()
    );
    println!(
        "  {}",
        style("Risky actions ask for your confirmation. Type 'exit' to quit.").dim()
    );
    println!();
}

fn print_actions(actions: &[ActionEntry]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["tool", "risk", "ok", "time", "error"]);
    for action in actions {
        let ok_cell = if action.ok {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&action.tool),
            Cell::new(risk_for(&action.tool)),
            ok_cell,
            Cell::new(format!("{}ms", action.elapsed_ms)),
            Cell::new(action.error.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}
