//! Direct tool invocation: `dfsmate tool <name> --args '{...}'`.

use anyhow::Context;
use console::style;
use serde_json::Value;

use dfsmate_core::tool::tool_names;

use crate::state::AppState;

pub async fn run_tool(
    state: &AppState,
    name: &str,
    args: Option<&str>,
    yes: bool,
    json: bool,
) -> anyhow::Result<()> {
    if !tool_names().contains(&name) {
        anyhow::bail!(
            "unknown tool '{name}'. Available tools: {}",
            tool_names().join(", ")
        );
    }
    let mut args: Value = match args {
        Some(raw) => serde_json::from_str(raw).context("--args must be a JSON object")?,
        None => Value::Object(Default::default()),
    };
    if yes {
        if let Some(map) = args.as_object_mut() {
            map.insert("confirm".to_string(), Value::Bool(true));
        }
    }

    let toolbox = state.toolbox().await?;

    let spinner = (!json).then(|| {
        let spinner = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(format!("running {name}..."));
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    });

    let outcome = toolbox.dispatch(name, args).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.is_ok() && !json {
        if let Some(hint) = &outcome.hint {
            eprintln!("  {} {}", style("hint:").yellow().bold(), hint);
        }
    }
    if !outcome.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
