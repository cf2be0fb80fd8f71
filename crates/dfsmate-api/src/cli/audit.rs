//! Audit viewer: `dfsmate audit --tail N`.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, Table};
use console::style;

use crate::state::AppState;

pub async fn show_audit(state: &AppState, limit: usize, json: bool) -> anyhow::Result<()> {
    let sink = state.audit_sink().await?;
    let records = sink.tail(limit).await?;

    if json {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
        return Ok(());
    }

    if records.is_empty() {
        println!(
            "\n  {} No audit records yet ({})\n",
            style("i").cyan().bold(),
            style(sink.path().display()).dim()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["time", "tool", "risk", "ok", "exit", "command"]);
    for record in &records {
        let risk = record
            .risk
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let ok_cell = if record.ok {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&record.ts),
            Cell::new(&record.tool),
            Cell::new(risk),
            ok_cell,
            Cell::new(record.exit_code),
            Cell::new(record.command.join(" ")),
        ]);
    }
    println!("{table}");
    println!(
        "  {}",
        style(format!("{} record(s) from {}", records.len(), sink.path().display())).dim()
    );
    Ok(())
}
