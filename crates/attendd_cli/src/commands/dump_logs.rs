//! Dump-logs command implementation.

use attendd_store::{Collection, Record, RecordStore, StoreOptions};
use serde_json::Value;
use std::path::Path;

/// Runs the dump-logs command.
pub async fn run(
    path: &Path,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = RecordStore::attach(path, StoreOptions::default())?;
    let logs = tail(store.load(Collection::Logs).await, limit);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&logs)?);
        }
        _ => {
            print_text_output(&logs);
        }
    }

    Ok(())
}

/// Keeps the newest `limit` entries in file order.
fn tail(mut logs: Vec<Record>, limit: Option<usize>) -> Vec<Record> {
    if let Some(limit) = limit {
        let start = logs.len().saturating_sub(limit);
        logs = logs.split_off(start);
    }
    logs
}

fn print_text_output(logs: &[Record]) {
    println!("Attendance Log");
    println!("==============");
    println!();

    if logs.is_empty() {
        println!("(no entries)");
        return;
    }

    for entry in logs {
        println!("{}", format_entry(entry));
    }
    println!();
    println!("{} entries", logs.len());
}

fn format_entry(entry: &Record) -> String {
    let access = match entry.get("access").and_then(Value::as_u64) {
        Some(1) => "allow",
        Some(_) => "deny",
        None => "?",
    };
    let temp = match entry.get("temp") {
        Some(Value::Null) | None => String::new(),
        Some(v) => format!("  temp={}", field(Some(v))),
    };
    format!(
        "[{}] {:<12} enrollid={:<8} {}{}",
        field(entry.get("received_at")),
        field(entry.get("SN")),
        field(entry.get("enrollid")),
        access,
        temp
    )
}

fn field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(v) => v.to_string(),
    }
}
