//! Inspect command implementation.

use attendd_store::{Collection, RecordStore, StoreOptions};
use serde::Serialize;
use std::path::Path;

/// Data directory inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory path.
    pub path: String,
    /// Per-collection statistics.
    pub collections: Vec<CollectionStats>,
    /// Total size of the collection files in bytes.
    pub total_size_bytes: u64,
}

/// Statistics for one collection file.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// File name within the data directory.
    pub file: String,
    /// Whether the file exists.
    pub exists: bool,
    /// Number of records that load from the file.
    pub records: usize,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Runs the inspect command.
pub async fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects statistics without creating or seeding any file.
pub async fn inspect(path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No data directory found at {}", path.display()).into());
    }

    let store = RecordStore::attach(path, StoreOptions::default())?;
    let mut collections = Vec::with_capacity(Collection::ALL.len());
    let mut total_size_bytes = 0;

    for collection in Collection::ALL {
        let file = store.path(collection);
        let size_bytes = std::fs::metadata(&file).map(|m| m.len()).ok();
        let records = match size_bytes {
            Some(_) => store.load(collection).await.len(),
            None => 0,
        };
        total_size_bytes += size_bytes.unwrap_or(0);

        collections.push(CollectionStats {
            name: collection.name().to_string(),
            file: collection.file_name().to_string(),
            exists: size_bytes.is_some(),
            records,
            size_bytes: size_bytes.unwrap_or(0),
        });
    }

    Ok(InspectResult {
        path: path.display().to_string(),
        collections,
        total_size_bytes,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("attendd Data Directory");
    println!("======================");
    println!();
    println!("Path: {}", result.path);
    println!("Total Size: {}", format_size(result.total_size_bytes));
    println!();

    println!("Collections:");
    for stats in &result.collections {
        if stats.exists {
            println!(
                "  {:<8} {:>8} records  {:>10}  ({})",
                stats.name,
                stats.records,
                format_size(stats.size_bytes),
                stats.file
            );
        } else {
            println!("  {:<8} (missing: {})", stats.name, stats.file);
        }
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[tokio::test]
    async fn inspect_counts_records() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("logs.json"),
            r#"[{"enrollid":"1"},{"enrollid":"2"}]"#,
        )
        .unwrap();

        let result = inspect(temp.path()).await.unwrap();
        let logs = result
            .collections
            .iter()
            .find(|c| c.name == "logs")
            .unwrap();
        assert!(logs.exists);
        assert_eq!(logs.records, 2);

        let devices = result
            .collections
            .iter()
            .find(|c| c.name == "devices")
            .unwrap();
        assert!(!devices.exists);
        // Read-only: nothing was seeded
        assert!(!temp.path().join("devices.json").exists());
    }

    #[tokio::test]
    async fn inspect_missing_directory_fails() {
        let temp = tempfile::tempdir().unwrap();
        assert!(inspect(&temp.path().join("absent")).await.is_err());
    }
}
