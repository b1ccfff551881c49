//! Init command implementation.

use attendd_store::{Collection, RecordStore, StoreOptions};
use std::path::Path;

/// Creates the data directory and seeds missing collection files.
pub async fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = RecordStore::open(path, StoreOptions::default()).await?;

    println!("Data directory ready: {}", store.dir().display());
    for collection in Collection::ALL {
        println!("  {}", store.path(collection).display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("data");

        run(&dir).await.unwrap();
        std::fs::write(dir.join("users.json"), r#"[{"enrollid":"1"}]"#).unwrap();
        run(&dir).await.unwrap();

        let users = std::fs::read_to_string(dir.join("users.json")).unwrap();
        assert!(users.contains("enrollid"));
    }
}
