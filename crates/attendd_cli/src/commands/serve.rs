//! Serve command implementation.

use attendd_server::{AttendServer, ServerConfig};
use tracing::info;

/// Runs the server until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        addr = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        "starting attendd"
    );
    let server = AttendServer::open(config).await?;
    server.serve().await?;
    Ok(())
}
