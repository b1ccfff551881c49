//! Server bootstrap: opens the store and serves HTTP or HTTPS.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::HandlerContext;
use crate::http;
use crate::router::CommandRouter;
use attendd_store::RecordStore;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// The attendance terminal server.
///
/// # Example
///
/// ```rust,ignore
/// use attendd_server::{AttendServer, ServerConfig};
///
/// let server = AttendServer::open(ServerConfig::default()).await?;
/// server.serve().await?;
/// ```
pub struct AttendServer {
    router: CommandRouter,
    context: Arc<HandlerContext>,
    started: Instant,
}

impl AttendServer {
    /// Opens the data directory and creates the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the data
    /// directory cannot be initialized.
    pub async fn open(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let store = RecordStore::open(&config.data_dir, config.store_options()).await?;
        info!(
            data_dir = %config.data_dir.display(),
            serialize_writes = store.serializes_writes(),
            "record store ready"
        );

        let context = Arc::new(HandlerContext::new(config, store));
        let router = CommandRouter::new(Arc::clone(&context));

        Ok(Self {
            router,
            context,
            started: Instant::now(),
        })
    }

    /// Returns the command router.
    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.context.config
    }

    /// Returns the record store.
    pub fn store(&self) -> &RecordStore {
        &self.context.store
    }

    /// Time since the server was opened.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Builds the HTTP application.
    pub fn into_app(self) -> Router {
        http::build_router(Arc::new(self))
    }

    /// Serves until Ctrl-C.
    ///
    /// HTTPS is used when both TLS files exist; otherwise plain HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if TLS material is invalid or the listener fails.
    pub async fn serve(self) -> ServerResult<()> {
        let config = self.config().clone();
        let addr = config.bind_addr;
        let app = self
            .into_app()
            .into_make_service_with_connect_info::<SocketAddr>();

        match config.tls_files() {
            Some((cert, key)) => {
                let tls = RustlsConfig::from_pem_file(cert, key)
                    .await
                    .map_err(|e| ServerError::Tls(format!("{}: {e}", cert.display())))?;

                let handle = axum_server::Handle::new();
                let shutdown = handle.clone();
                tokio::spawn(async move {
                    shutdown_signal().await;
                    shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
                });

                info!(%addr, "listening on https://{addr}");
                axum_server::bind_rustls(addr, tls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                warn!(
                    cert = %config.tls_cert.display(),
                    key = %config.tls_key.display(),
                    "TLS certificate or key not found, serving plain HTTP"
                );
                info!(
                    "generate a self-signed pair with: openssl req -x509 -newkey rsa:2048 -nodes \
                     -keyout {} -out {} -days 365 -subj /CN=localhost",
                    config.tls_key.display(),
                    config.tls_cert.display()
                );

                let listener = tokio::net::TcpListener::bind(addr).await?;
                info!(%addr, "listening on http://{addr}");
                axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown_signal())
                    .await?;
            }
        }

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendd_store::Collection;
    use serde_json::json;

    #[tokio::test]
    async fn open_initializes_data_dir() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("data");
        let server = AttendServer::open(ServerConfig::default().with_data_dir(&dir))
            .await
            .unwrap();

        for collection in Collection::ALL {
            assert!(server.store().path(collection).exists());
        }
    }

    #[tokio::test]
    async fn open_rejects_zero_body_limit() {
        let temp = tempfile::tempdir().unwrap();
        let config = ServerConfig::default()
            .with_data_dir(temp.path().join("data"))
            .with_body_limit(0);

        let result = AttendServer::open(config).await;

        assert!(matches!(result, Err(ServerError::Config(_))));
        assert!(!temp.path().join("data").exists());
    }

    #[tokio::test]
    async fn full_command_flow() {
        let temp = tempfile::tempdir().unwrap();
        let server = AttendServer::open(ServerConfig::default().with_data_dir(temp.path()))
            .await
            .unwrap();

        let reply = server.router().route(json!({"cmd": "reg", "SN": "DEV1"}), None).await;
        assert_eq!(reply.status, 200);

        let reply = server.router().route(json!({"cmd": "checklive", "SN": "DEV1"}), None).await;
        assert_eq!(reply.status, 200);

        let reply = server
            .router()
            .route(
                json!({"cmd": "sendlog", "SN": "DEV1", "logs": [
                    {"enrollid": "1", "timestamp": "2025-01-01T00:00:00Z", "temp": 36.5}
                ]}),
                None,
            )
            .await;
        assert_eq!(reply.body["allowed"], 1);

        assert_eq!(server.store().load(Collection::Devices).await.len(), 1);
        assert_eq!(server.store().load(Collection::Logs).await.len(), 1);
    }
}
