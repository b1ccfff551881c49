//! Command router: validates the request body and dispatches on `cmd`.

use crate::handler::{CommandHandler, DeviceRequest, HandlerContext};
use attendd_protocol::{normalize_cmd, Command, Reply};
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, warn};

const MISSING_CMD: &str = "Missing cmd";

/// Routes terminal requests to the command handlers.
///
/// Requests are independent: nothing carries over from one call to the
/// next.
pub struct CommandRouter {
    handler: CommandHandler,
}

impl CommandRouter {
    /// Creates a new router.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self {
            handler: CommandHandler::new(context),
        }
    }

    /// Returns the underlying handler.
    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    /// Routes a raw request body.
    ///
    /// A body that is not valid JSON is treated like one without `cmd`.
    pub async fn route_bytes(&self, body: &[u8], peer_ip: Option<IpAddr>) -> Reply {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => self.route(value, peer_ip).await,
            Err(e) => {
                warn!(error = %e, "request body is not valid JSON");
                Reply::bad_request(None, MISSING_CMD)
            }
        }
    }

    /// Routes a parsed request body.
    ///
    /// Never fails: every outcome, including handler errors, is mapped to a
    /// reply.
    pub async fn route(&self, body: Value, peer_ip: Option<IpAddr>) -> Reply {
        let Value::Object(payload) = body else {
            warn!("request body is not a JSON object");
            return Reply::bad_request(None, MISSING_CMD);
        };

        let cmd = match payload.get("cmd").and_then(Value::as_str).map(normalize_cmd) {
            Some(cmd) if !cmd.is_empty() => cmd,
            _ => {
                warn!("request without cmd");
                return Reply::bad_request(None, MISSING_CMD);
            }
        };

        let Some(command) = Command::from_keyword(&cmd) else {
            warn!(cmd = %cmd, "unknown command");
            return Reply::bad_request(Some(&cmd), format!("Unknown cmd: {cmd}"));
        };

        let request = DeviceRequest::new(&payload, peer_ip);
        debug!(%command, sn = ?request.serial(), peer = ?peer_ip, "dispatching command");

        match self.handler.handle(command, &request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(%command, error = %e, "command failed");
                Reply::internal_error()
            }
        }
    }
}
