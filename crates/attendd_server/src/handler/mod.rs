//! Command handlers.
//!
//! One handler per terminal command. Each handler loads the collection it
//! touches, merges or appends the incoming payload, saves the collection
//! back, and produces the [`Reply`] sent to the terminal. Client input
//! problems are returned as 400 replies; only storage write failures are
//! returned as errors.

mod checklive;
mod qrcode;
mod reg;
mod sendlog;
mod senduser;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use attendd_protocol::{fields, Command, Record, Reply};
use attendd_store::RecordStore;
use std::net::IpAddr;
use std::sync::Arc;

/// Context shared by all handlers.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Collection store.
    pub store: RecordStore,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, store: RecordStore) -> Self {
        Self { config, store }
    }
}

/// A parsed command request from a terminal.
#[derive(Debug, Clone, Copy)]
pub struct DeviceRequest<'a> {
    /// The JSON object the terminal posted.
    pub payload: &'a Record,
    /// Address the request came from, if known.
    pub peer_ip: Option<IpAddr>,
}

impl<'a> DeviceRequest<'a> {
    /// Creates a request.
    pub fn new(payload: &'a Record, peer_ip: Option<IpAddr>) -> Self {
        Self { payload, peer_ip }
    }

    /// Returns the terminal's serial number, if supplied.
    pub fn serial(&self) -> Option<String> {
        fields::SERIAL.find_text(self.payload)
    }
}

/// Handler for terminal commands.
pub struct CommandHandler {
    context: Arc<HandlerContext>,
}

impl CommandHandler {
    /// Creates a new command handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Returns the shared context.
    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn store(&self) -> &RecordStore {
        &self.context.store
    }

    /// Runs the handler for `command`.
    pub async fn handle(
        &self,
        command: Command,
        request: &DeviceRequest<'_>,
    ) -> ServerResult<Reply> {
        match command {
            Command::Reg => self.handle_reg(request).await,
            Command::SendLog => self.handle_sendlog(request).await,
            Command::CheckLive => self.handle_checklive(request).await,
            Command::SendUser => self.handle_senduser(request).await,
            Command::SendQrCode => self.handle_sendqrcode(request).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use attendd_store::StoreOptions;
    use serde_json::Value;
    use tempfile::TempDir;

    pub async fn create_handler() -> (CommandHandler, TempDir) {
        create_handler_with(ServerConfig::default()).await
    }

    pub async fn create_handler_with(config: ServerConfig) -> (CommandHandler, TempDir) {
        let temp = tempfile::tempdir().unwrap();
        let config = config.with_data_dir(temp.path());
        let store = RecordStore::open(&config.data_dir, StoreOptions::default())
            .await
            .unwrap();
        let context = Arc::new(HandlerContext::new(config, store));
        (CommandHandler::new(context), temp)
    }

    pub fn object(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }
}
