//! `sendlog`: attendance log upload.

use super::{CommandHandler, DeviceRequest};
use crate::error::ServerResult;
use attendd_protocol::{cloudtime, fields, Command, LogEntry, LogReply, Reply};
use attendd_store::Collection;
use tracing::{info, warn};

impl CommandHandler {
    /// Appends a batch of attendance events to the log.
    ///
    /// Entries without an enroll ID or timestamp are skipped; the rest of
    /// the batch is still accepted. The log is saved once per request.
    pub async fn handle_sendlog(&self, request: &DeviceRequest<'_>) -> ServerResult<Reply> {
        let batch = fields::LOG_CONTAINER.find_entries(request.payload);
        if batch.is_empty() {
            warn!("sendlog without log entries");
            return Ok(Reply::bad_request(
                Some(Command::SendLog.as_str()),
                "No logs provided",
            ));
        }

        let now = cloudtime();
        let sn = request.serial();
        let submitted = batch.len();
        let (mut allowed, mut denied) = (0usize, 0usize);
        let mut accepted = Vec::with_capacity(submitted);

        for (index, entry) in batch.into_iter().enumerate() {
            match LogEntry::from_entry(entry, sn.as_deref(), &now) {
                Ok(log) => {
                    if log.access.is_allowed() {
                        allowed += 1;
                    } else {
                        denied += 1;
                    }
                    accepted.push(log.into_record());
                }
                Err(e) => warn!(sn = ?sn, index, error = %e, "skipping log entry"),
            }
        }

        if !accepted.is_empty() {
            let store = self.store();
            let _guard = store.lock(Collection::Logs).await;
            let mut logs = store.load(Collection::Logs).await;
            logs.extend(accepted);
            store.save(Collection::Logs, &logs).await?;
        }

        info!(sn = ?sn, submitted, allowed, denied, "attendance logs received");
        Ok(Reply::ok(LogReply::new(allowed, denied)))
    }
}
