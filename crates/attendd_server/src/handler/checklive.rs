//! `checklive`: heartbeat.

use super::{CommandHandler, DeviceRequest};
use crate::error::ServerResult;
use attendd_protocol::{cloudtime, fields, merge_shallow, CheckLiveReply, DeviceRecord, Reply};
use attendd_store::Collection;
use tracing::{debug, info};

impl CommandHandler {
    /// Records a heartbeat on a known terminal.
    ///
    /// Always succeeds; an unknown or missing serial is logged and never
    /// creates a device.
    pub async fn handle_checklive(&self, request: &DeviceRequest<'_>) -> ServerResult<Reply> {
        let Some(sn) = request.serial() else {
            debug!("heartbeat without serial number");
            return Ok(Reply::ok(CheckLiveReply::new()));
        };

        let store = self.store();
        let _guard = store.lock(Collection::Devices).await;
        let mut devices = store.load(Collection::Devices).await;

        let position = devices
            .iter()
            .position(|d| fields::SERIAL.find_text(d).as_deref() == Some(sn.as_str()));

        match position {
            Some(index) => {
                merge_shallow(
                    &mut devices[index],
                    DeviceRecord::heartbeat(request.payload, &cloudtime()),
                );
                store.save(Collection::Devices, &devices).await?;
                debug!(sn = %sn, "heartbeat");
            }
            None => info!(sn = %sn, "heartbeat from unregistered device"),
        }

        Ok(Reply::ok(CheckLiveReply::new()))
    }
}
