//! `reg`: device registration.

use super::{CommandHandler, DeviceRequest};
use crate::error::ServerResult;
use attendd_protocol::{cloudtime, fields, merge_shallow, Command, DeviceRecord, RegReply, Reply};
use attendd_store::Collection;
use tracing::{info, warn};

impl CommandHandler {
    /// Registers a terminal, or refreshes the record of a known one.
    ///
    /// Re-registration overwrites only the fields present in the new
    /// payload; the record count never grows for a known serial.
    pub async fn handle_reg(&self, request: &DeviceRequest<'_>) -> ServerResult<Reply> {
        let now = cloudtime();
        let peer_ip = request.peer_ip.map(|ip| ip.to_string());

        let device = match DeviceRecord::from_registration(request.payload, peer_ip.as_deref(), &now)
        {
            Ok(device) => device,
            Err(e) => {
                warn!(error = %e, "registration rejected");
                return Ok(Reply::bad_request(
                    Some(Command::Reg.as_str()),
                    "Missing SN",
                ));
            }
        };
        let sn = device.sn.clone();

        let store = self.store();
        let _guard = store.lock(Collection::Devices).await;
        let mut devices = store.load(Collection::Devices).await;

        match devices
            .iter_mut()
            .find(|d| fields::SERIAL.find_text(d).as_deref() == Some(sn.as_str()))
        {
            Some(existing) => {
                merge_shallow(existing, device.into_update());
                info!(sn = %sn, "device re-registered");
            }
            None => {
                devices.push(device.into_new_record(&now));
                info!(sn = %sn, total = devices.len(), "device registered");
            }
        }

        store.save(Collection::Devices, &devices).await?;
        Ok(Reply::ok(RegReply::new()))
    }
}
