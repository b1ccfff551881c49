//! `sendqrcode`: QR-code verification.

use super::{CommandHandler, DeviceRequest};
use crate::error::ServerResult;
use attendd_protocol::{fields, QrCodeReply, Reply};
use tracing::info;

impl CommandHandler {
    /// Checks a presented QR code against the configured allow-list.
    ///
    /// Nothing is persisted.
    pub async fn handle_sendqrcode(&self, request: &DeviceRequest<'_>) -> ServerResult<Reply> {
        let code = fields::QR_CODE.find_text(request.payload);
        let valid = code
            .as_deref()
            .is_some_and(|code| self.context().config.qr_allow_list.iter().any(|c| c == code));

        info!(sn = ?request.serial(), code = ?code, valid, "qr code presented");

        let reply = if valid {
            QrCodeReply::granted()
        } else {
            QrCodeReply::denied()
        };
        Ok(Reply::ok(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_handler_with, object};
    use super::*;
    use crate::config::ServerConfig;
    use attendd_store::Collection;
    use serde_json::json;

    #[tokio::test]
    async fn allow_listed_code_opens() {
        let config = ServerConfig::default().with_qr_allow_list(["GATE-7"]);
        let (handler, _temp) = create_handler_with(config).await;
        let payload = object(json!({"cmd": "sendqrcode", "SN": "DEV1", "qrcode": "GATE-7"}));

        let reply = handler
            .handle_sendqrcode(&DeviceRequest::new(&payload, None))
            .await
            .unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["access"], 1);
        assert_eq!(reply.body["enrollid"], QrCodeReply::VISITOR_ENROLL_ID);
        assert_eq!(reply.body["username"], QrCodeReply::VISITOR_NAME);
        assert!(reply.body["message"].is_string());
    }

    #[tokio::test]
    async fn unknown_or_missing_code_is_denied() {
        let config = ServerConfig::default().with_qr_allow_list(["GATE-7"]);
        let (handler, _temp) = create_handler_with(config).await;

        for payload in [
            json!({"cmd": "sendqrcode", "code": "nope"}),
            json!({"cmd": "sendqrcode"}),
        ] {
            let payload = object(payload);
            let reply = handler
                .handle_sendqrcode(&DeviceRequest::new(&payload, None))
                .await
                .unwrap();
            assert_eq!(reply.status, 200);
            assert_eq!(reply.body["access"], 0);
            assert!(reply.body["message"].is_string());
        }

        for collection in Collection::ALL {
            assert!(handler.store().load(collection).await.is_empty());
        }
    }
}
