//! `senduser`: user enrollment upload.

use super::{CommandHandler, DeviceRequest};
use crate::error::ServerResult;
use attendd_protocol::{
    cloudtime, fields, merge_shallow, user_identity, Command, Record, Reply,
    UserRecord, UserReply,
};
use attendd_store::Collection;
use std::collections::HashMap;
use tracing::{info, warn};

impl CommandHandler {
    /// Creates or updates users keyed by enroll ID (and backup number).
    ///
    /// Users arrive under `user` or `users`, or as the payload itself when
    /// the terminal sends a single flat record. Entries without an enroll ID
    /// are skipped.
    pub async fn handle_senduser(&self, request: &DeviceRequest<'_>) -> ServerResult<Reply> {
        let batch = user_batch(request.payload);
        if batch.is_empty() {
            warn!("senduser without user entries");
            return Ok(Reply::bad_request(
                Some(Command::SendUser.as_str()),
                "No users provided",
            ));
        }

        let now = cloudtime();
        let sn = request.serial();
        let users: Vec<UserRecord> = batch
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                UserRecord::from_entry(entry, sn.as_deref(), &now)
                    .map_err(|e| warn!(sn = ?sn, index, error = %e, "skipping user entry"))
                    .ok()
            })
            .collect();
        let count = users.len();

        if count > 0 {
            let store = self.store();
            let _guard = store.lock(Collection::Users).await;
            let mut stored = store.load(Collection::Users).await;
            let (created, updated) = upsert_users(&mut stored, users);
            store.save(Collection::Users, &stored).await?;
            info!(sn = ?sn, created, updated, "users received");
        }

        Ok(Reply::ok(UserReply::new(count)))
    }
}

fn user_batch(payload: &Record) -> Vec<&Record> {
    if fields::USER_CONTAINER.is_present_in(payload) {
        fields::USER_CONTAINER.find_entries(payload)
    } else if fields::ENROLL_ID.is_present_in(payload) {
        vec![payload]
    } else {
        Vec::new()
    }
}

/// Merges `users` into `stored`, returning `(created, updated)`.
fn upsert_users(stored: &mut Vec<Record>, users: Vec<UserRecord>) -> (usize, usize) {
    let mut index: HashMap<String, usize> = stored
        .iter()
        .enumerate()
        .filter_map(|(i, record)| user_identity(record).map(|key| (key, i)))
        .collect();
    let (mut created, mut updated) = (0, 0);

    for user in users {
        let key = user.identity();
        match index.get(&key) {
            Some(&i) => {
                merge_shallow(&mut stored[i], user.into_update());
                updated += 1;
            }
            None => {
                index.insert(key, stored.len());
                stored.push(user.into_new_record());
                created += 1;
            }
        }
    }

    (created, updated)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_handler, object};
    use super::*;
    use crate::error::ServerError;
    use serde_json::json;

    async fn send(handler: &CommandHandler, payload: serde_json::Value) -> Reply {
        let payload = object(payload);
        handler
            .handle_senduser(&DeviceRequest::new(&payload, None))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn plural_container_creates_users() {
        let (handler, _temp) = create_handler().await;
        let reply = send(
            &handler,
            json!({
                "cmd": "senduser",
                "SN": "DEV1",
                "users": [
                    {"enrollid": "1", "name": "Ada"},
                    {"enrollid": "2", "name": "Grace", "cardid": "0042"}
                ]
            }),
        )
        .await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["ret"], "senduser");
        assert_eq!(reply.body["count"], 2);

        let users = handler.store().load(Collection::Users).await;
        assert_eq!(users.len(), 2);
        assert_eq!(users[1]["cardid"], "0042");
        assert_eq!(users[0]["SN"], "DEV1");
    }

    #[tokio::test]
    async fn existing_identity_is_merged() {
        let (handler, _temp) = create_handler().await;
        send(
            &handler,
            json!({"cmd": "senduser", "user": {"enrollid": "1", "name": "Ada", "password": "1234"}}),
        )
        .await;
        let created_at = handler.store().load(Collection::Users).await[0]["created_at"].clone();

        send(
            &handler,
            json!({"cmd": "senduser", "user": {"enrollid": 1, "name": "Ada L."}}),
        )
        .await;

        let users = handler.store().load(Collection::Users).await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["name"], "Ada L.");
        assert_eq!(users[0]["password"], "1234");
        assert_eq!(users[0]["created_at"], created_at);
        assert!(users[0]["updated_at"].is_string());
    }

    #[tokio::test]
    async fn backup_slots_are_separate_identities() {
        let (handler, _temp) = create_handler().await;
        send(
            &handler,
            json!({"cmd": "senduser", "users": [
                {"enrollid": "1", "backupnum": 0, "fingerprint": "AAA"},
                {"enrollid": "1", "backupnum": 1, "fingerprint": "BBB"}
            ]}),
        )
        .await;

        assert_eq!(handler.store().load(Collection::Users).await.len(), 2);
    }

    #[tokio::test]
    async fn entries_without_identity_are_skipped() {
        let (handler, _temp) = create_handler().await;
        let reply = send(
            &handler,
            json!({"cmd": "senduser", "users": [{"name": "nobody"}, {"pin": "5"}]}),
        )
        .await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["count"], 1);
        assert_eq!(handler.store().load(Collection::Users).await.len(), 1);
    }

    #[tokio::test]
    async fn empty_container_falls_through_to_populated_alias() {
        let (handler, _temp) = create_handler().await;
        let reply = send(
            &handler,
            json!({"cmd": "senduser", "user": [], "users": [{"enrollid": "3", "name": "Linus"}]}),
        )
        .await;

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["count"], 1);
        assert_eq!(handler.store().load(Collection::Users).await[0]["name"], "Linus");
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let (handler, temp) = create_handler().await;
        std::fs::remove_dir_all(temp.path()).unwrap();
        let payload = object(json!({"cmd": "senduser", "users": [{"enrollid": "1"}]}));

        let result = handler
            .handle_senduser(&DeviceRequest::new(&payload, None))
            .await;

        assert!(matches!(result, Err(ServerError::Store(_))));
    }

    #[tokio::test]
    async fn flat_payload_is_one_user() {
        let (handler, _temp) = create_handler().await;
        let reply = send(
            &handler,
            json!({"cmd": "senduser", "sn": "DEV1", "enrollid": 12, "name": "Flat"}),
        )
        .await;

        assert_eq!(reply.body["count"], 1);
        let users = handler.store().load(Collection::Users).await;
        assert_eq!(users[0]["enrollid"], "12");
        assert_eq!(users[0]["name"], "Flat");
    }

    #[tokio::test]
    async fn missing_users_is_rejected() {
        let (handler, _temp) = create_handler().await;
        let reply = send(&handler, json!({"cmd": "senduser", "SN": "DEV1"})).await;

        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["result"], false);
    }
}
