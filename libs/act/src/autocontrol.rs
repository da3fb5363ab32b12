//! `send_automation_updates` over the AutoControl sub-protocol.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use act_network::Connection;
use act_types::wire::{
    AutoControlRequest, AutoControlRequestType, AutoControlResponseType, OperationStatus, ProductAutomationUpdate,
    Request, RequestPayload, ResponsePayload, SubProtocolType,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{ActError, Result};

/// Handles `REQ_AUTOCONTROL_UPDATE`. Client ids are generated by real
/// post-increment (`id = counter + 1; counter = id`) — the reference
/// client's `++self._client_id` was a no-op under Python's grammar and is
/// not reproduced here.
pub struct AutoControlSubSession {
    connection: Arc<Connection>,
    next_client_id: AtomicI64,
    pending: Mutex<HashMap<i64, oneshot::Sender<OperationStatus>>>,
}

impl AutoControlSubSession {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection, next_client_id: AtomicI64::new(0), pending: Mutex::new(HashMap::new()) }
    }

    pub fn sub_protocol_type(&self) -> SubProtocolType {
        SubProtocolType::AutoControl
    }

    fn next_id(&self) -> i64 {
        self.next_client_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Suspends until the server acknowledges the update (success or error
    /// are both delivered as `Ok` — the operation status carries the
    /// failure, there's nothing to propagate as an `Err` here).
    pub async fn send_automation_updates(&self, updates: Vec<ProductAutomationUpdate>) -> Result<OperationStatus> {
        let client_id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(client_id, tx);

        let request = Request {
            sub_protocol_type: SubProtocolType::AutoControl as i32,
            payload: Some(RequestPayload::AutoControl(AutoControlRequest {
                request_type: AutoControlRequestType::Update as i32,
                client_id,
                automation_updates: updates,
            })),
        };

        if !self.connection.send_request(&request).await {
            self.pending.lock().remove(&client_id);
            return Err(ActError::SendFailed);
        }

        rx.await.map_err(|_| ActError::Disconnected)
    }

    pub fn on_response(&self, response: &ResponsePayload) {
        let ResponsePayload::AutoControl(ac_response) = response else { return };
        let response_type = ac_response.response_type;
        if response_type == AutoControlResponseType::Update as i32
            || response_type == AutoControlResponseType::ProductAutomation as i32
        {
            if let Some(tx) = self.pending.lock().remove(&ac_response.client_id) {
                let _ = tx.send(ac_response.operation_status.clone().unwrap_or_else(OperationStatus::ok));
            }
        } else {
            tracing::warn!(response_type, "unhandled AutoControl response type");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64 as StdAtomicI64;

    #[test]
    fn client_id_is_a_real_post_increment() {
        let counter = StdAtomicI64::new(0);
        let first = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let second = counter.fetch_add(1, Ordering::SeqCst) + 1;
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }
}
