//! `create_direct_action`/`set_algo_status`/`terminate_algo` over the Algo sub-protocol.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use act_network::Connection;
use act_types::wire::{
    AlgoControlStatus, AlgoRequest, AlgoRequestType, AlgoResponse, AlgoResponseType, CreateDirectActionRequest,
    CreateDirectActionResponse, OperationStatus, Request, RequestPayload, ResponsePayload, SubProtocolType,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{ActError, Result};

#[derive(Debug, Clone)]
pub struct AlgoAck {
    pub operation_status: OperationStatus,
    pub create_direct_action_response: Option<CreateDirectActionResponse>,
}

/// Each request kind (create/set-status/terminate) keeps its own pending map,
/// matching the reference client, which never shares client ids across
/// request kinds within the Algo sub-protocol.
pub struct AlgoSubSession {
    connection: Arc<Connection>,
    next_client_id: AtomicI64,
    pending: Mutex<HashMap<i64, oneshot::Sender<Result<AlgoAck>>>>,
}

impl AlgoSubSession {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection, next_client_id: AtomicI64::new(0), pending: Mutex::new(HashMap::new()) }
    }

    pub fn sub_protocol_type(&self) -> SubProtocolType {
        SubProtocolType::Algo
    }

    fn next_id(&self) -> i64 {
        self.next_client_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn send_and_wait(&self, request: AlgoRequest) -> Result<AlgoAck> {
        let client_id = request.client_id;
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(client_id, tx);

        let wire_request = Request {
            sub_protocol_type: SubProtocolType::Algo as i32,
            payload: Some(RequestPayload::Algo(request)),
        };

        if !self.connection.send_request(&wire_request).await {
            self.pending.lock().remove(&client_id);
            return Err(ActError::SendFailed);
        }

        rx.await.unwrap_or(Err(ActError::Disconnected))
    }

    pub async fn create_direct_action(&self, request: CreateDirectActionRequest) -> Result<CreateDirectActionResponse> {
        let client_id = self.next_id();
        let ack = self
            .send_and_wait(AlgoRequest {
                request_type: AlgoRequestType::CreateDirectAction as i32,
                client_id,
                create_direct_action_request: Some(request),
                algo_name: None,
                control_status: None,
            })
            .await?;
        ack.create_direct_action_response.ok_or(ActError::ServerError("missing create_direct_action_response".into()))
    }

    pub async fn set_algo_status(&self, algo_name: impl Into<String>, status: AlgoControlStatus) -> Result<()> {
        let client_id = self.next_id();
        self.send_and_wait(AlgoRequest {
            request_type: AlgoRequestType::SetAlgoStatus as i32,
            client_id,
            create_direct_action_request: None,
            algo_name: Some(algo_name.into()),
            control_status: Some(status as i32),
        })
        .await?;
        Ok(())
    }

    pub async fn terminate_algo(&self, algo_name: impl Into<String>) -> Result<()> {
        let client_id = self.next_id();
        self.send_and_wait(AlgoRequest {
            request_type: AlgoRequestType::TerminateAlgo as i32,
            client_id,
            create_direct_action_request: None,
            algo_name: Some(algo_name.into()),
            control_status: None,
        })
        .await?;
        Ok(())
    }

    pub fn on_response(&self, response: &ResponsePayload) {
        let ResponsePayload::Algo(algo_response) = response else { return };
        let response_type = algo_response.response_type;
        let known = response_type == AlgoResponseType::CreateDirectAction as i32
            || response_type == AlgoResponseType::SetAlgoStatus as i32
            || response_type == AlgoResponseType::TerminateAlgo as i32;
        if !known {
            tracing::warn!(response_type, "unhandled Algo response type");
            return;
        }
        let Some(tx) = self.pending.lock().remove(&algo_response.client_id) else {
            tracing::warn!(client_id = algo_response.client_id, "Algo response with no pending request");
            return;
        };
        let _ = tx.send(Self::to_result(algo_response));
    }

    fn to_result(response: &AlgoResponse) -> Result<AlgoAck> {
        match &response.operation_status {
            Some(status) if status.has_error() => Err(ActError::ServerError(status.error_message.clone())),
            status => Ok(AlgoAck {
                operation_status: status.clone().unwrap_or_else(OperationStatus::ok),
                create_direct_action_response: response.create_direct_action_response.clone(),
            }),
        }
    }
}
