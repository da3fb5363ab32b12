//! The DEX sub-protocol: `start_query`/`stop_query`/`update_table`, and the
//! live-query engine in [`query`].

pub mod csv;
pub mod query;

pub use query::{DexCell, DexColumn, DexQuery, DexQueryState, DexRow, DexRowKey};

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use act_network::{Connection, ConnectionState};
use act_types::wire::{
    DexRequest, DexRequestType, DexResponseType, OperationStatus, Request, RequestPayload, ResponsePayload, StartQuery,
    SubProtocolType, TableUpdate,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{ActError, Result};

/// Parameters for `start_query`, mirroring `StartQuery` on the wire.
#[derive(Debug, Clone, Default)]
pub struct StartQueryParams {
    pub scope_key: Vec<String>,
    pub field: Vec<String>,
    pub frequency: i64,
    pub one_time: bool,
    pub no_trigger: Vec<String>,
    pub context: Vec<String>,
}

enum QueryHandler {
    Start(Arc<DexQuery>),
    Stop(Arc<DexQuery>),
}

type TableUpdateAck = oneshot::Sender<Result<OperationStatus>>;

/// Handles `REQ_START_QUERY`/`REQ_STOP_QUERY`/`REQ_TABLE_UPDATE`.
///
/// A started query's client id stays pending for as long as the query is
/// open, since `UPDATE_TABLE` pushes keep arriving against it; a one-time
/// (snapshot) query's pending entry is dropped the moment its first
/// `TableUpdate` lands, but the query itself is not forced to `Stopped` —
/// the caller decides when to call `stop()`.
pub struct DexSubSession {
    connection: Arc<Connection>,
    next_client_id: AtomicI64,
    queries: Arc<Mutex<HashMap<i64, QueryHandler>>>,
    table_update_acks: Mutex<HashMap<i64, TableUpdateAck>>,
}

impl DexSubSession {
    pub fn new(connection: Arc<Connection>) -> Self {
        let queries: Arc<Mutex<HashMap<i64, QueryHandler>>> = Arc::new(Mutex::new(HashMap::new()));

        // A dropped connection takes every query that was relying on it down
        // with it — there is no reconnect-and-resume in this client.
        let queries_for_disconnect = Arc::clone(&queries);
        connection.add_state_change_handler(Arc::new(move |state| {
            if state != ConnectionState::Disconnected {
                return;
            }
            for handler in queries_for_disconnect.lock().values() {
                let query = match handler {
                    QueryHandler::Start(q) => q,
                    QueryHandler::Stop(q) => q,
                };
                query.mark_disconnected();
            }
        }));

        Self { connection, next_client_id: AtomicI64::new(0), queries, table_update_acks: Mutex::new(HashMap::new()) }
    }

    pub fn sub_protocol_type(&self) -> SubProtocolType {
        SubProtocolType::Dex
    }

    fn next_id(&self) -> i64 {
        self.next_client_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Non-blocking: returns the query handle immediately in the `Starting`
    /// state. Only `connect`/`wait_on_disconnect`/`logon` suspend in this
    /// client; query progress is observed through the handler lists.
    pub async fn start_query(self: &Arc<Self>, params: StartQueryParams) -> Arc<DexQuery> {
        let query = DexQuery::new(params.one_time);
        query.set_state(DexQueryState::Starting);
        let client_id = self.next_id();
        self.queries.lock().insert(client_id, QueryHandler::Start(Arc::clone(&query)));

        let request = Request {
            sub_protocol_type: SubProtocolType::Dex as i32,
            payload: Some(RequestPayload::Dex(DexRequest {
                request_type: DexRequestType::StartQuery as i32,
                client_id,
                start_query: Some(StartQuery {
                    scope_key: params.scope_key,
                    field: params.field,
                    frequency: params.frequency,
                    one_time: params.one_time,
                    no_trigger: params.no_trigger,
                    context: params.context,
                }),
                table_update: None,
            })),
        };

        if !self.connection.send_request(&request).await {
            self.queries.lock().remove(&client_id);
            query.on_start_query(Some("failed to send start_query request".to_string()));
        }
        query
    }

    /// Non-blocking: sends `REQ_STOP_QUERY`; the query transitions to
    /// `Stopped` once the ack arrives (observe via a state-change handler).
    pub async fn stop_query(&self, query: &Arc<DexQuery>) {
        let client_id = self.next_id();
        self.queries.lock().insert(client_id, QueryHandler::Stop(Arc::clone(query)));
        query.set_state(DexQueryState::Stopping);

        let request = Request {
            sub_protocol_type: SubProtocolType::Dex as i32,
            payload: Some(RequestPayload::Dex(DexRequest {
                request_type: DexRequestType::StopQuery as i32,
                client_id,
                start_query: None,
                table_update: None,
            })),
        };

        if !self.connection.send_request(&request).await {
            self.queries.lock().remove(&client_id);
            query.on_stop_query(Some("failed to send stop_query request".to_string()));
        }
    }

    /// Suspends until the server acknowledges a caller-initiated table update.
    pub async fn update_table(&self, table_update: TableUpdate) -> Result<OperationStatus> {
        let client_id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.table_update_acks.lock().insert(client_id, tx);

        let request = Request {
            sub_protocol_type: SubProtocolType::Dex as i32,
            payload: Some(RequestPayload::Dex(DexRequest {
                request_type: DexRequestType::TableUpdate as i32,
                client_id,
                start_query: None,
                table_update: Some(table_update),
            })),
        };

        if !self.connection.send_request(&request).await {
            self.table_update_acks.lock().remove(&client_id);
            return Err(ActError::SendFailed);
        }

        rx.await.unwrap_or(Err(ActError::Disconnected))
    }

    pub fn on_response(&self, response: &ResponsePayload) {
        let ResponsePayload::Dex(dex_response) = response else { return };
        let client_id = dex_response.client_id;
        let response_type = dex_response.response_type;

        if response_type == DexResponseType::StartQuery as i32 {
            let query = match self.queries.lock().get(&client_id) {
                Some(QueryHandler::Start(q)) => Some(Arc::clone(q)),
                _ => None,
            };
            if let Some(query) = query {
                let err_msg = dex_response.operation_status.as_ref().and_then(|s| s.has_error().then(|| s.error_message.clone()));
                let failed = err_msg.is_some();
                query.on_start_query(err_msg);
                if failed {
                    self.queries.lock().remove(&client_id);
                }
            }
        } else if response_type == DexResponseType::UpdateTable as i32 {
            let query = match self.queries.lock().get(&client_id) {
                Some(QueryHandler::Start(q)) => Some(Arc::clone(q)),
                _ => None,
            };
            let Some(query) = query else {
                tracing::warn!(client_id, "table update with no pending query");
                return;
            };
            let err_msg = dex_response.operation_status.as_ref().and_then(|s| s.has_error().then(|| s.error_message.clone()));
            if let Some(err_msg) = err_msg {
                query.on_update_error(err_msg);
            } else if let Some(table_update) = &dex_response.table_update {
                query.apply_table_update(table_update);
            }
            if query.is_snapshot() {
                self.queries.lock().remove(&client_id);
            }
        } else if response_type == DexResponseType::StopQuery as i32 {
            if let Some(QueryHandler::Stop(query)) = self.queries.lock().remove(&client_id) {
                let err_msg = dex_response.operation_status.as_ref().and_then(|s| s.has_error().then(|| s.error_message.clone()));
                query.on_stop_query(err_msg);
                // A stop response also retires whatever client id the query
                // was originally started under.
                self.queries.lock().retain(|_, h| !matches!(h, QueryHandler::Start(q) if Arc::ptr_eq(q, &query)));
            }
        } else if response_type == DexResponseType::TableUpdateAck as i32 {
            if let Some(tx) = self.table_update_acks.lock().remove(&client_id) {
                let result = match &dex_response.operation_status {
                    Some(status) if status.has_error() => Err(ActError::ServerError(status.error_message.clone())),
                    status => Ok(status.clone().unwrap_or_else(OperationStatus::ok)),
                };
                let _ = tx.send(result);
            }
        } else {
            tracing::warn!(response_type, "unhandled Dex response type");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use act_types::wire::DexResponse;

    fn start_query_ack(client_id: i64) -> ResponsePayload {
        ResponsePayload::Dex(DexResponse {
            response_type: DexResponseType::StartQuery as i32,
            client_id,
            operation_status: Some(OperationStatus::ok()),
            table_update: None,
        })
    }

    fn snapshot_update(client_id: i64) -> ResponsePayload {
        ResponsePayload::Dex(DexResponse {
            response_type: DexResponseType::UpdateTable as i32,
            client_id,
            operation_status: Some(OperationStatus::ok()),
            table_update: Some(TableUpdate { column_descriptor: vec![], row: vec![] }),
        })
    }

    /// A one-time query's pending client-id entry is dropped the instant its
    /// first table update lands, but the query itself stays `Started` — the
    /// caller must call `stop_query` to retire it.
    #[test]
    fn snapshot_query_is_pruned_from_pending_map_but_not_auto_stopped() {
        let connection = Arc::new(Connection::new());
        let session = Arc::new(DexSubSession::new(connection));
        let query = DexQuery::new(true);
        let client_id = session.next_id();
        session.queries.lock().insert(client_id, QueryHandler::Start(Arc::clone(&query)));

        session.on_response(&start_query_ack(client_id));
        assert_eq!(query.state(), DexQueryState::Started);

        session.on_response(&snapshot_update(client_id));
        assert_eq!(query.state(), DexQueryState::Started);
        assert!(session.queries.lock().get(&client_id).is_none());

        // A second update for the same (now-pruned) client id is dropped,
        // not applied a second time.
        session.on_response(&snapshot_update(client_id));
        assert_eq!(query.update_count(), 1);
    }

    /// A live (non-snapshot) query keeps its pending entry across updates.
    #[test]
    fn live_query_keeps_pending_entry_across_updates() {
        let connection = Arc::new(Connection::new());
        let session = Arc::new(DexSubSession::new(connection));
        let query = DexQuery::new(false);
        let client_id = session.next_id();
        session.queries.lock().insert(client_id, QueryHandler::Start(Arc::clone(&query)));

        session.on_response(&start_query_ack(client_id));
        session.on_response(&snapshot_update(client_id));
        session.on_response(&snapshot_update(client_id));

        assert!(session.queries.lock().get(&client_id).is_some());
        assert_eq!(query.update_count(), 2);
    }
}
