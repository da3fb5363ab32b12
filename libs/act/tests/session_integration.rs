//! End-to-end exercise of the public API: connect, log on, start a DEX
//! query, and watch a server-pushed `TableUpdate` materialise into rows.

use std::sync::Arc;

use act_client::{DexQueryState, LogonRequest, Session, StartQueryParams};
use act_types::wire::{
    Cell, ColumnDescriptor, DexRequestType, DexResponse, DexResponseType, OperationStatus, Request, RequestPayload,
    Response, ResponsePayload, Row, SubProtocolType, TableUpdate, WireVariantValue,
};
use act_types::wire::{ActLoginResponse, ActResponse, ActResponseType};
use parking_lot::Mutex;
use prost::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn login_response() -> Response {
    Response {
        sub_protocol_type: SubProtocolType::Act as i32,
        session_id: 7,
        payload: Some(ResponsePayload::Act(ActResponse {
            response_type: ActResponseType::Login as i32,
            operation_status: None,
            session_id: 7,
            login_response: Some(ActLoginResponse::default()),
            connections: vec![],
        })),
    }
}

fn read_request(bytes: &[u8]) -> Request {
    let len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
    Request::decode(&bytes[4..4 + len]).unwrap()
}

#[tokio::test]
async fn logon_then_start_query_materialises_a_pushed_row() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Login round trip.
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.unwrap();
        assert!(n > 0);
        socket.write_all(&act_codec::frame(&login_response().encode_to_vec())).await.unwrap();

        // Wait for the StartQuery request, then push a snapshot TableUpdate
        // under the same client id.
        let n = socket.read(&mut buf).await.unwrap();
        let request = read_request(&buf[..n]);
        let RequestPayload::Dex(dex_request) = request.payload.unwrap() else { panic!("expected a Dex request") };
        assert_eq!(dex_request.request_type, DexRequestType::StartQuery as i32);
        let client_id = dex_request.client_id;

        let ack = Response {
            sub_protocol_type: SubProtocolType::Dex as i32,
            session_id: 7,
            payload: Some(ResponsePayload::Dex(DexResponse {
                response_type: DexResponseType::StartQuery as i32,
                client_id,
                operation_status: Some(OperationStatus::ok()),
                table_update: None,
            })),
        };
        socket.write_all(&act_codec::frame(&ack.encode_to_vec())).await.unwrap();

        let push = Response {
            sub_protocol_type: SubProtocolType::Dex as i32,
            session_id: 7,
            payload: Some(ResponsePayload::Dex(DexResponse {
                response_type: DexResponseType::UpdateTable as i32,
                client_id,
                operation_status: Some(OperationStatus::ok()),
                table_update: Some(TableUpdate {
                    column_descriptor: vec![ColumnDescriptor {
                        name: "bid".into(),
                        r#type: 3,
                        is_vector: false,
                        can_write: false,
                    }],
                    row: vec![Row {
                        key: "BTC-USD".into(),
                        contexts: String::new(),
                        row_number: None,
                        cell: vec![Cell {
                            column_number: 0,
                            value: Some(WireVariantValue { var_price: Some(12_5000000), ..Default::default() }),
                            value_vector: vec![],
                        }],
                    }],
                }),
            })),
        };
        socket.write_all(&act_codec::frame(&push.encode_to_vec())).await.unwrap();
    });

    let session = Session::new();
    session.connect(addr).await.unwrap();
    session
        .logon(LogonRequest {
            username: "trader".into(),
            password: "hunter2".into(),
            appname: "demo".into(),
            failure_actions: vec![],
            session_options: vec![],
            client_properties: vec![],
        })
        .await
        .unwrap();

    let observed_rows = Arc::new(Mutex::new(0usize));
    let observed_clone = Arc::clone(&observed_rows);
    let query = session.dex().start_query(StartQueryParams {
        scope_key: vec!["BTC-USD".into()],
        field: vec!["bid".into()],
        frequency: 0,
        one_time: true,
        no_trigger: vec![],
        context: vec![],
    }).await;
    query.add_update_handler(Arc::new(move |_, _, _, new_rows, _| {
        *observed_clone.lock() += new_rows.len();
    }));

    // Poll until the server's push has been applied; the dispatch loop runs
    // on a separate task so there's no single await point to hang off of.
    for _ in 0..200 {
        if *observed_rows.lock() > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(query.state(), DexQueryState::Started);
    let rows = query.get_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key.key, "BTC-USD");
    assert_eq!(rows[0].cells[0].value.as_price().to_str(-1), "12.5");

    server.await.unwrap();
}
