//! WebSocket session handler tests.

use super::*;
use crate::domain::ports::EventPublisher;
use crate::domain::{RequestId, RequestStatus};
use crate::inbound::ws;
use crate::inbound::ws::state::{OriginAllowList, WsState};
use crate::outbound::realtime::BroadcastHub;
use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle, http::header};
use awc::{BoxedSocket, ws::Codec, ws::Frame};
use futures_util::StreamExt;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

#[fixture]
async fn start_ws_server() -> (String, Server, BroadcastHub) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let hub = BroadcastHub::default();
    let ws_state = WsState::new(hub.clone(), OriginAllowList::default());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let url = format!("http://{addr}");
    (url, server, hub)
}

#[fixture]
async fn ws_client(
    #[future] start_ws_server: (String, Server, BroadcastHub),
) -> (Socket, ServerHandle, BroadcastHub) {
    let (url, server, hub) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::ORIGIN, "http://localhost:3000")
        .connect()
        .await
        .expect("websocket connect");

    (socket, handle, hub)
}

async fn next_text_frame(socket: &mut Socket) -> Vec<u8> {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return bytes.to_vec(),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn forwards_published_events_as_channel_frames(
    #[future] ws_client: (Socket, ServerHandle, BroadcastHub),
) {
    let (mut socket, _server, hub) = ws_client.await;
    let request_id = RequestId::random();
    assert_eq!(hub.subscriber_count(), 1);

    hub.publish(&RequestEvent::StatusChanged {
        request_id,
        status: RequestStatus::Cancelled,
    })
    .await
    .expect("publish");

    let text = next_text_frame(&mut socket).await;
    let value: Value = serde_json::from_slice(&text).expect("json");
    assert_eq!(
        value,
        json!({
            "channel": "blood-requests",
            "event": "status-change",
            "data": {"requestId": request_id.to_string(), "status": "cancelled"},
        })
    );
}

#[rstest]
#[actix_rt::test]
async fn forwards_events_in_publish_order(
    #[future] ws_client: (Socket, ServerHandle, BroadcastHub),
) {
    let (mut socket, _server, hub) = ws_client.await;
    let first = RequestId::random();
    let second = RequestId::random();

    for request_id in [first, second] {
        hub.publish(&RequestEvent::Deleted { request_id })
            .await
            .expect("publish");
    }

    for expected in [first, second] {
        let value: Value =
            serde_json::from_slice(&next_text_frame(&mut socket).await).expect("json");
        assert_eq!(value["event"], "delete-request");
        assert_eq!(value["data"]["requestId"], expected.to_string());
    }
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(
    #[future] ws_client: (Socket, ServerHandle, BroadcastHub),
) {
    let (mut socket, _server, _hub) = ws_client.await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            let frame = frame.expect("frame");
            match frame {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}
