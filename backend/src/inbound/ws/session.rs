//! Per-connection WebSocket handler.
//!
//! Forwards every request event from the broadcast hub to the client as a
//! JSON text frame and keeps the connection alive with heartbeats. The
//! public contract pings every 5s and considers a connection idle after 10s
//! without client traffic. Tests shorten these intervals to speed up
//! feedback.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::RequestEvent;
use crate::inbound::ws::messages::ChannelFrame;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    events: broadcast::Receiver<RequestEvent>,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(events).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    HubClosed,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    events: broadcast::Receiver<RequestEvent>,
}

impl WsSession {
    fn new(events: broadcast::Receiver<RequestEvent>) -> Self {
        Self { events }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    handle_stream_message(&mut session, &mut last_heartbeat, message).await
                }
                event = self.events.recv() => {
                    handle_event(&mut session, event).await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&error);
                close_session_if_needed(session, close_action_for(&error)).await;
                return;
            }
        }
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }

    session.ping(b"").await.map_err(SessionError::Network)
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let Some(message) = message else {
        return Err(SessionError::StreamClosed);
    };

    match message {
        Ok(Message::Ping(payload)) => {
            *last_heartbeat = Instant::now();
            session.pong(&payload).await.map_err(SessionError::Network)
        }
        Ok(Message::Close(reason)) => Err(SessionError::ClientClosed(reason)),
        // The channel is server-to-client; client frames only prove liveness.
        Ok(_) => {
            *last_heartbeat = Instant::now();
            Ok(())
        }
        Err(error) => Err(SessionError::Protocol(error)),
    }
}

async fn handle_event(
    session: &mut Session,
    event: Result<RequestEvent, RecvError>,
) -> Result<(), SessionError> {
    match event {
        Ok(event) => send_frame(session, &event)
            .await
            .map_err(SessionError::Network),
        Err(RecvError::Lagged(skipped)) => {
            warn!(skipped, "WebSocket subscriber lagged; events dropped");
            Ok(())
        }
        Err(RecvError::Closed) => Err(SessionError::HubClosed),
    }
}

async fn send_frame(session: &mut Session, event: &RequestEvent) -> Result<(), Closed> {
    match serde_json::to_string(&ChannelFrame::from(event)) {
        Ok(body) => {
            debug!(event = event.name(), "forwarding request event");
            session.text(body).await
        }
        Err(error) => {
            warn!(error = %error, "Failed to serialize WebSocket payload");
            Ok(())
        }
    }
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            warn!(error = %error, "WebSocket send failed; closing connection");
        }
        SessionError::HubClosed => {
            debug!("broadcast hub closed; ending WebSocket session");
        }
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
    }
}

fn close_action_for(error: &SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::HubClosed => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Away,
            description: Some("server shutting down".to_owned()),
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
