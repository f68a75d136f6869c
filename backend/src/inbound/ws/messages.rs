//! Wire-level frames for the WebSocket adapter.
//!
//! Every request event is wrapped with the channel name so dashboards can
//! filter on `channel` and `event` without inspecting `data`.

use serde::Serialize;

use crate::domain::{REQUEST_CHANNEL, RequestEvent};

/// Outbound text frame: `{"channel": ..., "event": ..., "data": {...}}`.
#[derive(Debug, Serialize)]
pub struct ChannelFrame<'a> {
    pub channel: &'static str,
    #[serde(flatten)]
    pub event: &'a RequestEvent,
}

impl<'a> From<&'a RequestEvent> for ChannelFrame<'a> {
    fn from(event: &'a RequestEvent) -> Self {
        Self {
            channel: REQUEST_CHANNEL,
            event,
        }
    }
}
