//! Shared WebSocket adapter state.

use url::Url;

use crate::outbound::realtime::BroadcastHub;

/// Origins permitted to open a socket.
///
/// Entries are compared by their serialised origin (`scheme://host[:port]`).
/// Plain-HTTP localhost with an explicit non-zero port is always accepted so
/// a local dashboard can connect without configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginAllowList {
    origins: Vec<String>,
}

impl OriginAllowList {
    /// Build the list from configured values. Unparsable entries are
    /// skipped and returned so the caller can report them.
    pub fn parse<I, S>(entries: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut origins = Vec::new();
        let mut rejected = Vec::new();
        for entry in entries {
            let raw = entry.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            match Url::parse(raw) {
                Ok(url) if url.host_str().is_some() => {
                    origins.push(url.origin().ascii_serialization());
                }
                _ => rejected.push(raw.to_owned()),
            }
        }
        (Self { origins }, rejected)
    }

    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        if origin.scheme() == "http" && host == "localhost" {
            return matches!(origin.port(), Some(port) if port != 0);
        }
        let serialised = origin.origin().ascii_serialization();
        self.origins.iter().any(|allowed| *allowed == serialised)
    }
}

/// Dependency bundle for the WebSocket entry point.
#[derive(Clone)]
pub struct WsState {
    pub hub: BroadcastHub,
    pub origins: OriginAllowList,
}

impl WsState {
    pub fn new(hub: BroadcastHub, origins: OriginAllowList) -> Self {
        Self { hub, origins }
    }
}
