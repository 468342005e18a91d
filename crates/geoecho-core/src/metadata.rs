//! Per-request connection metadata supplied by the hosting edge.
//!
//! Adapters build a [`ConnectionMetadata`] for every inbound request and attach it to the core
//! request's extensions; handlers read it back through
//! [`RequestContext::metadata`](crate::context::RequestContext::metadata).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::Request;

/// Geographic and network context for the client of a single request.
///
/// The well-known keys are typed; anything else the platform reports is kept verbatim in
/// [`extra`](Self::extra) so the record serialises back to the same shape it arrived in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConnectionMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an additional platform field. `None` values are skipped.
    pub fn with_extra<V>(mut self, key: impl Into<String>, value: Option<V>) -> Self
    where
        V: Into<Value>,
    {
        if let Some(value) = value {
            self.extra.insert(key.into(), value.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn insert(request: &mut Request, metadata: ConnectionMetadata) {
        request.extensions_mut().insert(metadata);
    }

    pub fn get(request: &Request) -> Option<&ConnectionMetadata> {
        request.extensions().get::<ConnectionMetadata>()
    }
}
