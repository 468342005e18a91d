//! Terminal rendering of the location envelope.

use std::fmt;

use geoecho_app::LocationEnvelope;
use geoecho_core::metadata::ConnectionMetadata;

use crate::args::Format;

const MISSING: &str = "N/A";

/// What the client currently has to show.
#[derive(Debug)]
pub enum ViewState {
    Loading,
    Error(String),
    Loaded(LocationEnvelope),
}

impl ViewState {
    pub fn render(&self, format: Format) -> String {
        match self {
            ViewState::Loading => "Loading...".to_string(),
            ViewState::Error(message) => format!("Error: {}", message),
            ViewState::Loaded(envelope) => match format {
                Format::Json => serde_json::to_string_pretty(envelope)
                    .unwrap_or_else(|err| format!("Error: {}", err)),
                Format::Card => LocationCard::from_metadata(&envelope.data).to_string(),
            },
        }
    }
}

/// The six fields the card layout shows; each falls back to `N/A`.
#[derive(Debug, PartialEq, Eq)]
pub struct LocationCard {
    pub ip_address: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub coordinates: String,
    pub timezone: String,
}

impl LocationCard {
    pub fn from_metadata(data: &ConnectionMetadata) -> Self {
        let coordinates = match (&data.latitude, &data.longitude) {
            (Some(latitude), Some(longitude)) => format!("{}, {}", latitude, longitude),
            _ => MISSING.to_string(),
        };
        Self {
            ip_address: or_missing(&data.client_ip),
            country: or_missing(&data.country),
            city: or_missing(&data.city),
            region: or_missing(&data.region),
            coordinates,
            timezone: or_missing(&data.timezone),
        }
    }
}

impl fmt::Display for LocationCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("IP Address", &self.ip_address),
            ("Country", &self.country),
            ("City", &self.city),
            ("Region", &self.region),
            ("Coordinates", &self.coordinates),
            ("Timezone", &self.timezone),
        ];
        writeln!(f, "Your Location Information")?;
        for (label, value) in rows {
            writeln!(f, "  {:<12} {}", label, value)?;
        }
        Ok(())
    }
}

fn or_missing(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}
