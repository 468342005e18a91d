//! One-shot fetch of the location endpoint.

use geoecho_app::{LocationEnvelope, LOCATION_PATH};

use crate::display::ViewState;

/// Join a base URL and the location path without doubling the slash.
pub fn location_url(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), LOCATION_PATH)
}

/// Fetch once and settle on a final view state. Failures are never retried.
pub async fn fetch_location(client: &reqwest::Client, base: &str) -> ViewState {
    let url = location_url(base);
    log::debug!("fetching {}", url);

    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(err) => {
            log::warn!("location request to {} failed: {}", url, err);
            return ViewState::Error(format!("request failed: {}", err));
        }
    };

    let status = response.status();
    if !status.is_success() {
        return ViewState::Error(format!("HTTP error! status: {}", status.as_u16()));
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return ViewState::Error(format!("failed to read response: {}", err)),
    };
    match serde_json::from_str::<LocationEnvelope>(&body) {
        Ok(envelope) => ViewState::Loaded(envelope),
        Err(err) => ViewState::Error(format!("invalid location response: {}", err)),
    }
}
