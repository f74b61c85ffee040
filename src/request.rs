use reqwest::Client;
use tracing::{error, info};

use crate::MAX_ATTEMPTS;

/// Requests a page and returns the response body, retrying on failure.
///
/// A connection error, a timeout, a body-read error, or an HTTP error status
/// each consume one of [`MAX_ATTEMPTS`] attempts. Returns `None` once all
/// attempts are spent; never returns an error.
pub(crate) async fn send(client: &Client, url: &str) -> Option<String> {
    for attempt in 1..=MAX_ATTEMPTS {
        match request_page_html(client, url).await {
            Ok(html) => return Some(html),
            Err(err) => {
                error!("An error occurred while requesting {url}: {err}");
                if attempt < MAX_ATTEMPTS {
                    info!("Retrying... (Attempt {} of {MAX_ATTEMPTS})", attempt + 1);
                }
            }
        }
    }
    error!("Failed to send request after {MAX_ATTEMPTS} attempts.");
    None
}

/// One GET attempt; the timeout comes from the shared client.
async fn request_page_html(client: &Client, url: &str) -> reqwest::Result<String> {
    let res = client.get(url).send().await?.error_for_status()?;
    let html = res.text().await?;
    Ok(html)
}
