mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::ApiError;

/// Performs a bare GET and returns the body bytes.
///
/// Non-2xx answers are reported as [`ApiError::Rejected`] with the body text
/// as message.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>, ApiError> {
    let parsed = url
        .parse()
        .map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(ApiError::Rejected { status, message });
    }
    Ok(resp.bytes().await?.to_vec())
}
