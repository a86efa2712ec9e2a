use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use tracing::{debug, warn};

use crate::config::ReviewConfig;
use crate::error::ApiError;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::models::{CaptureSchedule, DetectionRecord, GpsSample};
use crate::parser::{check_envelope, decode_envelope, parse_gps_log};
use crate::review::filter::RecordFilter;
use crate::services::ReviewApi;

/// Talks to the infrastructure and camera services behind one base URL.
///
/// `api` carries credentials for the backend; GPS logs are fetched through a
/// separate plain client because they live in object storage under absolute
/// URLs.
pub struct RestBackend<C> {
    base_url: Url,
    api: C,
    raw: BasicClient,
}

impl<C: HttpClient> RestBackend<C> {
    pub fn new(base_url: &str, api: C, raw: BasicClient) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base_url}: not a base URL")));
        }
        Ok(Self {
            base_url,
            api,
            raw,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url) -> Result<(StatusCode, Vec<u8>), ApiError> {
        debug!(%method, %url, "Backend request");
        let mut req = reqwest::Request::new(method, url);
        req.headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        let resp = self.api.execute(req).await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        Ok((status, body))
    }
}

impl RestBackend<Box<dyn HttpClient>> {
    /// Builds the backend from configuration, adding bearer auth when a
    /// token is configured.
    pub fn from_config(config: &ReviewConfig) -> anyhow::Result<Self> {
        let base = BasicClient::from_config(config)?;
        let api: Box<dyn HttpClient> = match config.api_token.as_deref() {
            Some(token) => Box::new(ApiKey::bearer(base, token)?),
            None => Box::new(base),
        };
        let raw = BasicClient::from_config(config)?;
        Ok(Self::new(config.api_root(), api, raw)?)
    }
}

#[async_trait]
impl<C: HttpClient> ReviewApi for RestBackend<C> {
    #[tracing::instrument(skip(self, filter), fields(%filter))]
    async fn list_records(
        &self,
        schedule_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<DetectionRecord>, ApiError> {
        let mut url = self.endpoint(&["infrastructures", "process", "schedule"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("scheduleId", schedule_id);
            for (key, value) in filter.query_pairs() {
                query.append_pair(key, value);
            }
        }

        let (status, body) = self.send(Method::GET, url).await?;
        let records: Vec<DetectionRecord> = decode_envelope(status, &body)?;
        debug!(count = records.len(), "Records fetched");
        Ok(records)
    }

    #[tracing::instrument(skip(self))]
    async fn approve(&self, record_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["infrastructures", "process", record_id])?;
        let (status, body) = self.send(Method::POST, url).await?;
        check_envelope(status, &body)
    }

    #[tracing::instrument(skip(self))]
    async fn reject(&self, record_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["infrastructures", "process", "reject", record_id])?;
        let (status, body) = self.send(Method::PATCH, url).await?;
        check_envelope(status, &body)
    }

    #[tracing::instrument(skip(self))]
    async fn process_remaining(&self, schedule_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["infrastructures", "process", "schedule", schedule_id])?;
        let (status, body) = self.send(Method::POST, url).await?;
        check_envelope(status, &body)
    }

    #[tracing::instrument(skip(self))]
    async fn get_schedule(&self, schedule_id: &str) -> Result<CaptureSchedule, ApiError> {
        let url = self.endpoint(&["cameras", "scheduling", schedule_id])?;
        let (status, body) = self.send(Method::GET, url).await?;
        decode_envelope(status, &body)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_gps_track(&self, url: &str) -> Vec<GpsSample> {
        match fetch_bytes(&self.raw, url).await {
            Ok(bytes) => {
                let samples = parse_gps_log(&bytes);
                debug!(samples = samples.len(), "GPS track loaded");
                samples
            }
            Err(e) => {
                warn!(error = %e, "GPS log fetch failed, continuing without track");
                Vec::new()
            }
        }
    }
}
