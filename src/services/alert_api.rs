use std::future::Future;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    config::Settings,
    error::AlertError,
    models::{
        AlertId, AlertPatch, AlertRecord, Envelope, NewAlert,
        alert::{WireAlert, normalize_all},
    },
};

/// CRUD over the remote alert collection. Every call is attempted exactly
/// once; callers own any caching and resync.
pub trait AlertStore {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<AlertRecord>, AlertError>> + Send;

    fn create(
        &self,
        draft: &NewAlert,
    ) -> impl Future<Output = Result<AlertRecord, AlertError>> + Send;

    /// Returns the stored record when the service echoes it back.
    fn update(
        &self,
        id: &AlertId,
        patch: &AlertPatch,
    ) -> impl Future<Output = Result<Option<AlertRecord>, AlertError>> + Send;

    fn delete(&self, id: &AlertId) -> impl Future<Output = Result<(), AlertError>> + Send;
}

#[derive(Clone, Debug)]
pub struct AlertApiClient {
    http: Client,
    base_url: Url,
}

impl AlertApiClient {
    pub fn new(settings: &Settings) -> Result<Self, AlertError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| AlertError::Transport(e.to_string()))?;
        Self::with_client(http, &settings.api_base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, AlertError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| AlertError::Transport(format!("invalid base url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AlertError::Transport(format!(
                "invalid base url {base_url:?}"
            )));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AlertError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AlertError::Transport("base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

// Reads the body as an envelope whatever the HTTP status was; the service
// reports most failures through `statusCode` and `message`.
async fn read_envelope<T: DeserializeOwned>(res: Response) -> Result<Envelope<T>, AlertError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| AlertError::Transport(e.to_string()))?;

    match serde_json::from_str::<Envelope<T>>(&body) {
        Ok(env) => Ok(env),
        Err(e) if status.is_success() => Err(AlertError::Transport(format!(
            "invalid response body: {e}"
        ))),
        Err(_) => Err(AlertError::Application {
            status: i64::from(status.as_u16()),
            message: Some(if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            }),
        }),
    }
}

fn transport(e: reqwest::Error) -> AlertError {
    AlertError::Transport(e.to_string())
}

impl AlertStore for AlertApiClient {
    // GET /stocks/alert/get-all
    async fn fetch_all(&self) -> Result<Vec<AlertRecord>, AlertError> {
        let url = self.endpoint(&["stocks", "alert", "get-all"])?;
        tracing::debug!("GET {}", url);

        let res = self.http.get(url).send().await.map_err(transport)?;
        let items: Vec<WireAlert> = read_envelope(res).await?.into_result()?.unwrap_or_default();

        let alerts = normalize_all(items);
        tracing::info!("fetched {} alerts", alerts.len());
        Ok(alerts)
    }

    // POST /stocks/alert/create
    async fn create(&self, draft: &NewAlert) -> Result<AlertRecord, AlertError> {
        let url = self.endpoint(&["stocks", "alert", "create"])?;
        tracing::debug!("POST {} {:?}", url, draft);

        let res = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(draft)
            .send()
            .await
            .map_err(transport)?;

        let wire: WireAlert = read_envelope(res)
            .await?
            .into_result()?
            .ok_or_else(|| AlertError::Transport("create response has no data".to_string()))?;

        let created = AlertRecord::try_from(wire)
            .map_err(|e| AlertError::Transport(format!("create response: {e}")))?;
        tracing::info!("created alert {} for {}", created.id, created.instrument);
        Ok(created)
    }

    // PUT /stocks/alert/update/:id
    async fn update(
        &self,
        id: &AlertId,
        patch: &AlertPatch,
    ) -> Result<Option<AlertRecord>, AlertError> {
        let url = self.endpoint(&["stocks", "alert", "update", id.as_str()])?;
        tracing::debug!("PUT {} {:?}", url, patch);

        let res = self.http.put(url).json(patch).send().await.map_err(transport)?;
        let data: Option<WireAlert> = read_envelope(res).await?.into_result()?;

        tracing::info!("updated alert {}", id);
        Ok(data.and_then(|w| AlertRecord::try_from(w).ok()))
    }

    // DELETE /stocks/alert/delete/:id
    async fn delete(&self, id: &AlertId) -> Result<(), AlertError> {
        let url = self.endpoint(&["stocks", "alert", "delete", id.as_str()])?;
        tracing::debug!("DELETE {}", url);

        let res = self.http.delete(url).send().await.map_err(transport)?;
        read_envelope::<serde_json::Value>(res).await?.into_result()?;

        tracing::info!("deleted alert {}", id);
        Ok(())
    }
}
