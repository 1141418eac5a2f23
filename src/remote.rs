use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::RemoteError;
use crate::model::Round;

/// How many calls the diagnostic log keeps.
pub const DIAGNOSTIC_CAPACITY: usize = 10;

/// Per-request limit for the http client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Longest a mirrored submit may keep the processing flag held.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(45);

const ANALYSIS_PROMPT: &str =
    "Analyze this golf round data and provide insights on Tiger Five performance: {round_data}";

/// Connection settings for the analytics service.
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub app_id: Option<String>,
    pub usage_key: Option<String>,
}

/// The analytics service as the mirror sees it: json in, json out.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, RemoteError>;
}

pub struct HttpRemote {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl HttpRemote {
    /// # Errors
    ///
    /// Will return `Err` if a credential is not a valid header value
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        let mut insert = |name: HeaderName, value: String| -> Result<(), RemoteError> {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| RemoteError::Parse(format!("bad header {name}: {e}")))?;
            headers.insert(name, value);
            Ok(())
        };
        if let Some(token) = &config.api_token {
            insert(AUTHORIZATION, format!("Bearer {token}"))?;
        }
        if let Some(app_id) = &config.app_id {
            insert(HeaderName::from_static("x-generated-app-id"), app_id.clone())?;
        }
        if let Some(usage_key) = &config.usage_key {
            insert(HeaderName::from_static("x-usage-key"), usage_key.clone())?;
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, RemoteError> {
        let url = format!("{}{endpoint}", self.base_url);
        let mut request = self
            .client
            .request(method, &url)
            .headers(self.headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CallOutcome {
    Response(Value),
    Error(String),
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DiagnosticCallRecord {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub endpoint: String,
    pub request: Option<Value>,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

impl DiagnosticCallRecord {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, CallOutcome::Error(_))
    }
}

/// Ring buffer of the latest remote calls, newest first.
#[derive(Clone, Default)]
pub struct DiagnosticLog {
    entries: Arc<RwLock<VecDeque<DiagnosticCallRecord>>>,
}

impl DiagnosticLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, entry: DiagnosticCallRecord) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(DIAGNOSTIC_CAPACITY);
    }

    pub async fn snapshot(&self) -> Vec<DiagnosticCallRecord> {
        self.entries.read().await.iter().cloned().collect()
    }
}

#[must_use]
pub fn round_object_name(round_id: i64) -> String {
    format!("golf_round_{round_id}")
}

#[must_use]
pub fn analysis_object_name(round_id: i64) -> String {
    format!("analysis_{round_id}")
}

/// Best-effort copy of the round log on the analytics service.
/// Failures end up in the diagnostic log and the tracing output, nowhere else.
#[derive(Clone)]
pub struct RemoteSync {
    service: Arc<dyn RemoteService>,
    diagnostics: DiagnosticLog,
    submit_timeout: Duration,
}

impl RemoteSync {
    #[must_use]
    pub fn new(service: Arc<dyn RemoteService>) -> Self {
        Self {
            service,
            diagnostics: DiagnosticLog::new(),
            submit_timeout: SUBMIT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_submit_timeout(mut self, submit_timeout: Duration) -> Self {
        self.submit_timeout = submit_timeout;
        self
    }

    /// # Errors
    ///
    /// Will return `Err` if the http client cannot be built from `config`
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Ok(Self::new(Arc::new(HttpRemote::new(config)?)))
    }

    pub async fn diagnostics(&self) -> Vec<DiagnosticCallRecord> {
        self.diagnostics.snapshot().await
    }

    async fn call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, RemoteError> {
        let result = self.service.call(method.clone(), endpoint, body.as_ref()).await;
        let outcome = match &result {
            Ok(response) => CallOutcome::Response(response.clone()),
            Err(e) => {
                warn!(%method, endpoint, error = %e, "remote call failed");
                CallOutcome::Error(e.to_string())
            }
        };
        self.diagnostics
            .record(DiagnosticCallRecord {
                timestamp: Utc::now(),
                method: method.to_string(),
                endpoint: endpoint.to_string(),
                request: body,
                outcome,
            })
            .await;
        result
    }

    /// Stores the round remotely, then asks for an analysis of it.
    /// The analysis is only requested once the round itself was stored.
    ///
    /// # Errors
    ///
    /// Will return `Err` with the first failed call
    pub async fn submit_round(&self, round: &Round) -> Result<(), RemoteError> {
        let object_name = round_object_name(round.id());
        let round_json = serde_json::to_string(round)?;
        self.call(
            Method::POST,
            "/input_data",
            Some(json!({
                "created_object_name": object_name,
                "data_type": "strings",
                "input_data": [round_json],
            })),
        )
        .await?;

        info!(round_id = round.id(), "Analyzing performance...");
        self.call(
            Method::POST,
            "/apply_prompt",
            Some(json!({
                "created_object_names": [analysis_object_name(round.id())],
                "prompt_string": ANALYSIS_PROMPT,
                "inputs": [{
                    "object_name": object_name,
                    "processing_mode": "combine_events",
                }],
            })),
        )
        .await?;
        Ok(())
    }

    /// Removes the mirrored round and its analysis. Both deletes are always attempted.
    ///
    /// # Errors
    ///
    /// Will return `Err` with the first failed delete
    pub async fn delete_mirrored(&self, round_id: i64) -> Result<(), RemoteError> {
        let round = self
            .call(
                Method::DELETE,
                &format!("/objects/{}", round_object_name(round_id)),
                None,
            )
            .await;
        let analysis = self
            .call(
                Method::DELETE,
                &format!("/objects/{}", analysis_object_name(round_id)),
                None,
            )
            .await;
        round.and(analysis).map(|_| ())
    }

    /// Deletes every id independently; returns how many failed.
    pub async fn delete_all(&self, round_ids: &[i64]) -> usize {
        let results = join_all(round_ids.iter().map(|&id| self.delete_mirrored(id))).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!(total = round_ids.len(), failed, "mirrored delete finished");
        failed
    }

    /// Fire-and-forget submit. `on_done` is dropped when the task ends, whatever the outcome;
    /// a service that does not answer within the submit timeout is given up on.
    /// Returns `None` (and drops `on_done`) outside a tokio runtime.
    pub fn spawn_submit<G>(&self, round: Round, on_done: G) -> Option<JoinHandle<()>>
    where
        G: Send + 'static,
    {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(round_id = round.id(), "no async runtime, round not mirrored");
            return None;
        };
        let sync = self.clone();
        Some(handle.spawn(async move {
            let _on_done = on_done;
            match tokio::time::timeout(sync.submit_timeout, sync.submit_round(&round)).await {
                Ok(Ok(())) => info!(round_id = round.id(), "Complete!"),
                Ok(Err(e)) => warn!(round_id = round.id(), error = %e, "round not mirrored"),
                Err(_) => warn!(
                    round_id = round.id(),
                    timeout = ?sync.submit_timeout,
                    "round mirror timed out"
                ),
            }
        }))
    }

    /// Fire-and-forget batch delete, started once every task in `after` has ended so a
    /// round still being submitted is stored before it is deleted.
    /// Returns `None` outside a tokio runtime.
    pub fn spawn_delete_all(
        &self,
        round_ids: Vec<i64>,
        after: Vec<JoinHandle<()>>,
    ) -> Option<JoinHandle<()>> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(rounds = round_ids.len(), "no async runtime, mirrored rounds left in place");
            return None;
        };
        let sync = self.clone();
        Some(handle.spawn(async move {
            for earlier in after {
                if let Err(e) = earlier.await {
                    warn!(error = %e, "mirror task did not finish");
                }
            }
            sync.delete_all(&round_ids).await;
        }))
    }
}
