//! Best-effort scheduler diagnostics.
//!
//! After every handled stream message the client pulls the monitor's
//! `/api/diagnostics` endpoint. A failed pull is logged at debug level
//! and otherwise invisible: the previously displayed diagnostics stay
//! in place and nothing else is interrupted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use latchview_types::SchedulerDiagnostics;

use crate::error::{Error, Result};
use crate::store::StateStore;
use crate::updates::{DashboardUpdate, UpdateSender};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of scheduler diagnostics.
///
/// `Ok(None)` means the endpoint answered but carried no scheduler
/// record; the caller treats it the same as a failure (keep the last
/// known value).
#[async_trait]
pub trait DiagnosticsSource: Send + Sync {
    /// Fetch the current scheduler diagnostics.
    async fn fetch(&self) -> Result<Option<SchedulerDiagnostics>>;
}

/// Wire shape of the diagnostics endpoint.
#[derive(Debug, Deserialize)]
struct DiagnosticsResponse {
    #[serde(default)]
    scheduler: Option<SchedulerDiagnostics>,
}

/// [`DiagnosticsSource`] backed by the monitor's HTTP endpoint.
pub struct HttpDiagnosticsSource {
    url: String,
    client: reqwest::Client,
}

impl HttpDiagnosticsSource {
    /// Create a source for the given diagnostics URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::invalid_config(format!(
                "diagnostics URL must start with http:// or https://, got: {url}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::diagnostics)?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl DiagnosticsSource for HttpDiagnosticsSource {
    async fn fetch(&self) -> Result<Option<SchedulerDiagnostics>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(Error::diagnostics)?
            .error_for_status()
            .map_err(Error::diagnostics)?;

        let body: DiagnosticsResponse = response.json().await.map_err(Error::diagnostics)?;
        Ok(body.scheduler)
    }
}

/// Pulls diagnostics and applies them to the shared store.
#[derive(Clone)]
pub(crate) struct DiagnosticsPoller {
    source: Arc<dyn DiagnosticsSource>,
    store: Arc<RwLock<StateStore>>,
    updates: UpdateSender,
    cancel: CancellationToken,
}

impl DiagnosticsPoller {
    pub(crate) fn new(
        source: Arc<dyn DiagnosticsSource>,
        store: Arc<RwLock<StateStore>>,
        updates: UpdateSender,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            store,
            updates,
            cancel,
        }
    }

    /// One best-effort pull. Never fails.
    pub(crate) async fn pull(&self) {
        let diagnostics = match self.source.fetch().await {
            Ok(Some(diagnostics)) => diagnostics,
            Ok(None) => {
                debug!("diagnostics response had no scheduler record");
                return;
            }
            Err(err) => {
                debug!(error = %err, "diagnostics pull failed");
                return;
            }
        };

        let view = {
            let mut store = self.store.write().await;
            // Checked under the store lock: a pull that completes
            // after stop() must not mutate anything.
            if self.cancel.is_cancelled() {
                return;
            }
            store.apply_diagnostics(diagnostics);
            store.view()
        };
        let _ = self.updates.send(DashboardUpdate::Diagnostics { view });
    }

    /// Fire a pull on its own task so a slow endpoint never stalls the
    /// stream loop.
    pub(crate) fn spawn_pull(&self) {
        let poller = self.clone();
        tokio::spawn(async move {
            poller.pull().await;
        });
    }
}
