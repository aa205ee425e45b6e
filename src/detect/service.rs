//! Analysis Service for running the region detector off the request path.
//!
//! Decoding and contour extraction are CPU-bound. The service:
//! - Resolves image bytes through the [`ImageSource`]
//! - Bounds concurrent jobs with a semaphore
//! - Runs the detector on tokio's blocking pool
//! - Fails with [`AnalysisError::Timeout`] when the wall-clock budget is exceeded
//!
//! A timed-out job keeps running to completion in the background and holds
//! its permit until then, so the concurrency bound stays accurate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::source::ImageSource;

use super::detector::{Detection, RegionDetector};

/// Default number of concurrent detection jobs.
pub const DEFAULT_ANALYSIS_WORKERS: usize = 4;

/// Default wall-clock budget for decode + detect.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs [`RegionDetector`] jobs against images from a source.
pub struct AnalysisService<S: ImageSource> {
    source: Arc<S>,
    detector: Arc<RegionDetector>,
    permits: Arc<Semaphore>,
    workers: usize,
    timeout: Duration,
}

impl<S: ImageSource> AnalysisService<S> {
    /// Create a service with default worker count and timeout.
    pub fn new(source: Arc<S>, detector: RegionDetector) -> Self {
        Self {
            source,
            detector: Arc::new(detector),
            permits: Arc::new(Semaphore::new(DEFAULT_ANALYSIS_WORKERS)),
            workers: DEFAULT_ANALYSIS_WORKERS,
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    /// Set the maximum number of concurrent detection jobs (at least 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        let workers = workers.max(1);
        self.permits = Arc::new(Semaphore::new(workers));
        self.workers = workers;
        self
    }

    /// Set the wall-clock budget for decode + detect.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum number of concurrent detection jobs.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Wall-clock budget for decode + detect.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The detector used for every job.
    pub fn detector(&self) -> &RegionDetector {
        &self.detector
    }

    /// Analyse the image named `image_id`.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::ImageNotFound`] / [`AnalysisError::InvalidIdentifier`] from the source
    /// - [`AnalysisError::DecodeFailure`] when the bytes are not a raster
    /// - [`AnalysisError::Timeout`] when the budget is exceeded
    /// - [`AnalysisError::Worker`] if the blocking job panics
    pub async fn analyze(&self, image_id: &str) -> Result<Detection, AnalysisError> {
        let bytes = self.source.read_image(image_id).await?;

        let started = Instant::now();
        let detector = Arc::clone(&self.detector);
        let permits = Arc::clone(&self.permits);

        let job = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|e| AnalysisError::Worker {
                    message: e.to_string(),
                })?;

            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                detector.detect(&bytes)
            })
            .await
            .map_err(|e| AnalysisError::Worker {
                message: e.to_string(),
            })?
        };

        match tokio::time::timeout(self.timeout, job).await {
            Ok(result) => {
                debug!(
                    image_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Analysis finished"
                );
                result
            }
            Err(_) => {
                warn!(
                    image_id,
                    budget_ms = self.timeout.as_millis() as u64,
                    "Analysis timed out"
                );
                Err(AnalysisError::Timeout {
                    budget: self.timeout,
                })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
