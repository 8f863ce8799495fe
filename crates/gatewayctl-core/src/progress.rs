//! Progress tracking for long-running operations
//!
//! A create-or-update on the resource manager may return before the change is
//! applied, handing back an operation URL to poll. This module polls such an
//! operation until it reaches a terminal state, with an optional progress
//! callback for UI updates.

use crate::store::ApiError;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Progress events emitted while polling
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Operation accepted, polling begins
    Started { operation_url: String },
    /// One polling iteration
    Polling {
        operation_url: String,
        status: String,
        elapsed: Duration,
    },
    /// Operation succeeded
    Completed { operation_url: String },
    /// Operation failed or was cancelled
    Failed { operation_url: String, error: String },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Status of a long-running operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress(String),
    Succeeded,
    Failed { status: String, message: String },
}

impl OperationStatus {
    /// Interpret a status string (case-insensitive)
    #[must_use]
    pub fn from_status(status: &str, error_message: Option<String>) -> Self {
        match status.to_lowercase().as_str() {
            "succeeded" => OperationStatus::Succeeded,
            "failed" | "canceled" | "cancelled" => OperationStatus::Failed {
                status: status.to_string(),
                message: error_message
                    .unwrap_or_else(|| format!("Operation finished with status: {status}")),
            },
            _ => OperationStatus::InProgress(status.to_string()),
        }
    }
}

/// Poll an operation until it succeeds, fails or `timeout` passes
///
/// `check` is called once per iteration and reports the current status.
///
/// # Example
///
/// ```rust,ignore
/// poll_operation(
///     &operation_url,
///     Duration::from_secs(1800),
///     Duration::from_secs(10),
///     self.on_progress.as_ref(),
///     || self.operation_status(&operation_url),
/// )
/// .await?;
/// ```
pub async fn poll_operation<F, Fut>(
    operation_url: &str,
    timeout: Duration,
    interval: Duration,
    on_progress: Option<&ProgressCallback>,
    mut check: F,
) -> Result<(), ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<OperationStatus, ApiError>>,
{
    let start = Instant::now();

    emit(
        on_progress,
        ProgressEvent::Started {
            operation_url: operation_url.to_string(),
        },
    );

    loop {
        let elapsed = start.elapsed();
        let Some(remaining) = timeout.checked_sub(elapsed) else {
            return Err(timed_out(operation_url, timeout, on_progress));
        };

        // A status request that never answers must not outlive the deadline
        let status = match tokio::time::timeout(remaining, check()).await {
            Ok(status) => status?,
            Err(_) => return Err(timed_out(operation_url, timeout, on_progress)),
        };

        match status {
            OperationStatus::Succeeded => {
                debug!(operation_url, ?elapsed, "Operation succeeded");
                emit(
                    on_progress,
                    ProgressEvent::Completed {
                        operation_url: operation_url.to_string(),
                    },
                );
                return Ok(());
            }
            OperationStatus::Failed { status, message } => {
                emit(
                    on_progress,
                    ProgressEvent::Failed {
                        operation_url: operation_url.to_string(),
                        error: message.clone(),
                    },
                );
                return Err(ApiError::OperationFailed { status, message });
            }
            OperationStatus::InProgress(status) => {
                debug!(operation_url, %status, ?elapsed, "Operation in progress");
                emit(
                    on_progress,
                    ProgressEvent::Polling {
                        operation_url: operation_url.to_string(),
                        status,
                        elapsed,
                    },
                );
                let left = timeout.saturating_sub(start.elapsed());
                tokio::time::sleep(interval.min(left)).await;
            }
        }
    }
}

fn timed_out(
    operation_url: &str,
    timeout: Duration,
    on_progress: Option<&ProgressCallback>,
) -> ApiError {
    emit(
        on_progress,
        ProgressEvent::Failed {
            operation_url: operation_url.to_string(),
            error: "timed out".to_string(),
        },
    );
    ApiError::OperationTimeout(timeout)
}

fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
