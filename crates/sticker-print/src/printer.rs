//! # Print Service
//!
//! The label print service is an Integration Builder web service integration.
//! One HTTP call prints a run of consecutive labels:
//!
//! ```text
//! POST /Integration/WebServiceIntegration/Execute
//! {"SerialNumber": "APBUAESA250300100", "Copies": 51}
//!
//! 200 OK
//! {"Status": "RanToCompletion", ...}
//! ```
//!
//! The service increments the serial itself for each copy. Any status other
//! than `RanToCompletion` means the job failed.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::PrintServiceError;

/// Status reported by the service for a completed job.
pub const COMPLETED_STATUS: &str = "RanToCompletion";

/// One print job: first fully qualified serial and a label count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintJob {
    #[serde(rename = "SerialNumber")]
    pub serial_number: String,

    #[serde(rename = "Copies")]
    pub copies: u32,
}

/// Something that prints labels.
pub trait PrintService: Send + Sync {
    /// Prints the job. `Ok` only when the service confirmed completion.
    fn print(&self, job: &PrintJob) -> impl Future<Output = Result<(), PrintServiceError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(rename = "Status", default)]
    status: Option<String>,
}

// =============================================================================
// Integration Client
// =============================================================================

/// HTTP client for the print service.
#[derive(Debug, Clone)]
pub struct IntegrationClient {
    http: reqwest::Client,
    url: Url,
}

impl IntegrationClient {
    /// Creates a client for `url`. Every call is bounded by `timeout`.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, PrintServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PrintServiceError::Setup(e.to_string()))?;

        Ok(IntegrationClient { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl PrintService for IntegrationClient {
    async fn print(&self, job: &PrintJob) -> Result<(), PrintServiceError> {
        debug!(
            url = %self.url,
            serial = %job.serial_number,
            copies = job.copies,
            "Sending print job"
        );

        let response = self.http.post(self.url.clone()).json(job).send().await?;

        let http_status = response.status();
        if !http_status.is_success() {
            warn!(status = %http_status, "Print service returned HTTP error");
            return Err(PrintServiceError::Unreachable(format!(
                "HTTP {}",
                http_status
            )));
        }

        let body: ExecuteResponse = response.json().await?;

        match body.status.as_deref() {
            Some(COMPLETED_STATUS) => Ok(()),
            other => {
                let status = other.unwrap_or("missing").to_string();
                warn!(status = %status, "Print service reported failure");
                Err(PrintServiceError::Rejected { status })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!(
            "http://{}/Integration/WebServiceIntegration/Execute",
            addr
        ))
        .unwrap()
    }

    fn job() -> PrintJob {
        PrintJob {
            serial_number: "APBUAESA250300100".to_string(),
            copies: 5,
        }
    }

    #[test]
    fn test_job_wire_format() {
        let json = serde_json::to_value(job()).unwrap();
        assert_eq!(
            json,
            json!({"SerialNumber": "APBUAESA250300100", "Copies": 5})
        );
    }

    #[tokio::test]
    async fn test_completed_job() {
        let app = Router::new().route(
            "/Integration/WebServiceIntegration/Execute",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["SerialNumber"], "APBUAESA250300100");
                assert_eq!(body["Copies"], 5);
                Json(json!({"Status": "RanToCompletion", "Version": "1.0"}))
            }),
        );
        let url = serve(app).await;

        let client = IntegrationClient::new(url, Duration::from_secs(5)).unwrap();
        client.print(&job()).await.unwrap();
    }

    #[tokio::test]
    async fn test_faulted_job() {
        let app = Router::new().route(
            "/Integration/WebServiceIntegration/Execute",
            post(|| async { Json(json!({"Status": "Faulted"})) }),
        );
        let url = serve(app).await;

        let client = IntegrationClient::new(url, Duration::from_secs(5)).unwrap();
        let err = client.print(&job()).await.unwrap_err();
        assert!(matches!(err, PrintServiceError::Rejected { status } if status == "Faulted"));
    }

    #[tokio::test]
    async fn test_http_error_is_unreachable() {
        let app = Router::new().route(
            "/Integration/WebServiceIntegration/Execute",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let url = serve(app).await;

        let client = IntegrationClient::new(url, Duration::from_secs(5)).unwrap();
        let err = client.print(&job()).await.unwrap_err();
        assert!(matches!(err, PrintServiceError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            "/Integration/WebServiceIntegration/Execute",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"Status": "RanToCompletion"}))
            }),
        );
        let url = serve(app).await;

        let client = IntegrationClient::new(url, Duration::from_millis(100)).unwrap();
        let err = client.print(&job()).await.unwrap_err();
        assert!(matches!(err, PrintServiceError::Unreachable(_)));
        assert!(err.to_string().starts_with("Could not reach the print service"));
    }

    #[tokio::test]
    async fn test_nothing_listening() {
        // Bind then drop to get a port with no listener.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/Execute", addr)).unwrap();
        let client = IntegrationClient::new(url, Duration::from_secs(1)).unwrap();
        let err = client.print(&job()).await.unwrap_err();
        assert!(matches!(err, PrintServiceError::Unreachable(_)));
    }
}
