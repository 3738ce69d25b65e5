//! Print and override-password routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use sticker_core::{PrintMode, PrintRequest};
use sticker_print::{PrintOutcome, PrintService};

use crate::error::ApiResult;
use crate::AppState;

// =============================================================================
// POST /api/send
// =============================================================================

/// Body of `POST /api/send`.
///
/// Indices are accepted as numbers or digit strings; anything else reads as
/// missing and is rejected by validation with "Indices required". The
/// datecode may come as a number (`2503`) or a string (`"2503"`).
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(deserialize_with = "lenient_index")]
    pub start_index: Option<i64>,

    #[serde(deserialize_with = "lenient_index")]
    pub end_index: Option<i64>,

    #[serde(rename = "override")]
    pub override_requested: bool,

    #[serde(deserialize_with = "lenient_datecode")]
    pub datecode: Option<String>,

    pub password: Option<String>,

    pub confirmed: bool,
}

fn lenient_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_datecode<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        // Numbers lose leading zeros: 503 is week 03 of 2005.
        Some(Value::Number(n)) => Some(match n.as_u64() {
            Some(v) => format!("{:04}", v),
            None => n.to_string(),
        }),
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

impl From<SendRequest> for PrintRequest {
    fn from(body: SendRequest) -> Self {
        PrintRequest {
            start_index: body.start_index,
            end_index: body.end_index,
            override_requested: body.override_requested,
            datecode: body.datecode,
            password: body.password,
            confirmed: body.confirmed,
        }
    }
}

/// Body of a successful print.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub first: String,
    pub last: String,
    pub copies: u32,
    pub datecode: String,
    pub first_label: String,
    pub reprint: bool,
    pub newly_recorded: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<PrintOutcome> for SendResponse {
    fn from(outcome: PrintOutcome) -> Self {
        SendResponse {
            first: outcome.range.first().to_string(),
            last: outcome.range.last().to_string(),
            copies: outcome.range.copies(),
            datecode: outcome.datecode.to_string(),
            first_label: outcome.first_label,
            reprint: outcome.mode == PrintMode::Override,
            newly_recorded: outcome.newly_recorded,
            warning: outcome.metadata_warning,
        }
    }
}

pub(super) async fn send<P>(
    State(state): State<AppState<P>>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> ApiResult<Json<SendResponse>>
where
    P: PrintService + 'static,
{
    let Json(body) = payload?;
    let request = PrintRequest::from(body);
    let outcome = state.orchestrator().execute(&request).await?;
    Ok(Json(outcome.into()))
}

// =============================================================================
// POST /api/password
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResponse {
    pub successful_password: bool,
}

/// Lets the UI check the password before it resends with `override`.
/// `/api/send` checks it again.
pub(super) async fn password<P>(
    State(state): State<AppState<P>>,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> ApiResult<Json<PasswordResponse>>
where
    P: PrintService + 'static,
{
    let Json(body) = payload?;
    let successful_password = state.orchestrator().authorizer().verify(&body.password);
    if !successful_password {
        info!("Override password rejected");
    }
    Ok(Json(PasswordResponse {
        successful_password,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    use crate::routes::test_support::{api, app, state, PASSWORD};

    #[test]
    fn test_lenient_indices() {
        let body: SendRequest =
            serde_json::from_value(json!({"startIndex": "100", "endIndex": 150})).unwrap();
        assert_eq!(body.start_index, Some(100));
        assert_eq!(body.end_index, Some(150));

        let body: SendRequest =
            serde_json::from_value(json!({"startIndex": "abc", "endIndex": null})).unwrap();
        assert_eq!(body.start_index, None);
        assert_eq!(body.end_index, None);
        assert!(!body.override_requested);
    }

    #[test]
    fn test_numeric_datecode() {
        let body: SendRequest = serde_json::from_value(json!({"datecode": 2448})).unwrap();
        assert_eq!(body.datecode.as_deref(), Some("2448"));

        let body: SendRequest = serde_json::from_value(json!({"datecode": 503})).unwrap();
        assert_eq!(body.datecode.as_deref(), Some("0503"));

        let body: SendRequest = serde_json::from_value(json!({"datecode": "25ab"})).unwrap();
        assert_eq!(body.datecode.as_deref(), Some("25ab"));
    }

    #[tokio::test]
    async fn test_send_prints_and_records() {
        let state = state().await;
        let app = app(&state);

        let (status, body) = api(
            &app,
            Method::POST,
            "/api/send",
            Some(json!({"startIndex": 1, "endIndex": 50})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["first"], "00001");
        assert_eq!(body["last"], "00050");
        assert_eq!(body["copies"], 50);
        assert_eq!(body["datecode"], "2503");
        assert_eq!(body["firstLabel"], "APBUAESA250300001");
        assert_eq!(body["newlyRecorded"], 50);
        assert!(body.get("warning").is_none());

        let (_, max) = api(&app, Method::GET, "/api/max", None).await;
        assert_eq!(max, json!({"max": 50}));
    }

    #[tokio::test]
    async fn test_send_missing_indices() {
        let state = state().await;
        let (status, body) = api(&app(&state), Method::POST, "/api/send", Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["err"], "Indices required");
        assert_eq!(body["code"], "INPUT");
        assert!(state.orchestrator().printer().jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_overlap_then_override() {
        let state = state().await;
        let app = app(&state);

        // An empty history accepts any starting index.
        api(&app, Method::POST, "/api/send", Some(json!({"startIndex": 100, "endIndex": 105}))).await;
        let (status, body) = api(
            &app,
            Method::POST,
            "/api/send",
            Some(json!({"startIndex": 103, "endIndex": 110})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["err"], "Serials already printed: 00103 - 00105");
        assert_eq!(body["overridable"], true);

        let (status, body) = api(
            &app,
            Method::POST,
            "/api/send",
            Some(json!({
                "startIndex": 103,
                "endIndex": 110,
                "override": true,
                "password": PASSWORD,
                "datecode": "2448"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reprint"], true);
        assert_eq!(body["newlyRecorded"], 5);
        assert_eq!(body["firstLabel"], "APBUAESA244800103");
    }

    #[tokio::test]
    async fn test_send_override_wrong_password() {
        let state = state().await;
        let (status, body) = api(
            &app(&state),
            Method::POST,
            "/api/send",
            Some(json!({"startIndex": 1, "endIndex": 2, "override": true, "password": "guess"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_send_large_batch_needs_confirmation() {
        let state = state().await;
        let app = app(&state);

        let request = json!({"startIndex": 1, "endIndex": 150});
        let (status, body) = api(&app, Method::POST, "/api/send", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["needsConfirmation"], true);

        let confirmed = json!({"startIndex": 1, "endIndex": 150, "confirmed": true});
        let (status, body) = api(&app, Method::POST, "/api/send", Some(confirmed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["copies"], 150);
    }

    #[tokio::test]
    async fn test_send_print_failure_records_nothing() {
        let state = state().await;
        state.orchestrator().printer().fail.store(true, Ordering::SeqCst);

        let (status, body) = api(
            &app(&state),
            Method::POST,
            "/api/send",
            Some(json!({"startIndex": 1, "endIndex": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "PRINT_SERVICE");
        assert!(body["err"]
            .as_str()
            .unwrap()
            .starts_with("Could not reach the print service"));
        assert_eq!(state.db().serials().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_password_check() {
        let state = state().await;
        let app = app(&state);

        let (status, body) =
            api(&app, Method::POST, "/api/password", Some(json!({"password": PASSWORD}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"successfulPassword": true}));

        let (_, body) =
            api(&app, Method::POST, "/api/password", Some(json!({"password": "nope"}))).await;
        assert_eq!(body, json!({"successfulPassword": false}));
    }

    #[tokio::test]
    async fn test_malformed_bodies_answer_with_json_errors() {
        let state = state().await;
        let app = app(&state);

        let (status, body) = api(
            &app,
            Method::POST,
            "/api/send",
            Some(json!({"startIndex": 1, "endIndex": 2, "override": "yes"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INPUT");
        assert!(body["err"].as_str().unwrap().starts_with("Invalid request body"));
        assert!(state.orchestrator().printer().jobs.lock().unwrap().is_empty());

        let (status, body) =
            api(&app, Method::POST, "/api/password", Some(json!({"password": 1234}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INPUT");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_json_error() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let state = state().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/send")
            .body(Body::from(r#"{"startIndex":1,"endIndex":2}"#))
            .unwrap();

        let response = app(&state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "INPUT");
        assert!(body["err"].as_str().unwrap().contains("Content-Type"));
    }
}
