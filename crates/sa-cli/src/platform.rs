//! Hosting-platform envelopes around one save operation.
//!
//! Each adapter translates its platform's request/response shape; the save
//! itself (parse `{filename, csv}`, pick a name, upload) is shared.

use axum::http::{Method, StatusCode};
use sa_core::naming::default_result_name;
use sa_core::time::now_unix_millis;
use sa_store::{FileRef, UploadError, Uploader};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const SUCCESS_MESSAGE: &str = "Result saved successfully!";
pub const FAILURE_MESSAGE: &str = "Failed to save result.";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body.";
pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

/// Body posted by the experiment page when a session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePayload {
    #[serde(default)]
    pub filename: Option<String>,
    pub csv: String,
}

#[derive(Debug)]
pub enum SaveOutcome {
    Saved(FileRef),
    BadRequest(String),
    Failed(UploadError),
}

/// Parse the body and upload it, falling back to a timestamped name.
pub async fn save<U: Uploader>(uploader: &U, body: &str) -> SaveOutcome {
    let payload: SavePayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("rejected save request: {e}");
            return SaveOutcome::BadRequest(e.to_string());
        }
    };
    let filename = payload
        .filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| default_result_name(now_unix_millis()));

    match uploader.upload(&filename, &payload.csv).await {
        Ok(file) => SaveOutcome::Saved(file),
        Err(e) => {
            tracing::error!("Error saving {filename}: {e}");
            SaveOutcome::Failed(e)
        }
    }
}

fn bad_request(details: String) -> (StatusCode, Value) {
    (
        StatusCode::BAD_REQUEST,
        json!({ "error": INVALID_BODY_MESSAGE, "details": details }),
    )
}

fn failed(e: &UploadError) -> (StatusCode, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": FAILURE_MESSAGE, "details": e.to_string() }),
    )
}

/// Plain JSON request/response handler that only accepts POST.
pub async fn vercel_handler<U: Uploader>(
    uploader: &U,
    method: &Method,
    body: &str,
) -> (StatusCode, Value) {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "error": METHOD_NOT_ALLOWED }),
        );
    }
    match save(uploader, body).await {
        SaveOutcome::Saved(_) => (StatusCode::OK, json!({ "message": SUCCESS_MESSAGE })),
        SaveOutcome::BadRequest(details) => bad_request(details),
        SaveOutcome::Failed(e) => failed(&e),
    }
}

/// Function event: method plus the raw body string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetlifyEvent {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Function result: status code plus a pre-serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetlifyResponse {
    pub status_code: u16,
    pub body: String,
}

impl NetlifyResponse {
    fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status_code: status.as_u16(),
            body: body.to_string(),
        }
    }
}

/// Event-style handler; the success body also describes the stored file.
pub async fn netlify_handler<U: Uploader>(uploader: &U, event: NetlifyEvent) -> NetlifyResponse {
    if !event.http_method.eq_ignore_ascii_case("POST") {
        return NetlifyResponse {
            status_code: StatusCode::METHOD_NOT_ALLOWED.as_u16(),
            body: METHOD_NOT_ALLOWED.to_string(),
        };
    }
    let body = event.body.unwrap_or_default();
    match save(uploader, &body).await {
        SaveOutcome::Saved(file) => NetlifyResponse::json(
            StatusCode::OK,
            &json!({
                "message": SUCCESS_MESSAGE,
                "id": file.id,
                "name": file.name,
                "folderId": file.folder_id,
            }),
        ),
        SaveOutcome::BadRequest(details) => {
            let (status, body) = bad_request(details);
            NetlifyResponse::json(status, &body)
        }
        SaveOutcome::Failed(e) => {
            let (status, body) = failed(&e);
            NetlifyResponse::json(status, &body)
        }
    }
}

/// Pages-function handler: any method, JSON in and out.
pub async fn cloudflare_on_request<U: Uploader>(uploader: &U, body: &str) -> (StatusCode, Value) {
    match save(uploader, body).await {
        SaveOutcome::Saved(_) => (StatusCode::OK, json!({ "message": SUCCESS_MESSAGE })),
        SaveOutcome::BadRequest(details) => bad_request(details),
        SaveOutcome::Failed(e) => failed(&e),
    }
}
