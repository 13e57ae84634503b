//! Google Drive backend.
//!
//! Authenticates as a service account: a signed RS256 JWT is exchanged for an
//! OAuth2 access token, which is cached until shortly before it expires. Files
//! are created with a single `multipart/related` upload.

use std::fmt;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use sa_core::time::now_unix_millis;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{FileRef, Uploader};
use crate::error::{Result, UploadError};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: u64 = 3600;
const REFRESH_MARGIN_SECS: u64 = 60;

/// Service-account credentials and the target folder.
#[derive(Clone)]
pub struct DriveCredentials {
    pub client_email: String,
    pub private_key: String,
    pub folder_id: String,
}

impl fmt::Debug for DriveCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("folder_id", &self.folder_id)
            .finish()
    }
}

impl DriveCredentials {
    /// Read `GOOGLE_CLIENT_EMAIL`, `GOOGLE_PRIVATE_KEY` and
    /// `GOOGLE_DRIVE_FOLDER_ID` (or `GOOGLE_FOLDER_ID`) from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| UploadError::Config(format!("{key} is not set")))
        };
        let client_email = require("GOOGLE_CLIENT_EMAIL")?;
        // Hosting dashboards store the PEM on one line with literal \n escapes
        let private_key = require("GOOGLE_PRIVATE_KEY")?.replace("\\n", "\n");
        let folder_id = require("GOOGLE_DRIVE_FOLDER_ID").or_else(|_| require("GOOGLE_FOLDER_ID"))?;
        Ok(Self {
            client_email,
            private_key,
            folder_id,
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// JWT bearer assertion for the token endpoint.
pub fn signed_assertion(
    credentials: &DriveCredentials,
    token_url: &str,
    now_secs: u64,
) -> Result<String> {
    let claims = Claims {
        iss: &credentials.client_email,
        scope: DRIVE_SCOPE,
        aud: token_url,
        iat: now_secs,
        exp: now_secs + TOKEN_LIFETIME_SECS,
    };
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
}

/// A fresh multipart boundary per upload, so CSV content cannot collide with it.
pub fn new_boundary() -> String {
    format!("sa_csv_{}", Uuid::new_v4().simple())
}

/// `multipart/related` body: JSON metadata part followed by the CSV media part.
pub fn multipart_body(boundary: &str, metadata: &serde_json::Value, csv: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{boundary}--\r\n"
    )
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
}

struct CachedToken {
    value: String,
    expires_at: u64,
}

pub struct DriveUploader {
    client: reqwest::Client,
    credentials: DriveCredentials,
    token_url: String,
    upload_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl DriveUploader {
    pub fn new(credentials: DriveCredentials) -> Self {
        Self::with_endpoints(credentials, TOKEN_URL, UPLOAD_URL)
    }

    /// Point the uploader at alternate token and upload endpoints.
    pub fn with_endpoints(credentials: DriveCredentials, token_url: &str, upload_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            token_url: token_url.to_string(),
            upload_url: upload_url.to_string(),
            token: Mutex::new(None),
        }
    }

    pub fn folder_id(&self) -> &str {
        &self.credentials.folder_id
    }

    async fn access_token(&self) -> Result<String> {
        let now = now_unix_millis() / 1000;
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > now + REFRESH_MARGIN_SECS
        {
            return Ok(token.value.clone());
        }

        let assertion = signed_assertion(&self.credentials, &self.token_url, now)?;
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Auth(format!("token endpoint returned {status}: {body}")));
        }
        let token: TokenResponse = resp.json().await?;
        tracing::debug!("obtained Drive access token for {}", self.credentials.client_email);

        let value = token.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS),
        });
        Ok(value)
    }
}

impl Uploader for DriveUploader {
    async fn upload(&self, filename: &str, csv: &str) -> Result<FileRef> {
        let token = self.access_token().await?;
        let metadata = serde_json::json!({
            "name": filename,
            "mimeType": "text/csv",
            "parents": [self.credentials.folder_id],
        });
        let boundary = new_boundary();

        let resp = self
            .client
            .post(&self.upload_url)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id,name,parents"),
            ])
            .bearer_auth(&token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(multipart_body(&boundary, &metadata, csv))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let file: DriveFile = resp.json().await?;
        tracing::info!("uploaded {filename} to Drive as {}", file.id);
        Ok(FileRef {
            id: file.id,
            name: file.name.unwrap_or_else(|| filename.to_string()),
            folder_id: file
                .parents
                .into_iter()
                .next()
                .or_else(|| Some(self.credentials.folder_id.clone())),
        })
    }
}
