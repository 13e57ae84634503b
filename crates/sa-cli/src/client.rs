//! Client side of the save endpoint, used by `sa upload --server`.

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};

/// POST `{filename, csv}` and return the server's JSON reply.
///
/// A non-2xx reply fails with `Server error: <status> - <error field>`.
pub async fn save_csv_to_server(
    client: &reqwest::Client,
    url: &str,
    filename: &str,
    csv: &str,
) -> Result<Value> {
    let resp = client
        .post(url)
        .json(&json!({ "filename": filename, "csv": csv }))
        .send()
        .await
        .with_context(|| format!("failed to reach {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        let error = resp
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();
        bail!("Server error: {} - {error}", status.as_u16());
    }

    let reply: Value = resp.json().await.context("server reply was not JSON")?;
    tracing::info!("Save result: {reply}");
    Ok(reply)
}
