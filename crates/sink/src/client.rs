// Elasticsearch-compatible sink writer: a cheap, `Clone`-able struct
// wrapping one long-lived `reqwest::Client` plus a base URL, reused across
// ticks rather than reopened per call.

use etl_core::Identified;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, SinkError};
use crate::mappings::{genres_index_body, movies_index_body, persons_index_body};

const ALREADY_EXISTS_MARKER: &str = "resource_already_exists_exception";

#[derive(Debug, Clone)]
pub struct SinkWriter {
  client: reqwest::Client,
  base_url: String,
}

impl SinkWriter {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: base_url.into(),
    }
  }

  fn index_url(&self, index_name: &str) -> String {
    format!("{}/{}", self.base_url, index_name)
  }

  fn bulk_url(&self) -> String {
    format!("{}/_bulk", self.base_url)
  }

  async fn index_exists(&self, index_name: &str) -> Result<bool> {
    let response = self.client.head(self.index_url(index_name)).send().await?;
    Ok(response.status().is_success())
  }

  async fn ensure_index(&self, index_name: &str, body: Value) -> Result<()> {
    if self.index_exists(index_name).await? {
      debug!(index = index_name, "index exists");
      return Ok(());
    }

    let response = self.client.put(self.index_url(index_name)).json(&body).send().await?;
    if response.status().is_success() {
      info!(index = index_name, "created index");
      return Ok(());
    }

    let status = response.status();
    let body_text = response.text().await.unwrap_or_default();
    if body_text.contains(ALREADY_EXISTS_MARKER) {
      debug!(index = index_name, "index already exists, treating as success");
      return Ok(());
    }

    warn!(index = index_name, %status, "failed to create index");
    Err(SinkError::Status {
      status: status.as_u16(),
      body: body_text,
    })
  }

  pub async fn ensure_movies_index(&self, index_name: &str) -> Result<()> {
    self.ensure_index(index_name, movies_index_body()).await
  }

  pub async fn ensure_genres_index(&self, index_name: &str) -> Result<()> {
    self.ensure_index(index_name, genres_index_body()).await
  }

  pub async fn ensure_persons_index(&self, index_name: &str) -> Result<()> {
    self.ensure_index(index_name, persons_index_body()).await
  }

  /// Submits a bulk write. Per-document failures never raise — they are
  /// logged (the first three) and the call still succeeds — only a
  /// transport or non-2xx response from `/_bulk` itself is an error.
  pub async fn bulk_load<T: Serialize + Identified>(&self, docs: &[T], index_name: &str) -> Result<()> {
    if docs.is_empty() {
      debug!("no documents to load");
      return Ok(());
    }

    let mut body = String::new();
    for doc in docs {
      let action = serde_json::json!({ "index": { "_index": index_name, "_id": doc.id().to_string() } });
      body.push_str(&serde_json::to_string(&action).expect("action serializes"));
      body.push('\n');
      body.push_str(&serde_json::to_string(doc).expect("document serializes"));
      body.push('\n');
    }

    let response = self
      .client
      .post(self.bulk_url())
      .header("Content-Type", "application/x-ndjson")
      .body(body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body_text = response.text().await.unwrap_or_default();
      return Err(SinkError::Status {
        status: status.as_u16(),
        body: body_text,
      });
    }

    let parsed: Value = response.json().await?;
    info!(index = index_name, count = docs.len(), "bulk load complete");

    if parsed.get("errors").and_then(Value::as_bool).unwrap_or(false) {
      let failures: Vec<String> = parsed
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("index")?.get("error")?.get("reason")?.as_str())
        .map(|s| s.to_string())
        .take(3)
        .collect();
      warn!(index = index_name, errors = ?failures, "bulk reported per-document failures");
    }

    Ok(())
  }
}
