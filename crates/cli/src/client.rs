//! Virtuoso REST client

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

use virtuoso_common::{
    ApiEnvelope, Checkpoint, CheckpointId, Config, Error, Journey, LibraryCheckpoint, TestStep,
};

/// Client for the Virtuoso API
#[derive(Debug, Clone)]
pub struct VirtuosoClient {
    http: reqwest::Client,
    base_url: String,
    organization_id: String,
    retries: u32,
    retry_wait: Duration,
}

impl VirtuosoClient {
    /// Create a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.api.auth_token))?,
        );
        headers.insert(
            HeaderName::from_static("x-virtuoso-client-id"),
            header_value(&config.headers.client_id)?,
        );
        headers.insert(
            HeaderName::from_static("x-virtuoso-client-name"),
            header_value(&config.headers.client_name)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout))
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            organization_id: config.organization.id.clone(),
            retries: config.http.retries,
            retry_wait: Duration::from_secs(config.http.retry_wait),
        })
    }

    /// Check the credentials by listing the organization's projects
    pub async fn test_connection(&self) -> Result<Duration> {
        let start = Instant::now();
        let path = format!("/projects?organizationId={}", self.organization_id);
        self.send(Method::GET, &path, None).await?;
        Ok(start.elapsed())
    }

    // Step operations

    /// Create a step and return its id
    pub async fn create_step(
        &self,
        checkpoint: &CheckpointId,
        position: u32,
        parsed_step: &Value,
    ) -> Result<u64> {
        let body = json!({
            "checkpointId": checkpoint.to_wire(),
            "stepIndex": position,
            "parsedStep": parsed_step,
        });
        let response = self
            .send(Method::POST, "/teststeps?envelope=false", Some(&body))
            .await?;

        let id = response
            .get("item")
            .and_then(|item| item.get("id"))
            .or_else(|| response.get("id"))
            .and_then(Value::as_u64);
        match id {
            Some(id) => Ok(id),
            None => {
                warn!("step created but the response carried no id");
                Ok(0)
            }
        }
    }

    // Checkpoint operations

    /// Get a checkpoint (test case)
    pub async fn get_checkpoint(&self, id: &CheckpointId) -> Result<Checkpoint> {
        let path = format!("/testcases/{}", id.path_segment());
        let response = self.send(Method::GET, &path, None).await?;
        item(response)
    }

    /// Create a checkpoint under a goal and snapshot
    pub async fn create_checkpoint(
        &self,
        goal_id: u64,
        snapshot_id: u64,
        title: &str,
    ) -> Result<Checkpoint> {
        let body = json!({
            "goalId": goal_id,
            "snapshotId": snapshot_id,
            "title": title,
        });
        let response = self.send(Method::POST, "/testcases", Some(&body)).await?;
        let checkpoint: Checkpoint = item(response)?;
        if checkpoint.id == 0 {
            return Err(anyhow::anyhow!("checkpoint created but the response carried no id"));
        }
        Ok(checkpoint)
    }

    /// Attach an existing checkpoint to a journey
    pub async fn attach_checkpoint(
        &self,
        journey_id: u64,
        checkpoint_id: u64,
        position: u32,
    ) -> Result<()> {
        let path = format!("/testsuites/{}/checkpoints/attach", journey_id);
        let body = json!({
            "checkpointId": checkpoint_id,
            "position": position,
        });
        self.send(Method::POST, &path, Some(&body)).await?;
        Ok(())
    }

    /// Get a journey with its checkpoints numbered in order
    pub async fn list_checkpoints(&self, journey_id: u64) -> Result<Journey> {
        let path = format!("/testsuites/{}", journey_id);
        let response = self.send(Method::GET, &path, None).await?;
        let mut journey: Journey = item(response)?;
        journey.number_checkpoints();
        Ok(journey)
    }

    /// Get a single test step
    pub async fn get_step(&self, step_id: u64) -> Result<TestStep> {
        let path = format!("/teststeps/{}", step_id);
        let response = self.send(Method::GET, &path, None).await?;
        item(response)
    }

    // Library operations

    /// Convert a checkpoint into a library checkpoint
    pub async fn add_to_library(&self, checkpoint: &CheckpointId) -> Result<LibraryCheckpoint> {
        let path = format!("/testcases/{}/add-to-library", checkpoint.path_segment());
        let response = self.send(Method::POST, &path, Some(&json!({}))).await?;
        item(response)
    }

    pub async fn get_library_checkpoint(&self, id: u64) -> Result<LibraryCheckpoint> {
        let path = format!("/library/checkpoints/{}", id);
        let response = self.send(Method::GET, &path, None).await?;
        item(response)
    }

    /// Attach a library checkpoint to a journey
    pub async fn attach_library_checkpoint(
        &self,
        journey_id: u64,
        library_checkpoint_id: u64,
        position: u32,
    ) -> Result<Checkpoint> {
        let path = format!("/testsuites/{}/checkpoints/attach", journey_id);
        let body = json!({
            "libraryCheckpointId": library_checkpoint_id,
            "position": position,
        });
        let response = self.send(Method::POST, &path, Some(&body)).await?;
        item(response)
    }

    /// Move a step inside a library checkpoint
    pub async fn move_library_step(
        &self,
        library_checkpoint_id: u64,
        step_id: u64,
        position: u32,
    ) -> Result<()> {
        let path = format!(
            "/library/checkpoints/{}/steps/{}/move",
            library_checkpoint_id, step_id
        );
        self.send(Method::POST, &path, Some(&json!({ "position": position })))
            .await?;
        Ok(())
    }

    pub async fn remove_library_step(&self, library_checkpoint_id: u64, step_id: u64) -> Result<()> {
        let path = format!(
            "/library/checkpoints/{}/steps/{}",
            library_checkpoint_id, step_id
        );
        self.send(Method::DELETE, &path, None).await?;
        Ok(())
    }

    /// Rename a library checkpoint
    pub async fn update_library_checkpoint(
        &self,
        library_checkpoint_id: u64,
        title: &str,
    ) -> Result<LibraryCheckpoint> {
        let path = format!("/library/checkpoints/{}", library_checkpoint_id);
        let response = self
            .send(Method::PUT, &path, Some(&json!({ "title": title })))
            .await?;
        item(response)
    }

    /// Send a request, retrying transport failures, 429 and 5xx responses
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(method = %method, url = %url, attempt, "sending request");

            let mut request = self.http.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if is_retryable(status) && attempt <= self.retries {
                        warn!(status = status.as_u16(), attempt, "request failed, retrying");
                        sleep(self.retry_wait).await;
                        continue;
                    }
                    let text = response.text().await?;
                    return decode(status, &text);
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt <= self.retries => {
                    warn!(error = %e, attempt, "request failed, retrying");
                    sleep(self.retry_wait).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        Error::InvalidConfig(format!("value is not a valid HTTP header: '{}'", value)).into()
    })
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Turn a response into JSON, mapping error statuses and `success: false`
fn decode(status: StatusCode, text: &str) -> Result<Value> {
    let parsed: Option<Value> = if text.trim().is_empty() {
        None
    } else {
        serde_json::from_str(text).ok()
    };
    let envelope = parsed
        .as_ref()
        .and_then(|v| serde_json::from_value::<ApiEnvelope<Value>>(v.clone()).ok());
    let envelope_message = envelope
        .as_ref()
        .and_then(|e| e.error.as_ref())
        .and_then(|e| e.message());

    if !status.is_success() {
        let message = envelope_message.unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text.trim().to_string()
            }
        });
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    if envelope.as_ref().and_then(|e| e.success) == Some(false) {
        return Err(Error::Api {
            status: status.as_u16(),
            message: envelope_message.unwrap_or_else(|| "request was not successful".to_string()),
        }
        .into());
    }

    Ok(parsed.unwrap_or(Value::Null))
}

/// Deserialize the `item` of an envelope, or the whole body when unwrapped
fn item<T: DeserializeOwned>(response: Value) -> Result<T> {
    let value = match response {
        Value::Object(mut map) if map.get("item").is_some_and(Value::is_object) => {
            map.remove("item").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value).context("unexpected response shape")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_envelope() {
        let err = decode(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"error":{"code":"E","message":"bad selector"}}"#,
        )
        .unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::Api { status, message }) => {
                assert_eq!(*status, 400);
                assert_eq!(message, "bad selector");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_raw_body_and_success_flag() {
        let err = decode(StatusCode::NOT_FOUND, "no such checkpoint").unwrap_err();
        assert!(err.to_string().contains("no such checkpoint"));

        let err = decode(StatusCode::OK, r#"{"success":false,"error":"denied"}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Api { status: 200, .. })
        ));

        assert_eq!(decode(StatusCode::NO_CONTENT, "").unwrap(), Value::Null);
    }

    #[test]
    fn test_item_unwraps_envelope() {
        let wrapped = json!({ "success": true, "item": { "id": 7, "title": "Login" } });
        let checkpoint: Checkpoint = item(wrapped).unwrap();
        assert_eq!(checkpoint.id, 7);
        assert_eq!(checkpoint.title, "Login");

        let bare = json!({ "id": 8, "title": "Checkout" });
        let checkpoint: Checkpoint = item(bare).unwrap();
        assert_eq!(checkpoint.id, 8);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
    }
}
