//! Remote access to the task collection over the browser `fetch` API.
//!
//! One method per CRUD verb; every non-2xx status, transport failure or
//! undecodable body collapses into [`RequestError`]. This layer holds no
//! state beyond the configured base path.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{CreateTaskRequest, Task, UpdateTaskRequest};
use thiserror::Error;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

const DEFAULT_BASE: &str = "/api";

/// Name of the `<meta>` tag that overrides the API base path at runtime.
const BASE_META_NAME: &str = "task-api-base";

#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE)
    }
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Resolves the base path from `<meta name="task-api-base" content="...">`
    /// in the host document, falling back to `/api`.
    pub fn from_document() -> Self {
        let configured = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| {
                document
                    .query_selector(&format!("meta[name=\"{}\"]", BASE_META_NAME))
                    .ok()
                    .flatten()
            })
            .and_then(|meta| meta.get_attribute("content"));

        match configured {
            Some(base) if !base.is_empty() => Self::new(base),
            _ => Self::default(),
        }
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, RequestError> {
        let response = self.send("GET", &self.collection_url(), None).await?;
        read_json(&response).await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, RequestError> {
        let response = self.send("GET", &self.task_url(id), None).await?;
        read_json(&response).await
    }

    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, RequestError> {
        let body = encode(request)?;
        let response = self.send("POST", &self.collection_url(), Some(&body)).await?;
        read_json(&response).await
    }

    pub async fn update_task(
        &self,
        id: i64,
        request: &UpdateTaskRequest,
    ) -> Result<Task, RequestError> {
        let body = encode(request)?;
        let response = self.send("PUT", &self.task_url(id), Some(&body)).await?;
        read_json(&response).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), RequestError> {
        self.send("DELETE", &self.task_url(id), None).await?;
        Ok(())
    }

    fn collection_url(&self) -> String {
        format!("{}/tasks", self.base)
    }

    fn task_url(&self, id: i64) -> String {
        format!("{}/tasks/{}", self.base, id)
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
    ) -> Result<Response, RequestError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        if let Some(body) = body {
            opts.set_body(&wasm_bindgen::JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|_| RequestError::Transport(format!("failed to build {} {}", method, url)))?;

        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|_| RequestError::Transport("failed to set content-type".to_string()))?;
        }

        let window = web_sys::window()
            .ok_or_else(|| RequestError::Transport("no window".to_string()))?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|_| RequestError::Transport(format!("{} {} did not complete", method, url)))?
            .into();

        if response.ok() {
            Ok(response)
        } else {
            Err(RequestError::Status {
                status: response.status(),
                url: url.to_string(),
            })
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, RequestError> {
    serde_json::to_string(value).map_err(|e| RequestError::Decode(e.to_string()))
}

async fn read_json<T: DeserializeOwned>(response: &Response) -> Result<T, RequestError> {
    let text_promise = response
        .text()
        .map_err(|_| RequestError::Decode("failed to read response body".to_string()))?;

    let text = JsFuture::from(text_promise)
        .await
        .map_err(|_| RequestError::Decode("failed to read response body".to_string()))?
        .as_string()
        .ok_or_else(|| RequestError::Decode("response body was not text".to_string()))?;

    serde_json::from_str(&text).map_err(|e| RequestError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_is_api() {
        let client = ApiClient::default();
        assert_eq!(client.collection_url(), "/api/tasks");
        assert_eq!(client.task_url(42), "/api/tasks/42");
    }

    #[test]
    fn configured_base_overrides_default() {
        let client = ApiClient::new("https://tasks.example.com/v1");
        assert_eq!(
            client.collection_url(),
            "https://tasks.example.com/v1/tasks"
        );
        assert_eq!(client.task_url(7), "https://tasks.example.com/v1/tasks/7");
    }

    #[test]
    fn status_error_names_url_and_code() {
        let error = RequestError::Status {
            status: 500,
            url: "/api/tasks".to_string(),
        };
        assert_eq!(error.to_string(), "/api/tasks returned status 500");
    }
}
