//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use gritty::error::GrittyError;
use gritty::http_client::{HttpClient, HttpResponse};
use gritty::vcs::VersionControl;
use serde_json::json;
use std::cell::RefCell;
use std::sync::Mutex;

/// HTTP client that answers every request with a canned response and keeps
/// the request bodies it saw.
pub struct RecordingHttpClient {
    response: HttpResponse,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl RecordingHttpClient {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            response: HttpResponse {
                status,
                body: body.to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A successful chat completion with one choice per message.
    pub fn completion(messages: &[&str]) -> Self {
        let choices: Vec<_> = messages
            .iter()
            .map(|m| json!({"message": {"role": "assistant", "content": m}}))
            .collect();
        Self::new(200, &json!({ "choices": choices }).to_string())
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for RecordingHttpClient {
    async fn post_json(
        &self,
        _url: &str,
        _headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse, GrittyError> {
        self.requests.lock().unwrap().push(body.clone());
        Ok(self.response.clone())
    }
}

/// In-memory repository that records commits.
pub struct MockRepo {
    pub inside_repository: bool,
    pub diff: String,
    pub commits: RefCell<Vec<String>>,
}

impl MockRepo {
    pub fn with_diff(diff: &str) -> Self {
        Self {
            inside_repository: true,
            diff: diff.to_string(),
            commits: RefCell::new(Vec::new()),
        }
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }
}

impl VersionControl for MockRepo {
    fn is_repository(&self) -> Result<bool, GrittyError> {
        Ok(self.inside_repository)
    }

    fn staged_diff(&self) -> Result<String, GrittyError> {
        Ok(self.diff.clone())
    }

    fn commit(&self, message: &str) -> Result<String, GrittyError> {
        self.commits.borrow_mut().push(message.to_string());
        Ok(format!("[main 0000000] {}", message))
    }
}

pub fn no_env(_key: &str) -> Option<String> {
    None
}
