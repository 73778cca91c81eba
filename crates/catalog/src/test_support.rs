//! Scripted collaborators shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::CatalogError;
use crate::fetcher::Delay;
use crate::transport::{Transport, UpstreamResponse};

pub const RATE_LIMIT_BODY: &str = r#"{"errors":[{"code":0,"message":"Too many requests"}]}"#;

/// One recorded call to [`ScriptedTransport::get`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

type Scripted = Result<UpstreamResponse, String>;

/// Transport that replays queued responses keyed by URL and cursor.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(url: &str, cursor: Option<&str>) -> String {
        format!("{}#{}", url, cursor.unwrap_or(""))
    }

    /// Queue a response for `url` when called with `cursor`.
    pub fn push(&self, url: &str, cursor: Option<&str>, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .entry(Self::key(url, cursor))
            .or_default()
            .push_back(Ok(UpstreamResponse {
                status,
                body: body.into(),
            }));
    }

    /// Queue a successful JSON page.
    pub fn push_page(&self, url: &str, cursor: Option<&str>, page: serde_json::Value) {
        self.push(url, cursor, 200, page.to_string());
    }

    /// Queue a transport-level failure.
    pub fn push_failure(&self, url: &str, cursor: Option<&str>, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(Self::key(url, cursor))
            .or_default()
            .push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.url == url).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<UpstreamResponse, CatalogError> {
        let call = RecordedCall {
            url: url.to_string(),
            query: query.to_vec(),
        };
        let key = Self::key(url, call.param("cursor"));
        self.calls.lock().unwrap().push(call);

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(CatalogError::transport(message)),
            None => Err(CatalogError::transport(format!("no scripted response for {}", key))),
        }
    }
}

/// Delay that returns immediately and remembers every requested wait.
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
