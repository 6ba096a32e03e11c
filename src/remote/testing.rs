//! Scripted in-memory remote for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{Error, Result};

use super::RemoteApi;

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Scripted {
    Json(Value),
    Status(u16, String),
}

/// A request as seen by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Recorded {
    /// Value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Replays queued responses per path, in order, and records every request.
///
/// A request for a path with nothing left in its queue fails with a 404
/// fetch error, which makes "one request too many" visible in tests.
#[derive(Debug, Default)]
pub struct ScriptedRemote {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON body for `path`.
    pub fn push_json(&self, path: &str, body: Value) -> &Self {
        self.push(path, Scripted::Json(body))
    }

    /// Queue a failing status for `path`.
    pub fn push_status(&self, path: &str, status: u16, body: &str) -> &Self {
        self.push(path, Scripted::Status(status, body.to_string()))
    }

    fn push(&self, path: &str, response: Scripted) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// All requests issued so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests issued for one path.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl RemoteApi for ScriptedRemote {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.requests.lock().unwrap().push(Recorded {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        });

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Json(body)) => Ok(body),
            Some(Scripted::Status(status, body)) => Err(Error::Fetch {
                path: path.to_string(),
                status,
                body,
            }),
            None => Err(Error::Fetch {
                path: path.to_string(),
                status: 404,
                body: "unscripted request".to_string(),
            }),
        }
    }
}
