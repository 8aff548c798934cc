use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Method, headers and body of a request, independent of its path.
///
/// The configuration is normalized on construction (upper-case method,
/// lower-case header names kept in a sorted map) so that two
/// configurations describing the same request serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    method: String,
    headers: BTreeMap<String, String>,
    body: Option<String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestConfig {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new("GET")
    }

    pub fn post() -> Self {
        Self::new("POST")
    }

    pub fn header(
        mut self,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set an already serialized body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and mark the content type.
    pub fn json(
        self,
        value: &impl Serialize,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(value)?;
        Ok(self.header("content-type", "application/json").body(body))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Serialized form used to decide whether a configuration changed.
    pub fn fingerprint(&self) -> String {
        serde_json::json!({
            "method": self.method,
            "headers": self.headers,
            "body": self.body,
        })
        .to_string()
    }
}

/// Identity of a request: its path plus the fingerprint of its
/// configuration. Two renders with equal keys share one invocation
/// function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub path: String,
    pub fingerprint: String,
}

impl RequestKey {
    pub fn new(path: &str, config: &RequestConfig) -> Self {
        Self {
            path: path.to_string(),
            fingerprint: config.fingerprint(),
        }
    }
}
