use std::str::FromStr;

use payloads::{Sensor, SensorId, requests, responses::ErrorBody};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::request::RequestConfig;

/// Fallback when the status code has no canonical reason phrase.
const UNEXPECTED_STATUS_TEXT: &str = "Unexpected error";
/// Fallback when an error body carries neither `message` nor `detail`.
const UNKNOWN_ERROR: &str = "Unknown error";

/// An API client for interfacing with the sensor backend.
pub struct APIClient {
    /// Base address; request paths are appended to it verbatim.
    pub address: String,
    pub inner_client: reqwest::Client,
}

impl APIClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            inner_client: reqwest::Client::new(),
        }
    }

    pub fn format_url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Issue a request without looking at the response.
    #[tracing::instrument(
        skip(self, config),
        fields(method = %config.method(), url = %self.format_url(path)),
        err(level = "debug")
    )]
    pub async fn send(
        &self,
        path: &str,
        config: &RequestConfig,
    ) -> Result<reqwest::Response, ClientError> {
        let method = Method::from_str(config.method()).map_err(|e| {
            ClientError::Request {
                status: None,
                message: format!("Invalid method {}: {e}", config.method()),
            }
        })?;

        let mut request =
            self.inner_client.request(method, self.format_url(path));
        for (name, value) in config.headers() {
            request = request.header(name, value);
        }
        if let Some(body) = config.body_text() {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        tracing::debug!(status = %response.status(), "received response");
        Ok(response)
    }

    /// Issue a request and classify its response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        config: &RequestConfig,
    ) -> Result<T, ClientError> {
        let response = self.send(path, config).await?;
        ok_body(response).await
    }
}

/// Methods on the sensor backend
impl APIClient {
    pub async fn list_sensors(&self) -> Result<Vec<Sensor>, ClientError> {
        self.request("/", &RequestConfig::get()).await
    }

    pub async fn get_sensor(
        &self,
        sensor_id: &SensorId,
    ) -> Result<Sensor, ClientError> {
        self.request(&format!("/sensor/{sensor_id}"), &RequestConfig::get())
            .await
    }

    pub async fn create_sensor(
        &self,
        details: &requests::CreateSensor,
    ) -> Result<Sensor, ClientError> {
        let config = RequestConfig::post().json(details)?;
        self.request("/sensor", &config).await
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// A 422 response with a structured body.
    #[error("{status_text}: {message}")]
    Validation {
        status: StatusCode,
        status_text: String,
        body: ErrorBody,
        message: String,
    },
    /// Any other failed or unreadable response. The message already
    /// includes the status text when there was a status.
    #[error("{message}")]
    Request {
        status: Option<StatusCode>,
        message: String,
    },
    /// The request never completed.
    #[error("Network error: {0}")]
    Network(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Validation { status, .. } => Some(*status),
            Self::Request { status, .. } => *status,
            Self::Network(_) => None,
        }
    }

    /// The backend's message, without the status text prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. } => message,
            Self::Request { message, .. } => message,
            Self::Network(message) => message,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            return Self::Request {
                status: None,
                message: format!("Invalid request: {e}"),
            };
        }
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Request {
            status: None,
            message: format!("Invalid request body: {e}"),
        }
    }
}

/// Read the body as text and classify it by status, returning the
/// deserialized payload for 2xx responses.
pub async fn ok_body<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let text = response.text().await?;
    classify(status, &text)
}

pub fn status_text(status: StatusCode) -> &'static str {
    status
        .canonical_reason()
        .filter(|reason| !reason.is_empty())
        .unwrap_or(UNEXPECTED_STATUS_TEXT)
}

/// Map a status code and raw body onto the success payload or a
/// [`ClientError`].
///
/// - 2xx: the body must parse as `T`.
/// - 422: the body must parse as an [`ErrorBody`]; otherwise it is
///   treated like any other failure.
/// - anything else: `"<status text>: <message|detail|Unknown error>"`.
pub fn classify<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> Result<T, ClientError> {
    let status_text = status_text(status);

    if status.is_success() {
        return serde_json::from_str(text).map_err(|e| {
            tracing::debug!("unparseable {status} body: {e}");
            ClientError::Request {
                status: Some(status),
                message: format!("{status_text}: Invalid response body ({e})"),
            }
        });
    }

    let body = serde_json::from_str::<ErrorBody>(text).ok();
    let message = body
        .as_ref()
        .and_then(ErrorBody::message)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    match body {
        Some(body) if status == StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ClientError::Validation {
                status,
                status_text: status_text.to_string(),
                body,
                message,
            })
        }
        _ => Err(ClientError::Request {
            status: Some(status),
            message: format!("{status_text}: {message}"),
        }),
    }
}
