use serde::{Deserialize, Serialize};

/// Error body returned by the backend for non-2xx responses.
///
/// Both fields are optional: generic errors usually carry only `message`,
/// while 422 validation failures carry `detail`, either as a plain string
/// or as a list of per-field errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
    Other(serde_json::Value),
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending field, e.g. `["body", "name"]`.
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ErrorBody {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            detail: None,
        }
    }

    pub fn with_fields(fields: Vec<FieldError>) -> Self {
        Self {
            message: None,
            detail: Some(ErrorDetail::Fields(fields)),
        }
    }

    /// The human readable message carried by this body, if any.
    ///
    /// `message` wins over `detail`. Field errors are joined with "; ".
    pub fn message(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty())
        {
            return Some(message.clone());
        }
        match &self.detail {
            Some(ErrorDetail::Message(detail)) if !detail.is_empty() => {
                Some(detail.clone())
            }
            Some(ErrorDetail::Fields(fields)) if !fields.is_empty() => Some(
                fields
                    .iter()
                    .map(FieldError::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match &self.detail {
            Some(ErrorDetail::Fields(fields)) => fields,
            _ => &[],
        }
    }
}

impl FieldError {
    pub fn new(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".into(), field.into()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// The last path segment, which names the field itself.
    pub fn field(&self) -> Option<String> {
        self.loc.last().map(|segment| match segment {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.field() {
            Some(field) => write!(f, "{field}: {}", self.msg),
            None => f.write_str(&self.msg),
        }
    }
}
