use crate::api_client::ClientError;

/// Outcome of the most recent invocation of a request hook.
///
/// Being an enum, at most one of data and error exists at a time, and
/// `Loading` carries neither.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSnapshot<T> {
    /// Associated with a request but never invoked.
    Idle,
    Loading,
    Success(T),
    Failure(ClientError),
}

impl<T> Default for ResultSnapshot<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> ResultSnapshot<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The finished outcome, or `None` while idle or loading.
    pub fn into_result(self) -> Option<Result<T, ClientError>> {
        match self {
            Self::Success(data) => Some(Ok(data)),
            Self::Failure(error) => Some(Err(error)),
            Self::Idle | Self::Loading => None,
        }
    }
}

impl<T> From<Result<T, ClientError>> for ResultSnapshot<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Failure(error),
        }
    }
}
