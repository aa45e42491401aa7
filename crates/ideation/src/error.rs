use thiserror::Error;

/// Coarse classification used for retry decisions and HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    RateLimited,
    ParseError,
    ProviderError,
    ServiceUnavailable,
    Timeout,
    Unknown,
}

/// Idea generation error types
#[derive(Debug, Error)]
pub enum IdeationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider rejected the API key: {message}")]
    Unauthorized { message: String },

    #[error("Provider rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("Provider API error: {message}")]
    Provider {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Failed to parse AI response: {reason}")]
    Parse { reason: String, raw: String },

    #[error("Max retries exceeded after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<IdeationError>,
    },

    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Idea generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IdeationError {
    pub fn parse(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::BadRequest,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Provider { status_code, .. } => match status_code {
                Some(401) | Some(403) => ErrorKind::Unauthorized,
                _ if self.is_rate_limited() => ErrorKind::RateLimited,
                _ => ErrorKind::ProviderError,
            },
            Self::Parse { .. } => ErrorKind::ParseError,
            Self::RetriesExhausted { source, .. } => source.kind(),
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Http(_) | Self::Serialization(_) | Self::InvalidConfig(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the error signals provider throttling.
    ///
    /// Some providers report throttling in the message body of an otherwise
    /// generic error, so the message is inspected as well.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Provider {
                status_code: Some(429),
                ..
            } => true,
            Self::Provider { message, .. } => {
                let message = message.to_lowercase();
                message.contains("rate limit")
                    || message.contains("rate_limit")
                    || message.contains("too many requests")
            }
            Self::RetriesExhausted { source, .. } => source.is_rate_limited(),
            _ => false,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// HTTP status the provider answered with, if any.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Provider { status_code, .. } => *status_code,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::RetriesExhausted { source, .. } => source.provider_status(),
            _ => None,
        }
    }
}

/// Result type alias for idea generation
pub type IdeationResult<T> = Result<T, IdeationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(IdeationError::RateLimited { retry_after: None }.is_rate_limited());
        assert!(IdeationError::Provider {
            message: "overloaded".to_string(),
            status_code: Some(429),
        }
        .is_rate_limited());
        assert!(IdeationError::Provider {
            message: "Rate limit reached for requests".to_string(),
            status_code: Some(500),
        }
        .is_rate_limited());
        assert!(!IdeationError::Provider {
            message: "internal error".to_string(),
            status_code: Some(500),
        }
        .is_rate_limited());
        assert!(!IdeationError::Unauthorized {
            message: "bad key".to_string()
        }
        .is_rate_limited());
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            IdeationError::Provider {
                message: "forbidden".to_string(),
                status_code: Some(403),
            }
            .kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            IdeationError::parse("bad json", "raw").kind(),
            ErrorKind::ParseError
        );
        assert_eq!(
            IdeationError::InvalidConfig("x".to_string()).kind(),
            ErrorKind::Unknown
        );

        let exhausted = IdeationError::RetriesExhausted {
            attempts: 3,
            source: Box::new(IdeationError::RateLimited { retry_after: None }),
        };
        assert_eq!(exhausted.kind(), ErrorKind::RateLimited);
        assert!(exhausted.to_string().starts_with("Max retries exceeded"));
    }
}
