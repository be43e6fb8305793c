use thiserror::Error;

/// Failure to retrieve data from the media server.
///
/// `Clone` so a single failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("server rejected the credentials (HTTP {status}); run 'finwatch config server' again")]
    Unauthorized { status: u16 },

    #[error("server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("not signed in; run 'finwatch config server' first")]
    NotAuthenticated,
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { url: url.to_string() }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn from_status(url: &str, status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            code @ (401 | 403) => FetchError::Unauthorized { status: code },
            code => FetchError::Status {
                url: url.to_string(),
                status: code,
            },
        }
    }

    /// Whether retrying the same request later could succeed without user action
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network { .. } | FetchError::Timeout { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Unauthorized { .. }
            | FetchError::Malformed { .. }
            | FetchError::NotAuthenticated => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_auth_failures() {
        let err = FetchError::from_status("http://x/Shows", reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(err, FetchError::Unauthorized { status: 401 });
        assert!(!err.is_transient());

        let err = FetchError::from_status("http://x/Shows", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(
            err,
            FetchError::Status {
                url: "http://x/Shows".to_string(),
                status: 502
            }
        );
        assert!(err.is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = FetchError::Timeout {
            url: "http://x/Shows/1/Episodes".to_string(),
        };
        assert_eq!(err.to_string(), "request to http://x/Shows/1/Episodes timed out");
        assert!(FetchError::NotAuthenticated.to_string().contains("config server"));
    }
}
