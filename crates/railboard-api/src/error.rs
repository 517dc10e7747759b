//! API error types.

use thiserror::Error;

/// Errors raised at the API-access boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout).
    #[error("request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("api returned {code}: {body}")]
    Status { code: u16, body: String },

    /// The response body could not be decoded as expected.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Local I/O failure while persisting a payload.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Access-forbidden responses drive the lookup degradation ladder, so
    /// callers need to distinguish them from other failures.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Status { code: 403, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_is_distinguishable() {
        let forbidden = ApiError::Status {
            code: 403,
            body: "no access".to_string(),
        };
        let not_found = ApiError::Status {
            code: 404,
            body: String::new(),
        };
        assert!(forbidden.is_forbidden());
        assert!(!not_found.is_forbidden());
        assert!(!ApiError::Http("boom".to_string()).is_forbidden());
    }
}
