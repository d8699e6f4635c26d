use thiserror::Error;

/// Type alias for Result with SweepError
pub type Result<T> = std::result::Result<T, SweepError>;

/// Coarse error classification used by callers to pick a reaction.
///
/// The Gmail adapter assigns the variant at the boundary from HTTP status
/// codes and error bodies, so nothing downstream ever inspects error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credential or scope problem; re-authentication is required
    Auth,
    /// Rate limits, server errors, network failures
    Transient,
    /// Everything else; retrying will not help
    Fatal,
}

/// Error types for the cleanup system
#[derive(Error, Debug)]
pub enum SweepError {
    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Authentication failed (invalid or expired credential)
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Access forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Token lacks a scope the operation needs
    #[error("Insufficient OAuth scope: {0}")]
    InsufficientScope(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request rejected before any remote call was made
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cleanup was cancelled before finishing
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic catch-all error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SweepError {
    /// Classify this error into one of the three reaction kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            SweepError::AuthError(_)
            | SweepError::Forbidden(_)
            | SweepError::InsufficientScope(_) => ErrorKind::Auth,
            SweepError::RateLimitExceeded { .. }
            | SweepError::ServerError { .. }
            | SweepError::NetworkError(_) => ErrorKind::Transient,
            _ => ErrorKind::Fatal,
        }
    }

    /// Check whether the error means the credential or scope was rejected.
    ///
    /// The CLI maps these to a re-authentication hint.
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Check if the error is transient (rate limit, 5xx, network)
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

/// Parse the Retry-After header from an HTTP response.
///
/// Accepts both delay-seconds ("120") and HTTP-date formats; falls back to
/// 5 seconds when the header is missing, invalid, or in the past.
fn parse_retry_after_header<B>(response: &hyper::Response<B>) -> u64 {
    const DEFAULT_RETRY_AFTER: u64 = 5;

    let Some(value) = response.headers().get("retry-after") else {
        return DEFAULT_RETRY_AFTER;
    };
    let Ok(value) = value.to_str() else {
        return DEFAULT_RETRY_AFTER;
    };

    if let Ok(seconds) = value.parse::<u64>() {
        return seconds;
    }

    if let Ok(date) = httpdate::parse_http_date(value) {
        if let Ok(duration) = date.duration_since(std::time::SystemTime::now()) {
            return duration.as_secs();
        }
    }

    DEFAULT_RETRY_AFTER
}

/// Classify a structured Gmail API error body.
///
/// The body looks like `{"error": {"code": 403, "message": "...", "errors":
/// [{"reason": "insufficientPermissions", ...}]}}`. Scope problems are
/// separated from other 403s so callers can prompt for re-authentication.
fn classify_api_error_body(body: &serde_json::Value) -> SweepError {
    let code = body
        .pointer("/error/code")
        .and_then(|c| c.as_i64())
        .unwrap_or(0) as u16;
    let message = body
        .pointer("/error/message")
        .and_then(|m| m.as_str())
        .unwrap_or("request rejected by the Gmail API")
        .to_string();

    let insufficient_scope = body
        .pointer("/error/errors")
        .and_then(|errors| errors.as_array())
        .map(|errors| {
            errors.iter().any(|e| {
                matches!(
                    e.get("reason").and_then(|r| r.as_str()),
                    Some("insufficientPermissions") | Some("ACCESS_TOKEN_SCOPE_INSUFFICIENT")
                )
            })
        })
        .unwrap_or(false);

    match code {
        401 => SweepError::AuthError(message),
        403 if insufficient_scope => SweepError::InsufficientScope(message),
        403 => SweepError::Forbidden(message),
        404 => SweepError::NotFound(message),
        429 => SweepError::RateLimitExceeded { retry_after: 5 },
        500..=599 => SweepError::ServerError {
            status: code,
            message,
        },
        _ => SweepError::BadRequest(message),
    }
}

impl From<google_gmail1::Error> for SweepError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            // HTTP response with status code (non-success responses)
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    401 => SweepError::AuthError(message),
                    403 => SweepError::Forbidden(message),
                    404 => SweepError::NotFound(message),
                    429 => {
                        let retry_after = parse_retry_after_header(response);
                        SweepError::RateLimitExceeded { retry_after }
                    }
                    400 => SweepError::BadRequest(message),
                    500..=599 => SweepError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => SweepError::ApiError(message),
                }
            }
            // Structured error body; carries code/reason for classification
            google_gmail1::Error::BadRequest(ref body) => classify_api_error_body(body),
            // No usable token could be obtained
            google_gmail1::Error::MissingToken(err) => SweepError::AuthError(err.to_string()),
            // Network/connection errors
            google_gmail1::Error::HttpError(ref err) => {
                SweepError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => SweepError::NetworkError(err.to_string()),
            // All other errors
            _ => SweepError::ApiError(error.to_string()),
        }
    }
}
