use http::StatusCode;

use crate::TOKEN_INVALID_CODE;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("{message}")]
    Application { code: i64, message: String },

    #[error("Authentication token is invalid: {0}")]
    TokenInvalid(String),

    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),

    #[error("Comment content cannot be empty")]
    EmptyContent,

    #[error("{0}")]
    Validation(String),

    #[error("Please log in first")]
    NotLoggedIn,
}

impl Error {
    /// Builds the error for a non-2xx answer out of whatever the body holds
    pub fn from_http(status: StatusCode, body: &str) -> Error {
        if let Ok(data) = serde_json::from_str::<serde_json::Value>(body) {
            let message = data
                .get("msg")
                .or_else(|| data.get("message"))
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty());
            if data.get("code").and_then(|c| c.as_i64()) == Some(TOKEN_INVALID_CODE) {
                return Error::TokenInvalid(message.unwrap_or("token rejected").to_string());
            }
            if let Some(message) = message {
                return Error::Http {
                    status,
                    message: message.to_string(),
                };
            }
        }
        let message = match body.trim() {
            "" => format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown status")
            ),
            text => text.to_string(),
        };
        Error::Http { status, message }
    }

    pub fn from_code(code: i64, msg: &str) -> Error {
        let message = match msg {
            "" => String::from("Request failed"),
            msg => msg.to_string(),
        };
        match code {
            TOKEN_INVALID_CODE => Error::TokenInvalid(message),
            code => Error::Application { code, message },
        }
    }

    /// The one error that the views branch on: it forces a logout
    pub fn is_token_invalid(&self) -> bool {
        match self {
            Error::TokenInvalid(_) => true,
            Error::Http { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// Whether the request never left the client
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            Error::EmptyContent | Error::Validation(_) | Error::NotLoggedIn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_sources() {
        assert_eq!(
            Error::from_http(StatusCode::BAD_REQUEST, r#"{"code":10001,"msg":"bad title"}"#)
                .to_string(),
            "bad title",
        );
        assert_eq!(
            Error::from_http(StatusCode::BAD_REQUEST, r#"{"message":"nope"}"#).to_string(),
            "nope",
        );
        assert_eq!(
            Error::from_http(StatusCode::BAD_GATEWAY, "upstream down").to_string(),
            "upstream down",
        );
        assert_eq!(
            Error::from_http(StatusCode::NOT_FOUND, "").to_string(),
            "HTTP 404: Not Found",
        );
    }

    #[test]
    fn token_invalid_detection() {
        assert!(Error::from_http(StatusCode::UNAUTHORIZED, "").is_token_invalid());
        assert!(Error::from_http(
            StatusCode::BAD_REQUEST,
            r#"{"code":30002,"msg":"认证Token无效"}"#
        )
        .is_token_invalid());
        assert!(Error::from_code(30002, "").is_token_invalid());
        assert!(!Error::from_code(30001, "").is_token_invalid());
        assert!(!Error::Transport(String::from("reset")).is_token_invalid());
    }

    #[test]
    fn application_message_defaults() {
        assert_eq!(
            Error::from_code(40004, ""),
            Error::Application {
                code: 40004,
                message: String::from("Request failed"),
            },
        );
    }
}
