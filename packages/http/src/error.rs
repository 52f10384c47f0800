use crate::types::HttpResponse;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (connection, timeout, ...).
    #[error("Network error: {message}")]
    Transport { message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn from_response(response: &HttpResponse) -> Self {
        Error::Status {
            status: response.status,
            message: response.error_message(),
        }
    }

    /// The HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn status_error_displays_server_message() {
        let response = HttpResponse {
            status: 400,
            status_text: "Bad Request".to_string(),
            headers: HashMap::new(),
            body: serde_json::json!({"detail": "Name already exists"}),
            body_text: None,
        };
        let error = Error::from_response(&response);
        assert_eq!(error.to_string(), "Name already exists");
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn transport_error_has_no_status() {
        let error = Error::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(error.status(), None);
        assert!(error.to_string().contains("connection refused"));
    }
}
