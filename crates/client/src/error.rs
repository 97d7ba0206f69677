/// Errors surfaced by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body, usually `{"error": ..., "code": ...}`.
        body: String,
    },

    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Selection file error: {0}")]
    Io(#[from] std::io::Error),

    /// The action was refused locally without contacting the server.
    #[error("{0}")]
    Refused(String),

    #[error("No setlist is selected")]
    NoSelection,
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    /// The message worth showing to a person.
    ///
    /// For server errors this is the `error` field of the JSON body.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|json| json["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| body.clone()),
            other => other.to_string(),
        }
    }
}
