use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base HTTP URL of the server, without a trailing slash.
    pub api_url: String,
    /// Quiet period before a title edit is submitted.
    pub debounce: Duration,
    /// Where the last-viewed setlist id is remembered.
    pub selection_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                   |
    /// |--------------------------|---------------------------|
    /// | `SETLIST_API_URL`        | `http://localhost:3000`   |
    /// | `SETLIST_DEBOUNCE_MS`    | `500`                     |
    /// | `SETLIST_SELECTION_FILE` | `.setlist-selection.json` |
    pub fn from_env() -> Self {
        let api_url = std::env::var("SETLIST_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let debounce_ms: u64 = std::env::var("SETLIST_DEBOUNCE_MS")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("SETLIST_DEBOUNCE_MS must be a valid u64");

        let selection_file = std::env::var("SETLIST_SELECTION_FILE")
            .unwrap_or_else(|_| ".setlist-selection.json".into())
            .into();

        Self {
            api_url,
            debounce: Duration::from_millis(debounce_ms),
            selection_file,
        }
    }

    /// WebSocket URL of the event stream derived from `api_url`.
    pub fn ws_url(&self) -> String {
        ws_url(&self.api_url)
    }
}

/// Map `http(s)://host` to `ws(s)://host/api/ws`.
pub fn ws_url(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/api/ws")
}
