use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("backend base url is not configured")]
    MissingBackend,

    #[error("invalid upstream url: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("upstream path {0} escapes the backend base path")]
    EscapesBase(String),

    #[error("unsupported method: {0}")]
    Method(String),

    #[error("failed to read request body: {0}")]
    Body(#[from] std::io::Error),

    #[error("upstream request timed out: {0}")]
    UpstreamTimeout(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::UpstreamTimeout(err)
        } else {
            ProxyError::Upstream(err)
        }
    }
}

impl ProxyError {
    /// Status returned to the caller when a request fails with this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::MissingBackend | ProxyError::Client(_) | ProxyError::Bind { .. } => 500,
            ProxyError::InvalidTarget(_) | ProxyError::EscapesBase(_) | ProxyError::Body(_) => {
                400
            }
            ProxyError::Method(_) => 405,
            ProxyError::UpstreamTimeout(_) => 504,
            ProxyError::Upstream(_) => 502,
        }
    }
}
