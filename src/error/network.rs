use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Network request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),
}
