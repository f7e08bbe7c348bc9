/// Error types shared across the legal-aid crates.
///
/// These cover construction-time failures of the shared infrastructure (HTTP clients,
/// backend selection). Request-time model failures live in `gateway::GatewayError`.
/// Application-specific errors wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("gateway configuration error: {0}")]
    Config(String),
}
