use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerClientError {
    #[error("invalid broker url '{0}'")]
    InvalidUrl(String),

    #[error("{verb} requires a binding id")]
    MissingBindingId { verb: String },

    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("http error talking to broker: {0}")]
    Http(#[from] reqwest::Error),
}
