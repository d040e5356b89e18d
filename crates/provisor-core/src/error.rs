use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisorError {
    /// Exact user-facing string contract for lock-scope conflicts.
    #[error("An operation for service instance {0} is in progress.")]
    OperationInProgress(String),

    #[error("description contains control characters")]
    InvalidDescription,

    #[error("invalid name '{0}': must be non-empty printable text")]
    InvalidName(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("resource already exists: {0}")]
    ResourceExists(String),

    #[error("broker not found: {0}")]
    BrokerNotFound(String),

    #[error("broker already exists: {0}")]
    BrokerExists(String),

    #[error("broker {0} still has provisioned resources")]
    BrokerInUse(String),

    #[error("service instance {0} still has service keys")]
    InstanceHasKeys(String),

    #[error("Feature Disabled: {0}")]
    FeatureDisabled(String),

    #[error("undefined feature flag: {0}")]
    UndefinedFlag(String),

    #[error("invalid operation kind: {0}")]
    InvalidOperationKind(String),

    #[error("operation failed: {0}")]
    ActionFailed(String),

    #[error("job worker is not running")]
    JobQueueClosed,

    #[error("not initialized: run 'provisor init'")]
    NotInitialized,

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Broker(#[from] provisor_broker::BrokerClientError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProvisorError>;
