use thiserror::Error;

/// Errors raised while loading or validating a sync config.
///
/// Reconciliation itself never fails: malformed cells, missing sheets and
/// unknown people degrade to defaults or skipped months.
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty person, bad template, bad layout).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}
