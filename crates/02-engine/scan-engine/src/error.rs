use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid value {value} for setting {name}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("state error: {0}")]
    State(#[from] serde_json::Error),
}
