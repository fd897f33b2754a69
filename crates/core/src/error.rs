//! Errors raised by the decision layer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A direction or action name that maps to no key.
    #[error("unknown key name '{0}'")]
    UnknownKey(String),
}
