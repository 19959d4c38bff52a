use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunLoopError {
    #[error("run loop is already draining; nested drains are not allowed")]
    Reentrant,
}
