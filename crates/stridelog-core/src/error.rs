use thiserror::Error;

/// Rejections from marking a habit date. The messages are shown to the
/// user as-is, so keep them in plain language.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkError {
    #[error("cannot mark a habit before its start date")]
    BeforeStart,

    #[error("cannot mark a date in the future")]
    InFuture,
}
