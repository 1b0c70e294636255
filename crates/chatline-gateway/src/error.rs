use thiserror::Error;

/// Expected failures of channel operations. The display text is the reason
/// sent back to the client in an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Validation(&'static str),
}

impl GatewayError {
    pub fn channel_not_found() -> Self {
        Self::NotFound("Channel not found")
    }

    pub fn no_permission() -> Self {
        Self::Forbidden("No permission")
    }
}
