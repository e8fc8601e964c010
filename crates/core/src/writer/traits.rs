//! Trait definitions for the writer module.

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::error::MediaError;

/// An external encoder that executes planned commands.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Runs the encoder with `args` followed by `output`.
    ///
    /// Succeeds only when the process exits with status 0. Cancelling the
    /// token stops the process and returns [`MediaError::Cancelled`].
    async fn run(
        &self,
        args: &[String],
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), MediaError>;

    /// Validates that the encoder is properly configured and ready.
    async fn validate(&self) -> Result<(), MediaError>;
}
