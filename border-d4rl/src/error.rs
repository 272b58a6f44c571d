//! Errors in the library.
use thiserror::Error;

/// Errors raised while ingesting a D4RL dataset.
///
/// Every variant is fatal: the load is aborted and no partially built dataset
/// is returned. Collaborator failures (download, archive decoding, the
/// environment) are not wrapped here but propagated unchanged through
/// [`anyhow::Error`] with the failing stage attached as context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum D4rlError {
    /// A mandatory field could not be resolved, or a field has an unusable layout.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Incompatible combination of ingestion options.
    #[error("Provenance config error: {0}")]
    ProvenanceConfigError(String),

    /// The requested dataset identifier has no known archive source.
    #[error("Unknown dataset: {0}")]
    UnknownDatasetError(String),

    /// An archive could not be obtained.
    #[error("IO failure: {0}")]
    IoFailure(String),
}
