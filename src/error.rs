use std::path::PathBuf;

use thiserror::Error;

use crate::setup::MISSING_SETUP_HELP;

// ---------------------------------------------------------------------------
// Typed failures that map onto process exit codes
// ---------------------------------------------------------------------------

/// Failures the binary reports to the user without a backtrace.
///
/// Everything else (malformed data files, unexpected I/O) travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum KimaError {
    /// A command token that is not part of the grammar.
    #[error("could not recognize argument: '{token}'")]
    UnrecognizedArgument { token: String },

    /// The run directory has no model setup file.
    #[error("couldn't find the file {}\n{}", path.display(), MISSING_SETUP_HELP)]
    MissingSetup { path: PathBuf },

    /// The external post-processing step failed to produce its outputs.
    #[error("{0}")]
    Postprocess(#[source] std::io::Error),

    /// Scalar and per-sample inputs mixed in a derived-quantity call.
    #[error("derived quantity inputs do not match: {0}")]
    QuantityMismatch(String),

    /// The posterior table does not have the columns the model setup implies.
    #[error("posterior samples do not match the model setup: {0}")]
    Layout(String),
}
