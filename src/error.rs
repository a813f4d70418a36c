//! Error taxonomy for the analysis pipeline.
//!
//! Only two kinds of failure abort a run: the input could not be loaded, or
//! an artifact could not be written. Cell coercion failures and row
//! exclusions are not errors; they are counted in the normalize and cleaning
//! reports instead.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load {}: {source}", path.display())]
    DataLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no header row", path.display())]
    EmptyInput { path: PathBuf },

    #[error("{} line {line}: expected at most {expected} fields, found {found}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("{} is missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("failed to write {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl PipelineError {
    pub fn artifact_write(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        PipelineError::ArtifactWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    /// True for failures reading or interpreting the input file.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            PipelineError::DataLoad { .. }
                | PipelineError::EmptyInput { .. }
                | PipelineError::MalformedRow { .. }
                | PipelineError::MissingColumn { .. }
        )
    }

    pub fn is_write_error(&self) -> bool {
        matches!(self, PipelineError::ArtifactWrite { .. })
    }
}
