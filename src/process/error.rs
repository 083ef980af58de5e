use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a build before any output is produced.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An input file could not be located.
    #[error("data file not found: '{}'", path.display())]
    SourceMissing { path: PathBuf },

    /// The two sources share none of the candidate join columns.
    #[error("no common identifying columns found (candidates: {candidates:?})")]
    SchemaMismatch { candidates: Vec<String> },

    /// A column every enriched row needs is absent from the project table.
    #[error("project table has no `{column}` column")]
    MissingColumn { column: String },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
