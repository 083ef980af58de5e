use csv::ReaderBuilder;
use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::error::BuildError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// Each data row, padded or truncated to `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
    /// Where the table came from (used in error messages).
    pub source: PathBuf,
}

impl RawTable {
    /// In-memory table. Rows are padded or truncated to the header width.
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self {
            headers,
            rows,
            source: PathBuf::from("<memory>"),
        }
    }

    /// Load a headed CSV file.
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => BuildError::SourceMissing {
                path: path.to_path_buf(),
            },
            _ => BuildError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_reader(file, path)
    }

    /// Parse CSV from any reader. `source` is only used for reporting.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self, BuildError> {
        let csv_err = |e: csv::Error| BuildError::Csv {
            path: source.to_path_buf(),
            source: e,
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // keep this so short/long rows do not abort the load
            .from_reader(reader);

        let mut headers: Vec<String> = rdr
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();
        if let Some(first) = headers.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > width {
                warn!(
                    record = idx,
                    cells = row.len(),
                    width,
                    "row has more cells than headers, extra cells ignored"
                );
            }
            row.resize(width, String::new());
            rows.push(row);
        }
        debug!(rows = rows.len(), columns = width, "loaded table");

        Ok(Self {
            headers,
            rows,
            source: source.to_path_buf(),
        })
    }

    /// Index of the column named `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_headed_csv_and_pads_short_rows() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(
            tmp,
            "\u{feff}Organization Name,Latitude,Longitude\n\"Grace, Church\",41.9,-87.6\nShort Row\n"
        )?;
        let t = RawTable::from_path(tmp.path())?;
        assert_eq!(t.headers, vec!["Organization Name", "Latitude", "Longitude"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][0], "Grace, Church");
        assert_eq!(t.rows[1], vec!["Short Row", "", ""]);
        assert_eq!(t.column("Longitude"), Some(2));
        assert!(!t.has_column("State"));
        Ok(())
    }

    #[test]
    fn in_memory_rows_take_the_header_width() {
        let t = RawTable::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec!["1".into()], vec!["1".into(), "2".into(), "3".into(), "4".into()]],
        );
        assert_eq!(t.rows[0], vec!["1", "", ""]);
        assert_eq!(t.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn missing_file_is_source_missing() {
        let err = RawTable::from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, BuildError::SourceMissing { .. }));
        assert!(err.to_string().contains("here.csv"));
    }
}
