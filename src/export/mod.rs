// src/export/mod.rs
//! Write a built table out for downstream tools.
mod batch;

pub use self::batch::{enriched_schema, to_record_batch};

use anyhow::{Context, Result};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

use crate::process::{BuildOutput, BuildReport, EnrichedProjectRecord};

#[derive(Serialize)]
struct JsonDocument<'a> {
    report: &'a BuildReport,
    records: Vec<&'a EnrichedProjectRecord>,
}

/// Write the report and every record as pretty JSON. Returns bytes written.
pub fn write_json<P: AsRef<Path>>(output: &BuildOutput, path: P) -> Result<u64> {
    let path = path.as_ref();
    let doc = JsonDocument {
        report: &output.report,
        records: output.table.view(),
    };
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, &doc).context("serializing JSON")?;
        w.write_all(b"\n").context("writing trailing newline")
    })?;
    let bytes = fs::metadata(path)
        .with_context(|| format!("getting metadata for {}", path.display()))?
        .len();
    info!(path = %path.display(), bytes, records = output.table.len(), "wrote JSON");
    Ok(bytes)
}

/// Write every record as one Parquet row group. Returns bytes written.
pub fn write_parquet<P: AsRef<Path>>(output: &BuildOutput, path: P) -> Result<u64> {
    let path = path.as_ref();
    let records = output.table.view();
    let batch = to_record_batch(&records).context("building record batch")?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    write_atomic(path, |w| {
        let mut writer = ArrowWriter::try_new(w, Arc::new(enriched_schema()), Some(props))
            .context("creating parquet writer")?;
        writer.write(&batch).context("writing batch to parquet")?;
        writer.close().context("closing parquet writer")?;
        Ok(())
    })?;

    let bytes = fs::metadata(path)
        .with_context(|| format!("getting metadata for {}", path.display()))?
        .len();
    info!(path = %path.display(), bytes, rows = batch.num_rows(), "wrote parquet");
    Ok(bytes)
}

/// Write through `<path>.tmp`, then rename over `path`.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let file = File::create(&tmp_path)
        .with_context(|| format!("creating file {}", tmp_path.display()))?;
    let mut w = BufWriter::new(file);
    write(&mut w)?;
    w.flush()
        .with_context(|| format!("flushing {}", tmp_path.display()))?;
    drop(w);

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "renaming `{}` to `{}`",
            tmp_path.display(),
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::PipelineConfig,
        process::{build, RawTable},
    };
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::TempDir;

    fn output() -> BuildOutput {
        let projects = RawTable::new(
            vec![
                "Organization Name".into(),
                "Latitude".into(),
                "Longitude".into(),
                "# Trees To Be Planted".into(),
            ],
            vec![
                vec!["A".into(), "41.9".into(), "-87.6".into(), "3".into()],
                vec!["B".into(), "42.0".into(), "-88.0".into(), "4".into()],
                vec!["C".into(), "x".into(), "-88.0".into(), "4".into()],
            ],
        );
        let annotations = RawTable::new(
            vec!["Organization Name".into(), "USDA Matched Species".into()],
            vec![vec!["A".into(), "['Acer rubrum', 'Red Oak']".into()]],
        );
        build(&projects, &annotations, &PipelineConfig::default()).expect("build")
    }

    #[test]
    fn parquet_has_one_row_per_record() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out").join("enriched.parquet");
        let bytes = write_parquet(&output(), &path)?;
        assert!(bytes > 0);

        let reader = SerializedFileReader::new(File::open(&path)?)?;
        assert_eq!(reader.metadata().file_metadata().num_rows(), 2);
        assert!(!dir.path().join("out").join("enriched.parquet.tmp").exists());
        Ok(())
    }

    #[test]
    fn json_contains_report_and_records() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("enriched.json");
        write_json(&output(), &path)?;

        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(v["records"].as_array().map(Vec::len), Some(2));
        assert_eq!(v["report"]["dropped"][0]["reason"]["column"], "Latitude");
        assert_eq!(
            v["records"][0]["cleaned_species"],
            serde_json::json!(["Maple", "Oak"])
        );
        Ok(())
    }
}
