// src/cache/mod.rs
//! Memoized builds keyed by input file identity.
//!
//! A build is pure given its two input files and the pipeline
//! configuration, so the result is cached under the canonical path pair and
//! reused while the content hashes and configuration fingerprint match.
//! A changed file replaces the stale entry on the next lookup.

use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};
use tracing::{debug, error, info};

use crate::process::{BuildError, BuildOutput, Pipeline, RawTable};

/// Where a file lives and what it contained when it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub path: PathBuf,
    /// Hex SHA-256 of the file contents.
    pub sha256: String,
}

impl FileIdentity {
    pub fn of<P: AsRef<Path>>(path: P) -> Result<Self, BuildError> {
        read_source(path.as_ref()).map(|(id, _)| id)
    }
}

#[derive(Debug)]
struct CacheEntry {
    projects: FileIdentity,
    annotations: FileIdentity,
    fingerprint: String,
    output: Arc<BuildOutput>,
}

type PathPair = (PathBuf, PathBuf);

/// Thread-safe cache of built tables. Entries are immutable and handed out
/// as `Arc`s, so readers never observe a partially built table.
#[derive(Debug, Default)]
pub struct BuildCache {
    entries: RwLock<HashMap<PathPair, CacheEntry>>,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached build for these files, building it on a miss.
    #[tracing::instrument(
        level = "info",
        skip(self, pipeline, projects, annotations),
        fields(projects = %projects.as_ref().display(), annotations = %annotations.as_ref().display())
    )]
    pub fn get_or_build<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        pipeline: &Pipeline,
        projects: P,
        annotations: Q,
    ) -> Result<Arc<BuildOutput>, BuildError> {
        let (p_id, p_bytes) = read_source(projects.as_ref())?;
        let (a_id, a_bytes) = read_source(annotations.as_ref())?;
        let key = (p_id.path.clone(), a_id.path.clone());

        // 1) Fast-path under the read lock
        {
            let map_r = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = map_r.get(&key) {
                if entry.projects == p_id
                    && entry.annotations == a_id
                    && entry.fingerprint == pipeline.fingerprint()
                {
                    debug!("cache hit");
                    return Ok(Arc::clone(&entry.output));
                }
                info!("inputs changed since last build, rebuilding");
            }
        }

        // 2) Build outside any lock; the result replaces whatever was there
        let project_table = RawTable::from_reader(Cursor::new(p_bytes), &p_id.path)?;
        let annotation_table = RawTable::from_reader(Cursor::new(a_bytes), &a_id.path)?;
        let output = Arc::new(pipeline.build(&project_table, &annotation_table)?);

        let mut map_w = self.entries.write().unwrap_or_else(|e| e.into_inner());
        map_w.insert(
            key,
            CacheEntry {
                projects: p_id,
                annotations: a_id,
                fingerprint: pipeline.fingerprint().to_string(),
                output: Arc::clone(&output),
            },
        );
        Ok(output)
    }

    /// Like [`get_or_build`](Self::get_or_build) but reports failures through
    /// the log and returns `None` ("no data") instead of an error.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        pipeline: &Pipeline,
        projects: P,
        annotations: Q,
    ) -> Option<Arc<BuildOutput>> {
        match self.get_or_build(pipeline, projects, annotations) {
            Ok(out) => Some(out),
            Err(e @ BuildError::SourceMissing { .. }) => {
                error!("Error: A data file was not found. {e}");
                None
            }
            Err(e @ BuildError::SchemaMismatch { .. }) => {
                error!("Error: {e}");
                None
            }
            Err(e) => {
                error!("An error occurred while processing data: {e}");
                None
            }
        }
    }

    /// Drop the entry for this path pair. Returns `true` if one existed.
    pub fn invalidate<P: AsRef<Path>, Q: AsRef<Path>>(&self, projects: P, annotations: Q) -> bool {
        let key = (canonical(projects.as_ref()), canonical(annotations.as_ref()));
        let mut map_w = self.entries.write().unwrap_or_else(|e| e.into_inner());
        map_w.remove(&key).is_some()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL: Lazy<BuildCache> = Lazy::new(BuildCache::new);

/// The process-wide cache. Lives until the process exits.
pub fn global() -> &'static BuildCache {
    &GLOBAL
}

/// Build (or reuse) the enriched table for two files through the
/// process-wide cache. Failures are logged and yield `None`.
pub fn load_project_data<P: AsRef<Path>, Q: AsRef<Path>>(
    pipeline: &Pipeline,
    projects: P,
    annotations: Q,
) -> Option<Arc<BuildOutput>> {
    global().load(pipeline, projects, annotations)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Read a file once, returning its identity and bytes.
fn read_source(path: &Path) -> Result<(FileIdentity, Vec<u8>), BuildError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => BuildError::SourceMissing {
            path: path.to_path_buf(),
        },
        _ => BuildError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let id = FileIdentity {
        path: canonical(path),
        sha256: hex::encode(Sha256::digest(&bytes)),
    };
    Ok((id, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const PROJECTS: &str = "Organization Name,Project Description,Latitude,Longitude,# Trees To Be Planted\n\
Grace Church,Orchard,41.88,-87.63,20\n";
    const ANNOTATIONS: &str = "Organization Name,Project Description,Goals from Ollama\n\
Grace Church,Orchard,\"['community orchard']\"\n";

    fn write(content: &str) -> anyhow::Result<NamedTempFile> {
        let mut f = NamedTempFile::new()?;
        f.write_all(content.as_bytes())?;
        Ok(f)
    }

    #[test]
    fn second_lookup_is_a_hit() -> anyhow::Result<()> {
        let (p, a) = (write(PROJECTS)?, write(ANNOTATIONS)?);
        let cache = BuildCache::new();
        let pipeline = Pipeline::new(PipelineConfig::default());

        let first = cache.get_or_build(&pipeline, p.path(), a.path())?;
        let second = cache.get_or_build(&pipeline, p.path(), a.path())?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            first.table.records()[0].goal_categories,
            vec!["Community Building", "Food & Agriculture"]
        );
        Ok(())
    }

    #[test]
    fn content_change_rebuilds_and_replaces() -> anyhow::Result<()> {
        let (p, a) = (write(PROJECTS)?, write(ANNOTATIONS)?);
        let cache = BuildCache::new();
        let pipeline = Pipeline::new(PipelineConfig::default());

        let first = cache.get_or_build(&pipeline, p.path(), a.path())?;
        fs::write(
            p.path(),
            format!("{PROJECTS}St. Mark,Shade,41.6,-87.3,7\n"),
        )?;
        let second = cache.get_or_build(&pipeline, p.path(), a.path())?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.table.len(), 2);
        assert_eq!(first.table.len(), 1, "earlier result is untouched");
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn config_change_rebuilds() -> anyhow::Result<()> {
        let (p, a) = (write(PROJECTS)?, write(ANNOTATIONS)?);
        let cache = BuildCache::new();
        let first = cache.get_or_build(&Pipeline::new(PipelineConfig::default()), p.path(), a.path())?;

        let mut cfg = PipelineConfig::default();
        cfg.default_category = "Misc".into();
        let second = cache.get_or_build(&Pipeline::new(cfg), p.path(), a.path())?;
        assert!(!Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[test]
    fn invalidate_and_clear() -> anyhow::Result<()> {
        let (p, a) = (write(PROJECTS)?, write(ANNOTATIONS)?);
        let cache = BuildCache::new();
        let pipeline = Pipeline::new(PipelineConfig::default());
        cache.get_or_build(&pipeline, p.path(), a.path())?;

        assert!(cache.invalidate(p.path(), a.path()));
        assert!(!cache.invalidate(p.path(), a.path()));
        assert!(cache.is_empty());

        cache.get_or_build(&pipeline, p.path(), a.path())?;
        cache.clear();
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn missing_source_yields_no_data() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let a = write(ANNOTATIONS)?;
        let cache = BuildCache::new();
        let pipeline = Pipeline::new(PipelineConfig::default());
        let missing = dir.path().join("projects.csv");

        let err = cache
            .get_or_build(&pipeline, &missing, a.path())
            .unwrap_err();
        assert!(matches!(err, BuildError::SourceMissing { .. }));
        assert!(cache.load(&pipeline, &missing, a.path()).is_none());
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn identity_tracks_content() -> anyhow::Result<()> {
        let f = write("a,b\n1,2\n")?;
        let before = FileIdentity::of(f.path())?;
        fs::write(f.path(), "a,b\n1,3\n")?;
        let after = FileIdentity::of(f.path())?;
        assert_eq!(before.path, after.path);
        assert_ne!(before.sha256, after.sha256);
        assert_eq!(before.sha256.len(), 64);
        Ok(())
    }
}
