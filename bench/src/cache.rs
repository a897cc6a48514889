use crate::targets::expand_glob;
use anyhow::Context;
use boa_bench_model::{BenchmarkTarget, ResultSet, RunResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Identifies the document type of a cache file.
pub const CACHE_FORMAT: &str = "boa-bench/result-set";
/// The version of the cache file layout. Files with another version are rejected.
pub const CACHE_VERSION: u32 = 1;

/// An error related to reading or writing cached result sets.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Error from the OS I/O layer.
    #[error("Cannot access cache file '{}'", .path.display())]
    Io {
        /// The cache file.
        path: PathBuf,
        /// The cause.
        #[source]
        source: io::Error,
    },
    /// The cache file is not valid JSON or does not match the expected layout.
    #[error("Cannot parse cache file '{}'", .path.display())]
    Json {
        /// The cache file.
        path: PathBuf,
        /// The cause.
        #[source]
        source: serde_json::Error,
    },
    /// The cache file was written by an incompatible version.
    #[error(
        "Cache file '{}' has format '{found_format}' version {found_version}, expected '{}' version {}",
        .path.display(),
        CACHE_FORMAT,
        CACHE_VERSION
    )]
    SchemaMismatch {
        /// The cache file.
        path: PathBuf,
        /// The format found in the file.
        found_format: String,
        /// The version found in the file.
        found_version: u32,
    },
    /// The cache file holds the results of another key, e.g. because it was renamed.
    #[error(
        "Cache file '{}' holds set '{found_set_name}' with {found_repetitions} repetition(s), expected set '{set_name}' with {repetitions}",
        .path.display()
    )]
    KeyMismatch {
        /// The cache file.
        path: PathBuf,
        /// The requested name of the benchmark set.
        set_name: String,
        /// The requested number of repetitions.
        repetitions: u32,
        /// The set name stored in the file.
        found_set_name: String,
        /// The number of repetitions stored in the file.
        found_repetitions: u32,
    },
    /// There is no cache entry for the requested key.
    #[error(
        "No cached results for set '{set_name}' with {repetitions} repetition(s) at '{}'",
        .path.display()
    )]
    Missing {
        /// The name of the benchmark set.
        set_name: String,
        /// The number of repetitions.
        repetitions: u32,
        /// The expected cache file.
        path: PathBuf,
    },
}

/// The header of a cache file, checked before the results are interpreted.
#[derive(Deserialize)]
struct CacheHeader {
    format: String,
    version: u32,
}

/// The on-disk layout of a cached result set.
#[derive(Serialize, Deserialize)]
struct CacheFile {
    format: String,
    version: u32,
    set_name: String,
    repetitions: u32,
    results: ResultSet,
}

/// Persists the result set of a benchmark run, keyed by set name and number of repetitions.
///
/// The key deliberately contains neither the tool binary nor the list of benchmark files. A
/// rebuilt tool that is run again under the same key yields the previously cached numbers.
#[derive(Clone, Debug)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    /// Creates a new [ResultCache] that stores its files in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the path of the cache file for the given key.
    pub fn path(&self, set_name: &str, repetitions: u32) -> PathBuf {
        self.dir.join(format!("{set_name}_rep{repetitions}.json"))
    }

    /// Returns the cached result set, or runs the benchmark set and caches its results.
    ///
    /// On a cache miss, `targets_glob` is expanded, every target is repeated `repetitions` times,
    /// and `run_fn` is awaited sequentially for each (target, repetition) pair. The repetitions of
    /// one target are consecutive.
    pub async fn runbench<F, Fut>(
        &self,
        targets_glob: &str,
        set_name: &str,
        repetitions: u32,
        mut run_fn: F,
    ) -> anyhow::Result<ResultSet>
    where
        F: FnMut(&BenchmarkTarget, u32) -> Fut,
        Fut: Future<Output = anyhow::Result<RunResult>>,
    {
        if let Some(results) = self.try_load(set_name, repetitions)? {
            info!(
                set_name,
                repetitions,
                path = %self.path(set_name, repetitions).display(),
                "Using cached results"
            );
            return Ok(results);
        }

        let targets = expand_glob(targets_glob)?;
        info!(
            set_name,
            repetitions,
            targets = targets.len(),
            "Running benchmark set"
        );

        let mut results = ResultSet::new();
        for target in &targets {
            for repetition in 0..repetitions {
                info!(target = %target, repetition, "Running benchmark");
                let result = run_fn(target, repetition).await.with_context(|| {
                    format!(
                        "Benchmark '{}' failed in repetition {repetition}",
                        target.path().display()
                    )
                })?;
                results.push(result);
            }
        }

        self.store(set_name, repetitions, &results)?;
        Ok(results)
    }

    /// Loads an existing cache entry.
    pub fn load(&self, set_name: &str, repetitions: u32) -> Result<ResultSet, CacheError> {
        self.try_load(set_name, repetitions)?
            .ok_or_else(|| CacheError::Missing {
                set_name: set_name.to_owned(),
                repetitions,
                path: self.path(set_name, repetitions),
            })
    }

    /// Loads an existing cache entry. Returns `None` if there is none.
    fn try_load(
        &self,
        set_name: &str,
        repetitions: u32,
    ) -> Result<Option<ResultSet>, CacheError> {
        let path = self.path(set_name, repetitions);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let header: CacheHeader =
            serde_json::from_str(&content).map_err(|source| CacheError::Json {
                path: path.clone(),
                source,
            })?;
        if header.format != CACHE_FORMAT || header.version != CACHE_VERSION {
            return Err(CacheError::SchemaMismatch {
                path,
                found_format: header.format,
                found_version: header.version,
            });
        }

        let file: CacheFile =
            serde_json::from_str(&content).map_err(|source| CacheError::Json {
                path: path.clone(),
                source,
            })?;
        if file.set_name != set_name || file.repetitions != repetitions {
            return Err(CacheError::KeyMismatch {
                path,
                set_name: set_name.to_owned(),
                repetitions,
                found_set_name: file.set_name,
                found_repetitions: file.repetitions,
            });
        }
        Ok(Some(file.results))
    }

    /// Writes a cache entry, replacing an existing one.
    pub fn store(
        &self,
        set_name: &str,
        repetitions: u32,
        results: &ResultSet,
    ) -> Result<(), CacheError> {
        let path = self.path(set_name, repetitions);
        let file = CacheFile {
            format: CACHE_FORMAT.to_owned(),
            version: CACHE_VERSION,
            set_name: set_name.to_owned(),
            repetitions,
            results: results.clone(),
        };
        let content =
            serde_json::to_string_pretty(&file).map_err(|source| CacheError::Json {
                path: path.clone(),
                source,
            })?;

        write_atomically(&path, &content).map_err(|source| CacheError::Io { path, source })
    }
}

/// Writes to a sibling file first, so that an interrupted run never leaves a truncated entry.
fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn path_contains_key() {
        let cache = ResultCache::new("cache");
        assert_eq!(
            cache.path("mcrl2-bisim", 3),
            PathBuf::from("cache/mcrl2-bisim_rep3.json")
        );
    }

    #[test]
    fn missing_entry() {
        let dir = TempDir::new().unwrap();
        let cache = ResultCache::new(dir.path());
        let error = cache.load("nothing", 1).unwrap_err();
        assert!(matches!(error, CacheError::Missing { repetitions: 1, .. }));
    }

    #[test]
    fn rejects_other_versions() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        dir.child("old_rep1.json").write_str(
            r#"{"format": "boa-bench/result-set", "version": 0, "results": "whatever"}"#,
        )?;
        let cache = ResultCache::new(dir.path());

        let error = cache.load("old", 1).unwrap_err();
        assert!(matches!(
            error,
            CacheError::SchemaMismatch {
                found_version: 0,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn rejects_renamed_entries() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let cache = ResultCache::new(dir.path());
        cache.store("boa-naive", 1, &ResultSet::new())?;
        fs::rename(cache.path("boa-naive", 1), cache.path("boa-nlogn", 3))?;

        let error = cache.load("boa-nlogn", 3).unwrap_err();
        assert!(
            matches!(
                &error,
                CacheError::KeyMismatch {
                    found_set_name,
                    found_repetitions: 1,
                    ..
                } if found_set_name == "boa-naive"
            ),
            "{error}"
        );
        Ok(())
    }

    #[test]
    fn rejects_foreign_documents() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        dir.child("foreign_rep1.json").write_str("[1, 2, 3]")?;
        let cache = ResultCache::new(dir.path());

        let error = cache.load("foreign", 1).unwrap_err();
        assert!(matches!(error, CacheError::Json { .. }));
        Ok(())
    }
}
