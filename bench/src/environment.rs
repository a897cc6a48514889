use crate::cache::ResultCache;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Provides options for the benchmarking process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchmarkingOptions {
    /// The directory that holds the cached result sets.
    pub cache_dir: PathBuf,
    /// The directory that receives the rendered reports.
    pub results_dir: PathBuf,
}

impl Default for BenchmarkingOptions {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache"),
            results_dir: PathBuf::from("./results"),
        }
    }
}

/// Represents a context used to execute benchmarks and reports.
pub struct BenchContext {
    /// General options for the benchmarks.
    options: BenchmarkingOptions,
    /// The cache of all result sets.
    cache: ResultCache,
}

impl BenchContext {
    /// Creates a new [BenchContext] and ensures that its directories exist.
    pub fn try_new(options: BenchmarkingOptions) -> anyhow::Result<Self> {
        for dir in [&options.cache_dir, &options.results_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;
        }
        let cache = ResultCache::new(&options.cache_dir);
        Ok(Self { options, cache })
    }

    /// Returns the [BenchmarkingOptions] for this context.
    pub fn options(&self) -> &BenchmarkingOptions {
        &self.options
    }

    /// Returns the result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Returns the path to the results directory.
    pub fn results_dir(&self) -> &Path {
        &self.options.results_dir
    }
}
