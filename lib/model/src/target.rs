use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// The benchmark families that are recognized in file paths.
///
/// The first token that names a directory of the path, or that prefixes the file name, becomes the
/// category of a [BenchmarkTarget].
pub const CATEGORY_TOKENS: &[&str] = &["fms", "wlan", "wta", "hesselink", "ppm", "lts"];

/// The category used if a path yields no category at all.
pub const UNKNOWN_CATEGORY: &str = "unknown";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One input file to be measured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkTarget {
    /// The path to the input file.
    path: PathBuf,
    /// The benchmark family, derived from the path.
    category: String,
    /// The size of the (compressed) input file in MB.
    size_mb: f64,
}

impl BenchmarkTarget {
    /// Creates a new [BenchmarkTarget] with a known file size.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        let category = category_of(&path);
        Self {
            path,
            category,
            size_mb: size_bytes as f64 / BYTES_PER_MB,
        }
    }

    /// Creates a new [BenchmarkTarget] by inspecting the file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let size_bytes = path.metadata()?.len();
        Ok(Self::new(path, size_bytes))
    }

    /// Returns the path to the input file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the benchmark family.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the primary size metric: the size of the input file in MB.
    pub fn size_mb(&self) -> f64 {
        self.size_mb
    }
}

impl Display for BenchmarkTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.category)
    }
}

/// Derives the benchmark family from a path.
///
/// Known [CATEGORY_TOKENS] win. Otherwise, the leading run of letters and underscores of the file
/// name is used, without trailing underscores (`wlan0_time.boa` yields `wlan`).
pub fn category_of(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let directories = path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();

    for token in CATEGORY_TOKENS {
        if file_name.starts_with(token) || directories.iter().any(|d| d == token) {
            return (*token).to_owned();
        }
    }

    let prefix = file_name
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '_')
        .collect::<String>();
    let prefix = prefix.trim_end_matches('_');
    if prefix.is_empty() {
        UNKNOWN_CATEGORY.to_owned()
    } else {
        prefix.to_owned()
    }
}
