use anyhow::Context;
use boa_bench_model::BenchmarkTarget;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Expands a glob pattern into a sorted list of [BenchmarkTarget]s.
///
/// Supported wildcards are `*` and `?` (within one path component) and `**` (any number of
/// components). Only regular files are returned. A pattern whose literal directory prefix does
/// not exist matches nothing.
pub fn expand_glob(pattern: &str) -> anyhow::Result<Vec<BenchmarkTarget>> {
    let pattern = pattern.replace('\\', "/");
    let matcher = glob_to_regex(&pattern)?;
    let (root, max_depth) = walk_root(&pattern);
    let root_exists = root
        .try_exists()
        .with_context(|| format!("Cannot access '{}'", root.display()))?;
    if !root_exists {
        warn!(pattern = %pattern, root = %root.display(), "Benchmark directory does not exist");
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true).max_depth(max_depth) {
        let entry = entry
            .with_context(|| format!("Cannot list benchmark files below '{}'", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = normalize(entry.path());
        if matcher.is_match(&path) {
            paths.push(PathBuf::from(path));
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            BenchmarkTarget::from_path(&path)
                .with_context(|| format!("Cannot inspect benchmark file '{}'", path.display()))
        })
        .collect()
}

/// Returns the literal directory prefix of the pattern and how deep below it matches can lie.
fn walk_root(pattern: &str) -> (PathBuf, usize) {
    let components = pattern.split('/').collect::<Vec<_>>();
    let literal = components
        .iter()
        .take_while(|c| !is_wildcard(c))
        .count()
        .min(components.len().saturating_sub(1));

    let root = components[..literal].join("/");
    let root = if root.is_empty() {
        if pattern.starts_with('/') {
            PathBuf::from("/")
        } else {
            PathBuf::from(".")
        }
    } else {
        PathBuf::from(root)
    };

    let max_depth = if components.iter().any(|c| c.contains("**")) {
        usize::MAX
    } else {
        components.len() - literal
    };
    (root, max_depth)
}

fn is_wildcard(component: &str) -> bool {
    component.contains(['*', '?'])
}

/// Translates a glob pattern into an anchored regular expression over `/`-separated paths.
fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let mut regex = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    regex.push_str("(?:.*/)?");
                } else {
                    regex.push_str(".*");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            c => regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    regex.push('$');
    Regex::new(&regex)
}

/// Renders a walked path in the same shape as the pattern it is matched against.
fn normalize(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    match path.strip_prefix("./") {
        Some(stripped) => stripped.to_owned(),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn glob_regex_respects_components() -> Result<(), regex::Error> {
        let regex = glob_to_regex("benchmarks/*/*.boa")?;
        assert!(regex.is_match("benchmarks/wlan/wlan0.boa"));
        assert!(!regex.is_match("benchmarks/wlan/deep/wlan0.boa"));
        assert!(!regex.is_match("benchmarks/wlan/wlan0.boa.txt"));

        let regex = glob_to_regex("ltsbenchmarks/**/*.aut")?;
        assert!(regex.is_match("ltsbenchmarks/a.aut"));
        assert!(regex.is_match("ltsbenchmarks/x/y/a.aut"));
        Ok(())
    }

    #[test]
    fn walk_root_stops_at_first_wildcard() {
        assert_eq!(
            walk_root("benchmarks/*/*.boa"),
            (PathBuf::from("benchmarks"), 2)
        );
        assert_eq!(walk_root("*.boa"), (PathBuf::from("."), 1));
        assert_eq!(walk_root("data/a.boa"), (PathBuf::from("data"), 1));
    }

    #[test]
    fn expands_to_sorted_targets() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        dir.child("wlan/wlan1.boa").write_str("1")?;
        dir.child("fms/fms_n2.boa").write_str("22")?;
        dir.child("fms/fms_n1.boa").write_str("333")?;
        dir.child("fms/fms_n1.aut").write_str("ignored")?;
        dir.child("fms/nested/fms_n3.boa").write_str("ignored")?;

        let pattern = format!("{}/*/*.boa", normalize(dir.path()));
        let targets = expand_glob(&pattern)?;

        let names = targets
            .iter()
            .map(|t| t.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, ["fms_n1.boa", "fms_n2.boa", "wlan1.boa"]);
        assert_eq!(targets[0].category(), "fms");
        assert_eq!(targets[2].category(), "wlan");
        Ok(())
    }

    #[test]
    fn missing_root_matches_nothing() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let pattern = format!("{}/missing/*/*.boa", normalize(dir.path()));
        assert!(expand_glob(&pattern)?.is_empty());
        Ok(())
    }
}
