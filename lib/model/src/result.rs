use crate::MetricValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// The metric that holds the path of the measured input file.
pub const FILE_METRIC: &str = "file";
/// The metric that holds the tool / algorithm identifier.
pub const ALGORITHM_METRIC: &str = "algorithm";

/// The result of running one tool once on one benchmark target.
///
/// A result maps metric names to values. Untagged results always contain [FILE_METRIC] and
/// [ALGORITHM_METRIC]. A run that did not complete in time is flagged with `timed_out` and holds
/// [MetricValue::Missing] for all of its measured metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// The values of this run.
    metrics: BTreeMap<String, MetricValue>,
    /// Whether the run exceeded its timeout.
    #[serde(default)]
    timed_out: bool,
}

impl RunResult {
    /// Creates a new [RunResult] for a completed run that only holds the identity fields.
    pub fn new(file: impl Into<String>, algorithm: impl Into<String>) -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert(FILE_METRIC.to_owned(), MetricValue::Text(file.into()));
        metrics.insert(
            ALGORITHM_METRIC.to_owned(),
            MetricValue::Text(algorithm.into()),
        );
        Self {
            metrics,
            timed_out: false,
        }
    }

    /// Creates a [RunResult] for a run that timed out.
    ///
    /// Every metric in `metric_names` is set to [MetricValue::Missing].
    pub fn timed_out<'names>(
        file: impl Into<String>,
        algorithm: impl Into<String>,
        metric_names: impl IntoIterator<Item = &'names str>,
    ) -> Self {
        let mut result = Self::new(file, algorithm);
        for name in metric_names {
            result.insert(name, MetricValue::Missing);
        }
        result.timed_out = true;
        result
    }

    /// Inserts a value and returns the previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> Option<MetricValue> {
        self.metrics.insert(name.into(), value.into())
    }

    /// Returns the value of a metric.
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    /// Returns all metrics ordered by name.
    pub fn metrics(&self) -> &BTreeMap<String, MetricValue> {
        &self.metrics
    }

    /// Returns true if the run exceeded its timeout.
    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    /// Returns a copy where every metric name is prefixed with `<prefix>-`.
    #[must_use]
    pub fn tagged(&self, prefix: &str) -> Self {
        let metrics = self
            .metrics
            .iter()
            .map(|(name, value)| (format!("{prefix}-{name}"), value.clone()))
            .collect();
        Self {
            metrics,
            timed_out: self.timed_out,
        }
    }
}

impl Extend<(String, MetricValue)> for RunResult {
    fn extend<T: IntoIterator<Item = (String, MetricValue)>>(&mut self, iter: T) {
        self.metrics.extend(iter);
    }
}

impl FromIterator<(String, MetricValue)> for RunResult {
    fn from_iter<T: IntoIterator<Item = (String, MetricValue)>>(iter: T) -> Self {
        Self {
            metrics: iter.into_iter().collect(),
            timed_out: false,
        }
    }
}

impl Display for RunResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.metrics.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        if self.timed_out {
            f.write_str(", timed_out")?;
        }
        f.write_str("}")
    }
}

/// All results of running one tool over one benchmark set.
///
/// The results are ordered by target, and the repetitions of a target are consecutive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<RunResult>,
}

impl ResultSet {
    /// Creates a new empty [ResultSet].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result.
    pub fn push(&mut self, result: RunResult) {
        self.results.push(result);
    }

    /// Returns the number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the results in order.
    pub fn iter(&self) -> std::slice::Iter<'_, RunResult> {
        self.results.iter()
    }

    /// Prefixes every metric name of every result with `<prefix>-`.
    pub fn tag(&self, prefix: &str) -> TaggedResultSet {
        TaggedResultSet {
            prefix: prefix.to_owned(),
            results: self.results.iter().map(|r| r.tagged(prefix)).collect(),
        }
    }
}

impl From<Vec<RunResult>> for ResultSet {
    fn from(results: Vec<RunResult>) -> Self {
        Self { results }
    }
}

impl FromIterator<RunResult> for ResultSet {
    fn from_iter<T: IntoIterator<Item = RunResult>>(iter: T) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl<'set> IntoIterator for &'set ResultSet {
    type Item = &'set RunResult;
    type IntoIter = std::slice::Iter<'set, RunResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A [ResultSet] whose metric names carry a tool prefix.
///
/// Tagging keeps the metric names of different tools apart once their results are merged.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedResultSet {
    prefix: String,
    results: Vec<RunResult>,
}

impl TaggedResultSet {
    /// Returns the tool prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the tagged rows.
    pub fn rows(&self) -> &[RunResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_out_result_has_no_numbers() {
        let result = RunResult::timed_out("a.aut", "bisim", ["time_sec", "mem_mb"]);
        assert!(result.is_timed_out());
        assert_eq!(result.get("time_sec"), Some(&MetricValue::Missing));
        assert!(result.metrics().values().all(|v| v.as_f64().is_none()));
    }

    #[test]
    fn tagging_prefixes_every_metric() {
        let mut result = RunResult::new("a.boa", "nlogn");
        result.insert("num_states", 10_i64);
        let set = ResultSet::from(vec![result]);

        let tagged = set.tag("boa");
        let names = tagged.rows()[0].metrics().keys().cloned().collect::<Vec<_>>();
        assert_eq!(names, ["boa-algorithm", "boa-file", "boa-num_states"]);
        assert_eq!(tagged.prefix(), "boa");
    }

    #[test]
    fn display_lists_metrics() {
        let mut result = RunResult::new("a.boa", "nlogn");
        result.insert("time_sec", 0.5);
        assert_eq!(
            result.to_string(),
            "{algorithm: nlogn, file: a.boa, time_sec: 0.5}"
        );
    }
}
