use crate::MetricValue;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// The repeated measurements of one benchmark, by metric name.
pub type MetricLists = BTreeMap<String, Vec<MetricValue>>;

/// Result rows grouped by their benchmark identity key.
///
/// Each value list holds one entry per row that defined the metric, in the order in which the
/// rows were encountered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregatedGroup {
    groups: BTreeMap<String, MetricLists>,
}

/// An [AggregatedGroup] that combines the groups of multiple tools.
pub type MergedGroup = AggregatedGroup;

impl AggregatedGroup {
    /// Creates a new empty [AggregatedGroup].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the list of `metric` in the bucket `key`.
    pub fn push(&mut self, key: &str, metric: &str, value: MetricValue) {
        self.groups
            .entry(key.to_owned())
            .or_default()
            .entry(metric.to_owned())
            .or_default()
            .push(value);
    }

    /// Ensures that the bucket `key` exists, even if no metric is ever pushed into it.
    pub fn ensure_key(&mut self, key: &str) {
        self.groups.entry(key.to_owned()).or_default();
    }

    /// Returns the metrics of the bucket `key`.
    pub fn get(&self, key: &str) -> Option<&MetricLists> {
        self.groups.get(key)
    }

    /// Returns all keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Returns the number of buckets.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no buckets.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates over all buckets in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, MetricLists> {
        self.groups.iter()
    }
}

impl IntoIterator for AggregatedGroup {
    type Item = (String, MetricLists);
    type IntoIter = btree_map::IntoIter<String, MetricLists>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'group> IntoIterator for &'group AggregatedGroup {
    type Item = (&'group String, &'group MetricLists);
    type IntoIter = btree_map::Iter<'group, String, MetricLists>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(String, MetricLists)> for AggregatedGroup {
    fn from_iter<T: IntoIterator<Item = (String, MetricLists)>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
