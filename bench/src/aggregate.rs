use boa_bench_model::{
    AggregatedGroup, IdentityKeyError, MergeError, MergedGroup, MetricValue, RunResult,
};

/// The prefixed file fields that identify a benchmark, in lookup order.
pub const FILE_FIELDS: &[&str] = &["boa-file", "mcrl-file"];

/// The length of the extension that is stripped from the file path (e.g., `.boa` or `.aut`).
pub const FILE_SUFFIX_LEN: usize = 4;

/// Groups `rows` by `keyfn`.
///
/// Every row lands in exactly one bucket. Each metric a row defines appends its value to the list
/// of that metric in the bucket. Rows that lack a metric contribute nothing to it, hence lists of
/// different metrics may have different lengths.
pub fn groupby<'rows, E>(
    rows: impl IntoIterator<Item = &'rows RunResult>,
    mut keyfn: impl FnMut(&RunResult) -> Result<String, E>,
) -> Result<AggregatedGroup, E> {
    let mut group = AggregatedGroup::new();
    for row in rows {
        let key = keyfn(row)?;
        group.ensure_key(&key);
        for (metric, value) in row.metrics() {
            group.push(&key, metric, value.clone());
        }
    }
    Ok(group)
}

/// Merges two groups that describe the same benchmarks.
///
/// The key sets must be identical. For each key, the metrics of both groups are combined. If both
/// groups hold the same metric name for a key, the list of `right` replaces the list of `left`
/// (later wins). No values are concatenated or averaged.
pub fn merge_later_wins(
    left: AggregatedGroup,
    right: AggregatedGroup,
) -> Result<MergedGroup, MergeError> {
    let left_keys = left.keys().map(str::to_owned).collect::<Vec<_>>();
    let right_keys = right.keys().map(str::to_owned).collect::<Vec<_>>();
    if left_keys != right_keys {
        return Err(MergeError::KeySetMismatch {
            left: left_keys,
            right: right_keys,
        });
    }

    let merged = left
        .into_iter()
        .zip(right)
        .map(|((key, mut metrics), (_, right_metrics))| {
            metrics.extend(right_metrics);
            (key, metrics)
        })
        .collect();
    Ok(merged)
}

/// Derives the benchmark identity key of a tagged result row.
///
/// The key is the value of the first present file field without its extension. Results of
/// different tools for the same input file therefore share a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityKey {
    /// The recognized file fields, in lookup order.
    fields: Vec<String>,
    /// The number of characters stripped from the end of the path.
    suffix_len: usize,
}

impl IdentityKey {
    /// Creates a new [IdentityKey].
    pub fn new<Field: Into<String>>(
        fields: impl IntoIterator<Item = Field>,
        suffix_len: usize,
    ) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            suffix_len,
        }
    }

    /// Returns the identity key of `row`.
    pub fn key(&self, row: &RunResult) -> Result<String, IdentityKeyError> {
        let Some((field, value)) = self
            .fields
            .iter()
            .find_map(|field| row.get(field).map(|value| (field, value)))
        else {
            return Err(IdentityKeyError::MissingFileField {
                fields: self.fields.clone(),
                row: row.to_string(),
            });
        };

        let invalid = || IdentityKeyError::InvalidFileField {
            field: field.clone(),
            suffix_len: self.suffix_len,
            row: row.to_string(),
        };
        let MetricValue::Text(path) = value else {
            return Err(invalid());
        };
        let length = path.chars().count();
        if length < self.suffix_len {
            return Err(invalid());
        }
        Ok(path.chars().take(length - self.suffix_len).collect())
    }
}

impl Default for IdentityKey {
    fn default() -> Self {
        Self::new(FILE_FIELDS.iter().copied(), FILE_SUFFIX_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_bench_model::MetricLists;
    use std::convert::Infallible;

    fn row(pairs: &[(&str, MetricValue)]) -> RunResult {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    fn lists(pairs: &[(&str, Vec<MetricValue>)]) -> MetricLists {
        pairs
            .iter()
            .map(|(name, values)| ((*name).to_owned(), values.clone()))
            .collect()
    }

    fn by_metric(name: &'static str) -> impl FnMut(&RunResult) -> Result<String, Infallible> {
        move |row| Ok(row.get(name).map(ToString::to_string).unwrap_or_default())
    }

    #[test]
    fn groupby_appends_in_encounter_order() {
        let rows = [
            row(&[("k", "a".into()), ("m", 1_i64.into())]),
            row(&[("k", "b".into()), ("m", 2_i64.into())]),
            row(&[("k", "a".into()), ("m", 3_i64.into())]),
        ];
        let group = groupby(&rows, by_metric("k")).unwrap();

        assert_eq!(group.len(), 2);
        assert_eq!(
            group.get("a").unwrap()["m"],
            vec![MetricValue::Int(1), MetricValue::Int(3)]
        );
        assert_eq!(group.get("b").unwrap()["m"], vec![MetricValue::Int(2)]);
    }

    #[test]
    fn groupby_conserves_values() {
        let rows = [
            row(&[("k", "a".into()), ("x", 1_i64.into())]),
            row(&[("k", "a".into()), ("y", 2_i64.into())]),
            row(&[("k", "b".into()), ("x", 3_i64.into()), ("y", 4_i64.into())]),
            row(&[("k", "c".into())]),
        ];
        let group = groupby(&rows, by_metric("k")).unwrap();

        for metric in ["k", "x", "y"] {
            let defined = rows.iter().filter(|r| r.get(metric).is_some()).count();
            let recorded = group
                .iter()
                .filter_map(|(_, metrics)| metrics.get(metric))
                .map(Vec::len)
                .sum::<usize>();
            assert_eq!(defined, recorded, "metric {metric}");
        }
        // Rows lacking a metric do not pad the list of that metric.
        assert_eq!(group.get("a").unwrap()["x"].len(), 1);
        assert!(group.get("c").is_some());
    }

    #[test]
    fn merge_right_bias() {
        let left = AggregatedGroup::from_iter([(
            "f".to_owned(),
            lists(&[("m", vec![MetricValue::Int(1)])]),
        )]);
        let right = AggregatedGroup::from_iter([(
            "f".to_owned(),
            lists(&[("m", vec![MetricValue::Int(2)])]),
        )]);

        let merged = merge_later_wins(left, right.clone()).unwrap();
        assert_eq!(merged, right);
    }

    #[test]
    fn merge_unions_metrics() {
        let left = AggregatedGroup::from_iter([(
            "f".to_owned(),
            lists(&[("boa-x", vec![MetricValue::Int(1)])]),
        )]);
        let right = AggregatedGroup::from_iter([(
            "f".to_owned(),
            lists(&[("mcrl-x", vec![MetricValue::Int(3)])]),
        )]);

        let merged = merge_later_wins(left, right).unwrap();
        let metrics = merged.get("f").unwrap();
        assert_eq!(metrics.keys().collect::<Vec<_>>(), ["boa-x", "mcrl-x"]);
    }

    #[test]
    fn merge_rejects_different_key_sets() {
        let left = AggregatedGroup::from_iter([
            ("f".to_owned(), MetricLists::new()),
            ("g".to_owned(), MetricLists::new()),
        ]);
        let right = AggregatedGroup::from_iter([
            ("f".to_owned(), MetricLists::new()),
            ("h".to_owned(), MetricLists::new()),
        ]);

        let error = merge_later_wins(left, right).unwrap_err();
        assert_eq!(
            error,
            MergeError::KeySetMismatch {
                left: vec!["f".to_owned(), "g".to_owned()],
                right: vec!["f".to_owned(), "h".to_owned()],
            }
        );
        let message = error.to_string();
        assert!(message.contains("\"g\"") && message.contains("\"h\""), "{message}");
    }

    #[test]
    fn identity_key_strips_extension() {
        let key = IdentityKey::default();
        let boa = row(&[("boa-file", "benchmarks/wlan/wlan0.boa".into())]);
        let mcrl = row(&[("mcrl-file", "benchmarks/wlan/wlan0.aut".into())]);

        assert_eq!(key.key(&boa).unwrap(), "benchmarks/wlan/wlan0");
        assert_eq!(key.key(&boa), key.key(&mcrl));
    }

    #[test]
    fn identity_key_requires_file_field() {
        let key = IdentityKey::default();
        let error = key.key(&row(&[("file", "a.boa".into())])).unwrap_err();
        assert!(matches!(error, IdentityKeyError::MissingFileField { .. }));
        assert!(error.to_string().contains("a.boa"));
    }

    #[test]
    fn identity_key_rejects_short_paths() {
        let key = IdentityKey::default();
        let error = key.key(&row(&[("boa-file", "a".into())])).unwrap_err();
        assert!(matches!(error, IdentityKeyError::InvalidFileField { .. }));
    }
}
