use crate::extract::TIME_SEC;
use crate::report::{
    mean, recorded_category, render_mean, render_optional, tagged_values, DisplayRecord,
    RowTransform,
};
use crate::tools::{COMPRESSED_SIZE_MB, MEM_MB, NUM_STATES};
use boa_bench_model::{MetricLists, MetricValue};

/// Puts two algorithms of the same kind of tool side by side, e.g. the naive and the
/// `n log n` partition refinement of boa.
///
/// Both result sets must be tagged, with `left_tag` and `right_tag` respectively. The tags double
/// as column labels.
pub struct AlgorithmComparison {
    left_tag: String,
    right_tag: String,
}

impl AlgorithmComparison {
    /// Creates a new [AlgorithmComparison].
    pub fn new(left_tag: impl Into<String>, right_tag: impl Into<String>) -> Self {
        Self {
            left_tag: left_tag.into(),
            right_tag: right_tag.into(),
        }
    }

    fn left<'metrics>(
        &self,
        metrics: &'metrics MetricLists,
        name: &str,
    ) -> &'metrics [MetricValue] {
        tagged_values(metrics, &self.left_tag, name)
    }

    fn right<'metrics>(
        &self,
        metrics: &'metrics MetricLists,
        name: &str,
    ) -> &'metrics [MetricValue] {
        tagged_values(metrics, &self.right_tag, name)
    }

    /// Takes the mean of the left results, and of the right results if the left ones are unknown.
    fn either(&self, metrics: &MetricLists, name: &str) -> Option<f64> {
        mean(self.left(metrics, name)).or_else(|| mean(self.right(metrics, name)))
    }
}

impl RowTransform for AlgorithmComparison {
    fn header(&self) -> Vec<String> {
        vec![
            "type".to_owned(),
            "states".to_owned(),
            "size (MB)".to_owned(),
            format!("{} (s)", self.left_tag),
            format!("{} (s)", self.right_tag),
            format!("{} (MB)", self.left_tag),
            format!("{} (MB)", self.right_tag),
        ]
    }

    fn transform(&self, key: &str, metrics: &MetricLists) -> DisplayRecord {
        let states = self.either(metrics, NUM_STATES);
        let left_time = mean(self.left(metrics, TIME_SEC));

        let tags = [self.left_tag.as_str(), self.right_tag.as_str()];
        let category = recorded_category(key, metrics, tags);
        DisplayRecord {
            cells: vec![
                category.clone(),
                render_optional(states),
                render_optional(self.either(metrics, COMPRESSED_SIZE_MB)),
                render_optional(left_time),
                render_mean(self.right(metrics, TIME_SEC)),
                render_mean(self.left(metrics, MEM_MB)),
                render_mean(self.right(metrics, MEM_MB)),
            ],
            category,
            size: states,
            primary_time: left_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(pairs: &[(&str, Vec<MetricValue>)]) -> MetricLists {
        pairs
            .iter()
            .map(|(name, values)| ((*name).to_owned(), values.clone()))
            .collect()
    }

    #[test]
    fn header_names_both_sets() {
        let header = AlgorithmComparison::new("boa-naive", "boa-nlogn").header();
        assert_eq!(header[3], "boa-naive (s)");
        assert_eq!(header[6], "boa-nlogn (MB)");
    }

    #[test]
    fn compares_times_and_memory() {
        let metrics = lists(&[
            ("naive-category", vec!["wta".into()]),
            ("naive-num_states", vec![MetricValue::Int(64), MetricValue::Int(64)]),
            (
                "naive-compressedsize_mb",
                vec![MetricValue::Float(1.5), MetricValue::Float(1.5)],
            ),
            ("naive-time_sec", vec![MetricValue::Float(4.0), MetricValue::Float(5.0)]),
            ("naive-mem_mb", vec![MetricValue::Float(20.0), MetricValue::Float(22.0)]),
            ("nlogn-time_sec", vec![MetricValue::Float(0.25)]),
            ("nlogn-mem_mb", vec![MetricValue::Float(30.0)]),
        ]);

        let record =
            AlgorithmComparison::new("naive", "nlogn").transform("b/wta/wta3", &metrics);

        assert_eq!(record.cells, ["wta", "64", "1.50", "4.50", "0.25", "21", "30"]);
        assert_eq!(record.size, Some(64.0));
        assert_eq!(record.primary_time, Some(4.5));
    }

    #[test]
    fn size_is_taken_from_the_other_side() {
        let metrics = lists(&[
            ("copar-time_sec", vec![MetricValue::Missing]),
            ("boa-num_states", vec![MetricValue::Int(12)]),
            ("boa-time_sec", vec![MetricValue::Float(0.5)]),
        ]);

        let record =
            AlgorithmComparison::new("copar", "boa").transform("b/ppm/ppm1", &metrics);

        assert_eq!(record.category, "ppm");
        assert_eq!(record.cells[1], "12");
        assert_eq!(record.cells[3], "n/a");
        assert_eq!(record.primary_time, None);
    }
}
