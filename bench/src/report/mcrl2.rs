use crate::extract::TIME_SEC;
use crate::report::{
    mean, recorded_category, render_mean, render_optional, tagged_values, DisplayRecord,
    RowTransform,
};
use crate::tools::{
    BOA_TAG, MCRL2_TAG, MEM_MB, NUM_PARTITIONS, NUM_STATES, SELF_REPORT,
};
use boa_bench_model::{MetricLists, MetricValue};

/// Compares boa with ltsconvert on a merged group of both tools' results.
///
/// The boa results must be tagged with `boa_tag`, the ltsconvert results with `mcrl2_tag`. The
/// reduction is derived from the boa state counts, and the speed-up is the ratio of the reduction
/// time reported by ltsconvert to the user time of boa.
pub struct Mcrl2Comparison {
    boa_tag: String,
    mcrl2_tag: String,
}

impl Mcrl2Comparison {
    /// Creates a new [Mcrl2Comparison].
    pub fn new(boa_tag: impl Into<String>, mcrl2_tag: impl Into<String>) -> Self {
        Self {
            boa_tag: boa_tag.into(),
            mcrl2_tag: mcrl2_tag.into(),
        }
    }

    fn boa<'metrics>(
        &self,
        metrics: &'metrics MetricLists,
        name: &str,
    ) -> &'metrics [MetricValue] {
        tagged_values(metrics, &self.boa_tag, name)
    }

    fn mcrl2<'metrics>(
        &self,
        metrics: &'metrics MetricLists,
        name: &str,
    ) -> &'metrics [MetricValue] {
        tagged_values(metrics, &self.mcrl2_tag, name)
    }
}

impl Default for Mcrl2Comparison {
    fn default() -> Self {
        Self::new(BOA_TAG, MCRL2_TAG)
    }
}

impl RowTransform for Mcrl2Comparison {
    fn header(&self) -> Vec<String> {
        [
            "type",
            "states",
            "partitions",
            "reduction (%)",
            "mcrl2 (s)",
            "boa (s)",
            "speed-up",
            "mcrl2 (MB)",
            "boa (MB)",
        ]
        .map(str::to_owned)
        .to_vec()
    }

    fn transform(&self, key: &str, metrics: &MetricLists) -> DisplayRecord {
        let states = mean(self.boa(metrics, NUM_STATES));
        let partitions = mean(self.boa(metrics, NUM_PARTITIONS));
        let mcrl2_time = mean(self.mcrl2(metrics, SELF_REPORT));
        let boa_time = mean(self.boa(metrics, TIME_SEC));

        let reduction = match (states, partitions) {
            (Some(states), Some(partitions)) if states > 0.0 => {
                Some((1.0 - partitions / states) * 100.0)
            }
            _ => None,
        };
        let speed_up = match (mcrl2_time, boa_time) {
            (Some(mcrl2_time), Some(boa_time)) if boa_time > 0.0 => {
                Some(mcrl2_time / boa_time)
            }
            _ => None,
        };

        let tags = [self.boa_tag.as_str(), self.mcrl2_tag.as_str()];
        let category = recorded_category(key, metrics, tags);
        DisplayRecord {
            cells: vec![
                category.clone(),
                render_optional(states),
                render_optional(partitions),
                render_optional(reduction),
                render_optional(mcrl2_time),
                render_optional(boa_time),
                render_optional(speed_up),
                render_mean(self.mcrl2(metrics, MEM_MB)),
                render_mean(self.boa(metrics, MEM_MB)),
            ],
            category,
            size: states,
            primary_time: mcrl2_time,
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
    fn derives_reduction_and_speed_up() {
        let metrics = lists(&[
            ("boa-category", vec!["wlan".into(), "wlan".into()]),
            ("boa-num_states", vec![MetricValue::Int(200), MetricValue::Int(200)]),
            ("boa-num_partitions", vec![MetricValue::Int(50), MetricValue::Int(50)]),
            ("boa-time_sec", vec![MetricValue::Float(0.5), MetricValue::Float(1.5)]),
            ("boa-mem_mb", vec![MetricValue::Float(10.0), MetricValue::Float(11.0)]),
            ("mcrl-selfreport", vec![MetricValue::Float(3.0), MetricValue::Float(5.0)]),
            ("mcrl-mem_mb", vec![MetricValue::Float(100.25)]),
        ]);

        let record = Mcrl2Comparison::default().transform("benchmarks/wlan/wlan0", &metrics);

        assert_eq!(
            record.cells,
            ["wlan", "200", "50", "75", "4", "1", "4", "100.25", "10.50"]
        );
        assert_eq!(record.category, "wlan");
        assert_eq!(record.size, Some(200.0));
        assert_eq!(record.primary_time, Some(4.0));
    }

    #[test]
    fn timed_out_measurements_are_not_available() {
        let metrics = lists(&[
            ("boa-num_states", vec![MetricValue::Int(10)]),
            ("boa-num_partitions", vec![MetricValue::Int(10)]),
            ("boa-time_sec", vec![MetricValue::Float(0.2)]),
            ("mcrl-category", vec!["fms".into()]),
            ("mcrl-selfreport", vec![MetricValue::Float(3.0), MetricValue::Missing]),
            ("mcrl-mem_mb", vec![MetricValue::Float(9.0), MetricValue::Missing]),
        ]);

        let record = Mcrl2Comparison::default().transform("x/fms/fms_n1", &metrics);

        assert_eq!(record.category, "fms");
        assert_eq!(record.cells[3], "0");
        assert_eq!(record.cells[4], "n/a");
        assert_eq!(record.cells[6], "n/a");
        assert_eq!(record.cells[7], "n/a");
        assert_eq!(record.primary_time, None);
    }

    #[test]
    fn category_falls_back_to_key() {
        let record =
            Mcrl2Comparison::default().transform("bench/hesselink/h1", &MetricLists::new());
        assert_eq!(record.category, "hesselink");
        assert!(record.cells[1..].iter().all(|cell| cell == "n/a"));
    }
}
