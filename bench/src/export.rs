use anyhow::Context;
use boa_bench_model::{MetricValue, ResultSet};
use itertools::Itertools;
use std::io::Write;

/// The column that holds the timeout flag.
pub const TIMED_OUT_COLUMN: &str = "timed_out";

/// Writes a result set as CSV.
///
/// The header consists of every metric name that occurs in the set (sorted) followed by
/// [TIMED_OUT_COLUMN]. Missing values and metrics a row does not define are empty cells.
pub fn write_csv<W: Write>(results: &ResultSet, writer: W) -> anyhow::Result<()> {
    let columns = results
        .iter()
        .flat_map(|result| result.metrics().keys())
        .sorted()
        .dedup()
        .collect::<Vec<_>>();

    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(columns.iter().map(|c| c.as_str()).chain([TIMED_OUT_COLUMN]))
        .context("Cannot write CSV header")?;
    for result in results {
        let cells = columns
            .iter()
            .map(|column| match result.get(column) {
                None | Some(MetricValue::Missing) => String::new(),
                Some(value) => value.to_string(),
            })
            .chain([result.is_timed_out().to_string()]);
        writer
            .write_record(cells)
            .with_context(|| format!("Cannot write CSV row {result}"))?;
    }
    writer.flush().context("Cannot flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_bench_model::RunResult;

    #[test]
    fn rows_share_one_header() -> anyhow::Result<()> {
        let mut completed = RunResult::new("a.aut", "bisim");
        completed.insert("selfreport", 1.5);
        completed.insert("mem_kb", 2048_i64);
        let timed_out = RunResult::timed_out("b.aut", "bisim", ["selfreport"]);
        let results = ResultSet::from(vec![completed, timed_out]);

        let mut buffer = Vec::new();
        write_csv(&results, &mut buffer)?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "\
algorithm,file,mem_kb,selfreport,timed_out
bisim,a.aut,2048,1.5,false
bisim,b.aut,,,true
"
        );
        Ok(())
    }
}
