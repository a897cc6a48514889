use crate::tools::CATEGORY;
use anyhow::Context;
use boa_bench_model::{category_of, AggregatedGroup, MetricLists, MetricValue};
use prettytable::format::{Alignment, FormatBuilder};
use prettytable::{Cell, Row, Table};
use std::cmp::Ordering;
use std::fs;
use std::fmt::Write;
use std::path::{Path, PathBuf};

mod algorithms;
mod mcrl2;

pub use algorithms::AlgorithmComparison;
pub use mcrl2::Mcrl2Comparison;

/// The cell content for values that could not be measured.
pub const NOT_AVAILABLE: &str = "n/a";

/// Represents the final report of a comparison.
pub trait BenchmarkReport {
    /// Writes the results of this report to the given directory.
    fn write_results(&self, output_dir: &Path) -> anyhow::Result<PathBuf>;
}

/// One rendered row of a comparison table, together with the values used for its layout.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayRecord {
    /// The benchmark family. Section breaks are placed where it changes.
    pub category: String,
    /// The primary size of the benchmark, used for sorting.
    pub size: Option<f64>,
    /// The primary timing value, compared against the noise floor.
    pub primary_time: Option<f64>,
    /// The rendered cells, one per header column.
    pub cells: Vec<String>,
}

/// Maps one entry of a merged group to a row of a comparison table.
pub trait RowTransform {
    /// Returns the column headers.
    fn header(&self) -> Vec<String>;

    /// Creates the row for the benchmark `key`.
    fn transform(&self, key: &str, metrics: &MetricLists) -> DisplayRecord;
}

/// Compares two rows for sorting.
pub type SortKey = fn(&DisplayRecord, &DisplayRecord) -> Ordering;

/// Extracts the value that separates the sections of a table.
pub type SectionKey = fn(&DisplayRecord) -> &str;

/// Controls the ordering, sectioning, and filtering of a comparison table.
#[derive(Clone, Copy)]
pub struct TableLayout {
    sort_key: SortKey,
    section_key: SectionKey,
    noise_floor: Option<f64>,
}

impl TableLayout {
    /// Creates a new [TableLayout] without a noise floor.
    pub fn new(sort_key: SortKey, section_key: SectionKey) -> Self {
        Self {
            sort_key,
            section_key,
            noise_floor: None,
        }
    }

    /// Drops rows whose primary timing value is below `noise_floor`.
    #[must_use]
    pub fn with_noise_floor(mut self, noise_floor: f64) -> Self {
        self.noise_floor = Some(noise_floor);
        self
    }

    fn is_noise(&self, record: &DisplayRecord) -> bool {
        match (self.noise_floor, record.primary_time) {
            (Some(floor), Some(time)) => time < floor,
            _ => false,
        }
    }
}

/// Sorts by category and then by size. Rows without a size come last within their category.
impl Default for TableLayout {
    fn default() -> Self {
        Self::new(by_category_then_size, by_category)
    }
}

/// Orders rows by category, then by ascending size.
pub fn by_category_then_size(lhs: &DisplayRecord, rhs: &DisplayRecord) -> Ordering {
    lhs.category
        .cmp(&rhs.category)
        .then_with(|| match (lhs.size, rhs.size) {
            (Some(lhs), Some(rhs)) => lhs.total_cmp(&rhs),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Sections a table by category.
pub fn by_category(record: &DisplayRecord) -> &str {
    &record.category
}

/// Renders a merged group as a plain-text table.
///
/// The table consists of a header line, a `=` rule, and one line per row. A `-` rule precedes the
/// first row of every new section (but not the very first row) and follows the last row. Rows
/// below the noise floor of `layout` are dropped before sorting and sectioning.
pub fn format_table(
    group: &AggregatedGroup,
    transform: &dyn RowTransform,
    layout: &TableLayout,
) -> anyhow::Result<String> {
    let records = layout_records(group, transform, layout);

    let mut table = Table::new();
    table.set_format(FormatBuilder::new().padding(0, 2).build());
    table.set_titles(aligned_row(&transform.header()));
    for record in &records {
        table.add_row(aligned_row(&record.cells));
    }

    let mut buffer = Vec::new();
    table.print(&mut buffer).context("Cannot render table")?;
    let rendered = String::from_utf8(buffer).context("Rendered table is not UTF-8")?;
    let mut lines = rendered.lines().map(str::trim_end);

    let header = lines.next().unwrap_or_default();
    let rows = lines.collect::<Vec<_>>();
    let width = rows
        .iter()
        .chain([&header])
        .map(|line| line.chars().count())
        .max()
        .unwrap_or_default();
    let major_rule = "=".repeat(width);
    let minor_rule = "-".repeat(width);

    let mut output = vec![header, major_rule.as_str()];
    let mut previous_section = None;
    for (record, line) in records.iter().zip(&rows) {
        let section = (layout.section_key)(record);
        if previous_section.is_some_and(|previous| previous != section) {
            output.push(&minor_rule);
        }
        previous_section = Some(section);
        output.push(line);
    }
    if !records.is_empty() {
        output.push(&minor_rule);
    }
    Ok(output.join("\n"))
}

/// Renders a merged group as the body of a LaTeX `tabular` environment.
///
/// Rows are filtered, sorted, and sectioned like in [format_table]. Cells are separated by `&`,
/// sections by `\midrule`.
pub fn format_latex(
    group: &AggregatedGroup,
    transform: &dyn RowTransform,
    layout: &TableLayout,
) -> anyhow::Result<String> {
    let records = layout_records(group, transform, layout);
    let header = transform.header();

    let mut output = String::new();
    let alignment = (0..header.len())
        .map(|i| if i == 0 { 'l' } else { 'r' })
        .collect::<String>();
    writeln!(output, "\\begin{{tabular}}{{{alignment}}}")?;
    writeln!(output, "\\toprule")?;
    writeln!(output, "{}", latex_row(&header))?;
    writeln!(output, "\\midrule")?;
    let mut previous_section = None;
    for record in &records {
        let section = (layout.section_key)(record);
        if previous_section.is_some_and(|previous| previous != section) {
            writeln!(output, "\\midrule")?;
        }
        previous_section = Some(section);
        writeln!(output, "{}", latex_row(&record.cells))?;
    }
    writeln!(output, "\\bottomrule")?;
    write!(output, "\\end{{tabular}}")?;
    Ok(output)
}

fn latex_row(cells: &[String]) -> String {
    let cells = cells.iter().map(|cell| escape_latex(cell)).collect::<Vec<_>>();
    format!("{} \\\\", cells.join(" & "))
}

/// Escapes the characters that have a special meaning in LaTeX text.
fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            '\\' => escaped.push_str("\\textbackslash{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Transforms every entry of the group, drops the noise, and sorts the remaining rows.
fn layout_records(
    group: &AggregatedGroup,
    transform: &dyn RowTransform,
    layout: &TableLayout,
) -> Vec<DisplayRecord> {
    let mut records = group
        .iter()
        .map(|(key, metrics)| transform.transform(key, metrics))
        .filter(|record| !layout.is_noise(record))
        .collect::<Vec<_>>();
    records.sort_by(layout.sort_key);
    records
}

/// Left-aligns the first column and right-aligns all others.
fn aligned_row(cells: &[String]) -> Row {
    Row::new(
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let alignment = if i == 0 {
                    Alignment::LEFT
                } else {
                    Alignment::RIGHT
                };
                Cell::new_align(cell, alignment)
            })
            .collect(),
    )
}

/// Returns the values of the metric `name` of the result set tagged with `tag`.
pub(crate) fn tagged_values<'metrics>(
    metrics: &'metrics MetricLists,
    tag: &str,
    name: &str,
) -> &'metrics [MetricValue] {
    metrics
        .get(&format!("{tag}-{name}"))
        .map_or(&[][..], Vec::as_slice)
}

/// Returns the first category recorded by one of the tagged result sets, or derives it from `key`.
pub(crate) fn recorded_category<const N: usize>(
    key: &str,
    metrics: &MetricLists,
    tags: [&str; N],
) -> String {
    tags.iter()
        .flat_map(|tag| tagged_values(metrics, tag, CATEGORY))
        .find_map(MetricValue::as_text)
        .map_or_else(|| category_of(Path::new(key)), str::to_owned)
}

/// Returns the arithmetic mean of the values.
///
/// Returns `None` if there are no values or if any value is not numeric (e.g., missing).
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[MetricValue]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum = values
        .iter()
        .map(MetricValue::as_f64)
        .sum::<Option<f64>>()?;
    Some(sum / values.len() as f64)
}

/// Renders the mean of the values, or [NOT_AVAILABLE].
pub fn render_mean(values: &[MetricValue]) -> String {
    render_optional(mean(values))
}

/// Renders a number, or [NOT_AVAILABLE].
pub fn render_optional(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), render_number)
}

/// Rounds to two decimals and drops the decimals of integral values.
pub fn render_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.2}")
    }
}

/// A rendered comparison table, written as `<name>_rep<repetitions>.txt`.
///
/// If a LaTeX rendering is attached, it is written next to it as `<name>_rep<repetitions>.tex`.
pub struct ComparisonReport {
    name: String,
    repetitions: u32,
    table: String,
    latex: Option<String>,
}

impl ComparisonReport {
    /// Creates a new [ComparisonReport].
    pub fn new(name: impl Into<String>, repetitions: u32, table: String) -> Self {
        Self {
            name: name.into(),
            repetitions,
            table,
            latex: None,
        }
    }

    /// Attaches a LaTeX rendering of the table.
    #[must_use]
    pub fn with_latex(mut self, latex: String) -> Self {
        self.latex = Some(latex);
        self
    }

    /// Returns the rendered table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the file name of this report.
    pub fn file_name(&self) -> String {
        format!("{}_rep{}.txt", self.name, self.repetitions)
    }

    /// Returns the file name of the LaTeX rendering.
    pub fn latex_file_name(&self) -> String {
        format!("{}_rep{}.tex", self.name, self.repetitions)
    }
}

impl BenchmarkReport for ComparisonReport {
    fn write_results(&self, output_dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Cannot create results directory '{}'", output_dir.display())
        })?;
        let path = output_dir.join(self.file_name());
        fs::write(&path, format!("{}\n", self.table))
            .with_context(|| format!("Cannot write report to '{}'", path.display()))?;

        if let Some(latex) = &self.latex {
            let latex_path = output_dir.join(self.latex_file_name());
            fs::write(&latex_path, format!("{latex}\n")).with_context(|| {
                format!("Cannot write LaTeX table to '{}'", latex_path.display())
            })?;
        }
        Ok(path)
    }
}
