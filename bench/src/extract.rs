use boa_bench_model::{Coercion, ExtractError, MetricExtractError, MetricValue};
use regex::Regex;

/// The user time reported by the profiler, in seconds.
pub const TIME_SEC: &str = "time_sec";
/// The maximum resident set size reported by the profiler, in kB.
pub const MEM_KB: &str = "mem_kb";

/// Extracts a single value from `text`.
///
/// `pattern` must match exactly once. The first capture group (or the whole match if the pattern
/// has no group) is coerced into the declared type. Zero or multiple matches are errors, as they
/// indicate that the output format of the tool has changed.
pub fn extract(
    pattern: &Regex,
    text: &str,
    coercion: Coercion,
) -> Result<MetricValue, ExtractError> {
    let mut matches = pattern.captures_iter(text);
    let Some(captures) = matches.next() else {
        return Err(ExtractError::NoMatch {
            pattern: pattern.to_string(),
            text: text.to_owned(),
        });
    };

    let additional = matches.count();
    if additional > 0 {
        return Err(ExtractError::AmbiguousMatch {
            pattern: pattern.to_string(),
            count: additional + 1,
            text: text.to_owned(),
        });
    }

    let raw = captures
        .get(1)
        .or_else(|| captures.get(0))
        .map_or("", |m| m.as_str());
    coercion.coerce(raw)
}

/// The output stream a metric is extracted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputSource {
    /// The standard output of the benchmarked program.
    Program,
    /// The output of the profiler (standard error of the wrapped invocation).
    Profiler,
}

/// A named, typed metric bound to an extraction pattern.
#[derive(Clone, Debug)]
pub struct MetricField {
    name: String,
    source: OutputSource,
    pattern: Regex,
    coercion: Coercion,
}

impl MetricField {
    /// Creates a new [MetricField].
    pub fn new(
        name: impl Into<String>,
        source: OutputSource,
        pattern: &str,
        coercion: Coercion,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            source,
            pattern: Regex::new(pattern)?,
            coercion,
        })
    }

    /// Creates a field that expects a line `<name>: <value>` in the program output.
    pub fn line(name: impl Into<String>, coercion: Coercion) -> Result<Self, regex::Error> {
        let name = name.into();
        let pattern = format!(r"(?m)^{}:[ \t]*(.*?)[ \t\r]*$", regex::escape(&name));
        Self::new(name, OutputSource::Program, &pattern, coercion)
    }

    /// Returns the metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extracts this field from the matching output stream.
    pub fn extract(
        &self,
        program_output: &str,
        profiler_output: &str,
    ) -> Result<MetricValue, MetricExtractError> {
        let text = match self.source {
            OutputSource::Program => program_output,
            OutputSource::Profiler => profiler_output,
        };
        extract(&self.pattern, text, self.coercion).map_err(|error| MetricExtractError {
            metric: self.name.clone(),
            error,
        })
    }
}

/// An explicit list of the metrics a tool reports.
///
/// Extraction either yields a value for every field or fails with the first error.
#[derive(Clone, Debug, Default)]
pub struct MetricSchema {
    fields: Vec<MetricField>,
}

impl MetricSchema {
    /// Creates a new [MetricSchema].
    pub fn new(fields: Vec<MetricField>) -> Self {
        Self { fields }
    }

    /// The metrics every profiled invocation reports: [TIME_SEC] and [MEM_KB].
    pub fn profiler() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            MetricField::new(
                TIME_SEC,
                OutputSource::Profiler,
                r"User time \(seconds\): ([0-9]+\.[0-9]+)",
                Coercion::Float,
            )?,
            MetricField::new(
                MEM_KB,
                OutputSource::Profiler,
                r"Maximum resident set size \(kbytes\): ([0-9]+)",
                Coercion::Int,
            )?,
        ]))
    }

    /// Appends `fields` to this schema.
    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = MetricField>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Returns the names of all fields.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(MetricField::name)
    }

    /// Extracts all fields.
    pub fn extract(
        &self,
        program_output: &str,
        profiler_output: &str,
    ) -> Result<Vec<(String, MetricValue)>, MetricExtractError> {
        self.fields
            .iter()
            .map(|field| {
                let value = field.extract(program_output, profiler_output)?;
                Ok((field.name.clone(), value))
            })
            .collect()
    }
}
