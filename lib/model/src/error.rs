use crate::Coercion;
use thiserror::Error;

/// An error that occurs when a single value is extracted from the textual output of a tool.
///
/// All of these errors are fatal: they indicate that the output format of the benchmarked tool
/// has drifted and its numbers must not be interpreted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The pattern did not match at all.
    #[error("Pattern `{pattern}` did not match. Offending text:\n{text}")]
    NoMatch {
        /// The pattern that was applied.
        pattern: String,
        /// The full text that the pattern was applied to.
        text: String,
    },
    /// The pattern matched more than once.
    #[error("Pattern `{pattern}` matched {count} times instead of once. Offending text:\n{text}")]
    AmbiguousMatch {
        /// The pattern that was applied.
        pattern: String,
        /// The number of matches.
        count: usize,
        /// The full text that the pattern was applied to.
        text: String,
    },
    /// The matched text could not be converted into the declared type.
    #[error("Cannot coerce `{raw}` into a value of type {coercion}")]
    Coercion {
        /// The matched text.
        raw: String,
        /// The declared type.
        coercion: Coercion,
    },
}

/// An [ExtractError] attributed to the metric that was being extracted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Cannot extract metric `{metric}`")]
pub struct MetricExtractError {
    /// The name of the metric.
    pub metric: String,
    /// The cause.
    #[source]
    pub error: ExtractError,
}

/// An error returned when two aggregated groups cannot be merged.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    /// The groups do not describe the same set of benchmarks.
    #[error("Cannot merge groups with different keys.\nLeft keys: {left:?}\nRight keys: {right:?}")]
    KeySetMismatch {
        /// All keys of the left operand.
        left: Vec<String>,
        /// All keys of the right operand.
        right: Vec<String>,
    },
}

/// An error returned when no benchmark identity key can be derived for a result row.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdentityKeyError {
    /// The row contains none of the recognized file fields.
    #[error("Result row has none of the file fields {fields:?}: {row}")]
    MissingFileField {
        /// The recognized file fields.
        fields: Vec<String>,
        /// The offending row.
        row: String,
    },
    /// The file field does not hold a path that is long enough to strip the suffix.
    #[error("File field `{field}` does not hold a path with a {suffix_len} character suffix: {row}")]
    InvalidFileField {
        /// The file field.
        field: String,
        /// The length of the suffix to strip.
        suffix_len: usize,
        /// The offending row.
        row: String,
    },
}
