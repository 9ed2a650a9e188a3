use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum TargetsError {
    /// A pattern references a placeholder that has no axis in the fill map.
    UnresolvedPlaceholder { pattern: String, name: String },
    /// Zipped axes (or aligned label inputs) have incompatible lengths.
    ShapeMismatch {
        axis: String,
        expected: usize,
        found: usize,
    },
    /// A stage's template needs an axis its fill map does not provide.
    MissingAxis { stage: String, axis: String },
    String(String),
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Csv(csv::Error),
}

impl Error for TargetsError {}

impl fmt::Display for TargetsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TargetsError::UnresolvedPlaceholder { pattern, name } => {
                write!(
                    f,
                    "Unresolved placeholder '{{{name}}}' in pattern '{pattern}'"
                )
            }
            TargetsError::ShapeMismatch {
                axis,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Shape mismatch: axis '{axis}' has length {found}, expected {expected}"
                )
            }
            TargetsError::MissingAxis { stage, axis } => {
                write!(f, "Stage '{stage}' is missing required axis '{axis}'")
            }
            TargetsError::String(s) => write!(f, "{s}"),
            TargetsError::Io(e) => write!(f, "{e}"),
            TargetsError::Yaml(e) => write!(f, "{e}"),
            TargetsError::Csv(e) => write!(f, "{e}"),
        }
    }
}

impl From<String> for TargetsError {
    fn from(err: String) -> Self {
        TargetsError::String(err)
    }
}

impl From<std::io::Error> for TargetsError {
    fn from(err: std::io::Error) -> Self {
        TargetsError::Io(err)
    }
}

impl From<serde_yaml::Error> for TargetsError {
    fn from(err: serde_yaml::Error) -> Self {
        TargetsError::Yaml(err)
    }
}

impl From<csv::Error> for TargetsError {
    fn from(err: csv::Error) -> Self {
        TargetsError::Csv(err)
    }
}
