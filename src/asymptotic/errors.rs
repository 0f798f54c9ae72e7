use std::fmt;

use crate::symbolic::symbolic_engine::SymbolicError;

/// Errors raised while building rings, terms and expansions or while post-processing them.
#[derive(Debug, Clone, PartialEq)]
pub enum AsymptoticError {
    /// the dependent variable is not a bare symbol or clashes with a growth variable
    InvalidDependentVariable(String),
    /// "lower" or "upper"
    MissingBound(String),
    /// evaluating a coefficient at a bound did not give a single O-term
    NonCollapsingBound { coefficient: String, bound: String },
    /// a B-term has no threshold for one of its growth variables
    MissingThreshold { term: String, variable: String },
    NoSameOrderBound(String),
    NotBounded(String),
    NotTendingToZero(String),
    NoFiniteBound { derivative: String, upper: String },
    NotInvertible(String),
    IncompatibleRings,
    Unsupported(String),
    Config(String),
    Symbolic(SymbolicError),
}

impl fmt::Display for AsymptoticError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AsymptoticError::InvalidDependentVariable(name) => {
                write!(f, "A suitable dependent variable must be passed, got {}", name)
            }
            AsymptoticError::MissingBound(which) => write!(
                f,
                "The lower and upper bounds for the dependent variable must be set ({} is missing)",
                which
            ),
            AsymptoticError::NonCollapsingBound { coefficient, bound } => write!(
                f,
                "evaluating {} at {} does not give a single O-term",
                coefficient, bound
            ),
            AsymptoticError::MissingThreshold { term, variable } => {
                write!(f, "no threshold for {} given for {}", variable, term)
            }
            AsymptoticError::NoSameOrderBound(term) => {
                write!(f, "No same-order bound can be constructed for {}", term)
            }
            AsymptoticError::NotBounded(expansion) => write!(
                f,
                "Cannot determine numeric bound, the expansion {} does not seem to be bounded",
                expansion
            ),
            AsymptoticError::NotTendingToZero(term) => {
                write!(f, "the asymptotic term {} needs to tend to 0", term)
            }
            AsymptoticError::NoFiniteBound { derivative, upper } => write!(
                f,
                "Could not find a finite bound for the derivative {} on the interval [0, {}]",
                derivative, upper
            ),
            AsymptoticError::NotInvertible(expansion) => {
                write!(f, "cannot invert {}", expansion)
            }
            AsymptoticError::IncompatibleRings => {
                write!(f, "the expansions belong to different asymptotic rings")
            }
            AsymptoticError::Unsupported(msg) => write!(f, "unsupported operation: {}", msg),
            AsymptoticError::Config(msg) => write!(f, "invalid ring configuration: {}", msg),
            AsymptoticError::Symbolic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AsymptoticError {}

impl From<SymbolicError> for AsymptoticError {
    fn from(err: SymbolicError) -> Self {
        AsymptoticError::Symbolic(err)
    }
}

impl From<toml::de::Error> for AsymptoticError {
    fn from(err: toml::de::Error) -> Self {
        AsymptoticError::Config(err.to_string())
    }
}
