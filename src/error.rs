use std::{
    error,
    fmt::{self, Display},
    io,
};

use crate::layers::LayerId;

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate's error type.
#[derive(Debug)]
pub enum Error {
    /// Two things that must agree in size do not.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A layer dimension was zero.
    InvalidDimension { what: &'static str },
    /// The network has no layers.
    EmptyNetwork,
    /// `learn` was given a set with no samples.
    EmptyTrainingSet,
    /// An operation needed a network but none was created.
    UndefinedNetwork,
    /// A data set name that was never loaded.
    UnknownDataSet(String),
    /// An operation needed a selected data set but none was selected.
    NoDataSetSelected(&'static str),
    /// The delimited training file could not be parsed.
    MalformedTrainingFile { line: usize, reason: String },
    Io(io::Error),
    PositionOutOfRange { position: usize, len: usize },
    UnknownLayer(LayerId),
    InvalidParameter { what: &'static str, value: f64 },
    /// `backward` was called on a layer that has not run `forward`.
    MissingForwardPass,
    InvalidConfig(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "dimension mismatch in {what}: got {got}, expected {expected}"
            ),
            Error::InvalidDimension { what } => {
                write!(f, "{what} must be greater than zero")
            }
            Error::EmptyNetwork => write!(f, "the network has no layers"),
            Error::EmptyTrainingSet => write!(f, "the training set has no samples"),
            Error::UndefinedNetwork => {
                write!(f, "network is undefined, create or load a network first")
            }
            Error::UnknownDataSet(name) => {
                write!(f, "no data set has been loaded under the name {name:?}")
            }
            Error::NoDataSetSelected(kind) => write!(f, "no {kind} set is selected"),
            Error::MalformedTrainingFile { line, reason } => {
                write!(f, "malformed training file at line {line}: {reason}")
            }
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::PositionOutOfRange { position, len } => write!(
                f,
                "layer position {position} is out of range for a network of {len} layers"
            ),
            Error::UnknownLayer(id) => write!(f, "layer {id} is not part of this network"),
            Error::InvalidParameter { what, value } => {
                write!(f, "invalid value {value} for {what}")
            }
            Error::MissingForwardPass => {
                write!(f, "backward pass requested before any forward pass")
            }
            Error::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
