use std::path::PathBuf;
use thiserror::Error;
use crate::report::StripReport;

#[derive(Debug, Error)]
pub enum DocumentError {
  #[error("node {0} does not belong to this document")]
  UnknownNode(String),

  #[error("failed to serialize document")]
  Serialize(#[source] std::io::Error),

  #[error("serialized document is not valid UTF-8")]
  Encoding(#[source] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum StripError {
  #[error("invalid input: {0}")]
  InvalidInput(&'static str),

  /// The walk aborted; `report` holds the accounting gathered before the fault.
  #[error("stripping failed")]
  StripFailed {
    report: Box<StripReport>,
    #[source]
    source: DocumentError,
  },
}

impl StripError {
  pub fn partial_report(&self) -> Option<&StripReport> {
    match self {
      StripError::StripFailed { report, .. } => Some(report),
      StripError::InvalidInput(_) => None,
    }
  }
}

#[derive(Debug, Error)]
pub enum TargetsError {
  #[error("failed to read target specification {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid target specification")]
  Parse(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FileError {
  #[error("{0} is not a directory")]
  NotADirectory(PathBuf),

  #[error("i/o error on {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to walk {path}: {message}")]
  Walk {
    path: PathBuf,
    message: String,
  },

  #[error("{0} has not been read")]
  NotLoaded(PathBuf),

  #[error(transparent)]
  Document(#[from] DocumentError),
}

impl FileError {
  pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
    FileError::Io {
      path: path.to_path_buf(),
      source,
    }
  }
}
