use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::document::HtmlDocument;
use crate::errors::{FileError, StripError};
use crate::report::StripReport;
use crate::strip::strip;
use crate::targets::TargetSpecification;

/// An HTML file on disk together with its parsed tree and last strip outcome.
#[derive(Debug, Clone)]
pub struct HtmlFile {
  pub path: PathBuf,
  document: Option<HtmlDocument>,
  pub stripped: bool,
  pub report: Option<StripReport>,
}

impl HtmlFile {
  pub fn new(path: &Path) -> Self {
    HtmlFile {
      path: path.to_path_buf(),
      document: None,
      stripped: false,
      report: None
    }
  }

  /// Loads and parses the file as a full document, replacing any earlier tree.
  pub fn read(&mut self) -> Result<(), FileError> {
    let source = fs::read_to_string(&self.path).map_err(|e| FileError::io(&self.path, e))?;
    self.document = Some(HtmlDocument::parse_document(&source));
    self.stripped = false;
    self.report = None;
    Ok(())
  }

  /// Strips the loaded document in place. A missing document or specification
  /// is rejected before anything is touched. A failed run still keeps its
  /// partial report on the file.
  pub fn strip(&mut self, targets: Option<&TargetSpecification>) -> Result<&StripReport, StripError> {
    let Some(document) = self.document.as_mut() else {
      return Err(StripError::InvalidInput("html document has not been loaded"));
    };
    let Some(targets) = targets else {
      return Err(StripError::InvalidInput("no target specification supplied"));
    };
    match strip(document, targets) {
      Ok(report) => {
        self.stripped = true;
        info!("stripped {}: {} targets matched, {} not found", self.path.display(), report.summary().total_matched(), report.summary().total_unmatched());
        let report: &StripReport = self.report.insert(report);
        Ok(report)
      }
      Err(error) => {
        warn!("failed to strip {}: {}", self.path.display(), error);
        self.report = error.partial_report().cloned();
        Err(error)
      }
    }
  }

  /// Writes the current tree to `dest`, creating missing parent directories.
  pub fn save(&self, dest: &Path) -> Result<(), FileError> {
    let document = self.document.as_ref().ok_or_else(|| FileError::NotLoaded(self.path.clone()))?;
    let html = document.to_html()?;
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).map_err(|e| FileError::io(parent, e))?;
    }
    fs::write(dest, html).map_err(|e| FileError::io(dest, e))
  }
}
