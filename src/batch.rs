use std::fs;
use std::path::{Path, PathBuf};
use chrono::Local;
use jwalk::WalkDir;
use serde::Serialize;
use tracing::{info, warn};
use crate::errors::FileError;
use crate::html_file::HtmlFile;
use crate::report::StripSummary;
use crate::targets::TargetSpecification;

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
  pub path: PathBuf,
  pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
  #[serde(rename = "outputDir")]
  pub output_dir: PathBuf,
  pub processed: usize,
  pub failed: Vec<FailedFile>,
  pub summary: StripSummary,
}

fn is_html_file(path: &Path) -> bool {
  path.extension()
    .and_then(|ext| ext.to_str())
    .map_or(false, |ext| ext.eq_ignore_ascii_case("html"))
}

/// All `.html` files below `dir`, recursively, sorted by path. Symlinks are
/// not followed, so a link back into the tree cannot loop.
pub fn list_html_files(dir: &Path) -> Result<Vec<PathBuf>, FileError> {
  if !dir.is_dir() {
    return Err(FileError::NotADirectory(dir.to_path_buf()));
  }
  let mut files = vec![];
  for entry in WalkDir::new(dir).follow_links(false).sort(true) {
    let entry = entry.map_err(|e| FileError::Walk {
      path: dir.to_path_buf(),
      message: e.to_string(),
    })?;
    if entry.file_type().is_file() {
      let path = entry.path();
      if is_html_file(&path) {
        files.push(path);
      }
    }
  }
  files.sort();
  Ok(files)
}

/// Sibling of `dir` named `<dir-name><suffix><timestamp>`.
pub fn output_dir_for(dir: &Path, suffix: &str) -> PathBuf {
  let name = dir.file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "site".to_owned());
  let stamp = Local::now().format("%Y%m%d%H%M%S%3f");
  let parent = dir.parent().unwrap_or(dir);
  parent.join(format!("{}{}{}", name, suffix, stamp))
}

/// Strips every HTML file below `dir` and writes the results to a fresh output
/// directory, mirroring relative paths. Per-file failures are recorded and the
/// batch carries on; a file whose strip aborted midway is still written.
pub fn strip_directory(dir: &Path, spec: &TargetSpecification, suffix: &str) -> Result<BatchReport, FileError> {
  let files = list_html_files(dir)?;
  let output_dir = output_dir_for(dir, suffix);
  fs::create_dir_all(&output_dir).map_err(|e| FileError::io(&output_dir, e))?;
  info!("{} files will be scanned for {} targets", files.len(), spec.len());

  let mut report = BatchReport {
    output_dir: output_dir.clone(),
    processed: 0,
    failed: vec![],
    summary: StripSummary::default(),
  };

  for path in files {
    let mut file = HtmlFile::new(&path);
    if let Err(error) = file.read() {
      warn!("skipping {}: {}", path.display(), error);
      report.failed.push(FailedFile { path, reason: error.to_string() });
      continue;
    }
    if let Err(error) = file.strip(Some(spec)) {
      report.failed.push(FailedFile { path: path.clone(), reason: error.to_string() });
    }
    if let Some(strip_report) = &file.report {
      report.summary.absorb(&strip_report.summary());
    }
    let relative = path.strip_prefix(dir).unwrap_or(&path);
    let dest = output_dir.join(relative);
    match file.save(&dest) {
      Ok(()) => report.processed += 1,
      Err(error) => {
        warn!("failed to save {}: {}", dest.display(), error);
        report.failed.push(FailedFile { path, reason: error.to_string() });
      }
    }
  }

  info!("stripped elements from {} html files, saved to {}", report.processed, output_dir.display());
  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::targets::{MatchKind, RemovalMode};

  fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }

  #[test]
  fn test_list_html_files_recurses_and_filters() {
    let root = tempfile::tempdir().unwrap();
    let site = root.path().join("site");
    write(&site.join("index.html"), "<p>a</p>");
    write(&site.join("docs/guide.HTML"), "<p>b</p>");
    write(&site.join("docs/notes.txt"), "c");
    write(&site.join("style.css"), "p {}");

    let files = list_html_files(&site).unwrap();
    let names: Vec<_> = files.iter().map(|p| p.strip_prefix(&site).unwrap().to_path_buf()).collect();
    assert_eq!(names, vec![PathBuf::from("docs/guide.HTML"), PathBuf::from("index.html")]);
  }

  #[test]
  fn test_list_html_files_rejects_non_directory() {
    let root = tempfile::tempdir().unwrap();
    let file = root.path().join("page.html");
    write(&file, "<p>a</p>");
    assert!(matches!(list_html_files(&file), Err(FileError::NotADirectory(_))));
  }

  #[cfg(unix)]
  #[test]
  fn test_list_html_files_ignores_symlink_cycles() {
    let root = tempfile::tempdir().unwrap();
    let site = root.path().join("site");
    write(&site.join("index.html"), "<p>a</p>");
    std::os::unix::fs::symlink(&site, site.join("loop")).unwrap();

    let files = list_html_files(&site).unwrap();
    assert_eq!(files, vec![site.join("index.html")]);

    let spec = TargetSpecification::new().with(MatchKind::Tag, "p", RemovalMode::ContentsOnly);
    let report = strip_directory(&site, &spec, "_Stripped_").unwrap();
    assert_eq!(report.processed, 1);
    assert!(!report.output_dir.join("loop").exists());
  }

  #[test]
  fn test_strip_directory_mirrors_tree() {
    let root = tempfile::tempdir().unwrap();
    let site = root.path().join("site");
    write(&site.join("index.html"), r#"<html><head></head><body><div class="ad">x</div><p>a</p></body></html>"#);
    write(&site.join("blog/post.html"), r#"<html><head><script>t()</script></head><body><p>b</p></body></html>"#);
    let spec = TargetSpecification::new()
      .with(MatchKind::Class, "ad", RemovalMode::ElementOnly)
      .with(MatchKind::Tag, "script", RemovalMode::ElementOnly);

    let report = strip_directory(&site, &spec, "_Stripped_").unwrap();
    assert_eq!(report.processed, 2);
    assert!(report.failed.is_empty());
    assert_eq!(report.output_dir.parent(), Some(root.path()));
    assert!(report.output_dir.file_name().unwrap().to_string_lossy().starts_with("site_Stripped_"));

    let index = fs::read_to_string(report.output_dir.join("index.html")).unwrap();
    assert_eq!(index, "<html><head></head><body><p>a</p></body></html>");
    let post = fs::read_to_string(report.output_dir.join("blog/post.html")).unwrap();
    assert_eq!(post, "<html><head></head><body><p>b</p></body></html>");

    // index.html has no script, post.html has no ad
    assert_eq!(report.summary.class.matched, 1);
    assert_eq!(report.summary.class.unmatched, 1);
    assert_eq!(report.summary.tag.matched, 1);
    assert_eq!(report.summary.tag.unmatched, 1);

    // sources are left untouched
    let original = fs::read_to_string(site.join("index.html")).unwrap();
    assert!(original.contains("class=\"ad\""));
  }
}
