use std::fmt;
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::errors::TargetsError;

/// How much of a matched node is pruned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum RemovalMode {
  ElementOnly = 0,
  ContentsOnly = 1,
  ContentsAndAttributes = 2,
}

impl RemovalMode {
  pub fn index(self) -> usize {
    self as usize
  }
}

impl TryFrom<u8> for RemovalMode {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(RemovalMode::ElementOnly),
      1 => Ok(RemovalMode::ContentsOnly),
      2 => Ok(RemovalMode::ContentsAndAttributes),
      _ => Err(format!("invalid removal mode {}, expected 0, 1 or 2", value)),
    }
  }
}

impl From<RemovalMode> for u8 {
  fn from(mode: RemovalMode) -> u8 {
    mode as u8
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
  #[serde(rename = "class")]
  Class,
  #[serde(rename = "tag")]
  Tag,
  #[serde(rename = "id")]
  Id,
  #[serde(rename = "other")]
  Other,
}

impl MatchKind {
  /// Processing order of the stripping passes.
  pub const ALL: [MatchKind; 4] = [MatchKind::Class, MatchKind::Tag, MatchKind::Id, MatchKind::Other];

  pub fn key(&self) -> &'static str {
    match self {
      MatchKind::Class => "class",
      MatchKind::Tag => "tag",
      MatchKind::Id => "id",
      MatchKind::Other => "other",
    }
  }
}

impl fmt::Display for MatchKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.key())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
  pub name: String,
  pub remove: RemovalMode,
}

impl Target {
  #[cfg(test)]
  pub fn new(name: &str, remove: RemovalMode) -> Self {
    Target {
      name: name.to_owned(),
      remove
    }
  }
}

/// Removal targets grouped by the way they are matched against the tree.
/// Duplicates are allowed and are processed independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpecification {
  #[serde(default)]
  pub class: Vec<Target>,
  #[serde(default)]
  pub tag: Vec<Target>,
  #[serde(default)]
  pub id: Vec<Target>,
  #[serde(default)]
  pub other: Vec<Target>,
}

impl TargetSpecification {
  pub fn new() -> Self {
    TargetSpecification::default()
  }

  pub fn from_json(json: &str) -> Result<Self, TargetsError> {
    serde_json::from_str(json).map_err(TargetsError::Parse)
  }

  pub fn targets(&self, kind: MatchKind) -> &[Target] {
    match kind {
      MatchKind::Class => &self.class,
      MatchKind::Tag => &self.tag,
      MatchKind::Id => &self.id,
      MatchKind::Other => &self.other,
    }
  }

  pub fn targets_mut(&mut self, kind: MatchKind) -> &mut Vec<Target> {
    match kind {
      MatchKind::Class => &mut self.class,
      MatchKind::Tag => &mut self.tag,
      MatchKind::Id => &mut self.id,
      MatchKind::Other => &mut self.other,
    }
  }

  pub fn push(&mut self, kind: MatchKind, target: Target) {
    self.targets_mut(kind).push(target);
  }

  #[cfg(test)]
  pub fn with(mut self, kind: MatchKind, name: &str, remove: RemovalMode) -> Self {
    self.push(kind, Target::new(name, remove));
    self
  }

  /// Number of targets per kind.
  pub fn counts(&self) -> TargetCounts {
    TargetCounts {
      class: self.class.len(),
      tag: self.tag.len(),
      id: self.id.len(),
      other: self.other.len(),
    }
  }

  pub fn len(&self) -> usize {
    MatchKind::ALL.iter().map(|kind| self.targets(*kind).len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() < 1
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetCounts {
  pub class: usize,
  pub tag: usize,
  pub id: usize,
  pub other: usize,
}

pub fn load_targets(path: &Path) -> Result<TargetSpecification, TargetsError> {
  let json = fs::read_to_string(path).map_err(|source| TargetsError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  TargetSpecification::from_json(&json)
}
