use serde::Serialize;
use serde_with::skip_serializing_none;
use crate::targets::{MatchKind, Target, TargetSpecification};

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripReport {
  pub requested: TargetSpecification,
  pub unmatched: TargetSpecification,
  #[serde(rename = "resultHtml")]
  pub result_html: Option<String>,
}

impl StripReport {
  pub fn new(requested: &TargetSpecification) -> Self {
    StripReport {
      requested: requested.clone(),
      unmatched: TargetSpecification::new(),
      result_html: None
    }
  }

  pub fn record_unmatched(&mut self, kind: MatchKind, target: &Target) {
    self.unmatched.push(kind, target.clone());
  }

  /// Requested targets that found at least one node.
  ///
  /// `unmatched` is filled in declaration order, so it is a subsequence of
  /// `requested` and a single forward scan tells the two apart, duplicates included.
  pub fn matched(&self, kind: MatchKind) -> Vec<&Target> {
    let mut pending = self.unmatched.targets(kind).iter().peekable();
    let mut matched = vec![];
    for target in self.requested.targets(kind) {
      if pending.peek() == Some(&target) {
        pending.next();
      } else {
        matched.push(target);
      }
    }
    matched
  }

  /// `matched` for every kind, gathered into one specification.
  pub fn matched_targets(&self) -> TargetSpecification {
    let mut matched = TargetSpecification::new();
    for kind in MatchKind::ALL {
      for target in self.matched(kind) {
        matched.push(kind, target.clone());
      }
    }
    matched
  }

  pub fn all_matched(&self) -> bool {
    self.unmatched.is_empty()
  }

  pub fn summary(&self) -> StripSummary {
    let mut summary = StripSummary::default();
    for kind in MatchKind::ALL {
      let unmatched = self.unmatched.targets(kind).len();
      let requested = self.requested.targets(kind).len();
      let counts = summary.kind_mut(kind);
      counts.matched = requested.saturating_sub(unmatched);
      counts.unmatched = unmatched;
    }
    summary
  }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindSummary {
  pub matched: usize,
  pub unmatched: usize,
}

/// Matched/unmatched target counts per match kind.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StripSummary {
  pub class: KindSummary,
  pub tag: KindSummary,
  pub id: KindSummary,
  pub other: KindSummary,
}

impl StripSummary {
  pub fn kind(&self, kind: MatchKind) -> KindSummary {
    match kind {
      MatchKind::Class => self.class,
      MatchKind::Tag => self.tag,
      MatchKind::Id => self.id,
      MatchKind::Other => self.other,
    }
  }

  fn kind_mut(&mut self, kind: MatchKind) -> &mut KindSummary {
    match kind {
      MatchKind::Class => &mut self.class,
      MatchKind::Tag => &mut self.tag,
      MatchKind::Id => &mut self.id,
      MatchKind::Other => &mut self.other,
    }
  }

  pub fn total_matched(&self) -> usize {
    MatchKind::ALL.iter().map(|kind| self.kind(*kind).matched).sum()
  }

  pub fn total_unmatched(&self) -> usize {
    MatchKind::ALL.iter().map(|kind| self.kind(*kind).unmatched).sum()
  }

  /// Adds another summary's counts, used to total a batch.
  pub fn absorb(&mut self, other: &StripSummary) {
    for kind in MatchKind::ALL {
      let counts = other.kind(kind);
      let target = self.kind_mut(kind);
      target.matched += counts.matched;
      target.unmatched += counts.unmatched;
    }
  }
}
