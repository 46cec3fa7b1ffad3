use tracing::debug;
use crate::document::{DocumentTree, KIND_ELEMENT};
use crate::errors::{DocumentError, StripError};
use crate::report::StripReport;
use crate::targets::{MatchKind, RemovalMode, Target, TargetSpecification};

type NodeAction<D> = fn(&mut D, <D as DocumentTree>::Handle) -> Result<(), DocumentError>;

/// Adapter operation for each removal mode, indexed by `RemovalMode::index`.
fn removal_actions<D: DocumentTree>() -> [NodeAction<D>; 3] {
  [
    D::remove_node,
    D::clear_children,
    D::clear_children_and_attributes,
  ]
}

fn removal_action<D: DocumentTree>(mode: RemovalMode) -> NodeAction<D> {
  removal_actions::<D>()[mode.index()]
}

/// A target's name prepared for comparison against tree nodes.
struct Matcher<'a> {
  kind: MatchKind,
  name: &'a str,
  folded: String,
}

impl<'a> Matcher<'a> {
  fn new(kind: MatchKind, target: &'a Target) -> Self {
    Matcher {
      kind,
      name: &target.name,
      folded: target.name.to_lowercase(),
    }
  }

  fn matches<D: DocumentTree>(&self, doc: &D, node: D::Handle) -> bool {
    let is_element = doc.node_kind(node) == Some(KIND_ELEMENT);
    match self.kind {
      // whole attribute value, not a class token
      MatchKind::Class => is_element && doc.attribute(node, "class").map_or(false, |class| class.to_lowercase() == self.folded),
      MatchKind::Tag => is_element && doc.tag_name(node) == Some(self.name),
      MatchKind::Id => is_element && doc.attribute(node, "id") == Some(self.name),
      MatchKind::Other => doc.node_kind(node).map_or(false, |kind| kind.to_lowercase() == self.folded),
    }
  }
}

fn fail(report: StripReport, source: DocumentError) -> StripError {
  StripError::StripFailed {
    report: Box::new(report),
    source,
  }
}

/// Removes every node selected by `spec` from `doc` and reports which targets
/// found nothing.
///
/// The descendant snapshot is taken once and shared by all four passes. Nodes
/// already detached by an earlier target are skipped, so a removed node never
/// counts as a match again.
pub fn strip<D: DocumentTree>(doc: &mut D, spec: &TargetSpecification) -> Result<StripReport, StripError> {
  let mut report = StripReport::new(spec);
  let root = doc.root();
  let nodes = match doc.all_descendants(root) {
    Ok(nodes) => nodes,
    Err(error) => return Err(fail(report, error)),
  };
  debug!("stripping {} targets across {} nodes", spec.len(), nodes.len());

  for kind in MatchKind::ALL {
    for target in spec.targets(kind) {
      let matcher = Matcher::new(kind, target);
      let matches: Vec<D::Handle> = {
        let view: &D = doc;
        nodes
          .iter()
          .copied()
          .filter(|node| view.is_attached(*node) && matcher.matches(view, *node))
          .collect()
      };

      if matches.is_empty() {
        debug!("{} target {:?} not found", kind, target.name);
        report.record_unmatched(kind, target);
        continue;
      }

      // all handles must resolve before the first mutation of this target
      if let Some(foreign) = matches.iter().find(|node| !doc.contains(**node)) {
        let error = DocumentError::UnknownNode(format!("{:?}", foreign));
        return Err(fail(report, error));
      }

      let action = removal_action::<D>(target.remove);
      for node in &matches {
        if let Err(error) = action(doc, *node) {
          return Err(fail(report, error));
        }
      }
      debug!("{} target {:?} stripped {} nodes ({:?})", kind, target.name, matches.len(), target.remove);
    }
  }

  match doc.serialize_inner(root) {
    Ok(html) => report.result_html = Some(html),
    Err(error) => return Err(fail(report, error)),
  }
  Ok(report)
}
