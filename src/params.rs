use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use crate::targets::TargetSpecification;

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StripParams {
  pub html: Option<String>,
  pub targets: Option<TargetSpecification>,
  pub fragment: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StripDirParams {
  pub dir: Option<String>,
  pub targets: Option<TargetSpecification>,
}
