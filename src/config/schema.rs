use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::grading::GradingConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub grading: GradingConfig,

    /// Account that saved calculations are filed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Saved calculations file (defaults to ~/.config/gradecalc/saved.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}
