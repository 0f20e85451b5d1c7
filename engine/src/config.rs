//! Engine configuration.

use serde::{Deserialize, Serialize};
use vgraph_core::check_repo;

use crate::VGraphResult;

fn default_check_patch_origs() -> bool {
    true
}

/// Settings for one `VGraph` instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VGraphConfig {
    /// The repo this graph owns.
    pub repo: String,
    /// Compare local state with the origs carried by a patch before
    /// overwriting it, failing `Node Mismatch` / `Edge Mismatch`.
    #[serde(default = "default_check_patch_origs")]
    pub check_patch_origs: bool,
}

impl VGraphConfig {
    /// Create a validated configuration with default settings.
    pub fn new(repo: impl Into<String>) -> VGraphResult<Self> {
        let config = Self {
            repo: repo.into(),
            check_patch_origs: default_check_patch_origs(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_patch_orig_check(mut self, enabled: bool) -> Self {
        self.check_patch_origs = enabled;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> VGraphResult<Self> {
        let config: VGraphConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VGraphResult<()> {
        check_repo(&self.repo)?;
        Ok(())
    }
}
