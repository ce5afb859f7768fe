use serde::{Deserialize, Serialize};

/// One observed call against a named release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub flags: Vec<String>,
}

impl Release {
    pub fn new(name: impl Into<String>, flags: &[String]) -> Self {
        Self {
            name: name.into(),
            flags: flags.to_vec(),
        }
    }
}

/// Expected outcome of an orchestration run, grouped by what happened to each release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affected {
    pub upgraded: Vec<Release>,
    pub deleted: Vec<Release>,
    pub failed: Vec<Release>,
}

impl Affected {
    pub fn is_empty(&self) -> bool {
        self.upgraded.is_empty() && self.deleted.is_empty() && self.failed.is_empty()
    }

    pub fn release_names(releases: &[Release]) -> Vec<&str> {
        releases.iter().map(|r| r.name.as_str()).collect()
    }
}
