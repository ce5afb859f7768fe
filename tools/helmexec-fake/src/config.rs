use crate::errors::HelmExecError;
use crate::executor::parse_version;
use crate::fake::keys::{DiffKey, ListKey};
use crate::fake::FakeHelmExecutor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialFixture {
    helm3: Option<bool>,
    version: Option<String>,
    fail_on_unexpected_list: Option<bool>,
    fail_on_unexpected_diff: Option<bool>,
    lists: Option<Vec<ListExpectation>>,
    diffs: Option<Vec<DiffExpectation>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListExpectation {
    pub filter: String,
    #[serde(default)]
    pub flags: Vec<String>,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffExpectation {
    pub name: String,
    pub chart: String,
    #[serde(default)]
    pub flags: Vec<String>,
    pub error: Option<String>,
}

/// Build a fake executor from a TOML fixture. Locks and callbacks are attached afterwards.
pub fn load_fixture(text: &str) -> Result<FakeHelmExecutor, HelmExecError> {
    let partial: PartialFixture =
        toml::from_str(text).map_err(|e| HelmExecError::ConfigParse(e.to_string()))?;
    let mut helm = FakeHelmExecutor::default();
    merge_partial_fixture(&mut helm, partial)?;
    Ok(helm)
}

fn merge_partial_fixture(
    helm: &mut FakeHelmExecutor,
    partial: PartialFixture,
) -> Result<(), HelmExecError> {
    if let Some(helm3) = partial.helm3 {
        helm.helm3 = helm3;
    }
    if let Some(value) = partial.fail_on_unexpected_list {
        helm.fail_on_unexpected_list = value;
    }
    if let Some(value) = partial.fail_on_unexpected_diff {
        helm.fail_on_unexpected_diff = value;
    }

    if let Some(version) = partial.version {
        let parsed = parse_version(&version).map_err(|e| {
            HelmExecError::InvalidConfig(format!("version {version:?} is not semver: {e}"))
        })?;
        helm.version = Some(parsed);
    }

    if let Some(lists) = partial.lists {
        let mut map = HashMap::with_capacity(lists.len());
        for entry in lists {
            let key = ListKey::new(entry.filter, &entry.flags);
            if map.contains_key(&key) {
                return Err(HelmExecError::InvalidConfig(format!(
                    "duplicate list expectation {key}"
                )));
            }
            map.insert(key, entry.output);
        }
        helm.lists = Some(map);
    }

    if let Some(diffs) = partial.diffs {
        let mut map = HashMap::with_capacity(diffs.len());
        for entry in diffs {
            let key = DiffKey::new(entry.name, entry.chart, &entry.flags);
            if map.contains_key(&key) {
                return Err(HelmExecError::InvalidConfig(format!(
                    "duplicate diff expectation {key}"
                )));
            }
            map.insert(key, entry.error.map(HelmExecError::Diff));
        }
        helm.diffs = Some(map);
    }

    Ok(())
}
