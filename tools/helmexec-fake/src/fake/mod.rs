//! In-process stand-in for the Helm executor.
//!
//! `FakeHelmExecutor` records every call it receives and answers from
//! expectations registered by the test, falling back to fixed defaults.
//! Names (or charts, for dependency operations) containing [`SENTINEL`]
//! fail without being recorded.

pub mod guard;
pub mod keys;

use crate::errors::HelmExecError;
use crate::executor::{
    parse_version, precedence_at_least, ChartMetadata, HelmContext, HelmExecutor, RegistryLogin,
    RepoSpec, Version,
};
use crate::logging::append_run_log;
use crate::types::Release;
use guard::{guarded, SharedGuard};
use keys::{DiffKey, ListKey};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SENTINEL: &str = "error";
pub const DEFAULT_LIST_OUTPUT: &str = "dummy non-empty helm-list output";
pub const KNOWN_CHART_PATH: &str = "../../foo-bar";
pub const KNOWN_CHART_VERSION: &str = "3.2.0";

pub type UpdateDepsCallback = Arc<dyn Fn(&str) -> Result<(), HelmExecError> + Send + Sync>;

#[derive(Default)]
pub struct FakeHelmExecutor {
    pub lists: Option<HashMap<ListKey, String>>,
    pub diffs: Option<HashMap<DiffKey, Option<HelmExecError>>>,
    pub fail_on_unexpected_diff: bool,
    pub fail_on_unexpected_list: bool,
    pub version: Option<semver::Version>,
    pub helm3: bool,
    pub update_deps_callbacks: HashMap<String, UpdateDepsCallback>,

    pub releases_lock: Option<SharedGuard>,
    pub charts_lock: Option<SharedGuard>,
    pub diff_lock: Option<SharedGuard>,

    charts: Mutex<Vec<String>>,
    repo: Mutex<Vec<String>>,
    releases: Mutex<Vec<Release>>,
    deleted: Mutex<Vec<Release>>,
    linted: Mutex<Vec<Release>>,
    templated: Mutex<Vec<Release>>,
    diffed: Mutex<Vec<Release>>,
}

impl FakeHelmExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(
        mut self,
        filter: impl Into<String>,
        flags: &[String],
        output: impl Into<String>,
    ) -> Self {
        self.lists
            .get_or_insert_with(HashMap::new)
            .insert(ListKey::new(filter, flags), output.into());
        self
    }

    pub fn with_diff(
        mut self,
        name: impl Into<String>,
        chart: impl Into<String>,
        flags: &[String],
        outcome: Option<HelmExecError>,
    ) -> Self {
        self.diffs
            .get_or_insert_with(HashMap::new)
            .insert(DiffKey::new(name, chart, flags), outcome);
        self
    }

    /// Fail on list and diff calls that match no registered expectation.
    pub fn strict(mut self) -> Self {
        self.fail_on_unexpected_list = true;
        self.fail_on_unexpected_diff = true;
        self
    }

    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_update_deps_callback(
        mut self,
        chart: impl Into<String>,
        callback: impl Fn(&str) -> Result<(), HelmExecError> + Send + Sync + 'static,
    ) -> Self {
        self.update_deps_callbacks
            .insert(chart.into(), Arc::new(callback));
        self
    }

    pub fn with_releases_lock(mut self, guard: SharedGuard) -> Self {
        self.releases_lock = Some(guard);
        self
    }

    pub fn with_charts_lock(mut self, guard: SharedGuard) -> Self {
        self.charts_lock = Some(guard);
        self
    }

    pub fn with_diff_lock(mut self, guard: SharedGuard) -> Self {
        self.diff_lock = Some(guard);
        self
    }

    pub fn charts(&self) -> Vec<String> {
        self.charts.lock().expect("charts lock").clone()
    }

    /// Arguments of the most recent `add_repo` call, empty if none.
    pub fn repo(&self) -> Vec<String> {
        self.repo.lock().expect("repo lock").clone()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.releases.lock().expect("releases lock").clone()
    }

    pub fn deleted(&self) -> Vec<Release> {
        self.deleted.lock().expect("deleted lock").clone()
    }

    pub fn linted(&self) -> Vec<Release> {
        self.linted.lock().expect("linted lock").clone()
    }

    pub fn templated(&self) -> Vec<Release> {
        self.templated.lock().expect("templated lock").clone()
    }

    pub fn diffed(&self) -> Vec<Release> {
        self.diffed.lock().expect("diffed lock").clone()
    }

    fn record_release(
        &self,
        operation: &str,
        list: &Mutex<Vec<Release>>,
        guard: Option<&SharedGuard>,
        name: &str,
        flags: &[String],
    ) {
        let release = Release::new(name, flags);
        guarded(guard, || list.lock().expect("release list lock").push(release));
        append_run_log(
            "debug",
            &format!("helm.{operation}.recorded"),
            json!({
                "operation": operation,
                "name": name,
                "flags": flags
            }),
        );
    }

    fn record_chart(&self, operation: &str, chart: &str) {
        guarded(self.charts_lock.as_ref(), || {
            self.charts
                .lock()
                .expect("charts lock")
                .push(chart.to_string());
        });
        append_run_log(
            "debug",
            &format!("helm.{operation}.chart_recorded"),
            json!({
                "operation": operation,
                "chart": chart
            }),
        );
    }
}

fn check_sentinel(operation: &'static str, target: &str) -> Result<(), HelmExecError> {
    if !target.contains(SENTINEL) {
        return Ok(());
    }
    append_run_log(
        "warn",
        &format!("helm.{operation}.simulated_failure"),
        json!({
            "operation": operation,
            "target": target
        }),
    );
    Err(HelmExecError::Simulated {
        operation,
        target: target.to_string(),
    })
}

impl HelmExecutor for FakeHelmExecutor {
    fn set_extra_args(&mut self, _args: &[String]) {}

    fn set_helm_binary(&mut self, _bin: &str) {}

    fn set_enable_live_output(&mut self, _enable: bool) {}

    fn set_disable_force_update(&mut self, _disable: bool) {}

    fn add_repo(&self, repo: &RepoSpec) -> Result<(), HelmExecError> {
        *self.repo.lock().expect("repo lock") = repo.to_args();
        append_run_log(
            "debug",
            "helm.add_repo.recorded",
            json!({
                "operation": "add_repo",
                "name": repo.name,
                "url": repo.url
            }),
        );
        Ok(())
    }

    fn update_repo(&self) -> Result<(), HelmExecError> {
        Ok(())
    }

    fn registry_login(&self, _login: &RegistryLogin) -> Result<(), HelmExecError> {
        Ok(())
    }

    fn build_deps(&self, _name: &str, chart: &str, _flags: &[String]) -> Result<(), HelmExecError> {
        check_sentinel("build_deps", chart)?;
        self.record_chart("build_deps", chart);
        Ok(())
    }

    fn update_deps(&self, chart: &str) -> Result<(), HelmExecError> {
        check_sentinel("update_deps", chart)?;
        self.record_chart("update_deps", chart);

        if let Some(callback) = self.update_deps_callbacks.get(chart) {
            callback(chart)?;
        }
        Ok(())
    }

    fn sync_release(
        &self,
        _context: &HelmContext,
        name: &str,
        chart: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError> {
        check_sentinel("sync", name)?;
        self.record_release(
            "sync",
            &self.releases,
            self.releases_lock.as_ref(),
            name,
            flags,
        );
        self.record_chart("sync", chart);
        Ok(())
    }

    fn diff_release(
        &self,
        _context: &HelmContext,
        name: &str,
        chart: &str,
        _suppress_diff: bool,
        flags: &[String],
    ) -> Result<(), HelmExecError> {
        self.record_release("diff", &self.diffed, self.diff_lock.as_ref(), name, flags);

        let Some(diffs) = &self.diffs else {
            return Ok(());
        };

        let key = DiffKey::new(name, chart, flags);
        match diffs.get(&key) {
            Some(outcome) => match outcome {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            None if self.fail_on_unexpected_diff => {
                append_run_log(
                    "warn",
                    "helm.diff.unexpected_key",
                    json!({
                        "operation": "diff",
                        "key": key.to_string()
                    }),
                );
                Err(HelmExecError::UnexpectedDiff { key })
            }
            None => Ok(()),
        }
    }

    fn template_release(
        &self,
        name: &str,
        _chart: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError> {
        check_sentinel("template", name)?;
        self.record_release("template", &self.templated, None, name, flags);
        Ok(())
    }

    fn fetch(&self, _chart: &str, _flags: &[String]) -> Result<(), HelmExecError> {
        Ok(())
    }

    fn chart_pull(&self, _chart: &str, _path: &str, _flags: &[String]) -> Result<(), HelmExecError> {
        Ok(())
    }

    fn chart_export(&self, _chart: &str, _path: &str) -> Result<(), HelmExecError> {
        Ok(())
    }

    fn lint(&self, name: &str, _chart: &str, flags: &[String]) -> Result<(), HelmExecError> {
        check_sentinel("lint", name)?;
        self.record_release("lint", &self.linted, None, name, flags);
        Ok(())
    }

    fn release_status(
        &self,
        _context: &HelmContext,
        name: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError> {
        check_sentinel("status", name)?;
        self.record_release(
            "status",
            &self.releases,
            self.releases_lock.as_ref(),
            name,
            flags,
        );
        Ok(())
    }

    fn delete_release(
        &self,
        _context: &HelmContext,
        name: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError> {
        check_sentinel("delete", name)?;
        self.record_release("delete", &self.deleted, None, name, flags);
        Ok(())
    }

    fn test_release(
        &self,
        _context: &HelmContext,
        name: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError> {
        check_sentinel("test", name)?;
        self.record_release(
            "test",
            &self.releases,
            self.releases_lock.as_ref(),
            name,
            flags,
        );
        Ok(())
    }

    fn list(
        &self,
        _context: &HelmContext,
        filter: &str,
        flags: &[String],
    ) -> Result<String, HelmExecError> {
        let Some(lists) = &self.lists else {
            return Ok(DEFAULT_LIST_OUTPUT.to_string());
        };

        let key = ListKey::new(filter, flags);
        if let Some(output) = lists.get(&key) {
            return Ok(output.clone());
        }
        if !self.fail_on_unexpected_list {
            return Ok(String::new());
        }

        let mut known = lists.keys().map(ToString::to_string).collect::<Vec<_>>();
        known.sort();
        append_run_log(
            "warn",
            "helm.list.unexpected_key",
            json!({
                "operation": "list",
                "key": key.to_string(),
                "known": known
            }),
        );
        Err(HelmExecError::UnexpectedList { key, known })
    }

    fn decrypt_secret(
        &self,
        _context: &HelmContext,
        _name: &str,
        _flags: &[String],
    ) -> Result<String, HelmExecError> {
        Ok(String::new())
    }

    fn is_helm3(&self) -> bool {
        match &self.version {
            Some(version) => version.major == 3,
            None => self.helm3,
        }
    }

    fn get_version(&self) -> Version {
        self.version.as_ref().map(Version::from).unwrap_or_default()
    }

    /// Panics when `version` is not a version helm could report.
    fn is_version_at_least(&self, version: &str) -> bool {
        let Some(current) = &self.version else {
            return false;
        };
        let wanted = parse_version(version)
            .unwrap_or_else(|e| panic!("invalid version {version:?} in test setup: {e}"));
        precedence_at_least(current, &wanted)
    }

    fn show_chart(&self, chart_path: &str) -> Result<ChartMetadata, HelmExecError> {
        match chart_path {
            KNOWN_CHART_PATH => Ok(ChartMetadata {
                version: KNOWN_CHART_VERSION.to_string(),
                ..ChartMetadata::default()
            }),
            _ => Err(HelmExecError::ChartLookup(chart_path.to_string())),
        }
    }
}
