use crate::errors::HelmExecError;
use serde::{Deserialize, Serialize};

/// Per-call context handed down by the orchestrator. Executors pass it through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelmContext {
    pub worker_index: usize,
    pub history_max: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl From<&semver::Version> for Version {
    fn from(value: &semver::Version) -> Self {
        Self {
            major: value.major,
            minor: value.minor,
            patch: value.patch,
        }
    }
}

/// Parses a version the way helm prints it: optional `v` prefix, missing minor or patch read as 0.
pub fn parse_version(text: &str) -> Result<semver::Version, semver::Error> {
    let text = text.trim();
    let text = text.strip_prefix(['v', 'V']).unwrap_or(text);
    let split = text.find(['-', '+']).unwrap_or(text.len());
    let (core, suffix) = text.split_at(split);
    let padding = match core.matches('.').count() {
        0 => ".0.0",
        1 => ".0",
        _ => "",
    };
    semver::Version::parse(&format!("{core}{padding}{suffix}"))
}

/// `current >= wanted` by semver precedence; build metadata never affects the answer.
pub fn precedence_at_least(current: &semver::Version, wanted: &semver::Version) -> bool {
    (current.major, current.minor, current.patch, &current.pre)
        >= (wanted.major, wanted.minor, wanted.patch, &wanted.pre)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub name: String,
    pub version: String,
    pub app_version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSpec {
    pub name: String,
    pub url: String,
    pub ca_file: String,
    pub cert_file: String,
    pub key_file: String,
    pub username: String,
    pub password: String,
    pub managed: String,
    pub pass_credentials: bool,
    pub skip_tls_verify: bool,
}

impl RepoSpec {
    /// Positional rendering matching the `helm repo add` argument order.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.url.clone(),
            self.ca_file.clone(),
            self.cert_file.clone(),
            self.key_file.clone(),
            self.username.clone(),
            self.password.clone(),
            self.managed.clone(),
            self.pass_credentials.to_string(),
            self.skip_tls_verify.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryLogin {
    pub name: String,
    pub username: String,
    pub password: String,
    pub ca_file: String,
    pub cert_file: String,
    pub key_file: String,
    pub skip_tls_verify: bool,
}

pub trait HelmExecutor: Send + Sync {
    fn set_extra_args(&mut self, args: &[String]);
    fn set_helm_binary(&mut self, bin: &str);
    fn set_enable_live_output(&mut self, enable: bool);
    fn set_disable_force_update(&mut self, disable: bool);

    fn add_repo(&self, repo: &RepoSpec) -> Result<(), HelmExecError>;
    fn update_repo(&self) -> Result<(), HelmExecError>;
    fn registry_login(&self, login: &RegistryLogin) -> Result<(), HelmExecError>;

    fn build_deps(&self, name: &str, chart: &str, flags: &[String]) -> Result<(), HelmExecError>;
    fn update_deps(&self, chart: &str) -> Result<(), HelmExecError>;

    fn sync_release(
        &self,
        context: &HelmContext,
        name: &str,
        chart: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError>;
    /// `Ok(())` means the release matches its desired state.
    fn diff_release(
        &self,
        context: &HelmContext,
        name: &str,
        chart: &str,
        suppress_diff: bool,
        flags: &[String],
    ) -> Result<(), HelmExecError>;
    fn template_release(&self, name: &str, chart: &str, flags: &[String])
        -> Result<(), HelmExecError>;
    fn fetch(&self, chart: &str, flags: &[String]) -> Result<(), HelmExecError>;
    fn chart_pull(&self, chart: &str, path: &str, flags: &[String]) -> Result<(), HelmExecError>;
    fn chart_export(&self, chart: &str, path: &str) -> Result<(), HelmExecError>;
    fn lint(&self, name: &str, chart: &str, flags: &[String]) -> Result<(), HelmExecError>;
    fn release_status(
        &self,
        context: &HelmContext,
        name: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError>;
    fn delete_release(
        &self,
        context: &HelmContext,
        name: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError>;
    fn test_release(
        &self,
        context: &HelmContext,
        name: &str,
        flags: &[String],
    ) -> Result<(), HelmExecError>;
    fn list(
        &self,
        context: &HelmContext,
        filter: &str,
        flags: &[String],
    ) -> Result<String, HelmExecError>;
    fn decrypt_secret(
        &self,
        context: &HelmContext,
        name: &str,
        flags: &[String],
    ) -> Result<String, HelmExecError>;

    fn is_helm3(&self) -> bool;
    fn get_version(&self) -> Version;
    fn is_version_at_least(&self, version: &str) -> bool;

    fn show_chart(&self, chart_path: &str) -> Result<ChartMetadata, HelmExecError>;
}
