pub mod config;
pub mod errors;
pub mod executor;
pub mod fake;
pub mod logging;
pub mod types;

pub use errors::HelmExecError;
pub use executor::{ChartMetadata, HelmContext, HelmExecutor, RegistryLogin, RepoSpec, Version};
pub use fake::FakeHelmExecutor;
