//! Conda environment export
//!
//! Wraps `conda env export` so the result can be cleaned up (build strings,
//! prefix) and written as YAML or JSON.

pub mod export;
pub mod spec;

pub use export::{CondaCli, EnvTarget, ExportFormat, render, resolve_target, write_export};
pub use spec::{Dependency, EnvironmentSpec, PackageSpec};
