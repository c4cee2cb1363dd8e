//! Exporting an environment through the conda command line

use super::spec::EnvironmentSpec;
use crate::common::{find_executable, run_captured};
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long `conda env export` may run
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// Binaries tried on PATH when no `*_EXE` variable points at one
const CONDA_CANDIDATES: [&str; 3] = ["conda", "mamba", "micromamba"];

/// Which environment to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvTarget {
    Name(String),
    Prefix(PathBuf),
}

impl EnvTarget {
    fn args(&self) -> [OsString; 2] {
        match self {
            Self::Name(name) => ["-n".into(), name.into()],
            Self::Prefix(prefix) => ["-p".into(), prefix.into()],
        }
    }
}

/// Pick the environment to export
///
/// Precedence: explicit name, explicit prefix, `CONDA_PREFIX`,
/// `CONDA_DEFAULT_ENV`.
///
/// # Arguments
/// * `env` - Environment variable lookup, usually `|k| std::env::var(k).ok()`
pub fn resolve_target<F>(name: Option<&str>, prefix: Option<&Path>, env: F) -> Result<EnvTarget>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = name {
        return Ok(EnvTarget::Name(name.to_string()));
    }
    if let Some(prefix) = prefix {
        return Ok(EnvTarget::Prefix(prefix.to_path_buf()));
    }

    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    if let Some(prefix) = non_empty("CONDA_PREFIX") {
        log::debug!("Using active environment at {prefix}");
        return Ok(EnvTarget::Prefix(PathBuf::from(prefix)));
    }
    if let Some(name) = non_empty("CONDA_DEFAULT_ENV") {
        log::debug!("Using active environment {name}");
        return Ok(EnvTarget::Name(name));
    }

    Err(Error::NoActiveEnvironment)
}

/// Output document format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Yaml,
    Json,
}

impl ExportFormat {
    /// JSON for a `.json` file, YAML for anything else
    pub fn for_path(path: &Path) -> Self {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json { Self::Json } else { Self::Yaml }
    }
}

/// Serialize a spec, always ending with a newline
pub fn render(spec: &EnvironmentSpec, format: ExportFormat) -> Result<String> {
    let mut text = match format {
        ExportFormat::Yaml => serde_yaml::to_string(spec)?,
        ExportFormat::Json => serde_json::to_string_pretty(spec).map_err(Error::Json)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// A conda-compatible executable (`conda`, `mamba` or `micromamba`)
#[derive(Debug, Clone)]
pub struct CondaCli {
    exe: PathBuf,
    timeout: Duration,
}

impl CondaCli {
    pub fn new(exe: PathBuf) -> Self {
        Self {
            exe,
            timeout: EXPORT_TIMEOUT,
        }
    }

    /// Find conda through `CONDA_EXE`, `MAMBA_EXE`, then PATH
    pub fn locate<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ["CONDA_EXE", "MAMBA_EXE"] {
            if let Some(exe) = env(key).filter(|v| !v.trim().is_empty()) {
                let exe = PathBuf::from(exe);
                if exe.is_file() {
                    log::debug!("Using {} from {key}", exe.display());
                    return Ok(Self::new(exe));
                }
                log::warn!("{key} points at missing file {}", exe.display());
            }
        }

        find_executable("conda", &CONDA_CANDIDATES).map(Self::new)
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Arguments for `env export` of `target`
    pub fn export_args(target: &EnvTarget, from_history: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["env".into(), "export".into()];
        args.extend(target.args());
        args.push("--json".into());
        if from_history {
            args.push("--from-history".into());
        }
        args
    }

    /// Run `env export` and parse its JSON output
    ///
    /// # Errors
    /// Spawn failures, timeouts, a non-zero exit, or unparseable output
    pub fn export(&self, target: &EnvTarget, from_history: bool) -> Result<EnvironmentSpec> {
        let args = Self::export_args(target, from_history);
        let output = run_captured(&self.exe, &args, self.timeout)?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: self.exe.clone(),
                status: output.status,
                stderr: output.stderr,
            });
        }

        let spec: EnvironmentSpec =
            serde_json::from_str(&output.stdout).map_err(Error::ExportParse)?;
        log::info!(
            "Exported {} packages from {}",
            spec.package_count(),
            spec.name.as_deref().unwrap_or("environment")
        );
        Ok(spec)
    }
}

/// Write an export to `path`, or only report it when `dry_run` is set
///
/// # Returns
/// Whether the file was written
pub fn write_export(path: &Path, text: &str, dry_run: bool) -> Result<bool> {
    if dry_run {
        log::info!(
            "Dry run: would write {} bytes to {}",
            text.len(),
            path.display()
        );
        return Ok(false);
    }

    fs::write(path, text).map_err(|e| Error::io(path, e))?;
    log::info!("Wrote {}", path.display());
    Ok(true)
}
