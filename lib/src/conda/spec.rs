//! Environment specification as produced by `conda env export`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An exported conda environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// One entry of the `dependencies` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    /// Conda match spec, e.g. `numpy=1.26.4=py311h64a7726_0`
    Conda(String),
    /// Packages installed with pip, nested under a `pip:` key
    Pip { pip: Vec<String> },
}

impl EnvironmentSpec {
    /// Drop build strings from exact-pin conda dependencies
    ///
    /// Match specs with operators, brackets or wildcards (as written by
    /// `--from-history`) and pip entries are left as they are.
    pub fn strip_builds(mut self) -> Self {
        for dep in &mut self.dependencies {
            if let Dependency::Conda(spec) = dep {
                if let Some(pin) = PackageSpec::parse(spec) {
                    *spec = pin.without_build().to_string();
                }
            }
        }
        self
    }

    pub fn without_prefix(mut self) -> Self {
        self.prefix = None;
        self
    }

    /// Number of packages, counting each pip requirement
    pub fn package_count(&self) -> usize {
        self.dependencies
            .iter()
            .map(|dep| match dep {
                Dependency::Conda(_) => 1,
                Dependency::Pip { pip } => pip.len(),
            })
            .sum()
    }
}

/// A parsed `[channel::]name[=version[=build]]` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub channel: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub build: Option<String>,
}

/// Characters that only appear in relational or bracketed match specs
const MATCH_SPEC_SYNTAX: [char; 12] = ['<', '>', '!', '~', '[', ']', ',', '|', '*', '(', ')', ' '];

impl PackageSpec {
    /// Parse the exact-pin form written by `conda env export`
    ///
    /// # Returns
    /// `None` for any other match spec (`python==3.11`, `scipy>=1.10`,
    /// `numpy[version='>=1.20']`, ...), which cannot be split on `=`
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (channel, rest) = match spec.split_once("::") {
            Some((channel, rest)) => (Some(channel.to_string()), rest),
            None => (None, spec),
        };
        if rest.is_empty() || rest.contains("==") || rest.contains(MATCH_SPEC_SYNTAX) {
            return None;
        }

        let mut parts = rest.split('=');
        let name = parts.next()?;
        let version = parts.next();
        let build = parts.next();
        if name.is_empty() || parts.next().is_some() {
            return None;
        }
        if version.is_some_and(str::is_empty) || build.is_some_and(str::is_empty) {
            return None;
        }

        Some(Self {
            channel,
            name: name.to_string(),
            version: version.map(str::to_string),
            build: build.map(str::to_string),
        })
    }

    pub fn without_build(mut self) -> Self {
        self.build = None;
        self
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(channel) = &self.channel {
            write!(f, "{channel}::")?;
        }
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, "={version}")?;
            if let Some(build) = &self.build {
                write!(f, "={build}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT_JSON: &str = r#"{
        "name": "science",
        "channels": ["conda-forge", "defaults"],
        "dependencies": [
            "python=3.11.8=hab00c5b_0_cpython",
            "conda-forge::numpy=1.26.4=py311h64a7726_0",
            {"pip": ["requests==2.31.0", "rich==13.7.0"]}
        ],
        "prefix": "/opt/conda/envs/science"
    }"#;

    fn sample() -> EnvironmentSpec {
        serde_json::from_str(EXPORT_JSON).unwrap()
    }

    #[test]
    fn test_parse_export() {
        let spec = sample();
        assert_eq!(spec.name.as_deref(), Some("science"));
        assert_eq!(spec.channels, ["conda-forge", "defaults"]);
        assert_eq!(spec.dependencies.len(), 3);
        assert_eq!(spec.package_count(), 4);
        assert!(matches!(&spec.dependencies[2], Dependency::Pip { pip } if pip.len() == 2));
    }

    #[test]
    fn test_missing_fields_default() {
        let spec: EnvironmentSpec = serde_json::from_str(r#"{"name": "empty"}"#).unwrap();
        assert!(spec.channels.is_empty());
        assert!(spec.dependencies.is_empty());
        assert_eq!(spec.prefix, None);
    }

    #[test]
    fn test_strip_builds() {
        let spec = sample().strip_builds();
        assert_eq!(
            spec.dependencies[0],
            Dependency::Conda("python=3.11.8".to_string())
        );
        assert_eq!(
            spec.dependencies[1],
            Dependency::Conda("conda-forge::numpy=1.26.4".to_string())
        );
        assert_eq!(
            spec.dependencies[2],
            Dependency::Pip {
                pip: vec!["requests==2.31.0".to_string(), "rich==13.7.0".to_string()]
            }
        );
    }

    #[test]
    fn test_without_prefix() {
        let spec = sample().without_prefix();
        assert_eq!(spec.prefix, None);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(!json.contains("prefix"));
    }

    #[test]
    fn test_package_spec_parse() {
        let spec = PackageSpec::parse("bioconda::samtools=1.19=h50ea8bc_0").unwrap();
        assert_eq!(spec.channel.as_deref(), Some("bioconda"));
        assert_eq!(spec.name, "samtools");
        assert_eq!(spec.version.as_deref(), Some("1.19"));
        assert_eq!(spec.build.as_deref(), Some("h50ea8bc_0"));

        let spec = PackageSpec::parse("pip").unwrap();
        assert_eq!(spec.name, "pip");
        assert_eq!(spec.version, None);
        assert_eq!(spec.build, None);
    }

    #[test]
    fn test_package_spec_display() {
        for s in ["python=3.11.8=hab00c5b_0", "conda-forge::zlib=1.3", "pip"] {
            assert_eq!(PackageSpec::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_package_spec_rejects_other_match_specs() {
        for s in [
            "python==3.11",
            "numpy[version='>=1.20,<2']",
            "scipy>=1.10",
            "pandas=2.*",
            "r-base 4.3.*",
            "libblas=*=*mkl",
            "zlib=1.3=h0=extra",
            "=1.0",
            "",
        ] {
            assert_eq!(PackageSpec::parse(s), None, "{s}");
        }
    }

    #[test]
    fn test_strip_builds_keeps_requested_specs() {
        let requested = [
            "python==3.11",
            "numpy[version='>=1.20,<2']",
            "scipy>=1.10",
            "matplotlib=3.8",
            "conda-forge::zlib",
        ];
        let spec = EnvironmentSpec {
            dependencies: requested
                .iter()
                .map(|s| Dependency::Conda((*s).to_string()))
                .collect(),
            ..Default::default()
        }
        .strip_builds();

        let kept: Vec<_> = spec
            .dependencies
            .iter()
            .map(|dep| match dep {
                Dependency::Conda(s) => s.as_str(),
                Dependency::Pip { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(kept, requested);
    }
}
