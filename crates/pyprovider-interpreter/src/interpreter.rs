use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use tracing::debug;

use pyprovider_pep440::{VersionBounds, VersionIdentifier};
use pyprovider_pep508::MarkerValues;

use crate::tags::{Tags, TagsError, wheel_tag};

/// An error parsing the output of the interpreter query.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterInfoError {
    /// Output from a different or broken query script.
    #[error("Expected 14 NUL-separated fields in the interpreter query output, found {0}")]
    FieldCount(usize),
    /// The pointer size isn't a number.
    #[error("Invalid pointer size `{0}`")]
    PointerSize(String, #[source] ParseIntError),
    /// The Python version isn't a version.
    #[error("Invalid Python version `{0}`")]
    PythonVersion(String),
    /// The supported tags are malformed.
    #[error(transparent)]
    Tags(#[from] TagsError),
}

/// The facts reported by a Python interpreter about itself.
#[derive(Debug, Clone)]
pub struct InterpreterInfo {
    version: VersionIdentifier,
    site_packages: PathBuf,
    pointer_size: usize,
    tags: Tags,
    markers: MarkerValues,
}

impl InterpreterInfo {
    /// Parse the NUL-separated output of the interpreter query.
    ///
    /// The fields are, in order: `sys.version_info` joined with dots, the global site-packages
    /// folder, the pointer size in bytes, the supported wheel tags joined with dots, and the
    /// marker values `os_name`, `sys_platform`, `platform_release`, `implementation_name`,
    /// `platform_machine`, `platform_python_implementation`, `python_version`,
    /// `python_full_version`, `platform_version` and `implementation_version`.
    ///
    /// Interpreters older than 3.3 have no `sys.implementation` and print the two
    /// `implementation_*` fields empty.
    pub fn from_query_output(output: &str) -> Result<Self, InterpreterInfoError> {
        let fields: Vec<&str> = output.trim_end_matches(['\r', '\n']).split('\0').collect();
        let [
            version_info,
            site_packages,
            pointer_size,
            tags,
            os_name,
            sys_platform,
            platform_release,
            implementation_name,
            platform_machine,
            platform_python_implementation,
            python_version,
            python_full_version,
            platform_version,
            implementation_version,
        ] = fields[..]
        else {
            return Err(InterpreterInfoError::FieldCount(fields.len()));
        };

        let version = parse_version_info(version_info)
            .ok_or_else(|| InterpreterInfoError::PythonVersion(version_info.to_string()))?;
        let pointer_size = pointer_size
            .trim()
            .parse()
            .map_err(|err| InterpreterInfoError::PointerSize(pointer_size.to_string(), err))?;
        let tags = Tags::from_query_output(tags)?;
        let markers = MarkerValues {
            os_name: os_name.to_string(),
            sys_platform: sys_platform.to_string(),
            platform_release: platform_release.to_string(),
            implementation_name: implementation_name.to_string(),
            platform_machine: platform_machine.to_string(),
            platform_python_implementation: platform_python_implementation.to_string(),
            python_version: VersionIdentifier::parse(python_version),
            python_full_version: VersionIdentifier::parse(python_full_version),
            platform_version: VersionIdentifier::parse(platform_version),
            implementation_version: VersionIdentifier::parse(implementation_version),
        };

        debug!("Found Python {version} ({pointer_size} byte pointers) at {site_packages}");
        Ok(Self {
            version,
            site_packages: PathBuf::from(site_packages),
            pointer_size,
            tags,
            markers,
        })
    }

    /// Returns the Python version, such as `3.6.1` or `3.7.0rc1`.
    pub fn version(&self) -> &VersionIdentifier {
        &self.version
    }

    /// Returns the global `site-packages` folder.
    pub fn site_packages(&self) -> &Path {
        &self.site_packages
    }

    /// Returns the size of a pointer in bytes.
    pub fn pointer_size(&self) -> usize {
        self.pointer_size
    }

    /// Whether this is a 64-bit interpreter.
    pub fn is_64bit(&self) -> bool {
        self.pointer_size == 8
    }

    /// Returns the wheel tags this interpreter can install.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Returns the marker values to evaluate dependency markers against.
    pub fn markers(&self) -> &MarkerValues {
        &self.markers
    }

    /// Whether the interpreter is what a user asked for with `request`, where a shorter request
    /// matches every version it is a prefix of (`3.2` matches `3.2.7` but not `3.20.1`).
    pub fn satisfies(&self, request: &VersionIdentifier) -> bool {
        request.is_prefix_of(&self.version)
    }

    /// Whether the interpreter version respects the bounds.
    pub fn within(&self, bounds: &VersionBounds) -> bool {
        bounds.contains(&self.version)
    }

    /// Whether the interpreter can install the wheel with the given file name.
    pub fn supports_wheel(&self, filename: &str) -> bool {
        wheel_tag(filename).is_some_and(|tag| self.tags.is_compatible(tag))
    }
}

/// Turn `sys.version_info` joined with dots (`3.7.0.candidate.1`) into a version (`3.7.0rc1`).
fn parse_version_info(version_info: &str) -> Option<VersionIdentifier> {
    let mut parts = version_info.trim().split('.').peekable();
    let mut release = Vec::new();
    while let Some(number) = parts.peek().and_then(|part| part.parse::<u64>().ok()) {
        release.push(number);
        parts.next();
    }
    if release.is_empty() {
        return None;
    }

    let mut version = release
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".");
    match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) | (Some("final"), _, None) => {}
        (Some(level), Some(serial), None) => {
            let kind = match level {
                "alpha" => "a",
                "beta" => "b",
                "candidate" => "rc",
                _ => return None,
            };
            version.push_str(kind);
            version.push_str(serial);
        }
        _ => return None,
    }

    let version = VersionIdentifier::parse(&version);
    version.is_valid().then_some(version)
}

#[cfg(test)]
mod tests;
