use serde::{Deserialize, Serialize};

use pyprovider_pep440::VersionIdentifier;

use crate::marker::{StringVariable, VersionVariable};

/// The values of the marker variables for an interpreter.
pub trait MarkerEnvironment {
    /// The value of a string variable such as `sys_platform`.
    fn string_variable(&self, variable: StringVariable) -> &str;

    /// The value of a version variable such as `python_version`.
    fn version_variable(&self, variable: VersionVariable) -> &VersionIdentifier;
}

/// A snapshot of all marker variables, for example loaded from JSON:
///
/// ```json
/// {
///   "os_name": "posix",
///   "sys_platform": "linux",
///   "platform_release": "5.4.188+",
///   "implementation_name": "cpython",
///   "platform_machine": "x86_64",
///   "platform_python_implementation": "CPython",
///   "python_version": "3.7",
///   "python_full_version": "3.7.13",
///   "platform_version": "#1 SMP Sun Apr 24 10:03:06 PDT 2022",
///   "implementation_version": "3.7.13"
/// }
/// ```
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct MarkerValues {
    pub os_name: String,
    pub sys_platform: String,
    pub platform_release: String,
    pub implementation_name: String,
    pub platform_machine: String,
    pub platform_python_implementation: String,
    pub python_version: VersionIdentifier,
    pub python_full_version: VersionIdentifier,
    pub platform_version: VersionIdentifier,
    pub implementation_version: VersionIdentifier,
}

impl MarkerEnvironment for MarkerValues {
    fn string_variable(&self, variable: StringVariable) -> &str {
        match variable {
            StringVariable::OsName => &self.os_name,
            StringVariable::SysPlatform => &self.sys_platform,
            StringVariable::PlatformRelease => &self.platform_release,
            StringVariable::ImplementationName => &self.implementation_name,
            StringVariable::PlatformMachine => &self.platform_machine,
            StringVariable::PlatformPythonImplementation => &self.platform_python_implementation,
        }
    }

    fn version_variable(&self, variable: VersionVariable) -> &VersionIdentifier {
        match variable {
            VersionVariable::PythonVersion => &self.python_version,
            VersionVariable::PythonFullVersion => &self.python_full_version,
            VersionVariable::PlatformVersion => &self.platform_version,
            VersionVariable::ImplementationVersion => &self.implementation_version,
        }
    }
}
