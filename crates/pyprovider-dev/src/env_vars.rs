/// Declares all environment variables read by `pyprovider-dev`.
pub(crate) struct EnvVars;

impl EnvVars {
    /// Equivalent to the `--environment` command-line argument. If set, marker evaluation uses
    /// the marker values in this JSON file.
    pub(crate) const PYPROVIDER_MARKER_ENVIRONMENT: &'static str = "PYPROVIDER_MARKER_ENVIRONMENT";

    /// Equivalent to the `--interpreter-info` command-line argument. If set, marker evaluation
    /// uses the marker values from this saved interpreter query output.
    pub(crate) const PYPROVIDER_INTERPRETER_INFO: &'static str = "PYPROVIDER_INTERPRETER_INFO";

    /// Equivalent to the `--no-color` command-line argument. If set, output is never colored.
    pub(crate) const PYPROVIDER_NO_COLOR: &'static str = "PYPROVIDER_NO_COLOR";

    /// The standard `RUST_LOG` environment variable, overriding the default log filter.
    pub(crate) const RUST_LOG: &'static str = "RUST_LOG";
}
