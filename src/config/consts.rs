/// Directory under the user's home holding core configuration.
pub const CONFIG_DIR_NAME: &str = ".grdk";
/// Config file looked up when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "grdk_config.yaml";
/// Default `tracing` filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Default bound on concurrently executing workflow runs.
pub const DEFAULT_MAX_CONCURRENT_RUNS: usize = 4;
