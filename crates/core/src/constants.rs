/// Constants used throughout the reclaim codebase
// Environment variable names
pub const RECLAIM_LOG_VAR: &str = "RECLAIM_LOG";
pub const RECLAIM_CONFIG_VAR: &str = "RECLAIM_CONFIG";
pub const RECLAIM_LIVE_THRESHOLD_VAR: &str = "RECLAIM_LIVE_THRESHOLD";
pub const RECLAIM_LOGGER_PATH_VAR: &str = "RECLAIM_LOGGER_PATH";

// Configuration file looked up in a directory
pub const CONFIG_FILENAME: &str = "reclaim.json";

// Defaults
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_LOGGER_FILENAME: &str = "log.txt";

// Live entities tolerated before a sweep is requested
pub const DEFAULT_LIVE_THRESHOLD: usize = 200;

// Platform line terminator used by `write_line`
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";
