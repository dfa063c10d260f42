//! Standard exit codes for CLI operations

/// Usage error - missing or invalid arguments
pub const USAGE_ERROR: i32 = 1;

/// Configuration error - a source path or image prefix has no mapping
pub const CONFIG_ERROR: i32 = 2;

/// Malformed input - a document could not be parsed or lacks kind/name
pub const MALFORMED_ERROR: i32 = 3;

/// IO error - manifest not readable, output not writable
pub const IO_ERROR: i32 = 5;
