// src/constants.rs

/// Placeholder identity for sessions that have not authenticated.
pub const ANONYMOUS_USER: &str = "nobody";
pub const NOBODY_UID: u32 = 65534;
pub const NOBODY_GID: u32 = 65534;

/// Upper bound on a single control-channel request line.
pub const REQUEST_BUFFER_SIZE: u64 = 512;

/// Chunk size for data-channel file transfers.
pub const DATA_CHUNK_SIZE: usize = 8192;

/// Single bounded retry delay while waiting for a passive data connection.
pub const DATA_READY_RETRY_MS: u64 = 200;

/// Delay imposed before answering a failed login attempt.
pub const AUTH_THROTTLE_MS: u64 = 1000;

/// How often the watchdog sweeps for idle sessions.
pub const WATCHDOG_INTERVAL_SECS: u64 = 60;
