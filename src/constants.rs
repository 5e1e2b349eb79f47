//! Constants for the security validator.
//!
//! All limits and identity strings are defined here to ensure
//! consistency and prevent magic numbers throughout the codebase.

// =============================================================================
// Input Limits
// =============================================================================

/// Maximum accepted OCI configuration document size (64 KiB).
/// Longer inputs are rejected outright, without partial parsing.
pub const MAX_JSON: usize = 65536;

/// Scratch buffer size for JSON key tokens (bytes).
/// Keys longer than this are silently truncated during the scan.
pub const MAX_FIELD_NAME: usize = 256;

// =============================================================================
// Configuration Defaults
// =============================================================================

/// Default UID assigned when the configuration names none.
/// Non-zero, so default containers never run as root.
pub const DEFAULT_UID: u64 = 1000;

// =============================================================================
// Identity
// =============================================================================

/// Library version reported over the C boundary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
