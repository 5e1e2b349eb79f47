//! Error types for the security validator.

/// Result type alias for validator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the Rust-native validation API.
///
/// The first four variants correspond one-to-one with the policy
/// clauses of the security predicate; the remainder cover input and
/// internal failures. The byte-stable diagnostic strings exposed over
/// the C boundary live in [`crate::policy::Verdict::message`]; these
/// display strings are for Rust-side reporting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Policy Rejections
    // =========================================================================
    /// SYS_ADMIN present without privileged mode.
    #[error("SYS_ADMIN capability requires privileged mode")]
    InvalidCapabilities,

    /// Root UID without a user namespace.
    #[error("root UID (0) requires user namespace to be enabled")]
    InvalidUserNamespace,

    /// NET_ADMIN present on an unprivileged network.
    #[error("NET_ADMIN capability requires restricted or admin network mode")]
    InvalidNetworkMode,

    /// Root UID with neither no-new-privileges nor a user namespace.
    #[error("potential privilege escalation: set no_new_privileges or enable user namespace")]
    InvalidPrivilegeEscape,

    // =========================================================================
    // Input Rejections
    // =========================================================================
    /// Input was unparseable, empty, or over the size limit.
    #[error("failed to parse container configuration")]
    Parse,

    // =========================================================================
    // Internal Failures
    // =========================================================================
    /// Unexpected condition inside the validator.
    #[error("internal error in security validation")]
    Internal,
}
