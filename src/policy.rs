//! Security policy: verdict classification and hardening.
//!
//! The policy is a pure decision procedure over [`ContainerConfig`].
//! [`validate`] classifies a configuration into a [`Verdict`];
//! [`harden`] rewrites one so the security predicate holds, always by
//! removing capability or enabling isolation, never by elevating
//! privilege. Both are total and side-effect free.

use serde::{Deserialize, Serialize};

use crate::config::{Capability, ContainerConfig, NetworkMode};
use crate::error::{Error, Result};

// =============================================================================
// Verdict
// =============================================================================

/// Classification of a container configuration.
///
/// The integer encoding returned by [`Verdict::code`] is part of the
/// external contract and stable at a major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The security predicate holds.
    Valid,
    /// `SYS_ADMIN` without privileged mode.
    InvalidCapabilities,
    /// Root UID without a user namespace.
    InvalidUserNamespace,
    /// `NET_ADMIN` on an unprivileged network.
    InvalidNetworkMode,
    /// Root UID with neither no-new-privileges nor a user namespace.
    InvalidPrivilegeEscape,
    /// Input unparseable, empty, null, or over the size limit.
    ParseError,
    /// Unexpected condition inside the validator.
    InternalError,
}

impl Verdict {
    /// Stable integer encoding of this verdict.
    pub const fn code(self) -> i32 {
        match self {
            Verdict::Valid => 0,
            Verdict::InvalidCapabilities => 1,
            Verdict::InvalidUserNamespace => 2,
            Verdict::InvalidNetworkMode => 3,
            Verdict::InvalidPrivilegeEscape => 4,
            Verdict::ParseError => 5,
            Verdict::InternalError => -1,
        }
    }

    /// Decodes an integer verdict code. Total: every integer outside
    /// the defined encoding decodes to [`Verdict::InternalError`].
    pub const fn from_code(code: i32) -> Verdict {
        match code {
            0 => Verdict::Valid,
            1 => Verdict::InvalidCapabilities,
            2 => Verdict::InvalidUserNamespace,
            3 => Verdict::InvalidNetworkMode,
            4 => Verdict::InvalidPrivilegeEscape,
            5 => Verdict::ParseError,
            _ => Verdict::InternalError,
        }
    }

    /// Human-readable diagnostic for this verdict.
    ///
    /// These strings are matched on by downstream diagnostics and are
    /// byte-stable at a major version.
    pub const fn message(self) -> &'static str {
        match self {
            Verdict::Valid => "Configuration is valid and secure",
            Verdict::InvalidCapabilities => "SYS_ADMIN capability requires privileged mode",
            Verdict::InvalidUserNamespace => {
                "Root UID (0) requires user namespace to be enabled"
            }
            Verdict::InvalidNetworkMode => {
                "NET_ADMIN capability requires Restricted or Admin network mode"
            }
            Verdict::InvalidPrivilegeEscape => {
                "Potential privilege escalation: set no_new_privileges or enable user namespace"
            }
            Verdict::ParseError => "Failed to parse container configuration",
            Verdict::InternalError => "Internal error in security validation",
        }
    }

    /// Maps the verdict onto the Rust-native error taxonomy.
    pub fn into_result(self) -> Result<()> {
        match self {
            Verdict::Valid => Ok(()),
            Verdict::InvalidCapabilities => Err(Error::InvalidCapabilities),
            Verdict::InvalidUserNamespace => Err(Error::InvalidUserNamespace),
            Verdict::InvalidNetworkMode => Err(Error::InvalidNetworkMode),
            Verdict::InvalidPrivilegeEscape => Err(Error::InvalidPrivilegeEscape),
            Verdict::ParseError => Err(Error::Parse),
            Verdict::InternalError => Err(Error::Internal),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// =============================================================================
// Security Predicate
// =============================================================================

/// The security predicate.
///
/// Holds iff the configuration is explicitly privileged, or all of:
/// no `SYS_ADMIN`; root UID only inside a user namespace; `NET_ADMIN`
/// only with at least a restricted network; and root UID only with
/// no-new-privileges or a user namespace.
pub fn is_secure(config: &ContainerConfig) -> bool {
    if config.is_privileged {
        return true;
    }
    !config.capabilities.contains(Capability::SysAdmin)
        && (config.user_id > 0 || config.user_namespace)
        && (!config.capabilities.contains(Capability::NetAdmin)
            || config.network_mode != NetworkMode::Unprivileged)
        && (config.user_id > 0 || config.no_new_privileges || config.user_namespace)
}

/// Classifies a configuration. The checks run in a fixed order and the
/// first failing clause selects the verdict, so a configuration that
/// violates several clauses always reports the same one.
pub fn validate(config: &ContainerConfig) -> Verdict {
    if config.is_privileged {
        return Verdict::Valid;
    }
    if config.capabilities.contains(Capability::SysAdmin) {
        return Verdict::InvalidCapabilities;
    }
    if config.user_id == 0 && !config.user_namespace {
        return Verdict::InvalidUserNamespace;
    }
    if config.capabilities.contains(Capability::NetAdmin)
        && config.network_mode == NetworkMode::Unprivileged
    {
        return Verdict::InvalidNetworkMode;
    }
    if config.user_id == 0 && !config.no_new_privileges && !config.user_namespace {
        return Verdict::InvalidPrivilegeEscape;
    }
    Verdict::Valid
}

/// Whether `cap` is safe to grant under the given privilege and
/// network context.
pub fn is_safe_capability(
    cap: Capability,
    is_privileged: bool,
    network_mode: NetworkMode,
) -> bool {
    if is_privileged {
        return true;
    }
    match cap {
        Capability::SysAdmin => false,
        Capability::NetAdmin => network_mode != NetworkMode::Unprivileged,
        _ => true,
    }
}

// =============================================================================
// Hardening
// =============================================================================

/// Rewrites a configuration in place so the security predicate holds.
///
/// Defaults flow toward constraint: capabilities are removed rather
/// than privilege raised. The single additive step is enabling the
/// user namespace for a root UID, which maps container root to an
/// unprivileged host UID and is therefore a privilege reduction.
/// Idempotent; a no-op for privileged configurations.
pub fn harden(config: &mut ContainerConfig) {
    if config.is_privileged {
        return;
    }

    config.capabilities.remove(Capability::SysAdmin);

    if config.user_id == 0 {
        config.user_namespace = true;
    }

    // Drop the capability instead of raising the network mode.
    if config.capabilities.contains(Capability::NetAdmin)
        && config.network_mode == NetworkMode::Unprivileged
    {
        config.capabilities.remove(Capability::NetAdmin);
    }

    // Cannot hold after the namespace step above.
    if config.user_id == 0 && !config.user_namespace {
        config.no_new_privileges = true;
    }

    debug_assert!(is_secure(config));
}
