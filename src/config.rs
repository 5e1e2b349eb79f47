//! Container configuration data model.
//!
//! Defines the security-relevant projection of an OCI runtime
//! configuration: network privilege, a closed capability set, and the
//! flags the policy reasons about. All types are plain data with
//! conservative defaults, so a configuration that was never touched by
//! an operator is already the most constrained one.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_UID;
use crate::error::Result;
use crate::policy;

// =============================================================================
// Network Mode
// =============================================================================

/// Network privilege level, ordered from least to most privileged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// No network administration rights; the safe default.
    #[default]
    Unprivileged,
    /// Limited network configuration (port publishing, bridges).
    Restricted,
    /// Full network administration.
    Admin,
}

impl NetworkMode {
    /// Lowercase wire name, as used in host configuration documents.
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkMode::Unprivileged => "unprivileged",
            NetworkMode::Restricted => "restricted",
            NetworkMode::Admin => "admin",
        }
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// The closed set of Linux capabilities the policy reasons about.
///
/// Real kernels define ~40 capabilities; this enumeration fixes the 16
/// that matter for container workloads so the security predicate stays
/// exhaustively checkable. Capability names outside this set are
/// ignored, never rejected. Widening the enumeration widens the set
/// representation and is therefore a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    Chown,
    DacOverride,
    Fsetid,
    Fowner,
    Mknod,
    NetRaw,
    Setgid,
    Setuid,
    Setfcap,
    Setpcap,
    NetBindService,
    SysChroot,
    Kill,
    AuditWrite,
    NetAdmin,
    SysAdmin,
}

impl Capability {
    /// Every capability in the enumeration, in declaration order.
    pub const ALL: [Capability; 16] = [
        Capability::Chown,
        Capability::DacOverride,
        Capability::Fsetid,
        Capability::Fowner,
        Capability::Mknod,
        Capability::NetRaw,
        Capability::Setgid,
        Capability::Setuid,
        Capability::Setfcap,
        Capability::Setpcap,
        Capability::NetBindService,
        Capability::SysChroot,
        Capability::Kill,
        Capability::AuditWrite,
        Capability::NetAdmin,
        Capability::SysAdmin,
    ];

    /// Kernel-style capability name without the `CAP_` prefix.
    pub fn name(self) -> &'static str {
        match self {
            Capability::Chown => "CHOWN",
            Capability::DacOverride => "DAC_OVERRIDE",
            Capability::Fsetid => "FSETID",
            Capability::Fowner => "FOWNER",
            Capability::Mknod => "MKNOD",
            Capability::NetRaw => "NET_RAW",
            Capability::Setgid => "SETGID",
            Capability::Setuid => "SETUID",
            Capability::Setfcap => "SETFCAP",
            Capability::Setpcap => "SETPCAP",
            Capability::NetBindService => "NET_BIND_SERVICE",
            Capability::SysChroot => "SYS_CHROOT",
            Capability::Kill => "KILL",
            Capability::AuditWrite => "AUDIT_WRITE",
            Capability::NetAdmin => "NET_ADMIN",
            Capability::SysAdmin => "SYS_ADMIN",
        }
    }

    /// Looks up a capability by name. Accepts both the bare form
    /// (`NET_ADMIN`) and the kernel form (`CAP_NET_ADMIN`). Unknown
    /// names yield `None` and are ignored by callers.
    pub fn from_name(name: &str) -> Option<Capability> {
        let bare = name.strip_prefix("CAP_").unwrap_or(name);
        Capability::ALL.iter().copied().find(|c| c.name() == bare)
    }

    /// Bit position of this capability within a [`CapabilitySet`].
    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Total mapping from [`Capability`] to present/absent, packed as a
/// bitmask over the 16-element enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// No capabilities at all.
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    /// The conventional container default set: everything in the
    /// enumeration except `NET_ADMIN` and `SYS_ADMIN`.
    pub const DEFAULT: CapabilitySet = CapabilitySet(
        u16::MAX ^ Capability::NetAdmin.bit() ^ Capability::SysAdmin.bit(),
    );

    /// Whether `cap` is present in the set.
    pub fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Adds `cap` to the set.
    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    /// Removes `cap` from the set.
    pub fn remove(&mut self, cap: Capability) {
        self.0 &= !cap.bit();
    }

    /// Whether no capability is present.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of capabilities present.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether every capability in `self` is also in `other`.
    pub fn is_subset_of(self, other: CapabilitySet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterates the present capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        CapabilitySet::DEFAULT
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(caps: Vec<Capability>) -> Self {
        let mut set = CapabilitySet::EMPTY;
        for cap in caps {
            set.insert(cap);
        }
        set
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::EMPTY;
        for cap in iter {
            set.insert(cap);
        }
        set
    }
}

// =============================================================================
// Container Configuration
// =============================================================================

/// The security-relevant record of a container runtime configuration.
///
/// Every field is total: parsing starts from [`ContainerConfig::default`]
/// and only overwrites fields it actually observes in the input, so a
/// record is never partially initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Administrator-explicit bypass of all policy checks.
    pub is_privileged: bool,
    /// Root filesystem mounted read-only.
    pub root_read_only: bool,
    /// Effective capability set.
    pub capabilities: CapabilitySet,
    /// UID the container process runs as (0 is root).
    pub user_id: u64,
    /// User-namespace UID mapping enabled.
    pub user_namespace: bool,
    /// Network privilege level.
    pub network_mode: NetworkMode,
    /// Blocks privilege gain via setuid binaries and file capabilities.
    pub no_new_privileges: bool,
    /// Seccomp syscall filter applied.
    pub seccomp_enabled: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        ContainerConfig {
            is_privileged: false,
            root_read_only: true,
            capabilities: CapabilitySet::DEFAULT,
            user_id: DEFAULT_UID,
            user_namespace: true,
            network_mode: NetworkMode::Unprivileged,
            no_new_privileges: true,
            seccomp_enabled: true,
        }
    }
}

impl ContainerConfig {
    /// Renders the record as a minimal OCI runtime configuration
    /// document covering the paths the validator reads back, plus the
    /// effective capability list for bundle generation.
    pub fn to_oci_json(&self) -> String {
        let namespaces: Vec<serde_json::Value> = if self.user_namespace {
            vec![serde_json::json!({ "type": "user" })]
        } else {
            Vec::new()
        };
        let caps: Vec<&str> = self.capabilities.iter().map(Capability::name).collect();

        serde_json::json!({
            "process": {
                "user": { "uid": self.user_id },
                "noNewPrivileges": self.no_new_privileges,
                "capabilities": { "effective": caps },
            },
            "root": { "readonly": self.root_read_only },
            "linux": {
                "namespaces": namespaces,
                "network_mode": self.network_mode.as_str(),
            },
        })
        .to_string()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for constructing policy-checked container configurations.
///
/// Starts from the secure defaults and only validates on
/// [`ConfigValidator::validate`], so intermediate states may violate
/// the policy freely.
#[derive(Debug, Clone, Default)]
pub struct ConfigValidator {
    config: ContainerConfig,
}

impl ConfigValidator {
    /// Creates a builder seeded with the secure defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets privileged mode (bypasses all policy checks).
    pub fn privileged(mut self, privileged: bool) -> Self {
        self.config.is_privileged = privileged;
        self
    }

    /// Enables or disables the user namespace.
    pub fn user_namespace(mut self, enabled: bool) -> Self {
        self.config.user_namespace = enabled;
        self
    }

    /// Sets the UID the container runs as.
    pub fn user_id(mut self, uid: u64) -> Self {
        self.config.user_id = uid;
        self
    }

    /// Sets the network privilege level.
    pub fn network_mode(mut self, mode: NetworkMode) -> Self {
        self.config.network_mode = mode;
        self
    }

    /// Adds a capability to the effective set.
    pub fn capability(mut self, cap: Capability) -> Self {
        self.config.capabilities.insert(cap);
        self
    }

    /// Removes a capability from the effective set.
    pub fn drop_capability(mut self, cap: Capability) -> Self {
        self.config.capabilities.remove(cap);
        self
    }

    /// Replaces the entire capability set.
    pub fn capabilities(mut self, caps: CapabilitySet) -> Self {
        self.config.capabilities = caps;
        self
    }

    /// Sets the no-new-privileges flag.
    pub fn no_new_privileges(mut self, enabled: bool) -> Self {
        self.config.no_new_privileges = enabled;
        self
    }

    /// Sets whether the root filesystem is read-only.
    pub fn readonly_rootfs(mut self, readonly: bool) -> Self {
        self.config.root_read_only = readonly;
        self
    }

    /// Enables or disables the seccomp filter.
    pub fn seccomp(mut self, enabled: bool) -> Self {
        self.config.seccomp_enabled = enabled;
        self
    }

    /// Checks the configuration against the security policy and, on
    /// success, seals it as a [`ValidatedConfig`].
    pub fn validate(self) -> Result<ValidatedConfig> {
        let verdict = policy::validate(&self.config);
        tracing::debug!(?verdict, uid = self.config.user_id, "builder validation");
        verdict.into_result()?;
        Ok(ValidatedConfig(self.config))
    }
}

/// A container configuration that has passed security validation.
///
/// Only [`ConfigValidator::validate`] constructs this type, so holding
/// one is proof the policy predicate held at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig(ContainerConfig);

impl ValidatedConfig {
    /// Read access to the underlying record.
    pub fn config(&self) -> &ContainerConfig {
        &self.0
    }

    /// Unwraps the record, giving up the validation seal.
    pub fn into_inner(self) -> ContainerConfig {
        self.0
    }
}
