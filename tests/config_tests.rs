//! Tests for the configuration data model.
//!
//! Validates defaults, capability-set behavior, the builder surface,
//! and the OCI JSON projection round trip.

use gatekeeper::{
    Capability, CapabilitySet, ConfigValidator, ContainerConfig, Error, NetworkMode,
};

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_default_config_is_conservative() {
    let config = ContainerConfig::default();

    assert!(!config.is_privileged);
    assert!(config.root_read_only);
    assert_eq!(config.capabilities, CapabilitySet::DEFAULT);
    assert_eq!(config.user_id, 1000, "default is non-root");
    assert!(config.user_namespace);
    assert_eq!(config.network_mode, NetworkMode::Unprivileged);
    assert!(config.no_new_privileges);
    assert!(config.seccomp_enabled);
}

#[test]
fn test_default_capability_set_contents() {
    let set = CapabilitySet::DEFAULT;

    for cap in Capability::ALL {
        let expected = cap != Capability::SysAdmin && cap != Capability::NetAdmin;
        assert_eq!(set.contains(cap), expected, "{:?} presence", cap);
    }
    assert_eq!(set.len(), 14);
}

#[test]
fn test_network_modes_are_ordered() {
    assert!(NetworkMode::Unprivileged < NetworkMode::Restricted);
    assert!(NetworkMode::Restricted < NetworkMode::Admin);
    assert_eq!(NetworkMode::default(), NetworkMode::Unprivileged);
}

// =============================================================================
// Capability Sets
// =============================================================================

#[test]
fn test_empty_set_has_nothing() {
    let set = CapabilitySet::EMPTY;
    assert!(set.is_empty());
    for cap in Capability::ALL {
        assert!(!set.contains(cap));
    }
}

#[test]
fn test_insert_and_remove() {
    let mut set = CapabilitySet::EMPTY;

    set.insert(Capability::Kill);
    assert!(set.contains(Capability::Kill));
    assert_eq!(set.len(), 1);

    // Re-insert is a no-op.
    set.insert(Capability::Kill);
    assert_eq!(set.len(), 1);

    set.remove(Capability::Kill);
    assert!(set.is_empty());

    // Remove of an absent capability is a no-op.
    set.remove(Capability::Kill);
    assert!(set.is_empty());
}

#[test]
fn test_subset_relation() {
    let small: CapabilitySet = [Capability::Chown].into_iter().collect();

    assert!(small.is_subset_of(CapabilitySet::DEFAULT));
    assert!(CapabilitySet::EMPTY.is_subset_of(small));
    assert!(!CapabilitySet::DEFAULT.is_subset_of(small));
}

#[test]
fn test_iter_matches_contains() {
    let set: CapabilitySet = [Capability::NetRaw, Capability::Setuid, Capability::SysAdmin]
        .into_iter()
        .collect();

    let listed: Vec<Capability> = set.iter().collect();
    assert_eq!(listed.len(), set.len());
    for cap in listed {
        assert!(set.contains(cap));
    }
}

#[test]
fn test_capability_names_round_trip() {
    for cap in Capability::ALL {
        assert_eq!(Capability::from_name(cap.name()), Some(cap));
    }
    assert_eq!(Capability::from_name("CAP_NET_RAW"), Some(Capability::NetRaw));
    assert_eq!(Capability::from_name("SYS_PTRACE"), None, "outside the closed set");
    assert_eq!(Capability::from_name(""), None);
}

// =============================================================================
// Builder
// =============================================================================

#[test]
fn test_builder_defaults_validate() {
    let validated = ConfigValidator::new().validate().expect("defaults are secure");
    assert_eq!(validated.config(), &ContainerConfig::default());
}

#[test]
fn test_builder_root_with_namespace_validates() {
    let validated = ConfigValidator::new()
        .user_id(0)
        .user_namespace(true)
        .validate()
        .expect("namespaced root is allowed");
    assert_eq!(validated.config().user_id, 0);
}

#[test]
fn test_builder_rejects_sys_admin() {
    let err = ConfigValidator::new()
        .capability(Capability::SysAdmin)
        .validate()
        .unwrap_err();
    assert_eq!(err, Error::InvalidCapabilities);
}

#[test]
fn test_builder_rejects_unnamespaced_root() {
    let err = ConfigValidator::new()
        .user_id(0)
        .user_namespace(false)
        .validate()
        .unwrap_err();
    assert_eq!(err, Error::InvalidUserNamespace);
}

#[test]
fn test_builder_privileged_bypass() {
    let validated = ConfigValidator::new()
        .privileged(true)
        .capability(Capability::SysAdmin)
        .user_id(0)
        .user_namespace(false)
        .validate()
        .expect("privileged mode bypasses every check");
    assert!(validated.config().is_privileged);
}

#[test]
fn test_builder_does_not_mutate_on_rejection() {
    // validate() consumes the builder; a rejected configuration just
    // reports the clause, it is never silently hardened.
    let result = ConfigValidator::new()
        .capability(Capability::NetAdmin)
        .validate();
    assert_eq!(result.unwrap_err(), Error::InvalidNetworkMode);
}

// =============================================================================
// OCI Projection
// =============================================================================

#[test]
fn test_to_oci_json_round_trips_through_parser() {
    let config = ContainerConfig {
        user_id: 4321,
        root_read_only: false,
        ..Default::default()
    };

    let json = config.to_oci_json();
    let reparsed = gatekeeper::parse(json.as_bytes());

    assert_eq!(reparsed.status, gatekeeper::ParseStatus::Ok);
    assert_eq!(reparsed.config.user_id, 4321);
    assert!(!reparsed.config.root_read_only);
    assert!(reparsed.config.user_namespace);
}

#[test]
fn test_to_oci_json_omits_namespace_when_disabled() {
    let config = ContainerConfig {
        user_namespace: false,
        ..Default::default()
    };
    let json = config.to_oci_json();

    assert!(!json.contains(r#""type":"user""#));
}

#[test]
fn test_config_serde_round_trip() {
    let mut config = ContainerConfig {
        user_id: 0,
        network_mode: NetworkMode::Restricted,
        ..Default::default()
    };
    config.capabilities.remove(Capability::Mknod);

    let encoded = serde_json::to_string(&config).expect("serialize");
    let decoded: ContainerConfig = serde_json::from_str(&encoded).expect("deserialize");

    assert_eq!(decoded, config);
}

#[test]
fn test_capability_serde_names_are_kernel_style() {
    let encoded = serde_json::to_string(&Capability::NetBindService).expect("serialize");
    assert_eq!(encoded, r#""NET_BIND_SERVICE""#);
}
