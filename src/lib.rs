//! # gatekeeper
//!
//! **Container Security Policy Validator**
//!
//! This crate is a pure, deterministic decision procedure over OCI
//! runtime configurations. It answers one question for a container
//! engine: *is this configuration safe to launch?* It parses nothing
//! it does not need, touches nothing on the host, and returns a stable
//! verdict code naming exactly which security clause failed.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          gatekeeper                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                     C Boundary (ffi)                       │  │
//! │  │  verify_json_config │ sanitise_config │ get_error_message  │  │
//! │  │        gatekeeper_version │ gatekeeper_init                │  │
//! │  └──────────────────────────┬─────────────────────────────────┘  │
//! │                             │ bytes in, verdict code out         │
//! │  ┌──────────────────────────┼─────────────────────────────────┐  │
//! │  │                   Parser (parser)                          │  │
//! │  │  Bounded structural scan │ 64 KiB input cap │ defaults for │  │
//! │  │  absent fields │ never aborts on hostile input             │  │
//! │  └──────────────────────────┼─────────────────────────────────┘  │
//! │                             │ total ContainerConfig              │
//! │  ┌──────────────────────────┼─────────────────────────────────┐  │
//! │  │                   Policy (policy)                          │  │
//! │  │  harden → validate │ security predicate │ verdict codes    │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Security Model
//!
//! A configuration is secure when it is explicitly privileged (an
//! administrator bypass), or when all of the following hold:
//!
//! | Clause | Requirement |
//! |--------|-------------|
//! | 1 | No `SYS_ADMIN` capability |
//! | 2 | Root UID only inside a user namespace |
//! | 3 | `NET_ADMIN` only with at least a Restricted network |
//! | 4 | Root UID only with no-new-privileges or a user namespace |
//!
//! [`policy::harden`] rewrites any configuration to satisfy the
//! predicate, always by dropping a capability or enabling isolation
//! rather than raising privilege, and the parser hardens every
//! configuration it produces, so parsed configurations are secure by
//! construction.
//!
//! ## Key Properties
//!
//! - **Bounded everything**: input capped at [`MAX_JSON`] bytes, key
//!   scratch at 256 bytes, scan cost O(input × recognised paths).
//! - **Total data**: absent JSON fields take conservative defaults;
//!   a parsed record is never partially initialized.
//! - **No panics across the ABI**: every C entry point maps unwinds to
//!   `Internal_Error`.
//! - **Re-entrant**: no global mutable state anywhere; every call is a
//!   pure function of its inputs.
//!
//! # Example
//!
//! ```rust
//! use gatekeeper::{ConfigValidator, NetworkMode};
//!
//! // Validate a raw OCI document.
//! let config = r#"{"process": {"user": {"uid": 1000}}}"#;
//! assert!(gatekeeper::verify_oci_config(config).is_ok());
//!
//! // Or build a configuration directly.
//! let validated = ConfigValidator::new()
//!     .user_id(0)
//!     .user_namespace(true)
//!     .network_mode(NetworkMode::Restricted)
//!     .validate()
//!     .expect("root inside a user namespace is allowed");
//! assert_eq!(validated.config().user_id, 0);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod ffi;
pub mod parser;
pub mod policy;

pub use config::{
    Capability, CapabilitySet, ConfigValidator, ContainerConfig, NetworkMode, ValidatedConfig,
};
pub use constants::{MAX_JSON, VERSION};
pub use error::{Error, Result};
pub use parser::{parse, ParseResult, ParseStatus};
pub use policy::{harden, is_safe_capability, is_secure, validate, Verdict};

/// Runs the full pipeline over raw bytes: parse (which hardens), then
/// classify. Parser rejections collapse to [`Verdict::ParseError`].
pub fn evaluate(bytes: &[u8]) -> Verdict {
    let parsed = parser::parse(bytes);
    match parsed.status {
        ParseStatus::Ok => policy::validate(&parsed.config),
        _ => Verdict::ParseError,
    }
}

/// Validates an OCI runtime configuration document.
///
/// Returns `Ok(())` when the configuration passes all security checks,
/// or the [`Error`] naming the clause (or input failure) otherwise.
pub fn verify_oci_config(json: &str) -> Result<()> {
    let verdict = evaluate(json.as_bytes());
    if verdict != Verdict::Valid {
        tracing::warn!(%verdict, len = json.len(), "configuration rejected");
    }
    verdict.into_result()
}

/// Parses an OCI runtime configuration document and returns the
/// hardened record, ready to hand to a runtime backend.
pub fn sanitise_oci_config(json: &str) -> Result<ContainerConfig> {
    let parsed = parser::parse(json.as_bytes());
    match parsed.status {
        ParseStatus::Ok => {
            tracing::debug!(uid = parsed.config.user_id, "configuration sanitised");
            Ok(parsed.config)
        }
        status => {
            tracing::warn!(?status, len = json.len(), "configuration unparseable");
            Err(Error::Parse)
        }
    }
}

/// Initialisation hook kept for parity with the C surface. The
/// validator holds no global state, so this is infallible.
pub fn init() -> Result<()> {
    Ok(())
}
