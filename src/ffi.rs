//! C-ABI boundary for the validator.
//!
//! Exposes the validation pipeline to non-Rust hosts (a container
//! engine shim linking the static or shared library). The surface owns
//! all pointer and length checking, and translates the internal
//! [`Verdict`] enumeration to its stable integer encoding.
//!
//! Contract invariants:
//! - No panic crosses the boundary; every entry point catches unwinds
//!   and reports them as `Internal_Error`.
//! - Every returned string is NUL-terminated, has static lifetime, and
//!   must not be freed by the caller.
//! - Inputs are borrowed only for the duration of the call.

use std::ffi::{c_char, c_int, CStr};
use std::panic::catch_unwind;

use crate::parser::{self, ParseStatus};
use crate::policy::Verdict;

// =============================================================================
// Static Strings
// =============================================================================

// Byte-stable diagnostic strings (one per verdict code). These are
// duplicated from `Verdict::message` with a trailing NUL; a test locks
// the two tables together.
const MSG_VALID: &CStr = c"Configuration is valid and secure";
const MSG_INVALID_CAPABILITIES: &CStr = c"SYS_ADMIN capability requires privileged mode";
const MSG_INVALID_USER_NAMESPACE: &CStr = c"Root UID (0) requires user namespace to be enabled";
const MSG_INVALID_NETWORK_MODE: &CStr =
    c"NET_ADMIN capability requires Restricted or Admin network mode";
const MSG_INVALID_PRIVILEGE_ESCAPE: &CStr =
    c"Potential privilege escalation: set no_new_privileges or enable user namespace";
const MSG_PARSE_ERROR: &CStr = c"Failed to parse container configuration";
const MSG_INTERNAL_ERROR: &CStr = c"Internal error in security validation";
const MSG_UNKNOWN: &CStr = c"Unknown error code";

/// Crate version with a trailing NUL for the C boundary.
const VERSION_CSTR: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Failure encoding for `sanitise_config`: positive codes are negated;
/// `Internal_Error` already carries a negative code and passes through.
const fn failure_code(verdict: Verdict) -> c_int {
    let code = verdict.code();
    if code > 0 {
        -code
    } else {
        code
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Validates a NUL-terminated OCI configuration document.
///
/// Returns a verdict code: `0` for a secure configuration, `1`–`4` for
/// the policy clause that failed, `5` for unparseable/oversize/null
/// input, `-1` for an internal failure.
///
/// # Safety
/// `json` must be null or point to a NUL-terminated byte string that
/// stays valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn verify_json_config(json: *const c_char) -> c_int {
    if json.is_null() {
        return Verdict::ParseError.code();
    }
    let outcome = catch_unwind(|| {
        let bytes = CStr::from_ptr(json).to_bytes();
        crate::evaluate(bytes)
    });
    match outcome {
        Ok(verdict) => verdict.code(),
        Err(_) => Verdict::InternalError.code(),
    }
}

/// Sanitises a NUL-terminated OCI configuration document into `output`.
///
/// On success returns the number of bytes written (excluding the
/// terminating NUL); on failure returns a negative code (`-5` for
/// null pointers, a non-positive or too-small buffer, or unparseable
/// input; `-1` for an internal failure). The present version echoes
/// the input document; hardened re-serialisation is reserved for a
/// future surface revision.
///
/// # Safety
/// `json` must be null or a valid NUL-terminated byte string, and
/// `output` must be null or point to at least `output_len` writable
/// bytes; both must stay valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn sanitise_config(
    json: *const c_char,
    output: *mut c_char,
    output_len: c_int,
) -> c_int {
    if json.is_null() || output.is_null() || output_len <= 0 {
        return failure_code(Verdict::ParseError);
    }
    let outcome = catch_unwind(|| {
        let bytes = CStr::from_ptr(json).to_bytes();

        let parsed = parser::parse(bytes);
        if parsed.status != ParseStatus::Ok {
            return failure_code(Verdict::ParseError);
        }

        // Output must hold the document plus its terminating NUL.
        if bytes.len() >= output_len as usize {
            return failure_code(Verdict::ParseError);
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), output.cast::<u8>(), bytes.len());
        *output.add(bytes.len()) = 0;
        bytes.len() as c_int
    });
    outcome.unwrap_or(failure_code(Verdict::InternalError))
}

/// Returns the static NUL-terminated diagnostic string for a verdict
/// code. Total: codes outside the defined encoding yield
/// `"Unknown error code"`. The caller must not free the result.
#[no_mangle]
pub extern "C" fn get_error_message(code: c_int) -> *const c_char {
    let message = match code {
        0 => MSG_VALID,
        1 => MSG_INVALID_CAPABILITIES,
        2 => MSG_INVALID_USER_NAMESPACE,
        3 => MSG_INVALID_NETWORK_MODE,
        4 => MSG_INVALID_PRIVILEGE_ESCAPE,
        5 => MSG_PARSE_ERROR,
        -1 => MSG_INTERNAL_ERROR,
        _ => MSG_UNKNOWN,
    };
    message.as_ptr()
}

/// Returns the static NUL-terminated library version string. The
/// caller must not free the result.
#[no_mangle]
pub extern "C" fn gatekeeper_version() -> *const c_char {
    VERSION_CSTR.as_ptr().cast::<c_char>()
}

/// One-shot initialisation hook. The validator holds no global state,
/// so this always succeeds; the symbol is kept for hosts that probe it
/// before validating.
#[no_mangle]
pub extern "C" fn gatekeeper_init() -> c_int {
    0
}
