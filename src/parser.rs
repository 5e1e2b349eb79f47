//! Bounded structural scanner over OCI configuration JSON.
//!
//! This is deliberately not a general JSON parser. The validator reads
//! a fixed table of security-relevant paths and ignores everything
//! else, so the parser is a small depth-tracking token scanner rather
//! than an AST builder: each recognised path is located by an
//! independent left-to-right scan from the start of the input. The
//! state per scan is a cursor, a depth counter, and one fixed 256-byte
//! key buffer, which keeps the machine easy to audit at the cost of
//! O(input × paths) time over a small constant number of paths.
//!
//! The scanner never fails hard. Structurally malformed regions read
//! as "field not present" and leave the defaults in place; the cursor
//! is strictly monotonic, so every scan terminates on bounded input.

use crate::config::ContainerConfig;
use crate::constants::{MAX_FIELD_NAME, MAX_JSON};
use crate::policy;

// =============================================================================
// Parse Result
// =============================================================================

/// Outcome classification for a parse attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// Input was within bounds; the configuration is usable.
    Ok,
    /// Input exceeded [`MAX_JSON`]; nothing was parsed.
    TooLong,
    /// Input was empty or structurally unusable.
    InvalidJson,
    /// Reserved: a required field was absent. Not produced by the
    /// current path table, which defaults absent fields instead.
    MissingField,
    /// Reserved: a field was present with an unusable value. Not
    /// produced by the current path table, which defaults such fields.
    InvalidValue,
}

/// A parse attempt always yields both a status and a total
/// configuration; non-[`ParseStatus::Ok`] statuses carry the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub status: ParseStatus,
    pub config: ContainerConfig,
}

/// Projects a JSON document onto a hardened [`ContainerConfig`].
///
/// Starts from the secure defaults, overwrites each recognised field
/// that is actually present, then applies [`policy::harden`], so an
/// [`ParseStatus::Ok`] result satisfies the security predicate by
/// construction. Inputs longer than [`MAX_JSON`] bytes or empty inputs
/// are rejected without partial parsing.
pub fn parse(bytes: &[u8]) -> ParseResult {
    let mut config = ContainerConfig::default();

    if bytes.len() > MAX_JSON {
        return ParseResult {
            status: ParseStatus::TooLong,
            config,
        };
    }
    if bytes.is_empty() {
        return ParseResult {
            status: ParseStatus::InvalidJson,
            config,
        };
    }

    if let Some(uid) = scan_user_id(bytes) {
        config.user_id = uid;
    }
    if scan_user_namespace(bytes) {
        config.user_namespace = true;
    }
    if let Some(readonly) = scan_root_readonly(bytes) {
        config.root_read_only = readonly;
    }

    policy::harden(&mut config);

    ParseResult {
        status: ParseStatus::Ok,
        config,
    }
}

// =============================================================================
// Recognised Paths
// =============================================================================

/// `.process.user.uid`: the UID the container runs as.
fn scan_user_id(bytes: &[u8]) -> Option<u64> {
    let mut scanner = Scanner::new(bytes);
    if !scanner.seek_key(b"process") || !scanner.seek_key(b"user") || !scanner.seek_key(b"uid") {
        return None;
    }
    scanner.read_natural()
}

/// `.linux.namespaces[*].type == "user"`: user namespace requested.
///
/// The membership check is intentionally loose: once `"namespaces"` is
/// located inside `"linux"`, any later `"type"` key whose value is the
/// string `"user"` sets the flag, without proving the pair sits inside
/// the namespaces array. Tightening this to array membership is a
/// behavior change reserved for a major version.
fn scan_user_namespace(bytes: &[u8]) -> bool {
    let mut scanner = Scanner::new(bytes);
    if !scanner.seek_key(b"linux") || !scanner.seek_key(b"namespaces") {
        return false;
    }
    while scanner.seek_key_loose(b"type") {
        if scanner.value_is_string(b"user") {
            return true;
        }
    }
    false
}

/// `.root.readonly`: whether the root filesystem is read-only.
fn scan_root_readonly(bytes: &[u8]) -> Option<bool> {
    let mut scanner = Scanner::new(bytes);
    if !scanner.seek_key(b"root") || !scanner.seek_key(b"readonly") {
        return None;
    }
    Some(scanner.read_bool())
}

// =============================================================================
// Scanner
// =============================================================================

/// Cursor over the input bytes. Every method either advances the
/// cursor or returns, which is what guarantees termination.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Scanner { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Consumes the string token at the cursor (sitting on the opening
    /// quote) into `buf`, returning the captured length. `\x` escape
    /// pairs are consumed without decoding so they cannot misalign the
    /// scan; bytes beyond the buffer are silently dropped. An
    /// unterminated string consumes the rest of the input.
    fn read_string(&mut self, buf: &mut [u8; MAX_FIELD_NAME]) -> usize {
        self.pos += 1;
        let mut len = 0;
        while let Some(b) = self.peek() {
            match b {
                b'"' => {
                    self.pos += 1;
                    return len;
                }
                b'\\' => self.pos += 2,
                _ => {
                    if len < buf.len() {
                        buf[len] = b;
                        len += 1;
                    }
                    self.pos += 1;
                }
            }
        }
        len
    }

    /// Scans forward for a `"key":` pair whose containing depth is
    /// exactly 1 relative to the cursor position at entry, leaving the
    /// cursor just past the colon. Gives up when the value enclosing
    /// the entry position closes or the input ends.
    fn seek_key(&mut self, key: &[u8]) -> bool {
        let mut depth: i32 = 0;
        let mut buf = [0u8; MAX_FIELD_NAME];
        while let Some(b) = self.peek() {
            match b {
                b'{' | b'[' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' | b']' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth < 0 {
                        return false;
                    }
                }
                b'"' => {
                    let len = self.read_string(&mut buf);
                    self.skip_whitespace();
                    if self.peek() == Some(b':') {
                        self.pos += 1;
                        if depth == 1 && &buf[..len] == key {
                            return true;
                        }
                    }
                }
                _ => self.pos += 1,
            }
        }
        false
    }

    /// Depth-insensitive variant of [`Scanner::seek_key`]: matches a
    /// `"key":` pair anywhere between the cursor and the end of input.
    fn seek_key_loose(&mut self, key: &[u8]) -> bool {
        let mut buf = [0u8; MAX_FIELD_NAME];
        while let Some(b) = self.peek() {
            match b {
                b'"' => {
                    let len = self.read_string(&mut buf);
                    self.skip_whitespace();
                    if self.peek() == Some(b':') {
                        self.pos += 1;
                        if &buf[..len] == key {
                            return true;
                        }
                    }
                }
                _ => self.pos += 1,
            }
        }
        false
    }

    /// Reads a run of ASCII digits after optional whitespace,
    /// saturating at `u64::MAX` instead of overflowing. `None` when
    /// the value does not start with a digit.
    fn read_natural(&mut self) -> Option<u64> {
        self.skip_whitespace();
        let mut value: u64 = 0;
        let mut digits = 0usize;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            value = value.saturating_mul(10).saturating_add(u64::from(b - b'0'));
            digits += 1;
            self.pos += 1;
        }
        (digits > 0).then_some(value)
    }

    /// Reads a boolean literal after optional whitespace. Exactly
    /// `true` reads as true; `false` and every other token read as
    /// false.
    fn read_bool(&mut self) -> bool {
        self.skip_whitespace();
        let rest = self.bytes.get(self.pos..).unwrap_or(&[]);
        if rest.starts_with(b"true") {
            self.pos += 4;
            true
        } else {
            if rest.starts_with(b"false") {
                self.pos += 5;
            }
            false
        }
    }

    /// Whether the value at the cursor is the string `expected`.
    fn value_is_string(&mut self, expected: &[u8]) -> bool {
        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return false;
        }
        let mut buf = [0u8; MAX_FIELD_NAME];
        let len = self.read_string(&mut buf);
        &buf[..len] == expected
    }
}
