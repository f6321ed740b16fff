//! Invite-code generation.
//!
//! A code is 128 bits from the operating system's CSPRNG, hex encoded. The
//! code is the bearer credential for an invitation, so it must not be
//! guessable or derived from anything about the invitee.

use rand_core::{OsRng, RngCore};

/// Length in bytes of the random part of a code.
pub const CODE_BYTES: usize = 16;

/// Generate a fresh invite code.
pub fn generate() -> String {
  let mut bytes = [0u8; CODE_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Generate a code not yet present according to `taken`.
///
/// A collision at 128 bits is not expected to ever happen; the loop only
/// keeps the within-event uniqueness guarantee unconditional.
pub fn generate_unique(taken: impl Fn(&str) -> bool) -> String {
  loop {
    let code = generate();
    if !taken(&code) {
      return code;
    }
  }
}
