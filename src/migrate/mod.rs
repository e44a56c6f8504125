//! Encryption migration and verification sweeps
//!
//! The migration sweep finds plaintext numbers sitting in fields that
//! must hold ciphertext and encrypts them in place. It is idempotent and
//! defaults to dry-run: no writes happen unless explicitly requested.
//! The verification sweep is read-only and trial-decrypts every
//! envelope to confirm the configured key, without re-exposing decrypted
//! values.

mod sweep;
mod verify;

pub use sweep::{run_migration, FieldOutcome, MigrationReport, RecordOutcome};
pub use verify::{verify_encryption, VerificationReport};
