//! Migration and verification CLI commands

use crate::crypto::EncryptionKey;
use crate::error::GuardResult;
use crate::migrate::{run_migration, verify_encryption, FieldOutcome};

use super::AppContext;

/// Run the encryption migration sweep.
///
/// Dry-run unless `apply` is set: the default never writes.
pub fn handle_migrate_command(ctx: &AppContext, apply: bool) -> GuardResult<()> {
    let key = EncryptionKey::from_env()?;
    let report = run_migration(&ctx.storage, &key, !apply)?;

    if report.dry_run {
        println!("Migration dry run (no writes). Re-run with --apply to encrypt.");
    } else {
        println!("Migration applied.");
    }
    println!();
    println!("Records scanned:    {}", report.records_scanned);
    println!("Fields updated:     {}", report.fields_updated);
    println!("Already encrypted:  {}", report.fields_skipped_encrypted);
    println!("Null fields:        {}", report.fields_skipped_null);
    println!("Errors:             {}", report.errors);

    if report.errors > 0 {
        println!();
        println!("Fields with errors:");
        for record in &report.records {
            for (field, outcome) in &record.fields {
                if let FieldOutcome::Error(reason) = outcome {
                    println!("  {} / {}: {}", record.user_id, field, reason);
                }
            }
        }
    }

    Ok(())
}

/// Run the read-only verification sweep
pub fn handle_verify_command(ctx: &AppContext) -> GuardResult<()> {
    let key = EncryptionKey::from_env()?;
    let report = verify_encryption(&ctx.storage, &key)?;

    println!("Verification (read-only)");
    println!();
    println!("Records scanned:    {}", report.records_scanned);
    println!("Encrypted fields:   {}", report.encrypted_fields);
    println!("Plaintext fields:   {}", report.plaintext_fields);
    println!("Null fields:        {}", report.null_fields);
    println!(
        "Encrypted ratio:    {:.1}%",
        report.encrypted_ratio() * 100.0
    );

    if report.key_confirmed() {
        println!("Key check:          OK (every envelope decrypted)");
    } else {
        println!("Key check:          FAILED for {} field(s):", report.decrypt_failures.len());
        for (user_id, field) in &report.decrypt_failures {
            println!("  {} / {}", user_id, field);
        }
    }

    Ok(())
}
