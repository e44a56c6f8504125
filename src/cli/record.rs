//! Financial record CLI commands

use clap::Subcommand;
use serde_json::{json, Value};

use crate::error::GuardResult;
use crate::masking::mask_value;

use super::AppContext;

/// Financial record commands
#[derive(Subcommand)]
pub enum RecordCommands {
    /// Show a user's record (decrypted only for the subject themselves)
    Show {
        /// Target user
        user: String,

        /// Print a masked view instead of the policy-decided view
        #[arg(long)]
        masked: bool,
    },

    /// Set a field on a user's record
    Set {
        /// Target user
        user: String,

        /// Field name
        field: String,

        /// Field value (number or string)
        value: String,
    },

    /// Export a user's record with decrypted values (subject only)
    Export {
        /// Target user
        user: String,
    },

    /// Delete a user's record
    Delete {
        /// Target user
        user: String,

        /// Remove the record entirely instead of tombstoning it
        #[arg(long)]
        hard: bool,
    },
}

/// Handle record commands
pub fn handle_record_command(
    ctx: &AppContext,
    actor: &str,
    cmd: RecordCommands,
) -> GuardResult<()> {
    let service = ctx.data_service()?;
    let actor_type = ctx.actor_type(actor);

    match cmd {
        RecordCommands::Show { user, masked } => {
            let record = service.read_profile(actor, actor_type, &user)?;
            let shown = if masked { mask_value(&record) } else { record };
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }

        RecordCommands::Set { user, field, value } => {
            let parsed: Value = match value.parse::<f64>() {
                Ok(number) => json!(number),
                Err(_) => json!(value),
            };
            let mut update = serde_json::Map::new();
            update.insert(field.clone(), parsed);
            service.update_profile(actor, actor_type, &user, Value::Object(update))?;
            println!("Updated {} for {}", field, user);
        }

        RecordCommands::Export { user } => {
            let record = service.export_profile(actor, actor_type, &user)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        RecordCommands::Delete { user, hard } => {
            service.delete_profile(actor, actor_type, &user, hard, None)?;
            if hard {
                println!("Record for {} removed", user);
            } else {
                println!("Record for {} marked deleted", user);
            }
        }
    }

    Ok(())
}
