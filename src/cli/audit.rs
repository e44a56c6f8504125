//! Audit log CLI commands

use clap::Subcommand;
use tabled::{Table, Tabled};

use crate::audit::{AuditAction, AuditEntry};
use crate::error::{GuardError, GuardResult};

use super::AppContext;

/// Audit log inspection commands (read-only: the log has no mutation
/// surface to expose)
#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show the most recent entries
    Recent {
        /// Number of entries to show
        #[arg(default_value_t = 20)]
        count: usize,
    },

    /// Show entries performed by an actor
    Actor {
        /// Actor identifier
        id: String,
    },

    /// Show entries concerning a target user
    Target {
        /// Target user identifier
        id: String,
    },

    /// Show entries of one action kind
    Action {
        /// Action kind (e.g. data_access, consent_given)
        kind: String,
    },
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Actor")]
    actor: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&AuditEntry> for AuditRow {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            timestamp: entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: entry.action.to_string(),
            actor: format!("{} ({})", entry.actor_id, entry.actor_type),
            target: entry.target_user_id.clone(),
            details: entry.details.clone().unwrap_or_default(),
        }
    }
}

/// Handle audit commands
pub fn handle_audit_command(ctx: &AppContext, cmd: AuditCommands) -> GuardResult<()> {
    let entries = match cmd {
        AuditCommands::Recent { count } => ctx.audit.read_recent(count)?,
        AuditCommands::Actor { id } => ctx.audit.for_actor(&id)?,
        AuditCommands::Target { id } => ctx.audit.for_target(&id)?,
        AuditCommands::Action { kind } => {
            let action = parse_action(&kind)?;
            ctx.audit.for_action(action)?
        }
    };

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    let rows: Vec<AuditRow> = entries.iter().map(AuditRow::from).collect();
    println!("{}", Table::new(rows));
    println!("{} entries", entries.len());

    Ok(())
}

fn parse_action(kind: &str) -> GuardResult<AuditAction> {
    serde_json::from_value(serde_json::Value::String(kind.to_string()))
        .map_err(|_| GuardError::Validation(format!("unknown audit action: {}", kind)))
}
