//! Consent CLI commands

use clap::Subcommand;

use crate::consent::ConsentUpdate;
use crate::error::GuardResult;

use super::AppContext;

/// Consent management commands
#[derive(Subcommand)]
pub enum ConsentCommands {
    /// Show a user's consent flags
    Show {
        /// User whose flags to show
        user: String,
    },

    /// Grant or change consent flags for a user
    Grant {
        /// User stating consent (must be the acting principal)
        user: String,

        /// Set the onboarding-data consent flag
        #[arg(long)]
        onboarding: Option<bool>,

        /// Set the AI-analysis consent flag
        #[arg(long)]
        ai: Option<bool>,

        /// Set the marketing consent flag
        #[arg(long)]
        marketing: Option<bool>,
    },

    /// Withdraw all consent for a user
    Withdraw {
        /// User withdrawing consent
        user: String,
    },
}

/// Handle consent commands
pub fn handle_consent_command(
    ctx: &AppContext,
    actor: &str,
    cmd: ConsentCommands,
) -> GuardResult<()> {
    let service = ctx.consent_service();

    match cmd {
        ConsentCommands::Show { user } => match service.get_flags(&user)? {
            Some(record) => {
                println!("Consent for {}", record.user_id);
                println!("  onboarding_data: {}", record.onboarding_data_consent);
                println!("  ai_analysis:     {}", record.ai_analysis_consent);
                match record.marketing_consent {
                    Some(flag) => println!("  marketing:       {}", flag),
                    None => println!("  marketing:       (never stated)"),
                }
                println!("  version:         {}", record.consent_version);
                println!("  consented_at:    {}", record.consented_at.format("%Y-%m-%d %H:%M:%S UTC"));
                println!("  last_updated:    {}", record.last_updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            None => println!("No consent record for {}", user),
        },

        ConsentCommands::Grant {
            user,
            onboarding,
            ai,
            marketing,
        } => {
            let update = ConsentUpdate {
                onboarding_data_consent: onboarding,
                ai_analysis_consent: ai,
                marketing_consent: marketing,
            };
            let record = service.update_consent(actor, &user, update, None, None)?;
            println!(
                "Consent updated for {} (version {})",
                record.user_id, record.consent_version
            );
        }

        ConsentCommands::Withdraw { user } => {
            service.withdraw_consent(actor, &user, None, None)?;
            println!("All consent withdrawn for {}", user);
        }
    }

    Ok(())
}
