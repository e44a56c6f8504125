use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use finguard::cli::{
    handle_audit_command, handle_consent_command, handle_migrate_command, handle_record_command,
    handle_verify_command, AppContext, AuditCommands, ConsentCommands, RecordCommands,
};
use finguard::config::{GuardPaths, Settings};

#[derive(Parser)]
#[command(
    name = "finguard",
    author = "Kaylee Beyene",
    version,
    about = "Financial data protection core",
    long_about = "finguard protects personal-financial data at rest: field-level \
                  AES-256-GCM encryption, consent lifecycle management, role-based \
                  access gating, and an append-only audit trail."
)]
struct Cli {
    /// Acting principal for privileged commands
    #[arg(long, global = true, default_value = "system")]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and storage
    Init,

    /// Show current configuration and paths
    Config,

    /// Encrypt legacy plaintext fields (dry run unless --apply)
    Migrate {
        /// Actually write the encrypted values
        #[arg(long)]
        apply: bool,
    },

    /// Verify stored envelopes decrypt with the configured key
    Verify,

    /// Inspect the audit log
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Manage consent flags
    #[command(subcommand)]
    Consent(ConsentCommands),

    /// Manage financial records
    #[command(subcommand)]
    Record(RecordCommands),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let paths = GuardPaths::new()?;
            paths.ensure_directories()?;
            let settings = Settings::load_or_create(&paths)?;
            println!("Initialized finguard at {}", paths.base_dir().display());
            println!("Consent text version: {}", settings.consent_version);
            if settings.root_principal.is_none() {
                println!("No root principal configured (set FINGUARD_ROOT_PRINCIPAL or config.json).");
            }
        }

        Commands::Config => {
            let paths = GuardPaths::new()?;
            let settings = Settings::load_or_create(&paths)?;
            println!("Base directory: {}", paths.base_dir().display());
            println!("Records:        {}", paths.records_file().display());
            println!("Roles:          {}", paths.roles_file().display());
            println!("Consent:        {}", paths.consent_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!("Audit strict:   {}", settings.audit_strict);
            match &settings.root_principal {
                Some(root) => println!("Root principal: {}", root),
                None => println!("Root principal: (not configured)"),
            }
        }

        Commands::Migrate { apply } => {
            let ctx = AppContext::load()?;
            handle_migrate_command(&ctx, apply)?;
        }

        Commands::Verify => {
            let ctx = AppContext::load()?;
            handle_verify_command(&ctx)?;
        }

        Commands::Audit(cmd) => {
            let ctx = AppContext::load()?;
            handle_audit_command(&ctx, cmd)?;
        }

        Commands::Consent(cmd) => {
            let ctx = AppContext::load()?;
            handle_consent_command(&ctx, &cli.actor, cmd)?;
        }

        Commands::Record(cmd) => {
            let ctx = AppContext::load()?;
            handle_record_command(&ctx, &cli.actor, cmd)?;
        }
    }

    Ok(())
}
