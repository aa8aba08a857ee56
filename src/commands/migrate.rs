//! Database migration management commands.

use clap::{Args, Subcommand};

use canopy_core::config::AppConfig;
use canopy_core::error::AppError;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            let applied = canopy_database::migration::run_migrations(&pool).await?;
            if applied.is_empty() {
                output::print_success("Namespace schema already up to date.");
            } else {
                let versions: Vec<String> = applied.iter().map(i64::to_string).collect();
                output::print_success(&format!(
                    "Applied {} migration(s): {}",
                    applied.len(),
                    versions.join(", ")
                ));
            }
        }
    }

    pool.close().await;
    Ok(())
}
