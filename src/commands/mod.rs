//! CLI command definitions and dispatch.

pub mod folder;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use canopy_core::config::AppConfig;
use canopy_core::error::AppError;
use canopy_core::types::{FolderId, UserId};
use canopy_database::connection;
use canopy_database::{MemoryStore, PgStores};
use canopy_entity::{NewFolder, ResourceType, Role, VisibilityLevel};
use canopy_service::{Actor, FolderService, RequestContext};

use crate::output::OutputFormat;

/// Canopy: hierarchical namespace of folders, applications, and clusters
#[derive(Debug, Parser)]
#[command(name = "canopy", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Run against a seeded in-memory namespace instead of PostgreSQL
    #[arg(long)]
    pub memory: bool,

    /// Acting user ID (omit to act anonymously)
    #[arg(long)]
    pub user_id: Option<i64>,

    /// Act as an administrator
    #[arg(long)]
    pub admin: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Folder tree operations
    Folder(folder::FolderArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Folder(args) => {
                let service = if self.memory {
                    demo_service(&config).await?
                } else {
                    database_service(&config).await?
                };
                let ctx = self.request_context();
                folder::execute(args, &service, &ctx, self.format).await
            }
            Commands::Migrate(args) => migrate::execute(args, &config).await,
        }
    }

    /// Build the request context from the identity flags. Ctrl-C cancels it.
    fn request_context(&self) -> RequestContext {
        let ctx = match self.user_id {
            Some(id) => RequestContext::new(Actor::new(UserId(id), format!("user-{id}"), self.admin)),
            None => RequestContext::anonymous(),
        };

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling request");
                on_interrupt.cancel();
            }
        });
        ctx.with_cancel(cancel)
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<sqlx::PgPool, AppError> {
    connection::connect(&config.database, &config.service).await
}

async fn database_service(config: &AppConfig) -> Result<FolderService, AppError> {
    let stores = PgStores::new(create_db_pool(config).await?);
    Ok(FolderService::new(
        stores.folders,
        stores.applications,
        stores.clusters,
        stores.members,
        config.service.clone(),
    ))
}

/// A service over an in-memory namespace:
///
/// ```text
/// /payments                 (owner: user 1)
/// /payments/gateway
/// /payments/gateway/checkout-api ── eu-1, us-1
/// /payments/ledger-svc
/// /platform                 (pe: user 2)
/// /platform/observability
/// ```
async fn demo_service(config: &AppConfig) -> Result<FolderService, AppError> {
    let store = Arc::new(MemoryStore::new());
    let service = FolderService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        config.service.clone(),
    );

    let seeder = RequestContext::new(Actor::new(UserId(1), "seed", true));
    let payments = seed_folder(&service, &seeder, "Payments", "payments", FolderId::ROOT).await?;
    let gateway = seed_folder(&service, &seeder, "Gateway", "gateway", payments).await?;
    let platform = seed_folder(&service, &seeder, "Platform", "platform", FolderId::ROOT).await?;
    seed_folder(&service, &seeder, "Observability", "observability", platform).await?;

    let checkout = store.add_application("checkout-api", gateway).await;
    store.add_application("ledger-svc", payments).await;
    store.add_cluster("eu-1", checkout.id).await;
    store.add_cluster("us-1", checkout.id).await;

    store
        .grant(UserId(1), ResourceType::Group, payments.get(), Role::Owner)
        .await;
    store
        .grant(UserId(2), ResourceType::Group, platform.get(), Role::Pe)
        .await;

    info!("Seeded in-memory namespace");
    Ok(service)
}

async fn seed_folder(
    service: &FolderService,
    ctx: &RequestContext,
    name: &str,
    path: &str,
    parent_id: FolderId,
) -> Result<FolderId, AppError> {
    let new_folder = NewFolder {
        name: name.to_string(),
        path: path.to_string(),
        parent_id,
        visibility_level: VisibilityLevel::Internal,
        description: String::new(),
    };
    service.create(ctx, &new_folder).await
}
