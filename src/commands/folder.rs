//! Folder tree CLI commands.

use clap::{Args, Subcommand};
use tabled::Tabled;

use canopy_core::error::AppError;
use canopy_core::types::{FolderId, PageResponse};
use canopy_entity::{Child, FolderView, NewFolder, UpdateFolder, VisibilityLevel};
use canopy_service::{FolderService, RequestContext, SearchParams};

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List subfolders and applications of a folder (0 for the root)
    Children {
        /// Folder ID
        #[arg(default_value = "0")]
        id: FolderId,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(short = 's', long)]
        page_size: Option<u64>,
    },
    /// List subfolders of a folder (0 for the root)
    Subfolders {
        /// Folder ID
        #[arg(default_value = "0")]
        id: FolderId,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(short = 's', long)]
        page_size: Option<u64>,
    },
    /// Show one folder
    Get {
        /// Folder ID
        id: FolderId,
    },
    /// Resolve a path such as /payments/gateway/checkout-api
    Resolve {
        /// Full path
        path: String,
    },
    /// Fuzzy search by name
    Search {
        /// Name fragment
        filter: String,
        /// Limit the search to descendants of this folder
        #[arg(long, default_value = "0")]
        scope: FolderId,
        /// Match folders only
        #[arg(long)]
        folders_only: bool,
    },
    /// Create a folder
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Path segment
        #[arg(long)]
        path: String,
        /// Parent folder ID (0 for a top-level folder)
        #[arg(long, default_value = "0")]
        parent: FolderId,
        /// Visibility: private, internal, or public
        #[arg(long, default_value = "private")]
        visibility: VisibilityLevel,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Update a folder's name, path, visibility, and description
    Update {
        /// Folder ID
        id: FolderId,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Path segment
        #[arg(long)]
        path: String,
        /// Visibility: private, internal, or public
        #[arg(long, default_value = "private")]
        visibility: VisibilityLevel,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Move a folder under a new parent (0 for the root)
    Transfer {
        /// Folder ID
        id: FolderId,
        /// New parent folder ID
        #[arg(long)]
        parent: FolderId,
    },
    /// Delete a folder without subfolders
    Delete {
        /// Folder ID
        id: FolderId,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// List every folder the acting user may see
    Authorized,
}

/// Tree node display row
#[derive(Debug, Tabled)]
struct ChildRow {
    /// ID
    id: i64,
    /// Kind
    kind: String,
    /// Name
    name: String,
    /// Full path
    full_path: String,
    /// Children
    children: usize,
    /// Updated at
    updated_at: String,
}

impl ChildRow {
    fn from_child(child: &Child, depth: usize) -> Self {
        Self {
            id: child.id,
            kind: child.kind().to_string(),
            name: format!("{}{}", "  ".repeat(depth), child.name),
            full_path: child.full_path.clone(),
            children: child.children_count,
            updated_at: child.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Folder view display row
#[derive(Debug, Tabled)]
struct FolderViewRow {
    /// ID
    id: i64,
    /// Full name
    full_name: String,
    /// Full path
    full_path: String,
    /// Visibility
    visibility: String,
    /// Traversal IDs
    traversal_ids: String,
}

impl From<&FolderView> for FolderViewRow {
    fn from(view: &FolderView) -> Self {
        Self {
            id: view.id.get(),
            full_name: view.full_name.clone(),
            full_path: view.full_path.clone(),
            visibility: view.visibility_level.to_string(),
            traversal_ids: view.traversal_ids.clone(),
        }
    }
}

/// Flatten search results depth-first, indenting nested nodes.
fn flatten(children: &[Child], depth: usize, rows: &mut Vec<ChildRow>) {
    for child in children {
        rows.push(ChildRow::from_child(child, depth));
        if let Some(nested) = &child.children {
            flatten(nested, depth + 1, rows);
        }
    }
}

fn print_page(page: &PageResponse<Child>, format: OutputFormat) {
    let mut rows = Vec::new();
    flatten(&page.items, 0, &mut rows);
    output::print_list(&rows, page, format);
    if format == OutputFormat::Table {
        output::print_kv("Total", &page.total_items.to_string());
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    service: &FolderService,
    ctx: &RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FolderCommand::Children {
            id,
            page,
            page_size,
        } => {
            let page = service.page_request(*page, *page_size);
            let result = service.list_children(ctx, *id, page, true).await?;
            print_page(&result, format);
        }
        FolderCommand::Subfolders {
            id,
            page,
            page_size,
        } => {
            let page = service.page_request(*page, *page_size);
            let result = service.list_subfolders(ctx, *id, page).await?;
            print_page(&result, format);
        }
        FolderCommand::Get { id } => {
            let child = service.get_by_id(ctx, *id).await?;
            output::print_list(&[ChildRow::from_child(&child, 0)], &child, format);
        }
        FolderCommand::Resolve { path } => {
            let child = service.resolve(ctx, path).await?;
            output::print_list(&[ChildRow::from_child(&child, 0)], &child, format);
        }
        FolderCommand::Search {
            filter,
            scope,
            folders_only,
        } => {
            let params = SearchParams {
                scope: *scope,
                filter: filter.clone(),
                page: service.page_request(1, None),
                include_applications: true,
            };
            let result = if *folders_only {
                service.search_subfolders(ctx, &params).await?
            } else {
                service.search(ctx, &params).await?
            };
            print_page(&result, format);
        }
        FolderCommand::Create {
            name,
            path,
            parent,
            visibility,
            description,
        } => {
            let new_folder = NewFolder {
                name: name.clone(),
                path: path.clone(),
                parent_id: *parent,
                visibility_level: *visibility,
                description: description.clone(),
            };
            let id = service.create(ctx, &new_folder).await?;
            output::print_item(
                &format!("Folder '{name}' created (id: {id})"),
                &serde_json::json!({ "id": id }),
                format,
            );
        }
        FolderCommand::Update {
            id,
            name,
            path,
            visibility,
            description,
        } => {
            let fields = UpdateFolder {
                name: name.clone(),
                path: path.clone(),
                visibility_level: *visibility,
                description: description.clone(),
            };
            service.update_basic(ctx, *id, &fields).await?;
            output::print_item(
                &format!("Folder {id} updated"),
                &serde_json::json!({ "id": id }),
                format,
            );
        }
        FolderCommand::Transfer { id, parent } => {
            service.reparent(ctx, *id, *parent).await?;
            output::print_item(
                &format!("Folder {id} moved under {parent}"),
                &serde_json::json!({ "id": id, "parent_id": parent }),
                format,
            );
        }
        FolderCommand::Delete { id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete folder {id}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    output::print_warning("Cancelled.");
                    return Ok(());
                }
            }

            let rows = service.delete(ctx, *id).await?;
            output::print_item(
                &format!("Folder {id} deleted"),
                &serde_json::json!({ "id": id, "rows_affected": rows }),
                format,
            );
        }
        FolderCommand::Authorized => {
            let views = service.list_authorized(ctx).await?;
            let rows: Vec<FolderViewRow> = views.iter().map(FolderViewRow::from).collect();
            output::print_list(&rows, &views, format);
        }
    }

    Ok(())
}
