//! Transactional folder mutations with ancestor chain maintenance.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::FolderId;
use canopy_database::{FolderStore, FolderTransaction};
use canopy_entity::{NewFolder, TraversalIds, UpdateFolder};

use crate::context::Actor;

/// The only writer of folders. Every operation runs in one transaction.
#[derive(Clone)]
pub struct TreeMutator {
    folders: Arc<dyn FolderStore>,
}

impl TreeMutator {
    /// Creates a new mutator.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// Create a folder and return its id.
    pub async fn create(&self, actor: &Actor, new_folder: &NewFolder) -> AppResult<FolderId> {
        new_folder.validate()?;

        let mut tx = self.folders.begin().await?;
        let parent_chain = if new_folder.parent_id.is_root() {
            None
        } else {
            let parent = tx.find_by_id(new_folder.parent_id).await?.ok_or_else(|| {
                AppError::not_found(format!("Parent folder {} not found", new_folder.parent_id))
            })?;
            Some(parent.traversal()?)
        };

        ensure_unique(
            &mut *tx,
            new_folder.parent_id,
            &new_folder.name,
            &new_folder.path,
            None,
        )
        .await?;

        let row = tx.insert(new_folder, actor.user_id).await?;
        let chain = TraversalIds::under(parent_chain.as_ref(), row.id);
        tx.update_traversal(row.id, &chain).await?;
        tx.commit().await?;

        info!(
            user_id = %actor.user_id,
            folder_id = %row.id,
            parent_id = %row.parent_id,
            traversal_ids = %chain,
            "Folder created"
        );
        Ok(row.id)
    }

    /// Move `id` under `new_parent`, rewriting the chains of the folder and
    /// all of its descendants.
    pub async fn reparent(
        &self,
        actor: &Actor,
        id: FolderId,
        new_parent: FolderId,
    ) -> AppResult<()> {
        let mut tx = self.folders.begin().await?;
        let folder = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        if new_parent == id {
            return Err(AppError::cycle(format!("Folder {id} cannot be its own parent")));
        }
        if folder.parent_id == new_parent {
            return Ok(());
        }

        let new_chain = if new_parent.is_root() {
            TraversalIds::root(id)
        } else {
            let parent = tx.find_by_id(new_parent).await?.ok_or_else(|| {
                AppError::not_found(format!("Target folder {new_parent} not found"))
            })?;
            let parent_chain = parent.traversal()?;
            if parent_chain.contains(id) {
                return Err(AppError::cycle(format!(
                    "Folder {new_parent} is a descendant of folder {id}"
                )));
            }
            parent_chain.child(id)
        };

        ensure_unique(&mut *tx, new_parent, &folder.name, &folder.path, Some(id)).await?;

        let old_chain = folder.traversal()?;
        let descendants = tx.find_descendants(&old_chain).await?;
        tx.update_parent(id, new_parent, &new_chain, actor.user_id).await?;
        for descendant in &descendants {
            let rebased = descendant
                .traversal()?
                .rebase(&old_chain, &new_chain)
                .ok_or_else(|| {
                    AppError::malformed_traversal(format!(
                        "folder {} does not descend from '{}'",
                        descendant.id, old_chain
                    ))
                })?;
            tx.update_traversal(descendant.id, &rebased).await?;
        }
        tx.commit().await?;

        info!(
            user_id = %actor.user_id,
            folder_id = %id,
            old_parent = %folder.parent_id,
            new_parent = %new_parent,
            descendants = descendants.len(),
            "Folder moved"
        );
        Ok(())
    }

    /// Overwrite a folder's name, path, description, and visibility.
    pub async fn update_basic(
        &self,
        actor: &Actor,
        id: FolderId,
        fields: &UpdateFolder,
    ) -> AppResult<()> {
        fields.validate()?;

        let mut tx = self.folders.begin().await?;
        let folder = tx
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        if folder.name != fields.name || folder.path != fields.path {
            ensure_unique(&mut *tx, folder.parent_id, &fields.name, &fields.path, Some(id))
                .await?;
        }

        if tx.update_basic(id, fields, actor.user_id).await? == 0 {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }
        tx.commit().await?;

        info!(
            user_id = %actor.user_id,
            folder_id = %id,
            name = %fields.name,
            path = %fields.path,
            "Folder updated"
        );
        Ok(())
    }

    /// Delete a folder without subfolders. Applications do not block the
    /// delete. Returns rows affected.
    pub async fn delete(&self, actor: &Actor, id: FolderId) -> AppResult<u64> {
        let mut tx = self.folders.begin().await?;
        if tx.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }

        let subfolders = tx.count_subfolders(id).await?;
        if subfolders > 0 {
            return Err(AppError::has_children(format!(
                "Folder {id} still has {subfolders} subfolder(s)"
            )));
        }

        let rows = tx.delete(id).await?;
        if rows == 0 {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }
        tx.commit().await?;

        info!(user_id = %actor.user_id, folder_id = %id, "Folder deleted");
        Ok(rows)
    }
}

/// Reject a sibling under `parent` that already uses `name` or `path`.
async fn ensure_unique(
    tx: &mut dyn FolderTransaction,
    parent: FolderId,
    name: &str,
    path: &str,
    except: Option<FolderId>,
) -> AppResult<()> {
    for sibling in tx.find_siblings(parent).await? {
        if Some(sibling.id) == except {
            continue;
        }
        if sibling.name == name {
            return Err(AppError::validation(format!(
                "A folder named '{name}' already exists here"
            )));
        }
        if sibling.path == path {
            return Err(AppError::validation(format!(
                "A folder with path '{path}' already exists here"
            )));
        }
    }
    Ok(())
}
