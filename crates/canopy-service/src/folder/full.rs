//! Full name/path materialization from decoded ancestor chains.

use std::collections::HashMap;

use tracing::{debug, error};

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::FolderId;
use canopy_database::FolderStore;
use canopy_entity::{Folder, Full};

/// Join the names and path segments of `ancestors` (root first, self last).
pub fn materialize<'a>(ancestors: impl IntoIterator<Item = &'a Folder>) -> Full {
    let mut full = Full::default();
    for folder in ancestors {
        full.full_name.push('/');
        full.full_name.push_str(&folder.name);
        full.full_path.push('/');
        full.full_path.push_str(&folder.path);
    }
    full
}

/// Identifiers of a child named `name` with segment `path` under `parent`.
/// With no parent the child sits at the namespace root.
pub fn join(parent: Option<&Full>, name: &str, path: &str) -> Full {
    match parent {
        Some(parent) => Full::new(
            format!("{}/{}", parent.full_name, name),
            format!("{}/{}", parent.full_path, path),
        ),
        None => Full::new(format!("/{name}"), format!("/{path}")),
    }
}

/// Compute the [`Full`] of every folder in `folders` whose entire chain is
/// also in `folders`. Other folders are left out.
pub fn index(folders: &[Folder]) -> HashMap<FolderId, Full> {
    let by_id: HashMap<FolderId, &Folder> = folders.iter().map(|f| (f.id, f)).collect();

    let mut fulls = HashMap::with_capacity(folders.len());
    for folder in folders {
        let chain = match folder.traversal() {
            Ok(chain) => chain,
            Err(e) => {
                error!(
                    folder_id = %folder.id,
                    error = %e,
                    "Skipping folder with corrupt traversal ids"
                );
                continue;
            }
        };
        if chain.leaf() != folder.id {
            error!(
                folder_id = %folder.id,
                traversal_ids = %folder.traversal_ids,
                "Skipping folder whose traversal ids end with another folder"
            );
            continue;
        }
        let ancestors: Option<Vec<&Folder>> =
            chain.ids().iter().map(|id| by_id.get(id).copied()).collect();
        match ancestors {
            Some(ancestors) => {
                fulls.insert(folder.id, materialize(ancestors));
            }
            None => debug!(folder_id = %folder.id, "Ancestor chain not fully fetched"),
        }
    }
    fulls
}

/// Strict variant of [`index`] for one folder: every id of its chain must be
/// `folder` itself or present in `known`.
pub fn full_of(folder: &Folder, known: &HashMap<FolderId, Folder>) -> AppResult<Full> {
    let chain = folder.traversal()?;
    if chain.leaf() != folder.id {
        return Err(AppError::malformed_traversal(format!(
            "traversal ids '{}' of folder {} do not end with its own id",
            folder.traversal_ids, folder.id
        )));
    }

    let mut ancestors = Vec::with_capacity(chain.len());
    for id in chain.ancestors() {
        let ancestor = known.get(id).ok_or_else(|| {
            AppError::malformed_traversal(format!(
                "ancestor {id} of folder {} does not exist",
                folder.id
            ))
        })?;
        ancestors.push(ancestor);
    }
    ancestors.push(folder);
    Ok(materialize(ancestors))
}

/// Fetch `folder`'s ancestors and compute its [`Full`].
pub(crate) async fn load_full(store: &dyn FolderStore, folder: &Folder) -> AppResult<Full> {
    let chain = folder.traversal()?;
    let known: HashMap<FolderId, Folder> = store
        .find_by_ids(chain.ancestors())
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();
    full_of(folder, &known)
}
