//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use canopy_core::error::{AppError, ErrorKind};
use canopy_core::result::AppResult;
use canopy_core::types::{ApplicationId, FolderId, PageRequest, PageResponse, UserId};
use canopy_entity::{Application, Folder, NewFolder, TraversalIds, UpdateFolder};

use crate::store::{ChildRecord, FolderStore, FolderTransaction};

use super::like_pattern;

/// Repository for folder queries and tree mutations.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn raw_ids(ids: &[FolderId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Store, message, e)
}

/// Map sibling uniqueness violations to validation errors.
fn write_err(message: &'static str, name: &str, path: &str) -> impl FnOnce(sqlx::Error) -> AppError {
    let name = name.to_string();
    let path = path.to_string();
    move |e| match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("folders_parent_id_name_key") =>
        {
            AppError::validation(format!("A sibling folder named '{name}' already exists"))
        }
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("folders_parent_id_path_key") =>
        {
            AppError::validation(format!("A sibling folder with path '{path}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Store, message, e),
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find folder"))
    }

    async fn find_by_ids(&self, ids: &[FolderId]) -> AppResult<Vec<Folder>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ANY($1) ORDER BY id ASC")
            .bind(raw_ids(ids))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to find folders by ids"))
    }

    async fn find_by_path_segments(&self, segments: &[String]) -> AppResult<Vec<Folder>> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE path = ANY($1) ORDER BY id ASC")
            .bind(segments)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to find folders by path segments"))
    }

    async fn find_by_name_fuzzy(&self, filter: &str) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE name ILIKE $1 ESCAPE '\\' ORDER BY id ASC",
        )
        .bind(like_pattern(filter))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to search folders by name"))
    }

    async fn find_by_name_fuzzy_under(
        &self,
        scope: FolderId,
        filter: &str,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE name ILIKE $1 ESCAPE '\\' \
               AND (',' || traversal_ids || ',') LIKE ('%,' || $2::text || ',%') \
               AND id <> $2 \
             ORDER BY id ASC",
        )
        .bind(like_pattern(filter))
        .bind(scope)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to search folders by name under scope"))
    }

    async fn find_children(
        &self,
        parent: FolderId,
        page: &PageRequest,
        include_applications: bool,
    ) -> AppResult<PageResponse<ChildRecord>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM folders WHERE parent_id = $1) \
                  + CASE WHEN $2 THEN (SELECT COUNT(*) FROM applications WHERE group_id = $1) \
                         ELSE 0 END",
        )
        .bind(parent)
        .bind(include_applications)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count children"))?;

        let keys: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT rank, id FROM ( \
                SELECT 0 AS rank, id, updated_at FROM folders WHERE parent_id = $1 \
                UNION ALL \
                SELECT 1 AS rank, id, updated_at FROM applications \
                 WHERE group_id = $1 AND $2 \
             ) children \
             ORDER BY rank ASC, updated_at DESC, id ASC \
             LIMIT $3 OFFSET $4",
        )
        .bind(parent)
        .bind(include_applications)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list children"))?;

        let folder_ids: Vec<i64> = keys.iter().filter(|(r, _)| *r == 0).map(|(_, id)| *id).collect();
        let app_ids: Vec<i64> = keys.iter().filter(|(r, _)| *r == 1).map(|(_, id)| *id).collect();

        let folders = sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ANY($1)")
            .bind(&folder_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to load child folders"))?;
        let applications =
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ANY($1)")
                .bind(&app_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err("Failed to load child applications"))?;

        // Re-assemble in the order the union query produced.
        let mut records = Vec::with_capacity(keys.len());
        for (rank, id) in keys {
            let record = if rank == 0 {
                folders
                    .iter()
                    .find(|f| f.id == FolderId(id))
                    .cloned()
                    .map(ChildRecord::Folder)
            } else {
                applications
                    .iter()
                    .find(|a| a.id == ApplicationId(id))
                    .cloned()
                    .map(ChildRecord::Application)
            };
            records.extend(record);
        }

        Ok(PageResponse::new(
            records,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn find_subfolders_under(&self, parent_ids: &[FolderId]) -> AppResult<Vec<Folder>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = ANY($1) ORDER BY id ASC",
        )
        .bind(raw_ids(parent_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list subfolders"))
    }

    async fn find_all(&self) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list folders"))
    }

    async fn begin(&self) -> AppResult<Box<dyn FolderTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;
        Ok(Box::new(PgFolderTransaction { tx }))
    }
}

/// A folder mutation unit backed by a PostgreSQL transaction.
pub struct PgFolderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl FolderTransaction for PgFolderTransaction {
    async fn find_by_id(&mut self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_err("Failed to lock folder"))
    }

    async fn find_siblings(&mut self, parent: FolderId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE parent_id = $1 ORDER BY id ASC")
            .bind(parent)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_err("Failed to list sibling folders"))
    }

    async fn count_subfolders(&mut self, id: FolderId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_err("Failed to count subfolders"))?;
        Ok(count as u64)
    }

    async fn find_descendants(&mut self, chain: &TraversalIds) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE traversal_ids LIKE $1 || ',%' ORDER BY id ASC FOR UPDATE",
        )
        .bind(chain.encode())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err("Failed to list descendant folders"))
    }

    async fn insert(&mut self, folder: &NewFolder, actor: UserId) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders \
                (name, path, description, visibility_level, parent_id, traversal_ids, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, '', $6, $6) RETURNING *",
        )
        .bind(&folder.name)
        .bind(&folder.path)
        .bind(&folder.description)
        .bind(folder.visibility_level)
        .bind(folder.parent_id)
        .bind(actor)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_err("Failed to create folder", &folder.name, &folder.path))
    }

    async fn update_traversal(&mut self, id: FolderId, chain: &TraversalIds) -> AppResult<()> {
        sqlx::query("UPDATE folders SET traversal_ids = $2 WHERE id = $1")
            .bind(id)
            .bind(chain.encode())
            .execute(&mut *self.tx)
            .await
            .map_err(db_err("Failed to update traversal ids"))?;
        Ok(())
    }

    async fn update_parent(
        &mut self,
        id: FolderId,
        parent: FolderId,
        chain: &TraversalIds,
        actor: UserId,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE folders SET parent_id = $2, traversal_ids = $3, updated_by = $4, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(parent)
        .bind(chain.encode())
        .bind(actor)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err("Failed to move folder"))?;
        Ok(())
    }

    async fn update_basic(
        &mut self,
        id: FolderId,
        fields: &UpdateFolder,
        actor: UserId,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE folders SET name = $2, path = $3, description = $4, visibility_level = $5, \
             updated_by = $6, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.path)
        .bind(&fields.description)
        .bind(fields.visibility_level)
        .bind(actor)
        .execute(&mut *self.tx)
        .await
        .map_err(write_err("Failed to update folder", &fields.name, &fields.path))?;
        Ok(result.rows_affected())
    }

    async fn delete(&mut self, id: FolderId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err("Failed to delete folder"))?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(db_err("Failed to commit transaction"))
    }
}
