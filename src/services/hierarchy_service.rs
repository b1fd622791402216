use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::{check_company_is_yours, check_user_is_admin, AuthUser};
use crate::database::company_store::CompanyStore;
use crate::database::models::{Company, Subdivision};
use crate::database::subdivision_store::{PathRewrite, StoreError, SubdivisionStore};
use crate::error::HierarchyError;
use crate::path::{LabelPath, PathError};

/// Payload for creating a subdivision. `parent` names an existing
/// subdivision; a subdivision whose declared parent equals its own name is
/// created as a root of the company's tree.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubdivisionRequest {
    pub name: String,
    pub parent: String,
}

/// Orchestrates mutations of the subdivision tree. Every public operation
/// runs as one transaction: reads first, then writes, committed together.
/// Dropping the transaction on an error path rolls everything back, so no
/// partial path rewrite ever survives a failure.
pub struct HierarchyService {
    pool: PgPool,
}

impl HierarchyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a subdivision under the named parent, or as a root when the
    /// request names itself as parent. The company's own name is reserved
    /// as the implicit root label and rejected.
    pub async fn create_subdivision(
        &self,
        company_id: Uuid,
        request: &CreateSubdivisionRequest,
        admin: &AuthUser,
    ) -> Result<Subdivision, HierarchyError> {
        check_user_is_admin(admin)?;

        let mut tx = self.pool.begin().await?;

        let company: Company = CompanyStore::find_by_id(&mut tx, company_id)
            .await?
            .ok_or_else(|| HierarchyError::not_found("Company not found"))?;
        check_company_is_yours(admin, company.id)?;

        if request.name == company.company_name {
            return Err(HierarchyError::conflict(
                "Incorrect parent or name already exists!",
            ));
        }

        let path = if request.name == request.parent {
            LabelPath::root(&request.name)?
        } else {
            let parent_path = SubdivisionStore::find_path_by_name(&mut tx, &request.parent)
                .await?
                .ok_or_else(|| HierarchyError::bad_request("Parent doesn't exists!"))?;
            parent_path.child(&request.name)?
        };

        let subdivision = SubdivisionStore::insert(&mut tx, &request.name, company.id, &path)
            .await
            .map_err(|err| conflict_as(err, "Subdivision already exists!"))?;

        tx.commit().await?;

        info!(
            "Created subdivision {} at path {}",
            subdivision.id, subdivision.path
        );
        Ok(subdivision)
    }

    pub async fn get_subdivision(&self, subdivision_id: i32) -> Result<Subdivision, HierarchyError> {
        let mut tx = self.pool.begin().await?;
        let subdivision = SubdivisionStore::find_by_id(&mut tx, subdivision_id)
            .await?
            .ok_or_else(|| HierarchyError::not_found("Subdivision not found"))?;
        tx.commit().await?;
        Ok(subdivision)
    }

    /// Rename a subdivision and rewrite the paths of all its descendants.
    ///
    /// Every rewritten path is computed from the state fetched at the start
    /// of the transaction and applied ancestors-first, so no rewrite reads
    /// another rewrite's intermediate result.
    pub async fn rename_subdivision(
        &self,
        subdivision_id: i32,
        new_name: &str,
    ) -> Result<Subdivision, HierarchyError> {
        let mut tx = self.pool.begin().await?;

        let subdivision = SubdivisionStore::find_by_id(&mut tx, subdivision_id)
            .await?
            .ok_or_else(|| HierarchyError::not_found("Subdivision not found"))?;

        let affected =
            SubdivisionStore::find_descendants_inclusive(&mut tx, &subdivision.path).await?;

        let new_path = subdivision.path.replace_label(&subdivision.name, new_name)?;
        let updated = SubdivisionStore::update_path(&mut tx, subdivision.id, new_name, &new_path)
            .await
            .map_err(|err| conflict_as(err, "Subdivision name already exists!"))?;

        let rewrites = plan_rename(&affected, subdivision.id, &subdivision.name, new_name)?;
        SubdivisionStore::bulk_rewrite_paths(&mut tx, &rewrites).await?;

        tx.commit().await?;

        info!(
            "Renamed subdivision {} to {} ({} descendant paths rewritten)",
            subdivision.id,
            new_name,
            rewrites.len()
        );
        Ok(updated)
    }

    /// Delete a subdivision, re-parenting every descendant one level up by
    /// removing the deleted node's label from its path.
    pub async fn delete_subdivision(&self, subdivision_id: i32) -> Result<(), HierarchyError> {
        let mut tx = self.pool.begin().await?;

        let subdivision = SubdivisionStore::find_by_id(&mut tx, subdivision_id)
            .await?
            .ok_or_else(|| HierarchyError::not_found("Subdivision not found"))?;

        let affected =
            SubdivisionStore::find_descendants_inclusive(&mut tx, &subdivision.path).await?;

        let rewrites = plan_reparent(&affected, subdivision.id, &subdivision.name)?;
        SubdivisionStore::bulk_rewrite_paths(&mut tx, &rewrites).await?;
        SubdivisionStore::delete_by_name(&mut tx, &subdivision.name).await?;

        tx.commit().await?;

        info!(
            "Deleted subdivision {} ({} descendants re-parented)",
            subdivision.id,
            rewrites.len()
        );
        Ok(())
    }

    /// Assign or clear the subdivision's manager. No path impact.
    pub async fn set_subdivision_manager(
        &self,
        subdivision_id: i32,
        manager_id: Option<Uuid>,
    ) -> Result<Subdivision, HierarchyError> {
        let mut tx = self.pool.begin().await?;
        let subdivision = SubdivisionStore::set_manager(&mut tx, subdivision_id, manager_id)
            .await?
            .ok_or_else(|| HierarchyError::not_found("Subdivision not found"))?;
        tx.commit().await?;
        Ok(subdivision)
    }
}

/// Rewrites for every fetched node except the renamed one: the old name
/// segment is replaced in place, all other segments untouched.
fn plan_rename(
    affected: &[Subdivision],
    renamed_id: i32,
    old_name: &str,
    new_name: &str,
) -> Result<Vec<PathRewrite>, PathError> {
    affected
        .iter()
        .filter(|node| node.id != renamed_id)
        .map(|node| {
            Ok(PathRewrite {
                id: node.id,
                path: node.path.replace_label(old_name, new_name)?,
            })
        })
        .collect()
}

/// Rewrites for every fetched node except the deleted one: the deleted
/// label is stripped, promoting the subtree one level toward the deleted
/// node's parent.
fn plan_reparent(
    affected: &[Subdivision],
    deleted_id: i32,
    deleted_name: &str,
) -> Result<Vec<PathRewrite>, PathError> {
    affected
        .iter()
        .filter(|node| node.id != deleted_id)
        .map(|node| {
            Ok(PathRewrite {
                id: node.id,
                path: node.path.strip_label(deleted_name)?,
            })
        })
        .collect()
}

fn conflict_as(err: StoreError, message: &str) -> HierarchyError {
    match err {
        StoreError::Conflict(_) => HierarchyError::conflict(message),
        StoreError::Sqlx(err) => HierarchyError::Database(err),
    }
}
