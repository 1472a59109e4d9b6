//! PostgreSQL-backed `AdminRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::{
    ActionLabel, AdminActivity, AdminId, AdminRepository, AdminStoreError, AdminUser,
    CapabilitySet, UserId,
};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AdminActivityRow, AdminUserRow, NewAdminActivityRow};
use super::pool::{DbPool, PoolError};
use super::schema::{admin_activities, admin_users};

/// Diesel-backed implementation of the admin repository port.
#[derive(Clone)]
pub struct DieselAdminRepository {
    pool: DbPool,
}

impl DieselAdminRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdminStoreError {
    map_basic_pool_error(error, |message| AdminStoreError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> AdminStoreError {
    map_basic_diesel_error(error, AdminStoreError::query, AdminStoreError::connection)
}

/// Convert a database row into a validated domain administrator.
fn row_to_admin(row: AdminUserRow) -> Result<AdminUser, AdminStoreError> {
    let AdminUserRow {
        id,
        user_id,
        role,
        capabilities,
        created_at: _,
    } = row;

    let capabilities: CapabilitySet = serde_json::from_value(capabilities)
        .map_err(|err| AdminStoreError::query(format!("decode capabilities: {err}")))?;
    Ok(AdminUser::new(
        AdminId::from_uuid(id),
        UserId::from_uuid(user_id),
        role,
        capabilities,
    ))
}

/// Convert a database row into a validated activity entry.
fn row_to_activity(row: AdminActivityRow) -> Result<AdminActivity, AdminStoreError> {
    let AdminActivityRow {
        id,
        admin_id,
        action,
        details,
        created_at,
    } = row;

    let action = ActionLabel::new(action).map_err(|err| AdminStoreError::query(err.to_string()))?;
    Ok(AdminActivity::new(
        id,
        AdminId::from_uuid(admin_id),
        action,
        details,
        created_at,
    ))
}

#[async_trait]
impl AdminRepository for DieselAdminRepository {
    async fn find_by_user(&self, user: &UserId) -> Result<Option<AdminUser>, AdminStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = admin_users::table
            .filter(admin_users::user_id.eq(user.as_uuid()))
            .select(AdminUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_admin).transpose()
    }

    async fn record_activity(&self, activity: &AdminActivity) -> Result<(), AdminStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAdminActivityRow {
            id: *activity.id(),
            admin_id: *activity.admin_id().as_uuid(),
            action: activity.action().as_ref(),
            details: activity.details(),
            created_at: activity.created_at(),
        };

        diesel::insert_into(admin_activities::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_activity(&self) -> Result<Vec<AdminActivity>, AdminStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AdminActivityRow> = admin_activities::table
            .order(admin_activities::created_at.desc())
            .select(AdminActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_activity).collect()
    }
}
