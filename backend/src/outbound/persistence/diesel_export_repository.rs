//! PostgreSQL-backed `ExportJobRepository` implementation using Diesel ORM.
//!
//! Job updates are guarded on the stored status still being non-terminal,
//! so two concurrent runs of the same job resolve to one winner without a
//! transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::{
    AdminId, ExportJob, ExportJobId, ExportJobRepository, ExportJobStatus, ExportStoreError,
    ExportType, SystemFile, SystemFileId,
};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ExportJobChangeset, ExportJobRow, NewExportJobRow, NewSystemFileRow};
use super::pool::{DbPool, PoolError};
use super::schema::{export_jobs, system_files};

/// Statuses a job may hold immediately before moving to the given one.
fn prior_statuses(status: ExportJobStatus) -> &'static [&'static str] {
    match status {
        ExportJobStatus::Pending => &[],
        ExportJobStatus::Running => &["pending"],
        ExportJobStatus::Done => &["running"],
        ExportJobStatus::Failed => &["pending", "running"],
    }
}

/// Diesel-backed implementation of the export job repository port.
#[derive(Clone)]
pub struct DieselExportRepository {
    pool: DbPool,
}

impl DieselExportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ExportStoreError {
    map_basic_pool_error(error, |message| ExportStoreError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> ExportStoreError {
    map_basic_diesel_error(error, ExportStoreError::query, ExportStoreError::connection)
}

/// Convert a database row into a validated domain export job.
fn row_to_job(row: ExportJobRow) -> Result<ExportJob, ExportStoreError> {
    let ExportJobRow {
        id,
        admin_id,
        export_type,
        status,
        created_at,
        completed_at,
        file_id,
    } = row;

    let export_type =
        ExportType::new(export_type).map_err(|err| ExportStoreError::query(err.to_string()))?;
    let status: ExportJobStatus = status
        .parse()
        .map_err(|err: crate::domain::ExportValidationError| {
            ExportStoreError::query(err.to_string())
        })?;
    Ok(ExportJob::new(
        ExportJobId::from_uuid(id),
        AdminId::from_uuid(admin_id),
        export_type,
        status,
        created_at,
        completed_at,
        file_id.map(SystemFileId::from_uuid),
    ))
}

#[async_trait]
impl ExportJobRepository for DieselExportRepository {
    async fn insert_job(&self, job: &ExportJob) -> Result<(), ExportStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewExportJobRow {
            id: *job.id().as_uuid(),
            admin_id: *job.admin_id().as_uuid(),
            export_type: job.export_type().as_ref(),
            status: job.status().as_str(),
            created_at: job.created_at(),
        };

        diesel::insert_into(export_jobs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_job(
        &self,
        admin: &AdminId,
        job: &ExportJobId,
    ) -> Result<Option<ExportJob>, ExportStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = export_jobs::table
            .find(job.as_uuid())
            .filter(export_jobs::admin_id.eq(admin.as_uuid()))
            .select(ExportJobRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_job).transpose()
    }

    async fn update_job(&self, job: &ExportJob) -> Result<bool, ExportStoreError> {
        let guard = prior_statuses(job.status());
        if guard.is_empty() {
            return Ok(false);
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ExportJobChangeset {
            status: job.status().as_str(),
            completed_at: job.completed_at(),
            file_id: job.file_id().map(|id| *id.as_uuid()),
        };

        let updated = diesel::update(
            export_jobs::table
                .find(job.id().as_uuid())
                .filter(export_jobs::status.eq_any(guard)),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn insert_file(&self, file: &SystemFile) -> Result<(), ExportStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSystemFileRow {
            id: *file.id().as_uuid(),
            admin_id: *file.admin_id().as_uuid(),
            file_type: file.file_type(),
            description: file.description(),
            created_at: file.created_at(),
        };

        diesel::insert_into(system_files::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
