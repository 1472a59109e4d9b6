//! Capability-gated administrative operations.
//!
//! Every operation resolves the requester to an [`AdminUser`] first and
//! checks the capability it needs; a requester who is not an admin at all
//! and an admin missing the capability both get the same forbidden error.
//! Mutations append an activity entry after they succeed. Entries carry
//! resource identifiers only, never end-user names or email addresses.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::admin::{ActionLabel, AdminActivity, AdminUser, Capability};
use super::error::Error as DomainError;
use super::export::{ExportJob, ExportJobId, ExportType, SystemFile};
use super::ports::{
    AdminOps, AdminRepository, AdminStoreError, ExportJobRepository, ExportStoreError,
    UserRepository, UserStoreError,
};
use super::user::UserId;

/// Single message for every authorisation failure.
const NOT_PERMITTED: &str = "not permitted";

/// [`AdminOps`] implementation over the admin, export and user stores.
#[derive(Debug)]
pub struct AdminService<A, E, U> {
    admins: A,
    exports: E,
    users: U,
}

impl<A, E, U> AdminService<A, E, U> {
    /// Construct the service around its three stores.
    pub fn new(admins: A, exports: E, users: U) -> Self {
        Self {
            admins,
            exports,
            users,
        }
    }
}

fn map_admin_error(err: AdminStoreError) -> DomainError {
    match err {
        AdminStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("admin store unavailable: {message}"))
        }
        AdminStoreError::Query { message } => {
            DomainError::internal(format!("admin store query failed: {message}"))
        }
    }
}

fn map_export_error(err: ExportStoreError) -> DomainError {
    match err {
        ExportStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("export store unavailable: {message}"))
        }
        ExportStoreError::Query { message } => {
            DomainError::internal(format!("export store query failed: {message}"))
        }
    }
}

fn map_user_error(err: UserStoreError) -> DomainError {
    match err {
        UserStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            DomainError::internal(format!("user store query failed: {message}"))
        }
        UserStoreError::DuplicateEmail => {
            DomainError::internal("unexpected duplicate email during delete")
        }
    }
}

impl<A, E, U> AdminService<A, E, U>
where
    A: AdminRepository,
    E: ExportJobRepository,
    U: UserRepository,
{
    /// Resolve the requester and demand a capability.
    async fn require(
        &self,
        requester: &UserId,
        capability: Capability,
    ) -> Result<AdminUser, DomainError> {
        let admin = self
            .admins
            .find_by_user(requester)
            .await
            .map_err(map_admin_error)?
            .ok_or_else(|| DomainError::forbidden(NOT_PERMITTED))?;
        if !admin.capabilities().grants(capability) {
            warn!(admin_id = %admin.id(), %capability, "capability denied");
            return Err(DomainError::forbidden(NOT_PERMITTED));
        }
        Ok(admin)
    }

    /// Append an activity entry for a completed mutation.
    async fn log_action(
        &self,
        admin: &AdminUser,
        action: &str,
        details: serde_json::Value,
    ) -> Result<(), DomainError> {
        let label = ActionLabel::new(action)
            .map_err(|err| DomainError::internal(format!("invalid action label: {err}")))?;
        let entry = AdminActivity::record(*admin.id(), label, details);
        self.admins
            .record_activity(&entry)
            .await
            .map_err(map_admin_error)
    }

    /// Produce the artefact for a claimed job and move it to `Done`.
    async fn produce_artefact(
        &self,
        admin: &AdminUser,
        job: &mut ExportJob,
    ) -> Result<(), DomainError> {
        let file = SystemFile::create(
            *admin.id(),
            "csv",
            format!("{} export", job.export_type()),
        )
        .map_err(|err| DomainError::internal(format!("invalid file record: {err}")))?;
        self.exports
            .insert_file(&file)
            .await
            .map_err(map_export_error)?;

        job.finish(*file.id())
            .map_err(|err| DomainError::internal(format!("export job transition: {err}")))?;
        let finished = self
            .exports
            .update_job(job)
            .await
            .map_err(map_export_error)?;
        if !finished {
            return Err(DomainError::internal("export job vanished mid-run"));
        }

        self.log_action(
            admin,
            "export_job_completed",
            json!({ "jobId": job.id(), "fileId": file.id() }),
        )
        .await?;
        info!(job_id = %job.id(), file_id = %file.id(), "completed export job");
        Ok(())
    }

    /// Best-effort move of a claimed job to `Failed`. Without this a job
    /// stuck in `Running` would reject every retry as a conflict.
    async fn mark_failed(&self, mut job: ExportJob) {
        if job.fail().is_err() {
            return;
        }
        if let Err(err) = self.exports.update_job(&job).await {
            warn!(job_id = %job.id(), error = %err, "could not mark export job failed");
        }
    }
}

#[async_trait]
impl<A, E, U> AdminOps for AdminService<A, E, U>
where
    A: AdminRepository,
    E: ExportJobRepository,
    U: UserRepository,
{
    async fn list_activity(&self, requester: &UserId) -> Result<Vec<AdminActivity>, DomainError> {
        self.require(requester, Capability::ViewActivity).await?;
        self.admins.list_activity().await.map_err(map_admin_error)
    }

    async fn create_export_job(
        &self,
        requester: &UserId,
        export_type: ExportType,
    ) -> Result<ExportJob, DomainError> {
        let admin = self.require(requester, Capability::RunExports).await?;
        let job = ExportJob::create(*admin.id(), export_type);
        self.exports
            .insert_job(&job)
            .await
            .map_err(map_export_error)?;
        self.log_action(
            &admin,
            "export_job_created",
            json!({ "jobId": job.id(), "exportType": job.export_type() }),
        )
        .await?;
        info!(job_id = %job.id(), "created export job");
        Ok(job)
    }

    async fn run_export_job(
        &self,
        requester: &UserId,
        job_id: &ExportJobId,
    ) -> Result<ExportJob, DomainError> {
        let admin = self.require(requester, Capability::RunExports).await?;
        let mut job = self
            .exports
            .find_job(admin.id(), job_id)
            .await
            .map_err(map_export_error)?
            .ok_or_else(|| DomainError::not_found("export job not found"))?;

        job.start()
            .map_err(|_| DomainError::conflict("export job is not pending"))?;
        // The guarded write loses to any concurrent run of the same job.
        let claimed = self
            .exports
            .update_job(&job)
            .await
            .map_err(map_export_error)?;
        if !claimed {
            return Err(DomainError::conflict("export job is not pending"));
        }

        // Snapshot the claimed state; a failed run writes `Failed` from it
        // so the stored job still reaches a terminal status.
        let claimed_state = job.clone();
        match self.produce_artefact(&admin, &mut job).await {
            Ok(()) => Ok(job),
            Err(err) => {
                self.mark_failed(claimed_state).await;
                Err(err)
            }
        }
    }

    async fn delete_user(&self, requester: &UserId, user: &UserId) -> Result<(), DomainError> {
        let admin = self.require(requester, Capability::ManageUsers).await?;
        let removed = self.users.delete(user).await.map_err(map_user_error)?;
        if !removed {
            return Err(DomainError::not_found("user not found"));
        }
        self.log_action(&admin, "user_deleted", json!({ "userId": user }))
            .await?;
        info!(user_id = %user, "deleted user");
        Ok(())
    }
}
