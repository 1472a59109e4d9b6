//! Ports connecting the domain to the outside world.
//!
//! Driven ports (`*Repository`) are implemented by persistence adapters;
//! driving ports ([`Accounts`], [`Inventory`], [`ThingExport`],
//! [`AdminOps`]) are implemented by domain services and consumed by the
//! HTTP layer. Every repository method that mutates on behalf of a user
//! carries the requesting owner so the implementation can scope the
//! statement itself; "absent" and "owned by someone else" are returned
//! identically.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::admin::{AdminActivity, AdminId, AdminUser};
use super::error::Error as DomainError;
use super::export::{ExportJob, ExportJobId, SystemFile};
use super::inventory::{
    Quantity, Room, RoomId, RoomName, RoomWithThings, Thing, ThingId, ThingName, ThingWithRoom,
};
use super::user::{EmailAddress, PasswordDigest, User, UserId, UserName};

/// Errors surfaced by user persistence.
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    #[error("user store query failed: {message}")]
    Query { message: String },
    #[error("email address is already registered")]
    DuplicateEmail,
}

impl UserStoreError {
    /// Build a [`UserStoreError::Connection`] from any displayable source.
    pub fn connection(message: impl ToString) -> Self {
        Self::Connection {
            message: message.to_string(),
        }
    }

    /// Build a [`UserStoreError::Query`] from any displayable source.
    pub fn query(message: impl ToString) -> Self {
        Self::Query {
            message: message.to_string(),
        }
    }
}

/// Errors surfaced by room and thing persistence.
#[derive(Debug, Error)]
pub enum InventoryStoreError {
    #[error("inventory store connection failed: {message}")]
    Connection { message: String },
    #[error("inventory store query failed: {message}")]
    Query { message: String },
}

impl InventoryStoreError {
    /// Build an [`InventoryStoreError::Connection`] from any displayable source.
    pub fn connection(message: impl ToString) -> Self {
        Self::Connection {
            message: message.to_string(),
        }
    }

    /// Build an [`InventoryStoreError::Query`] from any displayable source.
    pub fn query(message: impl ToString) -> Self {
        Self::Query {
            message: message.to_string(),
        }
    }
}

/// Errors surfaced by admin identity and activity persistence.
#[derive(Debug, Error)]
pub enum AdminStoreError {
    #[error("admin store connection failed: {message}")]
    Connection { message: String },
    #[error("admin store query failed: {message}")]
    Query { message: String },
}

impl AdminStoreError {
    /// Build an [`AdminStoreError::Connection`] from any displayable source.
    pub fn connection(message: impl ToString) -> Self {
        Self::Connection {
            message: message.to_string(),
        }
    }

    /// Build an [`AdminStoreError::Query`] from any displayable source.
    pub fn query(message: impl ToString) -> Self {
        Self::Query {
            message: message.to_string(),
        }
    }
}

/// Errors surfaced by export job and file persistence.
#[derive(Debug, Error)]
pub enum ExportStoreError {
    #[error("export store connection failed: {message}")]
    Connection { message: String },
    #[error("export store query failed: {message}")]
    Query { message: String },
}

impl ExportStoreError {
    /// Build an [`ExportStoreError::Connection`] from any displayable source.
    pub fn connection(message: impl ToString) -> Self {
        Self::Connection {
            message: message.to_string(),
        }
    }

    /// Build an [`ExportStoreError::Query`] from any displayable source.
    pub fn query(message: impl ToString) -> Self {
        Self::Query {
            message: message.to_string(),
        }
    }
}

/// Persistence port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with [`UserStoreError::DuplicateEmail`]
    /// when the address is already registered.
    async fn insert(&self, user: &User) -> Result<(), UserStoreError>;

    /// Look a user up by email address.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserStoreError>;

    /// Look a user up by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;

    /// Delete a user and, via cascade, everything they own. Returns
    /// whether a row was removed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserStoreError>;
}

/// Persistence port for the ownership tree of rooms and things.
///
/// `Option`-returning mutations yield `None` when the target row does not
/// exist within the requesting owner's scope, for whatever reason.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// All rooms owned by `owner`, each with its things.
    async fn list_rooms(&self, owner: &UserId) -> Result<Vec<RoomWithThings>, InventoryStoreError>;

    /// One owned room with its things.
    async fn find_room(
        &self,
        owner: &UserId,
        room: &RoomId,
    ) -> Result<Option<RoomWithThings>, InventoryStoreError>;

    /// Persist a new room.
    async fn insert_room(&self, room: &Room) -> Result<(), InventoryStoreError>;

    /// Rename an owned room, returning the updated row.
    async fn rename_room(
        &self,
        owner: &UserId,
        room: &RoomId,
        name: &RoomName,
    ) -> Result<Option<Room>, InventoryStoreError>;

    /// Delete an owned room and its things. Returns whether a row was
    /// removed.
    async fn delete_room(&self, owner: &UserId, room: &RoomId)
    -> Result<bool, InventoryStoreError>;

    /// All things across the owner's rooms, each paired with its room name.
    async fn list_things(&self, owner: &UserId)
    -> Result<Vec<ThingWithRoom>, InventoryStoreError>;

    /// Persist a new thing if its room belongs to `owner`.
    async fn insert_thing(
        &self,
        owner: &UserId,
        thing: &Thing,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError>;

    /// Update an owned thing's name and quantity, returning the updated row.
    async fn update_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
        name: &ThingName,
        quantity: Quantity,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError>;

    /// Delete an owned thing. Returns whether a row was removed.
    async fn delete_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
    ) -> Result<bool, InventoryStoreError>;
}

/// Persistence port for admin identities and the activity log.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// The administrator wrapping the given user, if any.
    async fn find_by_user(&self, user: &UserId) -> Result<Option<AdminUser>, AdminStoreError>;

    /// Append an activity entry.
    async fn record_activity(&self, activity: &AdminActivity) -> Result<(), AdminStoreError>;

    /// All activity entries, newest first.
    async fn list_activity(&self) -> Result<Vec<AdminActivity>, AdminStoreError>;
}

/// Persistence port for export jobs and their produced files.
#[async_trait]
pub trait ExportJobRepository: Send + Sync {
    /// Persist a new job.
    async fn insert_job(&self, job: &ExportJob) -> Result<(), ExportStoreError>;

    /// One job owned by the given administrator.
    async fn find_job(
        &self,
        admin: &AdminId,
        job: &ExportJobId,
    ) -> Result<Option<ExportJob>, ExportStoreError>;

    /// Persist a job's status, completion time and file reference. The
    /// write is guarded on the stored status still being a legal
    /// predecessor of the new one; returns whether a row changed, so a
    /// caller that lost a concurrent claim sees `false`.
    async fn update_job(&self, job: &ExportJob) -> Result<bool, ExportStoreError>;

    /// Persist a produced file record.
    async fn insert_file(&self, file: &SystemFile) -> Result<(), ExportStoreError>;
}

// Repositories shared behind an `Arc` delegate to the inner value, so one
// store instance can back several services.

#[async_trait]
impl<T> UserRepository for Arc<T>
where
    T: UserRepository + ?Sized,
{
    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        (**self).insert(user).await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserStoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        (**self).find_by_id(id).await
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserStoreError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<T> InventoryRepository for Arc<T>
where
    T: InventoryRepository + ?Sized,
{
    async fn list_rooms(&self, owner: &UserId) -> Result<Vec<RoomWithThings>, InventoryStoreError> {
        (**self).list_rooms(owner).await
    }

    async fn find_room(
        &self,
        owner: &UserId,
        room: &RoomId,
    ) -> Result<Option<RoomWithThings>, InventoryStoreError> {
        (**self).find_room(owner, room).await
    }

    async fn insert_room(&self, room: &Room) -> Result<(), InventoryStoreError> {
        (**self).insert_room(room).await
    }

    async fn rename_room(
        &self,
        owner: &UserId,
        room: &RoomId,
        name: &RoomName,
    ) -> Result<Option<Room>, InventoryStoreError> {
        (**self).rename_room(owner, room, name).await
    }

    async fn delete_room(
        &self,
        owner: &UserId,
        room: &RoomId,
    ) -> Result<bool, InventoryStoreError> {
        (**self).delete_room(owner, room).await
    }

    async fn list_things(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ThingWithRoom>, InventoryStoreError> {
        (**self).list_things(owner).await
    }

    async fn insert_thing(
        &self,
        owner: &UserId,
        thing: &Thing,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
        (**self).insert_thing(owner, thing).await
    }

    async fn update_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
        name: &ThingName,
        quantity: Quantity,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
        (**self).update_thing(owner, thing, name, quantity).await
    }

    async fn delete_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
    ) -> Result<bool, InventoryStoreError> {
        (**self).delete_thing(owner, thing).await
    }
}

#[async_trait]
impl<T> AdminRepository for Arc<T>
where
    T: AdminRepository + ?Sized,
{
    async fn find_by_user(&self, user: &UserId) -> Result<Option<AdminUser>, AdminStoreError> {
        (**self).find_by_user(user).await
    }

    async fn record_activity(&self, activity: &AdminActivity) -> Result<(), AdminStoreError> {
        (**self).record_activity(activity).await
    }

    async fn list_activity(&self) -> Result<Vec<AdminActivity>, AdminStoreError> {
        (**self).list_activity().await
    }
}

#[async_trait]
impl<T> ExportJobRepository for Arc<T>
where
    T: ExportJobRepository + ?Sized,
{
    async fn insert_job(&self, job: &ExportJob) -> Result<(), ExportStoreError> {
        (**self).insert_job(job).await
    }

    async fn find_job(
        &self,
        admin: &AdminId,
        job: &ExportJobId,
    ) -> Result<Option<ExportJob>, ExportStoreError> {
        (**self).find_job(admin, job).await
    }

    async fn update_job(&self, job: &ExportJob) -> Result<bool, ExportStoreError> {
        (**self).update_job(job).await
    }

    async fn insert_file(&self, file: &SystemFile) -> Result<(), ExportStoreError> {
        (**self).insert_file(file).await
    }
}

/// New account details accepted by [`Accounts::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: UserName,
    pub email: EmailAddress,
    pub password: PasswordDigest,
}

/// Driving port for account registration and authentication.
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Register a new account.
    async fn register(&self, account: NewAccount) -> Result<User, DomainError>;

    /// Check credentials, returning the account's identifier on success.
    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<UserId, DomainError>;
}

/// Driving port for the owner-scoped inventory.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// All rooms the requester owns, with their things.
    async fn list_rooms(&self, requester: &UserId) -> Result<Vec<RoomWithThings>, DomainError>;

    /// Create a room owned by the requester.
    async fn create_room(&self, requester: &UserId, name: RoomName) -> Result<Room, DomainError>;

    /// One owned room with its things.
    async fn get_room(
        &self,
        requester: &UserId,
        room: &RoomId,
    ) -> Result<RoomWithThings, DomainError>;

    /// Rename an owned room.
    async fn rename_room(
        &self,
        requester: &UserId,
        room: &RoomId,
        name: RoomName,
    ) -> Result<Room, DomainError>;

    /// Delete an owned room and everything in it.
    async fn delete_room(&self, requester: &UserId, room: &RoomId) -> Result<(), DomainError>;

    /// All things across the requester's rooms.
    async fn list_things(&self, requester: &UserId) -> Result<Vec<ThingWithRoom>, DomainError>;

    /// Create a thing in an owned room.
    async fn create_thing(
        &self,
        requester: &UserId,
        room: &RoomId,
        name: ThingName,
        quantity: Quantity,
    ) -> Result<ThingWithRoom, DomainError>;

    /// Update an owned thing's name and quantity.
    async fn update_thing(
        &self,
        requester: &UserId,
        thing: &ThingId,
        name: ThingName,
        quantity: Quantity,
    ) -> Result<ThingWithRoom, DomainError>;

    /// Delete an owned thing.
    async fn delete_thing(&self, requester: &UserId, thing: &ThingId) -> Result<(), DomainError>;
}

/// Driving port producing the CSV rendition of a user's things.
#[async_trait]
pub trait ThingExport: Send + Sync {
    /// Render every thing the requester owns as CSV bytes with the header
    /// row `Name,Room,Quantity`.
    async fn export_csv(&self, requester: &UserId) -> Result<Vec<u8>, DomainError>;
}

/// Driving port for capability-gated administrative operations.
///
/// Every method authenticates the requester as an administrator and
/// checks the relevant capability before doing anything else.
#[async_trait]
pub trait AdminOps: Send + Sync {
    /// The activity log, newest first. Requires
    /// [`Capability::ViewActivity`](super::admin::Capability::ViewActivity).
    async fn list_activity(&self, requester: &UserId) -> Result<Vec<AdminActivity>, DomainError>;

    /// Create a pending export job. Requires
    /// [`Capability::RunExports`](super::admin::Capability::RunExports).
    async fn create_export_job(
        &self,
        requester: &UserId,
        export_type: super::export::ExportType,
    ) -> Result<ExportJob, DomainError>;

    /// Run a pending job to completion. Requires
    /// [`Capability::RunExports`](super::admin::Capability::RunExports).
    async fn run_export_job(
        &self,
        requester: &UserId,
        job: &ExportJobId,
    ) -> Result<ExportJob, DomainError>;

    /// Delete a user account and everything it owns. Requires
    /// [`Capability::ManageUsers`](super::admin::Capability::ManageUsers).
    async fn delete_user(&self, requester: &UserId, user: &UserId) -> Result<(), DomainError>;
}
