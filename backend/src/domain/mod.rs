//! Core domain model and services, free of transport and persistence
//! concerns.

mod account_service;
mod admin;
mod admin_service;
mod error;
mod export;
mod export_service;
mod inventory;
mod inventory_service;
mod ports;
mod user;

pub use account_service::AccountService;
pub use admin::{
    ACTION_MAX, ActionLabel, AdminActivity, AdminId, AdminUser, AdminValidationError, Capability,
    CapabilitySet,
};
pub use admin_service::AdminService;
pub use error::{Error, ErrorCode, ErrorValidationError};
pub use export::{
    EXPORT_TYPE_MAX, ExportJob, ExportJobId, ExportJobStatus, ExportJobTransitionError,
    ExportType, ExportValidationError, FILE_DESCRIPTION_MAX, FILE_TYPE_MAX, SystemFile,
    SystemFileId,
};
pub use export_service::{CSV_HEADER, CsvExportService};
pub use inventory::{
    InventoryValidationError, Quantity, ROOM_NAME_MAX, Room, RoomId, RoomName, RoomWithThings,
    THING_NAME_MAX, Thing, ThingId, ThingName, ThingWithRoom,
};
pub use inventory_service::{InventoryService, ROOM_NOT_FOUND, THING_NOT_FOUND};
pub use ports::{
    Accounts, AdminOps, AdminRepository, AdminStoreError, ExportJobRepository, ExportStoreError,
    Inventory, InventoryRepository, InventoryStoreError, NewAccount, ThingExport, UserRepository,
    UserStoreError,
};
pub use user::{
    EMAIL_MAX, EmailAddress, PasswordDigest, USER_NAME_MAX, User, UserId, UserName,
    UserValidationError,
};
