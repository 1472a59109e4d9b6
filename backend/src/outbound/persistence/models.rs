//! Row and changeset structs bridging Diesel and the domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    admin_activities, admin_users, export_jobs, rooms, system_files, things, users,
};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password_digest: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) password_digest: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoomRow {
    pub(crate) id: Uuid,
    pub(crate) owner_id: Uuid,
    pub(crate) name: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = rooms)]
pub(crate) struct NewRoomRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) owner_id: Uuid,
    pub(crate) name: &'a str,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = things)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ThingRow {
    pub(crate) id: Uuid,
    pub(crate) room_id: Uuid,
    pub(crate) name: String,
    pub(crate) quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = things)]
pub(crate) struct NewThingRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) room_id: Uuid,
    pub(crate) name: &'a str,
    pub(crate) quantity: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = things)]
pub(crate) struct ThingChangeset<'a> {
    pub(crate) name: &'a str,
    pub(crate) quantity: i32,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = admin_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminUserRow {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) role: String,
    pub(crate) capabilities: serde_json::Value,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = admin_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminActivityRow {
    pub(crate) id: Uuid,
    pub(crate) admin_id: Uuid,
    pub(crate) action: String,
    pub(crate) details: serde_json::Value,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin_activities)]
pub(crate) struct NewAdminActivityRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) admin_id: Uuid,
    pub(crate) action: &'a str,
    pub(crate) details: &'a serde_json::Value,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = system_files)]
pub(crate) struct NewSystemFileRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) admin_id: Uuid,
    pub(crate) file_type: &'a str,
    pub(crate) description: &'a str,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = export_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExportJobRow {
    pub(crate) id: Uuid,
    pub(crate) admin_id: Uuid,
    pub(crate) export_type: String,
    pub(crate) status: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) file_id: Option<Uuid>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = export_jobs)]
pub(crate) struct NewExportJobRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) admin_id: Uuid,
    pub(crate) export_type: &'a str,
    pub(crate) status: &'a str,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = export_jobs)]
pub(crate) struct ExportJobChangeset<'a> {
    pub(crate) status: &'a str,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) file_id: Option<Uuid>,
}
