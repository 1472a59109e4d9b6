//! Room API handlers.
//!
//! ```text
//! GET    /api/v1/rooms
//! POST   /api/v1/rooms {"name":"Pantry"}
//! GET    /api/v1/rooms/{id}
//! PUT    /api/v1/rooms/{id} {"name":"Cellar"}
//! DELETE /api/v1/rooms/{id}
//! ```
//!
//! Every handler requires a session and sees only the caller's own rooms;
//! another user's room id draws the same 404 as one that never existed.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Room, RoomId, RoomWithThings, Thing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_room_name, parse_uuid};

const NAME_FIELD: FieldName = FieldName::new("name");
const ID_FIELD: FieldName = FieldName::new("id");

/// Request body for creating or renaming a room.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub name: String,
}

/// A thing as it appears nested in a room.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedThingResponse {
    pub id: String,
    pub name: String,
    pub quantity: u32,
}

/// A room with its things.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub things: Vec<NestedThingResponse>,
}

impl From<&Thing> for NestedThingResponse {
    fn from(thing: &Thing) -> Self {
        Self {
            id: thing.id().to_string(),
            name: thing.name().to_string(),
            quantity: thing.quantity().value(),
        }
    }
}

impl From<&RoomWithThings> for RoomResponse {
    fn from(entry: &RoomWithThings) -> Self {
        Self {
            id: entry.room.id().to_string(),
            name: entry.room.name().to_string(),
            things: entry.things.iter().map(NestedThingResponse::from).collect(),
        }
    }
}

fn bare_room_response(room: &Room) -> RoomResponse {
    RoomResponse {
        id: room.id().to_string(),
        name: room.name().to_string(),
        things: Vec::new(),
    }
}

fn room_id_from_path(raw: &str) -> ApiResult<RoomId> {
    Ok(RoomId::from_uuid(parse_uuid(raw, ID_FIELD)?))
}

/// List the caller's rooms with their things.
#[get("/rooms")]
pub async fn list_rooms(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RoomResponse>>> {
    let requester = session.require_user_id()?;
    let rooms = state.inventory.list_rooms(&requester).await?;
    Ok(web::Json(rooms.iter().map(RoomResponse::from).collect()))
}

/// Create a room owned by the caller.
#[post("/rooms")]
pub async fn create_room(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<RoomRequest>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let name = parse_room_name(payload.into_inner().name, NAME_FIELD)?;
    let room = state.inventory.create_room(&requester, name).await?;
    Ok(HttpResponse::Created().json(bare_room_response(&room)))
}

/// Fetch one owned room with its things.
#[get("/rooms/{id}")]
pub async fn get_room(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoomResponse>> {
    let requester = session.require_user_id()?;
    let room_id = room_id_from_path(&path.into_inner())?;
    let room = state.inventory.get_room(&requester, &room_id).await?;
    Ok(web::Json(RoomResponse::from(&room)))
}

/// Rename an owned room.
#[put("/rooms/{id}")]
pub async fn rename_room(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RoomRequest>,
) -> ApiResult<web::Json<RoomResponse>> {
    let requester = session.require_user_id()?;
    let room_id = room_id_from_path(&path.into_inner())?;
    let name = parse_room_name(payload.into_inner().name, NAME_FIELD)?;
    let room = state
        .inventory
        .rename_room(&requester, &room_id, name)
        .await?;
    Ok(web::Json(bare_room_response(&room)))
}

/// Delete an owned room and everything in it.
#[delete("/rooms/{id}")]
pub async fn delete_room(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let room_id = room_id_from_path(&path.into_inner())?;
    state.inventory.delete_room(&requester, &room_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
