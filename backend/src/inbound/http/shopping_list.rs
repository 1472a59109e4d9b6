//! Shopping list API handlers.
//!
//! ```text
//! GET  /api/v1/shopping-list
//! POST /api/v1/shopping-list {"room":"...","name":"Milk","quantity":2}
//! ```
//!
//! The legacy shopping-list form reported a bad room as a validation
//! failure rather than a missing resource, and clients depend on that:
//! the POST handler remaps the domain's not-found to a 400 here.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, ErrorCode, RoomId, ThingWithRoom};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_quantity, parse_thing_name, parse_uuid,
};

const ROOM_FIELD: FieldName = FieldName::new("room");
const NAME_FIELD: FieldName = FieldName::new("name");
const QUANTITY_FIELD: FieldName = FieldName::new("quantity");

const INVALID_ROOM: &str = "invalid room";

/// Request body for `POST /api/v1/shopping-list`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItemRequest {
    pub room: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// A shopping list entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItemResponse {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub room: String,
}

impl From<&ThingWithRoom> for ShoppingListItemResponse {
    fn from(entry: &ThingWithRoom) -> Self {
        Self {
            id: entry.thing.id().to_string(),
            name: entry.thing.name().to_string(),
            quantity: entry.thing.quantity().value(),
            room: entry.room_name.to_string(),
        }
    }
}

/// List the caller's shopping list, one entry per thing.
#[get("/shopping-list")]
pub async fn shopping_list(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ShoppingListItemResponse>>> {
    let requester = session.require_user_id()?;
    let things = state.inventory.list_things(&requester).await?;
    Ok(web::Json(
        things.iter().map(ShoppingListItemResponse::from).collect(),
    ))
}

/// Add an item to the shopping list.
#[post("/shopping-list")]
pub async fn add_shopping_list_item(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<ShoppingListItemRequest>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let ShoppingListItemRequest {
        room,
        name,
        quantity,
    } = payload.into_inner();
    let room_id = RoomId::from_uuid(parse_uuid(&room, ROOM_FIELD)?);
    let name = parse_thing_name(name, NAME_FIELD)?;
    let quantity = parse_quantity(quantity, QUANTITY_FIELD)?;

    let created = state
        .inventory
        .create_thing(&requester, &room_id, name, quantity)
        .await
        .map_err(|err| {
            if err.code() == ErrorCode::NotFound {
                Error::invalid_request(INVALID_ROOM)
            } else {
                err
            }
        })?;
    Ok(HttpResponse::Created().json(ShoppingListItemResponse::from(&created)))
}
