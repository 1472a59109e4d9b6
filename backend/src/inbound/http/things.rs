//! Thing API handlers.
//!
//! ```text
//! GET    /api/v1/things
//! POST   /api/v1/things {"roomId":"...","name":"Flour","quantity":2}
//! PUT    /api/v1/things/{id} {"name":"Flour","quantity":3}
//! DELETE /api/v1/things/{id}
//! ```
//!
//! A thing is reachable only through a room the caller owns; anything else
//! is a 404, whether or not the row exists.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{RoomId, ThingId, ThingWithRoom};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_quantity, parse_thing_name, parse_uuid,
};

const ROOM_ID_FIELD: FieldName = FieldName::new("roomId");
const NAME_FIELD: FieldName = FieldName::new("name");
const QUANTITY_FIELD: FieldName = FieldName::new("quantity");
const ID_FIELD: FieldName = FieldName::new("id");

/// Request body for `POST /api/v1/things`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThingRequest {
    pub room_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// Request body for `PUT /api/v1/things/{id}`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThingRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// A thing with its containing room.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThingResponse {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub room_id: String,
    pub room_name: String,
}

impl From<&ThingWithRoom> for ThingResponse {
    fn from(entry: &ThingWithRoom) -> Self {
        Self {
            id: entry.thing.id().to_string(),
            name: entry.thing.name().to_string(),
            quantity: entry.thing.quantity().value(),
            room_id: entry.thing.room_id().to_string(),
            room_name: entry.room_name.to_string(),
        }
    }
}

fn thing_id_from_path(raw: &str) -> ApiResult<ThingId> {
    Ok(ThingId::from_uuid(parse_uuid(raw, ID_FIELD)?))
}

/// List every thing across the caller's rooms.
#[get("/things")]
pub async fn list_things(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ThingResponse>>> {
    let requester = session.require_user_id()?;
    let things = state.inventory.list_things(&requester).await?;
    Ok(web::Json(things.iter().map(ThingResponse::from).collect()))
}

/// Create a thing in one of the caller's rooms.
#[post("/things")]
pub async fn create_thing(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<CreateThingRequest>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let CreateThingRequest {
        room_id,
        name,
        quantity,
    } = payload.into_inner();
    let room_id = RoomId::from_uuid(parse_uuid(&room_id, ROOM_ID_FIELD)?);
    let name = parse_thing_name(name, NAME_FIELD)?;
    let quantity = parse_quantity(quantity, QUANTITY_FIELD)?;
    let created = state
        .inventory
        .create_thing(&requester, &room_id, name, quantity)
        .await?;
    Ok(HttpResponse::Created().json(ThingResponse::from(&created)))
}

/// Update an owned thing's name and quantity.
#[put("/things/{id}")]
pub async fn update_thing(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateThingRequest>,
) -> ApiResult<web::Json<ThingResponse>> {
    let requester = session.require_user_id()?;
    let thing_id = thing_id_from_path(&path.into_inner())?;
    let UpdateThingRequest { name, quantity } = payload.into_inner();
    let name = parse_thing_name(name, NAME_FIELD)?;
    let quantity = parse_quantity(quantity, QUANTITY_FIELD)?;
    let updated = state
        .inventory
        .update_thing(&requester, &thing_id, name, quantity)
        .await?;
    Ok(web::Json(ThingResponse::from(&updated)))
}

/// Delete an owned thing.
#[delete("/things/{id}")]
pub async fn delete_thing(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user_id()?;
    let thing_id = thing_id_from_path(&path.into_inner())?;
    state.inventory.delete_thing(&requester, &thing_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryStore, login_as, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn quantity_defaults_to_one_when_omitted() {
        let store = MemoryStore::shared();
        let owner = store.seed_user("Ada", "ada@example.com", "hunter2");
        let room = store.seed_room(&owner, "Pantry");
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "ada@example.com", "hunter2").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/things")
                .cookie(cookie)
                .set_json(&CreateThingRequest {
                    room_id: room.id().to_string(),
                    name: "Flour".into(),
                    quantity: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: ThingResponse = actix_test::read_body_json(response).await;
        assert_eq!(body.quantity, 1);
        assert_eq!(body.room_name, "Pantry");
    }

    #[rstest]
    #[actix_web::test]
    async fn negative_quantity_is_rejected() {
        let store = MemoryStore::shared();
        let owner = store.seed_user("Ada", "ada@example.com", "hunter2");
        let room = store.seed_room(&owner, "Pantry");
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "ada@example.com", "hunter2").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/things")
                .cookie(cookie)
                .set_json(&CreateThingRequest {
                    room_id: room.id().to_string(),
                    name: "Flour".into(),
                    quantity: Some(-1),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            value.pointer("/details/field").and_then(Value::as_str),
            Some("quantity")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn creating_in_a_foreign_room_is_not_found() {
        let store = MemoryStore::shared();
        let owner = store.seed_user("Ada", "ada@example.com", "hunter2");
        store.seed_user("Eve", "eve@example.com", "hunter2");
        let room = store.seed_room(&owner, "Pantry");
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "eve@example.com", "hunter2").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/things")
                .cookie(cookie)
                .set_json(&CreateThingRequest {
                    room_id: room.id().to_string(),
                    name: "Flour".into(),
                    quantity: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn updates_change_name_and_quantity() {
        let store = MemoryStore::shared();
        let owner = store.seed_user("Ada", "ada@example.com", "hunter2");
        let room = store.seed_room(&owner, "Pantry");
        let thing = store.seed_thing(&room, "Flour", 2);
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "ada@example.com", "hunter2").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/things/{}", thing.id()))
                .cookie(cookie)
                .set_json(&UpdateThingRequest {
                    name: "Wholemeal flour".into(),
                    quantity: Some(5),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: ThingResponse = actix_test::read_body_json(response).await;
        assert_eq!(body.name, "Wholemeal flour");
        assert_eq!(body.quantity, 5);
    }

    #[rstest]
    #[actix_web::test]
    async fn deleting_a_foreign_thing_is_not_found() {
        let store = MemoryStore::shared();
        let owner = store.seed_user("Ada", "ada@example.com", "hunter2");
        store.seed_user("Eve", "eve@example.com", "hunter2");
        let room = store.seed_room(&owner, "Pantry");
        let thing = store.seed_thing(&room, "Flour", 2);
        let app = actix_test::init_service(test_app(&store)).await;
        let cookie = login_as(&app, "eve@example.com", "hunter2").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/things/{}", thing.id()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
