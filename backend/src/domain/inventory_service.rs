//! Owner-scoped inventory operations.
//!
//! Every operation takes the requesting owner and delegates scoping to the
//! repository; a row that is absent and a row owned by someone else both
//! come back as the same not-found error, with the same message, so the
//! response never leaks whether a foreign resource exists.

use async_trait::async_trait;
use tracing::info;

use super::error::Error as DomainError;
use super::inventory::{
    Quantity, Room, RoomId, RoomName, RoomWithThings, Thing, ThingId, ThingName, ThingWithRoom,
};
use super::ports::{Inventory, InventoryRepository, InventoryStoreError};
use super::user::UserId;

/// Not-found message for rooms, shared by every room operation.
pub const ROOM_NOT_FOUND: &str = "room not found";
/// Not-found message for things, shared by every thing operation.
pub const THING_NOT_FOUND: &str = "thing not found";

/// [`Inventory`] implementation backed by an [`InventoryRepository`].
#[derive(Debug)]
pub struct InventoryService<R> {
    repository: R,
}

impl<R> InventoryService<R> {
    /// Construct the service around an inventory repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

fn map_store_error(err: InventoryStoreError) -> DomainError {
    match err {
        InventoryStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("inventory store unavailable: {message}"))
        }
        InventoryStoreError::Query { message } => {
            DomainError::internal(format!("inventory store query failed: {message}"))
        }
    }
}

#[async_trait]
impl<R> Inventory for InventoryService<R>
where
    R: InventoryRepository,
{
    async fn list_rooms(&self, requester: &UserId) -> Result<Vec<RoomWithThings>, DomainError> {
        self.repository
            .list_rooms(requester)
            .await
            .map_err(map_store_error)
    }

    async fn create_room(&self, requester: &UserId, name: RoomName) -> Result<Room, DomainError> {
        let room = Room::create(*requester, name);
        self.repository
            .insert_room(&room)
            .await
            .map_err(map_store_error)?;
        info!(room_id = %room.id(), "created room");
        Ok(room)
    }

    async fn get_room(
        &self,
        requester: &UserId,
        room: &RoomId,
    ) -> Result<RoomWithThings, DomainError> {
        self.repository
            .find_room(requester, room)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::not_found(ROOM_NOT_FOUND))
    }

    async fn rename_room(
        &self,
        requester: &UserId,
        room: &RoomId,
        name: RoomName,
    ) -> Result<Room, DomainError> {
        self.repository
            .rename_room(requester, room, &name)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::not_found(ROOM_NOT_FOUND))
    }

    async fn delete_room(&self, requester: &UserId, room: &RoomId) -> Result<(), DomainError> {
        let removed = self
            .repository
            .delete_room(requester, room)
            .await
            .map_err(map_store_error)?;
        if !removed {
            return Err(DomainError::not_found(ROOM_NOT_FOUND));
        }
        info!(room_id = %room, "deleted room");
        Ok(())
    }

    async fn list_things(&self, requester: &UserId) -> Result<Vec<ThingWithRoom>, DomainError> {
        self.repository
            .list_things(requester)
            .await
            .map_err(map_store_error)
    }

    async fn create_thing(
        &self,
        requester: &UserId,
        room: &RoomId,
        name: ThingName,
        quantity: Quantity,
    ) -> Result<ThingWithRoom, DomainError> {
        let thing = Thing::create(*room, name, quantity);
        self.repository
            .insert_thing(requester, &thing)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::not_found(ROOM_NOT_FOUND))
    }

    async fn update_thing(
        &self,
        requester: &UserId,
        thing: &ThingId,
        name: ThingName,
        quantity: Quantity,
    ) -> Result<ThingWithRoom, DomainError> {
        self.repository
            .update_thing(requester, thing, &name, quantity)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::not_found(THING_NOT_FOUND))
    }

    async fn delete_thing(&self, requester: &UserId, thing: &ThingId) -> Result<(), DomainError> {
        let removed = self
            .repository
            .delete_thing(requester, thing)
            .await
            .map_err(map_store_error)?;
        if !removed {
            return Err(DomainError::not_found(THING_NOT_FOUND));
        }
        Ok(())
    }
}
