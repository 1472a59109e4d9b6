//! PostgreSQL-backed `InventoryRepository` implementation using Diesel ORM.
//!
//! Owner scoping happens inside each statement: reads filter on the owner
//! column, mutations constrain the target row to the owner's subtree, so a
//! stale authorisation check cannot slip between lookup and write.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::{
    InventoryRepository, InventoryStoreError, Quantity, Room, RoomId, RoomName, RoomWithThings,
    Thing, ThingId, ThingName, ThingWithRoom, UserId,
};

use super::error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewRoomRow, NewThingRow, RoomRow, ThingChangeset, ThingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{rooms, things};

/// Diesel-backed implementation of the inventory repository port.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InventoryStoreError {
    map_basic_pool_error(error, |message| InventoryStoreError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> InventoryStoreError {
    map_basic_diesel_error(
        error,
        InventoryStoreError::query,
        InventoryStoreError::connection,
    )
}

fn invalid_row(err: impl std::fmt::Display) -> InventoryStoreError {
    InventoryStoreError::query(err.to_string())
}

/// Convert a database row into a validated domain room.
fn row_to_room(row: RoomRow) -> Result<Room, InventoryStoreError> {
    let RoomRow {
        id,
        owner_id,
        name,
        created_at,
    } = row;
    let name = RoomName::new(name).map_err(invalid_row)?;
    Ok(Room::new(
        RoomId::from_uuid(id),
        UserId::from_uuid(owner_id),
        name,
        created_at,
    ))
}

/// Convert a database row into a validated domain thing.
fn row_to_thing(row: ThingRow) -> Result<Thing, InventoryStoreError> {
    let ThingRow {
        id,
        room_id,
        name,
        quantity,
    } = row;
    let name = ThingName::new(name).map_err(invalid_row)?;
    let quantity = Quantity::try_from(i64::from(quantity)).map_err(invalid_row)?;
    Ok(Thing::new(
        ThingId::from_uuid(id),
        RoomId::from_uuid(room_id),
        name,
        quantity,
    ))
}

/// Group ordered left-join rows into rooms with their things.
///
/// Rows must arrive sorted so each room's rows are contiguous; a room
/// without things contributes a single row with no thing attached.
fn group_rooms(
    rows: Vec<(RoomRow, Option<ThingRow>)>,
) -> Result<Vec<RoomWithThings>, InventoryStoreError> {
    let mut entries: Vec<RoomWithThings> = Vec::new();
    for (room_row, thing_row) in rows {
        let starts_new_room = entries
            .last()
            .map_or(true, |entry| entry.room.id().as_uuid() != &room_row.id);
        if starts_new_room {
            entries.push(RoomWithThings {
                room: row_to_room(room_row)?,
                things: Vec::new(),
            });
        }
        if let (Some(entry), Some(row)) = (entries.last_mut(), thing_row) {
            entry.things.push(row_to_thing(row)?);
        }
    }
    Ok(entries)
}

#[async_trait]
impl InventoryRepository for DieselInventoryRepository {
    async fn list_rooms(&self, owner: &UserId) -> Result<Vec<RoomWithThings>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // One statement, one snapshot: a cascade delete committing mid-read
        // can never yield a room whose things have already vanished.
        let rows: Vec<(RoomRow, Option<ThingRow>)> = rooms::table
            .left_join(things::table)
            .filter(rooms::owner_id.eq(owner.as_uuid()))
            .order((
                rooms::created_at.asc(),
                rooms::id.asc(),
                things::id.nullable().asc(),
            ))
            .select((RoomRow::as_select(), Option::<ThingRow>::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        group_rooms(rows)
    }

    async fn find_room(
        &self,
        owner: &UserId,
        room: &RoomId,
    ) -> Result<Option<RoomWithThings>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(RoomRow, Option<ThingRow>)> = rooms::table
            .left_join(things::table)
            .filter(rooms::id.eq(room.as_uuid()))
            .filter(rooms::owner_id.eq(owner.as_uuid()))
            .order(things::id.nullable().asc())
            .select((RoomRow::as_select(), Option::<ThingRow>::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(group_rooms(rows)?.into_iter().next())
    }

    async fn insert_room(&self, room: &Room) -> Result<(), InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRoomRow {
            id: *room.id().as_uuid(),
            owner_id: *room.owner().as_uuid(),
            name: room.name().as_ref(),
            created_at: room.created_at(),
        };

        diesel::insert_into(rooms::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn rename_room(
        &self,
        owner: &UserId,
        room: &RoomId,
        name: &RoomName,
    ) -> Result<Option<Room>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            rooms::table
                .find(room.as_uuid())
                .filter(rooms::owner_id.eq(owner.as_uuid())),
        )
        .set(rooms::name.eq(name.as_ref()))
        .returning(RoomRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        updated.map(row_to_room).transpose()
    }

    async fn delete_room(
        &self,
        owner: &UserId,
        room: &RoomId,
    ) -> Result<bool, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Things go with the room via ON DELETE CASCADE.
        let removed = diesel::delete(
            rooms::table
                .find(room.as_uuid())
                .filter(rooms::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_things(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ThingWithRoom>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ThingRow, String)> = things::table
            .inner_join(rooms::table)
            .filter(rooms::owner_id.eq(owner.as_uuid()))
            .order(things::id.asc())
            .select((ThingRow::as_select(), rooms::name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(row, room_name)| {
                Ok(ThingWithRoom {
                    thing: row_to_thing(row)?,
                    room_name: RoomName::new(room_name).map_err(invalid_row)?,
                })
            })
            .collect()
    }

    async fn insert_thing(
        &self,
        owner: &UserId,
        thing: &Thing,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let Some(room_name) = rooms::table
            .find(thing.room_id().as_uuid())
            .filter(rooms::owner_id.eq(owner.as_uuid()))
            .select(rooms::name)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let quantity = i32::try_from(thing.quantity().value())
            .map_err(|_| InventoryStoreError::query("quantity exceeds column range"))?;
        let row = NewThingRow {
            id: *thing.id().as_uuid(),
            room_id: *thing.room_id().as_uuid(),
            name: thing.name().as_ref(),
            quantity,
        };

        // The room may vanish between the ownership check and the insert;
        // the foreign key reports that as an absent target, not a failure.
        match diesel::insert_into(things::table)
            .values(&row)
            .execute(&mut conn)
            .await
        {
            Ok(_) => Ok(Some(ThingWithRoom {
                thing: thing.clone(),
                room_name: RoomName::new(room_name).map_err(invalid_row)?,
            })),
            Err(err) if is_foreign_key_violation(&err) => Ok(None),
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn update_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
        name: &ThingName,
        quantity: Quantity,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let quantity = i32::try_from(quantity.value())
            .map_err(|_| InventoryStoreError::query("quantity exceeds column range"))?;
        let changes = ThingChangeset {
            name: name.as_ref(),
            quantity,
        };

        let owned_rooms = rooms::table
            .filter(rooms::owner_id.eq(owner.as_uuid()))
            .select(rooms::id);
        let Some(row) = diesel::update(
            things::table
                .find(thing.as_uuid())
                .filter(things::room_id.eq_any(owned_rooms)),
        )
        .set(&changes)
        .returning(ThingRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let room_name: String = rooms::table
            .find(row.room_id)
            .select(rooms::name)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Some(ThingWithRoom {
            thing: row_to_thing(row)?,
            room_name: RoomName::new(room_name).map_err(invalid_row)?,
        }))
    }

    async fn delete_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
    ) -> Result<bool, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owned_rooms = rooms::table
            .filter(rooms::owner_id.eq(owner.as_uuid()))
            .select(rooms::id);
        let removed = diesel::delete(
            things::table
                .find(thing.as_uuid())
                .filter(things::room_id.eq_any(owned_rooms)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
