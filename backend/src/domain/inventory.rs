//! Ownership tree model: rooms owned by a user, things contained in a room.
//!
//! A thing's effective owner is the owner of its room; nothing in this module
//! lets a thing exist outside a room, and a room's owner is fixed at
//! creation.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::user::UserId;

/// Maximum length for a room name.
pub const ROOM_NAME_MAX: usize = 50;
/// Maximum length for a thing name.
pub const THING_NAME_MAX: usize = 100;

/// Validation errors for inventory fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryValidationError {
    EmptyRoomName,
    RoomNameTooLong { max: usize },
    EmptyThingName,
    ThingNameTooLong { max: usize },
    NegativeQuantity,
}

impl fmt::Display for InventoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRoomName => write!(f, "room name must not be empty"),
            Self::RoomNameTooLong { max } => {
                write!(f, "room name must be at most {max} characters")
            }
            Self::EmptyThingName => write!(f, "thing name must not be empty"),
            Self::ThingNameTooLong { max } => {
                write!(f, "thing name must be at most {max} characters")
            }
            Self::NegativeQuantity => write!(f, "quantity must not be negative"),
        }
    }
}

impl std::error::Error for InventoryValidationError {}

/// Stable room identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RoomId(Uuid);

impl RoomId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable thing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ThingId(Uuid);

impl ThingId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated room name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    /// Validate and construct a [`RoomName`].
    pub fn new(name: impl Into<String>) -> Result<Self, InventoryValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryValidationError::EmptyRoomName);
        }
        if name.chars().count() > ROOM_NAME_MAX {
            return Err(InventoryValidationError::RoomNameTooLong { max: ROOM_NAME_MAX });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for RoomName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RoomName> for String {
    fn from(value: RoomName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = InventoryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated thing name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThingName(String);

impl ThingName {
    /// Validate and construct a [`ThingName`].
    pub fn new(name: impl Into<String>) -> Result<Self, InventoryValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryValidationError::EmptyThingName);
        }
        if name.chars().count() > THING_NAME_MAX {
            return Err(InventoryValidationError::ThingNameTooLong {
                max: THING_NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for ThingName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ThingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ThingName> for String {
    fn from(value: ThingName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ThingName {
    type Error = InventoryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Non-negative item count. Defaults to one.
///
/// Negative counts are unrepresentable; [`Quantity::try_from`] is the only
/// way in from signed input and it rejects anything below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Construct from an unsigned count.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// The underlying count.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = InventoryValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| InventoryValidationError::NegativeQuantity)
    }
}

/// Room owned by exactly one user. The owner never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    owner: UserId,
    name: RoomName,
    created_at: DateTime<Utc>,
}

impl Room {
    /// Rehydrate a room from validated components.
    pub fn new(id: RoomId, owner: UserId, name: RoomName, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            name,
            created_at,
        }
    }

    /// Build a brand-new room for the given owner.
    pub fn create(owner: UserId, name: RoomName) -> Self {
        Self::new(RoomId::random(), owner, name, Utc::now())
    }

    /// Stable room identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// The owning user.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Room name.
    pub fn name(&self) -> &RoomName {
        &self.name
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Thing contained in exactly one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thing {
    id: ThingId,
    room_id: RoomId,
    name: ThingName,
    quantity: Quantity,
}

impl Thing {
    /// Rehydrate a thing from validated components.
    pub fn new(id: ThingId, room_id: RoomId, name: ThingName, quantity: Quantity) -> Self {
        Self {
            id,
            room_id,
            name,
            quantity,
        }
    }

    /// Build a brand-new thing inside the given room.
    pub fn create(room_id: RoomId, name: ThingName, quantity: Quantity) -> Self {
        Self::new(ThingId::random(), room_id, name, quantity)
    }

    /// Stable thing identifier.
    pub fn id(&self) -> &ThingId {
        &self.id
    }

    /// The containing room.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Thing name.
    pub fn name(&self) -> &ThingName {
        &self.name
    }

    /// Item count.
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }
}

/// A room together with its things, as returned by scoped listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomWithThings {
    pub room: Room,
    pub things: Vec<Thing>,
}

/// A thing paired with the name of its room, for listings and export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThingWithRoom {
    pub thing: Thing,
    pub room_name: RoomName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn quantity_defaults_to_one() {
        assert_eq!(Quantity::default().value(), 1);
    }

    #[rstest]
    #[case(0, Ok(0))]
    #[case(7, Ok(7))]
    #[case(-1, Err(InventoryValidationError::NegativeQuantity))]
    #[case(i64::MIN, Err(InventoryValidationError::NegativeQuantity))]
    fn quantity_rejects_negative_input(
        #[case] raw: i64,
        #[case] expected: Result<u32, InventoryValidationError>,
    ) {
        assert_eq!(Quantity::try_from(raw).map(|q| q.value()), expected);
    }

    #[rstest]
    #[case("", InventoryValidationError::EmptyRoomName)]
    #[case("  ", InventoryValidationError::EmptyRoomName)]
    fn blank_room_names_are_rejected(#[case] raw: &str, #[case] expected: InventoryValidationError) {
        assert_eq!(RoomName::new(raw), Err(expected));
    }

    #[rstest]
    fn overlong_names_are_rejected() {
        let room = "r".repeat(ROOM_NAME_MAX + 1);
        let thing = "t".repeat(THING_NAME_MAX + 1);
        assert_eq!(
            RoomName::new(room),
            Err(InventoryValidationError::RoomNameTooLong { max: ROOM_NAME_MAX })
        );
        assert_eq!(
            ThingName::new(thing),
            Err(InventoryValidationError::ThingNameTooLong {
                max: THING_NAME_MAX
            })
        );
    }

    #[rstest]
    fn created_room_belongs_to_its_owner() {
        let owner = UserId::random();
        let room = Room::create(owner, RoomName::new("Kitchen").expect("valid name"));
        assert_eq!(room.owner(), &owner);
    }
}
