//! CSV rendition of a user's things.

use async_trait::async_trait;

use super::error::Error as DomainError;
use super::ports::{InventoryRepository, InventoryStoreError, ThingExport};
use super::user::UserId;

/// Header row of every export, in this exact order.
pub const CSV_HEADER: [&str; 3] = ["Name", "Room", "Quantity"];

/// [`ThingExport`] implementation rendering via the `csv` crate.
///
/// Rows are ordered as the repository returns them; quoting and escaping
/// are left entirely to the writer.
#[derive(Debug)]
pub struct CsvExportService<R> {
    repository: R,
}

impl<R> CsvExportService<R> {
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

fn map_csv_error(err: csv::Error) -> DomainError {
    DomainError::internal(format!("csv rendering failed: {err}"))
}

#[async_trait]
impl<R> ThingExport for CsvExportService<R>
where
    R: InventoryRepository,
{
    async fn export_csv(&self, requester: &UserId) -> Result<Vec<u8>, DomainError> {
        let things = self
            .repository
            .list_things(requester)
            .await
            .map_err(map_store_error)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER).map_err(map_csv_error)?;
        for entry in &things {
            writer
                .write_record([
                    entry.thing.name().as_ref(),
                    entry.room_name.as_ref(),
                    entry.thing.quantity().to_string().as_str(),
                ])
                .map_err(map_csv_error)?;
        }
        writer
            .into_inner()
            .map_err(|err| DomainError::internal(format!("csv rendering failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::{
        Quantity, Room, RoomId, RoomName, RoomWithThings, Thing, ThingId, ThingName, ThingWithRoom,
    };
    use crate::domain::ports::InventoryRepository;
    use async_trait::async_trait;
    use rstest::rstest;

    struct FixedThings(Vec<ThingWithRoom>);

    #[async_trait]
    impl InventoryRepository for FixedThings {
        async fn list_rooms(
            &self,
            _owner: &UserId,
        ) -> Result<Vec<RoomWithThings>, InventoryStoreError> {
            Ok(Vec::new())
        }

        async fn find_room(
            &self,
            _owner: &UserId,
            _room: &RoomId,
        ) -> Result<Option<RoomWithThings>, InventoryStoreError> {
            Ok(None)
        }

        async fn insert_room(&self, _room: &Room) -> Result<(), InventoryStoreError> {
            Ok(())
        }

        async fn rename_room(
            &self,
            _owner: &UserId,
            _room: &RoomId,
            _name: &RoomName,
        ) -> Result<Option<Room>, InventoryStoreError> {
            Ok(None)
        }

        async fn delete_room(
            &self,
            _owner: &UserId,
            _room: &RoomId,
        ) -> Result<bool, InventoryStoreError> {
            Ok(false)
        }

        async fn list_things(
            &self,
            _owner: &UserId,
        ) -> Result<Vec<ThingWithRoom>, InventoryStoreError> {
            Ok(self.0.clone())
        }

        async fn insert_thing(
            &self,
            _owner: &UserId,
            _thing: &Thing,
        ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
            Ok(None)
        }

        async fn update_thing(
            &self,
            _owner: &UserId,
            _thing: &ThingId,
            _name: &ThingName,
            _quantity: Quantity,
        ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
            Ok(None)
        }

        async fn delete_thing(
            &self,
            _owner: &UserId,
            _thing: &ThingId,
        ) -> Result<bool, InventoryStoreError> {
            Ok(false)
        }
    }

    fn entry(name: &str, room: &str, quantity: u32) -> ThingWithRoom {
        ThingWithRoom {
            thing: Thing::create(
                RoomId::random(),
                ThingName::new(name).expect("valid name"),
                Quantity::new(quantity),
            ),
            room_name: RoomName::new(room).expect("valid name"),
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn empty_inventory_exports_the_header_only() {
        let service = CsvExportService::new(FixedThings(Vec::new()));
        let bytes = service
            .export_csv(&UserId::random())
            .await
            .expect("export");
        assert_eq!(bytes, b"Name,Room,Quantity\n");
    }

    #[rstest]
    #[actix_rt::test]
    async fn rows_follow_the_repository_order() {
        let service = CsvExportService::new(FixedThings(vec![
            entry("Flour", "Pantry", 2),
            entry("Soap", "Bathroom", 1),
        ]));
        let bytes = service
            .export_csv(&UserId::random())
            .await
            .expect("export");
        assert_eq!(
            bytes,
            b"Name,Room,Quantity\nFlour,Pantry,2\nSoap,Bathroom,1\n"
        );
    }

    #[rstest]
    #[actix_rt::test]
    async fn embedded_commas_are_quoted() {
        let service = CsvExportService::new(FixedThings(vec![entry(
            "Salt, coarse",
            "Pantry",
            3,
        )]));
        let bytes = service
            .export_csv(&UserId::random())
            .await
            .expect("export");
        assert_eq!(bytes, b"Name,Room,Quantity\n\"Salt, coarse\",Pantry,3\n");
    }
}
