//! Test utilities for the backend crate.
//!
//! Shared by unit tests in `src/` and the integration suites in `tests/`.
//! The in-memory store implements every repository port over a mutex so
//! handler and service tests run without a database, while reproducing the
//! scoping and cascade semantics of the SQL schema.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    AccountService, AdminActivity, AdminId, AdminRepository, AdminService, AdminStoreError,
    AdminUser, Capability, CapabilitySet, CsvExportService, EmailAddress, ExportJob, ExportJobId,
    ExportJobRepository, ExportJobStatus, ExportStoreError, InventoryRepository,
    InventoryService, InventoryStoreError, PasswordDigest, Quantity, Room, RoomId, RoomName,
    RoomWithThings, SystemFile, Thing, ThingId, ThingName, ThingWithRoom, User, UserId, UserName,
    UserRepository, UserStoreError,
};
use crate::inbound::http::routes::configure_api;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// Generates a fresh signing key per invocation, names the cookie
/// `session` and disables the `Secure` flag for local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    rooms: HashMap<Uuid, Room>,
    things: HashMap<Uuid, Thing>,
    admins: HashMap<Uuid, AdminUser>,
    activities: Vec<AdminActivity>,
    jobs: HashMap<Uuid, ExportJob>,
    files: HashMap<Uuid, SystemFile>,
}

impl Inner {
    fn room_owner(&self, room: &RoomId) -> Option<UserId> {
        self.rooms.get(room.as_uuid()).map(|room| *room.owner())
    }

    fn owns_thing(&self, owner: &UserId, thing: &ThingId) -> bool {
        self.things
            .get(thing.as_uuid())
            .and_then(|thing| self.room_owner(thing.room_id()))
            .is_some_and(|room_owner| room_owner == *owner)
    }

    fn things_in_room(&self, room: &RoomId) -> Vec<Thing> {
        let mut things: Vec<Thing> = self
            .things
            .values()
            .filter(|thing| thing.room_id() == room)
            .cloned()
            .collect();
        things.sort_by_key(|thing| *thing.id().as_uuid());
        things
    }
}

/// In-memory implementation of every repository port.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// A fresh store behind an [`Arc`], ready to share with an app.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }

    /// Insert a user directly, bypassing the HTTP surface.
    pub fn seed_user(&self, name: &str, email: &str, password: &str) -> User {
        let user = User::create(
            UserName::new(name).expect("seed user name"),
            EmailAddress::new(email).expect("seed user email"),
            PasswordDigest::from_password(password).expect("seed user password"),
        );
        self.lock()
            .users
            .insert(*user.id().as_uuid(), user.clone());
        user
    }

    /// Insert a room owned by the given user.
    pub fn seed_room(&self, owner: &User, name: &str) -> Room {
        let room = Room::create(*owner.id(), RoomName::new(name).expect("seed room name"));
        self.lock()
            .rooms
            .insert(*room.id().as_uuid(), room.clone());
        room
    }

    /// Insert a thing into the given room.
    pub fn seed_thing(&self, room: &Room, name: &str, quantity: u32) -> Thing {
        let thing = Thing::create(
            *room.id(),
            ThingName::new(name).expect("seed thing name"),
            Quantity::new(quantity),
        );
        self.lock()
            .things
            .insert(*thing.id().as_uuid(), thing.clone());
        thing
    }

    /// Promote a user to administrator with the given capabilities.
    pub fn seed_admin(
        &self,
        user: &User,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> AdminUser {
        let admin = AdminUser::new(
            AdminId::random(),
            *user.id(),
            "admin",
            capabilities.into_iter().collect::<CapabilitySet>(),
        );
        self.lock()
            .admins
            .insert(*admin.id().as_uuid(), admin.clone());
        admin
    }

    /// Whether the user and their whole subtree have been removed.
    pub fn user_is_gone(&self, user: &User) -> bool {
        let inner = self.lock();
        let user_present = inner.users.contains_key(user.id().as_uuid());
        let rooms_present = inner.rooms.values().any(|room| room.owner() == user.id());
        let things_present = inner.things.values().any(|thing| {
            inner
                .room_owner(thing.room_id())
                .is_some_and(|owner| owner == *user.id())
        });
        !user_present && !rooms_present && !things_present
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        let mut inner = self.lock();
        if inner
            .users
            .values()
            .any(|existing| existing.email() == user.email())
        {
            return Err(UserStoreError::DuplicateEmail);
        }
        inner.users.insert(*user.id().as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserStoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        Ok(self.lock().users.get(id.as_uuid()).cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserStoreError> {
        let mut inner = self.lock();
        if inner.users.remove(id.as_uuid()).is_none() {
            return Ok(false);
        }

        let owned_rooms: Vec<Uuid> = inner
            .rooms
            .values()
            .filter(|room| room.owner() == id)
            .map(|room| *room.id().as_uuid())
            .collect();
        inner
            .things
            .retain(|_, thing| !owned_rooms.contains(thing.room_id().as_uuid()));
        inner.rooms.retain(|_, room| room.owner() != id);

        let admin_ids: Vec<Uuid> = inner
            .admins
            .values()
            .filter(|admin| admin.user_id() == id)
            .map(|admin| *admin.id().as_uuid())
            .collect();
        inner
            .admins
            .retain(|_, admin| admin.user_id() != id);
        inner
            .activities
            .retain(|entry| !admin_ids.contains(entry.admin_id().as_uuid()));
        inner
            .jobs
            .retain(|_, job| !admin_ids.contains(job.admin_id().as_uuid()));
        inner
            .files
            .retain(|_, file| !admin_ids.contains(file.admin_id().as_uuid()));
        Ok(true)
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn list_rooms(&self, owner: &UserId) -> Result<Vec<RoomWithThings>, InventoryStoreError> {
        let inner = self.lock();
        let mut rooms: Vec<Room> = inner
            .rooms
            .values()
            .filter(|room| room.owner() == owner)
            .cloned()
            .collect();
        rooms.sort_by_key(Room::created_at);
        Ok(rooms
            .into_iter()
            .map(|room| {
                let things = inner.things_in_room(room.id());
                RoomWithThings { room, things }
            })
            .collect())
    }

    async fn find_room(
        &self,
        owner: &UserId,
        room: &RoomId,
    ) -> Result<Option<RoomWithThings>, InventoryStoreError> {
        let inner = self.lock();
        Ok(inner
            .rooms
            .get(room.as_uuid())
            .filter(|candidate| candidate.owner() == owner)
            .cloned()
            .map(|room| {
                let things = inner.things_in_room(room.id());
                RoomWithThings { room, things }
            }))
    }

    async fn insert_room(&self, room: &Room) -> Result<(), InventoryStoreError> {
        self.lock()
            .rooms
            .insert(*room.id().as_uuid(), room.clone());
        Ok(())
    }

    async fn rename_room(
        &self,
        owner: &UserId,
        room: &RoomId,
        name: &RoomName,
    ) -> Result<Option<Room>, InventoryStoreError> {
        let mut inner = self.lock();
        let Some(existing) = inner
            .rooms
            .get(room.as_uuid())
            .filter(|candidate| candidate.owner() == owner)
        else {
            return Ok(None);
        };
        let renamed = Room::new(
            *existing.id(),
            *existing.owner(),
            name.clone(),
            existing.created_at(),
        );
        inner.rooms.insert(*room.as_uuid(), renamed.clone());
        Ok(Some(renamed))
    }

    async fn delete_room(
        &self,
        owner: &UserId,
        room: &RoomId,
    ) -> Result<bool, InventoryStoreError> {
        let mut inner = self.lock();
        let owned = inner
            .rooms
            .get(room.as_uuid())
            .is_some_and(|candidate| candidate.owner() == owner);
        if !owned {
            return Ok(false);
        }
        inner.rooms.remove(room.as_uuid());
        inner.things.retain(|_, thing| thing.room_id() != room);
        Ok(true)
    }

    async fn list_things(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ThingWithRoom>, InventoryStoreError> {
        let inner = self.lock();
        let mut things: Vec<Thing> = inner
            .things
            .values()
            .filter(|thing| {
                inner
                    .room_owner(thing.room_id())
                    .is_some_and(|room_owner| room_owner == *owner)
            })
            .cloned()
            .collect();
        things.sort_by_key(|thing| *thing.id().as_uuid());
        Ok(things
            .into_iter()
            .filter_map(|thing| {
                let room_name = inner
                    .rooms
                    .get(thing.room_id().as_uuid())
                    .map(|room| room.name().clone())?;
                Some(ThingWithRoom { thing, room_name })
            })
            .collect())
    }

    async fn insert_thing(
        &self,
        owner: &UserId,
        thing: &Thing,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
        let mut inner = self.lock();
        let Some(room_name) = inner
            .rooms
            .get(thing.room_id().as_uuid())
            .filter(|room| room.owner() == owner)
            .map(|room| room.name().clone())
        else {
            return Ok(None);
        };
        inner
            .things
            .insert(*thing.id().as_uuid(), thing.clone());
        Ok(Some(ThingWithRoom {
            thing: thing.clone(),
            room_name,
        }))
    }

    async fn update_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
        name: &ThingName,
        quantity: Quantity,
    ) -> Result<Option<ThingWithRoom>, InventoryStoreError> {
        let mut inner = self.lock();
        if !inner.owns_thing(owner, thing) {
            return Ok(None);
        }
        let Some(existing) = inner.things.get(thing.as_uuid()) else {
            return Ok(None);
        };
        let updated = Thing::new(*existing.id(), *existing.room_id(), name.clone(), quantity);
        let room_name = inner
            .rooms
            .get(updated.room_id().as_uuid())
            .map(|room| room.name().clone());
        inner
            .things
            .insert(*thing.as_uuid(), updated.clone());
        Ok(room_name.map(|room_name| ThingWithRoom {
            thing: updated,
            room_name,
        }))
    }

    async fn delete_thing(
        &self,
        owner: &UserId,
        thing: &ThingId,
    ) -> Result<bool, InventoryStoreError> {
        let mut inner = self.lock();
        if !inner.owns_thing(owner, thing) {
            return Ok(false);
        }
        Ok(inner.things.remove(thing.as_uuid()).is_some())
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn find_by_user(&self, user: &UserId) -> Result<Option<AdminUser>, AdminStoreError> {
        Ok(self
            .lock()
            .admins
            .values()
            .find(|admin| admin.user_id() == user)
            .cloned())
    }

    async fn record_activity(&self, activity: &AdminActivity) -> Result<(), AdminStoreError> {
        self.lock().activities.push(activity.clone());
        Ok(())
    }

    async fn list_activity(&self) -> Result<Vec<AdminActivity>, AdminStoreError> {
        // Entries are appended chronologically; newest first means reversed.
        Ok(self.lock().activities.iter().rev().cloned().collect())
    }
}

/// Statuses a job may hold immediately before moving to the given one.
fn prior_statuses(status: ExportJobStatus) -> &'static [ExportJobStatus] {
    match status {
        ExportJobStatus::Pending => &[],
        ExportJobStatus::Running => &[ExportJobStatus::Pending],
        ExportJobStatus::Done => &[ExportJobStatus::Running],
        ExportJobStatus::Failed => &[ExportJobStatus::Pending, ExportJobStatus::Running],
    }
}

#[async_trait]
impl ExportJobRepository for MemoryStore {
    async fn insert_job(&self, job: &ExportJob) -> Result<(), ExportStoreError> {
        self.lock().jobs.insert(*job.id().as_uuid(), job.clone());
        Ok(())
    }

    async fn find_job(
        &self,
        admin: &AdminId,
        job: &ExportJobId,
    ) -> Result<Option<ExportJob>, ExportStoreError> {
        Ok(self
            .lock()
            .jobs
            .get(job.as_uuid())
            .filter(|candidate| candidate.admin_id() == admin)
            .cloned())
    }

    async fn update_job(&self, job: &ExportJob) -> Result<bool, ExportStoreError> {
        let mut inner = self.lock();
        let claimable = inner
            .jobs
            .get(job.id().as_uuid())
            .is_some_and(|stored| prior_statuses(job.status()).contains(&stored.status()));
        if !claimable {
            return Ok(false);
        }
        inner.jobs.insert(*job.id().as_uuid(), job.clone());
        Ok(true)
    }

    async fn insert_file(&self, file: &SystemFile) -> Result<(), ExportStoreError> {
        self.lock()
            .files
            .insert(*file.id().as_uuid(), file.clone());
        Ok(())
    }
}

/// Build the handler state over a shared in-memory store.
pub fn test_state(store: &Arc<MemoryStore>) -> HttpState {
    HttpState::new(
        Arc::new(AccountService::new(Arc::clone(store))),
        Arc::new(InventoryService::new(Arc::clone(store))),
        Arc::new(CsvExportService::new(Arc::clone(store))),
        Arc::new(AdminService::new(
            Arc::clone(store),
            Arc::clone(store),
            Arc::clone(store),
        )),
    )
}

/// Build a full API app over a shared in-memory store.
pub fn test_app(
    store: &Arc<MemoryStore>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .wrap(test_session_middleware())
        .app_data(web::Data::new(test_state(store)))
        .configure(configure_api)
}

/// Log in through the API and return the session cookie.
pub async fn login_as<S, B>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request(),
    )
    .await;
    assert!(
        response.status().is_success(),
        "login failed: {}",
        response.status()
    );
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
