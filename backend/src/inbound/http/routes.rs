//! Route registration for the REST API.

use actix_web::web;

use crate::inbound::http::{admin, export, rooms, shopping_list, things, users};

/// Mount every API endpoint under `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(rooms::list_rooms)
            .service(rooms::create_room)
            .service(rooms::get_room)
            .service(rooms::rename_room)
            .service(rooms::delete_room)
            .service(things::list_things)
            .service(things::create_thing)
            .service(things::update_thing)
            .service(things::delete_thing)
            .service(shopping_list::shopping_list)
            .service(shopping_list::add_shopping_list_item)
            .service(export::export_things)
            .service(admin::list_activity)
            .service(admin::create_export_job)
            .service(admin::run_export_job)
            .service(admin::delete_user),
    );
}
