//! Diesel table definitions for the pantry schema.
//!
//! Mirrors the SQL in `migrations/`; keep the two in step.

diesel::table! {
    users (id) {
        id -> Uuid,
        #[max_length = 30]
        name -> Varchar,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 128]
        password_digest -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    rooms (id) {
        id -> Uuid,
        owner_id -> Uuid,
        #[max_length = 50]
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    things (id) {
        id -> Uuid,
        room_id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        quantity -> Int4,
    }
}

diesel::table! {
    admin_users (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 50]
        role -> Varchar,
        capabilities -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    admin_activities (id) {
        id -> Uuid,
        admin_id -> Uuid,
        #[max_length = 100]
        action -> Varchar,
        details -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    system_files (id) {
        id -> Uuid,
        admin_id -> Uuid,
        #[max_length = 50]
        file_type -> Varchar,
        #[max_length = 255]
        description -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    export_jobs (id) {
        id -> Uuid,
        admin_id -> Uuid,
        #[max_length = 50]
        export_type -> Varchar,
        #[max_length = 20]
        status -> Varchar,
        created_at -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
        file_id -> Nullable<Uuid>,
    }
}

diesel::joinable!(rooms -> users (owner_id));
diesel::joinable!(things -> rooms (room_id));
diesel::joinable!(admin_users -> users (user_id));
diesel::joinable!(admin_activities -> admin_users (admin_id));
diesel::joinable!(system_files -> admin_users (admin_id));
diesel::joinable!(export_jobs -> admin_users (admin_id));
diesel::joinable!(export_jobs -> system_files (file_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    rooms,
    things,
    admin_users,
    admin_activities,
    system_files,
    export_jobs,
);
