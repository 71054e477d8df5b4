pub(crate) mod association_tests;
pub(crate) mod nonce_tests;
pub(crate) mod partial_tests;

use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

use crate::config::Settings;
use crate::db::initialize_in_memory_database;
use crate::logging::setup_test_logging;
use crate::setup::init_pixelpin_auth;
use crate::storage::PixelpinStorage;
use crate::user_model::ModelRegistry;

pub(crate) const TEST_USER_MODEL: &str = "tests.users";
pub(crate) const TEST_ACCOUNT_MODEL: &str = "tests.accounts";

/// Host user table with an integer id and a 30 character username
pub(crate) mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(column_type = "String(StringLen::N(30))")]
        pub username: String,
        pub email: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl crate::user_model::HostUser for Entity {
        fn id_column() -> Column {
            Column::Id
        }

        fn username_column() -> Column {
            Column::Username
        }

        fn email_column() -> Option<Column> {
            Some(Column::Email)
        }
    }
}

/// Host user table keyed by uuid, with an unbounded username
pub(crate) mod accounts {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "accounts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "Text")]
        pub username: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl crate::user_model::HostUser for Entity {
        fn id_column() -> Column {
            Column::Id
        }

        fn username_column() -> Column {
            Column::Username
        }
    }
}

pub(crate) fn test_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry
        .register::<users::Entity>(TEST_USER_MODEL)
        .register::<accounts::Entity>(TEST_ACCOUNT_MODEL);
    registry
}

pub(crate) async fn create_host_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let backend = db.get_database_backend();
    let statement = sea_orm::Schema::new(backend).create_table_from_entity(entity);
    db.execute(backend.build(&statement))
        .await
        .expect("Failed to create host table");
}

/// In-memory database with the host `users` table and every storage table
pub(crate) async fn setup_storage_with(settings: Settings) -> (DatabaseConnection, PixelpinStorage) {
    setup_test_logging();
    let db = initialize_in_memory_database()
        .await
        .expect("Failed to initialize in-memory database");
    create_host_table(&db, users::Entity).await;
    create_host_table(&db, accounts::Entity).await;

    let storage = init_pixelpin_auth(&settings, &test_registry()).expect("Failed to init storage");
    storage.migrate(&db).await.expect("Failed to migrate storage");
    (db, storage)
}

pub(crate) async fn setup_storage() -> (DatabaseConnection, PixelpinStorage) {
    let mut settings = Settings::new();
    settings.set("USER_MODEL", TEST_USER_MODEL);
    setup_storage_with(settings).await
}

pub(crate) async fn create_user(db: &DatabaseConnection, username: &str, email: &str) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert host user")
}
