use mongodb::{Client, Collection, Database};

use std::error::Error;

/// Collection names shared between the services and the index bootstrap.
pub const USERS_COLLECTION: &str = "Users";
pub const BADGES_COLLECTION: &str = "Badges";
pub const REQUIREMENTS_COLLECTION: &str = "Requirements";

const USERS_DB: &str = "BadgeFinderUsers";
const CATALOG_DB: &str = "BadgeFinder";

/// Connection handle shared across requests. User documents live in their
/// own database; the badge/requirement catalog is read-only and lives in a
/// second one, matching the seeded data layout.
#[derive(Clone)]
pub struct MongoDB {
    users_db: Database,
    catalog_db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let users_db = client.database(USERS_DB);
        let catalog_db = client.database(CATALOG_DB);

        // Test connection
        users_db.list_collection_names().await?;

        let mongodb = Self {
            users_db,
            catalog_db,
        };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the query paths rely on. The unique index on
    /// `Users.email` is what turns a double signup into a duplicate-key
    /// error instead of a second document.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self
            .users_db
            .collection::<mongodb::bson::Document>(USERS_COLLECTION);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: Users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let username_index = IndexModel::builder().keys(doc! { "username": 1 }).build();
        match users.create_index(username_index).await {
            Ok(_) => log::info!("   ✅ Index created: Users(username)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let badges = self
            .catalog_db
            .collection::<mongodb::bson::Document>(BADGES_COLLECTION);

        let badge_id_index = IndexModel::builder().keys(doc! { "badge_id": 1 }).build();
        match badges.create_index(badge_id_index).await {
            Ok(_) => log::info!("   ✅ Index created: Badges(badge_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let requirements = self
            .catalog_db
            .collection::<mongodb::bson::Document>(REQUIREMENTS_COLLECTION);

        let req_badge_index = IndexModel::builder().keys(doc! { "badge_id": 1 }).build();
        match requirements.create_index(req_badge_index).await {
            Ok(_) => log::info!("   ✅ Index created: Requirements(badge_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn users_collection<T: Send + Sync>(&self) -> Collection<T> {
        self.users_db.collection(USERS_COLLECTION)
    }

    pub fn badges_collection<T: Send + Sync>(&self) -> Collection<T> {
        self.catalog_db.collection(BADGES_COLLECTION)
    }

    pub fn requirements_collection<T: Send + Sync>(&self) -> Collection<T> {
        self.catalog_db.collection(REQUIREMENTS_COLLECTION)
    }
}
