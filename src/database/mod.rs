use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

use crate::models::{Credential, ProfileUpdate, UserProfile};
use crate::utils::AppError;

#[cfg(test)]
pub mod memory;

pub const USERS: &str = "users";
pub const CREDENTIALS: &str = "credentials";

const DUPLICATE_KEY: i32 = 11000;

/// Account persistence used by the auth and admin services.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the login credential and the profile document for a new account.
    async fn insert_account(&self, credential: &Credential, profile: &UserProfile) -> Result<(), AppError>;

    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, AppError>;

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;

    /// All profiles, newest first.
    async fn list_profiles(&self) -> Result<Vec<UserProfile>, AppError>;

    /// Applies the present fields of `update`. Returns false when no profile has that uid.
    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let db_name = database_name(uri);
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the unique indexes the account lookups rely on
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        let indexes = [
            (USERS, doc! { "uid": 1 }),
            (CREDENTIALS, doc! { "email": 1 }),
            (CREDENTIALS, doc! { "uid": 1 }),
        ];

        for (collection, keys) in indexes {
            let index = IndexModel::builder()
                .keys(keys.clone())
                .options(unique())
                .build();

            match self.collection::<Document>(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}({:?})", collection, keys),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Database name from the URI path, e.g. `mongodb://host:27017/CaptionTrends?retryWrites=true`.
fn database_name(uri: &str) -> &str {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or("CaptionTrends")
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Bson, AppError> {
    to_bson(value).map_err(|e| AppError::Internal(format!("Failed to encode update: {}", e)))
}

fn update_document(update: &ProfileUpdate) -> Result<Document, AppError> {
    let mut set = Document::new();
    if let Some(status) = &update.status {
        set.insert("status", encode(status)?);
    }
    if let Some(permissions) = &update.permissions {
        set.insert("permissions", encode(permissions)?);
    }
    if let Some(role) = &update.role {
        set.insert("role", encode(role)?);
    }
    Ok(doc! { "$set": set })
}

#[async_trait]
impl UserStore for MongoDB {
    async fn insert_account(&self, credential: &Credential, profile: &UserProfile) -> Result<(), AppError> {
        // Índice único em email: duas inscrições simultâneas chegam aqui
        if let Err(e) = self.collection::<Credential>(CREDENTIALS).insert_one(credential).await {
            return Err(if is_duplicate_key(&e) {
                AppError::Conflict("User already exists".to_string())
            } else {
                e.into()
            });
        }

        if let Err(e) = self.collection::<UserProfile>(USERS).insert_one(profile).await {
            // Sem perfil a conta fica inutilizável: desfaz a credencial
            let _ = self
                .collection::<Credential>(CREDENTIALS)
                .delete_one(doc! { "uid": &credential.uid })
                .await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, AppError> {
        Ok(self
            .collection::<Credential>(CREDENTIALS)
            .find_one(doc! { "email": email })
            .await?)
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .collection::<UserProfile>(USERS)
            .find_one(doc! { "uid": uid })
            .await?)
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, AppError> {
        let cursor = self
            .collection::<UserProfile>(USERS)
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<bool, AppError> {
        let result = self
            .collection::<UserProfile>(USERS)
            .update_one(doc! { "uid": uid }, update_document(update)?)
            .await?;

        Ok(result.matched_count > 0)
    }
}
