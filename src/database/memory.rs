use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::UserStore;
use crate::models::{Credential, ProfileUpdate, UserProfile};
use crate::utils::AppError;

/// HashMap-backed store for handler and service tests.
#[derive(Default)]
pub struct InMemoryUserStore {
    credentials: RwLock<HashMap<String, Credential>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a profile without a credential, as if created by another system.
    pub fn put_profile(&self, profile: UserProfile) {
        self.profiles.write().unwrap().insert(profile.uid.clone(), profile);
    }

    pub fn profile(&self, uid: &str) -> Option<UserProfile> {
        self.profiles.read().unwrap().get(uid).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert_account(&self, credential: &Credential, profile: &UserProfile) -> Result<(), AppError> {
        let mut credentials = self.credentials.write().unwrap();
        if credentials.contains_key(&credential.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        credentials.insert(credential.email.clone(), credential.clone());
        self.profiles
            .write()
            .unwrap()
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, AppError> {
        Ok(self.credentials.read().unwrap().get(email).cloned())
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profile(uid))
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, AppError> {
        let mut profiles: Vec<UserProfile> = self.profiles.read().unwrap().values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<bool, AppError> {
        match self.profiles.write().unwrap().get_mut(uid) {
            Some(profile) => {
                update.apply(profile);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
