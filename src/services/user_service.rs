use serde::Serialize;

use crate::database::UserStore;
use crate::models::{ProfileUpdate, UserProfile};
use crate::utils::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserProfile>,
}

pub async fn list_users(store: &dyn UserStore) -> Result<UserListResponse, AppError> {
    let users = store.list_profiles().await?;
    log::info!("👥 Listed {} user profiles", users.len());
    Ok(UserListResponse { users })
}

/// Applies an admin update (status, permissions, role) to the profile named by `update.uid`.
pub async fn update_user(store: &dyn UserStore, admin: &UserProfile, update: &ProfileUpdate) -> Result<(), AppError> {
    let uid = update
        .uid
        .as_deref()
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("UID required".to_string()))?;

    if update.is_empty() {
        return Err(AppError::InvalidRequest("Nothing to update".to_string()));
    }

    if !store.update_profile(uid, update).await? {
        return Err(AppError::NotFound(format!("User {} not found", uid)));
    }

    log::info!(
        "🛠️  Admin {} updated {}: status={:?} role={:?} permissions={:?}",
        admin.email,
        uid,
        update.status,
        update.role,
        update.permissions
    );

    Ok(())
}
