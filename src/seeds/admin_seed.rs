use crate::config::AdminSeedConfig;
use crate::database::UserStore;
use crate::models::{UserPermissions, UserProfile, UserRole, UserStatus};
use crate::services::auth_service;
use crate::utils::AppError;

fn approved_admin(uid: String, email: String) -> UserProfile {
    UserProfile {
        role: UserRole::Admin,
        status: UserStatus::Approved,
        permissions: UserPermissions::all(),
        ..UserProfile::new_pending(uid, email)
    }
}

/// Creates the bootstrap admin account unless one already exists for that email.
/// Failures are logged; the server still starts.
pub async fn seed_admin(store: &dyn UserStore, seed: &AdminSeedConfig, bcrypt_cost: u32) {
    match auth_service::create_account(store, &seed.email, &seed.password, bcrypt_cost, approved_admin).await {
        Ok(profile) => {
            log::info!("👑 Admin seed: created {} ({})", profile.email, profile.uid);
        }
        Err(AppError::Conflict(_)) => {
            log::info!("👑 Admin seed: {} already exists, skipping", seed.email);
        }
        Err(e) => {
            log::error!("❌ Admin seed failed for {}: {}", seed.email, e);
        }
    }
}
