use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::database::UserStore;
use crate::models::{Credential, Permission, UserProfile, UserStatus};
use crate::utils::AppError;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // uid
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
    pub token_use: TokenUse,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

pub type LoginRequest = SignupRequest;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: String,
    pub profile: UserProfile,
}

fn issue_token(jwt: &JwtConfig, uid: &str, email: &str, token_use: TokenUse) -> Result<String, AppError> {
    let now = Utc::now();
    let ttl = match token_use {
        TokenUse::Access => Duration::hours(jwt.access_ttl_hours),
        TokenUse::Refresh => Duration::days(jwt.refresh_ttl_days),
    };

    let claims = Claims {
        sub: uid.to_string(),
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: jwt.audience.clone(),
        iss: jwt.issuer.clone(),
        token_use,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

pub fn generate_jwt(jwt: &JwtConfig, uid: &str, email: &str) -> Result<String, AppError> {
    issue_token(jwt, uid, email, TokenUse::Access)
}

pub fn generate_refresh_token(jwt: &JwtConfig, uid: &str, email: &str) -> Result<String, AppError> {
    issue_token(jwt, uid, email, TokenUse::Refresh)
}

/// Verifies signature, expiry, issuer and audience, and that the token was issued for `expected` use.
pub fn verify_token(jwt: &JwtConfig, token: &str, expected: TokenUse) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[jwt.audience.as_str()]);
    validation.set_issuer(&[jwt.issuer.as_str()]);

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(jwt.secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            log::debug!("Token rejected: {}", e);
            AppError::Unauthorized("Unauthorized: Invalid token".to_string())
        })?;

    if claims.token_use != expected {
        return Err(AppError::Unauthorized("Unauthorized: Invalid token".to_string()));
    }

    Ok(claims)
}

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized: No token provided".to_string()))
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(AppError::InvalidRequest("A valid email is required".to_string()))
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

fn auth_response(jwt: &JwtConfig, profile: UserProfile) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        success: true,
        token: generate_jwt(jwt, &profile.uid, &profile.email)?,
        refresh_token: generate_refresh_token(jwt, &profile.uid, &profile.email)?,
        profile,
    })
}

/// Creates a credential and its profile. Used by signup (pending user) and the admin seed.
pub async fn create_account(
    store: &dyn UserStore,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
    build_profile: impl FnOnce(String, String) -> UserProfile,
) -> Result<UserProfile, AppError> {
    let email = normalize_email(email)?;

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if store.find_credential(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let uid = Uuid::new_v4().simple().to_string();
    let profile = build_profile(uid.clone(), email.clone());
    let credential = Credential {
        uid,
        email,
        password_hash: hash_password(password.to_string(), bcrypt_cost).await?,
        created_at: profile.created_at,
    };

    store.insert_account(&credential, &profile).await?;

    Ok(profile)
}

pub async fn signup(
    store: &dyn UserStore,
    jwt: &JwtConfig,
    bcrypt_cost: u32,
    request: &SignupRequest,
) -> Result<AuthResponse, AppError> {
    let profile = create_account(store, &request.email, &request.password, bcrypt_cost, UserProfile::new_pending).await?;

    log::info!("✅ User registered (pending approval): {}", profile.email);

    auth_response(jwt, profile)
}

pub async fn login(store: &dyn UserStore, jwt: &JwtConfig, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());
    let email = normalize_email(&request.email).map_err(|_| invalid())?;

    let credential = store.find_credential(&email).await?.ok_or_else(invalid)?;

    if !verify_password(request.password.clone(), credential.password_hash.clone()).await? {
        return Err(invalid());
    }

    let profile = get_user_profile(store, &credential.uid).await?;

    auth_response(jwt, profile)
}

pub async fn refresh_token(
    store: &dyn UserStore,
    jwt: &JwtConfig,
    request: &RefreshTokenRequest,
) -> Result<AuthResponse, AppError> {
    let claims = verify_token(jwt, &request.refresh_token, TokenUse::Refresh)?;
    let profile = get_user_profile(store, &claims.sub).await?;

    if profile.status == UserStatus::Disabled {
        return Err(AppError::Forbidden("Forbidden: Account disabled".to_string()));
    }

    auth_response(jwt, profile)
}

pub async fn get_user_profile(store: &dyn UserStore, uid: &str) -> Result<UserProfile, AppError> {
    store
        .get_profile(uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
}

pub fn ensure_admin(profile: &UserProfile) -> Result<(), AppError> {
    if profile.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Forbidden: Admin access required".to_string()))
    }
}

/// Approved accounts pass; admins also pass while pending. Disabled accounts never pass.
pub fn ensure_approved(profile: &UserProfile) -> Result<(), AppError> {
    match profile.status {
        UserStatus::Approved => Ok(()),
        UserStatus::Pending if profile.is_admin() => Ok(()),
        UserStatus::Pending => Err(AppError::Forbidden("Forbidden: Account pending approval".to_string())),
        UserStatus::Disabled => Err(AppError::Forbidden("Forbidden: Account disabled".to_string())),
    }
}

pub fn ensure_permission(profile: &UserProfile, permission: Permission) -> Result<(), AppError> {
    if profile.permissions.allows(permission) {
        Ok(())
    } else {
        log::warn!("🚫 {} denied {} for {}", permission, profile.uid, profile.email);
        Err(AppError::Forbidden(format!(
            "Permission denied: {} not enabled for this user.",
            permission
        )))
    }
}

pub async fn require_admin(store: &dyn UserStore, claims: &Claims) -> Result<UserProfile, AppError> {
    let profile = get_user_profile(store, &claims.sub).await?;
    ensure_admin(&profile)?;
    ensure_approved(&profile)?;
    Ok(profile)
}

pub async fn require_approval(store: &dyn UserStore, claims: &Claims) -> Result<UserProfile, AppError> {
    let profile = get_user_profile(store, &claims.sub).await?;
    ensure_approved(&profile)?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryUserStore;
    use crate::models::{UserPermissions, UserRole};

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "caption-trend-service".to_string(),
            audience: "caption-trend-api".to_string(),
            access_ttl_hours: 1,
            refresh_ttl_days: 1,
        }
    }

    fn profile(role: UserRole, status: UserStatus) -> UserProfile {
        UserProfile {
            role,
            status,
            ..UserProfile::new_pending("u1".into(), "a@b.com".into())
        }
    }

    fn request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = generate_jwt(&jwt(), "u1", "a@b.com").unwrap();
        let claims = verify_token(&jwt(), &token, TokenUse::Access).unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.token_use, TokenUse::Access);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let refresh = generate_refresh_token(&jwt(), "u1", "a@b.com").unwrap();
        assert!(verify_token(&jwt(), &refresh, TokenUse::Access).is_err());
        assert!(verify_token(&jwt(), &refresh, TokenUse::Refresh).is_ok());
    }

    #[test]
    fn test_token_from_other_issuer_or_secret_is_rejected() {
        let token = generate_jwt(&jwt(), "u1", "a@b.com").unwrap();

        let other_secret = JwtConfig { secret: "other".into(), ..jwt() };
        let err = verify_token(&other_secret, &token, TokenUse::Access).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");

        let other_issuer = JwtConfig { issuer: "someone-else".into(), ..jwt() };
        assert!(verify_token(&other_issuer, &token, TokenUse::Access).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = JwtConfig { access_ttl_hours: -2, ..jwt() };
        let token = generate_jwt(&expired, "u1", "a@b.com").unwrap();
        assert!(verify_token(&jwt(), &token, TokenUse::Access).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");

        for header in [None, Some("abc.def"), Some("Bearer "), Some("Basic abc")] {
            let err = bearer_token(header).unwrap_err();
            assert_eq!(err.to_string(), "Unauthorized: No token provided");
        }
    }

    #[test]
    fn test_approval_rules() {
        assert!(ensure_approved(&profile(UserRole::User, UserStatus::Approved)).is_ok());
        assert!(ensure_approved(&profile(UserRole::Admin, UserStatus::Pending)).is_ok());

        let err = ensure_approved(&profile(UserRole::User, UserStatus::Pending)).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: Account pending approval");

        let err = ensure_approved(&profile(UserRole::Admin, UserStatus::Disabled)).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: Account disabled");
    }

    #[test]
    fn test_admin_and_permission_rules() {
        assert!(ensure_admin(&profile(UserRole::Admin, UserStatus::Approved)).is_ok());
        assert_eq!(
            ensure_admin(&profile(UserRole::User, UserStatus::Approved)).unwrap_err().to_string(),
            "Forbidden: Admin access required"
        );

        let mut user = profile(UserRole::User, UserStatus::Approved);
        let err = ensure_permission(&user, Permission::CaptionGen).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Permission denied: Caption Generation not enabled for this user."
        );

        user.permissions = UserPermissions { caption_gen: true, ..Default::default() };
        assert!(ensure_permission(&user, Permission::CaptionGen).is_ok());
        assert!(ensure_permission(&user, Permission::AudioAnalysis).is_err());
    }

    #[tokio::test]
    async fn test_signup_creates_pending_profile() {
        let store = InMemoryUserStore::new();

        let response = signup(&store, &jwt(), 4, &request("  New@Example.com ", "secret1")).await.unwrap();

        assert_eq!(response.profile.email, "new@example.com");
        assert_eq!(response.profile.status, UserStatus::Pending);
        assert_eq!(response.profile.role, UserRole::User);
        assert_eq!(response.profile.permissions, UserPermissions::default());
        assert!(store.profile(&response.profile.uid).is_some());

        let claims = verify_token(&jwt(), &response.token, TokenUse::Access).unwrap();
        assert_eq!(claims.sub, response.profile.uid);
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let store = InMemoryUserStore::new();

        let err = signup(&store, &jwt(), 4, &request("not-an-email", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        let err = signup(&store, &jwt(), 4, &request("a@b.com", "123")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        signup(&store, &jwt(), 4, &request("a@b.com", "secret1")).await.unwrap();
        let err = signup(&store, &jwt(), 4, &request("A@B.com", "secret2")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_concurrent_signups_for_one_email() {
        let store = InMemoryUserStore::new();
        let req = request("dup@example.com", "secret1");

        let (jwt_a, jwt_b) = (jwt(), jwt());
        let (first, second) = tokio::join!(
            signup(&store, &jwt_a, 4, &req),
            signup(&store, &jwt_b, 4, &req)
        );

        let errors: Vec<AppError> = [first, second].into_iter().filter_map(Result::err).collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], AppError::Conflict(m) if m == "User already exists"));
        assert_eq!(store.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let store = InMemoryUserStore::new();
        let created = signup(&store, &jwt(), 4, &request("a@b.com", "secret1")).await.unwrap();

        let err = login(&store, &jwt(), &request("a@b.com", "wrong-pass")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        let err = login(&store, &jwt(), &request("nobody@b.com", "secret1")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");

        let logged_in = login(&store, &jwt(), &request("A@b.com", "secret1")).await.unwrap();
        assert_eq!(logged_in.profile.uid, created.profile.uid);

        let refreshed = refresh_token(
            &store,
            &jwt(),
            &RefreshTokenRequest { refresh_token: logged_in.refresh_token.clone() },
        )
        .await
        .unwrap();
        assert_eq!(refreshed.profile.uid, created.profile.uid);

        let err = refresh_token(&store, &jwt(), &RefreshTokenRequest { refresh_token: logged_in.token })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_require_helpers_load_profile() {
        let store = InMemoryUserStore::new();
        store.put_profile(UserProfile {
            status: UserStatus::Approved,
            ..UserProfile::new_pending("u1".into(), "a@b.com".into())
        });

        let token = generate_jwt(&jwt(), "u1", "a@b.com").unwrap();
        let claims = verify_token(&jwt(), &token, TokenUse::Access).unwrap();

        assert!(require_approval(&store, &claims).await.is_ok());
        assert!(matches!(require_admin(&store, &claims).await, Err(AppError::Forbidden(_))));

        let ghost = Claims { sub: "ghost".into(), ..claims };
        let err = require_approval(&store, &ghost).await.unwrap_err();
        assert_eq!(err.to_string(), "User profile not found");
    }
}
