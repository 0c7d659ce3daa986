use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::{LoginRequest, RegisterRequest, User};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;
use tracing::info;
use uuid::Uuid;

/// A real Argon2 hash generated once, used as a timing decoy so that login
/// attempts for unknown emails cost the same as attempts for known ones.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("dummy-never-matches").ok());

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::password_hash("Failed to hash password", e))?;

    Ok(hash.to_string())
}

pub fn verify_password(user: &User, password: &str) -> Result<(), AppError> {
    let password_hash = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &password_hash)
        .map_err(|_| AppError::InvalidCredentials)
}

/// Throwaway verification that equalizes response timing for unknown accounts.
pub fn dummy_verify(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }
}

pub struct AuthService<'a, R: UserRepository + ?Sized> {
    repository: &'a R,
}

impl<'a, R: UserRepository + ?Sized> AuthService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        AuthService { repository }
    }

    /// Creates an account for an already validated registration payload.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        if self.repository.get_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::UserAlreadyExists(request.email.clone()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self.repository.create_user(&request.name, &request.email, &password_hash).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<User, AppError> {
        match self.repository.get_user_by_email(&request.email).await? {
            Some(user) => {
                verify_password(&user, &request.password)?;
                Ok(user)
            }
            None => {
                dummy_verify(&request.password);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub async fn profile(&self, user_id: &Uuid) -> Result<User, AppError> {
        self.repository.get_user_by_id(user_id).await?.ok_or(AppError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryRepository;

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
        }
    }

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let first = hash_password("hunter22").unwrap();
        let second = hash_password("hunter22").unwrap();
        assert_ne!(first, second);

        let user = User {
            password_hash: first,
            ..InMemoryRepository::user("jane@example.com")
        };
        assert!(verify_password(&user, "hunter22").is_ok());
        assert!(matches!(verify_password(&user, "wrong"), Err(AppError::InvalidCredentials)));
    }

    #[rocket::async_test]
    async fn register_then_login() {
        let repo = InMemoryRepository::default();
        let service = AuthService::new(&repo);

        let user = service.register(&registration("jane@example.com")).await.unwrap();
        assert_ne!(user.password_hash, "secret1");

        let logged_in = service
            .login(&LoginRequest {
                email: "jane@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(service.profile(&user.id).await.unwrap().email, "jane@example.com");
    }

    #[rocket::async_test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryRepository::default();
        let service = AuthService::new(&repo);

        service.register(&registration("jane@example.com")).await.unwrap();
        let err = service.register(&registration("jane@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyExists(email) if email == "jane@example.com"));
    }

    #[rocket::async_test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let repo = InMemoryRepository::default();
        let service = AuthService::new(&repo);
        service.register(&registration("jane@example.com")).await.unwrap();

        let wrong_password = service
            .login(&LoginRequest {
                email: "jane@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(&LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
    }

    #[rocket::async_test]
    async fn profile_of_missing_user_is_not_found() {
        let repo = InMemoryRepository::default();
        let err = AuthService::new(&repo).profile(&Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }
}
