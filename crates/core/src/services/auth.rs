//! Registration, email verification and sign-in.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use finboard_common::{
    AppError, AppResult, IdGenerator,
    rules::{normalize_email, validate_nickname, validate_password},
};
use finboard_db::{
    entities::{
        user::{self, UserRole},
        verification_token,
    },
    repositories::{UserRepository, VerificationTokenRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::lifecycle::{LifecycleService, is_grace_expired};
use super::session::{SessionClaims, SessionIssuer};

/// Input for registering a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

/// A freshly registered, still unverified account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: user::Model,
    /// Secret to deliver to the user's inbox.
    pub verification_token: String,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIn {
    pub token: String,
    pub claims: SessionClaims,
    /// A pending deletion was cancelled by this sign-in.
    pub reactivated: bool,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    token_repo: VerificationTokenRepository,
    lifecycle: LifecycleService,
    sessions: SessionIssuer,
    id_gen: IdGenerator,
    verification_ttl: Duration,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        token_repo: VerificationTokenRepository,
        lifecycle: LifecycleService,
        sessions: SessionIssuer,
        verification_ttl: Duration,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            lifecycle,
            sessions,
            id_gen: IdGenerator::new(),
            verification_ttl,
        }
    }

    /// Register an account. It stays unusable until the email is verified.
    pub async fn register(&self, input: RegisterInput, now: DateTime<Utc>) -> AppResult<Registration> {
        let email = normalize_email(&input.email)?;
        let nickname = input.nickname.trim().to_string();
        validate_nickname(&nickname)?;
        validate_password(&input.password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_string()));
        }
        if self.user_repo.find_by_nickname(&nickname).await?.is_some() {
            return Err(AppError::Conflict("nickname already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let token = self.id_gen.generate_token();
        let (user, _) = self
            .user_repo
            .create_with_token(
                user::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    email: Set(email.clone()),
                    nickname: Set(nickname),
                    password_hash: Set(password_hash),
                    role: Set(UserRole::User),
                    email_verified: Set(None),
                    two_factor_enabled: Set(false),
                    notifications_enabled: Set(false),
                    suspended: Set(false),
                    suspended_reason: Set(None),
                    suspended_appeal: Set(None),
                    deleted_at: Set(None),
                    reactivated_at: Set(None),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                },
                verification_token::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    identifier: Set(email),
                    token: Set(token.clone()),
                    expires: Set((now + self.verification_ttl).into()),
                },
            )
            .await?;

        info!(user_id = %user.id, "User registered");

        Ok(Registration {
            user,
            verification_token: token,
        })
    }

    /// Confirm an email address with its verification token.
    pub async fn verify_email(&self, token: &str, now: DateTime<Utc>) -> AppResult<user::Model> {
        let record = self
            .token_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("verification token".to_string()))?;

        if record.expires.with_timezone(&Utc) < now {
            return Err(AppError::validation("verification token expired"));
        }

        let user = self
            .user_repo
            .find_by_email(&record.identifier)
            .await?
            .ok_or_else(|| AppError::UserNotFound(record.identifier.clone()))?;

        let mut model: user::ActiveModel = user.into();
        model.email_verified = Set(Some(now.into()));
        model.updated_at = Set(Some(now.into()));
        let user = self.user_repo.update(model).await?;

        self.token_repo.delete(&record.id).await?;

        info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    /// Authenticate with email and password.
    ///
    /// Signing in during the grace window cancels a pending deletion; after it
    /// the deletion is completed and sign-in fails.
    pub async fn sign_in(&self, email: &str, password: &str, now: DateTime<Utc>) -> AppResult<SignedIn> {
        let invalid = || AppError::Unauthorized("invalid email or password".to_string());

        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        if user.email_verified.is_none() {
            return Err(AppError::Unauthorized("email not verified".to_string()));
        }

        let mut reactivated = false;
        let user = match user.deleted_at {
            Some(deleted_at) if is_grace_expired(deleted_at.with_timezone(&Utc), now) => {
                self.lifecycle.hard_delete(&user.id).await?;
                return Err(AppError::Unauthorized("account has been deleted".to_string()));
            }
            Some(_) => {
                reactivated = true;
                self.lifecycle.reactivate(user, now).await?
            }
            None => user,
        };

        let token = self.sessions.issue(&user, now)?;
        info!(user_id = %user.id, reactivated, "User signed in");

        Ok(SignedIn {
            claims: SessionClaims::for_user(&user, now, self.sessions.ttl()),
            token,
            reactivated,
        })
    }

    /// Re-issue a session from the live user row, picking up new flags.
    pub async fn refresh(&self, user_id: &str, now: DateTime<Utc>) -> AppResult<SignedIn> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("session user no longer exists".to_string()))?;

        Ok(SignedIn {
            token: self.sessions.issue(&user, now)?,
            claims: SessionClaims::for_user(&user, now, self.sessions.ttl()),
            reactivated: false,
        })
    }

    /// Change the caller's nickname.
    pub async fn change_nickname(
        &self,
        caller_id: &str,
        nickname: &str,
        now: DateTime<Utc>,
    ) -> AppResult<user::Model> {
        let nickname = nickname.trim();
        validate_nickname(nickname)?;

        let user = self.user_repo.get_by_id(caller_id).await?;
        if user.nickname == nickname {
            return Ok(user);
        }

        if self.user_repo.find_by_nickname(nickname).await?.is_some() {
            return Err(AppError::Conflict("nickname already taken".to_string()));
        }

        let mut model: user::ActiveModel = user.into();
        model.nickname = Set(nickname.to_string());
        model.updated_at = Set(Some(now.into()));

        // A concurrent rename surfaces as a unique violation, mapped to Conflict
        self.user_repo.update(model).await
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
