//! Local accounts and the signed-in session
//!
//! Accounts are stored in the database with a random per-account salt and a
//! SHA-256 digest of `salt || password`. The signed-in user is kept in local
//! state so it survives restarts.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::events::{Event, EventBus};
use super::profile::ProfileService;
use crate::db::AccountRecord;
use crate::error::{DbError, LuminaError, Result};
use crate::store::{BookStore, SessionStore};
use crate::types::{now_millis, User};
use crate::Database;

/// Shortest accepted password, in characters
pub const MIN_PASSWORD_CHARS: usize = 6;

const SALT_BYTES: usize = 16;

fn hash_password(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    db: Arc<Database>,
    session: SessionStore,
    books: BookStore,
    profiles: ProfileService,
    event_bus: EventBus,
}

impl AuthService {
    pub fn new(
        db: Arc<Database>,
        session: SessionStore,
        books: BookStore,
        profiles: ProfileService,
        event_bus: EventBus,
    ) -> Self {
        Self {
            db,
            session,
            books,
            profiles,
            event_bus,
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current()
    }

    /// Create an account and sign it in
    pub async fn sign_up(
        &self,
        display_name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User> {
        let display_name = display_name.trim();
        let email = normalize_email(email);

        if display_name.is_empty() {
            return Err(LuminaError::InvalidInput(
                "Display name cannot be empty".to_string(),
            ));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(LuminaError::InvalidInput(format!(
                "'{}' is not an email address",
                email
            )));
        }
        if password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
            return Err(LuminaError::InvalidInput(format!(
                "Password must have at least {} characters",
                MIN_PASSWORD_CHARS
            )));
        }
        if self.db.find_account_by_email(&email).await?.is_some() {
            return Err(LuminaError::InvalidInput(format!(
                "An account for {} already exists",
                email
            )));
        }

        let mut salt = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            display_name: display_name.to_string(),
            email,
            photo_url: None,
        };
        let account = AccountRecord {
            user: user.clone(),
            password_salt: BASE64.encode(salt),
            password_hash: hash_password(&salt, password.expose_secret()),
            created_at: now_millis(),
        };

        self.db.create_account(&account).await?;
        self.profiles.get_or_create(&user).await?;
        tracing::info!(user_id = %user.id, "account created");

        self.start_session(user.clone())?;
        Ok(user)
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<User> {
        let invalid = || LuminaError::InvalidInput("Invalid email or password".to_string());

        let account = self
            .db
            .find_account_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;

        let salt = BASE64
            .decode(&account.password_salt)
            .map_err(|e| DbError::CorruptDocument {
                field: "password_salt",
                reason: e.to_string(),
            })?;
        let digest = hash_password(&salt, password.expose_secret());
        if !constant_time_eq(digest.as_bytes(), account.password_hash.as_bytes()) {
            tracing::debug!(user_id = %account.user.id, "password mismatch");
            return Err(invalid());
        }

        // Older accounts may predate their profile document
        self.profiles.get_or_create(&account.user).await?;
        tracing::info!(user_id = %account.user.id, "signed in");

        self.start_session(account.user.clone())?;
        Ok(account.user)
    }

    /// End the session; signing out twice is harmless
    pub fn sign_out(&self) -> Result<()> {
        let previous = self.session.current();
        self.session.clear()?;
        self.books.replace_all(Vec::new());

        if let Some(user) = previous {
            tracing::info!(user_id = %user.id, "signed out");
            self.event_bus
                .emit(Event::SessionChanged { user_id: None });
        }
        Ok(())
    }

    fn start_session(&self, user: User) -> Result<()> {
        let user_id = user.id.clone();
        self.session.set(user)?;
        // The cached shelf belonged to whoever was signed in before
        self.books.replace_all(Vec::new());
        self.event_bus.emit(Event::SessionChanged {
            user_id: Some(user_id),
        });
        Ok(())
    }
}
