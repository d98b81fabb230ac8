// SPDX-License-Identifier: MIT

//! Player accounts: one JSON file per player at
//! `players/<first-letter>/<name>/<name>.json`, credentialled login with a
//! constant-time check that takes comparable wall time whether or not the
//! account exists — the lookup always performs a full SHA-256
//! hash-and-compare even when the account file does not exist.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use jit_core::StateStore;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::atomic::{write_atomic, AtomicWriteError};

pub const CURRENT_ACCOUNT_VERSION: u32 = 1;
const SALT_LEN: usize = 16;
const MIN_NAME_LEN: usize = 3;
const MAX_NAME_LEN: usize = 20;
const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("name must be 3-20 letters/digits, starting with a letter")]
    InvalidName,
    #[error("password must be at least 4 characters")]
    InvalidPassword,
    #[error("an account named {0:?} already exists")]
    AlreadyExists(String),
    #[error(transparent)]
    Write(#[from] AtomicWriteError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One player's persisted account: credentials, wizard flag, and
/// the state carried between sessions (inventory, equipment, last
/// location, and a free-form `state` bag mirroring an instance's state
/// store, for account-level attributes that are not themselves a world
/// object).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAccount {
    pub version: u32,
    pub name: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub wizard: bool,
    pub state: StateStore,
    pub last_location: Option<String>,
    pub inventory: Vec<String>,
    pub equipment: std::collections::BTreeMap<String, String>,
}

pub fn name_valid(name: &str) -> bool {
    let len = name.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return false;
    }
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    first.is_ascii_alphabetic() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn password_valid(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

fn hash_password(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// `players/<first-letter>/<name>/<name>.json`, first letter lower-cased
/// so the shard doesn't depend on the player's chosen capitalisation.
pub fn path_for(players_dir: &Path, name: &str) -> PathBuf {
    let shard = name
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
        .unwrap_or('_');
    players_dir.join(shard.to_string()).join(name).join(format!("{name}.json"))
}

/// Creates a new account file. Fails if one already exists for `name`
/// (case-sensitive, matching the on-disk path).
pub fn create_account(
    players_dir: &Path,
    name: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<PlayerAccount, AccountError> {
    if !name_valid(name) {
        return Err(AccountError::InvalidName);
    }
    if !password_valid(password) {
        return Err(AccountError::InvalidPassword);
    }
    let path = path_for(players_dir, name);
    if path.exists() {
        return Err(AccountError::AlreadyExists(name.to_string()));
    }

    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = hash_password(&salt, password);

    let account = PlayerAccount {
        version: CURRENT_ACCOUNT_VERSION,
        name: name.to_string(),
        password_hash: BASE64.encode(hash),
        salt: BASE64.encode(salt),
        created_at: now,
        last_login: None,
        wizard: false,
        state: StateStore::new(),
        last_location: None,
        inventory: Vec::new(),
        equipment: std::collections::BTreeMap::new(),
    };
    save_account(players_dir, &account)?;
    Ok(account)
}

pub fn save_account(players_dir: &Path, account: &PlayerAccount) -> Result<(), AccountError> {
    let path = path_for(players_dir, &account.name);
    let json = serde_json::to_vec_pretty(account)?;
    write_atomic(&path, &json)?;
    Ok(())
}

pub fn load_account(players_dir: &Path, name: &str) -> Result<Option<PlayerAccount>, AccountError> {
    let path = path_for(players_dir, name);
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

/// A fixed dummy salt+hash, used to give a nonexistent account the exact
/// same hashing work as a real one.
fn dummy_salt_and_hash() -> ([u8; SALT_LEN], [u8; 32]) {
    let salt = *b"jitrealm-no-acct";
    let hash = hash_password(&salt, "\u{0}jitrealm-dummy-password\u{0}");
    (salt, hash)
}

/// Validates credentials against a stored account. The credential check
/// takes time independent of whether the account file exists: this
/// always hashes the supplied password against *some* salt and compares
/// against *some* expected hash, whether or not `name` has an account.
pub fn validate_credentials(players_dir: &Path, name: &str, password: &str) -> bool {
    let (salt, expected) = match load_account(players_dir, name) {
        Ok(Some(account)) => match (BASE64.decode(&account.salt), BASE64.decode(&account.password_hash)) {
            (Ok(salt), Ok(hash)) => (salt, hash),
            _ => dummy_pair(),
        },
        _ => dummy_pair(),
    };
    let computed = hash_password(&salt, password);
    constant_time_eq(&computed, &expected)
}

fn dummy_pair() -> (Vec<u8>, Vec<u8>) {
    let (salt, hash) = dummy_salt_and_hash();
    (salt.to_vec(), hash.to_vec())
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
