use crate::models::{Account, SessionUser};
use crate::store::{Scope, Store, StoreError, keys};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Complete credentials required.")]
    MissingFields,
    #[error("Username already registered.")]
    DuplicateUsername,
    #[error("Phone already linked to an account.")]
    DuplicatePhone,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("No account found for this phone number.")]
    UnknownPhone,
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn load_registry(store: &Store) -> Result<Vec<Account>, StoreError> {
    Ok(store
        .get_json(Scope::Durable, keys::REGISTRY)?
        .unwrap_or_default())
}

fn save_registry(store: &Store, registry: &[Account]) -> Result<(), StoreError> {
    store.set_json(Scope::Durable, keys::REGISTRY, &registry)
}

/// Adds a new account. Username and phone must both be unique in the
/// registry; the two duplicate conditions are reported separately.
pub fn register(
    store: &Store,
    username: &str,
    passcode: &str,
    phone: &str,
) -> Result<(), AccountError> {
    if username.trim().is_empty() || passcode.trim().is_empty() || phone.trim().is_empty() {
        return Err(AccountError::MissingFields);
    }

    let mut registry = load_registry(store)?;
    if registry.iter().any(|a| a.username == username) {
        return Err(AccountError::DuplicateUsername);
    }
    if registry.iter().any(|a| a.phone == phone) {
        return Err(AccountError::DuplicatePhone);
    }

    registry.push(Account {
        username: username.to_string(),
        passcode: passcode.to_string(),
        phone: phone.to_string(),
    });
    save_registry(store, &registry)?;
    Ok(())
}

/// Exact credential match against the registry. On success the session
/// identity is persisted under the durable session key.
pub fn login(store: &Store, username: &str, passcode: &str) -> Result<SessionUser, AccountError> {
    let registry = load_registry(store)?;
    let account = registry
        .iter()
        .find(|a| a.username == username && a.passcode == passcode)
        .ok_or(AccountError::InvalidCredentials)?;

    let session = SessionUser {
        username: account.username.clone(),
        phone: account.phone.clone(),
    };
    store.set_json(Scope::Durable, keys::SESSION, &session)?;
    Ok(session)
}

/// Looks an account up by phone number for credential recovery.
pub fn recover(store: &Store, phone: &str) -> Result<Account, AccountError> {
    let registry = load_registry(store)?;
    registry
        .into_iter()
        .find(|a| a.phone == phone)
        .ok_or(AccountError::UnknownPhone)
}

pub fn current_session(store: &Store) -> Result<Option<SessionUser>, StoreError> {
    store.get_json(Scope::Durable, keys::SESSION)
}

/// Drops the session identity and any in-progress exam state.
pub fn logout(store: &Store) -> Result<(), StoreError> {
    store.remove(Scope::Durable, keys::SESSION)?;
    store.clear_scope(Scope::Session)
}
