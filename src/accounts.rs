//! Registration and login against the credential registry.
//!
//! Passwords are compared and stored as plain text so existing `users.json`
//! files keep working.

use crate::credentials::{UserRecord, Users};
use crate::error::InputError;

/// Add a new user to `users`. The caller is responsible for persisting.
pub fn register(users: &mut Users, username: &str, password: &str) -> Result<(), InputError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(InputError::new(
            "Please enter both a username and a password.",
        ));
    }
    if users.contains_key(username) {
        return Err(InputError::new("Username already exists."));
    }
    users.insert(
        username.to_string(),
        UserRecord {
            password: password.to_string(),
        },
    );
    Ok(())
}

pub fn authenticate(users: &Users, username: &str, password: &str) -> bool {
    users
        .get(username.trim())
        .is_some_and(|record| record.password == password)
}
