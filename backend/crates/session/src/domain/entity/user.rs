//! User Entity
//!
//! Read-only projection of a user, as supplied by the user directory.
//! Only the fields embedded in access tokens are carried.

use kernel::id::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: full_name.into(),
        }
    }
}
