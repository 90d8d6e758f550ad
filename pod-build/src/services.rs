use std::io;
use thiserror::Error;

use crate::models::HostUser;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("unknown user {0:?}")]
    NotFound(String),
    #[error("user database error: {0}")]
    Backend(String),
    #[error("could not read user database: {0}")]
    Io(#[from] io::Error),
}

/// Looks up a user by name or numeric id in some identity database.
///
/// Any `Fn(&str) -> Result<HostUser, LookupError>` is a lookup, which is how
/// tests swap in fixed answers.
pub trait UserLookup {
    fn lookup(&self, name: &str) -> Result<HostUser, LookupError>;
}

impl<F> UserLookup for F
where
    F: Fn(&str) -> Result<HostUser, LookupError>,
{
    fn lookup(&self, name: &str) -> Result<HostUser, LookupError> {
        self(name)
    }
}
