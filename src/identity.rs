//! Player identity resolution
//!
//! A host may know who is playing (a username or handle). That identity is
//! optional: when it is missing or unusable the score is submitted under
//! [`ANONYMOUS`].

use rustrict::CensorStr;
use serde::Serialize;
use thiserror::Error;

use crate::constants::identity::{ANONYMOUS, MAX_LENGTH};

/// Source of the current player's identity
pub trait IdentityProvider {
    /// Username or handle of the current player, if known
    fn identity(&self) -> Option<String>;
}

/// Provider for hosts with no notion of identity
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn identity(&self) -> Option<String> {
        None
    }
}

impl IdentityProvider for Option<String> {
    fn identity(&self) -> Option<String> {
        self.clone()
    }
}

impl<F: Fn() -> Option<String>> IdentityProvider for F {
    fn identity(&self) -> Option<String> {
        self()
    }
}

/// Reasons an identity cannot be used as a player identifier
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The identity is empty or contains only whitespace
    #[error("identifier cannot be empty")]
    Empty,
    /// The identity contains inappropriate content
    #[error("identifier is inappropriate")]
    Sinful,
    /// The identity exceeds the maximum allowed length
    #[error("identifier is too long")]
    TooLong,
}

/// Cleans an identity into a player identifier
///
/// Surrounding whitespace and a leading `@` are removed.
///
/// # Errors
///
/// * `Error::Empty` - nothing is left after trimming
/// * `Error::TooLong` - more than 30 characters
/// * `Error::Sinful` - inappropriate content
pub fn sanitize(identity: &str) -> Result<String, Error> {
    let identity = rustrict::trim_whitespace(identity);
    let identity = identity.strip_prefix('@').unwrap_or(identity).trim();
    if identity.is_empty() {
        return Err(Error::Empty);
    }
    if identity.chars().count() > MAX_LENGTH {
        return Err(Error::TooLong);
    }
    if identity.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(identity.to_owned())
}

/// Resolves the identifier to submit a score under
///
/// Never fails: absent or unusable identities fall back to [`ANONYMOUS`].
pub fn resolve<I: IdentityProvider + ?Sized>(provider: &I) -> String {
    let Some(identity) = provider.identity() else {
        return ANONYMOUS.to_owned();
    };
    match sanitize(&identity) {
        Ok(identifier) => identifier,
        Err(Error::Empty) => ANONYMOUS.to_owned(),
        Err(e) => {
            log::warn!("host identity rejected ({e}), submitting as {ANONYMOUS}");
            ANONYMOUS.to_owned()
        }
    }
}
