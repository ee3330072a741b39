use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Identity that owns a settings document.
///
/// Authenticated callers own their settings by user ID; anonymous callers
/// by a hash of their session cookie, so the raw cookie is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    User(Uuid),
    Session(String),
}

impl Owner {
    pub fn from_session_secret(secret: &str) -> Self {
        Self::Session(hex::encode(Sha256::digest(secret.as_bytes())))
    }

    /// Unique storage key selecting this owner's document
    pub fn key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Session(id) => format!("session:{id}"),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::User(id) => Some(*id),
            Self::Session(_) => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(id) => Some(id),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
