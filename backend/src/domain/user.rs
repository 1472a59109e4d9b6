//! User identity model.
//!
//! A user owns rooms, which own things. The password is held as an opaque
//! credential digest that never leaves the domain; serialising a [`User`]
//! is deliberately not supported, adapters build their own response bodies
//! from the accessors.

use std::fmt;

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Maximum length for a user's display name.
pub const USER_NAME_MAX: usize = 30;
/// Maximum length accepted for an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong { max: usize },
    InvalidEmail,
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw).map(Self)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name shown on a user's profile.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_NAME_MAX });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique email address identifying an account.
///
/// Validation is intentionally shallow: one `@`, non-empty local and domain
/// parts, no whitespace. Anything stricter belongs to a mail provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.len() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(UserValidationError::InvalidEmail),
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque credential digest.
///
/// The raw password is salted and hashed on construction; the stored form
/// is `salt$digest`, so identical passwords never share a digest. The
/// type intentionally has no `Display` or serde implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Digest a raw password under a fresh random salt.
    pub fn from_password(raw: &str) -> Result<Self, UserValidationError> {
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest_with(&salt, raw);
        Ok(Self(format!("{salt}${digest}")))
    }

    /// Rehydrate a digest previously produced by [`Self::from_password`].
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Check a raw password against this digest.
    pub fn matches(&self, raw: &str) -> bool {
        match self.0.split_once('$') {
            Some((salt, digest)) => digest == Self::digest_with(salt, raw),
            None => false,
        }
    }

    /// The stored `salt$digest` form, for the persistence layer.
    pub fn as_stored(&self) -> &str {
        self.0.as_str()
    }

    fn digest_with(salt: &str, raw: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(raw.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Account identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    password: PasswordDigest,
}

impl User {
    /// Rehydrate a user from validated components.
    pub fn new(id: UserId, name: UserName, email: EmailAddress, password: PasswordDigest) -> Self {
        Self {
            id,
            name,
            email,
            password,
        }
    }

    /// Build a brand-new user with a fresh identifier.
    pub fn create(name: UserName, email: EmailAddress, password: PasswordDigest) -> Self {
        Self::new(UserId::random(), name, email, password)
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Opaque credential digest.
    pub fn password(&self) -> &PasswordDigest {
        &self.password
    }
}
