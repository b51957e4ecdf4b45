use std::fmt::Display;

use crate::{
    errors::ConversionError,
    id::{ModuleId, UserId},
};

use super::PermissionSet;

/// Represents a username and is constrained to not be blank
#[derive(
    Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Username(String);

/// What the operator typed to look up a worker (usually their DNI)
///
/// Constrained to not be blank and to fit in a single path segment
#[derive(Debug, serde::Serialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserIdentifier(String);

#[derive(Default, Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl Username {
    pub const MAX_LENGTH: usize = 64;
}

impl UserIdentifier {
    pub const MAX_LENGTH: usize = 64;
}

/// Trims surrounding whitespace then checks the length limits
fn trimmed_within(value: &str, max: usize) -> Result<String, ConversionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConversionError::Empty);
    }
    if value.len() > max {
        return Err(ConversionError::MaxExceeded {
            max,
            actual: value.len(),
        });
    }
    Ok(value.to_string())
}

impl TryFrom<&str> for Username {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        trimmed_within(value, Self::MAX_LENGTH).map(Self)
    }
}

impl TryFrom<String> for Username {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl TryFrom<&str> for UserIdentifier {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        trimmed_within(value, Self::MAX_LENGTH).map(Self)
    }
}

impl From<&str> for DisplayName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for UserIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of the logged in user as handed out at login
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: UserId,
    #[serde(alias = "nombre", default)]
    pub display_name: DisplayName,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(alias = "modules", default)]
    pub assigned_module_ids: Vec<ModuleId>,
}

/// A module the looked up user already has access to
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserModule {
    pub module_id: ModuleId,
    #[serde(alias = "ModuleName", default)]
    pub module_name: String,
}

/// Result of looking up a worker on the permissions screen
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserLookup {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub office_name: Option<String>,
    #[serde(default)]
    pub modules: Vec<UserModule>,
}

impl UserLookup {
    /// The modules the server reports as already granted
    pub fn granted_modules(&self) -> PermissionSet {
        self.modules
            .iter()
            .map(|module| module.module_id.clone())
            .collect()
    }
}
