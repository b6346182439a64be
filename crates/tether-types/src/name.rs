//! State name validation.
//!
//! A state name is the registry key of one slot and the prefix of its
//! notification event (`<name>_update`). Valid names:
//! - Must be non-empty
//! - Must consist only of ASCII letters, digits, `_`, `-`, `:` and `.`
//!
//! The character set keeps the derived event name usable as a frontend
//! event identifier and as a single URL path segment.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Suffix appended to a state name to form its notification event name.
pub const EVENT_SUFFIX: &str = "_update";

/// Validated key of a state slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateName(String);

impl StateName {
    /// Validate and wrap a state name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tether_types::StateName;
    ///
    /// assert!(StateName::new("settings").is_ok());
    /// assert!(StateName::new("editor:cursor").is_ok());
    /// assert!(StateName::new("").is_err());
    /// assert!(StateName::new("has space").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the notification event carrying this state's updates.
    pub fn event_name(&self) -> String {
        format!("{}{EVENT_SUFFIX}", self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn validate(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(TypeError::EmptyName);
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')))
    {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }
    Ok(())
}

impl TryFrom<String> for StateName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for StateName {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StateName> for String {
    fn from(name: StateName) -> Self {
        name.0
    }
}

impl Borrow<str> for StateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
