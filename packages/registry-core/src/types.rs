use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Attribute keys: a leading letter, then word characters, `/`, `.` or `-`,
/// with an optional trailing `*` wildcard.
static ATTRIBUTE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][\w/.\-]{1,126}\*?$").expect("attribute key pattern is valid")
});

/// Reasons a provider record or one of its fields is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("owner must not be empty")]
    EmptyOwner,
    #[error("host uri must not be empty")]
    EmptyHostUri,
    #[error("host uri must use http or https: {uri}")]
    InvalidHostUri { uri: String },
    #[error("invalid attribute key: {key:?}")]
    InvalidAttributeKey { key: String },
    #[error("attribute {key:?} has an empty value")]
    EmptyAttributeValue { key: String },
    #[error("duplicate attribute key: {key}")]
    DuplicateAttribute { key: String },
}

/// Unique identity of a provider. Also the store key material.
///
/// Ordering is byte-wise on the underlying string, which is the same order
/// the store iterates in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Owner(String);

impl Owner {
    /// Wraps `owner`, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyOwner`] if `owner` is empty.
    pub fn new(owner: impl Into<String>) -> Result<Self, ValidationError> {
        let owner = owner.into();
        if owner.is_empty() {
            return Err(ValidationError::EmptyOwner);
        }
        Ok(Self(owner))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Owner {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single key/value capability advertised by a provider
/// (e.g. `region=us-west`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Checks the key against the attribute key pattern and that the value
    /// is non-empty.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !ATTRIBUTE_KEY.is_match(&self.key) {
            return Err(ValidationError::InvalidAttributeKey {
                key: self.key.clone(),
            });
        }
        if self.value.is_empty() {
            return Err(ValidationError::EmptyAttributeValue {
                key: self.key.clone(),
            });
        }
        Ok(())
    }
}

/// Optional contact details published alongside a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,
}

/// A registered compute provider.
///
/// Created exactly once per [`Owner`]; there is no update path, so a stored
/// record is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub owner: Owner,
    pub host_uri: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub info: ProviderInfo,
}

impl Provider {
    /// Validates every field of the record.
    ///
    /// Checks run in order: owner, host URI, each attribute, then attribute
    /// key uniqueness. The first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.owner.as_str().is_empty() {
            return Err(ValidationError::EmptyOwner);
        }

        if self.host_uri.is_empty() {
            return Err(ValidationError::EmptyHostUri);
        }
        if !(self.host_uri.starts_with("https://") || self.host_uri.starts_with("http://")) {
            return Err(ValidationError::InvalidHostUri {
                uri: self.host_uri.clone(),
            });
        }

        let mut seen = BTreeSet::new();
        for attr in &self.attributes {
            attr.validate()?;
            if !seen.insert(attr.key.as_str()) {
                return Err(ValidationError::DuplicateAttribute {
                    key: attr.key.clone(),
                });
            }
        }

        Ok(())
    }
}
