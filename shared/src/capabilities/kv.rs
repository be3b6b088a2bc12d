use crux_kv::error::KeyValueError;
use crux_kv::KeyValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

/// What the shell answers for a get, set or delete: the stored bytes, or the
/// bytes that were replaced or removed.
pub type KvResult = Result<Option<Vec<u8>>, KeyValueError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey {
    namespace: KeyNamespace,
    key: String,
}

impl KvKey {
    pub fn new(namespace: KeyNamespace, key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self { namespace, key })
    }

    pub fn raw(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.key)
    }

    fn validate_key(key: &str) -> Result<(), KvError> {
        if key.trim().is_empty() {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(KvError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }

        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot contain path traversal sequences".to_string(),
            });
        }

        if key.chars().any(char::is_control) {
            return Err(KvError::InvalidKey {
                key: key.escape_default().to_string(),
                reason: "key contains control characters".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyNamespace {
    Session,
}

impl KeyNamespace {
    pub fn prefix(&self) -> &str {
        match self {
            KeyNamespace::Session => "session",
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },
}

/// `crux_kv` addressed through validated, namespaced keys.
pub trait NamespacedKv<Ev> {
    fn get_key<F>(&self, key: &KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + Sync + 'static;

    fn set_key<F>(&self, key: &KvKey, value: Vec<u8>, make_event: F) -> Result<(), KvError>
    where
        F: FnOnce(KvResult) -> Ev + Send + Sync + 'static;

    fn delete_key<F>(&self, key: &KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + Sync + 'static;
}

impl<Ev: 'static> NamespacedKv<Ev> for KeyValue<Ev> {
    fn get_key<F>(&self, key: &KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + Sync + 'static,
    {
        self.get(key.raw(), make_event);
    }

    fn set_key<F>(&self, key: &KvKey, value: Vec<u8>, make_event: F) -> Result<(), KvError>
    where
        F: FnOnce(KvResult) -> Ev + Send + Sync + 'static,
    {
        if value.len() > MAX_VALUE_SIZE {
            return Err(KvError::ValueTooLarge {
                size: value.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        self.set(key.raw(), value, make_event);
        Ok(())
    }

    fn delete_key<F>(&self, key: &KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + Sync + 'static,
    {
        self.delete(key.raw(), make_event);
    }
}
