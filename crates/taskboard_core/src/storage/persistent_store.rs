use crate::error::AppError;
use crate::storage::medium::KeyValueMedium;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A replacement value or a function of the previous value.
pub enum Update<'a, T> {
    Value(T),
    With(Box<dyn FnOnce(&T) -> T + 'a>),
}

impl<'a, T> Update<'a, T> {
    pub fn with<F>(update: F) -> Self
    where
        F: FnOnce(&T) -> T + 'a,
    {
        Self::With(Box::new(update))
    }

    fn resolve(self, current: &T) -> T {
        match self {
            Self::Value(value) => value,
            Self::With(update) => update(current),
        }
    }
}

/// A JSON value bound to one key of a [`KeyValueMedium`].
///
/// The in-memory value is authoritative: a failed write is logged and kept
/// in [`PersistentStore::last_persist_error`], never rolled back.
pub struct PersistentStore<T, M> {
    key: String,
    medium: M,
    value: T,
    last_persist_error: Option<AppError>,
}

impl<T, M> PersistentStore<T, M>
where
    T: Serialize + DeserializeOwned,
    M: KeyValueMedium,
{
    pub fn open<K: Into<String>>(medium: M, key: K, default: T) -> Self {
        let key = key.into();
        let value = read_or_default(&medium, &key, default);
        Self {
            key,
            medium,
            value,
            last_persist_error: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn last_persist_error(&self) -> Option<&AppError> {
        self.last_persist_error.as_ref()
    }

    pub fn set(&mut self, update: Update<'_, T>) -> &T {
        self.value = update.resolve(&self.value);
        self.last_persist_error = match self.persist() {
            Ok(()) => None,
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, "failed to persist stored value");
                Some(err)
            }
        };
        &self.value
    }

    fn persist(&self) -> Result<(), AppError> {
        let payload = serde_json::to_string(&self.value)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.medium.set_item(&self.key, &payload)?;
        tracing::debug!(key = %self.key, bytes = payload.len(), "stored value persisted");
        Ok(())
    }
}

fn read_or_default<T, M>(medium: &M, key: &str, default: T) -> T
where
    T: DeserializeOwned,
    M: KeyValueMedium,
{
    let payload = match medium.get_item(key) {
        Ok(Some(payload)) => payload,
        Ok(None) => return default,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read stored value, using default");
            return default;
        }
    };

    match serde_json::from_str(&payload) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "stored value is not valid JSON, using default");
            default
        }
    }
}
