use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Deserializes an HTML checkbox: present means checked unless it says otherwise.
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().is_some_and(is_checked))
}

/// Deserializes an optional form field, treating a blank value as absent.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

fn is_checked(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false" | "off")
}

/// Raw form body for screens whose field names are generated per row.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        FormFields { pairs }
    }

    /// First value submitted under `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
    }

    /// Every value submitted under `key`, e.g. the ticked ids of a bulk form.
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .collect()
    }

    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn checked(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_checked)
    }

    /// Parses a numeric field; `Ok(None)` when absent or blank.
    pub fn number<T: FromStr>(&self, key: &str) -> Result<Option<T>, String> {
        match self.get(key) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| format!("'{}' is not a valid number for {}.", raw, key)),
        }
    }

    /// Parses all values under `key` as ids, ignoring blanks.
    pub fn ids(&self, key: &str) -> Result<Vec<i64>, String> {
        let mut ids = Vec::new();
        for raw in self.all(key) {
            if raw.is_empty() {
                continue;
            }
            let id = raw
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not a valid identifier.", raw))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
