//! # Pool Manifests
//!
//! Configuration for the string-keyed registries: which pools exist, how many
//! instances each starts with, and whether it may grow.
//!
//! The manifest is the *resolved* configuration. Hosts decide where it comes
//! from; this module only validates entries and parses the TOML shape:
//!
//! ```toml
//! [[pool]]
//! key = "spark"
//! quantity = 8
//! can_grow = true
//!
//! [pool.template]
//! # fields of the pooled type
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// One pool definition: key, template, initial size, growth permission.
///
/// The template is the prototype every instance of the pool is cloned from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolSpec<T> {
    /// Unique key identifying the pool (matched case-insensitively).
    pub key: String,
    /// Prototype the pool clones its instances from.
    pub template: T,
    /// Number of instances created when the pool is built.
    pub quantity: usize,
    /// Whether the pool may grow past its initial size on exhaustion.
    #[serde(default)]
    pub can_grow: bool,
}

/// A validated, ordered list of pool definitions.
///
/// Keys are unique case-insensitively; lookups are case-insensitive too, so
/// `"Cube"` and `"CUBE"` always resolve to the same entry.
#[derive(Clone, Debug)]
pub struct PoolManifest<T> {
    entries: Vec<PoolSpec<T>>,
}

impl<T> PoolManifest<T> {
    /// Validates a list of definitions into a manifest.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateKey`] if two entries share a key,
    /// compared case-insensitively. Last-write-wins would silently shadow an
    /// entry, so collisions are rejected outright.
    pub fn new(entries: Vec<PoolSpec<T>>) -> PoolResult<Self> {
        for (i, entry) in entries.iter().enumerate() {
            let clash = entries[..i]
                .iter()
                .any(|other| other.key.eq_ignore_ascii_case(&entry.key));
            if clash {
                return Err(PoolError::DuplicateKey(entry.key.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Finds the definition matching `key`, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&PoolSpec<T>> {
        self.entries
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(key))
    }

    /// Returns the definitions in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[PoolSpec<T>] {
        &self.entries
    }
}

impl<T: DeserializeOwned> PoolManifest<T> {
    /// Parses and validates a manifest from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ManifestParse`] on malformed TOML and
    /// [`PoolError::DuplicateKey`] on key collisions.
    pub fn from_toml_str(source: &str) -> PoolResult<Self> {
        #[derive(Deserialize)]
        #[serde(bound(deserialize = "T: DeserializeOwned"))]
        struct ManifestFile<T> {
            #[serde(default)]
            pool: Vec<PoolSpec<T>>,
        }

        let file: ManifestFile<T> = toml::from_str(source)?;
        Self::new(file.pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keys_rejected() {
        let entries = vec![
            PoolSpec {
                key: "Cube".to_string(),
                template: 0u32,
                quantity: 2,
                can_grow: false,
            },
            PoolSpec {
                key: "CUBE".to_string(),
                template: 1u32,
                quantity: 3,
                can_grow: true,
            },
        ];

        let err = PoolManifest::new(entries).unwrap_err();
        assert!(matches!(err, PoolError::DuplicateKey(key) if key == "CUBE"));
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let manifest = PoolManifest::new(vec![PoolSpec {
            key: "Cube".to_string(),
            template: 9u32,
            quantity: 1,
            can_grow: false,
        }])
        .unwrap();

        assert_eq!(manifest.find("cube").map(|s| s.template), Some(9));
        assert_eq!(manifest.find("CUBE").map(|s| s.template), Some(9));
        assert!(manifest.find("sphere").is_none());
    }

    #[test]
    fn test_from_toml_str() {
        let source = r#"
            [[pool]]
            key = "score"
            template = 0
            quantity = 4
            can_grow = true

            [[pool]]
            key = "combo"
            template = 100
            quantity = 2
        "#;

        let manifest: PoolManifest<i64> = PoolManifest::from_toml_str(source).unwrap();
        assert_eq!(manifest.entries().len(), 2);

        let score = manifest.find("SCORE").unwrap();
        assert_eq!(score.quantity, 4);
        assert!(score.can_grow);

        // can_grow defaults to off.
        let combo = manifest.find("combo").unwrap();
        assert!(!combo.can_grow);
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = PoolManifest::<i64>::from_toml_str("[[pool]\nkey = ").unwrap_err();
        assert!(matches!(err, PoolError::ManifestParse(_)));
    }
}
