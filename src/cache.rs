//! Keyed stores of declared records
//!
//! A [`Cache`] holds records of exactly one declared [`Schema`], keyed by a string
//! (normally the entity id). Every write is checked against the bound schema: a record
//! built from any other schema, or an ad-hoc record, is rejected with
//! [`Error::TypeMismatch`] and the cache is left untouched.
//!
//! Caches are created empty when a client starts, bulk-filled from snapshots
//! (`rtm.start`, `channels.list`, ...) and patched one entry at a time from realtime
//! events. They never expire and never fetch on a miss.
//!
//! A cache may also keep a secondary index over one string field, so channel-like
//! entities can be found by name as well as by id:
//!
//! ```rust
//! use aioslack::{Cache, types::CHANNEL};
//! use serde_json::json;
//!
//! let mut channels = Cache::new(&CHANNEL)
//!     .with_source("channels.list")
//!     .with_secondary_index("name");
//!
//! let general = CHANNEL.build(json!({"id": "C1", "name": "general"}).as_object().unwrap());
//! channels.fill(vec![general]).unwrap();
//!
//! assert_eq!(channels.lookup("C1").unwrap().str("name"), Some("general"));
//! assert_eq!(channels.find_by_secondary("general").unwrap().str("id"), Some("C1"));
//! assert!(channels.lookup("C2").is_err());
//! ```

use crate::record::Record;
use crate::schema::Schema;
use crate::{Error, Result};
use std::collections::HashMap;
use std::collections::hash_map;

/// Field used by [`Cache::fill`] to key records.
pub const DEFAULT_KEY_FIELD: &str = "id";

/// Secondary value to the keys of every record carrying it, oldest write first.
#[derive(Debug, Clone)]
struct SecondaryIndex {
    field: String,
    keys: HashMap<String, Vec<String>>,
}

impl SecondaryIndex {
    fn insert(&mut self, key: &str, record: &Record) {
        if let Some(value) = record.str(&self.field) {
            let keys = self.keys.entry(value.to_string()).or_default();
            keys.retain(|k| k != key);
            keys.push(key.to_string());
        }
    }

    fn remove(&mut self, key: &str, record: &Record) {
        let Some(value) = record.str(&self.field) else {
            return;
        };
        if let Some(keys) = self.keys.get_mut(value) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                self.keys.remove(value);
            }
        }
    }

    /// The most recently written key still carrying `value`.
    fn get(&self, value: &str) -> Option<&String> {
        self.keys.get(value)?.last()
    }
}

/// A keyed store of records of one declared schema.
///
/// The cache is not internally synchronized. It has a single writer: whoever owns it
/// (normally the [`Slack`](crate::Slack) client draining the realtime stream).
#[derive(Debug, Clone)]
pub struct Cache {
    schema: &'static Schema,
    source: Option<String>,
    entries: HashMap<String, Record>,
    secondary: Option<SecondaryIndex>,
}

impl Cache {
    /// Create an empty cache bound to `schema`.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            source: None,
            entries: HashMap::new(),
            secondary: None,
        }
    }

    /// Label the endpoint this cache is populated from. Informational only.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Also index records by the string value of `field`.
    ///
    /// Records that lack the field, or hold a non-string value in it, are stored but
    /// not indexed. Existing entries are indexed immediately.
    pub fn with_secondary_index(mut self, field: impl Into<String>) -> Self {
        let mut index = SecondaryIndex {
            field: field.into(),
            keys: HashMap::new(),
        };
        for (key, record) in &self.entries {
            index.insert(key, record);
        }
        self.secondary = Some(index);
        self
    }

    /// The declared schema every entry belongs to.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// The endpoint label set by [`Cache::with_source`].
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Name of the secondary index field, if one is configured.
    pub fn secondary_field(&self) -> Option<&str> {
        self.secondary.as_ref().map(|index| index.field.as_str())
    }

    /// The record stored under `key`, if any. Never fails.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.entries.get(key)
    }

    /// The record stored under `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Record) -> &'a Record {
        self.entries.get(key).unwrap_or(default)
    }

    /// The record stored under `key`.
    ///
    /// A miss is an [`Error::NotFound`] naming the schema and the key. Nothing is
    /// fetched from the platform.
    pub fn lookup(&self, key: &str) -> Result<&Record> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::not_found(self.schema.name, key))
    }

    /// Whether an entry is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Store `record` under `key`, replacing any previous entry.
    ///
    /// Fails with [`Error::TypeMismatch`] when `record` was not built from this cache's
    /// schema. A failed write leaves the cache unchanged.
    pub fn set(&mut self, key: impl Into<String>, record: Record) -> Result<()> {
        let key = key.into();
        if !record.is_instance_of(self.schema) {
            return Err(Error::type_mismatch(key, self.schema.name));
        }
        self.insert_checked(key, record);
        Ok(())
    }

    fn insert_checked(&mut self, key: String, record: Record) {
        if let Some(index) = &mut self.secondary {
            if let Some(previous) = self.entries.get(&key) {
                index.remove(&key, previous);
            }
            index.insert(&key, &record);
        }
        self.entries.insert(key, record);
    }

    /// Remove and return the entry under `key`. Removing an absent key is not an error.
    pub fn delete(&mut self, key: &str) -> Option<Record> {
        let removed = self.entries.remove(key)?;
        if let Some(index) = &mut self.secondary {
            index.remove(key, &removed);
        }
        Some(removed)
    }

    /// Insert every record keyed by its `id` field. See [`Cache::fill_by`].
    pub fn fill<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Record>,
    {
        self.fill_by(records, DEFAULT_KEY_FIELD)
    }

    /// Insert every record keyed by the string value of its `key_field`.
    ///
    /// Filling is additive: existing entries with other keys are kept, entries with the
    /// same key are overwritten. Records are processed in order; if one fails, the
    /// records before it stay inserted and the rest are not consumed.
    ///
    /// Fails with [`Error::TypeMismatch`] for a record of another schema (naming its
    /// `key_field` value) and with [`Error::InvalidInput`] for a record whose
    /// `key_field` is missing, empty or not a string. Returns the number of records
    /// inserted.
    pub fn fill_by<I>(&mut self, records: I, key_field: &str) -> Result<usize>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut count = 0;
        for record in records {
            if !record.is_instance_of(self.schema) {
                let label = match record.str(key_field) {
                    Some(key) => key.to_string(),
                    None => record[key_field].to_json().to_string(),
                };
                return Err(Error::type_mismatch(label, self.schema.name));
            }

            let key = match record.str(key_field) {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => {
                    return Err(Error::invalid_input(format!(
                        "{} record has no string {} to key on",
                        self.schema.name, key_field
                    )));
                }
            };

            self.insert_checked(key, record);
            count += 1;
        }

        log::debug!("filled {} {} records", count, self.schema.name);
        Ok(count)
    }

    /// [`Cache::set`] for each `(key, record)` pair, in order. Stops at the first
    /// rejected record; earlier pairs stay stored.
    pub fn update<K, I>(&mut self, pairs: I) -> Result<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Record)>,
    {
        for (key, record) in pairs {
            self.set(key, record)?;
        }
        Ok(())
    }

    /// The record whose secondary field equals `value`.
    ///
    /// When several records share the value, the most recently written one wins; removing
    /// it falls back to the next most recent. Always `None` when no secondary index is
    /// configured.
    pub fn find_by_secondary(&self, value: &str) -> Option<&Record> {
        let key = self.secondary.as_ref()?.get(value)?;
        self.entries.get(key)
    }

    /// Whether any record's secondary field equals `value`.
    pub fn contains_secondary(&self, value: &str) -> bool {
        self.find_by_secondary(value).is_some()
    }

    /// Keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Records in arbitrary order.
    pub fn values(&self) -> impl Iterator<Item = &Record> {
        self.entries.values()
    }

    /// `(key, record)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.entries.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. The schema, source and secondary field are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(index) = &mut self.secondary {
            index.keys.clear();
        }
    }
}

impl<'a> IntoIterator for &'a Cache {
    type Item = (&'a String, &'a Record);
    type IntoIter = hash_map::Iter<'a, String, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use crate::types::{CHANNEL, GROUP, USER};
    use serde_json::{Value, json};

    fn channel(data: Value) -> Record {
        CHANNEL.build(data.as_object().unwrap())
    }

    fn names_cache() -> Cache {
        Cache::new(&CHANNEL).with_secondary_index("name")
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = Cache::new(&USER).with_source("users.info");
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.source(), Some("users.info"));
        assert!(std::ptr::eq(cache.schema(), &USER));
        assert_eq!(cache.secondary_field(), None);
    }

    #[test]
    fn test_set_and_get_round_trip() {
        let mut cache = Cache::new(&CHANNEL);
        let general = channel(json!({"id": "C1", "name": "general"}));

        cache.set("C1", general.clone()).unwrap();

        assert_eq!(cache.get("C1"), Some(&general));
        assert!(cache.contains("C1"));
        assert_eq!(cache.lookup("C1").unwrap(), &general);
    }

    #[test]
    fn test_set_overwrites() {
        let mut cache = Cache::new(&CHANNEL);
        cache.set("C1", channel(json!({"id": "C1", "name": "general"}))).unwrap();
        cache.set("C1", channel(json!({"id": "C1", "name": "lobby"}))).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("C1").unwrap().str("name"), Some("lobby"));
    }

    #[test]
    fn test_set_wrong_schema_does_not_mutate() {
        let mut cache = Cache::new(&CHANNEL);
        let group = GROUP.build(json!({"id": "G1", "name": "secret"}).as_object().unwrap());

        let err = cache.set("G1", group).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(err.to_string(), "G1 is not Channel");
        assert!(!cache.contains("G1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_wrong_schema_keeps_existing_entry() {
        let mut cache = Cache::new(&CHANNEL);
        let general = channel(json!({"id": "C1", "name": "general"}));
        cache.set("C1", general.clone()).unwrap();

        let adhoc = Record::new("Channel", [("id", Field::from(json!("C1")))]);
        assert!(cache.set("C1", adhoc).is_err());

        assert_eq!(cache.get("C1"), Some(&general));
    }

    #[test]
    fn test_lookup_miss_vs_get() {
        let cache = Cache::new(&USER);

        let err = cache.lookup("missing").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.to_string(), "User missing not in cache");

        assert!(cache.get("missing").is_none());

        let fallback = USER.default_record();
        assert_eq!(cache.get_or("missing", &fallback), &fallback);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut cache = Cache::new(&CHANNEL);
        cache.set("C1", channel(json!({"id": "C1"}))).unwrap();

        assert!(cache.delete("C1").is_some());
        assert!(cache.delete("C1").is_none());
        assert!(cache.delete("never-there").is_none());
        assert!(!cache.contains("C1"));
    }

    #[test]
    fn test_fill_is_additive() {
        let mut cache = Cache::new(&CHANNEL);
        cache.set("x", channel(json!({"id": "x", "name": "old"}))).unwrap();

        let count = cache.fill(vec![channel(json!({"id": "y", "name": "new"}))]).unwrap();

        assert_eq!(count, 1);
        assert!(cache.contains("x"));
        assert!(cache.contains("y"));
    }

    #[test]
    fn test_fill_overlapping_snapshots_overwrite() {
        let mut cache = Cache::new(&CHANNEL);
        cache
            .fill(vec![
                channel(json!({"id": "a", "name": "one"})),
                channel(json!({"id": "b", "name": "two"})),
            ])
            .unwrap();
        cache
            .fill(vec![channel(json!({"id": "b", "name": "deux"}))])
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lookup("a").unwrap().str("name"), Some("one"));
        assert_eq!(cache.lookup("b").unwrap().str("name"), Some("deux"));
    }

    #[test]
    fn test_fill_by_custom_key_field() {
        let mut cache = Cache::new(&CHANNEL);
        cache
            .fill_by(vec![channel(json!({"id": "C1", "name": "general"}))], "name")
            .unwrap();

        assert!(cache.contains("general"));
        assert!(!cache.contains("C1"));
    }

    #[test]
    fn test_fill_stops_at_type_mismatch() {
        let mut cache = Cache::new(&CHANNEL);
        let group = GROUP.build(json!({"id": "G1"}).as_object().unwrap());

        let err = cache
            .fill(vec![
                channel(json!({"id": "C1"})),
                group,
                channel(json!({"id": "C2"})),
            ])
            .unwrap_err();

        assert_eq!(err.to_string(), "G1 is not Channel");
        assert!(cache.contains("C1"));
        assert!(!cache.contains("G1"));
        assert!(!cache.contains("C2"));
    }

    #[test]
    fn test_fill_requires_string_key() {
        let mut cache = Cache::new(&CHANNEL);
        let numbered = channel(json!({"id": 7}));

        let err = cache.fill(vec![numbered]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(cache.is_empty());

        let err = cache
            .fill_by(vec![channel(json!({"id": "C1"}))], "missing_field")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_fill_rejects_payloads_without_id() {
        let mut cache = Cache::new(&CHANNEL);
        let unnamed = channel(json!({"name": "a"}));
        assert_eq!(unnamed.get("id"), Some(&Field::Json(Value::Null)));

        let err = cache
            .fill(vec![unnamed, channel(json!({"name": "b"}))])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(cache.is_empty());

        let err = cache.fill(vec![channel(json!({"id": ""}))]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!cache.contains(""));
    }

    #[test]
    fn test_update_pairs() {
        let mut cache = Cache::new(&CHANNEL);
        cache
            .update([
                ("C1", channel(json!({"id": "C1"}))),
                ("C2", channel(json!({"id": "C2"}))),
            ])
            .unwrap();

        let mut keys: Vec<_> = cache.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["C1", "C2"]);
    }

    #[test]
    fn test_secondary_index_follows_writes() {
        let mut cache = names_cache();
        cache
            .fill(vec![
                channel(json!({"id": "C1", "name": "general"})),
                channel(json!({"id": "C2", "name": "random"})),
            ])
            .unwrap();

        assert_eq!(cache.secondary_field(), Some("name"));
        assert_eq!(cache.find_by_secondary("general").unwrap().str("id"), Some("C1"));
        assert!(cache.contains_secondary("random"));

        // Rename
        cache.set("C1", channel(json!({"id": "C1", "name": "lobby"}))).unwrap();
        assert!(!cache.contains_secondary("general"));
        assert_eq!(cache.find_by_secondary("lobby").unwrap().str("id"), Some("C1"));

        cache.delete("C2");
        assert!(!cache.contains_secondary("random"));

        cache.clear();
        assert!(!cache.contains_secondary("lobby"));
        assert_eq!(cache.secondary_field(), Some("name"));
    }

    #[test]
    fn test_secondary_index_with_shared_values() {
        let mut cache = Cache::new(&USER).with_secondary_index("name");
        let user = |id: &str| USER.build(json!({"id": id, "name": "ann"}).as_object().unwrap());

        cache.set("U1", user("U1")).unwrap();
        cache.set("U2", user("U2")).unwrap();
        assert_eq!(cache.find_by_secondary("ann").unwrap().str("id"), Some("U2"));

        cache.delete("U2");
        assert_eq!(cache.find_by_secondary("ann").unwrap().str("id"), Some("U1"));

        // Rewriting U1 under the same name keeps it findable
        cache.set("U1", user("U1")).unwrap();
        assert_eq!(cache.find_by_secondary("ann").unwrap().str("id"), Some("U1"));

        cache.delete("U1");
        assert!(!cache.contains_secondary("ann"));
    }

    #[test]
    fn test_secondary_index_rename_keeps_other_holders() {
        let mut cache = names_cache();
        cache
            .fill(vec![
                channel(json!({"id": "C1", "name": "general"})),
                channel(json!({"id": "C2", "name": "general"})),
            ])
            .unwrap();

        cache.set("C2", channel(json!({"id": "C2", "name": "lobby"}))).unwrap();

        assert_eq!(cache.find_by_secondary("general").unwrap().str("id"), Some("C1"));
        assert_eq!(cache.find_by_secondary("lobby").unwrap().str("id"), Some("C2"));
    }

    #[test]
    fn test_secondary_index_skips_non_string_values() {
        let mut cache = names_cache();
        cache.set("C1", channel(json!({"id": "C1", "name": null}))).unwrap();

        assert!(cache.contains("C1"));
        assert!(!cache.contains_secondary("null"));
    }

    #[test]
    fn test_secondary_index_on_existing_entries() {
        let mut cache = Cache::new(&CHANNEL);
        cache.set("C1", channel(json!({"id": "C1", "name": "general"}))).unwrap();

        let cache = cache.with_secondary_index("name");
        assert!(cache.contains_secondary("general"));
    }

    #[test]
    fn test_no_secondary_index() {
        let mut cache = Cache::new(&CHANNEL);
        cache.set("C1", channel(json!({"id": "C1", "name": "general"}))).unwrap();
        assert!(cache.find_by_secondary("general").is_none());
    }

    #[test]
    fn test_iteration() {
        let mut cache = Cache::new(&CHANNEL);
        cache
            .fill(vec![channel(json!({"id": "a"})), channel(json!({"id": "b"}))])
            .unwrap();

        assert_eq!(cache.iter().count(), 2);
        assert_eq!(cache.values().count(), 2);

        let mut seen = Vec::new();
        for (key, record) in &cache {
            assert_eq!(record.str("id"), Some(key.as_str()));
            seen.push(key.clone());
        }
        seen.sort();
        assert_eq!(seen, vec!["a", "b"]);
    }
}
