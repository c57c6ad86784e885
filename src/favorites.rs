//! Durable, deduplicated, insertion-ordered favorites keyed by item id.
//!
//! The ledger is loaded from the store once at construction, mutated in
//! memory, and re-serialized wholesale after every mutation. The in-memory
//! view is authoritative immediately; a failed persist is logged and the
//! mutation stands. There is no atomicity across a crash, so at most one
//! mutation can be lost - a stated limitation, not a bug.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::store::KeyValueStore;

/// Storage key used for the ledger unless the caller picks another.
pub const DEFAULT_FAVORITES_KEY: &str = "favorites";

/// A user-selected item. Identity is `id` alone: two items with the same id
/// are the same favorite regardless of their other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
  pub id: i64,
  #[serde(default)]
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  /// Display fields this crate does not model, preserved across the
  /// persist/reload round trip.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl FavoriteItem {
  pub fn new(id: i64, name: impl Into<String>) -> Self {
    Self {
      id,
      name: name.into(),
      category: None,
      extra: Map::new(),
    }
  }
}

/// Ordered, deduplicated favorites persisted through a [`KeyValueStore`].
///
/// The lock is held across each mutate-then-persist sequence, so
/// read-modify-write pairs cannot interleave within a process. Share one
/// ledger instance between consumers instead of creating one per screen.
pub struct FavoritesLedger<S: KeyValueStore> {
  store: Arc<S>,
  storage_key: String,
  items: Mutex<Vec<FavoriteItem>>,
}

impl<S: KeyValueStore> FavoritesLedger<S> {
  /// Load the ledger from `store`.
  ///
  /// An absent or unreadable value starts the ledger empty. Stored entries
  /// that do not carry an `id` are dropped silently (lossy recovery; the
  /// drop is logged at debug level).
  pub fn load(store: Arc<S>, storage_key: impl Into<String>) -> Self {
    let storage_key = storage_key.into();
    let items = Self::read_stored(&store, &storage_key);

    Self {
      store,
      storage_key,
      items: Mutex::new(items),
    }
  }

  fn read_stored(store: &S, storage_key: &str) -> Vec<FavoriteItem> {
    let json = match store.get(storage_key) {
      Ok(Some(json)) => json,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(key = storage_key, error = %e, "failed to load favorites");
        return Vec::new();
      }
    };

    let values: Vec<Value> = match serde_json::from_str(&json) {
      Ok(values) => values,
      Err(e) => {
        warn!(key = storage_key, error = %e, "stored favorites are corrupt, starting empty");
        return Vec::new();
      }
    };

    let total = values.len();
    let items: Vec<FavoriteItem> = values
      .into_iter()
      .filter_map(|value| serde_json::from_value(value).ok())
      .collect();

    if items.len() < total {
      debug!(
        key = storage_key,
        dropped = total - items.len(),
        "dropped stored favorites without an id"
      );
    }

    items
  }

  /// Current favorites, insertion-ordered.
  pub fn all(&self) -> Vec<FavoriteItem> {
    self.lock().clone()
  }

  pub fn contains(&self, id: i64) -> bool {
    self.lock().iter().any(|item| item.id == id)
  }

  /// Append `item` unless its id is already present. Idempotent.
  pub fn add(&self, item: FavoriteItem) {
    let mut items = self.lock();
    if items.iter().any(|existing| existing.id == item.id) {
      return;
    }
    items.push(item);
    self.persist(&items);
  }

  /// Drop any item with `id`. The ledger is re-persisted even when nothing
  /// matched, keeping the stored copy unconditionally in step.
  pub fn remove(&self, id: i64) {
    let mut items = self.lock();
    items.retain(|item| item.id != id);
    self.persist(&items);
  }

  /// Drop every item and persist the empty ledger.
  pub fn clear(&self) {
    let mut items = self.lock();
    items.clear();
    self.persist(&items);
  }

  /// Remove `item` if present, add it if absent. Returns whether the item
  /// is a favorite after the call, so callers can flip an indicator without
  /// a second lookup.
  pub fn toggle(&self, item: FavoriteItem) -> bool {
    let mut items = self.lock();
    if let Some(pos) = items.iter().position(|existing| existing.id == item.id) {
      items.remove(pos);
      self.persist(&items);
      false
    } else {
      items.push(item);
      self.persist(&items);
      true
    }
  }

  fn lock(&self) -> MutexGuard<'_, Vec<FavoriteItem>> {
    self.items.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn persist(&self, items: &[FavoriteItem]) {
    let json = match serde_json::to_string(items) {
      Ok(json) => json,
      Err(e) => {
        warn!(key = %self.storage_key, error = %e, "failed to serialize favorites");
        return;
      }
    };

    if let Err(e) = self.store.set(&self.storage_key, &json) {
      warn!(key = %self.storage_key, error = %e, "failed to persist favorites");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::StoreError;
  use crate::store::MemoryStore;

  fn fresh_ledger() -> (FavoritesLedger<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let ledger = FavoritesLedger::load(Arc::clone(&store), DEFAULT_FAVORITES_KEY);
    (ledger, store)
  }

  fn milk() -> FavoriteItem {
    FavoriteItem {
      id: 1,
      name: "Milk".to_string(),
      category: Some("Dairy".to_string()),
      extra: Map::new(),
    }
  }

  #[test]
  fn test_empty_store_loads_empty_ledger() {
    let (ledger, _store) = fresh_ledger();

    assert!(ledger.all().is_empty());
    assert!(!ledger.contains(1));
  }

  #[test]
  fn test_add_is_idempotent_by_id() {
    let (ledger, _store) = fresh_ledger();

    ledger.add(milk());
    ledger.add(FavoriteItem::new(1, "Milk (renamed)"));

    let items = ledger.all();
    assert_eq!(items.len(), 1);
    // The first add wins; the duplicate did not replace it.
    assert_eq!(items[0].name, "Milk");
  }

  #[test]
  fn test_toggle_is_self_inverse() {
    let (ledger, _store) = fresh_ledger();
    ledger.add(FavoriteItem::new(2, "Bread"));
    let before = ledger.all();

    assert!(ledger.toggle(milk()));
    assert!(ledger.contains(1));

    assert!(!ledger.toggle(milk()));
    assert_eq!(ledger.all(), before);
  }

  #[test]
  fn test_remove_persists_even_when_nothing_matched() {
    let (ledger, store) = fresh_ledger();

    ledger.remove(99);

    assert_eq!(
      store.get(DEFAULT_FAVORITES_KEY).expect("get"),
      Some("[]".to_string())
    );
  }

  #[test]
  fn test_clear_empties_and_persists() {
    let (ledger, store) = fresh_ledger();
    ledger.add(milk());
    ledger.add(FavoriteItem::new(2, "Bread"));

    ledger.clear();

    assert!(ledger.all().is_empty());
    assert_eq!(
      store.get(DEFAULT_FAVORITES_KEY).expect("get"),
      Some("[]".to_string())
    );

    // The cleared state survives a restart too.
    let reloaded = FavoritesLedger::load(store, DEFAULT_FAVORITES_KEY);
    assert!(reloaded.all().is_empty());
  }

  #[test]
  fn test_insertion_order_is_preserved() {
    let (ledger, _store) = fresh_ledger();

    ledger.add(FavoriteItem::new(3, "Eggs"));
    ledger.add(FavoriteItem::new(1, "Milk"));
    ledger.add(FavoriteItem::new(2, "Bread"));
    ledger.remove(1);

    let ids: Vec<i64> = ledger.all().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![3, 2]);
  }

  #[test]
  fn test_ledger_survives_restart() {
    let store = Arc::new(MemoryStore::new());

    let ledger = FavoritesLedger::load(Arc::clone(&store), DEFAULT_FAVORITES_KEY);
    ledger.add(milk());
    drop(ledger);

    // A fresh ledger over the same store simulates a process restart.
    let reloaded = FavoritesLedger::load(store, DEFAULT_FAVORITES_KEY);
    assert_eq!(reloaded.all(), vec![milk()]);
  }

  #[test]
  fn test_extra_display_fields_survive_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let ledger = FavoritesLedger::load(Arc::clone(&store), DEFAULT_FAVORITES_KEY);

    let mut item = FavoriteItem::new(5, "Dates");
    item
      .extra
      .insert("origin".to_string(), Value::String("Medina".to_string()));
    ledger.add(item.clone());

    let reloaded = FavoritesLedger::load(store, DEFAULT_FAVORITES_KEY);
    assert_eq!(reloaded.all(), vec![item]);
  }

  #[test]
  fn test_entries_without_id_are_dropped_on_load() {
    let store = Arc::new(MemoryStore::new());
    store
      .set(
        DEFAULT_FAVORITES_KEY,
        r#"[{"id":1,"name":"Milk"},{"name":"no id"},"not an object"]"#,
      )
      .expect("seed store");

    let ledger = FavoritesLedger::load(store, DEFAULT_FAVORITES_KEY);

    let items = ledger.all();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, 1);
  }

  #[test]
  fn test_corrupt_ledger_starts_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set(DEFAULT_FAVORITES_KEY, "{broken").expect("seed store");

    let ledger = FavoritesLedger::load(store, DEFAULT_FAVORITES_KEY);

    assert!(ledger.all().is_empty());
  }

  /// Store double whose writes fail, for the availability-over-consistency path.
  struct ReadOnlyStore;

  impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
      Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
      Err(StoreError::Backend("disk full".to_string()))
    }
  }

  #[test]
  fn test_persist_failure_does_not_roll_back_the_mutation() {
    let ledger = FavoritesLedger::load(Arc::new(ReadOnlyStore), DEFAULT_FAVORITES_KEY);

    assert!(ledger.toggle(milk()));

    // The in-memory view stays authoritative.
    assert!(ledger.contains(1));
  }
}
