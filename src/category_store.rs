// 🏷️ Category Store - category name → keywords, persisted after every change
//
// Categories keep their insertion order. That order is what decides which
// category owns a keyword registered under more than one of them.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};
use crate::store::{MemoryBackend, StoreBackend};
use crate::transaction::{normalize_key, UNCATEGORIZED};

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,

    /// Keywords as entered (trimmed, case preserved)
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category {
            name: name.into(),
            keywords: Vec::new(),
        }
    }

    /// Case-insensitive, whitespace-trimmed membership
    pub fn has_keyword(&self, keyword: &str) -> bool {
        let key = normalize_key(keyword);
        self.keywords.iter().any(|k| normalize_key(k) == key)
    }

    pub fn is_uncategorized(&self) -> bool {
        self.name == UNCATEGORIZED
    }
}

// ============================================================================
// CATEGORY MAP (persisted form)
// ============================================================================

/// Ordered mapping serialized as a JSON object `{"name": ["kw", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap(pub Vec<Category>);

impl CategoryMap {
    /// The initial store: only the fallback bucket
    pub fn initial() -> Self {
        CategoryMap(vec![Category::new(UNCATEGORIZED)])
    }

    fn ensure_uncategorized(&mut self) {
        if !self.0.iter().any(Category::is_uncategorized) {
            self.0.insert(0, Category::new(UNCATEGORIZED));
        }
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to list of keywords")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut categories: Vec<Category> = Vec::new();
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    // Repeated key: later value wins, first position is kept
                    match categories.iter_mut().find(|c| c.name == name) {
                        Some(existing) => existing.keywords = keywords,
                        None => categories.push(Category { name, keywords }),
                    }
                }
                Ok(CategoryMap(categories))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

// ============================================================================
// CATEGORY STORE
// ============================================================================

/// The live category store bound to the backend it persists to.
pub struct CategoryStore {
    categories: Vec<Category>,
    backend: Box<dyn StoreBackend>,
}

impl fmt::Debug for CategoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryStore")
            .field("categories", &self.categories)
            .field("backend", &self.backend.describe())
            .finish()
    }
}

impl CategoryStore {
    /// Read the persisted mapping, or start with `{"Uncategorized": []}`.
    pub fn load(backend: impl StoreBackend + 'static) -> Result<Self> {
        let backend: Box<dyn StoreBackend> = Box::new(backend);

        let mut map = match backend.load()? {
            Some(blob) => serde_json::from_str::<CategoryMap>(&blob)?,
            None => {
                tracing::info!("No category store at {}, starting fresh", backend.describe());
                CategoryMap::initial()
            }
        };
        map.ensure_uncategorized();

        tracing::info!(
            "Loaded {} categories from {}",
            map.0.len(),
            backend.describe()
        );

        Ok(CategoryStore {
            categories: map.0,
            backend,
        })
    }

    /// Fresh store backed by memory only
    pub fn in_memory() -> Self {
        CategoryStore {
            categories: CategoryMap::initial().0,
            backend: Box::new(MemoryBackend::new()),
        }
    }

    /// Persist the full mapping, overwriting prior state.
    pub fn save(&self) -> Result<()> {
        let blob = serde_json::to_string_pretty(&self.to_map()).map_err(Error::StoreEncode)?;
        self.backend.save(&blob)?;
        tracing::debug!("Saved {} categories to {}", self.categories.len(), self.backend.describe());
        Ok(())
    }

    /// Add an empty category. Returns whether it was created.
    pub fn create_category(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return Ok(false);
        }

        self.categories.push(Category::new(name));
        self.save()?;

        tracing::debug!("Created category {name:?}");
        Ok(true)
    }

    /// Append `keyword` under `category` unless already there.
    ///
    /// Returns `Ok(false)` without touching anything when the keyword is blank,
    /// already present, or the category does not exist.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(false);
        }

        let Some(entry) = self.categories.iter_mut().find(|c| c.name == category) else {
            return Ok(false);
        };
        if entry.has_keyword(keyword) {
            return Ok(false);
        }

        entry.keywords.push(keyword.to_string());
        self.save()?;

        tracing::debug!("Added keyword {keyword:?} to {category:?}");
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// All categories in insertion order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category names in insertion order (for selection controls)
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// First category (in store order) holding `keyword`, if any.
    pub fn keyword_owner(&self, keyword: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.has_keyword(keyword))
            .map(|c| c.name.as_str())
    }

    pub fn to_map(&self) -> CategoryMap {
        CategoryMap(self.categories.clone())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_persisted_data() {
        let store = CategoryStore::load(MemoryBackend::new()).unwrap();
        assert_eq!(store.names(), vec![UNCATEGORIZED.to_string()]);
        assert!(store.category(UNCATEGORIZED).unwrap().keywords.is_empty());
    }

    #[test]
    fn test_load_preserves_order() {
        let backend = MemoryBackend::with_blob(
            r#"{"Uncategorized": [], "Travel": ["uber"], "Food": ["starbucks", "Cafe"]}"#,
        );
        let store = CategoryStore::load(backend).unwrap();

        assert_eq!(store.names(), vec!["Uncategorized", "Travel", "Food"]);
        assert_eq!(store.category("Food").unwrap().keywords, vec!["starbucks", "Cafe"]);
    }

    #[test]
    fn test_load_inserts_missing_uncategorized() {
        let backend = MemoryBackend::with_blob(r#"{"Food": ["starbucks"]}"#);
        let store = CategoryStore::load(backend).unwrap();
        assert_eq!(store.names(), vec!["Uncategorized", "Food"]);
    }

    #[test]
    fn test_load_rejects_malformed_blob() {
        let backend = MemoryBackend::with_blob(r#"{"Food": "starbucks"}"#);
        assert!(CategoryStore::load(backend).is_err());
    }

    #[test]
    fn test_create_category_is_idempotent() {
        let backend = MemoryBackend::new();
        let mut store = CategoryStore::load(backend.clone()).unwrap();

        assert!(store.create_category("Food").unwrap());
        assert!(!store.create_category("Food").unwrap());
        assert_eq!(store.names().iter().filter(|n| *n == "Food").count(), 1);

        let reloaded = CategoryStore::load(backend).unwrap();
        assert_eq!(reloaded.names(), vec!["Uncategorized", "Food"]);
    }

    #[test]
    fn test_create_category_rejects_blank_names() {
        let backend = MemoryBackend::new();
        let mut store = CategoryStore::load(backend.clone()).unwrap();

        assert!(!store.create_category("   ").unwrap());
        assert_eq!(backend.contents(), None, "nothing should be persisted");
    }

    #[test]
    fn test_add_keyword() {
        let backend = MemoryBackend::new();
        let mut store = CategoryStore::load(backend.clone()).unwrap();
        store.create_category("Food").unwrap();

        assert!(store.add_keyword("Food", "  Starbucks ").unwrap());
        assert!(!store.add_keyword("Food", "STARBUCKS").unwrap());
        assert!(!store.add_keyword("Food", "   ").unwrap());
        assert_eq!(store.category("Food").unwrap().keywords, vec!["Starbucks"]);

        let reloaded = CategoryStore::load(backend).unwrap();
        assert_eq!(reloaded.category("Food").unwrap().keywords, vec!["Starbucks"]);
    }

    #[test]
    fn test_add_keyword_to_unknown_category_is_silent() {
        let backend = MemoryBackend::new();
        let mut store = CategoryStore::load(backend.clone()).unwrap();

        assert!(!store.add_keyword("Food", "starbucks").unwrap());
        assert!(!store.contains("Food"));
        assert_eq!(backend.contents(), None);
    }

    #[test]
    fn test_keyword_owner_is_first_in_order() {
        let mut store = CategoryStore::in_memory();
        store.create_category("Entertainment").unwrap();
        store.create_category("Subscriptions").unwrap();
        store.add_keyword("Subscriptions", "netflix").unwrap();
        store.add_keyword("Entertainment", "Netflix").unwrap();

        assert_eq!(store.keyword_owner(" NETFLIX "), Some("Entertainment"));
        assert_eq!(store.keyword_owner("hulu"), None);
    }

    #[test]
    fn test_map_serializes_in_order() {
        let mut store = CategoryStore::in_memory();
        store.create_category("Zoo").unwrap();
        store.create_category("Art").unwrap();

        let json = serde_json::to_string(&store.to_map()).unwrap();
        assert_eq!(json, r#"{"Uncategorized":[],"Zoo":[],"Art":[]}"#);
    }
}
