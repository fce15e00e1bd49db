// 🧠 Learner - a manual re-categorization becomes a keyword
// The category must already exist; learning never creates one.

use crate::category_store::CategoryStore;
use crate::error::{Error, Result};

/// Record `details` as a keyword of `category`.
///
/// Returns `Ok(true)` when a keyword was added (and persisted), `Ok(false)`
/// when `details` is blank or already claimed by another matching category.
/// Keywords parked under "Uncategorized" never match, so they don't block.
pub fn learn(store: &mut CategoryStore, category: &str, details: &str) -> Result<bool> {
    if !store.contains(category) {
        return Err(Error::UnknownCategory(category.to_string()));
    }

    let details = details.trim();
    if details.is_empty() {
        return Ok(false);
    }

    let owner = store
        .categories()
        .iter()
        .filter(|c| !c.is_uncategorized())
        .find(|c| c.has_keyword(details))
        .map(|c| c.name.as_str());
    if let Some(owner) = owner {
        tracing::debug!("{details:?} already belongs to {owner:?}, not learning");
        return Ok(false);
    }

    let added = store.add_keyword(category, details)?;
    if added {
        tracing::debug!("Learned {details:?} → {category:?}");
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use crate::transaction::UNCATEGORIZED;

    #[test]
    fn test_learn_persists_once() {
        let backend = MemoryBackend::new();
        let mut store = CategoryStore::load(backend.clone()).unwrap();
        store.create_category("Food").unwrap();

        assert!(learn(&mut store, "Food", "Starbucks").unwrap());
        assert!(!learn(&mut store, "Food", "Starbucks").unwrap());

        let reloaded = CategoryStore::load(backend).unwrap();
        let food = reloaded.category("Food").unwrap();
        let hits = food
            .keywords
            .iter()
            .filter(|k| k.eq_ignore_ascii_case("starbucks"))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_learn_unknown_category_fails_loudly() {
        let mut store = CategoryStore::in_memory();
        let err = learn(&mut store, "Food", "Starbucks").unwrap_err();

        assert!(matches!(err, Error::UnknownCategory(ref c) if c == "Food"));
        assert!(!store.contains("Food"), "category must not be auto-created");
    }

    #[test]
    fn test_learn_skips_keyword_owned_elsewhere() {
        let mut store = CategoryStore::in_memory();
        store.create_category("Entertainment").unwrap();
        store.create_category("Subscriptions").unwrap();
        learn(&mut store, "Entertainment", "Netflix").unwrap();

        assert!(!learn(&mut store, "Subscriptions", " netflix ").unwrap());
        assert!(store.category("Subscriptions").unwrap().keywords.is_empty());
    }

    #[test]
    fn test_learn_ignores_uncategorized_keywords() {
        let mut store = CategoryStore::in_memory();
        store.create_category("Food").unwrap();
        store.add_keyword(UNCATEGORIZED, "Starbucks").unwrap();

        assert!(learn(&mut store, "Food", "starbucks").unwrap());
        assert_eq!(store.category("Food").unwrap().keywords, vec!["starbucks"]);
    }

    #[test]
    fn test_learn_blank_details() {
        let mut store = CategoryStore::in_memory();
        store.create_category("Food").unwrap();
        assert!(!learn(&mut store, "Food", "   ").unwrap());
    }
}
