//! Pageable collections
//!
//! Collection endpoints answer with the collection key wrapping either an
//! object of `items`, `paging` and `links`, or (for older endpoints) a bare
//! array of items. Every item carries its own envelope.

use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crate::envelope::{Envelope, Listed, Resource, deserialize_keyed};
use crate::format::string_or_number;

/// Paging block of a collection response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Paging {
    /// Offset of the current page. Numeric for most resources, an opaque
    /// token for some.
    #[serde(default, deserialize_with = "string_or_number")]
    pub offset: Option<String>,
    /// Number of items in the current page.
    #[serde(default)]
    pub count: Option<u64>,
    /// URI of the next page, absent on the last one.
    #[serde(default)]
    pub next: Option<String>,
}

/// Which page of a collection to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Request a page by offset and size.
    Offset {
        /// Offset of the first item, `None` for the first page.
        offset: Option<String>,
        /// Maximum number of items.
        limit: u32,
    },
    /// Follow a `next` link verbatim.
    Uri(String),
}

impl PageRequest {
    /// Page size used when none is given.
    pub const DEFAULT_LIMIT: u32 = 100;

    /// The first page with the given size.
    pub fn with_limit(limit: u32) -> Self {
        PageRequest::Offset {
            offset: None,
            limit,
        }
    }

    /// The page starting at `offset`.
    pub fn at(offset: impl Into<String>, limit: u32) -> Self {
        PageRequest::Offset {
            offset: Some(offset.into()),
            limit,
        }
    }

    /// Query parameters to append to the collection URI.
    ///
    /// Empty for [`PageRequest::Uri`], whose link already carries them.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            PageRequest::Offset { offset, limit } => {
                let mut query = Vec::with_capacity(2);
                if let Some(offset) = offset {
                    query.push(("offset", offset.clone()));
                }
                query.push(("limit", limit.to_string()));
                query
            }
            PageRequest::Uri(_) => Vec::new(),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::with_limit(Self::DEFAULT_LIMIT)
    }
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    paging: Paging,
    links: BTreeMap<String, String>,
}

impl<T> Page<T> {
    /// Build a page from its parts.
    pub fn new(items: Vec<T>, paging: Paging, links: BTreeMap<String, String>) -> Self {
        Self {
            items,
            paging,
            links,
        }
    }

    /// Items of this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, keeping only its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn paging(&self) -> &Paging {
        &self.paging
    }

    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.links
    }

    /// Request for the following page, if there is one.
    pub fn next_page(&self) -> Option<PageRequest> {
        self.paging.next.clone().map(PageRequest::Uri)
    }

    /// Whether this is the last page.
    pub fn is_last(&self) -> bool {
        self.paging.next.is_none()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The value under a collection key: a bare array of enveloped items, or an
/// object of `items`, `paging` and `links`.
struct CollectionVisitor<T>(PhantomData<T>);

impl<'de, T: Resource> Visitor<'de> for CollectionVisitor<T> {
    type Value = Page<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of items or an object with `items`")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Page<T>, A::Error> {
        let mut items = Vec::new();
        while let Some(Envelope(item)) = seq.next_element::<Envelope<T>>()? {
            items.push(item);
        }
        Ok(Page::new(items, Paging::default(), BTreeMap::new()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Page<T>, A::Error> {
        let mut items: Option<Vec<Envelope<T>>> = None;
        let mut paging = None;
        let mut links = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "items" => items = Some(map.next_value()?),
                "paging" => paging = Some(map.next_value()?),
                "links" => links = Some(map.next_value()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(Page::new(
            items
                .unwrap_or_default()
                .into_iter()
                .map(Envelope::into_inner)
                .collect(),
            paging.unwrap_or_default(),
            links.unwrap_or_default(),
        ))
    }
}

struct Collection<T>(Page<T>);

impl<'de, T: Resource> Deserialize<'de> for Collection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(CollectionVisitor(PhantomData))
            .map(Collection)
    }
}

impl<'de, T: Listed> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Collection(page) = deserialize_keyed(deserializer, T::COLLECTION)?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    impl Resource for Item {
        const ROOT: &'static str = "item";
    }

    impl Listed for Item {
        const COLLECTION: &'static str = "items";
    }

    #[test]
    fn test_paged_collection() {
        let page: Page<Item> = serde_json::from_value(json!({
            "items": {
                "items": [{"item": {"name": "a"}}, {"item": {"name": "b"}}],
                "paging": {"offset": 0, "count": 2, "next": "/gdc/items?offset=2"},
                "links": {"self": "/gdc/items"}
            }
        }))
        .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.items()[1].name, "b");
        assert_eq!(page.paging().offset.as_deref(), Some("0"));
        assert_eq!(page.links().get("self").map(String::as_str), Some("/gdc/items"));
        assert_eq!(
            page.next_page(),
            Some(PageRequest::Uri("/gdc/items?offset=2".to_string()))
        );
        assert!(!page.is_last());
    }

    #[test]
    fn test_plain_array_collection_is_single_page() {
        let page: Page<Item> = serde_json::from_value(json!({
            "items": [{"item": {"name": "a"}}]
        }))
        .unwrap();

        assert_eq!(page.len(), 1);
        assert!(page.is_last());
        assert!(page.next_page().is_none());
    }

    #[test]
    fn test_missing_items_is_empty_page() {
        let page: Page<Item> = serde_json::from_value(json!({
            "items": {"paging": {"offset": "abc", "count": 0}}
        }))
        .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.paging().offset.as_deref(), Some("abc"));
    }

    #[test]
    fn test_malformed_item_error_is_kept() {
        let err = serde_json::from_value::<Page<Item>>(json!({
            "items": {"items": [{"item": {"name": "a"}}, {"item": {"name": 5}}]}
        }))
        .unwrap_err()
        .to_string();

        assert!(err.contains("invalid type: integer `5`"), "{err}");

        let err = serde_json::from_value::<Page<Item>>(json!({
            "items": [{"item": {}}]
        }))
        .unwrap_err()
        .to_string();

        assert!(err.contains("missing field `name`"), "{err}");
    }

    #[test]
    fn test_non_collection_value_fails() {
        let err = serde_json::from_value::<Page<Item>>(json!({"items": "none"}))
            .unwrap_err()
            .to_string();

        assert!(err.contains("an array of items"), "{err}");
    }

    #[test]
    fn test_wrong_collection_key_fails() {
        assert!(serde_json::from_value::<Page<Item>>(json!({"things": []})).is_err());
    }

    #[test]
    fn test_page_request_query() {
        assert_eq!(
            PageRequest::default().query(),
            vec![("limit", "100".to_string())]
        );
        assert_eq!(
            PageRequest::at("20", 10).query(),
            vec![("offset", "20".to_string()), ("limit", "10".to_string())]
        );
        assert!(PageRequest::Uri("/x?offset=1".to_string()).query().is_empty());
    }
}
