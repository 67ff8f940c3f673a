//! The adoptable-item catalog.
//!
//! Catalog contents are fixed at load time and never mutated afterwards.
//! Item ids double as indices into the contract's ownership table, so a
//! valid catalog covers ids `0..len` exactly and its size defines the table
//! shape the reconciler expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Catalog item identity; also the contract's table index.
pub type ItemId = u32;

/// Immutable identity and display metadata for one adoptable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
  pub id:           ItemId,
  pub name:         String,
  pub breed:        String,
  pub age_band:     String,
  pub location_tag: String,
  pub image_ref:    String,
}

/// A validated, id-ordered collection of catalog items.
#[derive(Debug, Clone)]
pub struct Catalog {
  items: BTreeMap<ItemId, CatalogItem>,
}

impl Catalog {
  /// Build a catalog, rejecting duplicate ids and gaps in the id range.
  pub fn new(items: Vec<CatalogItem>) -> Result<Self> {
    let mut map = BTreeMap::new();
    for item in items {
      let id = item.id;
      if map.insert(id, item).is_some() {
        return Err(Error::InvalidCatalog(format!("duplicate item id {id}")));
      }
    }
    let contiguous = map.keys().copied().eq(0..map.len() as ItemId);
    if !contiguous {
      return Err(Error::InvalidCatalog(format!(
        "item ids must cover 0..{} exactly",
        map.len()
      )));
    }
    Ok(Self { items: map })
  }

  /// Parse the JSON catalog file format: a flat array of items.
  pub fn from_json(raw: &str) -> Result<Self> {
    let items: Vec<CatalogItem> = serde_json::from_str(raw)
      .map_err(|e| Error::InvalidCatalog(e.to_string()))?;
    Self::new(items)
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn contains(&self, id: ItemId) -> bool {
    self.items.contains_key(&id)
  }

  pub fn get(&self, id: ItemId) -> Option<&CatalogItem> {
    self.items.get(&id)
  }

  /// Items in ascending id order.
  pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
    self.items.values()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: ItemId, name: &str) -> CatalogItem {
    CatalogItem {
      id,
      name: name.to_string(),
      breed: "mixed".to_string(),
      age_band: "adult".to_string(),
      location_tag: "north-shelter".to_string(),
      image_ref: format!("images/{name}.png"),
    }
  }

  #[test]
  fn builds_and_looks_up() {
    let catalog =
      Catalog::new(vec![item(0, "biscuit"), item(1, "maple")]).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.contains(1));
    assert!(!catalog.contains(2));
    assert_eq!(catalog.get(0).unwrap().name, "biscuit");
  }

  #[test]
  fn rejects_duplicate_ids() {
    let result = Catalog::new(vec![item(0, "biscuit"), item(0, "maple")]);
    assert!(matches!(result, Err(Error::InvalidCatalog(_))));
  }

  #[test]
  fn rejects_id_gaps() {
    let result = Catalog::new(vec![item(0, "biscuit"), item(2, "maple")]);
    assert!(matches!(result, Err(Error::InvalidCatalog(_))));
  }

  #[test]
  fn parses_json_array() {
    let raw = r#"[
      {
        "id": 0,
        "name": "Biscuit",
        "breed": "Beagle",
        "age_band": "young",
        "location_tag": "north-shelter",
        "image_ref": "images/biscuit.png"
      }
    ]"#;
    let catalog = Catalog::from_json(raw).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(0).unwrap().breed, "Beagle");
  }

  #[test]
  fn rejects_malformed_json() {
    assert!(matches!(
      Catalog::from_json("{not json"),
      Err(Error::InvalidCatalog(_))
    ));
  }

  #[test]
  fn items_iterate_in_id_order() {
    let catalog = Catalog::new(vec![
      item(1, "maple"),
      item(0, "biscuit"),
      item(2, "clover"),
    ])
    .unwrap();
    let names: Vec<&str> =
      catalog.items().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["biscuit", "maple", "clover"]);
  }
}
