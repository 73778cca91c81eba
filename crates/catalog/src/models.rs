//! Upstream catalog models and the projected output item.
//!
//! Upstream payloads carry many more attributes than listed here; serde
//! ignores unknown fields, so only the fields we act on are declared.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A published experience owned by a user.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Experience {
    /// Upstream identifier, used to list the experience's items.
    pub id: u64,
    /// Display name. Missing and `null` are both `None`.
    #[serde(default)]
    pub name: Option<String>,
}

impl Experience {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A paid entitlement item attached to an experience.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EntitlementItem {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// `None` when the item is not currently for sale. Integer or decimal,
    /// kept exactly as the upstream wrote it.
    #[serde(default)]
    pub price: Option<Number>,
}

/// Category tag carried by every output item.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemKind {
    EntitlementItem,
}

/// A priced item as returned to callers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricedItem {
    pub id: u64,
    pub name: Option<String>,
    pub price: Number,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl PricedItem {
    /// Project an entitlement item, dropping it when it has no price.
    pub fn from_item(item: EntitlementItem) -> Option<Self> {
        let price = item.price?;
        Some(Self {
            id: item.id,
            name: item.name,
            price,
            kind: ItemKind::EntitlementItem,
        })
    }

    /// Numeric value of the price, for ordering.
    pub fn price_value(&self) -> f64 {
        self.price.as_f64().unwrap_or(f64::NAN)
    }

    /// Ascending price order. Integers and decimals compare numerically.
    pub fn cmp_price(&self, other: &Self) -> Ordering {
        self.price_value().total_cmp(&other.price_value())
    }
}

/// One page of a cursor-paginated collection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page. Absent is treated as empty.
    pub data: Option<Vec<T>>,
    /// Continuation token. `None` or empty ends the walk.
    pub next_page_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Split the page into its items and the cursor for the next page.
    ///
    /// Empty cursors are falsy upstream and are normalized to `None`.
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        let cursor = self.next_page_cursor.filter(|c| !c.is_empty());
        (self.data.unwrap_or_default(), cursor)
    }
}
