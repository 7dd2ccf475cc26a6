//! JSON records exchanged with the document store.
//!
//! Collections come back as objects keyed by server id; a `null` body means
//! the collection is empty.

use crate::money::Money;
use crate::types::{CartLine, Order, OrderId, Product, ProductDraft, ProductEdit, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Collection response: `(server id, record)` pairs in document order
///
/// `null` decodes as an empty collection. Entries are never re-sorted.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection<T>(Vec<(String, T)>);

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Collection<T> {
    /// Entries in the order the server sent them
    #[must_use]
    pub fn into_entries(self) -> Vec<(String, T)> {
        self.0
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Collection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(CollectionVisitor(PhantomData))
    }
}

struct CollectionVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for CollectionVisitor<T> {
    type Value = Collection<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by server id, or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Collection::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Collection::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, T>()? {
            entries.push(entry);
        }
        Ok(Collection(entries))
    }
}

/// Stored product
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Creating user
    pub owner_id: String,
    /// Display title
    pub title: String,
    /// Image location
    pub image_url: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: Money,
}

impl ProductRecord {
    /// Body of a create request
    #[must_use]
    pub fn from_draft(draft: &ProductDraft, owner: &UserId) -> Self {
        Self {
            owner_id: owner.as_str().to_string(),
            title: draft.title.clone(),
            image_url: draft.image_url.clone(),
            description: draft.description.clone(),
            price: draft.price,
        }
    }

    /// Domain product under its server id
    #[must_use]
    pub fn into_product(self, id: String) -> Product {
        Product {
            id: ProductId::new(id),
            owner_id: UserId::new(self.owner_id),
            title: self.title,
            image_url: self.image_url,
            description: self.description,
            price: self.price,
        }
    }
}

/// Partial update body; price is never written after creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch<'a> {
    /// New display title
    pub title: &'a str,
    /// New description
    pub description: &'a str,
    /// New image location
    pub image_url: &'a str,
}

impl<'a> From<&'a ProductEdit> for ProductPatch<'a> {
    fn from(edit: &'a ProductEdit) -> Self {
        Self {
            title: &edit.title,
            description: &edit.description,
            image_url: &edit.image_url,
        }
    }
}

/// Stored order line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRecord {
    /// Product the line is for
    pub product_id: String,
    /// Title at order time
    pub product_title: String,
    /// Unit price at order time
    pub product_price: Money,
    /// Number of units
    pub quantity: u32,
    /// Line amount
    pub sum: Money,
}

impl From<&CartLine> for OrderLineRecord {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.as_str().to_string(),
            product_title: line.title.clone(),
            product_price: line.unit_price,
            quantity: line.quantity,
            sum: line.sum,
        }
    }
}

impl From<OrderLineRecord> for CartLine {
    fn from(record: OrderLineRecord) -> Self {
        Self {
            product_id: ProductId::new(record.product_id),
            title: record.product_title,
            unit_price: record.product_price,
            quantity: record.quantity,
            sum: record.sum,
        }
    }
}

/// Stored order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Line snapshot
    #[serde(default)]
    pub cart_items: Vec<OrderLineRecord>,
    /// Amount charged
    pub total_amount: Money,
    /// Placement time
    pub date: DateTime<Utc>,
}

impl OrderRecord {
    /// Body of a place-order request
    #[must_use]
    pub fn new(lines: &[CartLine], total: Money, placed_at: DateTime<Utc>) -> Self {
        Self {
            cart_items: lines.iter().map(OrderLineRecord::from).collect(),
            total_amount: total,
            date: placed_at,
        }
    }

    /// Domain order under its server id
    #[must_use]
    pub fn into_order(self, id: String) -> Order {
        Order {
            id: OrderId::new(id),
            lines: self.cart_items.into_iter().map(CartLine::from).collect(),
            total: self.total_amount,
            placed_at: self.date,
        }
    }
}

/// Response to a create request
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Created {
    /// Server-assigned id
    pub name: String,
}

/// Flattens a product collection into catalog order
#[must_use]
pub fn products_from(collection: Collection<ProductRecord>) -> Vec<Product> {
    collection
        .into_entries()
        .into_iter()
        .map(|(id, record)| record.into_product(id))
        .collect()
}

/// Flattens an order collection
#[must_use]
pub fn orders_from(collection: Collection<OrderRecord>) -> Vec<Order> {
    collection
        .into_entries()
        .into_iter()
        .map(|(id, record)| record.into_order(id))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn product_collection_uses_keys_as_ids() {
        let body = json!({
            "-Nb2": {"ownerId": "u2", "title": "Lamp", "imageUrl": "https://img/l.png", "description": "Bright lamp", "price": 19.5},
            "-Na1": {"ownerId": "u1", "title": "Mug", "imageUrl": "https://img/m.png", "description": "Big mug", "price": 9.99},
        });

        let collection: Collection<ProductRecord> = serde_json::from_value(body).unwrap();
        let products = products_from(collection);

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, ProductId::new("-Na1"));
        assert_eq!(products[0].price, Money::from_cents(999));
        assert_eq!(products[1].owner_id, UserId::new("u2"));
    }

    #[test]
    fn collection_keeps_document_order() {
        let body = r#"{
            "o2": {"cartItems": [], "totalAmount": 2.0, "date": "2025-01-02T00:00:00Z"},
            "o1": {"cartItems": [], "totalAmount": 1.0, "date": "2025-01-01T00:00:00Z"}
        }"#;

        let orders = orders_from(serde_json::from_str(body).unwrap());

        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o2", "o1"]);
    }

    #[test]
    fn non_object_collection_is_rejected() {
        let result = serde_json::from_str::<Collection<OrderRecord>>("[1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn null_collection_is_empty() {
        let collection: Collection<OrderRecord> = serde_json::from_str("null").unwrap();
        assert!(orders_from(collection).is_empty());
    }

    #[test]
    fn order_body_uses_wire_names() {
        let line = CartLine {
            product_id: ProductId::new("p1"),
            title: "Widget".to_string(),
            unit_price: Money::from_cents(999),
            quantity: 2,
            sum: Money::from_cents(1998),
        };
        let placed_at = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let body = serde_json::to_value(OrderRecord::new(&[line], Money::from_cents(1998), placed_at)).unwrap();

        assert_eq!(
            body,
            json!({
                "cartItems": [{"productId": "p1", "productTitle": "Widget", "productPrice": 9.99, "quantity": 2, "sum": 19.98}],
                "totalAmount": 19.98,
                "date": "2025-01-01T00:00:00Z",
            })
        );
    }

    #[test]
    fn patch_never_carries_price() {
        let edit = ProductEdit {
            title: "Mug".to_string(),
            description: "Bigger mug".to_string(),
            image_url: "https://img/m2.png".to_string(),
        };

        let body = serde_json::to_value(ProductPatch::from(&edit)).unwrap();

        assert_eq!(
            body,
            json!({"title": "Mug", "description": "Bigger mug", "imageUrl": "https://img/m2.png"})
        );
    }
}
