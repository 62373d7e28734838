//! Items

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The kind of product a line item books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Hotel stay
    Hotel,

    /// Flight ticket
    Flight,

    /// Guided tour
    Tour,

    /// Restaurant reservation
    Restaurant,

    /// Activity or experience
    Activity,

    /// Airport or city transfer
    Transfer,
}

impl ItemKind {
    /// All kinds, in display order.
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Hotel,
        ItemKind::Flight,
        ItemKind::Tour,
        ItemKind::Restaurant,
        ItemKind::Activity,
        ItemKind::Transfer,
    ];

    /// Lowercase name, as used in persisted state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Hotel => "hotel",
            ItemKind::Flight => "flight",
            ItemKind::Tour => "tour",
            ItemKind::Restaurant => "restaurant",
            ItemKind::Activity => "activity",
            ItemKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown item kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown item kind: {0}")]
pub struct ParseItemKindError(String);

impl FromStr for ItemKind {
    type Err = ParseItemKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();

        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseItemKindError(s.to_string()))
    }
}

/// Identity of a cart line: two items are the same line iff both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// External product identifier
    pub id: String,

    /// Product kind
    pub kind: ItemKind,
}

impl LineKey {
    /// Create a new line key.
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Booking specifics attached to a line (dates, guests and anything else the
/// booking flow wants to carry). The cart never interprets these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    /// Check-in date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,

    /// Check-out date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,

    /// Number of guests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,

    /// Number of rooms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,

    /// Any other fields, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One purchasable unit in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// External product identifier
    pub id: String,

    /// Product kind
    pub item_kind: ItemKind,

    /// Display title
    pub title: String,

    /// Display description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Price of a single unit
    pub unit_price: Decimal,

    /// Pre-discount reference price, for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_unit_price: Option<Decimal>,

    /// Currency code
    pub currency: String,

    /// Number of units, always at least one
    pub quantity: u32,

    /// Travel date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Location label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Duration label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Review rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    /// Provider or operator name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Booking specifics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_details: Option<BookingDetails>,

    /// Cancellation policy text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<String>,

    /// Whether the booking is refundable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_refundable: Option<bool>,
}

impl LineItem {
    /// Creates a new line item with a quantity of one and no optional metadata.
    pub fn new(
        id: impl Into<String>,
        item_kind: ItemKind,
        title: impl Into<String>,
        unit_price: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            item_kind,
            title: title.into(),
            description: None,
            image: None,
            unit_price,
            original_unit_price: None,
            currency: currency.into(),
            quantity: 1,
            date: None,
            location: None,
            duration: None,
            rating: None,
            provider: None,
            booking_details: None,
            cancellation_policy: None,
            is_refundable: None,
        }
    }

    /// Sets the quantity, clamped to at least one.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = clamp_quantity(quantity);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Sets the reference price shown struck through next to the unit price.
    #[must_use]
    pub fn with_original_unit_price(mut self, price: Decimal) -> Self {
        self.original_unit_price = Some(price);
        self
    }

    /// Sets the booking details.
    #[must_use]
    pub fn with_booking_details(mut self, details: BookingDetails) -> Self {
        self.booking_details = Some(details);
        self
    }

    /// Returns the identity key of this line.
    pub fn key(&self) -> LineKey {
        LineKey::new(self.id.clone(), self.item_kind)
    }

    /// Returns true if this line has the given identity.
    pub fn matches(&self, key: &LineKey) -> bool {
        self.item_kind == key.kind && self.id == key.id
    }

    /// Price of all units on this line.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// A partial set of fields to merge into an existing line.
///
/// A line's identity (`id`, `item_kind`) is fixed once it is in the cart, so
/// neither field can be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemPatch {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New image URL
    pub image: Option<String>,

    /// New unit price
    pub unit_price: Option<Decimal>,

    /// New reference price
    pub original_unit_price: Option<Decimal>,

    /// New quantity, clamped to at least one
    pub quantity: Option<i64>,

    /// New travel date
    pub date: Option<String>,

    /// New location
    pub location: Option<String>,

    /// New duration
    pub duration: Option<String>,

    /// New rating
    pub rating: Option<f32>,

    /// New provider
    pub provider: Option<String>,

    /// New booking details, replacing the old ones wholesale
    pub booking_details: Option<BookingDetails>,

    /// New cancellation policy
    pub cancellation_policy: Option<String>,

    /// New refundability flag
    pub is_refundable: Option<bool>,
}

impl LineItemPatch {
    /// Returns true if the patch sets no fields.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merges the set fields into `item`.
    pub fn apply_to(&self, item: &mut LineItem) {
        if let Some(title) = &self.title {
            item.title.clone_from(title);
        }

        if let Some(description) = &self.description {
            item.description = Some(description.clone());
        }

        if let Some(image) = &self.image {
            item.image = Some(image.clone());
        }

        if let Some(price) = self.unit_price {
            item.unit_price = clamp_price(price);
        }

        if let Some(price) = self.original_unit_price {
            item.original_unit_price = Some(price);
        }

        if let Some(quantity) = self.quantity {
            item.quantity = clamp_quantity(quantity);
        }

        if let Some(date) = &self.date {
            item.date = Some(date.clone());
        }

        if let Some(location) = &self.location {
            item.location = Some(location.clone());
        }

        if let Some(duration) = &self.duration {
            item.duration = Some(duration.clone());
        }

        if let Some(rating) = self.rating {
            item.rating = Some(rating);
        }

        if let Some(provider) = &self.provider {
            item.provider = Some(provider.clone());
        }

        if let Some(details) = &self.booking_details {
            item.booking_details = Some(details.clone());
        }

        if let Some(policy) = &self.cancellation_policy {
            item.cancellation_policy = Some(policy.clone());
        }

        if let Some(refundable) = self.is_refundable {
            item.is_refundable = Some(refundable);
        }
    }
}

/// Clamps a requested quantity to the `1..=u32::MAX` range.
pub fn clamp_quantity(requested: i64) -> u32 {
    u32::try_from(requested.max(1)).unwrap_or(u32::MAX)
}

/// Clamps a unit price to be non-negative.
pub fn clamp_price(price: Decimal) -> Decimal {
    price.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    fn hotel() -> LineItem {
        LineItem::new("h1", ItemKind::Hotel, "Bosphorus View", Decimal::new(100, 0), "TRY")
    }

    #[test]
    fn item_kind_parses_case_insensitively() -> TestResult {
        assert_eq!("Hotel".parse::<ItemKind>()?, ItemKind::Hotel);
        assert_eq!(" transfer ".parse::<ItemKind>()?, ItemKind::Transfer);
        assert!("cruise".parse::<ItemKind>().is_err());

        Ok(())
    }

    #[test]
    fn new_item_has_quantity_one() {
        assert_eq!(hotel().quantity, 1);
    }

    #[test]
    fn with_quantity_clamps_to_one() {
        assert_eq!(hotel().with_quantity(0).quantity, 1);
        assert_eq!(hotel().with_quantity(-4).quantity, 1);
        assert_eq!(hotel().with_quantity(3).quantity, 3);
    }

    #[test]
    fn clamp_quantity_saturates_at_u32_max() {
        assert_eq!(clamp_quantity(i64::MAX), u32::MAX);
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = hotel().with_quantity(3);

        assert_eq!(item.line_total(), Decimal::new(300, 0));
    }

    #[test]
    fn matches_requires_both_id_and_kind() {
        let item = hotel();

        assert!(item.matches(&LineKey::new("h1", ItemKind::Hotel)));
        assert!(!item.matches(&LineKey::new("h1", ItemKind::Tour)));
        assert!(!item.matches(&LineKey::new("h2", ItemKind::Hotel)));
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let mut item = hotel().with_description("Sea view");

        let patch = LineItemPatch {
            booking_details: Some(BookingDetails {
                guests: Some(2),
                ..BookingDetails::default()
            }),
            quantity: Some(0),
            ..LineItemPatch::default()
        };

        patch.apply_to(&mut item);

        assert_eq!(item.description.as_deref(), Some("Sea view"));
        assert_eq!(item.quantity, 1);
        assert_eq!(
            item.booking_details.and_then(|details| details.guests),
            Some(2)
        );
    }

    #[test]
    fn patch_clamps_negative_price() {
        let mut item = hotel();

        LineItemPatch {
            unit_price: Some(Decimal::new(-5, 0)),
            ..LineItemPatch::default()
        }
        .apply_to(&mut item);

        assert_eq!(item.unit_price, Decimal::ZERO);
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(LineItemPatch::default().is_empty());
        assert!(
            !LineItemPatch {
                title: Some("x".to_string()),
                ..LineItemPatch::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn item_serializes_with_camel_case_keys() -> TestResult {
        let json = serde_json::to_value(hotel())?;

        assert_eq!(json.get("itemKind"), Some(&Value::from("hotel")));
        assert!(json.get("unitPrice").is_some());
        assert!(json.get("description").is_none());

        Ok(())
    }

    #[test]
    fn booking_details_keep_unknown_fields() -> TestResult {
        let details: BookingDetails =
            serde_json::from_str(r#"{"checkIn":"2026-07-01","guests":2,"roomType":"suite"}"#)?;

        assert_eq!(details.check_in.as_deref(), Some("2026-07-01"));
        assert_eq!(details.extra.get("roomType"), Some(&Value::from("suite")));

        let json = serde_json::to_value(&details)?;
        assert_eq!(json.get("roomType"), Some(&Value::from("suite")));

        Ok(())
    }

    #[test]
    fn kind_display_is_lowercase() {
        assert_eq!(ItemKind::Restaurant.to_string(), "restaurant");
        assert_eq!(LineKey::new("r9", ItemKind::Restaurant).to_string(), "restaurant:r9");
    }
}
