use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Upper bound on images attached to a single listing.
pub const MAX_IMAGES: usize = 6;

pub const DEFAULT_SEARCH_LIMIT: i64 = 9;
pub const MAX_SEARCH_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "sale",
            ListingType::Rent => "rent",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(ListingType::Sale),
            "rent" => Ok(ListingType::Rent),
            other => Err(format!("Unknown listing type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    pub regular_price: i64,
    pub discount_price: i64,
    pub bathrooms: i64,
    pub bedrooms: i64,
    pub furnished: bool,
    pub parking: bool,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub offer: bool,
    pub image_urls: Vec<String>,
    pub user_ref: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Row shape of the `listings` table; image URLs are kept as a JSON array.
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    pub regular_price: i64,
    pub discount_price: i64,
    pub bathrooms: i64,
    pub bedrooms: i64,
    pub furnished: bool,
    pub parking: bool,
    pub listing_type: String,
    pub offer: bool,
    pub image_urls: String,
    pub user_ref: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ListingRow> for Listing {
    type Error = String;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let image_urls: Vec<String> = serde_json::from_str(&row.image_urls)
            .map_err(|e| format!("Corrupt image_urls for listing {}: {}", row.id, e))?;

        Ok(Listing {
            id: row.id,
            name: row.name,
            description: row.description,
            address: row.address,
            regular_price: row.regular_price,
            discount_price: row.discount_price,
            bathrooms: row.bathrooms,
            bedrooms: row.bedrooms,
            furnished: row.furnished,
            parking: row.parking,
            listing_type: row.listing_type.parse()?,
            offer: row.offer,
            image_urls,
            user_ref: row.user_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Body of the create and update listing calls.
///
/// A `userRef` sent by the client is ignored; ownership always comes from the
/// authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertListingRequest {
    pub name: String,
    pub description: String,
    pub address: String,
    pub regular_price: i64,
    #[serde(default)]
    pub discount_price: i64,
    pub bathrooms: i64,
    pub bedrooms: i64,
    #[serde(default)]
    pub furnished: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    #[serde(default)]
    pub offer: bool,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingRuleError {
    #[error("At least one image is required.")]
    NoImages,
    #[error("You can only upload up to 6 images.")]
    TooManyImages,
    #[error("Discount price cannot exceed regular price.")]
    DiscountExceedsRegular,
}

/// Cross-field checks shared by the server and the form client.
pub fn check_listing_rules(
    regular_price: i64,
    discount_price: i64,
    image_count: usize,
) -> Result<(), ListingRuleError> {
    if image_count < 1 {
        return Err(ListingRuleError::NoImages);
    }
    if image_count > MAX_IMAGES {
        return Err(ListingRuleError::TooManyImages);
    }
    if regular_price < discount_price {
        return Err(ListingRuleError::DiscountExceedsRegular);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Sale,
    Rent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    #[serde(rename = "createdAt", alias = "created_at")]
    CreatedAt,
    #[serde(rename = "regularPrice", alias = "regular_price")]
    RegularPrice,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::RegularPrice => "regular_price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Search parameters accepted by `GET /api/listing/get`.
///
/// Feature flags only narrow the search when set to `true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(rename = "type", default)]
    pub listing_type: TypeFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
}

impl ListingQuery {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.start_index.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_reject_discount_above_regular() {
        assert_eq!(
            check_listing_rules(100, 150, 1),
            Err(ListingRuleError::DiscountExceedsRegular)
        );
        assert!(check_listing_rules(100, 100, 1).is_ok());
    }

    #[test]
    fn rules_bound_image_count() {
        assert_eq!(check_listing_rules(100, 0, 0), Err(ListingRuleError::NoImages));
        assert_eq!(
            check_listing_rules(100, 0, MAX_IMAGES + 1),
            Err(ListingRuleError::TooManyImages)
        );
        assert!(check_listing_rules(100, 0, MAX_IMAGES).is_ok());
    }

    #[test]
    fn request_reads_wire_field_names() {
        let body = serde_json::json!({
            "name": "Seaside flat",
            "description": "Two rooms with a view",
            "address": "1 Shore Road",
            "type": "sale",
            "bedrooms": 2,
            "bathrooms": 1,
            "regularPrice": 250000,
            "discountPrice": 240000,
            "offer": true,
            "parking": false,
            "furnished": true,
            "imageUrls": ["https://img.example/1.jpg"],
            "userRef": 42
        });

        let request: UpsertListingRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.listing_type, ListingType::Sale);
        assert_eq!(request.regular_price, 250000);
        assert_eq!(request.discount_price, 240000);
        assert_eq!(request.image_urls.len(), 1);
    }

    #[test]
    fn row_with_bad_type_is_rejected() {
        let row = ListingRow {
            id: 1,
            name: "n".into(),
            description: "d".into(),
            address: "a".into(),
            regular_price: 1,
            discount_price: 0,
            bathrooms: 1,
            bedrooms: 1,
            furnished: false,
            parking: false,
            listing_type: "lease".into(),
            offer: false,
            image_urls: "[]".into(),
            user_ref: 1,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(Listing::try_from(row).is_err());
    }

    #[test]
    fn query_limit_is_clamped() {
        let query = ListingQuery {
            limit: Some(500),
            start_index: Some(-3),
            ..Default::default()
        };
        assert_eq!(query.effective_limit(), MAX_SEARCH_LIMIT);
        assert_eq!(query.effective_offset(), 0);
        assert_eq!(ListingQuery::default().effective_limit(), DEFAULT_SEARCH_LIMIT);
    }
}
