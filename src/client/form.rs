use crate::client::api::ApiClient;
use crate::models::listing::{
    check_listing_rules, Listing, ListingRuleError, ListingType, UpsertListingRequest, MAX_IMAGES,
};
use crate::services::image_host::{ImageFile, ImageHost};

/// Kind of the input element that produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    TextArea,
    Number,
    Checkbox,
    Radio,
}

/// A single change event coming from the listing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub id: String,
    pub value: String,
    pub kind: InputKind,
    pub checked: bool,
}

impl FieldChange {
    pub fn text(id: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            value: value.to_string(),
            kind: InputKind::Text,
            checked: false,
        }
    }

    pub fn number(id: &str, value: &str) -> Self {
        Self {
            kind: InputKind::Number,
            ..Self::text(id, value)
        }
    }

    pub fn checkbox(id: &str, checked: bool) -> Self {
        Self {
            id: id.to_string(),
            value: "on".to_string(),
            kind: InputKind::Checkbox,
            checked,
        }
    }

    pub fn radio(id: &str) -> Self {
        Self {
            id: id.to_string(),
            value: "on".to_string(),
            kind: InputKind::Radio,
            checked: true,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("{field} must be a whole number")]
    InvalidNumber { field: String },

    #[error("{field} expects a number input")]
    NotANumberInput { field: String },

    #[error("{0}")]
    Rule(#[from] ListingRuleError),

    #[error("You can only upload up to 6 images.")]
    ImageLimit,

    #[error("Image upload failed. Please try again.")]
    UploadFailed,

    #[error("{0}")]
    Submit(String),
}

/// State of the create/update listing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub address: String,
    pub listing_type: ListingType,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub regular_price: i64,
    pub discount_price: i64,
    pub offer: bool,
    pub parking: bool,
    pub furnished: bool,
    pub image_urls: Vec<String>,
}

impl Default for ListingForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            address: String::new(),
            listing_type: ListingType::Rent,
            bedrooms: 1,
            bathrooms: 1,
            regular_price: 50,
            discount_price: 0,
            offer: false,
            parking: false,
            furnished: false,
            image_urls: Vec::new(),
        }
    }
}

fn coerce_number(field: &str, change: &FieldChange) -> Result<i64, FormError> {
    if change.kind != InputKind::Number {
        return Err(FormError::NotANumberInput {
            field: field.to_string(),
        });
    }

    let raw = change.value.trim();
    if raw.is_empty() {
        return Ok(0);
    }

    raw.parse::<i64>().map_err(|_| FormError::InvalidNumber {
        field: field.to_string(),
    })
}

impl ListingForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an existing listing for editing.
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            name: listing.name.clone(),
            description: listing.description.clone(),
            address: listing.address.clone(),
            listing_type: listing.listing_type,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            regular_price: listing.regular_price,
            discount_price: listing.discount_price,
            offer: listing.offer,
            parking: listing.parking,
            furnished: listing.furnished,
            image_urls: listing.image_urls.clone(),
        }
    }

    /// Applies one change event to the draft.
    ///
    /// `sale`/`rent` select the listing type, `parking`/`furnished`/`offer`
    /// follow the checkbox state, numeric fields are coerced from their text
    /// value and text fields are stored as typed.
    pub fn apply(&mut self, change: &FieldChange) -> Result<(), FormError> {
        match change.id.as_str() {
            "sale" => self.listing_type = ListingType::Sale,
            "rent" => self.listing_type = ListingType::Rent,
            "parking" => self.parking = change.checked,
            "furnished" => self.furnished = change.checked,
            "offer" => self.offer = change.checked,
            "name" => self.name = change.value.clone(),
            "description" => self.description = change.value.clone(),
            "address" => self.address = change.value.clone(),
            "bedrooms" => self.bedrooms = coerce_number("bedrooms", change)?,
            "bathrooms" => self.bathrooms = coerce_number("bathrooms", change)?,
            "regularPrice" => self.regular_price = coerce_number("regularPrice", change)?,
            "discountPrice" => self.discount_price = coerce_number("discountPrice", change)?,
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Checks a selection of `selected` files before any upload starts.
    pub fn check_image_batch(&self, selected: usize) -> Result<(), FormError> {
        if selected == 0 || selected + self.image_urls.len() > MAX_IMAGES {
            return Err(FormError::ImageLimit);
        }
        Ok(())
    }

    pub fn add_image_urls(&mut self, urls: Vec<String>) {
        self.image_urls.extend(urls);
    }

    pub fn remove_image_url(&mut self, index: usize) -> Option<String> {
        (index < self.image_urls.len()).then(|| self.image_urls.remove(index))
    }

    /// Client-side checks run before the listing is sent.
    pub fn validate_for_submit(&self) -> Result<(), FormError> {
        check_listing_rules(
            self.regular_price,
            self.discount_price,
            self.image_urls.len(),
        )?;
        Ok(())
    }

    pub fn to_request(&self) -> UpsertListingRequest {
        UpsertListingRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            regular_price: self.regular_price,
            discount_price: self.discount_price,
            bathrooms: self.bathrooms,
            bedrooms: self.bedrooms,
            furnished: self.furnished,
            parking: self.parking,
            listing_type: self.listing_type,
            offer: self.offer,
            image_urls: self.image_urls.clone(),
        }
    }

    /// Uploads the selected files and appends their URLs to the draft.
    ///
    /// The batch is all-or-nothing: on any failure no URL is added.
    pub async fn upload_images(
        &mut self,
        host: &ImageHost,
        files: Vec<ImageFile>,
    ) -> Result<(), FormError> {
        self.check_image_batch(files.len())?;

        let urls = host.upload_all(files).await.map_err(|e| {
            tracing::warn!("Image upload batch failed: {}", e);
            FormError::UploadFailed
        })?;

        self.add_image_urls(urls);
        Ok(())
    }

    pub async fn submit(&self, api: &ApiClient) -> Result<Listing, FormError> {
        self.validate_for_submit()?;
        api.create_listing(&self.to_request())
            .await
            .map_err(|e| FormError::Submit(e.to_string()))
    }

    pub async fn submit_update(
        &self,
        api: &ApiClient,
        listing_id: i64,
    ) -> Result<Listing, FormError> {
        self.validate_for_submit()?;
        api.update_listing(listing_id, &self.to_request())
            .await
            .map_err(|e| FormError::Submit(e.to_string()))
    }
}
