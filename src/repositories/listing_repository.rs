use crate::models::listing::{Listing, ListingQuery, ListingRow, TypeFilter, UpsertListingRequest};
use crate::repositories::user_repository::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const LISTING_COLUMNS: &str = "id, name, description, address, regular_price, discount_price, \
     bathrooms, bedrooms, furnished, parking, listing_type, offer, image_urls, user_ref, \
     created_at, updated_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ListingRepository: Send + Sync {
    async fn create_listing(
        &self,
        user_ref: i64,
        request: &UpsertListingRequest,
    ) -> RepositoryResult<Listing>;
    async fn update_listing(
        &self,
        id: i64,
        request: &UpsertListingRequest,
    ) -> RepositoryResult<Listing>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Listing>>;
    async fn delete_listing(&self, id: i64) -> RepositoryResult<()>;
    async fn list_by_user(&self, user_ref: i64) -> RepositoryResult<Vec<Listing>>;
    async fn search(&self, query: &ListingQuery) -> RepositoryResult<Vec<Listing>>;
}

pub struct SqliteListingRepository {
    pool: SqlitePool,
}

impl SqliteListingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn encode_image_urls(urls: &[String]) -> RepositoryResult<String> {
    serde_json::to_string(urls).map_err(|e| RepositoryError::Corrupt(e.to_string()))
}

/// Makes `%`, `_` and `\` match literally inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn decode_rows(rows: Vec<ListingRow>) -> RepositoryResult<Vec<Listing>> {
    rows.into_iter()
        .map(|row| Listing::try_from(row).map_err(RepositoryError::Corrupt))
        .collect()
}

#[async_trait]
impl ListingRepository for SqliteListingRepository {
    async fn create_listing(
        &self,
        user_ref: i64,
        request: &UpsertListingRequest,
    ) -> RepositoryResult<Listing> {
        let image_urls = encode_image_urls(&request.image_urls)?;

        let result = sqlx::query(
            r#"
            INSERT INTO listings (
                name, description, address, regular_price, discount_price,
                bathrooms, bedrooms, furnished, parking, listing_type, offer,
                image_urls, user_ref
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.address)
        .bind(request.regular_price)
        .bind(request.discount_price)
        .bind(request.bathrooms)
        .bind(request.bedrooms)
        .bind(request.furnished)
        .bind(request.parking)
        .bind(request.listing_type.as_str())
        .bind(request.offer)
        .bind(image_urls)
        .bind(user_ref)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn update_listing(
        &self,
        id: i64,
        request: &UpsertListingRequest,
    ) -> RepositoryResult<Listing> {
        let image_urls = encode_image_urls(&request.image_urls)?;

        let result = sqlx::query(
            r#"
            UPDATE listings SET
                name = ?, description = ?, address = ?, regular_price = ?,
                discount_price = ?, bathrooms = ?, bedrooms = ?, furnished = ?,
                parking = ?, listing_type = ?, offer = ?, image_urls = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.address)
        .bind(request.regular_price)
        .bind(request.discount_price)
        .bind(request.bathrooms)
        .bind(request.bedrooms)
        .bind(request.furnished)
        .bind(request.parking)
        .bind(request.listing_type.as_str())
        .bind(request.offer)
        .bind(image_urls)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM listings WHERE id = ?",
            LISTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Listing::try_from(r).map_err(RepositoryError::Corrupt))
            .transpose()
    }

    async fn delete_listing(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_by_user(&self, user_ref: i64) -> RepositoryResult<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM listings WHERE user_ref = ? ORDER BY created_at DESC, id DESC",
            LISTING_COLUMNS
        ))
        .bind(user_ref)
        .fetch_all(&self.pool)
        .await?;

        decode_rows(rows)
    }

    async fn search(&self, query: &ListingQuery) -> RepositoryResult<Vec<Listing>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM listings WHERE 1 = 1", LISTING_COLUMNS));

        if let Some(term) = query.search_term.as_deref().map(str::trim) {
            if !term.is_empty() {
                builder
                    .push(" AND name LIKE '%' || ")
                    .push_bind(escape_like(term))
                    .push(" || '%' ESCAPE '\\'");
            }
        }

        match query.listing_type {
            TypeFilter::All => {}
            TypeFilter::Sale => {
                builder.push(" AND listing_type = 'sale'");
            }
            TypeFilter::Rent => {
                builder.push(" AND listing_type = 'rent'");
            }
        }

        if query.offer == Some(true) {
            builder.push(" AND offer = 1");
        }
        if query.parking == Some(true) {
            builder.push(" AND parking = 1");
        }
        if query.furnished == Some(true) {
            builder.push(" AND furnished = 1");
        }

        builder
            .push(" ORDER BY ")
            .push(query.sort.column())
            .push(" ")
            .push(query.order.keyword())
            .push(", id ")
            .push(query.order.keyword())
            .push(" LIMIT ")
            .push_bind(query.effective_limit())
            .push(" OFFSET ")
            .push_bind(query.effective_offset());

        let rows = builder
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await?;

        decode_rows(rows)
    }
}
