pub mod test_helpers {
    use crate::models::listing::{ListingType, UpsertListingRequest};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Insert a user with an argon2-hashed password, returning its id
    pub async fn insert_test_user(
        pool: &SqlitePool,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let result =
            sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
                .bind(username)
                .bind(email)
                .bind(password_hash)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// A listing body that passes every validation rule
    pub fn valid_listing_request(name: &str) -> UpsertListingRequest {
        UpsertListingRequest {
            name: name.to_string(),
            description: format!("{} description", name),
            address: "12 High Street".to_string(),
            regular_price: 500,
            discount_price: 450,
            bathrooms: 1,
            bedrooms: 2,
            furnished: false,
            parking: true,
            listing_type: ListingType::Rent,
            offer: true,
            image_urls: vec![format!(
                "https://images.example/{}.jpg",
                name.replace(' ', "-")
            )],
        }
    }
}
