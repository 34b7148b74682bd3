use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use estate::{
    db,
    models::listing::{ListingQuery, SortField, SortOrder},
    repositories::{SqliteListingRepository, SqliteUserRepository},
    services::{
        user_service::{CreateUserRequest, UserService},
        ListingService,
    },
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "estate-cli")]
#[command(about = "CLI tool for managing estate users and listings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Listing maintenance commands
    Listing {
        #[command(subcommand)]
        command: ListingCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Unique handle
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user and their listings
    Delete {
        /// Username of the user to delete
        #[arg(short, long)]
        username: String,
    },

    /// Set a new password for a user
    SetPassword {
        /// Username of the user
        #[arg(short, long)]
        username: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum ListingCommands {
    /// List the newest listings
    List {
        /// Only listings whose name contains this term
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of listings to display
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Delete a listing regardless of its owner
    Delete {
        /// Listing ID
        #[arg(short, long)]
        id: i64,
    },
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn password_or_prompt(password: Option<String>, prompt: &str) -> anyhow::Result<String> {
    if let Some(pw) = password {
        return Ok(pw);
    }

    let password = prompt_password(prompt)?;
    let confirm = prompt_password("Confirm password")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}

async fn find_user_id(user_service: &UserService, username: &str) -> anyhow::Result<i64> {
    user_service
        .find_user_by_username(username)
        .await?
        .map(|user| user.id)
        .with_context(|| format!("User '{}' not found", username))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let pool = db::create_pool().await.context("connecting to database")?;
    db::run_migrations(&pool).await?;

    let user_service = UserService::new(Arc::new(SqliteUserRepository::new(pool.clone())));
    let listing_service = ListingService::new(Arc::new(SqliteListingRepository::new(pool)));

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                username,
                email,
                password,
            } => {
                let password = password_or_prompt(password, "Password")?;
                let user = user_service
                    .create_user(CreateUserRequest {
                        username,
                        email,
                        password,
                    })
                    .await
                    .context("Failed to create user")?;

                println!("✅ User created successfully!");
                println!("  ID: {}", user.id);
                println!("  Username: {}", user.username);
                println!("  Email: {}", user.email.as_deref().unwrap_or("-"));
            }

            UserCommands::List { limit, offset } => {
                let users = user_service.list_users(Some(limit), Some(offset)).await?;
                if users.is_empty() {
                    println!("No users found.");
                } else {
                    println!(
                        "{:<5} {:<24} {:<36} {:<20}",
                        "ID", "Username", "Email", "Created"
                    );
                    println!("{}", "-".repeat(88));
                    for user in users {
                        println!(
                            "{:<5} {:<24} {:<36} {:<20}",
                            user.id,
                            user.username,
                            user.email.as_deref().unwrap_or("-"),
                            user.created_at
                        );
                    }
                }
            }

            UserCommands::Delete { username } => {
                let user_id = find_user_id(&user_service, &username).await?;
                user_service.delete_user(user_id).await?;
                println!("✅ User '{}' deleted successfully!", username);
            }

            UserCommands::SetPassword { username, password } => {
                let user_id = find_user_id(&user_service, &username).await?;
                let password = password_or_prompt(password, "New password")?;
                user_service
                    .set_password(user_id, &password)
                    .await
                    .context("Failed to update password")?;
                println!("✅ Password updated successfully for '{}'!", username);
            }
        },

        Commands::Listing { command } => match command {
            ListingCommands::List { search, limit } => {
                let query = ListingQuery {
                    search_term: search,
                    sort: SortField::CreatedAt,
                    order: SortOrder::Desc,
                    limit: Some(limit),
                    ..Default::default()
                };
                let listings = listing_service.search(&query).await?;
                if listings.is_empty() {
                    println!("No listings found.");
                } else {
                    println!(
                        "{:<5} {:<32} {:<6} {:>10} {:>10} {:<6}",
                        "ID", "Name", "Type", "Price", "Discount", "Owner"
                    );
                    println!("{}", "-".repeat(74));
                    for listing in listings {
                        println!(
                            "{:<5} {:<32} {:<6} {:>10} {:>10} {:<6}",
                            listing.id,
                            listing.name,
                            listing.listing_type.as_str(),
                            listing.regular_price,
                            listing.discount_price,
                            listing.user_ref
                        );
                    }
                }
            }

            ListingCommands::Delete { id } => {
                let listing = listing_service
                    .get_listing(id)
                    .await
                    .with_context(|| format!("Listing {} not found", id))?;
                listing_service
                    .delete_listing(listing.user_ref, listing.id)
                    .await?;
                println!("✅ Listing '{}' deleted successfully!", listing.name);
            }
        },
    }

    Ok(())
}
