use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_AVATAR: &str =
    "https://cdn.pixabay.com/photo/2015/10/05/22/37/blank-profile-picture-973460_960_720.png";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub avatar: String,
    /// Profile picture handed over by the identity provider.
    pub photo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// User as exposed over HTTP. Never carries the password credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub avatar: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            photo: user.photo,
            created_at: Some(user.created_at),
            updated_at: Some(user.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_drops_password_hash() {
        let user = User {
            id: 7,
            username: "jane".to_string(),
            email: Some("jane@example.com".to_string()),
            password_hash: "$argon2id$secret".to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            photo: None,
            created_at: "2025-01-01 00:00:00".to_string(),
            updated_at: "2025-01-01 00:00:00".to_string(),
        };

        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert_eq!(json["_id"], 7);
        assert_eq!(json["username"], "jane");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
