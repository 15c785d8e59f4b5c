use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SELLER_LEVEL: &str = "Level 1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_seller: bool,
    pub seller_profile: Option<SellerProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub description: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: Option<Location>,
    pub profile_picture: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
    pub country: Option<String>,
    pub city: Option<String>,
}

/// The authenticated caller, as resolved from the bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

impl User {
    pub fn new(
        first_name: String,
        last_name: String,
        username: String,
        email: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            username,
            email,
            password_hash,
            is_seller: false,
            seller_profile: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }

    pub fn seller_level(&self) -> Option<&str> {
        if !self.is_seller {
            return None;
        }

        Some(
            self.seller_profile
                .as_ref()
                .and_then(|profile| profile.level.as_deref())
                .unwrap_or(DEFAULT_SELLER_LEVEL),
        )
    }

    /// Becoming a seller is a one-way switch; the level label survives profile edits.
    pub fn set_seller_profile(&mut self, mut profile: SellerProfile) {
        if profile.level.is_none() {
            profile.level = self
                .seller_profile
                .as_ref()
                .and_then(|current| current.level.clone())
                .or_else(|| Some(DEFAULT_SELLER_LEVEL.to_string()));
        }
        self.is_seller = true;
        self.seller_profile = Some(profile);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "Jane".to_string(),
            "Doe".to_string(),
            "jane".to_string(),
            "jane@example.com".to_string(),
            "hash".to_string(),
        )
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let value = serde_json::to_value(user()).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["firstName"], "Jane");
        assert_eq!(value["isSeller"], false);
    }

    #[test]
    fn becoming_a_seller_assigns_default_level() {
        let mut user = user();
        assert_eq!(user.seller_level(), None);

        user.set_seller_profile(SellerProfile {
            description: "I design logos".to_string(),
            ..Default::default()
        });

        assert!(user.is_seller);
        assert_eq!(user.seller_level(), Some(DEFAULT_SELLER_LEVEL));
    }

    #[test]
    fn profile_update_keeps_existing_level() {
        let mut user = user();
        user.set_seller_profile(SellerProfile {
            level: Some("Top Rated".to_string()),
            ..Default::default()
        });
        user.set_seller_profile(SellerProfile {
            description: "updated".to_string(),
            ..Default::default()
        });

        assert_eq!(user.seller_level(), Some("Top Rated"));
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = user();
        assert_eq!(user.display_name(), "Jane Doe");
        user.first_name.clear();
        user.last_name.clear();
        assert_eq!(user.display_name(), "jane");
    }
}
