use crate::models;
use serde_derive::Deserialize;
use serde_valid::Validate;

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: String = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    #[serde(deserialize_with = "trimmed")]
    #[validate(min_length = 1)]
    #[validate(max_length = 50)]
    pub first_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(min_length = 1)]
    #[validate(max_length = 50)]
    pub last_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(min_length = 3)]
    #[validate(max_length = 30)]
    #[validate(pattern = r"^[A-Za-z0-9_.-]+$")]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(max_length = 255)]
    #[validate(pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$")]
    pub email: String,
    #[validate(min_length = 8)]
    #[validate(max_length = 128)]
    pub password: String,
}

impl Register {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn into_user(self, password_hash: String) -> models::User {
        let email = self.normalized_email();
        models::User::new(
            self.first_name.trim().to_string(),
            self.last_name.trim().to_string(),
            self.username.trim().to_string(),
            email,
            password_hash,
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Login {
    #[serde(deserialize_with = "trimmed")]
    #[validate(min_length = 1)]
    pub email: String,
    #[validate(min_length = 1)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Location {
    #[validate(max_length = 100)]
    pub country: Option<String>,
    #[validate(max_length = 100)]
    pub city: Option<String>,
}

/// Body of `PUT /profile`; submitting it turns the caller into a seller.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    #[validate(min_length = 1)]
    #[validate(max_length = 1000)]
    pub description: String,
    #[serde(default)]
    #[validate(max_items = 10)]
    pub languages: Vec<String>,
    #[serde(default)]
    #[validate(max_items = 20)]
    pub skills: Vec<String>,
    #[validate]
    pub location: Option<Location>,
    #[validate(max_length = 2048)]
    pub profile_picture: Option<String>,
}

fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

impl SellerProfile {
    pub fn update(self, user: &mut models::User) {
        let profile = models::SellerProfile {
            description: self.description.trim().to_string(),
            languages: clean(self.languages),
            skills: clean(self.skills),
            location: self.location.map(|location| models::Location {
                country: location.country,
                city: location.city,
            }),
            profile_picture: self.profile_picture,
            level: None,
        };

        user.set_seller_profile(profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(json: serde_json::Value) -> Register {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn register_validation() {
        let valid = register(serde_json::json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "username": "jane_doe",
            "email": "Jane@Example.com ",
            "password": "s3cret-pass"
        }));
        assert!(valid.validate().is_ok());
        assert_eq!(valid.normalized_email(), "jane@example.com");

        let short_password = register(serde_json::json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "username": "jane_doe",
            "email": "jane@example.com",
            "password": "short"
        }));
        assert!(short_password.validate().is_err());

        let bad_email = register(serde_json::json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "username": "jane_doe",
            "email": "not-an-email",
            "password": "s3cret-pass"
        }));
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_validation() {
        let form = register(serde_json::json!({
            "firstName": " Jane ",
            "lastName": "Doe\n",
            "username": "  jane_doe ",
            "email": "\tJane@Example.com  ",
            "password": "s3cret-pass"
        }));
        assert!(form.validate().is_ok());
        assert_eq!(form.username, "jane_doe");
        assert_eq!(form.email, "Jane@Example.com");

        let user = form.into_user("hash".to_string());
        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.email, "jane@example.com");

        let blank: Register = serde_json::from_value(serde_json::json!({
            "firstName": "   ",
            "lastName": "Doe",
            "username": "jane_doe",
            "email": "jane@example.com",
            "password": "s3cret-pass"
        }))
        .unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn seller_profile_makes_user_a_seller() {
        let form: SellerProfile = serde_json::from_value(serde_json::json!({
            "description": "Logo designer",
            "languages": ["English", " "],
            "skills": ["Illustrator"],
            "location": {"country": "PT", "city": "Porto"}
        }))
        .unwrap();
        assert!(form.validate().is_ok());

        let mut user = register(serde_json::json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "username": "jane_doe",
            "email": "jane@example.com",
            "password": "s3cret-pass"
        }))
        .into_user("hash".to_string());
        form.update(&mut user);

        assert!(user.is_seller);
        let profile = user.seller_profile.unwrap();
        assert_eq!(profile.languages, vec!["English".to_string()]);
        assert_eq!(profile.level.as_deref(), Some(models::DEFAULT_SELLER_LEVEL));
    }
}
