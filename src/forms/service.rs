use crate::models;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_valid::Validate;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[validate(min_length = 1)]
    #[validate(max_length = 50)]
    pub name: String,
    #[validate(minimum = 0.0)]
    pub price: f64,
    #[validate(minimum = 1)]
    #[validate(maximum = 365)]
    pub delivery_time: i32,
    #[validate(max_length = 1000)]
    pub description: Option<String>,
    #[validate(minimum = 0)]
    pub revisions: Option<i32>,
    #[serde(default)]
    pub included_features: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[validate(minimum = 0.0)]
    pub starting_price: Option<f64>,
    #[serde(default)]
    #[validate]
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[validate(min_length = 1)]
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Faq {
    #[validate(min_length = 1)]
    pub question: String,
    #[validate(min_length = 1)]
    pub answer: String,
}

/// Body of `POST /add` and `PUT /update/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceForm {
    #[validate(min_length = 5)]
    #[validate(max_length = 120)]
    pub title: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 5000)]
    pub description: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 100)]
    pub category: String,
    #[validate(max_length = 100)]
    pub subcategory: Option<String>,
    #[serde(default)]
    #[validate(max_items = 5)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate]
    pub pricing: Pricing,
    #[serde(default)]
    #[validate(max_items = 10)]
    #[validate]
    pub images: Vec<Image>,
    #[validate(max_length = 5000)]
    pub requirements: Option<String>,
    #[serde(default)]
    #[validate]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub is_active: Option<bool>,
}

impl ServiceForm {
    /// Checks spanning several fields, run after `validate()`.
    pub fn check(&self) -> Result<(), String> {
        if self.images.iter().filter(|image| image.is_main).count() > 1 {
            return Err("Only one image can be marked as main".to_string());
        }
        if self.title.trim().chars().count() < 5 {
            return Err("Title must be at least 5 characters".to_string());
        }

        Ok(())
    }

    fn starting_price(&self) -> f64 {
        self.pricing
            .starting_price
            .or_else(|| {
                self.pricing
                    .packages
                    .iter()
                    .map(|package| package.price)
                    .reduce(f64::min)
            })
            .unwrap_or(0.0)
    }

    pub fn into_model(self, seller_id: Uuid) -> models::Service {
        let now = Utc::now();
        let mut service = models::Service {
            id: Uuid::new_v4(),
            seller_id,
            title: String::new(),
            description: String::new(),
            category: String::new(),
            subcategory: None,
            tags: vec![],
            pricing: models::Pricing::default(),
            images: vec![],
            requirements: None,
            faqs: vec![],
            languages: vec![],
            is_active: true,
            total_sales: 0,
            featured: false,
            reviews: vec![],
            average_rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        self.update(&mut service);
        service.updated_at = now;

        service
    }

    /// Replaces every editable field; counters, reviews and ownership are left alone.
    pub fn update(self, service: &mut models::Service) {
        let starting_price = self.starting_price();

        service.title = self.title.trim().to_string();
        service.description = self.description;
        service.category = self.category.trim().to_string();
        service.subcategory = self.subcategory;
        service.tags = clean(self.tags);
        service.pricing = models::Pricing {
            starting_price,
            packages: self
                .pricing
                .packages
                .into_iter()
                .map(|package| models::Package {
                    name: package.name.trim().to_string(),
                    price: package.price,
                    delivery_time: package.delivery_time,
                    description: package.description,
                    revisions: package.revisions,
                    included_features: clean(package.included_features),
                })
                .collect(),
        };
        service.images = self
            .images
            .into_iter()
            .map(|image| models::ServiceImage {
                url: image.url,
                is_main: image.is_main,
            })
            .collect();
        service.requirements = self.requirements;
        service.faqs = self
            .faqs
            .into_iter()
            .map(|faq| models::Faq {
                question: faq.question,
                answer: faq.answer,
            })
            .collect();
        service.languages = clean(self.languages);
        if let Some(is_active) = self.is_active {
            service.is_active = is_active;
        }
        service.updated_at = Utc::now();
    }
}

fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    Rating,
    Bestselling,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "newest" => Ok(SortBy::Newest),
            "oldest" => Ok(SortBy::Oldest),
            "price-low" => Ok(SortBy::PriceLow),
            "price-high" => Ok(SortBy::PriceHigh),
            "rating" => Ok(SortBy::Rating),
            "bestselling" => Ok(SortBy::Bestselling),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 12;
pub const MAX_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE: i64 = 100_000;

/// Query string of `GET /`. Built from raw pairs because filters repeat.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceListQuery {
    pub page: i64,
    pub limit: i64,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub seller_levels: Vec<String>,
    pub delivery_times: Vec<i32>,
    pub languages: Vec<String>,
    pub sort_by: SortBy,
}

impl Default for ServiceListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            category: None,
            subcategory: None,
            search: None,
            min_price: None,
            max_price: None,
            seller_levels: vec![],
            delivery_times: vec![],
            languages: vec![],
            sort_by: SortBy::default(),
        }
    }
}

fn number<T: FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("{} must be a number", key))
}

impl ServiceListQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, String> {
        let mut query = Self::default();

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim_end_matches("[]") {
                "page" => query.page = number::<i64>(key, value)?.clamp(1, MAX_PAGE),
                "limit" => query.limit = number::<i64>(key, value)?.clamp(1, MAX_PAGE_SIZE),
                "category" if value.eq_ignore_ascii_case("all") => query.category = None,
                "category" => query.category = Some(value.to_string()),
                "subcategory" => query.subcategory = Some(value.to_string()),
                "search" => query.search = Some(value.to_string()),
                "minPrice" => query.min_price = Some(number(key, value)?),
                "maxPrice" => query.max_price = Some(number(key, value)?),
                "sellerLevel" => query.seller_levels.push(value.to_string()),
                "deliveryTime" => query.delivery_times.push(number(key, value)?),
                "language" => query.languages.push(value.to_string()),
                "sortBy" => query.sort_by = value.parse().unwrap_or_default(),
                _ => {}
            }
        }

        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err("minPrice cannot be greater than maxPrice".to_string());
            }
        }

        Ok(query)
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit).max(0)
    }

    /// Several delivery-time boxes may be ticked; the widest one wins.
    pub fn max_delivery_days(&self) -> Option<i32> {
        self.delivery_times.iter().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample_form() -> ServiceForm {
        serde_json::from_value(serde_json::json!({
            "title": "Professional Website Design",
            "description": "Responsive websites",
            "category": "Programming & Tech",
            "tags": ["web", "react"],
            "pricing": {
                "packages": [
                    {"name": "Basic", "price": 99, "deliveryTime": 3},
                    {"name": "Standard", "price": 199, "deliveryTime": 5}
                ]
            },
            "images": [{"url": "/uploads/file-1-2.png", "isMain": true}],
            "languages": ["English"]
        }))
        .unwrap()
    }

    #[test]
    fn service_form_builds_model() {
        let form = sample_form();
        assert!(form.validate().is_ok());
        assert!(form.check().is_ok());

        let seller_id = Uuid::new_v4();
        let service = form.into_model(seller_id);
        assert_eq!(service.seller_id, seller_id);
        assert_eq!(service.pricing.starting_price, 99.0);
        assert_eq!(service.min_delivery_time(), Some(3));
        assert!(service.is_active);
        assert_eq!(service.total_sales, 0);
    }

    #[test]
    fn too_many_tags_are_rejected() {
        let mut form = sample_form();
        form.tags = (0..6).map(|i| format!("tag{}", i)).collect();
        assert!(form.validate().is_err());
    }

    #[test]
    fn negative_price_and_zero_delivery_are_rejected() {
        let mut form = sample_form();
        form.pricing.packages[0].price = -1.0;
        assert!(form.validate().is_err());

        let mut form = sample_form();
        form.pricing.packages[0].delivery_time = 0;
        assert!(form.validate().is_err());
    }

    #[test]
    fn one_main_image_at_most() {
        let mut form = sample_form();
        form.images.push(Image {
            url: "/uploads/file-3-4.png".to_string(),
            is_main: true,
        });
        assert!(form.check().is_err());
    }

    #[test]
    fn update_keeps_counters() {
        let mut service = sample_form().into_model(Uuid::new_v4());
        service.total_sales = 7;
        service.average_rating = 4.5;

        let mut edit = sample_form();
        edit.title = "Updated Website Design".to_string();
        edit.pricing.starting_price = Some(10.0);
        edit.update(&mut service);

        assert_eq!(service.title, "Updated Website Design");
        assert_eq!(service.pricing.starting_price, 10.0);
        assert_eq!(service.total_sales, 7);
        assert_eq!(service.average_rating, 4.5);
    }

    #[test]
    fn list_query_defaults() {
        let query = ServiceListQuery::from_pairs(&[]).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(query.sort_by, SortBy::Newest);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn list_query_collects_repeated_filters() {
        let query = ServiceListQuery::from_pairs(&pairs(&[
            ("page", "3"),
            ("limit", "500"),
            ("category", "all"),
            ("sellerLevel", "Level 1"),
            ("sellerLevel", "Level 2"),
            ("deliveryTime", "1"),
            ("deliveryTime", "7"),
            ("language", "English"),
            ("minPrice", ""),
            ("sortBy", "price-high"),
        ]))
        .unwrap();

        assert_eq!(query.page, 3);
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.offset(), 2 * MAX_PAGE_SIZE);
        assert_eq!(query.category, None);
        assert_eq!(query.seller_levels, vec!["Level 1", "Level 2"]);
        assert_eq!(query.max_delivery_days(), Some(7));
        assert_eq!(query.languages, vec!["English"]);
        assert_eq!(query.min_price, None);
        assert_eq!(query.sort_by, SortBy::PriceHigh);
    }

    #[test]
    fn huge_page_does_not_overflow_offset() {
        let query =
            ServiceListQuery::from_pairs(&pairs(&[("page", i64::MAX.to_string().as_str()), ("limit", "50")]))
                .unwrap();
        assert_eq!(query.page, MAX_PAGE);
        assert_eq!(query.offset(), (MAX_PAGE - 1) * 50);

        let query = ServiceListQuery {
            page: i64::MAX,
            limit: MAX_PAGE_SIZE,
            ..Default::default()
        };
        assert_eq!(query.offset(), i64::MAX);

        let query = ServiceListQuery::from_pairs(&pairs(&[("page", "-4")])).unwrap();
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn list_query_rejects_bad_numbers() {
        assert!(ServiceListQuery::from_pairs(&pairs(&[("minPrice", "cheap")])).is_err());
        assert!(ServiceListQuery::from_pairs(&pairs(&[("minPrice", "50"), ("maxPrice", "10")])).is_err());
    }

    #[test]
    fn unknown_sort_falls_back_to_newest() {
        let query = ServiceListQuery::from_pairs(&pairs(&[("sortBy", "random")])).unwrap();
        assert_eq!(query.sort_by, SortBy::Newest);
    }
}
