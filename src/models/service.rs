use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub pricing: Pricing,
    pub images: Vec<ServiceImage>,
    pub requirements: Option<String>,
    pub faqs: Vec<Faq>,
    pub languages: Vec<String>,
    pub is_active: bool,
    pub total_sales: i32,
    pub featured: bool,
    pub reviews: Vec<ServiceReview>,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub starting_price: f64,
    pub packages: Vec<Package>,
}

/// A named pricing tier (Basic / Standard / Premium ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    pub price: f64,
    pub delivery_time: i32,
    pub description: Option<String>,
    pub revisions: Option<i32>,
    #[serde(default)]
    pub included_features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceImage {
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReview {
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewer_id: Uuid,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Service {
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.pricing
            .packages
            .iter()
            .find(|package| package.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Fastest delivery across packages, stored alongside the document for filtering.
    pub fn min_delivery_time(&self) -> Option<i32> {
        self.pricing
            .packages
            .iter()
            .map(|package| package.delivery_time)
            .min()
    }

    pub fn add_review(&mut self, review: ServiceReview) {
        self.reviews.push(review);
        self.recompute_rating();
        self.updated_at = Utc::now();
    }

    pub fn recompute_rating(&mut self) {
        self.total_reviews = self.reviews.len() as i32;
        self.average_rating = if self.reviews.is_empty() {
            0.0
        } else {
            let sum: i64 = self.reviews.iter().map(|review| review.rating as i64).sum();
            sum as f64 / self.reviews.len() as f64
        };
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn package(name: &str, price: f64, delivery_time: i32) -> Package {
        Package {
            name: name.to_string(),
            price,
            delivery_time,
            description: None,
            revisions: None,
            included_features: vec![],
        }
    }

    pub(crate) fn service(seller_id: Uuid) -> Service {
        let now = Utc::now();
        Service {
            id: Uuid::new_v4(),
            seller_id,
            title: "Professional Website Design".to_string(),
            description: "Responsive websites".to_string(),
            category: "Programming & Tech".to_string(),
            subcategory: None,
            tags: vec!["web".to_string()],
            pricing: Pricing {
                starting_price: 99.0,
                packages: vec![
                    package("Basic", 99.0, 3),
                    package("Standard", 199.0, 5),
                    package("Premium", 299.0, 7),
                ],
            },
            images: vec![],
            requirements: None,
            faqs: vec![],
            languages: vec!["English".to_string()],
            is_active: true,
            total_sales: 0,
            featured: false,
            reviews: vec![],
            average_rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn review(rating: i32) -> ServiceReview {
        ServiceReview {
            rating,
            comment: None,
            reviewer_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn package_lookup_is_case_insensitive() {
        let service = service(Uuid::new_v4());
        assert_eq!(service.package("standard").map(|p| p.price), Some(199.0));
        assert_eq!(service.package(" Premium ").map(|p| p.price), Some(299.0));
        assert!(service.package("Gold").is_none());
    }

    #[test]
    fn rating_is_the_mean_of_reviews() {
        let mut service = service(Uuid::new_v4());
        service.add_review(review(5));
        service.add_review(review(4));
        service.add_review(review(3));

        assert_eq!(service.total_reviews, 3);
        assert!((service.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rating_resets_without_reviews() {
        let mut service = service(Uuid::new_v4());
        service.average_rating = 3.5;
        service.recompute_rating();
        assert_eq!(service.total_reviews, 0);
        assert_eq!(service.average_rating, 0.0);
    }

    #[test]
    fn fastest_package_sets_delivery_bound() {
        let mut service = service(Uuid::new_v4());
        assert_eq!(service.min_delivery_time(), Some(3));
        service.pricing.packages.clear();
        assert_eq!(service.min_delivery_time(), None);
    }
}
