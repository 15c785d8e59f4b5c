use crate::models;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: models::Service,
    pub seller_name: Option<String>,
    pub seller_level: Option<String>,
}

impl From<(models::Service, Option<models::User>)> for ServiceDetail {
    fn from((service, seller): (models::Service, Option<models::User>)) -> Self {
        let seller_name = seller.as_ref().map(|seller| seller.display_name());
        let seller_level = seller
            .as_ref()
            .and_then(|seller| seller.seller_level())
            .map(str::to_string);

        Self {
            service,
            seller_name,
            seller_level,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePage {
    pub services: Vec<models::Service>,
    pub total_services: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

impl ServicePage {
    pub fn new(services: Vec<models::Service>, total_services: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_services + limit - 1) / limit
        } else {
            0
        };

        Self {
            services,
            total_services,
            total_pages,
            current_page: page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::service::tests::service;
    use uuid::Uuid;

    #[test]
    fn detail_flattens_service_and_adds_seller() {
        let mut seller = models::User::new(
            "Sam".to_string(),
            "Seller".to_string(),
            "sam".to_string(),
            "sam@example.com".to_string(),
            "hash".to_string(),
        );
        seller.set_seller_profile(models::SellerProfile::default());
        let service = service(seller.id);

        let value = serde_json::to_value(ServiceDetail::from((service.clone(), Some(seller)))).unwrap();
        assert_eq!(value["id"], service.id.to_string());
        assert_eq!(value["title"], service.title);
        assert_eq!(value["sellerName"], "Sam Seller");
        assert_eq!(value["sellerLevel"], models::DEFAULT_SELLER_LEVEL);
    }

    #[test]
    fn detail_without_seller() {
        let value = serde_json::to_value(ServiceDetail::from((service(Uuid::new_v4()), None))).unwrap();
        assert!(value["sellerName"].is_null());
    }

    #[test]
    fn page_counts_round_up() {
        let page = ServicePage::new(vec![], 25, 2, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(ServicePage::new(vec![], 0, 1, 12).total_pages, 0);

        let value = serde_json::to_value(page).unwrap();
        assert_eq!(value["totalServices"], 25);
    }
}
