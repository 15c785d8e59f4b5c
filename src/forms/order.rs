use crate::forms::milestone::AddMilestone;
use crate::models::{self, LifecycleError, OrderStatus, Party};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_valid::Validate;
use uuid::Uuid;

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| Utc.from_utc_datetime(&date))
        .ok_or_else(|| format!("Invalid date: {}", value))
}

pub(crate) fn flexible_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => {
            parse_date(&value).map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Uploaded-file reference as sent by clients: a bare URL or a descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttachmentInput {
    Url(String),
    Detailed {
        name: Option<String>,
        url: String,
        size: Option<i64>,
        #[serde(rename = "type")]
        mime_type: Option<String>,
    },
}

impl From<AttachmentInput> for models::Attachment {
    fn from(input: AttachmentInput) -> Self {
        match input {
            AttachmentInput::Url(url) => models::Attachment {
                name: None,
                url,
                size: None,
                mime_type: None,
            },
            AttachmentInput::Detailed {
                name,
                url,
                size,
                mime_type,
            } => models::Attachment {
                name,
                url,
                size,
                mime_type,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddOn {
    #[validate(min_length = 1)]
    #[validate(max_length = 100)]
    pub name: String,
    #[validate(minimum = 0.0)]
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub service_id: Uuid,
    #[validate(min_length = 1)]
    #[validate(max_length = 50)]
    pub package_selected: String,
    #[validate(minimum = 0.0)]
    pub price: Option<f64>,
    #[validate(max_length = 5000)]
    pub requirements: Option<String>,
    #[validate(max_length = 5000)]
    pub initial_message: Option<String>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(max_items = 20)]
    #[validate]
    pub milestones: Vec<AddMilestone>,
    #[serde(default)]
    #[validate(max_items = 10)]
    #[validate]
    pub additional_services: Vec<AddOn>,
}

impl CreateOrder {
    /// Builds a `Pending` order for `buyer_id` against an already loaded service.
    pub fn into_model(self, buyer_id: Uuid, service: &models::Service) -> Result<models::Order, String> {
        let (package_selected, package_price) = if service.pricing.packages.is_empty() {
            (
                self.package_selected.trim().to_string(),
                service.pricing.starting_price,
            )
        } else {
            let package = service.package(&self.package_selected).ok_or_else(|| {
                format!(
                    "Package '{}' is not offered by this service",
                    self.package_selected.trim()
                )
            })?;
            (package.name.clone(), package.price)
        };

        let add_ons: Vec<models::AddOn> = self
            .additional_services
            .into_iter()
            .map(|add_on| models::AddOn {
                name: add_on.name.trim().to_string(),
                price: add_on.price,
            })
            .collect();
        let price = self
            .price
            .unwrap_or_else(|| package_price + add_ons.iter().map(|add_on| add_on.price).sum::<f64>());

        let now = Utc::now();
        let mut order = models::Order {
            id: Uuid::new_v4(),
            buyer_id,
            seller_id: service.seller_id,
            service_id: service.id,
            title: service.title.clone(),
            package_selected,
            price,
            requirements: self.requirements,
            initial_message: self.initial_message,
            due_date: self.due_date,
            status: OrderStatus::Pending,
            milestones: vec![],
            messages: vec![],
            files: vec![],
            additional_services: add_ons,
            cancellation_requests: vec![],
            delivery_extensions: vec![],
            review: None,
            created_at: now,
            updated_at: now,
        };

        for milestone in self.milestones {
            order
                .add_milestone(milestone.into_model(), now)
                .map_err(|err| err.to_string())?;
        }

        Ok(order)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[validate(min_length = 1)]
    #[validate(max_length = 200)]
    pub title: Option<String>,
    #[validate(minimum = 0.0)]
    pub price: Option<f64>,
    #[validate(max_length = 5000)]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<OrderStatus>,
}

impl UpdateOrder {
    fn edits_fields(&self) -> bool {
        self.title.is_some()
            || self.price.is_some()
            || self.requirements.is_some()
            || self.due_date.is_some()
    }

    pub fn update(
        self,
        order: &mut models::Order,
        actor: Party,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if self.edits_fields() {
            order.ensure_open()?;
        }

        if let Some(due_date) = self.due_date {
            let too_late = order
                .milestones
                .iter()
                .filter_map(|milestone| milestone.date)
                .any(|date| date > due_date);
            if too_late {
                return Err(LifecycleError::Invalid(
                    "Due date cannot be before an existing milestone date".to_string(),
                ));
            }
            order.due_date = Some(due_date);
        }
        if let Some(title) = self.title {
            order.title = title.trim().to_string();
        }
        if let Some(price) = self.price {
            order.price = price;
        }
        if self.requirements.is_some() {
            order.requirements = self.requirements;
        }
        order.updated_at = now;

        if let Some(status) = self.status {
            order.transition(status, actor, now)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Status {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Message {
    #[serde(default)]
    #[validate(max_length = 5000)]
    pub text: String,
    pub attachment: Option<AttachmentInput>,
}

/// Metadata for a file previously stored through `/upload`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct File {
    #[validate(max_length = 255)]
    pub name: Option<String>,
    #[validate(min_length = 1)]
    pub url: String,
    #[validate(max_length = 1000)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Review {
    #[validate(minimum = 1)]
    #[validate(maximum = 5)]
    pub rating: i32,
    #[validate(max_length = 2000)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Cancel {
    #[validate(min_length = 1)]
    #[validate(max_length = 2000)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtendDelivery {
    #[validate(minimum = 1)]
    #[validate(maximum = 30)]
    pub days: i32,
    #[validate(min_length = 1)]
    #[validate(max_length = 2000)]
    pub reason: String,
}
