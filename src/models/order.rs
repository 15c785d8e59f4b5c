use crate::helpers::JsonResponse;
use crate::models::{Milestone, MilestoneAction};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The side of an order a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Buyer,
    Seller,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Buyer => write!(f, "buyer"),
            Party::Seller => write!(f, "seller"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Revision,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Revision => "Revision",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The whole order state machine. Anything not listed is illegal.
    pub fn can_transition(from: OrderStatus, to: OrderStatus, actor: Party) -> Result<(), LifecycleError> {
        use OrderStatus::*;

        let allowed: &[Party] = match (from, to) {
            (Pending, InProgress) => &[Party::Seller],
            (Pending, Cancelled) => &[Party::Buyer, Party::Seller],
            (InProgress, Delivered) => &[Party::Seller],
            (InProgress, Cancelled) => &[Party::Seller],
            (Delivered, Completed) => &[Party::Buyer],
            (Delivered, Revision) => &[Party::Buyer],
            (Revision, InProgress) => &[Party::Seller],
            (Revision, Delivered) => &[Party::Seller],
            _ => return Err(LifecycleError::InvalidOrderTransition { from, to }),
        };

        if allowed.contains(&actor) {
            Ok(())
        } else {
            Err(LifecycleError::NotAllowed(allowed[0]))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(OrderStatus::Pending),
            "In Progress" => Ok(OrderStatus::InProgress),
            "Revision" => Ok(OrderStatus::Revision),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Completed" => Ok(OrderStatus::Completed),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Cannot move order from {from} to {to}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },
    #[error("Cannot move milestone from {from} to {to}")]
    InvalidMilestoneTransition {
        from: crate::models::MilestoneStatus,
        to: crate::models::MilestoneStatus,
    },
    #[error("Milestone is already approved")]
    AlreadyApproved,
    #[error("Only the {0} can perform this action")]
    NotAllowed(Party),
    #[error("Milestone not found")]
    MilestoneNotFound,
    #[error("Order is {0} and can no longer be changed")]
    OrderClosed(OrderStatus),
    #[error("{0}")]
    Invalid(String),
    #[error("A {0} request is already pending")]
    AlreadyPending(&'static str),
    #[error("This order has already been reviewed")]
    AlreadyReviewed,
}

impl ResponseError for LifecycleError {
    fn status_code(&self) -> StatusCode {
        match self {
            LifecycleError::NotAllowed(_) => StatusCode::FORBIDDEN,
            LifecycleError::MilestoneNotFound => StatusCode::NOT_FOUND,
            LifecycleError::Invalid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonResponse::<()> {
            message: self.to_string(),
            data: None,
        })
    }
}

/// A reference to an uploaded file: a milestone deliverable or a message attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: Option<String>,
    pub url: String,
    pub size: Option<i64>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: Party,
    pub sender_id: Uuid,
    pub text: String,
    pub attachment: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFile {
    pub id: Uuid,
    pub name: String,
    pub original_name: String,
    pub url: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub description: Option<String>,
    pub uploaded_by: Party,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub id: Uuid,
    pub reason: String,
    pub requested_by: Party,
    pub status: RequestState,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryExtension {
    pub id: Uuid,
    pub days: i32,
    pub reason: String,
    pub requested_by: Party,
    pub status: RequestState,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReview {
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub service_id: Uuid,
    pub title: String,
    pub package_selected: String,
    pub price: f64,
    pub requirements: Option<String>,
    pub initial_message: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub milestones: Vec<Milestone>,
    pub messages: Vec<Message>,
    pub files: Vec<OrderFile>,
    pub additional_services: Vec<AddOn>,
    pub cancellation_requests: Vec<CancellationRequest>,
    pub delivery_extensions: Vec<DeliveryExtension>,
    pub review: Option<OrderReview>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// `None` means the user is not a participant.
    pub fn party(&self, user_id: Uuid) -> Option<Party> {
        if self.buyer_id == user_id {
            Some(Party::Buyer)
        } else if self.seller_id == user_id {
            Some(Party::Seller)
        } else {
            None
        }
    }

    pub fn ensure_open(&self) -> Result<(), LifecycleError> {
        if self.status.is_terminal() {
            return Err(LifecycleError::OrderClosed(self.status));
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn ensure_party(actor: Party, required: Party) -> Result<(), LifecycleError> {
        if actor == required {
            Ok(())
        } else {
            Err(LifecycleError::NotAllowed(required))
        }
    }

    pub fn transition(
        &mut self,
        to: OrderStatus,
        actor: Party,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        OrderStatus::can_transition(self.status, to, actor)?;
        self.status = to;
        self.touch(now);
        Ok(())
    }

    fn check_milestone_date(&self, date: Option<DateTime<Utc>>) -> Result<(), LifecycleError> {
        match (date, self.due_date) {
            (Some(date), Some(due)) if date > due => Err(LifecycleError::Invalid(
                "Milestone date cannot be after the order due date".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn milestone_mut(&mut self, milestone_id: Uuid) -> Result<&mut Milestone, LifecycleError> {
        self.milestones
            .iter_mut()
            .find(|milestone| milestone.id == milestone_id)
            .ok_or(LifecycleError::MilestoneNotFound)
    }

    pub fn add_milestone(&mut self, milestone: Milestone, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.ensure_open()?;
        self.check_milestone_date(milestone.date)?;
        self.milestones.push(milestone);
        self.touch(now);
        Ok(())
    }

    /// Merge of descriptive fields; status changes are applied separately through `apply_milestone`.
    pub fn edit_milestone(
        &mut self,
        milestone_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        self.ensure_open()?;
        self.check_milestone_date(date)?;

        let milestone = self.milestone_mut(milestone_id)?;
        if let Some(title) = title {
            milestone.title = title;
        }
        if description.is_some() {
            milestone.description = description;
        }
        if date.is_some() {
            milestone.date = date;
        }
        self.touch(now);
        Ok(())
    }

    pub fn remove_milestone(&mut self, milestone_id: Uuid, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.ensure_open()?;

        let position = self
            .milestones
            .iter()
            .position(|milestone| milestone.id == milestone_id)
            .ok_or(LifecycleError::MilestoneNotFound)?;
        if self.milestones[position].is_approved() {
            return Err(LifecycleError::AlreadyApproved);
        }

        self.milestones.remove(position);
        self.touch(now);
        Ok(())
    }

    pub fn apply_milestone(
        &mut self,
        milestone_id: Uuid,
        action: MilestoneAction,
        actor: Party,
        now: DateTime<Utc>,
    ) -> Result<&Milestone, LifecycleError> {
        self.ensure_open()?;
        self.touch(now);

        let milestone = self.milestone_mut(milestone_id)?;
        milestone.apply(action, actor, now)?;
        Ok(&*milestone)
    }

    pub fn add_message(
        &mut self,
        actor: Party,
        sender_id: Uuid,
        text: String,
        attachment: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> Result<&Message, LifecycleError> {
        let text = text.trim().to_string();
        if text.is_empty() && attachment.is_none() {
            return Err(LifecycleError::Invalid(
                "Message text is required".to_string(),
            ));
        }

        self.messages.push(Message {
            id: Uuid::new_v4(),
            sender: actor,
            sender_id,
            text,
            attachment,
            timestamp: now,
        });
        self.touch(now);

        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn add_file(&mut self, file: OrderFile, now: DateTime<Utc>) -> &OrderFile {
        self.files.push(file);
        self.touch(now);
        &self.files[self.files.len() - 1]
    }

    pub fn request_cancellation(
        &mut self,
        actor: Party,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<&CancellationRequest, LifecycleError> {
        Self::ensure_party(actor, Party::Buyer)?;
        self.ensure_open()?;

        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(LifecycleError::Invalid(
                "Cancellation reason is required".to_string(),
            ));
        }
        if self
            .cancellation_requests
            .iter()
            .any(|request| request.status == RequestState::Pending)
        {
            return Err(LifecycleError::AlreadyPending("cancellation"));
        }

        self.cancellation_requests.push(CancellationRequest {
            id: Uuid::new_v4(),
            reason,
            requested_by: actor,
            status: RequestState::Pending,
            requested_at: now,
        });
        self.touch(now);

        Ok(&self.cancellation_requests[self.cancellation_requests.len() - 1])
    }

    pub fn request_extension(
        &mut self,
        actor: Party,
        days: i32,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<&DeliveryExtension, LifecycleError> {
        Self::ensure_party(actor, Party::Seller)?;
        self.ensure_open()?;

        if !(1..=30).contains(&days) {
            return Err(LifecycleError::Invalid(
                "Extension must be between 1 and 30 days".to_string(),
            ));
        }
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(LifecycleError::Invalid(
                "Extension reason is required".to_string(),
            ));
        }

        self.delivery_extensions.push(DeliveryExtension {
            id: Uuid::new_v4(),
            days,
            reason,
            requested_by: actor,
            status: RequestState::Pending,
            requested_at: now,
        });
        self.touch(now);

        Ok(&self.delivery_extensions[self.delivery_extensions.len() - 1])
    }

    pub fn submit_review(
        &mut self,
        actor: Party,
        rating: i32,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&OrderReview, LifecycleError> {
        Self::ensure_party(actor, Party::Buyer)?;

        if self.status != OrderStatus::Completed {
            return Err(LifecycleError::Invalid(
                "Only completed orders can be reviewed".to_string(),
            ));
        }
        if self.review.is_some() {
            return Err(LifecycleError::AlreadyReviewed);
        }
        if !(1..=5).contains(&rating) {
            return Err(LifecycleError::Invalid(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        self.touch(now);
        Ok(&*self.review.insert(OrderReview {
            rating,
            comment,
            created_at: now,
        }))
    }
}
