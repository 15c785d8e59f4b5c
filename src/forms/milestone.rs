use crate::forms::order::{flexible_date, AttachmentInput};
use crate::models::{self, MilestoneAction, MilestoneStatus};
use chrono::{DateTime, Utc};
use serde_derive::Deserialize;
use serde_valid::Validate;

/// A milestone supplied on order creation or through `POST /order/{id}/milestone`.
/// Any status sent by the client is ignored; new milestones start `pending`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddMilestone {
    #[validate(min_length = 1)]
    #[validate(max_length = 200)]
    pub title: String,
    #[validate(max_length = 2000)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub date: Option<DateTime<Utc>>,
}

impl AddMilestone {
    pub fn into_model(self) -> models::Milestone {
        models::Milestone::new(self.title.trim().to_string(), self.description, self.date)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMilestone {
    #[validate(min_length = 1)]
    #[validate(max_length = 200)]
    pub title: Option<String>,
    #[validate(max_length = 2000)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub date: Option<DateTime<Utc>>,
    pub status: Option<MilestoneStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CompleteMilestone {
    #[validate(max_length = 2000)]
    pub note: Option<String>,
    pub deliverable: Option<AttachmentInput>,
}

impl From<CompleteMilestone> for MilestoneAction {
    fn from(form: CompleteMilestone) -> Self {
        MilestoneAction::Complete {
            deliverable: form.deliverable.map(Into::into),
            note: form.note,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ApproveMilestone {
    #[validate(max_length = 2000)]
    pub feedback: Option<String>,
}

impl From<ApproveMilestone> for MilestoneAction {
    fn from(form: ApproveMilestone) -> Self {
        MilestoneAction::Approve {
            feedback: form.feedback,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestRevision {
    #[validate(max_length = 2000)]
    pub revision_note: Option<String>,
}

impl From<RequestRevision> for MilestoneAction {
    fn from(form: RequestRevision) -> Self {
        MilestoneAction::RequestRevision {
            note: form.revision_note,
        }
    }
}
