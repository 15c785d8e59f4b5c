use crate::models::{Attachment, LifecycleError, Party};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub status: MilestoneStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub deliverable: Option<Attachment>,
    pub completion_note: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revision_requested: bool,
    pub revision_note: Option<String>,
    pub revision_requested_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub feedback: Option<String>,
}

/// Every milestone status change goes through one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum MilestoneAction {
    Start,
    Complete {
        deliverable: Option<Attachment>,
        note: Option<String>,
    },
    Approve {
        feedback: Option<String>,
    },
    RequestRevision {
        note: Option<String>,
    },
}

impl MilestoneAction {
    fn actor(&self) -> Party {
        match self {
            Self::Start | Self::Complete { .. } => Party::Seller,
            Self::Approve { .. } | Self::RequestRevision { .. } => Party::Buyer,
        }
    }

    /// Maps a status written through the generic update endpoint onto an action.
    pub fn for_status(from: MilestoneStatus, to: MilestoneStatus) -> Result<Self, LifecycleError> {
        match to {
            MilestoneStatus::InProgress if from == MilestoneStatus::Pending => Ok(Self::Start),
            MilestoneStatus::InProgress if from == MilestoneStatus::Completed => {
                Ok(Self::RequestRevision { note: None })
            }
            MilestoneStatus::Completed => Ok(Self::Complete {
                deliverable: None,
                note: None,
            }),
            _ => Err(LifecycleError::InvalidMilestoneTransition { from, to }),
        }
    }
}

impl Milestone {
    pub fn new(title: String, description: Option<String>, date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            date,
            status: MilestoneStatus::Pending,
            started_at: None,
            deliverable: None,
            completion_note: None,
            completed_at: None,
            revision_requested: false,
            revision_note: None,
            revision_requested_at: None,
            approved_at: None,
            feedback: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }

    pub fn apply(
        &mut self,
        action: MilestoneAction,
        actor: Party,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let allowed = action.actor();
        if actor != allowed {
            return Err(LifecycleError::NotAllowed(allowed));
        }

        match action {
            MilestoneAction::Start => {
                self.expect(&[MilestoneStatus::Pending], MilestoneStatus::InProgress)?;
                self.status = MilestoneStatus::InProgress;
                self.started_at = Some(now);
            }
            MilestoneAction::Complete { deliverable, note } => {
                // pending work may be delivered directly; it is started implicitly
                self.expect(
                    &[MilestoneStatus::Pending, MilestoneStatus::InProgress],
                    MilestoneStatus::Completed,
                )?;
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                }
                if deliverable.is_some() {
                    self.deliverable = deliverable;
                }
                if note.is_some() {
                    self.completion_note = note;
                }
                self.status = MilestoneStatus::Completed;
                self.completed_at = Some(now);
                self.revision_requested = false;
            }
            MilestoneAction::Approve { feedback } => {
                self.expect_reviewable(MilestoneStatus::Completed)?;
                self.approved_at = Some(now);
                self.feedback = feedback;
            }
            MilestoneAction::RequestRevision { note } => {
                self.expect_reviewable(MilestoneStatus::InProgress)?;
                self.status = MilestoneStatus::InProgress;
                self.completed_at = None;
                self.revision_requested = true;
                self.revision_note = note;
                self.revision_requested_at = Some(now);
            }
        }

        Ok(())
    }

    fn expect(&self, from: &[MilestoneStatus], to: MilestoneStatus) -> Result<(), LifecycleError> {
        if from.contains(&self.status) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidMilestoneTransition {
                from: self.status,
                to,
            })
        }
    }

    // approval and revision both act on delivered, not yet approved work
    fn expect_reviewable(&self, to: MilestoneStatus) -> Result<(), LifecycleError> {
        if self.is_approved() {
            return Err(LifecycleError::AlreadyApproved);
        }
        self.expect(&[MilestoneStatus::Completed], to)
    }
}
