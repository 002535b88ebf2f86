use std::fmt;

use crate::{Action, ActivityObject, ObjectMeta, SubmitAction, Time};

/// Identifier the platform gave to a submission
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Submission {
    pub id: SubmissionId,

    /// Denormalized name of the submitting actor
    pub actor: String,

    pub title: String,

    /// Unknown until the ingestion process fetched it
    pub link: Option<String>,

    pub points: i64,
    pub comment_count: i64,
    pub posted_at: Time,

    /// Dead or removed submissions are kept around but flagged
    pub valid: bool,
}

impl Submission {
    /// The feed object this submission stands for, whatever the action on it
    pub fn object(&self) -> ActivityObject {
        ActivityObject {
            url: self.link.clone(),
            title: Some(self.title.clone()),
            time: Some(self.posted_at),
            meta: Some(ObjectMeta {
                person: self.actor.clone(),
                points: self.points,
                comments: self.comment_count,
            }),
        }
    }

    pub fn action(&self) -> Action {
        Action::Submit(SubmitAction {
            url: self.link.clone(),
            title: self.title.clone(),
            time: self.posted_at,
        })
    }
}
