use crate::{Comment, CommentId, Submission, SubmissionId, Time};

/// One entry of a stream feed
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ActivityTuple {
    pub actor: ActivityActor,
    pub object: ActivityObject,
    pub action: Action,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ActivityActor {
    pub person: String,
}

/// The submission an action is about. Serializes to `{}` when the submission is unknown.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ActivityObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ObjectMeta>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ObjectMeta {
    pub person: String,
    pub points: i64,
    pub comments: i64,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Submit(SubmitAction),
    Comment(CommentAction),
}

impl Action {
    /// No-op on submit actions
    pub fn attach_thread(&mut self, thread: Vec<ThreadBlock>) {
        if let Action::Comment(c) = self {
            c.meta.thread = thread;
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SubmitAction {
    pub url: Option<String>,
    pub title: String,
    pub time: Time,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentAction {
    pub id: CommentId,
    pub text: String,
    pub points: i64,
    pub time: Time,
    pub meta: CommentMeta,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentMeta {
    /// Ancestors of the comment, outermost first
    pub thread: Vec<ThreadBlock>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ThreadBlock {
    pub id: CommentId,
    pub person: String,
    pub text: String,
    pub points: i64,
    pub time: Time,
}

/// A record of either kind, as merged into a feed
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedItem {
    Comment(Comment),
    Submission(Submission),
}

impl FeedItem {
    pub fn posted_at(&self) -> Time {
        match self {
            FeedItem::Comment(c) => c.posted_at,
            FeedItem::Submission(s) => s.posted_at,
        }
    }

    /// The submission this item is about: its own id for a submission, the parent submission
    /// for a comment
    pub fn submission_id(&self) -> Option<&SubmissionId> {
        match self {
            FeedItem::Comment(c) => c.submission_id.as_ref(),
            FeedItem::Submission(s) => Some(&s.id),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            FeedItem::Comment(c) => c.action(),
            FeedItem::Submission(s) => s.action(),
        }
    }
}
