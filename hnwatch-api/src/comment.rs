use std::fmt;

use crate::{Action, CommentAction, CommentMeta, SubmissionId, ThreadBlock, Time};

#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub String);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,

    /// Submission this comment was posted under, if the platform told us
    pub submission_id: Option<SubmissionId>,

    pub parent_id: Option<CommentId>,

    /// Ancestors of this comment, as listed by the platform
    pub contexts: Vec<CommentId>,

    /// Denormalized name of the commenting actor
    pub actor: String,

    pub text: String,
    pub points: i64,
    pub posted_at: Time,
}

impl Comment {
    /// Ids of the ancestors to show alongside this comment: the contexts then the parent,
    /// without duplicates and in order of first appearance
    pub fn ancestor_ids(&self) -> Vec<CommentId> {
        let mut res: Vec<CommentId> = Vec::with_capacity(self.contexts.len() + 1);
        for id in self.contexts.iter().chain(self.parent_id.iter()) {
            if !res.contains(id) {
                res.push(id.clone());
            }
        }
        res
    }

    /// Action with an empty thread, see `Action::attach_thread`
    pub fn action(&self) -> Action {
        Action::Comment(CommentAction {
            id: self.id.clone(),
            text: self.text.clone(),
            points: self.points,
            time: self.posted_at,
            meta: CommentMeta { thread: Vec::new() },
        })
    }

    /// How this comment renders when shown as context of one of its descendants
    pub fn thread_block(&self) -> ThreadBlock {
        ThreadBlock {
            id: self.id.clone(),
            person: self.actor.clone(),
            text: self.text.clone(),
            points: self.points,
            time: self.posted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(s: &str) -> CommentId {
        CommentId(String::from(s))
    }

    fn comment(parent: Option<&str>, contexts: &[&str]) -> Comment {
        Comment {
            id: cid("c0"),
            submission_id: None,
            parent_id: parent.map(cid),
            contexts: contexts.iter().copied().map(cid).collect(),
            actor: String::from("pg"),
            text: String::from("hello"),
            points: 1,
            posted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn ancestors_keep_first_occurrence() {
        assert_eq!(
            comment(Some("c1"), &["c2", "c1"]).ancestor_ids(),
            vec![cid("c2"), cid("c1")]
        );
        assert_eq!(
            comment(Some("c1"), &["c3", "c2"]).ancestor_ids(),
            vec![cid("c3"), cid("c2"), cid("c1")]
        );
        assert_eq!(
            comment(None, &["c2", "c2"]).ancestor_ids(),
            vec![cid("c2")]
        );
        assert!(comment(None, &[]).ancestor_ids().is_empty());
    }
}
