use async_trait::async_trait;

use crate::{
    Actor, Comment, CommentId, Stream, StreamId, StreamStatus, Submission, SubmissionId, Time,
};

/// One-based page of results
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(number: u32, per_page: u32) -> Page {
        Page {
            number: number.max(1),
            per_page,
        }
    }

    pub fn offset(&self) -> usize {
        (self.number.max(1) as usize - 1) * self.per_page as usize
    }
}

/// Combines an optional limit with an optional page into `(offset, limit)`
pub fn window(limit: Option<usize>, page: Option<Page>) -> (usize, Option<usize>) {
    match page {
        None => (0, limit),
        Some(p) => {
            let per_page = p.per_page as usize;
            (p.offset(), Some(limit.map_or(per_page, |l| l.min(per_page))))
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sort {
    /// Insertion order
    Natural,
    NewestFirst,
    MostPoints,
}

impl Default for Sort {
    fn default() -> Sort {
        Sort::Natural
    }
}

/// Actors are always returned sorted by name
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActorQuery {
    pub watched_only: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubmissionQuery {
    pub actor: Option<String>,
    pub ids: Option<Vec<SubmissionId>>,
    pub posted_since: Option<Time>,
    pub valid_only: bool,
    pub missing_link_only: bool,
    pub sort: Sort,
    pub limit: Option<usize>,
    pub page: Option<Page>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentQuery {
    pub actor: Option<String>,
    pub ids: Option<Vec<CommentId>>,
    pub min_points: Option<i64>,
    pub sort: Sort,
    pub limit: Option<usize>,
    pub page: Option<Page>,
}

/// Streams are always returned in insertion order
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StreamQuery {
    pub ids: Option<Vec<StreamId>>,
    pub config_target: Option<String>,
    pub cache_target: Option<String>,
    pub page: Option<Page>,
}

/// Returned when inserting a stream whose public id is already taken
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StreamIdTaken;

/// Persisted records, as seen by the feed and watch logic.
///
/// Every method is a single round-trip to the underlying store. In particular,
/// `add_to_watch_count` must be one atomic read-modify-write, as concurrent requests watch and
/// unwatch the same actors.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_actor(&self, name: &str) -> anyhow::Result<Option<Actor>>;
    async fn find_actors(&self, q: &ActorQuery) -> anyhow::Result<Vec<Actor>>;

    /// Adds `delta` to the actor's watch count, clamping the result at zero. Creates the actor
    /// if `create` is set, otherwise returns `None` for unknown actors.
    async fn add_to_watch_count(
        &self,
        name: &str,
        delta: i64,
        create: bool,
    ) -> anyhow::Result<Option<Actor>>;

    async fn find_submissions(&self, q: &SubmissionQuery) -> anyhow::Result<Vec<Submission>>;

    /// Inserts or updates by id, never changing the recorded `posted_at`
    async fn upsert_submission(&self, s: &Submission) -> anyhow::Result<()>;

    async fn mark_submission_invalid(&self, id: &SubmissionId) -> anyhow::Result<bool>;

    async fn find_comments(&self, q: &CommentQuery) -> anyhow::Result<Vec<Comment>>;
    async fn upsert_comment(&self, c: &Comment) -> anyhow::Result<()>;

    async fn find_stream(&self, id: &StreamId) -> anyhow::Result<Option<Stream>>;
    async fn find_streams(&self, q: &StreamQuery) -> anyhow::Result<Vec<Stream>>;
    async fn insert_stream(&self, s: &Stream) -> anyhow::Result<Result<(), StreamIdTaken>>;

    /// Saves the title, configuration and cache of a stream, leaving its status untouched.
    /// Returns `false` if there was no stream with this id.
    async fn update_stream(&self, s: &Stream) -> anyhow::Result<bool>;

    async fn delete_stream(&self, id: &StreamId) -> anyhow::Result<bool>;

    /// Sets the status of all matching streams at once, returning how many matched
    async fn set_stream_status(&self, q: &StreamQuery, status: StreamStatus)
        -> anyhow::Result<u64>;
}
