use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use chrono::TimeZone;
use futures::future::BoxFuture;
use hnwatch_api::{
    Actor, ActorQuery, Comment, CommentId, CommentQuery, Store, Stream, StreamId, StreamIdTaken,
    StreamQuery, StreamStatus, Submission, SubmissionId, SubmissionQuery, Time,
};
use hnwatch_mock_store::MemoryStore;

use crate::{FeedConfig, StreamManager};

pub fn at(ts: i64) -> Time {
    chrono::Utc
        .timestamp_opt(1_300_000_000 + ts, 0)
        .single()
        .expect("timestamp out of range")
}

pub fn comment_at(actor: &str, ts: i64) -> Comment {
    Comment {
        id: CommentId(format!("c{ts}")),
        submission_id: None,
        parent_id: None,
        contexts: Vec::new(),
        actor: String::from(actor),
        text: format!("comment posted at {ts}"),
        points: 1,
        posted_at: at(ts),
    }
}

pub fn submission_at(actor: &str, ts: i64) -> Submission {
    Submission {
        id: SubmissionId(format!("s{ts}")),
        actor: String::from(actor),
        title: format!("submission posted at {ts}"),
        link: Some(format!("http://example.com/{ts}")),
        points: 1,
        comment_count: 0,
        posted_at: at(ts),
        valid: true,
    }
}

pub fn manager() -> (Arc<MemoryStore>, StreamManager) {
    let store = Arc::new(MemoryStore::new());
    let manager = StreamManager::new(store.clone(), FeedConfig::default());
    (store, manager)
}

/// Store writes another request can be scheduled right in front of
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Before {
    UpdateStream,
    DeleteStream,
    SetStreamStatus,
}

/// Forwards to a `MemoryStore`, running a scheduled future just before the next matching write
pub struct InterleavingStore {
    inner: Arc<MemoryStore>,
    pending: parking_lot::Mutex<Option<(Before, BoxFuture<'static, ()>)>>,
}

impl InterleavingStore {
    pub fn interleave(&self, before: Before, f: impl Future<Output = ()> + Send + 'static) {
        *self.pending.lock() = Some((before, Box::pin(f)));
    }

    async fn run_pending(&self, op: Before) {
        let f = {
            let mut pending = self.pending.lock();
            match pending.take() {
                Some((before, f)) if before == op => Some(f),
                other => {
                    *pending = other;
                    None
                }
            }
        };
        if let Some(f) = f {
            f.await;
        }
    }
}

#[async_trait]
impl Store for InterleavingStore {
    async fn find_actor(&self, name: &str) -> anyhow::Result<Option<Actor>> {
        self.inner.find_actor(name).await
    }

    async fn find_actors(&self, q: &ActorQuery) -> anyhow::Result<Vec<Actor>> {
        self.inner.find_actors(q).await
    }

    async fn add_to_watch_count(
        &self,
        name: &str,
        delta: i64,
        create: bool,
    ) -> anyhow::Result<Option<Actor>> {
        self.inner.add_to_watch_count(name, delta, create).await
    }

    async fn find_submissions(&self, q: &SubmissionQuery) -> anyhow::Result<Vec<Submission>> {
        self.inner.find_submissions(q).await
    }

    async fn upsert_submission(&self, s: &Submission) -> anyhow::Result<()> {
        self.inner.upsert_submission(s).await
    }

    async fn mark_submission_invalid(&self, id: &SubmissionId) -> anyhow::Result<bool> {
        self.inner.mark_submission_invalid(id).await
    }

    async fn find_comments(&self, q: &CommentQuery) -> anyhow::Result<Vec<Comment>> {
        self.inner.find_comments(q).await
    }

    async fn upsert_comment(&self, c: &Comment) -> anyhow::Result<()> {
        self.inner.upsert_comment(c).await
    }

    async fn find_stream(&self, id: &StreamId) -> anyhow::Result<Option<Stream>> {
        self.inner.find_stream(id).await
    }

    async fn find_streams(&self, q: &StreamQuery) -> anyhow::Result<Vec<Stream>> {
        self.inner.find_streams(q).await
    }

    async fn insert_stream(&self, s: &Stream) -> anyhow::Result<Result<(), StreamIdTaken>> {
        self.inner.insert_stream(s).await
    }

    async fn update_stream(&self, s: &Stream) -> anyhow::Result<bool> {
        self.run_pending(Before::UpdateStream).await;
        self.inner.update_stream(s).await
    }

    async fn delete_stream(&self, id: &StreamId) -> anyhow::Result<bool> {
        self.run_pending(Before::DeleteStream).await;
        self.inner.delete_stream(id).await
    }

    async fn set_stream_status(
        &self,
        q: &StreamQuery,
        status: StreamStatus,
    ) -> anyhow::Result<u64> {
        self.run_pending(Before::SetStreamStatus).await;
        self.inner.set_stream_status(q, status).await
    }
}

/// A manager whose writes can be interleaved with those of a second manager on the same store
pub fn interleaved_managers() -> (
    Arc<MemoryStore>,
    Arc<InterleavingStore>,
    StreamManager,
    StreamManager,
) {
    let store = Arc::new(MemoryStore::new());
    let interleaving = Arc::new(InterleavingStore {
        inner: store.clone(),
        pending: parking_lot::Mutex::new(None),
    });
    let manager = StreamManager::new(interleaving.clone(), FeedConfig::default());
    let other = StreamManager::new(store.clone(), FeedConfig::default());
    (store, interleaving, manager, other)
}
