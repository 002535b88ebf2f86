use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::anyhow;
use async_trait::async_trait;
use hnwatch_api::{
    window, Actor, ActorQuery, Comment, CommentQuery, Page, Sort, Store, Stream, StreamId,
    StreamIdTaken, StreamQuery, StreamStatus, Submission, SubmissionId, SubmissionQuery,
};
use parking_lot::Mutex;

/// In-memory record store. Every operation runs under one lock, which makes each of them atomic.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    failing_watch_counts: AtomicBool,
}

#[derive(Debug, Default)]
struct Tables {
    actors: BTreeMap<String, Actor>,
    // Vecs keep insertion order, which is what `Sort::Natural` returns
    submissions: Vec<Submission>,
    comments: Vec<Comment>,
    streams: Vec<Stream>,
}

fn apply_window<T>(items: Vec<T>, limit: Option<usize>, page: Option<Page>) -> Vec<T> {
    let (offset, limit) = window(limit, page);
    items
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

fn sort_by_posted_at_or_points<T>(
    items: &mut [T],
    sort: Sort,
    posted_at: impl Fn(&T) -> hnwatch_api::Time,
    points: impl Fn(&T) -> i64,
) {
    match sort {
        Sort::Natural => (),
        Sort::NewestFirst => items.sort_by(|a, b| posted_at(b).cmp(&posted_at(a))),
        Sort::MostPoints => items.sort_by(|a, b| points(b).cmp(&points(a))),
    }
}

fn stream_matches(s: &Stream, q: &StreamQuery) -> bool {
    q.ids.as_ref().map_or(true, |ids| ids.contains(&s.id))
        && q.config_target
            .as_ref()
            .map_or(true, |t| *t == s.config.target_actor)
        && q.cache_target
            .as_ref()
            .map_or(true, |t| Some(t) == s.cache.target_actor.as_ref())
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            tables: Mutex::new(Tables::default()),
            unavailable: AtomicBool::new(false),
            failing_watch_counts: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail, as a disconnected database would
    pub fn test_set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only watch count updates fail
    pub fn test_fail_watch_counts(&self, failing: bool) {
        self.failing_watch_counts.store(failing, Ordering::SeqCst);
    }

    /// Current watch count of `name`, `None` if the actor was never created
    pub fn test_watch_count(&self, name: &str) -> Option<i64> {
        self.tables.lock().actors.get(name).map(|a| a.watch_count)
    }

    pub fn test_num_streams(&self) -> usize {
        self.tables.lock().streams.len()
    }

    fn check_available(&self) -> anyhow::Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("memory store is marked unavailable"));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> MemoryStore {
        MemoryStore::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_actor(&self, name: &str) -> anyhow::Result<Option<Actor>> {
        self.check_available()?;
        Ok(self.tables.lock().actors.get(name).cloned())
    }

    async fn find_actors(&self, q: &ActorQuery) -> anyhow::Result<Vec<Actor>> {
        self.check_available()?;
        Ok(self
            .tables
            .lock()
            .actors
            .values()
            .filter(|a| !q.watched_only || a.is_watched())
            .cloned()
            .collect())
    }

    async fn add_to_watch_count(
        &self,
        name: &str,
        delta: i64,
        create: bool,
    ) -> anyhow::Result<Option<Actor>> {
        self.check_available()?;
        if self.failing_watch_counts.load(Ordering::SeqCst) {
            return Err(anyhow!("memory store refuses watch count updates"));
        }
        let mut tables = self.tables.lock();
        if !create && !tables.actors.contains_key(name) {
            return Ok(None);
        }
        let actor = tables
            .actors
            .entry(String::from(name))
            .or_insert_with(|| Actor::new(String::from(name)));
        actor.watch_count = actor.watch_count.saturating_add(delta).max(0);
        Ok(Some(actor.clone()))
    }

    async fn find_submissions(&self, q: &SubmissionQuery) -> anyhow::Result<Vec<Submission>> {
        self.check_available()?;
        let mut res = self
            .tables
            .lock()
            .submissions
            .iter()
            .filter(|s| q.actor.as_ref().map_or(true, |a| *a == s.actor))
            .filter(|s| q.ids.as_ref().map_or(true, |ids| ids.contains(&s.id)))
            .filter(|s| q.posted_since.map_or(true, |t| s.posted_at >= t))
            .filter(|s| !q.valid_only || s.valid)
            .filter(|s| !q.missing_link_only || s.link.is_none())
            .cloned()
            .collect::<Vec<_>>();
        sort_by_posted_at_or_points(&mut res, q.sort, |s| s.posted_at, |s| s.points);
        Ok(apply_window(res, q.limit, q.page))
    }

    async fn upsert_submission(&self, s: &Submission) -> anyhow::Result<()> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        match tables.submissions.iter_mut().find(|old| old.id == s.id) {
            Some(old) => {
                let posted_at = old.posted_at;
                let link = old.link.take();
                *old = s.clone();
                old.posted_at = posted_at;
                old.link = s.link.clone().or(link);
            }
            None => tables.submissions.push(s.clone()),
        }
        Ok(())
    }

    async fn mark_submission_invalid(&self, id: &SubmissionId) -> anyhow::Result<bool> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        match tables.submissions.iter_mut().find(|s| s.id == *id) {
            Some(s) => {
                s.valid = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_comments(&self, q: &CommentQuery) -> anyhow::Result<Vec<Comment>> {
        self.check_available()?;
        let mut res = self
            .tables
            .lock()
            .comments
            .iter()
            .filter(|c| q.actor.as_ref().map_or(true, |a| *a == c.actor))
            .filter(|c| q.ids.as_ref().map_or(true, |ids| ids.contains(&c.id)))
            .filter(|c| q.min_points.map_or(true, |p| c.points >= p))
            .cloned()
            .collect::<Vec<_>>();
        sort_by_posted_at_or_points(&mut res, q.sort, |c| c.posted_at, |c| c.points);
        Ok(apply_window(res, q.limit, q.page))
    }

    async fn upsert_comment(&self, c: &Comment) -> anyhow::Result<()> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        match tables.comments.iter_mut().find(|old| old.id == c.id) {
            Some(old) => {
                let posted_at = old.posted_at;
                *old = c.clone();
                old.posted_at = posted_at;
            }
            None => tables.comments.push(c.clone()),
        }
        Ok(())
    }

    async fn find_stream(&self, id: &StreamId) -> anyhow::Result<Option<Stream>> {
        self.check_available()?;
        Ok(self
            .tables
            .lock()
            .streams
            .iter()
            .find(|s| s.id == *id)
            .cloned())
    }

    async fn find_streams(&self, q: &StreamQuery) -> anyhow::Result<Vec<Stream>> {
        self.check_available()?;
        let res: Vec<Stream> = self
            .tables
            .lock()
            .streams
            .iter()
            .filter(|s| stream_matches(s, q))
            .cloned()
            .collect();
        Ok(apply_window(res, None, q.page))
    }

    async fn insert_stream(&self, s: &Stream) -> anyhow::Result<Result<(), StreamIdTaken>> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        if tables.streams.iter().any(|old| old.id == s.id) {
            return Ok(Err(StreamIdTaken));
        }
        tables.streams.push(s.clone());
        Ok(Ok(()))
    }

    async fn update_stream(&self, s: &Stream) -> anyhow::Result<bool> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        match tables.streams.iter_mut().find(|old| old.id == s.id) {
            Some(old) => {
                old.title = s.title.clone();
                old.config = s.config.clone();
                old.cache = s.cache.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_stream(&self, id: &StreamId) -> anyhow::Result<bool> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        let len_before = tables.streams.len();
        tables.streams.retain(|s| s.id != *id);
        Ok(tables.streams.len() != len_before)
    }

    async fn set_stream_status(
        &self,
        q: &StreamQuery,
        status: StreamStatus,
    ) -> anyhow::Result<u64> {
        self.check_available()?;
        let mut matched = 0;
        for s in self.tables.lock().streams.iter_mut() {
            if stream_matches(s, q) {
                s.status = status;
                matched += 1;
            }
        }
        Ok(matched)
    }
}
