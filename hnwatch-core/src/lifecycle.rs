use std::sync::Arc;

use anyhow::Context;
use hnwatch_api::{
    generate_stream_id, ActivityTuple, Actor, Feed, FeedFormat, NewStream, Page, Store, Stream,
    StreamFeed, StreamId, StreamIdTaken, StreamQuery, StreamStatus, StreamUpdate, WatchOutcome,
    DEFAULT_MINIMUM_POINTS,
};
use rand::seq::SliceRandom;

use crate::{feed, Error, FeedConfig, WatchRegistry};

/// Creates, edits and destroys streams, keeping the watch counts of their target actors in sync.
///
/// Every stream that was saved at least once accounts for exactly one watch on the actor
/// recorded in its cache. The hooks below move that watch around whenever the configured
/// target changes.
#[derive(Clone)]
pub struct StreamManager {
    store: Arc<dyn Store>,
    registry: WatchRegistry,
    config: FeedConfig,
}

impl StreamManager {
    pub fn new(store: Arc<dyn Store>, config: FeedConfig) -> StreamManager {
        StreamManager {
            registry: WatchRegistry::new(store.clone()),
            store,
            config,
        }
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Moves the watch of `stream` from its cached target to its configured target.
    ///
    /// On failure the cache is left as it was and so is the watch count of the prior target.
    pub async fn on_before_save(&self, stream: &mut Stream) -> Result<(), Error> {
        let prior = stream.cache.target_actor.clone();
        let target = stream.config.target_actor.clone();
        if prior.as_deref() == Some(target.as_str()) {
            return Ok(());
        }
        if let Some(prior) = &prior {
            self.registry.unwatch(prior).await?;
        }
        stream.cache.target_actor = Some(target.clone());
        if let Err(e) = self.registry.watch(&target).await {
            stream.cache.target_actor = prior.clone();
            if let Some(prior) = &prior {
                if let Err(err) = self.registry.watch(prior).await {
                    tracing::error!(?err, actor = %prior, stream = %stream.id, "failed restoring watch");
                }
            }
            return Err(e);
        }
        tracing::debug!(stream = %stream.id, from = ?prior, to = %target, "moved stream watch");
        Ok(())
    }

    pub async fn on_before_destroy(&self, stream: &Stream) -> Result<(), Error> {
        if let Some(target) = &stream.cache.target_actor {
            self.registry.unwatch(target).await?;
        }
        Ok(())
    }

    /// Undoes a successful `on_before_save` whose stream could not be persisted
    async fn rollback_save(&self, stream: &Stream, prior: Option<String>) {
        if stream.cache.target_actor == prior {
            return;
        }
        if let Some(target) = &stream.cache.target_actor {
            if let Err(err) = self.registry.unwatch(target).await {
                tracing::error!(?err, actor = %target, stream = %stream.id, "failed releasing watch");
            }
        }
        if let Some(prior) = &prior {
            if let Err(err) = self.registry.watch(prior).await {
                tracing::error!(?err, actor = %prior, stream = %stream.id, "failed restoring watch");
            }
        }
    }

    fn fresh_id(&self) -> StreamId {
        generate_stream_id(self.config.stream_id_len)
    }

    pub async fn create(&self, new: NewStream) -> Result<Stream, Error> {
        let config = new.validate()?;
        let mut stream = Stream::new(self.fresh_id(), new.title, config);
        self.on_before_save(&mut stream).await?;
        for attempt in 1..=self.config.stream_id_attempts.max(1) {
            match self.store.insert_stream(&stream).await {
                Ok(Ok(())) => {
                    tracing::info!(stream = %stream.id, target = %stream.config.target_actor, "created stream");
                    return Ok(stream);
                }
                Ok(Err(StreamIdTaken)) => {
                    tracing::warn!(stream = %stream.id, attempt, "stream id already in use");
                    if attempt < self.config.stream_id_attempts {
                        stream.id = self.fresh_id();
                    }
                }
                Err(e) => {
                    self.rollback_save(&stream, None).await;
                    return Err(Error::from(e.context(format!("inserting stream {}", stream.id))));
                }
            }
        }
        self.rollback_save(&stream, None).await;
        Err(Error::stream_id_already_used(stream.id))
    }

    pub async fn get(&self, sid: &StreamId) -> Result<Stream, Error> {
        self.store
            .find_stream(sid)
            .await
            .with_context(|| format!("fetching stream {sid}"))?
            .ok_or_else(|| Error::stream_not_found(sid.clone()))
    }

    pub async fn update(&self, sid: &StreamId, changes: StreamUpdate) -> Result<Stream, Error> {
        changes.validate()?;
        let mut stream = self.get(sid).await?;
        let prior = stream.cache.target_actor.clone();
        changes.apply_to(&mut stream);
        self.on_before_save(&mut stream).await?;
        match self.store.update_stream(&stream).await {
            Ok(true) => {
                tracing::info!(stream = %stream.id, target = %stream.config.target_actor, "updated stream");
                Ok(stream)
            }
            Ok(false) => {
                // destroyed since we loaded it, the destroy releasing the watch of `prior`
                self.rollback_save(&stream, prior).await;
                Err(Error::stream_not_found(sid.clone()))
            }
            Err(e) => {
                self.rollback_save(&stream, prior).await;
                Err(Error::from(e.context(format!("updating stream {sid}"))))
            }
        }
    }

    pub async fn destroy(&self, sid: &StreamId) -> Result<(), Error> {
        let stream = self.get(sid).await?;
        self.on_before_destroy(&stream).await?;
        match self.store.delete_stream(sid).await {
            Ok(true) => {
                tracing::info!(stream = %sid, "destroyed stream");
                Ok(())
            }
            Ok(false) => {
                // someone else destroyed it meanwhile, and released its watch already
                self.rollback_destroy(&stream).await;
                Err(Error::stream_not_found(sid.clone()))
            }
            Err(e) => {
                self.rollback_destroy(&stream).await;
                Err(Error::from(e.context(format!("deleting stream {sid}"))))
            }
        }
    }

    /// Undoes a successful `on_before_destroy` whose stream was not deleted by us
    async fn rollback_destroy(&self, stream: &Stream) {
        if let Some(target) = &stream.cache.target_actor {
            if let Err(err) = self.registry.watch(target).await {
                tracing::error!(?err, actor = %target, stream = %stream.id, "failed restoring watch");
            }
        }
    }

    /// Sets the status without touching any watch count, eg. to reactivate an invalid stream
    pub async fn set_status(&self, sid: &StreamId, status: StreamStatus) -> Result<Stream, Error> {
        let matched = self
            .store
            .set_stream_status(
                &StreamQuery {
                    ids: Some(vec![sid.clone()]),
                    ..StreamQuery::default()
                },
                status,
            )
            .await
            .with_context(|| format!("setting status of stream {sid}"))?;
        if matched == 0 {
            return Err(Error::stream_not_found(sid.clone()));
        }
        tracing::info!(stream = %sid, status = status.as_str(), "set stream status");
        self.get(sid).await
    }

    /// Marks every stream currently attributed to `actor` as invalid, returning how many were
    pub async fn invalidate(&self, actor: &str) -> Result<u64, Error> {
        let num = self
            .store
            .set_stream_status(
                &StreamQuery {
                    cache_target: Some(String::from(actor)),
                    ..StreamQuery::default()
                },
                StreamStatus::Invalid,
            )
            .await
            .with_context(|| format!("invalidating streams of {actor:?}"))?;
        tracing::info!(%actor, num_streams = num, "invalidated streams");
        Ok(num)
    }

    pub async fn watch_actor(&self, name: &str) -> Result<WatchOutcome, Error> {
        Ok(WatchOutcome {
            actor: self.registry.watch(name).await?,
            invalidated_streams: 0,
        })
    }

    /// Explicit unwatch request. Invalidates the actor's streams once nobody watches it anymore.
    pub async fn unwatch_actor(&self, name: &str) -> Result<WatchOutcome, Error> {
        let actor = self
            .registry
            .unwatch(name)
            .await?
            .ok_or_else(|| Error::actor_not_found(name))?;
        let invalidated_streams = match actor.is_watched() {
            true => 0,
            false => self.invalidate(name).await?,
        };
        Ok(WatchOutcome {
            actor,
            invalidated_streams,
        })
    }

    /// A page of streams, or all the streams configured for `target` if it is set
    pub async fn list(&self, page: u32, target: Option<String>) -> Result<Vec<Stream>, Error> {
        let page = match target {
            Some(_) => None,
            None => Some(Page::new(page, self.config.page_size)),
        };
        Ok(self
            .store
            .find_streams(&StreamQuery {
                config_target: target,
                page,
                ..StreamQuery::default()
            })
            .await
            .context("listing streams")?)
    }

    pub async fn tuples(
        &self,
        stream: &Stream,
        actor: Option<Actor>,
    ) -> Result<Vec<ActivityTuple>, Error> {
        let actor = match actor {
            Some(actor) => actor,
            None => feed::resolve_actor(&*self.store, &stream.config.target_actor).await?,
        };
        feed::tuples(
            &*self.store,
            &self.config,
            &actor,
            stream.config.minimum_points(),
        )
        .await
    }

    /// Reads the feed of a stream, whatever its status
    pub async fn feed(
        &self,
        sid: &StreamId,
        format: FeedFormat,
        page: u32,
    ) -> Result<StreamFeed, Error> {
        let stream = self.get(sid).await?;
        if !stream.is_valid() {
            tracing::debug!(stream = %sid, "reading feed of an invalid stream");
        }
        let feed = match format {
            FeedFormat::Tuples => Feed::Tuples(self.tuples(&stream, None).await?),
            FeedFormat::Activity => {
                let actor = feed::resolve_actor(&*self.store, &stream.config.target_actor).await?;
                Feed::Activity(
                    feed::activity(
                        &*self.store,
                        &self.config,
                        &actor,
                        stream.config.minimum_points(),
                        page,
                    )
                    .await?,
                )
            }
        };
        Ok(StreamFeed {
            id: stream.id,
            title: stream.title,
            status: stream.status,
            feed,
        })
    }

    /// Tuples of a randomly picked showcase actor, without saving any stream
    pub async fn preview(&self) -> Result<Vec<ActivityTuple>, Error> {
        let name = self
            .config
            .preview_actors
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                Error::Api(hnwatch_api::Error::InvalidConfiguration(String::from(
                    "no preview actors configured",
                )))
            })?;
        let actor = feed::resolve_actor(&*self.store, &name).await?;
        feed::tuples(&*self.store, &self.config, &actor, DEFAULT_MINIMUM_POINTS).await
    }
}

#[cfg(test)]
mod tests {
    use hnwatch_api::{Action, FeedItem};
    use hnwatch_mock_store::MemoryStore;

    use super::*;
    use crate::test_util::{comment_at, interleaved_managers, manager, submission_at, Before};

    fn new_stream(target: &str) -> NewStream {
        NewStream {
            title: format!("watching {target}"),
            target_actor: Some(String::from(target)),
            minimum_points: None,
        }
    }

    fn retarget(target: &str) -> StreamUpdate {
        StreamUpdate {
            target_actor: Some(String::from(target)),
            ..StreamUpdate::default()
        }
    }

    fn rename(title: &str) -> StreamUpdate {
        StreamUpdate {
            title: Some(String::from(title)),
            ..StreamUpdate::default()
        }
    }

    fn is_not_found<T>(r: &Result<T, Error>) -> bool {
        matches!(r, Err(Error::Api(hnwatch_api::Error::StreamNotFound(_))))
    }

    #[tokio::test]
    async fn streams_hold_one_watch_each() {
        let (store, m) = manager();
        let a = m.create(new_stream("pg")).await.unwrap();
        let b = m.create(new_stream("pg")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.cache.target_actor.as_deref(), Some("pg"));
        assert_eq!(store.test_watch_count("pg"), Some(2));

        m.destroy(&a.id).await.unwrap();
        assert_eq!(store.test_watch_count("pg"), Some(1));
        m.destroy(&b.id).await.unwrap();
        assert_eq!(store.test_watch_count("pg"), Some(0));
        assert_eq!(store.test_num_streams(), 0);
        assert_eq!(m.invalidate("pg").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn retargeting_moves_the_watch() {
        let (store, m) = manager();
        let s = m.create(new_stream("pg")).await.unwrap();
        m.registry().watch("sama").await.unwrap();

        let s = m.update(&s.id, retarget("sama")).await.unwrap();
        assert_eq!(s.cache.target_actor.as_deref(), Some("sama"));
        assert_eq!(store.test_watch_count("pg"), Some(0));
        assert_eq!(store.test_watch_count("sama"), Some(2));

        // saving again without changing the target moves nothing
        let s = m.update(&s.id, rename("renamed")).await.unwrap();
        assert_eq!(s.title, "renamed");
        assert_eq!(store.test_watch_count("pg"), Some(0));
        assert_eq!(store.test_watch_count("sama"), Some(2));
        assert_eq!(m.get(&s.id).await.unwrap(), s);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn retargeting_is_unaffected_by_concurrent_watches() {
        let (store, m) = manager();
        let s = m.create(new_stream("pg")).await.unwrap();
        let mut tasks = Vec::new();
        for i in 0..50 {
            let m = m.clone();
            tasks.push(tokio::spawn(async move {
                let name = format!("other{}", i % 5);
                m.watch_actor(&name).await.unwrap();
                m.unwatch_actor(&name).await.unwrap();
            }));
        }
        m.update(&s.id, retarget("sama")).await.unwrap();
        futures::future::try_join_all(tasks).await.unwrap();
        assert_eq!(store.test_watch_count("pg"), Some(0));
        assert_eq!(store.test_watch_count("sama"), Some(1));
    }

    #[tokio::test]
    async fn status_changes_keep_concurrent_retargets() {
        let (store, hooks, m, other) = interleaved_managers();
        let s = m.create(new_stream("pg")).await.unwrap();
        let sid = s.id.clone();
        hooks.interleave(Before::SetStreamStatus, async move {
            other.update(&sid, retarget("sama")).await.unwrap();
        });

        let s = m.set_status(&s.id, StreamStatus::Invalid).await.unwrap();
        assert_eq!(s.status, StreamStatus::Invalid);
        assert_eq!(s.config.target_actor, "sama");
        assert_eq!(s.cache.target_actor.as_deref(), Some("sama"));
        assert_eq!(store.test_watch_count("pg"), Some(0));
        assert_eq!(store.test_watch_count("sama"), Some(1));

        m.destroy(&s.id).await.unwrap();
        assert_eq!(store.test_watch_count("sama"), Some(0));
    }

    #[tokio::test]
    async fn updates_keep_concurrent_invalidations() {
        let (_store, hooks, m, other) = interleaved_managers();
        let s = m.create(new_stream("pg")).await.unwrap();
        hooks.interleave(Before::UpdateStream, async move {
            assert_eq!(other.invalidate("pg").await.unwrap(), 1);
        });

        m.update(&s.id, rename("renamed")).await.unwrap();
        let s = m.get(&s.id).await.unwrap();
        assert_eq!(s.title, "renamed");
        assert_eq!(s.status, StreamStatus::Invalid);
    }

    #[tokio::test]
    async fn updating_a_concurrently_destroyed_stream_releases_one_watch() {
        let (store, hooks, m, other) = interleaved_managers();
        m.watch_actor("pg").await.unwrap();

        let s = m.create(new_stream("pg")).await.unwrap();
        let (sid, destroyer) = (s.id.clone(), other.clone());
        hooks.interleave(Before::UpdateStream, async move {
            destroyer.destroy(&sid).await.unwrap();
        });
        assert!(is_not_found(&m.update(&s.id, rename("renamed")).await));
        assert_eq!(store.test_watch_count("pg"), Some(1));

        let s = m.create(new_stream("pg")).await.unwrap();
        let sid = s.id.clone();
        hooks.interleave(Before::UpdateStream, async move {
            other.destroy(&sid).await.unwrap();
        });
        assert!(is_not_found(&m.update(&s.id, retarget("sama")).await));
        assert_eq!(store.test_watch_count("pg"), Some(1));
        assert_eq!(store.test_watch_count("sama"), Some(0));
        assert_eq!(store.test_num_streams(), 0);
    }

    #[tokio::test]
    async fn concurrent_destroys_release_one_watch() {
        let (store, hooks, m, other) = interleaved_managers();
        m.watch_actor("pg").await.unwrap();
        let s = m.create(new_stream("pg")).await.unwrap();
        let sid = s.id.clone();
        hooks.interleave(Before::DeleteStream, async move {
            other.destroy(&sid).await.unwrap();
        });

        assert!(is_not_found(&m.destroy(&s.id).await));
        assert_eq!(store.test_watch_count("pg"), Some(1));
        assert_eq!(store.test_num_streams(), 0);
    }

    #[tokio::test]
    async fn create_rejects_missing_target() {
        let (store, m) = manager();
        let res = m
            .create(NewStream {
                title: String::from("no target"),
                target_actor: None,
                minimum_points: None,
            })
            .await;
        assert!(matches!(
            res,
            Err(Error::Api(hnwatch_api::Error::InvalidConfiguration(_)))
        ));
        assert_eq!(store.test_num_streams(), 0);
    }

    #[tokio::test]
    async fn failing_hook_persists_nothing() {
        let (store, m) = manager();
        store.test_fail_watch_counts(true);
        assert!(matches!(
            m.create(new_stream("pg")).await,
            Err(Error::Store(_))
        ));
        assert_eq!(store.test_num_streams(), 0);
        assert_eq!(store.test_watch_count("pg"), None);
    }

    #[tokio::test]
    async fn failing_hook_keeps_the_prior_target() {
        let (store, m) = manager();
        let s = m.create(new_stream("pg")).await.unwrap();
        store.test_fail_watch_counts(true);
        assert!(m.update(&s.id, retarget("sama")).await.is_err());
        store.test_fail_watch_counts(false);

        let s = m.get(&s.id).await.unwrap();
        assert_eq!(s.config.target_actor, "pg");
        assert_eq!(s.cache.target_actor.as_deref(), Some("pg"));
        assert_eq!(store.test_watch_count("pg"), Some(1));
        assert_eq!(store.test_watch_count("sama"), None);

        store.test_fail_watch_counts(true);
        assert!(m.destroy(&s.id).await.is_err());
        assert_eq!(store.test_num_streams(), 1);
    }

    #[tokio::test]
    async fn exhausted_id_retries_release_the_watch() {
        let store = Arc::new(MemoryStore::new());
        let m = StreamManager::new(
            store.clone(),
            FeedConfig {
                // every generated id is the empty string, so the second stream always collides
                stream_id_len: 0,
                ..FeedConfig::default()
            },
        );
        m.create(new_stream("pg")).await.unwrap();
        assert!(matches!(
            m.create(new_stream("pg")).await,
            Err(Error::Api(hnwatch_api::Error::StreamIdAlreadyUsed(_)))
        ));
        assert_eq!(store.test_num_streams(), 1);
        assert_eq!(store.test_watch_count("pg"), Some(1));
    }

    #[tokio::test]
    async fn unknown_streams_are_not_found() {
        let (_store, m) = manager();
        let sid = StreamId(String::from("nope"));
        assert!(is_not_found(&m.get(&sid).await));
        assert!(is_not_found(&m.update(&sid, retarget("pg")).await));
        assert!(is_not_found(&m.destroy(&sid).await));
        assert!(is_not_found(&m.set_status(&sid, StreamStatus::Active).await));
        assert!(is_not_found(&m.feed(&sid, FeedFormat::Tuples, 1).await));
    }

    #[tokio::test]
    async fn last_unwatch_invalidates_streams() {
        let (store, m) = manager();
        let s = m.create(new_stream("pg")).await.unwrap();
        let other = m.create(new_stream("sama")).await.unwrap();

        let outcome = m.unwatch_actor("pg").await.unwrap();
        assert_eq!(outcome.actor.watch_count, 0);
        assert_eq!(outcome.invalidated_streams, 1);
        assert_eq!(store.test_watch_count("pg"), Some(0));
        assert_eq!(m.get(&s.id).await.unwrap().status, StreamStatus::Invalid);
        assert_eq!(m.get(&other.id).await.unwrap().status, StreamStatus::Active);

        // invalid streams can still be read, and say so
        store.upsert_comment(&comment_at("pg", 20)).await.unwrap();
        store
            .upsert_submission(&submission_at("pg", 10))
            .await
            .unwrap();
        let feed = m.feed(&s.id, FeedFormat::Tuples, 1).await.unwrap();
        assert_eq!(feed.status, StreamStatus::Invalid);
        assert_eq!(feed.feed.len(), 1);

        let s = m.set_status(&s.id, StreamStatus::Active).await.unwrap();
        assert!(s.is_valid());
        assert_eq!(store.test_watch_count("pg"), Some(0));
    }

    #[tokio::test]
    async fn unwatch_keeps_streams_while_still_watched() {
        let (_store, m) = manager();
        let s = m.create(new_stream("pg")).await.unwrap();
        m.watch_actor("pg").await.unwrap();
        let outcome = m.unwatch_actor("pg").await.unwrap();
        assert_eq!(outcome.actor.watch_count, 1);
        assert_eq!(outcome.invalidated_streams, 0);
        assert!(m.get(&s.id).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn unwatching_unknown_actor_is_not_found() {
        let (_store, m) = manager();
        assert!(matches!(
            m.unwatch_actor("nobody").await,
            Err(Error::Api(hnwatch_api::Error::ActorNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn listing_pages_or_filters() {
        let (_store, m) = manager();
        for target in ["pg", "sama", "pg"] {
            m.create(new_stream(target)).await.unwrap();
        }
        assert_eq!(m.list(1, None).await.unwrap().len(), 3);
        assert!(m.list(2, None).await.unwrap().is_empty());
        let pg = m.list(1, Some(String::from("pg"))).await.unwrap();
        assert_eq!(pg.len(), 2);
        assert!(pg.iter().all(|s| s.config.target_actor == "pg"));
    }

    #[tokio::test]
    async fn feed_formats() {
        let (store, m) = manager();
        let s = m.create(new_stream("pg")).await.unwrap();
        for ts in [10, 30] {
            store
                .upsert_submission(&submission_at("pg", ts))
                .await
                .unwrap();
            store.upsert_comment(&comment_at("pg", ts + 5)).await.unwrap();
        }

        let feed = m.feed(&s.id, FeedFormat::Tuples, 1).await.unwrap();
        assert_eq!(feed.title, "watching pg");
        match feed.feed {
            Feed::Tuples(t) => {
                // comment 35, submission 30, comment 15, then comments run out
                assert!(matches!(t[0].action, Action::Comment(_)));
                assert_eq!(t.len(), 3);
            }
            f => panic!("unexpected feed {f:?}"),
        }

        let feed = m.feed(&s.id, FeedFormat::Activity, 1).await.unwrap();
        match feed.feed {
            Feed::Activity(items) => {
                assert_eq!(items.len(), 4);
                assert!(matches!(items[0], FeedItem::Comment(_)));
                assert!(matches!(items[3], FeedItem::Submission(_)));
            }
            f => panic!("unexpected feed {f:?}"),
        }
    }

    #[tokio::test]
    async fn tuples_accept_an_explicit_actor() {
        let (store, m) = manager();
        let s = m.create(new_stream("pg")).await.unwrap();
        store.upsert_comment(&comment_at("sama", 20)).await.unwrap();
        store
            .upsert_submission(&submission_at("sama", 10))
            .await
            .unwrap();
        let sama = m.registry().watch("sama").await.unwrap();
        let t = m.tuples(&s, Some(sama)).await.unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].actor.person, "sama");
    }

    #[tokio::test]
    async fn preview_uses_a_showcase_actor() {
        let (store, m) = manager();
        for (i, name) in m.config().preview_actors.iter().enumerate() {
            m.registry().watch(name).await.unwrap();
            store
                .upsert_comment(&comment_at(name, 20 + i as i64))
                .await
                .unwrap();
        }
        store.upsert_submission(&submission_at("pg", 10)).await.unwrap();
        let tuples = m.preview().await.unwrap();
        assert!(tuples.len() <= 1);
        assert!(tuples
            .iter()
            .all(|t| m.config().preview_actors.contains(&t.actor.person)));
        assert_eq!(store.test_num_streams(), 0);
    }

    #[tokio::test]
    async fn preview_of_unknown_actors_is_not_found() {
        let (_store, m) = manager();
        assert!(matches!(
            m.preview().await,
            Err(Error::Api(hnwatch_api::Error::ActorNotFound(_)))
        ));
    }
}
