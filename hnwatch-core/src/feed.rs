use std::collections::HashMap;

use anyhow::Context;
use hnwatch_api::{
    ActivityActor, ActivityObject, ActivityTuple, Actor, CommentQuery, FeedItem, Page, Sort,
    Store, SubmissionId, SubmissionQuery,
};

use crate::{interleave_by_posted_at, Error, FeedConfig, ThreadContext};

pub async fn resolve_actor(store: &dyn Store, name: &str) -> Result<Actor, Error> {
    store
        .find_actor(name)
        .await
        .with_context(|| format!("fetching actor {name:?}"))?
        .ok_or_else(|| Error::actor_not_found(name))
}

/// Recent comments and submissions of `actor`, merged newest first, with comment threads
pub async fn tuples(
    store: &dyn Store,
    cfg: &FeedConfig,
    actor: &Actor,
    minimum_points: i64,
) -> Result<Vec<ActivityTuple>, Error> {
    let comments = store
        .find_comments(&CommentQuery {
            actor: Some(actor.name.clone()),
            min_points: Some(minimum_points),
            sort: Sort::NewestFirst,
            limit: Some(cfg.comment_limit),
            ..CommentQuery::default()
        })
        .await
        .with_context(|| format!("fetching comments of {:?}", actor.name))?;
    let submissions = store
        .find_submissions(&SubmissionQuery {
            actor: Some(actor.name.clone()),
            sort: Sort::NewestFirst,
            limit: Some(cfg.submission_limit),
            ..SubmissionQuery::default()
        })
        .await
        .with_context(|| format!("fetching submissions of {:?}", actor.name))?;

    // Objects of the submissions the comments are about, `None` standing for comments we
    // don't know the submission of
    let mut objects: HashMap<Option<SubmissionId>, ActivityObject> = HashMap::new();
    objects.insert(None, ActivityObject::default());
    let mut commented: Vec<SubmissionId> = Vec::new();
    for id in comments.iter().filter_map(|c| c.submission_id.as_ref()) {
        if !commented.contains(id) {
            commented.push(id.clone());
        }
    }
    if !commented.is_empty() {
        let commented = store
            .find_submissions(&SubmissionQuery {
                ids: Some(commented),
                ..SubmissionQuery::default()
            })
            .await
            .context("fetching commented submissions")?;
        objects.extend(commented.iter().map(|s| (Some(s.id.clone()), s.object())));
    }

    let threads = ThreadContext::load(store, &comments).await?;

    let person = ActivityActor {
        person: actor.name.clone(),
    };
    let merged = interleave_by_posted_at(comments, submissions);
    tracing::debug!(actor = %actor.name, num_items = merged.len(), "assembled feed");
    Ok(merged
        .into_iter()
        .map(|item| {
            let object = objects
                .get(&item.submission_id().cloned())
                .cloned()
                .unwrap_or_default();
            let mut action = item.action();
            if let FeedItem::Comment(c) = &item {
                action.attach_thread(threads.thread_for(c));
            }
            ActivityTuple {
                actor: person.clone(),
                object,
                action,
            }
        })
        .collect())
}

/// Comments then submissions of `actor` in insertion order, without any merging
pub async fn activity(
    store: &dyn Store,
    cfg: &FeedConfig,
    actor: &Actor,
    minimum_points: i64,
    page: u32,
) -> Result<Vec<FeedItem>, Error> {
    let comments = store
        .find_comments(&CommentQuery {
            actor: Some(actor.name.clone()),
            min_points: Some(minimum_points),
            sort: Sort::Natural,
            page: Some(Page::new(page, cfg.page_size)),
            ..CommentQuery::default()
        })
        .await
        .with_context(|| format!("fetching comments of {:?}", actor.name))?;
    let submissions = store
        .find_submissions(&SubmissionQuery {
            actor: Some(actor.name.clone()),
            sort: Sort::Natural,
            limit: Some(cfg.submission_limit),
            ..SubmissionQuery::default()
        })
        .await
        .with_context(|| format!("fetching submissions of {:?}", actor.name))?;
    Ok(comments
        .into_iter()
        .map(FeedItem::Comment)
        .chain(submissions.into_iter().map(FeedItem::Submission))
        .collect())
}
