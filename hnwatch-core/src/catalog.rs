use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use hnwatch_api::{
    validate_actor_name, validate_string, Comment, Sort, Store, Submission, SubmissionId,
    SubmissionQuery,
};

use crate::{Error, FeedConfig};

/// Entry point of the ingestion process, and read access to submissions outside of any stream
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn Store>,
    config: FeedConfig,
}

impl Catalog {
    pub fn new(store: Arc<dyn Store>, config: FeedConfig) -> Catalog {
        Catalog { store, config }
    }

    pub async fn record_submission(&self, s: &Submission) -> Result<(), Error> {
        validate_actor_name(&s.actor)?;
        validate_string(&s.title)?;
        if let Some(link) = &s.link {
            validate_string(link)?;
        }
        self.store
            .upsert_submission(s)
            .await
            .with_context(|| format!("recording submission {}", s.id))?;
        tracing::trace!(submission = %s.id, actor = %s.actor, "recorded submission");
        Ok(())
    }

    pub async fn record_comment(&self, c: &Comment) -> Result<(), Error> {
        validate_actor_name(&c.actor)?;
        validate_string(&c.text)?;
        self.store
            .upsert_comment(c)
            .await
            .with_context(|| format!("recording comment {}", c.id))?;
        tracing::trace!(comment = %c.id, actor = %c.actor, "recorded comment");
        Ok(())
    }

    /// Best-scored valid submissions posted within the configured window
    pub async fn top_recent(&self) -> Result<Vec<Submission>, Error> {
        Ok(self
            .store
            .find_submissions(&SubmissionQuery {
                posted_since: Some(Utc::now() - self.config.top_window),
                valid_only: true,
                sort: Sort::MostPoints,
                limit: Some(self.config.top_limit),
                ..SubmissionQuery::default()
            })
            .await
            .context("fetching top recent submissions")?)
    }

    /// Valid submissions whose link was not fetched yet
    pub async fn unfetched(&self) -> Result<Vec<Submission>, Error> {
        Ok(self
            .store
            .find_submissions(&SubmissionQuery {
                valid_only: true,
                missing_link_only: true,
                ..SubmissionQuery::default()
            })
            .await
            .context("fetching submissions without link")?)
    }

    /// Hides a submission from the top and unfetched listings
    pub async fn mark_invalid(&self, id: &SubmissionId) -> Result<(), Error> {
        let found = self
            .store
            .mark_submission_invalid(id)
            .await
            .with_context(|| format!("invalidating submission {id}"))?;
        if !found {
            return Err(Error::submission_not_found(id.clone()));
        }
        tracing::info!(submission = %id, "marked submission invalid");
        Ok(())
    }
}
