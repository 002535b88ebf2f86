use std::collections::HashMap;

use anyhow::Context;
use hnwatch_api::{Comment, CommentId, CommentQuery, Store, ThreadBlock};

/// Render blocks of the ancestors of a batch of comments
#[derive(Debug, Default)]
pub struct ThreadContext(HashMap<CommentId, ThreadBlock>);

impl ThreadContext {
    /// Fetches the ancestors of all `comments` in a single lookup
    pub async fn load(store: &dyn Store, comments: &[Comment]) -> anyhow::Result<ThreadContext> {
        let mut ids: Vec<CommentId> = Vec::new();
        for c in comments {
            for id in c.ancestor_ids() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        if ids.is_empty() {
            return Ok(ThreadContext::default());
        }
        let num_ids = ids.len();
        let ancestors = store
            .find_comments(&CommentQuery {
                ids: Some(ids),
                ..CommentQuery::default()
            })
            .await
            .with_context(|| format!("fetching {num_ids} thread ancestors"))?;
        if ancestors.len() < num_ids {
            tracing::debug!(
                wanted = num_ids,
                found = ancestors.len(),
                "some thread ancestors are unknown"
            );
        }
        Ok(ThreadContext::from_ancestors(ancestors))
    }

    pub fn from_ancestors(ancestors: impl IntoIterator<Item = Comment>) -> ThreadContext {
        ThreadContext(
            ancestors
                .into_iter()
                .map(|c| (c.id.clone(), c.thread_block()))
                .collect(),
        )
    }

    /// Ancestors of `comment`, outermost first. Unknown ancestors are skipped.
    pub fn thread_for(&self, comment: &Comment) -> Vec<ThreadBlock> {
        comment
            .ancestor_ids()
            .iter()
            .filter_map(|id| self.0.get(id))
            .cloned()
            .collect()
    }
}
