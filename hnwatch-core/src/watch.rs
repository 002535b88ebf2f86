use std::sync::Arc;

use anyhow::{anyhow, Context};
use hnwatch_api::{validate_actor_name, Actor, ActorQuery, Store};

use crate::Error;

/// Reference counts of the streams attributed to each actor.
///
/// Counts live in the record store, and every change is one atomic update there, so that
/// concurrent watches and unwatches never lose an update.
#[derive(Clone)]
pub struct WatchRegistry {
    store: Arc<dyn Store>,
}

impl WatchRegistry {
    pub fn new(store: Arc<dyn Store>) -> WatchRegistry {
        WatchRegistry { store }
    }

    /// Increments the watch count of `name`, creating the actor on first watch
    pub async fn watch(&self, name: &str) -> Result<Actor, Error> {
        validate_actor_name(name)?;
        let actor = self
            .store
            .add_to_watch_count(name, 1, true)
            .await
            .with_context(|| format!("incrementing watch count of {name:?}"))?
            .ok_or_else(|| anyhow!("store did not create actor {name:?}"))?;
        tracing::debug!(actor = %actor.name, watch_count = actor.watch_count, "watched actor");
        Ok(actor)
    }

    /// Decrements the watch count of `name`, stopping at zero. Returns `None` for unknown actors.
    pub async fn unwatch(&self, name: &str) -> Result<Option<Actor>, Error> {
        let actor = self
            .store
            .add_to_watch_count(name, -1, false)
            .await
            .with_context(|| format!("decrementing watch count of {name:?}"))?;
        match &actor {
            Some(actor) => {
                tracing::debug!(actor = %actor.name, watch_count = actor.watch_count, "unwatched actor")
            }
            None => tracing::warn!(actor = %name, "unwatching an actor that was never watched"),
        }
        Ok(actor)
    }

    /// Actors with a positive watch count, sorted by name
    pub async fn watched_actors(&self) -> Result<Vec<Actor>, Error> {
        Ok(self
            .store
            .find_actors(&ActorQuery { watched_only: true })
            .await
            .context("listing watched actors")?)
    }

    pub async fn is_watched(&self, name: &str) -> Result<bool, Error> {
        Ok(self
            .store
            .find_actor(name)
            .await
            .with_context(|| format!("fetching actor {name:?}"))?
            .map_or(false, |a| a.is_watched()))
    }
}
