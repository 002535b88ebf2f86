/// A tracked platform user
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Actor {
    pub name: String,

    /// Number of streams (and explicit watchers) currently attributed to this actor, never negative
    pub watch_count: i64,
}

impl Actor {
    pub fn new(name: String) -> Actor {
        Actor {
            name,
            watch_count: 0,
        }
    }

    pub fn is_watched(&self) -> bool {
        self.watch_count > 0
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WatchRequest {
    pub user: String,

    #[serde(default)]
    pub unwatch: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WatchOutcome {
    pub actor: Actor,

    /// Streams marked invalid because this request dropped the watch count to zero
    pub invalidated_streams: u64,
}
