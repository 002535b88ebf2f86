use std::{fmt, str::FromStr};

use rand::{distributions::Alphanumeric, Rng};

use crate::{validate_actor_name, validate_string, ActivityTuple, Error, FeedItem};

pub const DEFAULT_STREAM_ID_LEN: usize = 11;
pub const DEFAULT_MINIMUM_POINTS: i64 = 1;

/// Short public identifier of a stream
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct StreamId(pub String);

impl StreamId {
    /// Draws each character uniformly among `[a-zA-Z0-9]`. Uniqueness is left to the store.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, len: usize) -> StreamId {
        StreamId(
            rng.sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect(),
        )
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn generate_stream_id(len: usize) -> StreamId {
    StreamId::generate(&mut rand::thread_rng(), len)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum StreamStatus {
    Active,
    Invalid,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Active => "Active",
            StreamStatus::Invalid => "Invalid",
        }
    }
}

impl Default for StreamStatus {
    fn default() -> StreamStatus {
        StreamStatus::Active
    }
}

impl FromStr for StreamStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<StreamStatus> {
        match s {
            "Active" => Ok(StreamStatus::Active),
            "Invalid" => Ok(StreamStatus::Invalid),
            _ => Err(anyhow::anyhow!("unknown stream status {s:?}")),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StreamConfig {
    pub target_actor: String,
    pub minimum_points: Option<i64>,
}

impl StreamConfig {
    pub fn minimum_points(&self) -> i64 {
        self.minimum_points.unwrap_or(DEFAULT_MINIMUM_POINTS)
    }
}

/// Configuration in effect at the last save
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StreamCache {
    pub target_actor: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Stream {
    pub id: StreamId,
    pub title: String,
    pub config: StreamConfig,
    pub cache: StreamCache,
    pub status: StreamStatus,
}

impl Stream {
    /// A stream that was never saved, hence with an empty cache
    pub fn new(id: StreamId, title: String, config: StreamConfig) -> Stream {
        Stream {
            id,
            title,
            config,
            cache: StreamCache::default(),
            status: StreamStatus::Active,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == StreamStatus::Active
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewStream {
    #[serde(default)]
    pub title: String,

    pub target_actor: Option<String>,
    pub minimum_points: Option<i64>,
}

impl NewStream {
    pub fn validate(&self) -> Result<StreamConfig, Error> {
        validate_string(&self.title)?;
        let target_actor = match self.target_actor.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(Error::InvalidConfiguration(String::from(
                    "missing target actor",
                )))
            }
            Some(target) => target,
        };
        validate_actor_name(target_actor)?;
        Ok(StreamConfig {
            target_actor: String::from(target_actor),
            minimum_points: self.minimum_points,
        })
    }
}

/// Changes to apply to an existing stream, `None` leaving the field untouched
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StreamUpdate {
    pub title: Option<String>,
    pub target_actor: Option<String>,
    pub minimum_points: Option<i64>,
}

impl StreamUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            validate_string(title)?;
        }
        if let Some(target) = &self.target_actor {
            validate_actor_name(target)?;
        }
        Ok(())
    }

    pub fn apply_to(self, stream: &mut Stream) {
        if let Some(title) = self.title {
            stream.title = title;
        }
        if let Some(target) = self.target_actor {
            stream.config.target_actor = target;
        }
        if let Some(points) = self.minimum_points {
            stream.config.minimum_points = Some(points);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SetStatus {
    pub status: StreamStatus,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    Tuples,
    Activity,
}

impl Default for FeedFormat {
    fn default() -> FeedFormat {
        FeedFormat::Tuples
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "format", content = "items", rename_all = "lowercase")]
pub enum Feed {
    Tuples(Vec<ActivityTuple>),
    Activity(Vec<FeedItem>),
}

impl Feed {
    pub fn len(&self) -> usize {
        match self {
            Feed::Tuples(t) => t.len(),
            Feed::Activity(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A feed along with the status of the stream it was read from. Feeds of `Invalid` streams are
/// still served, but should no longer be relied upon.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StreamFeed {
    pub id: StreamId,
    pub title: String,
    pub status: StreamStatus,
    pub feed: Feed,
}
