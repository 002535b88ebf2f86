use chrono::Duration;
use hnwatch_api::DEFAULT_STREAM_ID_LEN;

/// Tunables of the feed and stream logic
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Comments fetched per feed, newest first
    pub comment_limit: usize,

    /// Submissions fetched per feed, newest first
    pub submission_limit: usize,

    /// Page size for stream listings and for the comments of `activity` feeds
    pub page_size: u32,

    /// Actors among which `preview` picks one
    pub preview_actors: Vec<String>,

    pub stream_id_len: usize,

    /// How many fresh ids to try when the store reports an id collision
    pub stream_id_attempts: usize,

    /// How far back `top_recent` looks
    pub top_window: Duration,
    pub top_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> FeedConfig {
        FeedConfig {
            comment_limit: 25,
            submission_limit: 20,
            page_size: 25,
            preview_actors: ["pg", "patio11", "tptacek"]
                .into_iter()
                .map(String::from)
                .collect(),
            stream_id_len: DEFAULT_STREAM_ID_LEN,
            stream_id_attempts: 3,
            top_window: Duration::hours(10),
            top_limit: 10,
        }
    }
}
