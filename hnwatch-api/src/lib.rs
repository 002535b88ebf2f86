use chrono::Utc;

mod activity;
pub use activity::{
    Action, ActivityActor, ActivityObject, ActivityTuple, CommentAction, CommentMeta, FeedItem,
    ObjectMeta, SubmitAction, ThreadBlock,
};

mod actor;
pub use actor::{Actor, WatchOutcome, WatchRequest};

mod comment;
pub use comment::{Comment, CommentId};

mod error;
pub use error::Error;

mod store;
pub use store::{
    window, ActorQuery, CommentQuery, Page, Sort, Store, StreamIdTaken, StreamQuery,
    SubmissionQuery,
};

mod stream;
pub use stream::{
    generate_stream_id, Feed, FeedFormat, NewStream, SetStatus, Stream, StreamCache, StreamConfig,
    StreamFeed, StreamId, StreamStatus, StreamUpdate, DEFAULT_MINIMUM_POINTS,
    DEFAULT_STREAM_ID_LEN,
};

mod submission;
pub use submission::{Submission, SubmissionId};

pub type Time = chrono::DateTime<Utc>;

/// Postgres rejects strings containing null bytes, so refuse them early
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}

pub fn validate_actor_name(name: &str) -> Result<(), Error> {
    validate_string(name)?;
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidName(String::from(name)));
    }
    Ok(())
}
