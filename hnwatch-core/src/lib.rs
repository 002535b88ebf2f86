mod catalog;
pub use catalog::Catalog;

mod config;
pub use config::FeedConfig;

mod error;
pub use error::Error;

mod feed;
pub use feed::{activity, resolve_actor, tuples};

mod interleave;
pub use interleave::interleave_by_posted_at;

mod lifecycle;
pub use lifecycle::StreamManager;

mod thread;
pub use thread::ThreadContext;

mod watch;
pub use watch::WatchRegistry;

pub mod api {
    pub use hnwatch_api::*;
}

#[cfg(test)]
mod test_util;
