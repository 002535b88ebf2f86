use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, put},
    Router,
};
use hnwatch_api::Store;
use hnwatch_core::{Catalog, FeedConfig, StreamManager};

mod db;
mod error;
mod extractors;
mod fuzz;
mod handlers;
mod query;

use error::Error;
use extractors::AppState;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(structopt::StructOpt)]
struct Opt {
    /// Postgres database holding actors, submissions, comments and streams
    #[structopt(long, env = "DATABASE_URL")]
    database_url: String,

    #[structopt(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// Streams per page of listings, and comments per page of activity feeds
    #[structopt(long, default_value = "25")]
    page_size: u32,

    #[structopt(long, default_value = "25")]
    comment_limit: usize,

    #[structopt(long, default_value = "20")]
    submission_limit: usize,

    /// Actor the preview feed may show; repeat for several. Defaults to a few well-known users
    #[structopt(long = "preview-actor")]
    preview_actors: Vec<String>,
}

impl Opt {
    fn feed_config(&self) -> FeedConfig {
        let mut cfg = FeedConfig {
            page_size: self.page_size,
            comment_limit: self.comment_limit,
            submission_limit: self.submission_limit,
            ..FeedConfig::default()
        };
        if !self.preview_actors.is_empty() {
            cfg.preview_actors = self.preview_actors.clone();
        }
        cfg
    }
}

pub async fn create_sqlx_pool(db_url: &str) -> anyhow::Result<sqlx::PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(8)
        .connect(db_url)
        .await
        .with_context(|| format!("Error opening database {:?}", db_url))
}

pub fn app(store: Arc<dyn Store>, cfg: FeedConfig) -> Router {
    let state = AppState {
        streams: StreamManager::new(store.clone(), cfg.clone()),
        catalog: Catalog::new(store, cfg),
    };
    Router::new()
        .route(
            "/api/streams",
            get(handlers::list_streams).post(handlers::create_stream),
        )
        .route(
            "/api/streams/:sid",
            put(handlers::update_stream).delete(handlers::destroy_stream),
        )
        .route("/api/streams/:sid/feed", get(handlers::read_feed))
        .route("/api/streams/:sid/status", put(handlers::set_stream_status))
        .route("/api/preview", get(handlers::preview))
        .route(
            "/api/watch",
            get(handlers::watched_actors).post(handlers::watch),
        )
        .route("/api/submissions", put(handlers::record_submission))
        .route("/api/submissions/top", get(handlers::top_submissions))
        .route(
            "/api/submissions/unfetched",
            get(handlers::unfetched_submissions),
        )
        .route(
            "/api/submissions/:id/invalid",
            put(handlers::invalidate_submission),
        )
        .route("/api/comments", put(handlers::record_comment))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let pool = create_sqlx_pool(&opt.database_url).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("running pending migrations")?;

    let app = app(Arc::new(db::PostgresStore::new(pool)), opt.feed_config());

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}
