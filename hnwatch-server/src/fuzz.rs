#![cfg(test)]

use std::{
    cmp, collections::HashMap, fmt::Debug, ops::RangeTo, panic::AssertUnwindSafe, path::Path,
    sync::Arc,
};

use bolero::generator::TypeGenerator;
use axum::{
    http::{self, request},
    Router,
};
use hnwatch_api::{
    Actor, Error as ApiError, Feed, NewStream, SetStatus, Store, Stream, StreamFeed, StreamStatus,
    StreamUpdate, Submission, WatchOutcome, WatchRequest,
};
use hnwatch_core::FeedConfig;
use hnwatch_mock_store::MemoryStore;
use tower::{Service, ServiceExt};

use crate::*;

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

fn build_pg_cluster(data: &Path) -> postgresfixture::cluster::Cluster {
    let mut runtime = None;
    let mut best_version = None;
    for r in postgresfixture::runtime::Runtime::find_on_path() {
        if let Ok(v) = r.version() {
            match (&mut runtime, &mut best_version) {
                (None, None) => {
                    runtime = Some(r);
                    best_version = Some(v);
                }
                (Some(runtime), Some(best_version)) => {
                    if *best_version < v {
                        *runtime = r;
                        *best_version = v;
                    }
                }
                _ => unreachable!(),
            }
        }
    }
    postgresfixture::cluster::Cluster::new(
        data,
        runtime.expect("postgresql seems to not be installed in path"),
    )
}

/// Spins up a throwaway postgres cluster, applies the migrations and runs `f` against it
pub(crate) fn with_test_db<F>(f: F)
where
    F: FnOnce(&tokio::runtime::Runtime, sqlx::PgPool),
{
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt::try_init();
    }
    let lockfile = tempfile::tempfile().expect("creating tempfile");
    let datadir = tempfile::tempdir().expect("creating tempdir");
    let datadir_path: &Path = datadir.as_ref();
    let cluster = build_pg_cluster(datadir_path);
    let datadir_path: &str = datadir_path.to_str().expect("tempdir is not valid utf8");
    let f = AssertUnwindSafe(f);
    postgresfixture::coordinate::run_and_destroy(&cluster, lockfile.into(), || {
        let f = f;
        cluster.createdb("test_db").expect("creating test_db database");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed initializing tokio runtime");
        let pool = runtime.block_on(async move {
            let pool = create_sqlx_pool(&format!(
                "postgresql://?host={datadir_path}&dbname=test_db"
            ))
            .await
            .expect("creating sqlx pool");
            MIGRATOR
                .run(&mut *pool.acquire().await.expect("getting migrator connection"))
                .await
                .expect("failed applying migrations");
            pool
        });
        (f.0)(&runtime, pool)
    })
    .expect("coordinating spinup and shutdown of the pg cluster");
}

async fn reset_test_db(pool: &sqlx::PgPool) {
    let mut conn = pool.acquire().await.expect("getting db cleanup connection");
    sqlx::query(include_str!("../reset-test-db.sql"))
        .execute(&mut *conn)
        .await
        .expect("failed cleaning up database");
}

macro_rules! do_sqlx_test {
    ( $name:ident, $gen:expr, $fn:expr ) => {
        #[test]
        fn $name() {
            with_test_db(|runtime, pool| {
                let runtime = AssertUnwindSafe(runtime);
                let pool = AssertUnwindSafe(pool);
                bolero::check!()
                    .with_generator($gen)
                    .cloned()
                    .for_each(move |v| {
                        let res = {
                            let pool = sqlx::PgPool::clone(&pool);
                            std::panic::catch_unwind(AssertUnwindSafe(|| {
                                runtime.block_on($fn(pool, v))
                            }))
                        };
                        runtime.block_on(reset_test_db(&pool));
                        if let Err(e) = res {
                            std::panic::resume_unwind(e);
                        }
                    })
            })
        }
    };
}

async fn call<Req, Resp>(
    app: &mut Router,
    req: request::Request<axum::body::Body>,
    req_body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    if status == http::StatusCode::OK {
        if std::any::TypeId::of::<Resp>() == std::any::TypeId::of::<()>() {
            // the server returns an empty body in this situation, which serde_json refuses
            return Ok(serde_json::from_slice(b"null").unwrap());
        }
        return Ok(serde_json::from_slice(&body).unwrap_or_else(|err| {
            panic!("failed parsing resp body ({err}), body is {body:?}, request was {req_body:?}")
        }));
    }
    Err(ApiError::parse(&body)
        .unwrap_or_else(|err| panic!("parsing error response body {err}, body is {body:?}")))
}

async fn run_on_app<Req, Resp>(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug + serde::Serialize,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    let req = request::Builder::new()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serializing request body to json"),
        ))
        .expect("building request");
    call(app, req, body).await
}

fn test_app() -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone(), FeedConfig::default());
    (store, app)
}

fn new_stream(target: &str) -> NewStream {
    NewStream {
        title: format!("watching {target}"),
        target_actor: Some(String::from(target)),
        minimum_points: None,
    }
}

async fn create(app: &mut Router, target: &str) -> Stream {
    run_on_app(app, "POST", "/api/streams", &new_stream(target))
        .await
        .expect("creating stream")
}

#[tokio::test]
async fn stream_lifecycle_over_http() {
    let (store, mut app) = test_app();
    let a = create(&mut app, "pg").await;
    let b = create(&mut app, "pg").await;
    assert_eq!(store.test_watch_count("pg"), Some(2));

    let listed: Vec<Stream> = run_on_app(&mut app, "GET", "/api/streams?page=1", &())
        .await
        .unwrap();
    assert_eq!(listed, vec![a.clone(), b.clone()]);

    let moved: Stream = run_on_app(
        &mut app,
        "PUT",
        &format!("/api/streams/{}", a.id),
        &StreamUpdate {
            target_actor: Some(String::from("sama")),
            ..StreamUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.cache.target_actor.as_deref(), Some("sama"));
    assert_eq!(store.test_watch_count("pg"), Some(1));
    assert_eq!(store.test_watch_count("sama"), Some(1));

    let by_target: Vec<Stream> = run_on_app(&mut app, "GET", "/api/streams?user=sama", &())
        .await
        .unwrap();
    assert_eq!(by_target, vec![moved]);

    let () = run_on_app(&mut app, "DELETE", &format!("/api/streams/{}", b.id), &())
        .await
        .unwrap();
    assert_eq!(store.test_watch_count("pg"), Some(0));
    assert_eq!(
        run_on_app::<_, ()>(&mut app, "DELETE", &format!("/api/streams/{}", b.id), &()).await,
        Err(ApiError::StreamNotFound(b.id))
    );
}

#[tokio::test]
async fn invalid_configuration_is_rejected() {
    let (store, mut app) = test_app();
    let res: Result<Stream, _> = run_on_app(
        &mut app,
        "POST",
        "/api/streams",
        &NewStream {
            title: String::from("nothing"),
            target_actor: Some(String::new()),
            minimum_points: None,
        },
    )
    .await;
    assert!(matches!(res, Err(ApiError::InvalidConfiguration(_))));
    assert_eq!(store.test_num_streams(), 0);
}

#[tokio::test]
async fn unwatching_to_zero_invalidates_and_feeds_still_read() {
    let (store, mut app) = test_app();
    let s = create(&mut app, "pg").await;

    let outcome: WatchOutcome = run_on_app(
        &mut app,
        "POST",
        "/api/watch",
        &WatchRequest {
            user: String::from("pg"),
            unwatch: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.invalidated_streams, 1);
    assert_eq!(store.test_watch_count("pg"), Some(0));

    let feed: StreamFeed = run_on_app(
        &mut app,
        "GET",
        &format!("/api/streams/{}/feed?format=activity", s.id),
        &(),
    )
    .await
    .unwrap();
    assert_eq!(feed.status, StreamStatus::Invalid);
    assert!(matches!(feed.feed, Feed::Activity(ref items) if items.is_empty()));

    let reactivated: Stream = run_on_app(
        &mut app,
        "PUT",
        &format!("/api/streams/{}/status", s.id),
        &SetStatus {
            status: StreamStatus::Active,
        },
    )
    .await
    .unwrap();
    assert!(reactivated.is_valid());

    let watched: Vec<Actor> = run_on_app(&mut app, "GET", "/api/watch", &())
        .await
        .unwrap();
    assert!(watched.is_empty());

    assert_eq!(
        run_on_app::<_, WatchOutcome>(
            &mut app,
            "POST",
            "/api/watch",
            &WatchRequest {
                user: String::from("nobody"),
                unwatch: true,
            },
        )
        .await,
        Err(ApiError::ActorNotFound(String::from("nobody")))
    );
}

#[tokio::test]
async fn store_failures_are_reported_as_unavailable() {
    let (store, mut app) = test_app();
    let s = create(&mut app, "pg").await;
    store.test_set_unavailable(true);
    assert_eq!(
        run_on_app::<_, StreamFeed>(
            &mut app,
            "GET",
            &format!("/api/streams/{}/feed", s.id),
            &()
        )
        .await,
        Err(ApiError::StoreUnavailable)
    );
}

#[tokio::test]
async fn ingested_submissions_show_in_top() {
    let (store, mut app) = test_app();
    let s = Submission {
        id: hnwatch_api::SubmissionId(String::from("1")),
        actor: String::from("pg"),
        title: String::from("Show HN"),
        link: None,
        points: 12,
        comment_count: 3,
        posted_at: chrono::Utc::now(),
        valid: true,
    };
    let () = run_on_app(&mut app, "PUT", "/api/submissions", &s)
        .await
        .unwrap();
    let top: Vec<Submission> = run_on_app(&mut app, "GET", "/api/submissions/top", &())
        .await
        .unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].title, "Show HN");
    assert_eq!(
        store
            .find_submissions(&hnwatch_api::SubmissionQuery::default())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn unfetched_and_invalid_submissions_over_http() {
    let (_store, mut app) = test_app();
    let s = Submission {
        id: hnwatch_api::SubmissionId(String::from("2")),
        actor: String::from("pg"),
        title: String::from("Ask HN"),
        link: None,
        points: 5,
        comment_count: 0,
        posted_at: chrono::Utc::now(),
        valid: true,
    };
    let () = run_on_app(&mut app, "PUT", "/api/submissions", &s)
        .await
        .unwrap();
    let unfetched: Vec<Submission> =
        run_on_app(&mut app, "GET", "/api/submissions/unfetched", &())
            .await
            .unwrap();
    assert_eq!(unfetched, vec![s.clone()]);

    let () = run_on_app(&mut app, "PUT", "/api/submissions/2/invalid", &())
        .await
        .unwrap();
    for uri in ["/api/submissions/unfetched", "/api/submissions/top"] {
        let listed: Vec<Submission> = run_on_app(&mut app, "GET", uri, &()).await.unwrap();
        assert!(listed.is_empty(), "{uri} still lists the invalid submission");
    }
    assert_eq!(
        run_on_app::<_, ()>(&mut app, "PUT", "/api/submissions/3/invalid", &()).await,
        Err(ApiError::SubmissionNotFound(hnwatch_api::SubmissionId(String::from("3"))))
    );
}

#[tokio::test]
async fn preview_without_data_is_not_found() {
    let (_store, mut app) = test_app();
    assert!(matches!(
        run_on_app::<_, Vec<hnwatch_api::ActivityTuple>>(&mut app, "GET", "/api/preview", &())
            .await,
        Err(ApiError::ActorNotFound(_))
    ));
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end); // in case we rounded to 0
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1)) // in case id was actually over end - 1 due to rounding
}

const ACTORS: [&str; 3] = ["pg", "sama", "tptacek"];

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    Create { actor: usize },
    Retarget { stream: usize, actor: usize },
    Destroy { stream: usize },
    Watch { actor: usize },
    Unwatch { actor: usize },
}

/// Tracks what every watch count should be, given the streams alive and the explicit watches
struct Model {
    app: Router,
    store: Arc<dyn Store>,
    streams: Vec<(Stream, &'static str)>,
    counts: HashMap<&'static str, i64>,
}

impl Model {
    fn new(store: Arc<dyn Store>) -> Model {
        Model {
            app: app(store.clone(), FeedConfig::default()),
            store,
            streams: Vec::new(),
            counts: HashMap::new(),
        }
    }

    fn actor(fuzz_id: usize) -> &'static str {
        ACTORS[resize_int(fuzz_id, ..ACTORS.len()).unwrap_or(0)]
    }

    fn add(&mut self, actor: &'static str, delta: i64) {
        let c = self.counts.entry(actor).or_insert(0);
        *c = cmp::max(0, *c + delta);
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::Create { actor } => {
                let actor = Model::actor(actor);
                let s = create(&mut self.app, actor).await;
                self.add(actor, 1);
                self.streams.push((s, actor));
            }
            FuzzOp::Retarget { stream, actor } => {
                if let Some(idx) = resize_int(stream, ..self.streams.len()) {
                    let actor = Model::actor(actor);
                    let (s, prior) = self.streams[idx].clone();
                    let _: Stream = run_on_app(
                        &mut self.app,
                        "PUT",
                        &format!("/api/streams/{}", s.id),
                        &StreamUpdate {
                            target_actor: Some(String::from(actor)),
                            ..StreamUpdate::default()
                        },
                    )
                    .await
                    .expect("retargeting stream");
                    if prior != actor {
                        self.add(prior, -1);
                        self.add(actor, 1);
                    }
                    self.streams[idx].1 = actor;
                }
            }
            FuzzOp::Destroy { stream } => {
                if let Some(idx) = resize_int(stream, ..self.streams.len()) {
                    let (s, actor) = self.streams.remove(idx);
                    let () = run_on_app(
                        &mut self.app,
                        "DELETE",
                        &format!("/api/streams/{}", s.id),
                        &(),
                    )
                    .await
                    .expect("destroying stream");
                    self.add(actor, -1);
                }
            }
            FuzzOp::Watch { actor } | FuzzOp::Unwatch { actor } => {
                let name = Model::actor(actor);
                let unwatch = matches!(op, FuzzOp::Unwatch { .. });
                let res: Result<WatchOutcome, ApiError> = run_on_app(
                    &mut self.app,
                    "POST",
                    "/api/watch",
                    &WatchRequest {
                        user: String::from(name),
                        unwatch,
                    },
                )
                .await;
                match (unwatch, self.counts.contains_key(name), res) {
                    (false, _, Ok(_)) => self.add(name, 1),
                    (true, true, Ok(_)) => self.add(name, -1),
                    (true, false, Err(ApiError::ActorNotFound(_))) => (),
                    (_, _, res) => panic!("unexpected watch result {res:?}"),
                }
            }
        }
        for (name, count) in &self.counts {
            let actor = self.store.find_actor(name).await.expect("fetching actor");
            assert_eq!(actor.map(|a| a.watch_count), Some(*count), "watch count of {name}");
        }
    }
}

do_tokio_test!(fuzz_watch_counts_follow_model, Vec<FuzzOp>, |ops: Vec<FuzzOp>| async move {
    let mut model = Model::new(Arc::new(MemoryStore::new()));
    for op in ops {
        model.execute_fuzz_op(op).await;
    }
});

do_sqlx_test!(
    postgres_watch_counts_follow_model,
    bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..50usize),
    |pool, ops: Vec<FuzzOp>| async move {
        let mut model = Model::new(Arc::new(db::PostgresStore::new(pool)));
        for op in ops {
            model.execute_fuzz_op(op).await;
        }
    }
);
