use axum::{
    extract::{Path, Query, State},
    Json,
};
use hnwatch_api::{
    ActivityTuple, Actor, Comment, NewStream, SetStatus, Stream, StreamFeed, StreamId,
    StreamUpdate, Submission, SubmissionId, WatchOutcome, WatchRequest,
};
use hnwatch_core::{Catalog, StreamManager};

use crate::{extractors::*, Error};

pub async fn create_stream(
    State(streams): State<StreamManager>,
    Json(data): Json<NewStream>,
) -> Result<Json<Stream>, Error> {
    Ok(Json(streams.create(data).await?))
}

pub async fn list_streams(
    State(streams): State<StreamManager>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Stream>>, Error> {
    Ok(Json(
        streams
            .list(params.page.unwrap_or(1), params.user)
            .await?,
    ))
}

pub async fn preview(
    State(streams): State<StreamManager>,
) -> Result<Json<Vec<ActivityTuple>>, Error> {
    Ok(Json(streams.preview().await?))
}

pub async fn read_feed(
    State(streams): State<StreamManager>,
    Path(sid): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Json<StreamFeed>, Error> {
    Ok(Json(
        streams
            .feed(&StreamId(sid), params.format, params.page.unwrap_or(1))
            .await?,
    ))
}

pub async fn update_stream(
    State(streams): State<StreamManager>,
    Path(sid): Path<String>,
    Json(changes): Json<StreamUpdate>,
) -> Result<Json<Stream>, Error> {
    Ok(Json(streams.update(&StreamId(sid), changes).await?))
}

pub async fn set_stream_status(
    State(streams): State<StreamManager>,
    Path(sid): Path<String>,
    Json(data): Json<SetStatus>,
) -> Result<Json<Stream>, Error> {
    Ok(Json(streams.set_status(&StreamId(sid), data.status).await?))
}

pub async fn destroy_stream(
    State(streams): State<StreamManager>,
    Path(sid): Path<String>,
) -> Result<(), Error> {
    Ok(streams.destroy(&StreamId(sid)).await?)
}

pub async fn watched_actors(
    State(streams): State<StreamManager>,
) -> Result<Json<Vec<Actor>>, Error> {
    Ok(Json(streams.registry().watched_actors().await?))
}

pub async fn watch(
    State(streams): State<StreamManager>,
    Json(req): Json<WatchRequest>,
) -> Result<Json<WatchOutcome>, Error> {
    let outcome = match req.unwatch {
        true => streams.unwatch_actor(&req.user).await?,
        false => streams.watch_actor(&req.user).await?,
    };
    Ok(Json(outcome))
}

pub async fn top_submissions(
    State(catalog): State<Catalog>,
) -> Result<Json<Vec<Submission>>, Error> {
    Ok(Json(catalog.top_recent().await?))
}

pub async fn unfetched_submissions(
    State(catalog): State<Catalog>,
) -> Result<Json<Vec<Submission>>, Error> {
    Ok(Json(catalog.unfetched().await?))
}

pub async fn invalidate_submission(
    State(catalog): State<Catalog>,
    Path(id): Path<String>,
) -> Result<(), Error> {
    Ok(catalog.mark_invalid(&SubmissionId(id)).await?)
}

pub async fn record_submission(
    State(catalog): State<Catalog>,
    Json(s): Json<Submission>,
) -> Result<(), Error> {
    Ok(catalog.record_submission(&s).await?)
}

pub async fn record_comment(
    State(catalog): State<Catalog>,
    Json(c): Json<Comment>,
) -> Result<(), Error> {
    Ok(catalog.record_comment(&c).await?)
}
