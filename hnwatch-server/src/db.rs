use anyhow::Context;
use async_trait::async_trait;
use hnwatch_api::{
    Actor, ActorQuery, Comment, CommentId, CommentQuery, Store, Stream, StreamCache,
    StreamConfig, StreamId, StreamIdTaken, StreamQuery, StreamStatus, Submission, SubmissionId,
    SubmissionQuery, Time,
};

use crate::query::{self, bind_all};

const SUBMISSION_COLUMNS: &str = "id, actor, title, link, points, comment_count, posted_at, valid";
const COMMENT_COLUMNS: &str =
    "id, submission_id, parent_id, contexts, actor, body, points, posted_at";
const STREAM_COLUMNS: &str =
    "id, title, target_actor, minimum_points, cache_target_actor, status";

#[derive(sqlx::FromRow)]
struct ActorRow {
    name: String,
    watch_count: i64,
}

impl From<ActorRow> for Actor {
    fn from(r: ActorRow) -> Actor {
        Actor {
            name: r.name,
            watch_count: r.watch_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: String,
    actor: String,
    title: String,
    link: Option<String>,
    points: i64,
    comment_count: i64,
    posted_at: Time,
    valid: bool,
}

impl From<SubmissionRow> for Submission {
    fn from(r: SubmissionRow) -> Submission {
        Submission {
            id: SubmissionId(r.id),
            actor: r.actor,
            title: r.title,
            link: r.link,
            points: r.points,
            comment_count: r.comment_count,
            posted_at: r.posted_at,
            valid: r.valid,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: String,
    submission_id: Option<String>,
    parent_id: Option<String>,
    contexts: Vec<String>,
    actor: String,
    body: String,
    points: i64,
    posted_at: Time,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Comment {
        Comment {
            id: CommentId(r.id),
            submission_id: r.submission_id.map(SubmissionId),
            parent_id: r.parent_id.map(CommentId),
            contexts: r.contexts.into_iter().map(CommentId).collect(),
            actor: r.actor,
            text: r.body,
            points: r.points,
            posted_at: r.posted_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StreamRow {
    id: String,
    title: String,
    target_actor: String,
    minimum_points: Option<i64>,
    cache_target_actor: Option<String>,
    status: String,
}

impl TryFrom<StreamRow> for Stream {
    type Error = anyhow::Error;

    fn try_from(r: StreamRow) -> anyhow::Result<Stream> {
        Ok(Stream {
            status: r
                .status
                .parse()
                .with_context(|| format!("parsing status of stream {:?}", r.id))?,
            id: StreamId(r.id),
            title: r.title,
            config: StreamConfig {
                target_actor: r.target_actor,
                minimum_points: r.minimum_points,
            },
            cache: StreamCache {
                target_actor: r.cache_target_actor,
            },
        })
    }
}

/// Record store backed by the tables of `migrations/`
pub struct PostgresStore {
    pool: sqlx::PgPool,
}

impl PostgresStore {
    pub fn new(pool: sqlx::PgPool) -> PostgresStore {
        PostgresStore { pool }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn find_actor(&self, name: &str) -> anyhow::Result<Option<Actor>> {
        Ok(sqlx::query_as::<_, ActorRow>(
            "SELECT name, watch_count FROM actors WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("querying actor {name:?}"))?
        .map(Actor::from))
    }

    async fn find_actors(&self, q: &ActorQuery) -> anyhow::Result<Vec<Actor>> {
        Ok(sqlx::query_as::<_, ActorRow>(
            "
                SELECT name, watch_count
                    FROM actors
                WHERE $1 = false OR watch_count > 0
                ORDER BY name
            ",
        )
        .bind(q.watched_only)
        .fetch_all(&self.pool)
        .await
        .context("querying actors table")?
        .into_iter()
        .map(Actor::from)
        .collect())
    }

    async fn add_to_watch_count(
        &self,
        name: &str,
        delta: i64,
        create: bool,
    ) -> anyhow::Result<Option<Actor>> {
        let sql = match create {
            true => {
                "
                    INSERT INTO actors (name, watch_count)
                    VALUES ($1, GREATEST($2, 0))
                    ON CONFLICT (name) DO UPDATE
                        SET watch_count = GREATEST(actors.watch_count + $2, 0)
                    RETURNING name, watch_count
                "
            }
            false => {
                "
                    UPDATE actors
                        SET watch_count = GREATEST(watch_count + $2, 0)
                    WHERE name = $1
                    RETURNING name, watch_count
                "
            }
        };
        Ok(sqlx::query_as::<_, ActorRow>(sql)
            .bind(name)
            .bind(delta)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("adding {delta} to watch count of {name:?}"))?
            .map(Actor::from))
    }

    async fn find_submissions(&self, q: &SubmissionQuery) -> anyhow::Result<Vec<Submission>> {
        let filter = query::submissions(q, 1);
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE {} ORDER BY {} {}",
            filter.where_clause,
            query::order_by(q.sort),
            query::limit_offset(q.limit, q.page),
        );
        Ok(
            bind_all!(sqlx::query_as::<_, SubmissionRow>(&sql), filter.binds)
                .fetch_all(&self.pool)
                .await
                .context("querying submissions table")?
                .into_iter()
                .map(Submission::from)
                .collect(),
        )
    }

    async fn upsert_submission(&self, s: &Submission) -> anyhow::Result<()> {
        sqlx::query(
            "
                INSERT INTO submissions
                    (id, actor, title, link, points, comment_count, posted_at, valid)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    actor = EXCLUDED.actor,
                    title = EXCLUDED.title,
                    link = COALESCE(EXCLUDED.link, submissions.link),
                    points = EXCLUDED.points,
                    comment_count = EXCLUDED.comment_count,
                    valid = EXCLUDED.valid
            ",
        )
        .bind(&s.id.0)
        .bind(&s.actor)
        .bind(&s.title)
        .bind(&s.link)
        .bind(s.points)
        .bind(s.comment_count)
        .bind(s.posted_at)
        .bind(s.valid)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upserting submission {}", s.id))?;
        Ok(())
    }

    async fn mark_submission_invalid(&self, id: &SubmissionId) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE submissions SET valid = false WHERE id = $1")
            .bind(&id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("marking submission {id} invalid"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_comments(&self, q: &CommentQuery) -> anyhow::Result<Vec<Comment>> {
        let filter = query::comments(q, 1);
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE {} ORDER BY {} {}",
            filter.where_clause,
            query::order_by(q.sort),
            query::limit_offset(q.limit, q.page),
        );
        Ok(
            bind_all!(sqlx::query_as::<_, CommentRow>(&sql), filter.binds)
                .fetch_all(&self.pool)
                .await
                .context("querying comments table")?
                .into_iter()
                .map(Comment::from)
                .collect(),
        )
    }

    async fn upsert_comment(&self, c: &Comment) -> anyhow::Result<()> {
        sqlx::query(
            "
                INSERT INTO comments
                    (id, submission_id, parent_id, contexts, actor, body, points, posted_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    submission_id = EXCLUDED.submission_id,
                    parent_id = EXCLUDED.parent_id,
                    contexts = EXCLUDED.contexts,
                    actor = EXCLUDED.actor,
                    body = EXCLUDED.body,
                    points = EXCLUDED.points
            ",
        )
        .bind(&c.id.0)
        .bind(c.submission_id.as_ref().map(|id| &id.0))
        .bind(c.parent_id.as_ref().map(|id| &id.0))
        .bind(c.contexts.iter().map(|id| id.0.clone()).collect::<Vec<_>>())
        .bind(&c.actor)
        .bind(&c.text)
        .bind(c.points)
        .bind(c.posted_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upserting comment {}", c.id))?;
        Ok(())
    }

    async fn find_stream(&self, id: &StreamId) -> anyhow::Result<Option<Stream>> {
        let sql = format!("SELECT {STREAM_COLUMNS} FROM streams WHERE id = $1");
        sqlx::query_as::<_, StreamRow>(&sql)
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("querying stream {id}"))?
            .map(Stream::try_from)
            .transpose()
    }

    async fn find_streams(&self, q: &StreamQuery) -> anyhow::Result<Vec<Stream>> {
        let filter = query::streams(q, 1);
        let sql = format!(
            "SELECT {STREAM_COLUMNS} FROM streams WHERE {} ORDER BY seq {}",
            filter.where_clause,
            query::limit_offset(None, q.page),
        );
        bind_all!(sqlx::query_as::<_, StreamRow>(&sql), filter.binds)
            .fetch_all(&self.pool)
            .await
            .context("querying streams table")?
            .into_iter()
            .map(Stream::try_from)
            .collect()
    }

    async fn insert_stream(&self, s: &Stream) -> anyhow::Result<Result<(), StreamIdTaken>> {
        let res = sqlx::query(
            "
                INSERT INTO streams
                    (id, title, target_actor, minimum_points, cache_target_actor, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT DO NOTHING
            ",
        )
        .bind(&s.id.0)
        .bind(&s.title)
        .bind(&s.config.target_actor)
        .bind(s.config.minimum_points)
        .bind(&s.cache.target_actor)
        .execute(&self.pool)
        .await
        .with_context(|| format!("inserting stream {}", s.id))?;
        match res.rows_affected() {
            0 => Ok(Err(StreamIdTaken)),
            _ => Ok(Ok(())),
        }
    }

    async fn update_stream(&self, s: &Stream) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "
                UPDATE streams SET
                    title = $2,
                    target_actor = $3,
                    minimum_points = $4,
                    cache_target_actor = $5
                WHERE id = $1
            ",
        )
        .bind(&s.id.0)
        .bind(&s.title)
        .bind(&s.config.target_actor)
        .bind(s.config.minimum_points)
        .bind(&s.cache.target_actor)
        .execute(&self.pool)
        .await
        .with_context(|| format!("updating stream {}", s.id))?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_stream(&self, id: &StreamId) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM streams WHERE id = $1")
            .bind(&id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("deleting stream {id}"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_stream_status(
        &self,
        q: &StreamQuery,
        status: StreamStatus,
    ) -> anyhow::Result<u64> {
        let filter = query::streams(q, 2);
        let sql = format!(
            "UPDATE streams SET status = $1 WHERE {}",
            filter.where_clause
        );
        let res = bind_all!(sqlx::query(&sql).bind(status.as_str()), filter.binds)
            .execute(&self.pool)
            .await
            .with_context(|| format!("setting stream status to {}", status.as_str()))?;
        Ok(res.rows_affected())
    }
}
