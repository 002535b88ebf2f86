use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{StreamId, SubmissionId};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Stream not found {0}")]
    StreamNotFound(StreamId),

    #[error("Actor not found {0:?}")]
    ActorNotFound(String),

    #[error("Submission not found {0}")]
    SubmissionNotFound(SubmissionId),

    #[error("Invalid stream configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Stream id already used {0}")]
    StreamIdAlreadyUsed(StreamId),

    #[error("Record store unavailable")]
    StoreUnavailable,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Invalid character in name {0:?}")]
    InvalidName(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::StreamNotFound(_) => StatusCode::NOT_FOUND,
            Error::ActorNotFound(_) => StatusCode::NOT_FOUND,
            Error::SubmissionNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
            Error::StreamIdAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::InvalidName(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::StreamNotFound(sid) => json!({
                "message": "stream not found",
                "type": "stream-not-found",
                "stream": sid,
            }),
            Error::ActorNotFound(name) => json!({
                "message": "actor not found",
                "type": "actor-not-found",
                "name": name,
            }),
            Error::SubmissionNotFound(id) => json!({
                "message": "submission not found",
                "type": "submission-not-found",
                "submission": id,
            }),
            Error::InvalidConfiguration(reason) => json!({
                "message": reason,
                "type": "invalid-configuration",
            }),
            Error::StreamIdAlreadyUsed(sid) => json!({
                "message": "stream id conflict",
                "type": "conflict-stream-id",
                "stream": sid,
            }),
            Error::StoreUnavailable => json!({
                "message": "record store unavailable",
                "type": "store-unavailable",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidName(n) => json!({
                "message": "there was an invalid character in an actor name",
                "type": "invalid-name",
                "name": n,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| {
            data.get(name)
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| anyhow!("error contents is missing its {name:?} field"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(field("message").unwrap_or_default()),
                "stream-not-found" => Error::StreamNotFound(StreamId(field("stream")?)),
                "actor-not-found" => Error::ActorNotFound(field("name")?),
                "submission-not-found" => {
                    Error::SubmissionNotFound(SubmissionId(field("submission")?))
                }
                "invalid-configuration" => Error::InvalidConfiguration(field("message")?),
                "conflict-stream-id" => Error::StreamIdAlreadyUsed(StreamId(field("stream")?)),
                "store-unavailable" => Error::StoreUnavailable,
                "null-byte" => Error::NullByteInString(field("string")?),
                "invalid-name" => Error::InvalidName(field("name")?),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
