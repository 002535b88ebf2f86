use hnwatch_api::{Error as ApiError, StreamId, SubmissionId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The record store failed; reported to clients as `StoreUnavailable`
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub fn stream_not_found(id: StreamId) -> Error {
        Error::Api(ApiError::StreamNotFound(id))
    }

    pub fn actor_not_found(name: &str) -> Error {
        Error::Api(ApiError::ActorNotFound(String::from(name)))
    }

    pub fn submission_not_found(id: SubmissionId) -> Error {
        Error::Api(ApiError::SubmissionNotFound(id))
    }

    pub fn stream_id_already_used(id: StreamId) -> Error {
        Error::Api(ApiError::StreamIdAlreadyUsed(id))
    }

    /// The error as it should be shown to a client
    pub fn to_api(&self) -> ApiError {
        match self {
            Error::Store(_) => ApiError::StoreUnavailable,
            Error::Api(e) => e.clone(),
        }
    }
}
