use hnwatch_api::Error as ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<hnwatch_core::Error> for Error {
    fn from(e: hnwatch_core::Error) -> Error {
        match e {
            hnwatch_core::Error::Store(e) => Error::Anyhow(e),
            hnwatch_core::Error::Api(e) => Error::Api(e),
        }
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            Error::Anyhow(err) => {
                // every internal failure comes from the record store
                tracing::error!(?err, "record store failure");
                ApiError::StoreUnavailable
            }
            Error::Api(err) => {
                tracing::info!("returning error to client: {err}");
                err
            }
        };
        (err.status_code(), err.contents()).into_response()
    }
}
