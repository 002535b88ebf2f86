use hnwatch_api::FeedFormat;
use hnwatch_core::{Catalog, StreamManager};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub streams: StreamManager,
    pub catalog: Catalog,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct ListParams {
    pub page: Option<u32>,

    /// Only list the streams configured for this actor
    pub user: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct FeedParams {
    #[serde(default)]
    pub format: FeedFormat,

    pub page: Option<u32>,
}
