//! Study Page Handlers
//!
//! - `GET /` and `GET /index.html`: every study
//! - `GET /study/{curated_study_number}.html`: one study with its data sets

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::Uri,
    response::Html,
};
use std::sync::Arc;

use soc_core::{CuratedStudyNumber, StoreResult};
use soc_storage::StudyStore;

use crate::error::{ApiError, ApiResult};
use crate::render::{TemplateContext, TemplateRenderer, INDEX_TEMPLATE, STUDY_TEMPLATE};

/// Run a store call on the blocking thread pool.
async fn run_blocking<T, F>(task: F) -> ApiResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(task).await??)
}

/// GET / and GET /index.html
pub async fn index_html(
    State(store): State<Arc<dyn StudyStore>>,
    State(renderer): State<Arc<dyn TemplateRenderer>>,
) -> ApiResult<Html<String>> {
    let studies = run_blocking(move || store.list_studies()).await?;
    let context = TemplateContext::new().with("studies", &studies)?;
    Ok(Html(renderer.render(INDEX_TEMPLATE, &context)?))
}

/// GET /study/{curated_study_number}.html
///
/// A page segment that does not decode to a curated number is a 404.
pub async fn study_html(
    State(store): State<Arc<dyn StudyStore>>,
    State(renderer): State<Arc<dyn TemplateRenderer>>,
    uri: Uri,
    page: Result<Path<String>, PathRejection>,
) -> ApiResult<Html<String>> {
    let curated = page
        .ok()
        .and_then(|Path(page)| CuratedStudyNumber::from_page_name(&page))
        .ok_or_else(|| ApiError::page_not_found(uri.path()))?;

    let detail = run_blocking(move || store.study_detail(&curated)).await?;
    let context = TemplateContext::from_fields(&detail)?;
    Ok(Html(renderer.render(STUDY_TEMPLATE, &context)?))
}
