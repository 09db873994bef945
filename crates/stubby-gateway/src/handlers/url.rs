use crate::error::Result;
use crate::model::{
    CreateUrlRequest, CreateUrlResponse, ListUrlsQuery, ListUrlsResponse, ResolveUrlResponse,
};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use stubby_core::{PageRequest, ShortCode};
use tracing::debug;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let Json(request) = payload?;

    let code = state.shortener().shorten(&request.original_url).await?;

    let response = CreateUrlResponse {
        short_url: state.short_url(&code),
        short_code: code.into_inner(),
        original_url: request.original_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveUrlResponse>> {
    let code = ShortCode::new(short_code)?;
    let original_url = state.shortener().resolve(&code).await?;

    Ok(Json(ResolveUrlResponse { original_url }))
}

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    let code = ShortCode::new(short_code)?;
    let original_url = state.shortener().resolve(&code).await?;

    debug!(code = %code, "redirecting");
    Ok(Redirect::temporary(&original_url))
}

pub async fn list_urls_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListUrlsQuery>, QueryRejection>,
) -> Result<Json<ListUrlsResponse>> {
    let Query(query) = query?;

    let page = state
        .shortener()
        .list(PageRequest::new(query.page, query.size))
        .await?;

    Ok(Json(ListUrlsResponse::from_page(page, |mapping| {
        state.short_url(&mapping.short_code)
    })))
}
