//! API service routes

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::get,
};
use common::DisplacedCategory;
use serde_json::json;
use tracing::info;

use crate::{
    error::ApiResult,
    middleware::{AuthUser, auth_middleware},
    models::{BilateralQuery, ChartQuery, GeoQuery, RelationQuery},
    services::{
        BilateralCountriesReportService, CountryReportService, GeoForAPIService, GeoRequest,
        HomeService, RelationAPIService, TimeSeriesAPIService,
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/v1/relations", get(relations))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/health-check", get(api_health_check))
        .route("/reports/home", get(home_report))
        .route("/reports/countries/:iso_2", get(country_report))
        .route("/reports/bilateral", get(bilateral_report))
        .route("/api/v1/", get(geo_data))
        .route("/api/v1/chart", get(chart_data))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

pub async fn api_health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn parse_category(name: Option<&str>) -> ApiResult<Option<DisplacedCategory>> {
    Ok(name.map(str::parse::<DisplacedCategory>).transpose()?)
}

pub async fn home_report(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let report = HomeService::new(state.dal.as_ref()).fetch_data().await?;
    Ok(Json(report))
}

pub async fn country_report(
    State(state): State<AppState>,
    Path(iso_2): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let report = CountryReportService::new(state.dal.as_ref())
        .fetch_data(&iso_2)
        .await?;
    Ok(Json(report))
}

pub async fn bilateral_report(
    State(state): State<AppState>,
    Query(query): Query<BilateralQuery>,
) -> ApiResult<impl IntoResponse> {
    let report = BilateralCountriesReportService::new(state.dal.as_ref())
        .fetch_data(&query.coo, &query.coa)
        .await?;
    Ok(Json(report))
}

/// Geographic breakdown for one year
pub async fn geo_data(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> ApiResult<impl IntoResponse> {
    let request = GeoRequest {
        category: query.category.parse()?,
        country_iso_2: query.country,
        year: query.year,
        head: query.head,
        origin: query.origin,
    };

    let rows = GeoForAPIService::new(state.dal.as_ref())
        .fetch_data(&request)
        .await?;
    Ok(Json(rows))
}

/// Yearly series
pub async fn chart_data(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<impl IntoResponse> {
    let category = parse_category(query.category.as_deref())?;

    let rows = TimeSeriesAPIService::new(state.dal.as_ref())
        .fetch_data(query.country.as_deref(), category, query.origin)
        .await?;
    Ok(Json(rows))
}

/// Yearly series between two countries
pub async fn relations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RelationQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("Relations {} -> {} requested by {}", query.coo, query.coa, user.id);
    let category = parse_category(query.category.as_deref())?;

    let rows = RelationAPIService::new(state.dal.as_ref())
        .fetch_data(&query.coo, &query.coa, category)
        .await?;
    Ok(Json(rows))
}
