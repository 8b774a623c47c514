use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use common::{AppError, AppResult};
use media::Media;
use serde::Deserialize;
use utoipa::IntoParams;

use super::parse_date;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApodQuery {
    /// Day of the picture, `YYYY-MM-DD`
    pub date: Option<String>,
}

/// Picture of the day for `?date=`, or for today (UTC) when absent
#[utoipa::path(
    get,
    path = "/api/v1/apod",
    params(ApodQuery),
    responses(
        (status = 200, description = "Picture of the day", body = Media),
        (status = 400, description = "Malformed date"),
        (status = 500, description = "Upstream API failed")
    ),
    security(("bearer_auth" = [])),
    tag = "apod"
)]
pub async fn picture(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ApodQuery>, AppError>,
) -> AppResult<Json<Media>> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    Ok(Json(state.media.apod(date).await?))
}
