//! The current user's picture album

use auth::CurrentUser;
use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::header,
    response::IntoResponse,
};
use axum_extra::{TypedHeader, extract::WithRejection, headers::ContentType};
use common::{AppError, AppResult};
use media::{Media, service::content_type_for};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::parse_date;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlbumQuery {
    /// Restrict the listing to one day, `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Album day, `YYYY-MM-DD`
    pub date: String,
    pub filename: String,
}

/// Multipart body of an album upload
#[derive(ToSchema)]
pub struct UploadForm {
    /// Album day, `YYYY-MM-DD`
    pub date: String,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current/albums",
    params(AlbumQuery),
    responses(
        (status = 200, description = "Pictures in the album", body = [Media]),
        (status = 400, description = "Malformed date")
    ),
    security(("bearer_auth" = [])),
    tag = "albums"
)]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Query(query), _): WithRejection<Query<AlbumQuery>, AppError>,
) -> AppResult<Json<Vec<Media>>> {
    let media = match query.date.as_deref() {
        Some(raw) => state.media.list_by_date(user.id, parse_date(raw)?).await?,
        None => state.media.list(user.id).await?,
    };
    Ok(Json(media))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current/albums/download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Picture bytes as an attachment", content_type = "image/jpeg"),
        (status = 400, description = "Malformed date or filename"),
        (status = 404, description = "No such picture")
    ),
    security(("bearer_auth" = [])),
    tag = "albums"
)]
pub async fn download(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Query(query), _): WithRejection<Query<DownloadQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    let date = parse_date(&query.date)?;
    let bytes = state.media.download(user.id, date, &query.filename).await?;

    let content_type = if content_type_for(&query.filename) == "image/png" {
        ContentType::png()
    } else {
        ContentType::jpeg()
    };
    let disposition = format!("attachment; filename=\"{}\"", query.filename);

    Ok((
        TypedHeader(content_type),
        [(header::CONTENT_DISPOSITION, disposition)],
        bytes,
    ))
}

/// Multipart upload with a `date` text field and a `file` part
#[utoipa::path(
    post,
    path = "/api/v1/users/current/albums/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored picture", body = Media),
        (status = 400, description = "Missing field or malformed filename"),
        (status = 413, description = "Upload larger than 10 MiB")
    ),
    security(("bearer_auth" = [])),
    tag = "albums"
)]
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    WithRejection(mut multipart, _): WithRejection<Multipart, AppError>,
) -> AppResult<Json<Media>> {
    let mut date = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "date" => date = Some(parse_date(field.text().await?.trim())?),
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::bad_request("file part has no filename"))?;
                file = Some((filename, field.bytes().await?.to_vec()));
            }
            _ => {}
        }
    }

    let date = date.ok_or_else(|| AppError::bad_request("missing date field"))?;
    let (filename, bytes) = file.ok_or_else(|| AppError::bad_request("missing file field"))?;

    Ok(Json(state.media.upload(user.id, date, &filename, bytes).await?))
}
