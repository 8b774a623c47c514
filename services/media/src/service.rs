//! Album operations and the picture of the day

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use common::{
    AppError,
    deadline::{DeadlineExceeded, within},
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    apod::{ApodClient, ApodError},
    models::{Media, ObjectInfo},
    storage::{ObjectStore, StorageError},
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("media {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Apod(#[from] ApodError),

    #[error("media backend: {0}")]
    Timeout(#[from] DeadlineExceeded),
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidFilename(_) => AppError::BadRequest(err.to_string()),
            MediaError::NotFound(_) => AppError::NotFound(err.to_string()),
            other => AppError::system(other),
        }
    }
}

/// Content type for a stored picture, guessed from its extension
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn object_key(user: Uuid, date: NaiveDate, filename: &str) -> String {
    format!("{}/{}/{}", user, date.format(DATE_FORMAT), filename)
}

/// A filename must fit in one key segment and in a quoted
/// `Content-Disposition` value
fn check_filename(filename: &str) -> Result<(), MediaError> {
    let forbidden = |c: char| matches!(c, '/' | '"' | '\\') || c.is_control();
    if filename.is_empty() || filename.contains(forbidden) {
        return Err(MediaError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn ObjectStore>,
    apod: Arc<dyn ApodClient>,
    timeout: Duration,
}

impl MediaService {
    pub fn new(store: Arc<dyn ObjectStore>, apod: Arc<dyn ApodClient>, timeout: Duration) -> Self {
        Self {
            store,
            apod,
            timeout,
        }
    }

    /// Listing entry as a media record. Empty objects and keys that are not
    /// `user/date/filename` are skipped.
    fn to_media(&self, object: ObjectInfo) -> Option<Media> {
        if object.size == 0 {
            return None;
        }

        let segments: Vec<&str> = object.key.split('/').collect();
        let [_, date, filename] = segments.as_slice() else {
            return None;
        };

        Some(Media {
            filename: filename.to_string(),
            date: date.to_string(),
            url: self.store.public_url(&object.key),
            last_modified: object.last_modified,
        })
    }

    async fn list_prefix(&self, prefix: String) -> Result<Vec<Media>, MediaError> {
        let objects = within(self.timeout, self.store.list(&prefix)).await??;
        Ok(objects
            .into_iter()
            .filter_map(|object| self.to_media(object))
            .collect())
    }

    /// Every picture in the user's album
    pub async fn list(&self, user: Uuid) -> Result<Vec<Media>, MediaError> {
        self.list_prefix(format!("{}/", user)).await
    }

    /// Pictures in the user's album for one day
    pub async fn list_by_date(&self, user: Uuid, date: NaiveDate) -> Result<Vec<Media>, MediaError> {
        self.list_prefix(format!("{}/{}/", user, date.format(DATE_FORMAT)))
            .await
    }

    pub async fn download(
        &self,
        user: Uuid,
        date: NaiveDate,
        filename: &str,
    ) -> Result<Vec<u8>, MediaError> {
        check_filename(filename)?;
        let key = object_key(user, date, filename);

        match within(self.timeout, self.store.download(&key)).await? {
            Ok(bytes) => Ok(bytes),
            Err(StorageError::NotFound(_)) => Err(MediaError::NotFound(filename.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a picture in the user's album and return its record
    pub async fn upload(
        &self,
        user: Uuid,
        date: NaiveDate,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Media, MediaError> {
        check_filename(filename)?;
        let key = object_key(user, date, filename);

        within(
            self.timeout,
            self.store.upload(&key, bytes, content_type_for(filename)),
        )
        .await??;
        info!("User {} uploaded {}", user, key);

        Ok(Media {
            filename: filename.to_string(),
            date: date.format(DATE_FORMAT).to_string(),
            url: self.store.public_url(&key),
            last_modified: Utc::now(),
        })
    }

    /// The picture of the day for `date`, as a media record
    pub async fn apod(&self, date: NaiveDate) -> Result<Media, MediaError> {
        let picture = within(self.timeout, self.apod.picture(date)).await??;

        let published = NaiveDate::parse_from_str(&picture.date, DATE_FORMAT)
            .map_err(|_| ApodError::InvalidDate(picture.date.clone()))?;

        Ok(Media {
            filename: picture.title,
            date: date.format(DATE_FORMAT).to_string(),
            url: picture.hdurl.unwrap_or(picture.url),
            last_modified: Utc.from_utc_datetime(&published.and_time(NaiveTime::MIN)),
        })
    }
}
