use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use validator::Validate;

/// Tag half of the polymorphic owner key. Stored verbatim in
/// `images.imageable_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    Article,
    User,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Article => "Article",
            OwnerKind::User => "User",
        }
    }
}

impl FromStr for OwnerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Article" => Ok(OwnerKind::Article),
            "User" => Ok(OwnerKind::User),
            other => Err(format!("Unknown imageable type: {}", other)),
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polymorphic owner reference: which row an image hangs off.
///
/// A value type, not a stored entity. Every image row carries exactly one
/// of these and it never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "imageable_type")]
    pub kind: OwnerKind,
    #[serde(rename = "imageable_id")]
    pub id: i64,
}

impl Owner {
    pub fn article(id: i64) -> Self {
        Owner { kind: OwnerKind::Article, id }
    }

    pub fn user(id: i64) -> Self {
        Owner { kind: OwnerKind::User, id }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// How the image's bytes came to exist. Device uploads are materialized
/// into the upload directory before the row is created; plain URLs are
/// hosted elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    #[default]
    #[serde(rename = "URL")]
    Url,
    #[serde(rename = "DEVICE_UPLOAD")]
    DeviceUpload,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Url => "URL",
            ImageSource::DeviceUpload => "DEVICE_UPLOAD",
        }
    }
}

impl FromStr for ImageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "URL" => Ok(ImageSource::Url),
            "DEVICE_UPLOAD" => Ok(ImageSource::DeviceUpload),
            other => Err(format!("Unknown image source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub id: i64,
    pub url: String,
    #[serde(rename = "type")]
    pub source: ImageSource,
    #[serde(flatten)]
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Manual FromRow: the owner key is split across two columns and the
// enums are stored as text.
impl FromRow<'_, PgRow> for Image {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let kind_raw: String = row.try_get("imageable_type")?;
        let kind = OwnerKind::from_str(&kind_raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: "imageable_type".into(),
            source: e.into(),
        })?;

        let source_raw: String = row.try_get("source")?;
        let source = ImageSource::from_str(&source_raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: "source".into(),
            source: e.into(),
        })?;

        Ok(Image {
            id: row.try_get("id")?,
            url: row.try_get("url")?,
            source,
            owner: Owner {
                kind,
                id: row.try_get("imageable_id")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Insert payload for the image store. Callers have already validated it.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub url: String,
    pub source: ImageSource,
    pub owner: Owner,
}

/// One requested image in a manage-images or article-create body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImageInput {
    #[validate(length(min = 1, message = "Image url cannot be empty"))]
    pub url: String,

    #[serde(rename = "type", default)]
    pub source: ImageSource,
}

impl ImageInput {
    pub fn into_new_image(self, owner: Owner) -> NewImage {
        NewImage {
            url: self.url,
            source: self.source,
            owner,
        }
    }
}

/// Requested mutation of an owner's attachment set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAction {
    Add,
    Replace,
    Remove,
}

#[derive(Debug, Deserialize)]
pub struct ManageImagesRequest {
    pub action: ImageAction,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}
