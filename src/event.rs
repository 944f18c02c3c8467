//! Storage notification payload
//!
//! Only the pieces of an S3 event notification the handler reads are modelled;
//! everything else in the payload is ignored during deserialization.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// S3 event notification as delivered to the handler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3NotificationRecord>,
}

/// A single notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3NotificationRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    pub key: Option<String>,
}

impl S3Notification {
    /// Build a notification for a single object, as S3 would send it
    pub fn for_object(bucket: impl Into<String>, key: &str) -> Self {
        let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes())
            .collect::<String>()
            .replace("%2F", "/");
        Self {
            records: vec![S3NotificationRecord {
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: Some(bucket.into()),
                    },
                    object: S3Object { key: Some(encoded) },
                },
            }],
        }
    }

    /// Location of the object named by the first record
    ///
    /// Additional records are ignored. The key is form-URL-decoded.
    pub fn location(&self) -> Result<ObjectLocation> {
        let record = self
            .records
            .first()
            .ok_or_else(|| Error::invalid_event("event contains no records"))?;

        let bucket = record
            .s3
            .bucket
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::invalid_event("Records[0].s3.bucket.name is missing"))?;

        let raw_key = record
            .s3
            .object
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::invalid_event("Records[0].s3.object.key is missing"))?;

        Ok(ObjectLocation::new(bucket, decode_key(raw_key)))
    }
}

/// Decode an object key the way S3 encodes it in notifications
fn decode_key(raw: &str) -> String {
    url::form_urlencoded::parse(format!("k={raw}").as_bytes())
        .next()
        .map_or_else(|| raw.to_string(), |(_, v)| v.into_owned())
}

/// Bucket and key of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// Create a new location
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
