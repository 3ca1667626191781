//! `s3://bucket/prefix` locations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// Scheme every bucket location must carry.
pub const S3_SCHEME: &str = "s3://";

/// A bucket plus an optional key prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct S3Uri {
    pub bucket: String,
    /// Key prefix without leading or trailing slashes; empty for the bucket root.
    pub prefix: String,
}

impl S3Uri {
    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        let rest = uri
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| StorageError::InvalidUri(uri.to_string()))?;
        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(StorageError::InvalidUri(uri.to_string()));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        })
    }

    /// Object key of `name` under this prefix.
    pub fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    /// Location of `name` under this prefix.
    pub fn join(&self, name: &str) -> S3Uri {
        S3Uri {
            bucket: self.bucket.clone(),
            prefix: self.key(name),
        }
    }

    /// Last path segment, i.e. the object name for a file URI.
    pub fn file_name(&self) -> &str {
        self.prefix.rsplit('/').next().unwrap_or("")
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}{}", S3_SCHEME, self.bucket)
        } else {
            write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.prefix)
        }
    }
}

impl FromStr for S3Uri {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for S3Uri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for S3Uri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        S3Uri::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let uri = S3Uri::parse("s3://saferplaces/icon2i/partitions/").unwrap();
        assert_eq!(uri.bucket, "saferplaces");
        assert_eq!(uri.prefix, "icon2i/partitions");
        assert_eq!(uri.to_string(), "s3://saferplaces/icon2i/partitions");

        let root = S3Uri::parse("s3://saferplaces").unwrap();
        assert_eq!(root.prefix, "");
        assert_eq!(root.key("a.nc"), "a.nc");
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(S3Uri::parse("https://saferplaces/icon2i").is_err());
        assert!(S3Uri::parse("/tmp/icon2i").is_err());
        assert!(S3Uri::parse("s3://").is_err());
    }

    #[test]
    fn test_join() {
        let uri = S3Uri::parse("s3://bucket/out").unwrap();
        let file = uri.join("x.tif");
        assert_eq!(file.to_string(), "s3://bucket/out/x.tif");
        assert_eq!(file.file_name(), "x.tif");
    }
}
