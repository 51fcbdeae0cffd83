//! Purpose: Define the paste value object and tag-cloud record.
//! Exports: `Paste`, `TagCloudEntry`.
//! Role: Typed views over raw remote records; constructed only by the client.
//! Invariants: A `Paste` is immutable apart from its memoized reply-to lookup.
//! Invariants: An empty raw `reply_to` field never triggers a remote call.
#![allow(clippy::result_large_err)]

use super::client::{NewPasteOptions, PastebinClient};
use super::decode;
use crate::core::error::{Error, ErrorKind};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;
use time::OffsetDateTime;
use xmlrpc::Value;

type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct TagCloudEntry {
    pub name: String,
    /// Display size in pixels, as chosen by the service.
    pub size: u32,
    pub count: u64,
}

pub struct Paste {
    client: PastebinClient,
    uid: String,
    title: String,
    author: String,
    private: bool,
    pub_date: OffsetDateTime,
    code: String,
    parsed_code: String,
    language: String,
    language_name: String,
    url: String,
    tags: BTreeSet<String>,
    reply_to_uid: Option<String>,
    reply_to_cache: OnceLock<Option<Box<Paste>>>,
}

impl Paste {
    pub(crate) fn from_record(
        client: PastebinClient,
        method: &str,
        value: &Value,
    ) -> ApiResult<Self> {
        let record = decode::expect_struct(method, value)?;
        let pub_date_secs = decode::struct_int(method, record, "pub_date")?;
        let pub_date = OffsetDateTime::from_unix_timestamp(pub_date_secs).map_err(|err| {
            Error::new(ErrorKind::Protocol)
                .with_message(format!("invalid pub_date {pub_date_secs}"))
                .with_method(method)
                .with_source(err)
        })?;

        let mut tags = BTreeSet::new();
        for tag in decode::expect_array(method, decode::struct_field(method, record, "tags")?)? {
            tags.insert(decode::expect_string(method, tag)?.to_string());
        }

        let reply_to_uid = match record.get("reply_to") {
            None | Some(Value::Nil) => None,
            Some(value) => {
                let uid = decode::expect_string(method, value)?;
                if uid.is_empty() {
                    None
                } else {
                    Some(uid.to_string())
                }
            }
        };

        Ok(Self {
            client,
            uid: decode::struct_string(method, record, "uid")?,
            title: decode::struct_string(method, record, "title")?,
            author: decode::struct_string(method, record, "author")?,
            private: decode::struct_bool_or(method, record, "private", false)?,
            pub_date,
            code: decode::struct_string(method, record, "code")?,
            parsed_code: decode::struct_string(method, record, "parsed_code")?,
            language: decode::struct_string(method, record, "language")?,
            language_name: decode::struct_string(method, record, "language_name")?,
            url: decode::struct_string(method, record, "url")?,
            tags,
            reply_to_uid,
            reply_to_cache: OnceLock::new(),
        })
    }

    /// The remote returns only `{uid, url}` for a fresh paste; the rest of the
    /// record is materialized from the request itself.
    pub(crate) fn from_created(
        client: PastebinClient,
        uid: String,
        url: String,
        code: &str,
        options: &NewPasteOptions,
        language_name: Option<String>,
    ) -> Self {
        Self {
            client,
            uid,
            title: options.title.clone(),
            author: options.author.clone(),
            private: options.private,
            pub_date: OffsetDateTime::now_utc(),
            code: code.to_string(),
            parsed_code: String::new(),
            language: options.language.clone(),
            language_name: language_name.unwrap_or_else(|| options.language.clone()),
            url,
            tags: options.tags.iter().cloned().collect(),
            reply_to_uid: None,
            reply_to_cache: OnceLock::new(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn private(&self) -> bool {
        self.private
    }

    pub fn pub_date(&self) -> OffsetDateTime {
        self.pub_date
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Server-side rendered (syntax-highlighted) form of the code. Empty for
    /// pastes materialized locally by `new_paste` until re-fetched.
    pub fn parsed_code(&self) -> &str {
        &self.parsed_code
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn language_name(&self) -> &str {
        &self.language_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Identifier of the paste this one replies to, if any.
    pub fn reply_to_uid(&self) -> Option<&str> {
        self.reply_to_uid.as_deref()
    }

    /// Resolve the parent paste through the owning client. The first access
    /// with a non-empty `reply_to_uid` issues exactly one remote call; the
    /// outcome (present or vanished) is memoized for later accesses.
    pub fn reply_to(&self) -> ApiResult<Option<&Paste>> {
        let Some(uid) = self.reply_to_uid.as_deref() else {
            return Ok(None);
        };
        if let Some(cached) = self.reply_to_cache.get() {
            return Ok(cached.as_deref());
        }
        let parent = self.client.get_paste(uid)?.map(Box::new);
        Ok(self.reply_to_cache.get_or_init(|| parent).as_deref())
    }
}

impl fmt::Debug for Paste {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paste")
            .field("uid", &self.uid)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

pub(crate) fn decode_tag_cloud(value: &Value) -> ApiResult<Vec<TagCloudEntry>> {
    const METHOD: &str = "tags.getTagCloud";
    let mut entries = Vec::new();
    for entry in decode::expect_array(METHOD, value)? {
        let record = decode::expect_struct(METHOD, entry)?;
        let size = decode::struct_int(METHOD, record, "size")?;
        let size = u32::try_from(size).map_err(|_| {
            Error::new(ErrorKind::Protocol)
                .with_message(format!("invalid tag size {size}"))
                .with_method(METHOD)
        })?;
        let count = decode::struct_int(METHOD, record, "count")?;
        let count = u64::try_from(count).map_err(|_| {
            Error::new(ErrorKind::Protocol)
                .with_message(format!("invalid tag count {count}"))
                .with_method(METHOD)
        })?;
        entries.push(TagCloudEntry {
            name: decode::struct_string(METHOD, record, "name")?,
            size,
            count,
        });
    }
    Ok(entries)
}
