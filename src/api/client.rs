//! Purpose: Bind every pastebin remote procedure to a typed local call.
//! Exports: `PastebinClient`, `NewPasteOptions`.
//! Role: The binding proper; one remote round trip per operation.
//! Invariants: The language table is fetched at most once per client lifetime.
//! Invariants: Empty-string/falsy responses become `None`; everything else negative is a typed error.
#![allow(clippy::result_large_err)]

use super::decode;
use super::paste::{Paste, TagCloudEntry, decode_tag_cloud};
use super::transport::{SERVICE_URL, Transport, XmlRpcTransport};
use crate::core::error::{Error, ErrorKind};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use xmlrpc::Value;

type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Debug)]
pub struct NewPasteOptions {
    pub language: String,
    pub private: bool,
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl NewPasteOptions {
    pub fn new() -> Self {
        Self {
            language: "text".to_string(),
            private: false,
            title: "Untitled".to_string(),
            author: "anonymous".to_string(),
            tags: Vec::new(),
        }
    }
}

impl Default for NewPasteOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct PastebinClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Box<dyn Transport>,
    languages: OnceLock<BTreeMap<String, String>>,
}

impl PastebinClient {
    /// Client against the public LodgeIt service endpoint.
    pub fn new() -> ApiResult<Self> {
        Self::with_endpoint(SERVICE_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> ApiResult<Self> {
        Ok(Self::with_transport(Box::new(XmlRpcTransport::new(
            endpoint,
        )?)))
    }

    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                languages: OnceLock::new(),
            }),
        }
    }

    fn call(&self, method: &str, args: Vec<Value>) -> ApiResult<Value> {
        self.inner.transport.call(method, args)
    }

    /// Total number of pastes on the service.
    pub fn paste_count(&self) -> ApiResult<u64> {
        let value = self.call("pastes.countPastes", Vec::new())?;
        decode::expect_count("pastes.countPastes", &value)
    }

    pub fn private_count(&self) -> ApiResult<u64> {
        let value = self.call("pastes.countPrivate", Vec::new())?;
        decode::expect_count("pastes.countPrivate", &value)
    }

    pub fn public_count(&self) -> ApiResult<u64> {
        let value = self.call("pastes.countPublic", Vec::new())?;
        decode::expect_count("pastes.countPublic", &value)
    }

    /// Supported languages as an alias → display-name table. Fetched once per
    /// client; later calls are served from the cache without a remote call.
    pub fn languages(&self) -> ApiResult<&BTreeMap<String, String>> {
        if let Some(cached) = self.inner.languages.get() {
            return Ok(cached);
        }
        let value = self.call("pastes.getLanguages", Vec::new())?;
        let table = decode_language_table(&value)?;
        Ok(self.inner.languages.get_or_init(|| table))
    }

    pub fn language_exists(&self, alias: &str) -> ApiResult<bool> {
        Ok(self.name_by_alias(alias)?.is_some())
    }

    pub fn alias_for_filename(&self, filename: &str) -> ApiResult<Option<String>> {
        let value = self.call(
            "pastes.getAliasForFilename",
            vec![Value::String(filename.to_string())],
        )?;
        decode::optional_string("pastes.getAliasForFilename", &value)
    }

    pub fn alias_for_mimetype(&self, mimetype: &str) -> ApiResult<Option<String>> {
        let value = self.call(
            "pastes.getAliasForMimetype",
            vec![Value::String(mimetype.to_string())],
        )?;
        decode::optional_string("pastes.getAliasForMimetype", &value)
    }

    pub fn name_by_alias(&self, alias: &str) -> ApiResult<Option<String>> {
        let value = self.call(
            "pastes.getNameByAlias",
            vec![Value::String(alias.to_string())],
        )?;
        decode::optional_string("pastes.getNameByAlias", &value)
    }

    pub fn paste_exists(&self, uid: &str) -> ApiResult<bool> {
        let value = self.call("pastes.pasteExists", vec![Value::String(uid.to_string())])?;
        decode::expect_bool("pastes.pasteExists", &value)
    }

    /// Fetch one paste by uid; `None` when the service knows no such paste.
    pub fn get_paste(&self, uid: &str) -> ApiResult<Option<Paste>> {
        let value = self.call("pastes.getPaste", vec![Value::String(uid.to_string())])?;
        if decode::is_falsy(&value) {
            return Ok(None);
        }
        Paste::from_record(self.clone(), "pastes.getPaste", &value).map(Some)
    }

    /// The `n` most recent public pastes, most recent first. The service caps
    /// `n`, so the result may be shorter than asked.
    pub fn get_recent_pastes(&self, n: u32) -> ApiResult<Vec<Paste>> {
        let n = i32::try_from(n).unwrap_or(i32::MAX);
        let value = self.call("pastes.getRecent", vec![Value::Int(n)])?;
        self.decode_paste_list("pastes.getRecent", &value)
    }

    pub fn get_recent_paste(&self) -> ApiResult<Option<Paste>> {
        let mut pastes = self.get_recent_pastes(1)?;
        if pastes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(pastes.remove(0)))
        }
    }

    pub fn get_pastes_for_tag(&self, tag: &str) -> ApiResult<Vec<Paste>> {
        let value = self.call(
            "pastes.getPastesForTag",
            vec![Value::String(tag.to_string())],
        )?;
        self.decode_paste_list("pastes.getPastesForTag", &value)
    }

    pub fn get_paste_url(&self, uid: &str) -> ApiResult<Option<String>> {
        let value = self.call("pastes.getURL", vec![Value::String(uid.to_string())])?;
        decode::optional_string("pastes.getURL", &value)
    }

    /// Create a paste. An unknown language fails with a `Usage` error before
    /// the creation procedure is invoked; a declined creation (the remote's
    /// falsy sentinel) returns `None`.
    pub fn new_paste(&self, code: &str, options: &NewPasteOptions) -> ApiResult<Option<Paste>> {
        let language_name = if options.language == "text" {
            None
        } else {
            match self.name_by_alias(&options.language)? {
                Some(name) => Some(name),
                None => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message(format!("unknown language '{}'", options.language)));
                }
            }
        };

        let args = vec![
            Value::String(options.language.clone()),
            Value::String(code.to_string()),
            Value::Bool(options.private),
            Value::String(options.title.clone()),
            Value::String(options.author.clone()),
            Value::Array(
                options
                    .tags
                    .iter()
                    .map(|tag| Value::String(tag.clone()))
                    .collect(),
            ),
        ];
        let value = self.call("pastes.newPaste", args)?;
        if decode::is_falsy(&value) {
            return Ok(None);
        }
        let record = decode::expect_struct("pastes.newPaste", &value)?;
        let uid = decode::struct_string("pastes.newPaste", record, "uid")?;
        let url = match record.get("url") {
            Some(value) => decode::expect_string("pastes.newPaste", value)?.to_string(),
            None => String::new(),
        };
        Ok(Some(Paste::from_created(
            self.clone(),
            uid,
            url,
            code,
            options,
            language_name,
        )))
    }

    pub fn style_exists(&self, style: &str) -> ApiResult<bool> {
        let value = self.call("styles.styleExists", vec![Value::String(style.to_string())])?;
        decode::expect_bool("styles.styleExists", &value)
    }

    pub fn style_list(&self) -> ApiResult<Vec<String>> {
        let value = self.call("styles.getStyleList", Vec::new())?;
        decode::expect_array("styles.getStyleList", &value)?
            .iter()
            .map(|style| {
                decode::expect_string("styles.getStyleList", style).map(|name| name.to_string())
            })
            .collect()
    }

    /// CSS for a style; the service prefixes every selector with `prefix`.
    pub fn get_style(&self, style: &str, prefix: &str) -> ApiResult<Option<String>> {
        let value = self.call(
            "styles.getStyle",
            vec![
                Value::String(style.to_string()),
                Value::String(prefix.to_string()),
            ],
        )?;
        decode::optional_string("styles.getStyle", &value)
    }

    pub fn tag_cloud(&self) -> ApiResult<Vec<TagCloudEntry>> {
        let value = self.call("tags.getTagCloud", Vec::new())?;
        decode_tag_cloud(&value)
    }

    fn decode_paste_list(&self, method: &str, value: &Value) -> ApiResult<Vec<Paste>> {
        decode::expect_array(method, value)?
            .iter()
            .map(|record| Paste::from_record(self.clone(), method, record))
            .collect()
    }
}

impl fmt::Debug for PastebinClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PastebinClient")
    }
}

fn decode_language_table(value: &Value) -> ApiResult<BTreeMap<String, String>> {
    const METHOD: &str = "pastes.getLanguages";
    let mut table = BTreeMap::new();
    for pair in decode::expect_array(METHOD, value)? {
        match decode::expect_array(METHOD, pair)? {
            [alias, name] => {
                table.insert(
                    decode::expect_string(METHOD, alias)?.to_string(),
                    decode::expect_string(METHOD, name)?.to_string(),
                );
            }
            _ => {
                return Err(Error::new(ErrorKind::Protocol)
                    .with_message("language entry must be an alias/name pair")
                    .with_method(METHOD));
            }
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::{NewPasteOptions, decode_language_table};
    use crate::core::error::ErrorKind;
    use xmlrpc::Value;

    fn pair(alias: &str, name: &str) -> Value {
        Value::Array(vec![
            Value::String(alias.to_string()),
            Value::String(name.to_string()),
        ])
    }

    #[test]
    fn language_table_decodes_pairs() {
        let value = Value::Array(vec![pair("py", "Python"), pair("rb", "Ruby")]);
        let table = decode_language_table(&value).expect("table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("py").map(String::as_str), Some("Python"));
        assert_eq!(table.get("rb").map(String::as_str), Some("Ruby"));
    }

    #[test]
    fn language_table_rejects_odd_pairs() {
        let value = Value::Array(vec![Value::Array(vec![Value::String("py".to_string())])]);
        let err = decode_language_table(&value).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn new_paste_options_defaults() {
        let options = NewPasteOptions::new();
        assert_eq!(options.language, "text");
        assert_eq!(options.title, "Untitled");
        assert_eq!(options.author, "anonymous");
        assert!(!options.private);
        assert!(options.tags.is_empty());
    }
}
