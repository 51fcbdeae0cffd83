//! Purpose: Contract tests for the pastebin client binding.
//! Exports: None (integration test module).
//! Role: Pin down call counts, argument order, normalization, and caching
//! against a scripted transport standing in for the remote service.
//! Invariants: Every test asserts both the returned value and the wire traffic.

use lodgeit::api::{Error, ErrorKind, NewPasteOptions, PastebinClient, Transport, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Default)]
struct MockState {
    responses: Mutex<VecDeque<Result<Value, Error>>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

#[derive(Clone, Default)]
struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    fn new() -> Self {
        Self::default()
    }

    fn push(&self, value: Value) -> &Self {
        self.state
            .responses
            .lock()
            .expect("lock")
            .push_back(Ok(value));
        self
    }

    fn push_err(&self, err: Error) -> &Self {
        self.state
            .responses
            .lock()
            .expect("lock")
            .push_back(Err(err));
        self
    }

    fn client(&self) -> PastebinClient {
        PastebinClient::with_transport(Box::new(self.clone()))
    }

    fn methods(&self) -> Vec<String> {
        self.state
            .calls
            .lock()
            .expect("lock")
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    fn args_of(&self, index: usize) -> Vec<Value> {
        self.state.calls.lock().expect("lock")[index].1.clone()
    }
}

impl Transport for MockTransport {
    fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, Error> {
        self.state
            .calls
            .lock()
            .expect("lock")
            .push((method.to_string(), args));
        self.state
            .responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(Error::new(ErrorKind::Internal)
                    .with_message(format!("unexpected call to {method}")))
            })
    }
}

fn string(value: &str) -> Value {
    Value::String(value.to_string())
}

fn paste_record(uid: &str, pub_date: i32, reply_to: &str) -> Value {
    let mut record = std::collections::BTreeMap::new();
    record.insert("uid".to_string(), string(uid));
    record.insert("title".to_string(), string("demo"));
    record.insert("author".to_string(), string("alice"));
    record.insert("private".to_string(), Value::Bool(false));
    record.insert("pub_date".to_string(), Value::Int(pub_date));
    record.insert("code".to_string(), string("print(1)"));
    record.insert("parsed_code".to_string(), string("<pre>print(1)</pre>"));
    record.insert("language".to_string(), string("python"));
    record.insert("language_name".to_string(), string("Python"));
    record.insert(
        "url".to_string(),
        string(&format!("http://paste.pocoo.org/show/{uid}/")),
    );
    record.insert(
        "tags".to_string(),
        Value::Array(vec![string("sample")]),
    );
    record.insert("reply_to".to_string(), string(reply_to));
    Value::Struct(record)
}

fn language_pairs() -> Value {
    Value::Array(vec![
        Value::Array(vec![string("python"), string("Python")]),
        Value::Array(vec![string("rb"), string("Ruby")]),
        Value::Array(vec![string("text"), string("Text only")]),
    ])
}

#[test]
fn get_paste_returns_matching_uid() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(paste_record("a7Gb", 1_200_000_000, ""));
    let client = mock.client();

    let paste = client.get_paste("a7Gb")?.expect("paste");
    assert_eq!(paste.uid(), "a7Gb");
    assert_eq!(paste.title(), "demo");
    assert_eq!(paste.language_name(), "Python");
    assert_eq!(paste.pub_date().unix_timestamp(), 1_200_000_000);
    assert_eq!(mock.methods(), ["pastes.getPaste"]);
    assert_eq!(mock.args_of(0), vec![string("a7Gb")]);
    Ok(())
}

#[test]
fn get_paste_unknown_uid_is_absent_not_an_error() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(Value::Bool(false));
    let client = mock.client();

    assert!(client.get_paste("nope")?.is_none());
    Ok(())
}

#[test]
fn languages_are_fetched_once_and_cached() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(language_pairs());
    let client = mock.client();

    let first = client.languages()?.clone();
    let second = client.languages()?;
    assert_eq!(&first, second);
    assert_eq!(first.get("python").map(String::as_str), Some("Python"));
    assert_eq!(mock.methods(), ["pastes.getLanguages"]);
    Ok(())
}

#[test]
fn language_exists_follows_name_by_alias() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(string("Python")).push(string(""));
    let client = mock.client();

    assert!(client.language_exists("python")?);
    assert!(!client.language_exists("klingon")?);
    assert_eq!(
        mock.methods(),
        ["pastes.getNameByAlias", "pastes.getNameByAlias"]
    );
    Ok(())
}

#[test]
fn new_paste_round_trip_scenario() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(string("Python"));
    let mut created = std::collections::BTreeMap::new();
    created.insert("uid".to_string(), string("a7Gb"));
    created.insert(
        "url".to_string(),
        string("http://paste.pocoo.org/show/a7Gb/"),
    );
    mock.push(Value::Struct(created));
    let client = mock.client();

    let mut options = NewPasteOptions::new();
    options.language = "python".to_string();
    options.title = "demo".to_string();
    options.author = "alice".to_string();
    options.tags = vec!["sample".to_string()];

    let paste = client.new_paste("print(1)", &options)?.expect("created");
    assert_eq!(paste.uid(), "a7Gb");
    assert_eq!(paste.title(), "demo");
    assert_eq!(paste.author(), "alice");
    assert!(!paste.private());
    assert!(paste.tags().contains("sample"));
    assert_eq!(paste.url(), "http://paste.pocoo.org/show/a7Gb/");
    assert_eq!(paste.language_name(), "Python");

    assert_eq!(mock.methods(), ["pastes.getNameByAlias", "pastes.newPaste"]);
    assert_eq!(
        mock.args_of(1),
        vec![
            string("python"),
            string("print(1)"),
            Value::Bool(false),
            string("demo"),
            string("alice"),
            Value::Array(vec![string("sample")]),
        ]
    );
    Ok(())
}

#[test]
fn new_paste_unknown_language_never_reaches_creation() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(string(""));
    let client = mock.client();

    let mut options = NewPasteOptions::new();
    options.language = "not-a-real-language".to_string();
    let err = client.new_paste("print(1)", &options).expect_err("err");
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(!mock.methods().iter().any(|method| method == "pastes.newPaste"));
    Ok(())
}

#[test]
fn new_paste_with_default_language_skips_validation() -> TestResult<()> {
    let mock = MockTransport::new();
    let mut created = std::collections::BTreeMap::new();
    created.insert("uid".to_string(), string("x1"));
    created.insert("url".to_string(), string("http://paste.pocoo.org/show/x1/"));
    mock.push(Value::Struct(created));
    let client = mock.client();

    let paste = client
        .new_paste("plain words", &NewPasteOptions::new())?
        .expect("created");
    assert_eq!(paste.language(), "text");
    assert_eq!(mock.methods(), ["pastes.newPaste"]);
    Ok(())
}

#[test]
fn new_paste_declined_by_service_returns_none() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(string("Python")).push(Value::Int(0));
    let client = mock.client();

    let mut options = NewPasteOptions::new();
    options.language = "python".to_string();
    assert!(client.new_paste("print(1)", &options)?.is_none());
    Ok(())
}

#[test]
fn recent_pastes_keep_order_and_length() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(Value::Array(vec![
        paste_record("newer", 2_000, ""),
        paste_record("older", 1_000, ""),
    ]));
    let client = mock.client();

    let pastes = client.get_recent_pastes(5)?;
    assert!(pastes.len() <= 5);
    assert_eq!(pastes[0].uid(), "newer");
    assert_eq!(pastes[1].uid(), "older");
    assert!(pastes[0].pub_date() >= pastes[1].pub_date());
    assert_eq!(mock.args_of(0), vec![Value::Int(5)]);
    Ok(())
}

#[test]
fn recent_paste_is_absent_on_empty_service() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(Value::Array(Vec::new()));
    let client = mock.client();

    assert!(client.get_recent_paste()?.is_none());
    assert_eq!(mock.args_of(0), vec![Value::Int(1)]);
    Ok(())
}

#[test]
fn pastes_for_tag_map_every_record() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(Value::Array(vec![paste_record("t1", 1_000, "")]));
    let client = mock.client();

    let pastes = client.get_pastes_for_tag("sample")?;
    assert_eq!(pastes.len(), 1);
    assert_eq!(pastes[0].uid(), "t1");
    assert_eq!(mock.methods(), ["pastes.getPastesForTag"]);
    Ok(())
}

#[test]
fn empty_reply_to_resolves_without_any_call() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(paste_record("solo", 1_000, ""));
    let client = mock.client();

    let paste = client.get_paste("solo")?.expect("paste");
    assert_eq!(paste.reply_to_uid(), None);
    assert!(paste.reply_to()?.is_none());
    assert!(paste.reply_to()?.is_none());
    assert_eq!(mock.methods(), ["pastes.getPaste"]);
    Ok(())
}

#[test]
fn reply_to_resolves_exactly_once() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(paste_record("child", 2_000, "parent"));
    mock.push(paste_record("parent", 1_000, ""));
    let client = mock.client();

    let child = client.get_paste("child")?.expect("child");
    assert_eq!(child.reply_to_uid(), Some("parent"));

    let parent = child.reply_to()?.expect("parent");
    assert_eq!(parent.uid(), "parent");
    let again = child.reply_to()?.expect("parent");
    assert_eq!(again.uid(), "parent");

    assert_eq!(mock.methods(), ["pastes.getPaste", "pastes.getPaste"]);
    assert_eq!(mock.args_of(1), vec![string("parent")]);
    Ok(())
}

#[test]
fn vanished_reply_to_parent_is_memoized_too() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(paste_record("child", 2_000, "gone"));
    mock.push(Value::Bool(false));
    let client = mock.client();

    let child = client.get_paste("child")?.expect("child");
    assert!(child.reply_to()?.is_none());
    assert!(child.reply_to()?.is_none());
    assert_eq!(mock.methods().len(), 2);
    Ok(())
}

#[test]
fn empty_strings_normalize_to_absent() -> TestResult<()> {
    let mock = MockTransport::new();
    for _ in 0..5 {
        mock.push(string(""));
    }
    let client = mock.client();

    assert!(client.alias_for_filename("unknown.zzz")?.is_none());
    assert!(client.alias_for_mimetype("application/x-unknown")?.is_none());
    assert!(client.name_by_alias("zzz")?.is_none());
    assert!(client.get_paste_url("nope")?.is_none());
    assert!(client.get_style("missing", "")?.is_none());
    assert_eq!(
        mock.methods(),
        [
            "pastes.getAliasForFilename",
            "pastes.getAliasForMimetype",
            "pastes.getNameByAlias",
            "pastes.getURL",
            "styles.getStyle",
        ]
    );
    Ok(())
}

#[test]
fn non_empty_strings_pass_through() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(string("python"));
    let client = mock.client();

    assert_eq!(
        client.alias_for_filename("example.py")?.as_deref(),
        Some("python")
    );
    Ok(())
}

#[test]
fn style_operations() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(Value::Bool(true));
    mock.push(Value::Array(vec![string("default"), string("murphy")]));
    mock.push(string(".syntax .k { color: #008800 }"));
    let client = mock.client();

    assert!(client.style_exists("default")?);
    assert_eq!(client.style_list()?, ["default", "murphy"]);
    let css = client.get_style("default", "div.syntax")?.expect("css");
    assert!(css.contains("color"));
    assert_eq!(mock.args_of(2), vec![string("default"), string("div.syntax")]);
    Ok(())
}

#[test]
fn counts_and_existence() -> TestResult<()> {
    let mock = MockTransport::new();
    mock.push(Value::Int(10))
        .push(Value::Int(3))
        .push(Value::Int(7))
        .push(Value::Bool(true));
    let client = mock.client();

    assert_eq!(client.paste_count()?, 10);
    assert_eq!(client.private_count()?, 3);
    assert_eq!(client.public_count()?, 7);
    assert!(client.paste_exists("a7Gb")?);
    assert_eq!(
        mock.methods(),
        [
            "pastes.countPastes",
            "pastes.countPrivate",
            "pastes.countPublic",
            "pastes.pasteExists",
        ]
    );
    Ok(())
}

#[test]
fn tag_cloud_maps_records() -> TestResult<()> {
    let mock = MockTransport::new();
    let mut entry = std::collections::BTreeMap::new();
    entry.insert("name".to_string(), string("python"));
    entry.insert("size".to_string(), Value::Int(18));
    entry.insert("count".to_string(), Value::Int(42));
    mock.push(Value::Array(vec![Value::Struct(entry)]));
    let client = mock.client();

    let cloud = client.tag_cloud()?;
    assert_eq!(cloud.len(), 1);
    assert_eq!(cloud[0].name, "python");
    assert_eq!(cloud[0].size, 18);
    assert_eq!(cloud[0].count, 42);
    Ok(())
}

#[test]
fn remote_faults_propagate_unchanged() {
    let mock = MockTransport::new();
    mock.push_err(
        Error::new(ErrorKind::Fault)
            .with_message("unknown method")
            .with_fault_code(1)
            .with_method("pastes.countPastes"),
    );
    let client = mock.client();

    let err = client.paste_count().expect_err("err");
    assert_eq!(err.kind(), ErrorKind::Fault);
    assert_eq!(err.fault_code(), Some(1));
    assert_eq!(err.method(), Some("pastes.countPastes"));
}

#[test]
fn shape_mismatches_are_protocol_errors() {
    let mock = MockTransport::new();
    mock.push(string("ten"));
    let client = mock.client();

    let err = client.paste_count().expect_err("err");
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.method(), Some("pastes.countPastes"));
}

#[test]
fn paste_record_without_private_flag_defaults_public() -> TestResult<()> {
    let mock = MockTransport::new();
    let record = paste_record("p1", 1_000, "");
    let Value::Struct(mut fields) = record else {
        unreachable!()
    };
    fields.remove("private");
    mock.push(Value::Struct(fields));
    let client = mock.client();

    let paste = client.get_paste("p1")?.expect("paste");
    assert!(!paste.private());
    Ok(())
}
