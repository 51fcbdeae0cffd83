//! Purpose: Shared JSON serializers for CLI output.
//! Exports: `paste_json`, `count_json`, `format_pub_date`.
//! Role: Keep the machine-readable envelope shape consistent across commands.
//! Invariants: Stable key names; `pub_date` is RFC 3339 UTC.

use lodgeit::api::Paste;
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;

pub(crate) fn paste_json(paste: &Paste) -> Value {
    json!({
        "uid": paste.uid(),
        "title": paste.title(),
        "author": paste.author(),
        "private": paste.private(),
        "pub_date": format_pub_date(paste),
        "language": paste.language(),
        "language_name": paste.language_name(),
        "url": paste.url(),
        "tags": paste.tags().iter().collect::<Vec<_>>(),
        "reply_to": paste.reply_to_uid(),
        "code": paste.code(),
    })
}

pub(crate) fn count_json(total: u64, public: u64, private: u64) -> Value {
    json!({
        "pastes": total,
        "public": public,
        "private": private,
    })
}

pub(crate) fn format_pub_date(paste: &Paste) -> String {
    paste
        .pub_date()
        .format(&Rfc3339)
        .unwrap_or_else(|_| paste.pub_date().unix_timestamp().to_string())
}
