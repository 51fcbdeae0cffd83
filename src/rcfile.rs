//! Purpose: Load CLI defaults from the user's `~/.lodgeitrc` file.
//! Exports: `RcDefaults`, `load_defaults`.
//! Role: Optional per-user defaults; a missing or unreadable file means none.
//! Invariants: The library binding never reads this file, only the CLI does.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RcDefaults {
    pub(crate) language: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) private: Option<bool>,
}

pub(crate) fn load_defaults() -> RcDefaults {
    match rcfile_path() {
        Some(path) => load_defaults_from(&path),
        None => RcDefaults::default(),
    }
}

fn load_defaults_from(path: &Path) -> RcDefaults {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_defaults(&text),
        Err(_) => RcDefaults::default(),
    }
}

fn rcfile_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    if home.is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".lodgeitrc"))
}

fn parse_defaults(text: &str) -> RcDefaults {
    let mut defaults = RcDefaults::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "language" => defaults.language = Some(value.to_string()),
            "author" => defaults.author = Some(value.to_string()),
            "title" => defaults.title = Some(value.to_string()),
            "private" => defaults.private = Some(parse_flag(value)),
            _ => {}
        }
    }
    defaults
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
