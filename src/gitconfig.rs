//! # Git Config Parsing and Descriptor Extraction
//!
//! This module turns raw `.git/config` text into a nested mapping and then
//! into a normalized [`RepoRecord`].
//!
//! ## The section-name pre-pass
//!
//! The underlying INI primitive (`rust-ini`) parses a header like
//! `[remote "origin"]` into a flat section literally named `remote "origin"`,
//! and this module's nested-mapping convention treats `.` in a section name
//! as an object-path separator. Git section names routinely contain both
//! quotes and dots (`[remote "a.b.c"]`, `[branch "net8.0"]`), so headers are
//! rewritten before parsing:
//!
//! 1. quote characters are stripped;
//! 2. literal `.` becomes the sentinel `$dot$` so it cannot fire the
//!    dot-as-nesting convention;
//! 3. interior whitespace runs become `.`, turning `[remote "origin"]` into
//!    the dotted path segment `remote.origin`.
//!
//! After parsing, section names are split on `.` and each segment has the
//! sentinel restored, producing `{"remote": {"a.b.c": {...}}}` rather than a
//! silently mis-nested tree.
//!
//! ## Extraction never fails
//!
//! `extract` always returns a record. Read or parse failures produce a
//! placeholder whose description embeds the error, the file path, and the
//! raw content for postmortem, so the walker can keep going.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use ini::{Ini, ParseOption};
use log::{debug, error};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::record::{RemoteInfo, RepoRecord, SubmoduleInfo};

/// Sentinel standing in for literal dots inside section headers while the
/// INI primitive runs.
const DOT_SENTINEL: &str = "$dot$";

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]\r\n]*\]").expect("hard-coded regex"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("hard-coded regex"))
}

/// Rewrite every bracketed section header so the generic INI parser sees a
/// single dotted path segment. This transform is reversible: the sentinel is
/// restored per path segment in [`parse_git_config`].
pub fn fix_section_names(text: &str) -> String {
    header_regex()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let header = caps[0].replace('"', "").replace('.', DOT_SENTINEL);
            whitespace_regex().replace_all(&header, ".").into_owned()
        })
        .into_owned()
}

/// Parse `.git/config` text into a nested mapping.
///
/// Section paths nest on `.` (post pre-pass), properties become string
/// leaves. Returns `Error::IniParse` on malformed input.
pub fn parse_git_config(text: &str) -> Result<Value> {
    let fixed = fix_section_names(text);
    // Escapes disabled: git config values may contain literal backslashes
    // (Windows paths) that must survive verbatim.
    let parsed = Ini::load_from_str_opt(
        &fixed,
        ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        },
    )
    .map_err(|err| Error::IniParse {
        message: err.to_string(),
    })?;

    let mut root = Map::new();
    for (section, properties) in parsed.iter() {
        let target = match section {
            None => &mut root,
            Some(name) => {
                let mut current = &mut root;
                for segment in name.split('.') {
                    let key = segment.replace(DOT_SENTINEL, ".");
                    current = child_object(current, &key);
                }
                current
            }
        };
        for (key, value) in properties.iter() {
            target.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    Ok(Value::Object(root))
}

/// Descend into `key`, creating (or replacing a non-object slot with) an
/// empty object as needed.
fn child_object<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut().unwrap()
}

/// Extract a normalized [`RepoRecord`] from the config file at `config_path`.
///
/// `folder_name` (the enclosing directory's base name) is authoritative for
/// the record name; remote URLs are never consulted for it. Remote entries
/// normalize to `url` with a `pushurl` fallback, discarding fetch refspecs
/// and other INI-only fields. Never returns an error: failures yield a
/// placeholder record carrying the diagnostic.
pub fn extract(config_path: &Path, folder_name: &str) -> RepoRecord {
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(err) => return failure_record(folder_name, config_path, "", &err.to_string()),
    };

    let parsed = match parse_git_config(&content) {
        Ok(parsed) => parsed,
        Err(err) => return failure_record(folder_name, config_path, &content, &err.to_string()),
    };

    let mut record = RepoRecord::new(folder_name);

    if let Some(remotes) = parsed.get("remote").and_then(Value::as_object) {
        for (name, entry) in remotes {
            let url = entry
                .get("url")
                .and_then(Value::as_str)
                .or_else(|| entry.get("pushurl").and_then(Value::as_str));
            match url {
                Some(url) => {
                    record.remotes.insert(name.clone(), RemoteInfo::new(url));
                }
                None => debug!(
                    "remote '{}' in {} has neither url nor pushurl, skipping",
                    name,
                    config_path.display()
                ),
            }
        }
    }

    if let Some(submodules) = parsed.get("submodule").and_then(Value::as_object) {
        for (path, entry) in submodules {
            let Some(url) = entry.get("url").and_then(Value::as_str) else {
                debug!(
                    "submodule '{}' in {} has no url, skipping",
                    path,
                    config_path.display()
                );
                continue;
            };
            let active = entry
                .get("active")
                .and_then(Value::as_str)
                .map(|value| value == "true");
            record.submodules.insert(
                path.clone(),
                SubmoduleInfo {
                    url: url.to_string(),
                    active,
                },
            );
        }
    }

    record
}

fn failure_record(
    folder_name: &str,
    config_path: &Path,
    content: &str,
    message: &str,
) -> RepoRecord {
    error!(
        "error on reading {}: {}",
        config_path.display(),
        message
    );
    RepoRecord::placeholder(
        folder_name,
        format!(
            "error: {}. file: {}. content: {}",
            message,
            config_path.display(),
            content
        ),
    )
}
