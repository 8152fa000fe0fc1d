// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment's flat deserialization errors into miette diagnostics the
//! terminal can render with spans and suggestions.
//!
//! A typo'd key is reported with the span of the offending key in the file
//! it came from and the list of keys its section accepts. When one of those
//! keys sits close enough by Jaro-Winkler distance, it is proposed as the
//! correction.

#![allow(unused_assignments)] // miette's Diagnostic derive trips this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Floor for proposing a correction. At 0.75, `whatsap` still reaches
/// `whatsapp` and `ttl_sec` reaches `ttl_secs`; unrelated keys score well
/// below it.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, carrying whatever context miette can render.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section of the config accepts.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(carelay::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest accepted key, when one scores above the threshold.
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(
        code(carelay::config::invalid_type),
        help("expected {expected}")
    )]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(carelay::config::missing_key),
        help("add `{key} = <value>` to your carelay.toml")
    )]
    MissingKey { key: String },

    /// A value that deserialized fine but fails a semantic rule.
    #[error("validation error: {message}")]
    #[diagnostic(code(carelay::config::validation))]
    Validation { message: String },

    /// Anything figment reports that the variants above don't model.
    #[error("configuration error: {0}")]
    #[diagnostic(code(carelay::config::other))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Fans a `figment::Error` out into one [`ConfigError`] per underlying
/// problem. Figment batches everything it found into a single error value;
/// callers want each problem reported on its own.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| classify(error, toml_sources))
        .collect()
}

fn classify(error: figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let valid: Vec<&str> = expected.to_vec();
            let (span, src) = find_source_span(&error, field, toml_sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, &valid),
                valid_keys: valid.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.clone().into_owned(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.clone(),
            span: None,
            src: None,
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Locates `field` in whichever collected TOML source the error's metadata
/// names. Both halves come back `None` when the error did not originate in a
/// file, or the file was not collected, or the key cannot be found in it.
fn find_source_span(
    error: &figment::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    if let Some(file) = file
        && let Some((path, content)) = toml_sources.iter().find(|(p, _)| *p == file)
        && let Some(offset) = find_key_offset(content, &error.path, field)
    {
        let span = SourceSpan::new(offset.into(), field.len());
        return (Some(span), Some(NamedSource::new(path, content.clone())));
    }

    (None, None)
}

/// Byte offset of `field` within its section of `content`.
///
/// The search starts after the `[section]` header named by the head of
/// `path` (from the top of the file for top-level keys) and accepts the
/// field only at the start of a line, followed by whitespace or `=`, so a
/// key that merely begins with `field` does not match.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let body_start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
    };

    let mut line_start = body_start;
    for line in content[body_start..].lines() {
        let key = line.trim_start();
        if let Some(rest) = key.strip_prefix(field)
            && rest.starts_with([' ', '\t', '='])
        {
            return Some(line_start + (line.len() - key.len()));
        }
        line_start += line.len() + 1;
    }

    None
}

/// The accepted key closest to `unknown`, if any scores above
/// [`SUGGESTION_THRESHOLD`].
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Renders diagnostics to stderr through miette's graphical handler, one
/// report per error. Falls back to a plain `Error:` line if a report
/// refuses to render.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
