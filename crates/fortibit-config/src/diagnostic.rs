// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette reports.
//!
//! Misspelled keys and worker modes get a "did you mean" hint; unknown keys
//! are underlined in the TOML file they came from when that file is known.

#![allow(unused_assignments)] // emitted by the miette derive

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler similarity a candidate needs before it is offered as a hint.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a fortibit setting")]
    #[diagnostic(
        code(fortibit::config::unknown_key),
        help("{}", hint(suggestion.as_deref(), "keys in this section", valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same section.
        valid_keys: String,
        #[label("unrecognised here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value outside a fixed set, such as `worker.mode`.
    #[error("`{value}` is not a valid value for `{key}`")]
    #[diagnostic(
        code(fortibit::config::unknown_variant),
        help("{}", hint(suggestion.as_deref(), "accepted values", valid_values))
    )]
    UnknownVariant {
        key: String,
        value: String,
        suggestion: Option<String>,
        valid_values: String,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(fortibit::config::invalid_type), help("`{key}` must be {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("`{key}` is required")]
    #[diagnostic(code(fortibit::config::missing_key), help("set `{key}` in fortibit.toml"))]
    MissingKey { key: String },

    /// A value that parsed but breaks a constraint (ranges, empty strings).
    #[error("validation error: {message}")]
    #[diagnostic(code(fortibit::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(fortibit::config::other))]
    Other(String),
}

fn hint(suggestion: Option<&str>, what: &str, choices: &str) -> String {
    match suggestion {
        Some(best) => format!("did you mean `{best}`? {what}: {choices}"),
        None => format!("{what}: {choices}"),
    }
}

fn dotted_path(error: &figment::Error) -> String {
    error.path.join(".")
}

/// Map every error inside `err` to a [`ConfigError`].
///
/// `toml_sources` holds `(path, content)` pairs of the files that were merged,
/// used to point at the offending line.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, accepted) => {
                let (span, src) = locate_key(&error, field, toml_sources)
                    .map_or((None, None), |(span, src)| (Some(span), Some(src)));
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, accepted),
                    valid_keys: accepted.join(", "),
                    span,
                    src,
                }
            }
            Kind::UnknownVariant(value, accepted) => ConfigError::UnknownVariant {
                key: dotted_path(&error),
                value: value.clone(),
                suggestion: suggest_key(value, accepted),
                valid_values: accepted.join(", "),
            },
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: dotted_path(&error),
                found: found.to_string(),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Span of `field` in the TOML file the error was read from, if that file
/// is among `sources`.
fn locate_key(
    error: &figment::Error,
    field: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let origin = match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => path.display().to_string(),
        _ => return None,
    };
    let (name, content) = sources.iter().find(|(name, _)| *name == origin)?;
    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` as a key inside the section named by `path[0]`,
/// or at top level when `path` is empty.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let mut offset = 0;
    let mut in_section = path.is_empty();

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if trimmed.starts_with('[') {
            let name = trimmed.trim_end().trim_start_matches('[').trim_end_matches(']');
            in_section = path.first().is_some_and(|section| section == name);
        } else if in_section {
            let is_key = trimmed
                .strip_prefix(field)
                .is_some_and(|rest| rest.trim_start().starts_with('='));
            if is_key {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }
    None
}

/// Closest entry of `candidates` to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, best)| best.to_string())
}

/// Print every error to stderr as a miette report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
