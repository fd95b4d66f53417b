//! Call scoped rendering state: identifier quoting, parameter binding and
//! the value encoding rules.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stratum_query::ValueKind;

use crate::interpret::compiled::CompiledQuery;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How literal values reach the driver. A compile time choice on the
/// interpreter, not a per call one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterMode {
    /// Emit named placeholders and let the driver substitute them.
    #[default]
    Substitution,
    /// Escape values into the SQL text directly; no parameters are bound.
    Escaped,
}

/// State for one interpretation call.
///
/// A fresh context is constructed inside every `interpret` call and threaded
/// through the compilers, so interpreter and compiler instances carry no
/// call state of their own.
#[derive(Debug)]
pub struct RenderContext {
    delimiter: String,
    mode: ParameterMode,
    parameters: IndexMap<String, serde_json::Value>,
    value_index: u64,
    primary_key_sequence: Option<String>,
}

impl RenderContext {
    pub fn new(delimiter: impl Into<String>, mode: ParameterMode) -> Self {
        RenderContext {
            delimiter: delimiter.into(),
            mode,
            parameters: IndexMap::new(),
            value_index: 0,
            primary_key_sequence: None,
        }
    }

    /// Quote a possibly dotted identifier, one segment at a time. A bare
    /// `*` segment passes through unquoted.
    pub fn quote_identifier(&self, raw: &str) -> String {
        raw.split('.')
            .map(|segment| {
                if segment == "*" {
                    segment.to_string()
                } else {
                    format!("{}{}{}", self.delimiter, segment, self.delimiter)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Bind a value and return the SQL text standing in for it: a named
    /// placeholder in substitution mode, an escaped literal otherwise.
    pub fn bind(
        &mut self,
        name_hint: Option<&str>,
        value: serde_json::Value,
        kind: Option<ValueKind>,
    ) -> String {
        let encoded = encode_value(value, kind);
        match self.mode {
            ParameterMode::Substitution => {
                let name = self.unique_name(name_hint);
                let placeholder = format!(":{name}");
                self.parameters.insert(name, encoded);
                placeholder
            }
            ParameterMode::Escaped => escape_literal(&encoded),
        }
    }

    /// Parameter names are unique within one compiled query: field based
    /// names take a monotonic suffix on collision, anonymous binds count up.
    fn unique_name(&mut self, hint: Option<&str>) -> String {
        let base = match hint {
            Some(hint) => hint.to_string(),
            None => {
                let name = format!("value{}", self.value_index);
                self.value_index += 1;
                name
            }
        };
        if !self.parameters.contains_key(&base) {
            return base;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.parameters.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Record the sequence to query for a newly generated key value.
    pub fn set_primary_key_sequence(&mut self, sequence: String) {
        self.primary_key_sequence = Some(sequence);
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Finish the call, producing the immutable compiled artifact.
    pub fn into_compiled(self, sql: String) -> CompiledQuery {
        CompiledQuery {
            sql,
            parameters: self.parameters,
            primary_key_sequence: self.primary_key_sequence,
        }
    }
}

/// Apply the type specific encoding rules to a literal value: composites
/// serialize to JSON text, date/time hinted values canonicalize to
/// timestamp text, everything else binds as given.
pub fn encode_value(value: serde_json::Value, kind: Option<ValueKind>) -> serde_json::Value {
    match kind {
        Some(ValueKind::DateTime) => canonical_timestamp(value),
        _ => match value {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                serde_json::Value::String(value.to_string())
            }
            other => other,
        },
    }
}

/// Render a date/time value as canonical timestamp text. RFC 3339 strings
/// and epoch second numbers are both accepted; anything else passes through
/// unchanged.
fn canonical_timestamp(value: serde_json::Value) -> serde_json::Value {
    match &value {
        serde_json::Value::String(text) => match DateTime::parse_from_rfc3339(text) {
            Ok(parsed) => serde_json::Value::String(parsed.format(TIMESTAMP_FORMAT).to_string()),
            Err(_) => match NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
                Ok(parsed) => {
                    serde_json::Value::String(parsed.format(TIMESTAMP_FORMAT).to_string())
                }
                Err(_) => value,
            },
        },
        serde_json::Value::Number(num) => {
            match num
                .as_i64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            {
                Some(parsed) => serde_json::Value::String(
                    parsed.naive_utc().format(TIMESTAMP_FORMAT).to_string(),
                ),
                None => value,
            }
        }
        _ => value,
    }
}

/// Escape a value into SQL literal text, for the escaped parameter mode.
fn escape_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        serde_json::Value::Number(num) => num.to_string(),
        serde_json::Value::String(text) => format!("'{}'", text.replace('\'', "''")),
        composite => format!("'{}'", composite.to_string().replace('\'', "''")),
    }
}
