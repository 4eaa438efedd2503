//! Property resolution: raw property maps → typed attribute values.
//!
//! The validator and completion engine only depend on the
//! [`PropertyResolver`] trait. [`MetadataPropertyResolver`] is the built-in
//! implementation; it checks values against attribute metadata without any
//! further remote calls.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::Result;
use crate::types::{
    AttributeMetadata, DataType, PropertyError, PropertyMap, PropertyResolution, ResolveMode,
    ResolvedProperty, find_attribute,
};

/// Turns raw properties into typed values plus per-property errors.
///
/// An `Err` return means the resolver itself failed (e.g. a remote lookup
/// broke); per-property problems go into [`PropertyResolution::errors`].
#[async_trait]
pub trait PropertyResolver: Send + Sync {
    async fn resolve(
        &self,
        object_type_id: &str,
        attributes: &[AttributeMetadata],
        properties: &PropertyMap,
        mode: ResolveMode,
    ) -> Result<PropertyResolution>;
}

/// Resolves properties purely from attribute metadata.
///
/// - attribute names match case-insensitively and resolve to the
///   canonical name
/// - select and status values match case-insensitively and resolve to the
///   canonical option
/// - dates must be `YYYY-MM-DD`; datetimes RFC 3339 or `YYYY-MM-DD HH:MM:SS`
/// - references must look like an object key (`ITAM-42`) or a numeric ID
/// - null or blank values for required attributes are always errors; absent
///   required attributes only in [`ResolveMode::Complete`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataPropertyResolver;

impl MetadataPropertyResolver {
    pub fn new() -> Self {
        Self
    }

    fn resolve_sync(
        attributes: &[AttributeMetadata],
        properties: &PropertyMap,
        mode: ResolveMode,
    ) -> PropertyResolution {
        let mut resolution = PropertyResolution::default();

        for (name, value) in properties {
            let Some(attribute) = find_attribute(attributes, name) else {
                resolution.errors.push(PropertyError::unknown_property(name));
                continue;
            };

            if is_blank(value) {
                if attribute.required && !attribute.system {
                    resolution
                        .errors
                        .push(PropertyError::required_missing(&attribute.name));
                }
                continue;
            }

            match coerce(attribute, value) {
                Ok(value) => resolution.resolved.push(ResolvedProperty {
                    attribute: attribute.name.clone(),
                    value,
                }),
                Err(err) => resolution.errors.push(err),
            }
        }

        if mode == ResolveMode::Complete {
            for attribute in attributes.iter().filter(|a| a.required && !a.system) {
                if property_key(properties, &attribute.name).is_none() {
                    resolution
                        .errors
                        .push(PropertyError::required_missing(&attribute.name));
                }
            }
        }

        resolution
    }
}

#[async_trait]
impl PropertyResolver for MetadataPropertyResolver {
    async fn resolve(
        &self,
        _object_type_id: &str,
        attributes: &[AttributeMetadata],
        properties: &PropertyMap,
        mode: ResolveMode,
    ) -> Result<PropertyResolution> {
        Ok(Self::resolve_sync(attributes, properties, mode))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Key under which `name` appears in `properties`, if any (case-insensitive).
fn property_key<'a>(properties: &'a PropertyMap, name: &str) -> Option<&'a str> {
    properties
        .keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn coerce(attribute: &AttributeMetadata, value: &Value) -> std::result::Result<Value, PropertyError> {
    let field = attribute.name.as_str();
    let text = as_text(value);

    match &attribute.data_type {
        DataType::Date => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| PropertyError::invalid_date(field, &text)),
        DataType::DateTime => parse_datetime(&text)
            .map(Value::String)
            .ok_or_else(|| PropertyError::invalid_datetime(field, &text)),
        DataType::Select | DataType::Status => {
            let options = attribute.options();
            if options.is_empty() {
                return Ok(Value::String(text));
            }
            options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(&text))
                .map(|o| Value::String(o.clone()))
                .ok_or_else(|| PropertyError::invalid_option(field, &text, options))
        }
        DataType::Reference => {
            if is_object_reference(&text) {
                Ok(Value::String(text))
            } else {
                Err(PropertyError::invalid_reference(field, &text))
            }
        }
        DataType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            _ => text.parse::<i64>().map(Value::from).map_err(|_| {
                PropertyError::from_message(field, format!("expected an integer for '{field}', got '{text}'"))
            }),
        },
        DataType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => match text.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(PropertyError::from_message(
                    field,
                    format!("expected true or false for '{field}', got '{text}'"),
                )),
            },
        },
        DataType::Text | DataType::Other(_) => Ok(match value {
            Value::String(_) => Value::String(text),
            other => other.clone(),
        }),
    }
}

/// Normalise a datetime to RFC 3339, accepting a space-separated form too.
fn parse_datetime(text: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.to_rfc3339());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc().to_rfc3339())
}

/// `ITAM-42` style object key, or a bare numeric object ID.
fn is_object_reference(text: &str) -> bool {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    let Some((prefix, number)) = text.rsplit_once('-') else {
        return false;
    };
    !prefix.is_empty()
        && prefix.bytes().all(|b| b.is_ascii_alphanumeric())
        && prefix.as_bytes()[0].is_ascii_alphabetic()
        && !number.is_empty()
        && number.bytes().all(|b| b.is_ascii_digit())
}
