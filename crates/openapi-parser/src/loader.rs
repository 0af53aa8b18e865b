//! Document loading: parse, check references, inline parameter/body refs

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ParseError, ParseResult};
use crate::types::{Document, HttpMethod};

/// Longest `$ref -> $ref -> ...` chain followed when inlining
const MAX_REFERENCE_CHAIN: usize = 16;

/// Loads a single local OpenAPI 3.x document
pub struct DocumentLoader;

impl DocumentLoader {
    /// Read and load a document from disk
    pub async fn load_file(path: impl AsRef<Path>) -> ParseResult<Document> {
        let path = path.as_ref();
        info!("Loading OpenAPI document from: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ParseError::ReadError {
                path: path.display().to_string(),
                source,
            })?;

        Self::load_str(&content)
    }

    /// Load a document from a string (auto-detects JSON/YAML)
    pub fn load_str(content: &str) -> ParseResult<Document> {
        let mut root = Self::parse_value(content)?;

        if !root.is_object() {
            return Err(ParseError::InvalidFormat(
                "document root must be a mapping".to_string(),
            ));
        }

        Self::check_version(&root)?;
        Self::check_references(&root, &root)?;
        Self::inline_operation_references(&mut root)?;

        let document: Document = serde_json::from_value(root)?;

        debug!(
            "Loaded OpenAPI {} document with {} paths and {} schemas",
            document.openapi,
            document.paths.len(),
            document.components.schemas.len()
        );

        Ok(document)
    }

    fn parse_value(content: &str) -> ParseResult<Value> {
        if content.trim_start().starts_with('{') {
            Ok(serde_json::from_str(content)?)
        } else {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
            yaml_to_json(yaml)
        }
    }

    fn check_version(root: &Value) -> ParseResult<()> {
        match root.get("openapi") {
            Some(Value::String(version)) if version.starts_with("3.") => Ok(()),
            Some(Value::String(version)) => Err(ParseError::UnsupportedVersion(version.clone())),
            Some(other) => Err(ParseError::UnsupportedVersion(other.to_string())),
            None => match root.get("swagger") {
                Some(version) => Err(ParseError::UnsupportedVersion(format!(
                    "swagger {}",
                    version.as_str().unwrap_or_default()
                ))),
                None => Err(ParseError::InvalidFormat(
                    "missing `openapi` version field".to_string(),
                )),
            },
        }
    }

    /// Every `$ref` must be a local pointer that resolves in this document
    fn check_references(root: &Value, node: &Value) -> ParseResult<()> {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    lookup(root, reference)?;
                }
                for value in map.values() {
                    Self::check_references(root, value)?;
                }
            }
            Value::Array(items) => {
                for item in items {
                    Self::check_references(root, item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Replace `$ref` parameters and request bodies with their targets.
    ///
    /// Schemas are left as references; the resolver expands them by name.
    fn inline_operation_references(root: &mut Value) -> ParseResult<()> {
        let snapshot = root.clone();

        let Some(paths) = root.get_mut("paths").and_then(Value::as_object_mut) else {
            return Ok(());
        };

        for path_item in paths.values_mut() {
            let Some(item) = path_item.as_object_mut() else {
                continue;
            };

            for (key, value) in item.iter_mut() {
                if key == "parameters" {
                    inline_each(&snapshot, value)?;
                } else if HttpMethod::from_key(key).is_some() {
                    if let Some(parameters) = value.get_mut("parameters") {
                        inline_each(&snapshot, parameters)?;
                    }
                    if let Some(body) = value.get_mut("requestBody") {
                        inline_reference(&snapshot, body)?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Resolve a local `#/...` reference against the document root
pub(crate) fn lookup<'a>(root: &'a Value, reference: &str) -> ParseResult<&'a Value> {
    let pointer = reference
        .strip_prefix('#')
        .ok_or_else(|| ParseError::ExternalReference(reference.to_string()))?;

    root.pointer(pointer)
        .ok_or_else(|| ParseError::UnresolvedReference(reference.to_string()))
}

fn inline_each(root: &Value, list: &mut Value) -> ParseResult<()> {
    if let Some(items) = list.as_array_mut() {
        for item in items {
            inline_reference(root, item)?;
        }
    }
    Ok(())
}

fn inline_reference(root: &Value, slot: &mut Value) -> ParseResult<()> {
    for _ in 0..MAX_REFERENCE_CHAIN {
        let target = match slot.get("$ref").and_then(Value::as_str) {
            Some(reference) => lookup(root, reference)?.clone(),
            None => return Ok(()),
        };
        *slot = target;
    }

    Err(ParseError::InvalidFormat(format!(
        "reference chain longer than {} links",
        MAX_REFERENCE_CHAIN
    )))
}

/// Convert a YAML tree to JSON, keeping mapping order.
///
/// Non-string keys (unquoted `200:` response codes and the like) are
/// stringified.
fn yaml_to_json(value: serde_yaml::Value) -> ParseResult<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<ParseResult<Vec<_>>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    other => {
                        return Err(ParseError::InvalidFormat(format!(
                            "unsupported mapping key: {:?}",
                            other
                        )))
                    }
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}
