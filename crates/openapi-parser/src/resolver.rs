//! Schema resolution: expands component schemas into flat field lists

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{Body, Field};

/// Longest chain of alias schemas (`Foo: {$ref: Bar}`) that is followed
const MAX_ALIAS_DEPTH: usize = 16;

/// Resolves named schemas and request body schemas into [`Body`] values
pub struct SchemaResolver<'a> {
    /// Component schemas from the OpenAPI document
    schemas: &'a IndexMap<String, Value>,
}

impl<'a> SchemaResolver<'a> {
    /// Create a new resolver over the given component schemas
    pub fn new(schemas: &'a IndexMap<String, Value>) -> Self {
        Self { schemas }
    }

    /// Expand the named component schema into a body.
    ///
    /// A schema without `properties` yields a body whose single property is
    /// the schema itself.
    pub fn resolve_schema(&self, name: &str) -> Body {
        self.resolve_named(name, &mut Vec::new())
    }

    /// Flatten the schema of a JSON request body.
    ///
    /// Handles a bare reference, `type: array` over a referenced item,
    /// `type: object` (first declared property only) and `allOf`. Anything
    /// else yields an empty body.
    pub fn resolve_request_body(&self, schema: &Value) -> Body {
        self.request_body(schema, &mut Vec::new())
    }

    fn request_body(&self, schema: &Value, visiting: &mut Vec<String>) -> Body {
        if let Some(target) = reference_name(schema) {
            return self.resolve_named(target, visiting);
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("array") => {
                let resolved = schema
                    .get("items")
                    .map(|items| self.resolve_any(items, "", visiting))
                    .unwrap_or_default();

                let parent = Field::new("", "array", description_of(schema), true)
                    .with_children(resolved.properties);

                Body {
                    properties: vec![parent],
                    examples: resolved.examples,
                }
            }
            Some("object") => {
                let first = schema
                    .get("properties")
                    .and_then(Value::as_object)
                    .and_then(|properties| properties.iter().next());

                let Some((key, property)) = first else {
                    debug!("Object request body without properties");
                    return Body::default();
                };

                let resolved = self.resolve_any(property, key, visiting);
                let parent = Field::new(
                    key.as_str(),
                    "object",
                    description_of(schema),
                    object_required(schema),
                )
                .with_children(resolved.properties);

                Body {
                    properties: vec![parent],
                    examples: resolved.examples,
                }
            }
            _ => match schema.get("allOf").and_then(Value::as_array) {
                Some(members) => {
                    let mut body = Body::default();
                    for member in members {
                        let resolved = self.request_body(member, visiting);
                        body.properties.extend(resolved.properties);
                        for (key, value) in resolved.examples {
                            body.examples.insert(key, value);
                        }
                    }
                    body
                }
                None => {
                    debug!("Unsupported request body schema shape, leaving body empty");
                    Body::default()
                }
            },
        }
    }

    /// Resolve either a reference or an inline schema
    fn resolve_any(&self, schema: &Value, label: &str, visiting: &mut Vec<String>) -> Body {
        match reference_name(schema) {
            Some(target) => self.resolve_named(target, visiting),
            None => self.resolve_model(label, schema, visiting),
        }
    }

    fn resolve_named(&self, name: &str, visiting: &mut Vec<String>) -> Body {
        if visiting.iter().any(|seen| seen == name) {
            warn!(
                "Circular schema reference: {} -> {}",
                visiting.join(" -> "),
                name
            );
            return Body {
                properties: vec![Field::circular(name)],
                examples: Map::new(),
            };
        }

        let Some(schema) = self.schemas.get(name) else {
            warn!("Schema not found in components: {}", name);
            return Body::default();
        };

        visiting.push(name.to_string());
        let body = match reference_name(schema) {
            // Alias of another component
            Some(target) => self.resolve_named(target, visiting),
            None => self.resolve_model(name, schema, visiting),
        };
        visiting.pop();

        body
    }

    fn resolve_model(&self, name: &str, schema: &Value, visiting: &mut Vec<String>) -> Body {
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Body {
                properties: vec![leaf_field(name, schema, false)],
                examples: Map::new(),
            };
        };

        let required = required_list(schema);
        let mut body = Body::default();

        for (key, property) in properties {
            let is_required = required.contains(&key.as_str());
            let field = match reference_name(property) {
                Some(target) => self.splice_reference(key, target, is_required, visiting),
                None => self.inline_field(key, property, is_required, visiting),
            };
            body.properties.push(field);
        }

        if let Some(example) = schema.get("example") {
            merge_example(&mut body.examples, example);
        }

        body
    }

    /// A property that refers to another component.
    ///
    /// Leaf targets are spliced in under the property's key; object targets
    /// become a nested field so none of their properties are dropped.
    fn splice_reference(
        &self,
        key: &str,
        target: &str,
        required: bool,
        visiting: &mut Vec<String>,
    ) -> Field {
        let model = self
            .follow_aliases(target)
            .filter(|schema| schema.get("properties").is_some());
        let resolved = self.resolve_named(target, visiting);

        if let Some(schema) = model {
            let mut field = Field::new(key, type_of(schema), description_of(schema), required)
                .with_children(resolved.properties);
            field.example = schema.get("example").cloned();
            return field;
        }

        match resolved.properties.into_iter().next() {
            Some(mut field) => {
                field.name = key.to_string();
                field.required = required;
                field
            }
            None => Field::new(key, "object", "", required),
        }
    }

    fn inline_field(
        &self,
        key: &str,
        property: &Value,
        required: bool,
        visiting: &mut Vec<String>,
    ) -> Field {
        let mut field = leaf_field(key, property, required);

        if property.get("properties").is_some() {
            field.children = Some(self.resolve_model(key, property, visiting).properties);
        } else if let Some(items) = property.get("items") {
            let item_fields = match reference_name(items) {
                Some(target) if self.is_model(target) => {
                    Some(self.resolve_named(target, visiting).properties)
                }
                Some(_) => None,
                None if items.get("properties").is_some() => {
                    Some(self.resolve_model(key, items, visiting).properties)
                }
                None => None,
            };
            field.children = item_fields;
        }

        field
    }

    fn is_model(&self, name: &str) -> bool {
        self.follow_aliases(name)
            .map(|schema| schema.get("properties").is_some())
            .unwrap_or(false)
    }

    fn follow_aliases(&self, name: &str) -> Option<&'a Value> {
        let mut schema = self.schemas.get(name)?;
        for _ in 0..MAX_ALIAS_DEPTH {
            match reference_name(schema) {
                Some(target) => schema = self.schemas.get(target)?,
                None => return Some(schema),
            }
        }
        None
    }
}

/// Component name of a `$ref` (last path segment)
fn reference_name(schema: &Value) -> Option<&str> {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|reference| reference.rsplit('/').next())
}

/// Keywords that are either mapped onto `Field` members or describe nesting
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "name",
    "type",
    "description",
    "required",
    "format",
    "enum",
    "example",
    "items",
    "children",
    "properties",
    "$ref",
    "allOf",
    "oneOf",
    "anyOf",
];

fn leaf_field(name: &str, schema: &Value, required: bool) -> Field {
    let mut field = Field::new(name, type_of(schema), description_of(schema), required);
    field.format = schema
        .get("format")
        .and_then(Value::as_str)
        .map(str::to_string);
    field.allowed_values = schema.get("enum").and_then(Value::as_array).cloned();
    field.example = schema.get("example").cloned();
    field.items = schema.get("items").cloned();
    if let Some(schema) = schema.as_object() {
        field.constraints = schema
            .iter()
            .filter(|(key, _)| !STRUCTURAL_KEYWORDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
    }
    field
}

fn type_of(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(t)) => t.clone(),
        // 3.1 style `type: [string, "null"]`
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .unwrap_or("object")
            .to_string(),
        _ if schema.get("items").is_some() => "array".to_string(),
        _ => "object".to_string(),
    }
}

fn description_of(schema: &Value) -> &str {
    schema
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn required_list(schema: &Value) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// The object schema's own `required` value, not per property
fn object_required(schema: &Value) -> bool {
    match schema.get("required") {
        Some(Value::Bool(required)) => *required,
        Some(Value::Array(names)) => !names.is_empty(),
        _ => false,
    }
}

fn merge_example(examples: &mut Map<String, Value>, example: &Value) {
    match example {
        Value::Object(entries) => {
            for (key, value) in entries {
                examples.insert(key.clone(), value.clone());
            }
        }
        other => {
            examples.insert("example".to_string(), other.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas() -> IndexMap<String, Value> {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Email".to_string(),
            json!({"type": "string", "description": "Customer's email address", "format": "email"}),
        );
        schemas.insert(
            "Amount".to_string(),
            json!({"type": "integer", "description": "Amount in kobo"}),
        );
        schemas.insert(
            "PartialDebit".to_string(),
            json!({
                "type": "object",
                "required": ["authorization_code", "currency"],
                "properties": {
                    "authorization_code": {"type": "string", "description": "Authorization Code"},
                    "currency": {"type": "string", "enum": ["NGN", "GHS"]},
                    "amount": {"$ref": "#/components/schemas/Amount"},
                    "email": {"$ref": "#/components/schemas/Email"}
                },
                "example": {"authorization_code": "AUTH_72btv547", "currency": "NGN"}
            }),
        );
        schemas.insert(
            "Metadata".to_string(),
            json!({
                "properties": {
                    "custom_fields": {"type": "array", "items": {"type": "object"}}
                },
                "example": {"custom_fields": []}
            }),
        );
        schemas.insert(
            "Recipient".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "account_number": {"type": "string"},
                    "bank_code": {"type": "string"}
                },
                "example": {"name": "Tolu", "bank_code": "058"}
            }),
        );
        schemas.insert(
            "Charge".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "email": {"type": "string"},
                    "metadata": {"$ref": "#/components/schemas/Metadata"}
                }
            }),
        );
        schemas
    }

    #[test]
    fn test_leaf_schema_becomes_single_property() {
        let schemas = schemas();
        let body = SchemaResolver::new(&schemas).resolve_schema("Email");

        assert_eq!(body.properties.len(), 1);
        let field = &body.properties[0];
        assert_eq!(field.field_type, "string");
        assert_eq!(field.description, "Customer's email address");
        assert_eq!(field.format.as_deref(), Some("email"));
        assert!(!field.required);
    }

    #[test]
    fn test_leaf_keeps_validation_keywords() {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Split".to_string(),
            json!({
                "type": "object",
                "required": ["share"],
                "properties": {
                    "share": {
                        "type": "integer",
                        "description": "Percentage share",
                        "minimum": 1,
                        "maximum": 100,
                        "nullable": true
                    },
                    "reference": {"type": "string", "maxLength": 100}
                }
            }),
        );

        let body = SchemaResolver::new(&schemas).resolve_schema("Split");
        let share = &body.properties[0];
        assert_eq!(share.constraints.get("minimum"), Some(&json!(1)));
        assert_eq!(share.constraints.get("maximum"), Some(&json!(100)));
        assert_eq!(share.constraints.get("nullable"), Some(&json!(true)));
        assert!(!share.constraints.contains_key("type"));
        assert!(share.required);

        let serialized = serde_json::to_value(&body.properties[1]).unwrap();
        assert_eq!(serialized["maxLength"], 100);
        assert_eq!(serialized["type"], "string");
    }

    #[test]
    fn test_properties_keep_declaration_order_and_required_flags() {
        let schemas = schemas();
        let body = SchemaResolver::new(&schemas).resolve_schema("PartialDebit");

        let names: Vec<_> = body.properties.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["authorization_code", "currency", "amount", "email"]);

        assert!(body.properties[0].required);
        assert!(body.properties[1].required);
        assert!(!body.properties[2].required);
        assert_eq!(body.properties[1].allowed_values.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_required_list_defaults_to_false() {
        let schemas = schemas();
        let body = SchemaResolver::new(&schemas).resolve_schema("Recipient");
        assert!(body.properties.iter().all(|f| !f.required));
    }

    #[test]
    fn test_reference_is_spliced_and_renamed() {
        let schemas = schemas();
        let body = SchemaResolver::new(&schemas).resolve_schema("PartialDebit");

        let amount = &body.properties[2];
        assert_eq!(amount.name, "amount");
        assert_eq!(amount.field_type, "integer");
        assert_eq!(amount.description, "Amount in kobo");
        assert!(amount.children.is_none());
    }

    #[test]
    fn test_reference_to_object_keeps_every_field() {
        let schemas = schemas();
        let body = SchemaResolver::new(&schemas).resolve_schema("Charge");

        let metadata = &body.properties[1];
        assert_eq!(metadata.name, "metadata");
        assert_eq!(metadata.field_type, "object");
        let children = metadata.children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "custom_fields");
        assert_eq!(children[0].field_type, "array");
    }

    #[test]
    fn test_example_is_attached() {
        let schemas = schemas();
        let body = SchemaResolver::new(&schemas).resolve_schema("PartialDebit");
        assert_eq!(body.examples["authorization_code"], "AUTH_72btv547");
    }

    #[test]
    fn test_unknown_schema_is_empty() {
        let schemas = schemas();
        let body = SchemaResolver::new(&schemas).resolve_schema("DoesNotExist");
        assert!(body.is_empty());
    }

    #[test]
    fn test_request_body_reference() {
        let schemas = schemas();
        let resolver = SchemaResolver::new(&schemas);
        let body = resolver.resolve_request_body(&json!({"$ref": "#/components/schemas/PartialDebit"}));
        assert_eq!(body, resolver.resolve_schema("PartialDebit"));
    }

    #[test]
    fn test_request_body_array() {
        let schemas = schemas();
        let resolver = SchemaResolver::new(&schemas);
        let body = resolver.resolve_request_body(&json!({
            "type": "array",
            "description": "Recipients to create",
            "items": {"$ref": "#/components/schemas/Recipient"}
        }));

        assert_eq!(body.properties.len(), 1);
        let parent = &body.properties[0];
        assert_eq!(parent.name, "");
        assert_eq!(parent.field_type, "array");
        assert!(parent.required);
        assert_eq!(parent.description, "Recipients to create");
        assert_eq!(
            parent.children.as_ref().unwrap(),
            &resolver.resolve_schema("Recipient").properties
        );
        assert_eq!(body.examples["bank_code"], "058");
    }

    #[test]
    fn test_request_body_object_uses_first_property_only() {
        let schemas = schemas();
        let resolver = SchemaResolver::new(&schemas);
        let body = resolver.resolve_request_body(&json!({
            "type": "object",
            "properties": {
                "batch": {"$ref": "#/components/schemas/Recipient"},
                "ignored": {"$ref": "#/components/schemas/Charge"}
            }
        }));

        assert_eq!(body.properties.len(), 1);
        let parent = &body.properties[0];
        assert_eq!(parent.name, "batch");
        assert_eq!(parent.field_type, "object");
        assert!(!parent.required);
        assert_eq!(parent.children.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_request_body_object_required_from_schema() {
        let schemas = schemas();
        let resolver = SchemaResolver::new(&schemas);
        let body = resolver.resolve_request_body(&json!({
            "type": "object",
            "required": ["batch"],
            "properties": {"batch": {"$ref": "#/components/schemas/Recipient"}}
        }));
        assert!(body.properties[0].required);
    }

    #[test]
    fn test_request_body_all_of() {
        let schemas = schemas();
        let resolver = SchemaResolver::new(&schemas);
        let body = resolver.resolve_request_body(&json!({
            "allOf": [
                {"$ref": "#/components/schemas/Recipient"},
                {"$ref": "#/components/schemas/PartialDebit"},
                {"$ref": "#/components/schemas/Metadata"}
            ]
        }));

        let expected = resolver.resolve_schema("Recipient").properties.len()
            + resolver.resolve_schema("PartialDebit").properties.len()
            + resolver.resolve_schema("Metadata").properties.len();
        assert_eq!(body.properties.len(), expected);
        assert_eq!(body.properties[0].name, "name");

        assert_eq!(body.examples["name"], "Tolu");
        assert_eq!(body.examples["currency"], "NGN");
        assert_eq!(body.examples["custom_fields"], json!([]));
    }

    #[test]
    fn test_request_body_all_of_last_example_wins() {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "First".to_string(),
            json!({"properties": {"a": {"type": "string"}}, "example": {"a": "1", "shared": "first"}}),
        );
        schemas.insert(
            "Second".to_string(),
            json!({"properties": {"b": {"type": "string"}}, "example": {"shared": "second"}}),
        );

        let body = SchemaResolver::new(&schemas).resolve_request_body(&json!({
            "allOf": [
                {"$ref": "#/components/schemas/First"},
                {"$ref": "#/components/schemas/Second"}
            ]
        }));

        assert_eq!(body.examples["shared"], "second");
        assert_eq!(body.examples["a"], "1");
    }

    #[test]
    fn test_request_body_unsupported_shape_is_empty() {
        let schemas = schemas();
        let resolver = SchemaResolver::new(&schemas);

        assert!(resolver.resolve_request_body(&json!({"type": "string"})).is_empty());
        assert!(resolver
            .resolve_request_body(&json!({"oneOf": [{"$ref": "#/components/schemas/Email"}]}))
            .is_empty());
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Node".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "parent": {"$ref": "#/components/schemas/Node"}
                }
            }),
        );

        let body = SchemaResolver::new(&schemas).resolve_schema("Node");

        let parent = &body.properties[1];
        assert_eq!(parent.name, "parent");
        let children = parent.children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].description, "Circular reference to Node");
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let mut schemas = IndexMap::new();
        schemas.insert(
            "Customer".to_string(),
            json!({"properties": {"subaccount": {"$ref": "#/components/schemas/Subaccount"}}}),
        );
        schemas.insert(
            "Subaccount".to_string(),
            json!({"properties": {"owner": {"$ref": "#/components/schemas/Customer"}}}),
        );

        let body = SchemaResolver::new(&schemas).resolve_schema("Customer");

        let subaccount = &body.properties[0];
        let owner = &subaccount.children.as_ref().unwrap()[0];
        assert_eq!(owner.name, "owner");
        assert_eq!(
            owner.children.as_ref().unwrap()[0],
            Field::circular("Customer")
        );
    }

    #[test]
    fn test_alias_cycle_terminates() {
        let mut schemas = IndexMap::new();
        schemas.insert("A".to_string(), json!({"$ref": "#/components/schemas/B"}));
        schemas.insert("B".to_string(), json!({"$ref": "#/components/schemas/A"}));

        let body = SchemaResolver::new(&schemas).resolve_schema("A");
        assert_eq!(body.properties, vec![Field::circular("A")]);
    }
}
