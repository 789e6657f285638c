//! Contract (data type) context builder.
//!
//! Object schemas become classes, string enums become enums. Other named
//! schemas (primitive aliases, arrays, free-form maps) are skipped; the
//! [`TypeMapper`] maps references to them inline.

use super::csharp::TypeMapper;
use crate::openapi::{ref_name, OpenApiContext};
use crate::utils::{escape_string_literal, to_doc_text, to_type_name};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Class,
    Enum,
}

#[derive(Clone, Debug, Serialize)]
pub struct PropertyContext {
    /// Name on the wire
    pub json_name: String,
    pub name: String,
    pub type_name: String,
    pub summary: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumMemberContext {
    /// Serialized value
    pub value: String,
    pub name: String,
}

/// Context for one generated type
#[derive(Clone, Debug, Serialize)]
pub struct ContractContext {
    pub name: String,
    pub kind: ContractKind,
    pub summary: Option<String>,
    pub base_type: Option<String>,
    pub properties: Vec<PropertyContext>,
    pub members: Vec<EnumMemberContext>,
}

/// Whether a named schema is generated as a class or enum
pub fn is_contract_schema(schema: &JsonValue) -> bool {
    if schema.get("enum").is_some_and(JsonValue::is_array)
        || schema.get("properties").is_some()
        || schema.get("allOf").is_some()
    {
        return true;
    }
    // Objects that only describe their values are dictionaries
    schema.get("type").and_then(JsonValue::as_str) == Some("object")
        && !matches!(
            schema.get("additionalProperties"),
            Some(JsonValue::Object(_)) | Some(JsonValue::Bool(true))
        )
}

/// Builds [`ContractContext`]s from the document's named schemas
pub struct ContractContextBuilder<'a> {
    spec: &'a OpenApiContext,
    types: TypeMapper<'a>,
}

impl<'a> ContractContextBuilder<'a> {
    pub fn new(spec: &'a OpenApiContext) -> Self {
        Self {
            spec,
            types: TypeMapper::new(spec),
        }
    }

    /// Contracts for every supported named schema, ordered by name
    pub fn build_all(&self) -> Vec<ContractContext> {
        let mut contracts: Vec<ContractContext> = self
            .spec
            .schemas()
            .iter()
            .filter_map(|(name, schema)| self.build(name, schema))
            .collect();
        contracts.sort_by(|a, b| a.name.cmp(&b.name));
        contracts
    }

    /// Contract for a single named schema
    pub fn build(&self, name: &str, schema: &JsonValue) -> Option<ContractContext> {
        let type_name = to_type_name(name);
        let summary = schema
            .get("description")
            .and_then(JsonValue::as_str)
            .map(to_doc_text)
            .filter(|s| !s.is_empty());

        if let Some(values) = schema.get("enum").and_then(JsonValue::as_array) {
            return Some(ContractContext {
                name: type_name,
                kind: ContractKind::Enum,
                summary,
                base_type: None,
                properties: Vec::new(),
                members: enum_members(values),
            });
        }

        if !is_contract_schema(schema) {
            log::debug!("Skipping schema '{name}': not an object or enum");
            return None;
        }

        let mut base_type = None;
        let mut properties = Vec::new();
        let mut parts = vec![schema];
        if let Some(all_of) = schema.get("allOf").and_then(JsonValue::as_array) {
            parts.extend(all_of);
        }
        for part in parts {
            match part.get("$ref").and_then(JsonValue::as_str) {
                // The first referenced schema becomes the base class
                Some(reference) if base_type.is_none() => {
                    base_type = ref_name(reference).map(to_type_name);
                }
                Some(_) => {
                    if let Some(resolved) = self.spec.resolve_ref(part) {
                        properties.extend(self.properties(resolved, &type_name));
                    }
                }
                None => properties.extend(self.properties(part, &type_name)),
            }
        }

        Some(ContractContext {
            name: type_name,
            kind: ContractKind::Class,
            summary,
            base_type,
            properties,
            members: Vec::new(),
        })
    }

    fn properties(&self, schema: &JsonValue, owner: &str) -> Vec<PropertyContext> {
        let required: BTreeSet<&str> = schema
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|arr| arr.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default();

        schema
            .get("properties")
            .and_then(JsonValue::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(json_name, prop)| {
                        let mut name = to_type_name(json_name);
                        // A member cannot share its enclosing type's name
                        if name == owner {
                            name.push_str("Value");
                        }
                        let type_name = self.types.csharp_type(Some(prop));
                        let type_name = if required.contains(json_name.as_str()) {
                            type_name
                        } else {
                            self.types.optional(Some(prop), &type_name)
                        };
                        PropertyContext {
                            json_name: escape_string_literal(json_name),
                            name,
                            type_name,
                            summary: prop
                                .get("description")
                                .and_then(JsonValue::as_str)
                                .map(to_doc_text)
                                .filter(|s| !s.is_empty()),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn enum_members(values: &[JsonValue]) -> Vec<EnumMemberContext> {
    let mut seen = BTreeSet::new();
    values
        .iter()
        .filter_map(|value| match value {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter_map(|value| {
            let name = to_type_name(&value);
            seen.insert(name.clone()).then(|| EnumMemberContext {
                value: escape_string_literal(&value),
                name,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> OpenApiContext {
        OpenApiContext {
            json: json!({
                "components": {
                    "schemas": {
                        "Pet": {
                            "type": "object",
                            "description": "A pet",
                            "required": ["id"],
                            "properties": {
                                "id": { "type": "integer", "format": "int64" },
                                "name": { "type": "string" },
                                "pet": { "type": "boolean" },
                                "status": { "$ref": "#/components/schemas/pet_status" },
                                "nickname": { "$ref": "#/components/schemas/Name" },
                                "tags": { "$ref": "#/components/schemas/Tags" },
                                "labels": { "$ref": "#/components/schemas/Labels" }
                            }
                        },
                        "pet_status": { "type": "string", "enum": ["available", "on-hold", "sold"] },
                        "Dog": {
                            "allOf": [
                                { "$ref": "#/components/schemas/Pet" },
                                { "type": "object", "properties": { "barks": { "type": "boolean" } } }
                            ]
                        },
                        "Name": { "type": "string" },
                        "Tags": { "type": "array", "items": { "$ref": "#/components/schemas/Name" } },
                        "Labels": { "type": "object", "additionalProperties": { "type": "string" } }
                    }
                }
            }),
        }
    }

    #[test]
    fn test_build_all_orders_and_skips_aliases() {
        let spec = spec();
        let contracts = ContractContextBuilder::new(&spec).build_all();
        let names: Vec<_> = contracts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Dog", "Pet", "PetStatus"]);
    }

    #[test]
    fn test_class_properties() {
        let spec = spec();
        let contracts = ContractContextBuilder::new(&spec).build_all();
        let pet = &contracts[1];
        assert_eq!(pet.kind, ContractKind::Class);
        assert_eq!(pet.summary.as_deref(), Some("A pet"));
        let props: Vec<_> = pet
            .properties
            .iter()
            .map(|p| (p.json_name.as_str(), p.name.as_str(), p.type_name.as_str()))
            .collect();
        assert_eq!(
            props,
            vec![
                ("id", "Id", "long"),
                ("labels", "Labels", "IDictionary<string, string>"),
                ("name", "Name", "string"),
                ("nickname", "Nickname", "string"),
                ("pet", "PetValue", "bool?"),
                ("status", "Status", "PetStatus?"),
                ("tags", "Tags", "ICollection<string>"),
            ]
        );
    }

    #[test]
    fn test_contract_schema_detection() {
        assert!(is_contract_schema(&json!({ "type": "object" })));
        assert!(is_contract_schema(&json!({ "properties": {} })));
        assert!(is_contract_schema(&json!({ "enum": ["a"] })));
        assert!(!is_contract_schema(&json!({ "type": "string" })));
        assert!(!is_contract_schema(&json!({ "type": "array", "items": {} })));
        assert!(!is_contract_schema(
            &json!({ "type": "object", "additionalProperties": { "type": "string" } })
        ));
    }

    #[test]
    fn test_all_of_base_type() {
        let spec = spec();
        let contracts = ContractContextBuilder::new(&spec).build_all();
        let dog = &contracts[0];
        assert_eq!(dog.base_type.as_deref(), Some("Pet"));
        assert_eq!(dog.properties.len(), 1);
        assert_eq!(dog.properties[0].name, "Barks");
    }

    #[test]
    fn test_enum_members() {
        let spec = spec();
        let contracts = ContractContextBuilder::new(&spec).build_all();
        let status = &contracts[2];
        assert_eq!(status.kind, ContractKind::Enum);
        let members: Vec<_> = status
            .members
            .iter()
            .map(|m| (m.value.as_str(), m.name.as_str()))
            .collect();
        assert_eq!(
            members,
            vec![
                ("available", "Available"),
                ("on-hold", "OnHold"),
                ("sold", "Sold")
            ]
        );
    }
}
