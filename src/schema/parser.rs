// Textual schema parser for the Fulmen data format
//
// This module implements the recursive-descent resolver that turns a textual
// schema tree into a resolved Schema graph, registering named schemas as it
// descends so forward and self references close against the same instance.

use log::debug;
use serde_json::Value;

use crate::internal::error::{Error, Result};
use crate::schema::names::Names;
use crate::schema::node::{ScalarNode, SchemaNode};
use crate::schema::types::{Field, Name, Schema, SchemaKind};

const PRIMITIVE_RESERVED: &[&str] = &["type"];
const RECORD_RESERVED: &[&str] = &["type", "name", "namespace", "doc", "fields", "aliases"];
const ENUM_RESERVED: &[&str] = &["type", "name", "namespace", "doc", "symbols", "aliases"];
const FIXED_RESERVED: &[&str] = &["type", "name", "namespace", "doc", "size", "aliases"];
const ARRAY_RESERVED: &[&str] = &["type", "items"];
const MAP_RESERVED: &[&str] = &["type", "values"];

/// Resolves a schema description against a name registry.
///
/// The registry is a blanket precondition: an absent registry fails with
/// `InvalidArgument` before any node shape is inspected.
pub fn parse(node: &SchemaNode, names: Option<&mut Names>) -> Result<Schema> {
    let names = require_names(names)?;
    parse_node(node, names)
}

/// Resolves a JSON schema description against a name registry. A JSON null
/// is not a schema description and fails with `MalformedSchema`.
pub fn parse_json(value: &Value, names: Option<&mut Names>) -> Result<Schema> {
    let names = require_names(names)?;
    if value.is_null() {
        return Err(Error::MalformedSchema(
            "a schema description must not be null".to_string(),
        ));
    }
    parse_node(&SchemaNode::from(value), names)
}

/// Resolves a schema description held in a JSON string.
pub fn parse_str(text: &str, names: Option<&mut Names>) -> Result<Schema> {
    let names = require_names(names)?;
    let value: Value = serde_json::from_str(text).map_err(|err| {
        Error::MalformedSchema(format!("schema description is not valid JSON: {}", err))
    })?;
    if value.is_null() {
        return Err(Error::MalformedSchema(
            "a schema description must not be null".to_string(),
        ));
    }
    parse_node(&SchemaNode::from(&value), names)
}

fn require_names(names: Option<&mut Names>) -> Result<&mut Names> {
    names.ok_or_else(|| {
        Error::InvalidArgument("schema resolution requires a name registry".to_string())
    })
}

fn parse_node(node: &SchemaNode, names: &mut Names) -> Result<Schema> {
    match node {
        SchemaNode::Scalar(ScalarNode::Text(name)) => parse_type_name(name, names),
        SchemaNode::Scalar(scalar) => Err(Error::MalformedSchema(format!(
            "expected a type name or schema object, found scalar {:?}", scalar
        ))),
        SchemaNode::Sequence(members) => parse_union(members, names),
        SchemaNode::Mapping(_) => parse_mapping(node, names),
    }
}

/// A plain string denotes a primitive type name or a reference to a
/// previously registered full name, qualified against the enclosing
/// namespace when unqualified.
fn parse_type_name(raw: &str, names: &Names) -> Result<Schema> {
    if let Some(kind) = SchemaKind::parse_primitive(raw) {
        return Schema::primitive(kind);
    }
    let full_name = Name::new(raw, names.space())?.full_name();
    names.lookup(&full_name).ok_or_else(|| {
        Error::UnknownType(format!(
            "'{}' does not resolve to a schema in this session", full_name
        ))
    })
}

fn parse_union(members: &[SchemaNode], names: &mut Names) -> Result<Schema> {
    let mut branches = Vec::with_capacity(members.len());
    for member in members {
        branches.push(parse_node(member, names)?);
    }
    Schema::union(branches)
}

fn parse_mapping(node: &SchemaNode, names: &mut Names) -> Result<Schema> {
    let type_node = node.get("type").ok_or_else(|| {
        Error::MalformedSchema("schema object is missing the \"type\" key".to_string())
    })?;
    let type_name = type_node.as_text().ok_or_else(|| {
        Error::MalformedSchema("the \"type\" key of a schema object must be a string".to_string())
    })?;

    match type_name {
        "record" => parse_record(node, names, false),
        "error" => parse_record(node, names, true),
        "enum" => parse_enum(node, names),
        "fixed" => parse_fixed(node, names),
        "array" => {
            let items = node.get("items").ok_or_else(|| {
                Error::MalformedSchema("array schema is missing the \"items\" key".to_string())
            })?;
            let schema = Schema::array(parse_node(items, names)?);
            attach_props(&schema, node, ARRAY_RESERVED);
            Ok(schema)
        }
        "map" => {
            let values = node.get("values").ok_or_else(|| {
                Error::MalformedSchema("map schema is missing the \"values\" key".to_string())
            })?;
            let schema = Schema::map(parse_node(values, names)?);
            attach_props(&schema, node, MAP_RESERVED);
            Ok(schema)
        }
        other => match SchemaKind::parse_primitive(other) {
            Some(kind) => {
                let schema = Schema::primitive(kind)?;
                attach_props(&schema, node, PRIMITIVE_RESERVED);
                Ok(schema)
            }
            None => Err(Error::MalformedSchema(format!(
                "'{}' is not a known schema kind", other
            ))),
        },
    }
}

fn parse_record(node: &SchemaNode, names: &mut Names, is_error: bool) -> Result<Schema> {
    let name = require_text(node, "name", "record")?;
    let doc = optional_text(node, "doc")?;
    let schema = {
        let namespace = optional_text(node, "namespace")?.or_else(|| names.space());
        Schema::record(name, doc, namespace, is_error)?
    };
    if let Some(aliases) = node.get("aliases") {
        for alias in string_sequence(aliases, "aliases")? {
            schema.add_alias(&alias)?;
        }
    }
    // Registered before the fields resolve so self references find the
    // in-progress instance.
    names.register_schema(&schema)?;

    let saved_space = names.space().map(str::to_string);
    names.set_space(schema.namespace().map(str::to_string));
    let outcome = parse_record_fields(node, names, &schema);
    names.set_space(saved_space);
    outcome?;

    attach_props(&schema, node, RECORD_RESERVED);
    debug!(
        "parsed {} '{}'",
        if is_error { "error record" } else { "record" },
        schema.full_name().unwrap_or_default()
    );
    Ok(schema)
}

fn parse_record_fields(node: &SchemaNode, names: &mut Names, schema: &Schema) -> Result<()> {
    let full_name = schema.full_name().unwrap_or_default();
    let fields_node = node.get("fields").ok_or_else(|| {
        Error::MalformedSchema(format!(
            "record '{}' is missing the \"fields\" key", full_name
        ))
    })?;
    let entries = fields_node.as_sequence().ok_or_else(|| {
        Error::MalformedSchema(format!(
            "the \"fields\" of record '{}' must be a sequence", full_name
        ))
    })?;

    let mut fields = Vec::with_capacity(entries.len());
    for entry in entries {
        let field_name = require_text(entry, "name", "field")?;
        let type_node = entry.get("type").ok_or_else(|| {
            Error::MalformedSchema(format!(
                "field '{}' of record '{}' is missing the \"type\" key", field_name, full_name
            ))
        })?;
        let field_schema = parse_node(type_node, names)?;
        let mut field = Field::new(field_name, field_schema)?;
        if let Some(doc) = optional_text(entry, "doc")? {
            field = field.with_doc(doc);
        }
        if let Some(default) = entry.get("default") {
            field = field.with_default(default.to_json());
        }
        fields.push(field);
    }
    schema.set_fields(fields)
}

fn parse_enum(node: &SchemaNode, names: &mut Names) -> Result<Schema> {
    let name = require_text(node, "name", "enum")?;
    let doc = optional_text(node, "doc")?;
    let symbols_node = node.get("symbols").ok_or_else(|| {
        Error::MalformedSchema(format!("enum '{}' is missing the \"symbols\" key", name))
    })?;
    let symbols = string_sequence(symbols_node, "symbols")?;
    let schema = {
        let namespace = optional_text(node, "namespace")?.or_else(|| names.space());
        Schema::enumeration(name, doc, namespace, symbols)?
    };
    if let Some(aliases) = node.get("aliases") {
        for alias in string_sequence(aliases, "aliases")? {
            schema.add_alias(&alias)?;
        }
    }
    names.register_schema(&schema)?;
    attach_props(&schema, node, ENUM_RESERVED);
    Ok(schema)
}

fn parse_fixed(node: &SchemaNode, names: &mut Names) -> Result<Schema> {
    let name = require_text(node, "name", "fixed")?;
    let size = match node.get("size") {
        Some(SchemaNode::Scalar(ScalarNode::Int(size))) if *size >= 0 => *size as usize,
        Some(_) => {
            return Err(Error::MalformedSchema(format!(
                "the \"size\" of fixed '{}' must be a non-negative integer", name
            )))
        }
        None => {
            return Err(Error::MalformedSchema(format!(
                "fixed '{}' is missing the \"size\" key", name
            )))
        }
    };
    let schema = {
        let namespace = optional_text(node, "namespace")?.or_else(|| names.space());
        Schema::fixed(name, namespace, size)?
    };
    if let Some(aliases) = node.get("aliases") {
        for alias in string_sequence(aliases, "aliases")? {
            schema.add_alias(&alias)?;
        }
    }
    names.register_schema(&schema)?;
    attach_props(&schema, node, FIXED_RESERVED);
    Ok(schema)
}

/// Copies every non-reserved mapping entry onto the schema as a custom
/// property, preserving the entry order of the source.
fn attach_props(schema: &Schema, node: &SchemaNode, reserved: &[&str]) {
    if let Some(entries) = node.as_mapping() {
        for (key, value) in entries {
            if !reserved.contains(&key.as_str()) {
                schema.set_prop(key, value.to_json());
            }
        }
    }
}

fn require_text<'a>(node: &'a SchemaNode, key: &str, kind: &str) -> Result<&'a str> {
    match node.get(key) {
        Some(value) => value.as_text().ok_or_else(|| {
            Error::MalformedSchema(format!(
                "the \"{}\" key of a {} must be a string", key, kind
            ))
        }),
        None => Err(Error::MalformedSchema(format!(
            "{} is missing the \"{}\" key", kind, key
        ))),
    }
}

fn optional_text<'a>(node: &'a SchemaNode, key: &str) -> Result<Option<&'a str>> {
    match node.get(key) {
        None => Ok(None),
        Some(value) => match value.as_text() {
            Some(text) => Ok(Some(text)),
            None => Err(Error::MalformedSchema(format!(
                "the \"{}\" key must be a string when present", key
            ))),
        },
    }
}

fn string_sequence(node: &SchemaNode, key: &str) -> Result<Vec<String>> {
    let items = node.as_sequence().ok_or_else(|| {
        Error::MalformedSchema(format!("\"{}\" must be a sequence of strings", key))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_text().map(str::to_string).ok_or_else(|| {
                Error::MalformedSchema(format!("\"{}\" entries must be strings", key))
            })
        })
        .collect()
}
