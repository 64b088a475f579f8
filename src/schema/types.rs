// Schema type system for the Fulmen data format
//
// This module defines the canonical schema model: the tagged union of schema
// kinds, named-type metadata (full names, aliases, documentation, custom
// properties), and the validated constructors that build schema graphs.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use log::trace;
use serde_json::Value;

use crate::internal::error::{Error, Result};
use crate::schema::node::{ScalarNode, SchemaNode};

/// The tag of a schema, one per schema kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record,
    Enum,
    Array,
    Map,
    Union,
    Fixed,
}

impl SchemaKind {
    /// Returns true if this kind carries no payload beyond the tag.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            SchemaKind::Null
                | SchemaKind::Boolean
                | SchemaKind::Int
                | SchemaKind::Long
                | SchemaKind::Float
                | SchemaKind::Double
                | SchemaKind::Bytes
                | SchemaKind::String
        )
    }

    /// Returns true if this kind carries an identity distinct from its
    /// structure (record, enum, fixed).
    pub fn is_named(&self) -> bool {
        matches!(self, SchemaKind::Record | SchemaKind::Enum | SchemaKind::Fixed)
    }

    /// The textual name of this kind as it appears in schema descriptions.
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Int => "int",
            SchemaKind::Long => "long",
            SchemaKind::Float => "float",
            SchemaKind::Double => "double",
            SchemaKind::Bytes => "bytes",
            SchemaKind::String => "string",
            SchemaKind::Record => "record",
            SchemaKind::Enum => "enum",
            SchemaKind::Array => "array",
            SchemaKind::Map => "map",
            SchemaKind::Union => "union",
            SchemaKind::Fixed => "fixed",
        }
    }

    /// Resolves a textual primitive type name to its kind.
    pub fn parse_primitive(name: &str) -> Option<SchemaKind> {
        match name {
            "null" => Some(SchemaKind::Null),
            "boolean" => Some(SchemaKind::Boolean),
            "int" => Some(SchemaKind::Int),
            "long" => Some(SchemaKind::Long),
            "float" => Some(SchemaKind::Float),
            "double" => Some(SchemaKind::Double),
            "bytes" => Some(SchemaKind::Bytes),
            "string" => Some(SchemaKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A namespace-qualified schema name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    name: String,
    namespace: Option<String>,
}

impl Name {
    /// Builds a name from a raw identifier. A raw name containing `'.'` is
    /// explicitly qualified and split at the last dot; otherwise the
    /// enclosing namespace (if any) qualifies it.
    pub fn new(raw: &str, enclosing: Option<&str>) -> Result<Name> {
        if raw.is_empty() {
            return Err(Error::MalformedSchema("schema names must not be empty".to_string()));
        }
        if let Some(split) = raw.rfind('.') {
            let (namespace, simple) = raw.split_at(split);
            let simple = &simple[1..];
            if namespace.is_empty() || simple.is_empty() {
                return Err(Error::MalformedSchema(format!(
                    "'{}' is not a valid qualified name", raw
                )));
            }
            Ok(Name {
                name: simple.to_string(),
                namespace: Some(namespace.to_string()),
            })
        } else {
            Ok(Name {
                name: raw.to_string(),
                namespace: enclosing.filter(|ns| !ns.is_empty()).map(str::to_string),
            })
        }
    }

    /// The simple (unqualified) name.
    pub fn simple(&self) -> &str {
        &self.name
    }

    /// The namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The full name: `namespace.name` when a namespace is present, else the
    /// simple name alone.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}.{}", namespace, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// A single field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    schema: Schema,
    doc: Option<String>,
    default: Option<Value>,
}

impl Field {
    /// Creates a field with the given name and type.
    pub fn new(name: impl Into<String>, schema: Schema) -> Result<Field> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::MalformedSchema("field names must not be empty".to_string()));
        }
        Ok(Field {
            name,
            schema,
            doc: None,
            default: None,
        })
    }

    /// Attaches documentation to the field.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Field {
        self.doc = Some(doc.into());
        self
    }

    /// Attaches a default value to the field.
    pub fn with_default(mut self, default: Value) -> Field {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

struct RecordSchema {
    name: Name,
    doc: Option<String>,
    is_error: bool,
    // Late-bound so a record can be registered before its fields resolve.
    fields: RefCell<Vec<Field>>,
    aliases: RefCell<Vec<String>>,
}

struct EnumSchema {
    name: Name,
    doc: Option<String>,
    symbols: Vec<String>,
    aliases: RefCell<Vec<String>>,
}

struct FixedSchema {
    name: Name,
    size: usize,
    aliases: RefCell<Vec<String>>,
}

enum SchemaVariant {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(RecordSchema),
    Enum(EnumSchema),
    Fixed(FixedSchema),
    Array { items: Schema },
    Map { values: Schema },
    Union { branches: Vec<Schema> },
}

struct SchemaInner {
    variant: SchemaVariant,
    // Insertion order is preserved for re-serialization; equality treats the
    // properties as an unordered set.
    props: RefCell<Vec<(String, Value)>>,
}

/// A resolved schema: a cheap-to-clone shared handle over the tagged union.
///
/// Cloning a `Schema` clones the handle, not the payload, so a clone refers
/// to the same underlying instance. This is what lets a field that references
/// its own enclosing record resolve to that record rather than a copy.
///
/// Schemas are single-threaded by contract: resolution never suspends, and a
/// registry plus the schemas it produced must stay confined to one thread.
#[derive(Clone)]
pub struct Schema {
    inner: Rc<SchemaInner>,
}

impl Schema {
    fn from_variant(variant: SchemaVariant) -> Schema {
        Schema {
            inner: Rc::new(SchemaInner {
                variant,
                props: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Creates a primitive schema of the given kind.
    pub fn primitive(kind: SchemaKind) -> Result<Schema> {
        let variant = match kind {
            SchemaKind::Null => SchemaVariant::Null,
            SchemaKind::Boolean => SchemaVariant::Boolean,
            SchemaKind::Int => SchemaVariant::Int,
            SchemaKind::Long => SchemaVariant::Long,
            SchemaKind::Float => SchemaVariant::Float,
            SchemaKind::Double => SchemaVariant::Double,
            SchemaKind::Bytes => SchemaVariant::Bytes,
            SchemaKind::String => SchemaVariant::String,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "'{}' is not a primitive schema kind", other
                )))
            }
        };
        Ok(Schema::from_variant(variant))
    }

    /// Creates a record schema with an empty field list. The field list is
    /// attached later with [`Schema::set_fields`], which is what allows a
    /// record to be registered before its fields are resolved.
    pub fn record(
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        is_error: bool,
    ) -> Result<Schema> {
        let name = Name::new(name, namespace)?;
        Ok(Schema::from_variant(SchemaVariant::Record(RecordSchema {
            name,
            doc: doc.map(str::to_string),
            is_error,
            fields: RefCell::new(Vec::new()),
            aliases: RefCell::new(Vec::new()),
        })))
    }

    /// Creates a record schema and attaches its fields in one step.
    pub fn record_with_fields(
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        is_error: bool,
        fields: Vec<Field>,
    ) -> Result<Schema> {
        let schema = Schema::record(name, doc, namespace, is_error)?;
        schema.set_fields(fields)?;
        Ok(schema)
    }

    /// Creates an enum schema. The symbol list must be non-empty and free of
    /// duplicates.
    pub fn enumeration(
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        symbols: Vec<String>,
    ) -> Result<Schema> {
        let name = Name::new(name, namespace)?;
        if symbols.is_empty() {
            return Err(Error::MalformedSchema(format!(
                "enum '{}' must declare at least one symbol",
                name.full_name()
            )));
        }
        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(Error::MalformedSchema(format!(
                    "enum '{}' declares symbol '{}' more than once",
                    name.full_name(),
                    symbol
                )));
            }
        }
        Ok(Schema::from_variant(SchemaVariant::Enum(EnumSchema {
            name,
            doc: doc.map(str::to_string),
            symbols,
            aliases: RefCell::new(Vec::new()),
        })))
    }

    /// Creates a fixed schema of the given byte size.
    pub fn fixed(name: &str, namespace: Option<&str>, size: usize) -> Result<Schema> {
        let name = Name::new(name, namespace)?;
        Ok(Schema::from_variant(SchemaVariant::Fixed(FixedSchema {
            name,
            size,
            aliases: RefCell::new(Vec::new()),
        })))
    }

    /// Creates an array schema over the given element type.
    pub fn array(items: Schema) -> Schema {
        Schema::from_variant(SchemaVariant::Array { items })
    }

    /// Creates a map schema over the given value type. Keys are implicitly
    /// string-typed.
    pub fn map(values: Schema) -> Schema {
        Schema::from_variant(SchemaVariant::Map { values })
    }

    /// Creates a union schema. No two branches may share a type tag, and a
    /// branch may not itself be a union.
    pub fn union(branches: Vec<Schema>) -> Result<Schema> {
        let mut seen = HashSet::new();
        for branch in &branches {
            let kind = branch.kind();
            if kind == SchemaKind::Union {
                return Err(Error::InvalidUnion(
                    "a union may not immediately contain another union".to_string(),
                ));
            }
            if !seen.insert(kind) {
                return Err(Error::InvalidUnion(format!(
                    "a union may not declare two '{}' branches", kind
                )));
            }
        }
        Ok(Schema::from_variant(SchemaVariant::Union { branches }))
    }

    /// Returns true if two handles refer to the same schema instance.
    pub fn ptr_eq(a: &Schema, b: &Schema) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// The type tag of this schema.
    pub fn kind(&self) -> SchemaKind {
        match &self.inner.variant {
            SchemaVariant::Null => SchemaKind::Null,
            SchemaVariant::Boolean => SchemaKind::Boolean,
            SchemaVariant::Int => SchemaKind::Int,
            SchemaVariant::Long => SchemaKind::Long,
            SchemaVariant::Float => SchemaKind::Float,
            SchemaVariant::Double => SchemaKind::Double,
            SchemaVariant::Bytes => SchemaKind::Bytes,
            SchemaVariant::String => SchemaKind::String,
            SchemaVariant::Record(_) => SchemaKind::Record,
            SchemaVariant::Enum(_) => SchemaKind::Enum,
            SchemaVariant::Fixed(_) => SchemaKind::Fixed,
            SchemaVariant::Array { .. } => SchemaKind::Array,
            SchemaVariant::Map { .. } => SchemaKind::Map,
            SchemaVariant::Union { .. } => SchemaKind::Union,
        }
    }

    fn named(&self) -> Option<(&Name, &RefCell<Vec<String>>)> {
        match &self.inner.variant {
            SchemaVariant::Record(record) => Some((&record.name, &record.aliases)),
            SchemaVariant::Enum(inner) => Some((&inner.name, &inner.aliases)),
            SchemaVariant::Fixed(fixed) => Some((&fixed.name, &fixed.aliases)),
            _ => None,
        }
    }

    /// The simple name of a named schema.
    pub fn name(&self) -> Option<&str> {
        self.named().map(|(name, _)| name.simple())
    }

    /// The namespace of a named schema.
    pub fn namespace(&self) -> Option<&str> {
        self.named().and_then(|(name, _)| name.namespace())
    }

    /// The full name of a named schema.
    pub fn full_name(&self) -> Option<String> {
        self.named().map(|(name, _)| name.full_name())
    }

    /// Documentation attached to a record or enum schema.
    pub fn doc(&self) -> Option<&str> {
        match &self.inner.variant {
            SchemaVariant::Record(record) => record.doc.as_deref(),
            SchemaVariant::Enum(inner) => inner.doc.as_deref(),
            _ => None,
        }
    }

    /// True for records that model exception-like types.
    pub fn is_error(&self) -> bool {
        match &self.inner.variant {
            SchemaVariant::Record(record) => record.is_error,
            _ => false,
        }
    }

    /// A snapshot of a record's fields.
    pub fn fields(&self) -> Option<Vec<Field>> {
        match &self.inner.variant {
            SchemaVariant::Record(record) => Some(record.fields.borrow().clone()),
            _ => None,
        }
    }

    /// Replaces a record's field list, the finish step of two-phase record
    /// construction. Field names must be unique within the record.
    pub fn set_fields(&self, fields: Vec<Field>) -> Result<()> {
        let record = match &self.inner.variant {
            SchemaVariant::Record(record) => record,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "cannot attach fields to a '{}' schema", self.kind()
                )))
            }
        };
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(Error::MalformedSchema(format!(
                    "record '{}' declares field '{}' more than once",
                    record.name.full_name(),
                    field.name()
                )));
            }
        }
        trace!("record '{}': attached {} field(s)", record.name.full_name(), fields.len());
        *record.fields.borrow_mut() = fields;
        Ok(())
    }

    /// The symbols of an enum schema.
    pub fn symbols(&self) -> Option<&[String]> {
        match &self.inner.variant {
            SchemaVariant::Enum(inner) => Some(&inner.symbols),
            _ => None,
        }
    }

    /// The byte size of a fixed schema.
    pub fn size(&self) -> Option<usize> {
        match &self.inner.variant {
            SchemaVariant::Fixed(fixed) => Some(fixed.size),
            _ => None,
        }
    }

    /// The element type of an array schema.
    pub fn items(&self) -> Option<&Schema> {
        match &self.inner.variant {
            SchemaVariant::Array { items } => Some(items),
            _ => None,
        }
    }

    /// The value type of a map schema.
    pub fn values(&self) -> Option<&Schema> {
        match &self.inner.variant {
            SchemaVariant::Map { values } => Some(values),
            _ => None,
        }
    }

    /// The member schemas of a union, in declaration order.
    pub fn branches(&self) -> Option<&[Schema]> {
        match &self.inner.variant {
            SchemaVariant::Union { branches } => Some(branches),
            _ => None,
        }
    }

    /// A snapshot of a named schema's aliases, in insertion order.
    pub fn aliases(&self) -> Vec<String> {
        match self.named() {
            Some((_, aliases)) => aliases.borrow().clone(),
            None => Vec::new(),
        }
    }

    /// Adds an alias to a named schema. Adding an alias that is already
    /// present is a no-op.
    pub fn add_alias(&self, alias: &str) -> Result<()> {
        let (name, aliases) = self.named().ok_or_else(|| {
            Error::InvalidArgument(format!("'{}' schemas cannot carry aliases", self.kind()))
        })?;
        let mut aliases = aliases.borrow_mut();
        if !aliases.iter().any(|existing| existing == alias) {
            trace!("schema '{}': added alias '{}'", name.full_name(), alias);
            aliases.push(alias.to_string());
        }
        Ok(())
    }

    /// Sets a custom property, replacing any existing value for the key.
    pub fn set_prop(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut props = self.inner.props.borrow_mut();
        if let Some(entry) = props.iter_mut().find(|(existing, _)| existing == key) {
            entry.1 = value;
        } else {
            props.push((key.to_string(), value));
        }
    }

    /// Looks up a custom property.
    pub fn prop(&self, key: &str) -> Option<Value> {
        self.inner
            .props
            .borrow()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.clone())
    }

    /// A snapshot of all custom properties, in insertion order.
    pub fn props(&self) -> Vec<(String, Value)> {
        self.inner.props.borrow().clone()
    }

    /// Renders the schema back to its canonical textual tree. A named schema
    /// that has already been rendered within the same call appears as its
    /// full name, which keeps cyclic graphs from rendering forever.
    pub fn to_node(&self) -> SchemaNode {
        let mut seen = HashSet::new();
        self.render(&mut seen)
    }

    /// Renders the schema back to its canonical JSON form.
    pub fn to_json(&self) -> Value {
        self.to_node().to_json()
    }

    fn render(&self, seen: &mut HashSet<String>) -> SchemaNode {
        match &self.inner.variant {
            SchemaVariant::Null
            | SchemaVariant::Boolean
            | SchemaVariant::Int
            | SchemaVariant::Long
            | SchemaVariant::Float
            | SchemaVariant::Double
            | SchemaVariant::Bytes
            | SchemaVariant::String => {
                if self.inner.props.borrow().is_empty() {
                    SchemaNode::text(self.kind().type_name())
                } else {
                    let mut entries =
                        vec![("type".to_string(), SchemaNode::text(self.kind().type_name()))];
                    self.push_props(&mut entries);
                    SchemaNode::Mapping(entries)
                }
            }
            SchemaVariant::Record(record) => {
                let full = record.name.full_name();
                if !seen.insert(full.clone()) {
                    return SchemaNode::text(full);
                }
                let mut entries = vec![
                    (
                        "type".to_string(),
                        SchemaNode::text(if record.is_error { "error" } else { "record" }),
                    ),
                    ("name".to_string(), SchemaNode::text(record.name.simple())),
                ];
                if let Some(namespace) = record.name.namespace() {
                    entries.push(("namespace".to_string(), SchemaNode::text(namespace)));
                }
                if let Some(doc) = &record.doc {
                    entries.push(("doc".to_string(), SchemaNode::text(doc)));
                }
                let fields = record.fields.borrow();
                let rendered: Vec<SchemaNode> = fields
                    .iter()
                    .map(|field| {
                        let mut entry = vec![
                            ("name".to_string(), SchemaNode::text(field.name())),
                            ("type".to_string(), field.schema().render(seen)),
                        ];
                        if let Some(doc) = field.doc() {
                            entry.push(("doc".to_string(), SchemaNode::text(doc)));
                        }
                        if let Some(default) = field.default() {
                            entry.push(("default".to_string(), SchemaNode::from(default)));
                        }
                        SchemaNode::Mapping(entry)
                    })
                    .collect();
                entries.push(("fields".to_string(), SchemaNode::Sequence(rendered)));
                push_aliases(&mut entries, &record.aliases);
                self.push_props(&mut entries);
                SchemaNode::Mapping(entries)
            }
            SchemaVariant::Enum(inner) => {
                let full = inner.name.full_name();
                if !seen.insert(full.clone()) {
                    return SchemaNode::text(full);
                }
                let mut entries = vec![
                    ("type".to_string(), SchemaNode::text("enum")),
                    ("name".to_string(), SchemaNode::text(inner.name.simple())),
                ];
                if let Some(namespace) = inner.name.namespace() {
                    entries.push(("namespace".to_string(), SchemaNode::text(namespace)));
                }
                if let Some(doc) = &inner.doc {
                    entries.push(("doc".to_string(), SchemaNode::text(doc)));
                }
                entries.push((
                    "symbols".to_string(),
                    SchemaNode::Sequence(
                        inner.symbols.iter().map(|symbol| SchemaNode::text(symbol.as_str())).collect(),
                    ),
                ));
                push_aliases(&mut entries, &inner.aliases);
                self.push_props(&mut entries);
                SchemaNode::Mapping(entries)
            }
            SchemaVariant::Fixed(fixed) => {
                let full = fixed.name.full_name();
                if !seen.insert(full.clone()) {
                    return SchemaNode::text(full);
                }
                let mut entries = vec![
                    ("type".to_string(), SchemaNode::text("fixed")),
                    ("name".to_string(), SchemaNode::text(fixed.name.simple())),
                ];
                if let Some(namespace) = fixed.name.namespace() {
                    entries.push(("namespace".to_string(), SchemaNode::text(namespace)));
                }
                entries.push((
                    "size".to_string(),
                    SchemaNode::Scalar(ScalarNode::Int(fixed.size as i64)),
                ));
                push_aliases(&mut entries, &fixed.aliases);
                self.push_props(&mut entries);
                SchemaNode::Mapping(entries)
            }
            SchemaVariant::Array { items } => {
                let mut entries = vec![
                    ("type".to_string(), SchemaNode::text("array")),
                    ("items".to_string(), items.render(seen)),
                ];
                self.push_props(&mut entries);
                SchemaNode::Mapping(entries)
            }
            SchemaVariant::Map { values } => {
                let mut entries = vec![
                    ("type".to_string(), SchemaNode::text("map")),
                    ("values".to_string(), values.render(seen)),
                ];
                self.push_props(&mut entries);
                SchemaNode::Mapping(entries)
            }
            SchemaVariant::Union { branches } => {
                SchemaNode::Sequence(branches.iter().map(|branch| branch.render(seen)).collect())
            }
        }
    }

    fn push_props(&self, entries: &mut Vec<(String, SchemaNode)>) {
        for (key, value) in self.inner.props.borrow().iter() {
            entries.push((key.clone(), SchemaNode::from(value)));
        }
    }
}

fn push_aliases(entries: &mut Vec<(String, SchemaNode)>, aliases: &RefCell<Vec<String>>) {
    let aliases = aliases.borrow();
    if !aliases.is_empty() {
        entries.push((
            "aliases".to_string(),
            SchemaNode::Sequence(aliases.iter().map(|alias| SchemaNode::text(alias.as_str())).collect()),
        ));
    }
}

fn props_eq(a: &[(String, Value)], b: &[(String, Value)]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.iter().any(|(other_key, other_value)| {
                key == other_key && value == other_value
            }))
}

impl PartialEq for Schema {
    /// Structural equality. Named schemas compare by full name (plus the
    /// error flag for records), which is what keeps comparison terminating
    /// on self-referential graphs; enums and fixeds, which cannot recurse,
    /// compare fully structurally. Custom properties compare as an
    /// unordered set.
    fn eq(&self, other: &Schema) -> bool {
        if Rc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        if !props_eq(&self.inner.props.borrow(), &other.inner.props.borrow()) {
            return false;
        }
        match (&self.inner.variant, &other.inner.variant) {
            (SchemaVariant::Record(a), SchemaVariant::Record(b)) => {
                a.name == b.name && a.is_error == b.is_error
            }
            (SchemaVariant::Enum(a), SchemaVariant::Enum(b)) => {
                a.name == b.name && a.symbols == b.symbols
            }
            (SchemaVariant::Fixed(a), SchemaVariant::Fixed(b)) => {
                a.name == b.name && a.size == b.size
            }
            (SchemaVariant::Array { items: a }, SchemaVariant::Array { items: b }) => a == b,
            (SchemaVariant::Map { values: a }, SchemaVariant::Map { values: b }) => a == b,
            (SchemaVariant::Union { branches: a }, SchemaVariant::Union { branches: b }) => a == b,
            _ => self.kind() == other.kind() && self.kind().is_primitive(),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.full_name() {
            Some(full) => write!(f, "Schema({} {})", self.kind(), full),
            None => write!(f, "Schema({})", self.kind()),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_value_semantics() {
        let a = Schema::primitive(SchemaKind::String).unwrap();
        let b = Schema::primitive(SchemaKind::String).unwrap();
        assert_eq!(a, b);
        assert!(!Schema::ptr_eq(&a, &b));
        assert_ne!(a, Schema::primitive(SchemaKind::Bytes).unwrap());
    }

    #[test]
    fn test_primitive_rejects_complex_kinds() {
        assert!(Schema::primitive(SchemaKind::Record).is_err());
        assert!(Schema::primitive(SchemaKind::Union).is_err());
    }

    #[test]
    fn test_name_qualification() {
        let bare = Name::new("Point", Some("geo")).unwrap();
        assert_eq!(bare.full_name(), "geo.Point");

        let qualified = Name::new("models.Point", Some("geo")).unwrap();
        assert_eq!(qualified.namespace(), Some("models"));
        assert_eq!(qualified.full_name(), "models.Point");

        assert!(Name::new("", None).is_err());
        assert!(Name::new(".Point", None).is_err());
    }

    #[test]
    fn test_record_duplicate_field_rejected() {
        let record = Schema::record("Pair", None, None, false).unwrap();
        let string = Schema::primitive(SchemaKind::String).unwrap();
        let fields = vec![
            Field::new("value", string.clone()).unwrap(),
            Field::new("value", string).unwrap(),
        ];
        assert!(matches!(record.set_fields(fields), Err(Error::MalformedSchema(_))));
    }

    #[test]
    fn test_enum_validation() {
        assert!(matches!(
            Schema::enumeration("Empty", None, None, Vec::new()),
            Err(Error::MalformedSchema(_))
        ));
        assert!(matches!(
            Schema::enumeration("Dup", None, None, vec!["A".to_string(), "A".to_string()]),
            Err(Error::MalformedSchema(_))
        ));
        let suit = Schema::enumeration(
            "Suit",
            None,
            None,
            vec!["SPADES".to_string(), "HEARTS".to_string()],
        )
        .unwrap();
        assert_eq!(suit.symbols().unwrap().len(), 2);
    }

    #[test]
    fn test_union_invariants() {
        let null = Schema::primitive(SchemaKind::Null).unwrap();
        let string = Schema::primitive(SchemaKind::String).unwrap();
        let other_string = Schema::primitive(SchemaKind::String).unwrap();

        assert!(Schema::union(vec![null.clone(), string.clone()]).is_ok());
        assert!(matches!(
            Schema::union(vec![string.clone(), other_string]),
            Err(Error::InvalidUnion(_))
        ));

        let inner = Schema::union(vec![null, string]).unwrap();
        let long = Schema::primitive(SchemaKind::Long).unwrap();
        assert!(matches!(
            Schema::union(vec![long, inner]),
            Err(Error::InvalidUnion(_))
        ));
    }

    #[test]
    fn test_alias_add_is_idempotent() {
        let fixed = Schema::fixed("md5", None, 16).unwrap();
        fixed.add_alias("digest").unwrap();
        fixed.add_alias("digest").unwrap();
        assert_eq!(fixed.aliases(), vec!["digest".to_string()]);

        let int = Schema::primitive(SchemaKind::Int).unwrap();
        assert!(int.add_alias("nope").is_err());
    }

    #[test]
    fn test_props_replace_and_equality() {
        let a = Schema::primitive(SchemaKind::Int).unwrap();
        a.set_prop("native-type", "int8");
        a.set_prop("native-type", "int16");
        assert_eq!(a.prop("native-type"), Some(Value::String("int16".to_string())));

        let plain = Schema::primitive(SchemaKind::Int).unwrap();
        assert_ne!(a, plain);

        let b = Schema::primitive(SchemaKind::Int).unwrap();
        b.set_prop("native-type", "int16");
        assert_eq!(a, b);
    }

    #[test]
    fn test_named_equality_by_full_name() {
        let string = Schema::primitive(SchemaKind::String).unwrap();
        let a = Schema::record_with_fields(
            "Point",
            None,
            Some("geo"),
            false,
            vec![Field::new("label", string.clone()).unwrap()],
        )
        .unwrap();
        let b = Schema::record("Point", None, Some("geo"), false).unwrap();
        let c = Schema::record("Point", None, Some("map"), false).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fixed_renders_canonical_form() {
        let fixed = Schema::fixed("md5", None, 16).unwrap();
        assert_eq!(
            fixed.to_json(),
            serde_json::json!({"type": "fixed", "name": "md5", "size": 16})
        );
    }

    #[test]
    fn test_self_referential_render_terminates() {
        let list = Schema::record("Node", None, None, false).unwrap();
        list.set_fields(vec![Field::new("next", list.clone()).unwrap()]).unwrap();
        let json = list.to_json();
        assert_eq!(json["fields"][0]["type"], serde_json::json!("Node"));
    }
}
