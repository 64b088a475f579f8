// Reflective schema derivation for the Fulmen data format
//
// This module derives schemas from native type descriptors instead of
// textual trees. Dispatch runs over a closed descriptor variant rather than
// a host reflection API, so the mapping table stays total and checkable.

use std::collections::HashMap;

use log::{debug, trace};

use crate::internal::error::{Error, Result};
use crate::schema::types::{Field, Schema, SchemaKind};

/// Custom property recording the qualified name of a narrowed native type
/// that has no direct schema equivalent (e.g. an 8-bit integer widened to
/// `int`). The decode path uses it to reconstruct the original identity.
pub const NATIVE_TYPE_PROP: &str = "native-type";

/// Custom property recording the exact signature of a native array whose
/// component type was narrowed, distinct from the per-element property.
pub const NATIVE_ARRAY_PROP: &str = "native-array-type";

/// Mutable mapping from simple name to schema, shared across one derivation
/// call so recursive native types resolve to a single instance.
pub type NameCache = HashMap<String, Schema>;

/// A native type descriptor: the closed category tags the deriver maps from.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeType {
    /// Absence-of-value type.
    Void,
    Bool,
    /// 8-bit integer; no direct schema equivalent.
    Int8,
    /// 16-bit integer; no direct schema equivalent.
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Single-character code unit; no direct schema equivalent.
    Char,
    /// Textual type.
    Str,
    /// Byte-sequence type.
    ByteSeq,
    /// Native array with a fixed component type.
    Array(Box<NativeType>),
    /// Native growable collection.
    List(Box<NativeType>),
    /// Native string-keyed map.
    Map(Box<NativeType>),
    /// Record-like type with declared fields. The name may be qualified.
    Record {
        name: String,
        fields: Vec<(String, NativeType)>,
    },
    /// Enum-like type with declared symbols.
    Enum {
        name: String,
        symbols: Vec<String>,
    },
    /// Throwable/exception-like type.
    Exception { name: String },
    /// A type with no schema mapping.
    Opaque { name: String },
}

impl NativeType {
    /// The fully qualified name of the type. Array, list, and map types
    /// render their element signature.
    pub fn qualified_name(&self) -> String {
        match self {
            NativeType::Void => "void".to_string(),
            NativeType::Bool => "bool".to_string(),
            NativeType::Int8 => "int8".to_string(),
            NativeType::Int16 => "int16".to_string(),
            NativeType::Int32 => "int32".to_string(),
            NativeType::Int64 => "int64".to_string(),
            NativeType::Float32 => "float32".to_string(),
            NativeType::Float64 => "float64".to_string(),
            NativeType::Char => "char".to_string(),
            NativeType::Str => "string".to_string(),
            NativeType::ByteSeq => "bytes".to_string(),
            NativeType::Array(component) => format!("{}[]", component.qualified_name()),
            NativeType::List(element) => format!("list<{}>", element.qualified_name()),
            NativeType::Map(value) => format!("map<string,{}>", value.qualified_name()),
            NativeType::Record { name, .. }
            | NativeType::Enum { name, .. }
            | NativeType::Exception { name }
            | NativeType::Opaque { name } => name.clone(),
        }
    }

    /// The simple (unqualified) name: the last dot-separated segment.
    pub fn simple_name(&self) -> String {
        let qualified = self.qualified_name();
        match qualified.rfind('.') {
            Some(split) => qualified[split + 1..].to_string(),
            None => qualified,
        }
    }

    /// True for the narrow primitives that widen to `int` and carry a
    /// provenance property.
    pub fn is_narrow(&self) -> bool {
        matches!(self, NativeType::Int8 | NativeType::Int16 | NativeType::Char)
    }
}

/// Derives schemas from native type descriptors.
#[derive(Debug, Default)]
pub struct SchemaDeriver;

impl SchemaDeriver {
    /// Creates a new deriver.
    pub fn new() -> SchemaDeriver {
        SchemaDeriver
    }

    /// Derives a schema for a native type. The cache is shared across the
    /// whole derivation call: a name already derived resolves to the cached
    /// instance, and record-like names are inserted before their members
    /// derive so self-referential types terminate.
    ///
    /// An absent type descriptor or cache fails with `InvalidArgument`.
    pub fn create_schema(
        &self,
        ty: Option<&NativeType>,
        cache: Option<&mut NameCache>,
    ) -> Result<Schema> {
        let ty = ty.ok_or_else(|| {
            Error::InvalidArgument("cannot derive a schema from an absent native type".to_string())
        })?;
        let cache = cache.ok_or_else(|| {
            Error::InvalidArgument("schema derivation requires a name cache".to_string())
        })?;
        self.derive(ty, cache)
    }

    fn derive(&self, ty: &NativeType, cache: &mut NameCache) -> Result<Schema> {
        match ty {
            NativeType::Void => Schema::primitive(SchemaKind::Null),
            NativeType::Bool => Schema::primitive(SchemaKind::Boolean),
            NativeType::Int32 => Schema::primitive(SchemaKind::Int),
            NativeType::Int64 => Schema::primitive(SchemaKind::Long),
            NativeType::Float32 => Schema::primitive(SchemaKind::Float),
            NativeType::Float64 => Schema::primitive(SchemaKind::Double),
            NativeType::Str => Schema::primitive(SchemaKind::String),
            NativeType::ByteSeq => Schema::primitive(SchemaKind::Bytes),
            NativeType::Int8 | NativeType::Int16 | NativeType::Char => {
                // Widened to int; the property keeps the original identity
                // recoverable on the decode path. Cached under the native
                // name so repeated requests share one instance.
                let simple = ty.simple_name();
                if let Some(cached) = cache.get(&simple) {
                    trace!("derive: cache hit for '{}'", simple);
                    return Ok(cached.clone());
                }
                let schema = Schema::primitive(SchemaKind::Int)?;
                schema.set_prop(NATIVE_TYPE_PROP, ty.qualified_name());
                cache.insert(simple, schema.clone());
                Ok(schema)
            }
            NativeType::Array(component) => {
                let schema = Schema::array(self.derive(component, cache)?);
                if component.is_narrow() {
                    schema.set_prop(NATIVE_ARRAY_PROP, ty.qualified_name());
                }
                Ok(schema)
            }
            NativeType::List(element) => Ok(Schema::array(self.derive(element, cache)?)),
            NativeType::Map(value) => Ok(Schema::map(self.derive(value, cache)?)),
            NativeType::Record { name, fields } => {
                let simple = ty.simple_name();
                if let Some(cached) = cache.get(&simple) {
                    trace!("derive: cache hit for '{}'", simple);
                    return Ok(cached.clone());
                }
                let schema = Schema::record(name, None, None, false)?;
                // Inserted before the fields derive so a field of this very
                // type resolves to the in-progress record.
                cache.insert(simple.clone(), schema.clone());
                let mut derived = Vec::with_capacity(fields.len());
                for (field_name, field_type) in fields {
                    derived.push(Field::new(
                        field_name.as_str(),
                        self.derive(field_type, cache)?,
                    )?);
                }
                schema.set_fields(derived)?;
                debug!("derived record schema '{}'", simple);
                Ok(schema)
            }
            NativeType::Enum { name, symbols } => {
                let simple = ty.simple_name();
                if let Some(cached) = cache.get(&simple) {
                    trace!("derive: cache hit for '{}'", simple);
                    return Ok(cached.clone());
                }
                let schema = Schema::enumeration(name, None, None, symbols.clone())?;
                cache.insert(simple, schema.clone());
                Ok(schema)
            }
            NativeType::Exception { name } => {
                let simple = ty.simple_name();
                if let Some(cached) = cache.get(&simple) {
                    trace!("derive: cache hit for '{}'", simple);
                    return Ok(cached.clone());
                }
                let schema = Schema::record(name, None, None, true)?;
                cache.insert(simple.clone(), schema.clone());
                let message = Field::new(
                    "message",
                    Schema::union(vec![
                        Schema::primitive(SchemaKind::Null)?,
                        Schema::primitive(SchemaKind::String)?,
                    ])?,
                )?;
                schema.set_fields(vec![message])?;
                debug!("derived error record schema '{}'", simple);
                Ok(schema)
            }
            NativeType::Opaque { name } => Err(Error::UnsupportedType(format!(
                "'{}' has no schema equivalent", name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_arguments_rejected() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        assert!(matches!(
            deriver.create_schema(None, Some(&mut cache)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            deriver.create_schema(Some(&NativeType::Bool), None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_primitive_mapping_table() {
        let deriver = SchemaDeriver::new();
        let cases = [
            (NativeType::Void, SchemaKind::Null),
            (NativeType::Bool, SchemaKind::Boolean),
            (NativeType::Int32, SchemaKind::Int),
            (NativeType::Int64, SchemaKind::Long),
            (NativeType::Float32, SchemaKind::Float),
            (NativeType::Float64, SchemaKind::Double),
            (NativeType::Str, SchemaKind::String),
            (NativeType::ByteSeq, SchemaKind::Bytes),
        ];
        for (ty, kind) in cases {
            let mut cache = NameCache::new();
            let schema = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
            assert_eq!(schema.kind(), kind);
            assert!(schema.props().is_empty());
        }
    }

    #[test]
    fn test_narrow_types_carry_provenance() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        for (ty, expected) in [
            (NativeType::Int8, "int8"),
            (NativeType::Int16, "int16"),
            (NativeType::Char, "char"),
        ] {
            let schema = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
            assert_eq!(schema.kind(), SchemaKind::Int);
            assert_eq!(schema.prop(NATIVE_TYPE_PROP), Some(json!(expected)));

            let again = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
            assert!(Schema::ptr_eq(&schema, &again));
        }
    }

    #[test]
    fn test_narrow_array_signature() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        let ty = NativeType::Array(Box::new(NativeType::Int8));
        let schema = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
        assert_eq!(schema.kind(), SchemaKind::Array);
        assert_eq!(schema.prop(NATIVE_ARRAY_PROP), Some(json!("int8[]")));
        let items = schema.items().unwrap();
        assert_eq!(items.prop(NATIVE_TYPE_PROP), Some(json!("int8")));

        let plain = NativeType::Array(Box::new(NativeType::Int32));
        let schema = deriver.create_schema(Some(&plain), Some(&mut cache)).unwrap();
        assert!(schema.prop(NATIVE_ARRAY_PROP).is_none());
    }

    #[test]
    fn test_list_and_map_derivation() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();

        let list = NativeType::List(Box::new(NativeType::Str));
        let schema = deriver.create_schema(Some(&list), Some(&mut cache)).unwrap();
        assert_eq!(schema.items().unwrap().kind(), SchemaKind::String);

        let map = NativeType::Map(Box::new(NativeType::Int64));
        let schema = deriver.create_schema(Some(&map), Some(&mut cache)).unwrap();
        assert_eq!(schema.values().unwrap().kind(), SchemaKind::Long);
    }

    #[test]
    fn test_record_derivation_uses_cache() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        let ty = NativeType::Record {
            name: "models.Point".to_string(),
            fields: vec![
                ("x".to_string(), NativeType::Int32),
                ("y".to_string(), NativeType::Int32),
            ],
        };

        let first = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
        assert_eq!(first.full_name().unwrap(), "models.Point");
        assert_eq!(first.fields().unwrap().len(), 2);

        let second = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
        assert!(Schema::ptr_eq(&first, &second));
    }

    #[test]
    fn test_self_referential_record_terminates() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        let ty = NativeType::Record {
            name: "Node".to_string(),
            fields: vec![(
                "next".to_string(),
                NativeType::Record {
                    name: "Node".to_string(),
                    fields: Vec::new(),
                },
            )],
        };
        let schema = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
        let next = &schema.fields().unwrap()[0];
        assert!(Schema::ptr_eq(next.schema(), &schema));
    }

    #[test]
    fn test_exception_shape() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        let ty = NativeType::Exception {
            name: "io.fulmen.DecodeFailure".to_string(),
        };
        let schema = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
        assert!(schema.is_error());
        assert_eq!(schema.full_name().unwrap(), "io.fulmen.DecodeFailure");

        let fields = schema.fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name(), "message");
        let branches = fields[0].schema().branches().unwrap();
        assert_eq!(branches[0].kind(), SchemaKind::Null);
        assert_eq!(branches[1].kind(), SchemaKind::String);
    }

    #[test]
    fn test_enum_derivation() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        let ty = NativeType::Enum {
            name: "Suit".to_string(),
            symbols: vec!["SPADES".to_string(), "HEARTS".to_string()],
        };
        let schema = deriver.create_schema(Some(&ty), Some(&mut cache)).unwrap();
        assert_eq!(schema.kind(), SchemaKind::Enum);
        assert_eq!(schema.symbols().unwrap().len(), 2);
    }

    #[test]
    fn test_opaque_is_unsupported() {
        let deriver = SchemaDeriver::new();
        let mut cache = NameCache::new();
        let ty = NativeType::Opaque {
            name: "vendor.Blob".to_string(),
        };
        assert!(matches!(
            deriver.create_schema(Some(&ty), Some(&mut cache)),
            Err(Error::UnsupportedType(_))
        ));
    }
}
