// Schema module for the Fulmen data format
//
// This module provides schema resolution for the Fulmen data format. It
// includes:
//
// 1. The canonical schema model with named-type metadata
// 2. A session-scoped registry for recursive and shared references
// 3. A recursive-descent parser over textual schema trees
// 4. A reflective deriver over native type descriptors

// Re-export public types and functions
pub use self::names::Names;
pub use self::node::{ScalarNode, SchemaNode};
pub use self::parser::{parse, parse_json, parse_str};
pub use self::reflect::{
    NameCache, NativeType, SchemaDeriver, NATIVE_ARRAY_PROP, NATIVE_TYPE_PROP,
};
pub use self::types::{Field, Name, Schema, SchemaKind};

// Sub-modules
pub mod names;
pub mod node;
pub mod parser;
pub mod reflect;
pub mod types;
