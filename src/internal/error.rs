use thiserror::Error;

/// Unified error type for the Fulmen schema engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was absent or unusable (e.g. a missing name
    /// registry or native type descriptor).
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    /// A textual schema description is structurally invalid: a required key
    /// is missing, a symbol or field list is empty, or a node has the wrong
    /// shape for its declared kind.
    #[error("Malformed Schema: {0}")]
    MalformedSchema(String),

    /// A string reference does not name a primitive type or a previously
    /// registered full name.
    #[error("Unknown Type: {0}")]
    UnknownType(String),

    /// A native type descriptor has no schema mapping.
    #[error("Unsupported Type: {0}")]
    UnsupportedType(String),

    /// A union declares two members with the same type tag, or directly
    /// nests another union.
    #[error("Invalid Union: {0}")]
    InvalidUnion(String),

    /// Two distinct schemas claim the same full name within one resolution
    /// session.
    #[error("Name Collision: {0}")]
    NameCollision(String),
}

/// A specialized `Result` type for Fulmen schema operations.
pub type Result<T> = std::result::Result<T, Error>;
