// Fulmen library entry point
// Schema resolution core for the Fulmen schema-driven binary data format

pub mod internal;
pub mod schema;
