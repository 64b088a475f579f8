// Internal shared infrastructure for the Fulmen schema engine

pub mod error;
