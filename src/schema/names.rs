// Named-type registry for the Fulmen schema engine
//
// A registry is scoped to one top-level resolution call. Registering a named
// schema before its members resolve is what closes recursive type graphs:
// a member that references the enclosing name looks up the in-progress
// instance instead of descending forever.

use std::collections::HashMap;

use log::trace;

use crate::internal::error::{Error, Result};
use crate::schema::types::{Name, Schema};

/// Session-scoped mapping from full name to schema.
///
/// Not internally synchronized: registration is a check-then-insert sequence,
/// so a registry must not be shared across concurrent resolution calls.
#[derive(Debug, Default)]
pub struct Names {
    /// Enclosing-namespace context, used to qualify otherwise-unqualified
    /// names. Seeded by the default namespace and updated by the parser as
    /// it descends into named schemas.
    space: Option<String>,
    names: HashMap<String, Schema>,
}

impl Names {
    /// Creates an empty registry with no default namespace.
    pub fn new() -> Names {
        Names {
            space: None,
            names: HashMap::new(),
        }
    }

    /// Creates an empty registry whose default namespace qualifies
    /// unqualified names encountered during resolution.
    pub fn with_default_namespace(namespace: impl Into<String>) -> Names {
        Names {
            space: Some(namespace.into()),
            names: HashMap::new(),
        }
    }

    /// The current enclosing namespace.
    pub fn space(&self) -> Option<&str> {
        self.space.as_deref()
    }

    /// Replaces the enclosing namespace context.
    pub fn set_space(&mut self, namespace: Option<String>) {
        self.space = namespace;
    }

    /// Looks up a schema by full name, returning a handle to the registered
    /// instance.
    pub fn lookup(&self, full_name: &str) -> Option<Schema> {
        self.names.get(full_name).cloned()
    }

    /// Returns true if a schema is registered under the full name.
    pub fn contains(&self, full_name: &str) -> bool {
        self.names.contains_key(full_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Binds a full name to a schema instance. Re-binding a name to the
    /// same instance is a no-op; binding it to a different instance fails.
    pub fn register(&mut self, full_name: &str, schema: &Schema) -> Result<()> {
        if let Some(existing) = self.names.get(full_name) {
            if Schema::ptr_eq(existing, schema) {
                return Ok(());
            }
            return Err(Error::NameCollision(format!(
                "'{}' is already bound to a different schema", full_name
            )));
        }
        trace!("registry: bound '{}' to a {} schema", full_name, schema.kind());
        self.names.insert(full_name.to_string(), schema.clone());
        Ok(())
    }

    /// Registers a named schema under its full name and under each of its
    /// aliases. Unqualified aliases are qualified against the schema's own
    /// namespace, falling back to the enclosing namespace.
    pub fn register_schema(&mut self, schema: &Schema) -> Result<()> {
        let full_name = schema.full_name().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "'{}' schemas carry no name to register", schema.kind()
            ))
        })?;
        self.register(&full_name, schema)?;

        let mut alias_names = Vec::new();
        for alias in schema.aliases() {
            let enclosing = schema
                .namespace()
                .map(str::to_string)
                .or_else(|| self.space.clone());
            alias_names.push(Name::new(&alias, enclosing.as_deref())?.full_name());
        }
        for alias in alias_names {
            self.register(&alias, schema)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::SchemaKind;

    #[test]
    fn test_register_and_lookup() {
        let mut names = Names::new();
        let fixed = Schema::fixed("md5", Some("hash"), 16).unwrap();
        names.register("hash.md5", &fixed).unwrap();

        let found = names.lookup("hash.md5").unwrap();
        assert!(Schema::ptr_eq(&found, &fixed));
        assert!(names.lookup("hash.sha1").is_none());
    }

    #[test]
    fn test_reregistering_same_instance_is_noop() {
        let mut names = Names::new();
        let fixed = Schema::fixed("md5", None, 16).unwrap();
        names.register("md5", &fixed).unwrap();
        names.register("md5", &fixed).unwrap();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_collision_on_distinct_instances() {
        let mut names = Names::new();
        let first = Schema::fixed("md5", None, 16).unwrap();
        let second = Schema::fixed("md5", None, 16).unwrap();
        names.register("md5", &first).unwrap();
        assert!(matches!(
            names.register("md5", &second),
            Err(Error::NameCollision(_))
        ));
    }

    #[test]
    fn test_register_schema_covers_aliases() {
        let mut names = Names::with_default_namespace("org.fulmen");
        let record = Schema::record("Event", None, Some("org.fulmen"), false).unwrap();
        record.add_alias("LegacyEvent").unwrap();
        record.set_fields(Vec::new()).unwrap();
        names.register_schema(&record).unwrap();

        let by_name = names.lookup("org.fulmen.Event").unwrap();
        let by_alias = names.lookup("org.fulmen.LegacyEvent").unwrap();
        assert!(Schema::ptr_eq(&by_name, &by_alias));
    }

    #[test]
    fn test_unnamed_schema_rejected() {
        let mut names = Names::new();
        let int = Schema::primitive(SchemaKind::Int).unwrap();
        assert!(matches!(
            names.register_schema(&int),
            Err(Error::InvalidArgument(_))
        ));
    }
}
