// Textual schema tree nodes
//
// The parser consumes a closed tree shape: a scalar leaf, an ordered
// sequence of nodes, or an ordered mapping from string key to node. This is
// the parser's only dependency on the textual form; conversions to and from
// `serde_json::Value` live at the edge.

use serde_json::Value;

/// A scalar leaf of a schema description.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarNode {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// A node of a textual schema description.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar(ScalarNode),
    Sequence(Vec<SchemaNode>),
    /// Key order is preserved as encountered in the source.
    Mapping(Vec<(String, SchemaNode)>),
}

impl SchemaNode {
    /// Convenience constructor for a text scalar.
    pub fn text(text: impl Into<String>) -> SchemaNode {
        SchemaNode::Scalar(ScalarNode::Text(text.into()))
    }

    /// Looks up a key in a mapping node. Returns `None` for other shapes.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Mapping(entries) => entries
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// The node's text when it is a text scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SchemaNode::Scalar(ScalarNode::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The node's elements when it is a sequence.
    pub fn as_sequence(&self) -> Option<&[SchemaNode]> {
        match self {
            SchemaNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The node's entries when it is a mapping.
    pub fn as_mapping(&self) -> Option<&[(String, SchemaNode)]> {
        match self {
            SchemaNode::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Converts the node back to its JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::Scalar(ScalarNode::Null) => Value::Null,
            SchemaNode::Scalar(ScalarNode::Bool(value)) => Value::Bool(*value),
            SchemaNode::Scalar(ScalarNode::Int(value)) => Value::from(*value),
            SchemaNode::Scalar(ScalarNode::Float(value)) => {
                serde_json::Number::from_f64(*value)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            SchemaNode::Scalar(ScalarNode::Text(text)) => Value::String(text.clone()),
            SchemaNode::Sequence(items) => {
                Value::Array(items.iter().map(SchemaNode::to_json).collect())
            }
            SchemaNode::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for SchemaNode {
    fn from(value: &Value) -> SchemaNode {
        match value {
            Value::Null => SchemaNode::Scalar(ScalarNode::Null),
            Value::Bool(flag) => SchemaNode::Scalar(ScalarNode::Bool(*flag)),
            Value::Number(number) => match number.as_i64() {
                Some(int) => SchemaNode::Scalar(ScalarNode::Int(int)),
                None => SchemaNode::Scalar(ScalarNode::Float(number.as_f64().unwrap_or(0.0))),
            },
            Value::String(text) => SchemaNode::Scalar(ScalarNode::Text(text.clone())),
            Value::Array(items) => {
                SchemaNode::Sequence(items.iter().map(SchemaNode::from).collect())
            }
            Value::Object(entries) => SchemaNode::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), SchemaNode::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for SchemaNode {
    fn from(value: Value) -> SchemaNode {
        SchemaNode::from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let value = json!({
            "type": "record",
            "name": "Point",
            "fields": [
                {"name": "x", "type": "int", "default": 0},
                {"name": "y", "type": "int"}
            ]
        });
        let node = SchemaNode::from(&value);
        assert_eq!(node.to_json(), value);
    }

    #[test]
    fn test_mapping_lookup() {
        let node = SchemaNode::from(json!({"type": "fixed", "size": 16}));
        assert_eq!(node.get("type").and_then(SchemaNode::as_text), Some("fixed"));
        assert_eq!(
            node.get("size"),
            Some(&SchemaNode::Scalar(ScalarNode::Int(16)))
        );
        assert!(node.get("name").is_none());
        assert!(SchemaNode::text("int").get("type").is_none());
    }

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(SchemaNode::from(json!(null)), SchemaNode::Scalar(ScalarNode::Null));
        assert_eq!(SchemaNode::from(json!(true)), SchemaNode::Scalar(ScalarNode::Bool(true)));
        assert_eq!(
            SchemaNode::from(json!(1.5)),
            SchemaNode::Scalar(ScalarNode::Float(1.5))
        );
        assert!(SchemaNode::from(json!([])).as_sequence().is_some());
    }
}
