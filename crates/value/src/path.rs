//! Path steps for addressing into a [`Doc`].
//!
//! A step is either an array index or an object key. Wire paths arrive as
//! JSON arrays of numbers, so indexes also address objects by their decimal
//! key, and keys that spell a non-negative integer also address arrays.

use serde_json::Value;

use crate::doc::Doc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Index(usize),
    Key(String),
}

impl PathStep {
    /// Reads a step from a wire value: non-negative integers become
    /// [`PathStep::Index`], strings become [`PathStep::Key`].
    pub fn from_value(value: &Value) -> Option<PathStep> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|i| usize::try_from(i).ok()).map(PathStep::Index),
            Value::String(s) => Some(PathStep::Key(s.clone())),
            _ => None,
        }
    }

    /// Parses a whole wire path; `None` if any step is unusable.
    pub fn parse_path(values: &[Value]) -> Option<Vec<PathStep>> {
        values.iter().map(PathStep::from_value).collect()
    }

    /// This step as an array index, if it is one or spells one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(i) => Some(*i),
            PathStep::Key(k) => k.parse().ok(),
        }
    }

    /// This step as an object key.
    pub fn to_key(&self) -> String {
        match self {
            PathStep::Index(i) => i.to_string(),
            PathStep::Key(k) => k.clone(),
        }
    }
}

impl Doc {
    /// The child addressed by a single step.
    pub fn get_step(&self, step: &PathStep) -> Option<&Doc> {
        match self {
            Doc::Array(items) => step.as_index().and_then(|i| items.get(i)),
            Doc::Object(map) => map.get(&step.to_key()),
            _ => None,
        }
    }

    /// The value at `path`, `None` if any step is missing.
    pub fn get_path(&self, path: &[PathStep]) -> Option<&Doc> {
        path.iter().try_fold(self, |node, step| node.get_step(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numeric_and_string_steps() {
        let path = PathStep::parse_path(&[json!(0), json!("a"), json!(3)]).unwrap();
        assert_eq!(path, vec![PathStep::Index(0), PathStep::Key("a".into()), PathStep::Index(3)]);
    }

    #[test]
    fn rejects_negative_fractional_and_structured_steps() {
        assert_eq!(PathStep::from_value(&json!(-1)), None);
        assert_eq!(PathStep::from_value(&json!(1.5)), None);
        assert_eq!(PathStep::from_value(&json!([0])), None);
        assert!(PathStep::parse_path(&[json!(0), json!(null)]).is_none());
    }

    #[test]
    fn index_steps_address_objects_by_decimal_key() {
        let doc = Doc::from(json!({"0": "zero", "x": [10, 20]}));
        assert_eq!(doc.get_step(&PathStep::Index(0)), Some(&Doc::from("zero")));
        let path = [PathStep::Key("x".into()), PathStep::Key("1".into())];
        assert_eq!(doc.get_path(&path), Some(&Doc::from(20)));
    }

    #[test]
    fn missing_steps_yield_none() {
        let doc = Doc::from(json!([[0, ["a"]]]));
        assert_eq!(doc.get_path(&[PathStep::Index(0), PathStep::Index(5)]), None);
        assert_eq!(doc.get_path(&[PathStep::Index(0), PathStep::Index(1), PathStep::Index(0), PathStep::Index(0)]), None);
        assert_eq!(doc.get_path(&[]), Some(&doc));
    }
}
