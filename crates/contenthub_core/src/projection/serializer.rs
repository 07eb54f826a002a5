//! Dotted-path resolution, value formatting and nested output placement.

use super::selector::{FieldSpec, Selector};
use super::ProjectionError;
use crate::model::record::{FieldRef, FieldValue, Record, Reference};
use serde_json::{Map, Number, Value};

/// Key under which an unresolved reference exposes its target identifier.
pub const OID_KEY: &str = "$oid";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Projects `record` into a nested mapping following `spec`.
///
/// Selectors whose path does not resolve produce no key. A declared field
/// holding null produces `null`.
pub fn project(record: &dyn Record, spec: &FieldSpec) -> Map<String, Value> {
    let mut output = Map::new();
    for selector in spec.effective_selectors(record) {
        if selector.is_reserved() {
            continue;
        }
        if let Some(value) = resolve(record, &selector) {
            place(&mut output, selector.destination(), value);
        }
    }
    output
}

/// Full default projection of every declared field.
pub fn project_all(record: &dyn Record) -> Map<String, Value> {
    project(record, &FieldSpec::all())
}

/// Parses `selectors` and projects `record` in one call.
///
/// # Errors
/// - Returns `ProjectionError::InvalidSelector` for the first malformed
///   selector; nothing is projected in that case.
pub fn to_dict<S: AsRef<str>>(
    record: &dyn Record,
    selectors: &[S],
) -> Result<Map<String, Value>, ProjectionError> {
    let spec = FieldSpec::parse(selectors)?;
    Ok(project(record, &spec))
}

/// Converts one stored value into its wire form.
pub fn format_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(flag) => Value::Bool(*flag),
        FieldValue::Int(number) => Value::from(*number),
        FieldValue::Float(number) => Number::from_f64(*number).map_or(Value::Null, Value::Number),
        FieldValue::Text(text) => Value::String(text.clone()),
        FieldValue::DateTime(datetime) => {
            Value::String(datetime.format(DATETIME_FORMAT).to_string())
        }
        FieldValue::Date(date) => Value::String(date.format(DATE_FORMAT).to_string()),
        FieldValue::Id(id) => Value::String(id.to_hex()),
        FieldValue::List(items) => Value::Array(items.iter().map(format_value).collect()),
        FieldValue::Dict(map) => Value::Object(map.clone()),
        FieldValue::Embedded(document) => Value::Object(project_all(document)),
        FieldValue::Reference(Reference::Resolved(document)) => {
            Value::Object(project_all(document.as_ref()))
        }
        FieldValue::Reference(Reference::Link { id, .. }) => {
            let mut link = Map::new();
            link.insert(OID_KEY.to_string(), Value::String(id.to_hex()));
            Value::Object(link)
        }
    }
}

fn resolve(record: &dyn Record, selector: &Selector) -> Option<Value> {
    let (first, rest) = selector.path().split_first()?;
    let mut current = lookup(record, first)?;
    for segment in rest {
        current = lookup(current.as_record()?, segment)?;
    }
    Some(match current {
        FieldRef::Value(value) => format_value(value),
        FieldRef::Json(value) => value.clone(),
    })
}

fn lookup<'a>(record: &'a dyn Record, name: &str) -> Option<FieldRef<'a>> {
    if !record.has_field(name) {
        return None;
    }
    record.field(name)
}

/// Walks/creates nested mappings for all but the last segment of
/// `destination`, then assigns `value` at the last one.
///
/// A non-mapping value sitting on an intermediate key is replaced.
fn place(output: &mut Map<String, Value>, destination: &[String], value: Value) {
    let Some((leaf, parents)) = destination.split_last() else {
        return;
    };
    let mut target = output;
    for key in parents {
        let slot = target
            .entry(key.as_str())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(nested) = slot else {
            return;
        };
        target = nested;
    }
    target.insert(leaf.clone(), value);
}

#[cfg(test)]
mod tests {
    use super::place;
    use serde_json::{json, Map, Value};

    fn keys(path: &str) -> Vec<String> {
        path.split('.').map(str::to_string).collect()
    }

    #[test]
    fn place_extends_existing_nested_mapping() {
        let mut output = Map::new();
        place(&mut output, &keys("blog.id"), json!("1"));
        place(&mut output, &keys("blog.title"), json!("t"));
        assert_eq!(Value::Object(output), json!({"blog": {"id": "1", "title": "t"}}));
    }

    #[test]
    fn place_replaces_scalar_on_intermediate_key() {
        let mut output = Map::new();
        place(&mut output, &keys("x"), json!(1));
        place(&mut output, &keys("x.y"), json!(2));
        assert_eq!(Value::Object(output), json!({"x": {"y": 2}}));
    }

    #[test]
    fn place_overwrites_leaf() {
        let mut output = Map::new();
        place(&mut output, &keys("x"), json!(1));
        place(&mut output, &keys("x"), json!(2));
        assert_eq!(Value::Object(output), json!({"x": 2}));
    }
}
