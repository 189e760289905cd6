//! Attribute schemas for data sources, and the projection of api server json onto state.
//!
//! A `Schema` is a tree of `Attribute`s. Each attribute has a state name (snake_case, as
//! Terraform users write it) and, for attributes that come from the api server, the name of the
//! json property it is read from. `AttributeType::project` walks that tree to turn a json
//! document into a state value: declared attributes are renamed, absent ones become `null`, and
//! anything the schema does not declare is dropped.
#[macro_use]
mod macros;

use serde_json::{Map, Value};

use std::collections::BTreeMap;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    Required,
    Computed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    Float64,
    /// arbitrary json that is passed through unchanged
    Dynamic,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(Vec<Attribute>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: &'static str,
    pub json_name: Option<&'static str>,
    pub description: String,
    pub mode: AttributeMode,
    pub attribute_type: AttributeType,
}

impl Attribute {
    pub fn new(name: &'static str, mode: AttributeMode, attribute_type: AttributeType) -> Attribute {
        Attribute {
            name: name.trim_start_matches("r#"),
            json_name: None,
            description: String::new(),
            mode,
            attribute_type,
        }
    }

    pub fn required(name: &'static str, attribute_type: AttributeType) -> Attribute {
        Attribute::new(name, AttributeMode::Required, attribute_type)
    }

    pub fn computed(name: &'static str, attribute_type: AttributeType) -> Attribute {
        Attribute::new(name, AttributeMode::Computed, attribute_type)
    }

    pub fn with_json_name(mut self, json_name: &'static str) -> Self {
        self.json_name = Some(json_name);
        self
    }

    /// Sets the description. Doc comment text is joined line by line, so surrounding
    /// whitespace is trimmed.
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        self.description = description.as_ref().trim().to_owned();
        self
    }

    /// The key of this attribute in the json document that state is projected from
    pub fn json_key(&self) -> &'static str {
        self.json_name.unwrap_or(self.name)
    }

    pub fn is_required(&self) -> bool {
        self.mode == AttributeMode::Required
    }

    fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if !self.description.is_empty() {
            obj.insert("description".to_owned(), Value::from(self.description.as_str()));
        }
        match self.mode {
            AttributeMode::Required => obj.insert("required".to_owned(), Value::Bool(true)),
            AttributeMode::Computed => obj.insert("computed".to_owned(), Value::Bool(true)),
        };
        match self.attribute_type.nested_type() {
            Some((nesting_mode, attributes)) => {
                let nested = serde_json::json!({
                    "attributes": attributes_to_json(attributes),
                    "nesting_mode": nesting_mode,
                });
                obj.insert("nested_type".to_owned(), nested);
            }
            None => {
                obj.insert("type".to_owned(), self.attribute_type.type_json());
            }
        }
        Value::Object(obj)
    }
}

fn attributes_to_json(attributes: &[Attribute]) -> Value {
    let map = attributes
        .iter()
        .map(|attr| (attr.name.to_owned(), attr.to_json()))
        .collect::<Map<String, Value>>();
    Value::Object(map)
}

impl AttributeType {
    pub fn list_of(element: AttributeType) -> AttributeType {
        AttributeType::List(Box::new(element))
    }

    pub fn map_of(element: AttributeType) -> AttributeType {
        AttributeType::Map(Box::new(element))
    }

    /// Returns the nested attributes for object-like types, along with the nesting mode
    fn nested_type(&self) -> Option<(&'static str, &[Attribute])> {
        match self {
            AttributeType::Object(attrs) => Some(("single", attrs.as_slice())),
            AttributeType::List(elem) => match elem.as_ref() {
                AttributeType::Object(attrs) => Some(("list", attrs.as_slice())),
                _ => None,
            },
            AttributeType::Map(elem) => match elem.as_ref() {
                AttributeType::Object(attrs) => Some(("map", attrs.as_slice())),
                _ => None,
            },
            _ => None,
        }
    }

    /// The type in the json type notation used by `terraform providers schema -json`
    fn type_json(&self) -> Value {
        match self {
            AttributeType::String => Value::from("string"),
            AttributeType::Bool => Value::from("bool"),
            AttributeType::Int64 | AttributeType::Float64 => Value::from("number"),
            AttributeType::Dynamic => Value::from("dynamic"),
            AttributeType::List(elem) => serde_json::json!(["list", elem.type_json()]),
            AttributeType::Map(elem) => serde_json::json!(["map", elem.type_json()]),
            AttributeType::Object(attrs) => {
                let fields = attrs
                    .iter()
                    .map(|a| (a.name.to_owned(), a.attribute_type.type_json()))
                    .collect::<Map<String, Value>>();
                serde_json::json!(["object", fields])
            }
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int64 => "int64",
            AttributeType::Float64 => "number",
            AttributeType::Dynamic => "dynamic",
            AttributeType::List(_) => "list",
            AttributeType::Map(_) => "map",
            AttributeType::Object(_) => "object",
        }
    }

    /// Converts a json value into a state value of this type. A missing value or json `null`
    /// always projects to `null`.
    pub fn project(&self, value: Option<&Value>) -> Result<Value, StateError> {
        let mut path = Vec::new();
        self.project_at(value, &mut path)
    }

    fn project_at(&self, value: Option<&Value>, path: &mut Vec<PathStep>) -> Result<Value, StateError> {
        let value = match value {
            None | Some(Value::Null) => return Ok(Value::Null),
            Some(v) => v,
        };

        match (self, value) {
            (AttributeType::Dynamic, _) => Ok(value.clone()),
            (AttributeType::String, Value::String(_)) => Ok(value.clone()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(value.clone()),
            (AttributeType::Int64, Value::Number(n)) if n.is_i64() => Ok(value.clone()),
            (AttributeType::Float64, Value::Number(_)) => Ok(value.clone()),
            (AttributeType::List(elem), Value::Array(items)) => {
                let mut projected = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    path.push(PathStep::Index(i));
                    projected.push(elem.project_at(Some(item), path)?);
                    path.pop();
                }
                Ok(Value::Array(projected))
            }
            (AttributeType::Map(elem), Value::Object(entries)) => {
                let mut projected = Map::new();
                for (key, item) in entries.iter() {
                    path.push(PathStep::Key(key.clone()));
                    projected.insert(key.clone(), elem.project_at(Some(item), path)?);
                    path.pop();
                }
                Ok(Value::Object(projected))
            }
            (AttributeType::Object(attrs), Value::Object(fields)) => {
                let mut projected = Map::new();
                for attr in attrs.iter() {
                    path.push(PathStep::Attribute(attr.name));
                    let field = fields.get(attr.json_key());
                    projected.insert(attr.name.to_owned(), attr.attribute_type.project_at(field, path)?);
                    path.pop();
                }
                Ok(Value::Object(projected))
            }
            (expected, found) => Err(StateError {
                path: format_path(path),
                expected: expected.type_name(),
                found: json_type_name(found),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PathStep {
    Attribute(&'static str),
    Index(usize),
    Key(String),
}

fn format_path(path: &[PathStep]) -> String {
    let mut formatted = String::new();
    for step in path {
        match step {
            PathStep::Attribute(name) => {
                if !formatted.is_empty() {
                    formatted.push('.');
                }
                formatted.push_str(name);
            }
            PathStep::Index(i) => formatted.push_str(&format!("[{}]", i)),
            PathStep::Key(key) => formatted.push_str(&format!("[{:?}]", key)),
        }
    }
    formatted
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returned when a json value does not have the type that the schema declares for it
#[derive(Debug, Clone, PartialEq)]
pub struct StateError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "attribute '{}' expected a value of type {}, but found {}",
            self.path, self.expected, self.found
        )
    }
}
impl std::error::Error for StateError {}

/// The schema of a data source
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Schema {
        Schema {
            description: description.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Finds a nested attribute by its state names, descending through objects and the elements
    /// of lists and maps. For example `["spec", "remote_write", "url"]`.
    pub fn attribute_at(&self, path: &[&str]) -> Option<&Attribute> {
        let (first, rest) = path.split_first()?;
        let mut current = self.attribute(first)?;
        for name in rest {
            let attrs = current.attribute_type.nested_type()?.1;
            current = attrs.iter().find(|a| a.name == *name)?;
        }
        Some(current)
    }

    /// Projects a json document onto the top level attributes of this schema
    pub fn project(&self, document: &Value) -> Result<Value, StateError> {
        let mut path = Vec::new();
        let mut state = Map::new();
        let fields = document.as_object();
        for attr in self.attributes.iter() {
            path.push(PathStep::Attribute(attr.name));
            let field = fields.and_then(|f| f.get(attr.json_key()));
            state.insert(attr.name.to_owned(), attr.attribute_type.project_at(field, &mut path)?);
            path.pop();
        }
        Ok(Value::Object(state))
    }

    /// Renders the schema the way `terraform providers schema -json` describes a data source
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "version": 0,
            "block": {
                "attributes": attributes_to_json(&self.attributes),
                "description": self.description,
                "description_kind": "plain",
            }
        })
    }
}

/// Types that know which attribute type represents them in state
pub trait ToAttribute {
    fn attribute_type() -> AttributeType;
}

impl ToAttribute for String {
    fn attribute_type() -> AttributeType {
        AttributeType::String
    }
}

impl ToAttribute for bool {
    fn attribute_type() -> AttributeType {
        AttributeType::Bool
    }
}

impl ToAttribute for i64 {
    fn attribute_type() -> AttributeType {
        AttributeType::Int64
    }
}

impl ToAttribute for f64 {
    fn attribute_type() -> AttributeType {
        AttributeType::Float64
    }
}

impl<T: ToAttribute> ToAttribute for Vec<T> {
    fn attribute_type() -> AttributeType {
        AttributeType::list_of(T::attribute_type())
    }
}

impl<T: ToAttribute> ToAttribute for BTreeMap<String, T> {
    fn attribute_type() -> AttributeType {
        AttributeType::map_of(T::attribute_type())
    }
}

dynamic_attributes!(Value);

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    schema_object! {
        /// a small object for exercising the macro
        pub struct Endpoint {
            /// The url to send requests to.
            url: String => "url",
            /// Extra headers,
            /// one per line.
            headers: BTreeMap<String, String> => "headers",
            follow_redirects: bool => "followRedirects",
            max_shards: i64 => "maxShards",
            r#type: String => "type",
            extra: Value => "extra",
        }
    }

    schema_object! {
        pub struct Outer {
            endpoints: Vec<Endpoint> => "remoteWrite",
            ratio: f64 => "ratio",
        }
    }

    fn outer_schema() -> Schema {
        Schema::new("test").with_attribute(Attribute::computed("spec", Outer::attribute_type()))
    }

    #[test]
    fn macro_generates_attribute_names_json_names_and_descriptions() {
        let schema = outer_schema();
        let url = schema
            .attribute_at(&["spec", "endpoints", "url"])
            .expect("url attribute missing");
        assert_eq!("url", url.json_key());
        assert_eq!("The url to send requests to.", url.description);
        assert_eq!(AttributeType::String, url.attribute_type);

        let headers = schema
            .attribute_at(&["spec", "endpoints", "headers"])
            .expect("headers attribute missing");
        assert_eq!("Extra headers, one per line.", headers.description);
        assert_eq!(AttributeType::map_of(AttributeType::String), headers.attribute_type);

        let type_attr = schema
            .attribute_at(&["spec", "endpoints", "type"])
            .expect("raw identifier attribute missing");
        assert_eq!("type", type_attr.json_key());

        let redirects = schema
            .attribute_at(&["spec", "endpoints", "follow_redirects"])
            .expect("follow_redirects attribute missing");
        assert_eq!("followRedirects", redirects.json_key());
        assert_eq!(AttributeMode::Computed, redirects.mode);
    }

    #[test]
    fn projection_renames_fields_and_fills_nulls() {
        let document = json!({
            "spec": {
                "remoteWrite": [
                    {
                        "url": "http://thanos:19291/api/v1/receive",
                        "headers": {"X-Scope-OrgID": "tenant-a"},
                        "followRedirects": true,
                        "extra": {"anything": ["goes", 1]},
                        "undeclared": "dropped"
                    }
                ],
                "ratio": 0.5
            }
        });
        let state = outer_schema().project(&document).expect("projection failed");
        let expected = json!({
            "spec": {
                "endpoints": [
                    {
                        "url": "http://thanos:19291/api/v1/receive",
                        "headers": {"X-Scope-OrgID": "tenant-a"},
                        "follow_redirects": true,
                        "max_shards": null,
                        "type": null,
                        "extra": {"anything": ["goes", 1]}
                    }
                ],
                "ratio": 0.5
            }
        });
        assert_eq!(expected, state);
    }

    #[test]
    fn projection_of_missing_object_is_null() {
        let state = outer_schema().project(&json!({})).expect("projection failed");
        assert_eq!(json!({"spec": null}), state);
    }

    #[test]
    fn type_mismatch_reports_the_attribute_path() {
        let document = json!({
            "spec": {
                "remoteWrite": [{"url": "a"}, {"maxShards": "ten"}]
            }
        });
        let err = outer_schema().project(&document).expect_err("projection should fail");
        assert_eq!("spec.endpoints[1].max_shards", err.path);
        assert_eq!("int64", err.expected);
        assert_eq!("string", err.found);
    }

    #[test]
    fn int64_rejects_fractional_numbers() {
        let err = AttributeType::Int64
            .project(Some(&json!(1.5)))
            .expect_err("projection should fail");
        assert_eq!("number", err.found);
    }

    #[test]
    fn schema_json_uses_nested_types_for_objects() {
        let schema = Schema::new("A test data source")
            .with_attribute(Attribute::computed("id", AttributeType::String))
            .with_attribute(Attribute::computed("spec", Outer::attribute_type()));
        let rendered = schema.to_json();

        assert_eq!(json!("A test data source"), rendered["block"]["description"]);
        assert_eq!(json!("string"), rendered["block"]["attributes"]["id"]["type"]);
        assert_eq!(json!(true), rendered["block"]["attributes"]["id"]["computed"]);

        let spec = &rendered["block"]["attributes"]["spec"];
        assert_eq!(json!("single"), spec["nested_type"]["nesting_mode"]);
        let endpoints = &spec["nested_type"]["attributes"]["endpoints"];
        assert_eq!(json!("list"), endpoints["nested_type"]["nesting_mode"]);
        assert_eq!(
            json!(["map", "string"]),
            endpoints["nested_type"]["attributes"]["headers"]["type"]
        );
    }
}
