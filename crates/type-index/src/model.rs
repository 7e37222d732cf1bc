use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a metadata source. Two handles with the same id are the same source.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
    Constructor,
    Event,
    /// Any other member kind, carried with its display label (e.g. `Field`).
    Other(String),
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => f.write_str("Method"),
            MemberKind::Property => f.write_str("Property"),
            MemberKind::Constructor => f.write_str("Constructor"),
            MemberKind::Event => f.write_str("Event"),
            MemberKind::Other(label) => f.write_str(label),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
}

impl Parameter {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessors {
    #[serde(default)]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSignature {
    pub kind: MemberKind,
    pub name: String,
    /// Return type for methods, value type for properties, handler type for events.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessors: Option<Accessors>,
}

impl MemberSignature {
    pub fn method(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            kind: MemberKind::Method,
            name: name.into(),
            value_type: Some(return_type.into()),
            parameters,
            accessors: None,
        }
    }

    pub fn property(
        name: impl Into<String>,
        value_type: impl Into<String>,
        accessors: Option<Accessors>,
    ) -> Self {
        Self {
            kind: MemberKind::Property,
            name: name.into(),
            value_type: Some(value_type.into()),
            parameters: Vec::new(),
            accessors,
        }
    }

    pub fn constructor(parameters: Vec<Parameter>) -> Self {
        Self {
            kind: MemberKind::Constructor,
            name: "new".to_string(),
            value_type: None,
            parameters,
            accessors: None,
        }
    }

    pub fn event(name: impl Into<String>, handler_type: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Event,
            name: name.into(),
            value_type: Some(handler_type.into()),
            parameters: Vec::new(),
            accessors: None,
        }
    }

    pub fn other(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Other(label.into()),
            name: name.into(),
            value_type: None,
            parameters: Vec::new(),
            accessors: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

/// A single type exported (or held) by a metadata source.
///
/// `name` and `namespace` are derived from `full_name` at construction and
/// never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeRecord {
    pub full_name: String,
    pub name: String,
    pub namespace: String,
    pub source: SourceId,
    pub members: Vec<MemberSignature>,
    pub interfaces: Vec<String>,
    pub attributes: Vec<String>,
    pub enum_values: Vec<EnumValue>,
}

impl TypeRecord {
    pub fn new(full_name: impl Into<String>, source: SourceId) -> Self {
        let full_name = full_name.into();
        let (namespace, name) = match full_name.rfind('.') {
            Some(idx) => (full_name[..idx].to_string(), full_name[idx + 1..].to_string()),
            None => (String::new(), full_name.clone()),
        };
        Self {
            full_name,
            name,
            namespace,
            source,
            members: Vec::new(),
            interfaces: Vec::new(),
            attributes: Vec::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn with_members(mut self, members: Vec<MemberSignature>) -> Self {
        self.members = members;
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<String>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_enum_values(mut self, enum_values: Vec<EnumValue>) -> Self {
        self.enum_values = enum_values;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_record_derives_name_and_namespace() {
        let record = TypeRecord::new("Sys.Net.Http.Client", SourceId::new("net"));
        assert_eq!(record.name, "Client");
        assert_eq!(record.namespace, "Sys.Net.Http");
    }

    #[test]
    fn test_type_record_in_root_namespace() {
        let record = TypeRecord::new("Program", SourceId::new("app"));
        assert_eq!(record.name, "Program");
        assert_eq!(record.namespace, "");
    }

    #[test]
    fn test_member_kind_deserializes_other_label() {
        let member: MemberSignature =
            serde_json::from_str(r#"{"kind": {"other": "Field"}, "name": "MaxValue"}"#).unwrap();
        assert_eq!(member.kind, MemberKind::Other("Field".to_string()));
        assert_eq!(member.kind.to_string(), "Field");
    }
}
