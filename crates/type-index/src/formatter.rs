use crate::aliases::AliasTable;
use crate::model::{MemberKind, MemberSignature, Parameter, TypeRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const INTERFACES_KEY: &str = "[Interfaces]";
pub const ATTRIBUTES_KEY: &str = "[Attributes]";

const VOID_TYPE: &str = "System.Void";

/// Member name -> formatted signatures, overloads kept in enumeration order.
pub type PropertyMap = BTreeMap<String, Vec<String>>;

/// Facets of a type rendered by [`MemberFormatter::format_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOptions {
    pub members: bool,
    pub interfaces: bool,
    pub attributes: bool,
    pub enum_values: bool,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            members: true,
            interfaces: false,
            attributes: false,
            enum_values: false,
        }
    }
}

enum NameMatcher {
    Exact(String),
    Wildcard(Regex),
}

/// Names or `*`/`?` wildcard patterns selecting which entries to keep.
///
/// An empty pick-list, or one containing `*`, keeps everything.
pub struct PickList {
    matchers: Vec<NameMatcher>,
    all: bool,
}

impl PickList {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let all = names.is_empty() || names.iter().any(|name| name.as_ref() == "*");
        let matchers = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                if !name.contains(['*', '?']) {
                    return NameMatcher::Exact(name.to_string());
                }
                let pattern = regex::escape(name)
                    .replace(r"\*", ".*")
                    .replace(r"\?", ".");
                match Regex::new(&format!("^{pattern}$")) {
                    Ok(regex) => NameMatcher::Wildcard(regex),
                    Err(_) => NameMatcher::Exact(name.to_string()),
                }
            })
            .collect();
        Self { matchers, all }
    }

    pub fn all() -> Self {
        Self {
            matchers: Vec::new(),
            all: true,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.all
            || self.matchers.iter().any(|matcher| match matcher {
                NameMatcher::Exact(exact) => exact == name,
                NameMatcher::Wildcard(regex) => regex.is_match(name),
            })
    }
}

/// Renders members as deterministic signature strings.
#[derive(Debug)]
pub struct MemberFormatter {
    aliases: AliasTable,
    show_accessors: bool,
}

impl MemberFormatter {
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            aliases,
            show_accessors: false,
        }
    }

    pub fn with_accessors(mut self, show_accessors: bool) -> Self {
        self.show_accessors = show_accessors;
        self
    }

    pub fn type_display<'a>(&'a self, type_name: &'a str) -> &'a str {
        self.aliases.display(type_name)
    }

    pub fn format(&self, member: &MemberSignature) -> String {
        match &member.kind {
            MemberKind::Method => {
                let return_type = member.value_type.as_deref().unwrap_or(VOID_TYPE);
                format!(
                    "{} {}({})",
                    self.type_display(return_type),
                    member.name,
                    self.format_parameters(&member.parameters)
                )
            }
            MemberKind::Property => {
                let mut out = match member.value_type.as_deref() {
                    Some(value_type) => format!("{} {}", self.type_display(value_type), member.name),
                    None => member.name.clone(),
                };
                if self.show_accessors {
                    if let Some(accessors) = member.accessors {
                        let marker = match (accessors.readable, accessors.writable) {
                            (true, true) => " {get;set;}",
                            (true, false) => " {get;}",
                            (false, true) => " {set;}",
                            (false, false) => "",
                        };
                        out.push_str(marker);
                    }
                }
                out
            }
            MemberKind::Constructor => {
                format!("new({})", self.format_parameters(&member.parameters))
            }
            MemberKind::Event => {
                let handler = member.value_type.as_deref().unwrap_or(VOID_TYPE);
                format!("event {} {}()", self.type_display(handler), member.name)
            }
            MemberKind::Other(_) => format!("{} {}", member.kind, member.name),
        }
    }

    fn format_parameters(&self, parameters: &[Parameter]) -> String {
        parameters
            .iter()
            .map(|p| format!("{} {}", self.type_display(&p.type_name), p.name))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Groups the selected facets of `record` by name.
    pub fn format_all(
        &self,
        record: &TypeRecord,
        pick_list: &PickList,
        options: &PropertyOptions,
    ) -> PropertyMap {
        let mut properties = PropertyMap::new();

        if options.members {
            let mut members: Vec<&MemberSignature> = record
                .members
                .iter()
                .filter(|member| pick_list.matches(&member.name))
                .collect();
            members.sort_by(|a, b| a.name.cmp(&b.name));
            for member in members {
                properties
                    .entry(member.name.clone())
                    .or_default()
                    .push(self.format(member));
            }
        }

        if options.interfaces && !record.interfaces.is_empty() && pick_list.matches(INTERFACES_KEY)
        {
            properties.insert(
                INTERFACES_KEY.to_string(),
                record
                    .interfaces
                    .iter()
                    .map(|name| self.type_display(name).to_string())
                    .collect(),
            );
        }

        if options.attributes && !record.attributes.is_empty() && pick_list.matches(ATTRIBUTES_KEY)
        {
            properties.insert(
                ATTRIBUTES_KEY.to_string(),
                record
                    .attributes
                    .iter()
                    .map(|name| self.type_display(name).to_string())
                    .collect(),
            );
        }

        if options.enum_values {
            for value in record
                .enum_values
                .iter()
                .filter(|value| pick_list.matches(&value.name))
            {
                properties
                    .entry(value.name.clone())
                    .or_default()
                    .push(format!("{} = {}", value.name, value.value));
            }
        }

        properties
    }
}
