use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Write;

use serde::Serialize;

use crate::binder::BindingKind;
use crate::error::BindError;
use crate::flagset::FlagSet;

const INDENT_STEP: &str = "  ";

/// One action's option scope and its child actions.
pub struct ParserNode<'a> {
    name: String,
    usage: String,
    flags: FlagSet<'a>,
    /// Child keys in declaration order.
    order: Vec<String>,
    children: HashMap<String, ParserNode<'a>>,
    /// Child key to the field name it was declared under.
    field_names: HashMap<String, String>,
}

impl<'a> ParserNode<'a> {
    pub fn new(name: impl Into<String>, usage: impl Into<String>, prefix: &str) -> Self {
        let name = name.into();
        Self {
            flags: FlagSet::new(name.clone(), prefix),
            name,
            usage: usage.into(),
            order: Vec::new(),
            children: HashMap::new(),
            field_names: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn flags(&self) -> &FlagSet<'a> {
        &self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut FlagSet<'a> {
        &mut self.flags
    }

    pub fn child(&self, key: &str) -> Option<&ParserNode<'a>> {
        self.children.get(key)
    }

    pub(crate) fn child_mut(&mut self, key: &str) -> Option<&mut ParserNode<'a>> {
        self.children.get_mut(key)
    }

    /// Child action keys, in declaration order.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn field_name(&self, key: &str) -> Option<&str> {
        self.field_names.get(key).map(String::as_str)
    }

    pub(crate) fn add_action(
        &mut self,
        key: String,
        field_name: &str,
        usage: String,
    ) -> Result<&mut ParserNode<'a>, BindError> {
        let prefix = self.flags.prefix().to_string();
        match self.children.entry(key) {
            Entry::Occupied(entry) => Err(BindError::DuplicateAction {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                self.order.push(key.clone());
                self.field_names.insert(key.clone(), field_name.to_string());
                Ok(entry.insert(ParserNode::new(key, usage, &prefix)))
            }
        }
    }

    /// Human-readable usage for this node and every descendant.
    ///
    /// `parent_indent` is the indentation of the enclosing node; options and
    /// child actions are indented one step further.
    pub fn usage_str(&self, parent_indent: &str) -> String {
        let indent = format!("{parent_indent}{INDENT_STEP}");
        let mut out = String::new();
        writeln!(&mut out, "{}", self.usage).ok();
        for flag in self.flags.iter() {
            writeln!(&mut out, "{indent}- {}: {}", flag.name(), flag.usage()).ok();
            if !flag.default_value().is_empty() {
                writeln!(&mut out, "{indent}\tdefault:{}", flag.default_value()).ok();
            }
        }
        for key in &self.order {
            if let Some(child) = self.children.get(key) {
                write!(&mut out, "{indent}= {key}: ").ok();
                out.push_str(&child.usage_str(&indent));
            }
        }
        out
    }

    /// Usage of the direct child declared under `field_name`, or empty.
    pub fn act_usage(&self, field_name: &str) -> String {
        self.field_names
            .iter()
            .find(|(_, name)| name.as_str() == field_name)
            .and_then(|(key, _)| self.children.get(key))
            .map(|child| child.usage_str(""))
            .unwrap_or_default()
    }

    pub fn usage_tree(&self) -> UsageNode {
        self.usage_tree_as(None)
    }

    fn usage_tree_as(&self, field: Option<&str>) -> UsageNode {
        UsageNode {
            name: self.name.clone(),
            field: field.map(str::to_string),
            usage: self.usage.clone(),
            options: self
                .flags
                .iter()
                .map(|flag| OptionUsage {
                    name: flag.name().to_string(),
                    usage: flag.usage().to_string(),
                    default: flag.default_value().to_string(),
                    kind: flag.kind(),
                })
                .collect(),
            actions: self
                .order
                .iter()
                .filter_map(|key| {
                    let child = self.children.get(key)?;
                    Some(child.usage_tree_as(self.field_name(key)))
                })
                .collect(),
        }
    }
}

/// Serialisable snapshot of a node's options and actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub usage: String,
    pub options: Vec<OptionUsage>,
    pub actions: Vec<UsageNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionUsage {
    pub name: String,
    pub usage: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default: String,
    pub kind: BindingKind,
}
