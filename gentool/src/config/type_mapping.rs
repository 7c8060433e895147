//! Custom column type mapping rules

use gentool_catalog::ColumnMetadata;
use tracing::warn;

use super::defaults;

/// A single `source:target` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRule {
    name: String,
    target: String,
}

impl TypeRule {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn matches(&self, column: &ColumnMetadata) -> bool {
        column.has_type(&self.name)
    }

    /// The target type for a matching column, `"string"` otherwise.
    pub fn apply(&self, column: &ColumnMetadata) -> &str {
        if self.matches(column) {
            &self.target
        } else {
            defaults::UNMAPPED_TYPE
        }
    }
}

/// Ordered set of type rules with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapping {
    rules: Vec<TypeRule>,
}

impl TypeMapping {
    /// Compile `name:value` entries.
    ///
    /// Entries are split at the first `:`; entries without a name or value
    /// are skipped, and so are duplicate names. With `json_type_tag` an
    /// implicit `jsonb` rule is appended unless one already exists.
    pub fn compile<S: AsRef<str>>(entries: &[S], json_type_tag: bool) -> Self {
        let mut mapping = Self::default();
        for entry in entries {
            let entry = entry.as_ref();
            let Some((name, target)) = entry.split_once(':') else {
                warn!(entry, "skipping type mapping without ':'");
                continue;
            };
            if name.is_empty() || target.is_empty() {
                warn!(entry, "skipping malformed type mapping");
                continue;
            }
            if mapping.get(name).is_some() {
                warn!(name, "duplicate type mapping, keeping the first");
                continue;
            }
            mapping.rules.push(TypeRule::new(name, target));
        }
        if json_type_tag && mapping.get(defaults::JSON_SOURCE_TYPE).is_none() {
            mapping.rules.push(TypeRule::new(
                defaults::JSON_SOURCE_TYPE,
                defaults::JSON_TARGET_TYPE,
            ));
        }
        mapping
    }

    pub fn get(&self, name: &str) -> Option<&TypeRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Target of the first rule matching `column`.
    pub fn resolve(&self, column: &ColumnMetadata) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(column))
            .map(TypeRule::target)
    }

    pub fn rules(&self) -> &[TypeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Entries in `name:value` form, in rule order
    pub fn to_entries(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|rule| format!("{}:{}", rule.name, rule.target))
            .collect()
    }
}
