//! Field-keyed prompt templates.
//!
//! A template document is a JSON array of strings containing `{name}`
//! placeholders. Each template is indexed by its field-key, the sorted
//! comma-joined set of placeholder names. Rendering picks the template whose
//! field-key equals the set of supplied fields that carry a value (`output` is
//! always counted, even when empty, so a prompt can end in an open response
//! slot).

use crate::error::{ConfigError, TemplateError};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Field that is selected even when its value is empty.
pub const OUTPUT_FIELD: &str = "output";

/// Field passed through unchanged when no templates are configured.
pub const INPUT_FIELD: &str = "input";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"))
}

/// Join a set of field names into a lookup key.
pub fn field_key<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

/// One template string with its placeholder set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
    placeholders: BTreeSet<String>,
}

impl Template {
    pub fn new<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let placeholders = placeholder_pattern()
            .captures_iter(&text)
            .map(|caps| caps[1].to_string())
            .collect();
        Self { text, placeholders }
    }

    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    pub fn field_key(&self) -> String {
        field_key(self.placeholders.iter().map(String::as_str))
    }

    /// Substitute every placeholder from `values`.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.text.len());
        let mut last = 0;

        for caps in placeholder_pattern().captures_iter(&self.text) {
            let whole = caps.get(0).expect("capture 0 is the whole match");
            let name = &caps[1];
            let value = values
                .get(name)
                .ok_or_else(|| TemplateError::MissingPlaceholder(name.to_string()))?;

            rendered.push_str(&self.text[last..whole.start()]);
            rendered.push_str(value);
            last = whole.end();
        }
        rendered.push_str(&self.text[last..]);

        Ok(rendered)
    }
}

/// Selects and renders templates by field-key.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    templates: BTreeMap<String, Template>,
}

impl TemplateEngine {
    /// Build from template strings. Two templates sharing a field-key are
    /// rejected.
    pub fn new<I, S>(templates: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for text in templates {
            let template = Template::new(text);
            let key = template.field_key();
            if map.contains_key(&key) {
                return Err(ConfigError::DuplicateFieldKey(key));
            }
            map.insert(key, template);
        }

        debug!(templates = map.len(), "Built template map");
        Ok(Self { templates: map })
    }

    /// Engine without templates.
    pub fn templateless() -> Self {
        Self::default()
    }

    /// Read a template document, or fall back to templateless mode when no
    /// path is given.
    pub fn from_path(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No template document, running templateless");
            return Ok(Self::templateless());
        };

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let templates: Vec<String> =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        debug!(path = %path.display(), "Loaded template document");
        Self::new(templates)
    }

    pub fn has_templates(&self) -> bool {
        !self.templates.is_empty()
    }

    /// Configured field-keys in sorted order.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Render the template matching the non-empty supplied fields.
    pub fn render<I, K, V>(&self, fields: I) -> Result<String, TemplateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let selected: BTreeMap<String, String> = fields
            .into_iter()
            .filter(|(name, value)| !value.as_ref().is_empty() || name.as_ref() == OUTPUT_FIELD)
            .map(|(name, value)| (name.as_ref().to_string(), value.as_ref().to_string()))
            .collect();
        let key = field_key(selected.keys().map(String::as_str));

        if !self.has_templates() {
            return render_templateless(selected, key);
        }

        let template = self
            .templates
            .get(&key)
            .ok_or(TemplateError::UnknownFieldKey(key))?;
        template.render(&selected)
    }
}

/// Without templates the single non-output field is the whole prompt.
fn render_templateless(
    mut selected: BTreeMap<String, String>,
    key: String,
) -> Result<String, TemplateError> {
    let has_output = selected.contains_key(OUTPUT_FIELD);
    let field = match (selected.len(), has_output) {
        (2, true) => selected
            .keys()
            .find(|name| name.as_str() != OUTPUT_FIELD)
            .cloned(),
        (1, false) if selected.contains_key(INPUT_FIELD) => Some(INPUT_FIELD.to_string()),
        _ => None,
    };

    field
        .and_then(|name| selected.remove(&name))
        .ok_or(TemplateError::FieldCount(key))
}
