//! HTML template engine for satchel pages.
//!
//! A small Handlebars-style engine:
//!
//! - Variables: `{{variable}}`, always HTML-escaped
//! - Conditionals: `{{#if condition}}...{{else}}...{{/if}}`
//! - Loops: `{{#each items}}...{{/each}}` (item as `this`) or
//!   `{{#each items as item}}...{{/each}}`
//!
//! # Example
//!
//! ```
//! use satchel::template::{TemplateContext, TemplateEngine, Value};
//!
//! let mut engine = TemplateEngine::new();
//! engine.load("greeting", "Hello, {{name}}!").unwrap();
//!
//! let mut context = TemplateContext::new();
//! context.set("name", Value::from("World"));
//!
//! assert_eq!(engine.render("greeting", &context).unwrap(), "Hello, World!");
//! ```

mod parser;
mod renderer;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use parser::{Node, Parser};
pub use renderer::Renderer;

/// Template-related errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template not found.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Render error.
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A value that can be used in templates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// A numeric value.
    Number(i64),
    /// A boolean value.
    Bool(bool),
    /// A list of values.
    List(Vec<Value>),
    /// An object (key-value pairs).
    Object(HashMap<String, Value>),
    /// A null/empty value.
    Null,
}

impl Value {
    /// Convert the value to a string for display.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::List(_) => "[list]".to_string(),
            Value::Object(_) => "[object]".to_string(),
            Value::Null => String::new(),
        }
    }

    /// Check if the value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => *n != 0,
            Value::Bool(b) => *b,
            Value::List(l) => !l.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::Null => false,
        }
    }

    /// Get a nested value by dot-separated path.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;

        for part in path.split('.') {
            match current {
                Value::Object(map) => current = map.get(part)?,
                Value::List(list) => current = list.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            }
        }

        Some(current)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Variables available while rendering a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, Value>,
}

impl TemplateContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable in the context.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Get a variable, following dot notation into objects and lists.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.variables.get(name) {
            return Some(value);
        }

        let (root, rest) = name.split_once('.')?;
        self.variables.get(root)?.get_path(rest)
    }

    /// Create a child context inheriting all variables.
    pub fn child(&self) -> Self {
        self.clone()
    }
}

/// Template engine holding parsed templates by name.
#[derive(Debug, Default)]
pub struct TemplateEngine {
    templates: HashMap<String, Vec<Node>>,
}

impl TemplateEngine {
    /// Create a new template engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a template from a string.
    pub fn load(&mut self, name: impl Into<String>, content: &str) -> Result<()> {
        let nodes = Parser::new(content).parse()?;
        self.templates.insert(name.into(), nodes);
        Ok(())
    }

    /// Load a template from a file.
    pub fn load_file(&mut self, name: impl Into<String>, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TemplateError::NotFound(format!("{}: {e}", path.display()))
        })?;
        self.load(name, &content)
    }

    /// Render a template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let nodes = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        Renderer::new(context).render(nodes)
    }

    /// Check if a template is loaded.
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_value_is_truthy() {
        assert!(Value::from("DS").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::Number(0).is_truthy());
        assert!(Value::from(vec!["a"]).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_context_get_nested() {
        let mut site = HashMap::new();
        site.insert("title".to_string(), Value::from("Uploads"));
        let mut context = TemplateContext::new();
        context.set("site", Value::Object(site));
        context.set("subjects", Value::from(vec!["DS", "OS"]));

        assert_eq!(context.get("site.title"), Some(&Value::from("Uploads")));
        assert_eq!(context.get("subjects.1"), Some(&Value::from("OS")));
        assert_eq!(context.get("site.missing"), None);
        assert_eq!(context.get("missing"), None);
    }

    #[test]
    fn test_engine_render_not_loaded() {
        let engine = TemplateEngine::new();
        let result = engine.render("index", &TemplateContext::new());

        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_engine_load_invalid() {
        let mut engine = TemplateEngine::new();

        assert!(engine.load("broken", "{{#if x}}").is_err());
        assert!(!engine.has_template("broken"));
    }

    #[test]
    fn test_engine_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.html");
        std::fs::write(&path, "<h1>{{title}}</h1>").unwrap();

        let mut engine = TemplateEngine::new();
        engine.load_file("index", &path).unwrap();

        let mut context = TemplateContext::new();
        context.set("title", Value::from("DS"));
        assert_eq!(engine.render("index", &context).unwrap(), "<h1>DS</h1>");
    }

    #[test]
    fn test_engine_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = TemplateEngine::new();

        let result = engine.load_file("index", &temp_dir.path().join("absent.html"));
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}
