//! Template renderer module.
//!
//! Renders parsed template nodes with the given context.

use super::parser::Node;
use super::{escape_html, Result, TemplateContext, TemplateError, Value};

/// Template renderer.
pub struct Renderer<'a> {
    context: &'a TemplateContext,
}

impl<'a> Renderer<'a> {
    /// Create a new renderer with the given context.
    pub fn new(context: &'a TemplateContext) -> Self {
        Self { context }
    }

    /// Render a list of nodes to a string.
    pub fn render(&self, nodes: &[Node]) -> Result<String> {
        let mut output = String::new();

        for node in nodes {
            output.push_str(&self.render_node(node)?);
        }

        Ok(output)
    }

    fn render_node(&self, node: &Node) -> Result<String> {
        match node {
            Node::Text(text) => Ok(text.clone()),
            Node::Variable(name) => Ok(escape_html(&self.lookup(name))),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => self.render_if(condition, then_branch, else_branch),
            Node::Each {
                variable,
                item_name,
                body,
            } => self.render_each(variable, item_name.as_deref(), body),
        }
    }

    /// Missing variables render as an empty string, like Handlebars.
    fn lookup(&self, name: &str) -> String {
        self.context
            .get(name)
            .map(|v| v.to_display_string())
            .unwrap_or_default()
    }

    fn render_if(
        &self,
        condition: &str,
        then_branch: &[Node],
        else_branch: &[Node],
    ) -> Result<String> {
        let is_truthy = self
            .context
            .get(condition)
            .map(|v| v.is_truthy())
            .unwrap_or(false);

        if is_truthy {
            self.render(then_branch)
        } else {
            self.render(else_branch)
        }
    }

    fn render_each(
        &self,
        variable: &str,
        item_name: Option<&str>,
        body: &[Node],
    ) -> Result<String> {
        let list = match self.context.get(variable) {
            Some(Value::List(items)) => items,
            Some(_) => {
                return Err(TemplateError::Render(format!("'{variable}' is not a list")));
            }
            None => return Ok(String::new()),
        };

        let mut output = String::new();
        let item_var_name = item_name.unwrap_or("this");

        for item in list {
            let mut child_context = self.context.child();
            child_context.set(item_var_name, item.clone());

            if let Value::Object(obj) = item {
                for (key, value) in obj {
                    child_context.set(key.clone(), value.clone());
                }
            }

            output.push_str(&Renderer::new(&child_context).render(body)?);
        }

        Ok(output)
    }
}
