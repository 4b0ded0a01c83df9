//! Template parser.
//!
//! Splits a template at its `{{ ... }}` tags and builds a tree of [`Node`]s.

use super::{Result, TemplateError};

/// A node in the template tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text.
    Text(String),

    /// HTML-escaped variable: `{{name}}` or `{{site.title}}`
    Variable(String),

    /// `{{#if condition}}...{{else}}...{{/if}}`
    If {
        condition: String,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
    },

    /// `{{#each items}}...{{/each}}` or `{{#each items as item}}...{{/each}}`
    Each {
        variable: String,
        item_name: Option<String>,
        body: Vec<Node>,
    },
}

/// How a run of nodes ended.
enum Stop<'a> {
    Eof,
    Else,
    Close(&'a str),
}

/// Template parser.
pub struct Parser<'a> {
    rest: &'a str,
}

impl<'a> Parser<'a> {
    /// Create a parser for `input`.
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// Parse the whole template.
    pub fn parse(mut self) -> Result<Vec<Node>> {
        let (nodes, stop) = self.parse_nodes()?;

        match stop {
            Stop::Eof => Ok(nodes),
            Stop::Else => Err(parse_error("else outside of an if block")),
            Stop::Close(name) => Err(parse_error(format!("/{name} without an open block"))),
        }
    }

    /// Parse nodes up to the end of input, an `else` or a closing tag.
    fn parse_nodes(&mut self) -> Result<(Vec<Node>, Stop<'a>)> {
        let mut nodes = Vec::new();

        loop {
            let rest = self.rest;
            let Some(open) = rest.find("{{") else {
                push_text(&mut nodes, rest);
                self.rest = "";
                return Ok((nodes, Stop::Eof));
            };
            push_text(&mut nodes, &rest[..open]);

            let after = &rest[open + 2..];
            let close = after
                .find("}}")
                .ok_or_else(|| parse_error("unclosed tag"))?;
            let tag = after[..close].trim();
            self.rest = &after[close + 2..];

            if let Some(args) = tag.strip_prefix("#if ") {
                nodes.push(self.parse_if(args)?);
            } else if let Some(args) = tag.strip_prefix("#each ") {
                nodes.push(self.parse_each(args)?);
            } else if let Some(block) = tag.strip_prefix('#') {
                return Err(parse_error(format!("unknown block tag: {block}")));
            } else if tag == "else" {
                return Ok((nodes, Stop::Else));
            } else if let Some(name) = tag.strip_prefix('/') {
                return Ok((nodes, Stop::Close(name.trim())));
            } else {
                nodes.push(Node::Variable(identifier(tag)?));
            }
        }
    }

    fn parse_if(&mut self, args: &str) -> Result<Node> {
        let condition = identifier(args)?;

        let (then_branch, stop) = self.parse_nodes()?;
        let else_branch = match stop {
            Stop::Else => {
                let (nodes, stop) = self.parse_nodes()?;
                expect_close(stop, "if")?;
                nodes
            }
            stop => {
                expect_close(stop, "if")?;
                Vec::new()
            }
        };

        Ok(Node::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_each(&mut self, args: &str) -> Result<Node> {
        let (variable, item_name) = match args.split_once(" as ") {
            Some((list, item)) => (identifier(list)?, Some(identifier(item)?)),
            None => (identifier(args)?, None),
        };

        let (body, stop) = self.parse_nodes()?;
        expect_close(stop, "each")?;

        Ok(Node::Each {
            variable,
            item_name,
            body,
        })
    }
}

fn parse_error(message: impl Into<String>) -> TemplateError {
    TemplateError::Parse(message.into())
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// A variable name: letters, digits, `_`, `-` and `.` for nested lookups.
fn identifier(raw: &str) -> Result<String> {
    let name = raw.trim();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(name.to_string())
    } else {
        Err(parse_error(format!("invalid variable name '{name}'")))
    }
}

fn expect_close(stop: Stop<'_>, block: &str) -> Result<()> {
    match stop {
        Stop::Close(name) if name == block => Ok(()),
        Stop::Close(name) => Err(parse_error(format!("expected /{block}, found /{name}"))),
        Stop::Else => Err(parse_error(format!("else inside #{block}"))),
        Stop::Eof => Err(parse_error(format!("unclosed #{block} block"))),
    }
}
