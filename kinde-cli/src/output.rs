//! Rendering of command results.

use anyhow::Result;
use clap::ValueEnum;
use kinde_client::apis::Api;
use kinde_client::applications::Application;
use kinde_client::connections::Connection;
use kinde_client::organizations::Organization;
use kinde_client::permissions::Permission;
use kinde_client::roles::Role;
use kinde_client::users::{Identity, User};
use serde::Serialize;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per item.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// A one-line, human readable description.
pub trait Summary {
    fn summary(&self) -> String;
}

impl Summary for Api {
    fn summary(&self) -> String {
        format!("{}  {}  {}", self.id, self.name, self.audience)
    }
}

impl Summary for Application {
    fn summary(&self) -> String {
        let kind = self.kind.map(|k| k.to_string()).unwrap_or_else(|| "-".into());
        format!("{}  {}  {}", self.id, self.name, kind)
    }
}

impl Summary for Organization {
    fn summary(&self) -> String {
        format!("{}  {}", self.code, self.name)
    }
}

impl Summary for User {
    fn summary(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{}  {}  {}",
            self.id,
            self.preferred_email.as_deref().unwrap_or("-"),
            name
        )
    }
}

impl Summary for Role {
    fn summary(&self) -> String {
        format!("{}  {}  {}", self.id, self.key, self.name)
    }
}

impl Summary for Permission {
    fn summary(&self) -> String {
        format!("{}  {}  {}", self.id, self.key, self.name)
    }
}

impl Summary for Connection {
    fn summary(&self) -> String {
        format!("{}  {}  {}", self.id, self.strategy, self.display_name)
    }
}

impl Summary for Identity {
    fn summary(&self) -> String {
        format!("{}  {}  {}", self.id, self.kind, self.name)
    }
}

/// Render one item.
pub fn render_one<T: Serialize + Summary>(format: OutputFormat, item: &T) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
        OutputFormat::Text => Ok(item.summary()),
    }
}

/// Render a list of items.
pub fn render_list<T: Serialize + Summary>(format: OutputFormat, items: &[T]) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Text if items.is_empty() => Ok("(none)".to_string()),
        OutputFormat::Text => Ok(items
            .iter()
            .map(Summary::summary)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
