use super::models::Rule;
use crate::error::{Error, Result};

/// One search criterion. The variants are the closed set of searchable
/// fields; anything else is rejected at parse time instead of being
/// reflected onto the model. Matching is exact equality, and a search
/// combines its criteria with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Pattern(String),
    Ticket(String),
    Name(String),
    Email(String),
    Application(String),
    Active(bool),
    Permanent(bool),
}

impl Criterion {
    /// Parse a single `field=value` pair as entered on the command surface.
    pub fn parse(input: &str) -> Result<Self> {
        let (field, value) = input
            .split_once('=')
            .ok_or_else(|| Error::Validation(format!("expected field=value, got '{}'", input)))?;
        let value = value.trim();

        match field.trim().to_ascii_lowercase().as_str() {
            "pattern" | "rule" => Ok(Self::Pattern(value.to_string())),
            "ticket" => Ok(Self::Ticket(value.to_string())),
            "name" => Ok(Self::Name(value.to_string())),
            "email" => Ok(Self::Email(value.to_string())),
            "application" => Ok(Self::Application(value.to_string())),
            "active" => Ok(Self::Active(parse_bool(value)?)),
            "permanent" => Ok(Self::Permanent(parse_bool(value)?)),
            other => Err(Error::Validation(format!("unknown search field '{}'", other))),
        }
    }

    pub fn matches(&self, rule: &Rule) -> bool {
        match self {
            Self::Pattern(v) => rule.pattern == *v,
            Self::Ticket(v) => rule.ticket.as_deref() == Some(v.as_str()),
            Self::Name(v) => rule.requester_name.as_deref() == Some(v.as_str()),
            Self::Email(v) => rule.requester_email.as_deref() == Some(v.as_str()),
            Self::Application(v) => rule.application.as_deref() == Some(v.as_str()),
            Self::Active(v) => rule.active == *v,
            Self::Permanent(v) => rule.permanent == *v,
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(Error::Validation(format!("expected a boolean, got '{}'", other))),
    }
}
