//! Access rules: the rows of an actor's rule table.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::types::{Action, Resource, ResourceKind, Subject};

/// Whether a matching rule permits or refuses the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Grant,
    Revoke,
}

/// The resources a rule is declared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Every resource kind, capability domains included
    All,
    Kind(ResourceKind),
}

impl Target {
    pub fn covers(&self, kind: ResourceKind) -> bool {
        match self {
            Target::All => true,
            Target::Kind(declared) => *declared == kind,
        }
    }
}

impl From<ResourceKind> for Target {
    fn from(kind: ResourceKind) -> Self {
        Target::Kind(kind)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => f.write_str("all"),
            Target::Kind(kind) => f.write_str(kind.as_str()),
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An attribute condition narrowing a rule to particular instances.
///
/// Conditions are bound to the actor's identity when the rule table is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "attribute", content = "value")]
pub enum Condition {
    /// The resource belongs to this account.
    AccountIs(String),
    /// The resource was authored by this user.
    AuthorIs(String),
    /// The resource is owned by this user (per-user configuration).
    UserIs(String),
    /// The resource is exactly this record.
    IdIs(String),
    /// The resource is any record except this one.
    IdIsNot(String),
}

impl Condition {
    pub fn holds_for(&self, resource: &Resource) -> bool {
        match self {
            Condition::AccountIs(account_id) => {
                resource.account_id.as_deref() == Some(account_id.as_str())
            }
            Condition::AuthorIs(author_id) => {
                resource.author_id.as_deref() == Some(author_id.as_str())
            }
            Condition::UserIs(user_id) => resource.user_id.as_deref() == Some(user_id.as_str()),
            Condition::IdIs(id) => resource.id.as_deref() == Some(id.as_str()),
            Condition::IdIsNot(id) => resource.id.as_deref() != Some(id.as_str()),
        }
    }
}

/// One grant or revoke in a rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRule {
    pub effect: Effect,
    pub action: Action,
    pub target: Target,
    /// All conditions must hold. Empty means the rule is unscoped.
    pub conditions: Vec<Condition>,
}

impl AccessRule {
    pub fn grant(action: Action, target: impl Into<Target>) -> Self {
        Self::new(Effect::Grant, action, target.into())
    }

    pub fn revoke(action: Action, target: impl Into<Target>) -> Self {
        Self::new(Effect::Revoke, action, target.into())
    }

    fn new(effect: Effect, action: Action, target: Target) -> Self {
        Self {
            effect,
            action,
            target,
            conditions: Vec::new(),
        }
    }

    /// Adds a condition the resource instance must satisfy.
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_scoped(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Returns true when this rule decides the query.
    ///
    /// A class-level subject has no attributes, so a scoped rule never
    /// matches it.
    pub fn matches(&self, action: Action, subject: Subject<'_>) -> bool {
        if !self.action.covers(action) || !self.target.covers(subject.kind()) {
            return false;
        }

        match subject.instance() {
            Some(resource) => self.conditions.iter().all(|c| c.holds_for(resource)),
            None => !self.is_scoped(),
        }
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.effect {
            Effect::Grant => "can",
            Effect::Revoke => "cannot",
        };
        write!(f, "{} {} {}", verb, self.action, self.target)?;
        for (i, condition) in self.conditions.iter().enumerate() {
            let sep = if i == 0 { " where " } else { " and " };
            let (attribute, op, value) = match condition {
                Condition::AccountIs(v) => ("account_id", "=", v),
                Condition::AuthorIs(v) => ("author_id", "=", v),
                Condition::UserIs(v) => ("user_id", "=", v),
                Condition::IdIs(v) => ("id", "=", v),
                Condition::IdIsNot(v) => ("id", "!=", v),
            };
            write!(f, "{}{} {} {}", sep, attribute, op, value)?;
        }
        Ok(())
    }
}
