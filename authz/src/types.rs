//! Core authorization types.
//!
//! A permission query is the triple (who, what, which):
//!
//! - [`Actor`]: the authenticated user, reduced to the attributes rules need
//! - [`Action`]: the operation, including the `manage` wildcard and aliases
//! - [`Subject`]: either a whole [`ResourceKind`] (class-level check) or a
//!   concrete [`Resource`] carrying its ownership attributes
//!
//! # Security Considerations
//!
//! - Actors must be built from an authenticated user record, never from
//!   request input.
//! - Resource attributes (`account_id`, `author_id`, `user_id`) must come from
//!   storage. Rules scoped by ownership trust them blindly.
//! - Class-level checks carry no attributes, so any rule that needs them
//!   cannot match one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthzError;
use crate::role::Role;

/// The user a permission query is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// The user's id (ULID)
    pub id: String,

    /// The account (tenant) the user belongs to
    pub account_id: String,

    /// The user's role; `None` when the stored role is outside the catalog
    pub role: Option<Role>,
}

impl Actor {
    /// Creates a new Actor.
    pub fn new(id: impl Into<String>, account_id: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            role,
        }
    }
}

/// An operation that can be permitted or refused.
///
/// `Manage` is the wildcard: a rule declared for it covers every action. A
/// few actions are aliases of broader ones, see [`Action::covers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Manage,
    Read,
    Index,
    Show,
    Create,
    New,
    Update,
    Edit,
    Destroy,
    Clone,
    Access,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::Manage,
        Action::Read,
        Action::Index,
        Action::Show,
        Action::Create,
        Action::New,
        Action::Update,
        Action::Edit,
        Action::Destroy,
        Action::Clone,
        Action::Access,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Manage => "manage",
            Action::Read => "read",
            Action::Index => "index",
            Action::Show => "show",
            Action::Create => "create",
            Action::New => "new",
            Action::Update => "update",
            Action::Edit => "edit",
            Action::Destroy => "destroy",
            Action::Clone => "clone",
            Action::Access => "access",
        }
    }

    /// Returns true when a rule declared for `self` applies to a query for
    /// `requested`.
    ///
    /// - `manage` covers every action
    /// - `read` covers `index` and `show`
    /// - `create` covers `new`
    /// - `update` covers `edit`
    pub fn covers(self, requested: Action) -> bool {
        match self {
            Action::Manage => true,
            Action::Read => matches!(requested, Action::Read | Action::Index | Action::Show),
            Action::Create => matches!(requested, Action::Create | Action::New),
            Action::Update => matches!(requested, Action::Update | Action::Edit),
            declared => declared == requested,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| AuthzError::UnknownAction(s.to_string()))
    }
}

/// The kinds of resources permissions are declared against.
///
/// `Settings` is a capability domain rather than a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Account,
    AccountConfig,
    EncryptedConfig,
    Submission,
    Submitter,
    Template,
    TemplateFolder,
    User,
    UserConfig,
    Settings,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Account,
        ResourceKind::AccountConfig,
        ResourceKind::EncryptedConfig,
        ResourceKind::Submission,
        ResourceKind::Submitter,
        ResourceKind::Template,
        ResourceKind::TemplateFolder,
        ResourceKind::User,
        ResourceKind::UserConfig,
        ResourceKind::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Account => "account",
            ResourceKind::AccountConfig => "account_config",
            ResourceKind::EncryptedConfig => "encrypted_config",
            ResourceKind::Submission => "submission",
            ResourceKind::Submitter => "submitter",
            ResourceKind::Template => "template",
            ResourceKind::TemplateFolder => "template_folder",
            ResourceKind::User => "user",
            ResourceKind::UserConfig => "user_config",
            ResourceKind::Settings => "settings",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AuthzError::UnknownResource(s.to_string()))
    }
}

/// A concrete resource with the attributes ownership rules look at.
///
/// For a `Submitter` the `account_id` and `author_id` are those of the
/// submission it belongs to. For a `UserConfig`, `user_id` is the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub id: Option<String>,
    pub account_id: Option<String>,
    pub author_id: Option<String>,
    pub user_id: Option<String>,
}

impl Resource {
    /// Creates a resource of the given kind with no attributes set.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            id: None,
            account_id: None,
            author_id: None,
            user_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn in_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn authored_by(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    pub fn owned_by_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// A user record of the given account.
    pub fn user(id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self::new(ResourceKind::User).with_id(id).in_account(account_id)
    }

    pub fn template(id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self::new(ResourceKind::Template)
            .with_id(id)
            .in_account(account_id)
    }

    pub fn template_folder(id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self::new(ResourceKind::TemplateFolder)
            .with_id(id)
            .in_account(account_id)
    }

    pub fn submission(
        id: impl Into<String>,
        account_id: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self::new(ResourceKind::Submission)
            .with_id(id)
            .in_account(account_id)
            .authored_by(author_id)
    }

    /// A submitter, described through the submission it belongs to.
    pub fn submitter(
        id: impl Into<String>,
        submission_account_id: impl Into<String>,
        submission_author_id: impl Into<String>,
    ) -> Self {
        Self::new(ResourceKind::Submitter)
            .with_id(id)
            .in_account(submission_account_id)
            .authored_by(submission_author_id)
    }

    pub fn user_config(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new(ResourceKind::UserConfig)
            .with_id(id)
            .owned_by_user(user_id)
    }
}

/// What a permission query is about: a whole kind, or one instance of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject<'a> {
    Kind(ResourceKind),
    Instance(&'a Resource),
}

impl<'a> Subject<'a> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Subject::Kind(kind) => *kind,
            Subject::Instance(resource) => resource.kind,
        }
    }

    pub fn instance(&self) -> Option<&'a Resource> {
        match self {
            Subject::Kind(_) => None,
            Subject::Instance(resource) => Some(*resource),
        }
    }
}

impl From<ResourceKind> for Subject<'_> {
    fn from(kind: ResourceKind) -> Self {
        Subject::Kind(kind)
    }
}

impl<'a> From<&'a Resource> for Subject<'a> {
    fn from(resource: &'a Resource) -> Self {
        Subject::Instance(resource)
    }
}
