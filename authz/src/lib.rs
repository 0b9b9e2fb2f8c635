//! Role-based authorization engine for DocSign.
//!
//! This crate decides whether an actor may perform an action on a resource.
//! It defines the role catalog, the rule model and an [`AuthzEngine`] that
//! evaluates permission queries against an actor's rule table.
//!
//! # Authorization Flow
//!
//! 1. **Identity resolution** (the `user` crate) establishes the user and role
//! 2. **[`builder::build_rule_table`]** turns the actor into an ordered list of
//!    grants and revokes
//! 3. **[`AuthzEngine::can`]** scans that list from the last rule to the first
//!    and returns the effect of the first matching rule
//! 4. **No match** means deny
//!
//! Rule order is the only conflict-resolution mechanism: a later rule narrows
//! or revokes an earlier, broader one. The table is a plain `Vec` for that
//! reason and is rebuilt for every engine.
//!
//! # Example
//!
//! ```rust
//! use authz::{AuthzEngine, Role, types::{Action, Actor, Resource}};
//!
//! let engine = AuthzEngine::for_actor(Actor::new("u1", "acct", Some(Role::Member)));
//! let folder = Resource::template_folder("f1", "acct");
//!
//! assert!(engine.can(Action::Create, &folder));
//! assert!(!engine.can(Action::Update, &folder));
//! ```

pub mod builder;
pub mod error;
pub mod role;
pub mod rule;
pub mod types;

use tracing::debug;

pub use builder::build_rule_table;
pub use error::{AuthzError, Result};
pub use role::Role;
pub use rule::{AccessRule, Condition, Effect, Target};
use types::{Action, Actor, ResourceKind, Subject};

/// Answers permission queries for one actor.
///
/// The engine owns the actor's rule table. It is cheap to build and holds no
/// shared state, so build one per request.
#[derive(Debug, Clone)]
pub struct AuthzEngine {
    actor: Actor,
    rules: Vec<AccessRule>,
}

impl AuthzEngine {
    /// Builds the rule table for `actor`.
    pub fn for_actor(actor: Actor) -> Self {
        let rules = build_rule_table(&actor);
        Self { actor, rules }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// The rule table in declaration order.
    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Returns true when the actor may perform `action` on `subject`.
    ///
    /// `subject` is either a [`ResourceKind`] for a class-level check or a
    /// `&Resource` for a check against a concrete record.
    pub fn can<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> bool {
        let subject = subject.into();
        let allowed = match self.decisive_rule(action, subject) {
            Some(rule) => rule.effect == Effect::Grant,
            None => false,
        };

        debug!(
            "AUTHZ: {} {} on {} for user {}",
            if allowed { "allow" } else { "deny" },
            action,
            subject.kind(),
            self.actor.id
        );

        allowed
    }

    /// The negation of [`AuthzEngine::can`].
    pub fn cannot<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> bool {
        !self.can(action, subject)
    }

    /// Class-level check by name, as received from the CLI or a query string.
    ///
    /// Unknown action or resource names are denied.
    pub fn can_named(&self, action: &str, resource: &str) -> bool {
        match (action.parse::<Action>(), resource.parse::<ResourceKind>()) {
            (Ok(action), Ok(kind)) => self.can(action, kind),
            (Err(e), _) | (_, Err(e)) => {
                debug!("AUTHZ: denying unparseable query: {}", e);
                false
            }
        }
    }

    /// The rule that decides the query, if any.
    ///
    /// Scans from the last declared rule to the first.
    pub fn decisive_rule(&self, action: Action, subject: Subject<'_>) -> Option<&AccessRule> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(action, subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use types::Resource;

    const ACCOUNT: &str = "acct";
    const USER: &str = "u1";

    fn engine(role: Option<Role>) -> AuthzEngine {
        AuthzEngine::for_actor(Actor::new(USER, ACCOUNT, role))
    }

    /// Every role, plus no role at all, can read and manage its own profile.
    #[rstest]
    fn test_own_profile_is_always_manageable(
        #[values(
            None,
            Some(Role::Admin),
            Some(Role::Editor),
            Some(Role::Member),
            Some(Role::Agent),
            Some(Role::Viewer)
        )]
        role: Option<Role>,
    ) {
        let engine = engine(role);
        let me = Resource::user(USER, ACCOUNT);
        for action in [Action::Read, Action::Update, Action::Manage, Action::Destroy] {
            assert!(engine.can(action, &me), "{:?} should {} own user", role, action);
        }
    }

    #[rstest]
    #[case(Role::Editor)]
    #[case(Role::Member)]
    #[case(Role::Agent)]
    #[case(Role::Viewer)]
    fn test_non_admins_cannot_touch_other_users(#[case] role: Role) {
        let engine = engine(Some(role));
        let colleague = Resource::user("u2", ACCOUNT);
        assert!(engine.cannot(Action::Read, &colleague));
        assert!(engine.cannot(Action::Update, &colleague));
    }

    #[test]
    fn test_roleless_user_reads_colleagues() {
        let engine = engine(None);
        assert!(engine.can(Action::Read, &Resource::user("u2", ACCOUNT)));
        assert!(engine.cannot(Action::Update, &Resource::user("u2", ACCOUNT)));
        assert!(engine.cannot(Action::Read, &Resource::user("u3", "elsewhere")));
        assert!(engine.cannot(Action::Read, &Resource::template("t1", ACCOUNT)));
    }

    #[test]
    fn test_admin_manages_everything() {
        let engine = engine(Some(Role::Admin));
        for kind in types::ResourceKind::ALL {
            for action in Action::ALL {
                assert!(engine.can(action, kind), "admin should {} {}", action, kind);
            }
        }
        assert!(engine.can(Action::Destroy, &Resource::template("t9", "other-account")));
    }

    #[test]
    fn test_viewer_denied_create_template_by_default() {
        let engine = engine(Some(Role::Viewer));
        assert!(engine.cannot(Action::Create, ResourceKind::Template));
        assert!(engine.cannot(Action::New, ResourceKind::Template));
        assert!(engine.cannot(Action::Create, &Resource::template("t1", ACCOUNT)));
    }

    #[test]
    fn test_viewer_reads_but_never_writes_documents() {
        let engine = engine(Some(Role::Viewer));
        let template = Resource::template("t1", ACCOUNT);
        let submission = Resource::submission("s1", ACCOUNT, USER);
        let folder = Resource::template_folder("f1", ACCOUNT);

        assert!(engine.can(Action::Read, &template));
        assert!(engine.can(Action::Show, &submission));
        assert!(engine.can(Action::Index, &folder));

        assert!(engine.cannot(Action::Update, &template));
        assert!(engine.cannot(Action::Clone, &template));
        assert!(engine.cannot(Action::Update, &submission));
        assert!(engine.cannot(Action::Create, &folder));
        assert!(engine.cannot(Action::Update, &folder));
        assert!(engine.cannot(Action::Manage, &Resource::submitter("x", ACCOUNT, USER)));
        assert!(engine.cannot(Action::Read, &Resource::template("t2", "other")));
    }

    #[test]
    fn test_member_creates_but_cannot_rename_folders() {
        let engine = engine(Some(Role::Member));
        let folder = Resource::template_folder("f1", ACCOUNT);

        assert!(engine.can(Action::Create, &folder));
        assert!(engine.can(Action::Read, &folder));
        assert!(engine.cannot(Action::Update, &folder));
        assert!(engine.cannot(Action::Edit, &folder));
    }

    #[test]
    fn test_member_manages_only_own_submissions() {
        let engine = engine(Some(Role::Member));
        let own = Resource::submission("s1", ACCOUNT, USER);
        let colleagues = Resource::submission("s2", ACCOUNT, "u2");

        assert!(engine.can(Action::Destroy, &own));
        assert!(engine.can(Action::Read, &colleagues));
        assert!(engine.cannot(Action::Destroy, &colleagues));
        assert!(engine.can(Action::Create, &Resource::new(ResourceKind::Submission).in_account(ACCOUNT)));
        assert!(engine.can(Action::Update, &Resource::submitter("x", ACCOUNT, USER)));
        assert!(engine.cannot(Action::Update, &Resource::submitter("y", ACCOUNT, "u2")));
        assert!(engine.can(Action::Clone, &Resource::template("t1", ACCOUNT)));
        assert!(engine.cannot(Action::Update, &Resource::template("t1", ACCOUNT)));
    }

    #[test]
    fn test_editor_manages_account_documents_not_administration() {
        let engine = engine(Some(Role::Editor));

        assert!(engine.can(Action::Update, &Resource::template_folder("f1", ACCOUNT)));
        assert!(engine.can(Action::Destroy, &Resource::template("t1", ACCOUNT)));
        assert!(engine.can(Action::Destroy, &Resource::submission("s1", ACCOUNT, "u2")));
        assert!(engine.cannot(Action::Destroy, &Resource::template("t1", "other")));

        assert!(engine.cannot(Action::Access, ResourceKind::Settings));
        assert!(engine.cannot(Action::Update, ResourceKind::Account));
        assert!(engine.cannot(Action::Read, ResourceKind::EncryptedConfig));
    }

    #[test]
    fn test_agent_templates_are_read_only() {
        let engine = engine(Some(Role::Agent));
        let template = Resource::template("t1", ACCOUNT);

        assert!(engine.can(Action::Read, &template));
        assert!(engine.cannot(Action::Update, &template));
        assert!(engine.cannot(Action::Clone, &template));
        assert!(engine.cannot(Action::Create, &Resource::template_folder("f1", ACCOUNT)));
        assert!(engine.can(Action::Read, &Resource::template_folder("f1", ACCOUNT)));
        assert!(engine.can(Action::Manage, &Resource::submission("s1", ACCOUNT, USER)));
        assert!(engine.cannot(Action::Read, &Resource::submission("s2", ACCOUNT, "u2")));
    }

    #[rstest]
    #[case(Role::Editor, true)]
    #[case(Role::Member, true)]
    #[case(Role::Agent, true)]
    #[case(Role::Viewer, false)]
    fn test_own_user_config(#[case] role: Role, #[case] allowed: bool) {
        let engine = engine(Some(role));
        assert_eq!(engine.can(Action::Update, &Resource::user_config("c1", USER)), allowed);
        assert!(engine.cannot(Action::Update, &Resource::user_config("c2", "u2")));
    }

    #[test]
    fn test_class_level_checks_skip_scoped_rules() {
        // All document grants are account-scoped, so without an instance they
        // cannot match.
        let engine = engine(Some(Role::Editor));
        assert!(engine.cannot(Action::Read, ResourceKind::Template));
        assert!(engine.decisive_rule(Action::Read, ResourceKind::Template.into()).is_none());
    }

    #[test]
    fn test_decisive_rule_is_the_last_match() {
        let engine = engine(Some(Role::Member));
        let folder = Resource::template_folder("f1", ACCOUNT);
        let rule = engine
            .decisive_rule(Action::Update, (&folder).into())
            .unwrap();
        assert_eq!(rule.effect, Effect::Revoke);
        assert!(!rule.is_scoped());
    }

    #[test]
    fn test_can_named_denies_unknown_names() {
        let engine = engine(Some(Role::Admin));
        assert!(engine.can_named("access", "settings"));
        assert!(!engine.can_named("access", "widgets"));
        assert!(!engine.can_named("publish", "template"));
    }

    #[test]
    fn test_rules_are_rebuilt_per_engine() {
        let first = engine(Some(Role::Member));
        let second = engine(Some(Role::Member));
        assert_eq!(first.rules(), second.rules());
        assert_eq!(first.actor().role, Some(Role::Member));
    }
}
