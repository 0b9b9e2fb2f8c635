//! Builds an actor's rule table.
//!
//! The table always starts with the base rules every authenticated user gets,
//! followed by exactly one role-specific list. Each role's list is written out
//! by hand; none is derived from another. The engine scans the table from the
//! end, so within a list a later rule overrides an earlier one.
//!
//! Revocations of `manage User` are restricted to other users' records so that
//! self-management from the base rules survives in every role.

use crate::role::Role;
use crate::rule::{AccessRule, Condition, Target};
use crate::types::{Action, Actor, ResourceKind};

/// Builds the ordered rule table for `actor`.
///
/// An actor without a recognised role only gets the base rules.
pub fn build_rule_table(actor: &Actor) -> Vec<AccessRule> {
    let mut rules = base_rules(actor);

    if let Some(role) = actor.role {
        rules.extend(match role {
            Role::Admin => admin_rules(),
            Role::Editor => editor_rules(actor),
            Role::Member => member_rules(actor),
            Role::Agent => agent_rules(actor),
            Role::Viewer => viewer_rules(actor),
        });
    }

    rules
}

fn base_rules(actor: &Actor) -> Vec<AccessRule> {
    vec![
        AccessRule::grant(Action::Read, ResourceKind::User).when(same_account(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::User)
            .when(Condition::IdIs(actor.id.clone())),
    ]
}

fn admin_rules() -> Vec<AccessRule> {
    vec![AccessRule::grant(Action::Manage, Target::All)]
}

fn editor_rules(actor: &Actor) -> Vec<AccessRule> {
    let mut rules = vec![
        AccessRule::grant(Action::Manage, ResourceKind::Template).when(same_account(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::TemplateFolder).when(same_account(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::Submission).when(same_account(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::Submitter).when(same_account(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::UserConfig).when(own_config(actor)),
    ];
    rules.extend(account_administration_revokes(actor));
    rules
}

fn member_rules(actor: &Actor) -> Vec<AccessRule> {
    let mut rules = vec![
        AccessRule::grant(Action::Read, ResourceKind::Template).when(same_account(actor)),
        AccessRule::grant(Action::Read, ResourceKind::Submission).when(same_account(actor)),
        AccessRule::grant(Action::Read, ResourceKind::TemplateFolder).when(same_account(actor)),
        AccessRule::grant(Action::Create, ResourceKind::TemplateFolder).when(same_account(actor)),
        // Folders can be created but not renamed.
        AccessRule::revoke(Action::Update, ResourceKind::TemplateFolder),
        AccessRule::grant(Action::Manage, ResourceKind::Submission)
            .when(same_account(actor))
            .when(authored_by(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::Submitter)
            .when(same_account(actor))
            .when(authored_by(actor)),
        AccessRule::grant(Action::Create, ResourceKind::Submission).when(same_account(actor)),
        AccessRule::grant(Action::Clone, ResourceKind::Template).when(same_account(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::UserConfig).when(own_config(actor)),
    ];
    rules.extend(account_administration_revokes(actor));
    rules
}

fn agent_rules(actor: &Actor) -> Vec<AccessRule> {
    let mut rules = vec![
        // Declared before the read grant so templates stay readable.
        AccessRule::revoke(Action::Manage, ResourceKind::Template),
        AccessRule::grant(Action::Read, ResourceKind::Template).when(same_account(actor)),
        AccessRule::grant(Action::Read, ResourceKind::TemplateFolder).when(same_account(actor)),
        AccessRule::revoke(Action::Create, ResourceKind::TemplateFolder),
        AccessRule::revoke(Action::Update, ResourceKind::TemplateFolder),
        AccessRule::grant(Action::Manage, ResourceKind::Submission)
            .when(same_account(actor))
            .when(authored_by(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::Submitter)
            .when(same_account(actor))
            .when(authored_by(actor)),
        AccessRule::grant(Action::Create, ResourceKind::Submission).when(same_account(actor)),
        AccessRule::grant(Action::Manage, ResourceKind::UserConfig).when(own_config(actor)),
    ];
    rules.extend(account_administration_revokes(actor));
    rules
}

fn viewer_rules(actor: &Actor) -> Vec<AccessRule> {
    vec![
        AccessRule::revoke(Action::Create, ResourceKind::TemplateFolder),
        AccessRule::revoke(Action::Update, ResourceKind::TemplateFolder),
        AccessRule::revoke(Action::Create, ResourceKind::Template),
        AccessRule::revoke(Action::New, ResourceKind::Template),
        AccessRule::revoke(Action::Manage, ResourceKind::Template),
        AccessRule::revoke(Action::Create, ResourceKind::Submission),
        AccessRule::revoke(Action::Manage, ResourceKind::Submission),
        AccessRule::revoke(Action::Manage, ResourceKind::Submitter),
        AccessRule::revoke(Action::Manage, ResourceKind::UserConfig),
        AccessRule::revoke(Action::Manage, ResourceKind::EncryptedConfig),
        AccessRule::revoke(Action::Manage, ResourceKind::Account),
        AccessRule::revoke(Action::Manage, ResourceKind::User).when(other_user(actor)),
        AccessRule::revoke(Action::Access, ResourceKind::Settings),
        AccessRule::revoke(Action::Clone, ResourceKind::Template),
        // Reads come last so the blanket revokes above cannot hide documents.
        AccessRule::grant(Action::Read, ResourceKind::Template).when(same_account(actor)),
        AccessRule::grant(Action::Read, ResourceKind::Submission).when(same_account(actor)),
        AccessRule::grant(Action::Read, ResourceKind::TemplateFolder).when(same_account(actor)),
    ]
}

/// Shared tail of the editor, member and agent lists.
fn account_administration_revokes(actor: &Actor) -> Vec<AccessRule> {
    vec![
        AccessRule::revoke(Action::Manage, ResourceKind::Account),
        AccessRule::revoke(Action::Manage, ResourceKind::User).when(other_user(actor)),
        AccessRule::revoke(Action::Manage, ResourceKind::EncryptedConfig),
        AccessRule::revoke(Action::Access, ResourceKind::Settings),
    ]
}

fn same_account(actor: &Actor) -> Condition {
    Condition::AccountIs(actor.account_id.clone())
}

fn authored_by(actor: &Actor) -> Condition {
    Condition::AuthorIs(actor.id.clone())
}

fn own_config(actor: &Actor) -> Condition {
    Condition::UserIs(actor.id.clone())
}

fn other_user(actor: &Actor) -> Condition {
    Condition::IdIsNot(actor.id.clone())
}
