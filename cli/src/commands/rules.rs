use anyhow::{Context, Result};
use authz::types::{Action, Actor, Resource, ResourceKind, Subject};
use authz::{AuthzEngine, Effect, Role};
use clap::Args;
use colored::*;
use serde_json::json;

use crate::OutputFormat;

/// Identity of the actor the table is built for.
#[derive(Args, Debug)]
pub struct ActorArgs {
    #[arg(long, default_value = "actor")]
    pub actor_id: String,

    #[arg(long, default_value = "account")]
    pub actor_account: String,
}

/// Attributes of a concrete resource. Without any, the check is class-level.
#[derive(Args, Debug, Default)]
pub struct InstanceArgs {
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub account_id: Option<String>,

    #[arg(long)]
    pub author_id: Option<String>,

    #[arg(long)]
    pub user_id: Option<String>,
}

impl InstanceArgs {
    fn to_resource(&self, kind: ResourceKind) -> Option<Resource> {
        if self.id.is_none()
            && self.account_id.is_none()
            && self.author_id.is_none()
            && self.user_id.is_none()
        {
            return None;
        }

        Some(Resource {
            kind,
            id: self.id.clone(),
            account_id: self.account_id.clone(),
            author_id: self.author_id.clone(),
            user_id: self.user_id.clone(),
        })
    }
}

fn engine_for(role: Option<&str>, actor: &ActorArgs) -> Result<AuthzEngine> {
    let role = role
        .map(|name| name.parse::<Role>())
        .transpose()
        .context("Invalid role")?;
    Ok(AuthzEngine::for_actor(Actor::new(
        actor.actor_id.clone(),
        actor.actor_account.clone(),
        role,
    )))
}

fn effect_name(effect: Effect) -> &'static str {
    match effect {
        Effect::Grant => "grant",
        Effect::Revoke => "revoke",
    }
}

/// Print the rule table for `role`.
pub fn print_rules(role: Option<&str>, actor: &ActorArgs, format: OutputFormat) -> Result<()> {
    let engine = engine_for(role, actor)?;

    match format {
        OutputFormat::Json => {
            let rules: Vec<_> = engine
                .rules()
                .iter()
                .enumerate()
                .map(|(position, rule)| {
                    json!({
                        "position": position,
                        "rule": rule,
                        "description": rule.to_string(),
                    })
                })
                .collect();
            let output = json!({
                "role": role,
                "actor_id": actor.actor_id,
                "account_id": actor.actor_account,
                "rules": rules,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {}",
                "Rule table for role:".bold(),
                role.unwrap_or("(none)").cyan()
            );
            println!("{}", "Evaluated from the last rule to the first".dimmed());
            println!();
            for (position, rule) in engine.rules().iter().enumerate() {
                let effect = match rule.effect {
                    Effect::Grant => effect_name(rule.effect).green(),
                    Effect::Revoke => effect_name(rule.effect).red(),
                };
                println!("{:>3}  {:<6}  {}", position, effect, rule);
            }
        }
    }

    Ok(())
}

/// Evaluate one permission query and print the verdict.
pub fn check(
    role: Option<&str>,
    action: &str,
    resource: &str,
    actor: &ActorArgs,
    instance: &InstanceArgs,
    format: OutputFormat,
) -> Result<()> {
    let engine = engine_for(role, actor)?;
    let action: Action = action.parse().context("Invalid action")?;
    let kind: ResourceKind = resource.parse().context("Invalid resource")?;

    let target = instance.to_resource(kind);
    let subject = match &target {
        Some(resource) => Subject::Instance(resource),
        None => Subject::Kind(kind),
    };

    let allowed = engine.can(action, subject);
    let decided_by = engine.decisive_rule(action, subject).map(|r| r.to_string());

    match format {
        OutputFormat::Json => {
            let output = json!({
                "role": role,
                "action": action,
                "resource": kind,
                "instance": target,
                "allowed": allowed,
                "decided_by": decided_by,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            let verdict = if allowed {
                "ALLOWED".green().bold()
            } else {
                "DENIED".red().bold()
            };
            println!("{} {} {}", verdict, action, kind);
            match decided_by {
                Some(rule) => println!("  decided by: {}", rule),
                None => println!("  no rule matched"),
            }
        }
    }

    Ok(())
}
