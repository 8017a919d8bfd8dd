//! IAM policy resource
//!
//! A policy is keyed by the URL of the resource it guards. The instance id
//! is that URL. Each `binding` grants one role to one group or user.

use crate::attrs;
use crate::error::{ProviderError, Result};
use crate::oasis::iam::{Policy, RoleBinding, RoleBindingsRequest};
use crate::resource::{Resource, Session};
use crate::schema::data::BlockExt;
use crate::schema::{Attribute, AttributeMap, AttributeType, AttributeValue, ResourceData, Schema};
use async_trait::async_trait;

pub struct IamPolicyResource;

fn binding_schema() -> Schema {
    Schema::nested()
        .attr("role", Attribute::string().required().describe("Role id"))
        .attr("group", Attribute::string().optional().describe("Group id"))
        .attr("user", Attribute::string().optional().describe("User id"))
}

pub fn schema() -> Schema {
    Schema::new()
        .attr(
            "url",
            Attribute::string()
                .required()
                .force_new()
                .describe("URL of the resource the policy applies to"),
        )
        .attr(
            "binding",
            Attribute::list_of(AttributeType::Object(binding_schema())).optional(),
        )
}

/// Role bindings of a `binding` sequence
pub fn expand_bindings(items: &[AttributeValue]) -> Result<Vec<RoleBinding>> {
    items
        .iter()
        .filter_map(AttributeValue::as_block)
        .map(|binding| {
            let role = binding.str_of("role");
            if role.is_empty() {
                return Err(ProviderError::missing("binding.role"));
            }
            match (binding.str_of("group"), binding.str_of("user")) {
                (group, _) if !group.is_empty() => Ok(RoleBinding::group(role, group)),
                (_, user) if !user.is_empty() => Ok(RoleBinding::user(role, user)),
                _ => Err(ProviderError::malformed(
                    "binding",
                    format!("binding for role {role} needs a group or a user"),
                )),
            }
        })
        .collect()
}

pub fn expand_policy(data: &ResourceData) -> Result<RoleBindingsRequest> {
    Ok(RoleBindingsRequest {
        resource_url: data.require_str("url")?.to_string(),
        bindings: expand_bindings(data.get_list("binding"))?,
    })
}

fn flatten_binding(binding: &RoleBinding) -> AttributeValue {
    let mut values = attrs! { "role" => &binding.role_id };
    if let Some(group) = binding.member_id.strip_prefix(RoleBinding::GROUP_PREFIX) {
        values.insert("group".into(), group.into());
    } else if let Some(user) = binding.member_id.strip_prefix(RoleBinding::USER_PREFIX) {
        values.insert("user".into(), user.into());
    }
    AttributeValue::Block(values)
}

/// One `binding` element per remote binding
pub fn flatten_policy(policy: &Policy) -> AttributeMap {
    attrs! {
        "url" => &policy.resource_url,
        "binding" => policy.bindings.iter().map(flatten_binding).collect::<Vec<_>>(),
    }
}

/// Bindings in `from` that are missing in `to`
fn difference(from: &[RoleBinding], to: &[RoleBinding]) -> Vec<RoleBinding> {
    from.iter().filter(|b| !to.contains(b)).cloned().collect()
}

#[async_trait]
impl Resource for IamPolicyResource {
    fn kind(&self) -> &'static str {
        "oasis_iam_policy"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let request = expand_policy(data)?;
        session.iam().add_role_bindings(&request).await?;
        data.set_id(&request.resource_url);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let policy = session.iam().get_policy(data.id()).await?;
        data.set_all(flatten_policy(&policy));
        Ok(())
    }

    async fn update(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        if !data.has_change("binding") {
            return Ok(());
        }
        let url = data.id().to_string();
        let old = expand_bindings(data.old("binding").as_list().unwrap_or(&[]))?;
        let new = expand_bindings(data.get_list("binding"))?;

        let removed = difference(&old, &new);
        if !removed.is_empty() {
            let request = RoleBindingsRequest {
                resource_url: url.clone(),
                bindings: removed,
            };
            session.iam().delete_role_bindings(&request).await?;
        }
        let added = difference(&new, &old);
        if !added.is_empty() {
            let request = RoleBindingsRequest {
                resource_url: url,
                bindings: added,
            };
            session.iam().add_role_bindings(&request).await?;
        }
        Ok(())
    }

    /// The host drops the entry; bindings stay on the remote resource
    async fn delete(&self, _session: &Session, data: &mut ResourceData) -> Result<()> {
        tracing::debug!("Forgetting IAM policy {}", data.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(role: &str, key: &str, member: &str) -> AttributeValue {
        AttributeValue::Block(attrs! { "role" => role, key => member })
    }

    #[test]
    fn test_expand_policy() {
        let data = ResourceData::new(attrs! {
            "url" => "/Organization/X",
            "binding" => vec![binding("test-role", "group", "321370957")],
        });
        let request = expand_policy(&data).unwrap();
        assert_eq!(request.resource_url, "/Organization/X");
        assert_eq!(
            request.bindings,
            vec![RoleBinding {
                role_id: "test-role".into(),
                member_id: "group:321370957".into(),
            }]
        );
    }

    #[test]
    fn test_round_trip_keeps_every_binding() {
        let data = ResourceData::new(attrs! {
            "url" => "/Organization/X",
            "binding" => vec![
                binding("viewer", "group", "g-1"),
                binding("editor", "user", "u-1"),
            ],
        });
        let request = expand_policy(&data).unwrap();
        let policy = Policy {
            resource_url: request.resource_url,
            bindings: request.bindings,
        };
        assert_eq!(&flatten_policy(&policy), data.state());
    }

    #[test]
    fn test_binding_without_member() {
        let data = ResourceData::new(attrs! {
            "url" => "/Organization/X",
            "binding" => vec![AttributeValue::Block(attrs! { "role" => "viewer" })],
        });
        let err = expand_policy(&data).unwrap_err();
        assert!(err.to_string().contains("needs a group or a user"));
    }

    #[test]
    fn test_binding_difference() {
        let old = vec![RoleBinding::group("viewer", "g-1"), RoleBinding::user("editor", "u-1")];
        let new = vec![RoleBinding::group("viewer", "g-1"), RoleBinding::user("admin", "u-2")];
        assert_eq!(difference(&old, &new), vec![RoleBinding::user("editor", "u-1")]);
        assert_eq!(difference(&new, &old), vec![RoleBinding::user("admin", "u-2")]);
    }

    #[test]
    fn test_missing_url() {
        let data = ResourceData::new(attrs! { "binding" => Vec::<AttributeValue>::new() });
        assert!(expand_policy(&data).unwrap_err().to_string().contains("url"));
    }
}
