//! Organization invite resource

use crate::attrs;
use crate::error::Result;
use crate::helpers::{email_validator, timestamp_value};
use crate::oasis::resourcemanager::OrganizationInvite;
use crate::resource::{Resource, Session};
use crate::schema::{Attribute, AttributeMap, ResourceData, Schema};
use async_trait::async_trait;
use tracing::info;

pub struct OrganizationInviteResource;

pub fn schema() -> Schema {
    Schema::new()
        .attr("organization", Attribute::string().required().force_new())
        .attr(
            "email",
            Attribute::string()
                .required()
                .force_new()
                .validate(email_validator)
                .describe("Address the invite is sent to"),
        )
        .attr("accepted", Attribute::bool().computed())
        .attr("rejected", Attribute::bool().computed())
        .attr("created_by_id", Attribute::string().computed())
        .attr("created_at", Attribute::string().computed())
}

pub fn expand_invite(data: &ResourceData) -> Result<OrganizationInvite> {
    Ok(OrganizationInvite {
        organization_id: data.require_str("organization")?.to_string(),
        email: data.require_str("email")?.to_string(),
        ..Default::default()
    })
}

pub fn flatten_invite(invite: &OrganizationInvite) -> AttributeMap {
    attrs! {
        "organization" => &invite.organization_id,
        "email" => &invite.email,
        "accepted" => invite.accepted,
        "rejected" => invite.rejected,
        "created_by_id" => &invite.created_by_id,
        "created_at" => timestamp_value(invite.created_at.as_ref()),
    }
}

#[async_trait]
impl Resource for OrganizationInviteResource {
    fn kind(&self) -> &'static str {
        "oasis_organization_invite"
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let invite = expand_invite(data)?;
        let created = session
            .resource_manager()
            .create_organization_invite(&invite)
            .await?;
        info!("Invited {} to organization {}", invite.email, invite.organization_id);
        data.set_id(&created.id);
        Ok(())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let invite = session.resource_manager().get_organization_invite(data.id()).await?;
        data.set_all(flatten_invite(&invite));
        Ok(())
    }

    async fn delete(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        session.resource_manager().delete_organization_invite(data.id()).await
    }
}
