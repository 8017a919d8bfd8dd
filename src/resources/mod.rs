//! Managed resource controllers
//!
//! Each module owns one kind: its schema, the `expand_*` function turning
//! an attribute view into the remote record, the `flatten_*` function
//! turning the remote record back into attributes, and the [`Resource`]
//! implementation wiring both to the service stubs.

pub mod auditlog;
pub mod backup;
pub mod backup_policy;
pub mod certificate;
pub mod deployment;
pub mod example_installation;
pub mod iam_group;
pub mod iam_policy;
pub mod iam_role;
pub mod ipallowlist;
pub mod multi_region_backup;
pub mod notebook;
pub mod organization;
pub mod organization_invite;
pub mod private_endpoint;
pub mod project;

use crate::resource::Resource;
use crate::schema::{AttributeMap, ResourceData};

/// Every managed kind
pub fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(organization::OrganizationResource),
        Box::new(project::ProjectResource),
        Box::new(deployment::DeploymentResource),
        Box::new(backup::BackupResource),
        Box::new(backup_policy::BackupPolicyResource),
        Box::new(certificate::CertificateResource),
        Box::new(ipallowlist::IpAllowlistResource),
        Box::new(auditlog::AuditLogResource),
        Box::new(iam_group::IamGroupResource),
        Box::new(iam_role::IamRoleResource),
        Box::new(iam_policy::IamPolicyResource),
        Box::new(notebook::NotebookResource),
        Box::new(private_endpoint::PrivateEndpointResource),
        Box::new(multi_region_backup::MultiRegionBackupResource),
        Box::new(example_installation::ExampleInstallationResource),
        Box::new(organization_invite::OrganizationInviteResource),
    ]
}

/// Write `values` back, skipping keys the view does not already hold
///
/// Keys in `always` are written unconditionally. Keeps attributes the
/// user never set from showing up as zero-valued drift.
pub(crate) fn set_present(data: &mut ResourceData, values: AttributeMap, always: &[&str]) {
    for (key, value) in values {
        if always.contains(&key.as_str()) || data.get_ok(&key).is_some() {
            data.set(&key, value);
        }
    }
}
