//! Read-only lookups
//!
//! Each data source issues one list or get call and fills a computed
//! attribute tree. Sources returning lists derive their id from the item
//! ids (see [`crate::helpers::hash_ids`]); aggregations without a natural
//! key use [`crate::helpers::unique_resource_id`].

mod backup;
mod cloud_provider;
mod current_user;
mod example_datasets;
mod notebook_model;
mod organization;
mod project;
mod region;
mod terms_and_conditions;

use crate::resource::DataSource;
use crate::schema::Attribute;

pub use backup::BackupDataSource;
pub use cloud_provider::CloudProviderDataSource;
pub use current_user::CurrentUserDataSource;
pub use example_datasets::ExampleDatasetsDataSource;
pub use notebook_model::NotebookModelDataSource;
pub use organization::{OrganizationDataSource, OrganizationsDataSource};
pub use project::ProjectDataSource;
pub use region::RegionDataSource;
pub use terms_and_conditions::TermsAndConditionsDataSource;

/// Every lookup the provider exposes
pub fn all() -> Vec<Box<dyn DataSource>> {
    vec![
        Box::new(CurrentUserDataSource),
        Box::new(OrganizationsDataSource),
        Box::new(OrganizationDataSource),
        Box::new(ProjectDataSource),
        Box::new(CloudProviderDataSource),
        Box::new(RegionDataSource),
        Box::new(NotebookModelDataSource),
        Box::new(ExampleDatasetsDataSource),
        Box::new(TermsAndConditionsDataSource),
        Box::new(BackupDataSource),
    ]
}

/// The `id` of a lookup addressed by id
pub(crate) fn lookup_id() -> Attribute {
    Attribute::string().required().describe("Identifier of the object to look up")
}
