use crate::attrs;
use crate::error::Result;
use crate::helpers::timestamp_value;
use crate::oasis::iam::User;
use crate::resource::{DataSource, Session};
use crate::schema::{Attribute, AttributeMap, ResourceData, Schema};
use async_trait::async_trait;

/// The user owning the API key
pub struct CurrentUserDataSource;

pub fn flatten_user(user: &User) -> AttributeMap {
    attrs! {
        "name" => &user.name,
        "email" => &user.email,
        "created_at" => timestamp_value(user.created_at.as_ref()),
    }
}

#[async_trait]
impl DataSource for CurrentUserDataSource {
    fn kind(&self) -> &'static str {
        "oasis_current_user"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("name", Attribute::string().computed())
            .attr("email", Attribute::string().computed())
            .attr("created_at", Attribute::string().computed())
    }

    async fn read(&self, session: &Session, data: &mut ResourceData) -> Result<()> {
        let user = session.iam().get_this_user().await?;
        data.set_all(flatten_user(&user));
        data.set_id(&user.id);
        Ok(())
    }
}
