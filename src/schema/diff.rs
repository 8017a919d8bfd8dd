//! Plan-time diff

use super::value::{AttributeMap, AttributeValue};
use super::Schema;

/// Planned state plus the attributes whose change forces replacement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanResult {
    pub planned_state: AttributeMap,
    pub requires_replace: Vec<String>,
}

impl PlanResult {
    pub fn requires_replace(&self) -> bool {
        !self.requires_replace.is_empty()
    }
}

/// Compute the planned state for `proposed` given the `prior` state
///
/// Computed attributes the configuration leaves unset keep their prior
/// value, as do attributes whose diff is suppressed. An unset attribute
/// whose prior value is the zero value is unchanged. Block sequences whose
/// element count is unchanged are planned element by element, so computed
/// attributes inside a block carry over too.
pub fn plan(schema: &Schema, prior: Option<&AttributeMap>, proposed: &AttributeMap) -> PlanResult {
    let mut requires_replace = Vec::new();
    let planned = plan_map(schema, prior, proposed, prior.is_some(), "", &mut requires_replace);
    PlanResult {
        planned_state: planned,
        requires_replace,
    }
}

fn plan_map(
    schema: &Schema,
    prior: Option<&AttributeMap>,
    proposed: &AttributeMap,
    updating: bool,
    prefix: &str,
    requires_replace: &mut Vec<String>,
) -> AttributeMap {
    let null = AttributeValue::Null;
    let mut planned = AttributeMap::new();

    for (name, attr) in schema.iter() {
        let path = format!("{prefix}{name}");
        let old = prior.and_then(|p| p.get(name)).filter(|v| !v.is_null());
        let new = proposed.get(name).filter(|v| !v.is_null());

        let suppressed = match (attr.diff_suppress, old) {
            (Some(suppress), Some(old)) => suppress(name, old, new.unwrap_or(&null), proposed),
            _ => false,
        };

        let unset = new.is_none() && (attr.computed || old.is_some_and(AttributeValue::is_zero));
        let value = if suppressed || unset {
            old.cloned()
        } else {
            match (attr.ty.block_schema(), old, new) {
                (Some(sub), Some(old), Some(new)) => {
                    Some(plan_blocks(sub, old, new, updating, &path, requires_replace))
                }
                _ => new.cloned(),
            }
        };

        if updating && attr.force_new && !attr.is_read_only() && value.as_ref() != old {
            requires_replace.push(path);
        }

        if let Some(value) = value {
            planned.insert(name.to_string(), value);
        }
    }

    planned
}

/// Plan each element of a block sequence against its prior counterpart
fn plan_blocks(
    schema: &Schema,
    old: &AttributeValue,
    new: &AttributeValue,
    updating: bool,
    path: &str,
    requires_replace: &mut Vec<String>,
) -> AttributeValue {
    let (Some(old_items), Some(new_items)) = (old.as_list(), new.as_list()) else {
        return new.clone();
    };
    if old_items.len() != new_items.len() {
        return new.clone();
    }
    let items = old_items
        .iter()
        .zip(new_items)
        .enumerate()
        .map(|(idx, (old_item, new_item))| match (old_item.as_block(), new_item.as_block()) {
            (Some(old_block), Some(new_block)) => AttributeValue::Block(plan_map(
                schema,
                Some(old_block),
                new_block,
                updating,
                &format!("{path}.{idx}."),
                requires_replace,
            )),
            _ => new_item.clone(),
        })
        .collect();
    AttributeValue::List(items)
}

/// Suppress changes to an empty string
pub fn suppress_empty_string(
    _key: &str,
    _old: &AttributeValue,
    new: &AttributeValue,
    _proposed: &AttributeMap,
) -> bool {
    new.as_str().is_some_and(str::is_empty)
}

/// Suppress changes to the zero value
pub fn suppress_zero(
    _key: &str,
    _old: &AttributeValue,
    new: &AttributeValue,
    _proposed: &AttributeMap,
) -> bool {
    new.is_zero()
}

/// A block present in state but dropped from configuration counts as unchanged
pub fn suppress_removed_block(
    _key: &str,
    old: &AttributeValue,
    new: &AttributeValue,
    _proposed: &AttributeMap,
) -> bool {
    !old.is_zero() && new.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::schema::Attribute;

    fn schema() -> Schema {
        Schema::new()
            .attr("name", Attribute::string().required())
            .attr("region", Attribute::string().required().force_new())
            .attr(
                "organization",
                Attribute::string()
                    .optional()
                    .computed()
                    .suppress_diff(suppress_empty_string),
            )
            .attr("created_at", Attribute::string().computed())
            .attr("description", Attribute::string().optional())
    }

    #[test]
    fn test_force_new_change_requires_replace() {
        let prior = attrs! { "id" => "1", "name" => "a", "region" => "r1" };
        let proposed = attrs! { "name" => "b", "region" => "r2" };
        let result = plan(&schema(), Some(&prior), &proposed);
        assert_eq!(result.requires_replace, vec!["region".to_string()]);
        assert_eq!(result.planned_state["name"].as_str(), Some("b"));
    }

    #[test]
    fn test_computed_values_are_kept() {
        let prior = attrs! { "id" => "1", "name" => "a", "region" => "r", "created_at" => "2022-01-01T00:00:00Z" };
        let proposed = attrs! { "name" => "a", "region" => "r" };
        let result = plan(&schema(), Some(&prior), &proposed);
        assert_eq!(result.planned_state["id"].as_str(), Some("1"));
        assert_eq!(
            result.planned_state["created_at"].as_str(),
            Some("2022-01-01T00:00:00Z")
        );
        assert!(!result.requires_replace());
    }

    #[test]
    fn test_empty_string_is_suppressed() {
        let prior = attrs! { "name" => "a", "region" => "r", "organization" => "org-1" };
        let proposed = attrs! { "name" => "a", "region" => "r", "organization" => "" };
        let result = plan(&schema(), Some(&prior), &proposed);
        assert_eq!(result.planned_state["organization"].as_str(), Some("org-1"));
    }

    #[test]
    fn test_create_never_requires_replace() {
        let proposed = attrs! { "name" => "a", "region" => "r" };
        let result = plan(&schema(), None, &proposed);
        assert!(!result.requires_replace());
    }

    fn blocky_schema() -> Schema {
        let inner = Schema::nested()
            .attr("model", Attribute::string().optional())
            .attr("size", Attribute::string().optional().computed())
            .attr(
                "label",
                Attribute::string().optional().suppress_diff(suppress_empty_string),
            )
            .attr("zone", Attribute::string().optional().force_new());
        Schema::new().attr("configuration", Attribute::block(inner).required())
    }

    #[test]
    fn test_nested_computed_values_are_kept() {
        let prior = attrs! {
            "id" => "1",
            "configuration" => AttributeValue::single_block(attrs! {
                "model" => "oneshard",
                "size" => "c4-a8",
                "label" => "primary",
            }),
        };
        let proposed = attrs! {
            "configuration" => AttributeValue::single_block(attrs! { "model" => "oneshard", "label" => "" }),
        };
        let result = plan(&blocky_schema(), Some(&prior), &proposed);
        assert_eq!(result.planned_state, prior);
        assert!(!result.requires_replace());
    }

    #[test]
    fn test_nested_force_new_is_reported_by_path() {
        let prior = attrs! {
            "configuration" => vec![
                AttributeValue::Block(attrs! { "model" => "a", "zone" => "z1" }),
                AttributeValue::Block(attrs! { "model" => "b", "zone" => "z1" }),
            ],
        };
        let proposed = attrs! {
            "configuration" => vec![
                AttributeValue::Block(attrs! { "model" => "a", "zone" => "z1" }),
                AttributeValue::Block(attrs! { "model" => "b", "zone" => "z2" }),
            ],
        };
        let result = plan(&blocky_schema(), Some(&prior), &proposed);
        assert_eq!(result.requires_replace, vec!["configuration.1.zone".to_string()]);
    }

    #[test]
    fn test_resized_block_sequence_takes_configuration() {
        let prior = attrs! {
            "configuration" => AttributeValue::single_block(attrs! { "model" => "a", "size" => "s" }),
        };
        let proposed = attrs! {
            "configuration" => vec![
                AttributeValue::Block(attrs! { "model" => "a" }),
                AttributeValue::Block(attrs! { "model" => "b" }),
            ],
        };
        let result = plan(&blocky_schema(), Some(&prior), &proposed);
        assert_eq!(result.planned_state["configuration"], proposed["configuration"]);
    }

    #[test]
    fn test_zero_prior_matches_unset() {
        let prior = attrs! { "name" => "a", "region" => "r", "description" => "" };
        let proposed = attrs! { "name" => "a", "region" => "r" };
        let result = plan(&schema(), Some(&prior), &proposed);
        assert_eq!(result.planned_state, prior);

        let prior = attrs! { "name" => "a", "region" => "r", "description" => "old" };
        let result = plan(&schema(), Some(&prior), &proposed);
        assert!(!result.planned_state.contains_key("description"));
    }

    #[test]
    fn test_removed_block_suppression() {
        let old = AttributeValue::single_block(attrs! { "projects" => vec!["p".to_string()] });
        assert!(suppress_removed_block("gcp", &old, &AttributeValue::Null, &attrs! {}));
        assert!(!suppress_removed_block("gcp", &AttributeValue::Null, &old, &attrs! {}));
    }
}
