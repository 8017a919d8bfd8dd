//! Read/write view over one instance's attributes

use super::value::{AttributeMap, AttributeValue};
use crate::error::{ProviderError, Result};

static NULL: AttributeValue = AttributeValue::Null;

/// Handle over the host's plan entry for one instance
///
/// `state` holds the working attributes (planned state during create and
/// update, current state during read). `prior` holds the state before the
/// operation and is what [`ResourceData::has_change`] compares against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    state: AttributeMap,
    prior: Option<AttributeMap>,
}

impl ResourceData {
    /// View for a new instance (no prior state)
    pub fn new(state: AttributeMap) -> Self {
        let id = state
            .get("id")
            .and_then(AttributeValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            id,
            state,
            prior: None,
        }
    }

    /// View over an existing instance
    pub fn existing(id: impl Into<String>, state: AttributeMap) -> Self {
        let mut data = Self::new(state);
        data.set_id(id);
        data
    }

    /// View for an update from `prior` to `planned`
    pub fn with_prior(id: impl Into<String>, prior: AttributeMap, planned: AttributeMap) -> Self {
        let mut data = Self::existing(id, planned);
        data.prior = Some(prior);
        data
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if id.is_empty() {
            self.clear_id();
            return;
        }
        self.state.insert("id".to_string(), AttributeValue::String(id.clone()));
        self.id = Some(id);
    }

    /// Signals the host to drop the plan entry
    pub fn clear_id(&mut self) {
        self.id = None;
        self.state.remove("id");
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.state.get(key).filter(|v| !v.is_null())
    }

    /// Value of `key` when set to something other than its zero value
    pub fn get_ok(&self, key: &str) -> Option<&AttributeValue> {
        self.get(key).filter(|v| !v.is_zero())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).and_then(AttributeValue::as_int).unwrap_or(0)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(AttributeValue::as_bool).unwrap_or(false)
    }

    pub fn get_list(&self, key: &str) -> &[AttributeValue] {
        self.get(key).and_then(AttributeValue::as_list).unwrap_or(&[])
    }

    /// First element of a `max_items = 1` sub-block
    pub fn get_block(&self, key: &str) -> Option<&AttributeMap> {
        self.get(key).and_then(AttributeValue::first_block)
    }

    /// Non-empty string attribute, or *Malformed*
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::missing(key))
    }

    /// Sub-block that must be present, or *Malformed*
    pub fn require_block(&self, key: &str) -> Result<&AttributeMap> {
        self.get_block(key).ok_or_else(|| ProviderError::missing(key))
    }

    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) {
        if key == "id" {
            let value = value.into();
            self.set_id(value.as_str().unwrap_or_default().to_string());
            return;
        }
        self.state.insert(key.to_string(), value.into());
    }

    /// Write every entry of a flattened record
    pub fn set_all(&mut self, values: AttributeMap) {
        for (key, value) in values {
            self.set(&key, value);
        }
    }

    /// Value before this operation
    pub fn old(&self, key: &str) -> &AttributeValue {
        self.prior
            .as_ref()
            .and_then(|p| p.get(key))
            .unwrap_or(&NULL)
    }

    /// Whether `key` differs from its prior value
    pub fn has_change(&self, key: &str) -> bool {
        let new = self.state.get(key).unwrap_or(&NULL);
        match &self.prior {
            Some(prior) => prior.get(key).unwrap_or(&NULL) != new,
            None => !new.is_null(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.prior.is_none()
    }

    pub fn state(&self) -> &AttributeMap {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AttributeMap {
        &mut self.state
    }

    pub fn into_state(self) -> AttributeMap {
        self.state
    }
}

/// Typed accessors over a nested block
pub trait BlockExt {
    fn str_of(&self, key: &str) -> &str;
    fn int_of(&self, key: &str) -> i64;
    fn bool_of(&self, key: &str) -> bool;
    fn list_of(&self, key: &str) -> &[AttributeValue];
    fn block_of(&self, key: &str) -> Option<&AttributeMap>;
    fn strings_of(&self, key: &str) -> Vec<String>;
}

impl BlockExt for AttributeMap {
    fn str_of(&self, key: &str) -> &str {
        self.get(key).and_then(AttributeValue::as_str).unwrap_or("")
    }

    fn int_of(&self, key: &str) -> i64 {
        self.get(key).and_then(AttributeValue::as_int).unwrap_or(0)
    }

    fn bool_of(&self, key: &str) -> bool {
        self.get(key).and_then(AttributeValue::as_bool).unwrap_or(false)
    }

    fn list_of(&self, key: &str) -> &[AttributeValue] {
        self.get(key).and_then(AttributeValue::as_list).unwrap_or(&[])
    }

    fn block_of(&self, key: &str) -> Option<&AttributeMap> {
        self.get(key).and_then(AttributeValue::first_block)
    }

    fn strings_of(&self, key: &str) -> Vec<String> {
        self.list_of(key)
            .iter()
            .filter_map(AttributeValue::as_str)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;

    #[test]
    fn test_has_change_against_prior() {
        let data = ResourceData::with_prior(
            "id-1",
            attrs! { "name" => "old", "locked" => false },
            attrs! { "name" => "new", "locked" => false },
        );
        assert!(data.has_change("name"));
        assert!(!data.has_change("locked"));
        assert!(!data.has_change("description"));
        assert_eq!(data.old("name").as_str(), Some("old"));
    }

    #[test]
    fn test_has_change_on_create() {
        let data = ResourceData::new(attrs! { "name" => "x" });
        assert!(data.has_change("name"));
        assert!(!data.has_change("description"));
        assert!(data.is_new());
    }

    #[test]
    fn test_id_is_mirrored_in_state() {
        let mut data = ResourceData::new(attrs! {});
        data.set_id("abc");
        assert_eq!(data.id(), "abc");
        assert_eq!(data.state()["id"].as_str(), Some("abc"));
        data.clear_id();
        assert!(!data.has_id());
        assert!(!data.state().contains_key("id"));
    }

    #[test]
    fn test_get_ok_skips_zero_values() {
        let data = ResourceData::new(attrs! { "days" => 0, "name" => "" });
        assert!(data.get("days").is_some());
        assert!(data.get_ok("days").is_none());
        assert!(data.get_ok("name").is_none());
    }

    #[test]
    fn test_require_str() {
        let data = ResourceData::new(attrs! { "name" => "" });
        let err = data.require_str("name").unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
