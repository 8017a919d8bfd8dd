//! Attribute schemas
//!
//! Every managed kind declares its attributes here: type, cardinality,
//! defaults, validators and diff-suppression rules. The same declarations
//! drive validation, planning and the manifest handed to the host.
//!
//! # Module Structure
//!
//! - [`value`] - The tagged attribute tree
//! - [`data`] - Read/write view over one instance
//! - [`validate`] - Defaults and config validation
//! - [`diff`] - Plan-time diff with suppression and force-new

pub mod data;
pub mod diff;
pub mod validate;
pub mod value;

pub use data::ResourceData;
pub use diff::{plan, PlanResult};
pub use validate::{apply_defaults, validate};
pub use value::{AttributeMap, AttributeValue};

use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Validator returning violation messages (empty means valid)
pub type ValidateFn = fn(&AttributeValue) -> Vec<String>;

/// Tells the host to ignore an apparent change of `key` from `old` to `new`
pub type DiffSuppressFn =
    fn(key: &str, old: &AttributeValue, new: &AttributeValue, proposed: &AttributeMap) -> bool;

/// Attribute types
#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    Float,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Object(Schema),
}

impl AttributeType {
    fn describe(&self) -> Value {
        match self {
            Self::String => json!("string"),
            Self::Int => json!("int"),
            Self::Bool => json!("bool"),
            Self::Float => json!("float"),
            Self::List(elem) => json!({ "list": elem.describe() }),
            Self::Set(elem) => json!({ "set": elem.describe() }),
            Self::Object(schema) => json!({ "block": schema.describe() }),
        }
    }

    /// Sub-schema of a block-typed sequence
    pub fn block_schema(&self) -> Option<&Schema> {
        match self {
            Self::List(elem) | Self::Set(elem) => match elem.as_ref() {
                Self::Object(schema) => Some(schema),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Declaration of one attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub ty: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<AttributeValue>,
    pub validator: Option<ValidateFn>,
    pub diff_suppress: Option<DiffSuppressFn>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub description: &'static str,
}

impl Attribute {
    fn of(ty: AttributeType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            validator: None,
            diff_suppress: None,
            min_items: None,
            max_items: None,
            description: "",
        }
    }

    pub fn string() -> Self {
        Self::of(AttributeType::String)
    }

    pub fn int() -> Self {
        Self::of(AttributeType::Int)
    }

    pub fn bool() -> Self {
        Self::of(AttributeType::Bool)
    }

    pub fn float() -> Self {
        Self::of(AttributeType::Float)
    }

    pub fn list_of(elem: AttributeType) -> Self {
        Self::of(AttributeType::List(Box::new(elem)))
    }

    pub fn set_of(elem: AttributeType) -> Self {
        Self::of(AttributeType::Set(Box::new(elem)))
    }

    /// Ordered sequence of sub-blocks
    pub fn block(schema: Schema) -> Self {
        Self::list_of(AttributeType::Object(schema))
    }

    /// Sub-block represented as a one-element sequence
    pub fn single_block(schema: Schema) -> Self {
        Self::block(schema).max_items(1)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<AttributeValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate(mut self, f: ValidateFn) -> Self {
        self.validator = Some(f);
        self
    }

    pub fn suppress_diff(mut self, f: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(f);
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn describe(mut self, text: &'static str) -> Self {
        self.description = text;
        self
    }

    /// Computed-only attributes are never taken from configuration
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// Exactly one of required/optional, or computed alone
    fn is_well_formed(&self) -> bool {
        let cardinality = match (self.required, self.optional, self.computed) {
            (true, false, false) => true,
            (false, true, _) => true,
            (false, false, true) => true,
            _ => false,
        };
        let nested = match self.ty.block_schema() {
            Some(schema) => schema.check().is_ok(),
            None => true,
        };
        cardinality && nested && !(self.required && self.default.is_some())
    }

    fn to_manifest(&self) -> Value {
        let mut out = json!({
            "type": self.ty.describe(),
            "required": self.required,
            "optional": self.optional,
            "computed": self.computed,
        });
        if let Value::Object(map) = &mut out {
            if self.force_new {
                map.insert("force_new".into(), json!(true));
            }
            if self.sensitive {
                map.insert("sensitive".into(), json!(true));
            }
            if let Some(default) = &self.default {
                map.insert("default".into(), json!(default));
            }
            if let Some(n) = self.min_items {
                map.insert("min_items".into(), json!(n));
            }
            if let Some(n) = self.max_items {
                map.insert("max_items".into(), json!(n));
            }
            if !self.description.is_empty() {
                map.insert("description".into(), json!(self.description));
            }
        }
        out
    }
}

/// Mapping from attribute name to declaration
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    /// Schema of a top-level resource or data source; carries the computed `id`
    pub fn new() -> Self {
        Self::nested().attr("id", Attribute::string().computed())
    }

    /// Schema of a sub-block (no `id`)
    pub fn nested() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    /// Verify every declaration is well-formed; returns the offending names
    pub fn check(&self) -> Result<(), Vec<&'static str>> {
        let bad: Vec<_> = self
            .iter()
            .filter(|(_, a)| !a.is_well_formed())
            .map(|(name, _)| name)
            .collect();
        if bad.is_empty() {
            Ok(())
        } else {
            Err(bad)
        }
    }

    /// Manifest form handed to the host
    pub fn describe(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(name, attr)| (name.to_string(), attr.to_manifest()))
                .collect(),
        )
    }
}
