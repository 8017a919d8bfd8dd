//! Defaults and configuration validation

use super::value::{AttributeMap, AttributeValue};
use super::{Attribute, AttributeType, Schema};
use crate::error::ProviderError;

/// Fill absent optional attributes with their declared defaults, descending into blocks
pub fn apply_defaults(schema: &Schema, values: &mut AttributeMap) {
    for (name, attr) in schema.iter() {
        let present = values.get(name).is_some_and(|v| !v.is_null());
        if !present {
            if let Some(default) = &attr.default {
                values.insert(name.to_string(), default.clone());
            }
            continue;
        }
        if let (Some(sub), Some(AttributeValue::List(items))) =
            (attr.ty.block_schema(), values.get_mut(name))
        {
            for item in items.iter_mut() {
                if let AttributeValue::Block(map) = item {
                    apply_defaults(sub, map);
                }
            }
        }
    }
}

/// Check `values` against `schema`; every violation is *Malformed* naming the attribute path
pub fn validate(schema: &Schema, values: &AttributeMap) -> Vec<ProviderError> {
    let mut errors = Vec::new();
    validate_into(schema, values, "", &mut errors);
    errors
}

fn validate_into(schema: &Schema, values: &AttributeMap, prefix: &str, errors: &mut Vec<ProviderError>) {
    for (name, attr) in schema.iter() {
        let path = format!("{prefix}{name}");
        match values.get(name).filter(|v| !v.is_null()) {
            None if attr.required => errors.push(ProviderError::missing(&path)),
            None => {}
            Some(value) => check_value(attr, value, &path, errors),
        }
    }
}

fn check_value(attr: &Attribute, value: &AttributeValue, path: &str, errors: &mut Vec<ProviderError>) {
    if let Err(message) = check_type(&attr.ty, value, path, errors) {
        errors.push(ProviderError::malformed(path, message));
        return;
    }

    if let Some(items) = value.as_list() {
        if let Some(min) = attr.min_items {
            if items.len() < min {
                errors.push(ProviderError::malformed(
                    path,
                    format!("attribute requires at least {min} item(s), got {}", items.len()),
                ));
            }
        }
        if let Some(max) = attr.max_items {
            if items.len() > max {
                errors.push(ProviderError::malformed(
                    path,
                    format!("attribute allows at most {max} item(s), got {}", items.len()),
                ));
            }
        }
    }

    if let Some(validator) = attr.validator {
        for message in validator(value) {
            errors.push(ProviderError::malformed(path, message));
        }
    }
}

fn check_type(
    ty: &AttributeType,
    value: &AttributeValue,
    path: &str,
    errors: &mut Vec<ProviderError>,
) -> Result<(), String> {
    let ok = match (ty, value) {
        (AttributeType::String, AttributeValue::String(_)) => true,
        (AttributeType::Int, v) => v.as_int().is_some(),
        (AttributeType::Float, v) => v.as_float().is_some(),
        (AttributeType::Bool, AttributeValue::Bool(_)) => true,
        (AttributeType::List(elem) | AttributeType::Set(elem), AttributeValue::List(items)) => {
            for (idx, item) in items.iter().enumerate() {
                let item_path = format!("{path}.{idx}");
                match (elem.as_ref(), item) {
                    (AttributeType::Object(sub), AttributeValue::Block(map)) => {
                        validate_into(sub, map, &format!("{item_path}."), errors);
                    }
                    (elem, item) => {
                        if let Err(message) = check_type(elem, item, &item_path, errors) {
                            errors.push(ProviderError::malformed(&item_path, message));
                        }
                    }
                }
            }
            true
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(format!("unexpected value of type {}", value.type_name()))
    }
}
