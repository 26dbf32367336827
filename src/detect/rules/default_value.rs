//! WPF0010: the default value must convert to the registered type.

use crate::analysis::{syntax, Symbol};
use crate::catalog::DEPENDENCY_PROPERTY;

use super::NodeContext;
use crate::detect::types::{Finding, Rule};

pub fn check(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let Some(registration) = cx.registration.as_ref() else {
        return;
    };
    let (Some(metadata), Some(value_type)) = (registration.metadata.as_ref(), registration.record.value_type.as_ref())
    else {
        return;
    };
    let Some(default) = metadata.default_value else {
        return;
    };
    let model = cx.model;

    // `DependencyProperty.UnsetValue` and other object-typed values are
    // checked at run time.
    if let Some(Symbol::Known(member)) = model.resolve(default) {
        if member.owner == DEPENDENCY_PROPERTY && member.name == "UnsetValue" {
            return;
        }
    }
    if syntax::unparenthesize(default).kind() != "null_literal"
        && model.type_of(default).map(|t| t.is_object()).unwrap_or(false)
    {
        return;
    }

    if model.converts_expression(default, value_type) == Some(false) {
        let finding = cx
            .finding(
                Rule::DefaultValueType,
                default,
                vec![
                    registration.record.backing.public_name().to_string(),
                    value_type.to_string(),
                ],
            )
            .with_context(registration.context());
        out.push(finding);
    }
}
