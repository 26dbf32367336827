//! WPF0060: backing members of registrations carry documentation.

use crate::analysis::syntax;
use crate::detect::backing;
use crate::detect::model::RegistrationKind;
use crate::detect::types::{Finding, Rule};

use super::NodeContext;

pub fn check(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let Some(registration) = cx.registration.as_ref() else {
        return;
    };
    if registration.kind() == RegistrationKind::OverrideMetadata {
        return;
    }
    let (Some(source_backing), Some(registered_name)) =
        (registration.backing.as_ref(), registration.record.registered_name.as_ref())
    else {
        return;
    };

    let storage = source_backing.node;
    let declaration = if storage.kind() == "variable_declarator" {
        match storage.parent().and_then(|d| d.parent()) {
            Some(field) => field,
            None => return,
        }
    } else {
        storage
    };
    let Some(src) = cx.model.source_of(declaration) else {
        return;
    };
    if syntax::has_documentation(declaration, src) {
        return;
    }

    let anchor = backing::name_node(storage).unwrap_or(storage);
    out.push(
        cx.finding(
            Rule::MissingDocumentation,
            anchor,
            vec![source_backing.member.name.clone(), registered_name.clone()],
        )
        .with_context(registration.context()),
    );
}
