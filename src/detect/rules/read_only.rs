//! WPF0035 / WPF0036: a read-only key needs a public dependency property
//! derived from it.

use crate::detect::model::ReadOnlyPairing;
use crate::detect::types::{Finding, Rule};

use super::NodeContext;

pub fn check(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let Some(registration) = cx.registration.as_ref() else {
        return;
    };
    if !registration.kind().is_read_only() {
        return;
    }
    let key = &registration.record.backing;

    match &key.pairing {
        Some(ReadOnlyPairing::Missing) => {
            let expected = match (key.name.strip_suffix("Key"), registration.record.registered_name.as_deref()) {
                (Some(stem), _) if stem.ends_with("Property") => stem.to_string(),
                (_, Some(name)) => format!("{}Property", name),
                (Some(stem), None) => stem.to_string(),
                (None, None) => return,
            };
            out.push(
                Finding::new(
                    Rule::ReadOnlyMissingPublicProperty,
                    key.file.clone(),
                    key.span,
                    vec![key.name.clone(), expected],
                )
                .with_context(registration.context()),
            );
        }
        Some(ReadOnlyPairing::Mismatched { member }) => {
            out.push(
                Finding::new(
                    Rule::ReadOnlyWrongDerivation,
                    member.file.clone(),
                    member.span,
                    vec![member.name.clone(), key.name.clone()],
                )
                .with_context(registration.context()),
            );
        }
        Some(ReadOnlyPairing::Paired { .. }) | None => {}
    }
}
