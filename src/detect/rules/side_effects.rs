//! WPF0042: CLR accessors should hold nothing but the value-access call.
//!
//! Bindings and styles bypass the accessors, so any extra work there
//! runs only for code that goes through the CLR member.

use crate::analysis::syntax;
use crate::detect::types::{Finding, Rule};

use super::NodeContext;

pub fn check(cx: &NodeContext<'_, '_>, out: &mut Vec<Finding>) {
    let Some(registration) = cx.registration.as_ref() else {
        return;
    };
    let Some(accessors) = registration.accessors.as_ref() else {
        return;
    };

    let sides = [
        (accessors.get.as_ref(), accessors.pair.get.as_ref()),
        (accessors.set.as_ref(), accessors.pair.set.as_ref()),
    ];
    for (side, summary) in sides {
        let (Some(side), Some(summary)) = (side, summary) else {
            continue;
        };
        for statement in &side.impure {
            let anchor = if statement.kind() == "expression_statement" {
                syntax::named_children(*statement)
                    .into_iter()
                    .next()
                    .unwrap_or(*statement)
            } else {
                *statement
            };
            out.push(
                cx.finding(Rule::AccessorSideEffect, anchor, vec![summary.member.clone()])
                    .with_context(registration.context()),
            );
        }
    }
}
