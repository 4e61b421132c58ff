//! Condition compiler
//!
//! Walks an ordered condition list and its connector list, resolves each
//! condition to a leaf, and groups leaves into a boolean tree. Precedence
//! is fixed: AND binds tighter than OR, left to right, no parentheses.
//! `A AND B OR C AND D` partitions into `(A AND B) OR (C AND D)`.

use chrono::{DateTime, Utc};

use crate::auth::RequestContext;
use crate::error::FilterError;

use super::columns;
use super::placeholder;
use super::predicate::CompiledPredicate;
use super::types::{Connector, EntityKind, FilterCondition};

/// Compile conditions into a predicate tree, resolving relative dates
/// against the current wall clock
pub fn compile(
    conditions: &[FilterCondition],
    connectors: &[Connector],
    entity: EntityKind,
    ctx: &RequestContext,
) -> Result<CompiledPredicate, FilterError> {
    compile_at(conditions, connectors, entity, ctx, Utc::now())
}

/// Compile with an explicit resolution instant (deterministic entry point)
pub fn compile_at(
    conditions: &[FilterCondition],
    connectors: &[Connector],
    entity: EntityKind,
    ctx: &RequestContext,
    now: DateTime<Utc>,
) -> Result<CompiledPredicate, FilterError> {
    if connectors.len() != conditions.len().saturating_sub(1) {
        return Err(FilterError::ConnectorMismatch {
            conditions: conditions.len(),
            connectors: connectors.len(),
        });
    }

    // Resolve each condition to a leaf; empty leaves are dropped together
    // with their preceding connector so they neither fail an AND group nor
    // widen an OR group.
    let mut leaves: Vec<(Option<Connector>, CompiledPredicate)> = Vec::new();
    for (index, condition) in conditions.iter().enumerate() {
        let Some(resolved) = placeholder::resolve(&condition.value, ctx, now) else {
            tracing::debug!(
                column = %condition.column,
                "Placeholder unresolvable in this context, dropping condition"
            );
            continue;
        };
        let leaf = columns::resolve(entity, &condition.column, condition.operator, &resolved);
        if leaf.is_empty() {
            continue;
        }
        let connector = if leaves.is_empty() {
            None
        } else {
            Some(connectors[index - 1])
        };
        leaves.push((connector, leaf));
    }

    if leaves.is_empty() {
        return Ok(CompiledPredicate::Empty);
    }

    // Group consecutive AND-joined leaves; an OR connector starts a new group
    let mut groups: Vec<Vec<CompiledPredicate>> = Vec::new();
    let mut current: Vec<CompiledPredicate> = Vec::new();
    for (connector, leaf) in leaves {
        if connector == Some(Connector::Or) && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
        current.push(leaf);
    }
    groups.push(current);

    let mut subgroups: Vec<CompiledPredicate> = groups
        .into_iter()
        .map(|mut group| {
            if group.len() == 1 {
                group.remove(0)
            } else {
                CompiledPredicate::And(group)
            }
        })
        .collect();

    if subgroups.len() == 1 {
        Ok(subgroups.remove(0))
    } else {
        Ok(CompiledPredicate::Or(subgroups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::predicate::SqlParams;
    use crate::filter::types::{FilterValue, Operator};

    fn condition(column: &str, operator: Operator, value: &str) -> FilterCondition {
        FilterCondition {
            column: column.to_string(),
            operator,
            value: FilterValue::Text(value.to_string()),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        "2024-03-01T15:00:00Z".parse().unwrap()
    }

    fn compile_task(
        conditions: &[FilterCondition],
        connectors: &[Connector],
        ctx: &RequestContext,
    ) -> CompiledPredicate {
        compile_at(conditions, connectors, EntityKind::Task, ctx, fixed_now()).unwrap()
    }

    #[test]
    fn test_single_condition_is_bare_leaf() {
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[condition("status", Operator::Equals, "open")],
            &[],
            &ctx,
        );
        let mut params = SqlParams::default();
        assert_eq!(predicate.to_sql(&mut params), "status = ?");
        assert_eq!(params.values, vec!["open"]);
    }

    #[test]
    fn test_connector_mismatch_rejected() {
        let ctx = RequestContext::member(7, 1);
        let result = compile_at(
            &[
                condition("status", Operator::Equals, "open"),
                condition("title", Operator::Contains, "x"),
            ],
            &[],
            EntityKind::Task,
            &ctx,
            fixed_now(),
        );
        assert!(matches!(
            result,
            Err(FilterError::ConnectorMismatch {
                conditions: 2,
                connectors: 0
            })
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // A AND B OR C AND D => OR(AND(A, B), AND(C, D))
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("status", Operator::Equals, "open"),
                condition("title", Operator::Contains, "roof"),
                condition("status", Operator::Equals, "done"),
                condition("title", Operator::Contains, "pool"),
            ],
            &[Connector::And, Connector::Or, Connector::And],
            &ctx,
        );
        match &predicate {
            CompiledPredicate::Or(disjuncts) => {
                assert_eq!(disjuncts.len(), 2);
                assert!(matches!(disjuncts[0], CompiledPredicate::And(ref m) if m.len() == 2));
                assert!(matches!(disjuncts[1], CompiledPredicate::And(ref m) if m.len() == 2));
            }
            other => panic!("expected OR of two AND groups, got {:?}", other),
        }
    }

    #[test]
    fn test_all_and_is_single_group() {
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("status", Operator::Equals, "open"),
                condition("title", Operator::Contains, "roof"),
                condition("responsible", Operator::Equals, "user-7"),
            ],
            &[Connector::And, Connector::And],
            &ctx,
        );
        assert!(matches!(predicate, CompiledPredicate::And(ref m) if m.len() == 3));
    }

    #[test]
    fn test_all_or_has_bare_leaf_disjuncts() {
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("status", Operator::Equals, "open"),
                condition("status", Operator::Equals, "done"),
            ],
            &[Connector::Or],
            &ctx,
        );
        match &predicate {
            CompiledPredicate::Or(disjuncts) => {
                assert_eq!(disjuncts.len(), 2);
                assert!(matches!(disjuncts[0], CompiledPredicate::Leaf(_)));
            }
            other => panic!("expected OR of leaves, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_leaf_dropped_with_adjoining_connector() {
        // B is unknown, so A AND B OR C must become A OR C
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("status", Operator::Equals, "open"),
                condition("mystery", Operator::Equals, "x"),
                condition("status", Operator::Equals, "done"),
            ],
            &[Connector::And, Connector::Or],
            &ctx,
        );
        match &predicate {
            CompiledPredicate::Or(disjuncts) => {
                assert_eq!(disjuncts.len(), 2);
                assert!(disjuncts.iter().all(|d| matches!(d, CompiledPredicate::Leaf(_))));
            }
            other => panic!("expected OR of two leaves, got {:?}", other),
        }
    }

    #[test]
    fn test_leading_empty_leaf_dropped() {
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("mystery", Operator::Equals, "x"),
                condition("status", Operator::Equals, "open"),
            ],
            &[Connector::And],
            &ctx,
        );
        assert!(matches!(predicate, CompiledPredicate::Leaf(_)));
    }

    #[test]
    fn test_all_conditions_dropped_yields_empty() {
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("mystery", Operator::Equals, "x"),
                condition("dueDate", Operator::Equals, "not a date"),
            ],
            &[Connector::Or],
            &ctx,
        );
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_no_conditions_yields_empty() {
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(&[], &[], &ctx);
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_today_placeholder_expands_to_day_range() {
        // Compiled at 2024-03-01T15:00:00Z, dueDate equals __TODAY__
        // must cover the whole of March 1st.
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[condition("dueDate", Operator::Equals, "__TODAY__")],
            &[],
            &ctx,
        );
        let mut params = SqlParams::default();
        assert_eq!(
            predicate.to_sql(&mut params),
            "(due_date >= ? AND due_date <= ?)"
        );
        assert_eq!(
            params.values,
            vec!["2024-03-01T00:00:00.000Z", "2024-03-01T23:59:59.999Z"]
        );
    }

    #[test]
    fn test_current_branch_without_branch_yields_empty() {
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[condition("branch", Operator::Equals, "__CURRENT_BRANCH__")],
            &[],
            &ctx,
        );
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_current_user_placeholder() {
        let ctx = RequestContext::member(42, 1);
        let predicate = compile_task(
            &[condition("responsible", Operator::Equals, "__CURRENT_USER__")],
            &[],
            &ctx,
        );
        let mut params = SqlParams::default();
        assert_eq!(predicate.to_sql(&mut params), "responsible_id = ?");
        assert_eq!(params.values, vec!["42"]);
    }

    #[test]
    fn test_compile_wrapper_uses_wall_clock() {
        // Sanity check for the non-deterministic entry: just ensure it
        // produces a day range without error.
        let ctx = RequestContext::member(7, 1);
        let predicate = compile(
            &[condition("dueDate", Operator::Equals, "__TODAY__")],
            &[],
            EntityKind::Task,
            &ctx,
        )
        .unwrap();
        assert!(matches!(predicate, CompiledPredicate::Leaf(_)));
    }

    #[test]
    fn test_leaf_is_leaf_not_wrapped() {
        // A lone subgroup with one member is the member itself
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("status", Operator::Equals, "open"),
                condition("mystery", Operator::Equals, "x"),
            ],
            &[Connector::And],
            &ctx,
        );
        assert!(matches!(predicate, CompiledPredicate::Leaf(_)));
    }

    #[test]
    fn test_mixed_groups_with_single_member_groups() {
        // A OR B AND C => OR(A, AND(B, C))
        let ctx = RequestContext::member(7, 1);
        let predicate = compile_task(
            &[
                condition("status", Operator::Equals, "open"),
                condition("status", Operator::Equals, "done"),
                condition("title", Operator::Contains, "pool"),
            ],
            &[Connector::Or, Connector::And],
            &ctx,
        );
        match &predicate {
            CompiledPredicate::Or(disjuncts) => {
                assert_eq!(disjuncts.len(), 2);
                assert!(matches!(disjuncts[0], CompiledPredicate::Leaf(_)));
                assert!(matches!(disjuncts[1], CompiledPredicate::And(ref m) if m.len() == 2));
            }
            other => panic!("expected OR(leaf, AND), got {:?}", other),
        }
    }
}
