//! Compiled predicate tree
//!
//! The output of the condition compiler: an AND/OR-nested tree of leaf
//! fragments. Leaves are opaque once built; the only part of a leaf the
//! engine ever looks at again is its isolation classification.

use serde::Serialize;

/// Classification of a leaf for the isolation sanitizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafClass {
    Ordinary,
    /// Constrains on organization or branch identity; stripped for
    /// non-privileged principals
    IsolationSensitive,
}

/// An atomic, backend-opaque filter fragment
///
/// `sql` uses `?` placeholders; `params` holds the values in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaf {
    pub sql: String,
    pub params: Vec<String>,
    pub class: LeafClass,
}

impl Leaf {
    pub fn ordinary(sql: impl Into<String>, params: Vec<String>) -> CompiledPredicate {
        CompiledPredicate::Leaf(Leaf {
            sql: sql.into(),
            params,
            class: LeafClass::Ordinary,
        })
    }

    pub fn isolation_sensitive(sql: impl Into<String>, params: Vec<String>) -> CompiledPredicate {
        CompiledPredicate::Leaf(Leaf {
            sql: sql.into(),
            params,
            class: LeafClass::IsolationSensitive,
        })
    }
}

/// Collects SQL parameters during predicate rendering (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<String>,
}

/// A compiled filter predicate
///
/// `Empty` is logically "always true": it contributes no constraint and is
/// what unrecognized or unsatisfiable conditions degrade to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CompiledPredicate {
    Empty,
    Leaf(Leaf),
    And(Vec<CompiledPredicate>),
    Or(Vec<CompiledPredicate>),
}

impl CompiledPredicate {
    pub fn is_empty(&self) -> bool {
        matches!(self, CompiledPredicate::Empty)
    }

    /// Render the predicate as a SQL WHERE fragment with `?` placeholders,
    /// appending parameter values in order
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        match self {
            CompiledPredicate::Empty => "1=1".to_string(),
            CompiledPredicate::Leaf(leaf) => {
                params.values.extend(leaf.params.iter().cloned());
                leaf.sql.clone()
            }
            CompiledPredicate::And(members) => Self::render_group(members, " AND ", params),
            CompiledPredicate::Or(members) => Self::render_group(members, " OR ", params),
        }
    }

    fn render_group(
        members: &[CompiledPredicate],
        separator: &str,
        params: &mut SqlParams,
    ) -> String {
        let rendered: Vec<String> = members.iter().map(|m| m.to_sql(params)).collect();
        format!("({})", rendered.join(separator))
    }
}
