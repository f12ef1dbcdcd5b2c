//! Guarded query filters.
//!
//! List and count queries accept a [`Filter`]: a small closed set of
//! query-shape variants (equality, substring search, relation, logical
//! AND/OR) rendered to parameterized SQL. Calling [`Filter::live`] rewrites
//! a filter so that `tombstoned = FALSE` is enforced on the base table and
//! recursively inside every relation branch, without call sites repeating
//! the predicate. The opaque [`Filter::Raw`] variant is passed through the
//! rewrite untouched, so a fragment the rewriter cannot inspect degrades to
//! a no-op instead of corrupting the rest of the filter.

use beca_core::types::DateDay;

/// Typed bind value for dynamically-built queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Bool(bool),
    Real(f64),
    Text(String),
    Date(DateDay),
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<DateDay> for Scalar {
    fn from(v: DateDay) -> Self {
        Scalar::Date(v)
    }
}

/// A structured query predicate over one entity table.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value` on the current table.
    Eq(&'static str, Scalar),
    /// `column ILIKE '%needle%'` on the current table.
    Like(&'static str, String),
    /// Every branch must hold. Empty renders as `TRUE`.
    And(Vec<Filter>),
    /// Any branch must hold. Empty is treated as an absent filter (`TRUE`).
    Or(Vec<Filter>),
    /// The related table has a row matching `filter`, correlated through
    /// `related.foreign_column = base.local_column`. Covers both directions:
    /// many-to-one uses `local_column = fk, foreign_column = "id"`,
    /// one-to-many uses `local_column = "id", foreign_column = fk`.
    Relation {
        table: &'static str,
        local_column: &'static str,
        foreign_column: &'static str,
        filter: Box<Filter>,
    },
    /// Opaque SQL fragment. Not inspected and not rewritten by
    /// [`Filter::live`]; must not contain untrusted input.
    Raw(String),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<Scalar>) -> Filter {
        Filter::Eq(column, value.into())
    }

    pub fn like(column: &'static str, needle: impl Into<String>) -> Filter {
        Filter::Like(column, needle.into())
    }

    pub fn relation(
        table: &'static str,
        local_column: &'static str,
        foreign_column: &'static str,
        filter: Filter,
    ) -> Filter {
        Filter::Relation {
            table,
            local_column,
            foreign_column,
            filter: Box::new(filter),
        }
    }

    /// A filter that matches everything (before the live rewrite).
    pub fn all() -> Filter {
        Filter::And(Vec::new())
    }

    /// Rewrite this filter to read only live rows: `tombstoned = FALSE` on
    /// the base table, and injected once into every relation branch.
    pub fn live(&self) -> Filter {
        Filter::And(vec![
            Filter::Eq("tombstoned", Scalar::Bool(false)),
            self.clone().inject_live(),
        ])
    }

    fn inject_live(self) -> Filter {
        match self {
            Filter::And(branches) => {
                Filter::And(branches.into_iter().map(Filter::inject_live).collect())
            }
            Filter::Or(branches) => {
                Filter::Or(branches.into_iter().map(Filter::inject_live).collect())
            }
            Filter::Relation {
                table,
                local_column,
                foreign_column,
                filter,
            } => Filter::Relation {
                table,
                local_column,
                foreign_column,
                filter: Box::new(Filter::And(vec![
                    Filter::Eq("tombstoned", Scalar::Bool(false)),
                    filter.inject_live(),
                ])),
            },
            // Leaves carry no relation scope; Raw is deliberately opaque.
            leaf => leaf,
        }
    }

    /// Render to a SQL predicate over `alias`, with `$1..$n` placeholders.
    pub fn render(&self, alias: &str) -> RenderedFilter {
        let mut binds = Vec::new();
        let mut relation_depth = 0usize;
        let sql = self.render_node(alias, &mut binds, &mut relation_depth);
        RenderedFilter { sql, binds }
    }

    fn render_node(
        &self,
        alias: &str,
        binds: &mut Vec<Scalar>,
        relation_depth: &mut usize,
    ) -> String {
        match self {
            Filter::Eq(column, value) => {
                binds.push(value.clone());
                format!("{alias}.{column} = ${}", binds.len())
            }
            Filter::Like(column, needle) => {
                binds.push(Scalar::Text(format!("%{needle}%")));
                format!("{alias}.{column} ILIKE ${}", binds.len())
            }
            Filter::And(branches) => join_branches(branches, " AND ", alias, binds, relation_depth),
            Filter::Or(branches) => join_branches(branches, " OR ", alias, binds, relation_depth),
            Filter::Relation {
                table,
                local_column,
                foreign_column,
                filter,
            } => {
                *relation_depth += 1;
                let sub = format!("r{relation_depth}");
                let inner = filter.render_node(&sub, binds, relation_depth);
                format!(
                    "EXISTS (SELECT 1 FROM {table} {sub} \
                     WHERE {sub}.{foreign_column} = {alias}.{local_column} AND {inner})"
                )
            }
            Filter::Raw(sql) => format!("({sql})"),
        }
    }
}

fn join_branches(
    branches: &[Filter],
    separator: &str,
    alias: &str,
    binds: &mut Vec<Scalar>,
    relation_depth: &mut usize,
) -> String {
    if branches.is_empty() {
        return "TRUE".to_string();
    }
    let parts: Vec<String> = branches
        .iter()
        .map(|branch| branch.render_node(alias, binds, relation_depth))
        .collect();
    format!("({})", parts.join(separator))
}

/// A rendered filter: SQL predicate plus its bind values in placeholder
/// order. Callers binding further parameters (limit/offset) continue from
/// `binds.len() + 1`.
#[derive(Debug, Clone)]
pub struct RenderedFilter {
    pub sql: String,
    pub binds: Vec<Scalar>,
}

impl RenderedFilter {
    /// Bind the collected values onto a `QueryAs`, in order.
    pub fn bind_to<'q, O>(
        &'q self,
        mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
        for value in &self.binds {
            query = match value {
                Scalar::Int(v) => query.bind(*v),
                Scalar::Bool(v) => query.bind(*v),
                Scalar::Real(v) => query.bind(*v),
                Scalar::Text(v) => query.bind(v.as_str()),
                Scalar::Date(v) => query.bind(*v),
            };
        }
        query
    }
}
