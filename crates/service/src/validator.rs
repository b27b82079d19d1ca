//! Safety checks on model-generated SQL.
//!
//! A case-insensitive denylist runs first and is authoritative. Candidates
//! that pass it are parsed; a parseable candidate must be a single query
//! reading only the dataset table. Unparseable candidates are passed through
//! and left for the engine to reject.

use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;

use mission_chat_core::SchemaDescriptor;
use sqlparser::ast::{ObjectName, Statement, visit_relations};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use crate::error::PipelineError;

/// Statement separator, comment markers and anything that writes or escapes the dataset.
pub const DENYLIST: &[&str] =
    &[";", "--", "/*", "insert", "update", "delete", "drop", "alter", "attach", "pragma"];

/// SQL that has passed [`SafetyValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery(String);

impl ValidatedQuery {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SafetyValidator {
    schema: &'static SchemaDescriptor,
}

impl SafetyValidator {
    #[must_use]
    pub const fn new(schema: &'static SchemaDescriptor) -> Self {
        Self { schema }
    }

    pub fn validate(&self, candidate: &str) -> Result<ValidatedQuery, PipelineError> {
        if let Some(token) = denied_token(candidate) {
            return Err(unsafe_query(candidate, format!("forbidden token '{token}'")));
        }

        let statements = match Parser::parse_sql(&SQLiteDialect {}, candidate) {
            Ok(statements) => statements,
            Err(e) => {
                tracing::debug!(error = %e, "candidate not parseable, deferring to engine");
                return Ok(ValidatedQuery(candidate.to_owned()));
            },
        };

        let query = match statements.as_slice() {
            [Statement::Query(query)] => query,
            [_] => return Err(unsafe_query(candidate, "not a read-only query".to_owned())),
            _ => {
                return Err(unsafe_query(
                    candidate,
                    format!("expected one statement, found {}", statements.len()),
                ));
            },
        };

        let cte_names: HashSet<String> = query
            .with
            .iter()
            .flat_map(|with| &with.cte_tables)
            .map(|cte| cte.alias.name.value.to_ascii_uppercase())
            .collect();

        let foreign = visit_relations(&statements, |relation: &ObjectName| {
            if self.is_allowed_relation(relation, &cte_names) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(relation.to_string())
            }
        });
        if let ControlFlow::Break(relation) = foreign {
            return Err(unsafe_query(candidate, format!("reads relation '{relation}'")));
        }

        Ok(ValidatedQuery(candidate.to_owned()))
    }

    fn is_allowed_relation(&self, relation: &ObjectName, cte_names: &HashSet<String>) -> bool {
        match relation.0.as_slice() {
            [name] => {
                name.value.eq_ignore_ascii_case(self.schema.table)
                    || cte_names.contains(&name.value.to_ascii_uppercase())
            },
            [db, name] => {
                db.value.eq_ignore_ascii_case("main")
                    && name.value.eq_ignore_ascii_case(self.schema.table)
            },
            _ => false,
        }
    }
}

fn denied_token(candidate: &str) -> Option<&'static str> {
    let lowered = candidate.to_lowercase();
    DENYLIST.iter().copied().find(|token| lowered.contains(token))
}

fn unsafe_query(candidate: &str, violation: String) -> PipelineError {
    PipelineError::UnsafeQuery { sql: candidate.to_owned(), violation }
}
