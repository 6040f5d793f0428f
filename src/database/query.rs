/*!
 * Parameterized statement builder.
 *
 * Callers describe a statement by table, columns and values; the builder
 * renders SQL with positional `$n` markers and collects the bind values in
 * the matching order. Conditions are written with plain `?` tokens and are
 * renumbered so that condition arguments always bind after data arguments.
 *
 * Table and column names are trusted internal constants. Nothing here
 * validates identifiers, so never feed user input into them.
 */

use log::trace;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

use crate::errors::{AppError, AppResult};

/// Column selection for a `SELECT`
#[derive(Debug, Clone, Copy)]
pub enum Columns<'a> {
    /// `SELECT *`
    All,
    /// Explicit column list; an empty list behaves like `All`
    List(&'a [&'a str]),
}

/// Result of a write statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Rows affected
    pub changes: usize,
    /// Row id of the last insert on this connection
    pub last_insert_id: i64,
}

/// A rendered statement with its bind values in positional order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Append `ORDER BY <clause>`
    pub fn order_by(mut self, clause: &str) -> Self {
        self.sql.push_str(" ORDER BY ");
        self.sql.push_str(clause);
        self
    }

    /// Turn an insert into one that silently skips rows violating the
    /// uniqueness of `column`
    pub fn on_conflict_ignore(mut self, column: &str) -> Self {
        self.sql.push_str(&format!(" ON CONFLICT({}) DO NOTHING", column));
        self
    }

    /// Execute a write statement
    pub fn execute(&self, conn: &Connection) -> rusqlite::Result<ExecOutcome> {
        trace!("exec: {} ({} params)", self.sql, self.params.len());
        let changes = conn.execute(&self.sql, params_from_iter(self.params.iter()))?;
        Ok(ExecOutcome {
            changes,
            last_insert_id: conn.last_insert_rowid(),
        })
    }

    /// Run a query and map every row
    pub fn query_map<T, F>(&self, conn: &Connection, mut f: F) -> rusqlite::Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        trace!("query: {} ({} params)", self.sql, self.params.len());
        let mut stmt = conn.prepare(&self.sql)?;
        let rows = stmt.query_map(params_from_iter(self.params.iter()), |row| f(row))?;
        rows.collect()
    }
}

/// Builder for insert/update/select/delete statements
pub struct QueryBuilder;

impl QueryBuilder {
    /// `INSERT INTO table (c1, c2) VALUES ($1, $2)`
    pub fn insert(table: &str, columns: &[&str], values: Vec<Value>) -> AppResult<Statement> {
        if columns.len() != values.len() {
            return Err(AppError::Validation(format!(
                "insert into {}: {} columns but {} values",
                table,
                columns.len(),
                values.len()
            )));
        }

        let placeholders = (1..=columns.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Statement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders
            ),
            params: values,
        })
    }

    /// `UPDATE table SET c1 = $1, ... WHERE <condition>`
    ///
    /// Assignments keep their given order. The i-th `?` in `condition`
    /// becomes `$(assignments.len() + i + 1)`, so `condition_args` must be
    /// given in the same left-to-right order as the `?` tokens.
    pub fn update(
        table: &str,
        assignments: Vec<(&str, Value)>,
        condition: &str,
        condition_args: Vec<Value>,
    ) -> Statement {
        let offset = assignments.len();
        let mut params = Vec::with_capacity(offset + condition_args.len());

        let set_clause = assignments
            .into_iter()
            .enumerate()
            .map(|(i, (column, value))| {
                params.push(value);
                format!("{} = ${}", column, i + 1)
            })
            .collect::<Vec<_>>()
            .join(", ");

        params.extend(condition_args);

        Statement {
            sql: format!(
                "UPDATE {} SET {}{}",
                table,
                set_clause,
                where_clause(condition, offset)
            ),
            params,
        }
    }

    /// `SELECT ... FROM table WHERE <condition>`
    pub fn select(
        table: &str,
        columns: Columns<'_>,
        condition: &str,
        condition_args: Vec<Value>,
    ) -> Statement {
        let column_list = match columns {
            Columns::List(list) if !list.is_empty() => list.join(", "),
            _ => "*".to_string(),
        };

        Statement {
            sql: format!(
                "SELECT {} FROM {}{}",
                column_list,
                table,
                where_clause(condition, 0)
            ),
            params: condition_args,
        }
    }

    /// `DELETE FROM table WHERE <condition>`
    pub fn delete(table: &str, condition: &str, condition_args: Vec<Value>) -> Statement {
        Statement {
            sql: format!("DELETE FROM {}{}", table, where_clause(condition, 0)),
            params: condition_args,
        }
    }
}

/// Render ` WHERE ...` with every `?` renumbered from `offset + 1`.
/// An empty condition renders nothing.
fn where_clause(condition: &str, offset: usize) -> String {
    if condition.trim().is_empty() {
        return String::new();
    }
    format!(" WHERE {}", renumber_placeholders(condition, offset))
}

/// Replace the i-th `?` with `$(offset + i + 1)`
pub fn renumber_placeholders(condition: &str, offset: usize) -> String {
    let mut out = String::with_capacity(condition.len() + 8);
    let mut next = offset;
    for ch in condition.chars() {
        if ch == '?' {
            next += 1;
            out.push('$');
            out.push_str(&next.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}
