//! Dynamic `UPDATE` statements for partial updates.
//!
//! Only the fields present in a payload become assignments, each bound as a parameter.
//! Column names come from code, never from the request. Every statement also bumps
//! `updated_at` so that it strictly increases, even when two updates land within the
//! resolution of `NOW()` or when no field was supplied at all.

use dental_types::Patch;
use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// The `updated_at` assignment every update carries.
pub const TOUCH_UPDATED_AT: &str =
    "updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')";

pub struct UpdateBuilder<'args> {
    query: QueryBuilder<'args, Postgres>,
    assignments: usize,
    has_where: bool,
}

impl<'args> UpdateBuilder<'args> {
    pub fn new(table: &str) -> Self {
        let query = QueryBuilder::new(format!("UPDATE {table} SET {TOUCH_UPDATED_AT}"));
        Self {
            query,
            assignments: 0,
            has_where: false,
        }
    }

    /// Adds `column = $n` for a value, `column = NULL` for an explicit null, nothing when absent.
    pub fn set<T>(&mut self, column: &str, patch: Patch<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        match patch {
            Patch::Absent => {}
            Patch::Null => {
                self.query.push(", ").push(column).push(" = NULL");
                self.assignments += 1;
            }
            Patch::Value(value) => {
                self.query.push(", ").push(column).push(" = ").push_bind(value);
                self.assignments += 1;
            }
        }
        self
    }

    /// Like [`UpdateBuilder::set`] for a column stored as text, such as the enum columns.
    pub fn set_text<T: std::fmt::Display>(&mut self, column: &str, patch: Patch<T>) -> &mut Self {
        self.set(column, patch.map(|v| v.to_string()))
    }

    /// Appends `WHERE column = $n`, or `AND column = $n` after the first condition.
    pub fn filter<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        let keyword = if self.has_where { " AND " } else { " WHERE " };
        self.query.push(keyword).push(column).push(" = ").push_bind(value);
        self.has_where = true;
        self
    }

    /// Number of field assignments, not counting `updated_at`.
    pub fn assignments(&self) -> usize {
        self.assignments
    }

    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    pub fn into_query_builder(self) -> QueryBuilder<'args, Postgres> {
        self.query
    }
}
