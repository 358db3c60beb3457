//! Collection handle
//!
//! A named group of JSON documents. Filters, sorts and updates are expressed
//! as small builders and compiled to SQLite JSON functions, so every update is
//! a single atomic `UPDATE` statement.

use crate::store::error::StoreError;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

/// Equality filter over top-level string fields
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, String)>,
}

impl Filter {
    /// Create an empty filter (matches every document in the collection)
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.clauses.push((field.to_string(), value.into()));
        self
    }
}

/// Sort order for `find`; listings are always newest first
#[derive(Debug, Clone)]
pub struct Sort {
    field: String,
}

impl Sort {
    /// Sort by `field`, largest first
    pub fn descending(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

/// Update document: array appends followed by field assignments
#[derive(Debug, Clone, Default)]
pub struct Update {
    push: Vec<(String, Vec<Value>)>,
    set: Vec<(String, Value)>,
}

impl Update {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every value, in order, to the array at `field`
    pub fn push_each(mut self, field: &str, values: Vec<Value>) -> Self {
        self.push.push((field.to_string(), values));
        self
    }

    /// Assign `value` to `field`
    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.set.push((field.to_string(), value));
        self
    }

    fn is_empty(&self) -> bool {
        self.set.is_empty() && self.push.iter().all(|(_, values)| values.is_empty())
    }
}

/// Handle to one collection of the document store
#[derive(Clone)]
pub struct Collection {
    pool: SqlitePool,
    name: String,
}

impl Collection {
    pub(crate) fn new(pool: SqlitePool, name: &str) -> Self {
        Self {
            pool,
            name: name.to_string(),
        }
    }

    /// Insert a document. The document must carry a string `id`.
    pub async fn insert_one(&self, document: &Value) -> Result<(), StoreError> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or(StoreError::MissingId)?;
        let body = serde_json::to_string(document)?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(&self.name)
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await?;

        debug!(collection = %self.name, id = %id, "Inserted document");
        Ok(())
    }

    /// Find the first document matching `filter`
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, StoreError> {
        let where_clause = where_clause(filter)?;
        let sql = format!("SELECT body FROM documents WHERE {} LIMIT 1", where_clause);

        let mut query = sqlx::query_scalar::<_, String>(&sql).bind(&self.name);
        for (_, value) in &filter.clauses {
            query = query.bind(value);
        }

        match query.fetch_optional(&self.pool).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Find every document matching `filter`, optionally sorted
    pub async fn find(
        &self,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut sql = format!("SELECT body FROM documents WHERE {}", where_clause(filter)?);
        if let Some(sort) = sort {
            sql.push_str(&format!(
                " ORDER BY json_extract(body, '{}') DESC",
                json_path(&sort.field)?
            ));
        }

        let mut query = sqlx::query_scalar::<_, String>(&sql).bind(&self.name);
        for (_, value) in &filter.clauses {
            query = query.bind(value);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StoreError::from))
            .collect()
    }

    /// Apply `update` to the first document matching `filter`
    ///
    /// Appends and assignments run in one `UPDATE`, so concurrent writers
    /// never observe a half-applied update.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of documents modified (0 or 1)
    pub async fn update_one(&self, filter: &Filter, update: &Update) -> Result<u64, StoreError> {
        if update.is_empty() {
            return Ok(0);
        }

        let mut expr = "body".to_string();
        let mut params: Vec<String> = Vec::new();
        for (field, values) in &update.push {
            let path = format!("{}[#]", json_path(field)?);
            for value in values {
                expr = format!("json_insert({}, '{}', json(?))", expr, path);
                params.push(serde_json::to_string(value)?);
            }
        }
        for (field, value) in &update.set {
            expr = format!("json_set({}, '{}', json(?))", expr, json_path(field)?);
            params.push(serde_json::to_string(value)?);
        }

        let sql = format!(
            "UPDATE documents SET body = {} WHERE rowid = (SELECT rowid FROM documents WHERE {} LIMIT 1)",
            expr,
            where_clause(filter)?
        );

        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        query = query.bind(&self.name);
        for (_, value) in &filter.clauses {
            query = query.bind(value);
        }

        let result = query.execute(&self.pool).await?;
        debug!(
            collection = %self.name,
            modified = result.rows_affected(),
            "Updated document"
        );
        Ok(result.rows_affected())
    }

    /// Delete the first document matching `filter`
    ///
    /// # Returns
    /// * `Ok(n)` - Number of documents deleted (0 or 1)
    pub async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError> {
        let sql = format!(
            "DELETE FROM documents WHERE rowid = (SELECT rowid FROM documents WHERE {} LIMIT 1)",
            where_clause(filter)?
        );

        let mut query = sqlx::query(&sql).bind(&self.name);
        for (_, value) in &filter.clauses {
            query = query.bind(value);
        }

        let result = query.execute(&self.pool).await?;
        debug!(
            collection = %self.name,
            deleted = result.rows_affected(),
            "Deleted document"
        );
        Ok(result.rows_affected())
    }
}

/// `collection = ? AND json_extract(body, '$.f') = ? ...`
fn where_clause(filter: &Filter) -> Result<String, StoreError> {
    let mut clause = "collection = ?".to_string();
    for (field, _) in &filter.clauses {
        clause.push_str(&format!(" AND json_extract(body, '{}') = ?", json_path(field)?));
    }
    Ok(clause)
}

/// Field names are spliced into SQL, so only `[A-Za-z0-9_]` is accepted
fn json_path(field: &str) -> Result<String, StoreError> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(format!("$.{}", field))
}
