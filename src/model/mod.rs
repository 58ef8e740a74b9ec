//! The generic table accessor.
//!
//! A [`Model`] wraps one table and offers reads with pagination, writes,
//! field arithmetic and existence checks. Every operation builds an immutable
//! statement and hands it to the [`Querier`]; the only state a model keeps is
//! its [`TableDescriptor`].
//!
//! A model is meant to be created per request or unit of work. The setters
//! take `&mut self`, so one instance is never reconfigured while shared.

mod descriptor;

use std::marker::PhantomData;
use std::str::FromStr;

use tracing::trace;

use crate::builders::{
    Assignment, DeleteQuery, InsertQuery, SelectQuery, UpdateBatchQuery, UpdateQuery,
};
use crate::clauses::{CompareOp, Filter, Join, WhereClause};
use crate::error::{ModelError, Result};
use crate::querier::Querier;
use crate::traits::{ColumnRef, Table};
use crate::types::{Page, Row, SqlValue, Values};

pub use descriptor::TableDescriptor;

/// Generic CRUD and pagination over the table described by `T`.
pub struct Model<T: Table> {
    querier: Querier,
    descriptor: TableDescriptor,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> Model<T> {
    /// A model using the settings declared by `T`. A zero page size or a
    /// malformed table name, key or alias is rejected.
    pub fn new(querier: Querier) -> Result<Self> {
        Self::with_descriptor(querier, TableDescriptor::for_table::<T>())
    }

    /// A model using explicit settings, e.g. loaded from configuration.
    pub fn with_descriptor(querier: Querier, descriptor: TableDescriptor) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self {
            querier,
            descriptor,
            _table: PhantomData,
        })
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    /// Alias the table (`FROM users AS u`) for every later read.
    pub fn set_table_alias(&mut self, alias: impl Into<String>) -> Result<()> {
        self.descriptor.set_alias(alias)
    }

    pub fn clear_table_alias(&mut self) {
        self.descriptor.clear_alias();
    }

    /// Change how many records a page holds. Zero is rejected.
    pub fn set_per_page_limit(&mut self, per_page: u64) -> Result<()> {
        self.descriptor.set_per_page(per_page)
    }

    fn id_clause(&self, id: SqlValue) -> WhereClause {
        WhereClause::compare(self.descriptor.qualified_primary_key(), CompareOp::Eq, id)
    }

    fn bare_id_clause(&self, id: SqlValue) -> WhereClause {
        WhereClause::compare(
            ColumnRef::bare(self.descriptor.primary_key()),
            CompareOp::Eq,
            id,
        )
    }

    // ---- reads ----

    /// A `SELECT *` against this table (and alias) to refine by hand.
    pub fn query(&self) -> SelectQuery {
        SelectQuery::from(self.descriptor.table_ref())
    }

    /// Run a hand-built select and return its rows.
    pub async fn fetch(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        Ok(self.querier.fetch(query).await?.rows())
    }

    /// The first record matching `filter`, or `None`.
    pub async fn get_by(&self, filter: &Filter, joins: &[Join]) -> Result<Option<Row>> {
        let query = self
            .query()
            .joins(joins)?
            .where_opt(filter.to_clause()?)
            .limit(1);
        Ok(self.querier.fetch(&query).await?.first_row())
    }

    /// The record whose primary key is `id`, or `None`.
    ///
    /// The key is qualified with the alias when one is set, so joined tables
    /// sharing the column name do not make it ambiguous.
    pub async fn get_by_id(&self, id: impl Into<SqlValue>, joins: &[Join]) -> Result<Option<Row>> {
        let filter = Filter::from(self.id_clause(id.into()));
        self.get_by(&filter, joins).await
    }

    /// A single column of the record with primary key `id`.
    ///
    /// `None` covers a missing record as well as a `NULL`, empty or `"0"`
    /// value; callers that need to tell these apart should use `get_by_id`.
    pub async fn get_field(&self, id: impl Into<SqlValue>, field: &str) -> Result<Option<String>> {
        let column = ColumnRef::parse(field)?;
        let query = self
            .query()
            .column_refs(vec![column.clone()])
            .where_(self.id_clause(id.into()))
            .limit(1);
        let Some(row) = self.querier.fetch(&query).await?.first_row() else {
            return Ok(None);
        };
        Ok(match row.value(&column.column)? {
            Some(value) if !value.is_empty() && value != "0" => Some(value.to_string()),
            _ => None,
        })
    }

    /// One page of every record in the table.
    pub async fn get_all(&self, page: u64) -> Result<Vec<Row>> {
        self.get_many_by(&Filter::new(), page, &[]).await
    }

    /// One page of records matching `filter`. Pages start at 1; anything
    /// below is treated as the first page. Row order is left to the database.
    pub async fn get_many_by(&self, filter: &Filter, page: u64, joins: &[Join]) -> Result<Vec<Row>> {
        let query = self.window(filter, page, joins)?;
        self.fetch(&query).await
    }

    /// Like [`Model::get_many_by`], plus a second query counting every match
    /// so the result carries pagination metadata.
    pub async fn get_page_by(&self, filter: &Filter, page: u64, joins: &[Join]) -> Result<Page> {
        let query = self.window(filter, page, joins)?;
        let records = self.fetch(&query).await?;
        let total_count = self.querier.count(&query.count()).await?;

        let (limit, offset) = self.limit_offset(page);
        trace!(
            table = %self.descriptor.table(),
            page,
            limit,
            offset,
            fetched = records.len(),
            total_count,
            "assembled page"
        );
        Ok(Page::assemble(records, page, limit, offset, total_count))
    }

    fn limit_offset(&self, page: u64) -> (u64, u64) {
        let limit = self.descriptor.per_page();
        let offset = if page <= 1 {
            0
        } else {
            (page - 1).saturating_mul(limit)
        };
        (limit, offset)
    }

    fn window(&self, filter: &Filter, page: u64, joins: &[Join]) -> Result<SelectQuery> {
        let (limit, offset) = self.limit_offset(page);
        let query = self
            .query()
            .joins(joins)?
            .where_opt(filter.to_clause()?)
            .limit(limit);
        Ok(if offset > 0 { query.offset(offset) } else { query })
    }

    // ---- utilities ----

    /// True when exactly one record has primary key `id`.
    pub async fn exists_by_id(&self, id: impl Into<SqlValue>) -> Result<bool> {
        let query = self.query().where_(self.id_clause(id.into()));
        Ok(self.querier.count(&query.count()).await? == 1)
    }

    /// True when exactly one record matches `filter`; several matches count as false.
    pub async fn exists_where(&self, filter: &Filter) -> Result<bool> {
        let query = self.query().where_opt(filter.to_clause()?);
        Ok(self.querier.count(&query.count()).await? == 1)
    }

    // ---- writes ----

    /// Insert one record and return the key the database assigned to it.
    pub async fn create<I: FromStr>(&self, values: &Values) -> Result<I> {
        let pk = self.descriptor.primary_key();
        let query = InsertQuery::one(self.descriptor.table(), values)?.returning(pk)?;
        self.querier.fetch(&query).await?.single_row()?.parse(pk)
    }

    /// Insert several records sharing one column set. Returns affected rows.
    pub async fn create_many(&self, rows: &[Values]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let query = InsertQuery::many(self.descriptor.table(), rows)?;
        self.querier.execute(&query).await
    }

    /// Update the record with primary key `id`. Returns affected rows.
    pub async fn update(&self, id: impl Into<SqlValue>, values: &Values) -> Result<u64> {
        if values.is_empty() {
            return Ok(0);
        }
        let query = UpdateQuery::new(self.descriptor.table())?
            .set_values(values)?
            .where_(self.bare_id_clause(id.into()));
        self.querier.execute(&query).await
    }

    /// Update several records, matching each row on its `key` column.
    pub async fn update_many(&self, rows: &[Values], key: &str) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let query = UpdateBatchQuery::new(self.descriptor.table(), rows, key)?;
        self.querier.execute(&query).await
    }

    /// Set one column of the record with primary key `id`.
    /// The value is always bound as a parameter.
    pub async fn update_field(
        &self,
        id: impl Into<SqlValue>,
        field: &str,
        value: impl Into<SqlValue>,
    ) -> Result<u64> {
        self.assign(id.into(), field, Assignment::Value(value.into()))
            .await
    }

    /// Add `delta` (which may be negative) to a numeric column in place.
    pub async fn apply_delta(&self, id: impl Into<SqlValue>, field: &str, delta: i64) -> Result<u64> {
        self.assign(id.into(), field, Assignment::Increment(delta))
            .await
    }

    /// `field = field + diff`, evaluated by the database.
    pub async fn increment_field(&self, id: impl Into<SqlValue>, field: &str, diff: i64) -> Result<u64> {
        self.assign(id.into(), field, Assignment::Increment(diff))
            .await
    }

    /// `field = field - diff`, evaluated by the database.
    pub async fn decrement_field(&self, id: impl Into<SqlValue>, field: &str, diff: i64) -> Result<u64> {
        self.assign(id.into(), field, Assignment::Decrement(diff))
            .await
    }

    async fn assign(&self, id: SqlValue, field: &str, assignment: Assignment) -> Result<u64> {
        let query = UpdateQuery::new(self.descriptor.table())?
            .set(field, assignment)?
            .where_(self.bare_id_clause(id));
        self.querier.execute(&query).await
    }

    /// Delete the record with primary key `id`.
    pub async fn delete(&self, id: impl Into<SqlValue>) -> Result<u64> {
        let query = DeleteQuery::new(self.descriptor.table(), self.bare_id_clause(id.into()))?;
        self.querier.execute(&query).await
    }

    /// Delete every record matching `filter`. An empty filter is refused.
    pub async fn delete_by(&self, filter: &Filter) -> Result<u64> {
        let clause = filter
            .to_clause()?
            .ok_or_else(|| ModelError::UnboundedDelete(self.descriptor.table().to_string()))?;
        let query = DeleteQuery::new(self.descriptor.table(), clause)?;
        self.querier.execute(&query).await
    }
}
