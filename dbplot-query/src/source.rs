use crate::column::{ColumnKind, SqlCast};
use crate::error::{DbPlotQueryError, Result};
use crate::sql::{normalize_query, quote_ident, SRC};
use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// A table registered with the session
    Table(String),
    /// An arbitrary SELECT used as a sub-query
    Query(String),
}

/// Where aggregated rows come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub relation: Relation,
    #[serde(default)]
    pub schema: Option<String>,
}

impl DataSource {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            relation: Relation::Table(name.into()),
            schema: None,
        }
    }

    pub fn query(sql: impl Into<String>) -> Self {
        Self {
            relation: Relation::Query(sql.into()),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// The relation as it appears in a FROM clause, before aliasing
    pub fn relation_sql(&self) -> Result<String> {
        match (&self.relation, &self.schema) {
            (Relation::Table(name), None) => Ok(quote_ident(name)),
            (Relation::Table(name), Some(schema)) => {
                Ok(format!("{}.{}", quote_ident(schema), quote_ident(name)))
            }
            (Relation::Query(sql), None) => Ok(format!("({})", normalize_query(sql)?)),
            (Relation::Query(_), Some(_)) => Err(DbPlotQueryError::invalid(
                "a schema can only be given for a table source, not a query",
            )),
        }
    }

    /// `<relation> AS src`
    pub(crate) fn from_sql(&self) -> Result<String> {
        Ok(format!("{} AS {SRC}", self.relation_sql()?))
    }

    /// Resolve how `column` is aggregated: by the explicit cast when given,
    /// otherwise by the column's declared type
    pub async fn column_kind(
        &self,
        ctx: &SessionContext,
        column: &str,
        cast: Option<SqlCast>,
    ) -> Result<ColumnKind> {
        let df = ctx.sql(&format!("SELECT * FROM {}", self.from_sql()?)).await?;
        let field = df
            .schema()
            .field_with_unqualified_name(column)
            .map_err(|_| DbPlotQueryError::ColumnNotFound(column.to_string()))?;
        match cast {
            Some(cast) => Ok(cast.kind()),
            None => ColumnKind::from_data_type(column, field.data_type()),
        }
    }
}

impl From<&str> for DataSource {
    fn from(name: &str) -> Self {
        DataSource::table(name)
    }
}

impl From<String> for DataSource {
    fn from(name: String) -> Self {
        DataSource::table(name)
    }
}
