#![allow(dead_code)]

use datafusion::prelude::SessionContext;
use dbplot_query::error::DbPlotQueryError;

/// Register the rows of `select` as table `name`
pub async fn create_table(
    ctx: &SessionContext,
    name: &str,
    select: &str,
) -> Result<(), DbPlotQueryError> {
    ctx.sql(&format!("CREATE TABLE {name} AS {select}"))
        .await?
        .collect()
        .await?;
    Ok(())
}

/// `t(x DOUBLE)` holding 0, 1, ..., 10 plus one NULL
pub async fn numbers(ctx: &SessionContext) -> Result<(), DbPlotQueryError> {
    create_table(
        ctx,
        "numbers",
        "SELECT * FROM (VALUES (0.0), (1.0), (2.0), (3.0), (4.0), (5.0), (6.0), (7.0), (8.0), \
         (9.0), (10.0), (NULL)) AS t(x)",
    )
    .await
}
