#![allow(dead_code)]

use datafusion::prelude::SessionContext;
use dbplot_chart::error::DbPlotChartError;
use dbplot_scenegraph::marks::mark::SceneMark;
use dbplot_scenegraph::marks::rect::SceneRectMark;
use dbplot_scenegraph::marks::symbol::SceneSymbolMark;
use dbplot_scenegraph::scene_graph::SceneGraph;

/// Register the rows of `select` as table `name`
pub async fn create_table(
    ctx: &SessionContext,
    name: &str,
    select: &str,
) -> Result<(), DbPlotChartError> {
    ctx.sql(&format!("CREATE TABLE {name} AS {select}"))
        .await
        .map_err(dbplot_query::error::DbPlotQueryError::from)?
        .collect()
        .await
        .map_err(dbplot_query::error::DbPlotQueryError::from)?;
    Ok(())
}

pub fn rect<'a>(graph: &'a SceneGraph, name: &str) -> &'a SceneRectMark {
    match graph.get_mark(name) {
        Some(SceneMark::Rect(mark)) => mark,
        other => panic!("expected rect mark `{name}`, got {other:?}"),
    }
}

pub fn symbol<'a>(graph: &'a SceneGraph, name: &str) -> &'a SceneSymbolMark {
    match graph.get_mark(name) {
        Some(SceneMark::Symbol(mark)) => mark,
        other => panic!("expected symbol mark `{name}`, got {other:?}"),
    }
}
