mod utils;

use datafusion::prelude::SessionContext;
use dbplot_query::error::DbPlotQueryError;
use dbplot_query::roc::{roc_auc, RocQuery};
use float_cmp::assert_approx_eq;
use rstest::rstest;
use utils::create_table;

#[rstest]
#[case::perfect("(1, 0.9), (1, 0.8), (0, 0.3), (0, 0.1)", 1.0)]
#[case::tied_scores("(1, 0.5), (0, 0.5), (1, 0.5), (0, 0.5)", 0.5)]
#[case::inverted("(0, 0.9), (0, 0.8), (1, 0.3), (1, 0.1)", 0.0)]
#[case::mixed("(1, 0.9), (0, 0.8), (1, 0.7), (0, 0.1)", 0.75)]
#[tokio::test]
async fn test_roc_auc(#[case] rows: &str, #[case] expected: f64) -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "scored",
        &format!("SELECT * FROM (VALUES {rows}) AS t(label, score)"),
    )
    .await?;

    let points = RocQuery::new("scored", "label", "score").execute(&ctx).await?;
    assert_eq!((points[0].fpr, points[0].tpr), (0.0, 0.0));
    assert_eq!(points[0].threshold, None);
    let last = points.last().unwrap();
    assert_eq!((last.fpr, last.tpr), (1.0, 1.0));
    assert_approx_eq!(f64, roc_auc(&points), expected, epsilon = 1e-12);
    Ok(())
}

#[tokio::test]
async fn test_roc_needs_both_classes() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "positives",
        "SELECT * FROM (VALUES (1, 0.9), (1, 0.2)) AS t(label, score)",
    )
    .await?;

    assert!(matches!(
        RocQuery::new("positives", "label", "score").execute(&ctx).await,
        Err(DbPlotQueryError::InvalidParameter(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_roc_missing_column() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(&ctx, "scored", "SELECT * FROM (VALUES (1, 0.9)) AS t(label, score)").await?;

    assert!(matches!(
        RocQuery::new("scored", "truth", "score").execute(&ctx).await,
        Err(DbPlotQueryError::ColumnNotFound(_))
    ));
    Ok(())
}
