mod utils;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use datafusion::prelude::SessionContext;
use dbplot_query::bin_spec::BinSpec;
use dbplot_query::binning::Binning;
use dbplot_query::column::{ColumnKind, SqlCast};
use dbplot_query::error::DbPlotQueryError;
use dbplot_query::histogram::{HistogramQuery, HistogramRows};
use dbplot_query::rows::{epoch_seconds, BinCount, CategoryCount};
use dbplot_query::source::DataSource;
use float_cmp::assert_approx_eq;
use utils::{create_table, numbers};

fn non_null<T: Copy>(rows: &[BinCount<T>]) -> Vec<(T, u64)> {
    rows.iter()
        .filter_map(|r| r.bin_loc.map(|loc| (loc, r.freq)))
        .collect()
}

fn null_freq<T>(rows: &[BinCount<T>]) -> Option<u64> {
    rows.iter().find(|r| r.bin_loc.is_none()).map(|r| r.freq)
}

#[tokio::test]
async fn test_equal_width_bins_put_max_in_last_bin() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    numbers(&ctx).await?;

    let rows = HistogramQuery::new("numbers", "x").nbins(5).execute(&ctx).await?;
    let HistogramRows::Numeric(rows) = rows else {
        panic!("expected numeric rows, got {rows:?}");
    };
    let bins = non_null(&rows);
    let expected_edges = Binning::new(0.0, 10.0, &BinSpec::Count(5))?.edges();
    assert_eq!(bins.len(), 5);
    for ((edge, _), expected) in bins.iter().zip(&expected_edges) {
        assert_approx_eq!(f64, *edge, *expected, epsilon = 1e-12);
    }
    assert_eq!(
        bins.iter().map(|(_, f)| *f).collect::<Vec<_>>(),
        vec![2, 2, 2, 2, 3]
    );
    assert_eq!(null_freq(&rows), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_bin_width() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    numbers(&ctx).await?;

    let rows = HistogramQuery::new("numbers", "x")
        .bin_width(2.5)
        .execute(&ctx)
        .await?;
    let HistogramRows::Numeric(rows) = rows else {
        panic!("expected numeric rows");
    };
    assert_eq!(
        non_null(&rows),
        vec![(0.0, 3), (2.5, 2), (5.0, 3), (7.5, 3)]
    );
    Ok(())
}

#[tokio::test]
async fn test_weights_include_null_bucket() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    numbers(&ctx).await?;

    let rows = HistogramQuery::new("numbers", "x").execute(&ctx).await?;
    assert_eq!(rows.total_freq(), 12);
    Ok(())
}

#[tokio::test]
async fn test_degenerate_range_is_single_bin() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(&ctx, "same", "SELECT * FROM (VALUES (4), (4), (4)) AS t(v)").await?;

    let rows = HistogramQuery::new("same", "v").nbins(10).execute(&ctx).await?;
    assert_eq!(
        rows,
        HistogramRows::Numeric(vec![BinCount {
            bin_loc: Some(4.0),
            freq: 3
        }])
    );
    Ok(())
}

#[tokio::test]
async fn test_categorical_group_by() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "pets",
        "SELECT * FROM (VALUES ('cat'), ('dog'), ('cat'), (NULL)) AS t(kind)",
    )
    .await?;

    let HistogramRows::Categorical(mut rows) =
        HistogramQuery::new("pets", "kind").execute(&ctx).await?
    else {
        panic!("expected categorical rows");
    };
    rows.sort_by(|a, b| a.category.cmp(&b.category));
    assert_eq!(
        rows,
        vec![
            CategoryCount { category: None, freq: 1 },
            CategoryCount { category: Some("cat".to_string()), freq: 2 },
            CategoryCount { category: Some("dog".to_string()), freq: 1 },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_cast_changes_kind() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    numbers(&ctx).await?;

    let source = DataSource::table("numbers");
    assert_eq!(
        source.column_kind(&ctx, "x", Some(SqlCast::Varchar)).await?,
        ColumnKind::Categorical
    );
    let rows = HistogramQuery::new(source, "x")
        .cast_as(Some(SqlCast::Varchar))
        .execute(&ctx)
        .await?;
    assert_eq!(rows.kind(), ColumnKind::Categorical);
    assert_eq!(rows.len(), 12);
    Ok(())
}

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn test_temporal_bins() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    let values = (1..=11)
        .map(|d| format!("(DATE '2024-01-{d:02}')"))
        .collect::<Vec<_>>()
        .join(", ");
    create_table(&ctx, "days", &format!("SELECT * FROM (VALUES {values}) AS t(d)")).await?;

    let HistogramRows::Temporal(rows) =
        HistogramQuery::new("days", "d").nbins(5).execute(&ctx).await?
    else {
        panic!("expected temporal rows");
    };
    assert_eq!(
        non_null(&rows),
        vec![(day(1), 2), (day(3), 2), (day(5), 2), (day(7), 2), (day(9), 3)]
    );

    let HistogramRows::Temporal(rows) = HistogramQuery::new("days", "d")
        .bin_width(TimeDelta::days(3))
        .execute(&ctx)
        .await?
    else {
        panic!("expected temporal rows");
    };
    assert_eq!(
        non_null(&rows),
        vec![(day(1), 3), (day(4), 3), (day(7), 3), (day(10), 2)]
    );
    Ok(())
}

#[tokio::test]
async fn test_temporal_range_spanning_centuries() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "eras",
        "SELECT * FROM (VALUES (DATE '1700-01-01'), (DATE '1990-06-01'), (DATE '2250-01-01')) \
         AS t(d)",
    )
    .await?;

    let HistogramRows::Temporal(rows) =
        HistogramQuery::new("eras", "d").nbins(4).execute(&ctx).await?
    else {
        panic!("expected temporal rows");
    };
    let midnight = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };
    let min = epoch_seconds(&midnight(1700, 1, 1));
    let max = epoch_seconds(&midnight(2250, 1, 1));
    let binning = Binning::new(min, max, &BinSpec::Count(4))?;

    let bins = non_null(&rows);
    assert_eq!(bins.iter().map(|(_, f)| *f).collect::<Vec<_>>(), vec![1, 1, 1]);
    for ((loc, _), index) in bins.iter().zip([0, 2, 3]) {
        assert_approx_eq!(f64, epoch_seconds(loc), binning.left_edge(index), epsilon = 1e-3);
    }
    assert_eq!(bins[0].0, midnight(1700, 1, 1));
    Ok(())
}

#[tokio::test]
async fn test_temporal_rejects_numeric_width() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(&ctx, "days", "SELECT * FROM (VALUES (DATE '2024-01-01')) AS t(d)").await?;

    let err = HistogramQuery::new("days", "d")
        .bin_width(1.0)
        .execute(&ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, DbPlotQueryError::InvalidParameter(_)));
    Ok(())
}

#[tokio::test]
async fn test_invalid_bins() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    numbers(&ctx).await?;

    for query in [
        HistogramQuery::new("numbers", "x").nbins(0),
        HistogramQuery::new("numbers", "x").bin_width(-1.0),
    ] {
        assert!(matches!(
            query.execute(&ctx).await,
            Err(DbPlotQueryError::InvalidParameter(_))
        ));
    }
    Ok(())
}

#[tokio::test]
async fn test_sources() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    numbers(&ctx).await?;

    let qualified = DataSource::table("numbers").with_schema("public");
    let rows = HistogramQuery::new(qualified, "x").execute(&ctx).await?;
    assert_eq!(rows.total_freq(), 12);

    let sub_query = DataSource::query("SELECT x * 2 AS doubled FROM numbers WHERE x IS NOT NULL");
    let HistogramRows::Numeric(rows) = HistogramQuery::new(sub_query, "doubled")
        .nbins(2)
        .execute(&ctx)
        .await?
    else {
        panic!("expected numeric rows");
    };
    assert_eq!(non_null(&rows), vec![(0.0, 5), (10.0, 6)]);

    let bad = DataSource::query("SELECT * FROM numbers").with_schema("public");
    assert!(matches!(
        HistogramQuery::new(bad, "x").execute(&ctx).await,
        Err(DbPlotQueryError::InvalidParameter(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_column_errors() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    create_table(&ctx, "lists", "SELECT make_array(1, 2) AS l, 1 AS n").await?;

    assert!(matches!(
        HistogramQuery::new("lists", "missing").execute(&ctx).await,
        Err(DbPlotQueryError::ColumnNotFound(_))
    ));
    assert!(matches!(
        HistogramQuery::new("lists", "l").execute(&ctx).await,
        Err(DbPlotQueryError::UnsupportedColumnType { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_print_query() -> Result<(), DbPlotQueryError> {
    let ctx = SessionContext::new();
    numbers(&ctx).await?;

    let query = HistogramQuery::new("numbers", "x").nbins(5);
    let sql = query.to_sql(&ctx).await?;
    assert!(sql.starts_with("SELECT bin_loc, count(*) AS freq FROM"));
    assert_eq!(sql, query.sql_for_kind(ColumnKind::Numeric)?);

    // The echoed text runs as-is
    let batches = ctx.sql(&sql).await?.collect().await?;
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 6);
    Ok(())
}
