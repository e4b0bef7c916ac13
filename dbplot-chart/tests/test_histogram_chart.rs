mod utils;

use datafusion::prelude::SessionContext;
use dbplot_chart::categorical::{CategoricalOptions, CategoryOrder, NullPlacement};
use dbplot_chart::error::DbPlotChartError;
use dbplot_chart::numeric::HistogramOptions;
use dbplot_chart::render::{
    histogram_chart, histograms_chart, HistogramChartOptions, HistogramSeries,
};
use dbplot_chart::style::PlotStyle;
use dbplot_query::histogram::HistogramQuery;
use float_cmp::assert_approx_eq;
use rstest::rstest;
use utils::{create_table, rect};

#[tokio::test]
async fn test_categorical_histogram_from_table() -> Result<(), DbPlotChartError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "fruit",
        "SELECT * FROM (VALUES ('apple'), ('pear'), ('apple'), (NULL), ('fig'), ('apple'), \
         ('pear')) AS t(name)",
    )
    .await?;

    let rows = HistogramQuery::new("fruit", "name").execute(&ctx).await?;
    let options = HistogramChartOptions {
        categorical: CategoricalOptions {
            null_at: NullPlacement::Right,
            ascending: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let series = HistogramSeries::new("name", rows);
    let graph = histogram_chart(&series, &options, &PlotStyle::default())?;

    assert_eq!(graph.x_axis.tick_labels(), vec!["apple", "pear", "fig", "NULL"]);
    assert_eq!(graph.x_axis.limits, Some([0.0, 4.0]));
    assert_eq!(rect(&graph, "bars_0").height_vec(), vec![3.0, 2.0, 1.0]);
    assert_eq!(rect(&graph, "null_bars_0").x_vec(), vec![3.0]);
    Ok(())
}

#[rstest]
#[case(NullPlacement::Left, vec!["NULL", "a", "b"])]
#[case(NullPlacement::Right, vec!["a", "b", "NULL"])]
#[case(NullPlacement::Order, vec!["a", "NULL", "b"])]
#[case(NullPlacement::Omit, vec!["a", "b"])]
#[tokio::test]
async fn test_null_placement(
    #[case] null_at: NullPlacement,
    #[case] expected: Vec<&str>,
) -> Result<(), DbPlotChartError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "letters",
        "SELECT * FROM (VALUES ('b'), (NULL), ('a'), ('b'), (NULL), ('b')) AS t(c)",
    )
    .await?;

    let rows = HistogramQuery::new("letters", "c").execute(&ctx).await?;
    let options = HistogramChartOptions {
        categorical: CategoricalOptions {
            null_at,
            ..Default::default()
        },
        ..Default::default()
    };
    let series = HistogramSeries::new("c", rows);
    let graph = histogram_chart(&series, &options, &PlotStyle::default())?;
    assert_eq!(graph.x_axis.tick_labels(), expected);
    assert_eq!(
        graph.get_mark("null_bars_0").is_some(),
        null_at != NullPlacement::Omit
    );
    Ok(())
}

#[tokio::test]
async fn test_overlaid_categories_by_label() -> Result<(), DbPlotChartError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "pairs",
        "SELECT * FROM (VALUES ('a', 'c'), ('b', 'c'), ('b', 'd')) AS t(u, v)",
    )
    .await?;

    let series = vec![
        HistogramSeries::new("u", HistogramQuery::new("pairs", "u").execute(&ctx).await?),
        HistogramSeries::new("v", HistogramQuery::new("pairs", "v").execute(&ctx).await?),
    ];
    let options = HistogramChartOptions {
        categorical: CategoricalOptions {
            order_by: CategoryOrder::Label,
            ascending: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let graph = histograms_chart(&series, &options, &PlotStyle::default())?;

    assert_eq!(graph.x_axis.tick_labels(), vec!["a", "b", "c", "d"]);
    assert_eq!(rect(&graph, "bars_0").height_vec(), vec![1.0, 2.0, 0.0, 0.0]);
    assert_eq!(rect(&graph, "bars_1").height_vec(), vec![0.0, 0.0, 2.0, 1.0]);
    assert_approx_eq!(f64, rect(&graph, "bars_1").x_vec()[0], 0.5, epsilon = 1e-9);
    assert_eq!(graph.legend.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_numeric_histogram_normed() -> Result<(), DbPlotChartError> {
    let ctx = SessionContext::new();
    create_table(
        &ctx,
        "numbers",
        "SELECT * FROM (VALUES (0.0), (1.0), (2.0), (3.0), (4.0), (5.0), (6.0), (7.0), (8.0), \
         (9.0), (10.0), (NULL)) AS t(x)",
    )
    .await?;

    let rows = HistogramQuery::new("numbers", "x").nbins(10).execute(&ctx).await?;
    let options = HistogramChartOptions {
        binned: HistogramOptions {
            nbins: 5,
            normed: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let series = HistogramSeries::new("x", rows);
    let graph = histogram_chart(&series, &options, &PlotStyle::default())?;

    let bars = rect(&graph, "bars_0");
    let nulls = rect(&graph, "null_bars_0");
    assert_eq!(bars.len, 5);
    let total: f64 = bars.height_vec().iter().chain(nulls.height_vec().iter()).sum();
    assert_approx_eq!(f64, total, 1.0, epsilon = 1e-9);
    assert_eq!(graph.x_axis.tick_labels()[0], "NULL");
    let [lo, _] = graph.x_axis.limits.unwrap_or_default();
    assert!(lo < 0.0);
    Ok(())
}

#[tokio::test]
async fn test_temporal_histogram_labels() -> Result<(), DbPlotChartError> {
    let ctx = SessionContext::new();
    let values = (1..=11)
        .map(|d| format!("(DATE '2024-01-{d:02}')"))
        .collect::<Vec<_>>()
        .join(", ");
    create_table(&ctx, "days", &format!("SELECT * FROM (VALUES {values}) AS t(d)")).await?;

    let rows = HistogramQuery::new("days", "d").nbins(5).execute(&ctx).await?;
    let options = HistogramChartOptions {
        binned: HistogramOptions {
            nbins: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    let style = PlotStyle::temporal();
    let graph = histogram_chart(&HistogramSeries::new("d", rows), &options, &style)?;

    assert_eq!(
        graph.x_axis.tick_labels(),
        vec!["2024-01-01", "2024-01-05", "2024-01-09"]
    );
    let bars = rect(&graph, "bars_0");
    assert_eq!(bars.height_vec(), vec![4.0, 7.0]);
    assert_eq!(bars.fill_vec()[0], style.series_color(0));
    assert!(graph.get_mark("null_bars_0").is_none());
    Ok(())
}

#[tokio::test]
async fn test_sub_minute_temporal_bins_stay_distinct() -> Result<(), DbPlotChartError> {
    let ctx = SessionContext::new();
    let values = (0..25)
        .map(|i| format!("(TIMESTAMP '2024-01-01 00:00:{:02}')", 2 * i))
        .collect::<Vec<_>>()
        .join(", ");
    create_table(&ctx, "ticks", &format!("SELECT * FROM (VALUES {values}) AS t(ts)")).await?;

    let rows = HistogramQuery::new("ticks", "ts").nbins(25).execute(&ctx).await?;
    let options = HistogramChartOptions {
        binned: HistogramOptions {
            nbins: 25,
            ..Default::default()
        },
        ..Default::default()
    };
    let series = HistogramSeries::new("ts", rows);
    let graph = histogram_chart(&series, &options, &PlotStyle::temporal())?;

    let bars = rect(&graph, "bars_0");
    let x = bars.x_vec();
    let width = bars.width_vec()[0];
    assert_eq!(x.len(), 25);
    assert_eq!(x[0], 1_704_067_200.0);
    assert!(x.windows(2).all(|pair| pair[1] > pair[0]));
    for pair in x.windows(2) {
        assert_approx_eq!(f64, pair[1] - pair[0], width, epsilon = 1e-6);
    }
    assert_eq!(bars.height_vec(), vec![1.0; 25]);
    Ok(())
}

#[tokio::test]
async fn test_order_placement_rejected_for_numeric() -> Result<(), DbPlotChartError> {
    let ctx = SessionContext::new();
    create_table(&ctx, "one", "SELECT * FROM (VALUES (1.0), (NULL)) AS t(x)").await?;

    let rows = HistogramQuery::new("one", "x").execute(&ctx).await?;
    let options = HistogramChartOptions {
        binned: HistogramOptions {
            null_at: NullPlacement::Order,
            ..Default::default()
        },
        ..Default::default()
    };
    let series = HistogramSeries::new("x", rows);
    let result = histogram_chart(&series, &options, &PlotStyle::default());
    assert!(matches!(result, Err(DbPlotChartError::InvalidParameter(_))));
    Ok(())
}

#[test]
fn test_options_from_json() {
    let json = r#"{"categorical": {"null-at": "omit", "order-by": "label"}}"#;
    let options: HistogramChartOptions = serde_json::from_str(json).unwrap();
    assert_eq!(options.categorical.null_at, NullPlacement::Omit);
    assert_eq!(options.categorical.order_by, CategoryOrder::Label);
    assert_eq!(options.binned, HistogramOptions::default());
}
