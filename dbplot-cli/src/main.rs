use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::TimeDelta;
use clap::{Args, Parser, Subcommand, ValueEnum};
use datafusion::prelude::{CsvReadOptions, ParquetReadOptions, SessionContext};
use dbplot_chart::categorical::NullPlacement;
use dbplot_chart::render::{histograms_chart, scatter_chart, HistogramChartOptions, HistogramSeries};
use dbplot_chart::scatter::{ScatterOptions, ScatterPlotType};
use dbplot_chart::style::PlotStyle;
use dbplot_common::colors::{parse_hex_color, ColorPalette};
use dbplot_common::types::RgbaColor;
use dbplot_query::bin_spec::{BinSpec, BinWidth, DEFAULT_GRID_NBINS, DEFAULT_NBINS};
use dbplot_query::column::{ColumnKind, SqlCast};
use dbplot_query::histogram::HistogramQuery;
use dbplot_query::roc::{roc_auc, RocQuery};
use dbplot_query::scatter::ScatterQuery;
use dbplot_query::source::DataSource;
use dbplot_scenegraph::scene_graph::SceneGraph;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_TABLE_NAME: &str = "data";

/// Histograms, scatter plots and ROC curves computed inside DataFusion
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Histogram of one column, or several columns overlaid
    Hist {
        #[command(flatten)]
        source: SourceArgs,

        /// Columns to aggregate
        #[arg(required = true)]
        columns: Vec<String>,

        #[command(flatten)]
        bins: BinArgs,

        /// Cast the columns before aggregating (DOUBLE, BIGINT, VARCHAR, DATE, TIMESTAMP)
        #[arg(long)]
        cast: Option<SqlCast>,

        /// Divide frequencies by their sum
        #[arg(long)]
        normed: bool,

        /// Logarithmic frequency axis
        #[arg(long)]
        log: bool,

        /// Where to draw the null bucket
        #[arg(long, value_enum)]
        null_at: Option<NullAt>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Scatter plot or heatmap of two columns binned onto a grid
    Scatter {
        #[command(flatten)]
        source: SourceArgs,

        x: String,
        y: String,

        #[arg(long)]
        nbins_x: Option<u32>,
        #[arg(long)]
        nbins_y: Option<u32>,

        /// Bin width along x, a number or a duration such as `3d` or `12h`
        #[arg(long, value_parser = parse_bin_width)]
        bin_size_x: Option<BinWidth>,
        #[arg(long, value_parser = parse_bin_width)]
        bin_size_y: Option<BinWidth>,

        #[arg(long)]
        cast_x: Option<SqlCast>,
        #[arg(long)]
        cast_y: Option<SqlCast>,

        /// Draw a heatmap instead of scaled markers
        #[arg(long)]
        heatmap: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// ROC curve and its area from a 0/1 label column and a score column
    Roc {
        #[command(flatten)]
        source: SourceArgs,

        label: String,
        score: String,

        /// Print the SQL instead of running it
        #[arg(long)]
        print_query: bool,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// CSV or Parquet file registered as the table
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Table name; defaults to the file stem
    #[arg(short, long)]
    table: Option<String>,

    #[arg(long)]
    schema: Option<String>,

    /// SELECT statement used as the source instead of a table
    #[arg(short, long, conflicts_with = "table")]
    query: Option<String>,
}

#[derive(Args)]
struct BinArgs {
    #[arg(long, conflicts_with = "bin_width")]
    nbins: Option<u32>,

    /// A number, or a duration such as `3d` or `12h` for temporal columns
    #[arg(long, value_parser = parse_bin_width)]
    bin_width: Option<BinWidth>,
}

#[derive(Args)]
struct OutputArgs {
    /// JSON file with `histogram`, `scatter` and `style` sections; flags take precedence
    #[arg(long)]
    options: Option<PathBuf>,

    /// Print the SQL instead of running it
    #[arg(long)]
    print_query: bool,

    /// Series colours as comma-separated hex codes, e.g. `#4c72b0,#dd8452`
    #[arg(long, value_delimiter = ',', value_parser = parse_palette_color)]
    palette: Option<Vec<RgbaColor>>,

    /// Scene graph JSON destination; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum NullAt {
    Left,
    Right,
    Order,
    Omit,
}

impl From<NullAt> for NullPlacement {
    fn from(value: NullAt) -> Self {
        match value {
            NullAt::Left => NullPlacement::Left,
            NullAt::Right => NullPlacement::Right,
            NullAt::Order => NullPlacement::Order,
            NullAt::Omit => NullPlacement::Omit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OptionsFile {
    histogram: HistogramChartOptions,
    scatter: ScatterOptions,
    style: Option<PlotStyle>,
}

impl OptionsFile {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse options file {}", path.display()))
    }
}

/// Number, or integer followed by one of `s`, `m`, `h`, `d`
fn parse_bin_width(s: &str) -> Result<BinWidth, String> {
    if let Ok(width) = s.parse::<f64>() {
        return Ok(BinWidth::Number(width));
    }
    let invalid = || format!("invalid bin width `{s}`");
    let unit = s.chars().last().ok_or_else(invalid)?;
    let amount: i64 = s[..s.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    let delta = match unit {
        's' => TimeDelta::try_seconds(amount),
        'm' => TimeDelta::try_minutes(amount),
        'h' => TimeDelta::try_hours(amount),
        'd' => TimeDelta::try_days(amount),
        _ => None,
    };
    delta
        .map(BinWidth::Duration)
        .ok_or_else(invalid)
}

fn parse_palette_color(s: &str) -> Result<RgbaColor, String> {
    parse_hex_color(s.trim()).map_err(|e| format!("invalid colour `{s}`: {e}"))
}

impl OutputArgs {
    /// `style` with the `--palette` colours, when given, replacing its palette
    fn style(&self, style: PlotStyle) -> PlotStyle {
        match &self.palette {
            Some(colors) => style.palette(ColorPalette::Custom(colors.clone())),
            None => style,
        }
    }
}

fn bin_spec(nbins: Option<u32>, width: Option<BinWidth>, default: u32) -> anyhow::Result<BinSpec> {
    if nbins.is_none() && width.is_none() {
        return Ok(BinSpec::Count(default));
    }
    Ok(BinSpec::from_parts(nbins, width)?)
}

impl SourceArgs {
    /// Register the file, if any, and describe the relation to aggregate
    async fn resolve(&self, ctx: &SessionContext) -> anyhow::Result<DataSource> {
        let table = match (&self.table, &self.file) {
            (Some(table), _) => table.clone(),
            (None, Some(file)) => file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(DEFAULT_TABLE_NAME)
                .to_string(),
            (None, None) => DEFAULT_TABLE_NAME.to_string(),
        };

        if let Some(file) = &self.file {
            register_file(ctx, &table, file).await?;
        }

        let source = match &self.query {
            Some(query) => DataSource::query(query),
            None if self.file.is_none() && self.table.is_none() => {
                bail!("one of --file, --table or --query is required")
            }
            None => DataSource::table(table),
        };
        Ok(match &self.schema {
            Some(schema) => source.with_schema(schema),
            None => source,
        })
    }
}

async fn register_file(ctx: &SessionContext, table: &str, file: &Path) -> anyhow::Result<()> {
    let path = file
        .to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", file.display()))?;
    match file.extension().and_then(|e| e.to_str()) {
        Some("csv") => ctx.register_csv(table, path, CsvReadOptions::new()).await?,
        Some("parquet") => {
            ctx.register_parquet(table, path, ParquetReadOptions::default())
                .await?
        }
        _ => bail!("Unsupported file type, expected .csv or .parquet: {}", file.display()),
    }
    info!(table, path, "registered file");
    Ok(())
}

fn write_output(graph: &SceneGraph, output: Option<&Path>) -> anyhow::Result<()> {
    let json = graph.to_json()?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Saved scene graph to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_hist(
    ctx: &SessionContext,
    source: DataSource,
    columns: &[String],
    bins: &BinArgs,
    cast: Option<SqlCast>,
    normed: bool,
    log: bool,
    null_at: Option<NullAt>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let spec = bin_spec(bins.nbins, bins.bin_width, DEFAULT_NBINS)?;
    let queries: Vec<HistogramQuery> = columns
        .iter()
        .map(|column| {
            HistogramQuery::new(source.clone(), column)
                .bins(spec)
                .cast_as(cast)
        })
        .collect();

    if output.print_query {
        for query in &queries {
            println!("{}", query.to_sql(ctx).await?);
        }
        return Ok(());
    }

    let file = OptionsFile::load(output.options.as_deref())?;
    let mut options = file.histogram;
    if normed {
        options.categorical.normed = true;
        options.binned.normed = true;
    }
    if log {
        options.categorical.log = true;
        options.binned.log = true;
    }
    if let Some(null_at) = null_at {
        options.categorical.null_at = null_at.into();
        options.binned.null_at = null_at.into();
    }
    if let Some(nbins) = bins.nbins {
        options.binned.nbins = nbins;
    }

    let mut series = Vec::with_capacity(queries.len());
    for query in &queries {
        series.push(HistogramSeries::new(query.column(), query.execute(ctx).await?));
    }
    let style = file
        .style
        .unwrap_or_else(|| match series.first().map(|s| s.rows.kind()) {
            Some(ColumnKind::Temporal) => PlotStyle::temporal(),
            _ => PlotStyle::default(),
        });
    let style = output.style(style);

    let graph = histograms_chart(&series, &options, &style)?;
    write_output(&graph, output.output.as_deref())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let ctx = SessionContext::new();

    match cli.command {
        Commands::Hist {
            source,
            columns,
            bins,
            cast,
            normed,
            log,
            null_at,
            output,
        } => {
            let source = source.resolve(&ctx).await?;
            run_hist(&ctx, source, &columns, &bins, cast, normed, log, null_at, &output).await
        }
        Commands::Scatter {
            source,
            x,
            y,
            nbins_x,
            nbins_y,
            bin_size_x,
            bin_size_y,
            cast_x,
            cast_y,
            heatmap,
            output,
        } => {
            let source = source.resolve(&ctx).await?;
            let query = ScatterQuery::new(source, &x, &y)
                .bins(
                    bin_spec(nbins_x, bin_size_x, DEFAULT_GRID_NBINS)?,
                    bin_spec(nbins_y, bin_size_y, DEFAULT_GRID_NBINS)?,
                )
                .cast_x_as(cast_x)
                .cast_y_as(cast_y);
            if output.print_query {
                println!("{}", query.to_sql(&ctx).await?);
                return Ok(());
            }

            let file = OptionsFile::load(output.options.as_deref())?;
            let mut options = file.scatter;
            if heatmap {
                options.plot_type = ScatterPlotType::Heatmap;
            }
            let style = output.style(file.style.unwrap_or_default());
            let rows = query.execute(&ctx).await?;
            let mut graph = scatter_chart(&rows, &options, &style)?;
            graph.x_axis.title = Some(x);
            graph.y_axis.title = Some(y);
            write_output(&graph, output.output.as_deref())
        }
        Commands::Roc {
            source,
            label,
            score,
            print_query,
        } => {
            let source = source.resolve(&ctx).await?;
            let query = RocQuery::new(source, label, score);
            if print_query {
                println!("{}", query.sql()?);
                return Ok(());
            }
            let points = query.execute(&ctx).await?;
            let report = serde_json::json!({
                "auc": roc_auc(&points),
                "points": points,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
