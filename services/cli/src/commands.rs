use crate::io;
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, ValueEnum};
use nutri_score::config::{AppConfig, ScoringConfig};
use nutri_score::dataset::{
    col_completeness, remove_duplicates, Completeness, DuplicateGroup, FillFilter, FillStat,
};
use nutri_score::error::AppError;
use nutri_score::nutrition::{annotate, NutriScore, ScoringSummary, ThresholdTable};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Product CSV export to score
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the scored CSV (omit to only print the summary)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Score rows across all cores
    #[arg(long)]
    pub(crate) parallel: bool,
    /// Print the summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Override the configured rubric file
    #[arg(long)]
    pub(crate) rubric: Option<PathBuf>,
    /// Override the column holding the PNNS group
    #[arg(long)]
    pub(crate) group_field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StatArg {
    Names,
    Count,
    Ratio,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("filter")
        .required(true)
        .args(["at_least", "at_most", "between"])
))]
pub(crate) struct CompletenessArgs {
    /// Product CSV export to inspect
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Keep columns filled in at least this fraction of rows
    #[arg(long)]
    pub(crate) at_least: Option<f64>,
    /// Keep columns filled in at most this fraction of rows
    #[arg(long)]
    pub(crate) at_most: Option<f64>,
    /// Keep columns whose fill fraction lies in the range
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    pub(crate) between: Option<Vec<f64>>,
    /// What to report per column
    #[arg(long, value_enum, default_value_t = StatArg::Names)]
    pub(crate) stat: StatArg,
    /// Round ratios to this many digits
    #[arg(long)]
    pub(crate) digits: Option<u32>,
}

impl CompletenessArgs {
    fn filter(&self) -> Option<FillFilter> {
        if let Some(fraction) = self.at_least {
            return Some(FillFilter::AtLeast(fraction));
        }
        if let Some(fraction) = self.at_most {
            return Some(FillFilter::AtMost(fraction));
        }
        match self.between.as_deref() {
            Some([low, high]) => Some(FillFilter::Between(*low, *high)),
            _ => None,
        }
    }

    fn stat(&self) -> FillStat {
        match self.stat {
            StatArg::Names => FillStat::Names,
            StatArg::Count => FillStat::Count,
            StatArg::Ratio => FillStat::Ratio {
                digits: self.digits,
            },
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct DedupeArgs {
    /// Product CSV export to clean
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Column identifying a product
    #[arg(long, default_value = "code")]
    pub(crate) key: String,
    /// Drop duplicates without filling gaps in the surviving row
    #[arg(long)]
    pub(crate) no_merge: bool,
    /// Where to write the cleaned CSV
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RubricArgs {
    /// Print the table as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Override the configured rubric file
    #[arg(long)]
    pub(crate) rubric: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    generated_at: DateTime<Utc>,
    input: String,
    summary: ScoringSummary,
}

/// Compiles the configured rubric, reusing the process-wide table when none is set.
fn with_table<T>(
    scoring: &ScoringConfig,
    run: impl FnOnce(&ThresholdTable) -> Result<T, AppError>,
) -> Result<T, AppError> {
    match &scoring.rubric_path {
        None => run(ThresholdTable::standard()?),
        Some(path) => {
            info!(path = %path.display(), "compiling custom rubric");
            let table = ThresholdTable::build(&scoring.rubric()?)?;
            run(&table)
        }
    }
}

pub(crate) fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let mut scoring = config.scoring.clone();
    if let Some(path) = args.rubric.clone() {
        scoring.rubric_path = Some(path);
    }
    if let Some(field) = args.group_field.clone() {
        scoring.group_field = field;
    }

    let mut products = io::read_table_from_path(&args.input)?;

    let summary = with_table(&scoring, |table| {
        let scorer = NutriScore::new(table, scoring.field_mapping());
        Ok(annotate(
            &scorer,
            products.rows_mut(),
            &scoring.columns,
            args.parallel,
        ))
    })?;
    products.ensure_column(&scoring.columns.score);
    products.ensure_column(&scoring.columns.grade);

    if let Some(output) = &args.output {
        io::write_table_to_path(&products, output)?;
    }

    let report = ScoreReport {
        generated_at: Utc::now(),
        input: args.input.display().to_string(),
        summary,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_score_report(&report);
    }
    Ok(())
}

pub(crate) fn run_completeness(args: CompletenessArgs) -> Result<(), AppError> {
    let products = io::read_table_from_path(&args.input)?;
    let Some(filter) = args.filter() else {
        // clap enforces one filter; an empty `--between` is the only way here.
        println!("No completeness filter given");
        return Ok(());
    };

    let report = col_completeness(&products, filter, args.stat())?;
    let (rows, columns) = products.shape();
    println!(
        "{} of {} columns match ({} rows)",
        report.columns().len(),
        columns,
        rows
    );
    match report {
        Completeness::Names(names) => {
            for name in names {
                println!("- {name}");
            }
        }
        Completeness::Counts(counts) => {
            for (name, count) in counts {
                println!("- {name}: {count}");
            }
        }
        Completeness::Ratios(ratios) => {
            for (name, ratio) in ratios {
                println!("- {name}: {ratio}");
            }
        }
    }
    Ok(())
}

pub(crate) fn run_dedupe(args: DedupeArgs) -> Result<(), AppError> {
    let mut products = io::read_table_from_path(&args.input)?;
    let before = products.shape().0;
    let groups = remove_duplicates(&mut products, &args.key, !args.no_merge)?;

    if let Some(output) = &args.output {
        io::write_table_to_path(&products, output)?;
    }

    render_duplicate_groups(&args.key, before, products.shape().0, &groups);
    Ok(())
}

pub(crate) fn run_rubric(config: &AppConfig, args: RubricArgs) -> Result<(), AppError> {
    let mut scoring = config.scoring.clone();
    if let Some(path) = args.rubric {
        scoring.rubric_path = Some(path);
    }

    with_table(&scoring, |table| {
        let resolved = table.resolved();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            return Ok(());
        }

        for entry in resolved {
            let edges: Vec<String> = entry
                .bins
                .edges()
                .iter()
                .map(|edge| match edge {
                    Some(edge) => edge.to_string(),
                    None => "-".to_string(),
                })
                .collect();
            let note = if entry.inherited { " (from solid)" } else { "" };
            println!(
                "{}/{} {} [{}]{}",
                entry.category,
                entry.component,
                entry.bins.comparison().symbol(),
                edges.join(", "),
                note
            );
        }
        Ok(())
    })
}

fn render_score_report(report: &ScoreReport) {
    let summary = &report.summary;
    println!("Nutri-Score run for {}", report.input);
    println!(
        "Generated {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "{} products, {} scored, {} graded",
        summary.total, summary.scored, summary.graded
    );
    if let Some(mean) = summary.mean_score {
        println!("Mean score: {mean:.2}");
    }

    println!("\nGrade distribution");
    for entry in &summary.grades {
        println!("- {}: {}", entry.grade, entry.count);
    }

    if !summary.categories.is_empty() {
        println!("\nCategories");
        for entry in &summary.categories {
            println!("- {}: {}", entry.category, entry.count);
        }
    }
}

fn render_duplicate_groups(key: &str, before: usize, after: usize, groups: &[DuplicateGroup]) {
    println!(
        "Deduplicated on '{key}': {before} -> {after} rows, {} duplicated keys",
        groups.len()
    );
    for group in groups {
        let filled = if group.changed_columns.is_empty() {
            String::new()
        } else {
            format!(", filled {}", group.changed_columns.join(", "))
        };
        println!(
            "- {}: kept row {}, removed {:?}{}",
            group.key, group.kept_row, group.removed_rows, filled
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completeness_args(at_least: Option<f64>, between: Option<Vec<f64>>) -> CompletenessArgs {
        CompletenessArgs {
            input: PathBuf::from("products.csv"),
            at_least,
            at_most: None,
            between,
            stat: StatArg::Ratio,
            digits: Some(2),
        }
    }

    #[test]
    fn completeness_arguments_map_to_filters() {
        assert_eq!(
            completeness_args(Some(0.5), None).filter(),
            Some(FillFilter::AtLeast(0.5))
        );
        assert_eq!(
            completeness_args(None, Some(vec![0.1, 0.9])).filter(),
            Some(FillFilter::Between(0.1, 0.9))
        );
        assert_eq!(completeness_args(None, None).filter(), None);
        assert_eq!(
            completeness_args(None, None).stat(),
            FillStat::Ratio { digits: Some(2) }
        );
    }
}
