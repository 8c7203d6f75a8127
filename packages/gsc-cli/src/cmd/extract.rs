//! Extraction command.
//!
//! Drives one fetch session per requested report and writes the
//! resulting tables as CSV files. Date validation happens here, before
//! the engine ever runs.

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, ValueEnum};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Select};

use gsc_client::SearchConsoleClient;
use gsc_extract::{DimensionSet, FetchError, FetchRequest, Fetcher, ReportTable};

use crate::export;
use crate::progress::{extraction_bar, BarSink};

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Property to extract; picked interactively when omitted
    #[arg(long)]
    pub site: Option<String>,

    /// Start date (YYYY-MM-DD); defaults to 30 days ago
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD); defaults to yesterday
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Report to extract; picked interactively when omitted
    #[arg(long, value_enum)]
    pub report: Option<ReportKind>,

    /// Directory the CSV files are written into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Breakdown by destination page
    Pages,
    /// Breakdown by search query
    Queries,
    /// Joint breakdown by page and query
    PagesQueries,
    /// All three breakdowns
    All,
}

/// One planned fetch session and its output file.
struct ReportPlan {
    label: &'static str,
    file_name: &'static str,
    dimensions: DimensionSet,
}

fn plans(kind: ReportKind) -> Vec<ReportPlan> {
    let pages = ReportPlan {
        label: "page",
        file_name: "pages_data.csv",
        dimensions: DimensionSet::pages(),
    };
    let queries = ReportPlan {
        label: "query",
        file_name: "queries_data.csv",
        dimensions: DimensionSet::queries(),
    };
    let joint = ReportPlan {
        label: "page and query",
        file_name: "pages_queries_data.csv",
        dimensions: DimensionSet::pages_and_queries(),
    };

    match kind {
        ReportKind::Pages => vec![pages],
        ReportKind::Queries => vec![queries],
        ReportKind::PagesQueries => vec![joint],
        ReportKind::All => vec![pages, queries, joint],
    }
}

pub async fn run(client: &SearchConsoleClient, args: ExtractArgs) -> Result<()> {
    let site = match args.site {
        Some(site) => site,
        None => pick_site(client).await?,
    };

    let today = Local::now().date_naive();
    let start = args.start.unwrap_or_else(|| today - Duration::days(30));
    let end = args.end.unwrap_or_else(|| today - Duration::days(1));
    ensure!(start <= end, "start date {start} is after end date {end}");
    if (end - start).num_days() > 90 {
        println!(
            "{}",
            "Warning: ranges over 90 days can take a while to extract.".yellow()
        );
    }

    let kind = match args.report {
        Some(kind) => kind,
        None => pick_report()?,
    };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output directory {}", args.out.display()))?;

    // In all-reports mode an empty table still gets a header-only file,
    // so the set of output files is predictable.
    let write_empty = kind == ReportKind::All;
    let fetcher = Fetcher::new();

    for plan in plans(kind) {
        let bar = extraction_bar(plan.label);
        let sink = BarSink::new(bar.clone());
        let request = FetchRequest::new(&site, start, end, plan.dimensions.clone());

        let outcome = fetcher.fetch(client, &request, &sink).await;
        bar.finish_and_clear();

        let mut partial = false;
        match &outcome.fault {
            None => {}
            Some(FetchError::PermissionDenied { site }) => {
                print_access_denied(site);
                partial = true;
            }
            Some(err) => {
                println!(
                    "{}",
                    format!("Extraction of {} data failed: {err}", plan.label).red()
                );
                partial = true;
            }
        }

        let table = ReportTable::new(plan.dimensions, outcome.records);
        if table.is_empty() {
            if partial {
                continue;
            }
            println!("{}", format!("No {} data found.", plan.label).yellow());
            if !write_empty {
                continue;
            }
        }

        let path = args.out.join(plan.file_name);
        export::write_csv(&table, &path)?;
        let note = if partial { " (partial)" } else { "" };
        println!(
            "{}",
            format!("Saved {} {} rows{note} to {}", table.len(), plan.label, path.display())
                .green()
        );
    }

    Ok(())
}

async fn pick_site(client: &SearchConsoleClient) -> Result<String> {
    let sites = client.list_sites().await?;
    ensure!(!sites.is_empty(), "no properties found for this account");

    let items: Vec<String> = sites
        .iter()
        .map(|s| format!("{} ({})", s.site_url, s.permission_level))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a property")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(sites[selection].site_url.clone())
}

fn pick_report() -> Result<ReportKind> {
    let options = [
        "Extract page data",
        "Extract query data",
        "Extract page and query data",
        "Extract all three reports",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("What would you like to extract?")
        .items(&options)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => ReportKind::Pages,
        1 => ReportKind::Queries,
        2 => ReportKind::PagesQueries,
        3 => ReportKind::All,
        _ => unreachable!(),
    })
}

fn print_access_denied(site: &str) {
    println!("{}", "Access not authorized".red().bold());
    println!("You do not have sufficient rights on {site}.");
    println!("Check that the property was shared with your account in Search Console.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_report_kinds_plan_one_session() {
        assert_eq!(plans(ReportKind::Pages).len(), 1);
        assert_eq!(plans(ReportKind::Pages)[0].file_name, "pages_data.csv");
        assert_eq!(plans(ReportKind::Queries)[0].file_name, "queries_data.csv");
        assert_eq!(
            plans(ReportKind::PagesQueries)[0].file_name,
            "pages_queries_data.csv"
        );
    }

    #[test]
    fn all_plans_every_breakdown_in_order() {
        let all = plans(ReportKind::All);
        let files: Vec<&str> = all.iter().map(|p| p.file_name).collect();
        assert_eq!(
            files,
            vec!["pages_data.csv", "queries_data.csv", "pages_queries_data.csv"]
        );
        assert_eq!(all[2].dimensions, DimensionSet::pages_and_queries());
    }
}
