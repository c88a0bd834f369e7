use crate::infra::Catalog;
use clap::{Args, ValueEnum};
use sekolah_okupasi::catalog::{pagination::DEFAULT_PAGE_SIZE, SeedData};
use sekolah_okupasi::error::AppError;
use sekolah_okupasi::matching::SchoolStats;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct StatsArgs {
    /// Occupation code to rank schools against (exact, case-sensitive)
    pub(crate) occupation_code: String,
    /// Seed snapshot providing the catalog
    #[arg(long, default_value = "data/seed.json")]
    pub(crate) seed: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    /// Only print the first N schools
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct SeedCheckArgs {
    /// Seed snapshot to validate
    #[arg(default_value = "data/seed.json")]
    pub(crate) path: PathBuf,
}

const CSV_HEADER: [&str; 6] = [
    "rank",
    "school",
    "city",
    "matching_competencies",
    "total_competencies",
    "percentage",
];

/// One line of the ranking export.
#[derive(Debug, Serialize)]
struct StatsRow<'a> {
    rank: usize,
    school: &'a str,
    city: &'a str,
    matching_competencies: u32,
    total_competencies: u32,
    percentage: String,
}

pub(crate) fn run_stats_report(args: StatsArgs) -> Result<(), AppError> {
    let StatsArgs {
        occupation_code,
        seed,
        format,
        limit,
    } = args;

    let catalog = Catalog::bootstrap(Some(&seed), DEFAULT_PAGE_SIZE)?;
    let mut stats = catalog.stats.by_occupation(Some(&occupation_code))?;
    if let Some(limit) = limit {
        stats.schools.truncate(limit);
    }

    match format {
        OutputFormat::Table => print!("{}", render_table(&stats)),
        OutputFormat::Csv => print!("{}", String::from_utf8_lossy(&stats_csv(&stats)?)),
    }
    Ok(())
}

pub(crate) fn run_seed_check(args: SeedCheckArgs) -> Result<(), AppError> {
    let seed = SeedData::from_path(&args.path)?;
    let catalog = Catalog::new(DEFAULT_PAGE_SIZE);
    let summary = seed.apply(&*catalog.admin)?;

    println!("Seed snapshot {} is valid", args.path.display());
    println!("- {} concentrations", summary.concentrations);
    println!(
        "- {} occupations with {} competencies",
        summary.occupations, summary.competencies
    );
    println!("- {} schools", summary.schools);
    Ok(())
}

pub(crate) fn render_table(stats: &SchoolStats) -> String {
    let mut out = format!(
        "Schools ranked for {} ({})\n",
        stats.occupation_code, stats.occupation_name
    );
    if stats.schools.is_empty() {
        out.push_str("  no schools in catalog\n");
        return out;
    }

    let width = stats
        .schools
        .iter()
        .map(|entry| entry.school.name.chars().count())
        .max()
        .unwrap_or(0);
    for (index, entry) in stats.schools.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {:<width$}  {:>7.2}%  ({}/{})  {}\n",
            index + 1,
            entry.school.name,
            entry.percentage,
            entry.matching_competencies,
            entry.total_competencies,
            entry.school.city,
        ));
    }
    out
}

/// Serialize the ranking as CSV. The header row is written even when no school is ranked.
pub(crate) fn stats_csv(stats: &SchoolStats) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|err| AppError::Export(Box::new(err)))?;
    for (index, entry) in stats.schools.iter().enumerate() {
        writer
            .serialize(StatsRow {
                rank: index + 1,
                school: &entry.school.name,
                city: &entry.school.city,
                matching_competencies: entry.matching_competencies,
                total_competencies: entry.total_competencies,
                percentage: format!("{:.2}", entry.percentage),
            })
            .map_err(|err| AppError::Export(Box::new(err)))?;
    }
    writer
        .into_inner()
        .map_err(|err| AppError::Io(err.into_error()))
}
