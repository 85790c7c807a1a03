use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use academic_dataset_synth::analysis;
use academic_dataset_synth::export;
use academic_dataset_synth::logging;
use academic_dataset_synth::report;
use academic_dataset_synth::{AcademicCalendar, DatasetGenerator, GeneratorConfig};

#[derive(Parser)]
#[command(name = "academic-dataset-synth")]
#[command(about = "Synthetic academic dataset generator for dashboard demos", long_about = None)]
struct Cli {
    /// JSON file overriding any part of the default configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Use this date instead of the wall clock to pick the academic year
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Generation {
    #[arg(long, default_value_t = 100)]
    students: usize,
    /// Seed for reproducible output; entropy when omitted
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a dataset as JSON
    Generate {
        #[command(flatten)]
        generation: Generation,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Print summary statistics for a generated dataset
    Analyze {
        #[command(flatten)]
        generation: Generation,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        generation: Generation,
        #[arg(long)]
        program: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export one CSV row per submission
    Export {
        #[command(flatten)]
        generation: Generation,
        #[arg(long)]
        csv: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };
    let calendar = match cli.today {
        Some(today) => AcademicCalendar::new(&config.calendar, today),
        None => AcademicCalendar::from_clock(&config.calendar),
    }
    .context("invalid calendar configuration")?;

    match cli.command {
        Commands::Generate {
            generation,
            out,
            pretty,
        } => {
            let dataset = build_generator(config, calendar, &generation)?
                .generate_dataset(generation.students);
            let json = if pretty {
                serde_json::to_string_pretty(&dataset)?
            } else {
                serde_json::to_string(&dataset)?
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!(
                        "Wrote {} students to {}.",
                        dataset.students.len(),
                        path.display()
                    );
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(json.as_bytes())?;
                    writeln!(stdout)?;
                }
            }
        }
        Commands::Analyze { generation } => {
            let mut generator = build_generator(config, calendar, &generation)?;
            let today = generator.calendar().current_date;
            let students = generator.generate(generation.students);
            let summary = analysis::analyze(&students);

            println!("Students: {} (current date {})", summary.total_students, today);
            println!("Submissions by status:");
            for (status, count) in &summary.submission_stats {
                println!("- {}: {}", status.as_str(), count);
            }
            println!("Grades by bracket:");
            for (bracket, count) in &summary.grade_distribution {
                println!("- {}-{}: {}", bracket, bracket + 9, count);
            }
            println!("Programs:");
            for (program, count) in &summary.program_distribution {
                println!("- {program}: {count}");
            }
            println!(
                "Risk: {} high, {} medium, {} low",
                summary.risk.high, summary.risk.medium, summary.risk.low
            );
        }
        Commands::Report {
            generation,
            program,
            out,
        } => {
            let mut generator = build_generator(config, calendar, &generation)?;
            let today = generator.calendar().current_date;
            let deadline_days = generator.config().marking.deadline_days;
            let students = generator.generate(generation.students);
            let report = report::build_report(program.as_deref(), today, deadline_days, &students);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { generation, csv } => {
            let students =
                build_generator(config, calendar, &generation)?.generate(generation.students);
            let written = export::write_submissions_csv(&csv, &students)
                .with_context(|| format!("failed to export {}", csv.display()))?;
            println!("Exported {written} submissions to {}.", csv.display());
        }
    }

    Ok(())
}

fn build_generator(
    config: GeneratorConfig,
    calendar: AcademicCalendar,
    generation: &Generation,
) -> anyhow::Result<DatasetGenerator<StdRng>> {
    let rng = match generation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    DatasetGenerator::new(config, calendar, rng).context("invalid generator configuration")
}
