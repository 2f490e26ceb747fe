use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use tablegraph_core::{fingerprint, Config, Level, Report};
use tablegraph_engine::validate;
use tablegraph_schema::{RelationshipGraph, Schema};

/// tablegraph - relationship validation for declarative data models
#[derive(Parser)]
#[command(name = "tablegraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: tablegraph.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one schema file, or every *.json schema under a directory
    Check {
        /// Schema file or directory
        path: PathBuf,

        /// Write report.json here (a directory when PATH is a directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write a markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// Print the JSON report instead of the summary (an array when PATH is a directory)
        #[arg(long)]
        json: bool,
    },

    /// Print a schema's relationship graph
    Graph {
        /// Schema file
        schema: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },

    /// Show which tables a table reaches and which tables reach it
    Impact {
        /// Schema file
        schema: PathBuf,

        /// Table name
        table: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GraphFormat {
    Text,
    Dot,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new("tablegraph.toml").exists() {
        Config::from_file(Path::new("tablegraph.toml")).context("Failed to load tablegraph.toml")?
    } else {
        tracing::info!("No config file found, using defaults");
        Config::default()
    };

    match cli.command {
        Commands::Check { path, output, markdown, json } => {
            check_command(&config, &path, output.as_deref(), markdown.as_deref(), json)
        }
        Commands::Graph { schema, format } => graph_command(&schema, format),
        Commands::Impact { schema, table } => impact_command(&schema, &table),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Check command - validate every schema found at `path`
fn check_command(
    config: &Config,
    path: &Path,
    output: Option<&Path>,
    markdown: Option<&Path>,
    json: bool,
) -> Result<()> {
    let schema_paths = discover_schemas(path)?;
    if schema_paths.is_empty() {
        return Err(anyhow::anyhow!("No *.json schema files found under {}", path.display()));
    }

    let into_dir = path.is_dir();
    if into_dir {
        if let Some(dir) = output {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
        }
    }

    let mut reports = Vec::new();
    let mut load_failures = 0;

    for schema_path in &schema_paths {
        tracing::info!(path = %schema_path.display(), "checking schema");

        let report = match check_schema(config, schema_path) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗ Failed to load".red().bold(), schema_path.display(), e);
                load_failures += 1;
                continue;
            }
        };

        if let Some(out) = output {
            let report_path = if into_dir {
                out.join(report_file_name(path, schema_path))
            } else {
                out.to_path_buf()
            };
            report.save_to_file(&report_path)
                .with_context(|| format!("Failed to write report {}", report_path.display()))?;
            tracing::info!(path = %report_path.display(), "report saved");
        }

        if !json {
            print_report_summary(&report);
        }

        reports.push(report);
    }

    if json && (into_dir || !reports.is_empty()) {
        println!("{}", reports_json(&reports, into_dir)?);
    }

    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(&reports))
            .with_context(|| format!("Failed to write markdown report {}", md_path.display()))?;
        tracing::info!(path = %md_path.display(), "markdown report saved");
    }

    // Exit with error code if any schema failed
    if load_failures > 0 || reports.iter().any(|r| config.should_fail(r)) {
        std::process::exit(1);
    }

    Ok(())
}

/// Load, validate and build the report for one schema file
fn check_schema(config: &Config, schema_path: &Path) -> Result<Report> {
    let (schema, contents) = Schema::load(schema_path)?;

    let issues = config.apply(validate(&schema));

    Ok(Report::from_issues(issues)
        .with_source(schema_path.display().to_string())
        .with_fingerprint(fingerprint(contents.as_bytes()))
        .with_counts(schema.tables.len(), schema.relationship_count()))
}

/// One report as an object, or every report as an array
fn reports_json(reports: &[Report], as_array: bool) -> Result<String> {
    match reports {
        [report] if !as_array => Ok(report.to_json()?),
        _ => Ok(serde_json::to_string_pretty(reports)?),
    }
}

/// Schema files at `path`: the file itself, or every *.json below a directory
fn discover_schemas(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(anyhow::anyhow!("Schema path {} does not exist", path.display()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        let is_json = entry.path().extension().map_or(false, |ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

/// `event-app/schema.json` under `root` -> `event-app__schema.report.json`
fn report_file_name(root: &Path, schema_path: &Path) -> String {
    let relative = schema_path.strip_prefix(root).unwrap_or(schema_path);
    let stem = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("__");
    format!("{}.report.json", stem)
}

/// Graph command - print nodes and labelled edges
fn graph_command(schema_path: &Path, format: GraphFormat) -> Result<()> {
    let schema = Schema::from_file(schema_path)?;
    let graph = RelationshipGraph::build(&schema);

    if format == GraphFormat::Dot {
        print!("{}", graph.to_dot());
        return Ok(());
    }

    println!("{} ({})", "Tables".bold(), graph.len());
    for (index, name) in graph.nodes().iter().enumerate() {
        println!("  {}. {}", index, name.green());
        for edge in graph.edges(index) {
            println!("       {} -> {}", edge.field, graph.name(edge.target).yellow());
        }
    }

    if !graph.is_empty() {
        let order: Vec<&str> = graph.reachable_from(0).into_iter().map(|i| graph.name(i)).collect();
        println!();
        println!("{} {}: {}", "Depth-first order from".bold(), graph.name(0), order.join(", "));
    }

    Ok(())
}

/// Impact command - tables reached from and referring to a table
fn impact_command(schema_path: &Path, table: &str) -> Result<()> {
    let schema = Schema::from_file(schema_path)?;
    let graph = RelationshipGraph::build(&schema);

    let index = graph.index_of(table).ok_or_else(|| {
        anyhow::anyhow!(
            "Table '{}' not found. Known tables: {}",
            table,
            graph.nodes().join(", ")
        )
    })?;

    let reaches: Vec<&str> = graph
        .reachable_from(index)
        .into_iter()
        .skip(1)
        .map(|i| graph.name(i))
        .collect();
    let referrers: Vec<&str> = graph.referrers(index).into_iter().map(|i| graph.name(i)).collect();

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Relationship Impact Analysis".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();
    println!("{} {}", "Table:".bold(), table.green());
    println!();

    println!("{} {}", "Reaches:".bold(), reaches.len());
    for name in &reaches {
        println!("  - {}", name);
    }
    println!();

    println!("{} {}", "Referenced by:".bold(), referrers.len());
    for name in &referrers {
        println!("  - {}", name.yellow());
    }
    println!();

    if referrers.is_empty() {
        println!("{}", "✓ No other table depends on this table".green());
    } else {
        println!("{}", "⚠ Changes to this table may affect the tables above".yellow().bold());
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());

    Ok(())
}

/// Print report summary to stdout
fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Relationship Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if let Some(source) = &report.source {
        println!("Schema: {}", source);
    }
    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!(
        "  Checked {} tables, {} relationship fields",
        report.summary.tables_checked, report.summary.relationships_checked
    );
    println!("  Total issues: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", report.summary.errors.to_string().red().bold());
    } else {
        println!("  Errors:   {}", report.summary.errors.to_string().green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", report.summary.warnings.to_string().yellow());
    } else {
        println!("  Warnings: {}", report.summary.warnings.to_string().green());
    }
    println!();

    if report.issues.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Issues:".bold());
        for issue in &report.issues {
            let level_str = match issue.level {
                Level::Error => "ERROR".red().bold(),
                Level::Warning => "WARN".yellow().bold(),
            };

            println!("  [{}] {}: {}", level_str, issue.code, issue.message);
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

/// Generate markdown report
fn generate_markdown_report(reports: &[Report]) -> String {
    let mut md = String::new();

    md.push_str("# Schema Relationship Report\n\n");

    for report in reports {
        if let Some(source) = &report.source {
            md.push_str(&format!("## {}\n\n", source));
        }
        md.push_str(&format!("**Version:** {}\n\n", report.version));
        md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));
        if let Some(fp) = &report.fingerprint {
            md.push_str(&format!("**SHA-256:** `{}`\n\n", fp));
        }

        md.push_str(&format!("- Tables checked: {}\n", report.summary.tables_checked));
        md.push_str(&format!("- Relationship fields: {}\n", report.summary.relationships_checked));
        md.push_str(&format!("- Errors: {}\n", report.summary.errors));
        md.push_str(&format!("- Warnings: {}\n", report.summary.warnings));
        md.push('\n');

        if report.issues.is_empty() {
            md.push_str("✅ **No issues found!**\n\n");
            continue;
        }

        md.push_str("| Level | Code | Message |\n|-------|------|---------|\n");
        for issue in &report.issues {
            let level_emoji = match issue.level {
                Level::Error => "❌",
                Level::Warning => "⚠️",
            };
            md.push_str(&format!(
                "| {} {} | `{}` | {} |\n",
                level_emoji,
                issue.level,
                issue.code,
                issue.message.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}
