use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use sowfill::{
    ExtractConfig, MappingReport, PreviewReport, SowConfig, extract_placeholders, load_workbook, output_filename,
    render_files,
};

#[derive(Parser)]
#[command(name = "sowfill")]
#[command(author, version, about = "Fill a Statement of Work template from a budget workbook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the template and write the resulting document
    Generate {
        /// Input workbook with Variables and Budget sheets
        #[arg(short, long)]
        excel: PathBuf,

        /// Word template (.docx)
        #[arg(short, long)]
        template: PathBuf,

        /// Output document (defaults to SOW_<client>_<date>.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Fill the template and show a text preview instead of the document
    Preview {
        /// Input workbook with Variables and Budget sheets
        #[arg(short, long)]
        excel: PathBuf,

        /// Word template (.docx)
        #[arg(short, long)]
        template: PathBuf,

        /// Write the preview to this text file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Show the placeholder mappings read from a workbook
    Mappings {
        /// Input workbook with Variables and Budget sheets
        #[arg(short, long)]
        excel: PathBuf,

        /// Only show placeholders containing this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Name of the sheet holding placeholder/value pairs
    #[arg(long, default_value = "Variables")]
    variables_sheet: String,

    /// Name of the sheet holding budget phases
    #[arg(long, default_value = "Budget")]
    budget_sheet: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl CommonArgs {
    fn config(&self) -> SowConfig {
        SowConfig {
            extract: ExtractConfig {
                variables_sheet: self.variables_sheet.clone(),
                budget_sheet: self.budget_sheet.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            excel,
            template,
            output,
            common,
        } => {
            setup_logging(common.verbose);
            generate_document(excel, template, output, &common.config())
        }
        Commands::Preview {
            excel,
            template,
            output,
            common,
        } => {
            setup_logging(common.verbose);
            preview_document(excel, template, output, &common.config())
        }
        Commands::Mappings {
            excel,
            search,
            json,
            common,
        } => {
            setup_logging(common.verbose);
            show_mappings(excel, search, json, &common.config())
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn generate_document(
    excel: PathBuf,
    template: PathBuf,
    output: Option<PathBuf>,
    config: &SowConfig,
) -> Result<()> {
    let rendered = render_files(&excel, &template, config).context("Failed to fill template")?;

    let output = output.unwrap_or_else(|| {
        let today = chrono::Local::now().date_naive();
        PathBuf::from(output_filename(&rendered.extraction.replacements, today))
    });
    rendered
        .package
        .save(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    info!("Output written to {:?}", output);
    info!(
        "Complete: {} placeholders, {} paragraphs changed, {} budget rows updated, {} added, {} removed",
        rendered.extraction.replacements.len(),
        rendered.substitution.paragraphs_changed,
        rendered.reconcile.rows_updated(),
        rendered.reconcile.rows_added,
        rendered.reconcile.rows_removed()
    );
    if rendered.reconcile.table_index.is_none() {
        info!("No budget table found in template; only placeholders were filled");
    }

    Ok(())
}

fn preview_document(
    excel: PathBuf,
    template: PathBuf,
    output: Option<PathBuf>,
    config: &SowConfig,
) -> Result<()> {
    let rendered = render_files(&excel, &template, config).context("Failed to fill template")?;

    match output {
        Some(path) => {
            PreviewReport::new(&rendered.package.document)
                .write_file(&path)
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("Preview written to {:?}", path);
        }
        None => println!("{}", rendered.preview()),
    }

    Ok(())
}

fn show_mappings(
    excel: PathBuf,
    search: Option<String>,
    json: bool,
    config: &SowConfig,
) -> Result<()> {
    info!("Loading workbook from {:?}", excel);
    let workbook = load_workbook(&excel).context("Failed to read workbook")?;
    let extraction =
        extract_placeholders(&workbook, &config.extract).context("Failed to extract placeholders")?;
    let report = MappingReport::from_extraction(&extraction);

    let Some(term) = search else {
        if json {
            println!("{}", report.to_json()?);
        } else {
            print!("{}", report.format());
        }
        return Ok(());
    };

    let hits = report.search(&term);
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        println!("No matching placeholders found");
    } else {
        println!("Search Results for '{}'", term);
        println!("{}", "-".repeat(term.len() + 21));
        for entry in hits {
            println!("{} -> {} ({:?})", entry.placeholder, entry.value, entry.source);
        }
    }

    Ok(())
}
