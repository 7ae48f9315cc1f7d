//! detprep: object-detection dataset preparation.
//!
//! detprep turns a YOLO-style export (normalized center boxes, one label
//! file per image) into a per-category layout with pixel-space CSV boxes,
//! and from there into COCO JSON documents, one per split. It can also
//! write a standalone JSON document next to every image.
//!
//! # Modules
//!
//! - [`ir`]: Records and file formats (YOLO, CSV, label map, COCO, YAML)
//! - [`layout`]: The on-disk category layout and the reorganize step
//! - [`collect`]: Collecting one split into records with sequential ids
//! - [`conversion`]: The COCO driver and the run report
//! - [`individual`]: Per-image JSON generation
//! - [`error`]: Error types for detprep operations

pub mod collect;
pub mod conversion;
pub mod error;
pub mod individual;
pub mod ir;
pub mod layout;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub use conversion::RunReport;
pub use error::DetprepError;

use conversion::{ConvertOptions, DEFAULT_SUPERCATEGORY};
use ir::io_data_yaml::{read_data_yaml, read_yaml_documents};
use ir::io_label_map::read_label_map;
use ir::LabelMap;

/// The detprep CLI application.
#[derive(Parser)]
#[command(name = "detprep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Reorganize raw train/val folders into the category layout.
    Reorganize(ReorganizeArgs),
    /// Write one COCO JSON file per split of a category.
    Coco(CocoArgs),
    /// Write a JSON document next to every image under data/origin.
    Individual(IndividualArgs),
    /// Summarize a dataset descriptor YAML file.
    Describe(DescribeArgs),
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Output format for the run report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(clap::Args)]
struct ReorganizeArgs {
    /// Dataset root holding train/ and val/.
    #[arg(long, env = "DETPREP_ROOT", default_value = ".")]
    root: PathBuf,

    /// Category folder to create under the root.
    #[arg(long, env = "DETPREP_CATEGORY", default_value = "tomatoes")]
    category: String,

    #[command(flatten)]
    report: ReportArgs,
}

#[derive(clap::Args)]
struct CocoArgs {
    /// Dataset root holding the category folder.
    #[arg(long, env = "DETPREP_ROOT", default_value = ".")]
    root: PathBuf,

    /// Output directory for the COCO files.
    #[arg(long, env = "DETPREP_OUT", default_value = "coco")]
    out: PathBuf,

    /// Category folder to convert.
    #[arg(long, env = "DETPREP_CATEGORY", default_value = "tomatoes")]
    category: String,

    /// Splits to convert.
    #[arg(long, num_args = 1.., default_values = ["train", "val", "test"])]
    splits: Vec<String>,

    /// Supercategory stamped on every category.
    #[arg(long, env = "DETPREP_SUPERCATEGORY", default_value = DEFAULT_SUPERCATEGORY)]
    supercategory: String,

    #[command(flatten)]
    report: ReportArgs,
}

#[derive(clap::Args)]
struct IndividualArgs {
    /// Dataset root holding data/origin/ and annotations/.
    #[arg(long, env = "DETPREP_ROOT", default_value = ".")]
    root: PathBuf,

    /// Label map JSON used to name categories.
    #[arg(long, env = "DETPREP_LABELMAP", conflicts_with = "data_yaml")]
    labelmap: Option<PathBuf>,

    /// Dataset descriptor whose `names` name the categories.
    #[arg(long, env = "DETPREP_DATA_YAML")]
    data_yaml: Option<PathBuf>,

    /// Seed for the synthetic ids; random when omitted.
    #[arg(long, env = "DETPREP_SEED")]
    seed: Option<u64>,

    /// Timestamp (seconds) mixed into the synthetic ids; now when omitted.
    #[arg(long, env = "DETPREP_TIMESTAMP")]
    timestamp: Option<u64>,

    #[command(flatten)]
    report: ReportArgs,
}

#[derive(clap::Args)]
struct DescribeArgs {
    /// Dataset descriptor YAML file.
    input: PathBuf,

    /// Print every document of a multi-document file instead.
    #[arg(long)]
    all_documents: bool,
}

/// Run the detprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DetprepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Reorganize(args)) => run_reorganize(args),
        Some(Commands::Coco(args)) => run_coco(args),
        Some(Commands::Individual(args)) => run_individual(args),
        Some(Commands::Describe(args)) => run_describe(args),
        None => {
            println!("detprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Object-detection dataset preparation.");
            println!();
            println!("Run 'detprep --help' for usage information.");
            Ok(())
        }
    }
}

fn run_reorganize(args: ReorganizeArgs) -> Result<(), DetprepError> {
    let report = layout::reorganize::reorganize(&args.root, &args.category)?;
    finish(report, args.report.report)
}

fn run_coco(args: CocoArgs) -> Result<(), DetprepError> {
    let options = ConvertOptions {
        splits: args.splits,
        supercategory: args.supercategory,
        ..Default::default()
    };
    let report = conversion::convert_category(&args.root, &args.out, &args.category, &options)?;
    finish(report, args.report.report)
}

fn run_individual(args: IndividualArgs) -> Result<(), DetprepError> {
    let names = load_names(args.labelmap.as_deref(), args.data_yaml.as_deref())?;
    let timestamp = args.timestamp.unwrap_or_else(now_secs);

    let report = match args.seed {
        Some(seed) => individual::generate_for_root(
            &args.root,
            &names,
            &mut StdRng::seed_from_u64(seed),
            timestamp,
        )?,
        None => individual::generate_for_root(&args.root, &names, &mut rand::rng(), timestamp)?,
    };
    finish(report, args.report.report)
}

fn run_describe(args: DescribeArgs) -> Result<(), DetprepError> {
    if args.all_documents {
        let documents = read_yaml_documents(&args.input)?;
        for (index, document) in documents.iter().enumerate() {
            let yaml =
                serde_yaml::to_string(document).map_err(|source| DetprepError::DataYamlWrite {
                    path: args.input.clone(),
                    source,
                })?;
            println!("--- document {}", index + 1);
            print!("{}", yaml);
        }
        return Ok(());
    }

    let data = read_data_yaml(&args.input)?;
    println!("Dataset descriptor: {}", args.input.display());
    println!("  classes: {}", data.class_count());
    for (index, name) in data.names.iter().enumerate() {
        println!("    {}: {}", index, name);
    }
    println!("  path:  {}", data.path.as_deref().unwrap_or("-"));
    println!("  train: {}", data.train_path().as_deref().unwrap_or("-"));
    println!("  val:   {}", data.val_path().as_deref().unwrap_or("-"));
    if let Some(test) = &data.test {
        println!("  test:  {}", test);
    }
    Ok(())
}

fn load_names(labelmap: Option<&Path>, data_yaml: Option<&Path>) -> Result<LabelMap, DetprepError> {
    match (labelmap, data_yaml) {
        (Some(path), _) => read_label_map(path),
        (None, Some(path)) => Ok(read_data_yaml(path)?.label_map()),
        (None, None) => Ok(LabelMap::new()),
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Prints the report and turns recorded failures into an error.
fn finish(report: RunReport, format: ReportFormat) -> Result<(), DetprepError> {
    match format {
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).map_err(|source| DetprepError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", report),
    }

    match report.failure_count() {
        0 => Ok(()),
        failures => Err(DetprepError::RunFailed { failures }),
    }
}
