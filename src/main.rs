//! evalprep CLI - run-specific recipe and request configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evalprep::pipeline::{
    AddDatasets, CreateRequest, ResolvedRuns, UpdateRecipe, configure_process,
    create_variables_file,
};
use evalprep::{Config, WindowSpec};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "evalprep")]
#[command(version)]
#[command(about = "Prepare run-specific recipe and request files for model evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "evalprep.toml")]
    config: PathBuf,

    /// First year of the evaluation window
    #[arg(long, global = true, env = "START_YEAR")]
    start_year: Option<i32>,

    /// Number of years in the evaluation window
    #[arg(long, global = true, env = "NUMBER_OF_YEARS")]
    number_of_years: Option<u32>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert namelist files into dataset files
    AddDatasets {
        /// Directory containing *.nl files
        #[arg(short, long)]
        namelist_dir: PathBuf,

        /// Directory to write <basename>.yml files into
        #[arg(short, long, env = "DATASETS_LIST_DIR")]
        target_dir: PathBuf,

        /// Key the datasets by this facet instead of writing a list
        #[arg(long)]
        key_facet: Option<String>,
    },

    /// Overlay reference and evaluation runs onto a recipe, in place
    UpdateRecipe {
        /// Recipe to update
        #[arg(short, long, env = "RECIPE_PATH")]
        recipe: PathBuf,

        /// Namelist file whose datasets are appended to the recipe
        #[arg(long)]
        extra_datasets: Option<PathBuf>,
    },

    /// Assemble the post-processing request for one run
    CreateRequest {
        /// Run label (table key or suite id)
        #[arg(long, default_value = "evaluation")]
        run: String,

        /// Output path (.json, or .cfg/.ini for sectioned text)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the <mip>/<variable> list a recipe needs
    CreateVariables {
        /// Recipe to read
        #[arg(short, long, env = "RECIPE_PATH")]
        recipe: PathBuf,

        /// Output path
        #[arg(short, long, env = "VARIABLES_PATH")]
        output: PathBuf,
    },

    /// Write the evaluation tool's user configuration
    ConfigureProcess {
        /// Output path (defaults to [user_config] config_path)
        #[arg(short, long, env = "USER_CONFIG_PATH")]
        output: Option<PathBuf>,
    },

    /// Validate configuration and resolve both runs
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a global tracing subscriber was already set");
    }
}

fn print_example_config() {
    let example = r#"# evalprep configuration file
# ${VAR} references are expanded from the environment.

[window]
start_year = 1993
number_of_years = 10

[datasets]
project = "CMIP6"

[overlay]
project = "ESMVal"
exp = "amip"
activity = "ESMVal"
# institute = "MOHC"

[runs]
# JSON or YAML table keyed by run label; takes precedence when non-empty
# table = "${CYLC_WORKFLOW_SHARE_DIR}/etc/runs.json"

[runs.reference]
model_id = "HadGEM3-GC31-LL"
suite_id = "u-bv526"
calendar = "360_day"
variant_label = "r5i1p1f3"
label_for_plots = "HadGEM3-GC3.1 N96ORCA1"

[runs.evaluation]
model_id = "HadGEM3-GC5E-LL"
suite_id = "u-cw673"
calendar = "gregorian"
variant_label = "r1i1p1f1"

[request]
template = "request_defaults.toml"
institution_id = "MOHC"
root_proc_dir = "${CYLC_WORKFLOW_SHARE_DIR}/proc"
root_data_dir = "${CYLC_WORKFLOW_SHARE_DIR}/data"
variable_list_file = "${CYLC_WORKFLOW_SHARE_DIR}/etc/variables.txt"
extract = true
# raw_data_path = "/data/raw"   # required when extract = false

[user_config]
share_dir = "${CYLC_WORKFLOW_SHARE_DIR}"
config_path = "${CYLC_WORKFLOW_SHARE_DIR}/etc/user-config.yml"
output_dir = "${CYLC_WORKFLOW_SHARE_DIR}/output"
max_parallel_tasks = 4

[user_config.drs]
CMIP6 = "BADC"
OBS = "default"

[user_config.rootpath]
CMIP6 = "/badc/cmip6/data/CMIP6"
OBS = "/data/obs"
"#;
    println!("{example}");
}

fn load_config(path: &Path) -> Result<Config> {
    Config::from_file(path).with_context(|| format!("Failed to load config from {path:?}"))
}

fn resolve_window(cli: &Cli, config: &Config) -> Result<WindowSpec> {
    let (start, years) = config
        .resolve_window(cli.start_year, cli.number_of_years)
        .context("Failed to resolve evaluation window")?;
    Ok(WindowSpec::new(start, years))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match &cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let config = load_config(&cli.config)?;
            let window = resolve_window(&cli, &config)?;
            let inclusive = window.inclusive().context("Invalid evaluation window")?;
            let runs = ResolvedRuns::resolve(&config).context("Failed to resolve runs")?;

            info!("Configuration is valid");
            info!(
                "  Window: {}-{} ({} years)",
                inclusive.start_year, inclusive.end_year, window.number_of_years
            );
            info!(
                "  Reference: {} / {} ({})",
                runs.reference.model_id, runs.reference.suite_id, runs.reference.alias
            );
            info!(
                "  Evaluation: {} / {} ({})",
                runs.evaluation.model_id, runs.evaluation.suite_id, runs.evaluation.alias
            );
        }

        Commands::AddDatasets {
            namelist_dir,
            target_dir,
            key_facet,
        } => {
            let config = load_config(&cli.config)?;
            let window = resolve_window(&cli, &config)?;
            let task = AddDatasets {
                namelist_dir: namelist_dir.clone(),
                target_dir: target_dir.clone(),
                key_facet: key_facet.clone(),
                project: config.datasets.project.clone(),
            };
            let written = task
                .run(window)
                .with_context(|| format!("Failed to add datasets from {namelist_dir:?}"))?;
            for path in &written {
                println!("{}", path.display());
            }
        }

        Commands::UpdateRecipe {
            recipe,
            extra_datasets,
        } => {
            let config = load_config(&cli.config)?;
            let window = resolve_window(&cli, &config)?;
            let task = UpdateRecipe {
                recipe_path: recipe.clone(),
                extra_datasets: extra_datasets.clone(),
            };
            task.run(&config, window)
                .with_context(|| format!("Failed to update recipe {recipe:?}"))?;
        }

        Commands::CreateRequest { run, output } => {
            let config = load_config(&cli.config)?;
            let window = resolve_window(&cli, &config)?;
            let task = CreateRequest {
                run_label: run.clone(),
                output: output.clone(),
            };
            task.run(&config, window)
                .with_context(|| format!("Failed to create request for run '{run}'"))?;
        }

        Commands::CreateVariables { recipe, output } => {
            let variables = create_variables_file(recipe, output)
                .with_context(|| format!("Failed to create variables file from {recipe:?}"))?;
            info!(count = variables.len(), "Variables written");
        }

        Commands::ConfigureProcess { output } => {
            let config = load_config(&cli.config)?;
            let target = configure_process(&config, output.as_deref())
                .context("Failed to write user configuration")?;
            println!("{}", target.display());
        }
    }

    Ok(())
}
