use clap::{Parser, Subcommand};
use retouch::imaging::{GradientRenderer, SystemFontCatalog};
use retouch::{config, output, process};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Recipe selection shared by commands that read one.
#[derive(clap::Args, Clone)]
struct RecipeArgs {
    /// Recipe file (defaults to ./recipe.toml when present, else stock settings)
    #[arg(long)]
    recipe: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Deterministic photo edits from a TOML recipe")]
#[command(long_about = "\
Deterministic photo edits from a TOML recipe

Every photo runs through the same fixed chain of stages:

  rotate -> aspect crop -> tone -> vignette -> text -> filter -> sky style

For each input, the edited JPEG and the untouched original are written side
by side. Per-channel splits and a false-color rendition are optional.

  edited/
  ├── report.json              # Dimensions and outputs per input
  ├── dawn-edited.jpg          # Final result
  ├── dawn-original.png        # Retained original
  ├── dawn-red.png             # [output] channels = true
  └── dawn-viridis.png         # [output] colormap = \"viridis\"

Run 'retouch gen-recipe' to generate a documented recipe.toml.
Set RUST_LOG=retouch=debug to trace every stage.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Edit photos (files or directories) with a recipe
    Edit {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        recipe: RecipeArgs,

        /// Output directory
        #[arg(long, short, default_value = "edited")]
        output: PathBuf,

        /// Disable the edit cache and re-run every input
        #[arg(long)]
        no_cache: bool,
    },
    /// Validate a recipe and print what it will do
    Check(RecipeArgs),
    /// Print a stock recipe.toml with all options documented
    GenRecipe,
    /// List the colormap names accepted by [output] colormap
    Palettes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retouch=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Command::Edit {
            inputs,
            recipe,
            output: output_dir,
            no_cache,
        } => {
            let recipe = resolve_recipe(&recipe)?;
            let inputs = process::collect_inputs(&inputs)?;
            init_thread_pool(&recipe.processing);

            let fonts = SystemFontCatalog::load();
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process(
                &inputs,
                &recipe,
                &output_dir,
                !no_cache,
                &fonts,
                &GradientRenderer,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let result = result?;
            println!("Cache: {}", result.cache_stats);
            println!(
                "Report: {}",
                output_dir.join(process::REPORT_FILENAME).display()
            );
        }
        Command::Check(recipe) => {
            let recipe = resolve_recipe(&recipe)?;
            output::print_recipe_summary(&recipe);
            println!("==> Recipe is valid");
        }
        Command::GenRecipe => {
            print!("{}", config::stock_recipe_toml());
        }
        Command::Palettes => {
            output::print_palettes();
        }
    }

    Ok(())
}

/// An explicit `--recipe` must exist; otherwise look in the working directory.
fn resolve_recipe(args: &RecipeArgs) -> Result<config::RecipeConfig, config::ConfigError> {
    match &args.recipe {
        Some(path) => config::load_recipe(path),
        None => config::discover_recipe(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
