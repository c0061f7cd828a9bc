//! Lic 命令行程序入口
//! 由模型描述生成说明书页面并保存为 .lic 文件，或查看已有文件的概要

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lic_core::config::{ImportOptions, LayoutConfig};
use lic_core::render::EstimatingSizeProvider;
use lic_core::Document;
use lic_file::{import, native, DocumentMetadata};

#[derive(Parser, Debug)]
#[command(name = "lic", version, about = "Generate building instruction books")]
struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate instruction pages from a model description
    Generate {
        /// Model description (JSON)
        model: PathBuf,

        /// Output .lic file
        #[arg(short, long)]
        output: PathBuf,

        /// Layout configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Add a title page
        #[arg(long)]
        title_page: bool,

        /// Steps placed on each page
        #[arg(long, default_value_t = 1)]
        steps_per_page: usize,

        /// Hide parts lists
        #[arg(long)]
        no_pli: bool,
    },

    /// Print a summary of a .lic file
    Info {
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )?;
    Ok(())
}

fn load_config(path: &Path) -> Result<LayoutConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading layout config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing layout config {}", path.display()))?;
    Ok(config)
}

fn generate(
    model_path: &Path,
    output: &Path,
    config: Option<&Path>,
    options: ImportOptions,
) -> Result<()> {
    if options.steps_per_page == 0 {
        bail!("--steps-per-page must be at least 1");
    }
    let model = import::import_model(model_path)
        .with_context(|| format!("importing {}", model_path.display()))?;

    let mut doc = Document::new(model, EstimatingSizeProvider::default());
    if let Some(path) = config {
        doc = doc.with_config(load_config(path)?);
    }
    doc.import_model(&options)?;

    let mut metadata = DocumentMetadata::for_model(doc.model());
    native::save_document(output, &doc, &mut metadata)
        .with_context(|| format!("saving {}", output.display()))?;
    info!(
        "Wrote {} with {} pages",
        output.display(),
        doc.state().page_count(true)
    );
    Ok(())
}

fn print_info(path: &Path) -> Result<()> {
    let (metadata, doc) = native::open(path, EstimatingSizeProvider::default())
        .with_context(|| format!("opening {}", path.display()))?;
    let state = doc.state();

    println!("{}", metadata.title);
    println!("  model:     {}", doc.model_name(true));
    println!("  created:   {}", metadata.created_at.format("%Y-%m-%d %H:%M"));
    println!("  modified:  {}", metadata.modified_at.format("%Y-%m-%d %H:%M"));
    println!(
        "  pages:     {}{}",
        state.page_count(false),
        if state.title_page.is_some() { " + title page" } else { "" }
    );
    println!("  steps:     {}", state.steps.len());
    println!("  PLI items: {}", state.pli_items.len());

    let submodels = doc.submodels();
    if !submodels.is_empty() {
        println!("  submodels:");
        for usage in submodels {
            println!("    {} x{} (step {})", usage.filename, usage.quantity, usage.step);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Generate {
            model,
            output,
            config,
            title_page,
            steps_per_page,
            no_pli,
        } => {
            let options = ImportOptions {
                steps_per_page,
                include_title_page: title_page,
                include_pli: !no_pli,
            };
            generate(&model, &output, config.as_deref(), options)
        }
        Command::Info { file } => print_info(&file),
    }
}
