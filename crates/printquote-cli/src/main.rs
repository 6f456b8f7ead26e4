//! Printquote CLI: price G-code or slice a model locally, without the HTTP service.
//!
//! `slice` reads the same environment variables as the server (SLICER_PATH,
//! SLICER_PROFILES_DIR, TEMP_DIR, PRICING_*).

use anyhow::Context;
use clap::{Parser, Subcommand};
use printquote_cli::{format_quote, init_tracing, load_config, quote_gcode};
use printquote_core::models::{
    InfillType, Material, ModelExtension, PriceQuote, Quality, SlicerConfig,
};
use printquote_core::validation::validate_quantity;
use printquote_core::generate_output_name;
use printquote_processing::{PricingEngine, SlicerInvoker};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "printquote", about = "3D print slicing and quoting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price an existing G-code file
    Estimate {
        /// Path to the G-code file
        file: PathBuf,
        /// PLA, PETG, ABS or Resin
        #[arg(long, default_value = "PLA")]
        material: String,
        #[arg(long, default_value = "1")]
        quantity: i64,
        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
    /// Slice a model with the configured engine and price the result
    Slice {
        /// Path to the model (.stl, .obj, .3mf, .fbx, .gltf, .glb)
        model: PathBuf,
        #[arg(long, default_value = "standard")]
        quality: String,
        #[arg(long, default_value = "PLA")]
        material: String,
        #[arg(long, default_value = "20")]
        infill_density: i64,
        #[arg(long, default_value = "grid")]
        infill_type: String,
        #[arg(long, default_value = "1")]
        quantity: i64,
        /// Keep the generated G-code instead of deleting it
        #[arg(long)]
        keep_output: bool,
        #[arg(long)]
        json: bool,
    },
}

fn print_quote(quote: &PriceQuote, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(quote).context("Serialize quote")?;
        println!("{}", out);
    } else {
        print!("{}", format_quote(quote));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let env_lookup = |key: &str| std::env::var(key).ok();

    match cli.command {
        Commands::Estimate {
            file,
            material,
            quantity,
            json,
        } => {
            let pricing = load_config(env_lookup)?.pricing;
            let material: Material = material.parse()?;
            let quantity = validate_quantity(quantity, pricing.max_quantity)?;

            let raw = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let text = String::from_utf8_lossy(&raw);
            let file_ref = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let (_, quote) = quote_gcode(
                &text,
                material,
                quantity,
                &PricingEngine::new(pricing),
                &file_ref,
            );
            print_quote(&quote, json)?;
        }
        Commands::Slice {
            model,
            quality,
            material,
            infill_density,
            infill_type,
            quantity,
            keep_output,
            json,
        } => {
            let config = load_config(env_lookup)?;
            ModelExtension::from_filename(&model.to_string_lossy())?;
            printquote_core::validation::validate_infill_density(infill_density)?;
            let slicer_config = SlicerConfig::new(
                quality.parse::<Quality>()?,
                material.parse::<Material>()?,
                infill_density as u8,
                infill_type.parse::<InfillType>()?,
            )?;
            let quantity = validate_quantity(quantity, config.pricing.max_quantity)?;

            tokio::fs::create_dir_all(&config.storage.temp_dir)
                .await
                .context("Failed to create TEMP_DIR")?;
            let output = config.storage.temp_dir.join(generate_output_name());

            let invoker = SlicerInvoker::new(config.slicer.clone());
            let sliced = invoker.invoke(&model, &output, &slicer_config).await?;
            tracing::info!(
                duration_ms = sliced.duration.as_millis() as u64,
                output = %sliced.output_path.display(),
                "Slicing finished"
            );

            let raw = tokio::fs::read(&sliced.output_path).await?;
            let text = String::from_utf8_lossy(&raw);
            let file_ref = sliced.output_path.display().to_string();
            let (_, quote) = quote_gcode(
                &text,
                slicer_config.material,
                quantity,
                &PricingEngine::new(config.pricing.clone()),
                &file_ref,
            );

            if !keep_output {
                tokio::fs::remove_file(&sliced.output_path).await.ok();
            }
            print_quote(&quote, json)?;
        }
    }

    Ok(())
}
