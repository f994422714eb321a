//! Cache maintenance subcommands.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use trolley_core::{AppConfig, NutritionCache};

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show cache statistics
    Stats,

    /// Export the cache to CSV
    Export(ExportArgs),

    /// Delete every cached entry
    Clear(ClearArgs),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output file path
    #[arg(short, long, default_value = "nutrition-cache-export.csv")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run(command: CacheCommand, config: AppConfig) -> anyhow::Result<()> {
    let mut cache = NutritionCache::open(config.cache_path);

    match command {
        CacheCommand::Stats => show_stats(&cache),
        CacheCommand::Export(args) => export(&cache, &args.output),
        CacheCommand::Clear(args) => clear(&mut cache, args.yes),
    }
}

fn show_stats(cache: &NutritionCache) -> anyhow::Result<()> {
    let stats = cache.stats();

    println!("Nutrition cache at {}", cache.path().display());
    println!("  Cached products: {}", stats.total_products);
    println!("  Cache hits:      {}", stats.total_hits);
    println!("  File size:       {:.1} KB", stats.file_size_bytes as f64 / 1024.0);
    println!("  Last updated:    {}", stats.last_updated);

    if !stats.top_products.is_empty() {
        println!("  Most requested:");
        for (i, product) in stats.top_products.iter().enumerate() {
            println!("    {}. {} ({} hits)", i + 1, product.name, product.hits);
        }
    }
    println!("  Detail fetches avoided: {}", stats.total_hits);
    Ok(())
}

fn export(cache: &NutritionCache, output: &Path) -> anyhow::Result<()> {
    let rows = cache.export_csv(output)?;
    println!("Exported {rows} products to {}", output.display());
    Ok(())
}

fn clear(cache: &mut NutritionCache, yes: bool) -> anyhow::Result<()> {
    if cache.is_empty() {
        println!("Cache is already empty.");
        return Ok(());
    }
    let prompt = format!("Clear all {} cached products? [y/N] ", cache.len());
    if !yes && !confirm(&prompt)? {
        println!("Cancelled.");
        return Ok(());
    }
    cache.clear();
    println!("Cache cleared.");
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
