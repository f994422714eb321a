//! The search subcommand.

use std::time::Duration;

use clap::Parser;
use tokio::task::JoinHandle;
use trolley_client::Scraper;
use trolley_core::{AppConfig, NutritionCache, NutritionFacts, Product, SearchItem};

use crate::observer::ConsoleObserver;

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search term, e.g. "chicken breast"
    pub query: String,

    /// Maximum number of products to return
    #[arg(short, long, default_value_t = 5)]
    pub limit: usize,

    /// Also fetch nutrition from product pages (slow by design)
    #[arg(long)]
    pub nutrition: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SearchArgs, config: AppConfig) -> anyhow::Result<()> {
    let cache = NutritionCache::open(config.cache_path.clone());
    let mut scraper = Scraper::new(config, cache, Box::new(ConsoleObserver))?;

    let ticker = spawn_ticker();
    let items = scraper.search(&args.query, args.limit, args.nutrition).await;
    ticker.abort();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        match item {
            SearchItem::Product(product) => print_product(i + 1, product),
            SearchItem::Error { error } => println!("error: {error}"),
        }
    }
    Ok(())
}

/// Heartbeat on stderr so multi-minute nutrition pauses don't look like a
/// hang. Shares no state with the scrape path and is aborted on completion.
fn spawn_ticker() -> JoinHandle<()> {
    tokio::spawn(async {
        let started = std::time::Instant::now();
        loop {
            tokio::time::sleep(Duration::from_secs(15)).await;
            eprintln!("... still working ({}s elapsed)", started.elapsed().as_secs());
        }
    })
}

fn print_product(index: usize, product: &Product) {
    if product.brand.is_empty() {
        println!("{index}. {}", product.name);
    } else {
        println!("{index}. {} [{}]", product.name, product.brand);
    }

    let mut line = format!("   {}", product.price);
    if !product.unit_price.is_empty() {
        line.push_str(&format!(" ({})", product.unit_price));
    }
    if !product.url.is_empty() {
        line.push_str(&format!("  {}", product.url));
    }
    println!("{line}");

    if !product.promotion.is_empty() {
        println!("   offer: {}", product.promotion);
    }
    if !product.availability {
        println!("   currently unavailable");
    }
    if !product.nutrition.is_empty() {
        println!("   {}", nutrition_line(&product.nutrition));
    }
}

fn nutrition_line(facts: &NutritionFacts) -> String {
    let mut parts = Vec::new();
    if let Some(v) = &facts.energy {
        parts.push(format!("energy {v}"));
    }
    if let Some(v) = &facts.protein {
        parts.push(format!("protein {v}"));
    }
    if let Some(v) = &facts.carbs {
        parts.push(format!("carbs {v}"));
    }
    if let Some(v) = &facts.fat {
        parts.push(format!("fat {v}"));
    }
    if let Some(v) = &facts.salt {
        parts.push(format!("salt {v}"));
    }

    let mut line = parts.join(", ");
    if let Some(serving) = &facts.serving_size {
        if line.is_empty() {
            line = format!("per {serving}");
        } else {
            line = format!("{line} (per {serving})");
        }
    }
    format!("nutrition: {line}")
}
