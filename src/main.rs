mod ai;
mod app;
mod config;
mod db;
mod error;
mod hn;
mod models;
mod pipeline;
mod services;
#[cfg(test)]
mod testing;

use app::App;
use config::Config;
use error::Result;
use models::{Category, DigestEntry};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (info by default, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Pick up a local .env before reading the environment
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).map(String::as_str) == Some("--config-path") {
        println!("{}", Config::config_path().display());
        return Ok(());
    }

    let config = Config::load()?;
    let app = App::new(&config).await?;

    // Check for --show flag (print stored digest and exit)
    if args.get(1).map(String::as_str) == Some("--show") {
        let categories = match args.get(2) {
            Some(name) => vec![name.parse::<Category>()?],
            None => Category::ALL.to_vec(),
        };
        for category in categories {
            print_digest(category, &app.digest(category).await?);
        }
        return Ok(());
    }

    if let Some(flag) = args.get(1).filter(|a| a.as_str() != "--refresh") {
        return Err(anyhow::anyhow!(
            "unknown argument '{}' (usage: hn-digest [--refresh | --show [top|best] | --config-path])",
            flag
        )
        .into());
    }

    let reports = app.refresh_all().await?;
    for report in reports {
        println!("{}", report);
    }

    Ok(())
}

fn print_digest(category: Category, entries: &[DigestEntry]) {
    println!("== {} stories ==", category);
    if entries.is_empty() {
        println!("(nothing stored yet)\n");
        return;
    }

    for entry in entries {
        let story = &entry.stored.story;
        println!(
            "{}. {} ({} points by {})",
            entry.stored.position + 1,
            story.display_title(),
            story.score.unwrap_or_default(),
            story.author.as_deref().unwrap_or("unknown")
        );
        if let Some(url) = story.link() {
            println!("   {}", url);
        }
        println!("   fetched {}", entry.stored.fetched_at.format("%Y-%m-%d %H:%M UTC"));
        if let Some(summary) = &entry.summary {
            for line in summary.summary.lines() {
                println!("   {}", line);
            }
        }
        println!();
    }
}
