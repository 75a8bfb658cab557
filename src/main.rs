mod tokenize;
mod http_client;
mod index;
mod collect;
mod error;
mod config;
mod pages;
mod pagination;
mod graphql;
mod tripadvisor;
mod knowledge;
mod guide;
mod reddit;
mod web_search;
mod curate;
mod output;
mod cli;

pub mod context;

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, GuideKind};
use crate::collect::ListingKind;
use crate::config::Config;
use crate::context::ScoutContext;
use crate::reddit::RedditClient;
use crate::tripadvisor::{CityScope, CityScraper};

fn init_logging(verbose: bool) {
    // RUST_LOG があればそちらを優先
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!("Logger initialized");

    let ctx = ScoutContext::new(Config::from_env())?;

    match cli.command {
        Commands::Reddit {
            location,
            subreddits,
            limit,
            output,
        } => run_reddit(&ctx, &location, subreddits, limit, &output).await,
        Commands::City {
            location,
            state,
            scope,
            quick,
            output,
            output_dir,
        } => run_city(&ctx, &location, state, scope, quick, output.as_deref(), &output_dir).await,
        Commands::Locate { query } => {
            let locations = graphql::search_locations(&ctx, &query).await;
            println!("{}", serde_json::to_string_pretty(&locations)?);
            Ok(())
        }
        Commands::Tripadvisor {
            query,
            kinds,
            max_items,
            max_review_pages,
            search_only,
            output,
        } => run_tripadvisor(&ctx, &query, &kinds, max_items, max_review_pages, search_only, &output).await,
        Commands::Guide {
            kind,
            output,
            output_dir,
        } => run_guide(&ctx, kind, output.as_deref(), &output_dir).await,
        Commands::WebSearch {
            location,
            queries,
            output,
        } => {
            let creds = ctx.config.web_search_credentials()?;
            let queries = if queries.is_empty() {
                web_search::default_queries(&location)
            } else {
                queries
            };
            let results = web_search::search_all(&ctx, creds, &queries).await;
            let path = output::write_json_to(&output, &results)?;

            let total: usize = results.values().map(|r| r.posts.len()).sum();
            println!("{} posts from {} of {} queries", total, results.len(), queries.len());
            println!("Results saved to: {}", path.display());
            Ok(())
        }
        Commands::Curate { input, top, output } => {
            let results: web_search::SearchResults = read_json(&input)?;
            let report = curate::curate(&results, top);
            let path = output::write_json_to(&output, &report)?;

            println!(
                "Analyzed {} posts ({} unique), kept {}",
                report.meta.total_posts_analyzed, report.meta.unique_posts, report.meta.top_posts_selected
            );
            for (i, post) in report.top_posts.iter().enumerate() {
                println!("{:>2}. [{}] {} (r/{})", i + 1, post.usefulness_score, post.hit.title, post.hit.subreddit);
            }
            println!("Curated posts saved to: {}", path.display());
            Ok(())
        }
        Commands::Extract { input, output } => {
            let creds = ctx.config.reddit_credentials()?;
            let curated: curate::CuratedReport = read_json(&input)?;
            let client = RedditClient::connect(&ctx, creds).await?;
            let report = reddit::extract_full_posts(&client, &curated).await;
            let path = output::write_json_to(&output, &report)?;

            println!(
                "Extracted {} posts via {}",
                report.meta.total_posts_extracted, report.meta.extraction_method
            );
            println!("Full content saved to: {}", path.display());
            Ok(())
        }
    }
}

async fn run_reddit(
    ctx: &ScoutContext,
    location: &str,
    subreddits: Option<Vec<String>>,
    limit: usize,
    dir: &Path,
) -> anyhow::Result<()> {
    let creds = ctx.config.reddit_credentials()?;
    let subreddits: Vec<String> = match subreddits {
        Some(list) => list
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => reddit::find_relevant_subreddits(location),
    };

    let client = RedditClient::connect(ctx, creds).await?;
    let posts = reddit::search_travel_posts(&client, location, &subreddits, limit).await;
    let report = reddit::RedditReport::new(location, posts);
    let stem = format!("reddit_travel_{}", tokenize::location_slug(location));
    let path = output::write_json(dir, &stem, &report)?;

    let summary = &report.summary;
    println!("Reddit travel recommendations for {}", location);
    println!("  posts: {}", summary.total_posts);
    println!("  recommendations: {}", summary.total_recommendations);
    println!("  subreddits: {}", summary.subreddits_found.join(", "));
    println!("  average post score: {:.1}", summary.avg_post_score);
    if !summary.top_mentioned_places.is_empty() {
        println!("  most mentioned:");
        for (name, count) in &summary.top_mentioned_places {
            println!("    {} ({})", name, count);
        }
    }
    println!("Results saved to: {}", path.display());
    Ok(())
}

async fn run_city(
    ctx: &ScoutContext,
    location: &str,
    state: Option<String>,
    scope: CityScope,
    quick: bool,
    output: Option<&Path>,
    dir: &Path,
) -> anyhow::Result<()> {
    let (city, parsed_state) = tripadvisor::parse_location(location);
    let state = state.unwrap_or(parsed_state);
    let scraper = CityScraper::new(ctx, &city, &state, quick);
    let value = scraper.scrape_scope(scope).await;
    let stem = tripadvisor::city_file_stem(&city, quick, scope);
    let path = output::save(output, dir, &stem, &value)?;

    println!("TripAdvisor {} for {}", scope.as_str(), scraper.location_query());
    match scope {
        CityScope::All => {
            let summary = &value["summary"];
            println!("  restaurants: {}", summary["total_restaurants"]);
            println!("  attractions: {}", summary["total_attractions"]);
            println!("  total places: {}", summary["total_places"]);
        }
        CityScope::Restaurants | CityScope::Attractions => {
            println!("  found: {}", value["total"]);
        }
    }
    println!("Results saved to: {}", path.display());
    Ok(())
}

async fn run_tripadvisor(
    ctx: &ScoutContext,
    query: &str,
    kinds: &[ListingKind],
    max_items: usize,
    max_review_pages: usize,
    search_only: bool,
    output: &Path,
) -> anyhow::Result<()> {
    let mut data = Map::new();
    for &kind in kinds {
        let (value, count) = if search_only {
            let previews = tripadvisor::scrape_search(ctx, query, kind, None).await;
            (serde_json::to_value(&previews)?, previews.len())
        } else {
            let details =
                tripadvisor::scrape_by_type(ctx, query, kind, Some(max_items), Some(max_review_pages)).await;
            for detail in &details {
                println!(
                    "    {} ({} / {} reviews)",
                    detail.name().unwrap_or("?"),
                    detail.rating_value().unwrap_or_else(|| "-".to_string()),
                    detail.reviews.len()
                );
            }
            (serde_json::to_value(&details)?, details.len())
        };
        println!("  {}: {}", kind.as_str(), count);
        data.insert(kind.as_str().to_string(), value);
    }
    let path = output::write_json_to(output, &Value::Object(data))?;
    println!("Data saved to {}", path.display());
    Ok(())
}

async fn run_guide(ctx: &ScoutContext, kind: GuideKind, output: Option<&Path>, dir: &Path) -> anyhow::Result<()> {
    let path = match kind {
        GuideKind::Attractions => {
            let guide = guide::build_attraction_guide(ctx).await;
            println!("{}", guide.destination);
            println!("  scraped attractions: {}", guide.scraped_attractions_count);
            println!("  total attractions: {}", guide.total_attractions);
            for entry in guide.attractions.iter().take(5) {
                println!("    {} [{}]", entry.name(), entry.data_source());
            }
            output::save(output, dir, guide::ATTRACTION_GUIDE_STEM, &guide)?
        }
        GuideKind::Restaurants => {
            let guide = guide::build_restaurant_guide(ctx).await;
            println!("{}", guide.destination);
            println!("  scraped restaurants: {}", guide.scraped_restaurants_count);
            println!("  total restaurants: {}", guide.total_restaurants);
            for (area, entries) in &guide.by_neighborhood {
                println!("    {}: {}", area, entries.len());
            }
            output::save(output, dir, guide::RESTAURANT_GUIDE_STEM, &guide)?
        }
    };
    println!("Guide saved to: {}", path.display());
    Ok(())
}
