use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::collect::ListingKind;
use crate::output::DEFAULT_OUTPUT_DIR;
use crate::reddit::DEFAULT_POST_LIMIT;
use crate::tripadvisor::CityScope;

/// Travel recommendation collector.
/// Exit codes: 0=success (even when nothing was found), 1=missing credentials or unwritable output, 2=bad arguments
#[derive(Parser, Debug)]
#[command(name = "travel-scout")]
#[command(about = "Collect travel recommendations from Reddit, TripAdvisor and web search")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Log at debug level (RUST_LOG still wins)")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine travel subreddits for posts and recommended places.
    Reddit {
        #[arg(short, long, help = "Location to search for (e.g. \"Austin, TX\")")]
        location: String,

        #[arg(
            short,
            long,
            value_delimiter = ',',
            help = "Comma-separated subreddits (default: derived from the location)"
        )]
        subreddits: Option<Vec<String>>,

        #[arg(long, default_value_t = DEFAULT_POST_LIMIT, help = "Max posts to keep")]
        limit: usize,

        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, help = "Output directory")]
        output: PathBuf,
    },

    /// Restaurants and attractions of a city via the TripAdvisor typeahead.
    City {
        #[arg(help = "City name, optionally \"City, State\"")]
        location: String,

        #[arg(short, long, help = "State or country (overrides the part after the comma)")]
        state: Option<String>,

        #[arg(short = 't', long = "type", value_enum, default_value = "all", help = "What to scrape")]
        scope: CityScope,

        #[arg(long, help = "Three queries per kind instead of the full list")]
        quick: bool,

        #[arg(short, long, help = "Output file (default: <city>_<mode><type>_<ts>.json)")]
        output: Option<PathBuf>,

        #[arg(long, default_value = ".", help = "Directory for the default output file")]
        output_dir: PathBuf,
    },

    /// Print the typeahead location details for a query.
    Locate {
        query: String,
    },

    /// Listing and detail pages (with reviews) from TripAdvisor HTML.
    Tripadvisor {
        query: String,

        #[arg(
            short,
            long,
            value_enum,
            value_delimiter = ',',
            default_values = ["hotels", "attractions", "restaurants"],
            help = "Listing kinds to scrape"
        )]
        kinds: Vec<ListingKind>,

        #[arg(long, default_value_t = 2, help = "Detail pages per kind")]
        max_items: usize,

        #[arg(long, default_value_t = 1, help = "Review pages per detail page")]
        max_review_pages: usize,

        #[arg(long, help = "Only list search results, skip detail pages")]
        search_only: bool,

        #[arg(short, long, default_value = "tripadvisor_all_data.json", help = "Output file")]
        output: PathBuf,
    },

    /// Isla Verde / Puerto Rico guide: live results merged with the knowledge base.
    Guide {
        #[arg(value_enum, default_value = "attractions")]
        kind: GuideKind,

        #[arg(short, long, help = "Output file (default: timestamped in --output-dir)")]
        output: Option<PathBuf>,

        #[arg(long, default_value = ".", help = "Directory for the default output file")]
        output_dir: PathBuf,
    },

    /// Reddit posts through the web-search API.
    WebSearch {
        #[arg(short, long, default_value = "Puerto Rico", help = "Location used in the default queries")]
        location: String,

        #[arg(short, long = "query", help = "Explicit query; repeatable")]
        queries: Vec<String>,

        #[arg(short, long, default_value = "puerto_rico_reddit_results_2024.json", help = "Output file")]
        output: PathBuf,
    },

    /// Rank a web-search result file by usefulness.
    Curate {
        #[arg(short, long, default_value = "puerto_rico_reddit_results_2024.json")]
        input: PathBuf,

        #[arg(long, default_value_t = crate::curate::TOP_POSTS)]
        top: usize,

        #[arg(short, long, default_value = "puerto_rico_reddit_curated_top20_2024.json")]
        output: PathBuf,
    },

    /// Full text and top comments for every curated post.
    Extract {
        #[arg(short, long, default_value = "puerto_rico_reddit_curated_top20_2024.json")]
        input: PathBuf,

        #[arg(short, long, default_value = "puerto_rico_reddit_top20_batch_optimized.json")]
        output: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuideKind {
    Attractions,
    Restaurants,
}
