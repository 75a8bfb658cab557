//! Isla Verde / Puerto Rico guides: live typeahead results topped up from the
//! knowledge base.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::collect::{Coordinates, GuideEntry, Place};
use crate::config::QUERY_ID;
use crate::context::ScoutContext;
use crate::graphql::{self, SearchProfile};
use crate::index::{self, SeenSet};
use crate::knowledge::{self, DiningHighlights};

pub const ATTRACTION_GUIDE_STEM: &str = "isla_verde_final_comprehensive";
pub const RESTAURANT_GUIDE_STEM: &str = "isla_verde_restaurants";

#[derive(Debug, Clone, Serialize)]
pub struct GuideSummary {
    pub graphql_successful: bool,
    pub query_id_used: &'static str,
    pub knowledge_base_used: bool,
    pub total_sources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_queries_used: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttractionGuide {
    pub destination: &'static str,
    pub overview: &'static str,
    pub tripadvisor_location_id: u64,
    pub tripadvisor_coordinates: Coordinates,
    pub scraped_attractions_count: usize,
    pub total_attractions: usize,
    pub attractions: Vec<GuideEntry>,
    pub scraping_summary: GuideSummary,
    pub scraped_at: DateTime<Utc>,
    pub last_updated: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestaurantGuide {
    pub destination: &'static str,
    pub focus: &'static str,
    pub overview: &'static str,
    pub tripadvisor_location_id: u64,
    pub scraped_restaurants_count: usize,
    pub total_restaurants: usize,
    pub restaurants: Vec<GuideEntry>,
    pub by_neighborhood: BTreeMap<String, Vec<GuideEntry>>,
    pub dining_highlights: DiningHighlights,
    pub scraping_summary: GuideSummary,
    pub scraped_at: DateTime<Utc>,
    pub last_updated: &'static str,
}

/// Run every query in order, pausing between them. Rows repeated across
/// queries are kept once.
async fn search_all(ctx: &ScoutContext, queries: &[&str], profile: SearchProfile) -> Vec<Place> {
    let seen = SeenSet::new();
    let mut places = Vec::new();
    for query in queries {
        let found = graphql::search_places(ctx, query, profile).await;
        places.extend(found.into_iter().filter(|p| seen.insert(&p.tripadvisor_url)));
        ctx.pause(ctx.config.delays.guide_search).await;
    }
    places
}

fn summary(scraped: &[Place], entries: &[GuideEntry], queries: Option<usize>) -> GuideSummary {
    GuideSummary {
        graphql_successful: !scraped.is_empty(),
        query_id_used: QUERY_ID,
        knowledge_base_used: true,
        total_sources: index::distinct_sources(entries),
        search_queries_used: queries,
    }
}

pub fn attraction_guide(scraped: Vec<Place>) -> AttractionGuide {
    let attractions = index::merge_with_knowledge(&scraped, knowledge::attractions());
    AttractionGuide {
        destination: knowledge::DESTINATION,
        overview: "Complete travel guide combining live TripAdvisor data with comprehensive local knowledge",
        tripadvisor_location_id: knowledge::TRIPADVISOR_LOCATION_ID,
        tripadvisor_coordinates: knowledge::TRIPADVISOR_COORDINATES,
        scraped_attractions_count: scraped.len(),
        total_attractions: attractions.len(),
        scraping_summary: summary(&scraped, &attractions, None),
        attractions,
        scraped_at: Utc::now(),
        last_updated: knowledge::LAST_UPDATED,
    }
}

pub fn restaurant_guide(scraped: Vec<Place>, queries_used: usize) -> RestaurantGuide {
    let restaurants = index::merge_with_knowledge(&scraped, knowledge::restaurants());
    RestaurantGuide {
        destination: knowledge::DESTINATION,
        focus: "Restaurant & Dining Guide",
        overview: "Comprehensive dining guide combining live TripAdvisor data with local restaurant expertise",
        tripadvisor_location_id: knowledge::TRIPADVISOR_LOCATION_ID,
        scraped_restaurants_count: scraped.len(),
        total_restaurants: restaurants.len(),
        by_neighborhood: index::group_by_area(&restaurants),
        dining_highlights: knowledge::DINING_HIGHLIGHTS,
        scraping_summary: summary(&scraped, &restaurants, Some(queries_used)),
        restaurants,
        scraped_at: Utc::now(),
        last_updated: knowledge::LAST_UPDATED,
    }
}

pub async fn build_attraction_guide(ctx: &ScoutContext) -> AttractionGuide {
    info!("Creating Isla Verde / Puerto Rico attraction guide");
    let scraped = search_all(ctx, &knowledge::ATTRACTION_SEARCHES, SearchProfile::GUIDE_ATTRACTIONS).await;
    attraction_guide(scraped)
}

pub async fn build_restaurant_guide(ctx: &ScoutContext) -> RestaurantGuide {
    info!("Creating Isla Verde / Puerto Rico restaurant guide");
    let queries = &knowledge::RESTAURANT_SEARCHES;
    let scraped = search_all(ctx, queries, SearchProfile::GUIDE_RESTAURANTS).await;
    restaurant_guide(scraped, queries.len())
}
