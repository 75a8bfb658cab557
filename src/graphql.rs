use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::collect::{Coordinates, LocationData, Place};
use crate::config::QUERY_ID;
use crate::context::ScoutContext;
use crate::error::Result;
use crate::tokenize::name_from_url;

/// Every location type the typeahead knows about.
pub const ALL_LOCATION_TYPES: [&str; 18] = [
    "GEO", "AIRPORT", "ACCOMMODATION", "ATTRACTION",
    "ATTRACTION_PRODUCT", "EATERY", "NEIGHBORHOOD",
    "AIRLINE", "SHOPPING", "UNIVERSITY", "GENERAL_HOSPITAL",
    "PORT", "FERRY", "CORPORATION", "VACATION_RENTAL",
    "SHIP", "CRUISE_LINE", "CAR_RENTAL_OFFICE",
];

/// Decides whether a typeahead hit counts as the place kind being searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceMatcher {
    /// `EATERY`, or a `Restaurant_Review` URL.
    Eatery,
    /// `ATTRACTION`, or an `Attraction_Review` URL.
    Attraction,
    /// `ATTRACTION`, or any URL mentioning `Attraction` (tours included).
    AttractionLoose,
}

impl PlaceMatcher {
    pub fn matches(self, place_type: &str, url: &str) -> bool {
        match self {
            PlaceMatcher::Eatery => place_type == "EATERY" || url.contains("Restaurant_Review"),
            PlaceMatcher::Attraction => place_type == "ATTRACTION" || url.contains("Attraction_Review"),
            PlaceMatcher::AttractionLoose => place_type == "ATTRACTION" || url.contains("Attraction"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaceMatcher::Eatery => "restaurant",
            PlaceMatcher::Attraction | PlaceMatcher::AttractionLoose => "attraction",
        }
    }
}

/// Shape of one typeahead search.
#[derive(Debug, Clone, Copy)]
pub struct SearchProfile {
    pub limit: u32,
    pub location_types: &'static [&'static str],
    pub matcher: PlaceMatcher,
}

impl SearchProfile {
    pub const CITY_RESTAURANTS: SearchProfile = SearchProfile {
        limit: 15,
        location_types: &["EATERY"],
        matcher: PlaceMatcher::Eatery,
    };
    pub const CITY_ATTRACTIONS: SearchProfile = SearchProfile {
        limit: 15,
        location_types: &["ATTRACTION"],
        matcher: PlaceMatcher::Attraction,
    };
    pub const GUIDE_ATTRACTIONS: SearchProfile = SearchProfile {
        limit: 5,
        location_types: &["ATTRACTION", "ATTRACTION_PRODUCT", "GEO", "NEIGHBORHOOD"],
        matcher: PlaceMatcher::AttractionLoose,
    };
    pub const GUIDE_RESTAURANTS: SearchProfile = SearchProfile {
        limit: 10,
        location_types: &["EATERY"],
        matcher: PlaceMatcher::Eatery,
    };
}

/// Request body for the pre-registered typeahead query.
pub fn typeahead_payload(query: &str, limit: u32, location_types: &[&str]) -> Value {
    json!([{
        "variables": {
            "request": {
                "query": query,
                "limit": limit,
                "scope": "WORLDWIDE",
                "locale": "en-US",
                "scopeGeoId": 1,
                "searchCenter": null,
                "types": ["LOCATION"],
                "locationTypes": location_types,
                "userId": null,
                "context": {},
                "enabledFeatures": ["articles"],
                "includeRecent": true
            }
        },
        "query": QUERY_ID,
        "extensions": { "preRegisteredQueryId": QUERY_ID }
    }])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TypeaheadEnvelope {
    data: TypeaheadData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TypeaheadData {
    #[serde(rename = "Typeahead_autocomplete")]
    autocomplete: Autocomplete,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Autocomplete {
    results: Vec<TypeaheadResult>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TypeaheadResult {
    pub text: Option<String>,
    #[serde(rename = "locationId")]
    pub location_id: Option<u64>,
    pub details: Option<Value>,
    pub coordinates: Option<Coordinates>,
}

impl TypeaheadResult {
    fn detail_str(&self, key: &str) -> &str {
        self.details
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    fn address(&self) -> String {
        self.details
            .as_ref()
            .and_then(|d| d.get("localizedAdditionalNames"))
            .and_then(|n| n.get("longOnlyHierarchy"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    }

    /// Convert to a [`Place`] when the hit passes `matcher`.
    pub fn to_place(&self, matcher: PlaceMatcher, search_query: &str) -> Option<Place> {
        let place_type = self.detail_str("placeType");
        let url = self.detail_str("url");
        if !matcher.matches(place_type, url) {
            return None;
        }
        let name = match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() && text != "Unknown" => text.to_string(),
            _ => name_from_url(url, matcher.label()),
        };
        Some(Place {
            name,
            tripadvisor_url: url.to_string(),
            location_id: self.location_id,
            place_type: place_type.to_string(),
            coordinates: self.coordinates.unwrap_or_default(),
            address: self.address(),
            search_query: search_query.to_string(),
            scraped_at: Utc::now(),
        })
    }
}

/// Pull the result rows out of a typeahead response. Missing levels read as empty.
pub fn typeahead_results(response: Vec<Value>) -> Vec<TypeaheadResult> {
    response
        .into_iter()
        .next()
        .and_then(|first| serde_json::from_value::<TypeaheadEnvelope>(first).ok())
        .map(|env| env.data.autocomplete.results)
        .unwrap_or_default()
}

async fn typeahead(ctx: &ScoutContext, query: &str, limit: u32, location_types: &[&str]) -> Result<Vec<TypeaheadResult>> {
    let endpoints = &ctx.config.endpoints;
    let payload = typeahead_payload(query, limit, location_types);
    let response: Vec<Value> = ctx
        .http
        .post_graphql(&endpoints.graphql_url(), &endpoints.tripadvisor, &payload)
        .await?;
    Ok(typeahead_results(response))
}

/// Location details for a free-text query (countries, cities, venues...).
pub async fn search_locations(ctx: &ScoutContext, query: &str) -> Vec<LocationData> {
    info!("Scraping location data: {}", query);
    match typeahead(ctx, query, 10, &ALL_LOCATION_TYPES).await {
        Ok(results) => {
            let locations: Vec<LocationData> = results
                .into_iter()
                .filter_map(|r| r.details)
                .filter_map(|d| serde_json::from_value(d).ok())
                .collect();
            info!("Found {} results", locations.len());
            locations
        }
        Err(e) => {
            warn!("Error scraping location data for {}: {}", query, e);
            Vec::new()
        }
    }
}

/// Typeahead search filtered down to one kind of place. Failures yield an empty list.
pub async fn search_places(ctx: &ScoutContext, query: &str, profile: SearchProfile) -> Vec<Place> {
    info!("Searching for: {} ({})", query, profile.matcher.label());
    match typeahead(ctx, query, profile.limit, profile.location_types).await {
        Ok(results) => results
            .iter()
            .filter_map(|r| r.to_place(profile.matcher, query))
            .inspect(|p| info!("Found {}: {}", profile.matcher.label(), p.name))
            .collect(),
        Err(e) if e.is_forbidden() => {
            warn!("403 Forbidden for {} - rate limited", query);
            Vec::new()
        }
        Err(e) => {
            warn!("Error searching for {}: {}", query, e);
            Vec::new()
        }
    }
}
