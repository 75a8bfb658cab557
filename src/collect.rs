use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Coordinates {
    pub const fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }
}

/// One typeahead hit that passed the place-type filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub tripadvisor_url: String,
    pub location_id: Option<u64>,
    pub place_type: String,
    pub coordinates: Coordinates,
    pub address: String,
    pub search_query: String,
    pub scraped_at: DateTime<Utc>,
}

/// Hand-authored fallback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgePlace {
    pub name: String,
    pub description: String,
    pub coordinates: Coordinates,
    pub categories: Vec<String>,
    pub rating: f32,
    pub estimated_reviews: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_image: Option<String>,
}

/// Guide row, tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "data_source")]
pub enum GuideEntry {
    #[serde(rename = "tripadvisor_graphql")]
    Scraped(Place),
    #[serde(rename = "knowledge_base")]
    Knowledge(KnowledgePlace),
}

impl GuideEntry {
    pub fn name(&self) -> &str {
        match self {
            GuideEntry::Scraped(p) => &p.name,
            GuideEntry::Knowledge(k) => &k.name,
        }
    }

    pub fn data_source(&self) -> &'static str {
        match self {
            GuideEntry::Scraped(_) => "tripadvisor_graphql",
            GuideEntry::Knowledge(_) => "knowledge_base",
        }
    }

    /// Neighborhood if known, else the scraped address, else `Unknown Area`.
    pub fn area(&self) -> String {
        let area = match self {
            GuideEntry::Scraped(p) => Some(p.address.as_str()),
            GuideEntry::Knowledge(k) => k.neighborhood.as_deref(),
        };
        match area {
            Some(a) if !a.trim().is_empty() => a.to_string(),
            _ => "Unknown Area".to_string(),
        }
    }
}

/// `details` object of a typeahead result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationData {
    #[serde(rename = "localizedName")]
    pub localized_name: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "HOTELS_URL")]
    pub hotels_url: Option<String>,
    #[serde(rename = "ATTRACTIONS_URL")]
    pub attractions_url: Option<String>,
    #[serde(rename = "RESTAURANTS_URL")]
    pub restaurants_url: Option<String>,
    #[serde(rename = "placeType")]
    pub place_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Listing categories a location exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Hotels,
    Attractions,
    Restaurants,
}

impl ListingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingKind::Hotels => "hotels",
            ListingKind::Attractions => "attractions",
            ListingKind::Restaurants => "restaurants",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            ListingKind::Hotels => "hotel",
            ListingKind::Attractions => "attraction",
            ListingKind::Restaurants => "restaurant",
        }
    }

    /// Word that follows the result count on the first listing page.
    pub fn total_label(self) -> &'static str {
        match self {
            ListingKind::Hotels => "properties",
            ListingKind::Attractions => "results",
            ListingKind::Restaurants => "restaurants",
        }
    }

    pub fn listing_path(self, location: &LocationData) -> Option<&str> {
        match self {
            ListingKind::Hotels => location.hotels_url.as_deref(),
            ListingKind::Attractions => location.attractions_url.as_deref(),
            ListingKind::Restaurants => location.restaurants_url.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub title: Option<String>,
    pub text: String,
    /// Bubble rating, 0.5 steps.
    pub rating: Option<f32>,
    /// "Date of stay" / "Date of visit" line.
    pub date: Option<String>,
}

/// Parsed detail page of a hotel, attraction or restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetail {
    /// JSON-LD block, `{}` when the page had none.
    pub basic_data: Value,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub reviews: Vec<Review>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl PlaceDetail {
    pub fn name(&self) -> Option<&str> {
        self.basic_data.get("name").and_then(Value::as_str)
    }

    /// `aggregateRating.reviewCount`, accepting either a number or a numeric string.
    pub fn review_count(&self) -> Option<u64> {
        let count = self.basic_data.get("aggregateRating")?.get("reviewCount")?;
        match count {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.replace(',', "").trim().parse().ok(),
            _ => None,
        }
    }

    pub fn rating_value(&self) -> Option<String> {
        let value = self.basic_data.get("aggregateRating")?.get("ratingValue")?;
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
