use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use futures::{StreamExt, stream};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};
use url::Url;

use crate::collect::{ListingKind, Place, PlaceDetail, Preview, Review};
use crate::config::QUERY_ID;
use crate::context::ScoutContext;
use crate::graphql::{self, SearchProfile};
use crate::index::SeenSet;
use crate::pages;
use crate::pagination;

/// Listing pages fetched per query by [`scrape_by_type`].
pub const BY_TYPE_MAX_PAGES: usize = 5;

fn join_url(base: &str, href: &str) -> Option<String> {
    Url::parse(base).and_then(|b| b.join(href)).map(String::from).ok()
}

async fn fetch_listing_page(ctx: &ScoutContext, kind: ListingKind, url: String) -> Vec<Preview> {
    match ctx.http.get_text(&url).await {
        Ok(html) => pages::parse_search_page(kind, &html, &url),
        Err(e) => {
            warn!("Error scraping search page {}: {}", url, e);
            Vec::new()
        }
    }
}

/// Listing rows for `query`: first location hit, its listing for `kind`, then
/// the remaining pages fetched concurrently.
pub async fn scrape_search(ctx: &ScoutContext, query: &str, kind: ListingKind, max_pages: Option<usize>) -> Vec<Preview> {
    let locations = graphql::search_locations(ctx, query).await;
    let Some(location) = locations.first() else {
        warn!("No location data found for {}", query);
        return Vec::new();
    };
    let Some(path) = kind.listing_path(location) else {
        warn!("No {} URL found for {}", kind.as_str(), query);
        return Vec::new();
    };

    let first_url = ctx.config.endpoints.tripadvisor_url(path);
    let first_html = match ctx.http.get_text(&first_url).await {
        Ok(html) => html,
        Err(e) => {
            error!("Error scraping first {} page for {}: {}", kind.as_str(), query, e);
            return Vec::new();
        }
    };

    let mut results = pages::parse_search_page(kind, &first_html, &first_url);
    if results.is_empty() {
        warn!("No {} found on first page for {}", kind.as_str(), query);
        return results;
    }

    let page_size = results.len();
    let total = pages::parse_total_results(kind, &first_html);
    let total_pages = pagination::listing_pages(total, page_size, max_pages);
    info!("{}: found {} {} across {} pages", query, total.unwrap_or(0), kind.as_str(), total_pages);

    let Some(next_url) = pages::next_page_href(&first_html).and_then(|href| join_url(&first_url, &href)) else {
        return results;
    };
    let urls = pagination::listing_page_urls(&next_url, page_size, total_pages);
    if urls.is_empty() {
        return results;
    }

    let seen = SeenSet::new();
    for preview in &results {
        seen.insert(&preview.url);
    }

    let remaining: Vec<Vec<Preview>> = stream::iter(urls)
        .map(|url| fetch_listing_page(ctx, kind, url))
        .buffer_unordered(ctx.max_connections())
        .collect()
        .await;

    results.extend(remaining.into_iter().flatten().filter(|p| seen.insert(&p.url)));
    info!("{}: scraped {} {}", query, results.len(), kind.as_str());
    results
}

async fn fetch_review_page(ctx: &ScoutContext, kind: ListingKind, url: String) -> Vec<Review> {
    match ctx.http.get_text(&url).await {
        Ok(html) => pages::parse_detail_page(kind, &html).reviews,
        Err(e) => {
            warn!("Error scraping review page {}: {}", url, e);
            Vec::new()
        }
    }
}

/// Detail page plus its review pages. `None` when the first page fails.
pub async fn scrape_detail(
    ctx: &ScoutContext,
    kind: ListingKind,
    url: &str,
    max_review_pages: Option<usize>,
) -> Option<PlaceDetail> {
    info!("Scraping {}: {}", kind.singular(), url);
    let html = match ctx.http.get_text(url).await {
        Ok(html) => html,
        Err(e) => {
            error!("Error scraping {} page: {}", kind.singular(), e);
            return None;
        }
    };

    let mut detail = pages::parse_detail_page(kind, &html);
    let total_pages = pagination::review_pages(detail.review_count(), detail.reviews.len(), max_review_pages);
    let urls = pagination::review_page_urls(url, total_pages);
    if !urls.is_empty() {
        info!("Scraping {} additional review pages", urls.len());
        let extra: Vec<_> = stream::iter(urls)
            .map(|u| fetch_review_page(ctx, kind, u))
            .buffer_unordered(ctx.max_connections())
            .collect()
            .await;
        detail.reviews.extend(extra.into_iter().flatten());
    }

    info!("Scraped {} data with {} reviews", kind.singular(), detail.reviews.len());
    Some(detail)
}

/// Search, keep the first `max_items` rows and scrape each one's detail page in turn.
pub async fn scrape_by_type(
    ctx: &ScoutContext,
    query: &str,
    kind: ListingKind,
    max_items: Option<usize>,
    max_review_pages: Option<usize>,
) -> Vec<PlaceDetail> {
    info!("Starting complete scrape for {} in {}", kind.as_str(), query);
    let mut previews = scrape_search(ctx, query, kind, Some(BY_TYPE_MAX_PAGES)).await;
    if previews.is_empty() {
        error!("No {} search results found for {}", kind.as_str(), query);
        return Vec::new();
    }
    if let Some(max) = max_items {
        previews.truncate(max);
    }

    let total = previews.len();
    let mut details = Vec::with_capacity(total);
    for (i, preview) in previews.into_iter().enumerate() {
        info!("Scraping {} {}/{}: {}", kind.singular(), i + 1, total, preview.name);
        if let Some(mut detail) = scrape_detail(ctx, kind, &preview.url, max_review_pages).await {
            detail.preview = Some(preview);
            detail.kind = Some(kind.singular().to_string());
            details.push(detail);
        }
        ctx.pause(ctx.config.delays.per_item).await;
    }
    details
}

/// What a city run collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CityScope {
    All,
    Restaurants,
    Attractions,
}

impl CityScope {
    pub fn as_str(self) -> &'static str {
        match self {
            CityScope::All => "all",
            CityScope::Restaurants => "restaurants",
            CityScope::Attractions => "attractions",
        }
    }
}

/// "Austin, TX" → ("Austin", "TX"); "Portland" → ("Portland", "").
pub fn parse_location(location: &str) -> (String, String) {
    let mut parts = location.split(',').map(str::trim);
    let city = parts.next().unwrap_or("").to_string();
    let state = parts.next().unwrap_or("").to_string();
    (city, state)
}

pub fn restaurant_searches(city: &str, state: &str) -> Vec<String> {
    let mut searches = vec![
        format!("{} restaurants", city),
        format!("best restaurants {}", city),
        format!("top restaurants {}", city),
        format!("local food {}", city),
        format!("dining {}", city),
    ];
    if !state.is_empty() {
        searches.push(format!("restaurants {} {}", city, state));
        searches.push(format!("food {} {}", city, state));
    }
    for modifier in ["downtown", "center", "old town", "historic"] {
        searches.push(format!("{} {} restaurants", modifier, city));
    }
    searches
}

pub fn attraction_searches(city: &str, state: &str) -> Vec<String> {
    let mut searches = vec![
        format!("things to do {}", city),
        format!("attractions {}", city),
        format!("sightseeing {}", city),
        format!("tourist attractions {}", city),
        format!("activities {}", city),
    ];
    if !state.is_empty() {
        searches.push(format!("things to do {} {}", city, state));
        searches.push(format!("attractions {} {}", city, state));
        searches.push(format!("visit {} {}", city, state));
    }
    for topic in ["museums", "parks", "tours", "entertainment", "nightlife"] {
        searches.push(format!("{} {}", topic, city));
    }
    searches
}

pub fn quick_restaurant_searches(city: &str) -> Vec<String> {
    vec![
        format!("{} restaurants", city),
        format!("best restaurants {}", city),
        format!("dining {}", city),
    ]
}

pub fn quick_attraction_searches(city: &str) -> Vec<String> {
    vec![
        format!("things to do {}", city),
        format!("attractions {}", city),
        format!("sightseeing {}", city),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct CitySummary {
    pub total_restaurants: usize,
    pub total_attractions: usize,
    pub total_places: usize,
    pub graphql_successful: bool,
    pub query_id_used: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ByType {
    pub dining: Vec<Place>,
    pub sightseeing: Vec<Place>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapingMetadata {
    pub restaurant_search_queries: Vec<String>,
    pub attraction_search_queries: Vec<String>,
    pub rate_limit_delay: f64,
    pub deduplication: &'static str,
    pub data_source: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityReport {
    pub city: String,
    pub state_or_country: String,
    pub location_query: String,
    pub scraped_at: DateTime<Utc>,
    pub last_updated: String,
    pub summary: CitySummary,
    pub restaurants: Vec<Place>,
    pub attractions: Vec<Place>,
    pub by_type: ByType,
    pub scraping_metadata: ScrapingMetadata,
}

/// Restaurant and attraction sweep of one city through the typeahead endpoint.
pub struct CityScraper<'a> {
    ctx: &'a ScoutContext,
    pub city: String,
    pub state: String,
    pub restaurant_searches: Vec<String>,
    pub attraction_searches: Vec<String>,
}

impl<'a> CityScraper<'a> {
    pub fn new(ctx: &'a ScoutContext, city: &str, state: &str, quick: bool) -> Self {
        let (restaurant_searches, attraction_searches) = if quick {
            (quick_restaurant_searches(city), quick_attraction_searches(city))
        } else {
            (restaurant_searches(city, state), attraction_searches(city, state))
        };
        Self {
            ctx,
            city: city.to_string(),
            state: state.to_string(),
            restaurant_searches,
            attraction_searches,
        }
    }

    pub fn location_query(&self) -> String {
        format!("{} {}", self.city, self.state).trim().to_string()
    }

    async fn scrape_queries(&self, queries: &[String], profile: SearchProfile) -> Vec<Place> {
        let seen = SeenSet::new();
        let mut places = Vec::new();
        for query in queries {
            let found = graphql::search_places(self.ctx, query, profile).await;
            places.extend(found.into_iter().filter(|p| seen.insert(&p.tripadvisor_url)));
            self.ctx.pause(self.ctx.config.delays.city_search).await;
        }
        places
    }

    pub async fn scrape_restaurants(&self) -> Vec<Place> {
        info!("Scraping restaurants for {}", self.location_query());
        let places = self
            .scrape_queries(&self.restaurant_searches, SearchProfile::CITY_RESTAURANTS)
            .await;
        info!("Found {} unique restaurants", places.len());
        places
    }

    pub async fn scrape_attractions(&self) -> Vec<Place> {
        info!("Scraping attractions for {}", self.location_query());
        let places = self
            .scrape_queries(&self.attraction_searches, SearchProfile::CITY_ATTRACTIONS)
            .await;
        info!("Found {} unique attractions", places.len());
        places
    }

    pub async fn scrape_all(&self) -> CityReport {
        info!("Starting comprehensive scraping for {}", self.location_query());
        let restaurants = self.scrape_restaurants().await;
        self.ctx.pause(self.ctx.config.delays.between_kinds).await;
        let attractions = self.scrape_attractions().await;
        self.report(restaurants, attractions)
    }

    fn report(&self, restaurants: Vec<Place>, attractions: Vec<Place>) -> CityReport {
        CityReport {
            city: self.city.clone(),
            state_or_country: self.state.clone(),
            location_query: self.location_query(),
            scraped_at: Utc::now(),
            last_updated: Local::now().format("%Y-%m-%d").to_string(),
            summary: CitySummary {
                total_restaurants: restaurants.len(),
                total_attractions: attractions.len(),
                total_places: restaurants.len() + attractions.len(),
                graphql_successful: !restaurants.is_empty() || !attractions.is_empty(),
                query_id_used: QUERY_ID,
            },
            by_type: ByType {
                dining: restaurants.clone(),
                sightseeing: attractions.clone(),
            },
            restaurants,
            attractions,
            scraping_metadata: ScrapingMetadata {
                restaurant_search_queries: self.restaurant_searches.clone(),
                attraction_search_queries: self.attraction_searches.clone(),
                rate_limit_delay: self.ctx.config.delays.city_search.as_secs_f64(),
                deduplication: "by_tripadvisor_url",
                data_source: "tripadvisor_graphql",
            },
        }
    }

    /// Run `scope` and return the JSON document written for it.
    pub async fn scrape_scope(&self, scope: CityScope) -> Value {
        let (label, places) = match scope {
            CityScope::All => return json!(self.scrape_all().await),
            CityScope::Restaurants => ("restaurants", self.scrape_restaurants().await),
            CityScope::Attractions => ("attractions", self.scrape_attractions().await),
        };
        let total = places.len();
        json!({
            "city": self.city,
            "type": format!("{}_only", label),
            label: places,
            "total": total,
            "scraped_at": Utc::now(),
        })
    }
}

/// `Austin` + quick + restaurants → `austin_quick_restaurants`
pub fn city_file_stem(city: &str, quick: bool, scope: CityScope) -> String {
    let city = city.to_lowercase().replace(' ', "_").replace(',', "");
    let mode = if quick { "quick_" } else { "" };
    format!("{}_{}{}", city, mode, scope.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::context_for;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn location_is_split_on_comma() {
        assert_eq!(parse_location("Austin, TX"), ("Austin".into(), "TX".into()));
        assert_eq!(parse_location("Portland"), ("Portland".into(), String::new()));
    }

    #[test]
    fn search_lists_grow_with_state() {
        let plain = restaurant_searches("Austin", "");
        assert_eq!(plain.len(), 9);
        assert_eq!(plain[0], "Austin restaurants");
        assert!(plain.contains(&"old town Austin restaurants".to_string()));

        let with_state = restaurant_searches("Austin", "TX");
        assert_eq!(with_state.len(), 11);
        assert!(with_state.contains(&"food Austin TX".to_string()));

        assert_eq!(attraction_searches("Austin", "").len(), 10);
        let attractions = attraction_searches("Austin", "TX");
        assert_eq!(attractions.len(), 13);
        assert!(attractions.contains(&"visit Austin TX".to_string()));
        assert_eq!(attractions.last().map(String::as_str), Some("nightlife Austin"));

        assert_eq!(quick_restaurant_searches("Austin").len(), 3);
        assert_eq!(quick_attraction_searches("Austin")[2], "sightseeing Austin");
    }

    #[test]
    fn file_stems() {
        assert_eq!(city_file_stem("San Juan", false, CityScope::All), "san_juan_all");
        assert_eq!(city_file_stem("Austin", true, CityScope::Restaurants), "austin_quick_restaurants");
    }

    const FIRST_PAGE: &str = r#"<html><body>
        <span>4 properties</span>
        <div class="listing_title"><a href="/Hotel_Review-g1-d1-Reviews-Alpha.html">1. Alpha Inn</a></div>
        <div class="listing_title"><a href="/Hotel_Review-g1-d2-Reviews-Beta.html">2. Beta Suites</a></div>
        <a aria-label="Next page" href="/Hotels-g1-oa2-Test-Hotels.html">Next</a>
    </body></html>"#;

    const SECOND_PAGE: &str = r#"<html><body>
        <div class="listing_title"><a href="/Hotel_Review-g1-d2-Reviews-Beta.html">2. Beta Suites</a></div>
        <div class="listing_title"><a href="/Hotel_Review-g1-d3-Reviews-Gamma.html">3. Gamma Lodge</a></div>
    </body></html>"#;

    async fn mount_location(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/data/graphql/ids"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "data": {"Typeahead_autocomplete": {"results": [
                    {"details": {"localizedName": "Test", "HOTELS_URL": "/Hotels-g1-Test-Hotels.html"}}
                ]}}
            }])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn search_follows_pagination_and_dedupes() {
        let server = MockServer::start().await;
        mount_location(&server).await;
        Mock::given(method("GET"))
            .and(path("/Hotels-g1-Test-Hotels.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIRST_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Hotels-g1-oa2-Test-Hotels.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SECOND_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let previews = scrape_search(&ctx, "Test", ListingKind::Hotels, None).await;
        let names: Vec<&str> = previews.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Inn", "Beta Suites", "Gamma Lodge"]);
        assert!(previews[0].url.starts_with(&server.uri()));
    }

    #[tokio::test]
    async fn search_without_listing_url_is_empty() {
        let server = MockServer::start().await;
        mount_location(&server).await;
        let ctx = context_for(&server.uri());
        let previews = scrape_search(&ctx, "Test", ListingKind::Restaurants, None).await;
        assert!(previews.is_empty());
    }

    #[tokio::test]
    async fn detail_collects_extra_review_pages() {
        let server = MockServer::start().await;
        let first = r#"<html><head>
            <script type="application/ld+json">{"name": "Alpha Inn", "aggregateRating": {"reviewCount": "15", "ratingValue": "4.5"}}</script>
            </head><body>
            <div data-reviewid="1"><span data-automation="reviewText_1"><span>Nice pool.</span></span></div>
            </body></html>"#;
        let second = r#"<html><body>
            <div data-reviewid="2"><span data-automation="reviewText_2"><span>Loud at night.</span></span></div>
            </body></html>"#;
        Mock::given(method("GET"))
            .and(path("/Hotel_Review-g1-d1-Reviews-Alpha.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(first))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Hotel_Review-g1-d1-Reviews-or10-Alpha.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(second))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let url = format!("{}/Hotel_Review-g1-d1-Reviews-Alpha.html", server.uri());
        let detail = scrape_detail(&ctx, ListingKind::Hotels, &url, None).await.unwrap();
        assert_eq!(detail.name(), Some("Alpha Inn"));
        let texts: Vec<&str> = detail.reviews.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Nice pool.", "Loud at night."]);
    }

    #[tokio::test]
    async fn by_type_caps_items_and_skips_failed_details() {
        let server = MockServer::start().await;
        mount_location(&server).await;
        let listing = r#"<html><body>
            <span>300 properties</span>
            <div class="listing_title"><a href="/Hotel_Review-g1-d1-Reviews-Alpha.html">1. Alpha Inn</a></div>
            <div class="listing_title"><a href="/Hotel_Review-g1-d2-Reviews-Beta.html">2. Beta Suites</a></div>
            <div class="listing_title"><a href="/Hotel_Review-g1-d3-Reviews-Gamma.html">3. Gamma Lodge</a></div>
            <a aria-label="Next page" href="/Hotels-g1-oa3-Test-Hotels.html">Next</a>
        </body></html>"#;
        Mock::given(method("GET"))
            .and(path("/Hotels-g1-Test-Hotels.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing))
            .mount(&server)
            .await;
        // 100 pages advertised, only pages 2..=5 are fetched
        Mock::given(method("GET"))
            .and(path_regex(r"^/Hotels-g1-oa\d+-Test-Hotels\.html$"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .expect(4)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Hotel_Review-g1-d1-Reviews-Alpha.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div data-reviewid="1"><span data-automation="reviewText_1"><span>Quiet rooms.</span></span></div>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Hotel_Review-g1-d2-Reviews-Beta.html"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Hotel_Review-g1-d3-Reviews-Gamma.html"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let details = scrape_by_type(&ctx, "Test", ListingKind::Hotels, Some(2), Some(1)).await;
        assert_eq!(details.len(), 1);
        let detail = &details[0];
        assert_eq!(detail.preview.as_ref().map(|p| p.name.as_str()), Some("Alpha Inn"));
        assert_eq!(detail.kind.as_deref(), Some("hotel"));
        assert_eq!(detail.reviews[0].text, "Quiet rooms.");

        let value = serde_json::to_value(detail).unwrap();
        assert_eq!(value["type"], "hotel");
        assert_eq!(value["preview"]["name"], "Alpha Inn");
    }

    #[tokio::test]
    async fn detail_failure_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let ctx = context_for(&server.uri());
        let url = format!("{}/Hotel_Review-g1-d9-Reviews-Gone.html", server.uri());
        assert!(scrape_detail(&ctx, ListingKind::Hotels, &url, Some(2)).await.is_none());
    }

    #[tokio::test]
    async fn city_run_dedupes_by_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data/graphql/ids"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "data": {"Typeahead_autocomplete": {"results": [
                    {"text": "Koko", "details": {"placeType": "EATERY", "url": "/Restaurant_Review-g1-d2-Reviews-Koko.html"}},
                    {"text": "Fort", "details": {"placeType": "ATTRACTION", "url": "/Attraction_Review-g1-d3-Reviews-Fort.html"}}
                ]}}
            }])))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let scraper = CityScraper::new(&ctx, "San Juan", "PR", true);
        let report = scraper.scrape_all().await;
        assert_eq!(report.location_query, "San Juan PR");
        assert_eq!(report.restaurants.len(), 1);
        assert_eq!(report.attractions.len(), 1);
        assert_eq!(report.summary.total_places, 2);
        assert!(report.summary.graphql_successful);
        assert_eq!(report.by_type.dining[0].name, "Koko");
        assert_eq!(report.scraping_metadata.restaurant_search_queries.len(), 3);

        let single = scraper.scrape_scope(CityScope::Attractions).await;
        assert_eq!(single["type"], "attractions_only");
        assert_eq!(single["total"], 1);
        assert_eq!(single["attractions"][0]["name"], "Fort");
    }
}
