use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use url::Url;

use crate::collect::{ListingKind, PlaceDetail, Preview, Review};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static css selector")
}

macro_rules! selectors {
    ($($name:ident = $css:expr;)*) => {
        $(static $name: LazyLock<Selector> = LazyLock::new(|| selector($css));)*
    };
}

selectors! {
    HOTEL_ITEM = "span.listItem";
    HOTEL_TITLE_LINK = "div[data-automation=hotel-card-title] a";
    LEGACY_TITLE_LINK = "div.listing_title > a";
    ATTRACTION_BOX = "div.attraction_element, div.listing";
    RESTAURANT_BOX = "div.restaurant, div.listing";
    SPAN = "span";
    SCRIPT = "script";
    NEXT_PAGE = r#"a[aria-label="Next page"]"#;
    REVIEW = "div[data-reviewid]";
    REVIEW_TITLE = "div[data-test-target='review-title'] > a > span > span";
    REVIEW_TEXT = "span[data-automation*='reviewText'] > span";
    REVIEW_RATING = "div[data-test-target='review-rating'] > span";
    HOTEL_AMENITY = "div[data-test-target*='amenity']";
    ATTRACTION_HIGHLIGHT = "div.attractions-attraction-detail-about-card-AttractionDetailAboutCard__highlights li";
    RESTAURANT_TAG = "div.restaurants-detail-overview-cards-DetailOverviewCards__tagText--1vh6O span";
    RESTAURANT_PRICE = "div.restaurants-detail-overview-cards-DetailOverviewCards__priceRange";
}

const ATTRACTION_LINKS: [&str; 3] = [
    "div.listing_title a",
    "h3 a",
    ".attractions-attraction-overview-main-Attraction__heading a",
];

const RESTAURANT_LINKS: [&str; 4] = [
    "a.restaurants-list-ListCell__restaurantName--2aSC2",
    "div.listing_title a",
    "h3 a",
    ".restaurants-list-ListCell__restaurantName a",
];

const GENERIC_DESCRIPTIONS: [&str; 2] = ["div.fIrGe._T", "div.pIRBV._T"];

/// First non-blank direct text node of an element, trimmed.
fn own_text(el: ElementRef<'_>) -> Option<String> {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|t| t.trim())
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// All direct text nodes of an element, concatenated.
fn own_text_all(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|t| &**t)
        .collect()
}

fn resolve(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

/// "12. Casa Bacardi" → "Casa Bacardi"
fn strip_numbering(title: &str) -> String {
    title.rsplit(". ").next().unwrap_or(title).trim().to_string()
}

/// First selector (in order) that yields a value inside `scope`.
fn first_match<F>(scope: ElementRef<'_>, candidates: &[&str], mut pick: F) -> Option<String>
where
    F: FnMut(ElementRef<'_>) -> Option<String>,
{
    candidates
        .iter()
        .map(|css| selector(css))
        .find_map(|sel| scope.select(&sel).find_map(&mut pick))
}

fn href_of(el: ElementRef<'_>) -> Option<String> {
    el.value().attr("href").map(str::to_string)
}

/// Listing rows of a search page.
pub fn parse_search_page(kind: ListingKind, html: &str, page_url: &str) -> Vec<Preview> {
    let doc = Html::parse_document(html);
    match kind {
        ListingKind::Hotels => parse_hotel_listing(&doc, page_url),
        ListingKind::Attractions => parse_boxes(&doc, &ATTRACTION_BOX, &ATTRACTION_LINKS, page_url),
        ListingKind::Restaurants => parse_boxes(&doc, &RESTAURANT_BOX, &RESTAURANT_LINKS, page_url),
    }
}

fn parse_hotel_listing(doc: &Html, page_url: &str) -> Vec<Preview> {
    // 現行レイアウト
    let mut parsed = Vec::new();
    for item in doc.select(&HOTEL_ITEM) {
        let texts: Vec<&str> = item.select(&HOTEL_TITLE_LINK).flat_map(|a| a.text()).collect();
        if texts.len() < 2 {
            continue;
        }
        let title = texts[1].trim();
        let href = item.select(&HOTEL_TITLE_LINK).find_map(href_of);
        if let (false, Some(href)) = (title.is_empty(), href) {
            parsed.push(Preview {
                url: resolve(page_url, &href),
                name: title.to_string(),
            });
        }
    }
    if !parsed.is_empty() {
        return parsed;
    }

    // 旧レイアウト
    doc.select(&LEGACY_TITLE_LINK)
        .filter_map(|a| {
            let href = href_of(a)?;
            let name = strip_numbering(&own_text(a)?);
            (!name.is_empty()).then(|| Preview {
                url: resolve(page_url, &href),
                name,
            })
        })
        .collect()
}

fn parse_boxes(doc: &Html, boxes: &Selector, links: &[&str], page_url: &str) -> Vec<Preview> {
    doc.select(boxes)
        .filter_map(|b| {
            let title = first_match(b, links, own_text)?;
            let href = first_match(b, links, href_of)?;
            Some(Preview {
                url: resolve(page_url, &href),
                name: strip_numbering(&title),
            })
        })
        .collect()
}

/// Advertised result total, e.g. "1,234 properties".
pub fn parse_total_results(kind: ListingKind, html: &str) -> Option<usize> {
    let pattern = Regex::new(&format!(r"(\d*,*\d+) {}", kind.total_label())).ok()?;
    let doc = Html::parse_document(html);
    doc.select(&SPAN)
        .flat_map(|span| span.children().filter_map(|n| n.value().as_text().map(|t| t.to_string())))
        .find_map(|text| {
            pattern
                .captures(&text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().replace(',', "").parse().ok())
        })
}

pub fn next_page_href(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&NEXT_PAGE).find_map(href_of)
}

/// `ui_bubble_rating bubble_45` → 4.5
pub fn parse_bubble_rating(class: &str) -> Option<f32> {
    if !class.contains("ui_bubble_rating") {
        return None;
    }
    let (_, rest) = class.rsplit_once("bubble_")?;
    let value: u32 = rest.split_whitespace().next()?.parse().ok()?;
    Some(value as f32 / 10.0)
}

fn json_ld_needles(kind: ListingKind) -> &'static [&'static str] {
    match kind {
        ListingKind::Hotels => &["aggregateRating"],
        ListingKind::Attractions => &["aggregateRating", "TouristAttraction"],
        ListingKind::Restaurants => &["aggregateRating", "Restaurant"],
    }
}

fn description_selectors(kind: ListingKind) -> Vec<&'static str> {
    let specific = match kind {
        ListingKind::Hotels => None,
        ListingKind::Attractions => {
            Some("div.attractions-attraction-detail-about-card-AttractionDetailAboutCard__content--2tOh0")
        }
        ListingKind::Restaurants => Some("div.restaurants-detail-overview-cards-DetailOverviewCards__tagText--1vh6O"),
    };
    specific.into_iter().chain(GENERIC_DESCRIPTIONS).collect()
}

fn date_label(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Hotels => "Date of stay",
        _ => "Date of visit",
    }
}

/// Hotel, attraction or restaurant detail page.
pub fn parse_detail_page(kind: ListingKind, html: &str) -> PlaceDetail {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let needles = json_ld_needles(kind);
    let basic_data = doc
        .select(&SCRIPT)
        .map(|s| s.text().collect::<String>())
        .filter(|body| needles.iter().any(|n| body.contains(n)))
        .find_map(|body| serde_json::from_str::<Value>(&body).ok())
        .unwrap_or_else(|| Value::Object(Map::new()));

    let description = first_match(root, &description_selectors(kind), own_text);

    let mut features: Vec<String> = match kind {
        ListingKind::Hotels => doc.select(&HOTEL_AMENITY).filter_map(own_text).collect(),
        ListingKind::Attractions => doc.select(&ATTRACTION_HIGHLIGHT).filter_map(own_text).collect(),
        ListingKind::Restaurants => doc.select(&RESTAURANT_TAG).filter_map(own_text).collect(),
    };
    if kind == ListingKind::Restaurants {
        if let Some(price) = doc.select(&RESTAURANT_PRICE).find_map(own_text) {
            features.push(format!("Price Range: {}", price));
        }
    }

    let label = date_label(kind);
    let reviews = doc
        .select(&REVIEW)
        .filter_map(|review| parse_review(review, label))
        .collect();

    PlaceDetail {
        basic_data,
        description,
        features,
        reviews,
        preview: None,
        kind: None,
    }
}

fn parse_review(review: ElementRef<'_>, date_label: &str) -> Option<Review> {
    let title = review.select(&REVIEW_TITLE).find_map(own_text);
    let text: String = review.select(&REVIEW_TEXT).map(own_text_all).collect();
    let rating = review
        .select(&REVIEW_RATING)
        .filter_map(|s| s.value().attr("class"))
        .find_map(parse_bubble_rating);

    let date = review
        .select(&SPAN)
        .find(|span| {
            span.children()
                .filter_map(ElementRef::wrap)
                .any(|child| child.value().name() == "span" && child.text().any(|t| t.contains(date_label)))
        })
        .map(|span| own_text_all(span).trim().to_string())
        .filter(|d| !d.is_empty());

    if title.is_none() && text.trim().is_empty() {
        return None;
    }
    Some(Review {
        title,
        text,
        rating,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOTEL_LISTING: &str = r#"<html><body>
        <span><span>1,234 properties in Malta</span></span>
        <span class="listItem">
          <div data-automation="hotel-card-title"><a href="/Hotel_Review-g1-d10-Reviews-Grand-Malta.html"><span>1.</span><span>Grand Hotel</span></a></div>
        </span>
        <span class="listItem">
          <div data-automation="hotel-card-title"><a href="/Hotel_Review-g1-d11-Reviews-Sea_View-Malta.html"><span>2.</span><span>Sea View</span></a></div>
        </span>
        <a aria-label="Next page" href="/Hotels-g1-oa30-Malta.html">Next</a>
    </body></html>"#;

    #[test]
    fn hotel_listing_modern_layout() {
        let previews = parse_search_page(ListingKind::Hotels, HOTEL_LISTING, "https://www.tripadvisor.com/Hotels-g1-Malta.html");
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].name, "Grand Hotel");
        assert_eq!(
            previews[0].url,
            "https://www.tripadvisor.com/Hotel_Review-g1-d10-Reviews-Grand-Malta.html"
        );
    }

    #[test]
    fn hotel_listing_legacy_layout() {
        let html = r#"<div class="listing_title"><a href="/Hotel_Review-g1-d12-Reviews-Old.html">3. Old Inn</a></div>"#;
        let previews = parse_search_page(ListingKind::Hotels, html, "https://www.tripadvisor.com/Hotels-g1.html");
        assert_eq!(
            previews,
            vec![Preview {
                url: "https://www.tripadvisor.com/Hotel_Review-g1-d12-Reviews-Old.html".to_string(),
                name: "Old Inn".to_string(),
            }]
        );
    }

    #[test]
    fn attraction_and_restaurant_boxes() {
        let html = r#"
            <div class="attraction_element"><h3><a href="/Attraction_Review-g1-d1-Reviews-Fort.html">1. Fort San Felipe</a></h3></div>
            <div class="attraction_element"><p>no link here</p></div>"#;
        let previews = parse_search_page(ListingKind::Attractions, html, "https://www.tripadvisor.com/Attractions-g1.html");
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].name, "Fort San Felipe");

        let html = r#"<div class="restaurant"><div class="listing_title"><a href="/Restaurant_Review-g1-d2-Reviews-Koko.html">Koko</a></div></div>"#;
        let previews = parse_search_page(ListingKind::Restaurants, html, "https://www.tripadvisor.com/Restaurants-g1.html");
        assert_eq!(previews[0].name, "Koko");
        assert!(previews[0].url.ends_with("/Restaurant_Review-g1-d2-Reviews-Koko.html"));
    }

    #[test]
    fn totals_and_next_page() {
        assert_eq!(parse_total_results(ListingKind::Hotels, HOTEL_LISTING), Some(1234));
        assert_eq!(parse_total_results(ListingKind::Restaurants, HOTEL_LISTING), None);
        assert_eq!(next_page_href(HOTEL_LISTING).as_deref(), Some("/Hotels-g1-oa30-Malta.html"));
        assert_eq!(next_page_href("<p>done</p>"), None);
    }

    #[test]
    fn bubble_ratings() {
        assert_eq!(parse_bubble_rating("ui_bubble_rating bubble_50"), Some(5.0));
        assert_eq!(parse_bubble_rating("ui_bubble_rating bubble_45"), Some(4.5));
        assert_eq!(parse_bubble_rating("ui_bubble_rating bubble_45 extra"), Some(4.5));
        assert_eq!(parse_bubble_rating("ui_bubble_rating"), None);
        assert_eq!(parse_bubble_rating("something_else bubble_40"), None);
    }

    #[test]
    fn hotel_detail_page() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"name": "Grand Hotel", "aggregateRating": {"ratingValue": "4.5", "reviewCount": "25"}}</script>
            <script>window.broken = {aggregateRating</script>
            </head><body>
            <div class="fIrGe _T">Seafront rooms.</div>
            <div data-test-target="hotel-amenity-list">Pool</div>
            <div data-test-target="amenity_text">Free WiFi</div>
            <div data-reviewid="1">
              <div data-test-target="review-title"><a href="/r1"><span><span>Lovely stay</span></span></a></div>
              <div data-test-target="review-rating"><span class="ui_bubble_rating bubble_40"></span></div>
              <span data-automation="reviewText_1"><span>Great staff.</span><span> Clean rooms.</span></span>
              <span><span>Date of stay:</span> March 2024</span>
            </div>
            <div data-reviewid="2"><p>empty</p></div>
            </body></html>"#;
        let detail = parse_detail_page(ListingKind::Hotels, html);
        assert_eq!(detail.name(), Some("Grand Hotel"));
        assert_eq!(detail.review_count(), Some(25));
        assert_eq!(detail.description.as_deref(), Some("Seafront rooms."));
        assert_eq!(detail.features, vec!["Pool", "Free WiFi"]);
        assert_eq!(detail.reviews.len(), 1);
        let review = &detail.reviews[0];
        assert_eq!(review.title.as_deref(), Some("Lovely stay"));
        assert_eq!(review.text, "Great staff. Clean rooms.");
        assert_eq!(review.rating, Some(4.0));
        assert_eq!(review.date.as_deref(), Some("March 2024"));
    }

    #[test]
    fn attraction_detail_page() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "TouristAttraction", "name": "El Morro"}</script>
            </head><body>
            <div class="attractions-attraction-detail-about-card-AttractionDetailAboutCard__content--2tOh0">Sixteenth-century citadel.</div>
            <div class="fIrGe _T">Generic blurb.</div>
            <div class="attractions-attraction-detail-about-card-AttractionDetailAboutCard__highlights">
              <ul><li>Ocean views</li><li>Guided tours</li></ul>
            </div>
            <div data-reviewid="9">
              <span data-automation="reviewText_9"><span>Worth the climb.</span></span>
              <span><span>Date of visit:</span> June 2024</span>
            </div>
            </body></html>"#;
        let detail = parse_detail_page(ListingKind::Attractions, html);
        assert_eq!(detail.name(), Some("El Morro"));
        assert_eq!(detail.description.as_deref(), Some("Sixteenth-century citadel."));
        assert_eq!(detail.features, vec!["Ocean views", "Guided tours"]);
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].text, "Worth the climb.");
        assert_eq!(detail.reviews[0].date.as_deref(), Some("June 2024"));

        // hotel parsing needs aggregateRating and a stay date
        let as_hotel = parse_detail_page(ListingKind::Hotels, html);
        assert_eq!(as_hotel.basic_data, serde_json::json!({}));
        assert_eq!(as_hotel.description.as_deref(), Some("Generic blurb."));
        assert_eq!(as_hotel.reviews[0].date, None);
    }

    #[test]
    fn restaurant_detail_price_range() {
        let html = r#"<html><body>
            <div class="restaurants-detail-overview-cards-DetailOverviewCards__tagText--1vh6O">Puerto Rican<span>Caribbean</span><span>Seafood</span></div>
            <div class="restaurants-detail-overview-cards-DetailOverviewCards__priceRange">$$ - $$$</div>
            </body></html>"#;
        let detail = parse_detail_page(ListingKind::Restaurants, html);
        assert_eq!(detail.description.as_deref(), Some("Puerto Rican"));
        assert_eq!(detail.features, vec!["Caribbean", "Seafood", "Price Range: $$ - $$$"]);
        assert_eq!(detail.basic_data, serde_json::json!({}));
    }
}
