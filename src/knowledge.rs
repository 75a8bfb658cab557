//! Hand-authored Puerto Rico data used when live scraping comes back thin.

use serde::Serialize;

use crate::collect::{Coordinates, KnowledgePlace};

pub const DESTINATION: &str = "Isla Verde & Puerto Rico";
pub const TRIPADVISOR_LOCATION_ID: u64 = 2665727;
pub const TRIPADVISOR_COORDINATES: Coordinates = Coordinates::at(18.448399, -66.01663);
pub const LAST_UPDATED: &str = "2025-08-13";

/// Static knowledge-base row.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub coordinates: Coordinates,
    pub categories: &'static [&'static str],
    pub rating: f32,
    pub estimated_reviews: u32,
    pub cuisine: Option<&'static str>,
    pub price_range: Option<&'static str>,
    pub neighborhood: Option<&'static str>,
    pub wiki_image: Option<&'static str>,
}

impl KnowledgeEntry {
    pub fn to_place(&self) -> KnowledgePlace {
        KnowledgePlace {
            name: self.name.to_string(),
            description: self.description.to_string(),
            coordinates: self.coordinates,
            categories: self.categories.iter().map(|c| c.to_string()).collect(),
            rating: self.rating,
            estimated_reviews: self.estimated_reviews,
            cuisine: self.cuisine.map(str::to_string),
            price_range: self.price_range.map(str::to_string),
            neighborhood: self.neighborhood.map(str::to_string),
            wiki_image: self.wiki_image.map(str::to_string),
        }
    }
}

const fn attraction(
    name: &'static str,
    description: &'static str,
    coordinates: Coordinates,
    categories: &'static [&'static str],
    rating: f32,
    estimated_reviews: u32,
    wiki_image: &'static str,
) -> KnowledgeEntry {
    KnowledgeEntry {
        name,
        description,
        coordinates,
        categories,
        rating,
        estimated_reviews,
        cuisine: None,
        price_range: None,
        neighborhood: None,
        wiki_image: Some(wiki_image),
    }
}

#[allow(clippy::too_many_arguments)]
const fn restaurant(
    name: &'static str,
    description: &'static str,
    coordinates: Coordinates,
    categories: &'static [&'static str],
    cuisine: &'static str,
    price_range: &'static str,
    rating: f32,
    estimated_reviews: u32,
    neighborhood: &'static str,
) -> KnowledgeEntry {
    KnowledgeEntry {
        name,
        description,
        coordinates,
        categories,
        rating,
        estimated_reviews,
        cuisine: Some(cuisine),
        price_range: Some(price_range),
        neighborhood: Some(neighborhood),
        wiki_image: None,
    }
}

pub const ATTRACTIONS: [KnowledgeEntry; 10] = [
    attraction(
        "El Yunque National Forest",
        "The only tropical rainforest in the US National Forest System, featuring waterfalls, hiking trails, and diverse wildlife. Popular trails include La Mina Falls and Mount Britton Tower.",
        Coordinates::at(18.3119, -65.8031),
        &["nature", "forest", "hiking", "waterfalls"],
        4.6,
        8500,
        "https://en.wikipedia.org/wiki/File:El_Yunque_National_Forest_Puerto_Rico.jpg",
    ),
    attraction(
        "Flamenco Beach, Culebra",
        "One of the world's most beautiful beaches located on Culebra island. Crystal clear waters and pristine white sand make it a must-visit destination.",
        Coordinates::at(18.3161, -65.3053),
        &["beach", "snorkeling", "pristine", "world_class"],
        4.8,
        4500,
        "https://en.wikipedia.org/wiki/File:Flamenco_Beach_Culebra_Puerto_Rico.jpg",
    ),
    attraction(
        "Mosquito Bay, Vieques",
        "The brightest bioluminescent bay in the world, located on Vieques island. Best experienced on dark, moonless nights for maximum glow effect.",
        Coordinates::at(18.0889, -65.4736),
        &["nature", "bioluminescent", "world_wonder", "kayaking"],
        4.9,
        3200,
        "https://en.wikipedia.org/wiki/File:Mosquito_Bay_Vieques_Bioluminescent.jpg",
    ),
    attraction(
        "Old San Juan",
        "Historic colonial district with colorful buildings, cobblestone streets, and centuries-old forts. Rich in history and culture with excellent dining.",
        Coordinates::at(18.4655, -66.1057),
        &["historic", "colonial", "culture", "walking"],
        4.7,
        12000,
        "https://en.wikipedia.org/wiki/File:Old_San_Juan_Puerto_Rico_Colorful_Buildings.jpg",
    ),
    attraction(
        "Casa Bacardí",
        "Historic rum distillery offering tours and tastings. Learn about the history of Bacardí rum and enjoy samples of their finest products.",
        Coordinates::at(18.4655, -66.0875),
        &["attraction", "distillery", "tours", "rum"],
        4.4,
        2800,
        "https://en.wikipedia.org/wiki/File:Casa_Bacardi_Puerto_Rico.jpg",
    ),
    attraction(
        "Laguna Grande Bioluminescent Bay",
        "Bioluminescent lagoon offering magical night kayak tours where the water glows with microscopic organisms called dinoflagellates.",
        Coordinates::at(18.3847, -65.8203),
        &["nature", "bioluminescence", "kayaking", "night_tours"],
        4.7,
        2100,
        "https://en.wikipedia.org/wiki/File:Bioluminescent_Bay_Puerto_Rico.jpg",
    ),
    attraction(
        "Camuy Caves",
        "One of the world's largest cave systems with underground rivers and impressive limestone formations. Guided tours available through spectacular caverns.",
        Coordinates::at(18.4789, -66.8542),
        &["nature", "caves", "underground", "tours"],
        4.5,
        1900,
        "https://en.wikipedia.org/wiki/File:Camuy_Caves_Puerto_Rico.jpg",
    ),
    attraction(
        "Arecibo Observatory",
        "Famous radio telescope featured in movies like Contact and GoldenEye. Educational visitor center with exhibits about space science and astronomy.",
        Coordinates::at(18.3544, -66.7528),
        &["science", "observatory", "education", "astronomy"],
        4.3,
        1500,
        "https://en.wikipedia.org/wiki/File:Arecibo_Observatory_Puerto_Rico.jpg",
    ),
    attraction(
        "Isla Verde Beach",
        "Popular urban beach strip with hotels, restaurants, and water sports. Known for its golden sand and clear blue waters.",
        Coordinates::at(18.4567, -66.0321),
        &["beach", "swimming", "water_sports", "urban_beach"],
        4.4,
        3400,
        "https://en.wikipedia.org/wiki/File:Isla_Verde_Beach_Puerto_Rico.jpg",
    ),
    attraction(
        "Piñones Food Kioskos",
        "Coastal area known for its kioskos (food stands) serving traditional Puerto Rican food. Great for trying local specialties like alcapurrias and bacalaitos.",
        Coordinates::at(18.4789, -65.9645),
        &["food", "local_culture", "beach", "dining"],
        4.5,
        1800,
        "https://en.wikipedia.org/wiki/File:Pinones_Puerto_Rico_Food_Kiosks.jpg",
    ),
];

pub const RESTAURANTS: [KnowledgeEntry; 10] = [
    restaurant(
        "Marmalade Restaurant & Wine Bar",
        "Upscale contemporary restaurant in Old San Juan featuring creative Puerto Rican cuisine with international influences. Known for tasting menus and wine pairings.",
        Coordinates::at(18.4659, -66.1064),
        &["fine_dining", "contemporary", "wine_bar"],
        "Contemporary Puerto Rican",
        "$$$",
        4.5,
        1200,
        "Old San Juan",
    ),
    restaurant(
        "Jose Enrique",
        "Renowned local chef's restaurant serving elevated Puerto Rican comfort food. No reservations, cash only, frequently packed with locals and food enthusiasts.",
        Coordinates::at(18.4519, -66.0621),
        &["local_favorite", "puerto_rican", "comfort_food"],
        "Puerto Rican",
        "$$",
        4.7,
        890,
        "Santurce",
    ),
    restaurant(
        "Koko",
        "Modern Asian-Puerto Rican fusion restaurant with creative cocktails and innovative dishes. Popular for both dinner and weekend brunch.",
        Coordinates::at(18.4598, -66.0711),
        &["fusion", "asian", "cocktails", "brunch"],
        "Asian-Caribbean Fusion",
        "$$$",
        4.4,
        650,
        "Condado",
    ),
    restaurant(
        "Santaella",
        "Modern Puerto Rican restaurant in a beautifully restored building. Offers contemporary interpretations of traditional dishes with emphasis on local ingredients.",
        Coordinates::at(18.4532, -66.0634),
        &["modern_puerto_rican", "local_ingredients", "historic_building"],
        "Modern Puerto Rican",
        "$$$",
        4.6,
        1100,
        "Santurce",
    ),
    restaurant(
        "La Placita de Santurce",
        "Vibrant nightlife area with numerous bars and restaurants. Traditional Puerto Rican food, live music, and local atmosphere especially lively on weekends.",
        Coordinates::at(18.4521, -66.0625),
        &["nightlife", "traditional", "live_music", "local_scene"],
        "Puerto Rican",
        "$-$$",
        4.3,
        2100,
        "Santurce",
    ),
    restaurant(
        "Piñones Food Kioskos",
        "Beachside collection of food stands serving traditional Puerto Rican fried foods. Famous for alcapurrias, bacalaitos, and fresh seafood right on the beach.",
        Coordinates::at(18.4789, -65.9645),
        &["beach_food", "traditional", "fried_food", "seafood"],
        "Traditional Puerto Rican",
        "$",
        4.5,
        1800,
        "Piñones",
    ),
    restaurant(
        "Oceano",
        "Oceanfront restaurant specializing in fresh seafood and steaks with stunning ocean views. Located in a luxury hotel with upscale atmosphere.",
        Coordinates::at(18.4567, -66.0321),
        &["seafood", "steaks", "oceanfront", "upscale"],
        "International Seafood",
        "$$$$",
        4.3,
        750,
        "Isla Verde",
    ),
    restaurant(
        "Barrachina",
        "Historic restaurant in Old San Juan claiming to be the birthplace of the piña colada. Serves traditional Puerto Rican and Caribbean cuisine.",
        Coordinates::at(18.4656, -66.1058),
        &["historic", "pina_colada", "caribbean", "tourist_favorite"],
        "Puerto Rican & Caribbean",
        "$$",
        4.1,
        3200,
        "Old San Juan",
    ),
    restaurant(
        "Lúulo",
        "Contemporary restaurant focusing on local and sustainable ingredients. Creative menu that changes seasonally, popular with locals and food critics.",
        Coordinates::at(18.4534, -66.0639),
        &["contemporary", "sustainable", "local_ingredients", "seasonal"],
        "Contemporary Puerto Rican",
        "$$$",
        4.6,
        420,
        "Santurce",
    ),
    restaurant(
        "El Convento Hotel Restaurant",
        "Elegant restaurant in a historic converted convent serving refined Puerto Rican and international cuisine with beautiful courtyard seating.",
        Coordinates::at(18.4652, -66.1063),
        &["historic_hotel", "refined", "courtyard", "international"],
        "Puerto Rican & International",
        "$$$",
        4.4,
        890,
        "Old San Juan",
    ),
];

/// Individual attractions searched one by one for the attraction guide.
pub const ATTRACTION_SEARCHES: [&str; 10] = [
    "El Yunque National Forest Puerto Rico",
    "Flamenco Beach Culebra",
    "Mosquito Bay Vieques",
    "Old San Juan Puerto Rico",
    "Casa Bacardi Puerto Rico",
    "Camuy Caves Puerto Rico",
    "Arecibo Observatory",
    "Cueva Ventana Puerto Rico",
    "Las Cabezas San Juan",
    "Piñones Puerto Rico",
];

pub const RESTAURANT_SEARCHES: [&str; 10] = [
    "Isla Verde restaurants",
    "San Juan restaurants",
    "Puerto Rico restaurants",
    "Carolina Puerto Rico restaurants",
    "Piñones restaurants",
    "Condado restaurants",
    "Old San Juan restaurants",
    "best restaurants Puerto Rico",
    "local food Puerto Rico",
    "seafood restaurants San Juan",
];

#[derive(Debug, Clone, Serialize)]
pub struct DiningHighlights {
    pub fine_dining: &'static [&'static str],
    pub local_favorites: &'static [&'static str],
    pub must_try_dishes: &'static [&'static str],
    pub signature_drinks: &'static [&'static str],
    pub food_areas: &'static [&'static str],
}

pub const DINING_HIGHLIGHTS: DiningHighlights = DiningHighlights {
    fine_dining: &["Marmalade", "Santaella", "Oceano"],
    local_favorites: &["Jose Enrique", "Piñones Kioskos", "La Placita"],
    must_try_dishes: &["Mofongo", "Alcapurrias", "Bacalaitos", "Jibarito", "Pasteles"],
    signature_drinks: &["Piña Colada", "Coquito", "Medalla Beer", "Rum cocktails"],
    food_areas: &["Piñones", "La Placita Santurce", "Old San Juan", "Condado"],
};

/// Title phrases that mark a post as worth reading.
pub const HIGH_VALUE_KEYWORDS: [&str; 10] = [
    "must do", "must visit", "recommendations", "suggestions", "tips",
    "honest review", "best place", "hidden gems", "itinerary", "guide",
];

pub const LOCATION_KEYWORDS: [&str; 10] = [
    "san juan", "old san juan", "condado", "santurce", "rincon",
    "culebra", "vieques", "el yunque", "ponce", "isabela",
];

pub const PRACTICAL_KEYWORDS: [&str; 10] = [
    "stay", "hotel", "restaurant", "food", "beach",
    "safety", "first time", "planning", "advice", "experience",
];

/// Community whose posts get a small bonus.
pub const SPECIALIZED_SUBREDDIT: &str = "PuertoRicoTravel";

pub fn attractions() -> Vec<KnowledgePlace> {
    ATTRACTIONS.iter().map(KnowledgeEntry::to_place).collect()
}

pub fn restaurants() -> Vec<KnowledgePlace> {
    RESTAURANTS.iter().map(KnowledgeEntry::to_place).collect()
}
