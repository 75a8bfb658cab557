use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use dashmap::DashSet;

use crate::collect::{GuideEntry, KnowledgePlace, Place};

/// Run-local set of keys already collected. Shared between concurrent page fetches.
#[derive(Debug, Default)]
pub struct SeenSet {
    keys: DashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a non-empty key is offered.
    pub fn insert(&self, key: &str) -> bool {
        !key.is_empty() && self.keys.insert(key.to_string())
    }
}

/// Keep the first item for every key, preserving order.
pub fn dedupe_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Scraped places first, then knowledge-base entries whose lower-cased name
/// was not scraped.
pub fn merge_with_knowledge(scraped: &[Place], knowledge: Vec<KnowledgePlace>) -> Vec<GuideEntry> {
    let scraped_names: HashSet<String> = scraped.iter().map(|p| p.name.to_lowercase()).collect();

    let mut merged: Vec<GuideEntry> = scraped.iter().cloned().map(GuideEntry::Scraped).collect();
    merged.extend(
        knowledge
            .into_iter()
            .filter(|k| !scraped_names.contains(&k.name.to_lowercase()))
            .map(GuideEntry::Knowledge),
    );
    merged
}

pub fn group_by_area(entries: &[GuideEntry]) -> BTreeMap<String, Vec<GuideEntry>> {
    let mut groups: BTreeMap<String, Vec<GuideEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.area()).or_default().push(entry.clone());
    }
    groups
}

/// Mention counts, highest first; ties keep first-seen order. At most `top` rows.
pub fn count_mentions<'a>(names: impl IntoIterator<Item = &'a str>, top: usize) -> Vec<(String, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|name| (name.to_string(), counts[name]))
        .collect();
    // sort_by は安定ソートなので同数は初出順のまま
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(top);
    ranked
}

pub fn distinct_sources(entries: &[GuideEntry]) -> usize {
    entries
        .iter()
        .map(GuideEntry::data_source)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::Coordinates;
    use chrono::Utc;

    fn place(name: &str, url: &str) -> Place {
        Place {
            name: name.to_string(),
            tripadvisor_url: url.to_string(),
            location_id: None,
            place_type: "ATTRACTION".to_string(),
            coordinates: Coordinates::default(),
            address: String::new(),
            search_query: "q".to_string(),
            scraped_at: Utc::now(),
        }
    }

    fn knowledge(name: &str, neighborhood: Option<&str>) -> KnowledgePlace {
        KnowledgePlace {
            name: name.to_string(),
            description: String::new(),
            coordinates: Coordinates::default(),
            categories: vec![],
            rating: 4.0,
            estimated_reviews: 10,
            cuisine: None,
            price_range: None,
            neighborhood: neighborhood.map(str::to_string),
            wiki_image: None,
        }
    }

    #[test]
    fn seen_set_rejects_repeats_and_empty_keys() {
        let seen = SeenSet::new();
        assert!(seen.insert("/a"));
        assert!(!seen.insert("/a"));
        assert!(!seen.insert(""));
        assert!(seen.insert("/b"));
    }

    #[test]
    fn dedupe_keeps_first() {
        let items = vec![("a", 1), ("b", 2), ("a", 3)];
        let out = dedupe_by(items, |(k, _)| *k);
        assert_eq!(out, vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn knowledge_merge_skips_scraped_names() {
        let scraped = vec![place("Old San Juan", "/a")];
        let merged = merge_with_knowledge(
            &scraped,
            vec![knowledge("old san juan", None), knowledge("Camuy Caves", None)],
        );
        let names: Vec<&str> = merged.iter().map(GuideEntry::name).collect();
        assert_eq!(names, vec!["Old San Juan", "Camuy Caves"]);
        assert_eq!(merged[0].data_source(), "tripadvisor_graphql");
        assert_eq!(merged[1].data_source(), "knowledge_base");
        assert_eq!(distinct_sources(&merged), 2);
    }

    #[test]
    fn knowledge_only_when_nothing_scraped() {
        let merged = merge_with_knowledge(&[], vec![knowledge("Koko", Some("Condado"))]);
        assert_eq!(merged.len(), 1);
        assert_eq!(distinct_sources(&merged), 1);
    }

    #[test]
    fn grouping_uses_neighborhood_then_address() {
        let mut scraped = place("Oceano", "/o");
        scraped.address = "Carolina, Puerto Rico".to_string();
        let entries = vec![
            GuideEntry::Knowledge(knowledge("Koko", Some("Condado"))),
            GuideEntry::Scraped(scraped),
            GuideEntry::Scraped(place("Nameless", "/n")),
        ];
        let groups = group_by_area(&entries);
        assert_eq!(groups["Condado"].len(), 1);
        assert_eq!(groups["Carolina, Puerto Rico"].len(), 1);
        assert_eq!(groups["Unknown Area"].len(), 1);
    }

    #[test]
    fn mentions_are_ranked() {
        let names = ["Condado Beach", "El Yunque", "El Yunque", "Casa Bacardi", "Condado Beach", "El Yunque"];
        let ranked = count_mentions(names.iter().copied(), 2);
        assert_eq!(
            ranked,
            vec![("El Yunque".to_string(), 3), ("Condado Beach".to_string(), 2)]
        );
    }
}
