//! Page arithmetic for TripAdvisor listings and review lists.
//!
//! Both paginate by editing the URL: listings carry an `oa<offset>` token,
//! review pages insert `-or<offset>` right after `-Reviews`.

pub const REVIEW_PAGE_SIZE: usize = 10;

/// Pages assumed when the listing does not state its total.
pub const FALLBACK_PAGES: usize = 5;

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Listing page count from the advertised total, capped by `max_pages`.
pub fn listing_pages(total: Option<usize>, page_size: usize, max_pages: Option<usize>) -> usize {
    let pages = match total {
        Some(total) => page_count(total, page_size),
        None => FALLBACK_PAGES,
    };
    match max_pages {
        Some(max) if pages > max => max,
        _ => pages,
    }
}

/// URLs of listing pages 2..=pages, derived from the "Next page" link.
pub fn listing_page_urls(next_page_url: &str, page_size: usize, pages: usize) -> Vec<String> {
    let token = format!("oa{}", page_size);
    (1..pages)
        .map(|i| next_page_url.replace(&token, &format!("oa{}", page_size * i)))
        .collect()
}

/// Review page count: stated total, else an estimate from the first page.
pub fn review_pages(review_count: Option<u64>, first_page_reviews: usize, max_pages: Option<usize>) -> usize {
    let total = match review_count {
        Some(n) if n > 0 => n as usize,
        _ => first_page_reviews * REVIEW_PAGE_SIZE,
    };
    let pages = page_count(total, REVIEW_PAGE_SIZE);
    match max_pages {
        Some(max) => pages.min(max),
        None => pages,
    }
}

/// URLs of review pages 2..=pages.
pub fn review_page_urls(detail_url: &str, pages: usize) -> Vec<String> {
    (1..pages)
        .map(|i| detail_url.replace("-Reviews-", &format!("-Reviews-or{}-", REVIEW_PAGE_SIZE * i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_division() {
        assert_eq!(page_count(0, 30), 0);
        assert_eq!(page_count(30, 30), 1);
        assert_eq!(page_count(31, 30), 2);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn listing_pages_cap_and_fallback() {
        assert_eq!(listing_pages(Some(1234), 30, None), 42);
        assert_eq!(listing_pages(Some(1234), 30, Some(3)), 3);
        assert_eq!(listing_pages(None, 30, None), FALLBACK_PAGES);
        assert_eq!(listing_pages(None, 30, Some(2)), 2);
    }

    #[test]
    fn listing_urls_rewrite_offset() {
        let next = "https://www.tripadvisor.com/Hotels-g190311-oa30-Malta-Hotels.html";
        let urls = listing_page_urls(next, 30, 3);
        assert_eq!(
            urls,
            vec![
                "https://www.tripadvisor.com/Hotels-g190311-oa30-Malta-Hotels.html",
                "https://www.tripadvisor.com/Hotels-g190311-oa60-Malta-Hotels.html",
            ]
        );
        assert!(listing_page_urls(next, 30, 1).is_empty());
    }

    #[test]
    fn review_pages_from_count_or_estimate() {
        assert_eq!(review_pages(Some(95), 10, None), 10);
        assert_eq!(review_pages(Some(95), 10, Some(3)), 3);
        assert_eq!(review_pages(None, 4, None), 4);
        assert_eq!(review_pages(Some(0), 0, None), 0);
    }

    #[test]
    fn review_urls_insert_offset() {
        let url = "https://www.tripadvisor.com/Hotel_Review-g190327-d264936-Reviews-1926_Hotel_Spa-Sliema.html";
        let urls = review_page_urls(url, 3);
        assert_eq!(urls.len(), 2);
        assert_eq!(
            urls[0],
            "https://www.tripadvisor.com/Hotel_Review-g190327-d264936-Reviews-or10-1926_Hotel_Spa-Sliema.html"
        );
        assert!(urls[1].contains("-Reviews-or20-"));
    }
}
