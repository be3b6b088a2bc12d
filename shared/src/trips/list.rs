use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::model::{Trip, TripId};

pub const TRIPS_PER_PAGE: usize = 8;
/// Pages shown on each side of the current one.
pub const PAGE_WINDOW: u32 = 2;

/// One entry of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageLabel", into = "RawPageLabel")]
pub enum PageLabel {
    Page(u32),
    Ellipsis,
}

pub const ELLIPSIS: &str = "...";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPageLabel {
    Page(u32),
    Marker(String),
}

impl From<PageLabel> for RawPageLabel {
    fn from(label: PageLabel) -> Self {
        match label {
            PageLabel::Page(page) => RawPageLabel::Page(page),
            PageLabel::Ellipsis => RawPageLabel::Marker(ELLIPSIS.to_string()),
        }
    }
}

impl TryFrom<RawPageLabel> for PageLabel {
    type Error = String;

    fn try_from(raw: RawPageLabel) -> Result<Self, Self::Error> {
        match raw {
            RawPageLabel::Page(page) => Ok(PageLabel::Page(page)),
            RawPageLabel::Marker(marker) if marker == ELLIPSIS => Ok(PageLabel::Ellipsis),
            RawPageLabel::Marker(other) => Err(format!("unknown page marker '{other}'")),
        }
    }
}

/// Windowed page labels, produced lazily.
///
/// Page 1 and the last page are always present, as is every page within
/// [`PAGE_WINDOW`] of the current one. A gap hiding exactly one page shows
/// that page; a longer gap collapses into a single [`PageLabel::Ellipsis`].
/// Each call to `TripList::displayed_pages` starts a fresh walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLabels {
    total: u32,
    window_start: u32,
    window_end: u32,
    last: Option<u32>,
    queued: Option<u32>,
}

impl PageLabels {
    pub fn new(total: u32, current: u32) -> Self {
        Self {
            total,
            window_start: current.saturating_sub(PAGE_WINDOW).max(1),
            window_end: current.saturating_add(PAGE_WINDOW),
            last: None,
            queued: None,
        }
    }

    fn is_shown(&self, page: u32) -> bool {
        page == 1 || page == self.total || (self.window_start..=self.window_end).contains(&page)
    }

    fn next_shown(&self) -> Option<u32> {
        let candidate = self.last.map_or(1, |last| last + 1);
        if candidate > self.total {
            return None;
        }
        if self.is_shown(candidate) {
            Some(candidate)
        } else if candidate < self.window_start {
            Some(self.window_start.min(self.total))
        } else {
            Some(self.total)
        }
    }
}

impl Iterator for PageLabels {
    type Item = PageLabel;

    fn next(&mut self) -> Option<PageLabel> {
        if let Some(page) = self.queued.take() {
            self.last = Some(page);
            return Some(PageLabel::Page(page));
        }

        let page = self.next_shown()?;
        match self.last {
            Some(last) if page - last == 2 => {
                self.queued = Some(page);
                self.last = Some(last + 1);
                Some(PageLabel::Page(last + 1))
            }
            Some(last) if page - last > 2 => {
                self.queued = Some(page);
                Some(PageLabel::Ellipsis)
            }
            _ => {
                self.last = Some(page);
                Some(PageLabel::Page(page))
            }
        }
    }
}

impl std::iter::FusedIterator for PageLabels {}

/// The caller's trips plus search and pagination state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripList {
    trips: Vec<Trip>,
    search_query: String,
    current_page: u32,
    loading: bool,
}

impl Default for TripList {
    fn default() -> Self {
        Self {
            trips: Vec::new(),
            search_query: String::new(),
            current_page: 1,
            loading: false,
        }
    }
}

impl TripList {
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn find(&self, id: TripId) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// A failed fetch keeps the previous collection.
    pub fn finish_fetch(&mut self, result: Result<Vec<Trip>, ApiError>) {
        self.loading = false;
        match result {
            Ok(trips) => {
                debug!(count = trips.len(), "trip list replaced");
                self.trips = trips;
            }
            Err(ApiError::SignedOut) => debug!("trips dropped, session closed"),
            Err(error) => warn!(%error, "failed to fetch trips"),
        }
        self.clamp_page();
    }

    /// Trips matching the search query, in collection order.
    pub fn filtered(&self) -> Vec<&Trip> {
        if self.search_query.is_empty() {
            return self.trips.iter().collect();
        }
        let needle = self.search_query.to_lowercase();
        self.trips.iter().filter(|trip| trip.matches(&needle)).collect()
    }

    pub fn total_pages(&self) -> u32 {
        let matches = self.filtered().len();
        u32::try_from(matches.div_ceil(TRIPS_PER_PAGE)).unwrap_or(u32::MAX)
    }

    pub fn paginated(&self) -> Vec<&Trip> {
        let start = (self.current_page.max(1) as usize - 1) * TRIPS_PER_PAGE;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(TRIPS_PER_PAGE)
            .collect()
    }

    pub fn displayed_pages(&self) -> PageLabels {
        PageLabels::new(self.total_pages(), self.current_page)
    }

    /// Returns whether the page changed. Ellipsis and out-of-range pages are
    /// ignored.
    pub fn change_page(&mut self, label: PageLabel) -> bool {
        match label {
            PageLabel::Page(page) if (1..=self.total_pages()).contains(&page) => {
                self.current_page = page;
                true
            }
            _ => false,
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.current_page = 1;
        self.clamp_page();
    }

    /// Pulls the current page back into range after the filtered set shrank.
    pub fn clamp_page(&mut self) {
        let total = self.total_pages();
        if self.current_page > total {
            self.current_page = total.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn trip(id: i64, title: &str, description: &str) -> Trip {
        Trip {
            id: TripId(id),
            title: title.to_string(),
            description: description.to_string(),
            photos: Vec::new(),
            tags: Vec::new(),
            latitude: None,
            longitude: None,
            created_at: None,
            updated_at: None,
            author: None,
        }
    }

    fn list_of(count: usize) -> TripList {
        let mut list = TripList::default();
        let trips = (0..count)
            .map(|i| trip(i as i64 + 1, &format!("Trip {i}"), "somewhere"))
            .collect();
        list.finish_fetch(Ok(trips));
        list
    }

    fn labels(total: u32, current: u32) -> Vec<PageLabel> {
        PageLabels::new(total, current).collect()
    }

    use PageLabel::{Ellipsis, Page};

    #[test]
    fn one_hidden_page_is_filled_in() {
        assert_eq!(
            labels(10, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Page(7), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn ellipsis_on_both_sides() {
        assert_eq!(
            labels(20, 10),
            vec![
                Page(1),
                Ellipsis,
                Page(8),
                Page(9),
                Page(10),
                Page(11),
                Page(12),
                Ellipsis,
                Page(20),
            ]
        );
    }

    #[test]
    fn edges_of_the_range() {
        assert_eq!(labels(0, 1), vec![]);
        assert_eq!(labels(1, 1), vec![Page(1)]);
        assert_eq!(labels(2, 1), vec![Page(1), Page(2)]);
        assert_eq!(labels(6, 1), vec![Page(1), Page(2), Page(3), Ellipsis, Page(6)]);
        assert_eq!(labels(6, 6), vec![Page(1), Ellipsis, Page(4), Page(5), Page(6)]);
        assert_eq!(labels(5, 1), vec![Page(1), Page(2), Page(3), Page(4), Page(5)]);
    }

    #[test]
    fn page_labels_can_be_walked_again() {
        let list = list_of(80);
        let first: Vec<_> = list.displayed_pages().collect();
        let second: Vec<_> = list.displayed_pages().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn page_labels_serialize_as_numbers_and_dots() {
        let json = serde_json::to_string(&labels(10, 5)).unwrap();
        assert_eq!(json, r#"[1,2,3,4,5,6,7,"...",10]"#);

        let parsed: Vec<PageLabel> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, labels(10, 5));
        assert!(serde_json::from_str::<PageLabel>(r#""…""#).is_err());
    }

    #[test]
    fn empty_query_returns_the_whole_collection() {
        let list = list_of(3);
        let filtered = list.filtered();
        assert_eq!(filtered.len(), 3);
        assert!(std::ptr::eq(filtered[0], &list.trips()[0]));
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let mut list = TripList::default();
        list.finish_fetch(Ok(vec![
            trip(1, "Alps Hike", "snow"),
            trip(2, "City break", "Museums in VIENNA"),
            trip(3, "Beach", "sun"),
        ]));

        list.set_search_query("vienna");
        let ids: Vec<_> = list.filtered().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TripId(2)]);

        list.set_search_query("ALPS");
        let ids: Vec<_> = list.filtered().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TripId(1)]);
    }

    #[test]
    fn search_change_resets_to_first_page() {
        let mut list = list_of(40);
        assert!(list.change_page(Page(4)));
        list.set_search_query("Trip");
        assert_eq!(list.current_page(), 1);
    }

    #[test]
    fn change_page_ignores_out_of_range_and_ellipsis() {
        let mut list = list_of(20);
        assert_eq!(list.total_pages(), 3);
        assert!(!list.change_page(Page(0)));
        assert!(!list.change_page(Page(4)));
        assert!(!list.change_page(Ellipsis));
        assert_eq!(list.current_page(), 1);
        assert!(list.change_page(Page(3)));
        assert_eq!(list.current_page(), 3);
    }

    #[test]
    fn shrinking_collection_clamps_the_page() {
        let mut list = list_of(17);
        assert!(list.change_page(Page(3)));

        let remaining = list.trips()[..16].to_vec();
        list.finish_fetch(Ok(remaining));
        assert_eq!(list.current_page(), 2);

        list.finish_fetch(Ok(Vec::new()));
        assert_eq!(list.current_page(), 1);
        assert_eq!(list.total_pages(), 0);
    }

    #[test]
    fn failed_fetch_keeps_previous_trips() {
        let mut list = list_of(5);
        list.begin_fetch();
        assert!(list.is_loading());
        list.finish_fetch(Err(ApiError::MalformedBody("eof".into())));
        assert!(!list.is_loading());
        assert_eq!(list.trips().len(), 5);
    }

    proptest! {
        #[test]
        fn filtered_is_exactly_the_matching_subsequence(
            titles in prop::collection::vec("[a-cA-C]{0,4}", 0..30),
            query in "[a-cA-C]{1,2}",
        ) {
            let mut list = TripList::default();
            let trips: Vec<Trip> = titles
                .iter()
                .enumerate()
                .map(|(i, t)| trip(i as i64, t, ""))
                .collect();
            list.finish_fetch(Ok(trips.clone()));
            list.set_search_query(query.clone());

            let needle = query.to_lowercase();
            let expected: Vec<TripId> = trips
                .iter()
                .filter(|t| t.title.to_lowercase().contains(&needle))
                .map(|t| t.id)
                .collect();
            let actual: Vec<TripId> = list.filtered().iter().map(|t| t.id).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn pages_partition_the_filtered_set(count in 0usize..60, page in 1u32..10) {
            let mut list = list_of(count);
            let total = list.total_pages();
            prop_assert_eq!(total as usize, count.div_ceil(TRIPS_PER_PAGE));

            list.change_page(Page(page));
            let current = list.current_page() as usize;
            let shown = list.paginated();
            prop_assert!(shown.len() <= TRIPS_PER_PAGE);

            let start = (current - 1) * TRIPS_PER_PAGE;
            for (offset, trip) in shown.iter().enumerate() {
                prop_assert_eq!(trip.id, list.trips()[start + offset].id);
            }
        }

        #[test]
        fn current_page_stays_in_range_after_refresh(
            before in 1usize..50,
            after in 0usize..50,
            page in 1u32..8,
        ) {
            let mut list = list_of(before);
            list.change_page(Page(page));
            let trips = (0..after).map(|i| trip(i as i64, "x", "y")).collect();
            list.finish_fetch(Ok(trips));
            prop_assert!(list.current_page() >= 1);
            prop_assert!(list.current_page() <= list.total_pages().max(1));
        }

        #[test]
        fn labels_always_pin_first_last_and_current(total in 1u32..40, current_seed in 0u32..40) {
            let current = current_seed % total + 1;
            let shown: Vec<PageLabel> = PageLabels::new(total, current).collect();
            prop_assert_eq!(shown.first(), Some(&Page(1)));
            prop_assert_eq!(shown.last(), Some(&Page(total)));
            prop_assert!(shown.contains(&Page(current)));

            let pages: Vec<u32> = shown
                .iter()
                .filter_map(|l| match l { Page(p) => Some(*p), Ellipsis => None })
                .collect();
            prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
