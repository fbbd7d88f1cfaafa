//! Loading and querying the menu index.
//!
//! Two documents produced by the OCR calibration step are combined:
//!
//! ```text
//! kiosk_ui_coords.json                     menu_cards.json
//! {                                        [
//!   "categories": [                          { "name": "아메리카노",
//!     {"name": "커피", "center": {x, y}}       "category": "커피",
//!   ],                                         "page": 1,
//!   "nav_buttons": {                           "center": {"x": 100, "y": 200} }
//!     "prev": {"center": {x, y}},          ]
//!     "next": {"center": {x, y}}
//!   }
//! }
//! ```
//!
//! The index is immutable after loading and every lookup is read-only.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::similarity::{normalize, ratio};
use super::Point;

/// Minimum similarity a fuzzy candidate must reach.
pub const DEFAULT_CUTOFF: f64 = 0.72;

// ---------------------------------------------------------------------------
// IndexError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("menu '{menu}' references unknown category '{category}'")]
    UnknownCategory { menu: String, category: String },
}

// ---------------------------------------------------------------------------
// File records
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CenterRecord {
    x: f64,
    y: f64,
}

impl From<&CenterRecord> for Point {
    fn from(c: &CenterRecord) -> Self {
        Point::new(c.x.round() as i32, c.y.round() as i32)
    }
}

#[derive(Debug, Deserialize)]
struct CenteredRecord {
    center: CenterRecord,
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    name: String,
    center: CenterRecord,
}

#[derive(Debug, Deserialize)]
struct NavButtonsRecord {
    prev: CenteredRecord,
    next: CenteredRecord,
}

#[derive(Debug, Deserialize)]
struct LayoutRecord {
    #[serde(default)]
    categories: Vec<CategoryRecord>,
    nav_buttons: NavButtonsRecord,
}

#[derive(Debug, Deserialize)]
struct MenuCardRecord {
    name: String,
    category: String,
    page: u32,
    center: CenterRecord,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Location of the page navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButtons {
    pub prev: Point,
    pub next: Point,
}

/// Where a menu card lives on the kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub category: String,
    pub page: u32,
    pub point: Point,
}

/// The outcome of resolving a spoken or typed name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// Name of the indexed entry that matched.
    pub matched_name: String,
    pub category: String,
    pub page: u32,
    pub point: Point,
    /// `1.0` for an exact hit, otherwise the winning similarity score.
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// MenuIndex
// ---------------------------------------------------------------------------

/// Immutable name → location index.
#[derive(Debug, Clone)]
pub struct MenuIndex {
    categories: HashMap<String, Point>,
    nav: NavButtons,
    entries: HashMap<String, MenuEntry>,
    /// Menu names in first-seen file order.
    names: Vec<String>,
}

impl MenuIndex {
    /// Load the layout description and the menu-card list from disk.
    ///
    /// # Errors
    ///
    /// Fails when either file is missing or malformed, or when a menu card
    /// references a category the layout does not define.
    pub fn load(ui_coords_path: &Path, menu_cards_path: &Path) -> Result<Self, IndexError> {
        let layout = read(ui_coords_path)?;
        let cards = read(menu_cards_path)?;
        Self::from_json(&layout, &cards)
    }

    /// Build an index from the two documents' JSON text.
    pub fn from_json(layout_json: &str, cards_json: &str) -> Result<Self, IndexError> {
        let layout: LayoutRecord =
            serde_json::from_str(layout_json).map_err(|source| IndexError::Parse {
                what: "layout".into(),
                source,
            })?;
        let cards: Vec<MenuCardRecord> =
            serde_json::from_str(cards_json).map_err(|source| IndexError::Parse {
                what: "menu cards".into(),
                source,
            })?;

        let categories: HashMap<String, Point> = layout
            .categories
            .iter()
            .map(|c| (c.name.clone(), Point::from(&c.center)))
            .collect();

        let nav = NavButtons {
            prev: Point::from(&layout.nav_buttons.prev.center),
            next: Point::from(&layout.nav_buttons.next.center),
        };

        let mut entries = HashMap::with_capacity(cards.len());
        let mut names = Vec::with_capacity(cards.len());
        for card in cards {
            if !categories.contains_key(&card.category) {
                return Err(IndexError::UnknownCategory {
                    menu: card.name,
                    category: card.category,
                });
            }
            let entry = MenuEntry {
                point: Point::from(&card.center),
                category: card.category,
                page: card.page,
            };
            // a repeated name keeps its first position but takes the last location
            if entries.insert(card.name.clone(), entry).is_none() {
                names.push(card.name);
            }
        }

        log::info!(
            "menu: index loaded ({} categories, {} items)",
            categories.len(),
            names.len()
        );

        Ok(Self {
            categories,
            nav,
            entries,
            names,
        })
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Exact, case- and whitespace-sensitive entry lookup.
    pub fn entry(&self, name: &str) -> Option<&MenuEntry> {
        self.entries.get(name)
    }

    /// Center of a category tab.
    pub fn category(&self, name: &str) -> Option<Point> {
        self.categories.get(name).copied()
    }

    pub fn nav_buttons(&self) -> NavButtons {
        self.nav
    }

    /// Menu names in file order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve with the default cutoff of `0.72`.
    pub fn resolve(&self, spoken: &str) -> Option<ResolvedTarget> {
        self.resolve_with_cutoff(spoken, DEFAULT_CUTOFF)
    }

    /// Resolve `spoken` to a menu entry.  First hit wins:
    ///
    /// 1. exact key match;
    /// 2. best raw similarity ≥ `cutoff` (equal scores prefer the greater
    ///    name);
    /// 3. best similarity after [`normalize`] on both sides ≥ `cutoff`
    ///    (equal scores keep the earlier name).
    pub fn resolve_with_cutoff(&self, spoken: &str, cutoff: f64) -> Option<ResolvedTarget> {
        if let Some(entry) = self.entries.get(spoken) {
            return Some(self.target(spoken, entry, 1.0));
        }

        let mut close: Option<(f64, &str)> = None;
        for name in &self.names {
            let score = ratio(name, spoken);
            if score < cutoff {
                continue;
            }
            let better = match close {
                None => true,
                Some((best, best_name)) => {
                    score > best || (score == best && name.as_str() > best_name)
                }
            };
            if better {
                close = Some((score, name));
            }
        }
        if let Some((score, name)) = close {
            return self.lookup_target(name, score);
        }

        let wanted = normalize(spoken);
        let mut best: Option<(f64, &str)> = None;
        for name in &self.names {
            let score = ratio(&wanted, &normalize(name));
            if best.map_or(score > 0.0, |(b, _)| score > b) {
                best = Some((score, name));
            }
        }
        match best {
            Some((score, name)) if score >= cutoff => self.lookup_target(name, score),
            _ => None,
        }
    }

    fn lookup_target(&self, name: &str, score: f64) -> Option<ResolvedTarget> {
        self.entries
            .get(name)
            .map(|entry| self.target(name, entry, score))
    }

    fn target(&self, name: &str, entry: &MenuEntry, confidence: f64) -> ResolvedTarget {
        ResolvedTarget {
            matched_name: name.to_string(),
            category: entry.category.clone(),
            page: entry.page,
            point: entry.point,
            confidence,
        }
    }
}

fn read(path: &Path) -> Result<String, IndexError> {
    std::fs::read_to_string(path).map_err(|source| IndexError::Read {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

/// Small two-category layout shared by tests across the crate.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::MenuIndex;

    pub const LAYOUT: &str = r#"{
        "categories": [
            {"name": "커피", "center": {"x": 50, "y": 300}},
            {"name": "디저트", "center": {"x": 50, "y": 400}}
        ],
        "nav_buttons": {
            "prev": {"center": {"x": 40, "y": 900}},
            "next": {"center": {"x": 1040, "y": 900}}
        }
    }"#;

    pub const CARDS: &str = r#"[
        {"name": "아메리카노", "category": "커피", "page": 1, "center": {"x": 100, "y": 200}},
        {"name": "카페 라떼", "category": "커피", "page": 1, "center": {"x": 300, "y": 200}},
        {"name": "바닐라 라떼", "category": "커피", "page": 2, "center": {"x": 100, "y": 500}},
        {"name": "초코칩 쿠키", "category": "디저트", "page": 3, "center": {"x": 500, "y": 700}}
    ]"#;

    pub fn index() -> MenuIndex {
        MenuIndex::from_json(LAYOUT, CARDS).expect("fixture index")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::fixtures::{index, CARDS, LAYOUT};
    use super::*;
    use tempfile::tempdir;

    // ---- loading ---

    #[test]
    fn loads_categories_nav_and_entries() {
        let idx = index();
        assert_eq!(idx.len(), 4);
        assert_eq!(idx.category("커피"), Some(Point::new(50, 300)));
        assert_eq!(idx.nav_buttons().next, Point::new(1040, 900));
        assert_eq!(idx.nav_buttons().prev, Point::new(40, 900));
        let names: Vec<&str> = idx.names().iter().map(String::as_str).collect();
        assert_eq!(names, ["아메리카노", "카페 라떼", "바닐라 라떼", "초코칩 쿠키"]);
    }

    #[test]
    fn load_reads_both_files() {
        let dir = tempdir().expect("temp dir");
        let ui = dir.path().join("ui.json");
        let cards = dir.path().join("cards.json");
        std::fs::write(&ui, LAYOUT).unwrap();
        std::fs::write(&cards, CARDS).unwrap();

        let idx = MenuIndex::load(&ui, &cards).expect("load");
        assert_eq!(idx.entry("초코칩 쿠키").map(|e| e.page), Some(3));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().expect("temp dir");
        let err = MenuIndex::load(&dir.path().join("nope.json"), &dir.path().join("x.json"))
            .unwrap_err();
        assert!(matches!(err, IndexError::Read { .. }));
    }

    #[test]
    fn missing_nav_buttons_is_a_parse_error() {
        let err = MenuIndex::from_json(r#"{"categories": []}"#, "[]").unwrap_err();
        assert!(matches!(err, IndexError::Parse { .. }));
    }

    #[test]
    fn card_with_unknown_category_is_rejected() {
        let cards = r#"[{"name": "녹차", "category": "티", "page": 1, "center": {"x": 1, "y": 2}}]"#;
        let err = MenuIndex::from_json(LAYOUT, cards).unwrap_err();
        match err {
            IndexError::UnknownCategory { menu, category } => {
                assert_eq!(menu, "녹차");
                assert_eq!(category, "티");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fractional_centers_are_rounded() {
        let cards =
            r#"[{"name": "녹차", "category": "커피", "page": 1, "center": {"x": 10.6, "y": 20.2}}]"#;
        let idx = MenuIndex::from_json(LAYOUT, cards).unwrap();
        assert_eq!(idx.entry("녹차").unwrap().point, Point::new(11, 20));
    }

    #[test]
    fn duplicate_name_keeps_position_takes_last_location() {
        let cards = r#"[
            {"name": "A", "category": "커피", "page": 1, "center": {"x": 1, "y": 1}},
            {"name": "B", "category": "커피", "page": 1, "center": {"x": 2, "y": 2}},
            {"name": "A", "category": "디저트", "page": 2, "center": {"x": 3, "y": 3}}
        ]"#;
        let idx = MenuIndex::from_json(LAYOUT, cards).unwrap();
        assert_eq!(idx.names(), ["A".to_string(), "B".to_string()]);
        assert_eq!(idx.entry("A").unwrap().category, "디저트");
    }

    // ---- resolve ---

    #[test]
    fn exact_names_resolve_to_their_entry() {
        let idx = index();
        for name in idx.names() {
            let hit = idx.resolve(name).expect("exact hit");
            assert_eq!(&hit.matched_name, name);
            assert_eq!(hit.point, idx.entry(name).unwrap().point);
            assert_eq!(hit.confidence, 1.0);
        }
    }

    #[test]
    fn close_name_resolves_fuzzily() {
        let idx = index();
        // one syllable short: 2*4/9 ≈ 0.89
        let hit = idx.resolve("아메리카").expect("fuzzy hit");
        assert_eq!(hit.matched_name, "아메리카노");
        assert_eq!(hit.category, "커피");
        assert!(hit.confidence < 1.0 && hit.confidence >= DEFAULT_CUTOFF);
    }

    #[test]
    fn spacing_and_case_differences_use_normalized_pass() {
        let cards = r#"[{"name": "Iced Vanilla Latte", "category": "커피", "page": 2, "center": {"x": 9, "y": 9}}]"#;
        let idx = MenuIndex::from_json(LAYOUT, cards).unwrap();
        // raw ratio is low because of case; normalized strings are identical
        let hit = idx.resolve("ICEDVANILLALATTE").expect("normalized hit");
        assert_eq!(hit.matched_name, "Iced Vanilla Latte");
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn unrelated_name_resolves_to_nothing() {
        let idx = index();
        assert!(idx.resolve("김치찌개").is_none());
        assert!(idx.resolve("").is_none());
    }

    #[test]
    fn cutoff_is_respected() {
        let idx = index();
        // "아메리" vs "아메리카노" scores 0.75
        assert!(idx.resolve_with_cutoff("아메리", 0.72).is_some());
        assert!(idx.resolve_with_cutoff("아메리", 0.80).is_none());
    }

    #[test]
    fn raw_pass_scores_candidate_against_spoken() {
        // matching blocks depend on argument order: 10/13 this way round,
        // 8/13 the other
        let cards = r#"[{"name": "caadcac", "category": "커피", "page": 1, "center": {"x": 3, "y": 3}}]"#;
        let idx = MenuIndex::from_json(LAYOUT, cards).unwrap();
        let hit = idx.resolve("caaada").expect("raw fuzzy hit");
        assert_eq!(hit.matched_name, "caadcac");
        assert!((hit.confidence - 10.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn equal_raw_scores_prefer_greater_name() {
        let cards = r#"[
            {"name": "abcx", "category": "커피", "page": 1, "center": {"x": 1, "y": 1}},
            {"name": "abcy", "category": "커피", "page": 1, "center": {"x": 2, "y": 2}}
        ]"#;
        let idx = MenuIndex::from_json(LAYOUT, cards).unwrap();
        let hit = idx.resolve("abcz").expect("hit");
        assert_eq!(hit.matched_name, "abcy");
    }
}
