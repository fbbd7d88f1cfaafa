//! [`Navigator`]: owns the believed kiosk position and issues every click.

use std::sync::Arc;
use std::time::Duration;

use super::{NavError, Pointer, PointerError};
use crate::config::KioskConfig;
use crate::menu::{MenuEntry, MenuIndex, Point};

// ---------------------------------------------------------------------------
// NavigationState
// ---------------------------------------------------------------------------

/// Where the navigator believes the kiosk currently is.
///
/// This is bookkeeping only; nothing verifies it against the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_category: Option<String>,
    pub current_page: u32,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_category: None,
            current_page: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

pub struct Navigator {
    index: Arc<MenuIndex>,
    pointer: Box<dyn Pointer>,
    timing: KioskConfig,
    state: NavigationState,
}

impl Navigator {
    pub fn new(index: Arc<MenuIndex>, pointer: Box<dyn Pointer>, timing: KioskConfig) -> Self {
        if timing.dry_run {
            log::info!("nav: dry-run mode, clicks are logged only");
        }
        Self {
            index,
            pointer,
            timing,
            state: NavigationState::default(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn index(&self) -> &MenuIndex {
        &self.index
    }

    pub fn timing(&self) -> &KioskConfig {
        &self.timing
    }

    /// Forget the believed position without touching the screen.
    pub fn reset_navigation(&mut self) {
        self.state = NavigationState::default();
    }

    // -----------------------------------------------------------------------
    // Primitive
    // -----------------------------------------------------------------------

    /// Click `point`: move, verify, press, hold, release, pause.
    ///
    /// If the cursor lands more than `move_tolerance_px` away from the target
    /// the move is repeated once before pressing.
    pub fn click(&mut self, point: Point) -> Result<(), PointerError> {
        if self.timing.dry_run {
            log::info!("nav: [dry-run] click {point}");
            return Ok(());
        }

        self.pointer.move_to(point)?;
        let landed = self.pointer.position()?;
        if !landed.within(point, self.timing.move_tolerance_px) {
            log::debug!("nav: pointer landed at {landed}, retrying move to {point}");
            self.pointer.move_to(point)?;
        }

        self.pointer.press()?;
        pause(Duration::from_millis(self.timing.hold_ms));
        self.pointer.release()?;
        pause(Duration::from_millis(self.timing.post_click_ms));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Open category `name`.  The kiosk always shows page 1 afterwards.
    pub fn go_category(&mut self, name: &str) -> Result<(), NavError> {
        let point = self
            .index
            .category(name)
            .ok_or_else(|| NavError::UnknownCategory(name.to_string()))?;

        self.click(point)?;
        pause(self.timing.category_delay());
        self.state = NavigationState {
            current_category: Some(name.to_string()),
            current_page: 1,
        };
        log::debug!("nav: category '{name}' open");
        Ok(())
    }

    /// Advance to `target` by clicking "next" once per intervening page.
    ///
    /// Targets at or below 1 just reset the page counter.  A target behind
    /// the current page issues no clicks since the kiosk has no reliable way
    /// back.
    pub fn go_to_page(&mut self, target: u32) -> Result<(), NavError> {
        if target <= 1 {
            self.state.current_page = 1;
            return Ok(());
        }
        if self.state.current_page == target {
            return Ok(());
        }
        if self.state.current_page > target {
            log::warn!(
                "nav: asked for page {target} while on page {}, staying put",
                self.state.current_page
            );
            return Ok(());
        }

        let next = self.index.nav_buttons().next;
        while self.state.current_page < target {
            self.click(next)?;
            pause(self.timing.page_delay());
            self.state.current_page += 1;
        }
        log::debug!("nav: page {target} reached");
        Ok(())
    }

    /// Bring the card for `entry` on screen.
    pub fn go_to_entry(&mut self, entry: &MenuEntry) -> Result<(), NavError> {
        self.go_category(&entry.category)?;
        self.go_to_page(entry.page)
    }

    /// Click `point` up to `count` times, pausing after each landed click.
    ///
    /// Returns how many clicks landed.  Individual failures are logged and
    /// skipped.
    pub fn click_times(&mut self, point: Point, count: u32) -> u32 {
        let mut landed = 0;
        for n in 1..=count {
            match self.click(point) {
                Ok(()) => {
                    landed += 1;
                    pause(self.timing.item_delay());
                }
                Err(e) => log::warn!("nav: click {n}/{count} at {point} failed: {e}"),
            }
        }
        landed
    }

    // -----------------------------------------------------------------------
    // High-level
    // -----------------------------------------------------------------------

    /// Fuzzy-resolve `spoken` and add `count` of it to the cart.
    ///
    /// Returns the number of clicks that landed.
    pub fn add_item(&mut self, spoken: &str, count: u32) -> Result<u32, NavError> {
        let target = self
            .index
            .resolve(spoken)
            .ok_or_else(|| NavError::NotFound(spoken.to_string()))?;
        log::info!(
            "nav: '{spoken}' → '{}' / {} p{} @ {} (confidence {:.2})",
            target.matched_name,
            target.category,
            target.page,
            target.point,
            target.confidence
        );

        self.go_category(&target.category)?;
        self.go_to_page(target.page)?;

        let count = count.max(1);
        let landed = self.click_times(target.point, count);
        log::info!("nav: '{}' {landed}/{count} added", target.matched_name);
        if landed == 0 {
            return Err(NavError::NothingClicked(target.matched_name));
        }
        Ok(landed)
    }

    /// Visit every menu card in file order and click it once.
    ///
    /// Used to check calibrated coordinates against the live kiosk.  Returns
    /// how many cards were clicked.
    pub fn walk_menu(&mut self) -> usize {
        let names: Vec<String> = self.index.names().to_vec();
        let total = names.len();
        let mut clicked = 0;

        for (i, name) in names.iter().enumerate() {
            let Some(entry) = self.index.entry(name).cloned() else {
                continue;
            };
            log::info!(
                "nav: {}/{total} '{name}' / {} p{} @ {}",
                i + 1,
                entry.category,
                entry.page,
                entry.point
            );
            if let Err(e) = self.go_to_entry(&entry) {
                log::warn!("nav: cannot reach '{name}': {e}");
                continue;
            }
            if self.click_times(entry.point, 1) == 1 {
                clicked += 1;
            }
        }
        clicked
    }
}

fn pause(d: Duration) {
    if !d.is_zero() {
        std::thread::sleep(d);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
