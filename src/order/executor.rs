//! [`OrderMacro`]: runs a batch of order lines through the navigator.

use serde_json::Value;

use super::item::{BatchResult, ItemResult, OrderItem};
use crate::menu::Point;
use crate::navigator::Navigator;

/// Executes whole orders and keeps an in-memory execution history.
pub struct OrderMacro {
    nav: Navigator,
    history: Vec<(String, bool)>,
}

impl OrderMacro {
    pub fn new(nav: Navigator) -> Self {
        Self {
            nav,
            history: Vec::new(),
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    /// `(name, success)` for every named item executed so far.
    pub fn history(&self) -> &[(String, bool)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        log::info!("macro: execution history cleared");
    }

    /// Add every item of `items` to the cart in order, then press pay.
    ///
    /// A failing item never stops the batch, and payment is pressed even
    /// when every item failed.
    pub fn perform(&mut self, items: &[Value]) -> BatchResult {
        log::info!("macro: processing {} item(s)", items.len());

        let mut results = Vec::with_capacity(items.len());
        for (i, raw) in items.iter().enumerate() {
            let Some(item) = OrderItem::normalize(raw) else {
                log::warn!("macro: item {} has no menu name, skipped", i + 1);
                results.push(ItemResult::failed(
                    &format!("item{}", i + 1),
                    0,
                    "missing menu name",
                ));
                continue;
            };

            let result = self.perform_item(&item);
            if result.success {
                log::info!("macro: '{}' x{} done", item.name, item.count);
            } else {
                log::warn!(
                    "macro: '{}' failed: {}",
                    item.name,
                    result.error.as_deref().unwrap_or("unknown")
                );
            }
            self.history.push((item.name.clone(), result.success));
            results.push(result);
        }

        let payment_triggered = self.press_payment();
        self.nav.reset_navigation();

        let batch = BatchResult::new(results, payment_triggered);
        log::info!(
            "macro: batch finished, {}/{} succeeded",
            batch.success_count,
            batch.total_items
        );
        batch
    }

    fn perform_item(&mut self, item: &OrderItem) -> ItemResult {
        let Some(entry) = self.nav.index().entry(&item.name).cloned() else {
            return ItemResult::failed(&item.name, item.count, "menu not found");
        };

        self.nav.reset_navigation();
        if let Err(e) = self.nav.go_to_entry(&entry) {
            return ItemResult::failed(&item.name, item.count, format!("navigation failed: {e}"));
        }

        match self.nav.click_times(entry.point, item.count) {
            0 => ItemResult::failed(&item.name, item.count, "no click landed"),
            _ => ItemResult::ok(&item.name, item.count),
        }
    }

    fn press_payment(&mut self) -> bool {
        let pay = Point::from(self.nav.timing().payment_point);
        log::info!("macro: pressing pay at {pay}");
        match self.nav.click(pay) {
            Ok(()) => {
                std::thread::sleep(self.nav.timing().item_delay());
                true
            }
            Err(e) => {
                log::error!("macro: payment click failed: {e}");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
