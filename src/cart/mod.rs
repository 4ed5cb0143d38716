//! Persisted shopping cart.
//!
//! [`CartStore`] is the only writer of cart lines. Every operation either
//! completes or leaves the cart untouched, and every change to the lines is
//! written through to the [`KvStore`] before the call returns. Storage is
//! best effort: a failed write is logged and remembered, the in-memory cart
//! stays authoritative for the session.

pub mod checkout;
pub mod line;
pub mod promo;
pub mod storage;

use crate::catalog::model::MenuItem;
use crate::haptics::{HapticPattern, Haptics};
use chrono::Utc;
use line::{bound_note, clamp_quantity, CartLine, LineId, Money, Variant, MAX_QUANTITY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use storage::{KvStore, StorageError};
use tracing::{debug, warn};

pub const SNAPSHOT_VERSION: u32 = 1;
/// Line ids stay within what a JSON number holds exactly.
const MAX_LINE_ID: u64 = 1 << 53;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    lines: &'a [CartLine],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    lines: Vec<CartLine>,
}

pub struct CartStore<S: KvStore> {
    lines: Vec<CartLine>,
    is_open: bool,
    storage: S,
    key: String,
    next_line_id: u64,
    haptics: Arc<dyn Haptics>,
    last_storage_error: Option<StorageError>,
}

impl<S: KvStore> CartStore<S> {
    pub fn new(storage: S, key: impl Into<String>, haptics: Arc<dyn Haptics>) -> Self {
        Self {
            lines: Vec::new(),
            is_open: false,
            storage,
            key: key.into(),
            next_line_id: 1,
            haptics,
            last_storage_error: None,
        }
    }

    /// Replace the lines with the persisted snapshot. A missing, unreadable
    /// or incompatible snapshot yields an empty cart. Returns the number of
    /// lines restored.
    pub fn hydrate(&mut self) -> usize {
        self.lines.clear();
        let bytes = match self.storage.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return 0,
            Err(e) => {
                warn!(key = %self.key, error = %e, "cart snapshot unreadable, starting empty");
                return 0;
            }
        };

        let snapshot = match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(s) if s.version == SNAPSHOT_VERSION => s,
            Ok(s) => {
                warn!(key = %self.key, version = s.version, "incompatible cart snapshot, starting empty");
                return 0;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "corrupt cart snapshot, starting empty");
                return 0;
            }
        };

        let Some((lines, next_id)) = sanitize(snapshot.lines) else {
            warn!(key = %self.key, "cart snapshot line id out of range, starting empty");
            return 0;
        };
        self.lines = lines;
        self.next_line_id = self.next_line_id.max(next_id);
        debug!(lines = self.lines.len(), "cart hydrated");
        self.lines.len()
    }

    /// Append a new line. Identical lines are never merged. Returns `None`
    /// without touching the cart when `quantity` is zero.
    pub fn add_line(
        &mut self,
        item: &MenuItem,
        variant: &Variant,
        quantity: u32,
        note: Option<&str>,
    ) -> Option<LineId> {
        if quantity < 1 {
            return None;
        }
        let line_id = self.allocate_line_id();
        self.lines.push(CartLine {
            line_id,
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            variant: variant.clone(),
            quantity: quantity.min(MAX_QUANTITY),
            note: bound_note(note),
            added_at: Utc::now(),
        });
        self.persist();
        self.haptics.pulse(HapticPattern::Confirm);
        debug!(%line_id, item = %item.id, variant = %variant.size, quantity, "line added");
        Some(line_id)
    }

    /// Returns `true` if a line was removed.
    pub fn remove_line(&mut self, line_id: LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);
        if self.lines.len() == before {
            return false;
        }
        self.persist();
        self.haptics.pulse(HapticPattern::Remove);
        debug!(%line_id, "line removed");
        true
    }

    /// Set a line's quantity in place; zero or less removes the line.
    /// Returns `true` if the line existed.
    pub fn set_quantity(&mut self, line_id: LineId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_line(line_id);
        }
        let quantity = quantity.min(MAX_QUANTITY as i64) as u32;
        let Some(line) = self.lines.iter_mut().find(|l| l.line_id == line_id) else {
            return false;
        };
        if line.quantity != quantity {
            line.quantity = quantity;
            self.persist();
            debug!(%line_id, quantity, "quantity updated");
        }
        true
    }

    pub fn adjust_quantity(&mut self, line_id: LineId, delta: i64) -> bool {
        match self.line(line_id) {
            Some(line) => {
                let target = line.quantity as i64 + delta;
                self.set_quantity(line_id, target)
            }
            None => false,
        }
    }

    /// Empty the cart and erase the snapshot, as if never used.
    pub fn clear(&mut self) {
        let had_lines = !self.lines.is_empty();
        self.lines.clear();
        if let Err(e) = self.storage.delete(&self.key) {
            warn!(key = %self.key, error = %e, "failed to erase cart snapshot");
            self.last_storage_error = Some(e);
        }
        if had_lines {
            self.haptics.pulse(HapticPattern::Remove);
        }
        debug!("cart cleared");
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum over fixed-price lines; market-priced lines add nothing.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn has_market_priced_lines(&self) -> bool {
        self.lines.iter().any(|l| l.unit_price().is_market())
    }

    /// The last failed storage write, if any, for surfacing to the user.
    pub fn take_storage_error(&mut self) -> Option<StorageError> {
        self.last_storage_error.take()
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[cfg(test)]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn allocate_line_id(&mut self) -> LineId {
        let id = LineId(self.next_line_id);
        self.next_line_id += 1;
        id
    }

    fn persist(&mut self) {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            lines: &self.lines,
        };
        let result = serde_json::to_vec(&snapshot)
            .map_err(StorageError::from)
            .and_then(|bytes| self.storage.set(&self.key, &bytes));
        if let Err(e) = result {
            warn!(key = %self.key, error = %e, "failed to persist cart, keeping in-memory state");
            self.last_storage_error = Some(e);
        }
    }
}

/// Clamp what a hand-edited or older snapshot may carry and give duplicate
/// ids fresh ones. Returns the lines and the next free id, or `None` when an
/// id is out of range.
fn sanitize(lines: Vec<CartLine>) -> Option<(Vec<CartLine>, u64)> {
    let mut seen = HashSet::new();
    let mut out: Vec<CartLine> = Vec::with_capacity(lines.len());
    let mut duplicates = Vec::new();

    for mut line in lines {
        if line.quantity == 0 {
            continue;
        }
        line.quantity = clamp_quantity(line.quantity);
        line.note = bound_note(line.note.as_deref());
        if !seen.insert(line.line_id) {
            duplicates.push(out.len());
        }
        out.push(line);
    }

    let mut next = out
        .iter()
        .map(|l| l.line_id.0)
        .max()
        .unwrap_or(0)
        .checked_add(1)?;
    for idx in duplicates {
        out[idx].line_id = LineId(next);
        next = next.checked_add(1)?;
    }
    if next > MAX_LINE_ID {
        return None;
    }
    Some((out, next))
}

#[cfg(test)]
mod tests {
    use super::line::Price;
    use super::storage::MemoryStore;
    use super::*;
    use crate::catalog::Catalog;
    use crate::haptics::testing::RecordingHaptics;
    use crate::haptics::NoHaptics;
    use std::path::PathBuf;

    const KEY: &str = "storefront-cart";

    fn store() -> CartStore<MemoryStore> {
        CartStore::new(MemoryStore::new(), KEY, Arc::new(NoHaptics))
    }

    fn spring_rolls() -> (MenuItem, Variant) {
        let catalog = Catalog::bundled().unwrap();
        let item = catalog.item("spring-rolls").unwrap().clone();
        let variant = item.variants[0].clone();
        (item, variant)
    }

    fn lobster() -> (MenuItem, Variant) {
        let catalog = Catalog::bundled().unwrap();
        let item = catalog.item("ginger-scallion-lobster").unwrap().clone();
        let variant = item.variants[0].clone();
        (item, variant)
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStore;

    impl KvStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: PathBuf::from("/readonly"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "quota"),
            })
        }

        fn delete(&mut self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_spring_rolls_scenario() {
        let mut cart = store();
        let (item, variant) = spring_rolls();

        let first = cart.add_line(&item, &variant, 1, None).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal(), Money(899));

        let second = cart.add_line(&item, &variant, 1, Some("extra sauce")).unwrap();
        assert_ne!(first, second);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal(), Money(1798));
        assert_eq!(cart.line(second).unwrap().note.as_deref(), Some("extra sauce"));

        assert!(cart.remove_line(second));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal(), Money(899));
        assert_eq!(cart.lines()[0].line_id, first);
    }

    #[test]
    fn test_add_line_rejects_zero_and_clamps_large() {
        let mut cart = store();
        let (item, variant) = spring_rolls();
        assert_eq!(cart.add_line(&item, &variant, 0, None), None);
        assert!(cart.is_empty());
        assert!(!cart.storage().contains(KEY));

        let id = cart.add_line(&item, &variant, 250, None).unwrap();
        assert_eq!(cart.line(id).unwrap().quantity, 99);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = store();
        let (item, variant) = spring_rolls();
        let id = cart.add_line(&item, &variant, 2, None).unwrap();
        assert!(cart.remove_line(id));
        assert!(!cart.remove_line(id));
        assert!(!cart.remove_line(LineId(999)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_matches_remove() {
        let (item, variant) = spring_rolls();
        let build = || {
            let mut cart = store();
            let a = cart.add_line(&item, &variant, 1, None).unwrap();
            let b = cart.add_line(&item, &variant, 3, Some("no onions")).unwrap();
            let c = cart.add_line(&item, &variant, 2, None).unwrap();
            (cart, a, b, c)
        };

        let (mut via_set, _, b1, _) = build();
        let (mut via_remove, _, b2, _) = build();
        assert_eq!(b1, b2);
        assert!(via_set.set_quantity(b1, 0));
        assert!(via_remove.remove_line(b2));

        let strip = |cart: &CartStore<MemoryStore>| {
            cart.lines()
                .iter()
                .map(|l| (l.line_id, l.quantity, l.note.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&via_set), strip(&via_remove));

        // Negative behaves the same
        let (mut negative, a, _, _) = build();
        assert!(negative.set_quantity(a, -4));
        assert!(negative.line(a).is_none());
    }

    #[test]
    fn test_set_quantity_preserves_position() {
        let mut cart = store();
        let (item, variant) = spring_rolls();
        let a = cart.add_line(&item, &variant, 1, None).unwrap();
        let b = cart.add_line(&item, &variant, 1, None).unwrap();
        let c = cart.add_line(&item, &variant, 1, None).unwrap();

        assert!(cart.set_quantity(b, 5));
        let ids: Vec<_> = cart.lines().iter().map(|l| l.line_id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(cart.line(b).unwrap().quantity, 5);

        assert!(cart.set_quantity(b, 1000));
        assert_eq!(cart.line(b).unwrap().quantity, 99);
        assert!(!cart.set_quantity(LineId(42), 3));
    }

    #[test]
    fn test_adjust_quantity_down_to_zero_removes() {
        let mut cart = store();
        let (item, variant) = spring_rolls();
        let id = cart.add_line(&item, &variant, 1, None).unwrap();
        assert!(cart.adjust_quantity(id, 1));
        assert_eq!(cart.line(id).unwrap().quantity, 2);
        assert!(cart.adjust_quantity(id, -2));
        assert!(cart.is_empty());
        assert!(!cart.adjust_quantity(id, 1));
    }

    #[test]
    fn test_derived_totals_over_operation_sequences() {
        let (item, variant) = spring_rolls();
        let (market_item, market_variant) = lobster();
        let mut cart = store();
        let mut seed: u64 = 0x5eed;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as i64
        };

        for _ in 0..500 {
            let live: Vec<LineId> = cart.lines().iter().map(|l| l.line_id).collect();
            match next() % 4 {
                0 => {
                    let qty = (next() % 5) as u32;
                    if next() % 3 == 0 {
                        cart.add_line(&market_item, &market_variant, qty, None);
                    } else {
                        cart.add_line(&item, &variant, qty, None);
                    }
                }
                1 if !live.is_empty() => {
                    cart.remove_line(live[next() as usize % live.len()]);
                }
                2 if !live.is_empty() => {
                    cart.set_quantity(live[next() as usize % live.len()], next() % 7 - 2);
                }
                _ => {
                    cart.remove_line(LineId(100_000));
                }
            }

            let count: u32 = cart.lines().iter().map(|l| l.quantity).sum();
            let subtotal: u64 = cart
                .lines()
                .iter()
                .filter_map(|l| l.variant.price.amount().map(|p| p.cents() * l.quantity as u64))
                .sum();
            assert_eq!(cart.item_count(), count);
            assert_eq!(cart.subtotal(), Money(subtotal));
            assert!(cart.lines().iter().all(|l| (1..=99).contains(&l.quantity)));
        }
    }

    #[test]
    fn test_every_change_is_persisted() {
        let mut cart = store();
        let (item, variant) = spring_rolls();
        let id = cart.add_line(&item, &variant, 2, Some("extra sauce")).unwrap();
        cart.set_quantity(id, 4);

        let mut reloaded = CartStore::new(cart.into_storage(), KEY, Arc::new(NoHaptics));
        assert_eq!(reloaded.hydrate(), 1);
        assert_eq!(reloaded.lines()[0].quantity, 4);
        assert_eq!(reloaded.lines()[0].note.as_deref(), Some("extra sauce"));
        assert!(!reloaded.is_open());
    }

    #[test]
    fn test_market_price_round_trips() {
        let mut cart = store();
        let (item, variant) = lobster();
        cart.add_line(&item, &variant, 2, None).unwrap();
        assert_eq!(cart.subtotal(), Money::ZERO);
        assert!(cart.has_market_priced_lines());

        let mut reloaded = CartStore::new(cart.into_storage(), KEY, Arc::new(NoHaptics));
        reloaded.hydrate();
        assert_eq!(reloaded.lines()[0].variant.price, Price::Market);
        assert_eq!(reloaded.lines()[0].variant.pieces, Some(1));
    }

    #[test]
    fn test_clear_erases_snapshot() {
        let mut cart = store();
        let (item, variant) = spring_rolls();
        cart.add_line(&item, &variant, 1, None);
        cart.clear();
        assert!(cart.is_empty());
        assert!(!cart.storage().contains(KEY));

        let mut reloaded = CartStore::new(cart.into_storage(), KEY, Arc::new(NoHaptics));
        assert_eq!(reloaded.hydrate(), 0);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_hydrate_corrupt_snapshot_yields_empty() {
        let mut storage = MemoryStore::new();
        storage.set(KEY, b"{\"version\":1,\"lines\":[{\"lineId\":").unwrap();
        let mut cart = CartStore::new(storage, KEY, Arc::new(NoHaptics));
        assert_eq!(cart.hydrate(), 0);
        assert!(cart.is_empty());

        // Still fully usable afterwards
        let (item, variant) = spring_rolls();
        assert!(cart.add_line(&item, &variant, 1, None).is_some());
    }

    #[test]
    fn test_hydrate_out_of_range_line_id_yields_empty() {
        let mut cart = store();
        let (item, variant) = spring_rolls();
        cart.add_line(&item, &variant, 1, None).unwrap();

        let mut storage = cart.into_storage();
        let mut snapshot: serde_json::Value =
            serde_json::from_slice(&storage.get(KEY).unwrap().unwrap()).unwrap();
        snapshot["lines"][0]["lineId"] = serde_json::json!(u64::MAX);
        storage.set(KEY, &serde_json::to_vec(&snapshot).unwrap()).unwrap();

        let mut reloaded = CartStore::new(storage, KEY, Arc::new(NoHaptics));
        assert_eq!(reloaded.hydrate(), 0);
        assert!(reloaded.is_empty());
        let id = reloaded.add_line(&item, &variant, 1, None).unwrap();
        assert_eq!(id, LineId(1));
    }

    #[test]
    fn test_hydrate_incompatible_version_yields_empty() {
        let mut storage = MemoryStore::new();
        storage.set(KEY, br#"{"version":99,"lines":[]}"#).unwrap();
        let mut cart = CartStore::new(storage, KEY, Arc::new(NoHaptics));
        assert_eq!(cart.hydrate(), 0);

        let mut storage = MemoryStore::new();
        storage.set(KEY, br#"[{"id":"spring-rolls"}]"#).unwrap();
        let mut cart = CartStore::new(storage, KEY, Arc::new(NoHaptics));
        assert_eq!(cart.hydrate(), 0);
    }

    #[test]
    fn test_hydrate_sanitizes_and_resumes_ids() {
        let snapshot = r#"{"version":1,"lines":[
            {"lineId":5,"id":"a","name":"A","variant":{"size":"S","price":1.5},"quantity":0,"addedAt":"2026-01-01T00:00:00Z"},
            {"lineId":7,"id":"b","name":"B","variant":{"size":"S","price":2},"quantity":400,"addedAt":"2026-01-01T00:00:00Z"},
            {"lineId":7,"id":"c","name":"C","variant":{"size":"S","price":"market"},"quantity":1,"note":"  ","addedAt":"2026-01-01T00:00:00Z"}
        ]}"#;
        let mut storage = MemoryStore::new();
        storage.set(KEY, snapshot.as_bytes()).unwrap();
        let mut cart = CartStore::new(storage, KEY, Arc::new(NoHaptics));
        assert_eq!(cart.hydrate(), 2);

        let lines = cart.lines();
        assert_eq!(lines[0].quantity, 99);
        assert_eq!(lines[0].line_id, LineId(7));
        assert_eq!(lines[1].line_id, LineId(8));
        assert_eq!(lines[1].note, None);

        let (item, variant) = spring_rolls();
        let fresh = cart.add_line(&item, &variant, 1, None).unwrap();
        assert_eq!(fresh, LineId(9));
    }

    #[test]
    fn test_storage_failure_keeps_memory_state() {
        let mut cart = CartStore::new(ReadOnlyStore, KEY, Arc::new(NoHaptics));
        let (item, variant) = spring_rolls();
        let id = cart.add_line(&item, &variant, 3, None).unwrap();
        assert_eq!(cart.item_count(), 3);
        assert!(matches!(cart.take_storage_error(), Some(StorageError::Io { .. })));
        assert!(cart.take_storage_error().is_none());

        cart.set_quantity(id, 1);
        assert_eq!(cart.item_count(), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.take_storage_error().is_some());
    }

    #[test]
    fn test_open_state_is_not_persisted() {
        let mut cart = store();
        cart.set_open(true);
        assert!(cart.is_open());
        assert!(!cart.storage().contains(KEY));
        cart.toggle_open();
        assert!(!cart.is_open());
        cart.toggle_open();
        assert!(cart.is_open());
        assert!(!cart.storage().contains(KEY));
    }

    #[test]
    fn test_haptics_on_add_and_remove() {
        let haptics = Arc::new(RecordingHaptics::default());
        let mut cart = CartStore::new(MemoryStore::new(), KEY, haptics.clone());
        let (item, variant) = spring_rolls();
        let id = cart.add_line(&item, &variant, 1, None).unwrap();
        cart.remove_line(id);
        cart.remove_line(id);
        cart.clear();
        assert_eq!(
            haptics.pulses(),
            vec![HapticPattern::Confirm, HapticPattern::Remove]
        );
    }
}
