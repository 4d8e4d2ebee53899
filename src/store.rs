//! The shopping store: basket, hidden items, undo buffer and past lists.
//!
//! Every mutation updates in-memory state synchronously, queues a snapshot
//! for persistence and then notifies subscribers. Operations are total:
//! unknown ids are no-ops and nothing is validated here. Input checks (empty
//! names, quantity floor, future reminders) belong to the consumer.

use crate::clock::{Clock, SystemClock};
use crate::id::{generate_item_id, generate_list_id};
use crate::model::*;
use crate::persist::{ErrorCallback, Persister};
use crate::reminder::{NoopScheduler, ReminderScheduler};
use crate::storage::{self, KeyValueStorage};
use crate::undo::UndoSlot;
use chrono::{DateTime, FixedOffset};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const SHOPPING_STORE_KEY: &str = "shopping-store";

/// Persisted shape. Mirrors [`ShoppingState`] with camelCase keys.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snapshot {
    basket: Vec<Item>,
    hidden_items: Vec<String>,
    urgent_items: Vec<String>,
    past_lists: Vec<List>,
    current_list_name: Option<String>,
    last_archived_list: Option<List>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    basket: &'a [Item],
    hidden_items: &'a BTreeSet<String>,
    urgent_items: BTreeSet<String>,
    past_lists: &'a [List],
    current_list_name: Option<&'a str>,
    last_archived_list: Option<&'a List>,
}

impl<'a> From<&'a ShoppingState> for SnapshotRef<'a> {
    fn from(state: &'a ShoppingState) -> Self {
        SnapshotRef {
            basket: &state.basket,
            hidden_items: &state.hidden_items,
            urgent_items: state.urgent_items(),
            past_lists: &state.past_lists,
            current_list_name: state.current_list_name.as_deref(),
            last_archived_list: state.last_archived_list.peek(),
        }
    }
}

impl From<Snapshot> for ShoppingState {
    fn from(snapshot: Snapshot) -> Self {
        let mut basket = snapshot.basket;
        // Legacy snapshots may carry urgency only in the id list.
        for item in basket.iter_mut() {
            if snapshot.urgent_items.contains(&item.id) {
                item.urgent = Some(true);
            }
        }
        ShoppingState {
            basket,
            hidden_items: snapshot.hidden_items.into_iter().collect(),
            current_list_name: snapshot.current_list_name,
            last_archived_list: UndoSlot::from_option(snapshot.last_archived_list),
            past_lists: snapshot.past_lists,
        }
    }
}

/// "List - Oct 19, 26, 3:04 PM"
pub fn auto_list_name(now: &DateTime<FixedOffset>) -> String {
    format!("List - {}", now.format("%b %d, %y, %-I:%M %p"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ShoppingState)>;

pub struct ShoppingStore {
    state: ShoppingState,
    persister: Persister,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn ReminderScheduler>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ShoppingStore {
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::open_with_error_callback(storage, None)
    }

    /// Hydrates from `storage`. A missing or unreadable snapshot yields an empty store.
    pub fn open_with_error_callback(
        storage: Arc<dyn KeyValueStorage>,
        on_error: Option<ErrorCallback>,
    ) -> Self {
        let state = hydrate(storage.as_ref());
        ShoppingStore {
            state,
            persister: Persister::spawn(storage, on_error),
            clock: Box::new(SystemClock),
            scheduler: Box::new(NoopScheduler),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_scheduler(mut self, scheduler: impl ReminderScheduler + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }

    // --- Observation ---

    pub fn subscribe(&mut self, listener: impl FnMut(&ShoppingState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Blocks until queued snapshots have been handed to storage.
    pub fn flush(&self) {
        self.persister.flush();
    }

    // --- Reads ---

    pub fn state(&self) -> &ShoppingState {
        &self.state
    }

    pub fn basket(&self) -> &[Item] {
        &self.state.basket
    }

    pub fn basket_item(&self, id: &str) -> Option<&Item> {
        self.state.basket.iter().find(|i| i.id == id)
    }

    pub fn hidden_items(&self) -> &BTreeSet<String> {
        &self.state.hidden_items
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.state.hidden_items.contains(id)
    }

    pub fn urgent_items(&self) -> BTreeSet<String> {
        self.state.urgent_items()
    }

    pub fn current_list_name(&self) -> Option<&str> {
        self.state.current_list_name.as_deref()
    }

    pub fn last_archived_list(&self) -> Option<&List> {
        self.state.last_archived_list.peek()
    }

    pub fn past_lists(&self) -> &[List] {
        &self.state.past_lists
    }

    pub fn past_list(&self, id: &str) -> Option<&List> {
        self.state.past_lists.iter().find(|l| l.id == id)
    }

    // --- Basket ---

    pub fn add_to_basket(&mut self, draft: ItemDraft) {
        self.add_to_basket_with(draft, 1.0, DEFAULT_UNIT);
    }

    /// Appends; the same id added twice yields two entries.
    pub fn add_to_basket_with(&mut self, draft: ItemDraft, quantity: f64, unit: &str) {
        debug!(
            "event=basket_add module=store status=ok id={} quantity={quantity} unit={unit}",
            draft.id
        );
        self.state.basket.push(draft.into_item(quantity, unit));
        self.commit();
    }

    /// Drops every basket entry carrying `id`.
    pub fn remove_from_basket(&mut self, id: &str) {
        self.state.basket.retain(|item| item.id != id);
        self.commit();
    }

    pub fn hide_item(&mut self, id: &str) {
        self.state.hidden_items.insert(id.to_string());
        self.commit();
    }

    pub fn mark_urgent(&mut self, id: &str) {
        if self.update_basket_items(id, |item| item.urgent = Some(true)) == 0 {
            debug!("event=basket_mark_urgent module=store status=noop id={id}");
        }
        self.commit();
    }

    /// Overwrites as given; no floor is applied.
    pub fn update_quantity(&mut self, id: &str, quantity: f64) {
        self.update_basket_items(id, |item| item.quantity = quantity);
        self.commit();
    }

    pub fn update_unit(&mut self, id: &str, unit: &str) {
        self.update_basket_items(id, |item| item.unit = unit.to_string());
        self.commit();
    }

    pub fn toggle_purchased(&mut self, id: &str) {
        self.update_basket_items(id, |item| item.purchased = Some(!item.is_purchased()));
        self.commit();
    }

    pub fn set_current_list_name(&mut self, name: Option<String>) {
        self.state.current_list_name = name;
        self.commit();
    }

    // --- Archive / undo ---

    /// Moves the basket into history. Returns the new list id, or `None` for an empty basket.
    pub fn archive_current_list(&mut self) -> Option<String> {
        if self.state.basket.is_empty() {
            debug!("event=archive module=store status=noop reason=empty_basket");
            return None;
        }
        let now = self.clock.now();
        let name = self
            .state
            .current_list_name
            .take()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| auto_list_name(&now));
        let list = List {
            id: self.new_list_id(),
            name,
            date: self.clock.now_utc(),
            items: std::mem::take(&mut self.state.basket),
            reminder: None,
        };
        let id = list.id.clone();
        info!(
            "event=archive module=store status=ok list_id={id} items={}",
            list.items.len()
        );
        self.state.past_lists.insert(0, list.clone());
        self.state.last_archived_list.stash(list);
        self.commit();
        Some(id)
    }

    /// Restores the last archived list into the basket. Usable once per archive.
    pub fn undo_archive(&mut self) -> bool {
        let Some(list) = self.state.last_archived_list.take() else {
            debug!("event=undo_archive module=store status=noop");
            return false;
        };
        info!("event=undo_archive module=store status=ok list_id={}", list.id);
        let restored = self.state.past_lists.iter().position(|l| l.id == list.id);
        if let Some(pos) = restored {
            let removed = self.state.past_lists.remove(pos);
            if removed.reminder.is_some() {
                self.scheduler.cancel(&removed.id);
            }
        }
        self.state.basket = list.items;
        self.state.current_list_name = Some(list.name);
        self.commit();
        true
    }

    pub fn clear_undo(&mut self) {
        self.state.last_archived_list.clear();
        self.commit();
    }

    // --- Past lists ---

    /// Prepends a list built from name/quantity pairs. The basket is untouched.
    pub fn create_new_list(&mut self, name: &str, entries: &[ListEntry]) -> String {
        let mut items: Vec<Item> = Vec::with_capacity(entries.len());
        for entry in entries {
            let existing: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
            let id = generate_item_id(&entry.name, &existing);
            items.push(ItemDraft::new(id, entry.name.clone(), "").into_item(entry.quantity, DEFAULT_UNIT));
        }
        let list = List {
            id: self.new_list_id(),
            name: name.to_string(),
            date: self.clock.now_utc(),
            items,
            reminder: None,
        };
        let id = list.id.clone();
        info!(
            "event=list_create module=store status=ok list_id={id} items={}",
            list.items.len()
        );
        self.state.past_lists.insert(0, list);
        self.commit();
        id
    }

    /// Whole-record replacement of the list stored under `id`. A changed
    /// reminder is rescheduled or cancelled to match.
    pub fn update_list(&mut self, id: &str, updated: List) -> bool {
        let Some(slot) = self.state.past_lists.iter_mut().find(|l| l.id == id) else {
            log_outcome("list_update", id, false);
            self.commit();
            return false;
        };
        let previous = std::mem::replace(slot, updated);
        sync_reminder(
            &mut *self.scheduler,
            id,
            previous.reminder.as_ref(),
            slot.reminder.as_ref(),
        );
        log_outcome("list_update", id, true);
        self.commit();
        true
    }

    pub fn delete_past_list(&mut self, id: &str) -> bool {
        let pos = self.state.past_lists.iter().position(|l| l.id == id);
        if let Some(pos) = pos {
            let removed = self.state.past_lists.remove(pos);
            if removed.reminder.is_some() {
                self.scheduler.cancel(id);
            }
        }
        log_outcome("list_delete", id, pos.is_some());
        self.commit();
        pos.is_some()
    }

    /// Sets or clears (`None`) the reminder of a past list.
    pub fn set_reminder(&mut self, list_id: &str, reminder: Option<Reminder>) -> bool {
        let Some(list) = self.state.past_lists.iter_mut().find(|l| l.id == list_id) else {
            log_outcome("reminder_set", list_id, false);
            self.commit();
            return false;
        };
        match &reminder {
            Some(r) if r.enabled => self.scheduler.schedule(list_id, r.date),
            _ => self.scheduler.cancel(list_id),
        }
        list.reminder = reminder;
        log_outcome("reminder_set", list_id, true);
        self.commit();
        true
    }

    fn update_basket_items(&mut self, id: &str, mut apply: impl FnMut(&mut Item)) -> usize {
        let mut touched = 0;
        for item in self.state.basket.iter_mut().filter(|i| i.id == id) {
            apply(item);
            touched += 1;
        }
        touched
    }

    fn new_list_id(&self) -> String {
        let existing: Vec<&str> = self.state.past_lists.iter().map(|l| l.id.as_str()).collect();
        generate_list_id(self.clock.now_utc(), &existing)
    }

    fn commit(&mut self) {
        self.persister
            .save(SHOPPING_STORE_KEY, &SnapshotRef::from(&self.state));
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }
}

fn hydrate(storage: &dyn KeyValueStorage) -> ShoppingState {
    let raw = match storage.get_item(SHOPPING_STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ShoppingState::default(),
        Err(err) => {
            warn!("event=hydrate module=store status=error err={err}");
            return ShoppingState::default();
        }
    };
    match storage::from_json::<Snapshot>(SHOPPING_STORE_KEY, &raw) {
        Ok(snapshot) => {
            let state = ShoppingState::from(snapshot);
            info!(
                "event=hydrate module=store status=ok basket={} past_lists={}",
                state.basket.len(),
                state.past_lists.len()
            );
            state
        }
        Err(err) => {
            warn!("event=hydrate module=store status=error err={err}");
            ShoppingState::default()
        }
    }
}

fn sync_reminder(
    scheduler: &mut dyn ReminderScheduler,
    list_id: &str,
    before: Option<&Reminder>,
    after: Option<&Reminder>,
) {
    let before = before.filter(|r| r.enabled);
    match after.filter(|r| r.enabled) {
        Some(r) if before != Some(r) => scheduler.schedule(list_id, r.date),
        Some(_) => {}
        None if before.is_some() => scheduler.cancel(list_id),
        None => {}
    }
}

fn log_outcome(event: &str, id: &str, found: bool) {
    if found {
        info!("event={event} module=store status=ok id={id}");
    } else {
        debug!("event={event} module=store status=noop id={id}");
    }
}
