use crate::data::persistence::KeyValueStore;
use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use log::warn;

pub const SHOPPING_KEY: &str = "shoppingList";
pub const MAX_ITEMS: usize = 30;
const PREVIEW_LEN: usize = 3;

fn default_items() -> Vec<String> {
    ["Bananas", "Cucumber", "Olive Oil"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingList {
    pub items: Vec<String>,
}

impl Default for ShoppingList {
    fn default() -> Self {
        ShoppingList {
            items: default_items(),
        }
    }
}

impl ShoppingList {
    /// Reads the list from `store`, falling back to the default items when
    /// nothing usable is stored.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(SHOPPING_KEY) {
            Some(raw) => raw,
            None => return Self::default(),
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(items) => ShoppingList {
                items: items
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .take(MAX_ITEMS)
                    .collect(),
            },
            Err(e) => {
                warn!("event=shopping_load status=corrupt key={} error={}", SHOPPING_KEY, e);
                Self::default()
            }
        }
    }

    pub fn persist(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(&self.items).context("failed to serialize shopping list")?;
        store.set(SHOPPING_KEY, json)
    }

    /// Appends a trimmed item. Blank input is ignored and returns `Ok(false)`.
    pub fn add(&mut self, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        if self.is_full() {
            bail!("Maximum {} items allowed.", MAX_ITEMS);
        }
        self.items.push(text.to_string());
        Ok(true)
    }

    pub fn reset(&mut self) {
        self.items.clear();
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS
    }

    pub fn preview(&self) -> &[String] {
        &self.items[..self.items.len().min(PREVIEW_LEN)]
    }

    pub fn reminder_message(&self) -> String {
        let items = if self.items.is_empty() {
            "your shopping list".to_string()
        } else {
            self.items.join(", ")
        };
        format!("Reminder! It's time to purchase {}.", items)
    }
}

/// Parses `HH:MM` and returns the next moment at that time of day, today if
/// it is still ahead of `now`, otherwise tomorrow.
pub fn next_reminder(now: NaiveDateTime, hhmm: &str) -> Result<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(hhmm.trim(), "%H:%M")
        .with_context(|| format!("invalid reminder time '{}'", hhmm.trim()))?;
    let mut at = now.date().and_time(time);
    if at < now {
        at += Duration::days(1);
    }
    Ok(at)
}
