//! Snapshot merging
//!
//! A fresh sheet read never carries history: sample counts get reset when a
//! quest is re-measured and old events disappear entirely. Merging the new
//! snapshot on top of the previously stored one keeps every entity ever
//! seen while letting new measurements win.

use crate::model::{Dataset, DropRate, Item, Quest};
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Merge `new` on top of `old`, entity by entity.
///
/// Entities are matched by identity key. Stored entities keep their
/// position, entities seen for the first time append in snapshot order, and
/// matched entities take the new snapshot's values (a quest's optional
/// fields survive when the new snapshot omits them). Merging a dataset with
/// itself is a no-op.
pub fn merge(old: &Dataset, new: &Dataset) -> Dataset {
    Dataset {
        items: merge_items(&old.items, &new.items),
        quests: merge_quests(&old.quests, &new.quests),
        drop_rates: merge_drop_rates(&old.drop_rates, &new.drop_rates),
    }
}

fn merge_items(old: &[Item], new: &[Item]) -> Vec<Item> {
    let mut merged: IndexMap<String, Item> = IndexMap::new();
    for item in old.iter().chain(new) {
        merged.insert(item.key(), item.clone());
    }
    merged.into_values().collect()
}

fn merge_quests(old: &[Quest], new: &[Quest]) -> Vec<Quest> {
    let mut merged: IndexMap<String, Quest> = IndexMap::new();
    for quest in old.iter().chain(new) {
        match merged.entry(quest.key()) {
            Entry::Occupied(mut entry) => entry.get_mut().merge_from(quest.clone()),
            Entry::Vacant(entry) => {
                entry.insert(quest.clone());
            }
        }
    }
    merged.into_values().collect()
}

fn merge_drop_rates(old: &[DropRate], new: &[DropRate]) -> Vec<DropRate> {
    let mut merged: IndexMap<String, DropRate> = IndexMap::new();
    for rate in old.iter().chain(new) {
        merged.insert(rate.key(), rate.clone());
    }
    merged.into_values().collect()
}
