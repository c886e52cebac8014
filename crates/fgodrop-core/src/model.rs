//! Core entity types for the relational drop-rate snapshot

use serde::{Deserialize, Serialize};

/// A farmable item (material, gem, piece or monument)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Two-character base-36 ID (category run + position within the run)
    pub id: String,
    /// Category label from the upper header row
    pub category: String,
    /// Logical item name from the reconciled header
    pub name: String,
}

/// A quest (one data row of the sheet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    /// Three-character base-36 ID (section run + area run + position)
    pub id: String,
    /// Story section derived from the area name
    pub section: String,
    /// Area name
    pub area: String,
    /// Quest name
    pub name: String,
    /// AP cost, overridden for training-ground quests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ap: Option<i64>,
    /// Number of samples behind the drop rates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<i64>,
    /// Bond points per run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bp: Option<i64>,
    /// Master EXP per run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// QP per run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qp: Option<i64>,
}

/// One observed drop rate linking an item to a quest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRate {
    /// ID of the dropped item
    pub item_id: String,
    /// ID of the quest it drops in
    pub quest_id: String,
    /// Probability in [0, 1]
    pub drop_rate: f64,
}

/// A complete snapshot: the three entity tables of one sheet read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub items: Vec<Item>,
    pub quests: Vec<Quest>,
    pub drop_rates: Vec<DropRate>,
}

impl Item {
    /// Identity key for merging
    pub fn key(&self) -> String {
        self.id.clone()
    }
}

impl Quest {
    /// Identity key for merging
    pub fn key(&self) -> String {
        self.id.clone()
    }

    /// Overlay `new` on top of this quest: required fields always take the
    /// new value, optional fields keep the old value when the new one is
    /// absent.
    pub fn merge_from(&mut self, new: Quest) {
        self.section = new.section;
        self.area = new.area;
        self.name = new.name;
        if new.ap.is_some() {
            self.ap = new.ap;
        }
        if new.samples.is_some() {
            self.samples = new.samples;
        }
        if new.bp.is_some() {
            self.bp = new.bp;
        }
        if new.exp.is_some() {
            self.exp = new.exp;
        }
        if new.qp.is_some() {
            self.qp = new.qp;
        }
    }
}

impl DropRate {
    /// Identity key for merging: item ID then quest ID, unambiguous because
    /// both have fixed widths
    pub fn key(&self) -> String {
        format!("{}{}", self.item_id, self.quest_id)
    }
}

impl Dataset {
    /// True when all three tables are empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.quests.is_empty() && self.drop_rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quest(id: &str) -> Quest {
        Quest {
            id: id.to_string(),
            section: "第2部".to_string(),
            area: "オリュンポス".to_string(),
            name: "翼の砦".to_string(),
            ap: Some(22),
            samples: Some(1000),
            bp: Some(915),
            exp: Some(32380),
            qp: Some(9400),
        }
    }

    #[test]
    fn test_quest_serializes_without_absent_fields() {
        let mut q = quest("000");
        q.samples = None;
        q.qp = None;
        let json = serde_json::to_string(&q).unwrap();
        assert!(!json.contains("samples"));
        assert!(!json.contains("qp"));
        assert!(json.contains("\"ap\":22"));
    }

    #[test]
    fn test_quest_deserializes_missing_fields_as_none() {
        let json = r#"{"id":"000","section":"第1部","area":"冬木","name":"未確認座標X","ap":5}"#;
        let q: Quest = serde_json::from_str(json).unwrap();
        assert_eq!(q.ap, Some(5));
        assert_eq!(q.samples, None);
        assert_eq!(q.qp, None);
    }

    #[test]
    fn test_quest_merge_from_keeps_old_optionals() {
        let mut old = quest("000");
        let mut new = quest("000");
        new.name = "翼の砦 改".to_string();
        new.samples = None;
        new.qp = None;
        old.merge_from(new);
        assert_eq!(old.name, "翼の砦 改");
        assert_eq!(old.samples, Some(1000));
        assert_eq!(old.qp, Some(9400));
    }

    #[test]
    fn test_drop_rate_key_concatenates_ids() {
        let rate = DropRate {
            item_id: "0a".to_string(),
            quest_id: "123".to_string(),
            drop_rate: 0.015,
        };
        assert_eq!(rate.key(), "0a123");
    }

    #[test]
    fn test_dataset_default_is_empty() {
        assert!(Dataset::default().is_empty());
    }
}
