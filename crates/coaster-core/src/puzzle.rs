use crate::catalog::Item;
use crate::rules::{Rule, RuleValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Items per group
pub const GROUP_SIZE: usize = 4;
/// Groups per puzzle
pub const GROUP_COUNT: usize = 4;

/// Display color of a group, assigned by slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryColor {
    Yellow,
    Green,
    Blue,
    Purple,
}

impl CategoryColor {
    pub const ALL: [CategoryColor; GROUP_COUNT] = [
        CategoryColor::Yellow,
        CategoryColor::Green,
        CategoryColor::Blue,
        CategoryColor::Purple,
    ];

    /// Color for the group placed in `slot`
    pub fn for_slot(slot: usize) -> Self {
        Self::ALL[slot % Self::ALL.len()]
    }

    /// Square glyph used in the shareable summary
    pub fn glyph(&self) -> char {
        match self {
            CategoryColor::Yellow => '🟨',
            CategoryColor::Green => '🟩',
            CategoryColor::Blue => '🟦',
            CategoryColor::Purple => '🟪',
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            CategoryColor::Yellow => "#ffdc59",
            CategoryColor::Green => "#44d491",
            CategoryColor::Blue => "#62a8ff",
            CategoryColor::Purple => "#c685ff",
        }
    }
}

/// One answer set: four items sharing a rule at a concrete value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub rule: Rule,
    pub value: RuleValue,
    pub items: Vec<Item>,
    pub color: CategoryColor,
}

impl Group {
    pub fn category(&self) -> &str {
        &self.rule.category
    }

    /// Explanation with the value filled in
    pub fn explanation(&self) -> String {
        self.rule.explain(&self.value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.items.iter().any(|i| i.name == name)
    }

    /// Set equality between this group's names and `names`
    pub fn matches_names<S: AsRef<str>>(&self, names: &[S]) -> bool {
        let ours: HashSet<&str> = self.items.iter().map(|i| i.name.as_str()).collect();
        let theirs: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        names.len() == self.items.len() && ours == theirs
    }
}

/// The day's puzzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Sequence number, one per calendar day
    pub number: u32,
    pub created: NaiveDate,
    pub groups: Vec<Group>,
}

impl Puzzle {
    /// True when the generator filled every group slot
    pub fn is_complete(&self) -> bool {
        self.groups.len() == GROUP_COUNT
    }

    /// True when search failures left fewer than [`GROUP_COUNT`] groups
    pub fn is_degraded(&self) -> bool {
        self.groups.len() < GROUP_COUNT
    }

    /// Every item across every group, in group order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    /// Group the named item belongs to
    pub fn group_of(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Quality;
    use crate::rules::MatchOp;

    fn group(names: [&str; 4], slot: usize) -> Group {
        Group {
            rule: Rule::new(
                Quality::Manufacturer,
                MatchOp::Equals,
                ["Vekoma"],
                "Manufacturer",
                "All coasters are manufactured by %replace%.",
            ),
            value: "Vekoma".into(),
            items: names
                .iter()
                .enumerate()
                .map(|(i, n)| Item::new(i.to_string(), *n))
                .collect(),
            color: CategoryColor::for_slot(slot),
        }
    }

    #[test]
    fn test_matches_names_is_set_equality() {
        let g = group(["A", "B", "C", "D"], 0);
        assert!(g.matches_names(&["D", "C", "B", "A"]));
        assert!(!g.matches_names(&["A", "B", "C", "E"]));
        assert!(!g.matches_names(&["A", "A", "B", "C"]));
        assert!(!g.matches_names(&["A", "B", "C"]));
    }

    #[test]
    fn test_group_explanation() {
        let g = group(["A", "B", "C", "D"], 0);
        assert_eq!(g.explanation(), "All coasters are manufactured by VEKOMA.");
        assert_eq!(g.category(), "Manufacturer");
    }

    #[test]
    fn test_colors_cycle_by_slot() {
        assert_eq!(CategoryColor::for_slot(0), CategoryColor::Yellow);
        assert_eq!(CategoryColor::for_slot(3), CategoryColor::Purple);
        assert_eq!(CategoryColor::for_slot(4), CategoryColor::Yellow);
        assert_eq!(CategoryColor::Green.glyph(), '🟩');
    }

    #[test]
    fn test_degraded_puzzle() {
        let puzzle = Puzzle {
            number: 3,
            created: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            groups: vec![group(["A", "B", "C", "D"], 0), group(["E", "F", "G", "H"], 1)],
        };
        assert!(puzzle.is_degraded());
        assert!(!puzzle.is_complete());
        assert_eq!(puzzle.item_count(), 8);
        assert_eq!(puzzle.group_of("F").map(|g| g.color), Some(CategoryColor::Green));
    }
}
