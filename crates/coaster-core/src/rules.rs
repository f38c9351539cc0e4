//! Grouping rules
//!
//! A [`Rule`] names one coaster attribute, a comparison, and the concrete values
//! the generator may draw for it. Exclusivity, the test that keeps an item from
//! qualifying for two groups at once, is the exact negation of the match, so a
//! tie at a numeric boundary always counts as a match and is always excluded.

use crate::catalog::{AttributeRef, Item, Quality};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Substitution marker in explanation templates
pub const REPLACE_MARKER: &str = "%replace%";

/// Comparison applied between an attribute and a rule value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOp {
    #[serde(rename = "==")]
    Equals,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "array-contains")]
    Contains,
}

impl MatchOp {
    /// Does `attribute` satisfy this operator at `value`?
    ///
    /// Shape mismatches (a text value against a numeric attribute, say) never match.
    pub fn matches(&self, attribute: AttributeRef<'_>, value: &RuleValue) -> bool {
        match (self, attribute, value) {
            (MatchOp::Equals, AttributeRef::Number(a), RuleValue::Number(v)) => a == *v,
            (MatchOp::Equals, AttributeRef::Text(a), RuleValue::Text(v)) => a == v,
            (MatchOp::AtMost, AttributeRef::Number(a), RuleValue::Number(v)) => a <= *v,
            (MatchOp::AtLeast, AttributeRef::Number(a), RuleValue::Number(v)) => a >= *v,
            (MatchOp::Contains, AttributeRef::List(list), RuleValue::Text(v)) => {
                list.iter().any(|entry| entry == v)
            }
            _ => false,
        }
    }

    /// Exclusivity test: true when `attribute` would NOT qualify under this operator
    pub fn excludes(&self, attribute: AttributeRef<'_>, value: &RuleValue) -> bool {
        !self.matches(attribute, value)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MatchOp::Equals => "==",
            MatchOp::AtMost => "<=",
            MatchOp::AtLeast => ">=",
            MatchOp::Contains => "array-contains",
        }
    }

    /// Symbol of the complementary test used for exclusivity
    pub fn complement_symbol(&self) -> &'static str {
        match self {
            MatchOp::Equals => "!=",
            MatchOp::AtMost => ">",
            MatchOp::AtLeast => "<",
            MatchOp::Contains => "not-array-contains",
        }
    }
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A concrete value a rule compares against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RuleValue {
    fn from(n: f64) -> Self {
        RuleValue::Number(n)
    }
}

impl From<u32> for RuleValue {
    fn from(n: u32) -> Self {
        RuleValue::Number(f64::from(n))
    }
}

impl From<i32> for RuleValue {
    fn from(n: i32) -> Self {
        RuleValue::Number(f64::from(n))
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        RuleValue::Text(s.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(s: String) -> Self {
        RuleValue::Text(s)
    }
}

/// A grouping condition the generator can build a group around
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub quality: Quality,
    pub operator: MatchOp,
    pub values: Vec<RuleValue>,
    /// Category label; two rules sharing a label never appear in one puzzle
    pub category: String,
    /// Template with a single [`REPLACE_MARKER`]
    pub explanation: String,
}

impl Rule {
    pub fn new<V: Into<RuleValue>>(
        quality: Quality,
        operator: MatchOp,
        values: impl IntoIterator<Item = V>,
        category: &str,
        explanation: &str,
    ) -> Self {
        Self {
            quality,
            operator,
            values: values.into_iter().map(Into::into).collect(),
            category: category.to_string(),
            explanation: explanation.to_string(),
        }
    }

    pub fn matches(&self, item: &Item, value: &RuleValue) -> bool {
        self.operator.matches(item.attribute(self.quality), value)
    }

    pub fn excludes(&self, item: &Item, value: &RuleValue) -> bool {
        self.operator.excludes(item.attribute(self.quality), value)
    }

    /// Fill the explanation template with the upper-cased value
    pub fn explain(&self, value: &RuleValue) -> String {
        self.explanation
            .replacen(REPLACE_MARKER, &value.to_string().to_uppercase(), 1)
    }
}

/// The fixed table of rules a generator draws from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of distinct category labels
    pub fn category_count(&self) -> usize {
        self.rules
            .iter()
            .map(|r| r.category.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// The hand-authored coaster rule table
    pub fn standard() -> Self {
        Self::new(vec![
            Rule::new(
                Quality::MaterialType,
                MatchOp::Equals,
                ["Wooden", "Steel", "Hybrid"],
                "Material Type",
                "All coasters are %replace% construction.",
            ),
            Rule::new(
                Quality::Manufacturer,
                MatchOp::Equals,
                MANUFACTURERS,
                "Manufacturer",
                "All coasters are manufactured by %replace%.",
            ),
            Rule::new(
                Quality::ParkName,
                MatchOp::Equals,
                PARKS,
                "Park",
                "All coasters are found in %replace%.",
            ),
            Rule::new(
                Quality::Country,
                MatchOp::Equals,
                COUNTRIES,
                "Country",
                "All coasters are located in %replace%.",
            ),
            Rule::new(
                Quality::SeatingType,
                MatchOp::Equals,
                ["Sit Down", "Inverted", "Floorless", "Flying", "Wing"],
                "Seating Type",
                "All coasters have %replace% seating.",
            ),
            Rule::new(
                Quality::Model,
                MatchOp::Equals,
                MODELS,
                "Model",
                "All coasters are %replace% models.",
            ),
            Rule::new(
                Quality::LaunchTypes,
                MatchOp::Contains,
                ["Lift chain", "Lift cable", "Lim", "Hydraulic", "Air", "Tire"],
                "Launch Type",
                "All coasters use a %replace% launch type.",
            ),
            Rule::new(
                Quality::RestraintType,
                MatchOp::Equals,
                ["Lap", "Shoulder", "Flying", "Vest"],
                "Restraint Type",
                "All coasters use a %replace% restraint type.",
            ),
            Rule::new(
                Quality::Speed,
                MatchOp::AtMost,
                [75.0, 85.0],
                "Top Speed",
                "All coasters have a top speed lower than %replace%.",
            ),
            Rule::new(
                Quality::Speed,
                MatchOp::AtLeast,
                [115.0, 125.0, 135.0, 150.0, 160.0],
                "Top Speed",
                "All coasters have a top speed greater than %replace%.",
            ),
            Rule::new(
                Quality::Height,
                MatchOp::AtLeast,
                [65.0, 90.0],
                "Height",
                "All coasters have a height greater than %replace% meters.",
            ),
            Rule::new(
                Quality::Height,
                MatchOp::AtMost,
                [10.0, 25.0],
                "Height",
                "All coasters have a height less than %replace% meters.",
            ),
            Rule::new(
                Quality::Length,
                MatchOp::AtLeast,
                [1250.0, 1500.0, 1750.0],
                "Length",
                "All coasters have a length greater than %replace% meters.",
            ),
            Rule::new(
                Quality::Length,
                MatchOp::AtMost,
                [550.0, 750.0],
                "Length",
                "All coasters have a length less than %replace% meters.",
            ),
            Rule::new(
                Quality::Inversions,
                MatchOp::Equals,
                [5.0, 0.0, 4.0, 2.0, 1.0, 6.0, 3.0, 7.0],
                "Inversions",
                "All coasters have %replace% inversions.",
            ),
        ])
    }
}

const MANUFACTURERS: [&str; 12] = [
    "Great Coasters International",
    "Bolliger & Mabillard",
    "Custom Coasters International, Inc.",
    "Intamin",
    "Gravity Group",
    "Gerstlauer",
    "Mack Rides",
    "S&S Sansei Technologies",
    "Vekoma",
    "Premier Rides",
    "Rocky Mountain Construction",
    "Morgan",
];

const PARKS: [&str; 16] = [
    "Hersheypark",
    "Kings Dominion",
    "Universal Islands of Adventure",
    "Kings Island",
    "Europa Park",
    "Six Flags Great Adventure",
    "Fuji-Q Highland",
    "Cedar Point",
    "Busch Gardens Tampa",
    "Six Flags Magic Mountain",
    "Carowinds",
    "Silver Dollar City",
    "Busch Gardens Williamsburg",
    "Knott's Berry Farm",
    "Energylandia",
    "Parque Warner Madrid",
];

const COUNTRIES: [&str; 16] = [
    "usa",
    "netherlands",
    "southkorea",
    "canada",
    "denmark",
    "china",
    "japan",
    "italy",
    "germany",
    "uae",
    "france",
    "uk",
    "spain",
    "sweden",
    "poland",
    "belgium",
];

const MODELS: [&str; 18] = [
    "GCI Wooden Coasters",
    "B&M Inverted Coaster",
    "B&M Hyper Coaster",
    "B&M Dive Coaster",
    "B&M Floorless Coaster",
    "Intamin Wooden Coaster (Prefabricated Track)",
    "B&M Flying Coaster",
    "Intamin LSM Launch Coaster",
    "Mack Launch Coaster",
    "Intamin Accelerator Coaster",
    "B&M Wing Coaster",
    "B&M Sitting Coaster",
    "Intamin Mega Coaster",
    "Gerstlauer Infinity Coaster",
    "RMC Topper Track",
    "Mack Hypercoaster",
    "RMC IBox Track",
    "RMC Raptor Track",
];
