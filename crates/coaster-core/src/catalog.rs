//! Coaster records and the catalog query interface
//!
//! The catalog is read-only to the engine. Records are produced by an external
//! ingestion job and arrive here as JSON; the engine only ever asks one kind of
//! question of it: "which coasters satisfy this attribute test?"

use crate::error::CatalogError;
use crate::rules::{MatchOp, RuleValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// A named attribute of a coaster record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Height,
    Speed,
    Length,
    Inversions,
    OpenedYear,
    Country,
    Manufacturer,
    MaterialType,
    SeatingType,
    RestraintType,
    Model,
    ParkName,
    LaunchTypes,
}

impl Quality {
    /// Field name as it appears in catalog JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Height => "height",
            Quality::Speed => "speed",
            Quality::Length => "length",
            Quality::Inversions => "inversions",
            Quality::OpenedYear => "opened_year",
            Quality::Country => "country",
            Quality::Manufacturer => "manufacturer",
            Quality::MaterialType => "material_type",
            Quality::SeatingType => "seating_type",
            Quality::RestraintType => "restraint_type",
            Quality::Model => "model",
            Quality::ParkName => "park_name",
            Quality::LaunchTypes => "launch_types",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one attribute of an [`Item`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeRef<'a> {
    Number(f64),
    Text(&'a str),
    List(&'a [String]),
}

/// A single roller coaster record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Meters
    #[serde(default)]
    pub height: f64,
    /// km/h
    #[serde(default)]
    pub speed: f64,
    /// Meters
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub inversions: u32,
    #[serde(default)]
    pub opened_year: i32,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub material_type: String,
    #[serde(default)]
    pub seating_type: String,
    #[serde(default)]
    pub restraint_type: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub park_name: String,
    #[serde(default)]
    pub launch_types: Vec<String>,
}

impl Item {
    /// Create a record with every attribute zeroed or empty
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: None,
            height: 0.0,
            speed: 0.0,
            length: 0.0,
            inversions: 0,
            opened_year: 0,
            country: String::new(),
            manufacturer: String::new(),
            material_type: String::new(),
            seating_type: String::new(),
            restraint_type: String::new(),
            model: String::new(),
            park_name: String::new(),
            launch_types: Vec::new(),
        }
    }

    /// Set one attribute, builder style.
    ///
    /// For [`Quality::LaunchTypes`] a text value is appended to the list.
    /// Values of the wrong shape for the attribute are ignored.
    pub fn with(mut self, quality: Quality, value: impl Into<RuleValue>) -> Self {
        match (quality, value.into()) {
            (Quality::Height, RuleValue::Number(n)) => self.height = n,
            (Quality::Speed, RuleValue::Number(n)) => self.speed = n,
            (Quality::Length, RuleValue::Number(n)) => self.length = n,
            (Quality::Inversions, RuleValue::Number(n)) => self.inversions = n as u32,
            (Quality::OpenedYear, RuleValue::Number(n)) => self.opened_year = n as i32,
            (Quality::Country, RuleValue::Text(s)) => self.country = s,
            (Quality::Manufacturer, RuleValue::Text(s)) => self.manufacturer = s,
            (Quality::MaterialType, RuleValue::Text(s)) => self.material_type = s,
            (Quality::SeatingType, RuleValue::Text(s)) => self.seating_type = s,
            (Quality::RestraintType, RuleValue::Text(s)) => self.restraint_type = s,
            (Quality::Model, RuleValue::Text(s)) => self.model = s,
            (Quality::ParkName, RuleValue::Text(s)) => self.park_name = s,
            (Quality::LaunchTypes, RuleValue::Text(s)) => self.launch_types.push(s),
            _ => {}
        }
        self
    }

    /// Read one attribute
    pub fn attribute(&self, quality: Quality) -> AttributeRef<'_> {
        match quality {
            Quality::Height => AttributeRef::Number(self.height),
            Quality::Speed => AttributeRef::Number(self.speed),
            Quality::Length => AttributeRef::Number(self.length),
            Quality::Inversions => AttributeRef::Number(f64::from(self.inversions)),
            Quality::OpenedYear => AttributeRef::Number(f64::from(self.opened_year)),
            Quality::Country => AttributeRef::Text(&self.country),
            Quality::Manufacturer => AttributeRef::Text(&self.manufacturer),
            Quality::MaterialType => AttributeRef::Text(&self.material_type),
            Quality::SeatingType => AttributeRef::Text(&self.seating_type),
            Quality::RestraintType => AttributeRef::Text(&self.restraint_type),
            Quality::Model => AttributeRef::Text(&self.model),
            Quality::ParkName => AttributeRef::Text(&self.park_name),
            Quality::LaunchTypes => AttributeRef::List(&self.launch_types),
        }
    }

    /// Stat card shown in the detail pane
    pub fn stat_lines(&self) -> Vec<String> {
        vec![
            format!("Manufacturer: {}", self.manufacturer),
            format!("Opened In: {}", self.opened_year),
            format!("Park: {}", self.park_name),
            format!("Country: {}", self.country.to_uppercase()),
            format!("Material Type: {}", self.material_type),
            format!("Restraint Type: {}", self.restraint_type),
            format!("Seating Type: {}", self.seating_type),
            format!("Launch Types: {}", self.launch_types.join(", ")),
            format!("Inversions: {}", self.inversions),
            format!("Max Height: {}m", self.height),
            format!("Total Length: {}m", self.length),
            format!("Top Speed: {}km/h", self.speed),
        ]
    }
}

/// Query interface the generator consumes
pub trait Catalog {
    /// All records whose `quality` passes `op` against `value`
    fn find_items(
        &self,
        quality: Quality,
        op: MatchOp,
        value: &RuleValue,
    ) -> Result<Vec<Item>, CatalogError>;
}

/// Catalog held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    items: Vec<Item>,
}

impl MemoryCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Parse a JSON array of records
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Ok(Self::new(items))
    }

    /// Load a JSON array of records from disk
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), items = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn find_items(
        &self,
        quality: Quality,
        op: MatchOp,
        value: &RuleValue,
    ) -> Result<Vec<Item>, CatalogError> {
        Ok(self
            .items
            .iter()
            .filter(|item| op.matches(item.attribute(quality), value))
            .cloned()
            .collect())
    }
}
