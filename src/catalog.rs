use crate::model::{Role, ShiftSlot};
use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must contain at least one slot")]
    Empty,
    #[error("slot id cannot be empty")]
    EmptyId,
    #[error("slot {0}: name cannot be empty")]
    EmptyName(String),
    #[error("duplicate slot id: {0}")]
    DuplicateId(String),
    #[error("slot {0}: start and end cannot be equal")]
    ZeroLength(String),
    #[error("slot {0}: no role required")]
    NoRequirement(String),
}

/// Catalogue des créneaux hebdomadaires d'un magasin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCatalog {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slots: Vec<ShiftSlot>,
}

impl SlotCatalog {
    pub fn new<N: Into<String>>(name: N, slots: Vec<ShiftSlot>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.slots.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut ids = HashSet::new();
        for slot in &self.slots {
            let id = slot.id.as_str();
            if id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if slot.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(id.to_string()));
            }
            if !ids.insert(id) {
                return Err(CatalogError::DuplicateId(id.to_string()));
            }
            if slot.start == slot.end {
                return Err(CatalogError::ZeroLength(id.to_string()));
            }
            if slot.required.values().all(|n| *n == 0) {
                return Err(CatalogError::NoRequirement(id.to_string()));
            }
        }
        Ok(())
    }

    /// Catalogue standard d'un magasin : ouvertures, pointe du midi,
    /// après-midi et fermeture.
    pub fn standard() -> Self {
        use Role::*;
        let slots = vec![
            ShiftSlot::new("s1-prod", "Apertura Prod", hm(9, 30), hm(12, 0)).require(Production, 1),
            ShiftSlot::new("s1-serv", "Apertura Serv", hm(9, 0), hm(12, 0))
                .require(StoreService, 1)
                .require(ModuleStoreService, 1)
                .require(ModuleOpenService, 1),
            ShiftSlot::new("s2-punta", "Almuerzo (PUNTA)", hm(12, 0), hm(15, 30))
                .high_traffic()
                .require(Production, 3)
                .require(StoreService, 3)
                .require(ModuleStoreService, 2)
                .require(ModuleOpenService, 2),
            ShiftSlot::new("s3-tarde", "Tarde", hm(15, 30), hm(19, 0))
                .require(Production, 2)
                .require(StoreService, 2)
                .require(ModuleStoreService, 1)
                .require(ModuleOpenService, 1),
            ShiftSlot::new("s4-cierre", "Cierre", hm(19, 0), hm(23, 30))
                .require(Production, 3)
                .require(StoreService, 2)
                .require(ModuleStoreService, 2)
                .require(ModuleOpenService, 3),
        ];
        Self::new("standard", slots)
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

pub fn load_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<SlotCatalog> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog: SlotCatalog = serde_json::from_slice(&data)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    catalog.validate()?;
    Ok(catalog)
}

pub fn export_catalog_json<P: AsRef<Path>>(path: P, catalog: &SlotCatalog) -> Result<()> {
    catalog.validate()?;
    let json = serde_json::to_string_pretty(catalog)?;
    fs::write(path, json)?;
    Ok(())
}
