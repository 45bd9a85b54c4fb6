// Named design library: an ordered list of saved parameter sets, persisted as JSON.
// Visual: "S" in the window saves what you see; "L" brings a saved look back exactly.

use crate::error::{GlassError, Result};
use crate::params::ParameterSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One saved look: parameters plus the background they were tuned against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub id: Uuid,
    pub name: String,
    pub params: ParameterSet,
    pub background_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blank or whitespace-only names are refused before anything is created.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GlassError::InvalidName);
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Default)]
pub struct DesignLibrary {
    path: Option<PathBuf>,
    designs: Vec<Design>,
}

impl DesignLibrary {
    /// Library that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the library file at `path`. A missing file is an empty library.
    /// Records that don't parse are skipped with a warning; the rest still load.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let designs = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| GlassError::Library(format!("{}: {}", path.display(), e)))?;
            parse_designs(&text)?
        } else {
            tracing::debug!(path = %path.display(), "no design library yet");
            Vec::new()
        };
        tracing::info!(count = designs.len(), path = %path.display(), "design library loaded");
        Ok(Self { path: Some(path), designs })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Designs in save order.
    pub fn list(&self) -> &[Design] {
        &self.designs
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Design> {
        self.designs.iter().find(|d| d.id == id)
    }

    /// Save the current parameters under a new name and persist.
    pub fn create(&mut self, name: &str, params: &ParameterSet, background_url: &str) -> Result<&Design> {
        let name = validate_name(name)?;
        let now = Utc::now();
        let design = Design {
            id: Uuid::new_v4(),
            name,
            params: params.clone(),
            background_url: background_url.to_string(),
            created_at: now,
            updated_at: now,
        };
        tracing::info!(id = %design.id, name = %design.name, "design created");
        self.designs.push(design);
        self.persist()?;
        Ok(&self.designs[self.designs.len() - 1])
    }

    pub fn rename(&mut self, id: Uuid, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let design = self
            .designs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| GlassError::DesignNotFound(id.to_string()))?;
        design.name = name;
        design.updated_at = Utc::now();
        self.persist()
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Design> {
        let idx = self
            .designs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| GlassError::DesignNotFound(id.to_string()))?;
        let removed = self.designs.remove(idx);
        tracing::info!(id = %removed.id, "design deleted");
        self.persist()?;
        Ok(removed)
    }

    /// Write the whole list back to disk (no-op for in-memory libraries).
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.designs)
            .map_err(|e| GlassError::Library(format!("serialize: {e}")))?;

        // write next to the target, then swap, so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Parse the persisted array, dropping records that don't fit the Design shape.
pub fn parse_designs(text: &str) -> Result<Vec<Design>> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(text).map_err(|e| GlassError::Library(format!("not a design list: {e}")))?;

    let mut designs = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Design>(record) {
            Ok(d) => designs.push(d),
            Err(e) => tracing::warn!(index, "skipping unreadable design record: {e}"),
        }
    }
    Ok(designs)
}
