//! Declaration Loading
//!
//! Loads declaration documents from the filesystem or from strings, merges
//! them into one insertion-ordered `Declarations` model, and computes a
//! bundle checksum over everything that was read.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use super::{DeclarationDocument, TypeDecl, TypeModel};
use crate::checksum::Checksum;
use crate::error::{Error, Result};

/// Configuration for declaration loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip files matching these path prefixes
    pub skip_prefixes: Vec<String>,
    /// Only load files matching these path prefixes
    pub include_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: vec![
                "target/".to_string(),       // Rust build artifacts
                ".git/".to_string(),         // Git repository
                "node_modules/".to_string(), // Node.js dependencies
            ],
            include_prefixes: Vec::new(),
        }
    }
}

/// In-memory type model built from declaration documents
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    types: IndexMap<String, TypeDecl>,
    checksum: Option<Checksum>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: DeclarationDocument = serde_json::from_str(content)?;
        let mut declarations = Self::new();
        declarations.extend(document)?;
        declarations.checksum = Some(Checksum::from_content(content));
        Ok(declarations)
    }

    /// Parse a single TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let document: DeclarationDocument = toml::from_str(content)?;
        let mut declarations = Self::new();
        declarations.extend(document)?;
        declarations.checksum = Some(Checksum::from_content(content));
        Ok(declarations)
    }

    /// Add one type; names are unique across the whole unit
    pub fn insert(&mut self, decl: TypeDecl) -> Result<()> {
        if self.types.contains_key(&decl.name) {
            return Err(Error::DuplicateType { name: decl.name });
        }
        self.types.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Add every type of a document, in document order
    pub fn extend(&mut self, document: DeclarationDocument) -> Result<()> {
        for decl in document.types {
            self.insert(decl)?;
        }
        Ok(())
    }

    /// Checksum of the sources this model was loaded from
    pub fn checksum(&self) -> Option<&Checksum> {
        self.checksum.as_ref()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.values()
    }
}

impl TypeModel for Declarations {
    fn lookup(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    fn views(&self) -> Vec<&TypeDecl> {
        self.types.values().filter(|d| d.is_view()).collect()
    }
}

/// Load every `*.json` / `*.toml` declaration document below a directory.
///
/// Files are read in sorted path order so the merged model and its checksum
/// are deterministic.
pub fn load_from_directory(dir: &Path, config: &LoadConfig) -> anyhow::Result<Declarations> {
    let mut declarations = Declarations::new();
    let mut hasher = Sha256::new();
    let mut file_count = 0usize;

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(format) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if format != "json" && format != "toml" {
            continue;
        }

        let relative_path = path.strip_prefix(dir)?;
        let relative_str = relative_path.to_string_lossy();

        // Apply include/skip filters
        if !config.include_prefixes.is_empty()
            && !config.include_prefixes.iter().any(|p| relative_str.starts_with(p.as_str()))
        {
            continue;
        }
        if config.skip_prefixes.iter().any(|p| relative_str.starts_with(p.as_str())) {
            continue;
        }

        let content = fs::read_to_string(path)?;
        hasher.update(content.as_bytes());

        let document: DeclarationDocument = match format {
            "json" => serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse JSON in {}: {}", path.display(), e))?,
            _ => toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse TOML in {}: {}", path.display(), e))?,
        };

        debug!(file = %relative_str, types = document.types.len(), "loaded declaration document");
        declarations
            .extend(document)
            .map_err(|e| anyhow::anyhow!("{} (in {})", e, path.display()))?;
        file_count += 1;
    }

    let checksum = Checksum::from_hasher(hasher);
    debug!(
        files = file_count,
        types = declarations.len(),
        checksum = checksum.short(),
        "declarations loaded"
    );
    declarations.checksum = Some(checksum);

    Ok(declarations)
}
