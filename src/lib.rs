//! Familiar Projections
//!
//! A compile-time schema graph builder and projection compiler. Declared
//! domain types are walked into a typed field graph; declared view types are
//! then compiled into immutable projection metadata against that graph.
//!
//! ## Features
//!
//! - **Schema Extraction**: entity and embeddable types, ancestry shadowing,
//!   identifier checks, cycle-safe discovery of reachable types
//! - **Path Resolution**: dotted paths with navigability rules
//! - **Projection Compilation**: direct mappings and computed fields, with
//!   fail-slow diagnostics
//! - **Method Resolution**: exact structural matching of provider methods
//!
//! ## Architecture
//!
//! ```text
//! declarations/*.json ──▶ TypeModel ──▶ SchemaExtractor ──▶ SchemaRegistry (frozen)
//!                              │                                   │
//!                              └────────▶ ProjectionCompiler ◀─────┘
//!                                               │
//!                              PathResolver ◀───┼───▶ MethodResolver
//!                                               ▼
//!                               ProjectionRegistry + Diagnostics
//! ```

pub mod checksum;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod projection;
pub mod schema;
pub mod unit;

pub use checksum::Checksum;
pub use config::ProjectionConfig;
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{Error, MethodError, PathError, ProjectionError, Result, SchemaError};
pub use model::{load_from_directory, Declarations, TypeModel, TypeRef};
pub use projection::{ProjectionMetadata, ProjectionRegistry};
pub use schema::{SchemaGraph, SchemaRegistry};
pub use unit::{CompilationOutput, CompilationUnit};
