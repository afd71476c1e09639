//! Type Model
//!
//! The capability interface through which the compiler sees declared types.
//! Extraction and projection compilation depend only on `TypeModel`; the
//! in-memory `Declarations` implementation is backed by declaration documents
//! loaded from disk, but any host (a parsed AST, a build plugin) can supply
//! its own.

pub mod decl;
pub mod loader;
pub mod type_ref;

pub use decl::{
    ComputedDecl, DeclKind, DeclarationDocument, FieldDecl, MethodDecl, MethodReference,
    ParamDecl, ProjectionDecl, ProviderRef, RelationDecl, RelationKind, TypeDecl,
};
pub use loader::{load_from_directory, Declarations, LoadConfig};
pub use type_ref::{simple_name, TypeRef, TypeRefError};

use std::collections::HashSet;

/// Supertypes that every declared type implicitly extends
pub const UNIVERSAL_BASE_TYPES: &[&str] = &["Object", "java.lang.Object"];

/// Queryable view of the declared types of one compilation unit
pub trait TypeModel {
    /// Look up a declared type by name
    fn lookup(&self, name: &str) -> Option<&TypeDecl>;

    /// Every declared type carrying a projection declaration, in declaration order
    fn views(&self) -> Vec<&TypeDecl>;

    /// The type followed by its supertypes, closest first.
    ///
    /// Stops at the universal base type, at supertypes outside the model,
    /// and at the first repeated name.
    fn ancestry(&self, name: &str) -> Vec<&TypeDecl> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.lookup(name);

        while let Some(decl) = current {
            if !seen.insert(decl.name.as_str()) {
                break;
            }
            chain.push(decl);
            current = decl
                .extends
                .as_deref()
                .filter(|parent| !UNIVERSAL_BASE_TYPES.contains(parent))
                .and_then(|parent| self.lookup(parent));
        }

        chain
    }

    /// Fields declared directly on a type (not inherited)
    fn fields(&self, name: &str) -> &[FieldDecl] {
        self.lookup(name).map(|d| d.fields.as_slice()).unwrap_or(&[])
    }

    /// Methods declared directly on a type (not inherited)
    fn methods(&self, name: &str) -> &[MethodDecl] {
        self.lookup(name).map(|d| d.methods.as_slice()).unwrap_or(&[])
    }
}
