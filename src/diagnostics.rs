//! Diagnostics
//!
//! The host's diagnostic channel. Every defect found while extracting the
//! schema graph or compiling views is reported here against the most specific
//! declaration available, and processing carries on with the next independent
//! unit of work. Whether any diagnostic is fatal is the caller's decision.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Schema ===
    /// Entity-like type declares no identifier field
    MissingIdentifier,
    /// More than one identifier without a composite-identifier declaration
    DuplicateIdentifierWithoutComposite,
    /// Embedded or embedded-identifier field whose type is not a value object
    NotAValueObject,

    // === Paths ===
    /// Type is not present in either schema registry
    UnresolvedRootType,
    /// Path segment names no field of the enclosing type
    UnknownField,
    /// Non-terminal path segment resolves to a scalar
    NonNavigableSegment,

    // === Projections ===
    /// Computed field declares no dependencies
    EmptyDependencyList,
    /// Reducer count differs from the number of collection-valued dependencies
    ReducerCountMismatch,
    /// View field is both computed and directly mapped
    ComputedAndMapped,
    /// View excluded from the output because of unresolved fields
    ViewDropped,

    // === Methods ===
    /// No candidate provider declares a matching method
    NoMatchingMethod,
    /// Same-named method with a different return type
    ReturnTypeMismatch,
    /// Same-named method with a different parameter count
    ParameterCountMismatch,
    /// Same-named method with a different parameter type
    ParameterTypeMismatch,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "W001",
            Self::DuplicateIdentifierWithoutComposite => "W002",
            Self::NotAValueObject => "E001",
            Self::UnresolvedRootType => "E002",
            Self::UnknownField => "E003",
            Self::NonNavigableSegment => "E004",
            Self::EmptyDependencyList => "E005",
            Self::ReducerCountMismatch => "E006",
            Self::ComputedAndMapped => "E007",
            Self::NoMatchingMethod => "E008",
            Self::ReturnTypeMismatch => "E009",
            Self::ParameterCountMismatch => "E010",
            Self::ParameterTypeMismatch => "E011",
            Self::ViewDropped => "N001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingIdentifier | Self::DuplicateIdentifierWithoutComposite => {
                Severity::Warning
            }

            Self::ViewDropped => Severity::Note,

            Self::NotAValueObject
            | Self::UnresolvedRootType
            | Self::UnknownField
            | Self::NonNavigableSegment
            | Self::EmptyDependencyList
            | Self::ReducerCountMismatch
            | Self::ComputedAndMapped
            | Self::NoMatchingMethod
            | Self::ReturnTypeMismatch
            | Self::ParameterCountMismatch
            | Self::ParameterTypeMismatch => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => write!(f, "note"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Reportable
// =============================================================================

/// An error that can be reported on the diagnostic channel
pub trait Reportable: fmt::Display {
    fn code(&self) -> DiagnosticCode;

    /// Extra lines shown under the message
    fn context(&self) -> Vec<String> {
        Vec::new()
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Declaration this diagnostic is reported against (`User`, `UserView.city`)
    pub element: String,
    /// Diagnostic code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Additional context (candidates, expected signatures, near misses)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(element: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.element
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one compilation unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item
    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// Report an error against a declaration
    pub fn report(&mut self, element: impl Into<String>, error: &dyn Reportable) {
        let mut item = DiagnosticItem::new(element, error.code(), error.to_string());
        item.context = error.context();
        self.push(item);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    /// Get all errors
    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items carrying a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    /// Get all items
    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if self.has_errors() {
            output.push_str(&format!(
                "\n{} error(s), {} warning(s)\n",
                self.error_count(),
                self.warning_count()
            ));
        } else if !self.is_empty() {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticItem;
    type IntoIter = std::vec::IntoIter<DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
