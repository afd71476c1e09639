//! Error types for schema extraction and projection compilation
//!
//! Loading declarations can fail hard (`Error`). Everything found while
//! compiling is a diagnostic instead: the taxonomy enums below implement
//! `Reportable` and end up on the `Diagnostics` channel.

use thiserror::Error;

use crate::diagnostics::{DiagnosticCode, Reportable};
use crate::model::TypeRef;

/// Result type for loading operations
pub type Result<T> = std::result::Result<T, Error>;

/// Declaration loading errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate type declaration: {name}")]
    DuplicateType { name: String },

    #[error("Unsupported declaration format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Findings of the schema extraction engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Entity {type_name} declares no identifier field")]
    MissingIdentifier { type_name: String },

    #[error(
        "Entity {type_name} declares {} identifier fields ({}) without a composite identifier",
        .fields.len(),
        .fields.join(", ")
    )]
    DuplicateIdentifierWithoutComposite { type_name: String, fields: Vec<String> },

    #[error("Field {owner}.{field} is embedded but {type_name} is not a value object")]
    NotAValueObject {
        owner: String,
        field: String,
        type_name: String,
    },
}

impl SchemaError {
    /// The schema type this finding is reported against
    pub fn owner(&self) -> &str {
        match self {
            Self::MissingIdentifier { type_name }
            | Self::DuplicateIdentifierWithoutComposite { type_name, .. } => type_name,
            Self::NotAValueObject { owner, .. } => owner,
        }
    }
}

impl Reportable for SchemaError {
    fn code(&self) -> DiagnosticCode {
        match self {
            Self::MissingIdentifier { .. } => DiagnosticCode::MissingIdentifier,
            Self::DuplicateIdentifierWithoutComposite { .. } => {
                DiagnosticCode::DuplicateIdentifierWithoutComposite
            }
            Self::NotAValueObject { .. } => DiagnosticCode::NotAValueObject,
        }
    }
}

// =============================================================================
// Path Errors
// =============================================================================

/// Failures of dotted-path navigation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Cannot resolve path '{path}': type {type_name} has no schema entry")]
    UnresolvedRootType { path: String, type_name: String },

    #[error("Unknown field '{segment}' on {type_name} in path '{path}'")]
    UnknownField {
        segment: String,
        type_name: String,
        path: String,
        suggestion: Option<String>,
    },

    #[error("Segment '{segment}' of path '{path}' is not navigable: {type_name}.{segment} is a scalar")]
    NonNavigableSegment {
        segment: String,
        type_name: String,
        path: String,
    },
}

impl Reportable for PathError {
    fn code(&self) -> DiagnosticCode {
        match self {
            Self::UnresolvedRootType { .. } => DiagnosticCode::UnresolvedRootType,
            Self::UnknownField { .. } => DiagnosticCode::UnknownField,
            Self::NonNavigableSegment { .. } => DiagnosticCode::NonNavigableSegment,
        }
    }

    fn context(&self) -> Vec<String> {
        match self {
            Self::UnknownField {
                suggestion: Some(suggestion),
                ..
            } => vec![format!("did you mean '{}'?", suggestion)],
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Projection Errors
// =============================================================================

/// Failures while compiling a view field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("View {view} maps source type {source_type}, which has no schema entry")]
    UnresolvedSourceType { view: String, source_type: String },

    #[error("Computed field {view}.{field} declares no dependencies")]
    EmptyDependencyList { view: String, field: String },

    #[error(
        "Computed field {view}.{field} has {required} collection-valued dependencies \
         but declares {found} reducers: required {required}, found {found}"
    )]
    ReducerCountMismatch {
        view: String,
        field: String,
        required: usize,
        found: usize,
    },

    #[error("Field {view}.{field} is declared both computed and mapped from a path")]
    ComputedAndMapped { view: String, field: String },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Method(#[from] MethodError),
}

impl Reportable for ProjectionError {
    fn code(&self) -> DiagnosticCode {
        match self {
            Self::UnresolvedSourceType { .. } => DiagnosticCode::UnresolvedRootType,
            Self::EmptyDependencyList { .. } => DiagnosticCode::EmptyDependencyList,
            Self::ReducerCountMismatch { .. } => DiagnosticCode::ReducerCountMismatch,
            Self::ComputedAndMapped { .. } => DiagnosticCode::ComputedAndMapped,
            Self::Path(err) => err.code(),
            Self::Method(err) => err.code(),
        }
    }

    fn context(&self) -> Vec<String> {
        match self {
            Self::Path(err) => err.context(),
            Self::Method(err) => err.context(),
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Method Errors
// =============================================================================

/// Failures of computation-method resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MethodError {
    #[error("No provider of {view} declares `{expected}` for computed field {field}")]
    NoMatchingMethod {
        view: String,
        field: String,
        expected: String,
        candidates: Vec<String>,
        rejections: Vec<MethodError>,
    },

    #[error("{provider}.{method} returns {found}, expected {expected}")]
    ReturnTypeMismatch {
        provider: String,
        method: String,
        expected: TypeRef,
        found: TypeRef,
    },

    #[error("{provider}.{method} takes {found} parameter(s), expected {expected}")]
    ParameterCountMismatch {
        provider: String,
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("{provider}.{method} parameter {position} is {found}, expected {expected}")]
    ParameterTypeMismatch {
        provider: String,
        method: String,
        position: usize,
        expected: TypeRef,
        found: TypeRef,
    },
}

impl Reportable for MethodError {
    fn code(&self) -> DiagnosticCode {
        match self {
            Self::NoMatchingMethod { .. } => DiagnosticCode::NoMatchingMethod,
            Self::ReturnTypeMismatch { .. } => DiagnosticCode::ReturnTypeMismatch,
            Self::ParameterCountMismatch { .. } => DiagnosticCode::ParameterCountMismatch,
            Self::ParameterTypeMismatch { .. } => DiagnosticCode::ParameterTypeMismatch,
        }
    }

    fn context(&self) -> Vec<String> {
        let Self::NoMatchingMethod {
            expected,
            candidates,
            rejections,
            ..
        } = self
        else {
            return Vec::new();
        };

        let mut context = Vec::with_capacity(rejections.len() + 2);
        if candidates.is_empty() {
            context.push("candidates tried: none declared".to_string());
        } else {
            context.push(format!("candidates tried: {}", candidates.join(", ")));
        }
        context.push(format!("expected signature: {}", expected));
        context.extend(rejections.iter().map(|r| format!("rejected: {}", r)));
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reducer_mismatch_message() {
        let err = ProjectionError::ReducerCountMismatch {
            view: "UserView".to_string(),
            field: "orderCount".to_string(),
            required: 1,
            found: 0,
        };
        assert!(err.to_string().contains("required 1, found 0"));
        assert_eq!(err.code(), DiagnosticCode::ReducerCountMismatch);
    }

    #[test]
    fn test_duplicate_identifier_message() {
        let err = SchemaError::DuplicateIdentifierWithoutComposite {
            type_name: "Line".to_string(),
            fields: vec!["orderId".to_string(), "lineNo".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Entity Line declares 2 identifier fields (orderId, lineNo) without a composite identifier"
        );
        assert_eq!(err.owner(), "Line");
    }

    #[test]
    fn test_wrapped_errors_keep_codes() {
        let err: ProjectionError = PathError::UnknownField {
            segment: "nme".to_string(),
            type_name: "User".to_string(),
            path: "nme".to_string(),
            suggestion: Some("name".to_string()),
        }
        .into();

        assert_eq!(err.code(), DiagnosticCode::UnknownField);
        assert_eq!(err.context(), vec!["did you mean 'name'?".to_string()]);
    }

    #[test]
    fn test_no_matching_method_context() {
        let err = MethodError::NoMatchingMethod {
            view: "UserView".to_string(),
            field: "fullName".to_string(),
            expected: "String getFullName(String firstName, String lastName)".to_string(),
            candidates: vec!["UserComputations".to_string()],
            rejections: vec![MethodError::ParameterCountMismatch {
                provider: "UserComputations".to_string(),
                method: "getFullName".to_string(),
                expected: 2,
                found: 1,
            }],
        };

        let context = err.context();
        assert_eq!(context[0], "candidates tried: UserComputations");
        assert_eq!(
            context[1],
            "expected signature: String getFullName(String firstName, String lastName)"
        );
        assert!(context[2].contains("takes 1 parameter(s), expected 2"));
    }
}
