//! Type References
//!
//! Declared field, parameter and return types arrive from the host as text
//! (`Long`, `List<Order>`, `Map<String, Order>`, `byte[]`). This module parses
//! them into a structural `TypeRef` so that identity checks compare container
//! kind and element types exactly instead of comparing raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a type expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeRefError {
    #[error("Empty type expression")]
    Empty,

    #[error("Unexpected '{found}' at offset {pos} in type expression '{input}'")]
    Unexpected { found: char, pos: usize, input: String },

    #[error("Unterminated type expression '{input}'")]
    Unterminated { input: String },
}

/// A parsed type expression: `Name<Arg, ...>[]...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    name: String,
    args: Vec<TypeRef>,
    dims: usize,
}

impl TypeRef {
    /// A plain, non-generic type
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            dims: 0,
        }
    }

    /// A generic type with the given type arguments
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
            dims: 0,
        }
    }

    /// The erased base name (`List` for `List<Order>`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unqualified base name (`String` for `java.lang.String`)
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn args(&self) -> &[TypeRef] {
        &self.args
    }

    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.dims > 0
    }

    /// Element type of a parameterized container: the last type argument,
    /// so `Map<K, V>` yields `V`.
    pub fn element(&self) -> Option<&TypeRef> {
        self.args.last()
    }
}

/// Strip any package/module qualifier from a type name
pub fn simple_name(name: &str) -> &str {
    name.rsplit(|c: char| c == '.' || c == ':')
        .next()
        .unwrap_or(name)
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(TypeRefError::Empty);
        }

        let mut parser = Parser { input: s, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(ty),
            Some(_) => Err(parser.unexpected()),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self) -> TypeRefError {
        match self.peek() {
            Some(found) => TypeRefError::Unexpected {
                found,
                pos: self.pos,
                input: self.input.to_string(),
            },
            None => TypeRefError::Unterminated {
                input: self.input.to_string(),
            },
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeRefError> {
        self.skip_ws();

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | ':' | '?') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        let name = self.input[start..self.pos].to_string();

        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.unexpected()),
                }
            }
        }

        let mut dims = 0;
        loop {
            self.skip_ws();
            if self.input[self.pos..].starts_with("[]") {
                self.pos += 2;
                dims += 1;
            } else {
                break;
            }
        }

        Ok(TypeRef { name, args, dims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let ty: TypeRef = "Long".parse().unwrap();
        assert_eq!(ty, TypeRef::named("Long"));
        assert!(!ty.is_generic());
    }

    #[test]
    fn test_parse_nested_generics() {
        let ty: TypeRef = "Map<String,List<Order>>".parse().unwrap();
        assert_eq!(ty.name(), "Map");
        assert_eq!(ty.args().len(), 2);
        assert_eq!(ty.element().unwrap().to_string(), "List<Order>");
        assert_eq!(ty.to_string(), "Map<String, List<Order>>");
    }

    #[test]
    fn test_parse_arrays() {
        let ty: TypeRef = "byte[]".parse().unwrap();
        assert!(ty.is_array());
        assert_eq!(ty.to_string(), "byte[]");
        assert_ne!(ty, TypeRef::named("byte"));
    }

    #[test]
    fn test_container_identity_is_structural() {
        let list: TypeRef = "List<Order>".parse().unwrap();
        let set: TypeRef = "Set<Order>".parse().unwrap();
        let spaced: TypeRef = " List < Order > ".parse().unwrap();
        assert_ne!(list, set);
        assert_eq!(list, spaced);
    }

    #[test]
    fn test_simple_name() {
        let ty: TypeRef = "java.math.BigDecimal".parse().unwrap();
        assert_eq!(ty.simple_name(), "BigDecimal");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<TypeRef>(), Err(TypeRefError::Empty));
        assert!(matches!(
            "List<".parse::<TypeRef>(),
            Err(TypeRefError::Unterminated { .. })
        ));
        assert!(matches!(
            "List<>".parse::<TypeRef>(),
            Err(TypeRefError::Unexpected { found: '>', .. })
        ));
        assert!(matches!(
            "List<Order> extra".parse::<TypeRef>(),
            Err(TypeRefError::Unexpected { found: 'e', .. })
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let ty: TypeRef = serde_json::from_str("\"Set<Tag>\"").unwrap();
        assert_eq!(ty.to_string(), "Set<Tag>");
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"Set<Tag>\"");
    }
}
