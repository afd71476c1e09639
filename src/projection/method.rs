//! Method Resolution
//!
//! Finds the provider method a computed field is derived with. Candidates are
//! scanned in declaration order and the first structurally exact match wins:
//! same name, identical return type, same parameter count, identical
//! parameter types position by position.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

use crate::error::MethodError;
use crate::model::{MethodDecl, TypeModel, TypeRef};
use crate::schema::TypeName;

/// Default prefix of convention-derived method names
pub const DEFAULT_METHOD_PREFIX: &str = "get";

/// Convention-derived method name: prefix plus capitalized field name
pub fn convention_name(prefix: &str, field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

/// A resolved computation method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Candidate type the method was found on
    pub provider: TypeName,
    /// Type in the provider's ancestry that declares the method
    pub declared_in: TypeName,
    pub name: String,
    pub return_type: TypeRef,
    pub parameters: Vec<TypeRef>,
    #[serde(default)]
    pub is_static: bool,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{} {}.{}({})",
            self.return_type,
            self.provider,
            self.name,
            params.join(", ")
        )
    }
}

/// What a computed field needs from its provider
#[derive(Debug, Clone)]
pub struct MethodRequest {
    pub view: TypeName,
    pub field: String,
    pub method_name: String,
    pub return_type: TypeRef,
    /// Exact dependency types, each paired with its last path segment
    pub params: Vec<(TypeRef, String)>,
}

impl MethodRequest {
    /// The expected method, rendered as a ready-to-implement stub
    pub fn signature_text(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(ty, name)| format!("{} {}", ty, name))
            .collect();
        format!("{} {}({})", self.return_type, self.method_name, params.join(", "))
    }

    fn check(&self, provider: &str, method: &MethodDecl) -> Result<(), MethodError> {
        if method.returns != self.return_type {
            return Err(MethodError::ReturnTypeMismatch {
                provider: provider.to_string(),
                method: method.name.clone(),
                expected: self.return_type.clone(),
                found: method.returns.clone(),
            });
        }

        if method.params.len() != self.params.len() {
            return Err(MethodError::ParameterCountMismatch {
                provider: provider.to_string(),
                method: method.name.clone(),
                expected: self.params.len(),
                found: method.params.len(),
            });
        }

        for (position, (param, (expected, _))) in method.params.iter().zip(&self.params).enumerate() {
            if &param.ty != expected {
                return Err(MethodError::ParameterTypeMismatch {
                    provider: provider.to_string(),
                    method: method.name.clone(),
                    position,
                    expected: expected.clone(),
                    found: param.ty.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Matches method requests against provider types of the type model
pub struct MethodResolver<'a> {
    model: &'a dyn TypeModel,
}

impl<'a> MethodResolver<'a> {
    pub fn new(model: &'a dyn TypeModel) -> Self {
        Self { model }
    }

    /// Resolve `request` against `candidates`, in order.
    ///
    /// On failure the returned `NoMatchingMethod` carries the first rejection
    /// of every candidate that declared a same-named method.
    pub fn resolve(
        &self,
        request: &MethodRequest,
        candidates: &[&str],
    ) -> Result<MethodSignature, MethodError> {
        let mut rejections = Vec::new();

        for &candidate in candidates {
            match self.match_candidate(request, candidate) {
                Ok(Some(signature)) => {
                    debug!(
                        view = %request.view,
                        field = %request.field,
                        method = %signature,
                        "resolved computation method"
                    );
                    return Ok(signature);
                }
                Ok(None) => {
                    trace!(candidate, method = %request.method_name, "no method of that name");
                }
                Err(rejection) => rejections.push(rejection),
            }
        }

        Err(MethodError::NoMatchingMethod {
            view: request.view.clone(),
            field: request.field.clone(),
            expected: request.signature_text(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            rejections,
        })
    }

    /// `Ok(None)` when the candidate declares no method of the requested name
    fn match_candidate(
        &self,
        request: &MethodRequest,
        candidate: &str,
    ) -> Result<Option<MethodSignature>, MethodError> {
        let mut first_rejection = None;

        for decl in self.model.ancestry(candidate) {
            for method in decl.methods.iter().filter(|m| m.name == request.method_name) {
                match request.check(candidate, method) {
                    Ok(()) => {
                        return Ok(Some(MethodSignature {
                            provider: candidate.to_string(),
                            declared_in: decl.name.clone(),
                            name: method.name.clone(),
                            return_type: method.returns.clone(),
                            parameters: method.params.iter().map(|p| p.ty.clone()).collect(),
                            is_static: method.is_static,
                        }));
                    }
                    Err(rejection) => {
                        first_rejection.get_or_insert(rejection);
                    }
                }
            }
        }

        match first_rejection {
            Some(rejection) => Err(rejection),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Declarations;

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn request(method_name: &str, returns: &str, params: &[(&str, &str)]) -> MethodRequest {
        MethodRequest {
            view: "UserView".to_string(),
            field: "value".to_string(),
            method_name: method_name.to_string(),
            return_type: ty(returns),
            params: params.iter().map(|(t, n)| (ty(t), n.to_string())).collect(),
        }
    }

    fn model() -> Declarations {
        Declarations::from_json_str(
            r#"{ "types": [
                { "name": "Names", "methods": [
                    { "name": "getFullName", "returns": "String",
                      "params": [ { "name": "first", "type": "String" }, { "name": "last", "type": "String" } ] }
                ] },
                { "name": "MoreNames", "methods": [
                    { "name": "getFullName", "returns": "String",
                      "params": [ { "name": "given", "type": "String" }, { "name": "family", "type": "String" } ] }
                ] },
                { "name": "WrongCount", "methods": [
                    { "name": "getFullName", "returns": "String",
                      "params": [ { "name": "first", "type": "String" } ] }
                ] },
                { "name": "Orders", "methods": [
                    { "name": "getOrderCount", "returns": "int",
                      "params": [ { "name": "orders", "type": "Set<Order>" } ] },
                    { "name": "getTotal", "returns": "Long",
                      "params": [ { "name": "amount", "type": "long" } ] }
                ] },
                { "name": "BaseNames", "methods": [
                    { "name": "getNickname", "returns": "String", "static": true,
                      "params": [ { "name": "first", "type": "String" } ] }
                ] },
                { "name": "DerivedNames", "extends": "BaseNames" }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_convention_name() {
        assert_eq!(convention_name("get", "fullName"), "getFullName");
        assert_eq!(convention_name("compute", "total"), "computeTotal");
        assert_eq!(convention_name("get", ""), "get");
    }

    #[test]
    fn test_signature_text() {
        let req = request(
            "getFullName",
            "String",
            &[("String", "firstName"), ("String", "lastName")],
        );
        assert_eq!(
            req.signature_text(),
            "String getFullName(String firstName, String lastName)"
        );
    }

    #[test]
    fn test_first_match_wins() {
        let model = model();
        let resolver = MethodResolver::new(&model);
        let req = request("getFullName", "String", &[("String", "first"), ("String", "last")]);

        let signature = resolver.resolve(&req, &["WrongCount", "Names"]).unwrap();
        assert_eq!(signature.provider, "Names");
        assert_eq!(signature.to_string(), "String Names.getFullName(String, String)");
    }

    #[test]
    fn test_first_of_two_matching_providers_wins() {
        let model = model();
        let resolver = MethodResolver::new(&model);
        let req = request("getFullName", "String", &[("String", "first"), ("String", "last")]);

        let signature = resolver.resolve(&req, &["Names", "MoreNames"]).unwrap();
        assert_eq!(signature.provider, "Names");

        let signature = resolver.resolve(&req, &["MoreNames", "Names"]).unwrap();
        assert_eq!(signature.provider, "MoreNames");
    }

    #[test]
    fn test_no_matching_method_lists_rejections() {
        let model = model();
        let resolver = MethodResolver::new(&model);
        let req = request("getFullName", "String", &[("String", "firstName"), ("String", "lastName")]);

        let err = resolver.resolve(&req, &["WrongCount", "Orders"]).unwrap_err();
        match err {
            MethodError::NoMatchingMethod {
                expected,
                candidates,
                rejections,
                ..
            } => {
                assert_eq!(expected, "String getFullName(String firstName, String lastName)");
                assert_eq!(candidates, vec!["WrongCount", "Orders"]);
                assert_eq!(
                    rejections,
                    vec![MethodError::ParameterCountMismatch {
                        provider: "WrongCount".to_string(),
                        method: "getFullName".to_string(),
                        expected: 2,
                        found: 1,
                    }]
                );
            }
            other => panic!("Expected NoMatchingMethod, got {:?}", other),
        }
    }

    #[test]
    fn test_container_kind_must_match() {
        let model = model();
        let resolver = MethodResolver::new(&model);
        let req = request("getOrderCount", "int", &[("List<Order>", "orders")]);

        let err = resolver.resolve(&req, &["Orders"]).unwrap_err();
        let MethodError::NoMatchingMethod { rejections, .. } = err else {
            panic!("Expected NoMatchingMethod");
        };
        assert!(matches!(
            &rejections[0],
            MethodError::ParameterTypeMismatch { position: 0, found, .. } if found.to_string() == "Set<Order>"
        ));
    }

    #[test]
    fn test_boxed_and_unboxed_differ() {
        let model = model();
        let resolver = MethodResolver::new(&model);

        let boxed_param = request("getTotal", "Long", &[("Long", "amount")]);
        assert!(resolver.resolve(&boxed_param, &["Orders"]).is_err());

        let unboxed_return = request("getTotal", "long", &[("long", "amount")]);
        let err = resolver.resolve(&unboxed_return, &["Orders"]).unwrap_err();
        let MethodError::NoMatchingMethod { rejections, .. } = err else {
            panic!("Expected NoMatchingMethod");
        };
        assert!(matches!(rejections[0], MethodError::ReturnTypeMismatch { .. }));
    }

    #[test]
    fn test_inherited_methods() {
        let model = model();
        let resolver = MethodResolver::new(&model);
        let req = request("getNickname", "String", &[("String", "first")]);

        let signature = resolver.resolve(&req, &["DerivedNames"]).unwrap();
        assert_eq!(signature.provider, "DerivedNames");
        assert_eq!(signature.declared_in, "BaseNames");
        assert!(signature.is_static);
    }

    #[test]
    fn test_no_candidates() {
        let model = model();
        let resolver = MethodResolver::new(&model);
        let req = request("getFullName", "String", &[]);

        let err = resolver.resolve(&req, &[]).unwrap_err();
        assert!(matches!(err, MethodError::NoMatchingMethod { candidates, .. } if candidates.is_empty()));
    }
}
