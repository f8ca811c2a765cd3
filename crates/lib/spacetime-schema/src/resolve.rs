//! Type resolver.
//!
//! Turns an [`AlgebraicType`] into its display string. References are resolved
//! by name only and never followed into the typespace, and nesting is capped at
//! [`MAX_TYPE_DEPTH`], so adversarial payloads cannot recurse without bound.

use crate::models::{AlgebraicType, NamedField, RawSchema, TypeDef};

/// Field name marking a product as an opaque identity value.
pub const IDENTITY_SENTINEL: &str = "__identity__";

/// Nesting depth past which the resolver stops descending.
pub const MAX_TYPE_DEPTH: usize = 64;

const TRUNCATED: &str = "…";

/// Resolves a type against the schema's type table.
#[must_use]
pub fn resolve_type(schema: &RawSchema, ty: &AlgebraicType) -> String {
    resolve_with_types(&schema.types, ty)
}

/// Resolves a type against a bare type table.
#[must_use]
pub fn resolve_with_types(types: &[TypeDef], ty: &AlgebraicType) -> String {
    resolve_at_depth(types, ty, 0)
}

fn resolve_at_depth(types: &[TypeDef], ty: &AlgebraicType, depth: usize) -> String {
    if depth >= MAX_TYPE_DEPTH {
        return TRUNCATED.to_string();
    }
    match ty {
        AlgebraicType::Primitive(primitive) => primitive.as_str().to_string(),
        AlgebraicType::Array(inner) => {
            format!("Array<{}>", resolve_at_depth(types, inner, depth + 1))
        }
        AlgebraicType::Option(inner) => {
            format!("Option<{}>", resolve_at_depth(types, inner, depth + 1))
        }
        AlgebraicType::Ref(index) => resolve_ref(types, *index),
        AlgebraicType::Product(fields) => {
            if is_identity(fields) {
                "Identity".to_string()
            } else {
                "Product".to_string()
            }
        }
        AlgebraicType::Sum(_) => "Enum".to_string(),
        AlgebraicType::Unknown => "Unknown".to_string(),
        AlgebraicType::Other(tag) => tag.clone(),
    }
}

fn resolve_ref(types: &[TypeDef], index: u64) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|position| types.get(position))
        .and_then(|def| def.declared_name.clone())
        .unwrap_or_else(|| format!("Ref({index})"))
}

fn is_identity(fields: &[NamedField]) -> bool {
    matches!(fields, [only] if only.name.as_deref() == Some(IDENTITY_SENTINEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrimitiveType;

    fn prim(primitive: PrimitiveType) -> AlgebraicType {
        AlgebraicType::Primitive(primitive)
    }

    fn named(name: &str) -> TypeDef {
        TypeDef {
            declared_name: Some(name.to_string()),
            typespace_index: Some(0),
        }
    }

    #[test]
    fn primitives_resolve_to_their_tag() {
        for primitive in PrimitiveType::ALL {
            assert_eq!(resolve_with_types(&[], &prim(primitive)), primitive.as_str());
        }
    }

    #[test]
    fn arrays_and_options_wrap_recursively() {
        let ty = AlgebraicType::Option(Box::new(AlgebraicType::Array(Box::new(
            AlgebraicType::Array(Box::new(prim(PrimitiveType::U8))),
        ))));
        assert_eq!(resolve_with_types(&[], &ty), "Option<Array<Array<U8>>>");
    }

    #[test]
    fn refs_use_declared_name_or_placeholder() {
        let types = vec![named("User"), TypeDef::default()];
        assert_eq!(resolve_with_types(&types, &AlgebraicType::Ref(0)), "User");
        assert_eq!(resolve_with_types(&types, &AlgebraicType::Ref(1)), "Ref(1)");
        assert_eq!(resolve_with_types(&types, &AlgebraicType::Ref(42)), "Ref(42)");
    }

    #[test]
    fn identity_product_is_special_cased() {
        let identity = AlgebraicType::Product(vec![NamedField::new(
            Some(IDENTITY_SENTINEL),
            prim(PrimitiveType::U256),
        )]);
        assert_eq!(resolve_with_types(&[], &identity), "Identity");

        let pair = AlgebraicType::Product(vec![
            NamedField::new(Some(IDENTITY_SENTINEL), prim(PrimitiveType::U256)),
            NamedField::new(Some("extra"), prim(PrimitiveType::Bool)),
        ]);
        assert_eq!(resolve_with_types(&[], &pair), "Product");
        assert_eq!(resolve_with_types(&[], &AlgebraicType::Product(Vec::new())), "Product");
    }

    #[test]
    fn sums_unknown_and_foreign_tags() {
        let sum = AlgebraicType::Sum(vec![NamedField::new(Some("a"), prim(PrimitiveType::I8))]);
        assert_eq!(resolve_with_types(&[], &sum), "Enum");
        assert_eq!(resolve_with_types(&[], &AlgebraicType::Unknown), "Unknown");
        assert_eq!(
            resolve_with_types(&[], &AlgebraicType::Other("I256".to_string())),
            "I256"
        );
    }

    #[test]
    fn deep_nesting_is_truncated() {
        let mut ty = prim(PrimitiveType::Bool);
        for _ in 0..(MAX_TYPE_DEPTH + 10) {
            ty = AlgebraicType::Array(Box::new(ty));
        }
        let resolved = resolve_with_types(&[], &ty);
        assert!(resolved.contains("Array<…>"));
        assert!(!resolved.contains("Bool"));
    }
}
