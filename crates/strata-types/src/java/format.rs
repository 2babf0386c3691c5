//! Java-like rendering of types for diagnostics and logs.
//!
//! The output is stable but not guaranteed to be valid source: captured wildcards render the way
//! javac prints them (`capture#1 of ? extends Number`).

use std::fmt;

use crate::symbols::{ClassSymbolProvider, MethodSymbol};
use crate::ty::{ClassType, Type, WildcardBound};

/// Wraps a type so it can be used with `{}`.
pub struct TypeDisplay<'a> {
    env: &'a dyn ClassSymbolProvider,
    ty: &'a Type,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(env: &'a dyn ClassSymbolProvider, ty: &'a Type) -> Self {
        Self { env, ty }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self.env, self.ty)
    }
}

pub fn format_type(env: &dyn ClassSymbolProvider, ty: &Type) -> String {
    TypeDisplay::new(env, ty).to_string()
}

/// `name(A, B...)`, with the parameter types rendered by [`format_type`].
pub fn format_method_signature(env: &dyn ClassSymbolProvider, method: &MethodSymbol) -> String {
    let mut out = format!("{}(", method.name);
    let last = method.params.len().saturating_sub(1);
    for (i, param) in method.params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match param {
            Type::Array(component) if method.is_varargs && i == last => {
                out.push_str(&format_type(env, component));
                out.push_str("...");
            }
            _ => out.push_str(&format_type(env, param)),
        }
    }
    out.push(')');
    out
}

fn write_type(f: &mut fmt::Formatter<'_>, env: &dyn ClassSymbolProvider, ty: &Type) -> fmt::Result {
    match ty {
        Type::Primitive(p) => f.write_str(p.java_name()),
        Type::Class(ct) => write_class(f, env, ct),
        Type::Array(component) => {
            write_type(f, env, component)?;
            f.write_str("[]")
        }
        Type::Wildcard(bound) => write_wildcard(f, env, bound),
        Type::Captured(id) => {
            write!(f, "capture#{} of ", id.slot + 1)?;
            match env.captured(*id) {
                Some(captured) => write_wildcard(f, env, &captured.origin),
                None => f.write_str("?"),
            }
        }
        Type::Intersection(parts) => write_joined(f, env, parts, " & "),
        Type::Disjunction(alternatives) => write_joined(f, env, alternatives, " | "),
        Type::TypeVar(var) => match env.type_param(*var) {
            Some(def) => f.write_str(&def.name),
            None => write!(f, "<T#{}>", var.index()),
        },
        Type::Null => f.write_str("null"),
        Type::Unknown => f.write_str("<unknown>"),
    }
}

fn write_class(f: &mut fmt::Formatter<'_>, env: &dyn ClassSymbolProvider, ct: &ClassType) -> fmt::Result {
    match env.class(ct.def) {
        Some(symbol) => f.write_str(&symbol.name.replace('$', "."))?,
        None => write!(f, "<class#{}>", ct.def.index())?,
    }
    if ct.args.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    write_joined(f, env, &ct.args, ", ")?;
    f.write_str(">")
}

fn write_wildcard(
    f: &mut fmt::Formatter<'_>,
    env: &dyn ClassSymbolProvider,
    bound: &WildcardBound,
) -> fmt::Result {
    match bound {
        WildcardBound::Unbounded => f.write_str("?"),
        WildcardBound::Extends(ty) => {
            f.write_str("? extends ")?;
            write_type(f, env, ty)
        }
        WildcardBound::Super(ty) => {
            f.write_str("? super ")?;
            write_type(f, env, ty)
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    env: &dyn ClassSymbolProvider,
    types: &[Type],
    separator: &str,
) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_type(f, env, ty)?;
    }
    Ok(())
}
