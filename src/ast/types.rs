//! The gradual type model.
//!
//! A declaration either has no value (`Void`), accepts anything and is
//! checked at run time (`Dynamic`), or names the finite set of types it may
//! hold (`Definite`).

use std::{collections::BTreeSet, fmt::Display};

use crate::INTERNAL_FAULT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeInfo {
    Void,
    Dynamic,
    Definite(BTreeSet<String>),
}

/// Outcome of checking a concrete type against a [`TypeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    Incompatible,
    RequiresRuntimeCheck,
}

impl TypeInfo {
    /// A definite type set. Faults when `names` is empty.
    pub fn definite<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<BTreeSet<_>>();
        if names.is_empty() {
            INTERNAL_FAULT!("definite type info needs at least one type name");
        }
        TypeInfo::Definite(names)
    }

    /// `Dynamic` for an empty list, `Definite` otherwise.
    pub fn from_list(names: Vec<String>) -> Self {
        if names.is_empty() {
            TypeInfo::Dynamic
        } else {
            TypeInfo::definite(names)
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeInfo::Void)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, TypeInfo::Dynamic)
    }

    /// The permitted type names, or `None` when dynamic. Faults on `Void`.
    pub fn type_names(&self) -> Option<&BTreeSet<String>> {
        match self {
            TypeInfo::Void => INTERNAL_FAULT!("void type info has no type set"),
            TypeInfo::Dynamic => None,
            TypeInfo::Definite(names) => Some(names),
        }
    }

    /// Checks whether a value of type `candidate` may be stored here.
    ///
    /// `candidate` is `None` when the value's type is not known statically.
    /// A single-type target never requires a runtime check; an unknown
    /// candidate is `Incompatible` there.
    /// Faults on `Void`.
    pub fn compatibility(&self, candidate: Option<&str>) -> Compatibility {
        let Some(names) = self.type_names() else {
            return Compatibility::RequiresRuntimeCheck;
        };

        match candidate {
            Some(candidate) if names.contains(candidate) => Compatibility::Compatible,
            Some(_) => Compatibility::Incompatible,
            None if names.len() == 1 => Compatibility::Incompatible,
            None => Compatibility::RequiresRuntimeCheck,
        }
    }

    pub fn type_name_string(&self) -> String {
        match self {
            TypeInfo::Void => String::from("[void]"),
            TypeInfo::Dynamic => String::from("[dynamic]"),
            TypeInfo::Definite(names) => names.iter().cloned().collect::<Vec<_>>().join(" "),
        }
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name_string())
    }
}

/// Arguments and return type of a function, method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub arguments: Vec<(String, TypeInfo)>,
    pub return_type: TypeInfo,
}

impl FunctionSignature {
    pub fn new(arguments: Vec<(String, TypeInfo)>, return_type: TypeInfo) -> Self {
        FunctionSignature {
            arguments,
            return_type,
        }
    }

    pub fn argument(&self, name: &str) -> Option<&TypeInfo> {
        self.arguments
            .iter()
            .find(|(argument, _)| argument == name)
            .map(|(_, type_info)| type_info)
    }
}

impl Default for FunctionSignature {
    fn default() -> Self {
        FunctionSignature::new(vec![], TypeInfo::Void)
    }
}

impl Display for FunctionSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arguments = self
            .arguments
            .iter()
            .map(|(name, type_info)| format!("{}: {}", name, type_info))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{}] => {}", arguments, self.return_type)
    }
}
