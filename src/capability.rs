//! Capability sets: the member table a proxy is generated from.

use crate::errors::{MockError, Result};
use crate::value::ReturnKind;
use serde::Serialize;
use std::collections::HashSet;

/// One interceptable (or sealed) member of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSpec {
    pub name: String,
    pub arity: usize,
    pub returns: ReturnKind,
    /// Sealed members cannot be intercepted.
    pub interceptable: bool,
}

impl MemberSpec {
    pub fn new(name: impl Into<String>, arity: usize, returns: ReturnKind) -> Self {
        Self {
            name: name.into(),
            arity,
            returns,
            interceptable: true,
        }
    }

    pub fn sealed(mut self) -> Self {
        self.interceptable = false;
        self
    }
}

/// Named set of members describing a mockable interface.
///
/// # Example
///
/// ```rust
/// use mockingbird::{CapabilitySet, ReturnKind};
///
/// let list = CapabilitySet::new("List")
///     .method("add", 1, ReturnKind::Bool)
///     .method("get", 1, ReturnKind::Object)
///     .method("clear", 0, ReturnKind::Unit);
///
/// assert!(list.check_proxyable().is_ok());
/// assert_eq!(list.member("get").map(|m| m.arity), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    name: String,
    members: Vec<MemberSpec>,
}

impl CapabilitySet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: MemberSpec) -> Self {
        self.members.push(member);
        self
    }

    pub fn method(self, name: impl Into<String>, arity: usize, returns: ReturnKind) -> Self {
        self.with_member(MemberSpec::new(name, arity, returns))
    }

    pub fn sealed_method(self, name: impl Into<String>, arity: usize, returns: ReturnKind) -> Self {
        self.with_member(MemberSpec::new(name, arity, returns).sealed())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[MemberSpec] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&MemberSpec> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Look up a member, failing with `UnknownMember`.
    pub fn require(&self, name: &str) -> Result<&MemberSpec> {
        self.member(name).ok_or_else(|| MockError::UnknownMember {
            capability: self.name.clone(),
            member: name.to_string(),
        })
    }

    /// Look up a member and check the number of arguments against it.
    pub fn require_arity(&self, name: &str, actual: usize) -> Result<&MemberSpec> {
        let member = self.require(name)?;
        if member.arity != actual {
            return Err(MockError::ArityMismatch {
                capability: self.name.clone(),
                member: name.to_string(),
                expected: member.arity,
                actual,
            });
        }
        Ok(member)
    }

    /// Check that every member can be intercepted.
    ///
    /// Sealed members and duplicated names (overloads a name-keyed proxy
    /// cannot tell apart) make the set unsupported.
    pub fn check_proxyable(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let offending: Vec<String> = self
            .members
            .iter()
            .filter(|m| !m.interceptable || !seen.insert(m.name.as_str()))
            .map(|m| m.name.clone())
            .collect();

        if offending.is_empty() {
            Ok(())
        } else {
            Err(MockError::UnsupportedCapability {
                capability: self.name.clone(),
                members: offending,
            })
        }
    }
}
