//! Additive laws: `total = Σ parts`, solved in both directions.
//!
//! Laws are static configuration. They are registered before solving and
//! read-only while the inference engine runs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::InferError;

/// A whole/part relation over labelled quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveLaw {
    pub name: String,
    pub parts: Vec<String>,
    pub total: String,
}

impl AdditiveLaw {
    pub fn new(
        name: impl Into<String>,
        parts: impl IntoIterator<Item = impl Into<String>>,
        total: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parts: parts.into_iter().map(Into::into).collect(),
            total: total.into(),
        }
    }

    /// `E_total = KE + PE`.
    pub fn energy_conservation() -> Self {
        Self::new("energy conservation", ["KE", "PE"], "E_total")
    }

    /// A discretised integral: the total is the sum of its slices.
    pub fn riemann_sum(
        name: impl Into<String>,
        total: impl Into<String>,
        slices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(name, slices, total)
    }

    /// Every label the law mentions, total last.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.total.as_str()))
    }

    fn validate(&self) -> Result<(), InferError> {
        let invalid = |reason: &str| InferError::InvalidLaw {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.parts.is_empty() {
            return Err(invalid("no parts"));
        }
        if self.parts.iter().any(|p| p == &self.total) {
            return Err(invalid("total is also listed as a part"));
        }
        let mut seen = HashSet::new();
        if !self.parts.iter().all(|p| seen.insert(p.as_str())) {
            return Err(invalid("a part is listed twice"));
        }
        Ok(())
    }
}

/// Ordered collection of additive laws with unique names.
#[derive(Debug, Clone, Default)]
pub struct AdditiveLawRegistry {
    laws: Vec<AdditiveLaw>,
}

impl AdditiveLawRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in energy conservation law.
    pub fn with_builtin() -> Self {
        Self {
            laws: vec![AdditiveLaw::energy_conservation()],
        }
    }

    /// Add a law. Names must be unique; parts non-empty and distinct from the total.
    pub fn register(&mut self, law: AdditiveLaw) -> Result<(), InferError> {
        law.validate()?;
        if self.get(&law.name).is_some() {
            return Err(InferError::InvalidLaw {
                name: law.name,
                reason: "a law with this name is already registered".into(),
            });
        }
        tracing::debug!(law = %law.name, parts = law.parts.len(), total = %law.total, "registered additive law");
        self.laws.push(law);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AdditiveLaw> {
        self.laws.iter().find(|l| l.name == name)
    }

    /// Remove a law by name, returning it.
    pub fn remove(&mut self, name: &str) -> Result<AdditiveLaw, InferError> {
        let idx = self
            .laws
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| InferError::UnknownLaw {
                name: name.to_string(),
            })?;
        Ok(self.laws.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdditiveLaw> {
        self.laws.iter()
    }

    pub fn len(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_energy_law() {
        let reg = AdditiveLawRegistry::with_builtin();
        let law = reg.get("energy conservation").unwrap();
        assert_eq!(law.parts, vec!["KE", "PE"]);
        assert_eq!(law.total, "E_total");
        assert_eq!(law.labels().collect::<Vec<_>>(), vec!["KE", "PE", "E_total"]);
    }

    #[test]
    fn riemann_sum_with_many_slices() {
        let slices: Vec<String> = (1..=500).map(|i| format!("d_{i}")).collect();
        let law = AdditiveLaw::riemann_sum("integral", "distance", slices);
        assert_eq!(law.parts.len(), 500);
        let mut reg = AdditiveLawRegistry::new();
        reg.register(law).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn rejects_malformed_laws() {
        let mut reg = AdditiveLawRegistry::new();
        let empty: [&str; 0] = [];
        assert!(reg.register(AdditiveLaw::new("empty", empty, "t")).is_err());
        assert!(reg.register(AdditiveLaw::new("cyclic", ["t", "p"], "t")).is_err());
        assert!(reg.register(AdditiveLaw::new("twice", ["p", "p"], "t")).is_err());
        assert!(reg.register(AdditiveLaw::new(" ", ["p"], "t")).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn duplicate_names_and_removal() {
        let mut reg = AdditiveLawRegistry::with_builtin();
        let err = reg.register(AdditiveLaw::energy_conservation()).unwrap_err();
        assert!(matches!(err, InferError::InvalidLaw { .. }));

        reg.remove("energy conservation").unwrap();
        assert!(reg.is_empty());
        assert!(matches!(
            reg.remove("energy conservation"),
            Err(InferError::UnknownLaw { .. })
        ));
    }
}
