//! Concept-to-prime mapping.
//!
//! Each semantic attribute is assigned a distinct prime; a concept is the
//! product of its attributes' primes. Unique factorization makes the mapping
//! reversible, and analogies become integer triads:
//! `king · woman = man · queen`.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::ConceptError;

pub type ConceptResult<T> = std::result::Result<T, ConceptError>;

/// Attribute basis in factorization order.
const BUILTIN_ATTRIBUTES: &[(&str, u64)] = &[
    ("ENTITY", 2),
    ("HUMAN", 3),
    ("ANIMAL", 5),
    ("OBJECT", 7),
    ("MALE", 11),
    ("FEMALE", 13),
    ("NEUTRAL", 17),
    ("ROYALTY", 19),
    ("COMMONER", 23),
    ("LEADER", 29),
    ("SERVANT", 31),
    ("YOUNG", 37),
    ("ADULT", 41),
    ("OLD", 43),
    ("POSITIVE", 47),
    ("NEGATIVE", 53),
    ("POWERFUL", 59),
    ("WEAK", 61),
];

const BUILTIN_CONCEPTS: &[(&str, &[&str])] = &[
    ("man", &["HUMAN", "MALE", "ADULT"]),
    ("woman", &["HUMAN", "FEMALE", "ADULT"]),
    ("king", &["HUMAN", "MALE", "ADULT", "ROYALTY", "LEADER"]),
    ("queen", &["HUMAN", "FEMALE", "ADULT", "ROYALTY", "LEADER"]),
    ("prince", &["HUMAN", "MALE", "YOUNG", "ROYALTY"]),
    ("princess", &["HUMAN", "FEMALE", "YOUNG", "ROYALTY"]),
    ("boy", &["HUMAN", "MALE", "YOUNG"]),
    ("girl", &["HUMAN", "FEMALE", "YOUNG"]),
    ("hero", &["HUMAN", "POSITIVE", "POWERFUL"]),
    ("villain", &["HUMAN", "NEGATIVE", "POWERFUL"]),
    ("victim", &["HUMAN", "NEGATIVE", "WEAK"]),
];

/// Immutable attribute basis plus concept definitions.
#[derive(Debug, Clone)]
pub struct PrimeConceptMapper {
    basis: Vec<(String, BigUint)>,
    concepts: BTreeMap<String, Vec<String>>,
}

impl PrimeConceptMapper {
    /// Build a mapper, checking every concept against the basis.
    ///
    /// Concept names are stored lowercase. The caller is responsible for
    /// assigning distinct primes; composite basis values still multiply but
    /// no longer factor back uniquely.
    pub fn new(
        basis: impl IntoIterator<Item = (String, BigUint)>,
        concepts: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> ConceptResult<Self> {
        let basis: Vec<(String, BigUint)> = basis.into_iter().collect();
        let concepts: BTreeMap<String, Vec<String>> = concepts
            .into_iter()
            .map(|(word, attrs)| (word.to_lowercase(), attrs))
            .collect();
        for (concept, attrs) in &concepts {
            if let Some(missing) = attrs.iter().find(|a| !basis.iter().any(|(name, _)| name == *a)) {
                return Err(ConceptError::UnknownAttribute {
                    concept: concept.clone(),
                    attribute: missing.clone(),
                });
            }
        }
        Ok(Self { basis, concepts })
    }

    /// The built-in demo vocabulary (royalty, gender, age, sentiment).
    pub fn builtin() -> Self {
        Self {
            basis: BUILTIN_ATTRIBUTES
                .iter()
                .map(|&(name, p)| (name.to_string(), BigUint::from(p)))
                .collect(),
            concepts: BUILTIN_CONCEPTS
                .iter()
                .map(|&(word, attrs)| (word.to_string(), attrs.iter().map(|a| a.to_string()).collect()))
                .collect(),
        }
    }

    fn prime_of(&self, attribute: &str) -> Option<&BigUint> {
        self.basis.iter().find(|(name, _)| name == attribute).map(|(_, p)| p)
    }

    /// Product of the word's attribute primes. Lookup is case-insensitive.
    pub fn value_of(&self, word: &str) -> ConceptResult<BigUint> {
        let key = word.to_lowercase();
        let attrs = self
            .concepts
            .get(&key)
            .ok_or_else(|| ConceptError::UnknownConcept { word: word.to_string() })?;
        attrs.iter().try_fold(BigUint::one(), |acc, attr| {
            self.prime_of(attr)
                .map(|p| acc * p)
                .ok_or_else(|| ConceptError::UnknownAttribute {
                    concept: key.clone(),
                    attribute: attr.clone(),
                })
        })
    }

    /// Factor `value` over the basis, repeating attributes by multiplicity.
    /// A residue not covered by the basis is reported as `UNKNOWN_FACTOR(n)`.
    pub fn attributes_of(&self, value: &BigUint) -> ConceptResult<Vec<String>> {
        if value.is_zero() {
            return Err(ConceptError::ZeroValue);
        }
        let mut rest = value.clone();
        let mut attributes = Vec::new();
        for (name, prime) in &self.basis {
            if prime <= &BigUint::one() {
                continue;
            }
            loop {
                let (quotient, remainder) = rest.div_rem(prime);
                if !remainder.is_zero() {
                    break;
                }
                attributes.push(name.clone());
                rest = quotient;
            }
        }
        if !rest.is_one() {
            attributes.push(format!("UNKNOWN_FACTOR({rest})"));
        }
        Ok(attributes)
    }

    /// The concept whose value is exactly `value`, or a `Composite(...)`
    /// description of its factors.
    pub fn name_of(&self, value: &BigUint) -> ConceptResult<String> {
        for word in self.concepts.keys() {
            if self.value_of(word)? == *value {
                return Ok(word.clone());
            }
        }
        let attributes = self.attributes_of(value)?;
        Ok(format!("Composite({})", attributes.join(", ")))
    }

    /// Defined concept names, sorted.
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &BigUint)> {
        self.basis.iter().map(|(n, p)| (n.as_str(), p))
    }
}

impl Default for PrimeConceptMapper {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triad::Quadruple;
    use crate::triad::search::PermutationSearcher;

    #[test]
    fn values_are_products_of_primes() {
        let m = PrimeConceptMapper::builtin();
        assert_eq!(m.value_of("man").unwrap(), BigUint::from(3u32 * 11 * 41));
        assert_eq!(m.value_of("King").unwrap(), BigUint::from(3u32 * 11 * 41 * 19 * 29));
        assert!(matches!(
            m.value_of("dragon"),
            Err(ConceptError::UnknownConcept { .. })
        ));
    }

    #[test]
    fn factorization_recovers_attributes() {
        let m = PrimeConceptMapper::builtin();
        let queen = m.value_of("queen").unwrap();
        assert_eq!(
            m.attributes_of(&queen).unwrap(),
            vec!["HUMAN", "FEMALE", "ROYALTY", "LEADER", "ADULT"]
        );
        // 3·3·67: a repeated attribute plus a residue outside the basis
        let odd = BigUint::from(3u32 * 3 * 67);
        assert_eq!(m.attributes_of(&odd).unwrap(), vec!["HUMAN", "HUMAN", "UNKNOWN_FACTOR(67)"]);
        assert!(matches!(m.attributes_of(&BigUint::zero()), Err(ConceptError::ZeroValue)));
    }

    #[test]
    fn names_exact_and_composite() {
        let m = PrimeConceptMapper::builtin();
        let king = m.value_of("king").unwrap();
        assert_eq!(m.name_of(&king).unwrap(), "king");
        let man = m.value_of("man").unwrap();
        assert_eq!(m.name_of(&(man * 2u32)).unwrap(), "Composite(ENTITY, HUMAN, MALE, ADULT)");
    }

    #[test]
    fn rejects_concepts_outside_the_basis() {
        let err = PrimeConceptMapper::new(
            [("A".to_string(), BigUint::from(2u32))],
            [("thing".to_string(), vec!["B".to_string()])],
        )
        .unwrap_err();
        assert!(matches!(err, ConceptError::UnknownAttribute { .. }));
    }

    #[test]
    fn analogy_is_an_exact_triad() {
        let m = PrimeConceptMapper::builtin();
        let words = ["king", "man", "woman", "queen"];
        let values = words.map(|w| m.value_of(w).unwrap());
        let q = Quadruple::new(values, words.map(str::to_string));
        let found = PermutationSearcher::search(&q).unwrap();
        assert!(found.simplicity().is_exact());
        assert_eq!(found.relation.equation(), "king·woman = 1/1·man·queen");
    }
}
