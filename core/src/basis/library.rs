//! Basis sets that ship with the library, so the common cases don't need a file from
//! the basis set exchange.
use crate::{
    config::ConfigBasisSet,
    error::{Error, Result},
};

use super::BasisSet;

const STO_3G: &str = include_str!("../../data/basis/STO-3G.json");
const B_6_31G: &str = include_str!("../../data/basis/6-31G.json");

const BUILTIN: &[(&str, &str, &str)] = &[("sto3g", "STO-3G", STO_3G), ("631g", "6-31G", B_6_31G)];

impl BasisSet {
    /// Look up one of the built-in basis sets. The name is matched ignoring case,
    /// dashes, underscores and whitespace, so `sto-3g`, `STO3G` and `sto_3g` are the same.
    pub fn by_name(name: &str) -> Result<Self> {
        let key = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        let &(_, canonical, data) = BUILTIN
            .iter()
            .find(|(builtin, ..)| *builtin == key)
            .ok_or_else(|| Error::UnknownBasisSet(name.to_owned()))?;

        let config: ConfigBasisSet = serde_json::from_str(data)?;
        config.into_basis_set(canonical)
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|&(_, name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        atom::Atom, basis::BasisSet, error::Error, molecule::Molecule,
        periodic_table::ElementType,
    };

    #[test]
    fn builtin_lookup() {
        let sto3g = BasisSet::by_name("sto-3g").unwrap();
        assert_eq!(sto3g.name(), "STO-3G");
        assert!(BasisSet::by_name("STO_3G").is_ok());
        assert!(BasisSet::by_name("6-31g").is_ok());
        assert!(matches!(
            BasisSet::by_name("cc-pvdz"),
            Err(Error::UnknownBasisSet(_))
        ));
    }

    #[test]
    fn sto3g_function_counts() {
        let basis_set = BasisSet::by_name("STO-3G").unwrap();

        let count = |element| {
            basis_set
                .for_atom(&Atom::new(element, Default::default()))
                .map(|basis| basis.basis_functions().count())
        };

        assert_eq!(count(ElementType::H), Some(1));
        assert_eq!(count(ElementType::He), Some(1));
        assert_eq!(count(ElementType::C), Some(5));
        assert_eq!(count(ElementType::O), Some(5));
        assert_eq!(count(ElementType::Ne), Some(5));
        assert_eq!(count(ElementType::Na), None);
    }

    #[test]
    fn missing_element_is_an_error() {
        let basis_set = BasisSet::by_name("6-31G").unwrap();
        let molecule = Molecule::new(vec![Atom::new(ElementType::Li, Default::default())]);

        assert!(matches!(
            basis_set.basis_for(&molecule),
            Err(Error::MissingBasis {
                element: ElementType::Li
            })
        ));
    }
}
