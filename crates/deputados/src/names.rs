//! Short-name fixes for deputies whose name on the search grid does not
//! match the one used elsewhere on the site (typos, dropped particles,
//! protocol forms). The table maps the grid spelling to the canonical one.

use crate::types::Deputy;

const SHORTNAME_REPLACES: &[(&str, &str)] = &[
    ("António Amaro", "António Leitão Amaro"),
    ("Maria Gabriela Canavilhas", "Gabriela Canavilhas"),
    ("José Matos Rosa", "José de Matos Rosa"),
    ("José Matos Correia", "José de Matos Correia"),
    ("Maria da Conceição Pereira", "Maria Conceição Pereira"),
    ("Maria Helena André", "Helena André"),
    ("Duarte Marques", "Duarte Filipe Marques"),
    ("Maria Francisca Almeida", "Francisca Almeida"),
    ("Francisco Assis", "Francisco de Assis"),
    ("Paulo Baptista Santos", "Paulo Batista Santos"),
    ("João Antunes", "João Figueiredo"),
    ("Carlos Gonçalves", "Carlos Alberto Gonçalves"),
    ("Ana Catarina Mendonça Mendes", "Ana Catarina Mendonça"),
    ("António Peixoto", "Carlos Peixoto"),
    ("Carlos Amorim", "Carlos Abreu Amorim"),
    ("João Mota Amaral", "Mota Amaral"),
    ("Helder Amaral", "Hélder Amaral"),
    ("Heitor de Sousa", "Heitor Sousa"),
    ("Pedro do ó Ramos", "Pedro do Ó Ramos"),
    ("Isabel Moreira", "Isabel Alves Moreira"),
    ("Carlos Silva", "Carlos Santos Silva"),
    ("Álvaro Castelo Branco", "Álvaro Castello-Branco"),
    ("Filipe Lobo D' Ávila", "Filipe Lobo d'Ávila"),
    ("Regina Bastos", "Regina Ramos Bastos"),
    ("Maria Antónia de Almeida Santos", "Maria Antónia Almeida Santos"),
    ("Maria das Mercês Borges", "Maria das Mercês Soares"),
    ("Eduardo Ferro Rodrigues", "Ferro Rodrigues"),
    ("Rosa Maria Bastos Albernaz", "Rosa Maria Albernaz"),
    ("Domicilia Costa", "Domicília Costa"),
];

/// Canonical spelling for a scraped short name. Names without a fix pass
/// through untouched.
pub fn canonical_shortname(shortname: &str) -> &str {
    SHORTNAME_REPLACES
        .iter()
        .find(|(from, _)| *from == shortname)
        .map(|(_, to)| *to)
        .unwrap_or(shortname)
}

/// Apply the replacement table to a scraped batch in place.
pub fn apply(deputies: &mut [Deputy]) {
    for deputy in deputies {
        let canonical = canonical_shortname(&deputy.shortname);
        if canonical != deputy.shortname {
            log::debug!("Renaming '{}' to '{}'", deputy.shortname, canonical);
            deputy.shortname = canonical.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Legislature;

    fn deputy(shortname: &str) -> Deputy {
        Deputy {
            id: 1,
            shortname: shortname.to_string(),
            party: None,
            district: None,
            legislature: Legislature::new(16),
            url: String::new(),
        }
    }

    #[test]
    fn test_known_replacement() {
        assert_eq!(canonical_shortname("Helder Amaral"), "Hélder Amaral");
        assert_eq!(canonical_shortname("Francisco Assis"), "Francisco de Assis");
    }

    #[test]
    fn test_unknown_name_passes_through() {
        assert_eq!(canonical_shortname("Maria Silva"), "Maria Silva");
    }

    #[test]
    fn test_apply_rewrites_in_place() {
        let mut deputies = vec![deputy("Eduardo Ferro Rodrigues"), deputy("Maria Silva")];
        apply(&mut deputies);
        assert_eq!(deputies[0].shortname, "Ferro Rodrigues");
        assert_eq!(deputies[1].shortname, "Maria Silva");
    }
}
