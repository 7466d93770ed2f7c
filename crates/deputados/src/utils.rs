use crate::types::{Deputy, Legislature};

use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct DeputyFilter {
    pub legislature: Option<Legislature>,
    pub party: Option<String>,
    pub district: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl DeputyFilter {
    pub fn apply(self, mut deputies: Vec<Deputy>) -> Vec<Deputy> {
        if let Some(legislature) = self.legislature {
            deputies.retain(|d| d.legislature == legislature);
        }
        if let Some(party) = self.party {
            deputies.retain(|d| {
                d.party
                    .as_ref()
                    .is_some_and(|p| p.eq_ignore_ascii_case(&party))
            });
        }
        if let Some(district) = self.district {
            deputies.retain(|d| {
                d.district
                    .as_ref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(&district))
            });
        }
        if let Some(off) = self.offset {
            deputies = deputies.into_iter().skip(off).collect();
        }
        if let Some(lim) = self.limit {
            deputies.truncate(lim);
        }
        deputies
    }

    pub fn validate(self) -> Result<Self, String> {
        if self.offset.is_some_and(|o| o == 0) {
            return Err("Offset must be greater than 0".to_string());
        }
        if self.limit.is_some_and(|l| l == 0) {
            return Err("Limit must be greater than 0".to_string());
        }
        Ok(self)
    }
}

#[derive(Debug)]
pub struct DeputyStats {
    pub parties: BTreeMap<String, usize>,
    pub districts: usize,
    pub total: usize,
}

impl DeputyStats {
    pub fn from_deputies(deputies: &[Deputy]) -> DeputyStats {
        let mut parties: BTreeMap<String, usize> = BTreeMap::new();
        for deputy in deputies {
            let party = deputy.party.clone().unwrap_or_else(|| "—".to_string());
            *parties.entry(party).or_default() += 1;
        }
        let districts = deputies
            .iter()
            .filter_map(|d| d.district.as_ref())
            .collect::<std::collections::BTreeSet<_>>()
            .len();

        DeputyStats {
            parties,
            districts,
            total: deputies.len(),
        }
    }
}

impl std::fmt::Display for DeputyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        for (party, count) in &self.parties {
            writeln!(f, "  {:<8} {}", party, count)?;
        }
        writeln!(f, "  Districts: {}", self.districts)?;
        writeln!(f, "  Total:     {}", self.total)
    }
}
