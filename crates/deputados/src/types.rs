use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// A legislature of the Portuguese Parliament, identified on the site by a
/// roman numeral (e.g. "XIII"). Ordered by its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Legislature(u32);

#[derive(Debug, thiserror::Error)]
#[error("Invalid legislature numeral: {0}")]
pub struct LegislatureParseError(pub String);

impl Legislature {
    pub fn new(number: u32) -> Self {
        Legislature(number)
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    fn to_roman(self) -> String {
        const TABLE: &[(u32, &str)] = &[
            (1000, "M"),
            (900, "CM"),
            (500, "D"),
            (400, "CD"),
            (100, "C"),
            (90, "XC"),
            (50, "L"),
            (40, "XL"),
            (10, "X"),
            (9, "IX"),
            (5, "V"),
            (4, "IV"),
            (1, "I"),
        ];
        let mut remaining = self.0;
        let mut roman = String::new();
        for &(value, numeral) in TABLE {
            while remaining >= value {
                roman.push_str(numeral);
                remaining -= value;
            }
        }
        roman
    }
}

impl FromStr for Legislature {
    type Err = LegislatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digit = |c| match c {
            'I' => Some(1),
            'V' => Some(5),
            'X' => Some(10),
            'L' => Some(50),
            'C' => Some(100),
            'D' => Some(500),
            'M' => Some(1000),
            _ => None,
        };

        let numeral = s.trim();
        if numeral.is_empty() {
            return Err(LegislatureParseError(s.to_string()));
        }

        let mut total = 0u32;
        let mut prev = 0u32;
        for c in numeral.chars() {
            let value = digit(c).ok_or_else(|| LegislatureParseError(s.to_string()))?;
            total += value;
            if prev != 0 && prev < value {
                // Subtractive pair, the previous digit was added in error.
                total -= 2 * prev;
            }
            prev = value;
        }

        let legislature = Legislature(total);
        // Round-trip to reject non-canonical forms like "IIII" or "IXI".
        if legislature.to_roman() != numeral {
            return Err(LegislatureParseError(s.to_string()));
        }
        Ok(legislature)
    }
}

impl Display for Legislature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_roman())
    }
}

impl Serialize for Legislature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_roman())
    }
}

impl<'de> Deserialize<'de> for Legislature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A Member of Parliament as listed on the Deputados search grid.
///
/// `id` is the BID used by the site's biography pages
/// (`/DeputadoGP/Paginas/Biografia.aspx?BID=<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deputy {
    pub id: u32,
    pub shortname: String,
    pub party: Option<String>,
    pub district: Option<String>,
    pub legislature: Legislature,
    pub url: String,
}

impl Display for Deputy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.shortname)?;
        if let Some(party) = &self.party {
            write!(f, " ({})", party)?;
        }
        if let Some(district) = &self.district {
            write!(f, " — {}", district)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roman_round_trip() {
        for n in 1..=30 {
            let legislature = Legislature::new(n);
            let parsed: Legislature = legislature.to_string().parse().unwrap();
            assert_eq!(parsed, legislature);
        }
    }

    #[test]
    fn test_parse_known_numerals() {
        assert_eq!("I".parse::<Legislature>().unwrap().number(), 1);
        assert_eq!("IV".parse::<Legislature>().unwrap().number(), 4);
        assert_eq!("IX".parse::<Legislature>().unwrap().number(), 9);
        assert_eq!("XII".parse::<Legislature>().unwrap().number(), 12);
        assert_eq!("XVI".parse::<Legislature>().unwrap().number(), 16);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!("".parse::<Legislature>().is_err());
        assert!("ABC".parse::<Legislature>().is_err());
        assert!("IIII".parse::<Legislature>().is_err());
        assert!("IXI".parse::<Legislature>().is_err());
        assert!("VX".parse::<Legislature>().is_err());
    }

    #[test]
    fn test_ordering_is_numeric() {
        let ninth: Legislature = "IX".parse().unwrap();
        let tenth: Legislature = "X".parse().unwrap();
        assert!(ninth < tenth, "IX should sort before X");
    }

    #[test]
    fn test_legislature_serializes_as_numeral() {
        let legislature: Legislature = "XIII".parse().unwrap();
        let json = serde_json::to_string(&legislature).unwrap();
        assert_eq!(json, "\"XIII\"");
        let back: Legislature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, legislature);
    }

    #[test]
    fn test_deputy_display() {
        let deputy = Deputy {
            id: 3,
            shortname: "Maria Silva".to_string(),
            party: Some("PS".to_string()),
            district: Some("Lisboa".to_string()),
            legislature: "XVI".parse().unwrap(),
            url: "https://www.parlamento.pt/DeputadoGP/Paginas/Biografia.aspx?BID=3".to_string(),
        };
        assert_eq!(deputy.to_string(), "Maria Silva (PS) — Lisboa");
    }
}
