//! Static naming data: trade-source spellings to boundary-file names, and the
//! continent classification of the boundary-file names.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use log::debug;

use crate::config::DominanceErrors;

/// Trade-source spelling -> boundary-file name.
pub const NAME_RECONCILIATION: &[(&str, &str)] = &[
    ("Afghanistan, Islamic Republic of", "Afghanistan"),
    ("Armenia, Republic of", "Armenia"),
    ("Azerbaijan, Republic of", "Azerbaijan"),
    ("Bahamas, The", "The Bahamas"),
    ("Belarus, Republic of", "Belarus"),
    ("Brunei Darussalam", "Brunei"),
    ("Congo, Democratic Republic of the", "Democratic Republic of the Congo"),
    ("Congo, Rep.", "Republic of the Congo"),
    ("Côte d'Ivoire", "Ivory Coast"),
    ("Croatia, Republic of", "Croatia"),
    ("Egypt, Arab Rep.", "Egypt"),
    ("Egypt, Arab Republic of", "Egypt"),
    ("Equatorial Guinea, Republic of", "Equatorial Guinea"),
    ("Estonia, Republic of", "Estonia"),
    ("Ethiopia, The Federal Democratic Republic of", "Ethiopia"),
    ("Falkland Islands (Malvinas)", "Falkland Islands"),
    ("Gambia, The", "Gambia"),
    ("Iran, Islamic Rep. of", "Iran"),
    ("Iran, Islamic Republic of", "Iran"),
    ("Kazakhstan, Republic of", "Kazakhstan"),
    ("Korea, Democratic People's Republic of", "North Korea"),
    ("Korea, Republic of", "South Korea"),
    ("Kosovo, Republic of", "Kosovo"),
    ("Kyrgyz Republic", "Kyrgyzstan"),
    ("Lao PDR", "Laos"),
    ("Lao People's Democratic Republic", "Laos"),
    ("Latvia, Republic of", "Latvia"),
    ("Lesotho, Kingdom of", "Lesotho"),
    ("Lithuania, Republic of", "Lithuania"),
    ("Madagascar, Republic of", "Madagascar"),
    ("Mauritania, Islamic Republic of", "Mauritania"),
    ("Moldova, Republic of", "Moldova"),
    ("Mozambique, Republic of", "Mozambique"),
    ("Netherlands, The", "Netherlands"),
    ("North Macedonia, Republic of", "Macedonia"),
    ("Poland, Republic of", "Poland"),
    ("Russian Federation", "Russia"),
    ("Serbia, Republic of", "Republic of Serbia"),
    ("Slovak Republic", "Slovakia"),
    ("Slovenia, Republic of", "Slovenia"),
    ("South Sudan, Republic of", "South Sudan"),
    ("Eswatini, Kingdom of", "Swaziland"),
    ("Syrian Arab Republic", "Syria"),
    ("Taiwan Province of China", "Taiwan"),
    ("Taiwan, China", "Taiwan"),
    ("Tajikistan, Republic of", "Tajikistan"),
    ("Tanzania, United Republic of", "United Republic of Tanzania"),
    ("Timor-Leste, Dem. Rep. of", "East Timor"),
    ("Timor-Leste, Democratic Republic of", "East Timor"),
    ("Türkiye, Republic of", "Turkey"),
    ("United States", "United States of America"),
    ("Uzbekistan, Republic of", "Uzbekistan"),
    ("Venezuela, Rep. Bolivariana de", "Venezuela"),
    ("Viet Nam", "Vietnam"),
    ("West Bank and Gaza", "West Bank"),
    ("Yemen, Rep. of", "Yemen"),
    ("Yemen, Republic of", "Yemen"),
];

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Continent {
    Asia,
    Europe,
    Africa,
    NorthAmerica,
    SouthAmerica,
    Oceania,
    Unknown,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::Asia,
        Continent::Europe,
        Continent::Africa,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Oceania,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Continent::Asia => "AS",
            Continent::Europe => "EU",
            Continent::Africa => "AF",
            Continent::NorthAmerica => "NA",
            Continent::SouthAmerica => "SA",
            Continent::Oceania => "OC",
            Continent::Unknown => "Unknown",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::Africa => "Africa",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
            Continent::Unknown => "Unknown",
        }
    }
}

/// Accepts a code ("EU") or a name ("Europe").
impl FromStr for Continent {
    type Err = DominanceErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Continent::ALL
            .iter()
            .find(|c| {
                c.code().eq_ignore_ascii_case(needle) || c.name().eq_ignore_ascii_case(needle)
            })
            .copied()
            .ok_or_else(|| DominanceErrors::UnknownContinent(needle.to_string()))
    }
}

use Continent::*;

/// Boundary-file name -> continent. Some entries keep the trade-source
/// spelling because no reconciliation exists for them.
pub const COUNTRY_CONTINENTS: &[(&str, Continent)] = &[
    ("Afghanistan", Asia),
    ("Bahrain, Kingdom of", Asia),
    ("Bangladesh", Asia),
    ("Bhutan", Asia),
    ("Brunei", Asia),
    ("Cambodia", Asia),
    ("China", Asia),
    ("Cyprus", Asia),
    ("Georgia", Asia),
    ("India", Asia),
    ("Indonesia", Asia),
    ("Iran", Asia),
    ("Iraq", Asia),
    ("Israel", Asia),
    ("Japan", Asia),
    ("Jordan", Asia),
    ("Kazakhstan", Asia),
    ("North Korea", Asia),
    ("South Korea", Asia),
    ("Kuwait", Asia),
    ("Kyrgyzstan", Asia),
    ("Laos", Asia),
    ("Lebanon", Asia),
    ("Malaysia", Asia),
    ("Maldives", Asia),
    ("Mongolia", Asia),
    ("Myanmar", Asia),
    ("Nepal", Asia),
    ("Oman", Asia),
    ("Pakistan", Asia),
    ("Philippines", Asia),
    ("Qatar", Asia),
    ("Saudi Arabia", Asia),
    ("Singapore", Asia),
    ("Sri Lanka", Asia),
    ("Syria", Asia),
    ("Taiwan", Asia),
    ("Tajikistan", Asia),
    ("Thailand", Asia),
    ("East Timor", Asia),
    ("Turkey", Asia),
    ("Turkmenistan", Asia),
    ("United Arab Emirates", Asia),
    ("Uzbekistan", Asia),
    ("Vietnam", Asia),
    ("Yemen", Asia),
    ("West Bank", Asia),
    ("Albania", Europe),
    ("Armenia", Europe),
    ("Austria", Europe),
    ("Azerbaijan", Europe),
    ("Belarus", Europe),
    ("Belgium", Europe),
    ("Bosnia and Herzegovina", Europe),
    ("Bulgaria", Europe),
    ("Croatia", Europe),
    ("Czech Republic", Europe),
    ("Denmark", Europe),
    ("Estonia", Europe),
    ("Faroe Islands", Europe),
    ("Finland", Europe),
    ("France", Europe),
    ("Germany", Europe),
    ("Gibraltar", Europe),
    ("Greece", Europe),
    ("Hungary", Europe),
    ("Iceland", Europe),
    ("Ireland", Europe),
    ("Italy", Europe),
    ("Kosovo", Europe),
    ("Latvia", Europe),
    ("Lithuania", Europe),
    ("Luxembourg", Europe),
    ("Malta", Europe),
    ("Moldova", Europe),
    ("Montenegro", Europe),
    ("Netherlands", Europe),
    ("Macedonia", Europe),
    ("Norway", Europe),
    ("Poland", Europe),
    ("Portugal", Europe),
    ("Romania", Europe),
    ("Russia", Europe),
    ("San Marino, Republic of", Europe),
    ("Republic of Serbia", Europe),
    ("Slovakia", Europe),
    ("Slovenia", Europe),
    ("Spain", Europe),
    ("Sweden", Europe),
    ("Switzerland", Europe),
    ("Ukraine", Europe),
    ("United Kingdom", Europe),
    ("Holy See", Europe),
    ("Algeria", Africa),
    ("Angola", Africa),
    ("Benin", Africa),
    ("Botswana", Africa),
    ("Burkina Faso", Africa),
    ("Burundi", Africa),
    ("Cabo Verde", Africa),
    ("Cameroon", Africa),
    ("Central African Republic", Africa),
    ("Chad", Africa),
    ("Comoros, Union of the", Africa),
    ("Democratic Republic of the Congo", Africa),
    ("Republic of the Congo", Africa),
    ("Ivory Coast", Africa),
    ("Djibouti", Africa),
    ("Egypt", Africa),
    ("Equatorial Guinea", Africa),
    ("Eritrea", Africa),
    ("Swaziland", Africa),
    ("Ethiopia", Africa),
    ("Gabon", Africa),
    ("Gambia", Africa),
    ("Ghana", Africa),
    ("Guinea", Africa),
    ("Guinea-Bissau", Africa),
    ("Kenya", Africa),
    ("Lesotho", Africa),
    ("Liberia", Africa),
    ("Libya", Africa),
    ("Madagascar", Africa),
    ("Malawi", Africa),
    ("Mali", Africa),
    ("Mauritania", Africa),
    ("Mauritius", Africa),
    ("Morocco", Africa),
    ("Mozambique", Africa),
    ("Namibia", Africa),
    ("Niger", Africa),
    ("Nigeria", Africa),
    ("Rwanda", Africa),
    ("São Tomé and Príncipe, Democratic Republic of", Africa),
    ("Senegal", Africa),
    ("Seychelles", Africa),
    ("Sierra Leone", Africa),
    ("Somalia", Africa),
    ("South Africa", Africa),
    ("South Sudan", Africa),
    ("Sudan", Africa),
    ("United Republic of Tanzania", Africa),
    ("Togo", Africa),
    ("Tunisia", Africa),
    ("Uganda", Africa),
    ("Zambia", Africa),
    ("Zimbabwe", Africa),
    ("Western Sahara", Africa),
    ("Antigua and Barbuda", NorthAmerica),
    ("The Bahamas", NorthAmerica),
    ("Barbados", NorthAmerica),
    ("Belize", NorthAmerica),
    ("Canada", NorthAmerica),
    ("Costa Rica", NorthAmerica),
    ("Cuba", NorthAmerica),
    ("Dominica", NorthAmerica),
    ("Dominican Republic", NorthAmerica),
    ("El Salvador", NorthAmerica),
    ("Greenland", NorthAmerica),
    ("Grenada", NorthAmerica),
    ("Guatemala", NorthAmerica),
    ("Haiti", NorthAmerica),
    ("Honduras", NorthAmerica),
    ("Jamaica", NorthAmerica),
    ("Mexico", NorthAmerica),
    ("Nicaragua", NorthAmerica),
    ("Panama", NorthAmerica),
    ("St. Kitts and Nevis", NorthAmerica),
    ("St. Lucia", NorthAmerica),
    ("St. Vincent and the Grenadines", NorthAmerica),
    ("Trinidad and Tobago", NorthAmerica),
    ("United States of America", NorthAmerica),
    ("Argentina", SouthAmerica),
    ("Bolivia", SouthAmerica),
    ("Brazil", SouthAmerica),
    ("Chile", SouthAmerica),
    ("Colombia", SouthAmerica),
    ("Ecuador", SouthAmerica),
    ("Guyana", SouthAmerica),
    ("Paraguay", SouthAmerica),
    ("Peru", SouthAmerica),
    ("Suriname", SouthAmerica),
    ("Uruguay", SouthAmerica),
    ("Venezuela", SouthAmerica),
    ("Falkland Islands", SouthAmerica),
    ("Australia", Oceania),
    ("Fiji", Oceania),
    ("Kiribati", Oceania),
    ("Marshall Islands, Republic of the", Oceania),
    ("Micronesia, Fed. Sts. of", Oceania),
    ("Nauru, Republic of", Oceania),
    ("New Caledonia", Oceania),
    ("New Zealand", Oceania),
    ("Palau, Republic of", Oceania),
    ("Papua New Guinea", Oceania),
    ("Samoa", Oceania),
    ("Solomon Islands", Oceania),
    ("Tonga", Oceania),
    ("Tuvalu", Oceania),
    ("Vanuatu", Oceania),
];

/// Renames partners into the boundary-file vocabulary. Names without an entry
/// pass through unchanged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NameTable {
    mapping: HashMap<String, String>,
}

impl NameTable {
    pub fn new() -> NameTable {
        NameTable {
            mapping: HashMap::new(),
        }
    }

    /// Entries added later override earlier ones.
    pub fn with_entries<'a, I>(self, entries: I) -> NameTable
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut mapping = self.mapping;
        for (raw, canonical) in entries {
            mapping.insert(raw.to_string(), canonical.to_string());
        }
        NameTable { mapping }
    }

    pub fn reconcile<'a>(&'a self, name: &'a str) -> &'a str {
        match self.mapping.get(name) {
            Some(canonical) => canonical.as_str(),
            None => name,
        }
    }

    /// The set of canonical names this table can produce.
    pub fn canonical_names(&self) -> BTreeSet<&str> {
        self.mapping.values().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        NameTable::new().with_entries(NAME_RECONCILIATION.iter().copied())
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContinentTable {
    mapping: HashMap<String, Continent>,
}

impl ContinentTable {
    pub fn from_entries<'a, I>(entries: I) -> ContinentTable
    where
        I: IntoIterator<Item = (&'a str, Continent)>,
    {
        ContinentTable {
            mapping: entries
                .into_iter()
                .map(|(name, c)| (name.to_string(), c))
                .collect(),
        }
    }

    /// Exact-string lookup, `Unknown` on a miss.
    pub fn lookup(&self, name: &str) -> Continent {
        match self.mapping.get(name) {
            Some(c) => *c,
            None => {
                debug!("lookup: no continent for {:?}", name);
                Continent::Unknown
            }
        }
    }
}

impl Default for ContinentTable {
    fn default() -> Self {
        ContinentTable::from_entries(COUNTRY_CONTINENTS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn reconcile_known_and_unknown_names() {
        let names = NameTable::default();
        assert_eq!(names.reconcile("Viet Nam"), "Vietnam");
        assert_eq!(names.reconcile("United States"), "United States of America");
        assert_eq!(names.reconcile("Germany"), "Germany");
        assert_eq!(names.reconcile(""), "");
    }

    #[test]
    fn overrides_replace_defaults() {
        let names = NameTable::default().with_entries([("Viet Nam", "Viet Nam")]);
        assert_eq!(names.reconcile("Viet Nam"), "Viet Nam");
        assert_eq!(names.len(), NAME_RECONCILIATION.len());
    }

    #[test]
    fn reconciliation_keys_are_unique() {
        let keys: HashSet<&str> = NAME_RECONCILIATION.iter().map(|p| p.0).collect();
        assert_eq!(keys.len(), NAME_RECONCILIATION.len());
    }

    #[test]
    fn continent_keys_are_unique() {
        let keys: HashSet<&str> = COUNTRY_CONTINENTS.iter().map(|p| p.0).collect();
        assert_eq!(keys.len(), COUNTRY_CONTINENTS.len());
    }

    #[test]
    fn every_canonical_name_is_classified() {
        let names = NameTable::default();
        let continents = ContinentTable::default();
        for canonical in names.canonical_names() {
            assert_ne!(
                continents.lookup(canonical),
                Continent::Unknown,
                "{} has no continent",
                canonical
            );
        }
    }

    #[test]
    fn continent_lookup_defaults_to_unknown() {
        let continents = ContinentTable::default();
        assert_eq!(continents.lookup("Germany"), Continent::Europe);
        assert_eq!(continents.lookup("Atlantis"), Continent::Unknown);
        assert_eq!(Continent::Unknown.code(), "Unknown");
    }

    #[test]
    fn continent_parsing() {
        assert_eq!("EU".parse::<Continent>(), Ok(Continent::Europe));
        assert_eq!("north america".parse::<Continent>(), Ok(Continent::NorthAmerica));
        assert!("Antarctica".parse::<Continent>().is_err());
    }
}
