//! Feature-scoped tweak storage shared by the providers in this crate

use std::collections::BTreeMap;

use tweaks_core::Tweak;

/// Tweaks grouped by feature, then by variable.
#[derive(Debug, Clone, Default)]
pub(crate) struct FeatureTable {
    features: BTreeMap<String, BTreeMap<String, Tweak>>,
}

/// Outcome of a lookup that may span features.
pub(crate) struct Lookup {
    pub tweak: Option<Tweak>,
    /// Features that contained the variable when the lookup named no feature.
    pub candidates: usize,
}

impl FeatureTable {
    /// Store `tweak` under `feature`, returning what it replaced.
    pub fn insert(&mut self, feature: &str, tweak: Tweak) -> Option<Tweak> {
        self.features
            .entry(feature.to_string())
            .or_default()
            .insert(tweak.identifier().to_string(), tweak)
    }

    pub fn get(&self, feature: &str, variable: &str) -> Option<&Tweak> {
        self.features.get(feature)?.get(variable)
    }

    pub fn remove(&mut self, feature: &str, variable: &str) -> Option<Tweak> {
        let variables = self.features.get_mut(feature)?;
        let removed = variables.remove(variable);
        if variables.is_empty() {
            self.features.remove(feature);
        }
        removed
    }

    pub fn clear(&mut self) -> bool {
        let had_entries = !self.features.is_empty();
        self.features.clear();
        had_entries
    }

    /// Look up a variable.
    ///
    /// An empty `feature` matches the variable in any feature; the first
    /// feature in lexicographic order wins.
    pub fn lookup(&self, feature: &str, variable: &str) -> Lookup {
        if !feature.is_empty() {
            let tweak = self.get(feature, variable).cloned();
            return Lookup {
                candidates: usize::from(tweak.is_some()),
                tweak,
            };
        }

        let mut matches = self
            .features
            .values()
            .filter_map(|variables| variables.get(variable));
        let tweak = matches.next().cloned();
        let candidates = usize::from(tweak.is_some()) + matches.count();
        Lookup { tweak, candidates }
    }

    /// Every variable identifier, sorted and without duplicates.
    pub fn variable_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self
            .features
            .values()
            .flat_map(|variables| variables.keys().cloned())
            .collect();
        identifiers.sort();
        identifiers.dedup();
        identifiers
    }

    pub fn len(&self) -> usize {
        self.features.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FeatureTable {
        let mut table = FeatureTable::default();
        table.insert("ui", Tweak::new("color").with_value("red"));
        table.insert("general", Tweak::new("color").with_value("blue"));
        table.insert("general", Tweak::new("greet").with_value(true));
        table
    }

    #[test]
    fn test_lookup_exact_feature() {
        let lookup = table().lookup("ui", "color");
        assert_eq!(lookup.tweak.unwrap().value().unwrap().as_str(), Some("red"));
        assert_eq!(lookup.candidates, 1);
    }

    #[test]
    fn test_lookup_empty_feature_takes_first_feature() {
        let lookup = table().lookup("", "color");
        assert_eq!(lookup.tweak.unwrap().value().unwrap().as_str(), Some("blue"));
        assert_eq!(lookup.candidates, 2);
    }

    #[test]
    fn test_lookup_miss() {
        let lookup = table().lookup("", "absent");
        assert!(lookup.tweak.is_none());
        assert_eq!(lookup.candidates, 0);
    }

    #[test]
    fn test_remove_drops_empty_feature() {
        let mut table = table();
        assert!(table.remove("ui", "color").is_some());
        assert!(table.remove("ui", "color").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_variable_identifiers_deduplicated() {
        assert_eq!(table().variable_identifiers(), vec!["color", "greet"]);
    }
}
