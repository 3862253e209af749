/// Topics the advisor will answer about. Anything that matches none of these
/// is turned away before a completion request is made.
const DEFAULT_KEYWORDS: &[&str] = &[
    "farm", "crop", "harvest", "soil", "fertilizer", "pesticide", "irrigation",
    "weather", "climate", "temperature", "humidity", "rain", "drought", "flood",
    "plant", "seed", "agriculture", "farming", "farmer", "field", "land", "cultivate",
    "grow", "sow", "reap", "yield", "organic", "inorganic", "manure", "compost",
    "tractor", "plow", "sickle", "agricultural", "agronomy", "horticulture", "livestock",
    "cattle", "poultry", "aquaculture", "greenhouse", "hydroponics", "aeroponics",
    "weed", "pest", "disease", "insect", "fungus", "bacteria", "virus", "pathogen",
    "herbicide", "insecticide", "fungicide", "bactericide", "virucide",
    "organic farming", "sustainable farming", "precision farming", "smart farming",
    "climate change", "global warming", "environment", "ecology", "biodiversity",
    "conservation", "preservation", "protection", "restoration", "rehabilitation",
    "deforestation", "afforestation", "reforestation", "agroforestry", "silviculture",
    "agroecology", "permaculture", "biodynamic farming", "regenerative agriculture",
];

#[derive(Debug, Clone)]
pub struct KeywordGate {
    keywords: Vec<String>,
}

impl Default for KeywordGate {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordGate {
    /// Built from the `ADVISOR_KEYWORDS` env var (comma-separated) when set,
    /// otherwise the built-in list.
    pub fn from_env() -> Self {
        match std::env::var("ADVISOR_KEYWORDS") {
            Ok(raw) => Self::from_list(&raw),
            Err(_) => Self::default(),
        }
    }

    pub fn from_list(raw: &str) -> Self {
        let keywords: Vec<String> = raw
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            Self::default()
        } else {
            Self { keywords }
        }
    }

    /// Case-insensitive substring match against any configured keyword.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.keywords.iter().any(|k| query.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_farming_queries() {
        let gate = KeywordGate::default();
        assert!(gate.matches("Is tomorrow good for planting my crop?"));
        assert!(gate.matches("Should I water the GREENHOUSE today?"));
        assert!(gate.matches("how is the weather"));
    }

    #[test]
    fn rejects_off_topic_queries() {
        let gate = KeywordGate::default();
        assert!(!gate.matches("what time is it"));
        assert!(!gate.matches("tell me a joke"));
    }

    #[test]
    fn custom_list_replaces_defaults() {
        let gate = KeywordGate::from_list("vineyard, orchard");
        assert!(gate.matches("when should I prune the Vineyard?"));
        assert!(!gate.matches("is the weather good"));
    }

    #[test]
    fn blank_custom_list_falls_back_to_defaults() {
        let gate = KeywordGate::from_list(" , ");
        assert!(gate.matches("soil moisture"));
    }
}
