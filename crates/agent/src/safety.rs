//! Output safety filter
//!
//! Replaces the whole response with a fixed apology when it contains any
//! undesired phrase. Matching is case-insensitive substring search, so
//! "terror" trips the "error" phrase.

use sonocare_config::SafetyConfig;

/// Output safety filter
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    enabled: bool,
    /// Lower-cased phrases
    phrases: Vec<String>,
    apology: String,
}

impl SafetyFilter {
    pub fn new(config: &SafetyConfig) -> Self {
        Self {
            enabled: config.enabled,
            phrases: config
                .undesired_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            apology: config.apology.clone(),
        }
    }

    /// First undesired phrase found in `output`
    pub fn find_violation(&self, output: &str) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        let lowered = output.to_lowercase();
        self.phrases
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }

    /// Return `output` unchanged, or the apology if it trips the filter
    pub fn check(&self, output: String) -> String {
        match self.find_violation(&output) {
            Some(phrase) => {
                tracing::info!(phrase, "Response replaced by safety filter");
                self.apology.clone()
            }
            None => output,
        }
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new(&SafetyConfig::default())
    }
}

/// Apply the default filter
pub fn check_output_for_safety(output: &str) -> String {
    SafetyFilter::default().check(output.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonocare_config::constants::texts::SAFETY_APOLOGY;

    #[test]
    fn test_clean_output_passes() {
        let text = "Drink several glasses of water before the scan.";
        assert_eq!(check_output_for_safety(text), text);
    }

    #[test]
    fn test_each_phrase_any_case() {
        for text in [
            "An ERROR happened",
            "I am sorry, I can't",
            "I cannot provide that",
            "That is an Invalid Date",
            "the terror of waiting",
        ] {
            assert_eq!(check_output_for_safety(text), SAFETY_APOLOGY, "{}", text);
        }
    }

    #[test]
    fn test_apology_is_stable() {
        assert_eq!(check_output_for_safety(SAFETY_APOLOGY), SAFETY_APOLOGY);
    }

    #[test]
    fn test_disabled_filter() {
        let filter = SafetyFilter::new(&SafetyConfig {
            enabled: false,
            ..SafetyConfig::default()
        });
        assert_eq!(filter.check("error".to_string()), "error");
        assert!(filter.find_violation("error").is_none());
    }

    #[test]
    fn test_custom_phrases() {
        let filter = SafetyFilter::new(&SafetyConfig {
            enabled: true,
            undesired_phrases: vec!["Diagnosis".to_string(), String::new()],
            apology: "Please consult your doctor.".to_string(),
        });
        assert_eq!(filter.find_violation("my DIAGNOSIS is"), Some("diagnosis"));
        assert_eq!(filter.check("an error".to_string()), "an error");
        assert_eq!(filter.check("diagnosis".to_string()), "Please consult your doctor.");
    }
}
