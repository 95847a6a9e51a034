//! Callback tokens round-tripped through inline buttons.
//!
//! The symptom flow has no server-side state: `symptom:<name>` leads to the severity
//! keyboard, whose buttons carry `severity:<name>:<level>`.

use crate::records::{Severity, Symptom};

const SYMPTOM_PREFIX: &str = "symptom:";
const SEVERITY_PREFIX: &str = "severity:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackToken {
    Symptom(Symptom),
    Severity(Symptom, Severity),
}

impl CallbackToken {
    /// Parse callback data; unknown shapes and names yield `None`
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(name) = data.strip_prefix(SYMPTOM_PREFIX) {
            return Symptom::from_name(name).map(CallbackToken::Symptom);
        }

        let rest = data.strip_prefix(SEVERITY_PREFIX)?;
        let (symptom, severity) = rest.split_once(':')?;
        Some(CallbackToken::Severity(
            Symptom::from_name(symptom)?,
            Severity::from_name(severity)?,
        ))
    }

    pub fn encode(self) -> String {
        match self {
            CallbackToken::Symptom(symptom) => format!("{SYMPTOM_PREFIX}{}", symptom.name()),
            CallbackToken::Severity(symptom, severity) => {
                format!("{SEVERITY_PREFIX}{}:{}", symptom.name(), severity.name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symptom_token() {
        assert_eq!(
            CallbackToken::parse("symptom:Pain"),
            Some(CallbackToken::Symptom(Symptom::Pain))
        );
        assert_eq!(
            CallbackToken::parse("symptom:Brain fog"),
            Some(CallbackToken::Symptom(Symptom::BrainFog))
        );
    }

    #[test]
    fn test_parse_severity_token() {
        assert_eq!(
            CallbackToken::parse("severity:Pain:Bad"),
            Some(CallbackToken::Severity(Symptom::Pain, Severity::Bad))
        );
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        for data in [
            "",
            "symptom:",
            "symptom:Headache",
            "severity:Pain",
            "severity:Pain:Awful",
            "severity:Pain:Bad:extra",
            "edit_0",
        ] {
            assert_eq!(CallbackToken::parse(data), None, "{data:?} should not parse");
        }
    }

    #[test]
    fn test_tokens_fit_telegram_limit() {
        for symptom in Symptom::ALL {
            for severity in Severity::ALL {
                assert!(CallbackToken::Severity(symptom, severity).encode().len() <= 64);
            }
        }
    }
}
