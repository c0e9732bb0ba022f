//! Brand profile — who the content is written for and how it should sound.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Tone of voice the brand writes in. Drives wording in every stage prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneOfVoice {
    #[default]
    Professional,
    Friendly,
    Technical,
    Casual,
    Formal,
    Innovative,
    Authoritative,
}

impl ToneOfVoice {
    pub const ALL: [ToneOfVoice; 7] = [
        ToneOfVoice::Professional,
        ToneOfVoice::Friendly,
        ToneOfVoice::Technical,
        ToneOfVoice::Casual,
        ToneOfVoice::Formal,
        ToneOfVoice::Innovative,
        ToneOfVoice::Authoritative,
    ];

    /// Human-readable label used inside prompts.
    pub fn label(self) -> &'static str {
        match self {
            ToneOfVoice::Professional => "Professional",
            ToneOfVoice::Friendly => "Friendly",
            ToneOfVoice::Technical => "Technical",
            ToneOfVoice::Casual => "Casual",
            ToneOfVoice::Formal => "Formal",
            ToneOfVoice::Innovative => "Innovative",
            ToneOfVoice::Authoritative => "Authoritative",
        }
    }
}

impl fmt::Display for ToneOfVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable for the duration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub name: String,
    pub site_url: String,
    #[serde(default)]
    pub tone_of_voice: ToneOfVoice,
    pub about_us: String,
}

impl BrandProfile {
    /// Every text field is mandatory; a run never starts with a partial profile.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("site_url", &self.site_url),
            ("about_us", &self.about_us),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "brand fields cannot be empty: {}",
                missing.join(", ")
            )))
        }
    }
}
