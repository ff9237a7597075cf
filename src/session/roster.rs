//! Participant types and compensation rate normalization.

use serde::{Deserialize, Serialize};

/// How a participant's compensation was entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    #[default]
    Hourly,
    Monthly,
}

impl RateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Monthly => "monthly",
        }
    }
}

/// A meeting participant. Immutable once added to the roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub name: String,
    /// Hourly-equivalent rate used for accrual.
    pub hourly_rate: f64,
    /// Rate as originally entered, kept for display.
    pub original_rate: f64,
    pub rate_kind: RateKind,
}

impl Participant {
    /// Build a participant from raw form input, normalizing monthly rates to
    /// an hourly equivalent.
    ///
    /// Returns `None` for a blank name or a non-positive/non-finite rate;
    /// rejected input is not an error anywhere in the system.
    pub fn normalized(name: &str, rate: f64, kind: RateKind, hours_per_month: f64) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || !rate.is_finite() || rate <= 0.0 {
            return None;
        }

        let hourly_rate = match kind {
            RateKind::Hourly => rate,
            RateKind::Monthly => rate / hours_per_month,
        };

        Some(Self {
            name: name.to_string(),
            hourly_rate,
            original_rate: rate,
            rate_kind: kind,
        })
    }
}
