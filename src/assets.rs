//! Presentational images
//!
//! Each UI moment maps to one image reference (a URL Telegram can fetch).

use crate::model::DailyReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    /// Greeting and the default report image
    Morning,
    /// Woke up on time and did pull-ups
    Turnik,
    /// Woke up, did pull-ups and homework
    Victory,
    Stats,
    /// Shown with the report questionnaire
    Study,
}

impl Asset {
    /// Image for a freshly submitted report.
    ///
    /// Victory is checked first, so Turnik only shows when homework was skipped.
    pub fn for_report(report: &DailyReport) -> Self {
        let morning_workout = report.woke_up_630 && report.did_turnik();
        if morning_workout && report.homework_done {
            Self::Victory
        } else if morning_workout {
            Self::Turnik
        } else {
            Self::Morning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Turnik => "turnik",
            Self::Victory => "victory",
            Self::Stats => "stats",
            Self::Study => "study",
        }
    }
}

/// Image references, configurable per deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrls {
    pub morning: String,
    pub turnik: String,
    pub victory: String,
    pub stats: String,
    pub study: String,
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self {
            morning: "https://ibb.co/JWSjnwyF".to_string(),
            turnik: "https://ibb.co/wNJJk0B6".to_string(),
            victory: "https://ibb.co/j9fXftGX".to_string(),
            stats: "https://ibb.co/zTqnRSNm".to_string(),
            study: "https://ibb.co/FbhTWYxs".to_string(),
        }
    }
}

impl AssetUrls {
    /// Defaults overridden by `IMAGE_<NAME>` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pick = |var: &str, default: String| std::env::var(var).ok().filter(|v| !v.trim().is_empty()).unwrap_or(default);

        Self {
            morning: pick("IMAGE_MORNING", defaults.morning),
            turnik: pick("IMAGE_TURNIK", defaults.turnik),
            victory: pick("IMAGE_VICTORY", defaults.victory),
            stats: pick("IMAGE_STATS", defaults.stats),
            study: pick("IMAGE_STUDY", defaults.study),
        }
    }

    pub fn url(&self, asset: Asset) -> &str {
        match asset {
            Asset::Morning => &self.morning,
            Asset::Turnik => &self.turnik,
            Asset::Victory => &self.victory,
            Asset::Stats => &self.stats,
            Asset::Study => &self.study,
        }
    }
}
