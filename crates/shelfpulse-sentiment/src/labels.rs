use serde::{Deserialize, Serialize};

/// Five-step label for a product or category mean polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    #[serde(rename = "Negative")]
    Negative,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Positive")]
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl SentimentLabel {
    #[must_use]
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.3 {
            SentimentLabel::VeryPositive
        } else if polarity > 0.1 {
            SentimentLabel::Positive
        } else if polarity > -0.1 {
            SentimentLabel::Neutral
        } else if polarity > -0.3 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::VeryNegative
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "Very Negative",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::VeryPositive => "Very Positive",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-review bucket used for counts and samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Negative,
}

impl SentimentBucket {
    #[must_use]
    pub fn classify(polarity: f64) -> Self {
        if polarity > 0.1 {
            SentimentBucket::Positive
        } else if polarity < -0.1 {
            SentimentBucket::Negative
        } else {
            SentimentBucket::Neutral
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentBucket::Positive => "positive",
            SentimentBucket::Neutral => "neutral",
            SentimentBucket::Negative => "negative",
        }
    }
}

impl std::fmt::Display for SentimentBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds() {
        assert_eq!(SentimentLabel::from_polarity(0.31), SentimentLabel::VeryPositive);
        assert_eq!(SentimentLabel::from_polarity(0.3), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.1), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_polarity(-0.3), SentimentLabel::VeryNegative);
    }

    #[test]
    fn label_is_monotonic_in_polarity() {
        let steps: Vec<f64> = (-120..=120).map(|i| f64::from(i) / 100.0).collect();
        for pair in steps.windows(2) {
            let lower = SentimentLabel::from_polarity(pair[0]);
            let higher = SentimentLabel::from_polarity(pair[1]);
            assert!(lower <= higher, "{} -> {lower}, {} -> {higher}", pair[0], pair[1]);
        }
    }

    #[test]
    fn bucket_thresholds() {
        assert_eq!(SentimentBucket::classify(0.11), SentimentBucket::Positive);
        assert_eq!(SentimentBucket::classify(0.1), SentimentBucket::Neutral);
        assert_eq!(SentimentBucket::classify(-0.1), SentimentBucket::Neutral);
        assert_eq!(SentimentBucket::classify(-0.11), SentimentBucket::Negative);
    }

    #[test]
    fn label_serializes_as_display_text() {
        let json = serde_json::to_string(&SentimentLabel::VeryPositive).unwrap();
        assert_eq!(json, "\"Very Positive\"");
    }
}
