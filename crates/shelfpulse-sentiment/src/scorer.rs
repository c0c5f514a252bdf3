//! Lexicon polarity scorer for grocery product reviews.

/// Word weights for grocery reviews.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("excellent", 1.0),
    ("perfect", 1.0),
    ("best", 1.0),
    ("delicious", 1.0),
    ("amazing", 0.6),
    ("great", 0.8),
    ("wonderful", 1.0),
    ("awesome", 1.0),
    ("good", 0.7),
    ("nice", 0.6),
    ("happy", 0.8),
    ("tasty", 0.6),
    ("yummy", 0.6),
    ("flavorful", 0.5),
    ("love", 0.5),
    ("loves", 0.5),
    ("loved", 0.7),
    ("favorite", 0.5),
    ("recommend", 0.4),
    ("fresh", 0.3),
    ("quality", 0.3),
    ("crunchy", 0.3),
    ("crispy", 0.3),
    ("moist", 0.3),
    ("soft", 0.2),
    ("sweet", 0.35),
    ("pretty", 0.25),
    ("fine", 0.4),
    ("okay", 0.2),
    ("ok", 0.2),
    ("decent", 0.2),
    ("better", 0.5),
    ("satisfied", 0.5),
    ("worth", 0.3),
    // Negative signals
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("worst", -1.0),
    ("disgusting", -1.0),
    ("gross", -0.8),
    ("moldy", -0.8),
    ("hate", -0.8),
    ("hated", -0.8),
    ("disappointed", -0.75),
    ("bad", -0.7),
    ("disappointing", -0.6),
    ("poor", -0.6),
    ("stale", -0.6),
    ("expired", -0.6),
    ("bland", -0.5),
    ("soggy", -0.5),
    ("damaged", -0.5),
    ("overpriced", -0.5),
    ("worse", -0.5),
    ("broken", -0.4),
    ("greasy", -0.4),
    ("meh", -0.3),
    ("expensive", -0.3),
    ("salty", -0.2),
    ("average", -0.15),
];

/// Multi-word expressions scored as a unit before word matching.
const PHRASES: &[(&str, f64)] = &[
    ("not what i expected", -0.4),
    ("could be better", -0.3),
    ("waste of money", -0.8),
    ("would buy again", 0.5),
    ("highly recommend", 0.8),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "didn't", "doesn't", "isn't", "wasn't", "won't", "can't",
    "hardly",
];

const INTENSIFIERS: &[&str] = &[
    "very", "really", "so", "extremely", "super", "absolutely", "incredibly",
];

const NEGATION_FACTOR: f64 = -0.5;
const INTENSIFIER_FACTOR: f64 = 1.3;

/// Negators this many words before a sentiment word flip it.
const NEGATION_WINDOW: usize = 3;

/// Polarity of `text` in `[-1.0, 1.0]`.
///
/// Averages the weights of every matched phrase and word. A negator within
/// three words flips and halves a word's weight; an intensifier directly
/// before it scales it by 1.3. Returns `0.0` when nothing matches.
#[must_use]
pub fn polarity(text: &str) -> f64 {
    let mut lowered = text.to_lowercase().replace('\u{2019}', "'");
    let mut scores: Vec<f64> = Vec::new();

    for &(phrase, weight) in PHRASES {
        while let Some(pos) = lowered.find(phrase) {
            scores.push(weight);
            lowered.replace_range(pos..pos + phrase.len(), " ");
        }
    }

    let words: Vec<&str> = lowered
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .collect();

    for (i, word) in words.iter().enumerate() {
        let Some(&(_, weight)) = LEXICON.iter().find(|(lex, _)| lex == word) else {
            continue;
        };
        let mut score = weight;
        if i > 0 && INTENSIFIERS.contains(&words[i - 1]) {
            score *= INTENSIFIER_FACTOR;
        }
        let window_start = i.saturating_sub(NEGATION_WINDOW);
        if words[window_start..i].iter().any(|w| NEGATORS.contains(w)) {
            score *= NEGATION_FACTOR;
        }
        scores.push(score);
    }

    if scores.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(polarity(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(polarity("the quick brown fox"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = polarity("These cookies are delicious");
        assert!(score > 0.1, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = polarity("The bread was stale");
        assert!(score < -0.1, "expected negative score, got {score}");
    }

    #[test]
    fn negation_flips_sign() {
        let score = polarity("not good at all");
        assert!(score < 0.0, "expected negated score, got {score}");
    }

    #[test]
    fn intensifier_strengthens_word() {
        assert!(polarity("very fresh") > polarity("fresh"));
    }

    #[test]
    fn phrases_override_their_words() {
        let score = polarity("Not what I expected. Could be better.");
        assert!((score - -0.35).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn mixed_text_is_averaged() {
        // great (+0.8) and stale (-0.6)
        let score = polarity("great price but stale");
        assert!((score - 0.1).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn score_stays_in_range() {
        let text = "very very excellent perfect best delicious wonderful awesome";
        let score = polarity(text);
        assert!(score <= 1.0, "got {score}");
        let score = polarity("not terrible not awful never horrible");
        assert!((-1.0..=1.0).contains(&score), "got {score}");
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(polarity("great!") > 0.0);
        assert!(polarity("(awful)") < 0.0);
    }
}
