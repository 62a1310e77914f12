use rand::Rng;
use serde::{Deserialize, Serialize};

/// The visual variant a word is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Normal,
    Bold,
    Strikethrough,
    Uppercase,
    Italic,
}

/// A word and the style it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub style: TextStyle,
}

impl WordToken {
    /// Builds the token, folding the word to upper case when the style is `Uppercase`.
    pub fn new(word: &str, style: TextStyle) -> WordToken {
        let text = match style {
            TextStyle::Uppercase => word.to_uppercase(),
            _ => word.to_string(),
        };
        WordToken { text, style }
    }
}

/// The ordered table of style probabilities.
///
/// Entries are visited in order and the first whose cumulative probability reaches the draw wins,
/// so the order decides which style is picked when boundaries coincide. The probabilities do not
/// need to sum to one, draws beyond the last boundary fall back to `Normal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleProbabilities(Vec<(TextStyle, f64)>);

impl Default for StyleProbabilities {
    fn default() -> Self {
        StyleProbabilities(vec![
            (TextStyle::Normal, 0.92),
            (TextStyle::Bold, 0.02),
            (TextStyle::Strikethrough, 0.0),
            (TextStyle::Uppercase, 0.03),
            (TextStyle::Italic, 0.02),
        ])
    }
}

impl StyleProbabilities {
    pub fn new(entries: Vec<(TextStyle, f64)>) -> StyleProbabilities {
        StyleProbabilities(entries)
    }

    pub fn entries(&self) -> &[(TextStyle, f64)] {
        &self.0
    }

    pub fn sampler(&self) -> StyleSampler {
        let mut cumulative_probability = 0.0;
        let upper_bounds = self
            .0
            .iter()
            .map(|&(style, probability)| {
                cumulative_probability += probability;
                (cumulative_probability, style)
            })
            .collect();

        StyleSampler { upper_bounds }
    }
}

/// Discrete sampler over the cumulative boundaries of a `StyleProbabilities` table.
#[derive(Debug, Clone)]
pub struct StyleSampler {
    upper_bounds: Vec<(f64, TextStyle)>,
}

impl StyleSampler {
    /// The style selected by a draw in `[0, 1)`.
    pub fn select(&self, draw: f64) -> TextStyle {
        self.upper_bounds
            .iter()
            .find(|(upper_bound, _)| draw <= *upper_bound)
            .map(|&(_, style)| style)
            .unwrap_or(TextStyle::Normal)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TextStyle {
        self.select(rng.gen::<f64>())
    }

    /// Draws a style for the word and builds its token.
    pub fn assign<R: Rng + ?Sized>(&self, word: &str, rng: &mut R) -> WordToken {
        WordToken::new(word, self.sample(rng))
    }
}
