use serde::{Deserialize, Serialize};

/// Scores strictly above this value are classified as [`Label::Dog`].
pub const DOG_THRESHOLD: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Cat,
    Dog,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "Cat",
            Label::Dog => "Dog",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The predicted class together with the probability of that class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub label: Label,
    pub confidence: f32,
}

impl Classification {
    /// Maps P(dog) to a label; confidence always refers to the chosen label.
    pub fn from_score(score: f32) -> Self {
        if score > DOG_THRESHOLD {
            Self {
                label: Label::Dog,
                confidence: score,
            }
        } else {
            Self {
                label: Label::Cat,
                confidence: 1.0 - score,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_scores_are_dogs() {
        let c = Classification::from_score(0.75);
        assert_eq!(c.label, Label::Dog);
        assert_eq!(c.confidence, 0.75);
    }

    #[test]
    fn low_scores_are_cats_with_inverted_confidence() {
        let c = Classification::from_score(0.25);
        assert_eq!(c.label, Label::Cat);
        assert_eq!(c.confidence, 0.75);
    }

    #[test]
    fn exactly_half_is_a_cat() {
        let c = Classification::from_score(0.5);
        assert_eq!(c.label, Label::Cat);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn extremes() {
        assert_eq!(
            Classification::from_score(1.0),
            Classification {
                label: Label::Dog,
                confidence: 1.0
            }
        );
        assert_eq!(
            Classification::from_score(0.0),
            Classification {
                label: Label::Cat,
                confidence: 1.0
            }
        );
    }

    #[test]
    fn confidence_never_drops_below_half() {
        for i in 0..=1000 {
            let c = Classification::from_score(i as f32 / 1000.0);
            assert!((0.5..=1.0).contains(&c.confidence), "score {i}/1000");
        }
    }

    #[test]
    fn labels_serialize_capitalized() {
        assert_eq!(serde_json::to_string(&Label::Cat).unwrap(), "\"Cat\"");
        assert_eq!(serde_json::to_string(&Label::Dog).unwrap(), "\"Dog\"");
        assert_eq!(Label::Dog.to_string(), "Dog");
    }
}
