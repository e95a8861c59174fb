/// Phrases the quiz platform and the rendered documents use for one locale.
///
/// Extractors, the renderer and the flattened-text reader all take their
/// literals from here so a document rendered in one locale can be read back
/// with the same vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    /// Question sentinel without the trailing colon; rendered as "Question N:".
    pub question_label: &'static str,
    pub answers_sentinel: &'static str,
    pub correct_sentinel: &'static str,
    pub unidentified_marker: &'static str,
    pub correct_answer_trigger: &'static str,
    pub affirming_phrases: &'static [&'static str],
    pub boilerplate_phrases: &'static [&'static str],
    pub identified_title: &'static str,
    pub unidentified_title: &'static str,
}

pub const ENGLISH: Vocabulary = Vocabulary {
    question_label: "Question",
    answers_sentinel: "Available answers:",
    correct_sentinel: "Correct answer:",
    unidentified_marker: "(could not be identified or absent)",
    correct_answer_trigger: "The correct answer is:",
    affirming_phrases: &["Your answer is correct.", "Correct answer."],
    boilerplate_phrases: &[
        "Your answer is correct.",
        "Partially correct.",
        "Correct answers.",
        "Correct answer.",
        "Incorrect.",
        "Selected.",
        "Marked.",
    ],
    identified_title: "Quiz: Questions with Correct Answers",
    unidentified_title: "Quiz: Questions Without Identified Answers",
};

pub const POLISH: Vocabulary = Vocabulary {
    question_label: "Pytanie",
    answers_sentinel: "Dostępne odpowiedzi:",
    correct_sentinel: "Poprawna odpowiedź:",
    unidentified_marker: "(nie udało się zidentyfikować lub brak)",
    correct_answer_trigger: "Poprawna odpowiedź to:",
    affirming_phrases: &["Twoja odpowiedź jest poprawna.", "Prawidłowa odpowiedź."],
    boilerplate_phrases: &[
        "Twoja odpowiedź jest poprawna.",
        "Prawidłowe odpowiedzi.",
        "Prawidłowa odpowiedź.",
        "Częściowo poprawna.",
        "Oznaczone.",
        "Wybrano.",
        "Błędna.",
    ],
    identified_title: "Quiz: Pytania z Poprawnymi Odpowiedziami",
    unidentified_title: "Quiz: Pytania Bez Zidentyfikowanych Odpowiedzi",
};

impl Vocabulary {
    pub fn question_header(&self, number: usize) -> String {
        format!("{} {}:", self.question_label, number)
    }

    pub fn title_for(&self, identified: bool) -> &'static str {
        if identified {
            self.identified_title
        } else {
            self.unidentified_title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boilerplate_lists_put_longer_overlapping_phrases_first() {
        for vocabulary in [ENGLISH, POLISH] {
            for (index, phrase) in vocabulary.boilerplate_phrases.iter().enumerate() {
                for later in &vocabulary.boilerplate_phrases[index + 1..] {
                    assert!(
                        !later.to_lowercase().contains(&phrase.to_lowercase()),
                        "{later} shadows {phrase}"
                    );
                }
            }
        }
    }

    #[test]
    fn question_header_is_numbered() {
        assert_eq!(ENGLISH.question_header(3), "Question 3:");
        assert_eq!(POLISH.question_header(1), "Pytanie 1:");
    }
}
