// ============================================================
// Layer 3 — Answer Domain Types
// ============================================================
// The final output of the pipeline: one Answer per question,
// kept in the order the questions arrived.
//
// An empty `answer` string is a legitimate result. It means
// no admissible span was found, or the model pointed at the
// [CLS] position ("no answer").

use serde::{Deserialize, Serialize};

/// One answered question, serialised in the response schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub question:    String,
    pub answer:      String,
}

impl Answer {
    pub fn new(
        question_id: impl Into<String>,
        question:    impl Into<String>,
        answer:      impl Into<String>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            question:    question.into(),
            answer:      answer.into(),
        }
    }
}

/// Insertion-ordered mapping from question id to Answer.
///
/// Backed by a Vec because question counts per request are small
/// and order must match the input. Inserting an id that already
/// exists replaces the value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predictions {
    answers: Vec<Answer>,
}

impl Predictions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, answer: Answer) {
        match self.answers.iter_mut().find(|a| a.question_id == answer.question_id) {
            Some(slot) => *slot = answer,
            None       => self.answers.push(answer),
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Answer text for a question id
    pub fn answer_text(&self, question_id: &str) -> Option<&str> {
        self.get(question_id).map(|a| a.answer.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Answer> {
        self.answers.iter()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn into_vec(self) -> Vec<Answer> {
        self.answers
    }
}

impl IntoIterator for Predictions {
    type Item     = Answer;
    type IntoIter = std::vec::IntoIter<Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.into_iter()
    }
}

impl<'a> IntoIterator for &'a Predictions {
    type Item     = &'a Answer;
    type IntoIter = std::slice::Iter<'a, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.iter()
    }
}
