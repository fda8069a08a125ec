use crate::schema::{question_options, questions, quizzes};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizType {
    Module,
    Final,
}

impl QuizType {
    pub const ALL: [QuizType; 2] = [QuizType::Module, QuizType::Final];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuizType::Module => "module",
            QuizType::Final => "final",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizType::Module => "Module quiz",
            QuizType::Final => "Final exam",
        }
    }
}

impl FromStr for QuizType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "module" => Ok(QuizType::Module),
            "final" => Ok(QuizType::Final),
            other => Err(format!("Unknown quiz type '{}'.", other)),
        }
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::ShortAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple choice",
            QuestionType::TrueFalse => "True / False",
            QuestionType::ShortAnswer => "Short answer",
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "true_false" => Ok(QuestionType::TrueFalse),
            "short_answer" => Ok(QuestionType::ShortAnswer),
            other => Err(format!("Unknown question type '{}'.", other)),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = quizzes)]
pub struct NewQuiz {
    pub module_id: i64,
    pub title: String,
    pub description: String,
    pub quiz_type: String,
    pub pass_threshold: i32,
    pub time_limit_minutes: Option<i32>,
    pub is_active: bool,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = quizzes)]
#[diesel(treat_none_as_null = true)]
pub struct QuizChangeset {
    pub module_id: i64,
    pub title: String,
    pub description: String,
    pub quiz_type: String,
    pub pass_threshold: i32,
    pub time_limit_minutes: Option<i32>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = quizzes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Quiz {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub description: String,
    pub quiz_type: String,
    pub pass_threshold: i32,
    pub time_limit_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct QuizListRow {
    pub quiz: Quiz,
    pub module_title: String,
    pub course_id: i64,
    pub course_title: String,
    pub question_count: i64,
    pub attempt_count: i64,
    pub average_score: Option<BigDecimal>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = questions)]
pub struct NewQuestion {
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: String,
    pub points: i32,
    pub order_sequence: i32,
    pub is_active: bool,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = questions)]
pub struct QuestionChangeset {
    pub question_text: String,
    pub points: i32,
    pub order_sequence: i32,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: String,
    pub points: i32,
    pub order_sequence: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Falls back to short answer for values the CHECK constraint would reject anyway.
    pub fn kind(&self) -> QuestionType {
        self.question_type
            .parse()
            .unwrap_or(QuestionType::ShortAnswer)
    }
}

#[derive(Debug, Clone)]
pub struct QuestionListRow {
    pub question: Question,
    pub quiz_title: String,
    pub option_count: i64,
    pub correct_count: i64,
    pub answer_count: i64,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = question_options)]
pub struct NewQuestionOption {
    pub question_id: i64,
    pub option_text: String,
    pub is_correct: bool,
    pub order_sequence: i32,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = question_options)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
    pub is_correct: bool,
    pub order_sequence: i32,
}

/// Option text and correctness before it is attached to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    pub text: String,
    pub is_correct: bool,
}

/// One question as submitted by the authoring form, options included.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub points: i32,
    pub order_sequence: Option<i32>,
    pub options: Vec<OptionDraft>,
    pub true_false_answer: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_type_parses_known_values_only() {
        assert_eq!("final".parse::<QuizType>(), Ok(QuizType::Final));
        assert_eq!(" module ".parse::<QuizType>(), Ok(QuizType::Module));
        assert!("midterm".parse::<QuizType>().is_err());
    }

    #[test]
    fn question_type_matches_stored_strings() {
        for kind in QuestionType::ALL {
            assert_eq!(kind.as_str().parse::<QuestionType>(), Ok(kind));
        }
        assert!("essay".parse::<QuestionType>().is_err());
    }
}
