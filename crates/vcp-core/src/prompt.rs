//! Interactive question port
//!
//! The orchestration code never reads a terminal directly. It asks a
//! [`Prompt`] and compares the returned option by exact string match, so
//! tests can answer deterministically.

use crate::error::PromptError;

/// A question with an ordered list of options, one of them the default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOptions {
    pub question: String,
    pub default_value: String,
    pub options: Vec<String>,
}

impl QuestionOptions {
    pub fn new(question: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            default_value: default_value.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Blocking source of operator answers
pub trait Prompt: Send + Sync {
    /// Returns the chosen option string
    fn question(&self, options: &QuestionOptions) -> Result<String, PromptError>;
}

/// Answers every question with its default, for non-interactive runs
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAnswerPrompt;

impl Prompt for DefaultAnswerPrompt {
    fn question(&self, options: &QuestionOptions) -> Result<String, PromptError> {
        Ok(options.default_value.clone())
    }
}
