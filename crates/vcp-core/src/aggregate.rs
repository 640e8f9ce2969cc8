//! Per-target error aggregation for batch operations
//!
//! A batch records the outcome of every target. Failures are wrapped with the
//! target name and kept in recording order; [`ErrorAggregator::combine`] then
//! turns them into a single value for the caller to propagate.

use std::error::Error;
use std::fmt;

/// A failure of one target inside a batch, rendered as `cannot <action> <target>: <source>`
#[derive(Debug)]
pub struct TargetError<E> {
    pub action: &'static str,
    pub target: String,
    pub source: E,
}

impl<E: fmt::Display> fmt::Display for TargetError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} {}: {}", self.action, self.target, self.source)
    }
}

impl<E: Error + 'static> Error for TargetError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Combined result of a batch with at least one failed target
#[derive(Debug)]
pub enum AggregateError<E> {
    /// Exactly one target failed; its wrapped error as recorded
    Single(TargetError<E>),
    /// Several targets failed; `message` is every wrapped message joined with `|`
    Multiple {
        message: String,
        errors: Vec<TargetError<E>>,
    },
}

impl<E> AggregateError<E> {
    /// Every recorded failure, in recording order
    pub fn errors(&self) -> Vec<&TargetError<E>> {
        match self {
            AggregateError::Single(err) => vec![err],
            AggregateError::Multiple { errors, .. } => errors.iter().collect(),
        }
    }

    /// Names of the failed targets, in recording order
    pub fn targets(&self) -> Vec<&str> {
        self.errors().into_iter().map(|e| e.target.as_str()).collect()
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::Single(err) => fmt::Display::fmt(err, f),
            AggregateError::Multiple { message, .. } => f.write_str(message),
        }
    }
}

impl<E: Error + 'static> Error for AggregateError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AggregateError::Single(err) => err.source(),
            AggregateError::Multiple { .. } => None,
        }
    }
}

/// Collects `(target, error)` pairs across a sequential batch
#[derive(Debug)]
pub struct ErrorAggregator<E> {
    action: &'static str,
    errors: Vec<TargetError<E>>,
}

impl<E: fmt::Display> ErrorAggregator<E> {
    /// `action` is the verb phrase used in messages, e.g. `"add vcluster"`
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            errors: Vec::new(),
        }
    }

    /// Record the outcome for `target`; successes are ignored
    pub fn record<T>(&mut self, target: &str, result: Result<T, E>) {
        if let Err(source) = result {
            self.errors.push(TargetError {
                action: self.action,
                target: target.to_string(),
                source,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok` when nothing failed, otherwise one error describing every failure
    pub fn combine(mut self) -> Result<(), AggregateError<E>> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(AggregateError::Single(self.errors.remove(0))),
            _ => {
                let message = self
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("|");
                Err(AggregateError::Multiple {
                    message,
                    errors: self.errors,
                })
            }
        }
    }
}
