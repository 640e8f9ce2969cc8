use colored::Colorize;
use std::io::{self, BufRead, Write};
use vcp_core::{Prompt, PromptError, QuestionOptions};

/// Asks questions on stdin/stdout
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn question(&self, options: &QuestionOptions) -> Result<String, PromptError> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        ask(options, &mut input, &mut output)
    }
}

/// Show `options` and read answers until one is valid.
///
/// An empty answer picks the default; an option can be chosen by its number
/// or its exact text.
pub(crate) fn ask<R: BufRead, W: Write>(
    options: &QuestionOptions,
    input: &mut R,
    output: &mut W,
) -> Result<String, PromptError> {
    writeln!(output, "{}", options.question.bright_white().bold())?;
    for (index, option) in options.options.iter().enumerate() {
        let marker = if *option == options.default_value {
            " (default)"
        } else {
            ""
        };
        writeln!(output, "  {}) {}{}", index + 1, option, marker.dimmed())?;
    }

    loop {
        write!(output, "{} ", ">".bright_cyan())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        let answer = line.trim();

        if answer.is_empty() {
            return Ok(options.default_value.clone());
        }
        if options.options.is_empty() {
            return Ok(answer.to_string());
        }
        if let Some(option) = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.options.get(i))
        {
            return Ok(option.clone());
        }
        if let Some(option) = options.options.iter().find(|o| o.as_str() == answer) {
            return Ok(option.clone());
        }

        writeln!(
            output,
            "{}",
            format!("Please choose 1-{} or press enter for the default.", options.options.len())
                .bright_yellow()
        )?;
    }
}
