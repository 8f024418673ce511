//! Where clarification answers come from: `--answer` presets, an
//! interactive prompt, or nowhere (the session suspends).

use anyhow::Context;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use goalkit_core::clarify::{parse_answer_arg, Answer, ClarificationQuestion};
use goalkit_core::resolution::{AnswerSource, NoAnswers, PresetAnswers};

pub fn source(presets: &[String], no_input: bool) -> anyhow::Result<Box<dyn AnswerSource>> {
    if !presets.is_empty() {
        let parsed = presets
            .iter()
            .map(|a| parse_answer_arg(a))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid --answer")?;
        return Ok(Box::new(PresetAnswers::new(parsed)));
    }
    if no_input || !console::user_attended_stderr() {
        return Ok(Box::new(NoAnswers));
    }
    Ok(Box::new(PromptAnswers))
}

/// Asks each question on stderr. Aborting any prompt suspends the session.
struct PromptAnswers;

impl PromptAnswers {
    fn ask(term: &Term, question: &ClarificationQuestion) -> Option<Answer> {
        let theme = ColorfulTheme::default();
        eprintln!(
            "\n{} {}",
            style(&question.id).cyan().bold(),
            style(&question.question).bold()
        );
        let mut items: Vec<String> = question
            .options
            .iter()
            .map(|o| format!("{}: {} ({})", o.label, o.answer, o.implications))
            .collect();
        items.push("Custom answer".to_string());

        let choice = Select::with_theme(&theme)
            .with_prompt(question.topic.clone())
            .items(&items)
            .default(0)
            .interact_on_opt(term)
            .ok()??;
        if let Some(option) = question.options.get(choice) {
            return Some(Answer::Option(option.label.clone()));
        }
        let text: String = Input::with_theme(&theme)
            .with_prompt("Your answer")
            .interact_text_on(term)
            .ok()?;
        Some(Answer::Custom(text))
    }
}

impl AnswerSource for PromptAnswers {
    fn answer(&mut self, questions: &[ClarificationQuestion]) -> Option<Vec<(String, Answer)>> {
        let term = Term::stderr();
        let mut answers = Vec::with_capacity(questions.len());
        for q in questions {
            answers.push((q.id.clone(), Self::ask(&term, q)?));
        }
        Some(answers)
    }
}
