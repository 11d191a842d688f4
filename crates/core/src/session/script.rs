//! Assistant copy used by the session.

use crate::level::Level;
use crate::question::{OptionKey, Question};

pub const START_OPTION: &str = "Start quiz";

pub const WELCOME: &str = "Hi! 👋 I'm the program assistant. I'll ask you a few questions \
     to test what you know about the program. Ready to start?";

pub const RESTART: &str = "Let's try again! 🚀 Ready for a new quiz?";

pub fn question(index: usize, total: usize, question: &Question) -> String {
    format!("**Question {}/{total}**\n\n{}", index + 1, question.text)
}

pub fn chosen_option(question: &Question, choice: usize) -> String {
    match OptionKey::from_index(choice) {
        Some(key) => format!("{key}) {}", question.alternative(key).text),
        None => format!("Option {}", choice + 1),
    }
}

pub const TIMEOUT_NOTICE: &str = "⏰ Time's up, no answer given.";

pub fn feedback(question: &Question, correct: bool, timed_out: bool) -> String {
    let right = question.correct_alternative();
    let key = question.correct_key();
    let citation = if right.citation.is_empty() {
        String::new()
    } else {
        format!("\n\n📖 {}", right.citation)
    };

    if correct {
        format!("✅ **Correct!** {}{citation}", right.explanation)
    } else {
        let opener = if timed_out { "⏰ **Time's up!**" } else { "❌ **Oops!**" };
        format!(
            "{opener} The right answer was: \"{key}) {}\"\n\n{}{citation}",
            right.text, right.explanation
        )
    }
}

pub fn result(score: u32, total: usize, level: &Level) -> String {
    format!(
        "🎉 **Quiz complete!**\n\nYou got **{score}** out of **{total}** questions right!\n\n{} **Level: {}**\n\n{}",
        level.emoji, level.name, level.description
    )
}

pub const REPLY_IDLE: &str = "Click 'Start quiz' and let's begin! 🎯";
pub const REPLY_PLAYING: &str = "Keep answering the quiz questions! 📝";
pub const REPLY_FINISHED: &str = "The quiz is over. Click 'Restart' to try again! 🔁";
