use crate::language::Language;

/// Output text shown before any translation has completed.
pub const PLACEHOLDER: &str = "Translation will appear here...";

/// Rendering surface the page controller draws on.
///
/// Stands in for the page's elements: the input and output regions, the
/// two language selectors, the character counter, the loading indicator,
/// the error banner and the copy control.
pub trait Surface: Send {
    fn input_text(&self) -> String;
    fn set_input_text(&mut self, text: &str);

    fn output_text(&self) -> String;
    fn set_output_text(&mut self, text: &str);

    /// Replace both selector lists. `source` already carries the `auto` entry.
    fn populate_languages(&mut self, source: &[Language], target: &[Language]);

    fn source_lang(&self) -> String;
    fn set_source_lang(&mut self, code: &str);
    fn target_lang(&self) -> String;
    fn set_target_lang(&mut self, code: &str);

    fn set_char_count(&mut self, label: &str);

    fn show_loading(&mut self, message: &str);
    fn hide_loading(&mut self);

    fn show_error(&mut self, message: &str);
    fn hide_error(&mut self);

    /// Toggle the success indicator on the copy control.
    fn set_copy_feedback(&mut self, active: bool);
}

/// System clipboard
pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// Text to speak and how to speak it
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
}

/// System speech synthesis
pub trait SpeechSynthesizer: Send {
    /// Stop whatever is being spoken. No-op when idle.
    fn cancel(&mut self);

    fn speak(&mut self, utterance: &Utterance) -> anyhow::Result<()>;
}

/// Whether the output region holds a real translation.
pub fn has_translation(output: &str) -> bool {
    !output.is_empty() && output != PLACEHOLDER
}

pub fn char_count_label(text: &str) -> String {
    format!("{} characters", text.chars().count())
}
