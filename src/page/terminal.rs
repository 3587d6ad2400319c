use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use tracing::debug;

use super::surface::{Clipboard, SpeechSynthesizer, Surface, Utterance};
use crate::language::Language;

/// Line-oriented surface that prints every visible change to a writer.
pub struct TerminalSurface<W: Write + Send> {
    out: W,
    input: String,
    output: String,
    source_list: Vec<Language>,
    target_list: Vec<Language>,
    source: String,
    target: String,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            input: String::new(),
            output: String::new(),
            source_list: Vec::new(),
            target_list: Vec::new(),
            source: String::new(),
            target: String::new(),
        }
    }

    pub fn source_languages(&self) -> &[Language] {
        &self.source_list
    }

    pub fn target_languages(&self) -> &[Language] {
        &self.target_list
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // Terminal output is best effort.
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }

    fn name_of<'a>(list: &'a [Language], code: &'a str) -> &'a str {
        list.iter()
            .find(|l| l.code == code)
            .map(|l| l.name.as_str())
            .unwrap_or(code)
    }
}

impl<W: Write + Send> Surface for TerminalSurface<W> {
    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn set_input_text(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn output_text(&self) -> String {
        self.output.clone()
    }

    fn set_output_text(&mut self, text: &str) {
        self.output = text.to_string();
        self.line(&format!("=> {}", text));
    }

    fn populate_languages(&mut self, source: &[Language], target: &[Language]) {
        self.source_list = source.to_vec();
        self.target_list = target.to_vec();
        self.line(&format!("{} languages available", target.len()));
    }

    fn source_lang(&self) -> String {
        self.source.clone()
    }

    fn set_source_lang(&mut self, code: &str) {
        // Selectors only accept listed codes.
        if self.source_list.iter().any(|l| l.code == code) {
            self.source = code.to_string();
        } else {
            self.source.clear();
        }
        let name = Self::name_of(&self.source_list, &self.source).to_string();
        self.line(&format!("from: {}", name));
    }

    fn target_lang(&self) -> String {
        self.target.clone()
    }

    fn set_target_lang(&mut self, code: &str) {
        if self.target_list.iter().any(|l| l.code == code) {
            self.target = code.to_string();
        } else {
            self.target.clear();
        }
        let name = Self::name_of(&self.target_list, &self.target).to_string();
        self.line(&format!("to: {}", name));
    }

    fn set_char_count(&mut self, label: &str) {
        debug!("Input length: {}", label);
    }

    fn show_loading(&mut self, message: &str) {
        self.line(message);
    }

    fn hide_loading(&mut self) {}

    fn show_error(&mut self, message: &str) {
        self.line(&format!("error: {}", message));
    }

    fn hide_error(&mut self) {}

    fn set_copy_feedback(&mut self, active: bool) {
        if active {
            self.line("copied");
        }
    }
}

/// Clipboard that asks the terminal to set the selection via OSC 52.
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Speech through an external program taking `-v <lang> -s <wpm> <text>`,
/// as `espeak` does.
pub struct CommandSpeech {
    program: String,
    current: Option<Child>,
}

/// Speaking rate of the external program at rate 1.0, in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: None,
        }
    }

    pub fn args(utterance: &Utterance) -> Vec<String> {
        let wpm = (BASE_WORDS_PER_MINUTE * utterance.rate).round() as u32;
        vec![
            "-v".to_string(),
            utterance.lang.clone(),
            "-s".to_string(),
            wpm.to_string(),
            utterance.text.clone(),
        ]
    }
}

impl SpeechSynthesizer for CommandSpeech {
    fn cancel(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Ok(None) = child.try_wait() {
                debug!("Stopping speech process {}", child.id());
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        let child = Command::new(&self.program)
            .args(Self::args(utterance))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;
        self.current = Some(child);
        Ok(())
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_encodes_base64() {
        assert_eq!(osc52_sequence("Hola"), "\x1b]52;c;SG9sYQ==\x07");

        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.write_text("Hola").unwrap();
        assert_eq!(clipboard.into_inner(), b"\x1b]52;c;SG9sYQ==\x07".to_vec());
    }

    #[test]
    fn speech_args_scale_rate() {
        let args = CommandSpeech::args(&Utterance {
            text: "Hola".to_string(),
            lang: "es".to_string(),
            rate: 0.8,
            pitch: 1.0,
        });
        assert_eq!(args, ["-v", "es", "-s", "140", "Hola"]);
    }

    #[test]
    fn missing_speech_program_is_an_error() {
        let mut speech = CommandSpeech::new("linguabridge-no-such-speaker");
        let result = speech.speak(&Utterance {
            text: "Hola".to_string(),
            lang: "es".to_string(),
            rate: 1.0,
            pitch: 1.0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn selectors_reject_unlisted_codes() {
        let mut surface = TerminalSurface::new(Vec::new());
        let langs = vec![Language::new("es", "Spanish")];
        surface.populate_languages(&[Language::auto(), langs[0].clone()], &langs);

        surface.set_target_lang("es");
        assert_eq!(surface.target_lang(), "es");
        surface.set_target_lang("auto");
        assert_eq!(surface.target_lang(), "");

        let printed = String::from_utf8(surface.into_inner()).unwrap();
        assert!(printed.contains("to: Spanish"));
    }
}
