pub mod controller;
pub mod surface;
pub mod terminal;
pub mod transient;


pub use controller::{CatalogSource, TranslateOutcome, TranslatorPage};
pub use surface::{Clipboard, SpeechSynthesizer, Surface, Utterance, PLACEHOLDER};
pub use terminal::{CommandSpeech, Osc52Clipboard, TerminalSurface};
