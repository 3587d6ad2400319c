use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::surface::{
    char_count_label, has_translation, Clipboard, SpeechSynthesizer, Surface, Utterance,
    PLACEHOLDER,
};
use super::transient::{Transient, BANNER_TTL, COPY_FEEDBACK_TTL};
use crate::client::{ClientError, TranslationApi, TranslationRequest};
use crate::language::{fallback_languages, sorted_by_name, Language, AUTO_CODE, DEFAULT_TARGET};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter text to translate";
pub const LANGUAGES_FAILED_MESSAGE: &str = "Failed to load languages. Using default languages.";
pub const COPY_FAILED_MESSAGE: &str = "Failed to copy to clipboard";
pub const NO_TRANSLATION_TEXT: &str = "No translation returned";
pub const FAILURE_PREFIX: &str = "Translation failed: ";

const DEFAULT_SPEECH_RATE: f32 = 0.9;

/// Where the lists on the surface came from after `load_languages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Fallback,
}

/// What a translate call did to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateOutcome {
    /// Output region now shows this text.
    Translated(String),
    /// Banner shows the error; output untouched.
    Failed(ClientError),
    /// A newer request was issued meanwhile; nothing was rendered.
    Stale,
}

/// An issued request waiting to be sent.
///
/// Owns its own handle on the API so it can be awaited without holding the
/// page, which lets a second request start before the first resolves.
///
/// Counts as in flight until it is finished or dropped, so an abandoned
/// request does not keep the loading indicator up.
pub struct PendingTranslation {
    seq: u64,
    request: TranslationRequest,
    api: Arc<dyn TranslationApi>,
    guard: InFlightGuard,
}

/// Response to a `PendingTranslation`, tagged with its sequence number.
pub struct CompletedTranslation {
    seq: u64,
    result: Result<crate::client::TranslationReply, ClientError>,
    guard: InFlightGuard,
}

/// Holds one slot of the page's in-flight count; releases it on drop.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PendingTranslation {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &TranslationRequest {
        &self.request
    }

    pub async fn send(self) -> CompletedTranslation {
        let result = self.api.translate(&self.request).await;
        CompletedTranslation {
            seq: self.seq,
            result,
            guard: self.guard,
        }
    }
}

/// The translator page: catalog loading, translation and the small actions
/// around them, rendered onto an injected `Surface`.
pub struct TranslatorPage<S: Surface> {
    api: Arc<dyn TranslationApi>,
    surface: S,
    clipboard: Box<dyn Clipboard>,
    speech: Box<dyn SpeechSynthesizer>,
    speech_rate: f32,
    banner: Transient,
    copy_feedback: Transient,
    latest_seq: u64,
    in_flight: Arc<AtomicUsize>,
    /// Loading indicator is up for a translation.
    translating: bool,
}

impl<S: Surface> TranslatorPage<S> {
    pub fn new(
        api: Arc<dyn TranslationApi>,
        surface: S,
        clipboard: Box<dyn Clipboard>,
        speech: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        let mut page = Self {
            api,
            surface,
            clipboard,
            speech,
            speech_rate: DEFAULT_SPEECH_RATE,
            banner: Transient::new(BANNER_TTL),
            copy_feedback: Transient::new(COPY_FEEDBACK_TTL),
            latest_seq: 0,
            in_flight: Arc::new(AtomicUsize::new(0)),
            translating: false,
        };
        page.surface.set_output_text(PLACEHOLDER);
        page.update_char_count();
        page
    }

    pub fn with_speech_rate(mut self, rate: f32) -> Self {
        self.speech_rate = rate;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Fetch the catalog and fill both selectors, falling back to the
    /// built-in list on any failure.
    pub async fn load_languages(&mut self) -> CatalogSource {
        self.surface.show_loading("Loading languages...");
        let result = self.api.fetch_languages().await;
        self.surface.hide_loading();

        let languages = match result {
            Ok(languages) => sorted_by_name(languages),
            Err(ClientError::Reported(message)) => {
                warn!("Language catalog reported an error: {}", message);
                self.show_error(&message);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to load languages: {}", e);
                self.show_error(LANGUAGES_FAILED_MESSAGE);
                Vec::new()
            }
        };

        if languages.is_empty() {
            info!("Using {} fallback languages", fallback_languages().len());
            self.populate(sorted_by_name(fallback_languages()));
            CatalogSource::Fallback
        } else {
            info!("Loaded {} languages", languages.len());
            self.populate(languages);
            CatalogSource::Remote
        }
    }

    fn populate(&mut self, languages: Vec<Language>) {
        let mut source = Vec::with_capacity(languages.len() + 1);
        source.push(Language::auto());
        source.extend(languages.iter().cloned());

        self.surface.populate_languages(&source, &languages);
        self.surface.set_source_lang(AUTO_CODE);

        let target = languages
            .iter()
            .find(|lang| lang.code == DEFAULT_TARGET)
            .or_else(|| languages.first());
        if let Some(target) = target {
            self.surface.set_target_lang(&target.code);
        }
    }

    /// Validate the input and issue a sequenced request. Empty input shows
    /// the validation message and issues nothing.
    pub fn begin_translate(&mut self) -> Result<PendingTranslation, ClientError> {
        let text = self.surface.input_text();
        if text.trim().is_empty() {
            self.show_error(EMPTY_INPUT_MESSAGE);
            return Err(ClientError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
        }

        self.surface.show_loading("Translating...");
        self.translating = true;
        self.hide_error();

        self.latest_seq += 1;
        let request = TranslationRequest {
            text,
            source_lang: self.surface.source_lang(),
            target_lang: self.surface.target_lang(),
        };
        debug!(
            "Issuing translation #{}: {} -> {}",
            self.latest_seq, request.source_lang, request.target_lang
        );

        Ok(PendingTranslation {
            seq: self.latest_seq,
            request,
            api: self.api.clone(),
            guard: InFlightGuard::acquire(&self.in_flight),
        })
    }

    /// Render a completed request unless a newer one has been issued.
    pub fn finish_translate(&mut self, completed: CompletedTranslation) -> TranslateOutcome {
        let CompletedTranslation { seq, result, guard } = completed;
        drop(guard);
        self.settle_loading();

        if seq < self.latest_seq {
            debug!("Discarding response #{}, #{} is newer", seq, self.latest_seq);
            return TranslateOutcome::Stale;
        }

        match result {
            Ok(reply) => {
                let text = reply
                    .translated_text
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| NO_TRANSLATION_TEXT.to_string());
                self.surface.set_output_text(&text);
                TranslateOutcome::Translated(text)
            }
            Err(e) => {
                error!("Translation error: {}", e);
                self.show_error(&format!("{}{}", FAILURE_PREFIX, e));
                TranslateOutcome::Failed(e)
            }
        }
    }

    /// Translate the current input with the selected languages.
    pub async fn translate(&mut self) -> TranslateOutcome {
        match self.begin_translate() {
            Ok(pending) => {
                let completed = pending.send().await;
                self.finish_translate(completed)
            }
            Err(e) => TranslateOutcome::Failed(e),
        }
    }

    /// Set the input region as if typed, refreshing the counter.
    pub fn set_input(&mut self, text: &str) {
        self.surface.set_input_text(text);
        self.update_char_count();
    }

    pub fn update_char_count(&mut self) {
        let text = self.surface.input_text();
        self.surface.set_char_count(&char_count_label(&text));
    }

    /// Exchange source and target. Does nothing while the source is `auto`.
    pub fn swap_languages(&mut self) -> bool {
        let source = self.surface.source_lang();
        if source == AUTO_CODE {
            return false;
        }
        let target = self.surface.target_lang();
        self.surface.set_source_lang(&target);
        self.surface.set_target_lang(&source);

        let output = self.surface.output_text();
        if has_translation(&output) {
            self.surface.set_input_text(&output);
            self.surface.set_output_text(PLACEHOLDER);
            self.update_char_count();
        }
        true
    }

    pub fn clear(&mut self) {
        self.surface.set_input_text("");
        self.surface.set_output_text(PLACEHOLDER);
        self.surface.set_char_count(&char_count_label(""));
        self.hide_error();
    }

    /// Copy the output to the clipboard. Returns false when there was
    /// nothing to copy or the clipboard refused.
    pub fn copy_output(&mut self) -> bool {
        let output = self.surface.output_text();
        if !has_translation(&output) {
            return false;
        }
        match self.clipboard.write_text(&output) {
            Ok(()) => {
                self.surface.set_copy_feedback(true);
                self.copy_feedback.arm(Instant::now());
                true
            }
            Err(e) => {
                error!("Failed to copy: {}", e);
                self.show_error(COPY_FAILED_MESSAGE);
                false
            }
        }
    }

    /// Read the output aloud in the target language.
    pub fn speak_output(&mut self) -> bool {
        let output = self.surface.output_text();
        if !has_translation(&output) {
            return false;
        }
        self.speech.cancel();
        let utterance = Utterance {
            text: output,
            lang: self.surface.target_lang(),
            rate: self.speech_rate,
            pitch: 1.0,
        };
        if let Err(e) = self.speech.speak(&utterance) {
            warn!("Speech synthesis failed: {}", e);
            return false;
        }
        true
    }

    /// Switch off transient elements whose time is up.
    ///
    /// Also drops the loading indicator once no request is in flight, which
    /// covers requests that were abandoned instead of finished.
    pub fn dismiss_expired(&mut self, now: Instant) {
        self.settle_loading();
        if self.banner.take_expired(now) {
            self.surface.hide_error();
        }
        if self.copy_feedback.take_expired(now) {
            self.surface.set_copy_feedback(false);
        }
    }

    /// Earliest pending transient deadline, for scheduling `dismiss_expired`.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.banner.deadline(), self.copy_feedback.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Requests issued and not yet finished or dropped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn settle_loading(&mut self) {
        if self.translating && self.in_flight() == 0 {
            self.surface.hide_loading();
            self.translating = false;
        }
    }

    fn show_error(&mut self, message: &str) {
        self.surface.show_error(message);
        self.banner.arm(Instant::now());
    }

    fn hide_error(&mut self) {
        self.surface.hide_error();
        self.banner.disarm();
    }
}
