//! The language screen controller.
//!
//! One parameterized implementation behind the three near-identical language
//! screens: live word-list subscription, seed suggestions, input state, and
//! an explicit pending gate against double submissions.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::language::Language;
use crate::store::{DocumentStore, StoreError, WatchHandle, WordStore};
use crate::word::{Suggestion, WordRecord};

/// User-facing notice raised by a screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DuplicateWord(String),
    ReviewedToday,
    NotSignedIn,
    LoadFailed,
    SaveFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DuplicateWord(word) => {
                write!(f, "A palavra \"{}\" já existe nesta lista!", word)
            }
            Notice::ReviewedToday => write!(f, "Atualizado Hoje, Atualize Amanhã!"),
            Notice::NotSignedIn => write!(f, "Você precisa entrar para ver suas palavras."),
            Notice::LoadFailed => write!(f, "Não foi possível carregar as palavras."),
            Notice::SaveFailed => write!(f, "Não foi possível salvar a alteração."),
        }
    }
}

/// Shared with the subscription listener, which runs on the mutating call.
#[derive(Debug, Default)]
struct SnapshotCell {
    words: Vec<WordRecord>,
    loading: bool,
}

fn cell(snapshot: &Mutex<SnapshotCell>) -> std::sync::MutexGuard<'_, SnapshotCell> {
    snapshot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-language screen state machine.
///
/// Loading until the first snapshot arrives; re-enters loading whenever the
/// language changes (the previous subscription is torn down first, so there
/// is never an overlap). Mutating actions run through the pending gate and
/// degrade to a [`Notice`] on failure.
pub struct LanguageScreen<S: DocumentStore> {
    store: Arc<WordStore<S>>,
    language: Language,
    snapshot: Arc<Mutex<SnapshotCell>>,
    subscription: Option<WatchHandle>,
    suggestions: Vec<Suggestion>,
    word_input: String,
    meaning_input: String,
    pending: bool,
    notice: Option<Notice>,
}

impl<S: DocumentStore> LanguageScreen<S> {
    /// Create the screen and establish its live subscription.
    pub fn new(store: Arc<WordStore<S>>, language: Language) -> Self {
        let mut screen = LanguageScreen {
            store,
            language,
            snapshot: Arc::new(Mutex::new(SnapshotCell {
                words: Vec::new(),
                loading: true,
            })),
            subscription: None,
            suggestions: language.seed_suggestions(),
            word_input: String::new(),
            meaning_input: String::new(),
            pending: false,
            notice: None,
        };
        screen.attach();
        screen
    }

    fn attach(&mut self) {
        // Tear down before re-subscribing; never two live subscriptions.
        self.subscription = None;
        {
            let mut snapshot = cell(&self.snapshot);
            snapshot.words.clear();
            snapshot.loading = true;
        }

        let sink = Arc::clone(&self.snapshot);
        match self.store.subscribe(self.language, move |words| {
            let mut snapshot = cell(&sink);
            snapshot.words = words;
            snapshot.loading = false;
        }) {
            Ok(handle) => self.subscription = Some(handle),
            Err(e) => {
                warn!(language = %self.language, error = %e, "could not subscribe to words");
                cell(&self.snapshot).loading = false;
                self.notice = Some(match e {
                    StoreError::NotAuthenticated => Notice::NotSignedIn,
                    _ => Notice::LoadFailed,
                });
            }
        }
    }

    /// Switch the screen to another language collection.
    pub fn set_language(&mut self, language: Language) {
        if language == self.language {
            return;
        }
        self.language = language;
        self.suggestions = language.seed_suggestions();
        self.word_input.clear();
        self.meaning_input.clear();
        self.notice = None;
        self.attach();
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Current word list snapshot.
    pub fn words(&self) -> Vec<WordRecord> {
        cell(&self.snapshot).words.clone()
    }

    pub fn loading(&self) -> bool {
        cell(&self.snapshot).loading
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn word_input(&self) -> &str {
        &self.word_input
    }

    pub fn meaning_input(&self) -> &str {
        &self.meaning_input
    }

    pub fn set_word_input(&mut self, text: impl Into<String>) {
        self.word_input = text.into();
    }

    pub fn set_meaning_input(&mut self, text: impl Into<String>) {
        self.meaning_input = text.into();
    }

    /// The last notice, cleared on read.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Add the typed word. Blank inputs are ignored; success clears both
    /// fields, a duplicate raises a notice and leaves them for editing.
    pub fn submit_word(&mut self) -> bool {
        if self.pending {
            return false;
        }
        let word = self.word_input.trim().to_string();
        let meaning = self.meaning_input.trim().to_string();
        if word.is_empty() || meaning.is_empty() {
            return false;
        }

        self.pending = true;
        let result = self.store.add_word(self.language, &word, &meaning);
        self.pending = false;

        match result {
            Ok(_) => {
                self.word_input.clear();
                self.meaning_input.clear();
                true
            }
            Err(StoreError::DuplicateWord { word }) => {
                self.notice = Some(Notice::DuplicateWord(word));
                false
            }
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Promote a seed suggestion to a word; it leaves the suggestion list
    /// only when the add succeeded.
    pub fn take_suggestion(&mut self, word: &str) -> bool {
        if self.pending {
            return false;
        }
        let Some(index) = self.suggestions.iter().position(|s| s.word == word) else {
            return false;
        };
        let suggestion = self.suggestions[index].clone();

        self.pending = true;
        let result = self
            .store
            .add_word(self.language, &suggestion.word, &suggestion.meaning);
        self.pending = false;

        match result {
            Ok(_) => {
                self.suggestions.remove(index);
                true
            }
            Err(StoreError::DuplicateWord { .. }) => false,
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// A click on a word card: one daily progress bump.
    pub fn view_word(&mut self, id: &str) -> bool {
        if self.pending {
            return false;
        }

        self.pending = true;
        let result = self.store.update_progress(self.language, id);
        self.pending = false;

        match result {
            Ok(_) => true,
            Err(StoreError::ThrottledToday) => {
                self.notice = Some(Notice::ReviewedToday);
                false
            }
            Err(StoreError::NotFound { .. }) => false,
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Remove a word once the user answered the confirmation dialog.
    /// Unconfirmed calls do nothing.
    pub fn remove_word(&mut self, id: &str, confirmed: bool) -> bool {
        if !confirmed || self.pending {
            return false;
        }

        self.pending = true;
        let result = self.store.remove_word(self.language, id);
        self.pending = false;

        match result {
            Ok(()) => true,
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Zero every word's progress in this collection.
    pub fn reset_progress(&mut self) -> bool {
        if self.pending {
            return false;
        }

        self.pending = true;
        let result = self.store.reset_all(self.language);
        self.pending = false;

        match result {
            Ok(()) => true,
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    fn fail(&mut self, err: StoreError) {
        warn!(language = %self.language, error = %err, "screen action failed");
        self.notice = Some(match err {
            StoreError::NotAuthenticated => Notice::NotSignedIn,
            _ => Notice::SaveFailed,
        });
    }
}
