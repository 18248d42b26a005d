use std::fmt;

use serde::{Deserialize, Serialize};

use crate::word::Suggestion;

/// A supported target language. Each carries its route segment, its display
/// strings, and its seed suggestion table; the screen behavior is otherwise
/// identical across languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Japanese,
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Japanese, Language::Portuguese];

    /// Stable lowercase code, used in routes and collection paths.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Japanese => "japanese",
            Language::Portuguese => "portuguese",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL.iter().copied().find(|l| l.code() == code)
    }

    /// Instruction line shown at the top of the language screen.
    pub fn instruction(&self) -> &'static str {
        match self {
            Language::English => "Adicione palavras em inglês e seus significados em português.",
            Language::Japanese => "Adicione palavras em japonês e seus significados em português.",
            Language::Portuguese => "Adicione palavras em português e seus significados em inglês.",
        }
    }

    /// Heading over the suggestion list.
    pub fn suggestion_heading(&self) -> &'static str {
        match self {
            Language::English => "Sugestões de Palavras em Inglês",
            Language::Japanese => "Sugestões de Palavras em Japonês",
            Language::Portuguese => "Sugestões de Palavras em Português",
        }
    }

    /// The static seed suggestion table for this language. A fresh copy per
    /// call; promoted entries are removed from the session's copy only.
    pub fn seed_suggestions(&self) -> Vec<Suggestion> {
        let pairs: &[(&str, &str)] = match self {
            Language::English => &[
                ("Hello", "Olá"),
                ("Thank you", "Obrigado"),
                ("Please", "Por favor"),
                ("Goodbye", "Adeus"),
                ("Yes", "Sim"),
                ("No", "Não"),
            ],
            Language::Japanese => &[
                ("Kon'nichiwa", "Olá"),
                ("Arigato", "Obrigado"),
                ("Onegaishimasu", "Por favor"),
                ("Sayonara", "Adeus"),
                ("Hai", "Sim"),
                ("Iie", "Não"),
            ],
            Language::Portuguese => &[
                ("Olá", "Hello"),
                ("Obrigado", "Thank you"),
                ("Por favor", "Please"),
                ("Adeus", "Goodbye"),
                ("Sim", "Yes"),
                ("Não", "No"),
            ],
        };
        pairs
            .iter()
            .map(|(word, meaning)| Suggestion::new(*word, *meaning))
            .collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
