pub const PROFILE_SECTION: &str = "profile-section";
pub const DRAWING_SECTION: &str = "drawing-section";
pub const GAME_SECTION: &str = "game-section";

const MIN_PREFIX: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub keywords: Vec<String>,
}

/// Menu entries in display order. The first one is shown on start.
#[derive(Clone, Debug, Default)]
pub struct SectionCatalog {
    entries: Vec<CatalogEntry>,
}

impl SectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn portfolio() -> Self {
        Self::new()
            .with(PROFILE_SECTION, "Profile", &["about", "home", "me", "projects"])
            .with(DRAWING_SECTION, "Drawing", &["paint", "sketch", "canvas", "brush"])
            .with(GAME_SECTION, "Memory Game", &["cards", "match", "pairs", "play"])
    }

    pub fn with(mut self, id: &str, title: &str, keywords: &[&str]) -> Self {
        self.entries.push(CatalogEntry {
            id: id.to_string(),
            title: title.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        });
        self
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn default_section(&self) -> Option<&str> {
        self.entries.first().map(|e| e.id.as_str())
    }

    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.title.as_str())
    }

    /// Maps a search query to a section id. Title matches are preferred over
    /// keyword matches. A query word matches a title word or keyword when they
    /// are equal or one is a prefix of the other, case-insensitively; prefixes
    /// shorter than three letters only count as whole words.
    pub fn resolve(&self, query: &str) -> Option<&str> {
        let needle = query.trim().to_lowercase();
        let words: Vec<&str> = needle.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        let by_title = self.entries.iter().find(|e| {
            let title = e.title.to_lowercase();
            (needle.len() >= MIN_PREFIX && title.contains(&needle))
                || title.split_whitespace().any(|t| matches_any(&words, t))
        });
        let by_keyword = || {
            self.entries
                .iter()
                .find(|e| e.keywords.iter().any(|k| matches_any(&words, k)))
        };
        by_title.or_else(by_keyword).map(|e| e.id.as_str())
    }
}

fn matches_any(words: &[&str], term: &str) -> bool {
    words.iter().any(|w| prefix_match(w, term))
}

fn prefix_match(word: &str, term: &str) -> bool {
    word == term
        || (word.len() >= MIN_PREFIX && term.starts_with(word))
        || (term.len() >= MIN_PREFIX && word.starts_with(term))
}
