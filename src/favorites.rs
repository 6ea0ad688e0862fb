use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub board: String,
    pub no: u64,
    pub subject: String,
}

/// Bookmarked threads, mirrored to a JSON file under the config dir.
/// A missing or unreadable file just means no favorites yet.
#[derive(Debug, Default)]
pub struct Favorites {
    entries: Vec<Favorite>,
    path: Option<PathBuf>,
}

fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/rchan/favorites.json"))
}

impl Favorites {
    pub fn load() -> Self {
        Self::load_from(default_path())
    }

    pub fn load_from(path: Option<PathBuf>) -> Self {
        let entries = path
            .as_deref()
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self { entries, path }
    }

    fn save(&self) {
        let Some(path) = &self.path else { return };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(&self.entries) {
            let _ = fs::write(path, json);
        }
    }

    pub fn contains(&self, board: &str, no: u64) -> bool {
        self.entries.iter().any(|f| f.board == board && f.no == no)
    }

    /// Adds the thread, or removes it if already present. Returns true
    /// when the thread is a favorite afterwards.
    pub fn toggle(&mut self, fav: Favorite) -> bool {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|f| f.board == fav.board && f.no == fav.no)
        {
            self.entries.remove(pos);
            self.save();
            false
        } else {
            self.entries.push(fav);
            self.save();
            true
        }
    }

    pub fn remove_at(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
            self.save();
        }
    }

    pub fn entries(&self) -> &[Favorite] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rchan-test-{}-{name}.json", std::process::id()))
    }

    fn fav(board: &str, no: u64) -> Favorite {
        Favorite { board: board.into(), no, subject: format!("thread {no}") }
    }

    #[test]
    fn missing_file_means_empty() {
        let favs = Favorites::load_from(Some(temp_file("missing")));
        assert!(favs.entries().is_empty());
    }

    #[test]
    fn corrupt_file_means_empty() {
        let path = temp_file("corrupt");
        fs::write(&path, "not json at all").unwrap();
        let favs = Favorites::load_from(Some(path.clone()));
        assert!(favs.entries().is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn toggle_round_trips_through_disk() {
        let path = temp_file("roundtrip");
        let _ = fs::remove_file(&path);

        let mut favs = Favorites::load_from(Some(path.clone()));
        assert!(favs.toggle(fav("g", 100)));
        assert!(favs.toggle(fav("a", 200)));
        assert!(favs.contains("g", 100));

        let reloaded = Favorites::load_from(Some(path.clone()));
        assert_eq!(reloaded.entries(), favs.entries());

        let mut favs = reloaded;
        assert!(!favs.toggle(fav("g", 100)), "second toggle removes");
        assert!(!favs.contains("g", 100));
        assert!(favs.contains("a", 200));

        let _ = fs::remove_file(path);
    }
}
