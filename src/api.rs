use serde::Deserialize;

use crate::sanitize;

pub const API_BASE: &str = "https://a.4cdn.org";
pub const IMAGE_BASE: &str = "https://i.4cdn.org";

pub fn boards_url() -> String {
    format!("{API_BASE}/boards.json")
}

pub fn catalog_url(board: &str) -> String {
    format!("{API_BASE}/{board}/catalog.json")
}

pub fn thread_url(board: &str, no: u64) -> String {
    format!("{API_BASE}/{board}/thread/{no}.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub board: String,
    pub title: String,
    #[serde(default)]
    pub meta_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BoardList {
    pub boards: Vec<Board>,
}

/// One post as the API ships it. `com` stays HTML-escaped until it goes
/// through [`sanitize::clean`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Post {
    pub no: u64,
    #[serde(default)]
    pub resto: u64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub com: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub replies: Option<u32>,
    #[serde(default)]
    pub images: Option<u32>,
    #[serde(default)]
    pub tim: Option<u64>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl Post {
    pub fn thumb_url(&self, board: &str) -> Option<String> {
        self.tim.map(|tim| format!("{IMAGE_BASE}/{board}/{tim}s.jpg"))
    }

    /// Subject if the post has one, otherwise the first line of its
    /// cleaned comment, truncated for list display.
    pub fn headline(&self, max_chars: usize) -> String {
        let text = match &self.sub {
            Some(sub) if !sub.is_empty() => sanitize::clean(Some(sub)),
            _ => sanitize::clean(self.com.as_deref())
                .lines()
                .next()
                .unwrap_or("")
                .to_string(),
        };
        if text.is_empty() {
            return format!("No.{}", self.no);
        }
        if text.chars().count() > max_chars {
            let cut: String = text.chars().take(max_chars).collect();
            format!("{cut}…")
        } else {
            text
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogPage {
    pub page: u32,
    pub threads: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadResponse {
    pub posts: Vec<Post>,
}
