use serde::Deserialize;

use crate::{Error, Result, provider::Channel};

const EMBEDDED_CHANNELS: &str = include_str!("channels.json");

/// One channel of the embedded ZEE5 lineup.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelEntry {
    pub id: String,
    pub name: String,
    /// Upstream master manifest, before the session cookie is attached.
    pub url: String,
    pub logo: String,
    pub language: i32,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize)]
struct DataFile {
    title: String,
    data: Vec<ChannelEntry>,
}

/// Read-only channel lookup table.
#[derive(Debug, Clone)]
pub struct Catalog {
    title: String,
    entries: Vec<ChannelEntry>,
}

impl Catalog {
    /// Parse the lineup compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CHANNELS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: DataFile = serde_json::from_str(json)
            .map_err(|e| Error::Internal(format!("invalid channel data: {}", e)))?;
        Ok(Self {
            title: file.title,
            entries: file.data,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lookup(&self, id: &str) -> Option<&ChannelEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Listing records, routed through `<provider>/<id>`.
    pub fn channels(&self, provider: &str) -> Vec<Channel> {
        self.entries
            .iter()
            .map(|entry| Channel {
                id: entry.id.clone(),
                name: entry.name.clone(),
                url: format!("{}/{}", provider, entry.id),
                logo_url: entry.logo.clone(),
                category: 0,
                language: entry.language,
                is_hd: false,
                is_custom: true,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.is_empty());

        for entry in catalog.channels("zee5") {
            assert!(entry.url.starts_with("zee5/"));
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = Catalog::from_json(
            r#"{"title":"t","data":[{"id":"a","name":"A","url":"https://cdn.example/a.m3u8","logo":"l","language":3}]}"#,
        )
        .unwrap();

        assert_eq!(catalog.lookup("a").unwrap().url, "https://cdn.example/a.m3u8");
        assert!(catalog.lookup("b").is_none());
        assert_eq!(catalog.title(), "t");

        let channels = catalog.channels("zee5");
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].url, "zee5/a");
        assert_eq!(channels[0].language, 3);
        assert!(channels[0].is_custom);
        assert!(!channels[0].is_hd);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Catalog::from_json("{"), Err(Error::Internal(_))));
    }
}
