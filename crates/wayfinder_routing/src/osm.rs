use fxhash::FxHashMap;
use serde::Deserialize;

/// Raw map element as delivered by the map-data provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    Node(OsmNode),
    Way(OsmWay),
    /// Relations and anything else the provider may return
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsmNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OsmWay {
    pub id: i64,
    #[serde(default)]
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub tags: FxHashMap<String, String>,
}

impl OsmWay {
    pub fn get_tag(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(|tag| tag.as_str())
    }

    pub fn has_tag(&self, tag: &str, value: &str) -> bool {
        self.get_tag(tag).is_some_and(|tag_value| tag_value == value)
    }
}
