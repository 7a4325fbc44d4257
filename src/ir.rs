use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Year assumed for stations that carry no origin year when ordering layout.
pub const DEFAULT_ORIGIN_YEAR: i32 = 1970;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Membership,
    Studio,
    Writing,
    Label,
    Feature,
    Cover,
    Influence,
}

impl ConnectionKind {
    pub const ALL: [ConnectionKind; 7] = [
        ConnectionKind::Membership,
        ConnectionKind::Studio,
        ConnectionKind::Writing,
        ConnectionKind::Label,
        ConnectionKind::Feature,
        ConnectionKind::Cover,
        ConnectionKind::Influence,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "membership" | "member" => Some(Self::Membership),
            "studio" => Some(Self::Studio),
            "writing" | "songwriting" => Some(Self::Writing),
            "label" => Some(Self::Label),
            "feature" | "featuring" => Some(Self::Feature),
            "cover" => Some(Self::Cover),
            "influence" => Some(Self::Influence),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::Studio => "studio",
            Self::Writing => "writing",
            Self::Label => "label",
            Self::Feature => "feature",
            Self::Cover => "cover",
            Self::Influence => "influence",
        }
    }

    /// Signed multiple of the type offset unit; membership runs on the centerline.
    pub fn offset_rank(self) -> i32 {
        match self {
            Self::Membership => 0,
            Self::Studio => 1,
            Self::Writing => -1,
            Self::Label => 2,
            Self::Feature => -2,
            Self::Cover => 3,
            Self::Influence => -3,
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const ORIGIN: GridPoint = GridPoint { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_year: Option<i32>,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            origin_year: None,
            x: 0,
            y: 0,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_origin_year(mut self, year: i32) -> Self {
        self.origin_year = Some(year);
        self
    }

    pub fn position(&self) -> GridPoint {
        GridPoint::new(self.x, self.y)
    }

    pub fn sort_year(&self) -> i32 {
        self.origin_year.unwrap_or(DEFAULT_ORIGIN_YEAR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    #[serde(default)]
    pub metadata: ConnectionMeta,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: ConnectionKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            metadata: ConnectionMeta::default(),
        }
    }

    pub fn with_meta(mut self, metadata: ConnectionMeta) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }

    /// The endpoint on the far side of `id`, treating the connection as undirected.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.from == id {
            Some(self.to.as_str())
        } else if self.to == id {
            Some(self.from.as_str())
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn same_pair(&self, other: &Connection) -> bool {
        (self.from == other.from && self.to == other.to)
            || (self.from == other.to && self.to == other.from)
    }
}

/// Serialized graph state; the unit of undo/redo and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub entities: BTreeMap<String, Station>,
    pub relationships: Vec<Connection>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}
