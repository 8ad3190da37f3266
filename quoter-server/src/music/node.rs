//! Music tree nodes and their JSON form

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Context,
    Author,
    Album,
    Song,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Context => "MusicContext",
            NodeKind::Author => "Author",
            NodeKind::Album => "Album",
            NodeKind::Song => "Song",
        }
    }
}

/// Optional `meta.json` in a music directory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaFile {
    pub title: Option<String>,
    pub format: Option<String>,
    pub img: Option<String>,
}

/// Effective metadata after inheritance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub title: String,
    pub format: Option<String>,
    pub img: Option<String>,
}

/// Metadata as reported: `format` and `img` only where they differ from the parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MusicNode {
    pub kind: NodeKind,
    pub name: String,
    pub meta: Meta,
    view: MetaView,
    pub children: Vec<MusicNode>,
}

impl MusicNode {
    /// Build a node, resolving `own` against the parent's effective metadata
    ///
    /// `own.title` falls back to `name`. The root passes `parent = None`.
    pub fn new(kind: NodeKind, name: String, own: MetaFile, parent: Option<&Meta>) -> Self {
        let inherited_format = parent.and_then(|p| p.format.clone());
        let inherited_img = parent.and_then(|p| p.img.clone());

        let meta = Meta {
            title: own.title.unwrap_or_else(|| name.clone()),
            format: own.format.or_else(|| inherited_format.clone()),
            img: own.img.or_else(|| inherited_img.clone()),
        };

        let view = MetaView {
            title: meta.title.clone(),
            format: meta.format.clone().filter(|f| Some(f) != inherited_format.as_ref()),
            img: meta.img.clone().filter(|i| Some(i) != inherited_img.as_ref()),
        };

        Self {
            kind,
            name,
            meta,
            view,
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&MusicNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!(self.kind.as_str()));
        obj.insert("meta".to_string(), json!(self.view));

        if self.kind == NodeKind::Album {
            let names: Vec<&str> = self.children.iter().map(|c| c.name.as_str()).collect();
            obj.insert("children".to_string(), json!(names));
        } else if !self.children.is_empty() {
            let children: Map<String, Value> = self
                .children
                .iter()
                .map(|c| (c.name.clone(), c.to_json()))
                .collect();
            obj.insert("children".to_string(), Value::Object(children));
        }

        Value::Object(obj)
    }
}
