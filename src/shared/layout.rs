//! Section Tree Model
//!
//! This module defines the persisted page-structure documents and the key
//! space they live in. These types are shared by every storage adapter, the
//! layout resolver and the HTTP handlers.
//!
//! # Documents
//!
//! - [`RouteContent`] - the section tree persisted for one `(store, route, mode)`
//! - [`HomeContent`] - the `home` route document, which also carries the
//!   shared header and footer
//! - [`Layout`] - the composed header + children + footer document served to
//!   a renderer (never persisted as a whole)
//!
//! Section payloads (`blocks`, `setting`) are kept as raw JSON values so that
//! a document round-trips through any adapter without losing fields the
//! rendering layer knows about and this crate does not.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Route name of the shared home document
pub const HOME_ROUTE: &str = "home";

/// Viewport variant of a route document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Large (desktop) viewport
    Lg,
    /// Small (mobile) viewport
    Sm,
}

impl Mode {
    /// Both modes, in the order variants are provisioned
    pub const ALL: [Mode; 2] = [Mode::Lg, Mode::Sm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Lg => "lg",
            Mode::Sm => "sm",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lg" => Ok(Mode::Lg),
            "sm" => Ok(Mode::Sm),
            other => Err(SharedError::validation(
                "mode",
                format!("unknown viewport mode '{}', expected 'lg' or 'sm'", other),
            )),
        }
    }
}

/// Identifies one route document across every storage adapter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    /// Opaque tenant identifier
    pub store_id: String,
    /// Route name, e.g. "home" or "about"
    pub route: String,
    /// Viewport variant
    pub mode: Mode,
}

impl StoreKey {
    pub fn new(store_id: impl Into<String>, route: impl Into<String>, mode: Mode) -> Self {
        Self {
            store_id: store_id.into(),
            route: route.into(),
            mode,
        }
    }

    /// Key of the home document for the same store and mode
    pub fn home(&self) -> Self {
        Self {
            store_id: self.store_id.clone(),
            route: HOME_ROUTE.to_string(),
            mode: self.mode,
        }
    }

    pub fn is_home(&self) -> bool {
        self.route == HOME_ROUTE
    }

    /// Flat file name used by the disk service, e.g. `homelg`
    pub fn filename(&self) -> String {
        format!("{}{}", self.route, self.mode)
    }

    /// Check the key components before they are used in headers or paths
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.store_id.trim().is_empty() {
            return Err(SharedError::validation("storeId", "store id cannot be empty"));
        }
        validate_route_name(&self.route)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.store_id, self.route, self.mode)
    }
}

/// Route names become file names and URL segments, so only a conservative
/// character set is accepted.
pub fn validate_route_name(route: &str) -> Result<(), SharedError> {
    if route.is_empty() {
        return Err(SharedError::validation("route", "route name cannot be empty"));
    }
    if !route
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(SharedError::validation(
            "route",
            format!("route name '{}' may only contain letters, digits, '-' and '_'", route),
        ));
    }
    Ok(())
}

/// Section types known to the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Header,
    Footer,
    Banner,
    MultiRow,
    MultiColumn,
    ProductList,
    ProductsRow,
    RichText,
    ImageText,
    Video,
    ContactForm,
    NewsLetter,
    CollapseFaq,
    SlideShow,
    SlideBanner,
    Collection,
    Story,
    OfferRow,
    Gallery,
    /// Any type the rendering layer does not know; rendered as a no-op
    Unknown(String),
}

impl SectionKind {
    pub fn from_type(name: &str) -> Self {
        match name {
            "Header" | "header" => Self::Header,
            "Footer" | "footer" => Self::Footer,
            "Banner" => Self::Banner,
            "MultiRow" => Self::MultiRow,
            "MultiColumn" => Self::MultiColumn,
            "ProductList" => Self::ProductList,
            "ProductsRow" => Self::ProductsRow,
            "RichText" => Self::RichText,
            "ImageText" => Self::ImageText,
            "Video" => Self::Video,
            "ContactForm" => Self::ContactForm,
            "NewsLetter" => Self::NewsLetter,
            "CollapseFaq" => Self::CollapseFaq,
            "SlideShow" => Self::SlideShow,
            "SlideBanner" => Self::SlideBanner,
            "Collection" => Self::Collection,
            "Story" => Self::Story,
            "OfferRow" => Self::OfferRow,
            "Gallery" => Self::Gallery,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Header => "Header",
            Self::Footer => "Footer",
            Self::Banner => "Banner",
            Self::MultiRow => "MultiRow",
            Self::MultiColumn => "MultiColumn",
            Self::ProductList => "ProductList",
            Self::ProductsRow => "ProductsRow",
            Self::RichText => "RichText",
            Self::ImageText => "ImageText",
            Self::Video => "Video",
            Self::ContactForm => "ContactForm",
            Self::NewsLetter => "NewsLetter",
            Self::CollapseFaq => "CollapseFaq",
            Self::SlideShow => "SlideShow",
            Self::SlideBanner => "SlideBanner",
            Self::Collection => "Collection",
            Self::Story => "Story",
            Self::OfferRow => "OfferRow",
            Self::Gallery => "Gallery",
            Self::Unknown(name) => name,
        }
    }

    /// Whether the renderer draws this kind; unknown kinds are skipped
    pub fn is_renderable(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

/// Blocks of a section: a single object or an ordered list, depending on type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Blocks {
    Many(Vec<Value>),
    One(Map<String, Value>),
}

impl Default for Blocks {
    fn default() -> Self {
        Blocks::One(Map::new())
    }
}

/// One visual block in a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(default)]
    pub blocks: Blocks,
    #[serde(default)]
    pub setting: Map<String, Value>,
    /// Fields not modeled here are carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        SectionKind::from_type(&self.section_type)
    }
}

/// The `children` slot of a route document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Children {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub route_type: Option<String>,
    #[serde(rename = "metaData", default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persisted section tree for one `(store, route, mode)`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteContent {
    pub children: Children,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteContent {
    /// Empty `{children:{sections:[],order:[]}}` document
    pub fn empty() -> Self {
        Self::default()
    }

    /// Skeleton written when a route is provisioned
    pub fn skeleton(route: &str) -> Self {
        Self {
            children: Children {
                route_type: Some(route.to_string()),
                meta_data: Some(serde_json::json!({
                    "title": route,
                    "description": route,
                })),
                sections: Vec::new(),
                order: Vec::new(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Order entries whose base type has no matching section
    pub fn order_mismatches(&self) -> Vec<String> {
        self.children
            .order
            .iter()
            .filter(|id| {
                let base = section_base_type(id);
                !self
                    .children
                    .sections
                    .iter()
                    .any(|section| section.section_type == base)
            })
            .cloned()
            .collect()
    }
}

/// Generate a section-instance id of the form `{baseType}-{uuid}`
pub fn new_section_id(kind: &SectionKind) -> String {
    format!("{}-{}", kind.as_str(), Uuid::new_v4())
}

/// Base type of a section-instance id (`"Banner-3f2a..."` -> `"Banner"`)
pub fn section_base_type(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

/// Header, children and footer of a composed page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSections {
    #[serde(rename = "sectionHeader", default)]
    pub section_header: Value,
    #[serde(default)]
    pub children: Value,
    #[serde(rename = "sectionFooter", default)]
    pub section_footer: Value,
}

/// The `home` route document
///
/// Stored documents come in two shapes: the nested editor shape
/// `{sections:{sectionHeader, children, sectionFooter}, ...}` and a flat
/// `{sectionHeader, children, sectionFooter}` shape. Both deserialize into
/// the same value; it always serializes in the nested shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeContent {
    pub sections: LayoutSections,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for HomeContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut object = Map::<String, Value>::deserialize(deserializer)?;

        let sections = match object.remove("sections") {
            Some(nested @ Value::Object(_)) => {
                LayoutSections::deserialize(nested).map_err(serde::de::Error::custom)?
            }
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "home `sections` must be an object, found {}",
                    json_kind(&other)
                )))
            }
            None => LayoutSections {
                section_header: object.remove("sectionHeader").unwrap_or(Value::Null),
                children: object.remove("children").unwrap_or(Value::Null),
                section_footer: object.remove("sectionFooter").unwrap_or(Value::Null),
            },
        };

        Ok(HomeContent {
            sections,
            extra: object,
        })
    }
}

/// Composed, render-ready page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub sections: LayoutSections,
}

impl Layout {
    /// Layout of the home route itself
    pub fn from_home(home: HomeContent) -> Self {
        Self {
            sections: home.sections,
        }
    }

    /// Substitute a route's children into the home header/footer template
    pub fn compose(home: HomeContent, route_children: Value) -> Self {
        Self {
            sections: LayoutSections {
                section_header: home.sections.section_header,
                children: route_children,
                section_footer: home.sections.section_footer,
            },
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
