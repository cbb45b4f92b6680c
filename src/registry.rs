//! Source registry: which homepages to scrape and how to read headlines from each.
//!
//! The registry is a YAML list (see `src/sources.yaml`, embedded into the binary)
//! that is resolved once at startup into typed [`Source`] records. Nothing in a
//! [`Registry`] changes during a run.
//!
//! # Resolution
//!
//! The YAML format is forgiving: `limit` and `start_index` may be a scalar or a
//! list, `selector` and `selectors` are both accepted, and attributes default to
//! `text`. Resolution turns that into:
//!
//! - [`Selectors::Single`] or [`Selectors::Multi`], each holding fully resolved
//!   [`SelectorPlan`]s (scalar values broadcast, lists matched by position)
//! - [`TextSource`] instead of the magic `"text"` string
//! - an explicit [`ExtractionMode`] instead of guessing from the URL
//!
//! CSS selector syntax is not checked here; a bad selector fails only the source
//! that declares it, when it is scraped.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// The registry compiled into the binary.
const EMBEDDED_REGISTRY: &str = include_str!("sources.yaml");

/// Selector used when an entry declares neither `selector` nor `selectors`.
pub const DEFAULT_SELECTOR: &str = "h2";

/// Headline cap used when an entry declares no `limit`.
pub const DEFAULT_LIMIT: usize = 15;

/// Errors raised while loading, validating or querying the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("registry contains no sources")]
    Empty,

    #[error("duplicate source name: {0}")]
    DuplicateName(String),

    #[error("source {name}: invalid URL {url:?}: {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("source {name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("unknown source: {0}")]
    UnknownSource(String),
}

impl RegistryError {
    fn invalid(name: &str, reason: impl Into<String>) -> Self {
        RegistryError::Invalid {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Where the text of a matched element comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum TextSource {
    /// The element's visible text (written as `text` in the registry).
    #[default]
    VisibleText,
    /// The value of a named attribute, e.g. `aria-label`.
    Attribute(String),
}

impl From<String> for TextSource {
    fn from(value: String) -> Self {
        if value.trim() == "text" {
            TextSource::VisibleText
        } else {
            TextSource::Attribute(value.trim().to_string())
        }
    }
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::VisibleText => f.write_str("text"),
            TextSource::Attribute(name) => f.write_str(name),
        }
    }
}

/// How headlines are pulled out of a page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Match the configured CSS selector and read text/attributes.
    #[default]
    Standard,
    /// Ignore the selector and read `alt` text from every `<img alt>`, keeping
    /// the window `[start_index, start_index + num_to_fetch)` and dropping any
    /// alt text that mentions an exclusion term.
    ImageAlt {
        exclusions: Vec<String>,
        num_to_fetch: Option<usize>,
    },
}

/// One selector with its own cap and offset. The offset only applies in
/// [`ExtractionMode::ImageAlt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPlan {
    pub selector: String,
    pub limit: usize,
    pub start_index: usize,
}

/// Single- or multi-selector configuration for a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selectors {
    Single(SelectorPlan),
    /// Selectors are run in declaration order and their results concatenated.
    Multi(Vec<SelectorPlan>),
}

impl Selectors {
    /// All plans in the order they should run.
    pub fn plans(&self) -> &[SelectorPlan] {
        match self {
            Selectors::Single(plan) => std::slice::from_ref(plan),
            Selectors::Multi(plans) => plans,
        }
    }
}

/// A fully resolved news source.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub url: Url,
    pub selectors: Selectors,
    pub title_attribute: TextSource,
    pub fallback_attribute: TextSource,
    pub mode: ExtractionMode,
    /// Scraped when the user does not pick sources explicitly.
    pub default_selected: bool,
}

/// Scalar-or-list registry values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Copy> OneOrMany<T> {
    /// Expand to exactly `count` values, broadcasting a scalar.
    fn expand(&self, count: usize, field: &str, name: &str) -> Result<Vec<T>, RegistryError> {
        match self {
            OneOrMany::One(value) => Ok(vec![*value; count]),
            OneOrMany::Many(values) if values.len() == count => Ok(values.clone()),
            OneOrMany::Many(values) => Err(RegistryError::invalid(
                name,
                format!(
                    "`{field}` has {} values but {count} selectors are configured",
                    values.len()
                ),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeKind {
    #[default]
    Standard,
    ImageAlt,
}

/// A registry entry as written in YAML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSource {
    name: String,
    url: String,
    selector: Option<String>,
    selectors: Option<Vec<String>>,
    limit: Option<OneOrMany<usize>>,
    start_index: Option<OneOrMany<usize>>,
    #[serde(default)]
    title_attribute: TextSource,
    #[serde(default)]
    fallback_attribute: TextSource,
    #[serde(default)]
    mode: ModeKind,
    exclude: Option<Vec<String>>,
    num_to_fetch: Option<usize>,
    #[serde(default)]
    default: bool,
}

impl RawSource {
    fn resolve(self) -> Result<Source, RegistryError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::invalid("<unnamed>", "`name` must not be empty"));
        }

        let url = Url::parse(self.url.trim()).map_err(|e| RegistryError::InvalidUrl {
            name: name.clone(),
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RegistryError::InvalidUrl {
                name,
                url: self.url,
                reason: "only http and https URLs can be scraped".to_string(),
            });
        }

        let limit = self.limit.unwrap_or(OneOrMany::One(DEFAULT_LIMIT));
        let start_index = self.start_index.unwrap_or(OneOrMany::One(0));

        let selectors = match (self.selector, self.selectors) {
            (Some(_), Some(_)) => {
                return Err(RegistryError::invalid(
                    &name,
                    "declare either `selector` or `selectors`, not both",
                ));
            }
            (Some(selector), None) => single_plan(&name, selector, &limit, &start_index)?,
            (None, None) => single_plan(&name, DEFAULT_SELECTOR.to_string(), &limit, &start_index)?,
            (None, Some(list)) => {
                if list.is_empty() {
                    return Err(RegistryError::invalid(&name, "`selectors` must not be empty"));
                }
                let limits = limit.expand(list.len(), "limit", &name)?;
                let starts = start_index.expand(list.len(), "start_index", &name)?;
                let plans = list
                    .into_iter()
                    .zip(limits)
                    .zip(starts)
                    .map(|((selector, limit), start_index)| SelectorPlan {
                        selector,
                        limit,
                        start_index,
                    })
                    .collect();
                Selectors::Multi(plans)
            }
        };

        let mode = match self.mode {
            ModeKind::Standard => {
                if self.exclude.is_some() || self.num_to_fetch.is_some() {
                    return Err(RegistryError::invalid(
                        &name,
                        "`exclude` and `num_to_fetch` require `mode: image_alt`",
                    ));
                }
                ExtractionMode::Standard
            }
            ModeKind::ImageAlt => ExtractionMode::ImageAlt {
                exclusions: self
                    .exclude
                    .unwrap_or_default()
                    .into_iter()
                    .map(|term| term.trim().to_string())
                    .filter(|term| !term.is_empty())
                    .collect(),
                num_to_fetch: self.num_to_fetch,
            },
        };

        Ok(Source {
            name,
            url,
            selectors,
            title_attribute: self.title_attribute,
            fallback_attribute: self.fallback_attribute,
            mode,
            default_selected: self.default,
        })
    }
}

fn single_plan(
    name: &str,
    selector: String,
    limit: &OneOrMany<usize>,
    start_index: &OneOrMany<usize>,
) -> Result<Selectors, RegistryError> {
    let (OneOrMany::One(limit), OneOrMany::One(start_index)) = (limit, start_index) else {
        return Err(RegistryError::invalid(
            name,
            "list-valued `limit`/`start_index` need `selectors`",
        ));
    };
    Ok(Selectors::Single(SelectorPlan {
        selector,
        limit: *limit,
        start_index: *start_index,
    }))
}

/// The immutable table of configured sources, in display order.
#[derive(Debug, Clone)]
pub struct Registry {
    sources: Vec<Source>,
}

impl Registry {
    /// The registry shipped with the binary.
    pub fn embedded() -> Result<Self, RegistryError> {
        Self::from_yaml_str(EMBEDDED_REGISTRY)
    }

    /// Parse and validate a YAML registry.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        let raw: Vec<RawSource> = serde_yaml::from_str(yaml)?;
        if raw.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(raw.len());
        for entry in raw {
            let source = entry.resolve()?;
            if !seen.insert(source.name.to_lowercase()) {
                return Err(RegistryError::DuplicateName(source.name));
            }
            debug!(name = %source.name, url = %source.url, selectors = source.selectors.plans().len(), "Registered source");
            sources.push(source);
        }

        Ok(Self { sources })
    }

    /// Load a registry from a YAML file on disk.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, RegistryError> {
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RegistryError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let registry = Self::from_yaml_str(&yaml)?;
        info!(count = registry.len(), "Loaded source registry");
        Ok(registry)
    }

    /// Look a source up by name; exact match first, then case-insensitive.
    pub fn get(&self, name: &str) -> Option<&Source> {
        let name = name.trim();
        let lowered = name.to_lowercase();
        self.sources
            .iter()
            .find(|s| s.name == name)
            .or_else(|| self.sources.iter().find(|s| s.name.to_lowercase() == lowered))
    }

    /// Resolve user-chosen names, keeping the order they were given in.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Source>, RegistryError> {
        names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .ok_or_else(|| RegistryError::UnknownSource(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Sources preselected when nothing is chosen explicitly.
    pub fn defaults(&self) -> Vec<&Source> {
        self.sources.iter().filter(|s| s.default_selected).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
