//! Localized names and descriptions of difference codes.
//!
//! Bundles are YAML maps from code string to `{name, description}`.
//! Descriptions use positional `{0}`, `{1}`... placeholders. Loaded bundles are
//! cached per locale in a bounded LRU map so that each locale is loaded at most
//! once while its entry is resident.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const EMBEDDED_BUNDLE: &str = include_str!("../../resources/messages.yaml");

/// A locale tag such as `en` or `en-US`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Creates a locale, accepting both `en_US` and `en-US` spellings
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().replace('_', "-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language part of the tag (`en` for `en-US`)
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    fn file_suffix(&self) -> String {
        self.0.replace('-', "_")
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en")
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Locale {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub description: String,
}

/// One locale's bundle
#[derive(Debug, Clone)]
pub struct Messages {
    locale: Locale,
    entries: HashMap<String, Message>,
}

impl Messages {
    pub fn new(locale: Locale, entries: HashMap<String, Message>) -> Self {
        Self { locale, entries }
    }

    pub fn from_yaml_str(locale: Locale, yaml: &str) -> Result<Self> {
        let entries: HashMap<String, Message> = serde_yaml::from_str(yaml)?;
        Ok(Self::new(locale, entries))
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The message for a code string
    pub fn get(&self, code: &str) -> Result<&Message> {
        self.entries.get(code).ok_or_else(|| Error::MissingMessage {
            code: code.to_string(),
            locale: self.locale.to_string(),
        })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overrides entries with those of a more specific bundle
    fn overlay(&mut self, other: Messages) {
        self.entries.extend(other.entries);
    }
}

/// Substitutes `{0}`, `{1}`... with `params`. Placeholders without a matching
/// parameter, and braces that do not form a placeholder, are kept verbatim.
pub fn format_message(template: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after.find('}').and_then(|close| {
            let key = &after[..close];
            let is_index = !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit());
            is_index.then_some((key, close))
        });

        match placeholder {
            Some((key, close)) => {
                match key.parse::<usize>().ok().and_then(|i| params.get(i)) {
                    Some(param) => out.push_str(param),
                    None => out.push_str(&rest[open..open + close + 2]),
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Loads the bundle of a locale. Loading may block on IO.
pub trait MessageSource: Send + Sync {
    fn load(&self, locale: &Locale) -> Result<Messages>;
}

/// The English bundle compiled into the binary, served for every locale
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedMessages;

impl MessageSource for EmbeddedMessages {
    fn load(&self, locale: &Locale) -> Result<Messages> {
        Messages::from_yaml_str(locale.clone(), EMBEDDED_BUNDLE)
    }
}

/// Bundles read from `messages.yaml`, `messages_<lang>.yaml` and
/// `messages_<lang>_<REGION>.yaml` in a directory, the more specific files
/// overriding entries of the less specific ones.
#[derive(Debug, Clone)]
pub struct DirectoryMessages {
    root: PathBuf,
}

impl DirectoryMessages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, locale: &Locale) -> Vec<PathBuf> {
        let mut names = vec!["messages.yaml".to_string(), format!("messages_{}.yaml", locale.language())];
        let full = format!("messages_{}.yaml", locale.file_suffix());
        if !names.contains(&full) {
            names.push(full);
        }
        names.into_iter().map(|n| self.root.join(n)).collect()
    }
}

impl MessageSource for DirectoryMessages {
    fn load(&self, locale: &Locale) -> Result<Messages> {
        let mut bundle: Option<Messages> = None;

        for path in self.candidates(locale) {
            if !path.is_file() {
                continue;
            }
            tracing::debug!(path = %path.display(), locale = %locale, "Reading message bundle");
            let content = std::fs::read_to_string(&path)?;
            let layer = Messages::from_yaml_str(locale.clone(), &content)?;
            match bundle.as_mut() {
                Some(base) => base.overlay(layer),
                None => bundle = Some(layer),
            }
        }

        bundle.ok_or_else(|| Error::MissingBundle(format!("{locale} in {}", self.root.display())))
    }
}

struct CachedMessages {
    messages: Arc<Messages>,
    last_used: u64,
}

#[derive(Default)]
struct LocaleCache {
    entries: HashMap<Locale, CachedMessages>,
    clock: u64,
}

/// Per-locale cache in front of a [`MessageSource`]
pub struct MessageRegistry<S> {
    source: S,
    capacity: usize,
    // Held across the load, so concurrent first requests for a locale wait
    // for one load instead of racing.
    cache: Mutex<LocaleCache>,
}

impl<S: MessageSource> MessageRegistry<S> {
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new(source: S) -> Self {
        Self::with_capacity(source, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(source: S, capacity: usize) -> Self {
        Self {
            source,
            capacity: capacity.max(1),
            cache: Mutex::new(LocaleCache::default()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The bundle of `locale`, loading it on first use
    pub fn messages(&self, locale: &Locale) -> Result<Arc<Messages>> {
        let mut guard = self.cache.lock();
        let cache = &mut *guard;
        cache.clock += 1;
        let now = cache.clock;

        if let Some(entry) = cache.entries.get_mut(locale) {
            entry.last_used = now;
            return Ok(Arc::clone(&entry.messages));
        }

        tracing::debug!(locale = %locale, "Loading message bundle");
        let messages = Arc::new(self.source.load(locale)?);

        if cache.entries.len() >= self.capacity {
            let oldest = cache
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(locale, _)| locale.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(locale = %oldest, "Evicting message bundle");
                cache.entries.remove(&oldest);
            }
        }

        cache.entries.insert(
            locale.clone(),
            CachedMessages {
                messages: Arc::clone(&messages),
                last_used: now,
            },
        );
        Ok(messages)
    }

    /// Number of locales currently resident
    pub fn cached_locales(&self) -> usize {
        self.cache.lock().entries.len()
    }
}

/// The process-wide registry over the embedded bundle
pub fn default_registry() -> &'static MessageRegistry<EmbeddedMessages> {
    static REGISTRY: Lazy<MessageRegistry<EmbeddedMessages>> = Lazy::new(|| MessageRegistry::new(EmbeddedMessages));
    &REGISTRY
}
