//! Custom keyword resolution for export file-naming templates.
//!
//! Export templates may contain `{keyword}` tokens that the export framework
//! does not know. Each token names a field on the shot being exported, except
//! for the episode keyword (`{Episode}` by default) which yields the code of
//! the shot's episode.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use shotsync_common::{ResolveError, Result, CODE_FIELD};
use tracing::debug;

use crate::hierarchy::{ResolveOptions, ShotHierarchy, TrackItem};

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("keyword pattern is valid"))
}

/// Field path inside a `{keyword}` token.
///
/// Returns `None` unless `keyword` is a single brace-delimited, non-empty token.
pub fn strip_delimiters(keyword: &str) -> Option<&str> {
    let inner = keyword.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(['{', '}']) {
        return None;
    }
    Some(inner)
}

/// The distinct keywords referenced by `template`, braces stripped.
pub fn template_keywords(template: &str) -> BTreeSet<String> {
    token_pattern()
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// Variable substitution context for naming templates.
///
/// Supports variable substitution in strings using the `{varname}` syntax.
/// Tokens without a value are left in place.
///
/// # Example
///
/// ```
/// use shotsync::keywords::TemplateContext;
///
/// let ctx = TemplateContext::new()
///     .with_var("Episode", "FER_101")
///     .with_var("code", "SH010");
///
/// assert_eq!(ctx.substitute("{Episode}/{code}_comp"), "FER_101/SH010_comp");
/// assert_eq!(ctx.substitute("{code}_{version}"), "SH010_{version}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty template context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Set a variable.
    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    /// Get a variable value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// Substitute variables in a string in a single pass.
    ///
    /// Substituted values are not rescanned, so a value containing braces is
    /// inserted literally.
    pub fn substitute(&self, template: &str) -> String {
        token_pattern()
            .replace_all(template, |caps: &regex::Captures<'_>| {
                self.vars
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Substitute variables in a list of strings.
    pub fn substitute_all(&self, templates: &[String]) -> Vec<String> {
        templates.iter().map(|t| self.substitute(t)).collect()
    }
}

/// Resolves `{keyword}` tokens against the shot owning a track item.
pub struct KeywordResolver {
    hierarchy: Arc<ShotHierarchy>,
    episode_keyword: String,
}

impl KeywordResolver {
    pub fn new(hierarchy: Arc<ShotHierarchy>, episode_keyword: impl Into<String>) -> Self {
        Self {
            hierarchy,
            episode_keyword: episode_keyword.into(),
        }
    }

    /// Resolve a single `{keyword}` for `item`.
    ///
    /// The episode keyword yields the episode's code. Any other keyword names
    /// a field on the item's shot and yields its string form, or `""` when the
    /// shot has no such field. Thumbnails are never uploaded from here.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidKey`] when `keyword` is not a `{...}` token.
    /// - [`ResolveError::EntityNotFound`] when the owning shot (or its episode)
    ///   has no resolvable identity.
    /// - Any resolution error of the shot chain.
    pub async fn resolve_keyword(&self, keyword: &str, item: &TrackItem) -> Result<String> {
        let field = strip_delimiters(keyword).ok_or_else(|| {
            ResolveError::invalid_key(format!("'{keyword}' is not a {{keyword}} token"))
        })?;

        if field == self.episode_keyword {
            let episode = self.hierarchy.resolve_episode(&item.sequence).await?;
            return Ok(episode.get_string(CODE_FIELD));
        }

        if item.name.trim().is_empty() {
            return Err(ResolveError::not_found(
                self.hierarchy.config().shot_entity.as_str(),
                item.sequence.name.as_str(),
            ));
        }

        let shot = self
            .hierarchy
            .resolve_shot(item, ResolveOptions::without_thumbnails())
            .await?;
        let value = shot.get_string(field);

        debug!(shot = %item.name, keyword = field, value = %value, "custom resolver");
        Ok(value)
    }

    /// Replace every `{keyword}` token in `template`.
    ///
    /// Each distinct keyword is resolved once; text outside tokens is kept.
    pub async fn resolve_template(&self, template: &str, item: &TrackItem) -> Result<String> {
        let mut ctx = TemplateContext::new();
        for keyword in template_keywords(template) {
            let value = self.resolve_keyword(&format!("{{{keyword}}}"), item).await?;
            ctx.set(&keyword, &value);
        }
        Ok(ctx.substitute(template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_delimiters() {
        assert_eq!(strip_delimiters("{code}"), Some("code"));
        assert_eq!(
            strip_delimiters("{sg_sequence.Sequence.code}"),
            Some("sg_sequence.Sequence.code")
        );
        assert_eq!(strip_delimiters("code"), None);
        assert_eq!(strip_delimiters("{}"), None);
        assert_eq!(strip_delimiters("{a}{b}"), None);
        assert_eq!(strip_delimiters("{code"), None);
    }

    #[test]
    fn test_template_keywords() {
        let keywords = template_keywords("{Episode}/{code}/{code}_{sg_cut_in}.exr");
        let keywords: Vec<_> = keywords.into_iter().collect();
        assert_eq!(keywords, vec!["Episode", "code", "sg_cut_in"]);
        assert!(template_keywords("plain.exr").is_empty());
    }

    #[test]
    fn test_substitute() {
        let ctx = TemplateContext::new()
            .with_var("code", "SH010")
            .with_var("sg_cut_in", "1001");

        assert_eq!(ctx.substitute("{code}_{sg_cut_in}.exr"), "SH010_1001.exr");
        assert_eq!(ctx.substitute("{code}_{unknown}"), "SH010_{unknown}");
        assert_eq!(ctx.get("code"), Some("SH010"));
    }

    #[test]
    fn test_substitute_is_single_pass() {
        let ctx = TemplateContext::new()
            .with_var("a", "{b}")
            .with_var("b", "x");
        assert_eq!(ctx.substitute("{a}-{b}"), "{b}-x");
    }

    #[test]
    fn test_substitute_all() {
        let ctx = TemplateContext::new().with_var("code", "SH020");
        let out = ctx.substitute_all(&["{code}.nk".to_string(), "{code}.mov".to_string()]);
        assert_eq!(out, vec!["SH020.nk", "SH020.mov"]);
    }
}
