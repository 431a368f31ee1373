// Translation store. Loads every locale's JSON tree once at startup, flattens
// nested keys into dotted paths, and answers lookups with English as the
// fallback locale. Immutable after `load` finishes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A language tag selecting which translation table to consult.
/// `En` is the fallback for every missing key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Pl,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Pl, Locale::Es];
    pub const DEFAULT: Locale = Locale::En;

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pl => "pl",
            Locale::Es => "es",
        }
    }

    /// Case-insensitive parse, tolerant of region suffixes ("es-ES" -> Es).
    pub fn parse(value: &str) -> Option<Self> {
        let lang = value.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match lang.as_str() {
            "en" => Some(Locale::En),
            "pl" => Some(Locale::Pl),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }
}

type FlatTranslations = HashMap<String, String>;

pub struct I18n {
    tables: HashMap<Locale, FlatTranslations>,
}

impl I18n {
    /// Load every supported locale from `locales_dir`.
    ///
    /// Each locale may be a single `<locale>.json` document or a `<locale>/`
    /// directory of JSON/JSONC fragments merged by relative path into a
    /// namespaced tree. A locale that fails to load is logged and left empty;
    /// loading never fails as a whole.
    pub async fn load(locales_dir: impl AsRef<Path>) -> Self {
        let locales_dir = locales_dir.as_ref();
        let mut tables = HashMap::new();

        for locale in Locale::ALL {
            let table = match load_locale(locales_dir, locale).await {
                Ok(tree) => {
                    let mut flat = FlatTranslations::new();
                    flatten(&tree, "", &mut flat);
                    tracing::info!(locale = locale.as_str(), keys = flat.len(), "Loaded locale");
                    flat
                }
                Err(err) => {
                    tracing::error!(locale = locale.as_str(), "Failed to load locale: {err:#}");
                    FlatTranslations::new()
                }
            };
            tables.insert(locale, table);
        }

        Self { tables }
    }

    /// Build a store directly from flattened tables. Used by tests and by
    /// callers that already hold translations in memory.
    pub fn from_tables(tables: HashMap<Locale, FlatTranslations>) -> Self {
        Self { tables }
    }

    /// Resolve `key` in `locale`, falling back to the default locale and
    /// finally to the key itself. Never fails.
    pub fn translate(&self, locale: Locale, key: &str) -> String {
        self.lookup(locale, key).unwrap_or(key).to_string()
    }

    /// Like [`translate`](Self::translate), substituting every `{name}`
    /// placeholder whose name appears in `vars`. Unmatched placeholders are
    /// left verbatim.
    pub fn translate_with(&self, locale: Locale, key: &str, vars: &[(&str, &str)]) -> String {
        let mut text = self.translate(locale, key);
        for (name, value) in vars {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.tables
                    .get(&Locale::DEFAULT)
                    .and_then(|table| table.get(key))
            })
            .map(String::as_str)
    }
}

/// A translate function bound to one resolved locale. Handlers receive this
/// instead of reaching for any global store.
#[derive(Clone)]
pub struct Translator {
    i18n: Arc<I18n>,
    locale: Locale,
}

impl Translator {
    pub fn new(i18n: Arc<I18n>, locale: Locale) -> Self {
        Self { i18n, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn t(&self, key: &str) -> String {
        self.i18n.translate(self.locale, key)
    }

    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        self.i18n.translate_with(self.locale, key, vars)
    }

    /// Same store, different locale. Used when a reply must be rendered in a
    /// locale the user just switched to.
    pub fn for_locale(&self, locale: Locale) -> Self {
        Self {
            i18n: Arc::clone(&self.i18n),
            locale,
        }
    }
}

async fn load_locale(locales_dir: &Path, locale: Locale) -> anyhow::Result<serde_json::Value> {
    let dir_form = locales_dir.join(locale.as_str());
    if dir_form.is_dir() {
        return load_locale_dir(&dir_form).await;
    }

    let file_form = locales_dir.join(format!("{}.json", locale.as_str()));
    let content = tokio::fs::read_to_string(&file_form).await?;
    Ok(serde_json::from_str(&strip_jsonc_comments(&content))?)
}

/// Merge every JSON/JSONC fragment under `dir` into one nested object, using
/// the fragment's relative path (minus extension) as its namespace.
async fn load_locale_dir(dir: &Path) -> anyhow::Result<serde_json::Value> {
    let mut merged = serde_json::Map::new();

    for file in json_files(dir)? {
        let content = tokio::fs::read_to_string(&file).await?;
        let fragment: serde_json::Value = serde_json::from_str(&strip_jsonc_comments(&content))?;

        let namespace: Vec<String> = file
            .strip_prefix(dir)
            .unwrap_or(&file)
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        insert_namespaced(&mut merged, &namespace, fragment);
    }

    Ok(serde_json::Value::Object(merged))
}

fn insert_namespaced(
    root: &mut serde_json::Map<String, serde_json::Value>,
    namespace: &[String],
    fragment: serde_json::Value,
) {
    let Some((leaf, parents)) = namespace.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = current
            .entry(segment.clone())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
            .as_object_mut()
            .expect("namespace segment is always inserted as an object");
    }

    // Merge at the leaf so `en/modules.json` and `en/modules/extra.json` can
    // both contribute keys under "modules".
    match (
        current
            .entry(leaf.clone())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new())),
        fragment,
    ) {
        (serde_json::Value::Object(existing), serde_json::Value::Object(incoming)) => {
            existing.extend(incoming);
        }
        (slot, fragment) => *slot = fragment,
    }
}

fn json_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(json_files(&path)?);
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("jsonc")
        ) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Strip `//` and `/* */` comments so JSONC fragments parse as plain JSON.
/// String literals are respected, including escaped quotes.
fn strip_jsonc_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn flatten(value: &serde_json::Value, prefix: &str, out: &mut FlatTranslations) {
    let serde_json::Value::Object(map) = value else {
        return;
    };

    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            serde_json::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            serde_json::Value::Object(_) => flatten(value, &full_key, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(en: serde_json::Value, pl: serde_json::Value) -> I18n {
        let mut tables = HashMap::new();
        let mut en_flat = FlatTranslations::new();
        flatten(&en, "", &mut en_flat);
        let mut pl_flat = FlatTranslations::new();
        flatten(&pl, "", &mut pl_flat);
        tables.insert(Locale::En, en_flat);
        tables.insert(Locale::Pl, pl_flat);
        tables.insert(Locale::Es, FlatTranslations::new());
        I18n::from_tables(tables)
    }

    #[test]
    fn falls_back_to_default_locale() {
        let i18n = store(
            serde_json::json!({ "greeting": "hello" }),
            serde_json::json!({}),
        );

        assert_eq!(i18n.translate(Locale::Pl, "greeting"), "hello");
    }

    #[test]
    fn unknown_key_returns_itself() {
        let i18n = store(serde_json::json!({}), serde_json::json!({}));

        assert_eq!(i18n.translate(Locale::Es, "missing.key"), "missing.key");
    }

    #[test]
    fn requested_locale_wins_over_default() {
        let i18n = store(
            serde_json::json!({ "greeting": "hello" }),
            serde_json::json!({ "greeting": "cześć" }),
        );

        assert_eq!(i18n.translate(Locale::Pl, "greeting"), "cześć");
    }

    #[test]
    fn substitutes_known_placeholders_only() {
        let i18n = store(
            serde_json::json!({ "msg": "hi {who}, meet {other}" }),
            serde_json::json!({}),
        );

        let text = i18n.translate_with(Locale::En, "msg", &[("who", "world")]);
        assert_eq!(text, "hi world, meet {other}");
    }

    #[test]
    fn nested_keys_flatten_with_fallback_and_vars() {
        // en = {"a": {"b": "hello {x}"}}, pl = {} per the dispatch contract.
        let i18n = store(
            serde_json::json!({ "a": { "b": "hello {x}" } }),
            serde_json::json!({}),
        );

        assert_eq!(
            i18n.translate_with(Locale::Pl, "a.b", &[("x", "world")]),
            "hello world"
        );
    }

    #[test]
    fn strips_line_and_block_comments_outside_strings() {
        let input = r#"{
            // a line comment
            "key": "value /* not a comment */",
            /* block
               comment */
            "other": "https://example.com"
        }"#;

        let parsed: serde_json::Value =
            serde_json::from_str(&strip_jsonc_comments(input)).unwrap();
        assert_eq!(parsed["key"], "value /* not a comment */");
        assert_eq!(parsed["other"], "https://example.com");
    }

    #[test]
    fn parses_region_tags() {
        assert_eq!(Locale::parse("es-ES"), Some(Locale::Es));
        assert_eq!(Locale::parse("PL"), Some(Locale::Pl));
        assert_eq!(Locale::parse("de"), None);
    }

    #[tokio::test]
    async fn loads_single_document_locales() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("en.json"),
            r#"{ "modules": { "ping": { "response": "Pong!" } } }"#,
        )
        .unwrap();

        let i18n = I18n::load(dir.path()).await;
        assert_eq!(i18n.translate(Locale::En, "modules.ping.response"), "Pong!");
        // pl.json is missing: lookups still fall back to en.
        assert_eq!(i18n.translate(Locale::Pl, "modules.ping.response"), "Pong!");
    }

    #[tokio::test]
    async fn merges_locale_directories_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let en = dir.path().join("en");
        std::fs::create_dir_all(en.join("modules")).unwrap();
        std::fs::write(en.join("common.jsonc"), r#"{ "error": "Error" } // tail"#).unwrap();
        std::fs::write(en.join("modules/ping.json"), r#"{ "response": "Pong!" }"#).unwrap();

        let i18n = I18n::load(dir.path()).await;
        assert_eq!(i18n.translate(Locale::En, "common.error"), "Error");
        assert_eq!(i18n.translate(Locale::En, "modules.ping.response"), "Pong!");
    }

    #[tokio::test]
    async fn malformed_locale_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{ "ok": "yes" }"#).unwrap();
        std::fs::write(dir.path().join("pl.json"), "{ not json").unwrap();

        let i18n = I18n::load(dir.path()).await;
        assert_eq!(i18n.translate(Locale::Pl, "ok"), "yes");
    }
}
