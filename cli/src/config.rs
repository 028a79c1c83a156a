//! `~/.parley/config.toml`.
//!
//! The file is edited with `toml_edit` so user comments and unrelated keys survive writes. Reads
//! are lenient: a value of the wrong type or out of range is logged and treated as unset, and an
//! unparseable file yields the defaults.

use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use parley_protocol::BACKGROUND_SETTINGS_KEY;
use parley_protocol::BackgroundPattern;
use parley_protocol::BackgroundSettings;
use parley_protocol::settings::parse_hex_color;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Table as TomlTable;
use toml_edit::value;

use crate::atomic_write::write_atomic_text;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot determine home directory for config path")]
    NoHomeDir,
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("refusing to rewrite {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Values read from the config file. `None` means "use the built-in default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    pub max_length: Option<usize>,
    pub default_model: Option<String>,
    pub placeholder: Option<String>,
    pub reveal_min_delay_ms: Option<u64>,
    pub reveal_max_delay_ms: Option<u64>,
    pub near_bottom_rows: Option<u16>,
    pub background: BackgroundSettings,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> Result<Self, SettingsError> {
        let Some(home) = dirs::home_dir() else {
            return Err(SettingsError::NoHomeDir);
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<FileConfig, SettingsError> {
        let Some(doc) = self.read_document_lenient()? else {
            return Ok(FileConfig::default());
        };

        let composer = table(&doc, "composer");
        let reveal = table(&doc, "reveal");
        let viewport = table(&doc, "viewport");
        Ok(FileConfig {
            max_length: composer
                .and_then(|t| read_integer(t, "max_length"))
                .and_then(|n| positive(n, "composer.max_length")),
            default_model: composer.and_then(|t| read_string(t, "default_model")),
            placeholder: composer.and_then(|t| read_string(t, "placeholder")),
            reveal_min_delay_ms: reveal
                .and_then(|t| read_integer(t, "min_delay_ms"))
                .and_then(|n| in_range(n, "reveal.min_delay_ms")),
            reveal_max_delay_ms: reveal
                .and_then(|t| read_integer(t, "max_delay_ms"))
                .and_then(|n| in_range(n, "reveal.max_delay_ms")),
            near_bottom_rows: viewport
                .and_then(|t| read_integer(t, "near_bottom_rows"))
                .and_then(|n| in_range(n, "viewport.near_bottom_rows")),
            background: read_background(&doc),
        })
    }

    pub fn background_settings(&self) -> Result<BackgroundSettings, SettingsError> {
        Ok(self.load()?.background)
    }

    /// Validates and stores the background settings, keeping the rest of the file intact.
    pub fn set_background_settings(
        &self,
        settings: &BackgroundSettings,
    ) -> Result<(), SettingsError> {
        validate_background(settings)?;

        let content = self.read_string()?.unwrap_or_default();
        let mut doc = content
            .parse::<DocumentMut>()
            .map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let background = ensure_table_for_write(&mut doc, BACKGROUND_SETTINGS_KEY);
        background["pattern"] = value(settings.pattern.to_string());
        background["color"] = value(settings.color.clone());
        // Round so an f32 like 0.2 is not written as 0.20000000298023224.
        background["opacity"] = value((f64::from(settings.opacity) * 1000.0).round() / 1000.0);

        write_atomic_text(&self.path, &doc.to_string()).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), "saved background settings");
        Ok(())
    }

    fn read_string(&self) -> Result<Option<String>, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SettingsError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn read_document_lenient(&self) -> Result<Option<DocumentMut>, SettingsError> {
        let Some(content) = self.read_string()? else {
            return Ok(None);
        };
        match content.parse::<DocumentMut>() {
            Ok(doc) => Ok(Some(doc)),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "ignoring malformed config file: {err}"
                );
                Ok(None)
            }
        }
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".parley").join("config.toml")
}

pub fn validate_background(settings: &BackgroundSettings) -> Result<(), SettingsError> {
    if parse_hex_color(&settings.color).is_none() {
        return Err(SettingsError::Invalid {
            field: "color",
            reason: format!("expected #RRGGBB, got {:?}", settings.color),
        });
    }
    if !(0.0..=1.0).contains(&settings.opacity) {
        return Err(SettingsError::Invalid {
            field: "opacity",
            reason: format!("expected a value between 0 and 1, got {}", settings.opacity),
        });
    }
    Ok(())
}

fn read_background(doc: &DocumentMut) -> BackgroundSettings {
    let defaults = BackgroundSettings::default();
    let Some(background) = table(doc, BACKGROUND_SETTINGS_KEY) else {
        return defaults;
    };

    let pattern = read_string(background, "pattern")
        .and_then(|raw| match BackgroundPattern::from_str(&raw) {
            Ok(pattern) => Some(pattern),
            Err(_) => {
                tracing::warn!(pattern = %raw, "ignoring unknown background pattern");
                None
            }
        })
        .unwrap_or(defaults.pattern);
    let color = read_string(background, "color")
        .filter(|raw| {
            let valid = parse_hex_color(raw).is_some();
            if !valid {
                tracing::warn!(color = %raw, "ignoring malformed background color");
            }
            valid
        })
        .unwrap_or(defaults.color);
    let opacity = read_float(background, "opacity")
        .filter(|opacity| {
            let valid = (0.0..=1.0).contains(opacity);
            if !valid {
                tracing::warn!(opacity, "ignoring out-of-range background opacity");
            }
            valid
        })
        .map_or(defaults.opacity, |opacity| opacity as f32);

    BackgroundSettings {
        pattern,
        color,
        opacity,
    }
}

fn table<'a>(doc: &'a DocumentMut, key: &str) -> Option<&'a TomlTable> {
    doc.get(key).and_then(TomlItem::as_table)
}

fn read_string(table: &TomlTable, key: &str) -> Option<String> {
    let item = table.get(key)?;
    match item.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            tracing::warn!(key, "expected a string in config; ignoring");
            None
        }
    }
}

fn read_integer(table: &TomlTable, key: &str) -> Option<i64> {
    let item = table.get(key)?;
    match item.as_integer() {
        Some(n) => Some(n),
        None => {
            tracing::warn!(key, "expected an integer in config; ignoring");
            None
        }
    }
}

/// Accepts integers too, since `opacity = 1` is a natural thing to write.
fn read_float(table: &TomlTable, key: &str) -> Option<f64> {
    let item = table.get(key)?;
    match (item.as_float(), item.as_integer()) {
        (Some(f), _) => Some(f),
        (None, Some(n)) => Some(n as f64),
        (None, None) => {
            tracing::warn!(key, "expected a number in config; ignoring");
            None
        }
    }
}

fn in_range<T: TryFrom<i64>>(n: i64, key: &str) -> Option<T> {
    match T::try_from(n) {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = n, "config value out of range; ignoring");
            None
        }
    }
}

fn positive(n: i64, key: &str) -> Option<usize> {
    if n == 0 {
        tracing::warn!(key, "config value must be positive; ignoring");
        return None;
    }
    in_range(n, key)
}

fn ensure_table_for_write<'a>(doc: &'a mut DocumentMut, key: &str) -> &'a mut TomlTable {
    if doc.get(key).and_then(TomlItem::as_table).is_none() {
        let mut table = TomlTable::new();
        table.set_implicit(false);
        doc[key] = TomlItem::Table(table);
    }
    match &mut doc[key] {
        TomlItem::Table(table) => table,
        _ => unreachable!("expected `{key}` to be a table"),
    }
}
