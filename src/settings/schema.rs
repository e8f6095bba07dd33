use crate::color::Palette;
use crate::error::{EntityKind, Error, Result};
use crate::settings::{SettingValue, Settings};

/// Expected shape of a single setting
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingKind {
    Bool,
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Text,
    /// Text restricted to a fixed set of values
    Choice(&'static [&'static str]),
    /// Text naming an entry of the color table
    Color,
    /// Text naming an entry of the gradient table
    Gradient,
}

/// Required keys of a settings scope together with their kinds
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    entries: &'static [(&'static str, SettingKind)],
}

impl Schema {
    pub const fn new(entries: &'static [(&'static str, SettingKind)]) -> Self {
        Self { entries }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn kind(&self, key: &str) -> Option<SettingKind> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.kind(key).is_some()
    }

    /// Check a partial update: every key must be known and well typed
    pub fn validate(&self, settings: &Settings, palette: &Palette) -> Result<()> {
        for (key, value) in settings {
            let Some(kind) = self.kind(key) else {
                return Err(Error::validation(format!("unknown setting `{key}`")));
            };
            kind.check(key, value, palette)?;
        }
        Ok(())
    }

    /// Check a full settings map: every schema key must be present
    pub fn validate_complete(&self, settings: &Settings, palette: &Palette) -> Result<()> {
        if let Some(missing) = self.keys().find(|key| !settings.contains_key(key)) {
            return Err(Error::validation(format!("missing setting `{missing}`")));
        }
        self.validate(settings, palette)
    }
}

impl SettingKind {
    fn check(self, key: &str, value: &SettingValue, palette: &Palette) -> Result<()> {
        let mismatch = |expected: &str| {
            Error::validation(format!(
                "setting `{key}` must be {expected}, got {}",
                value.type_name()
            ))
        };

        match self {
            Self::Bool => {
                value.as_bool().ok_or_else(|| mismatch("bool"))?;
            }
            Self::Int { min, max } => {
                let number = value.as_int().ok_or_else(|| mismatch("int"))?;
                if number < min || number > max {
                    return Err(Error::validation(format!(
                        "setting `{key}` must be within {min}..={max}, got {number}"
                    )));
                }
            }
            Self::Float { min, max } => {
                let number = value.as_float().ok_or_else(|| mismatch("number"))?;
                if !(min..=max).contains(&number) {
                    return Err(Error::validation(format!(
                        "setting `{key}` must be within {min}..={max}, got {number}"
                    )));
                }
            }
            Self::Text => {
                value.as_text().ok_or_else(|| mismatch("text"))?;
            }
            Self::Choice(options) => {
                let text = value.as_text().ok_or_else(|| mismatch("text"))?;
                if !options.contains(&text) {
                    return Err(Error::validation(format!(
                        "setting `{key}` must be one of {options:?}, got `{text}`"
                    )));
                }
            }
            Self::Color => {
                let id = value.as_text().ok_or_else(|| mismatch("a color id"))?;
                if !palette.has_color(id) {
                    return Err(Error::not_found(EntityKind::Color, id));
                }
            }
            Self::Gradient => {
                let id = value.as_text().ok_or_else(|| mismatch("a gradient id"))?;
                if !palette.has_gradient(id) {
                    return Err(Error::not_found(EntityKind::Gradient, id));
                }
            }
        }
        Ok(())
    }
}
