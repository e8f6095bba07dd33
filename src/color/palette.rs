//! Color and gradient resolver
//!
//! Maps the ids used in effect settings to concrete colors and gradients.
//! Lookups fail with [`Error::NotFound`]; effects go through the
//! `*_or_fallback` variants so that a dangling id never stops rendering.

use std::collections::BTreeMap;

use log::warn;

use crate::color::{Gradient, Rgb, rgb_from_array};
use crate::error::{EntityKind, Error, Result};

/// Color used when a color id cannot be resolved
pub const FALLBACK_COLOR: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

/// Resolved color and gradient tables
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: BTreeMap<String, Rgb>,
    gradients: BTreeMap<String, Gradient>,
}

impl Palette {
    /// Build a palette from configuration tables
    ///
    /// Empty gradients are skipped; configuration validation rejects them
    /// before they can reach this point.
    pub fn from_tables(
        colors: &BTreeMap<String, [u8; 3]>,
        gradients: &BTreeMap<String, Vec<[u8; 3]>>,
    ) -> Self {
        Self {
            colors: colors
                .iter()
                .map(|(id, rgb)| (id.clone(), rgb_from_array(*rgb)))
                .collect(),
            gradients: gradients
                .iter()
                .filter_map(|(id, stops)| Some((id.clone(), Gradient::from_arrays(stops)?)))
                .collect(),
        }
    }

    pub fn resolve_color(&self, id: &str) -> Result<Rgb> {
        self.colors
            .get(id)
            .copied()
            .ok_or_else(|| Error::not_found(EntityKind::Color, id))
    }

    pub fn resolve_gradient(&self, id: &str) -> Result<&Gradient> {
        self.gradients
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::Gradient, id))
    }

    /// Resolve a color, falling back to [`FALLBACK_COLOR`]
    pub fn color_or_fallback(&self, id: &str) -> Rgb {
        self.resolve_color(id).unwrap_or_else(|err| {
            warn!("palette: {err}, using fallback color");
            FALLBACK_COLOR
        })
    }

    /// Resolve a gradient, falling back to a single [`FALLBACK_COLOR`] stop
    pub fn gradient_or_fallback(&self, id: &str) -> Gradient {
        match self.resolve_gradient(id) {
            Ok(gradient) => gradient.clone(),
            Err(err) => {
                warn!("palette: {err}, using fallback gradient");
                Gradient::solid(FALLBACK_COLOR)
            }
        }
    }

    pub fn has_color(&self, id: &str) -> bool {
        self.colors.contains_key(id)
    }

    pub fn has_gradient(&self, id: &str) -> bool {
        self.gradients.contains_key(id)
    }
}
