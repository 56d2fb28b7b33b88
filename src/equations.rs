//! Per-slot color/alpha formula pairs and the apply-all policy that drives them.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{TexError, TexResult};
use crate::formula::Formula;
use crate::formula::error::FormulaError;

/// Number of slots in a default [`Equations`] / [`EquationsConfig`].
pub const DEFAULT_SLOTS: usize = 4;

/// Which of a slot's two formulas a result refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Color,
    Alpha,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Color => "color",
            Self::Alpha => "alpha",
        })
    }
}

/// Formula text and visibility for one slot, as edited by the user or loaded from config.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EquationSource {
    pub color: String,
    pub alpha: String,
    #[serde(default)]
    pub visible: bool,
}

impl EquationSource {
    /// Slot `i` shows image `i` unchanged; only slot 0 starts visible.
    pub fn default_for(slot: usize) -> Self {
        Self {
            color: format!("I{slot}"),
            alpha: format!("I{slot}"),
            visible: slot == 0,
        }
    }
}

/// One output slot: the accepted color and alpha formulas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageEquation {
    pub color: Formula,
    pub alpha: Formula,
    pub visible: bool,
}

impl ImageEquation {
    pub fn formula(&self, channel: Channel) -> &Formula {
        match channel {
            Channel::Color => &self.color,
            Channel::Alpha => &self.alpha,
        }
    }

    fn formula_mut(&mut self, channel: Channel) -> &mut Formula {
        match channel {
            Channel::Color => &mut self.color,
            Channel::Alpha => &mut self.alpha,
        }
    }

    /// Return `true` when either text differs from what was last accepted.
    pub fn has_changes(&self, src: &EquationSource) -> bool {
        self.color.has_changes(&src.color) || self.alpha.has_changes(&src.alpha)
    }
}

/// A formula in one slot failed to apply.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("equation {slot} {channel}: {error}")]
pub struct EquationError {
    pub slot: usize,
    pub channel: Channel,
    #[source]
    pub error: FormulaError,
}

/// Every failure from one [`Equations::apply_all`] call.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{} formula(s) failed to apply; first: {}", .0.len(), first(.0))]
pub struct ApplyErrors(pub Vec<EquationError>);

fn first(errs: &[EquationError]) -> String {
    errs.first().map(ToString::to_string).unwrap_or_default()
}

/// The ordered set of output slots.
#[derive(Clone, Debug, PartialEq)]
pub struct Equations {
    slots: Vec<ImageEquation>,
}

impl Default for Equations {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

impl Equations {
    /// `n` slots with no accepted formulas.
    pub fn new(n: usize) -> Self {
        Self {
            slots: vec![ImageEquation::default(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&ImageEquation> {
        self.slots.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageEquation> {
        self.slots.iter()
    }

    /// Apply every visible source to its slot.
    ///
    /// Successful formulas are kept even when others fail; nothing is rolled back. Each
    /// failure is reported with its slot and channel and leaves that formula's previous
    /// accepted state in place. `sources` beyond the slot count are ignored, and slots
    /// without a source are left as they are.
    pub fn apply_all(
        &mut self,
        sources: &[EquationSource],
        num_images: usize,
    ) -> Result<(), ApplyErrors> {
        let mut errors = Vec::new();

        for (slot, (eq, src)) in self.slots.iter_mut().zip(sources).enumerate() {
            eq.visible = src.visible;
            if !src.visible {
                continue;
            }
            for (channel, text) in [(Channel::Color, &src.color), (Channel::Alpha, &src.alpha)] {
                if let Err(error) = eq.formula_mut(channel).apply_formula(text, num_images) {
                    tracing::warn!(slot, %channel, %error, "formula rejected");
                    errors.push(EquationError {
                        slot,
                        channel,
                        error,
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApplyErrors(errors))
        }
    }

    /// Return `true` if any visible source differs from its slot's accepted text.
    pub fn has_changes(&self, sources: &[EquationSource]) -> bool {
        self.slots
            .iter()
            .zip(sources)
            .any(|(eq, src)| src.visible && eq.has_changes(src))
    }
}

/// Serialized slot list, the configuration file the CLI consumes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EquationsConfig {
    pub equations: Vec<EquationSource>,
}

impl Default for EquationsConfig {
    fn default() -> Self {
        Self {
            equations: (0..DEFAULT_SLOTS).map(EquationSource::default_for).collect(),
        }
    }
}

impl EquationsConfig {
    pub fn from_json_str(s: &str) -> TexResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| TexError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> TexResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open equations config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| TexError::serde(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> TexResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TexError::serde(e.to_string()))
    }

    pub fn validate(&self) -> TexResult<()> {
        if self.equations.is_empty() {
            return Err(TexError::validation("equations config has no slots"));
        }
        Ok(())
    }

    /// Slots sized to this config, with nothing applied yet.
    pub fn new_equations(&self) -> Equations {
        Equations::new(self.equations.len())
    }
}

#[cfg(test)]
#[path = "../tests/unit/equations.rs"]
mod tests;
