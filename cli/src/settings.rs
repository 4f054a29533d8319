use anyhow::{Context, bail};
use sapper_core::{CellCount, Coord, GameConfig, Preset};
use serde::Deserialize;
use std::path::Path;

/// Contents of the optional TOML settings file, every field can be overridden from the command line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub games: Option<u32>,
    pub seed: Option<u64>,
    pub board: BoardSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BoardSettings {
    pub preset: Option<Preset>,
    pub rows: Option<Coord>,
    pub cols: Option<Coord>,
    pub mines: Option<CellCount>,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

impl BoardSettings {
    /// Later values win field by field, a lone preset replaces the whole board.
    pub fn merge(self, other: BoardSettings) -> BoardSettings {
        if other.preset.is_some() && !other.has_dimensions() {
            return other;
        }
        BoardSettings {
            preset: other.preset.or(self.preset),
            rows: other.rows.or(self.rows),
            cols: other.cols.or(self.cols),
            mines: other.mines.or(self.mines),
        }
    }

    fn has_dimensions(&self) -> bool {
        self.rows.is_some() || self.cols.is_some() || self.mines.is_some()
    }

    /// Explicit dimensions take precedence over a preset, with no board given at all the beginner preset is used.
    pub fn resolve(&self) -> anyhow::Result<GameConfig> {
        match (self.rows, self.cols, self.mines) {
            (Some(rows), Some(cols), Some(mines)) => Ok(GameConfig::new((rows, cols), mines)?),
            (None, None, None) => Ok(self.preset.unwrap_or(Preset::Beginner).config()),
            _ => bail!("rows, cols and mines have to be given together"),
        }
    }
}
