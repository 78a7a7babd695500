use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::*;

/// Ratio used when the requested one is missing, non-positive or not a number.
pub const DEFAULT_BOMB_RATIO: f64 = 24.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
    Mania,
    Custom,
}

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Self::Easy,
        Self::Normal,
        Self::Hard,
        Self::Expert,
        Self::Mania,
        Self::Custom,
    ];

    /// Board size and bomb ratio of a preset, `None` for [`Difficulty::Custom`].
    pub const fn parameters(self) -> Option<(Coord2, f64)> {
        use Difficulty::*;
        match self {
            Easy => Some(((9, 9), 12.345)),
            Normal => Some(((16, 16), 15.625)),
            Hard => Some(((30, 16), 20.625)),
            Expert => Some(((48, 24), 22.222)),
            Mania => Some(((64, 48), 25.293)),
            Custom => None,
        }
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "easy",
            Normal => "normal",
            Hard => "hard",
            Expert => "expert",
            Mania => "mania",
            Custom => "custom",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownDifficulty;

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown difficulty")
    }
}

impl core::error::Error for UnknownDifficulty {}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(UnknownDifficulty)
    }
}

/// Where the board generator gets its seed from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedChoice {
    Explicit(i32),
    #[default]
    Entropy,
    Fixed,
}

/// Validated game configuration; every field is already in range once constructed.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfig", into = "RawConfig")]
pub struct GameConfig {
    difficulty: Difficulty,
    size: Coord2,
    bomb_ratio: f64,
    seed: SeedChoice,
    question_marks: bool,
}

impl GameConfig {
    pub fn preset(difficulty: Difficulty) -> Self {
        match difficulty.parameters() {
            Some((size, bomb_ratio)) => Self {
                difficulty,
                size,
                bomb_ratio,
                seed: SeedChoice::default(),
                question_marks: false,
            },
            None => Self::custom(9, 9, 12.0),
        }
    }

    pub fn custom(width: i64, height: i64, bomb_ratio: f64) -> Self {
        Self {
            difficulty: Difficulty::Custom,
            size: (clamp_axis(width, "width"), clamp_axis(height, "height")),
            bomb_ratio: sanitize_ratio(bomb_ratio),
            seed: SeedChoice::default(),
            question_marks: false,
        }
    }

    /// Reads a ratio typed as text, falling back to [`DEFAULT_BOMB_RATIO`] when it is not numeric.
    pub fn parse_ratio(text: &str) -> f64 {
        sanitize_ratio(text.trim().parse().unwrap_or(f64::NAN))
    }

    pub fn with_seed(mut self, seed: SeedChoice) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_question_marks(mut self, enabled: bool) -> Self {
        self.question_marks = enabled;
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn bomb_ratio(&self) -> f64 {
        self.bomb_ratio
    }

    pub fn seed(&self) -> SeedChoice {
        self.seed
    }

    pub fn question_marks(&self) -> bool {
        self.question_marks
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// `round(cells * ratio / 100)`, never below one and never above the cell count.
    pub fn bomb_total(&self) -> CellCount {
        bomb_total_for(self.size, self.bomb_ratio)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::preset(Difficulty::default())
    }
}

fn clamp_axis(value: i64, axis: &str) -> Coord {
    if value < 1 {
        log::warn!("Board {axis} {value} is not positive, using 1");
        1
    } else if value > i64::from(Coord::MAX) {
        log::warn!("Board {axis} {value} is too large, using {}", Coord::MAX);
        Coord::MAX
    } else {
        value as Coord
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        log::warn!("Bomb ratio {ratio} is unusable, using {DEFAULT_BOMB_RATIO}");
        DEFAULT_BOMB_RATIO
    }
}

/// Unvalidated configuration as it arrives from files or the command line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawConfig {
    pub difficulty: Option<Difficulty>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub bomb_ratio: Option<f64>,
    pub seed: Option<SeedChoice>,
    pub question_marks: bool,
}

impl From<RawConfig> for GameConfig {
    fn from(raw: RawConfig) -> Self {
        let difficulty = raw.difficulty.unwrap_or_default();
        let base = match difficulty {
            Difficulty::Custom => GameConfig::custom(
                raw.width.unwrap_or(9),
                raw.height.unwrap_or(9),
                raw.bomb_ratio.unwrap_or(12.0),
            ),
            preset => GameConfig::preset(preset),
        };
        base.with_seed(raw.seed.unwrap_or_default())
            .with_question_marks(raw.question_marks)
    }
}

impl From<GameConfig> for RawConfig {
    fn from(config: GameConfig) -> Self {
        Self {
            difficulty: Some(config.difficulty),
            width: Some(config.size.0.into()),
            height: Some(config.size.1.into()),
            bomb_ratio: Some(config.bomb_ratio),
            seed: Some(config.seed),
            question_marks: config.question_marks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_dimensions_default_to_one() {
        let config = GameConfig::custom(0, -4, 10.0);
        assert_eq!(config.size(), (1, 1));
        assert_eq!(config.bomb_total(), 1);
    }

    #[test]
    fn oversized_dimensions_are_clamped() {
        let config = GameConfig::custom(1000, 3, 10.0);
        assert_eq!(config.size(), (Coord::MAX, 3));
    }

    #[test]
    fn bad_ratio_falls_back() {
        assert_eq!(GameConfig::custom(9, 9, 0.0).bomb_ratio(), DEFAULT_BOMB_RATIO);
        assert_eq!(GameConfig::custom(9, 9, -3.0).bomb_ratio(), DEFAULT_BOMB_RATIO);
        assert_eq!(GameConfig::custom(9, 9, f64::NAN).bomb_ratio(), DEFAULT_BOMB_RATIO);
        assert_eq!(GameConfig::parse_ratio("lots"), DEFAULT_BOMB_RATIO);
        assert_eq!(GameConfig::parse_ratio(" 15.5 "), 15.5);
    }

    #[test]
    fn bomb_total_rounds_half_up_and_clamps() {
        // 81 * 12.345% = 9.999
        assert_eq!(GameConfig::preset(Difficulty::Easy).bomb_total(), 10);
        // 256 * 15.625% = 40 exactly
        assert_eq!(GameConfig::preset(Difficulty::Normal).bomb_total(), 40);
        // 4 * 12.5% = 0.5
        assert_eq!(GameConfig::custom(2, 2, 12.5).bomb_total(), 1);
        assert_eq!(GameConfig::custom(2, 2, 0.1).bomb_total(), 1);
        assert_eq!(GameConfig::custom(2, 2, 400.0).bomb_total(), 4);
    }

    #[test]
    fn presets_match_table() {
        assert_eq!(GameConfig::preset(Difficulty::Hard).size(), (30, 16));
        assert_eq!(GameConfig::preset(Difficulty::Hard).bomb_total(), 99);
        assert_eq!(GameConfig::preset(Difficulty::Mania).size(), (64, 48));
        assert_eq!(GameConfig::preset(Difficulty::Custom).difficulty(), Difficulty::Custom);
    }

    #[test]
    fn difficulty_parses_names() {
        assert_eq!("Expert".parse(), Ok(Difficulty::Expert));
        assert_eq!(" mania".parse(), Ok(Difficulty::Mania));
        assert_eq!("impossible".parse::<Difficulty>(), Err(UnknownDifficulty));
    }

    #[test]
    fn raw_config_is_validated() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"difficulty":"custom","width":-1,"height":5,"bomb-ratio":-2.0,"seed":{"explicit":9}}"#,
        )
        .unwrap();
        let config = GameConfig::from(raw);
        assert_eq!(config.size(), (1, 5));
        assert_eq!(config.bomb_ratio(), DEFAULT_BOMB_RATIO);
        assert_eq!(config.seed(), SeedChoice::Explicit(9));
        assert!(!config.question_marks());
    }

    #[test]
    fn config_serde_roundtrip_keeps_validation() {
        let config = GameConfig::preset(Difficulty::Easy)
            .with_seed(SeedChoice::Fixed)
            .with_question_marks(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
