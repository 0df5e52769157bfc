use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named work/rest combinations for common training goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Strength,
    Hypertrophy,
    Endurance,
    Hiit,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Strength,
        Preset::Hypertrophy,
        Preset::Endurance,
        Preset::Hiit,
    ];

    pub fn work_secs(&self) -> u32 {
        match self {
            Preset::Strength => 180,
            Preset::Hypertrophy => 90,
            Preset::Endurance => 45,
            Preset::Hiit => 30,
        }
    }

    pub fn rest_secs(&self) -> u32 {
        match self {
            Preset::Strength => 180,
            Preset::Hypertrophy => 120,
            Preset::Endurance => 60,
            Preset::Hiit => 15,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Strength => "strength",
            Preset::Hypertrophy => "hypertrophy",
            Preset::Endurance => "endurance",
            Preset::Hiit => "hiit",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("HIIT".parse::<Preset>(), Ok(Preset::Hiit));
        assert_eq!(" hypertrophy ".parse::<Preset>(), Ok(Preset::Hypertrophy));
        assert!("yoga".parse::<Preset>().is_err());
    }

    #[test]
    fn every_preset_fits_the_usual_bounds() {
        for preset in Preset::ALL {
            assert!((10..=300).contains(&preset.work_secs()), "{preset}");
            assert!((10..=300).contains(&preset.rest_secs()), "{preset}");
        }
    }
}
