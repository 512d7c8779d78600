//! Time signatures: parsed meter labels and the supported augmentation targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::beats::Interval;
use crate::error::TransformError;
use crate::select::{self, Selection};
use crate::transform::TransformOptions;

/// A time signature such as `4/4` or `6/4`.
///
/// Serialised as its label, e.g. `"4/4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Meter {
    pub numerator: u32,
    pub denominator: u32,
}

impl Meter {
    /// Common time, the only meter the augmentations accept as input.
    pub const FOUR_FOUR: Meter = Meter {
        numerator: 4,
        denominator: 4,
    };

    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Parse a meter label of the form `N/D`.
    ///
    /// A label without a denominator (`"3"`) is read as `N/4` and a warning is
    /// logged.
    pub fn parse(label: &str) -> Result<Self, TransformError> {
        let label = label.trim();
        let invalid = || TransformError::InvalidMeter(label.to_string());

        let mut parts = label.split('/');
        let numerator = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;
        let numerator: u32 = numerator.parse().map_err(|_| invalid())?;

        let denominator = match parts.next().map(str::trim) {
            Some(d) => d.parse().map_err(|_| invalid())?,
            None => {
                log::warn!("Meter label {:?} has no denominator, assuming 4", label);
                4
            }
        };

        if parts.next().is_some() || numerator == 0 || denominator == 0 {
            return Err(invalid());
        }

        Ok(Self::new(numerator, denominator))
    }
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Meter {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Meter {
    type Error = TransformError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::parse(&label)
    }
}

impl From<Meter> for String {
    fn from(meter: Meter) -> Self {
        meter.to_string()
    }
}

/// Meters a 4/4 track can be augmented into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetMeter {
    #[serde(rename = "24")]
    TwoFour,
    #[serde(rename = "34")]
    ThreeFour,
    #[serde(rename = "54")]
    FiveFour,
    #[serde(rename = "64")]
    SixFour,
    #[serde(rename = "74")]
    SevenFour,
}

impl TargetMeter {
    pub const ALL: [TargetMeter; 5] = [
        TargetMeter::TwoFour,
        TargetMeter::ThreeFour,
        TargetMeter::FiveFour,
        TargetMeter::SixFour,
        TargetMeter::SevenFour,
    ];

    /// Short code used in file and directory names (`"64"` for 6/4).
    pub fn code(&self) -> &'static str {
        match self {
            Self::TwoFour => "24",
            Self::ThreeFour => "34",
            Self::FiveFour => "54",
            Self::SixFour => "64",
            Self::SevenFour => "74",
        }
    }

    /// Look a target up by its code.
    pub fn from_code(code: &str) -> Result<Self, TransformError> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| TransformError::UnsupportedTarget(code.to_string()))
    }

    pub fn beats_per_bar(&self) -> u32 {
        match self {
            Self::TwoFour => 2,
            Self::ThreeFour => 3,
            Self::FiveFour => 5,
            Self::SixFour => 6,
            Self::SevenFour => 7,
        }
    }

    pub fn meter(&self) -> Meter {
        Meter::new(self.beats_per_bar(), 4)
    }

    /// Run this target's segment selector over 4/4 intervals.
    pub fn select(&self, intervals: &[Interval], options: &TransformOptions) -> Selection {
        match self {
            Self::TwoFour => select::two_four(intervals),
            Self::ThreeFour => select::three_four(intervals, options.three_four_drop_position),
            Self::FiveFour => select::five_four(intervals),
            Self::SixFour => select::six_four(intervals),
            Self::SevenFour => select::seven_four(intervals),
        }
    }
}

impl fmt::Display for TargetMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.meter())
    }
}

impl FromStr for TargetMeter {
    type Err = TransformError;

    /// Accepts either the short code (`"34"`) or the meter label (`"3/4"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(target) = Self::from_code(s) {
            return Ok(target);
        }
        let meter = Meter::parse(s).map_err(|_| TransformError::UnsupportedTarget(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|t| t.meter() == meter)
            .ok_or_else(|| TransformError::UnsupportedTarget(s.to_string()))
    }
}

/// Guess a track's meter from its beat positions.
///
/// Looks at every bar wrap (a position followed by a smaller one) and returns
/// the most common position seen right before a wrap, as `N/4`. Ties go to the
/// value that wrapped first. Returns `None` when the positions never wrap.
pub fn infer_meter(positions: &[u32]) -> Option<Meter> {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for pair in positions.windows(2).filter(|pair| pair[1] < pair[0]) {
        match counts.iter_mut().find(|(value, _)| *value == pair[0]) {
            Some((_, count)) => *count += 1,
            None => counts.push((pair[0], 1)),
        }
    }

    counts
        .iter()
        .fold(None::<(u32, usize)>, |best, &(value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| Meter::new(value, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meter() {
        assert_eq!(Meter::parse("4/4").unwrap(), Meter::FOUR_FOUR);
        assert_eq!(Meter::parse(" 6/8\n").unwrap(), Meter::new(6, 8));
    }

    #[test]
    fn test_parse_meter_missing_denominator_defaults_to_four() {
        assert_eq!(Meter::parse("3").unwrap(), Meter::new(3, 4));
        assert_eq!(Meter::parse("7\n").unwrap(), Meter::new(7, 4));
    }

    #[test]
    fn test_parse_meter_rejects_garbage() {
        assert!(Meter::parse("").is_err());
        assert!(Meter::parse("four/4").is_err());
        assert!(Meter::parse("4/4/4").is_err());
        assert!(Meter::parse("0/4").is_err());
    }

    #[test]
    fn test_meter_display() {
        assert_eq!(Meter::new(5, 4).to_string(), "5/4");
    }

    #[test]
    fn test_target_codes() {
        let codes: Vec<&str> = TargetMeter::ALL.iter().map(|t| t.code()).collect();
        assert_eq!(codes, vec!["24", "34", "54", "64", "74"]);

        for target in TargetMeter::ALL {
            assert_eq!(TargetMeter::from_code(target.code()).unwrap(), target);
            assert_eq!(target.meter().to_string(), target.to_string());
        }

        assert!(matches!(
            TargetMeter::from_code("44"),
            Err(TransformError::UnsupportedTarget(_))
        ));
    }

    #[test]
    fn test_target_from_str_accepts_label() {
        assert_eq!("6/4".parse::<TargetMeter>().unwrap(), TargetMeter::SixFour);
        assert_eq!("74".parse::<TargetMeter>().unwrap(), TargetMeter::SevenFour);
        assert!("4/4".parse::<TargetMeter>().is_err());
        assert!("6/8".parse::<TargetMeter>().is_err());
    }

    #[test]
    fn test_infer_meter() {
        assert_eq!(
            infer_meter(&[1, 2, 3, 4, 1, 2, 3, 4, 1, 2]),
            Some(Meter::FOUR_FOUR)
        );
        assert_eq!(infer_meter(&[2, 3, 1, 2, 3, 1]), Some(Meter::new(3, 4)));
        assert_eq!(infer_meter(&[1, 2, 3]), None);
        assert_eq!(infer_meter(&[]), None);
    }

    #[test]
    fn test_infer_meter_tie_prefers_first_wrap() {
        // 3 wraps once, then 4 wraps once
        assert_eq!(infer_meter(&[1, 2, 3, 1, 2, 3, 4, 1]), Some(Meter::new(3, 4)));
    }
}
