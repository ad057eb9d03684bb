use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How to compare an observed value against a target. Each operator is an
/// inclusive band over the sign of the three-way comparison: `Lt = [MIN,-1]`,
/// `Gt = [1,MAX]`, `Eq = [0,0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Comparison {
    Lt,
    Gt,
    Eq,
}

impl Comparison {
    pub const VALUES: [&'static str; 3] = ["LT", "GT", "EQ"];

    const fn band(self) -> (i32, i32) {
        match self {
            Comparison::Lt => (i32::MIN, -1),
            Comparison::Gt => (1, i32::MAX),
            Comparison::Eq => (0, 0),
        }
    }

    /// Whether the operator holds for `left` against `right`, i.e. for `Lt`
    /// whether `left < right`.
    pub fn holds<T: Ord>(self, left: T, right: T) -> bool {
        let sign = match left.cmp(&right) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        };
        let (min, max) = self.band();
        sign >= min && sign <= max
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Lt => "LT",
            Comparison::Gt => "GT",
            Comparison::Eq => "EQ",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparison {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LT" => Ok(Comparison::Lt),
            "GT" => Ok(Comparison::Gt),
            "EQ" => Ok(Comparison::Eq),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lt_holds_only_below_target() {
        assert!(Comparison::Lt.holds(1, 2));
        assert!(!Comparison::Lt.holds(2, 2));
        assert!(!Comparison::Lt.holds(3, 2));
    }

    #[test]
    fn gt_holds_only_above_target() {
        assert!(!Comparison::Gt.holds(1, 2));
        assert!(!Comparison::Gt.holds(2, 2));
        assert!(Comparison::Gt.holds(3, 2));
    }

    #[test]
    fn eq_holds_only_at_target() {
        assert!(!Comparison::Eq.holds(1, 2));
        assert!(Comparison::Eq.holds(2, 2));
        assert!(!Comparison::Eq.holds(3, 2));
    }

    #[test]
    fn parses_wire_values() {
        assert_eq!("LT".parse::<Comparison>(), Ok(Comparison::Lt));
        assert_eq!("GT".parse::<Comparison>(), Ok(Comparison::Gt));
        assert_eq!("EQ".parse::<Comparison>(), Ok(Comparison::Eq));
        assert!("LTE".parse::<Comparison>().is_err());
    }
}
