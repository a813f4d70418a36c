use serde::Serialize;
use std::fmt;

/// Coarse time-of-day bucket for an hour.
///
/// | Hours        | Period    |
/// |--------------|-----------|
/// | missing, 0–5 | LateNight |
/// | 6–11         | Morning   |
/// | 12–16        | Afternoon |
/// | 17–20        | Evening   |
/// | 21–23        | Night     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DayPeriod {
    LateNight,
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 5] = [
        DayPeriod::LateNight,
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
        DayPeriod::Night,
    ];

    /// Buckets an hour using right-closed bins with edges -1, 5, 11, 16, 20, 24.
    /// A missing hour is read as -1.
    pub fn from_hour(hour: Option<u32>) -> Self {
        let h = hour.map(i64::from).unwrap_or(-1);
        match h {
            h if h <= 5 => DayPeriod::LateNight,
            h if h <= 11 => DayPeriod::Morning,
            h if h <= 16 => DayPeriod::Afternoon,
            h if h <= 20 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayPeriod::LateNight => "LateNight",
            DayPeriod::Morning => "Morning",
            DayPeriod::Afternoon => "Afternoon",
            DayPeriod::Evening => "Evening",
            DayPeriod::Night => "Night",
        }
    }
}

impl fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_boundaries() {
        assert_eq!(DayPeriod::from_hour(None), DayPeriod::LateNight);
        assert_eq!(DayPeriod::from_hour(Some(0)), DayPeriod::LateNight);
        assert_eq!(DayPeriod::from_hour(Some(5)), DayPeriod::LateNight);
        assert_eq!(DayPeriod::from_hour(Some(6)), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(Some(11)), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(Some(12)), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(Some(16)), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(Some(17)), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(Some(20)), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(Some(21)), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(Some(23)), DayPeriod::Night);
    }

    #[test]
    fn test_all_in_label_order() {
        let labels: Vec<_> = DayPeriod::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            labels,
            vec!["LateNight", "Morning", "Afternoon", "Evening", "Night"]
        );
    }
}
