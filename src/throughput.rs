//! Display formatting for provisioned throughput settings.

use std::fmt;

/// Throughput provisioned for a database or collection, in request units per
/// second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughputSetting {
    /// Fixed throughput.
    Manual(u64),
    /// Autoscaling throughput with an upper bound.
    Autoscale {
        /// Highest throughput the resource may scale to.
        max: u64,
    },
    /// The resource reports neither setting.
    Unset,
}

impl ThroughputSetting {
    /// Builds a setting from the optional fields reported by the management
    /// API. Autoscale wins when both are present; a fixed throughput of zero
    /// counts as unset.
    #[must_use]
    pub const fn from_parts(throughput: Option<u64>, autoscale_max: Option<u64>) -> Self {
        match (autoscale_max, throughput) {
            (Some(max), _) => Self::Autoscale { max },
            (None, Some(value)) if value > 0 => Self::Manual(value),
            (None, _) => Self::Unset,
        }
    }

    /// Renders `setting`, or `N/A` when the resource has no throughput of its
    /// own (for example a collection inheriting its database's throughput).
    #[must_use]
    pub fn display_or_na(setting: Option<Self>) -> String {
        setting.map_or_else(|| "N/A".to_owned(), |value| value.to_string())
    }
}

impl fmt::Display for ThroughputSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual(value) => write!(f, "{value} RU/s"),
            Self::Autoscale { max } => write!(f, "Max: {max} RU/s (autoscale)"),
            Self::Unset => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ThroughputSetting::Manual(400), "400 RU/s")]
    #[case(ThroughputSetting::Autoscale { max: 4000 }, "Max: 4000 RU/s (autoscale)")]
    #[case(ThroughputSetting::Unset, "")]
    fn renders_each_setting(#[case] setting: ThroughputSetting, #[case] expected: &str) {
        assert_eq!(setting.to_string(), expected);
    }

    #[test]
    fn autoscale_takes_precedence() {
        assert_eq!(
            ThroughputSetting::from_parts(Some(400), Some(4000)),
            ThroughputSetting::Autoscale { max: 4000 }
        );
        assert_eq!(ThroughputSetting::from_parts(None, None), ThroughputSetting::Unset);
    }

    #[test]
    fn zero_fixed_throughput_renders_empty() {
        let setting = ThroughputSetting::from_parts(Some(0), None);

        assert_eq!(setting, ThroughputSetting::Unset);
        assert_eq!(setting.to_string(), "");
    }

    #[test]
    fn missing_setting_renders_na() {
        assert_eq!(ThroughputSetting::display_or_na(None), "N/A");
        assert_eq!(
            ThroughputSetting::display_or_na(Some(ThroughputSetting::Manual(1000))),
            "1000 RU/s"
        );
    }
}
