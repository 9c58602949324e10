use std::fmt;

/// Severity of a change, ordered from least to most impactful.
///
/// The ordering is total, so the overall bump for a set of commits is just
/// the `max()` of their individual levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LevelBump {
    NoRelease,
    PrereleaseRevision,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for LevelBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelBump::NoRelease => write!(f, "no release"),
            LevelBump::PrereleaseRevision => write!(f, "prerelease revision"),
            LevelBump::Patch => write!(f, "patch"),
            LevelBump::Minor => write!(f, "minor"),
            LevelBump::Major => write!(f, "major"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LevelBump::NoRelease < LevelBump::PrereleaseRevision);
        assert!(LevelBump::PrereleaseRevision < LevelBump::Patch);
        assert!(LevelBump::Patch < LevelBump::Minor);
        assert!(LevelBump::Minor < LevelBump::Major);
    }

    #[test]
    fn test_level_max_aggregation() {
        let levels = vec![LevelBump::Patch, LevelBump::Minor, LevelBump::NoRelease];
        assert_eq!(levels.into_iter().max(), Some(LevelBump::Minor));

        let empty: Vec<LevelBump> = vec![];
        assert_eq!(
            empty.into_iter().max().unwrap_or(LevelBump::NoRelease),
            LevelBump::NoRelease
        );
    }

    #[test]
    fn test_level_display() {
        assert_eq!(LevelBump::Major.to_string(), "major");
        assert_eq!(LevelBump::PrereleaseRevision.to_string(), "prerelease revision");
    }
}
