//! Close-line status classification.
//!
//! The status column of a close line is coloured by the response class:
//!
//! | Range | Outcome | Paint |
//! |---|---|---|
//! | 100–199 | Informational | `info` |
//! | 200–299 | Success | none |
//! | 300–399 | Redirection | `warning` |
//! | 400–499 | Client error | `error` |
//! | 500+ or a failed handler | Server error / failure | `fatal` |

use crate::color::Severity;

/// How a request ended, as far as the close line is concerned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    // ── Responses ─────────────────────────────────────────────────────────────
    Informational, // 1xx
    Success,       // 2xx
    Redirection,   // 3xx
    ClientError,   // 4xx
    ServerError,   // 5xx and above
    // ── No response ───────────────────────────────────────────────────────────
    Failed,        // the downstream operation returned an error
    Unset,         // no status was ever set
}

impl Outcome {
    pub fn classify(status: Option<u16>, failed: bool) -> Self {
        if failed {
            return Self::Failed;
        }
        match status {
            None             => Self::Unset,
            Some(100..=199)  => Self::Informational,
            Some(200..=299)  => Self::Success,
            Some(300..=399)  => Self::Redirection,
            Some(400..=499)  => Self::ClientError,
            Some(500..)      => Self::ServerError,
            // Below 100 is not a real status; show it as-is.
            Some(_)          => Self::Success,
        }
    }

    /// The severity the status column is painted with; `None` means plain.
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Informational              => Some(Severity::Info),
            Self::Success | Self::Unset      => None,
            Self::Redirection                => Some(Severity::Warning),
            Self::ClientError                => Some(Severity::Error),
            Self::ServerError | Self::Failed => Some(Severity::Fatal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges() {
        let cases = [
            (100, Some(Severity::Info)),
            (199, Some(Severity::Info)),
            (200, None),
            (204, None),
            (299, None),
            (301, Some(Severity::Warning)),
            (399, Some(Severity::Warning)),
            (400, Some(Severity::Error)),
            (404, Some(Severity::Error)),
            (499, Some(Severity::Error)),
            (500, Some(Severity::Fatal)),
            (503, Some(Severity::Fatal)),
            (999, Some(Severity::Fatal)),
        ];
        for (status, expected) in cases {
            assert_eq!(Outcome::classify(Some(status), false).severity(), expected, "{status}");
        }
    }

    #[test]
    fn failure_wins_over_status() {
        assert_eq!(Outcome::classify(Some(200), true), Outcome::Failed);
        assert_eq!(Outcome::classify(None, true).severity(), Some(Severity::Fatal));
    }

    #[test]
    fn unset_is_plain() {
        assert_eq!(Outcome::classify(None, false), Outcome::Unset);
        assert_eq!(Outcome::Unset.severity(), None);
    }
}
