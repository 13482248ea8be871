use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ManifestNotFound,
    ManifestParseError,
    ConfigParseError,
    MalformedInput,
    UndefinedDependency,
    CycleDetected,
    NotDeployable,
    StatsUnavailable,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ManifestNotFound => "E1001",
            Self::ManifestParseError => "E1002",
            Self::ConfigParseError => "E1003",
            Self::MalformedInput => "E2001",
            Self::UndefinedDependency => "E2002",
            Self::CycleDetected => "E2003",
            Self::NotDeployable => "E2004",
            Self::StatsUnavailable => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ManifestNotFound => "Project manifest not found",
            Self::ManifestParseError => "Project manifest parse error",
            Self::ConfigParseError => "Config file parse error",
            Self::MalformedInput => "Malformed unit declarations",
            Self::UndefinedDependency => "Dependency on an undeclared unit",
            Self::CycleDetected => "Dependency cycle detected",
            Self::NotDeployable => "Project is not deployable as-is",
            Self::StatsUnavailable => "Unit statistics unavailable",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ManifestNotFound => {
                Some("Run from the project root or pass `--manifest <path>` to point at dfx.json.")
            }
            Self::ManifestParseError => Some("Fix the syntax of the manifest and retry."),
            Self::ConfigParseError => Some("Fix syntax in .cairn/config.toml and retry."),
            Self::MalformedInput => {
                Some("Give every canister a unique, non-empty name and a known `type`.")
            }
            Self::UndefinedDependency => {
                Some("Declare the missing canister or remove it from `dependencies`.")
            }
            Self::CycleDetected => Some("Remove one dependency edge on each reported cycle."),
            Self::NotDeployable => Some("Resolve the reported errors, then re-run the analysis."),
            Self::StatsUnavailable => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
