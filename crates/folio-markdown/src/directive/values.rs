//! Typed attribute values for directives.
//!
//! Parsing never fails: unrecognized values fall back to the directive's
//! documented default, mirroring how the converters recover.

/// Callout flavour, `:::type`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CalloutType {
    #[default]
    Info,
    Warning,
    Danger,
    Success,
    Note,
}

impl CalloutType {
    pub const ALL: [Self; 5] = [
        Self::Info,
        Self::Warning,
        Self::Danger,
        Self::Success,
        Self::Note,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Success => "success",
            Self::Note => "note",
        }
    }

    /// Parse a type name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Parse a type name, falling back to [`CalloutType::Info`].
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            if !name.is_empty() {
                tracing::debug!(value = name, "Unknown callout type, using info");
            }
            Self::default()
        })
    }
}

/// Compliance status shown by a status badge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    InProgress,
    NotApplicable,
    #[default]
    PendingReview,
}

impl ComplianceStatus {
    pub const ALL: [Self; 5] = [
        Self::Compliant,
        Self::NonCompliant,
        Self::InProgress,
        Self::NotApplicable,
        Self::PendingReview,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non-compliant",
            Self::InProgress => "in-progress",
            Self::NotApplicable => "not-applicable",
            Self::PendingReview => "pending-review",
        }
    }

    /// Human-readable label used when a badge has no explicit `text`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::NonCompliant => "Non-Compliant",
            Self::InProgress => "In Progress",
            Self::NotApplicable => "Not Applicable",
            Self::PendingReview => "Pending Review",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Parse a status value, falling back to [`ComplianceStatus::PendingReview`].
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::debug!(value = name, "Unknown status value, using pending-review");
            Self::default()
        })
    }
}

/// Category of masked content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaskType {
    #[default]
    Pii,
    Internal,
    Financial,
    Technical,
    Custom,
}

impl MaskType {
    pub const ALL: [Self; 5] = [
        Self::Pii,
        Self::Internal,
        Self::Financial,
        Self::Technical,
        Self::Custom,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pii => "pii",
            Self::Internal => "internal",
            Self::Financial => "financial",
            Self::Technical => "technical",
            Self::Custom => "custom",
        }
    }

    /// Redaction string used when a mask has no explicit `placeholder`.
    #[must_use]
    pub fn default_placeholder(self) -> &'static str {
        match self {
            Self::Pii => "[PERSONAL INFO REDACTED]",
            Self::Internal => "[INTERNAL ONLY]",
            Self::Financial => "[FINANCIAL DATA REDACTED]",
            Self::Technical => "[TECHNICAL DETAILS REDACTED]",
            Self::Custom => "[REDACTED]",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Parse a mask type, falling back to [`MaskType::Pii`].
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::debug!(value = name, "Unknown mask type, using pii");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callout_fallback() {
        assert_eq!(CalloutType::parse_or_default("WARNING"), CalloutType::Warning);
        assert_eq!(CalloutType::parse_or_default("tip"), CalloutType::Info);
        assert_eq!(CalloutType::parse_or_default(""), CalloutType::Info);
    }

    #[test]
    fn test_status_hyphenated_values() {
        assert_eq!(
            ComplianceStatus::from_name("non-compliant"),
            Some(ComplianceStatus::NonCompliant)
        );
        assert_eq!(ComplianceStatus::NonCompliant.label(), "Non-Compliant");
        assert_eq!(
            ComplianceStatus::parse_or_default("approved"),
            ComplianceStatus::PendingReview
        );
    }

    #[test]
    fn test_mask_placeholders() {
        assert_eq!(MaskType::Pii.default_placeholder(), "[PERSONAL INFO REDACTED]");
        assert_eq!(
            MaskType::parse_or_default("financial").default_placeholder(),
            "[FINANCIAL DATA REDACTED]"
        );
        assert_eq!(MaskType::parse_or_default("secret"), MaskType::Pii);
    }

    #[test]
    fn test_names_round_trip() {
        for kind in CalloutType::ALL {
            assert_eq!(CalloutType::from_name(kind.as_str()), Some(kind));
        }
        for status in ComplianceStatus::ALL {
            assert_eq!(ComplianceStatus::from_name(status.as_str()), Some(status));
        }
        for kind in MaskType::ALL {
            assert_eq!(MaskType::from_name(kind.as_str()), Some(kind));
        }
    }
}
