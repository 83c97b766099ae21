//! The outbound analysis model.
//!
//! `AnalysisResult` is the single payload a completed run hands back to the
//! caller. Its serialized shape is a published contract: `sentiment`,
//! `themes`, `action_items` (always all three department keys), `summary`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentiment classification of a piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Parse a capability-reported label, case-insensitively.
    ///
    /// Returns `None` for anything outside the closed label set; callers
    /// decide how to default (stages fall back to neutral with a note).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sentiment label together with the capability's confidence in it.
///
/// Confidence is always within `[0.0, 1.0]` by the time it reaches this type;
/// stages clamp out-of-range values before constructing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl Sentiment {
    /// The default used whenever sentiment could not be determined.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }
}

/// The closed set of departments that receive action items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Hr,
    CustomerService,
    Product,
}

impl Department {
    /// Every department, in the order the outbound contract lists them.
    pub const ALL: [Department; 3] = [
        Department::Hr,
        Department::CustomerService,
        Department::Product,
    ];

    /// The department's key in the outbound `action_items` map.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Hr => "hr",
            Self::CustomerService => "customer_service",
            Self::Product => "product",
        }
    }

    /// Kebab-case form used in stage identifiers and log fields.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Hr => "hr",
            Self::CustomerService => "customer-service",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One recommended follow-up action, tagged with the department that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub text: String,
    pub department: Department,
}

impl ActionItem {
    pub fn new(text: impl Into<String>, department: Department) -> Self {
        Self {
            text: text.into(),
            department,
        }
    }
}

/// Action item texts grouped by department.
///
/// Every department key is always present in the serialized form, even when
/// its list is empty. The struct makes a missing key unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentActions {
    pub hr: Vec<String>,
    pub customer_service: Vec<String>,
    pub product: Vec<String>,
}

impl DepartmentActions {
    /// The action list for one department.
    pub fn for_department(&self, department: Department) -> &[String] {
        match department {
            Department::Hr => &self.hr,
            Department::CustomerService => &self.customer_service,
            Department::Product => &self.product,
        }
    }

    /// Append an action to one department's list, preserving order.
    pub fn push(&mut self, department: Department, text: impl Into<String>) {
        let list = match department {
            Department::Hr => &mut self.hr,
            Department::CustomerService => &mut self.customer_service,
            Department::Product => &mut self.product,
        };
        list.push(text.into());
    }

    /// Total number of action items across all departments.
    pub fn total(&self) -> usize {
        self.hr.len() + self.customer_service.len() + self.product.len()
    }
}

/// The structured result of one analysis run.
///
/// This is what boundaries (the demo CLI, a future HTTP layer) serialize and
/// hand to callers. Degraded runs still produce one of these; the summary
/// notes how many stages fell back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub themes: Vec<String>,
    pub action_items: DepartmentActions,
    pub summary: String,
}

// ── Tests ────────────────────────────────────────────────────────────────────
