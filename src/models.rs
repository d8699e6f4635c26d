use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SweepError};

/// Cap substituted when a request asks for "unlimited" (`max_per_category == 0`)
pub const UNLIMITED_MAX: u64 = 1_000_000;

/// Gmail system label removed when a thread is moved to trash
pub const INBOX_LABEL: &str = "INBOX";

/// Gmail system label added when a thread is moved to trash
pub const TRASH_LABEL: &str = "TRASH";

/// A cleanable Gmail category.
///
/// The closed set of labels the cleaner accepts: the four tab categories plus
/// the `TRASH` pseudo-label. Trash is special-cased by the cleaner (permanent
/// deletion instead of move-to-trash).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CATEGORY_SOCIAL")]
    Social,
    #[serde(rename = "CATEGORY_FORUMS")]
    Forums,
    #[serde(rename = "CATEGORY_PROMOTIONS")]
    Promotions,
    #[serde(rename = "CATEGORY_UPDATES")]
    Updates,
    #[serde(rename = "TRASH")]
    Trash,
}

impl Category {
    /// All cleanable categories, in tab order
    pub const ALL: [Category; 5] = [
        Category::Social,
        Category::Forums,
        Category::Promotions,
        Category::Updates,
        Category::Trash,
    ];

    /// The Gmail label id used to query threads in this category
    pub fn label_id(&self) -> &'static str {
        match self {
            Category::Social => "CATEGORY_SOCIAL",
            Category::Forums => "CATEGORY_FORUMS",
            Category::Promotions => "CATEGORY_PROMOTIONS",
            Category::Updates => "CATEGORY_UPDATES",
            Category::Trash => TRASH_LABEL,
        }
    }

    /// Trash threads are permanently deleted rather than moved to trash
    pub fn is_trash(&self) -> bool {
        matches!(self, Category::Trash)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label_id())
    }
}

impl FromStr for Category {
    type Err = SweepError;

    /// Accepts both the Gmail label id (`CATEGORY_SOCIAL`) and the short
    /// lowercase name used on the command line (`social`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CATEGORY_SOCIAL" | "social" => Ok(Category::Social),
            "CATEGORY_FORUMS" | "forums" => Ok(Category::Forums),
            "CATEGORY_PROMOTIONS" | "promotions" => Ok(Category::Promotions),
            "CATEGORY_UPDATES" | "updates" => Ok(Category::Updates),
            "TRASH" | "trash" => Ok(Category::Trash),
            other => Err(SweepError::InvalidRequest(format!(
                "unknown category '{}'; expected one of social, forums, promotions, updates, trash",
                other
            ))),
        }
    }
}

/// A cleanup request: which categories to process, in order, and how many
/// threads to remove from each at most.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanRequest {
    pub categories: Vec<Category>,
    /// Per-category cap; `0` means "effectively unlimited"
    #[serde(default)]
    pub max_per_category: u64,
}

impl CleanRequest {
    pub fn new(categories: Vec<Category>, max_per_category: u64) -> Self {
        Self {
            categories,
            max_per_category,
        }
    }

    /// Reject empty category lists and caps above one million before any
    /// remote call is made. Duplicates are deliberately allowed; order is
    /// processing order.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(SweepError::InvalidRequest(
                "at least one category is required".to_string(),
            ));
        }
        if self.max_per_category > UNLIMITED_MAX {
            return Err(SweepError::InvalidRequest(format!(
                "max_per_category cannot exceed {}",
                UNLIMITED_MAX
            )));
        }
        Ok(())
    }

    /// The cap actually used by the cleaner. Zero would trivially delete
    /// nothing, so it is a sentinel for "unlimited".
    pub fn effective_max(&self) -> u64 {
        if self.max_per_category == 0 {
            UNLIMITED_MAX
        } else {
            self.max_per_category
        }
    }
}

/// Why a cleanup run is (or is not) considered complete.
///
/// Serializes to fixed human-readable reason strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionReason {
    #[serde(rename = "all categories processed")]
    AllCategoriesProcessed,
    #[serde(rename = "max per category reached; more emails may remain")]
    MaxPerCategoryReached,
    #[serde(rename = "remaining emails detected in one or more categories")]
    RemainingEmailsDetected,
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CompletionReason::AllCategoriesProcessed => "all categories processed",
            CompletionReason::MaxPerCategoryReached => {
                "max per category reached; more emails may remain"
            }
            CompletionReason::RemainingEmailsDetected => {
                "remaining emails detected in one or more categories"
            }
        };
        f.write_str(msg)
    }
}

/// Result of a full cleanup run.
///
/// Invariants: `total_deleted` equals the sum of the per-category counts, and
/// `per_category_deleted` has exactly one entry per distinct requested
/// category, even when nothing was deleted in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanSummary {
    pub per_category_deleted: HashMap<Category, usize>,
    pub total_deleted: usize,
    pub completed: bool,
    pub reason: CompletionReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label_ids() {
        assert_eq!(Category::Social.label_id(), "CATEGORY_SOCIAL");
        assert_eq!(Category::Promotions.label_id(), "CATEGORY_PROMOTIONS");
        assert_eq!(Category::Trash.label_id(), "TRASH");
        assert!(Category::Trash.is_trash());
        assert!(!Category::Updates.is_trash());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "CATEGORY_FORUMS".parse::<Category>().unwrap(),
            Category::Forums
        );
        assert_eq!("promotions".parse::<Category>().unwrap(), Category::Promotions);
        assert_eq!("trash".parse::<Category>().unwrap(), Category::Trash);
        assert!("SPAM".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_uses_label_id() {
        let json = serde_json::to_string(&Category::Updates).unwrap();
        assert_eq!(json, "\"CATEGORY_UPDATES\"");

        let parsed: Category = serde_json::from_str("\"TRASH\"").unwrap();
        assert_eq!(parsed, Category::Trash);
    }

    #[test]
    fn test_effective_max_sentinel() {
        let unlimited = CleanRequest::new(vec![Category::Social], 0);
        assert_eq!(unlimited.effective_max(), UNLIMITED_MAX);

        let capped = CleanRequest::new(vec![Category::Social], 10);
        assert_eq!(capped.effective_max(), 10);
    }

    #[test]
    fn test_validate_rejects_empty_categories() {
        let request = CleanRequest::new(vec![], 10);
        assert!(matches!(
            request.validate(),
            Err(SweepError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_cap() {
        let request = CleanRequest::new(vec![Category::Social], UNLIMITED_MAX + 1);
        assert!(request.validate().is_err());

        let at_limit = CleanRequest::new(vec![Category::Social], UNLIMITED_MAX);
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_validate_allows_duplicates() {
        let request = CleanRequest::new(vec![Category::Social, Category::Social], 10);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_completion_reason_strings() {
        assert_eq!(
            CompletionReason::AllCategoriesProcessed.to_string(),
            "all categories processed"
        );
        assert_eq!(
            CompletionReason::MaxPerCategoryReached.to_string(),
            "max per category reached; more emails may remain"
        );
        assert_eq!(
            CompletionReason::RemainingEmailsDetected.to_string(),
            "remaining emails detected in one or more categories"
        );
    }

    #[test]
    fn test_summary_serialization() {
        let mut per_category = HashMap::new();
        per_category.insert(Category::Promotions, 5);

        let summary = CleanSummary {
            per_category_deleted: per_category,
            total_deleted: 5,
            completed: true,
            reason: CompletionReason::AllCategoriesProcessed,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["per_category_deleted"]["CATEGORY_PROMOTIONS"], 5);
        assert_eq!(json["total_deleted"], 5);
        assert_eq!(json["completed"], true);
        assert_eq!(json["reason"], "all categories processed");

        let roundtrip: CleanSummary = serde_json::from_value(json).unwrap();
        assert_eq!(roundtrip.total_deleted, 5);
        assert_eq!(roundtrip.reason, CompletionReason::AllCategoriesProcessed);
    }
}
