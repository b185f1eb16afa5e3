use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordinal campaign grade assigned by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignGrade {
    /// Campaign should be cut
    Cut,
    /// Below average performance
    BelowAverage,
    /// Good performance
    Good,
    /// Great performance
    Great,
}

impl CampaignGrade {
    /// All grades in ascending order (for pickers)
    pub fn all() -> [CampaignGrade; 4] {
        [
            CampaignGrade::Cut,
            CampaignGrade::BelowAverage,
            CampaignGrade::Good,
            CampaignGrade::Great,
        ]
    }

    /// Wire code used by the grading service
    pub fn as_code(&self) -> &'static str {
        match self {
            CampaignGrade::Cut => "1",
            CampaignGrade::BelowAverage => "2",
            CampaignGrade::Good => "3",
            CampaignGrade::Great => "4",
        }
    }

    /// Parse a wire code back into a grade
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(CampaignGrade::Cut),
            "2" => Some(CampaignGrade::BelowAverage),
            "3" => Some(CampaignGrade::Good),
            "4" => Some(CampaignGrade::Great),
            _ => None,
        }
    }

    /// Display label for UI
    pub fn label(&self) -> &'static str {
        match self {
            CampaignGrade::Cut => "Cut",
            CampaignGrade::BelowAverage => "Below Average",
            CampaignGrade::Good => "Good",
            CampaignGrade::Great => "Great",
        }
    }
}

/// One grade record for a campaign on a specific date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    /// Grade date (YYYY-MM-DD)
    #[serde(with = "serde_date")]
    pub date: NaiveDate,
    /// Grade wire code ("1".."4")
    pub grade: String,
    /// Operator comment
    #[serde(default)]
    pub comment: Option<String>,
}

impl GradeEntry {
    /// Human-readable grade; unknown codes pass through unchanged
    pub fn grade_label(&self) -> String {
        CampaignGrade::from_code(&self.grade)
            .map(|g| g.label().to_string())
            .unwrap_or_else(|| self.grade.clone())
    }
}

/// Request body for saving a grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGradeRequest {
    /// Campaign identifier
    pub campaign_id: String,
    /// Grade date (YYYY-MM-DD)
    #[serde(with = "serde_date")]
    pub date: NaiveDate,
    /// Grade wire code ("1".."4")
    pub grade: String,
    /// Operator comment
    #[serde(default)]
    pub comment: Option<String>,
    /// Ad platform the campaign runs on (e.g. "meta", "google")
    pub platform: String,
}

/// Response body from the grade save endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGradeResponse {
    pub message: String,
}

// Local serde helper for NaiveDate as YYYY-MM-DD
mod serde_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.format(FORMAT).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_codes_round_trip() {
        for grade in CampaignGrade::all() {
            assert_eq!(CampaignGrade::from_code(grade.as_code()), Some(grade));
        }
        assert_eq!(CampaignGrade::from_code("5"), None);
        assert_eq!(CampaignGrade::from_code(""), None);
    }

    #[test]
    fn test_grade_entry_label() {
        let entry: GradeEntry =
            serde_json::from_str(r#"{"date":"2025-03-01","grade":"2"}"#).unwrap();
        assert_eq!(entry.grade_label(), "Below Average");
        assert_eq!(entry.comment, None);

        let unknown: GradeEntry =
            serde_json::from_str(r#"{"date":"2025-03-01","grade":"9"}"#).unwrap();
        assert_eq!(unknown.grade_label(), "9");
    }

    #[test]
    fn test_grade_entry_date_format() {
        let entry = GradeEntry {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            grade: "4".to_string(),
            comment: Some("scaling".to_string()),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""date":"2025-03-01""#));
    }
}
