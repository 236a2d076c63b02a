use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// A CTF event grouping challenges
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ctf {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Challenge category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Category {
    Crypto,
    Rev,
    #[serde(rename = "OSINT")]
    #[sqlx(rename = "OSINT")]
    Osint,
    #[serde(rename = "PWN")]
    #[sqlx(rename = "PWN")]
    Pwn,
    #[serde(rename = "Binary Exploitation")]
    #[sqlx(rename = "Binary Exploitation")]
    BinaryExploitation,
    Forensics,
    Web,
    Misc,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Crypto,
        Category::Rev,
        Category::Osint,
        Category::Pwn,
        Category::BinaryExploitation,
        Category::Forensics,
        Category::Web,
        Category::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Crypto => "Crypto",
            Category::Rev => "Rev",
            Category::Osint => "OSINT",
            Category::Pwn => "PWN",
            Category::BinaryExploitation => "Binary Exploitation",
            Category::Forensics => "Forensics",
            Category::Web => "Web",
            Category::Misc => "Misc",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
                ApiError::Validation(format!(
                    "Invalid category '{}', expected one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// A single puzzle inside a CTF
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    /// Not checked against existing CTFs
    pub ctf_id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    /// Object store id of the attachment
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A submitted candidate flag
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FlagSubmission {
    pub id: String,
    pub challenge_id: String,
    pub user_id: String,
    pub flag_text: String,
    pub note: String,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Request bodies. Every field is optional at the wire level so that a missing
// field is reported as a validation error rather than a decode failure.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCtfInput {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeInput {
    pub ctf_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagInput {
    pub challenge_id: Option<String>,
    pub user_id: Option<String>,
    pub flag_text: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlagInput {
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCtf {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChallenge {
    pub ctf_id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlagSubmission {
    pub challenge_id: String,
    pub user_id: String,
    pub flag_text: String,
    pub note: String,
}

/// Trimmed, non-empty value or `None`.
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Non-empty value or `None`, untouched otherwise.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl CreateCtfInput {
    pub fn validate(self) -> Result<NewCtf, ApiError> {
        let name = trimmed(self.name)
            .ok_or_else(|| ApiError::Validation("CTF name is required".into()))?;
        Ok(NewCtf { name })
    }
}

impl CreateChallengeInput {
    pub fn validate(self) -> Result<NewChallenge, ApiError> {
        let (Some(ctf_id), Some(title), Some(description), Some(category)) = (
            present(self.ctf_id),
            trimmed(self.title),
            present(self.description),
            present(self.category),
        ) else {
            return Err(ApiError::Validation(
                "CTF ID, title, description, and category are required".into(),
            ));
        };

        Ok(NewChallenge {
            ctf_id,
            title,
            description,
            category: category.parse()?,
            file_url: present(self.file_url),
        })
    }
}

impl CreateFlagInput {
    pub fn validate(self) -> Result<NewFlagSubmission, ApiError> {
        let (Some(challenge_id), Some(user_id), Some(flag_text)) = (
            present(self.challenge_id),
            present(self.user_id),
            trimmed(self.flag_text),
        ) else {
            return Err(ApiError::Validation(
                "Challenge ID, user ID, and flag text are required".into(),
            ));
        };

        Ok(NewFlagSubmission {
            challenge_id,
            user_id,
            flag_text,
            note: self.note.unwrap_or_default(),
        })
    }
}

impl UpdateFlagInput {
    pub fn validate(self) -> Result<bool, ApiError> {
        self.is_correct
            .ok_or_else(|| ApiError::Validation("isCorrect is required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        assert_eq!(
            names,
            [
                "Crypto",
                "Rev",
                "OSINT",
                "PWN",
                "Binary Exploitation",
                "Forensics",
                "Web",
                "Misc"
            ]
        );
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_rejects_unknown_and_wrong_case() {
        assert!("Stego".parse::<Category>().is_err());
        assert!("crypto".parse::<Category>().is_err());
        assert!("Osint".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_matches_display() {
        let json = serde_json::to_string(&Category::BinaryExploitation).unwrap();
        assert_eq!(json, "\"Binary Exploitation\"");
        let parsed: Category = serde_json::from_str("\"OSINT\"").unwrap();
        assert_eq!(parsed, Category::Osint);
    }

    #[test]
    fn test_ctf_name_is_trimmed() {
        let input = CreateCtfInput {
            name: Some("  HackTheBox Weekly  ".into()),
        };
        assert_eq!(input.validate().unwrap().name, "HackTheBox Weekly");
    }

    #[test]
    fn test_blank_ctf_name_is_rejected() {
        let input = CreateCtfInput {
            name: Some("   ".into()),
        };
        assert!(matches!(input.validate(), Err(ApiError::Validation(_))));
        assert!(CreateCtfInput::default().validate().is_err());
    }

    #[test]
    fn test_challenge_requires_category() {
        let input = CreateChallengeInput {
            ctf_id: Some("ctf".into()),
            title: Some("Baby RSA".into()),
            description: Some("e = 3".into()),
            category: None,
            file_url: None,
        };
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_challenge_with_invalid_category() {
        let input = CreateChallengeInput {
            ctf_id: Some("ctf".into()),
            title: Some("Baby RSA".into()),
            description: Some("e = 3".into()),
            category: Some("Stego".into()),
            file_url: Some(String::new()),
        };
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid category 'Stego'"));
    }

    #[test]
    fn test_challenge_empty_file_url_is_none() {
        let input = CreateChallengeInput {
            ctf_id: Some("ctf".into()),
            title: Some("Baby RSA".into()),
            description: Some("e = 3".into()),
            category: Some("Crypto".into()),
            file_url: Some(String::new()),
        };
        let challenge = input.validate().unwrap();
        assert_eq!(challenge.category, Category::Crypto);
        assert_eq!(challenge.file_url, None);
    }

    #[test]
    fn test_flag_defaults() {
        let input = CreateFlagInput {
            challenge_id: Some("c".into()),
            user_id: Some("u1".into()),
            flag_text: Some(" flag{abc} ".into()),
            note: None,
        };
        let flag = input.validate().unwrap();
        assert_eq!(flag.flag_text, "flag{abc}");
        assert_eq!(flag.note, "");
    }

    #[test]
    fn test_flag_requires_user() {
        let input = CreateFlagInput {
            challenge_id: Some("c".into()),
            user_id: Some(String::new()),
            flag_text: Some("flag{abc}".into()),
            note: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_requires_is_correct() {
        assert!(UpdateFlagInput::default().validate().is_err());
        let input: UpdateFlagInput = serde_json::from_str(r#"{"isCorrect": true}"#).unwrap();
        assert!(input.validate().unwrap());
    }

    #[test]
    fn test_challenge_serializes_camel_case() {
        let now = Utc::now();
        let challenge = Challenge {
            id: "1".into(),
            ctf_id: "2".into(),
            title: "Baby RSA".into(),
            description: "e = 3".into(),
            category: Category::Crypto,
            file_url: None,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&challenge).unwrap();
        assert_eq!(value["ctfId"], "2");
        assert_eq!(value["category"], "Crypto");
        assert!(value.get("createdAt").is_some());
    }
}
