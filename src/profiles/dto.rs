use serde::Deserialize;

use crate::profiles::repo::{ProfileFields, SocialLinks};

/// Skills arrive either as a JSON array or, from older clients, a single
/// comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SkillsInput::List(v) => v
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            SkillsInput::Csv(s) => s
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Request body for profile create/update.
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub status: String,
    pub skills: SkillsInput,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

impl UpsertProfileRequest {
    pub fn into_fields(self) -> ProfileFields {
        let social = SocialLinks {
            youtube: self.youtube,
            twitter: self.twitter,
            facebook: self.facebook,
            linkedin: self.linkedin,
            instagram: self.instagram,
        };
        let has_social = [
            &social.youtube,
            &social.twitter,
            &social.facebook,
            &social.linkedin,
            &social.instagram,
        ]
        .iter()
        .any(|v| v.is_some());

        ProfileFields {
            status: self.status,
            skills: self.skills.into_vec(),
            company: self.company,
            website: self.website,
            location: self.location,
            bio: self.bio,
            social: has_social.then_some(social),
        }
    }
}

/// Request body for adding an experience entry.
#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Request body for adding an education entry.
#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skills_accepts_json_array() {
        let input: SkillsInput = serde_json::from_value(json!(["Rust", " SQL "])).unwrap();
        assert_eq!(input.into_vec(), vec!["Rust", "SQL"]);
    }

    #[test]
    fn skills_accepts_comma_separated_string() {
        let input: SkillsInput = serde_json::from_value(json!("Rust, SQL,,HTTP ")).unwrap();
        assert_eq!(input.into_vec(), vec!["Rust", "SQL", "HTTP"]);
    }

    #[test]
    fn social_is_absent_when_no_links_given() {
        let req: UpsertProfileRequest = serde_json::from_value(json!({
            "status": "Developer",
            "skills": ["Rust"]
        }))
        .unwrap();
        assert!(req.into_fields().social.is_none());
    }

    #[test]
    fn social_is_assembled_from_individual_fields() {
        let req: UpsertProfileRequest = serde_json::from_value(json!({
            "status": "Developer",
            "skills": ["Rust"],
            "twitter": "https://twitter.com/dev"
        }))
        .unwrap();
        let social = req.into_fields().social.expect("social");
        assert_eq!(social.twitter.as_deref(), Some("https://twitter.com/dev"));
        assert!(social.youtube.is_none());
    }
}
