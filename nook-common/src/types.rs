//! Shared wire types for the Nook services
//!
//! All request/response bodies use camelCase field names to preserve the
//! JSON contract consumed by the survey client.

use serde::{Deserialize, Serialize};

/// One answered survey question, produced by the survey client.
///
/// Immutable once created; the personality and daily-question services
/// consume these read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnswer {
    pub question_id: String,
    pub choice_id: String,
    pub choice_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A multiple-choice question with tagged choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub choices: Vec<QuestionChoice>,
}

/// One selectable choice within a [`Question`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionChoice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A day's worth of previously generated questions, supplied by the client
/// so freshly generated questions avoid repeats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyQuestionSet {
    pub date: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A curated product idea returned by personality inference.
///
/// `category` carries one of the canonical catalog values
/// (BED, DESK, LAMP, RUG, WALL_ART, PLANT, STORAGE, DECOR, CHAIR, BEDDING)
/// but is kept as a free string: the model output passes through after
/// coercion and may fall outside the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdea {
    pub name: String,
    pub search_query: String,
    pub category: String,
    #[serde(default)]
    pub style_hints: Vec<String>,
    #[serde(default)]
    pub color_hints: Vec<String>,
    pub rationale: String,
}

impl ProductIdea {
    /// Deterministic filler entry used to pad inference output up to the
    /// required product count.
    pub fn default_lamp() -> Self {
        Self {
            name: "nightstand lamp".to_string(),
            search_query: "nightstand lamp".to_string(),
            category: "LAMP".to_string(),
            style_hints: Vec::new(),
            color_hints: Vec::new(),
            rationale: String::new(),
        }
    }
}

/// A unit-square-relative placement rectangle.
///
/// Used in two unrelated catalogs: the 7-slot UI hotspot set served at
/// `GET /slots`, and the composer's fixed 4-anchor set. The two sets are
/// intentionally independent and are never reconciled spatially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The static UI hotspot catalog.
pub fn default_slots() -> Vec<NormalizedBox> {
    let slot = |x, y, w, h, label: &str| NormalizedBox {
        x,
        y,
        w,
        h,
        label: Some(label.to_string()),
    };
    vec![
        slot(0.10, 0.55, 0.40, 0.35, "bed"),
        slot(0.55, 0.55, 0.35, 0.30, "desk_laptop"),
        slot(0.08, 0.88, 0.84, 0.10, "rug"),
        slot(0.70, 0.40, 0.18, 0.28, "floor_lamp"),
        slot(0.62, 0.15, 0.28, 0.18, "wall_art"),
        slot(0.22, 0.50, 0.10, 0.16, "nightstand"),
        slot(0.15, 0.45, 0.12, 0.18, "plant"),
    ]
}

/// A generated room, stored in memory for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub id: String,
    pub seed: i64,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boxes: Option<Vec<NormalizedBox>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<serde_json::Value>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_answer_round_trips_camel_case() {
        let json = r#"{"questionId":"q1","choiceId":"c1","choiceText":"Stay home","tags":["homebody","cozy"]}"#;
        let answer: SurveyAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.question_id, "q1");
        assert_eq!(answer.tags, vec!["homebody", "cozy"]);

        let back = serde_json::to_value(&answer).unwrap();
        assert_eq!(back["choiceText"], "Stay home");
    }

    #[test]
    fn default_slots_catalog_has_seven_entries() {
        let slots = default_slots();
        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0].label.as_deref(), Some("bed"));
        for slot in &slots {
            assert!(slot.x >= 0.0 && slot.x + slot.w <= 1.0);
            assert!(slot.y >= 0.0 && slot.y + slot.h <= 1.0);
        }
    }

    #[test]
    fn room_record_omits_absent_optionals() {
        let record = RoomRecord {
            id: "abcd1234".to_string(),
            seed: 42,
            image_url: "data:image/png;base64,AA==".to_string(),
            boxes: None,
            product_ids: None,
            personality_type: None,
            theme: None,
            created_at: 0,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("boxes").is_none());
        assert!(value.get("personalityType").is_none());
        assert_eq!(value["imageUrl"], "data:image/png;base64,AA==");
    }
}
