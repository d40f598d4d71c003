//! Tag frequency ranking
//!
//! Both the personality inference and daily-question services summarize a
//! user's survey answers as their highest-frequency tags. The ranking must
//! be stable: ties keep first-occurrence order so repeated calls over the
//! same answers always produce the same summary.

use crate::types::SurveyAnswer;

/// Number of top tags embedded into model prompts.
pub const TOP_TAG_COUNT: usize = 8;

/// Rank all tags across `answers` by frequency, descending, keeping
/// first-occurrence order among equal counts, truncated to `cap` entries.
pub fn top_tags(answers: &[SurveyAnswer], cap: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for answer in answers {
        for tag in &answer.tags {
            match counts.iter_mut().find(|(t, _)| *t == tag.as_str()) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag.as_str(), 1)),
            }
        }
    }
    // sort_by is stable, so equal counts keep insertion order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(cap)
        .map(|(tag, _)| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(tags: &[&str]) -> SurveyAnswer {
        SurveyAnswer {
            question_id: "q".to_string(),
            choice_id: "c".to_string(),
            choice_text: "text".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn ranks_by_frequency_descending() {
        let answers = vec![answer(&["a", "b"]), answer(&["b", "c", "b"])];
        assert_eq!(top_tags(&answers, TOP_TAG_COUNT), vec!["b", "a", "c"]);
    }

    #[test]
    fn ties_keep_first_occurrence_order() {
        // a and b both occur 3 times; a was seen first
        let answers = vec![
            answer(&["a", "b", "c"]),
            answer(&["a", "b"]),
            answer(&["a", "b"]),
        ];
        let ranked = top_tags(&answers, TOP_TAG_COUNT);
        assert_eq!(ranked[0], "a");
        assert_eq!(ranked[1], "b");
        assert_eq!(ranked[2], "c");
    }

    #[test]
    fn truncates_to_cap_with_more_than_eight_distinct_tags() {
        let answers = vec![
            answer(&["t1", "t2", "t3", "t4", "t5"]),
            answer(&["t6", "t7", "t8", "t9", "t10"]),
            answer(&["t1"]),
        ];
        let ranked = top_tags(&answers, TOP_TAG_COUNT);
        assert_eq!(ranked.len(), 8);
        assert_eq!(ranked[0], "t1");
        assert!(!ranked.contains(&"t9".to_string()));
        assert!(!ranked.contains(&"t10".to_string()));
    }

    #[test]
    fn empty_answers_rank_empty() {
        assert!(top_tags(&[], TOP_TAG_COUNT).is_empty());
    }
}
