mod helpers;

use helpers::{classification, enrich, member_at, test_db};
use talentd::query::mentors::{find_mentors, MentorFilter};
use talentd::store::members::upsert_member;
use talentd::store::types::PersonaType;
use talentd::store::write::write_enrichment;

fn skill_filter(skills: &[&str], min_confidence: f64) -> MentorFilter {
    MentorFilter {
        skills: skills.iter().map(|s| s.to_string()).collect(),
        min_confidence,
        ..MentorFilter::default()
    }
}

#[test]
fn skill_matcher_ranks_above_non_matcher() {
    let mut conn = test_db();
    enrich(
        &mut conn,
        "M1",
        "Mentor Material",
        0.9,
        &[("python", 0.8), ("mentoring", 0.75)],
    );
    enrich(&mut conn, "M9", "Mentor Material", 0.95, &[("cobol", 0.9)]);

    // OR mode: the non-matcher is excluded entirely.
    let matches = find_mentors(&conn, &skill_filter(&["python"], 0.5), 0.1).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].member_id, "M1");
    assert_eq!(matches[0].matched_skills, vec!["python"]);

    // With no skill filter, both qualify and the non-matcher may rank
    // first on persona confidence alone.
    let matches = find_mentors(&conn, &skill_filter(&[], 0.5), 0.1).unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].member_id, "M9");
}

#[test]
fn ranking_keys_apply_in_order() {
    let mut conn = test_db();
    // Two matched skills beats one, regardless of persona confidence.
    enrich(&mut conn, "M1", "Mentor Material", 0.6, &[("python", 0.5), ("sql", 0.5)]);
    enrich(&mut conn, "M2", "Mentor Material", 0.99, &[("python", 0.9)]);
    // Same matched count as M2 but higher matched confidence sum.
    enrich(&mut conn, "M3", "Mentor Material", 0.5, &[("sql", 0.95)]);

    let matches = find_mentors(&conn, &skill_filter(&["python", "sql"], 0.0), 0.1).unwrap();
    let order: Vec<&str> = matches.iter().map(|m| m.member_id.as_str()).collect();
    assert_eq!(order, vec!["M1", "M3", "M2"]);
}

#[test]
fn ties_break_on_member_id_for_determinism() {
    let mut conn = test_db();
    for id in ["M2", "M1", "M3"] {
        enrich(&mut conn, id, "Mentor Material", 0.8, &[("python", 0.7)]);
    }

    let filter = skill_filter(&["python"], 0.0);
    let first = find_mentors(&conn, &filter, 0.1).unwrap();
    let order: Vec<&str> = first.iter().map(|m| m.member_id.as_str()).collect();
    assert_eq!(order, vec!["M1", "M2", "M3"]);

    // Same snapshot, same filter: identical ordering on every call.
    for _ in 0..3 {
        let again = find_mentors(&conn, &filter, 0.1).unwrap();
        let repeat: Vec<&str> = again.iter().map(|m| m.member_id.as_str()).collect();
        assert_eq!(repeat, order);
    }
}

#[test]
fn all_skills_mode_requires_every_requested_skill() {
    let mut conn = test_db();
    enrich(&mut conn, "M1", "Mentor Material", 0.9, &[("python", 0.8)]);
    enrich(&mut conn, "M2", "Mentor Material", 0.7, &[("python", 0.8), ("sql", 0.6)]);

    let mut filter = skill_filter(&["python", "sql"], 0.0);
    filter.match_all_skills = true;

    let matches = find_mentors(&conn, &filter, 0.1).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].member_id, "M2");
}

#[test]
fn location_and_persona_filters_narrow_results() {
    let mut conn = test_db();
    upsert_member(&conn, &member_at("M1", "Mumbai")).unwrap();
    upsert_member(&conn, &member_at("M2", "Berlin")).unwrap();
    write_enrichment(&mut conn, "M1", &classification("Mentor Material", 0.9, &[])).unwrap();
    write_enrichment(&mut conn, "M2", &classification("Active Learner", 0.9, &[])).unwrap();

    let filter = MentorFilter {
        location: Some("mumb".to_string()),
        ..MentorFilter::default()
    };
    let matches = find_mentors(&conn, &filter, 0.1).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].member_id, "M1");

    let filter = MentorFilter {
        persona_type: Some(PersonaType::ActiveLearner),
        ..MentorFilter::default()
    };
    let matches = find_mentors(&conn, &filter, 0.1).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].member_id, "M2");
}

#[test]
fn min_confidence_excludes_weak_snapshots() {
    let mut conn = test_db();
    enrich(&mut conn, "M1", "Mentor Material", 0.9, &[]);
    enrich(&mut conn, "M2", "Mentor Material", 0.3, &[]);

    let matches = find_mentors(&conn, &skill_filter(&[], 0.5), 0.1).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].member_id, "M1");
}

#[test]
fn ranking_sees_only_the_current_snapshot() {
    let mut conn = test_db();
    enrich(&mut conn, "M1", "Mentor Material", 0.9, &[("python", 0.8)]);
    // Version 2 drops python.
    write_enrichment(&mut conn, "M1", &classification("Passive", 0.6, &[("excel", 0.5)]))
        .unwrap();

    let matches = find_mentors(&conn, &skill_filter(&["python"], 0.0), 0.1).unwrap();
    assert!(matches.is_empty(), "superseded skills must not match");
}

#[test]
fn needs_review_is_derived_from_threshold() {
    let mut conn = test_db();
    enrich(&mut conn, "M1", "Passive", 0.05, &[]);

    let matches = find_mentors(&conn, &skill_filter(&[], 0.0), 0.1).unwrap();
    assert_eq!(matches.len(), 1);
    assert!(matches[0].needs_review);

    // Same stored state, different threshold: the flag is query-time only.
    let matches = find_mentors(&conn, &skill_filter(&[], 0.0), 0.01).unwrap();
    assert!(!matches[0].needs_review);
}
