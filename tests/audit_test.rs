mod helpers;

use helpers::{classification, enrich, member, test_db};
use talentd::query::audit::{audit_low_confidence, history, AuditStatus};
use talentd::query::stats::store_stats;
use talentd::store::members::upsert_member;
use talentd::store::types::PersonaType;
use talentd::store::write::write_enrichment;

#[test]
fn low_confidence_members_are_listed_with_their_version() {
    let mut conn = test_db();
    enrich(&mut conn, "M1", "Mentor Material", 0.9, &[]);
    // "Not sure yet" bio classified at the review floor.
    enrich(&mut conn, "M2", "Passive", 0.1, &[]);

    let entries = audit_low_confidence(&conn, 0.4).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].member_id, "M2");
    assert_eq!(entries[0].status, AuditStatus::LowConfidence);
    assert_eq!(entries[0].enrichment_version, Some(1));
    assert!(entries[0].confidence_score.unwrap() < 0.4);
}

#[test]
fn never_enriched_members_appear_as_unclassified() {
    let mut conn = test_db();
    upsert_member(&conn, &member("M3")).unwrap();
    enrich(&mut conn, "M1", "Passive", 0.2, &[]);

    let entries = audit_low_confidence(&conn, 0.4).unwrap();
    assert_eq!(entries.len(), 2);
    // Unclassified entries lead the listing.
    assert_eq!(entries[0].member_id, "M3");
    assert_eq!(entries[0].status, AuditStatus::Unclassified);
    assert!(entries[0].persona_type.is_none());
    assert_eq!(entries[1].member_id, "M1");
}

#[test]
fn audit_listing_orders_by_ascending_confidence() {
    let mut conn = test_db();
    enrich(&mut conn, "M1", "Passive", 0.3, &[]);
    enrich(&mut conn, "M2", "Passive", 0.05, &[]);
    enrich(&mut conn, "M3", "Passive", 0.2, &[]);

    let entries = audit_low_confidence(&conn, 0.4).unwrap();
    let order: Vec<&str> = entries.iter().map(|e| e.member_id.as_str()).collect();
    assert_eq!(order, vec!["M2", "M3", "M1"]);
}

#[test]
fn re_enrichment_keeps_history_with_one_current_row() {
    let mut conn = test_db();
    enrich(&mut conn, "M1", "Needs Guidance", 0.4, &[("excel", 0.4)]);
    write_enrichment(
        &mut conn,
        "M1",
        &classification("Mentor Material", 0.9, &[("python", 0.8)]),
    )
    .unwrap();

    let rows = history(&conn, "M1").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].enrichment_version, 1);
    assert!(!rows[0].is_current);
    assert_eq!(rows[0].persona_type, PersonaType::NeedsGuidance);
    assert_eq!(rows[1].enrichment_version, 2);
    assert!(rows[1].is_current);
    assert_eq!(rows[1].persona_type, PersonaType::MentorMaterial);
}

#[test]
fn history_of_unknown_member_is_empty() {
    let conn = test_db();
    assert!(history(&conn, "ghost").unwrap().is_empty());
}

#[test]
fn unenriched_members_count_toward_totals_but_not_queries() {
    let mut conn = test_db();
    // M3's oracle call failed before any snapshot was written; the store
    // holds only its identity record.
    upsert_member(&conn, &member("M3")).unwrap();
    enrich(&mut conn, "M1", "Mentor Material", 0.9, &[("python", 0.8)]);

    let stats = store_stats(&conn, None).unwrap();
    assert_eq!(stats.total_members, 2);
    assert_eq!(stats.enriched_members, 1);

    let matches = talentd::query::mentors::find_mentors(
        &conn,
        &talentd::query::mentors::MentorFilter::default(),
        0.1,
    )
    .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].member_id, "M1");
}
