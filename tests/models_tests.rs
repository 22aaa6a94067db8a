// Model tests: sums fold, site projection, JSON shape of records and cache file

mod common;

use common::{record, sample_snapshot};
use trafficboard::models::*;

#[test]
fn sums_today_total_example() {
    let records = vec![
        record("A", "1", 5, 0, 0),
        record("B", "2", 10, 0, 0),
        record("C", "3", 0, 0, 0),
    ];
    assert_eq!(Sums::from_records(&records).today.total, 15);
}

#[test]
fn sums_equal_field_wise_sum() {
    let records = vec![
        record("A", "1", 7, 11, 300),
        record("B", "2", 3, 13, 1200),
        record("C", "3", 9, 0, 8),
    ];
    let sums = Sums::from_records(&records);
    assert_eq!(sums.today.total, 7 + 3 + 9);
    assert_eq!(sums.today.organic, 3 + 1 + 4);
    assert_eq!(sums.yesterday.total, 11 + 13);
    assert_eq!(sums.yesterday.organic, 5 + 6);
    assert_eq!(sums.monthly.total, 300 + 1200 + 8);
    assert_eq!(sums.monthly.organic, 75 + 300 + 2);
}

#[test]
fn sums_do_not_depend_on_order() {
    let mut records = vec![
        record("A", "1", 7, 11, 300),
        record("B", "2", 3, 13, 1200),
        record("C", "3", 9, 0, 8),
        record("D", "4", 1, 2, 3),
    ];
    let forward = Sums::from_records(&records);
    records.reverse();
    assert_eq!(Sums::from_records(&records), forward);
    records.swap(0, 2);
    assert_eq!(Sums::from_records(&records), forward);
}

#[test]
fn sums_of_empty_aggregate_are_zero() {
    assert_eq!(Sums::from_records(&[]), Sums::default());
}

#[test]
fn sums_ignore_improvement_windows() {
    let mut r = record("A", "1", 0, 0, 100);
    r.monthly.improvement_total = 1_000_000;
    r.monthly.improvement_organic = 1_000_000;
    let sums = Sums::from_records(&[r]);
    assert_eq!(sums.monthly, MetricPair::new(100, 25));
}

#[test]
fn sites_follow_aggregate_order() {
    let snapshot = sample_snapshot();
    let expected: Vec<Property> = snapshot
        .aggregate
        .iter()
        .map(|r| Property {
            name: r.property.name.clone(),
            id: r.property.id.clone(),
        })
        .collect();
    assert_eq!(snapshot.sites, expected);
    assert_eq!(snapshot.sites[0].name, "Alpha");
    assert_eq!(snapshot.sites[2].name, "Gamma");
}

#[test]
fn find_site_returns_first_match() {
    let mut snapshot = sample_snapshot();
    let mut dup = record("Alpha", "999", 1, 1, 1);
    dup.today.total = 12345;
    snapshot.aggregate.push(dup);
    let found = snapshot.find_site("Alpha").unwrap();
    assert_eq!(found.property.id, "101");
    assert!(snapshot.find_site("Acme").is_none());
}

#[test]
fn property_record_json_uses_snake_case_fields() {
    let json = serde_json::to_value(record("Alpha", "101", 5, 40, 900)).unwrap();
    assert_eq!(json["property"]["name"], "Alpha");
    assert_eq!(json["property"]["id"], "101");
    assert_eq!(json["today"]["total"], 5);
    assert_eq!(json["today"]["organic"], 2);
    assert_eq!(json["monthly"]["improvement_total"], 450);
    assert_eq!(json["monthly"]["improvement_organic"], 112);
}

#[test]
fn cached_aggregate_holds_only_aggregate() {
    let data = CachedAggregate {
        aggregate: vec![record("Alpha", "101", 5, 40, 900)],
    };
    let json = serde_json::to_value(&data).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert!(obj.contains_key("aggregate"));
    let back: CachedAggregate = serde_json::from_value(json).unwrap();
    assert_eq!(back, data);
}

#[test]
fn snapshot_source_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&SnapshotSource::Cache).unwrap(),
        "\"cache\""
    );
}
