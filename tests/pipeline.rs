//! End-to-end pipeline tests: sheet text in, stored orders out.

mod common;

use chrono::NaiveDate;
use order_sync::columns::SchemaVariant;
use order_sync::merge::merge_rows;
use order_sync::normalize::{RANGE_MAX, RANGE_STANDARD, TOW_HITCH_UNAVAILABLE};
use order_sync::record::parse_sheet;
use order_sync::store::{MemoryStore, OrderStore, PersistedOrder};
use order_sync::vehicle::VehicleLine;

use common::{FailingStore, fixture_text};

const HEADER: &str = "Name,Bestelldatum,Land,Modell\n";

fn sheet(rows: &[&str]) -> String {
    let mut text = HEADER.to_string();
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn find<'a>(store: &'a MemoryStore, name: &str) -> &'a PersistedOrder {
    store
        .orders()
        .iter()
        .find(|o| o.fields.name == name)
        .unwrap_or_else(|| panic!("order for {name}"))
}

#[test]
fn model_y_fixture_normalizes_every_named_row() {
    let rows = parse_sheet(&fixture_text("model_y.csv"), SchemaVariant::ModelY)
        .expect("fixture has data");
    assert_eq!(rows.len(), 6);
    let records = rows
        .iter()
        .filter_map(|row| row.record.as_ref())
        .collect::<Vec<_>>();
    let names = records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Anna", "Ben", "Cem", "Doe, John", "Eva"]);

    let anna = records[0];
    assert_eq!(anna.order_date, NaiveDate::from_ymd_opt(2024, 4, 5));
    assert_eq!(anna.country.as_deref(), Some("de"));
    assert_eq!(anna.wheels.as_deref(), Some("19"));
    assert_eq!(anna.autopilot.as_deref(), Some("eap"));
    assert_eq!(anna.vin.as_deref(), Some("LRWYGCEK1PC000001"));
    assert_eq!(anna.days_to_vin, Some(15));
    assert_eq!(anna.days_to_papers, Some(20));
    assert_eq!(anna.days_to_delivery, Some(40));

    let cem = records[2];
    assert_eq!(cem.delivery_window, None);
    assert_eq!(cem.papers_received_date, None);
    assert_eq!(cem.days_to_vin, Some(12));

    let doe = records[3];
    assert_eq!(doe.order_date, None);
    assert_eq!(doe.country.as_deref(), Some("ch"));
    assert_eq!(doe.delivery_window.as_deref(), Some("KW 22\n(unsicher)"));

    let eva = records[4];
    assert_eq!(eva.country.as_deref(), Some("nl"));
    assert_eq!(eva.color.as_deref(), Some("silver"));
    assert_eq!(eva.tow_hitch.as_deref(), Some("ja"));
}

#[test]
fn second_run_over_same_sheet_creates_nothing() {
    let text = fixture_text("model_y.csv");
    let mut store = MemoryStore::new();

    let first = merge_rows(&mut store, parse_sheet(&text, SchemaVariant::ModelY).unwrap());
    assert_eq!(first.created, 5);
    assert_eq!(first.updated, 0);
    assert_eq!(first.skipped, 1);
    assert!(first.errors.is_empty());
    let snapshot = store
        .orders()
        .iter()
        .map(|o| (o.id, o.created_at, o.fields.clone()))
        .collect::<Vec<_>>();

    let second = merge_rows(&mut store, parse_sheet(&text, SchemaVariant::ModelY).unwrap());
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 5);
    assert_eq!(store.count().unwrap(), 5);
    let after = store
        .orders()
        .iter()
        .map(|o| (o.id, o.created_at, o.fields.clone()))
        .collect::<Vec<_>>();
    assert_eq!(snapshot, after);
}

#[test]
fn model_3_fixture_applies_trim_rules() {
    let mut store = MemoryStore::new();
    let rows = parse_sheet(&fixture_text("model_3.csv"), SchemaVariant::Model3).unwrap();
    let result = merge_rows(&mut store, rows);
    assert_eq!(result.created, 3);

    let fritz = find(&store, "Fritz");
    assert_eq!(fritz.fields.vehicle_type, VehicleLine::Model3);
    assert_eq!(fritz.fields.tow_hitch.as_deref(), Some(TOW_HITCH_UNAVAILABLE));
    assert_eq!(fritz.fields.range.as_deref(), Some(RANGE_MAX));

    let gina = find(&store, "Gina");
    assert_eq!(gina.fields.country.as_deref(), Some("at"));
    assert_eq!(gina.fields.tow_hitch.as_deref(), Some("ja"));
    assert_eq!(gina.fields.range.as_deref(), Some(RANGE_MAX));
    assert_eq!(gina.fields.wheels.as_deref(), Some("18"));

    let hans = find(&store, "Hans");
    assert_eq!(hans.fields.range.as_deref(), Some(RANGE_STANDARD));
    assert_eq!(hans.fields.tow_hitch.as_deref(), Some("nein"));
    assert_eq!(hans.fields.autopilot, None);
}

#[test]
fn storage_failure_is_isolated_to_its_row() {
    let text = sheet(&[
        "Anna,01.03.2024,DE,Long Range",
        "Ben,02.03.2024,DE,Long Range",
        "Cem,03.03.2024,AT,Standard",
        "Dana,04.03.2024,CH,Long Range",
        "Emil,05.03.2024,DE,Performance",
    ]);
    let mut store = FailingStore::failing_on_create(3);
    let result = merge_rows(&mut store, parse_sheet(&text, SchemaVariant::ModelY).unwrap());

    assert_eq!(result.created + result.updated, 4);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("row 4"), "{}", result.errors[0]);
    assert!(result.errors[0].contains("Cem"), "{}", result.errors[0]);
    assert!(result.errors[0].contains("simulated write failure"));

    let names = store
        .inner
        .orders()
        .iter()
        .map(|o| o.fields.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Anna", "Ben", "Dana", "Emil"]);
}

#[test]
fn same_name_and_date_merge_into_one_order() {
    let text = sheet(&[
        "Jane,01.03.2024,DE,Long Range",
        "Jane,01.03.2024,AT,Long Range",
    ]);
    let mut store = MemoryStore::new();
    let result = merge_rows(&mut store, parse_sheet(&text, SchemaVariant::ModelY).unwrap());
    assert_eq!(result.created, 1);
    assert_eq!(result.updated, 1);
    assert_eq!(store.orders().len(), 1);
    assert_eq!(store.orders()[0].fields.country.as_deref(), Some("at"));
}

#[test]
fn same_name_with_different_dates_stays_separate() {
    let text = sheet(&[
        "Jane,01.03.2024,DE,Long Range",
        "Jane,02.03.2024,DE,Long Range",
    ]);
    let mut store = MemoryStore::new();
    let result = merge_rows(&mut store, parse_sheet(&text, SchemaVariant::ModelY).unwrap());
    assert_eq!(result.created, 2);
    assert_eq!(store.orders().len(), 2);
}

#[test]
fn missing_order_date_only_matches_missing_order_date() {
    let mut store = MemoryStore::new();
    merge_rows(
        &mut store,
        parse_sheet(&sheet(&["Jane,01.03.2024,DE,Long Range"]), SchemaVariant::ModelY).unwrap(),
    );

    let undated = sheet(&["Jane,-,DE,Long Range"]);
    let result = merge_rows(&mut store, parse_sheet(&undated, SchemaVariant::ModelY).unwrap());
    assert_eq!(result.created, 1);

    let result = merge_rows(&mut store, parse_sheet(&undated, SchemaVariant::ModelY).unwrap());
    assert_eq!(result.updated, 1);
    assert_eq!(result.created, 0);
    assert_eq!(store.orders().len(), 2);
}

#[test]
fn same_name_and_date_on_other_vehicle_line_is_a_new_order() {
    let text = sheet(&["Jane,01.03.2024,DE,Long Range"]);
    let mut store = MemoryStore::new();
    merge_rows(&mut store, parse_sheet(&text, SchemaVariant::ModelY).unwrap());
    let result = merge_rows(&mut store, parse_sheet(&text, SchemaVariant::Model3).unwrap());
    assert_eq!(result.created, 1);
    assert_eq!(store.orders().len(), 2);
}
