use tabula::config::{Layout, OutputFormat};
use tabula::model::{ColumnType, Record, Store, Value};
use tabula::output::{render_to_string, OutputFactory};
use tabula::parser::{read_csv_from, ReadOptions};
use tabula::Error;

const TYPES: [ColumnType; 3] = [ColumnType::Str, ColumnType::Int, ColumnType::Float];

fn portfolio(layout: Layout) -> Store {
    let rows = vec![
        vec!["AA".to_string(), "100".to_string(), "32.20".to_string()],
        vec!["IBM".to_string(), "50".to_string(), "91.10".to_string()],
        vec!["CAT".to_string(), "150".to_string(), "83.44".to_string()],
        vec!["MSFT".to_string(), "200".to_string(), "51.23".to_string()],
    ];
    Store::from_rows(&["name", "shares", "price"], rows, Some(&TYPES[..]), layout)
        .unwrap()
        .into_store()
}

#[test]
fn csv_render_round_trips_through_ingest() {
    for layout in [Layout::Columns, Layout::Rows] {
        let store = portfolio(layout);
        let columns = store.column_names();
        let formatter = OutputFactory::create(OutputFormat::Csv);
        let text = render_to_string(store.iter(), &columns, formatter.as_ref()).unwrap();

        let options = ReadOptions {
            types: Some(&TYPES[..]),
            layout,
            ..Default::default()
        };
        let again = read_csv_from(text.as_bytes(), options).unwrap();
        assert!(again.is_clean());
        assert_eq!(again.store.len(), store.len());
        for (a, b) in store.iter().zip(again.store.iter()) {
            assert_eq!(a, b);
        }
    }
}

#[test]
fn slice_then_render_uses_slice_widths() {
    let store = portfolio(Layout::Columns);
    let head = store.slice(0..2).unwrap();
    let text = OutputFactory::from_key("text").unwrap();
    let out = render_to_string(head.iter(), &["name", "shares"], text.as_ref()).unwrap();
    assert_eq!(out, " name  shares\n--------------\n   AA     100\n  IBM      50\n");
}

#[test]
fn append_then_render() {
    let mut store = portfolio(Layout::Rows);
    store
        .append(Record::new().with("name", "GE").with("shares", 95).with("price", 40.37))
        .unwrap();
    assert_eq!(store.len(), 5);
    assert_eq!(store.get(4).unwrap().get("price"), Some(&Value::Float(40.37)));

    let err = store
        .append(Record::new().with("name", "HPQ").with("shares", 50))
        .unwrap_err();
    assert!(matches!(err, Error::MissingColumn(_)));
    assert_eq!(store.len(), 5);
}

#[test]
fn renderer_accepts_any_field_shape() {
    use std::collections::HashMap;

    let mut row = HashMap::new();
    row.insert("name".to_string(), Value::from("AA"));
    let maps = vec![row];
    let stocks = vec![tabula::queries::Stock::new("AA", 100, 32.2)];
    let csv = OutputFactory::create(OutputFormat::Csv);

    let from_maps = render_to_string(&maps, &["name"], csv.as_ref()).unwrap();
    let from_structs = render_to_string(&stocks, &["name"], csv.as_ref()).unwrap();
    assert_eq!(from_maps, from_structs);
}
