use crud_router::{build, AllowList, FieldRegistry, FieldType, FieldValue, ListParams, ListQuery, Record};
use serde_json::json;

#[derive(Clone, Debug, PartialEq)]
struct Item {
    id: i64,
    name: String,
    value: i64,
    weight: Option<f64>,
}

impl Record for Item {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Int(self.id)),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "value" => Some(FieldValue::Int(self.value)),
            "weight" => Some(self.weight.map_or(FieldValue::Null, FieldValue::Float)),
            _ => None,
        }
    }
}

fn item(id: i64, name: &str, value: i64, weight: Option<f64>) -> Item {
    Item {
        id,
        name: name.to_string(),
        value,
        weight,
    }
}

fn registry() -> FieldRegistry {
    FieldRegistry::new()
        .with("id", FieldType::Integer)
        .with("name", FieldType::Text)
        .with("value", FieldType::Integer)
        .with("weight", FieldType::Float)
}

fn items() -> Vec<Item> {
    vec![
        item(1, "x", 1, Some(1.5)),
        item(2, "y", 3, None),
        item(3, "z", 2, Some(2.0)),
        item(4, "x", 4, Some(0.5)),
    ]
}

fn ids(rows: &[Item]) -> Vec<i64> {
    rows.iter().map(|r| r.id).collect()
}

fn run(params: ListParams) -> Vec<Item> {
    build(items(), &registry(), &params, &AllowList::any(), &AllowList::any())
}

#[test]
fn no_params_returns_base_order() {
    assert_eq!(ids(&run(ListParams::default())), vec![1, 2, 3, 4]);
}

#[test]
fn sort_direction_orders_values() {
    let rows = run(ListParams::default().sort("value", "DESC"));
    assert_eq!(ids(&rows), vec![4, 2, 3, 1]);
    let rows = run(ListParams::default().sort("value", "asc"));
    assert_eq!(ids(&rows), vec![1, 3, 2, 4]);
}

#[test]
fn filter_sort_then_paginate() {
    let rows = run(ListParams::default().filter("name:x").sort("value", "desc").page(0, 1));
    assert_eq!(ids(&rows), vec![4]);
    let rows = run(ListParams::default().sort("value", "desc").page(1, 2));
    assert_eq!(ids(&rows), vec![2, 3]);
    assert!(run(ListParams::default().page(10, 5)).is_empty());
    assert!(run(ListParams::default().page(0, 0)).is_empty());
}

#[test]
fn float_filters_and_null_ordering() {
    let rows = run(ListParams::default().filter("weight:2"));
    assert_eq!(ids(&rows), vec![3]);
    let rows = run(ListParams::default().filter("weight:0.5"));
    assert_eq!(ids(&rows), vec![4]);
    let rows = run(ListParams::default().sort("weight", "asc"));
    assert_eq!(ids(&rows), vec![2, 4, 1, 3]);
}

#[test]
fn value_with_extra_colons_stays_whole() {
    let mut base = items();
    base.push(item(5, "a:b", 0, None));
    let rows = build(
        base,
        &registry(),
        &ListParams::default().filter("name:a:b"),
        &AllowList::any(),
        &AllowList::any(),
    );
    assert_eq!(ids(&rows), vec![5]);
}

#[test]
fn allow_lists_drop_clauses_silently() {
    let params = ListParams::default().filter("name:x").sort("value", "desc");
    let rows = build(
        items(),
        &registry(),
        &params,
        &AllowList::only(["value"]),
        &AllowList::only(["name"]),
    );
    assert_eq!(ids(&rows), vec![1, 2, 3, 4]);
}

#[test]
fn plan_can_run_over_json_rows() {
    let rows = vec![
        json!({"id": 1, "name": "x", "value": 1}),
        json!({"id": 2, "name": "y", "value": 3}),
        json!({"id": 3, "name": "z", "value": 2}),
    ];
    let params = ListParams::from_pairs([("sort_by", "value"), ("sort_dir", "desc"), ("limit", "2")]);
    let query = ListQuery::plan(&registry(), &params, &AllowList::any(), &AllowList::any());
    let out = query.apply(&rows);
    let values: Vec<i64> = out.iter().map(|r| r["value"].as_i64().unwrap()).collect();
    assert_eq!(values, vec![3, 2]);
}
