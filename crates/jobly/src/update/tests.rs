use super::*;
use serde_json::json;

#[test]
fn builds_set_clause_in_field_order() {
    let fields = FieldUpdate::new()
        .with("title", "New")
        .with("salary", 5)
        .with("equity", 0.7);

    let update = sql_for_partial_update(&fields, &FieldNameMap::new()).unwrap();

    assert_eq!(update.set_cols, "title = $1, salary = $2, equity = $3");
    assert_eq!(
        update.values,
        vec![
            FieldValue::from("New"),
            FieldValue::Int(5),
            FieldValue::Float(0.7)
        ]
    );
    assert_eq!(update.next_param_index(), 4);
}

#[test]
fn empty_update_is_bad_request() {
    let err = sql_for_partial_update(&FieldUpdate::new(), &FieldNameMap::new()).unwrap_err();
    assert!(err.is_bad_request());

    let map = FieldNameMap::new().map("companyHandle", "company_handle");
    let err = sql_for_partial_update(&FieldUpdate::new(), &map).unwrap_err();
    assert!(err.is_bad_request());
}

#[test]
fn mapped_names_replace_field_names() {
    let fields = FieldUpdate::new().with("companyHandle", "c2");
    let map = FieldNameMap::new().map("companyHandle", "company_handle");

    let update = sql_for_partial_update(&fields, &map).unwrap();
    assert_eq!(update.set_cols, "company_handle = $1");
    assert_eq!(update.values, vec![FieldValue::from("c2")]);
}

#[test]
fn unmapped_names_pass_through() {
    let fields = FieldUpdate::new()
        .with("name", "C1-new")
        .with("numEmployees", 12)
        .with("description", "Desc");
    let map = FieldNameMap::new()
        .map("numEmployees", "num_employees")
        .map("logoUrl", "logo_url");

    let update = sql_for_partial_update(&fields, &map).unwrap();
    assert_eq!(
        update.set_cols,
        "name = $1, num_employees = $2, description = $3"
    );
}

#[test]
fn placeholder_count_matches_values() {
    for n in 1..=8 {
        let fields: FieldUpdate = (0..n).map(|i| (format!("col{i}"), i)).collect();
        let update = sql_for_partial_update(&fields, &FieldNameMap::new()).unwrap();

        assert_eq!(update.values.len(), n as usize);
        assert_eq!(update.set_cols.matches(" = $").count(), n as usize);
        for i in 0..n {
            assert!(update.set_cols.contains(&format!("col{i} = ${}", i + 1)));
        }
    }
}

#[test]
fn null_values_are_bound_not_inlined() {
    let fields = FieldUpdate::new().with("logoUrl", None::<String>);
    let map = FieldNameMap::new().map("logoUrl", "logo_url");

    let update = sql_for_partial_update(&fields, &map).unwrap();
    assert_eq!(update.set_cols, "logo_url = $1");
    assert_eq!(update.values, vec![FieldValue::Null]);
}

#[test]
fn setting_a_field_twice_keeps_first_position() {
    let mut fields = FieldUpdate::new();
    fields.set("title", "a").set("salary", 1).set("title", "b");

    let update = sql_for_partial_update(&fields, &FieldNameMap::new()).unwrap();
    assert_eq!(update.set_cols, "title = $1, salary = $2");
    assert_eq!(update.values[0], FieldValue::from("b"));
}

#[test]
fn unsafe_field_names_are_rejected() {
    let fields = FieldUpdate::new().with("title = title; DROP TABLE jobs; --", "x");
    let err = sql_for_partial_update(&fields, &FieldNameMap::new()).unwrap_err();
    assert!(err.is_bad_request());
}

#[test]
fn builds_from_json_object() {
    let fields = FieldUpdate::from_json(&json!({"salary": 93000})).unwrap();
    assert_eq!(fields.get("salary"), Some(&FieldValue::Int(93000)));
    assert_eq!(fields.len(), 1);

    assert!(FieldUpdate::from_json(&json!({})).unwrap().is_empty());
    assert!(FieldUpdate::from_json(&json!(["salary"])).unwrap_err().is_bad_request());
    assert!(FieldUpdate::from_json(&json!({"salary": [1]})).is_err());
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PostingField {
    Title,
    Salary,
    Equity,
}

impl ColumnSet for PostingField {
    const RESOURCE: &'static str = "posting";
    const ALL: &'static [Self] = &[Self::Title, Self::Salary, Self::Equity];

    fn field_name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Salary => "salary",
            Self::Equity => "equity",
        }
    }

    fn column(self) -> &'static str {
        self.field_name()
    }

    fn kind(self) -> ValueKind {
        match self {
            Self::Title => ValueKind::Text,
            Self::Salary => ValueKind::Integer,
            Self::Equity => ValueKind::Decimal,
        }
    }

    fn nullable(self) -> bool {
        self != Self::Title
    }
}

#[test]
fn check_update_converts_json_body_to_column_kinds() {
    let body = json!({"title": "New", "salary": 5, "equity": "0.7"});
    let checked = PostingField::check_update(&FieldUpdate::from_json(&body).unwrap()).unwrap();

    let update = sql_for_partial_update(&checked, &PostingField::name_map()).unwrap();
    assert_eq!(update.set_cols, "title = $1, salary = $2, equity = $3");
    assert_eq!(
        update.values,
        vec![
            FieldValue::from("New"),
            FieldValue::Int(5),
            FieldValue::Decimal("0.7".parse().unwrap()),
        ]
    );
}

#[test]
fn check_update_rejects_wrong_kinds_and_required_nulls() {
    for body in [
        json!({"salary": "not-a-salary"}),
        json!({"salary": 0.758}),
        json!({"equity": "lots"}),
        json!({"equity": true}),
        json!({"title": 3}),
        json!({"title": null}),
        json!({"bonus": 1}),
    ] {
        let fields = FieldUpdate::from_json(&body).unwrap();
        let err = PostingField::check_update(&fields).unwrap_err();
        assert!(err.is_bad_request(), "{body} gave {err:?}");
    }

    let fields = FieldUpdate::from_json(&json!({"salary": null})).unwrap();
    let checked = PostingField::check_update(&fields).unwrap();
    assert!(checked.get("salary").unwrap().is_null());
}
