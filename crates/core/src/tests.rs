use super::*;

#[test]
fn counter_name_validation() {
    assert_eq!(CounterName::try_new("").unwrap_err(), CounterNameError::Empty);
    assert_eq!(
        CounterName::try_new("   ").unwrap_err(),
        CounterNameError::Empty
    );
    assert_eq!(
        CounterName::try_new("a".repeat(101)).unwrap_err(),
        CounterNameError::TooLong
    );
    assert_eq!(
        CounterName::try_new("bad\u{0007}name").unwrap_err(),
        CounterNameError::ContainsControl
    );
    assert!(CounterName::try_new("a".repeat(100)).is_ok());
    assert!(CounterName::try_new("orders::total").is_ok());
}

#[test]
fn counter_name_length_counts_characters() {
    assert!(CounterName::try_new("计".repeat(100)).is_ok());
    assert_eq!(
        CounterName::try_new("计".repeat(101)).unwrap_err(),
        CounterNameError::TooLong
    );
}

#[test]
fn category_total_counter_name_uses_total_suffix() {
    let category = CategoryId::try_new("orders").expect("category id");
    assert_eq!(category.total_counter_name().as_str(), "orders::total");
}

#[test]
fn longest_category_id_still_yields_a_valid_counter_name() {
    let category = CategoryId::try_new("c".repeat(CATEGORY_ID_MAX_CHARS)).expect("category id");
    let name = category.total_counter_name();
    assert_eq!(name.as_str().chars().count(), COUNTER_NAME_MAX_CHARS);
    assert!(CounterName::try_new(name.into_string()).is_ok());
    assert_eq!(
        CategoryId::try_new("c".repeat(CATEGORY_ID_MAX_CHARS + 1)).unwrap_err(),
        CategoryIdError::TooLong
    );
}

#[test]
fn counter_serde_round_trips_names_as_strings() {
    let counter = Counter {
        id: 7,
        name: CounterName::try_new("orders::total").expect("name"),
        value: 42,
        context: None,
        created_at_ms: 1,
        updated_at_ms: 2,
    };
    let json = serde_json::to_value(&counter).expect("serialize");
    assert_eq!(json["name"], "orders::total");
    assert!(json.get("context").is_none());

    let bad = serde_json::json!({
        "id": 1,
        "name": "",
        "value": 0,
        "created_at_ms": 0,
        "updated_at_ms": 0
    });
    assert!(serde_json::from_value::<Counter>(bad).is_err());
}

#[test]
fn counter_display_shows_name_and_value() {
    let counter = Counter {
        id: 1,
        name: CounterName::try_new("users::total").expect("name"),
        value: 3,
        context: None,
        created_at_ms: 0,
        updated_at_ms: 0,
    };
    assert_eq!(counter.to_string(), "users::total (3)");
}

#[test]
fn static_categories_preserve_order() {
    let categories: StaticCategories = ["b", "a", "c"]
        .into_iter()
        .map(|table| Category::for_table(table).expect("category"))
        .collect();
    let listed = categories.categories().expect("infallible");
    let ids: Vec<_> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
}

#[test]
fn counter_entity_is_a_valid_category_id() {
    let entity = CategoryId::counter_entity();
    assert_eq!(CategoryId::try_new(COUNTER_ENTITY), Ok(entity.clone()));
    assert_eq!(entity.total_counter_name().as_str(), "counters::total");
}
