//! Query string codec tests, one per operator token plus composite queries.

use chrono::{NaiveDate, TimeDelta};
use querylink::{
    decode, decode_with, encode, encode_with, Definitions, FilterDefinition, FilterOperator,
    OrderDefinition, QueryKeys, QueryLinkError, Value,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Encodes one filter, checks its decoded query text and decodes it back.
fn assert_filter_roundtrip(filter: FilterDefinition, expected: &str) {
    init_logging();
    let defs = Definitions::from_parts(vec![filter], Vec::new());
    let query = encode(&defs);
    assert_eq!(urlencoding::decode(&query).unwrap(), expected);
    assert_eq!(decode(&query).unwrap(), defs);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_eq_operator() {
    assert_filter_roundtrip(
        FilterDefinition::new("Name", FilterOperator::Eq, "Alice"),
        "filter[]=Name=Alice",
    );
}

#[test]
fn test_neq_operator() {
    assert_filter_roundtrip(
        FilterDefinition::new("Name", FilterOperator::Neq, "Alice"),
        "filter[]=Name!=Alice",
    );
}

#[test]
fn test_ordering_operators() {
    assert_filter_roundtrip(
        FilterDefinition::new("Age", FilterOperator::Gt, 30),
        "filter[]=Age>30",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Age", FilterOperator::Gte, 30),
        "filter[]=Age>=30",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Age", FilterOperator::Lt, 30),
        "filter[]=Age<30",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Age", FilterOperator::Lte, 30),
        "filter[]=Age<=30",
    );
}

#[test]
fn test_has_operators() {
    assert_filter_roundtrip(
        FilterDefinition::new("Tags", FilterOperator::Has, "tag1"),
        "filter[]=Tags=*tag1",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Tags", FilterOperator::Nhas, "tag1"),
        "filter[]=Tags!*tag1",
    );
}

#[test]
fn test_set_operators() {
    assert_filter_roundtrip(
        FilterDefinition::new("Age", FilterOperator::In, [20, 30, 40]),
        "filter[]=Age[][20,30,40]",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Age", FilterOperator::Nin, [20, 30, 40]),
        "filter[]=Age![][20,30,40]",
    );
}

#[test]
fn test_prefix_and_suffix_operators() {
    assert_filter_roundtrip(
        FilterDefinition::new("Name", FilterOperator::Sw, "Alice"),
        "filter[]=Name^Alice",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Name", FilterOperator::Nsw, "Alice"),
        "filter[]=Name!^Alice",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Name", FilterOperator::Ew, "Alice"),
        "filter[]=Name$Alice",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Name", FilterOperator::New, "Alice"),
        "filter[]=Name!$Alice",
    );
}

// ============================================================================
// Typed values
// ============================================================================

#[test]
fn test_typed_values_roundtrip() {
    let id = uuid::Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
    assert_filter_roundtrip(
        FilterDefinition::new("Id", FilterOperator::Eq, id),
        "filter[]=Id=12345678-9abc-def0-1234-56789abcdef0",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Score", FilterOperator::Gte, 2.5),
        "filter[]=Score>=2.5",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Active", FilterOperator::Eq, true),
        "filter[]=Active=true",
    );
    assert_filter_roundtrip(
        FilterDefinition::new("Elapsed", FilterOperator::Lt, TimeDelta::hours(26)),
        "filter[]=Elapsed<1.02:00:00",
    );
}

#[test]
fn test_timestamp_value_roundtrip() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let defs = Definitions::new().gt("Date", date);
    let decoded = decode(&encode(&defs)).unwrap();
    assert_eq!(decoded, defs);
}

#[test]
fn test_array_with_commas_roundtrip() {
    assert_filter_roundtrip(
        FilterDefinition::new("Name", FilterOperator::In, ["test1", "test,with,comma"]),
        r"filter[]=Name[][test1,test\,with\,comma]",
    );
}

// ============================================================================
// Composite queries
// ============================================================================

#[test]
fn test_multiple_filters_and_orders() {
    let defs = Definitions::new()
        .eq("Name", "Alice")
        .gt("Age", 30)
        .order_asc("Date")
        .order_desc("Name");

    let query = encode(&defs);
    assert_eq!(
        urlencoding::decode(&query).unwrap(),
        "filter[]=Name=Alice&filter[]=Age>30&order=Date,-Name"
    );
    assert_eq!(decode(&query).unwrap(), defs);
}

#[test]
fn test_empty_definitions() {
    let defs = Definitions::new();
    assert_eq!(encode(&defs), "");
    assert_eq!(decode("").unwrap(), defs);
}

#[test]
fn test_orders_without_filters() {
    let defs = Definitions::from_parts(
        Vec::new(),
        vec![OrderDefinition::desc("Date"), OrderDefinition::asc("Id")],
    );
    assert_eq!(encode(&defs), "order=-Date,Id");
    assert_eq!(decode("order=-Date,Id").unwrap(), defs);
}

#[test]
fn test_decode_accepts_raw_and_prefixed_queries() {
    let defs = decode("?filter[]=Age>=30&page=2&order=-Date").unwrap();
    assert_eq!(defs.filters().len(), 1);
    assert_eq!(defs.filters()[0].operator(), FilterOperator::Gte);
    assert_eq!(defs.filters()[0].value(), &Value::Integer(30));
    assert_eq!(defs.orders(), &[OrderDefinition::desc("Date")]);
}

#[test]
fn test_decode_plus_as_space() {
    let defs = decode("filter[]=Name%3DAlice+Smith&order=+Name").unwrap();
    assert_eq!(defs.filters()[0].value(), &Value::from("Alice Smith"));
    assert_eq!(defs.orders(), &[OrderDefinition::asc("Name")]);
}

#[test]
fn test_custom_keys() {
    let keys = QueryKeys::new("f", "sort");
    let defs = Definitions::new().eq("Id", 1).order_asc("Id");

    let query = encode_with(&defs, &keys);
    assert_eq!(query, "f[]=Id%3D1&sort=Id");
    assert_eq!(decode_with(&query, &keys).unwrap(), defs);

    // Default keys ignore the custom parameters.
    assert!(decode(&query).unwrap().is_empty());
}

#[test]
fn test_malformed_filters() {
    let err = decode("filter[]=NoOperator").unwrap_err();
    assert!(matches!(err, QueryLinkError::MalformedFilter { .. }));

    let err = decode("filter[]=%3D5").unwrap_err();
    assert!(matches!(
        err,
        QueryLinkError::MalformedFilter { reason: "empty field name", .. }
    ));
}

// ============================================================================
// Serde
// ============================================================================

#[cfg(feature = "serde")]
mod serde_support {
    use super::*;

    #[test]
    fn test_definitions_json_roundtrip() {
        let defs = Definitions::new()
            .is_in("Id", [1, 2])
            .lt("Elapsed", TimeDelta::minutes(90))
            .order_desc("Date");

        let json = serde_json::to_string(&defs).unwrap();
        let back: Definitions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, defs);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let defs: Definitions = serde_json::from_str("{}").unwrap();
        assert!(defs.is_empty());
    }
}
