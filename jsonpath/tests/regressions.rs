use serde_json::json;
use jsonpath::JsonPath;
#[cfg(feature = "trace")]
use test_log::test;

#[test]
fn filter_parenthesized_comparison_on_missing_member() {
    let value = json!({"a": 1, "b": 2});
    let path = JsonPath::parse("$[?(@.a == 2)]").expect("parses JSONPath");
    assert!(path.query(&value).expect("evaluates").is_empty());
}
