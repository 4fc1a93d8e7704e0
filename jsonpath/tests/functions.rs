use jsonpath_core::environment::Environment;
use jsonpath_core::spec::functions::{JsonPathType, JsonPathTypeKind};
use serde_json::json;
#[cfg(feature = "trace")]
use test_log::test;

fn first<'a>(mut args: Vec<JsonPathType<'a>>) -> JsonPathType<'a> {
    let JsonPathType::Nodes(nodes) = args.remove(0) else {
        return JsonPathType::Nothing;
    };
    match nodes.first() {
        Some(node) => JsonPathType::Node(node.value()),
        None => JsonPathType::Nothing,
    }
}

#[test]
fn first_function() {
    let value = json!([
        {
            "books": [
                {
                    "author": "Alexandre Dumas",
                    "title": "The Three Musketeers"
                },
                {
                    "author": "William Schirer",
                    "title": "The Rise and Fall of the Third Reich"
                }
            ]
        },
        {
            "books": [
                {
                    "author": "Charles Dickens",
                    "title": "Great Expectations"
                },
                {
                    "author": "Fyodor Dostoevsky",
                    "title": "The Brothers Karamazov"
                }
            ]
        }
    ]);

    let mut env = Environment::new();
    env.register_function(
        "first",
        vec![JsonPathTypeKind::Nodelist],
        JsonPathTypeKind::Value,
        first,
    );

    let (_, query) =
        jsonpath::parse_raw("$[?first(@.books.*.author) == 'Alexandre Dumas']").unwrap();
    let compiled = env.compile(query).unwrap();
    let node = compiled.find(&value).unwrap().exactly_one().unwrap();
    println!("{node:#?}");
    assert_eq!(
        "The Rise and Fall of the Third Reich",
        node.value().pointer("/books/1/title").unwrap().as_str().unwrap(),
    );
}
