//! Wire-format tests driven by JSON intents, the way browser callers build them.

use intentql::compiler::{Category, compile_params};
use intentql::types::QueryIntent;
use intentql::{compile, normalize_intent};
use serde_json::{Value, json};

fn compile_json(value: Value) -> String {
    let intent = QueryIntent::from_json_value(&value).expect("intent should decode");
    compile(&intent)
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn operator_map_versus_nested_relation() {
    assert_eq!(
        compile_json(json!({ "filters": { "name": { "$containsi": "x" } } })),
        "filters[name][$containsi]=x"
    );
    assert_eq!(
        compile_json(json!({ "filters": { "customer": { "name": { "$containsi": "x" } } } })),
        "filters[customer][name][$containsi]=x"
    );
}

#[test]
fn array_operator_values_are_indexed() {
    assert_eq!(
        compile_json(json!({ "filters": { "id": { "$in": [1, 2, 3] } } })),
        "filters[id][$in][0]=1&filters[id][$in][1]=2&filters[id][$in][2]=3"
    );
}

#[test]
fn bare_array_shorthand() {
    assert_eq!(
        compile_json(json!({ "filters": { "id": [1, 2] } })),
        "filters[id][0]=1&filters[id][1]=2"
    );
}

#[test]
fn scalars_stringify_like_the_backend_expects() {
    assert_eq!(
        compile_json(json!({ "filters": { "paid": true, "total": 10.0, "rate": 0.25, "n": -3 } })),
        "filters[paid]=true&filters[total]=10&filters[rate]=0.25&filters[n]=-3"
    );
}

#[test]
fn null_values_contribute_nothing() {
    assert_eq!(
        compile_json(json!({ "filters": { "a": null, "b": { "$eq": null }, "c": 1 } })),
        "filters[c]=1"
    );
}

#[test]
fn unrecognized_operator_beside_recognized_one_is_emitted_verbatim() {
    assert_eq!(
        compile_json(json!({ "filters": { "name": { "$eq": "a", "$regex": "b" } } })),
        "filters[name][$eq]=a&filters[name][$regex]=b"
    );
}

#[test]
fn logical_groups() {
    assert_eq!(
        compile_json(json!({
            "filters": {
                "$and": [
                    { "status": { "$ne": "void" } },
                    { "$or": [{ "total": { "$gt": 100 } }, { "customer": { "vip": true } }] }
                ]
            }
        })),
        "filters[$and][0][status][$ne]=void\
         &filters[$and][1][$or][0][total][$gt]=100\
         &filters[$and][1][$or][1][customer][vip]=true"
    );
}

#[test]
fn non_object_filters_and_populate_are_absent() {
    assert_eq!(compile_json(json!({ "filters": "oops", "populate": 7, "sort": 3 })), "");
}

// =============================================================================
// Populate, sort, pagination and scalar categories
// =============================================================================

#[test]
fn populate_nested_tree() {
    assert_eq!(
        compile_json(json!({
            "populate": {
                "customer": {
                    "populate": { "prices": { "fields": ["amount"] } },
                    "filters": { "active": true }
                }
            }
        })),
        "populate[customer][populate][prices][fields][0]=amount&populate[customer][filters][active]=true"
    );
}

#[test]
fn single_sort_string_is_wrapped() {
    assert_eq!(compile_json(json!({ "sort": "name:asc" })), "sort[0]=name%3Aasc");
    assert_eq!(
        compile_json(json!({ "sort": ["name", "createdAt:desc"] })),
        "sort[0]=name&sort[1]=createdAt%3Adesc"
    );
}

#[test]
fn pagination_partiality() {
    assert_eq!(compile_json(json!({ "pagination": { "page": 2 } })), "pagination[page]=2");
    assert_eq!(compile_json(json!({ "pagination": { "limit": -1 } })), "pagination[limit]=-1");
    assert_eq!(
        compile_json(json!({ "pagination": { "limit": 10, "start": 20 } })),
        "pagination[start]=20&pagination[limit]=10"
    );
}

#[test]
fn empty_scalar_categories_are_skipped() {
    assert_eq!(
        compile_json(json!({ "locale": "", "publicationState": "live", "q": "" })),
        "publicationState=live"
    );
}

#[test]
fn categories_are_grouped_in_fixed_order() {
    let intent = QueryIntent::from_json_value(&json!({
        "q": "acme",
        "publicationState": "preview",
        "locale": "fr",
        "fields": ["name"],
        "pagination": { "page": 1 },
        "sort": ["name"],
        "populate": ["customer"],
        "filters": { "id": 1 }
    }))
    .unwrap();
    let categories: Vec<Category> = compile_params(&intent).iter().map(|p| p.category).collect();
    assert_eq!(categories, Category::ALL.to_vec());
    assert_eq!(
        compile(&intent),
        "filters[id]=1&populate[0]=customer&sort[0]=name&pagination[page]=1&fields[0]=name&locale=fr&publicationState=preview&q=acme"
    );
}

// =============================================================================
// Encoding and determinism
// =============================================================================

#[test]
fn values_are_encoded_exactly_once_and_keys_never() {
    let query = compile_json(json!({ "filters": { "note": { "$contains": "a=b&c%d" } } }));
    assert_eq!(query, "filters[note][$contains]=a%3Db%26c%25d");
    assert!(query.contains('['));
    assert!(!query.contains("%5B") && !query.contains("%255B"));
}

#[test]
fn component_marks_match_browser_encoding() {
    assert_eq!(compile_json(json!({ "populate": true })), "populate=*");
    assert_eq!(
        compile_json(json!({ "filters": { "title": { "$eq": "Don't (panic)!" } } })),
        "filters[title][$eq]=Don't%20(panic)!"
    );
}

#[test]
fn negative_zero_is_plain_zero() {
    assert_eq!(compile_json(json!({ "filters": { "balance": -0.0 } })), "filters[balance]=0");
}

#[test]
fn url_keeps_fragment_after_query() {
    let params = compile_params(&QueryIntent::new().with_search("acme"));
    assert_eq!(
        params.to_url("https://api.test/orders#list").unwrap(),
        "https://api.test/orders?q=acme#list"
    );
}

#[test]
fn unicode_values_are_utf8_percent_encoded() {
    assert_eq!(compile_json(json!({ "q": "Müller" })), "q=M%C3%BCller");
}

#[test]
fn compiling_twice_is_byte_identical() {
    let value = json!({
        "filters": { "type": { "$in": ["sale"] }, "customer": { "name": { "$startsWith": "A" } } },
        "populate": { "customer": true },
        "sort": ["createdAt:desc"],
        "pagination": { "page": 3, "pageSize": 50 }
    });
    assert_eq!(compile_json(value.clone()), compile_json(value));
}

#[test]
fn normalize_then_compile_is_idempotent() {
    let intent = QueryIntent::from_json_value(&json!({
        "filters": {
            "type": { "$in": ["SALE", "bogus", "Transfer"] },
            "createdAt": { "$gte": "2024-01-15", "$lt": "2024-02-01T00:00:00.000Z" },
            "$or": [{ "type": { "$eq": "PURCHASE" } }, { "dueOn": "2024-03-01" }]
        },
        "populate": { "documents": { "filters": { "type": { "$in": ["RETURN"] } } } }
    }))
    .unwrap();
    let once = normalize_intent(&intent);
    let twice = normalize_intent(&once);
    assert_eq!(compile(&twice), compile(&once));
    assert_eq!(
        compile(&once),
        "filters[type][$in][0]=sale&filters[type][$in][1]=transfer\
         &filters[createdAt][$gte]=2024-01-15T00%3A00%3A00.000Z\
         &filters[createdAt][$lt]=2024-02-01T00%3A00%3A00.000Z\
         &filters[$or][0][type][$eq]=purchase\
         &filters[$or][1][dueOn]=2024-03-01T00%3A00%3A00.000Z\
         &populate[documents][filters][type][$in][0]=return"
    );
}
