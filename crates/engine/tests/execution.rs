use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use engine::{
    registry::{
        resolvers::{Resolver, ResolverContext},
        MetaField, MetaInputValue, ObjectType, Registry, RegistryError, TypeRef,
    },
    Error, Request, Schema, Variables,
};
use serde_json::{json, Value};

/// Shared state observed by the test resolvers.
#[derive(Default, Clone)]
struct Observed {
    fetches: Arc<AtomicUsize>,
    recorded: Arc<Mutex<Vec<String>>>,
}

fn item(label: &str) -> Value {
    json!({"id": label.to_lowercase(), "label": label})
}

fn build_registry(observed: &Observed) -> Result<Registry, RegistryError> {
    let mut builder = Registry::builder();
    let item_id = builder.declare("Item")?;
    let owner = builder.declare("Owner")?;
    let query = builder.declare("Query")?;
    let mutation = builder.declare("Mutation")?;

    let string = builder.named("String")?;
    let items = |observed: &Observed| {
        let fetches = observed.fetches.clone();
        Resolver::custom(move |_: ResolverContext| {
            let fetches = fetches.clone();
            async move {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(json!([item("A"), item("B"), item("C")]))
            }
        })
    };

    builder.define(
        item_id,
        ObjectType::new("Item")
            .with_field(MetaField::new("id", builder.named("ID")?.non_null()))
            .with_field(
                MetaField::new("label", string.clone().non_null()).with_resolver(Resolver::custom(
                    |ctx: ResolverContext| async move {
                        let label: String = ctx.parent_field("label")?;
                        if label == "B" {
                            return Err(Error::new("B is unavailable"));
                        }
                        Ok(json!(label))
                    },
                )),
            )
            .with_field(MetaField::new("note", string.clone())),
    )?;

    builder.define(
        owner,
        ObjectType::new("Owner")
            .with_field(MetaField::new("name", string.clone()))
            .with_field(MetaField::new("item", TypeRef::named(item_id).non_null())),
    )?;

    let recorded = observed.recorded.clone();
    builder.define(
        query,
        ObjectType::new("Query")
            .with_field(MetaField::new("items", TypeRef::named(item_id).list()).with_resolver(items(observed)))
            .with_field(
                MetaField::new("strictItems", TypeRef::named(item_id).non_null().list()).with_resolver(items(observed)),
            )
            .with_field(
                MetaField::new("owner", TypeRef::named(owner)).with_resolver(Resolver::custom(
                    |_: ResolverContext| async { Ok::<_, Error>(json!({"name": "Ann", "item": item("B")})) },
                )),
            )
            .with_field(
                MetaField::new("requiredItem", TypeRef::named(item_id).non_null()).with_resolver(Resolver::custom(
                    |_: ResolverContext| async { Ok::<_, Error>(item("B")) },
                )),
            )
            .with_field(
                MetaField::new("echo", string.clone())
                    .with_arg(MetaInputValue::new("value", builder.named("Int")?.non_null()))
                    .with_resolver(Resolver::custom(|ctx: ResolverContext| async move {
                        let value: i64 = ctx.arg("value")?;
                        Ok::<_, Error>(json!(value.to_string()))
                    })),
            )
            .with_field(
                MetaField::new("slow", string.clone()).with_resolver(Resolver::custom(|_: ResolverContext| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, Error>(json!("done"))
                })),
            )
            .with_field(MetaField::new("broken", string.clone()).with_resolver(Resolver::custom(broken))),
    )?;

    builder.define(
        mutation,
        ObjectType::new("Mutation")
            .with_field(
                MetaField::new("record", string.clone().non_null())
                    .with_arg(MetaInputValue::new("value", string.clone().non_null()))
                    .with_resolver(Resolver::custom(move |ctx: ResolverContext| {
                        let recorded = recorded.clone();
                        async move {
                            let value: String = ctx.arg("value")?;
                            recorded.lock().map_err(|_| Error::new("poisoned"))?.push(value.clone());
                            Ok::<_, Error>(json!(value))
                        }
                    })),
            )
            .with_field(
                MetaField::new("fail", string.non_null()).with_resolver(Resolver::custom(|_: ResolverContext| async {
                    Err::<Value, _>(Error::new("mutation failed"))
                })),
            ),
    )?;

    builder.set_query_type(query);
    builder.set_mutation_type(mutation);
    builder.finish()
}

#[allow(clippy::panic)]
async fn broken(_: ResolverContext) -> Result<Value, Error> {
    panic!("resolver bug")
}

fn schema(observed: &Observed) -> Schema {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Schema::build(build_registry(observed).unwrap()).limit_depth(5).finish()
}

#[tokio::test]
async fn failed_list_item_keeps_its_slot() {
    let response = schema(&Observed::default()).execute("{ items { label } }").await;

    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": {
        "items": [
          {
            "label": "A"
          },
          null,
          {
            "label": "C"
          }
        ]
      },
      "errors": [
        {
          "message": "B is unavailable",
          "locations": [
            {
              "line": 1,
              "column": 11
            }
          ],
          "path": [
            "items",
            1,
            "label"
          ]
        }
      ]
    }
    "###);
}

#[tokio::test]
async fn non_null_items_null_the_whole_list() {
    let response = schema(&Observed::default()).execute("{ strictItems { id label } }").await;

    assert_eq!(response.to_json()["data"], json!({"strictItems": null}));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "B is unavailable");
}

#[tokio::test]
async fn null_bubbles_to_the_nearest_nullable_ancestor() {
    let response = schema(&Observed::default())
        .execute("{ owner { name item { label } } items { id } }")
        .await;

    assert_eq!(
        response.to_json()["data"],
        json!({"owner": null, "items": [{"id": "a"}, {"id": "b"}, {"id": "c"}]})
    );
    let paths = response
        .errors
        .iter()
        .map(|error| serde_json::to_value(&error.path).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(paths, vec![json!(["owner", "item", "label"])]);
}

#[tokio::test]
async fn sibling_failures_are_reported_in_the_order_they_happen() {
    let response = schema(&Observed::default())
        .execute("{ owner { first: item { label } second: item { label } } }")
        .await;

    assert_eq!(response.to_json()["data"], json!({"owner": null}));
    let paths = response
        .errors
        .iter()
        .map(|error| serde_json::to_value(&error.path).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![json!(["owner", "first", "label"]), json!(["owner", "second", "label"])]
    );
}

#[tokio::test]
async fn errors_recorded_before_a_root_failure_stay_first() {
    let response = schema(&Observed::default())
        .execute("{ items { label } requiredItem { label } }")
        .await;

    assert_eq!(response.to_json()["data"], Value::Null);
    let paths = response
        .errors
        .iter()
        .map(|error| serde_json::to_value(&error.path).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(paths, vec![json!(["items", 1, "label"]), json!(["requiredItem", "label"])]);
}

#[tokio::test]
async fn failing_non_null_root_field_nulls_data() {
    let response = schema(&Observed::default())
        .execute("{ items { id } requiredItem { label } }")
        .await;

    assert_eq!(response.to_json()["data"], Value::Null);
    assert!(response.data.is_some());
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "B is unavailable");
}

#[tokio::test]
async fn aliases_merges_and_typename() {
    let query = r#"
        {
            first: items { id }
            first: items { __typename }
            echo(value: 4)
            ... on Query { again: echo(value: 5) }
            __typename
        }
    "#;
    let response = schema(&Observed::default()).execute(query).await;

    assert!(response.is_ok(), "{:?}", response.errors);
    insta::assert_json_snapshot!(response.to_json(), @r###"
    {
      "data": {
        "first": [
          {
            "id": "a",
            "__typename": "Item"
          },
          {
            "id": "b",
            "__typename": "Item"
          },
          {
            "id": "c",
            "__typename": "Item"
          }
        ],
        "echo": "4",
        "again": "5",
        "__typename": "Query"
      }
    }
    "###);
}

#[tokio::test]
async fn skip_and_include_use_variables() {
    let request = Request::new("query ($hide: Boolean!) { items { id @skip(if: $hide) note @include(if: $hide) } }")
        .variables(Variables::from_json(json!({"hide": true})));
    let response = schema(&Observed::default()).execute(request).await;

    assert_eq!(
        response.to_json(),
        json!({"data": {"items": [{"note": null}, {"note": null}, {"note": null}]}})
    );
}

#[tokio::test]
async fn too_deep_queries_never_reach_resolvers() {
    let observed = Observed::default();
    let query = "{ owner { item { id } } items { id } a: items { b: id } }";
    assert!(schema(&observed).execute(query).await.data.is_some());
    assert_eq!(observed.fetches.load(Ordering::SeqCst), 2);

    let observed = Observed::default();
    let schema = Schema::build(build_registry(&observed).unwrap()).limit_depth(1).finish();
    let response = schema.execute("{ items { id } owner { item { id } } }").await;

    assert_eq!(response.data, None);
    assert_eq!(
        response.errors.iter().map(|error| error.message.as_str()).collect::<Vec<_>>(),
        vec![r#"Field "owner.item.id" exceeds the maximum query depth of 1."#]
    );
    assert_eq!(observed.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn validation_errors_come_without_data() {
    let response = schema(&Observed::default()).execute("{ items { nope } }").await;

    assert_eq!(
        response.to_json(),
        json!({
            "errors": [{
                "message": r#"Unknown field "nope" on type "Item"."#,
                "locations": [{"line": 1, "column": 11}]
            }]
        })
    );
}

#[tokio::test]
async fn syntax_errors_come_without_data() {
    let response = schema(&Observed::default()).execute("{ items { id }").await;

    assert_eq!(response.data, None);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].code, engine::ErrorCode::OperationParsingError);
}

#[tokio::test]
async fn invalid_arguments_fail_the_whole_request() {
    let observed = Observed::default();
    let response = schema(&observed).execute(r#"{ items { id } echo(value: "four") }"#).await;

    assert_eq!(response.data, None);
    assert_eq!(
        response.errors[0].message,
        r#"Invalid value for argument "value", Expected input type "Int", found "four"."#
    );
    assert_eq!(observed.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_variables_fail_the_whole_request() {
    let response = schema(&Observed::default())
        .execute("query ($v: Int!) { echo(value: $v) }")
        .await;

    assert_eq!(
        response.to_json(),
        json!({"errors": [{"message": r#"Variable "$v" of required type "Int!" was not provided."#}]})
    );
}

#[tokio::test]
async fn operation_selection() {
    let schema = schema(&Observed::default());
    let query = "query A { echo(value: 1) } query B { echo(value: 2) }";

    let response = schema.execute(Request::new(query).operation_name("B")).await;
    assert_eq!(response.to_json(), json!({"data": {"echo": "2"}}));

    let response = schema.execute(query).await;
    assert_eq!(response.errors[0].message, "Operation name required in request.");

    let response = schema.execute(Request::new(query).operation_name("C")).await;
    assert_eq!(response.errors[0].message, r#"Unknown operation named "C""#);
}

#[tokio::test]
async fn mutations_run_one_after_the_other_and_stop_at_the_first_failure() {
    let observed = Observed::default();
    let response = schema(&observed)
        .execute(r#"mutation { a: record(value: "1") b: record(value: "2") fail c: record(value: "3") }"#)
        .await;

    assert_eq!(response.to_json()["data"], Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "mutation failed");
    assert_eq!(*observed.recorded.lock().unwrap(), vec!["1".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn subscriptions_are_rejected() {
    let response = schema(&Observed::default()).execute("subscription { echo(value: 1) }").await;

    assert_eq!(response.data, None);
    assert_eq!(response.errors[0].message, "Schema is not configured for subscriptions.");
}

#[tokio::test]
async fn timeouts_are_reported() {
    let schema = Schema::build(build_registry(&Observed::default()).unwrap())
        .timeout(Duration::from_millis(50))
        .finish();
    let response = schema.execute("{ slow }").await;

    assert_eq!(response.to_json(), json!({"errors": [{"message": "Request timed out"}]}));
}

#[tokio::test]
async fn panics_become_an_internal_error() {
    let response = schema(&Observed::default()).execute("{ items { id } broken }").await;

    assert_eq!(response.to_json(), json!({"errors": [{"message": "Internal server error"}]}));
}
