mod support;

use annotatable_core::prelude::*;
use anyhow::Result;
use support::{Product, catalog, ids, init_tracing};

fn ratio() -> Annotation<Row<Product>> {
    Annotation::func(|row: &Row<Product>| row.cost as f64 / row.price as f64)
}

#[tokio::test]
async fn callable_annotation_matches_key_function() -> Result<()> {
    init_tracing();
    let collection = MemoryCollection::new(vec![
        DynamicRecord::new("id").with("id", 1).with("cost", 10).with("price", 5),
        DynamicRecord::new("id").with("id", 2).with("cost", 9).with("price", 3),
    ]);

    let ratio = Annotation::try_func(|row: &Row<DynamicRecord>| {
        Ok(Value::from(
            row.get_as::<f64>("cost")? / row.get_as::<f64>("price")?,
        ))
    });
    let annotated = collection.annotate_property(ratio, Some("ratio")).await?;

    let rows = annotated.materialize().await?;
    assert_eq!(rows[0].get_as::<f64>("ratio")?, 2.0);
    assert_eq!(rows[1].get_as::<f64>("ratio")?, 3.0);
    Ok(())
}

#[tokio::test]
async fn every_record_gets_its_own_value() -> Result<()> {
    init_tracing();
    let collection = MemoryCollection::new(catalog());

    let annotated = collection.annotate_property(ratio(), Some("ratio")).await?;
    for row in annotated.materialize().await? {
        let expected = row.cost as f64 / row.price as f64;
        assert_eq!(row.get("ratio"), Some(Value::from(expected)));
    }
    Ok(())
}

#[tokio::test]
async fn attribute_annotation_uses_default_name() -> Result<()> {
    init_tracing();
    let collection = MemoryCollection::new(catalog());

    let annotated = collection.annotate_property("name", None).await?;
    let rows = annotated.materialize().await?;
    assert_eq!(rows[0].get("name_property"), Some(Value::from("pear")));
    Ok(())
}

#[tokio::test]
async fn suffix_follows_config() -> Result<()> {
    init_tracing();
    let config = AnnotateConfig::from_toml_str("property_suffix = \"_copy\"")?;
    let collection = MemoryCollection::new(catalog());

    let annotated = Annotator::new(config)
        .annotate_property(&collection, "category", None)
        .await?;
    let rows = annotated.materialize().await?;
    assert_eq!(rows[1].get("category_copy"), Some(Value::from("vegetable")));
    Ok(())
}

#[tokio::test]
async fn callable_without_name_fails_before_materializing() {
    init_tracing();
    let collection = MemoryCollection::new(catalog());

    let result = collection.annotate_property(ratio(), None).await;
    assert!(matches!(result, Err(AnnotateError::MissingPropertyName)));
}

#[tokio::test]
async fn annotation_is_filterable() -> Result<()> {
    init_tracing();
    let collection = MemoryCollection::new(catalog());

    let annotated = collection.annotate_property(ratio(), Some("ratio")).await?;
    let cheap = annotated.filter(Predicate::gte("ratio", 2.0))?;
    assert_eq!(ids(&cheap.materialize().await?), vec![1, 2, 4, 5]);

    let exact = annotated.filter(Predicate::eq("ratio", 1))?;
    assert_eq!(ids(&exact.materialize().await?), vec![3]);
    Ok(())
}

#[tokio::test]
async fn annotate_then_sort_by_annotation() -> Result<()> {
    init_tracing();
    let collection = MemoryCollection::new(catalog());

    let sorted = collection
        .annotate_property(ratio(), Some("ratio"))
        .await?
        .sort("ratio", true)
        .await?;
    assert_eq!(ids(&sorted.materialize().await?), vec![4, 2, 1, 5, 3]);
    Ok(())
}

#[tokio::test]
async fn reannotating_replaces_field() -> Result<()> {
    init_tracing();
    let collection = MemoryCollection::new(catalog());

    let annotated = collection
        .annotate_property("name", Some("label"))
        .await?
        .annotate_property("category", Some("label"))
        .await?;
    assert_eq!(annotated.computed_fields().count(), 1);
    let rows = annotated.materialize().await?;
    assert_eq!(rows[0].get("label"), Some(Value::from("fruit")));
    Ok(())
}

#[tokio::test]
async fn tuple_values_cannot_be_annotated() {
    init_tracing();
    let collection = MemoryCollection::new(catalog());

    let pair = Annotation::func(|row: &Row<Product>| (row.name.clone(), row.cost));
    match collection.annotate_property(pair, Some("pair")).await {
        Err(AnnotateError::UnrepresentableValue { field, pk }) => {
            assert_eq!(field, "pair");
            assert_eq!(pk, Value::Int(1));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn store_annotates_all_records() -> Result<()> {
    init_tracing();
    let store = MemoryStore::new(catalog());

    let rows = store
        .annotate_property("discount", Some("rebate"))
        .await?
        .filter(Predicate::is_null("rebate", false))?
        .materialize()
        .await?;
    assert_eq!(ids(&rows), vec![3, 5]);
    Ok(())
}
