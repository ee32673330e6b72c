//! Shared fixtures for core integration tests.

#![allow(dead_code)]

use annotatable_core::{Record, Value};
use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "annotatable_core=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// Typed record used across the scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub cost: i64,
    pub price: i64,
    pub discount: Option<f64>,
}

impl Product {
    pub fn new(id: i64, name: &str, category: &str, cost: i64, price: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            category: category.to_string(),
            cost,
            price,
            discount: None,
        }
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }
}

impl Record for Product {
    fn pk(&self) -> Value {
        Value::Int(self.id)
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "category" => Some(self.category.as_str().into()),
            "cost" => Some(self.cost.into()),
            "price" => Some(self.price.into()),
            "discount" => Some(self.discount.into()),
            _ => None,
        }
    }
}

pub fn catalog() -> Vec<Product> {
    vec![
        Product::new(1, "pear", "fruit", 10, 5),
        Product::new(2, "carrot", "vegetable", 9, 3),
        Product::new(3, "apple", "fruit", 4, 4).with_discount(0.5),
        Product::new(4, "leek", "vegetable", 12, 3),
        Product::new(5, "banana", "fruit", 4, 2).with_discount(0.1),
    ]
}

pub fn ids<R: Record>(rows: &[R]) -> Vec<i64> {
    rows.iter().filter_map(|row| row.pk().as_i64()).collect()
}
