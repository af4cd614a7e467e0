use serde_json::json;
use serde_json::Value;

use crate::EntityRow;
use crate::QueryParams;
use crate::ViewSeed;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Active comment with the given id and content
pub fn comment(
    id: &str,
    content: &str,
) -> Value {
    json!({
        "id": id,
        "content": content,
        "authorName": "Ada",
        "authorEmail": "ada@example.com",
        "postId": "p1",
        "isApproved": true,
        "deletedAt": null,
    })
}

/// Soft-deleted comment with the given id and content
pub fn deleted_comment(
    id: &str,
    content: &str,
) -> Value {
    let mut value = comment(id, content);
    value["deletedAt"] = json!("2024-05-01T10:00:00Z");
    value
}

pub fn row(value: Value) -> EntityRow {
    EntityRow::from_value(value, "id").expect("test row carries an id")
}

/// Seed of `count` active comments `c1..=count`, newest first
pub fn comment_seed(
    count: usize,
    total: u64,
) -> ViewSeed {
    let rows = (1..=count)
        .map(|i| comment(&format!("c{i}"), &format!("comment {i}")))
        .collect();
    ViewSeed::new(rows, total)
}

pub fn comments_query(
    page: u32,
    limit: u32,
) -> QueryParams {
    QueryParams::new("comments").page(page).limit(limit)
}
