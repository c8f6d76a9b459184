use std::sync::Arc;

use typegraph::{Reflect, Scanner, TypeGraphCache};

#[derive(Reflect)]
struct Node {
    val: i64,
    next: Option<Box<Node>>,
    children: Vec<Node>,
}

fn main() {
    let cache = Arc::new(TypeGraphCache::new());
    let scanner = Scanner::builder().cache(cache.clone()).trace(false).build();
    let node = Node {
        val: 1,
        next: None,
        children: Vec::new(),
    };
    let model = scanner.scan_one(&node).unwrap();
    assert_eq!(model.fields().len(), 3);
    assert_eq!(cache.len(), 1);
}
