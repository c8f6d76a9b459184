use std::collections::HashMap;

use typegraph::{Kind, Reflect};

#[derive(Reflect)]
struct Page<T, const N: usize> {
    items: [T; N],
    index: HashMap<String, T>,
}

fn main() {
    let desc = <Page<u8, 4>>::type_desc();
    let kinds: Vec<Kind> = desc.fields().map(|field| field.ty().kind()).collect();
    assert_eq!(kinds, [Kind::Array, Kind::Map]);
}
