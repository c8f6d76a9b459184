mod runtime {
    pub use typegraph::*;
}

#[derive(runtime::Reflect)]
#[reflect(crate = "runtime")]
struct Point {
    x: f64,
    y: f64,
}

fn main() {
    use runtime::Reflect;
    assert_eq!(Point::type_desc().field_count(), 2);
    let point = Point { x: 1.0, y: 2.0 };
    assert!(point.as_value().field(1).is_some());
}
