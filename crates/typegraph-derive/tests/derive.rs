use std::marker::PhantomData;

use pretty_assertions::assert_eq;
use typegraph::{Kind, Reflect, TypeDesc};

#[derive(Reflect)]
struct Address {
    city: String,
    #[reflect(tag = "json:\"zip,omitempty\"")]
    zip: u32,
}

#[derive(Reflect)]
#[reflect(name = "Account")]
struct User {
    #[reflect(rename = "ID")]
    id: u64,
    #[reflect(embed)]
    address: Address,
    #[reflect(skip)]
    #[allow(dead_code)]
    scratch: Vec<*const u8>,
    r#type: String,
}

#[derive(Reflect)]
struct Pair(i32, #[reflect(tag = "pos:\"second\"")] String);

#[derive(Reflect)]
struct Marker;

#[derive(Reflect)]
struct Wrapper<T> {
    inner: T,
    items: Vec<T>,
    _marker: PhantomData<T>,
}

fn field_names(desc: TypeDesc) -> Vec<&'static str> {
    desc.fields().map(|field| field.name()).collect()
}

#[test]
fn named_struct_describes_fields_in_order() {
    let desc = User::type_desc();
    assert_eq!(desc.kind(), Kind::Struct);
    assert_eq!(desc.name(), "Account");
    assert_eq!(field_names(desc), ["ID", "address", "type"]);

    let address = desc.field(1).unwrap();
    assert!(address.is_embedded());
    assert_eq!(address.ty().name(), std::any::type_name::<Address>());
}

#[test]
fn tags_are_carried_verbatim() {
    let zip = Address::type_desc().field(1).unwrap();
    assert_eq!(zip.tag(), "json:\"zip,omitempty\"");
    assert_eq!(Address::type_desc().field(0).unwrap().tag(), "");
}

#[test]
fn field_values_skip_skipped_fields() {
    let user = User {
        id: 7,
        address: Address {
            city: "Oslo".into(),
            zip: 150,
        },
        scratch: Vec::new(),
        r#type: "admin".into(),
    };
    let value = user.as_value();
    assert_eq!(value.field(0).map(|v| v.kind()), Some(Kind::Uint64));
    assert_eq!(value.field(1).map(|v| v.kind()), Some(Kind::Struct));
    assert_eq!(value.field(2).map(|v| v.kind()), Some(Kind::String));
    assert!(value.field(3).is_none());
}

#[test]
fn tuple_and_unit_structs() {
    let desc = Pair::type_desc();
    assert_eq!(field_names(desc), ["0", "1"]);
    assert_eq!(desc.field(1).unwrap().tag(), "pos:\"second\"");

    let pair = Pair(1, "two".into());
    assert_eq!(pair.as_value().field(0).map(|v| v.kind()), Some(Kind::Int32));

    assert_eq!(Marker::type_desc().field_count(), 0);
}

#[test]
fn generic_structs_describe_their_parameters() {
    let desc = <Wrapper<u8>>::type_desc();
    let kinds: Vec<Kind> = desc.fields().map(|field| field.ty().kind()).collect();
    assert_eq!(kinds, [Kind::Uint8, Kind::Slice, Kind::Invalid]);
    assert_ne!(desc, <Wrapper<u16>>::type_desc());
}
