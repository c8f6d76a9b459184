use proptest::prelude::*;
use typegraph::{Tag, Tags};

fn tag_strategy() -> impl Strategy<Value = Tag> {
    (
        "[a-z][a-z0-9_]{0,8}",
        "[ -~]{0,12}",
        prop::collection::vec("[a-z]{1,6}", 0..3),
    )
        .prop_filter("commas would re-split the name", |(_, name, _)| !name.contains(','))
        .prop_map(|(key, name, options)| Tag::new(key, name).with_options(options))
}

proptest! {
    #[test]
    fn parse_never_panics(raw in "\\PC{0,40}") {
        let _ = Tags::parse(&raw);
    }

    #[test]
    fn display_parses_back(tags in prop::collection::vec(tag_strategy(), 0..4)) {
        let mut expected = Tags::default();
        for tag in tags {
            expected.set(tag).unwrap();
        }
        let reparsed = Tags::parse(&expected.to_string()).unwrap();
        prop_assert_eq!(reparsed, expected);
    }
}
