use thiserror::Error;

use crate::kind::Kind;
use crate::tags::TagError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unsupported root kind `{kind}` for `{type_name}`: scan roots must be composite values")]
    UnsupportedRootKind {
        type_name: &'static str,
        kind: Kind,
    },

    #[error("inspector: unsupported kind `{kind}` for `{type_name}`")]
    UnsupportedKind {
        type_name: &'static str,
        kind: Kind,
    },

    #[error(
        "nested anonymity is not supported: `{owner}` embeds `{embedded}`, which embeds `{nested}`"
    )]
    NestedAnonymity {
        owner: &'static str,
        embedded: &'static str,
        nested: &'static str,
    },

    #[error("embedded field `{field}` of `{owner}` has kind `{kind}`; only composites can be embedded")]
    EmbeddedNotComposite {
        owner: &'static str,
        field: &'static str,
        kind: Kind,
    },

    #[error(transparent)]
    Tag(#[from] TagError),
}
