//! Reference resolution tests.

mod common;
use common::{compile, member};

use weave_core::{ChainPosition, Error, LayerIndex, ReferenceOrder, Semantic, Span};
use weave_semantic::ReferenceResolver;

const CHAIN: &str = r#"
    layers { Logging, Cache.Read, Cache, Audit }
    class A {
        int Foo() { return 0; }
        [override Logging] int Foo() { return base.Foo(); }
        [override Cache.Read] int Foo() { return base.Foo(); }
        [override Cache] int Foo() { return base.Foo(); }

        int Bar() { return 1; }
        [override Audit] int Bar() { return base.Bar(); }
    }
"#;

fn layer(index: u32) -> ChainPosition {
    ChainPosition::Layer(LayerIndex::new(index))
}

fn resolve(from: ChainPosition, target: &str, order: ReferenceOrder) -> Result<ChainPosition, Error> {
    let compilation = compile(CHAIN);
    let foo = member(&compilation, "Foo");
    let target = member(&compilation, target);
    ReferenceResolver::new(&compilation).resolve(
        Semantic::new(foo, from),
        target,
        order,
        Span::default(),
    )
}

#[test]
fn test_previous_is_immediately_preceding_version() {
    assert_eq!(resolve(layer(2), "Foo", ReferenceOrder::Previous).unwrap(), layer(1));
    assert_eq!(resolve(layer(1), "Foo", ReferenceOrder::Previous).unwrap(), layer(0));
    assert_eq!(
        resolve(layer(0), "Foo", ReferenceOrder::Previous).unwrap(),
        ChainPosition::Original
    );
}

#[test]
fn test_base_skips_versions_of_the_same_aspect() {
    // Cache and Cache.Read belong to the same aspect
    assert_eq!(resolve(layer(2), "Foo", ReferenceOrder::Base).unwrap(), layer(0));
    assert_eq!(resolve(layer(1), "Foo", ReferenceOrder::Base).unwrap(), layer(0));
    assert_eq!(
        resolve(layer(0), "Foo", ReferenceOrder::Base).unwrap(),
        ChainPosition::Original
    );
}

#[test]
fn test_current_and_final() {
    assert_eq!(resolve(layer(1), "Foo", ReferenceOrder::Current).unwrap(), layer(1));
    assert_eq!(
        resolve(layer(1), "Foo", ReferenceOrder::Final).unwrap(),
        ChainPosition::Final
    );
}

#[test]
fn test_last_version_is_normalised_to_final() {
    assert_eq!(
        resolve(layer(2), "Foo", ReferenceOrder::Current).unwrap(),
        ChainPosition::Final
    );
    // Bar's only override comes after every Foo layer
    assert_eq!(
        resolve(layer(2), "Bar", ReferenceOrder::Current).unwrap(),
        ChainPosition::Original
    );
}

#[test]
fn test_final_containing_body_uses_real_position() {
    assert_eq!(
        resolve(ChainPosition::Final, "Foo", ReferenceOrder::Previous).unwrap(),
        layer(1)
    );
}

#[test]
fn test_missing_version_is_a_resolution_error() {
    let err = resolve(ChainPosition::Original, "Foo", ReferenceOrder::Base).unwrap_err();
    assert!(matches!(err, Error::Resolution(..)));

    let err = resolve(ChainPosition::Original, "Foo", ReferenceOrder::Previous).unwrap_err();
    assert!(matches!(err, Error::Resolution(..)));
}
