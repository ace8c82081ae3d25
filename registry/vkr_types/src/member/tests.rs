use pretty_assertions::assert_eq;
use smallvec::smallvec;

use super::*;

fn field(path: &str, deref: bool) -> LengthToken {
    LengthToken::Field {
        path: path.to_owned(),
        deref,
    }
}

fn text(s: &str) -> LengthToken {
    LengthToken::Text(s.to_owned())
}

#[test]
fn render_plain_sibling() {
    let len = LengthExpr {
        source: "count".to_owned(),
        tokens: vec![field("count", false)],
    };
    assert_eq!(len.as_sibling(), Some("count"));
    assert_eq!(len.render(None), "count");
    assert_eq!(len.render(Some("info")), "info.count");
}

#[test]
fn render_dereferences_pointer_fields() {
    let len = LengthExpr {
        source: "pPhysicalDeviceCount".to_owned(),
        tokens: vec![field("pPhysicalDeviceCount", true)],
    };
    assert_eq!(len.render(Some("args")), "*args.pPhysicalDeviceCount");
}

#[test]
fn render_nested_path() {
    let len = LengthExpr {
        source: "pAllocateInfo->descriptorSetCount".to_owned(),
        tokens: vec![field("pAllocateInfo->descriptorSetCount", false)],
    };
    assert_eq!(len.as_sibling(), None);
    assert_eq!(
        len.render(Some("my_args")),
        "my_args.pAllocateInfo->descriptorSetCount"
    );
}

#[test]
fn render_arithmetic() {
    let len = LengthExpr {
        source: "(rasterizationSamples + 31) / 32".to_owned(),
        tokens: vec![
            text("("),
            field("rasterizationSamples", false),
            text(" + 31) / 32"),
        ],
    };
    assert_eq!(len.render(Some("obj")), "(obj.rasterizationSamples + 31) / 32");
    assert_eq!(len.fields().collect::<Vec<_>>(), vec!["rasterizationSamples"]);
}

#[test]
fn render_constant_only() {
    let len = LengthExpr {
        source: "2*VK_UUID_SIZE".to_owned(),
        tokens: vec![text("2*"), LengthToken::Constant("VK_UUID_SIZE".to_owned())],
    };
    assert_eq!(len.render(Some("obj")), "2*VK_UUID_SIZE");
    assert_eq!(len.fields().count(), 0);
}

#[test]
fn member_predicates() {
    let member = Member {
        name: "pNext".to_owned(),
        ty: crate::TypeId::from_raw(0),
        modifiers: smallvec![Modifier::ChainPointer { is_const: true }],
        optional: true,
        is_output: false,
        bit_size: None,
        values: Vec::new(),
    };
    assert!(member.is_chain_pointer());
    assert!(member.is_pointer());
    assert!(!member.is_value());
    assert!(member.length().is_none());
    assert!(member.outermost().is_some_and(Modifier::is_const));
}
