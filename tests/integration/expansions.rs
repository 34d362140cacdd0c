mod common;
use common::{registry, string_utils};

use zenreg::ImportError;
use zenreg::host::{ClassDescriptor, Exposure, Marker, MemberDescriptor};
use zenreg::types::ScriptType;

fn numeric_utils() -> ClassDescriptor {
    ClassDescriptor::new("ext.NumericUtils")
        .with_marker(Marker::Expansion("int".to_string()))
        .with_marker(Marker::Expansion("long".to_string()))
        .with_member(
            MemberDescriptor::method("clamp", &["long", "long", "long"], "long")
                .make_static()
                .exposed(Exposure::Method),
        )
        .with_member(
            MemberDescriptor::method("parse", &["string"], "long")
                .make_static()
                .exposed(Exposure::StaticMethod),
        )
}

#[test]
fn class_with_two_markers_contributes_to_both() {
    let (mut reg, logger) = registry();
    assert_eq!(reg.register_expansion(&numeric_utils()), Ok(2));

    for target in ["int", "long"] {
        let expansion = reg.expansion(target).unwrap();
        assert!(expansion.instance_method("clamp", &[ScriptType::Long, ScriptType::Long]).is_some());
        assert!(expansion.static_member("parse").is_some());
        assert!(expansion.contributors().contains("ext.NumericUtils"));
    }
    assert_eq!(reg.expansions().len(), 2);
    assert!(logger.is_empty());
}

#[test]
fn several_classes_share_one_bucket() {
    let (mut reg, _) = registry();
    let more = ClassDescriptor::new("ext.MoreStrings")
        .with_marker(Marker::Expansion("string".to_string()))
        .with_member(
            MemberDescriptor::method("repeat", &["string", "int"], "string")
                .make_static()
                .exposed(Exposure::Method),
        );

    reg.register_expansion(&string_utils()).unwrap();
    reg.register_expansion(&more).unwrap();

    let expansion = reg.expansion("string").unwrap();
    assert_eq!(expansion.contributors().len(), 2);
    assert!(expansion.instance_method("reverse", &[]).is_some());
    assert!(expansion.instance_method("repeat", &[ScriptType::Int]).is_some());
    assert!(expansion.instance_member("length").unwrap().getter.is_some());
}

#[test]
fn reregistering_a_class_is_harmless() {
    let (mut reg, logger) = registry();
    reg.register_expansion(&string_utils()).unwrap();
    let before = reg.expansion("string").unwrap().clone();

    assert_eq!(reg.register_expansion(&string_utils()), Ok(1));
    assert_eq!(reg.expansion("string").unwrap(), &before);
    assert_eq!(before.instance_member("reverse").unwrap().methods.len(), 1);
    assert!(logger.is_empty());
}

#[test]
fn malformed_class_contributes_nothing() {
    let (mut reg, logger) = registry();
    reg.register_expansion(&string_utils()).unwrap();
    let before = reg.expansion("string").unwrap().clone();

    let broken = ClassDescriptor::new("ext.Broken")
        .with_marker(Marker::Expansion("string".to_string()))
        .with_member(
            MemberDescriptor::method("shout", &["string"], "string")
                .make_static()
                .exposed(Exposure::Method),
        )
        .with_member(
            MemberDescriptor::method("width", &["string", "int"], "int")
                .make_static()
                .exposed(Exposure::Getter),
        );

    let err = reg.register_expansion(&broken).unwrap_err();
    assert!(matches!(err, ImportError::MalformedMember { ref member, .. } if member == "width"));
    assert_eq!(reg.expansion("string").unwrap(), &before);
    assert!(reg.expansion("string").unwrap().instance_member("shout").is_none());
    assert_eq!(logger.errors()[0].message, "Unable to register expansion ext.Broken for string");
}

#[test]
fn batch_registration_reports_failures() {
    let (mut reg, _) = registry();
    let bad = ClassDescriptor::new("ext.Bad")
        .with_marker(Marker::Expansion("int".to_string()))
        .with_member(MemberDescriptor::method("f", &["int"], "int").exposed(Exposure::Method));

    let classes = [string_utils(), bad, numeric_utils()];
    let report = reg.register_expansions(classes.iter());
    assert_eq!(report.imported, 2);
    assert_eq!(report.failed.len(), 1);
    assert!(reg.expansion("long").is_some());
}
