use pretty_assertions::assert_eq;

use crate::{build_from_str, RegistryOptions};

const SOURCE: &str = r#"<registry>
<platforms/>
<types>
    <type name="VkResult" category="enum"/>
</types>
<enums name="VkResult" type="enum">
    <enum value="0" name="VK_SUCCESS"/>
    <enum value="-1" name="VK_ERROR_X"/>
    <enum value="-2" name="VK_ERROR_GONE" comment="removed by 1.2"/>
</enums>
<commands/>
<feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
    <require><type name="VkResult"/></require>
</feature>
<feature api="vulkan" name="VK_VERSION_1_1" number="1.1">
    <require>
        <enum extends="VkResult" extnumber="2" offset="0" dir="-" name="VK_ERROR_FOO"/>
    </require>
</feature>
<feature api="vulkan" name="VK_VERSION_1_2" number="1.2">
    <remove><enum name="VK_ERROR_GONE"/></remove>
</feature>
<extensions>
    <extension name="VK_KHR_foo" number="2" author="KHR" supported="vulkan">
        <require>
            <enum extends="VkResult" offset="0" dir="-" name="VK_ERROR_FOO_KHR"/>
        </require>
    </extension>
    <extension name="VK_EXT_foo" number="4" author="EXT" supported="vulkan">
        <require>
            <enum extends="VkResult" extnumber="2" offset="0" dir="-" name="VK_ERROR_FOO_EXT"/>
            <enum extends="VkResult" extnumber="2" offset="0" dir="-" name="VK_ERROR_FOO_KHR"/>
            <enum extends="VkResult" name="VK_ERROR_BAR_EXT" alias="VK_ERROR_BAR_NV"/>
        </require>
    </extension>
    <extension name="VK_NV_bar" number="9" author="NV" supported="vulkan">
        <require>
            <enum extends="VkResult" offset="0" dir="-" name="VK_ERROR_BAR_NV"/>
        </require>
    </extension>
</extensions>
</registry>"#;

fn merged() -> Vec<(String, i64, Option<String>)> {
    let registry = build_from_str(SOURCE, &RegistryOptions::default()).unwrap();
    registry
        .enum_values("VkResult")
        .unwrap()
        .iter()
        .map(|v| (v.name.clone(), v.value, v.alias_of.clone()))
        .collect()
}

fn entry(name: &str, value: i64, alias_of: Option<&str>) -> (String, i64, Option<String>) {
    (name.to_owned(), value, alias_of.map(str::to_owned))
}

#[test]
fn core_name_is_canonical_and_extension_synonyms_alias_it() {
    let values = merged();
    assert_eq!(
        values[..5],
        [
            entry("VK_SUCCESS", 0, None),
            entry("VK_ERROR_X", -1, None),
            entry("VK_ERROR_FOO", -1_000_001_000, None),
            entry("VK_ERROR_FOO_KHR", -1_000_001_000, Some("VK_ERROR_FOO")),
            entry("VK_ERROR_FOO_EXT", -1_000_001_000, Some("VK_ERROR_FOO")),
        ]
    );
}

#[test]
fn alias_of_inactive_value_stands_alone() {
    let values = merged();
    assert_eq!(
        values.last().unwrap(),
        &entry("VK_ERROR_BAR_EXT", -1_000_008_000, None)
    );
    assert!(values.iter().all(|(name, _, _)| name != "VK_ERROR_BAR_NV"));
}

#[test]
fn redeclared_name_appears_once() {
    let values = merged();
    let count = values
        .iter()
        .filter(|(name, _, _)| name == "VK_ERROR_FOO_KHR")
        .count();
    assert_eq!(count, 1);
    assert_eq!(values.len(), 6);
}

#[test]
fn removed_value_is_dropped() {
    let values = merged();
    assert!(values.iter().all(|(name, _, _)| name != "VK_ERROR_GONE"));
}
