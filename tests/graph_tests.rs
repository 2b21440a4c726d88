//! End-to-end tests of a group tree: construction, traversal, values and hints

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use inputgraph::{
    lock_group, FieldAttributes, FormError, Input, InputCollection, InputCursor, InputGroup,
    MapEnv, NodeId, ScalarSlot,
};
use tempfile::TempDir;

// attrib11 1
// attrib12 1 -> attrib121 2
//            -> attrib122 2 -> attrib1221
//            -> attrib131   -> attrib1311, attrib1312
// attrib13 1 -> attrib131
//            -> attrib132 3 (from file)
//            -> attrib133 3
// attrib14   -> attrib141 (only when attrib14 is "value for attrib14 - X")
fn build(group: &mut InputGroup) {
    for id in 1..=3 {
        group
            .new_container(
                format!("group{id}"),
                format!("Group {id}"),
                format!("description for group {id}"),
                id,
            )
            .unwrap();
    }

    let field = |name: &str, number: &str| {
        FieldAttributes::new(name)
            .display_name(format!("Attrib {number}"))
            .description(format!("description for {name}."))
    };

    let fields = vec![
        field("attrib11", "11")
            .group_id(1)
            .env_var("ATTRIB11_ENV1")
            .env_var("ATTRIB11_ENV2")
            .env_var("ATTRIB11_ENV3")
            .tag("tag1"),
        field("attrib12", "12").group_id(1).env_var("ATTRIB12_ENV1").tag("tag1"),
        field("attrib13", "13")
            .group_id(1)
            .env_var("ATTRIB13_ENV1")
            .env_var("ATTRIB13_ENV2")
            .tag("tag2"),
        field("attrib14", "14")
            .with_default("default value for attrib14")
            .tag("tag1"),
        field("attrib121", "121")
            .group_id(2)
            .depends_on("attrib12=value for attrib12|value for attrib12 - A")
            .tag("tag1"),
        field("attrib122", "122")
            .group_id(2)
            .depends_on("attrib12=value for attrib12|value for attrib12 - B")
            .tag("tag1"),
        field("attrib131", "131")
            .depends_on("attrib12")
            .depends_on("attrib13")
            .tag("tag1"),
        field("attrib132", "132")
            .group_id(3)
            .value_from_file()
            .env_var("ATTRIB132")
            .depends_on("attrib13")
            .tag("tag1"),
        field("attrib133", "133")
            .group_id(3)
            .with_default("default value for attrib133")
            .depends_on("attrib13")
            .tag("tag1"),
        field("attrib141", "141")
            .depends_on("attrib14=value for attrib14 - X")
            .tag("tag1"),
        field("attrib1221", "1221").depends_on("attrib122"),
        field("attrib1311", "1311").depends_on("attrib131"),
        field("attrib1312", "1312").depends_on("attrib131"),
    ];
    for attrs in fields {
        group.add_field(attrs).unwrap();
    }
}

fn test_collection(env: &MapEnv) -> InputCollection {
    let ic = InputCollection::with_env(Arc::new(env.clone()));
    let group = ic.new_group("input-form", "test group description");
    ic.new_group("input-form2", "input form 2 description");
    ic.new_group("input-form3", "input form 3 description");
    build(&mut lock_group(&group));
    ic
}

fn bind_all(group: &mut InputGroup) {
    let names: Vec<String> = group
        .input_fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    for name in names {
        group.bind_field(&name, Arc::new(ScalarSlot::default())).unwrap();
    }
}

fn names(group: &InputGroup, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .filter_map(|&id| group.node(id))
        .map(|n| n.name().to_string())
        .collect()
}

fn current_name(cursor: &InputCursor<'_>) -> Option<String> {
    cursor
        .current()
        .and_then(|id| cursor.group().node(id))
        .map(|n| n.name().to_string())
}

fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_collection_groups() {
    let ic = test_collection(&MapEnv::new());
    assert_eq!(ic.len(), 3);
    assert_eq!(
        ic.group_names(),
        vec!["input-form", "input-form2", "input-form3"]
    );
    assert!(ic.group("missing").is_none());
    assert!(matches!(
        ic.try_group("missing"),
        Err(FormError::GroupNotFound { .. })
    ));

    let group = ic.try_group("input-form").unwrap();
    let group = lock_group(&group);
    assert_eq!(group.description(), "test group description");
    assert_eq!(names(&group, group.inputs()), vec!["group1", "attrib14"]);
}

#[test]
fn test_input_fields_depth_first_once() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let group = lock_group(&group);

    let order: Vec<&str> = group.input_fields().into_iter().map(|f| f.name()).collect();
    assert_eq!(
        order,
        vec![
            "attrib11",
            "attrib12",
            "attrib121",
            "attrib122",
            "attrib1221",
            "attrib131",
            "attrib1311",
            "attrib1312",
            "attrib13",
            "attrib132",
            "attrib133",
            "attrib14",
            "attrib141",
        ]
    );
}

#[test]
fn test_shared_dependent_hangs_off_both_prerequisites() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let group = lock_group(&group);

    let a12 = group.field_id("attrib12").unwrap();
    let a13 = group.field_id("attrib13").unwrap();
    let a131 = group.field_id("attrib131").unwrap();
    assert_eq!(names(&group, group.children(a12)), vec!["group2", "attrib131"]);
    assert_eq!(names(&group, group.children(a13)), vec!["attrib131", "group3"]);

    let conditions = group.field("attrib131").unwrap().post_conditions();
    assert_eq!(conditions.len(), 2);
    assert!(conditions.iter().all(|c| c.values.is_empty()));
    assert_eq!(group.children(a131).len(), 2);
}

#[test]
fn test_long_description_names_environment() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let group = lock_group(&group);

    assert_eq!(
        group.field("attrib11").unwrap().long_description(),
        "description for attrib11. It will be sourced from the environment variables \
         ATTRIB11_ENV1, ATTRIB11_ENV2, ATTRIB11_ENV3 if not provided."
    );
    assert_eq!(
        group.field("attrib12").unwrap().long_description(),
        "description for attrib12. It will be sourced from the environment variable \
         ATTRIB12_ENV1 if not provided."
    );
    assert_eq!(
        group.field("attrib14").unwrap().long_description(),
        "description for attrib14."
    );
}

#[test]
fn test_value_falls_back_to_first_set_environment_variable() {
    let env = MapEnv::new();
    let ic = test_collection(&env);
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    assert_eq!(group.field_value("attrib11").unwrap(), None);

    env.set("ATTRIB11_ENV3", "value from env3");
    env.set("ATTRIB11_ENV2", "value from env2");
    assert_eq!(
        group.field_value("attrib11").unwrap().as_deref(),
        Some("value from env2")
    );

    env.set("ATTRIB11_ENV1", "value from env1");
    assert_eq!(
        group.field_value("attrib11").unwrap().as_deref(),
        Some("value from env1")
    );

    group.set_field_value("attrib11", "bound value").unwrap();
    assert_eq!(
        group.field_value("attrib11").unwrap().as_deref(),
        Some("bound value")
    );
}

#[test]
fn test_lookup_unknown_field() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);

    assert!(group.has_field("attrib1311"));
    assert!(!group.has_field("attrib99"));
    assert!(matches!(
        group.field("attrib99"),
        Err(FormError::FieldNotFound { .. })
    ));
    assert!(matches!(
        group.set_field_value("attrib99", "x"),
        Err(FormError::FieldNotFound { .. })
    ));
}

#[test]
fn test_accepted_values() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    let field = group.field_mut("attrib11").unwrap();
    field.set_accepted_values(vec!["aa".into(), "bb".into(), "cc".into()], "error");

    let err = field.set("dd").unwrap_err();
    assert_eq!(err.to_string(), "error");
    field.set("bb").unwrap();
    assert_eq!(field.value().as_deref(), Some("bb"));
}

#[test]
fn test_inclusion_and_exclusion_filters() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    let field = group.field_mut("attrib11").unwrap();
    field.set_inclusion_filter("(gopher){2}", "error").unwrap();
    assert_eq!(field.set("gopher").unwrap_err().to_string(), "error");
    field.set("gophergophergopher").unwrap();

    let field = group.field_mut("attrib12").unwrap();
    field.set_exclusion_filter("(gopher){2}", "error").unwrap();
    assert_eq!(
        field.set("gophergophergopher").unwrap_err().to_string(),
        "error"
    );
    field.set("gopher").unwrap();
}

#[test]
fn test_file_value_and_field_hint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("attrib132");
    fs::write(&path, r#"{"attrib132":"value for attrib132 from file"}"#).unwrap();
    let path = path.to_string_lossy().to_string();

    let env = MapEnv::with_vars([("ATTRIB132", path.as_str())]);
    let ic = test_collection(&env);
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    assert_eq!(
        group.field_value("attrib133").unwrap().as_deref(),
        Some("default value for attrib133")
    );

    let (from_file, paths) = group.field("attrib132").unwrap().value_from_file();
    assert!(from_file);
    assert_eq!(paths, vec![path.clone()]);
    // the environment names a path, it is never the value itself
    assert_eq!(group.field_value("attrib132").unwrap(), None);

    group
        .add_field_hint("attrib133", "field://attrib132/attrib132")
        .unwrap();
    assert!(group.field_hints("attrib133").unwrap().values.is_empty());

    group.set_field_value("attrib132", &path).unwrap();
    assert_eq!(
        group.field_value("attrib132").unwrap().as_deref(),
        Some(r#"{"attrib132":"value for attrib132 from file"}"#)
    );

    let hints = group.field_hints("attrib133").unwrap().values;
    assert_eq!(hints, vec!["value for attrib132 from file".to_string()]);

    group.set_field_value("attrib133", &hints[0]).unwrap();
    assert_eq!(
        group.field_value("attrib133").unwrap().as_deref(),
        Some("value for attrib132 from file")
    );
}

#[test]
fn test_hint_errors() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    assert!(matches!(
        group.add_field_hint("attrib133", "not a hint"),
        Err(FormError::InvalidHint { .. })
    ));
    assert!(matches!(
        group.add_field_hint("attrib99", "field://attrib132/x"),
        Err(FormError::FieldNotFound { .. })
    ));

    group.add_field_hint("attrib121", "field://attrib12/a").unwrap();
    group.add_field_hint("attrib121", "https://example.com/regions").unwrap();
    group.set_field_value("attrib12", "not json").unwrap();
    let hints = group.field_hints("attrib121").unwrap();
    assert!(hints.values.is_empty());
    assert!(matches!(hints.errors[0], FormError::HintJson { .. }));
    assert!(matches!(hints.errors[1], FormError::HintNotImplemented { .. }));

    group.set_field_value("attrib12", r#"{"b": 1}"#).unwrap();
    let hints = group.field_hints("attrib121").unwrap();
    assert!(matches!(hints.errors[0], FormError::JsonPathNoMatch { .. }));

    // the https hint still fails, the field hint resolves
    group.set_field_value("attrib12", r#"{"a": ["x", 2]}"#).unwrap();
    let hints = group.field_hints("attrib121").unwrap();
    assert_eq!(hints.values, vec!["x", "2"]);
    assert_eq!(hints.errors.len(), 1);
}

#[test]
fn test_cursor_path_through_attrib122() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    let mut cursor = InputCursor::new(&mut group, Vec::<String>::new());
    assert_eq!(current_name(&cursor).as_deref(), Some("group1"));
    let alternatives = cursor.alternatives();
    assert_eq!(
        names(cursor.group(), &alternatives),
        vec!["attrib11", "attrib12", "attrib13"]
    );

    cursor.set_input("attrib12", "value for attrib12").unwrap();
    assert_eq!(current_name(&cursor).as_deref(), Some("group2"));
    assert_eq!(cursor.alternatives().len(), 2);

    let steps = [
        ("attrib122", "value for attrib122", Some("attrib1221")),
        ("attrib1221", "value for attrib1221", Some("attrib131")),
        ("attrib131", "value for attrib131", Some("attrib1311")),
        ("attrib1311", "value for attrib1311", Some("attrib1312")),
        ("attrib1312", "value for attrib1312", Some("attrib14")),
        ("attrib14", "value for attrib14", None),
    ];
    for (name, value, next) in steps {
        cursor.set_input(name, value).unwrap();
        assert_eq!(current_name(&cursor).as_deref(), next, "after {name}");
    }
    assert!(cursor.is_exhausted());
    assert!(matches!(
        cursor.set_input("attrib141", "x"),
        Err(FormError::CursorExhausted)
    ));
    drop(cursor);

    assert_eq!(
        group.input_values(),
        values(&[
            ("attrib12", "value for attrib12"),
            ("attrib122", "value for attrib122"),
            ("attrib1221", "value for attrib1221"),
            ("attrib131", "value for attrib131"),
            ("attrib1311", "value for attrib1311"),
            ("attrib1312", "value for attrib1312"),
            ("attrib14", "value for attrib14"),
        ])
    );
}

#[test]
fn test_cursor_collapses_single_alternative() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    let mut cursor = InputCursor::new(&mut group, Vec::<String>::new());
    cursor.set_input("attrib12", "value for attrib12 - A").unwrap();
    // only attrib121 accepts this value, so group2 is skipped
    assert_eq!(current_name(&cursor).as_deref(), Some("attrib121"));

    let steps = [
        ("attrib121", "value for attrib121", Some("attrib131")),
        ("attrib131", "value for attrib131", Some("attrib1311")),
        ("attrib1311", "value for attrib1311", Some("attrib1312")),
        ("attrib1312", "value for attrib1312", Some("attrib14")),
        ("attrib14", "value for attrib14 - X", Some("attrib141")),
        ("attrib141", "value for attrib141", None),
    ];
    for (name, value, next) in steps {
        cursor.set_input(name, value).unwrap();
        assert_eq!(current_name(&cursor).as_deref(), next, "after {name}");
    }
    drop(cursor);

    let collected = group.input_values();
    assert_eq!(collected.len(), 7);
    assert_eq!(collected["attrib121"], "value for attrib121");
    assert_eq!(collected["attrib141"], "value for attrib141");
    assert!(!collected.contains_key("attrib122"));
}

#[test]
fn test_cursor_path_through_attrib13_with_defaults() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    let mut cursor = InputCursor::new(&mut group, Vec::<String>::new());
    cursor.set_input("attrib13", "value for attrib13").unwrap();
    assert_eq!(current_name(&cursor).as_deref(), Some("attrib131"));

    cursor.set_input("attrib131", "value for attrib131").unwrap();
    cursor.set_input("attrib1311", "value for attrib1311").unwrap();
    cursor.set_input("attrib1312", "value for attrib1312").unwrap();
    assert_eq!(current_name(&cursor).as_deref(), Some("group3"));

    // attrib132 has nothing saved
    assert!(matches!(
        cursor.set_default_input("attrib132"),
        Err(FormError::NoSavedValue { .. })
    ));
    assert_eq!(current_name(&cursor).as_deref(), Some("group3"));

    cursor.set_default_input("attrib133").unwrap();
    assert_eq!(current_name(&cursor).as_deref(), Some("attrib14"));
    cursor.set_default_input("attrib14").unwrap();
    assert!(cursor.is_exhausted());
    drop(cursor);

    let collected = group.input_values();
    assert_eq!(collected["attrib133"], "default value for attrib133");
    assert_eq!(collected["attrib14"], "default value for attrib14");
    assert!(!collected.contains_key("attrib132"));
}

#[test]
fn test_cursor_rejects_input_out_of_turn() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    let mut cursor = InputCursor::new(&mut group, Vec::<String>::new());
    assert!(matches!(
        cursor.set_input("attrib14", "too early"),
        Err(FormError::NotCurrentInput { .. })
    ));
    assert!(matches!(
        cursor.set_input("attrib99", "x"),
        Err(FormError::FieldNotFound { .. })
    ));
    assert_eq!(current_name(&cursor).as_deref(), Some("group1"));
}

#[test]
fn test_cursor_with_tags() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    let mut cursor = InputCursor::new(&mut group, ["tag1"]);
    // attrib13 only carries tag2
    let alternatives = cursor.alternatives();
    assert_eq!(
        names(cursor.group(), &alternatives),
        vec!["attrib11", "attrib12"]
    );

    cursor.set_input("attrib12", "value for attrib12").unwrap();
    cursor.set_input("attrib122", "value for attrib122").unwrap();
    // untagged attrib1221, attrib1311 and attrib1312 are skipped
    assert_eq!(current_name(&cursor).as_deref(), Some("attrib131"));
    cursor.set_input("attrib131", "value for attrib131").unwrap();
    assert_eq!(current_name(&cursor).as_deref(), Some("attrib14"));
    cursor.set_input("attrib14", "value for attrib14").unwrap();
    assert!(cursor.is_exhausted());
    drop(cursor);

    let keys: Vec<String> = group.input_values().into_keys().collect();
    assert_eq!(keys, vec!["attrib12", "attrib122", "attrib131", "attrib14"]);
}

#[test]
fn test_enabled_follows_prerequisite_values() {
    let ic = test_collection(&MapEnv::new());
    let group = ic.try_group("input-form").unwrap();
    let mut group = lock_group(&group);
    bind_all(&mut group);

    // without evaluation every field is enabled
    assert!(group.enabled("attrib141", false, &[]).unwrap());
    // attrib14 holds its default, which attrib141 does not accept
    assert!(!group.enabled("attrib141", true, &[]).unwrap());

    group
        .set_field_value("attrib14", "value for attrib14 - X")
        .unwrap();
    assert!(group.enabled("attrib141", true, &[]).unwrap());
    assert!(!group.enabled("attrib141", true, &["tag2"]).unwrap());

    // neither prerequisite of attrib131 has a value
    assert!(!group.enabled("attrib131", true, &[]).unwrap());
    group.set_field_value("attrib13", "anything").unwrap();
    assert!(group.enabled("attrib131", true, &[]).unwrap());
}
