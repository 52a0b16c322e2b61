//! Cross-file superclass walks over temporary Maven-layout projects.

use std::fs;
use std::path::PathBuf;

use presso_java::buffer::SourceBuffer;
use presso_java::inheritance::{annotated_with, find_inherited_member, walk_hierarchy, WalkStop};
use presso_java::layout::ProjectLayout;
use presso_java::locate::class::find_class_by_name;
use tempfile::TempDir;

/// Write `files` (fully-qualified class name, source) under the main root.
fn project(files: &[(&str, &str)]) -> (TempDir, ProjectLayout) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let layout = ProjectLayout::new(temp.path());
    for (fq_name, source) in files {
        let path = layout.source_file_for(fq_name);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create directories");
        fs::write(&path, source).expect("Failed to write file");
    }
    (temp, layout)
}

fn load(layout: &ProjectLayout, fq_name: &str) -> (SourceBuffer, PathBuf) {
    let path = layout.source_file_for(fq_name);
    (SourceBuffer::load(&path).expect("load failed"), path)
}

fn walk(layout: &ProjectLayout, fq_name: &str) -> presso_java::inheritance::HierarchyWalk {
    let (buffer, _) = load(layout, fq_name);
    let simple = fq_name.rsplit('.').next().unwrap();
    let class = find_class_by_name(&buffer, buffer.root(), simple)
        .unwrap()
        .unwrap();
    walk_hierarchy(layout, &buffer, class, annotated_with("Id")).unwrap()
}

#[test]
fn full_chain_without_match_is_not_found() {
    let (_temp, layout) = project(&[
        ("zoo.Animal", "package zoo;\n\nclass Animal {\n    String name;\n}\n"),
        ("zoo.Dog", "package zoo;\n\nclass Dog extends Animal {}\n"),
    ]);
    let (buffer, _) = load(&layout, "zoo.Dog");
    let dog = find_class_by_name(&buffer, buffer.root(), "Dog").unwrap().unwrap();
    let found = find_inherited_member(&layout, &buffer, dog, annotated_with("Id")).unwrap();
    assert!(found.is_none());

    let result = walk(&layout, "zoo.Dog");
    assert_eq!(result.stop, WalkStop::NoSuperclass);
    assert_eq!(result.loads, 1);
    assert!(result.unresolved.is_none());
    assert_eq!(result.links.len(), 1);
    assert_eq!(result.links[0].superclass, "zoo.Animal");
    assert!(result.links[0].local);
}

#[test]
fn chain_of_n_classes_loads_at_most_n_files() {
    let (_temp, layout) = project(&[
        ("app.A", "package app;\nclass A extends B { int a; }\n"),
        ("app.B", "package app;\nclass B extends C { int b; }\n"),
        ("app.C", "package app;\nclass C extends D { int c; }\n"),
        ("app.D", "package app;\nclass D { int d; }\n"),
    ]);
    let result = walk(&layout, "app.A");
    assert_eq!(result.stop, WalkStop::NoSuperclass);
    assert!(result.loads <= 4);
    assert_eq!(result.loads, 3);
    let chain: Vec<&str> = result.links.iter().map(|l| l.superclass.as_str()).collect();
    assert_eq!(chain, ["app.B", "app.C", "app.D"]);
}

#[test]
fn finds_id_in_grandparent_across_packages() {
    let (_temp, layout) = project(&[
        (
            "shop.base.Identified",
            "package shop.base;\n\npublic abstract class Identified {\n    @Id\n    protected Long id;\n}\n",
        ),
        (
            "shop.base.Audited",
            "package shop.base;\n\npublic abstract class Audited extends Identified {\n    protected String createdBy;\n}\n",
        ),
        (
            "shop.Order",
            "package shop;\n\nimport shop.base.Audited;\n\npublic class Order extends Audited {\n    private int total;\n}\n",
        ),
    ]);
    let result = walk(&layout, "shop.Order");
    assert_eq!(result.stop, WalkStop::Found);
    assert_eq!(result.loads, 2);
    let member = result.member.unwrap();
    assert_eq!(member.name, "id");
    assert_eq!(member.class_name, "Identified");
    assert_eq!(member.type_text.as_deref(), Some("Long"));
    assert!(member
        .file
        .unwrap()
        .ends_with("shop/base/Identified.java"));
}

#[test]
fn external_superclass_is_never_loaded() {
    let (_temp, layout) = project(&[(
        "app.Names",
        "package app;\n\nimport java.util.AbstractList;\n\npublic class Names extends AbstractList<String> {}\n",
    )]);
    let result = walk(&layout, "app.Names");
    assert_eq!(result.stop, WalkStop::External);
    assert_eq!(result.loads, 0);
    assert_eq!(result.links[0].superclass, "java.util.AbstractList");
    assert!(!result.links[0].local);
}

#[test]
fn cycle_terminates() {
    let (_temp, layout) = project(&[
        ("loop.A", "package loop;\nclass A extends B {}\n"),
        ("loop.B", "package loop;\nclass B extends A {}\n"),
    ]);
    let result = walk(&layout, "loop.A");
    assert_eq!(result.stop, WalkStop::Cycle);
    assert!(result.loads <= 2);
    assert!(result.member.is_none());
}

#[test]
fn missing_class_in_superclass_file() {
    let (_temp, layout) = project(&[
        ("app.Base", "package app;\nclass Renamed {}\n"),
        ("app.Child", "package app;\nclass Child extends Base {}\n"),
    ]);
    let result = walk(&layout, "app.Child");
    assert_eq!(result.stop, WalkStop::ClassNotFound);
    assert_eq!(result.unresolved.as_deref(), Some("app.Base"));
}

#[test]
fn wildcard_import_resolves_only_to_local_files() {
    let (_temp, layout) = project(&[
        (
            "app.model.Entity",
            "package app.model;\n\npublic class Entity {\n    @Id\n    String key;\n}\n",
        ),
        (
            "app.web.Page",
            "package app.web;\n\nimport java.util.*;\nimport app.model.*;\n\npublic class Page extends Entity {}\n",
        ),
    ]);
    let result = walk(&layout, "app.web.Page");
    assert_eq!(result.stop, WalkStop::Found);
    assert_eq!(result.links[0].superclass, "app.model.Entity");
    assert_eq!(result.member.unwrap().name, "key");
}
