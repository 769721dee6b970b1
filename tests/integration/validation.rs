//! Field validation against the registry's data type.

use std::error::Error as _;

use anyhow::Result;
use templator::core::Error;
use templator::fs::MemoryFs;
use templator::registry::Registry;
use templator::shape::Shape;
use templator::validation::FieldError;

use super::common::{Article, Page};

fn page_registry(source: &str) -> Result<Registry<Page>> {
    let fs = MemoryFs::new().with_file("templates/t.html", source);
    Ok(Registry::<Page>::builder(fs).field_validation().build()?)
}

fn article_registry(source: &str) -> Result<Registry<Article>> {
    let fs = MemoryFs::new().with_file("templates/t.html", source);
    Ok(Registry::<Article>::builder(fs).field_validation().build()?)
}

fn field_error(err: &Error) -> &FieldError {
    match err {
        Error::Validation(e) => &e.source,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_valid_references() -> Result<()> {
    page_registry("{{ Title }} {{ Content }}")?.get("t")?;
    Ok(())
}

#[test]
fn test_unknown_field() -> Result<()> {
    let err = page_registry("{{ InvalidField }}")?.get("t").unwrap_err();

    match &err {
        Error::Validation(e) => {
            assert_eq!(e.template_name, "t");
            assert_eq!(e.field_path, "InvalidField");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "template 't' validation error: 'InvalidField' - 'field 'InvalidField' not found in type Page'"
    );
    assert!(err.source().is_some());
    Ok(())
}

#[test]
fn test_names_are_case_sensitive() -> Result<()> {
    let err = page_registry("{{ title }}")?.get("t").unwrap_err();
    assert!(matches!(field_error(&err), FieldError::NotFound { segment, .. } if segment == "title"));
    Ok(())
}

#[test]
fn test_optional_fields() -> Result<()> {
    article_registry("{% if SubTitle %}{{ SubTitle }}{% endif %}")?.get("t")?;
    article_registry("{% if Author %}{{ Author.Name }}{% endif %}")?.get("t")?;
    Ok(())
}

#[test]
fn test_nested_unknown_field() -> Result<()> {
    let err = article_registry("{{ Author.Email }}")?.get("t").unwrap_err();
    assert_eq!(field_error(&err), &FieldError::NotFound {
        segment: "Email".into(),
        type_name: "Author".into(),
    });
    Ok(())
}

#[test]
fn test_field_of_primitive() -> Result<()> {
    let err = page_registry("{{ Title.Length }}")?.get("t").unwrap_err();
    assert!(matches!(field_error(&err), FieldError::NotRecord { kind: "primitive", .. }));
    Ok(())
}

#[test]
fn test_locals_comments_and_raw_blocks_are_unchecked() -> Result<()> {
    let source = r#"
        {# {{ Nope }} #}
        {% raw %}{{ AlsoNope }}{% endraw %}
        {% set heading = Title %}{{ heading }}
        {% for tag in Tags %}{{ tag }}{% if loop.last %}.{% endif %}{% endfor %}
    "#;
    article_registry(source)?.get("t")?;
    Ok(())
}

#[test]
fn test_loop_variable_after_its_loop_is_checked() -> Result<()> {
    let source = "{% for item in Tags %}{{ item }}{% endfor %}{{ item }}";
    let err = article_registry(source)?.get("t").unwrap_err();
    match &err {
        Error::Validation(e) => assert_eq!(e.field_path, "item"),
        other => panic!("expected a validation error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unit_type_has_no_fields() -> Result<()> {
    let fs = MemoryFs::new()
        .with_file("templates/static.html", "<p>static</p>")
        .with_file("templates/t.html", "{{ Anything }}");
    let registry = Registry::<()>::builder(fs).field_validation().build()?;

    registry.get("static")?;
    let err = registry.get("t").unwrap_err();
    assert_eq!(field_error(&err), &FieldError::NilType);
    Ok(())
}

#[test]
fn test_dynamic_data_accepts_anything() -> Result<()> {
    let fs = MemoryFs::new().with_file("templates/t.html", "{{ Any.Thing.At.All }}");
    let registry = Registry::<serde_json::Value>::builder(fs).field_validation().build()?;
    registry.get("t")?;
    Ok(())
}

#[test]
fn test_explicit_shape() -> Result<()> {
    let shape = Shape::record("Mail")
        .field_of::<String>("To")
        .field("Meta", Shape::map(Shape::Primitive("String")))
        .build();
    let fs = MemoryFs::new()
        .with_file("templates/ok.html", "{{ To }}")
        .with_file("templates/bad.html", "{{ Meta.Key }}");
    let registry = Registry::<serde_json::Value>::builder(fs).validate_against(shape).build()?;

    registry.get("ok")?;
    let err = registry.get("bad").unwrap_err();
    assert!(matches!(field_error(&err), FieldError::NotRecord { kind: "map", .. }));
    Ok(())
}
