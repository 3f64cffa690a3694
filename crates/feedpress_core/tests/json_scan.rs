use feedpress_core::{first_json_object, json_objects, parse_rewritten, ArticleSchemaError};
use pretty_assertions::assert_eq;

#[test]
fn article_is_found_inside_prose_and_fences() {
    let response = r#"Sure! Here is the rewritten article:

```json
{"title":"New T","excerpt":"E","content":"<p>X</p><p>Y</p>","tags":["a"]}
```
Let me know if you want {changes}."#;

    let article = parse_rewritten(response).unwrap();
    assert_eq!(article.title, "New T");
    assert_eq!(article.excerpt, "E");
    assert_eq!(article.content, "<p>X</p><p>Y</p>");
    assert_eq!(article.tags, vec!["a".to_string()]);
}

#[test]
fn greedy_regex_trap_is_avoided() {
    // A naive `\{[\s\S]*\}` would swallow both objects and the prose between them.
    let response = r#"{"title":"A","content":"<p>1</p>"} and later {"other":true}"#;
    let objects: Vec<_> = json_objects(response).map(|(span, _)| span).collect();
    assert_eq!(
        objects,
        vec![r#"{"title":"A","content":"<p>1</p>"}"#, r#"{"other":true}"#]
    );
    assert_eq!(parse_rewritten(response).unwrap().title, "A");
}

#[test]
fn nested_objects_are_kept_whole() {
    let obj = first_json_object(r#"pre {"a":{"b":{"c":1}},"d":[{"e":2}]} post"#).unwrap();
    assert_eq!(obj["a"]["b"]["c"], 1);
    assert_eq!(obj["d"][0]["e"], 2);
}

#[test]
fn missing_optional_fields_default() {
    let article = parse_rewritten(r#"{"title":" T ","content":"<p>c</p>"}"#).unwrap();
    assert_eq!(article.title, "T");
    assert_eq!(article.excerpt, "");
    assert!(article.tags.is_empty());
}

#[test]
fn tags_are_trimmed_and_deduplicated() {
    let article =
        parse_rewritten(r#"{"title":"T","content":"c","tags":[" ai ","ai","","rust"]}"#).unwrap();
    assert_eq!(article.tags, vec!["ai".to_string(), "rust".to_string()]);
}

#[test]
fn schema_violations_are_rejected() {
    assert!(matches!(
        parse_rewritten("no json here"),
        Err(ArticleSchemaError::NoObject)
    ));
    assert!(matches!(
        parse_rewritten(r#"{"title":"T"}"#),
        Err(ArticleSchemaError::Shape(_))
    ));
    assert!(matches!(
        parse_rewritten(r#"{"title":"T","content":"c","tags":"not-a-list"}"#),
        Err(ArticleSchemaError::Shape(_))
    ));
    assert!(matches!(
        parse_rewritten(r#"{"title":"  ","content":"c"}"#),
        Err(ArticleSchemaError::EmptyField("title"))
    ));
    assert!(matches!(
        parse_rewritten(r#"{"title":"T","content":""}"#),
        Err(ArticleSchemaError::EmptyField("content"))
    ));
}

#[test]
fn truncated_json_is_not_an_object() {
    assert!(first_json_object(r#"{"title":"T","content":"<p>cut off"#).is_none());
}
