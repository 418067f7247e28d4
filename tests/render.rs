//! End-to-end rendering tests
//!
//! These build real templates with the stock rhai toolchain and check the
//! rendered output, the generated unit and the position map.

use std::collections::HashMap;

use gabarit::{CustomBlock, Dynamic, EnvBlock, TemplateBuilder};

/// Build and render a template with no parameters.
fn render(template: &str) -> String {
    TemplateBuilder::new(template)
        .build()
        .expect("template builds")
        .render([])
        .expect("template renders")
}

struct Wrapping;

impl CustomBlock for Wrapping {
    fn default_identifier(&self) -> &str {
        "Wrap"
    }

    fn evaluate(&self, payload: &str) -> String {
        format!("[{payload}]")
    }
}

struct Hostile;

impl CustomBlock for Hostile {
    fn default_identifier(&self) -> &str {
        "Hostile"
    }

    fn evaluate(&self, _payload: &str) -> String {
        "\"; __out += \"pwned".into()
    }
}

#[test]
fn test_literal_round_trip() {
    assert_eq!(render("Hello, world!"), "Hello, world!");
}

#[test]
fn test_literal_special_characters_round_trip() {
    let template = "quote=\" backslash=\\ tab=\t nul=\u{0} nel=\u{85} ls=\u{2028} emoji=😀\n";
    assert_eq!(render(template), template);
}

#[test]
fn test_trailing_newline_preserved() {
    assert_eq!(render("abc\n"), "abc\n");
}

#[test]
fn test_empty_template() {
    assert_eq!(render(""), "");
}

#[test]
fn test_content_expression() {
    assert_eq!(render("answer: {{ 2 * 21 }}"), "answer: 42");
    assert_eq!(render("{{ \"abc\" }}"), "abc");
    assert_eq!(render("{{ 12.25 }}"), "12.25");
}

#[test]
fn test_content_string_containing_delimiter() {
    assert_eq!(render(r#"a{{ "}}" }}b"#), "a}}b");
}

#[test]
fn test_counting_loop() {
    let out = render("{% for i in 0..3 { %}|{{ i }}|\n{% } %}");
    assert_eq!(out, "|0|\n|1|\n|2|\n");
}

#[test]
fn test_conditional_spans_literal_text() {
    let template = "{% if flag { %}yes{% } else { %}no{% } %}";
    let built = TemplateBuilder::new(template)
        .with_parameter("flag")
        .build()
        .expect("template builds");
    assert_eq!(built.render([Dynamic::from(true)]).unwrap(), "yes");
    assert_eq!(built.render([Dynamic::from(false)]).unwrap(), "no");
}

#[test]
fn test_statement_local_is_visible_to_content() {
    assert_eq!(render("{% let x = 5; %}{{ x }}"), "5");
}

#[test]
fn test_statement_with_line_comment_keeps_following_output() {
    assert_eq!(render("{% let x = 1; // setup\n%}{{ x }}"), "1");
}

#[test]
fn test_picture_format() {
    assert_eq!(render("{{ 42.42 :000.000}}"), "042.420");
    assert_eq!(render("{{ \"{{}}\".len() :000.000}}"), "004.000");
}

#[test]
fn test_picture_format_keeps_large_integer_digits() {
    assert_eq!(render("{{ 9007199254740993 :0}}"), "9007199254740993");
}

#[test]
fn test_parameters_bind_in_declaration_order() {
    let built = TemplateBuilder::new("{{ a }}-{{ b }}")
        .with_parameter("a")
        .with_parameter("b")
        .build()
        .unwrap();
    let out = built
        .render([Dynamic::from(1_i64), Dynamic::from(2_i64)])
        .unwrap();
    assert_eq!(out, "1-2");
}

#[test]
fn test_template_renders_repeatedly() {
    let built = TemplateBuilder::new("Hi {{ name }}!")
        .with_parameter("name")
        .build()
        .unwrap();
    assert_eq!(built.render([Dynamic::from("Ada")]).unwrap(), "Hi Ada!");
    assert_eq!(built.render([Dynamic::from("Grace")]).unwrap(), "Hi Grace!");
}

#[test]
fn test_comment_is_removed() {
    assert_eq!(render("a{# note #}b"), "ab");
}

#[test]
fn test_comment_kept_when_removal_deactivated() {
    let mut builder = TemplateBuilder::new("a{# note #}b");
    builder.config_mut().remove_comment_blocks = false;
    assert_eq!(builder.build().unwrap().render([]).unwrap(), "a{# note #}b");
}

#[test]
fn test_content_blocks_deactivated_render_literally() {
    let mut builder = TemplateBuilder::new("a{{ x }}b");
    builder.config_mut().evaluate_content_blocks = false;
    assert_eq!(builder.build().unwrap().render([]).unwrap(), "a{{ x }}b");
}

#[test]
fn test_statement_blocks_deactivated_render_literally() {
    let mut builder = TemplateBuilder::new("a{% nope %}b");
    builder.config_mut().evaluate_statement_blocks = false;
    assert_eq!(builder.build().unwrap().render([]).unwrap(), "a{% nope %}b");
}

#[test]
fn test_custom_content_delimiters() {
    let mut builder = TemplateBuilder::new("Hello << name >>!");
    builder.config_mut().left_content_delimiter = "<<".into();
    builder.config_mut().right_content_delimiter = ">>".into();
    builder.add_parameter("name");
    let out = builder
        .build()
        .unwrap()
        .render([Dynamic::from("you")])
        .unwrap();
    assert_eq!(out, "Hello you!");
}

#[test]
fn test_custom_block_replaces_payload() {
    let built = TemplateBuilder::new("Prefix{$Wrap: my block $}Suffix")
        .with_custom_block(Wrapping)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(built.render([]).unwrap(), "Prefix[ my block ]Suffix");
}

#[test]
fn test_custom_block_under_explicit_identifier() {
    let built = TemplateBuilder::new("{$Boxed:x$}")
        .with_custom_block_named(Wrapping, "Boxed")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(built.render([]).unwrap(), "[x]");
}

#[test]
fn test_custom_block_output_is_never_code() {
    let built = TemplateBuilder::new("{$Hostile:x$}")
        .with_custom_block(Hostile)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(built.render([]).unwrap(), "\"; __out += \"pwned");
}

#[test]
fn test_custom_delimiters_inactive_without_handlers() {
    assert_eq!(render("a{$ENV:HOME$}b"), "a{$ENV:HOME$}b");
}

#[test]
fn test_env_block_with_defaults() {
    let vars: HashMap<String, String> = HashMap::from([
        ("HOME".to_string(), "/home/test".to_string()),
        ("EMPTY".to_string(), String::new()),
    ]);
    let block = EnvBlock::with_default_separator(move |name| vars.get(name).cloned(), ":");
    let built = TemplateBuilder::new("{$ENV:HOME$} {$ENV:NOPE:none$} {$ENV:EMPTY:fallback$}")
        .with_custom_block(block)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(built.render([]).unwrap(), "/home/test none fallback");
}

#[test]
fn test_import_line_is_emitted_before_the_body() {
    let built = TemplateBuilder::new("x")
        .with_import("helpers", "h")
        .build()
        .unwrap();
    assert!(built
        .generated_source()
        .starts_with("import \"helpers\" as h;\n"));
}

#[test]
fn test_generating_code_reconstructs_the_template() {
    let template = "{# header #}{% let n = 2; %}n={{ n :0}};{$Wrap: tail $}\n";
    let built = TemplateBuilder::new(template)
        .with_custom_block(Wrapping)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(built.source_map().generating_code(), template);
    assert_eq!(built.render([]).unwrap(), "n=2;[ tail ]\n");
}

#[test]
fn test_generated_source_is_exposed() {
    let built = TemplateBuilder::new("v={{ 1 }}").build().unwrap();
    assert!(built.generated_source().contains("__out"));
    assert!(built.generated_source().contains("__str( 1 )"));
}
