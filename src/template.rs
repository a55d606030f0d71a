use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::{Error, Result};

/// Parses `source` as a Jinja template and renders it against `data`.
pub(crate) fn render<S: Serialize>(source: &str, data: S) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    let template = env.template_from_str(source).map_err(Error::TemplateParse)?;
    template.render(data).map_err(Error::TemplateRender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_fields() {
        let out = render("Test {{ num }}", json!({ "num": "1" })).unwrap();
        assert_eq!(out, "Test 1");
    }

    #[test]
    fn keeps_trailing_newline() {
        let out = render("{{ greeting }}\n", json!({ "greeting": "hi" })).unwrap();
        assert_eq!(out, "hi\n");
    }

    #[test]
    fn syntax_error_is_parse_failure() {
        let err = render("Test {{ num", json!({ "num": "1" })).unwrap_err();
        assert!(matches!(err, Error::TemplateParse(_)));
    }

    #[test]
    fn undefined_value_is_render_failure() {
        let err = render("Test {{ missing }}", json!({})).unwrap_err();
        assert!(matches!(err, Error::TemplateRender(_)));
    }
}
