//! Templates compiled into the binary, keyed by the name they render under.

use super::TemplateKind;

macro_rules! embed {
    ($name:literal) => {
        ($name, include_str!(concat!("../../templates/", $name)))
    };
}

/// A selection key rendered by a shared parent; overriding the parent reaches every such key
macro_rules! extends {
    ($name:literal, $parent:literal) => {
        ($name, concat!("{% extends \"", $parent, "\" %}"))
    };
}

static GOLANG_TEMPLATES: &[(&str, &str)] = &[
    embed!("golang/function.go.tera"),
    embed!("golang/op.list_reader.go.tera"),
    extends!("golang/op.scalar_reader.go.tera", "golang/function.go.tera"),
    extends!("golang/op.create.go.tera", "golang/function.go.tera"),
    extends!("golang/op.update.go.tera", "golang/function.go.tera"),
    extends!("golang/op.patch.go.tera", "golang/function.go.tera"),
    extends!("golang/op.archive.go.tera", "golang/function.go.tera"),
    embed!("golang/test.go.tera"),
    embed!("golang/test.list_reader.go.tera"),
    extends!("golang/test.scalar_reader.go.tera", "golang/test.go.tera"),
    extends!("golang/test.create.go.tera", "golang/test.go.tera"),
    extends!("golang/test.update.go.tera", "golang/test.go.tera"),
    extends!("golang/test.patch.go.tera", "golang/test.go.tera"),
    // DELETE tests stay a placeholder
    embed!("golang/test.archive.go.tera"),
    embed!("golang/type.go.tera"),
    embed!("golang/signature.go.tera"),
    embed!("golang/observe.go.tera"),
    embed!("golang/input.go.tera"),
    embed!("golang/send.go.tera"),
    embed!("golang/test_failures.go.tera"),
    embed!("golang/static/client.go.tera"),
    embed!("golang/static/credentials.go.tera"),
    embed!("golang/static/errors.go.tera"),
    embed!("golang/static/options.go.tera"),
    embed!("golang/static/query_filter.go.tera"),
    embed!("golang/static/roundtripper.go.tera"),
    embed!("golang/static/test_helpers.go.tera"),
    embed!("golang/static/uploads.go.tera"),
];

static TYPESCRIPT_TEMPLATES: &[(&str, &str)] = &[
    embed!("typescript/method.ts.tera"),
    embed!("typescript/op.list_reader.ts.tera"),
    extends!("typescript/op.scalar_reader.ts.tera", "typescript/method.ts.tera"),
    extends!("typescript/op.create.ts.tera", "typescript/method.ts.tera"),
    extends!("typescript/op.update.ts.tera", "typescript/method.ts.tera"),
    extends!("typescript/op.patch.ts.tera", "typescript/method.ts.tera"),
    extends!("typescript/op.archive.ts.tera", "typescript/method.ts.tera"),
    embed!("typescript/test.ts.tera"),
    extends!("typescript/test.list_reader.ts.tera", "typescript/test.ts.tera"),
    extends!("typescript/test.scalar_reader.ts.tera", "typescript/test.ts.tera"),
    extends!("typescript/test.create.ts.tera", "typescript/test.ts.tera"),
    extends!("typescript/test.update.ts.tera", "typescript/test.ts.tera"),
    extends!("typescript/test.patch.ts.tera", "typescript/test.ts.tera"),
    extends!("typescript/test.archive.ts.tera", "typescript/test.ts.tera"),
    embed!("typescript/test_setup.ts.tera"),
    embed!("typescript/test_guards.ts.tera"),
    embed!("typescript/client.ts.tera"),
    embed!("typescript/index.ts.tera"),
    embed!("typescript/mock.ts.tera"),
    embed!("typescript/model.ts.tera"),
    embed!("typescript/models_index.ts.tera"),
    embed!("typescript/static/api_response.ts.tera"),
    embed!("typescript/static/query_filter.ts.tera"),
    embed!("typescript/static/ranges.ts.tera"),
    embed!("typescript/static/response_config.ts.tera"),
    embed!("typescript/static/test_helpers.ts.tera"),
];

/// The embedded `(name, source)` pairs for `kind`
pub fn embedded_templates(kind: TemplateKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        TemplateKind::Golang => GOLANG_TEMPLATES,
        TemplateKind::TypeScript => TYPESCRIPT_TEMPLATES,
    }
}
