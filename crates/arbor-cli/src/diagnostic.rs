use annotate_snippets::{Level, Renderer, Snippet};
use arbor::{QueryError, QueryErrorKind};

pub(crate) fn renderer(styled: bool) -> Renderer {
    if styled { Renderer::styled() } else { Renderer::plain() }
}

/// Renders a query compile error against the query source.
pub(crate) fn render(error: &QueryError, renderer: &Renderer, path: &str, source: &str) -> String {
    let (label, len) = match &error.kind {
        QueryErrorKind::NodeType(name) => ("unknown node type", name.len()),
        QueryErrorKind::Field(name) => ("unknown field", name.len()),
        QueryErrorKind::Capture(name) => ("undeclared capture", name.len()),
        QueryErrorKind::Predicate(_) => ("malformed predicate", 1),
        QueryErrorKind::Syntax(_) => ("unexpected input", 1),
    };
    let start = error.offset.min(source.len());
    let mut end = (start + len).min(source.len());
    while !source.is_char_boundary(end) {
        end += 1;
    }

    let title = error.to_string();
    let message = Level::Error.title(&title).snippet(
        Snippet::source(source)
            .origin(path)
            .annotation(Level::Error.span(start..end).label(label))
            .fold(true),
    );
    renderer.render(message).to_string()
}
