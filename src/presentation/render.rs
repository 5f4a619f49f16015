// HTML fragment rendering for a widget view
use crate::application::theme_recolorer::build_scoped_css;
use crate::application::widget_service::WidgetView;

const PLACEHOLDER: &str = "Please configure a Source URL or provide Fallback SVG Code.";

const REFRESH_ICON: &str = r#"<svg viewBox="0 0 24 24" width="14" height="14" role="img" aria-hidden="true"><path stroke-width="2" stroke-linecap="round" stroke-linejoin="round" d="M21 12a9 9 0 1 1-3.4-7L21 8m0-4v4h-4"/></svg>"#;

/// Scoped container holding the widget stylesheet and either the sanitized
/// graph or a status message.
///
/// A fallback graph shown after a failed fetch keeps the error available in
/// the container's `data-error` attribute.
pub fn render_widget(view: &WidgetView) -> String {
    if view.is_loading && view.svg_html.is_none() {
        return "<div class=\"graph-loading\" role=\"status\">Loading…</div>".to_string();
    }

    let body = match (&view.svg_html, &view.error) {
        (Some(svg), _) => format!("<div class=\"svg-image-container\">{}</div>", svg),
        (None, Some(error)) => {
            return format!(
                "<div class=\"graph-error\" style=\"padding: 10px; text-align: center; color: red;\">{}</div>",
                escape_html(error)
            );
        }
        (None, None) => format!(
            "<div style=\"padding: 10px; text-align: center;\">{}</div>",
            PLACEHOLDER
        ),
    };

    let mut html = format!(
        "<div class=\"{}\" data-widget-id=\"{}\"",
        view.scope,
        escape_html(&view.id)
    );
    if let Some(error) = &view.error {
        html.push_str(&format!(" data-error=\"{}\"", escape_html(error)));
    }
    html.push('>');

    html.push_str("<style>");
    html.push_str(&build_scoped_css(&view.theme, &view.scope));
    html.push_str("</style>");

    if view.has_source_url {
        html.push_str(&format!(
            "<form method=\"post\" action=\"/widgets/{}/refresh\"><button type=\"submit\" class=\"refresh-button\" title=\"Refresh graph\" aria-label=\"Refresh graph\">{}</button></form>",
            urlencoding::encode(&view.id),
            REFRESH_ICON
        ));
    }

    html.push_str(&body);
    html.push_str("</div>");
    html
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
