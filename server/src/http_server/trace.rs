use axum::{
    extract::MatchedPath,
    http::{Request, Response},
};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Level;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Tracer;

impl<Body> MakeSpan<Body> for Tracer {
    fn make_span(&mut self, request: &Request<Body>) -> tracing::Span {
        let route = http_route(request);
        let span_name = format!("{} {}", request.method(), route);

        tracing::span!(
            Level::INFO,
            "server.request",
            otel.name = span_name,
            kind = "server",
            uri = %request.uri(),
            url.path = %request.uri().path(),
            url.query = request.uri().query(),
            http_version = ?request.version(),
            user_agent.original = request.headers().get("user-agent").and_then(|h| h.to_str().ok()),
            http.route = route,
            recipe.id = recipe_id(request),
            http.request.method = %request.method(),
            http.request.header.forwarded_for = request.headers().get("x-forwarded-for").and_then(|h| h.to_str().ok()),
            authenticated = request.headers().contains_key("authorization"),
            cart.download = route == "/recipes/download_shopping_cart/",

            http.response.status_code = tracing::field::Empty,
            http.response.header.content_type = tracing::field::Empty,
        )
    }
}

impl<Body> OnResponse<Body> for Tracer {
    fn on_response(self, response: &Response<Body>, latency: std::time::Duration, span: &tracing::Span) {
        let status_code = response.status().as_u16();
        tracing::event!(
            Level::INFO,
            status = status_code,
            latency = format_args!("{} ms", latency.as_millis()),
            "finished processing request"
        );

        span.record("http.response.status_code", status_code);
        span.record(
            "http.response.header.content_type",
            response
                .headers()
                .get("content-type")
                .and_then(|h| h.to_str().ok()),
        );
    }
}

#[inline]
fn http_route<B>(req: &Request<B>) -> &str {
    req.extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "", |mp| mp.as_str())
}

fn recipe_id<B>(req: &Request<B>) -> Option<&str> {
    recipe_id_segment(http_route(req), req.uri().path())
}

/// The `{recipe_id}` segment of recipe routes, as sent by the client.
fn recipe_id_segment<'a>(route: &str, path: &'a str) -> Option<&'a str> {
    if !route.starts_with("/recipes/{recipe_id}/") {
        return None;
    }

    path.strip_prefix("/recipes/")
        .and_then(|rest| rest.split('/').next())
        .filter(|id| !id.is_empty())
}
