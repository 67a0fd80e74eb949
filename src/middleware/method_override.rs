use axum::{extract::Request, http::Method};

/// Re-dispatch `POST ...?_method=PUT` (or PATCH/DELETE) as that method.
///
/// HTML forms can only submit GET and POST; this runs before routing.
pub fn method_override(mut request: Request) -> Request {
    if request.method() == Method::POST {
        if let Some(method) = request.uri().query().and_then(override_method) {
            *request.method_mut() = method;
        }
    }
    request
}

fn override_method(query: &str) -> Option<Method> {
    let (_, value) = url::form_urlencoded::parse(query.as_bytes()).find(|(key, _)| key == "_method")?;

    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}
