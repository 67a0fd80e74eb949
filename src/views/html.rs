use serde_json::Value;

use super::{ViewContext, ViewError, ViewRenderer};
use crate::schema::catalog::RESOURCES;

/// Built-in server-side renderer producing plain HTML pages
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl ViewRenderer for HtmlRenderer {
    fn render(&self, view: &str, context: &ViewContext) -> Result<String, ViewError> {
        let (title, body) = match view {
            "index" => ("Academic Year".to_string(), index(context)),
            "annexure" => annexure(context)?,
            "users/login" => ("Login".to_string(), login()),
            "users/register" => ("Register".to_string(), register(context)),
            other => return Err(ViewError::UnknownView(other.to_string())),
        };
        Ok(layout(&title, context, &body))
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => escape(s),
        Some(Value::Null) | None => String::new(),
        Some(other) => escape(&other.to_string()),
    }
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value.pointer(pointer).and_then(Value::as_str).unwrap_or_default()
}

fn layout(title: &str, context: &ViewContext, body: &str) -> String {
    let mut nav = String::from(r#"<a href="/">Home</a>"#);
    match &context.user {
        Some(user) => {
            for resource in RESOURCES {
                nav.push_str(&format!(r#" | <a href="{}">{}</a>"#, resource.path, escape(resource.title)));
            }
            nav.push_str(&format!(r#" | <span>{}</span> | <a href="/users/logout">Logout</a>"#, escape(&user.name)));
        }
        None => nav.push_str(r#" | <a href="/users/login">Login</a> | <a href="/users/register">Register</a>"#),
    }

    let mut notices = String::new();
    for msg in &context.success_msg {
        notices.push_str(&format!(r#"<div class="alert alert-success">{}</div>"#, escape(msg)));
    }
    for msg in context.error_msg.iter().chain(&context.error) {
        notices.push_str(&format!(r#"<div class="alert alert-danger">{}</div>"#, escape(msg)));
    }
    if let Some(year) = &context.year {
        notices.push_str(&format!(r#"<p class="year">Academic year: {}</p>"#, escape(year)));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} - Faculty Appraisal</title>\
         <link rel=\"stylesheet\" href=\"/public/css/style.css\"></head>\n<body>\n<nav>{nav}</nav>\n\
         <main>\n{notices}\n<h1>{title}</h1>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
        nav = nav,
        notices = notices,
        body = body,
    )
}

fn index(context: &ViewContext) -> String {
    if context.user.is_none() {
        return r#"<p>Welcome. Please <a href="/users/login">log in</a> to record your self-appraisal.</p>"#.to_string();
    }

    let mut html = String::new();
    match context.get("editResult") {
        Some(record) => html.push_str(&format!(
            r#"<form method="post" action="/{id}?_method=PUT"><label>Academic year <input name="academic_year" value="{year}"></label><button type="submit">Update</button></form>"#,
            id = escape(str_at(record, "/id")),
            year = escape(str_at(record, "/body/academic_year")),
        )),
        None => html.push_str(
            r#"<form method="post" action="/"><label>Academic year <input name="academic_year" placeholder="YYYY-YYYY"></label><button type="submit">Select</button></form>"#,
        ),
    }

    if let Some(Value::Array(years)) = context.get("result") {
        html.push_str(r#"<ul class="result">"#);
        for year in years {
            html.push_str(&format!(
                r#"<li>{} <a href="/edit/{}">Edit</a></li>"#,
                escape(str_at(year, "/body/academic_year")),
                escape(str_at(year, "/id")),
            ));
        }
        html.push_str("</ul>");
    }
    html
}

fn annexure(context: &ViewContext) -> Result<(String, String), ViewError> {
    let resource = context
        .get("resource")
        .ok_or_else(|| ViewError::InvalidContext("missing resource".to_string()))?;
    let title = str_at(resource, "/title").to_string();
    let path = str_at(resource, "/path");
    let fields: Vec<&Value> = match resource.get("fields") {
        Some(Value::Array(fields)) => fields.iter().collect(),
        _ => return Err(ViewError::InvalidContext("missing resource fields".to_string())),
    };

    let edit = context.get("editResult");
    let action = match edit {
        Some(record) => format!("{}/{}?_method=PUT", path, str_at(record, "/id")),
        None => path.to_string(),
    };

    let mut html = format!(r#"<form method="post" action="{}">"#, escape(&action));
    for field in &fields {
        let name = str_at(field, "/name");
        let input_type = if str_at(field, "/kind") == "number" { "number\" step=\"any" } else { "text" };
        let value = edit.map(|record| display(record.pointer(&format!("/body/{}", name)))).unwrap_or_default();
        html.push_str(&format!(
            r#"<label>{label} <input type="{input_type}" name="{name}" value="{value}"></label>"#,
            label = escape(str_at(field, "/label")),
            input_type = input_type,
            name = escape(name),
            value = value,
        ));
    }
    html.push_str(&format!(
        r#"<button type="submit">{}</button></form>"#,
        if edit.is_some() { "Update" } else { "Add" }
    ));

    if let Some(Value::Array(rows)) = context.get("result") {
        html.push_str(r#"<table class="result"><tr>"#);
        for field in &fields {
            html.push_str(&format!("<th>{}</th>", escape(str_at(field, "/label"))));
        }
        html.push_str("<th></th></tr>");
        for row in rows {
            html.push_str("<tr>");
            for field in &fields {
                let cell = row.pointer(&format!("/body/{}", str_at(field, "/name")));
                html.push_str(&format!("<td>{}</td>", display(cell)));
            }
            html.push_str(&format!(
                r#"<td><a href="{}/edit/{}">Edit</a></td></tr>"#,
                escape(path),
                escape(str_at(row, "/id")),
            ));
        }
        html.push_str("</table>");
    }

    Ok((title, html))
}

fn login() -> String {
    concat!(
        r#"<form method="post" action="/users/login">"#,
        r#"<label>Email <input type="email" name="email"></label>"#,
        r#"<label>Password <input type="password" name="password"></label>"#,
        r#"<button type="submit">Login</button></form>"#,
    )
    .to_string()
}

fn register(context: &ViewContext) -> String {
    let mut html = String::new();
    if let Some(Value::Array(errors)) = context.get("errors") {
        for e in errors {
            html.push_str(&format!(r#"<div class="alert alert-danger">{}</div>"#, display(Some(e))));
        }
    }
    let form = context.get("form");
    let prefill = |field: &str| form.map(|f| display(f.get(field))).unwrap_or_default();
    html.push_str(&format!(
        concat!(
            r#"<form method="post" action="/users/register">"#,
            r#"<label>Name <input name="name" value="{}"></label>"#,
            r#"<label>Email <input type="email" name="email" value="{}"></label>"#,
            r#"<label>Password <input type="password" name="password"></label>"#,
            r#"<label>Confirm password <input type="password" name="password2"></label>"#,
            r#"<button type="submit">Register</button></form>"#,
        ),
        prefill("name"),
        prefill("email"),
    ));
    html
}
