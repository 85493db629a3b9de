//! Page rendering for the server-side UI.
//!
//! Every page goes through [`layout`], and every interpolated value goes
//! through [`escape`]. Page metadata travels in a per-request
//! [`PageContext`] value, never in shared state.

use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

use crate::users::repo::{User, UserSummary};

/// Format used both for `<input type="date">` values and for parsing them.
pub const DATE_FMT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Per-request page metadata handed to the layout.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
}

impl PageContext {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Minimal HTML entity escaping for text and attribute positions.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_date(date: Date) -> String {
    date.format(DATE_FMT).unwrap_or_default()
}

pub fn layout(ctx: &PageContext, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
nav a {{ margin-right: 1rem; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ccc; padding: 0.3rem 0.6rem; }}
</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/user/list">Users</a><a href="/user/add">Add user</a><a href="/about">About</a></nav>
{body}
</body>
</html>
"#,
        title = escape(&ctx.title),
        body = body,
    )
}

pub fn home_page(ctx: &PageContext) -> String {
    let body = "<h1>Home</h1>\n<p>A small user directory.</p>\n\
        <ul>\n<li><a href=\"/user/list\">Browse users</a></li>\n\
        <li><a href=\"/user/add\">Add a user</a></li>\n</ul>";
    layout(ctx, body)
}

pub fn hello_page(ctx: &PageContext, name: &str) -> String {
    let body = format!("<h1>Hello {}</h1>", escape(name));
    layout(ctx, &body)
}

/// The add and edit screens share one form. A `Some(user)` pre-fills the
/// fields and retargets the form at the edit route with a hidden id.
pub fn user_form_page(ctx: &PageContext, user: Option<&User>) -> String {
    let (action, id_field) = match user {
        Some(u) => (
            "/user/edit",
            format!("<input type=\"hidden\" name=\"id\" value=\"{}\">", u.id),
        ),
        None => ("/user/add", String::new()),
    };
    let name = user.map(|u| escape(&u.name)).unwrap_or_default();
    let age = user
        .and_then(|u| u.age)
        .map(|a| a.to_string())
        .unwrap_or_default();
    let dob = user.and_then(|u| u.dob).map(format_date).unwrap_or_default();
    let joined = user
        .map(|u| format!("<p>Joined {}</p>\n", format_date(u.doj.date())))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>{heading}</h1>
{joined}<form method="post" action="{action}" enctype="multipart/form-data">
  {id_field}
  <p><label>Name <input type="text" name="name" value="{name}"></label></p>
  <p><label>Age <input type="number" name="age" value="{age}"></label></p>
  <p><label>Date of birth <input type="date" name="dob" value="{dob}"></label></p>
  <p><label>Profile image <input type="file" name="image"></label></p>
  <p><button type="submit">Save</button></p>
</form>"#,
        heading = escape(&ctx.title),
    );
    layout(ctx, &body)
}

pub fn user_list_page(ctx: &PageContext, users: &[UserSummary]) -> String {
    let mut rows = String::new();
    for u in users {
        let age = u.age.map(|a| a.to_string()).unwrap_or_default();
        let profile = match &u.profile {
            Some(p) => format!(
                "<img src=\"/uploads/{0}\" alt=\"{0}\" width=\"48\">",
                escape(p)
            ),
            None => String::new(),
        };
        rows.push_str(&format!(
            "<tr><td>{id}</td><td>{name}</td><td>{age}</td><td>{profile}</td>\
            <td><a href=\"/user/add/{id}\">Edit</a></td>\
            <td><a href=\"/user/delete/{id}\">Delete</a></td></tr>\n",
            id = u.id,
            name = escape(&u.name),
        ));
    }
    let body = format!(
        "<h1>{heading}</h1>\n<table>\n\
        <tr><th>Id</th><th>Name</th><th>Age</th><th>Profile</th><th></th><th></th></tr>\n\
        {rows}</table>\n<p><a href=\"/user/add\">Add user</a></p>",
        heading = escape(&ctx.title),
    );
    layout(ctx, &body)
}

pub fn not_found_page() -> String {
    let ctx = PageContext::new("Not Found");
    layout(&ctx, "<h1>Not Found</h1>")
}

pub fn error_page(message: &str) -> String {
    let ctx = PageContext::new("Server Error");
    let body = format!(
        "<h1>Server Error</h1>\n<p>Error Message: <b>{}</b></p>",
        escape(message)
    );
    layout(&ctx, &body)
}
