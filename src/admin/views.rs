//! Admin console markup: the shell, the login page and one body per screen.

use serde::Deserialize;

use super::content::{format_key, SECTIONS};
use super::{
    ContentEditor, Dashboard, MessageFilter, MessagesScreen, NavigationEditor, PagesEditor,
    PortfolioEditor, SettingsEditor, SocialEditor,
};
use crate::db::models::{Category, ContentType, MediaType, Message, Platform, PortfolioItem};
use crate::site::html::escape;

pub const SCREENS: [(&str, &str); 8] = [
    ("/admin", "Dashboard"),
    ("/admin/portfolio", "Portfolio"),
    ("/admin/pages", "Pages"),
    ("/admin/content", "Content"),
    ("/admin/navigation", "Navigation"),
    ("/admin/social-links", "Social Links"),
    ("/admin/messages", "Messages"),
    ("/admin/settings", "Settings"),
];

/// Outcome of the last action, shown above the screen body.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Saved,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMode {
    #[default]
    Signin,
    Signup,
}

impl LoginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginMode::Signin => "signin",
            LoginMode::Signup => "signup",
        }
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="robots" content="noindex">
  <title>{} | IMA Admin</title>
</head>
<body class="admin">
{}
</body>
</html>"#,
        escape(title),
        body
    )
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        "<label><input type=\"checkbox\" name=\"{}\"{}> {}</label>",
        name,
        if checked { " checked" } else { "" },
        label
    )
}

fn button(action: &str, label: &str, testid: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" class=\"inline\"><button type=\"submit\" data-testid=\"{}\">{}</button></form>",
        escape(action),
        escape(testid),
        label
    )
}

fn save_bar(base: &str, dirty: bool) -> String {
    if !dirty {
        return String::new();
    }
    format!(
        "<div class=\"unsaved\" data-testid=\"unsaved-changes\">You have unsaved changes. {}</div>\n",
        button(&format!("{}/save", base), "Save Changes", "save-button")
    )
}

fn delete_panel(base: &str, what: Option<String>) -> String {
    let Some(what) = what else {
        return String::new();
    };
    format!(
        "<div class=\"confirm\" data-testid=\"delete-confirm\">\n  <p>Delete {}? This cannot be undone.</p>\n  {}\n  {}\n</div>\n",
        escape(&what),
        button(&format!("{}/delete/confirm", base), "Delete", "confirm-delete"),
        button(&format!("{}/delete/cancel", base), "Cancel", "cancel-delete")
    )
}

fn options<T: Copy + PartialEq>(all: &[T], selected: T, value: impl Fn(T) -> String, label: impl Fn(T) -> String) -> String {
    all.iter()
        .map(|&v| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                escape(&value(v)),
                if v == selected { " selected" } else { "" },
                escape(&label(v))
            )
        })
        .collect()
}

/// Admin shell: sidebar, notice, body.
pub fn layout(active: &str, email: &str, notice: Option<&Notice>, body: &str) -> String {
    let links: String = SCREENS
        .iter()
        .map(|(href, label)| {
            let class = if *href == active { " class=\"active\"" } else { "" };
            format!("<a href=\"{}\"{}>{}</a>", href, class, label)
        })
        .collect();
    let title = SCREENS
        .iter()
        .find(|(href, _)| *href == active)
        .map(|(_, label)| *label)
        .unwrap_or("Admin");
    let notice = match notice {
        Some(Notice::Saved) => {
            "<div class=\"notice success\" data-testid=\"saved\">Changes saved.</div>\n".to_string()
        }
        Some(Notice::Error(message)) => format!(
            "<div class=\"notice error\" data-testid=\"admin-error\">{}</div>\n",
            escape(message)
        ),
        None => String::new(),
    };
    let body = format!(
        "<aside class=\"sidebar\" data-testid=\"admin-sidebar\">\n  <nav>{}</nav>\n  <p class=\"user\">{}</p>\n  {}\n  <a href=\"/\" target=\"_blank\">View Site</a>\n</aside>\n<main>\n<h1>{}</h1>\n{}{}\n</main>",
        links,
        escape(email),
        button("/admin/logout", "Sign Out", "logout-button"),
        title,
        notice,
        body
    );
    page(title, &body)
}

// ============================================================================
// Login
// ============================================================================

pub fn login(
    mode: LoginMode,
    email: &str,
    error: Option<&str>,
    info: Option<&str>,
    configured: bool,
) -> String {
    let banner = if configured {
        ""
    } else {
        "<div class=\"config-banner\" data-testid=\"config-banner\">Authentication is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY to enable the admin panel.</div>\n"
    };
    let error = error
        .map(|e| format!("<p class=\"error\" data-testid=\"login-error\">{}</p>\n", escape(e)))
        .unwrap_or_default();
    let info = info
        .map(|i| format!("<p class=\"info\" data-testid=\"login-info\">{}</p>\n", escape(i)))
        .unwrap_or_default();
    let (heading, submit, switch) = match mode {
        LoginMode::Signin => (
            "Admin Login",
            "Sign In",
            "<a href=\"/admin/login?mode=signup\">Need an account? Sign up</a>",
        ),
        LoginMode::Signup => (
            "Create Account",
            "Sign Up",
            "<a href=\"/admin/login?mode=signin\">Already have an account? Sign in</a>",
        ),
    };
    let body = format!(
        r#"<main class="login">
<h1>{heading}</h1>
{banner}{error}{info}<form method="post" action="/admin/login" data-testid="login-form">
  <input type="hidden" name="mode" value="{mode}">
  <label>Email<input type="email" name="email" required value="{email}"></label>
  <label>Password<input type="password" name="password" required minlength="6"></label>
  <button type="submit"{disabled} data-testid="login-submit">{submit}</button>
</form>
<p>{switch}</p>
</main>"#,
        heading = heading,
        banner = banner,
        error = error,
        info = info,
        mode = mode.as_str(),
        email = escape(email),
        disabled = if configured { "" } else { " disabled" },
        submit = submit,
        switch = switch,
    );
    page(heading, &body)
}

// ============================================================================
// Screens
// ============================================================================

fn message_row(m: &Message, href: &str) -> String {
    format!(
        "<li class=\"{}\" data-testid=\"message-{}\"><a href=\"{}\"><strong>{}</strong> &lt;{}&gt; {}</a> <time>{}</time></li>",
        if m.is_read { "read" } else { "unread" },
        escape(&m.id),
        escape(href),
        escape(&m.name),
        escape(&m.email),
        escape(m.subject.as_deref().unwrap_or("(no subject)")),
        m.created_at.format("%Y-%m-%d %H:%M")
    )
}

pub fn dashboard(d: &Dashboard) -> String {
    let stats = [
        ("Portfolio Items", d.portfolio_count, "/admin/portfolio"),
        ("Messages", d.message_count, "/admin/messages"),
        ("Unread", d.unread_count, "/admin/messages?filter=unread"),
        ("Leads", d.lead_count, "/admin"),
    ];
    let cards: String = stats
        .iter()
        .map(|(label, count, href)| {
            format!(
                "<a class=\"stat\" href=\"{}\"><span>{}</span> {}</a>",
                href, count, label
            )
        })
        .collect();
    let recent: String = if d.recent.is_empty() {
        "<p>No messages yet.</p>".to_string()
    } else {
        let rows: String = d
            .recent
            .iter()
            .map(|m| message_row(m, "/admin/messages"))
            .collect();
        format!("<ul class=\"messages\">{}</ul>", rows)
    };
    format!(
        "<section class=\"stats\" data-testid=\"dashboard-stats\">{}</section>\n<section>\n<h2>Recent Messages</h2>\n{}\n</section>",
        cards, recent
    )
}

pub fn navigation(editor: &NavigationEditor) -> String {
    const BASE: &str = "/admin/navigation";
    let last = editor.items().len().saturating_sub(1);
    let rows: String = editor
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let base = format!("{}/{}", BASE, item.id);
            let up = if i > 0 {
                button(&format!("{}/move-up", base), "↑", &format!("move-up-{}", item.id))
            } else {
                String::new()
            };
            let down = if i < last {
                button(&format!("{}/move-down", base), "↓", &format!("move-down-{}", item.id))
            } else {
                String::new()
            };
            format!(
                r#"<li data-testid="nav-item-{id}" data-order="{order}">
  <form method="post" action="{base}/edit" class="inline">
    <input type="text" name="label" value="{label}" required>
    <input type="text" name="href" value="{href}" required>
    {visible} {external}
    <button type="submit">Update</button>
  </form>
  {up}{down}{toggle}{delete}
</li>"#,
                id = escape(&item.id),
                order = item.display_order,
                base = escape(&base),
                label = escape(&item.label),
                href = escape(&item.href),
                visible = checkbox("is_visible", "Visible", item.is_visible),
                external = checkbox("is_external", "External", item.is_external),
                up = up,
                down = down,
                toggle = button(
                    &format!("{}/toggle", base),
                    if item.is_visible { "Hide" } else { "Show" },
                    &format!("toggle-{}", item.id)
                ),
                delete = button(&format!("{}/delete", base), "Delete", &format!("delete-{}", item.id)),
            )
        })
        .collect();
    format!(
        r#"{save}{confirm}<ol class="nav-items">{rows}</ol>
<form method="post" action="{BASE}/new" data-testid="nav-create">
  <input type="text" name="label" placeholder="Label" required>
  <input type="text" name="href" placeholder="/path or https://" required>
  {visible} {external}
  <button type="submit">Add Link</button>
</form>"#,
        save = save_bar(BASE, editor.list.is_dirty()),
        confirm = delete_panel(BASE, editor.list.pending_delete().map(|i| i.label.clone())),
        rows = rows,
        BASE = BASE,
        visible = checkbox("is_visible", "Visible", true),
        external = checkbox("is_external", "External", false),
    )
}

pub fn social(editor: &SocialEditor) -> String {
    const BASE: &str = "/admin/social-links";
    let platforms = |selected: Platform| {
        options(
            &Platform::ALL,
            selected,
            |p| p.as_str().to_string(),
            |p| p.display_name(),
        )
    };
    let rows: String = editor
        .items()
        .iter()
        .map(|link| {
            let base = format!("{}/{}", BASE, link.id);
            format!(
                r#"<li data-testid="social-link-{id}">
  <form method="post" action="{base}/edit" class="inline">
    <select name="platform">{platforms}</select>
    <input type="url" name="url" value="{url}" required>
    {visible}
    <button type="submit">Update</button>
  </form>
  {toggle}{delete}
</li>"#,
                id = escape(&link.id),
                base = escape(&base),
                platforms = platforms(link.platform),
                url = escape(&link.url),
                visible = checkbox("is_visible", "Visible", link.is_visible),
                toggle = button(
                    &format!("{}/toggle", base),
                    if link.is_visible { "Hide" } else { "Show" },
                    &format!("toggle-{}", link.id)
                ),
                delete = button(&format!("{}/delete", base), "Delete", &format!("delete-{}", link.id)),
            )
        })
        .collect();
    format!(
        r#"{save}{confirm}<ul class="social-links">{rows}</ul>
<form method="post" action="{BASE}/new" data-testid="social-create">
  <select name="platform">{platforms}</select>
  <input type="url" name="url" placeholder="https://" required>
  {visible}
  <button type="submit">Add Link</button>
</form>"#,
        save = save_bar(BASE, editor.list.is_dirty()),
        confirm = delete_panel(
            BASE,
            editor.list.pending_delete().map(|l| l.platform.display_name())
        ),
        rows = rows,
        BASE = BASE,
        platforms = platforms(Platform::Instagram),
        visible = checkbox("is_visible", "Visible", true),
    )
}

fn portfolio_fields(item: Option<&PortfolioItem>) -> String {
    let category = item.map_or(Category::Graphics, |i| i.category);
    let media_type = item.map_or(MediaType::Image, |i| i.media_type);
    format!(
        r#"  <input type="text" name="title" placeholder="Title" value="{title}" required>
  <select name="category">{categories}</select>
  <textarea name="description" placeholder="Description" required>{description}</textarea>
  <input type="text" name="tools_used" placeholder="Tools, comma separated" value="{tools}">
  <select name="media_type">{media_types}</select>
  <input type="url" name="media_url" placeholder="Media URL" value="{media_url}">
  <input type="url" name="thumbnail_url" placeholder="Thumbnail URL" value="{thumbnail_url}">
  {featured} {published}"#,
        title = escape(item.map_or("", |i| i.title.as_str())),
        categories = options(
            &Category::ALL,
            category,
            |c| c.as_str().to_string(),
            |c| c.label().to_string()
        ),
        description = escape(item.map_or("", |i| i.description.as_str())),
        tools = escape(&item.map(|i| i.tools_used.join(", ")).unwrap_or_default()),
        media_types = options(
            &MediaType::ALL,
            media_type,
            |m| m.as_str().to_string(),
            |m| m.as_str().to_string()
        ),
        media_url = escape(item.and_then(|i| i.media_url.as_deref()).unwrap_or_default()),
        thumbnail_url = escape(item.and_then(|i| i.thumbnail_url.as_deref()).unwrap_or_default()),
        featured = checkbox("is_featured", "Featured", item.is_some_and(|i| i.is_featured)),
        published = checkbox("is_published", "Published", item.map_or(true, |i| i.is_published)),
    )
}

pub fn portfolio(editor: &PortfolioEditor) -> String {
    const BASE: &str = "/admin/portfolio";
    let rows: String = if editor.items().is_empty() {
        "<li>No portfolio items yet.</li>".to_string()
    } else {
        editor
            .items()
            .iter()
            .map(|item| {
                let base = format!("{}/{}", BASE, item.id);
                let mut markers = String::new();
                if item.is_featured {
                    markers.push_str(" <span class=\"badge featured\">Featured</span>");
                }
                if !item.is_published {
                    markers.push_str(" <span class=\"badge draft\">Draft</span>");
                }
                format!(
                    r#"<li data-testid="portfolio-item-{id}">
  <strong>{title}</strong> <em>{category}</em>{markers}
  <details><summary>Edit</summary>
  <form method="post" action="{base}/edit">
{fields}
  <button type="submit">Update</button>
  </form>
  </details>
  {delete}
</li>"#,
                    id = escape(&item.id),
                    title = escape(&item.title),
                    category = item.category.label(),
                    markers = markers,
                    base = escape(&base),
                    fields = portfolio_fields(Some(item)),
                    delete = button(&format!("{}/delete", base), "Delete", &format!("delete-{}", item.id)),
                )
            })
            .collect()
    };
    format!(
        r#"{save}{confirm}<details><summary>Add Item</summary>
<form method="post" action="{BASE}/new" data-testid="portfolio-create">
{fields}
  <button type="submit">Create</button>
</form>
</details>
<ul class="portfolio-items">{rows}</ul>"#,
        save = save_bar(BASE, editor.list.is_dirty()),
        confirm = delete_panel(BASE, editor.list.pending_delete().map(|i| i.title.clone())),
        BASE = BASE,
        fields = portfolio_fields(None),
        rows = rows,
    )
}

fn content_types(selected: ContentType) -> String {
    options(
        &[ContentType::Text, ContentType::Html, ContentType::ImageUrl],
        selected,
        |t| match t {
            ContentType::Text => "text".to_string(),
            ContentType::Html => "html".to_string(),
            ContentType::ImageUrl => "image_url".to_string(),
        },
        |t| match t {
            ContentType::Text => "Text".to_string(),
            ContentType::Html => "HTML".to_string(),
            ContentType::ImageUrl => "Image URL".to_string(),
        },
    )
}

pub fn content(editor: &ContentEditor) -> String {
    const BASE: &str = "/admin/content";
    let groups: String = editor
        .grouped()
        .into_iter()
        .filter(|(title, blocks)| !blocks.is_empty() || SECTIONS.iter().any(|(_, t)| t == title))
        .map(|(title, blocks)| {
            let rows: String = blocks
                .iter()
                .map(|block| {
                    let base = format!("{}/{}", BASE, block.key);
                    format!(
                        r#"<li data-testid="content-{key}">
  <form method="post" action="{base}/edit">
    <label>{label} <code>{key}</code>
    <textarea name="value" rows="2">{value}</textarea></label>
    <select name="type">{types}</select>
    <button type="submit">Update</button>
  </form>
  {delete}
</li>"#,
                        key = escape(&block.key),
                        base = escape(&base),
                        label = escape(&format_key(&block.key)),
                        value = escape(&block.value),
                        types = content_types(block.content_type),
                        delete = button(&format!("{}/delete", base), "Delete", &format!("delete-{}", block.key)),
                    )
                })
                .collect();
            format!("<section>\n<h2>{}</h2>\n<ul>{}</ul>\n</section>\n", title, rows)
        })
        .collect();
    format!(
        r#"{save}{confirm}{groups}<form method="post" action="{BASE}/new" data-testid="content-create">
  <input type="text" name="key" placeholder="section_key" required>
  <textarea name="value" placeholder="Value" required></textarea>
  <select name="type">{types}</select>
  <button type="submit">Add Block</button>
</form>"#,
        save = save_bar(BASE, editor.list.is_dirty()),
        confirm = delete_panel(BASE, editor.list.pending_delete().map(|b| b.key.clone())),
        groups = groups,
        BASE = BASE,
        types = content_types(ContentType::Text),
    )
}

pub fn messages(screen: &MessagesScreen) -> String {
    const BASE: &str = "/admin/messages";
    let filters: String = [MessageFilter::All, MessageFilter::Unread]
        .iter()
        .map(|f| {
            let (label, count) = match f {
                MessageFilter::All => ("All", screen.all().len()),
                MessageFilter::Unread => ("Unread", screen.unread_count()),
            };
            format!(
                "<a href=\"{}?filter={}\"{}>{} ({})</a>",
                BASE,
                f.as_str(),
                if *f == screen.filter { " class=\"active\"" } else { "" },
                label,
                count
            )
        })
        .collect();
    let visible = screen.visible();
    let list = if visible.is_empty() {
        "<p>No messages.</p>".to_string()
    } else {
        let rows: String = visible
            .iter()
            .map(|m| {
                format!(
                    "{}{}",
                    message_row(m, &format!("{}?filter={}", BASE, screen.filter.as_str())),
                    button(&format!("{}/{}/select", BASE, m.id), "Open", &format!("open-{}", m.id))
                )
            })
            .collect();
        format!("<ul class=\"messages\">{}</ul>", rows)
    };
    let detail = screen
        .selected()
        .map(|m| {
            format!(
                r#"<article class="message-detail" data-testid="message-detail">
  <h2>{subject}</h2>
  <p>From {name} &lt;<a href="mailto:{email}">{email}</a>&gt;{newsletter}</p>
  <pre>{body}</pre>
  {close}{delete}
</article>"#,
                subject = escape(m.subject.as_deref().unwrap_or("(no subject)")),
                name = escape(&m.name),
                email = escape(&m.email),
                newsletter = if m.subscribe_newsletter {
                    " <span class=\"badge\">Newsletter</span>"
                } else {
                    ""
                },
                body = escape(&m.message),
                close = button(&format!("{}/close", BASE), "Close", "close-message"),
                delete = button(&format!("{}/{}/delete", BASE, m.id), "Delete", &format!("delete-{}", m.id)),
            )
        })
        .unwrap_or_default();
    format!(
        "{}<nav class=\"filters\" data-testid=\"message-filters\">{}</nav>\n{}\n{}",
        delete_panel(
            BASE,
            screen
                .pending_delete()
                .map(|m| format!("the message from {}", m.name))
        ),
        filters,
        list,
        detail
    )
}

pub fn settings(editor: &SettingsEditor) -> String {
    let s = &editor.settings;
    format!(
        r##"<form method="post" action="/admin/settings/save" data-testid="settings-form">
  <label>Site Name<input type="text" name="site_name" value="{name}" required></label>
  <label>Logo URL<input type="url" name="logo_url" value="{logo}"></label>
  <label>Favicon URL<input type="url" name="favicon_url" value="{favicon}"></label>
  <label>Primary Color<input type="text" name="primary_color" value="{color}" pattern="#[0-9A-Fa-f]{{3,6}}"></label>
  <label>Footer Text<input type="text" name="footer_text" value="{footer}"></label>
  <button type="submit" data-testid="save-button">Save Settings</button>
</form>"##,
        name = escape(&s.site_name),
        logo = escape(s.logo_url.as_deref().unwrap_or_default()),
        favicon = escape(s.favicon_url.as_deref().unwrap_or_default()),
        color = escape(&s.primary_color),
        footer = escape(s.footer_text.as_deref().unwrap_or_default()),
    )
}

pub fn pages(editor: &PagesEditor) -> String {
    const BASE: &str = "/admin/pages";
    let rows: String = editor
        .items()
        .iter()
        .map(|p| {
            format!(
                r#"<li data-testid="page-{slug}">
  <form method="post" action="{BASE}/{slug}/edit">
    <code>/{slug}</code>
    <label>Title<input type="text" name="title" value="{title}" required></label>
    <label>Meta Title<input type="text" name="meta_title" value="{meta_title}"></label>
    <label>Meta Description<textarea name="meta_description" rows="2">{meta_description}</textarea></label>
    <button type="submit">Update</button>
  </form>
</li>"#,
                slug = escape(&p.slug),
                BASE = BASE,
                title = escape(&p.title),
                meta_title = escape(p.meta_title.as_deref().unwrap_or_default()),
                meta_description = escape(p.meta_description.as_deref().unwrap_or_default()),
            )
        })
        .collect();
    format!(
        "{}<ul class=\"pages\">{}</ul>",
        save_bar(BASE, editor.list.is_dirty()),
        rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;

    #[test]
    fn test_layout_marks_active_screen() {
        let html = layout("/admin/messages", "admin@example.com", Some(&Notice::Saved), "");
        assert!(html.contains("<a href=\"/admin/messages\" class=\"active\">Messages</a>"));
        assert!(html.contains("<title>Messages | IMA Admin</title>"));
        assert!(html.contains("data-testid=\"saved\""));
        assert!(html.contains("action=\"/admin/logout\""));
    }

    #[test]
    fn test_login_unconfigured_disables_submit() {
        let html = login(LoginMode::Signin, "", None, None, false);
        assert!(html.contains("config-banner"));
        assert!(html.contains("<button type=\"submit\" disabled"));
    }

    #[test]
    fn test_login_shows_raw_error() {
        let html = login(
            LoginMode::Signup,
            "a@b.co",
            Some("Invalid login credentials"),
            None,
            true,
        );
        assert!(html.contains("Invalid login credentials"));
        assert!(html.contains("value=\"signup\""));
        assert!(html.contains("value=\"a@b.co\""));
    }

    #[test]
    fn test_navigation_hides_edge_moves() {
        let html = navigation(&NavigationEditor::new(fixtures::navigation()));
        assert!(!html.contains("move-up-1\""));
        assert!(html.contains("move-down-1\""));
        assert!(html.contains("move-up-5\""));
        assert!(!html.contains("move-down-5\""));
        assert!(!html.contains("unsaved-changes"));
    }

    #[test]
    fn test_pending_delete_shows_confirmation() {
        let mut editor = PortfolioEditor::new(fixtures::portfolio());
        editor.list.request_delete("1");
        let html = portfolio(&editor);
        assert!(html.contains("data-testid=\"delete-confirm\""));
        assert!(html.contains("/admin/portfolio/delete/confirm"));
    }

    #[test]
    fn test_settings_form_keeps_color_pattern() {
        let html = settings(&SettingsEditor::new(crate::db::models::SiteSettings::default()));
        assert!(html.contains("pattern=\"#[0-9A-Fa-f]{3,6}\""));
        assert!(html.contains("value=\"#E10600\""));
        assert!(html.ends_with("</form>"));
    }

    #[test]
    fn test_messages_filter_counts() {
        let html = messages(&MessagesScreen::new(fixtures::messages()));
        assert!(html.contains("All (3)"));
        assert!(html.contains("Unread (1)"));
    }
}
