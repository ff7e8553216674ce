//! The five public pages.

use super::html::{block, escape, layout};
use super::media::{self, Embed};
use super::{in_category, SiteData};
use crate::contact::{ContactForm, FormState};
use crate::db::models::{Category, PortfolioItem};

struct Service {
    id: &'static str,
    title: &'static str,
    summary: &'static str,
    description: &'static str,
    features: [&'static str; 6],
}

const SERVICES: [Service; 4] = [
    Service {
        id: "graphics",
        title: "Graphic Design",
        summary: "Brand identity, logos, marketing materials, and visual content that captures your essence.",
        description: "We create stunning visual assets that capture your brand essence and communicate your message effectively.",
        features: [
            "Brand Identity & Logo Design",
            "Marketing Materials & Brochures",
            "Social Media Graphics",
            "Packaging Design",
            "UI/UX Design",
            "Print & Digital Advertising",
        ],
    },
    Service {
        id: "video",
        title: "Video Editing",
        summary: "Professional video production, motion graphics, and post-production services.",
        description: "Professional video production and post-production services to bring your stories to life.",
        features: [
            "Commercial & Promotional Videos",
            "Social Media Content",
            "Motion Graphics & Animation",
            "Color Grading & Correction",
            "Documentary & Corporate Films",
            "YouTube & Podcast Production",
        ],
    },
    Service {
        id: "social",
        title: "Social Media Management",
        summary: "Strategy, content creation, and management to grow your online presence.",
        description: "Strategic social media services to grow your audience and strengthen your online presence.",
        features: [
            "Social Media Strategy",
            "Content Planning & Calendar",
            "Community Management",
            "Influencer Partnerships",
            "Analytics & Reporting",
            "Paid Social Advertising",
        ],
    },
    Service {
        id: "ai",
        title: "AI Automation",
        summary: "Intelligent workflows and automation solutions to scale your operations.",
        description: "Intelligent automation solutions to streamline your workflows and scale your operations.",
        features: [
            "Workflow Automation",
            "AI Content Generation",
            "Chatbot Development",
            "Data Analysis & Insights",
            "Process Optimization",
            "Custom AI Integrations",
        ],
    },
];

const VALUES: [(&str, &str); 3] = [
    (
        "Boldness",
        "We push creative boundaries and embrace innovative approaches to deliver standout work.",
    ),
    (
        "Precision",
        "Every pixel, frame, and line of code is crafted with meticulous attention to detail.",
    ),
    (
        "Future-Forward",
        "We stay ahead of trends and technology to ensure your brand remains relevant.",
    ),
];

// ============================================================================
// Cards
// ============================================================================

fn thumbnail(item: &PortfolioItem) -> String {
    item.thumbnail_url
        .as_deref()
        .map(|url| {
            format!(
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                escape(url),
                escape(&item.title)
            )
        })
        .unwrap_or_default()
}

fn tools(item: &PortfolioItem) -> String {
    if item.tools_used.is_empty() {
        return String::new();
    }
    let tags: String = item
        .tools_used
        .iter()
        .map(|t| format!("<li>{}</li>", escape(t)))
        .collect();
    format!("<ul class=\"tools\">{}</ul>", tags)
}

fn media(item: &PortfolioItem, playing: bool, category: Option<Category>) -> String {
    let embed = item
        .media_url
        .as_deref()
        .and_then(|url| media::resolve(item.media_type, url));

    match embed {
        Some(Embed::Frame { src, vertical }) if playing => format!(
            "<div class=\"player{}\"><iframe src=\"{}\" title=\"{}\" allow=\"autoplay; encrypted-media\" allowfullscreen></iframe></div>",
            if vertical { " vertical" } else { "" },
            escape(&src),
            escape(&item.title)
        ),
        Some(Embed::Frame { .. }) => {
            let mut href = format!("/portfolio?play={}", escape(&item.id));
            if let Some(c) = category {
                href.push_str(&format!("&amp;category={}", c.as_str()));
            }
            format!(
                "<div class=\"thumb\">{}<a class=\"play\" href=\"{}\" data-testid=\"play-{}\">Play</a></div>",
                thumbnail(item),
                href,
                escape(&item.id)
            )
        }
        Some(Embed::External { href, label }) => format!(
            "<div class=\"thumb\">{}<a class=\"external\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></div>",
            thumbnail(item),
            escape(&href),
            label
        ),
        None => format!("<div class=\"thumb\">{}</div>", thumbnail(item)),
    }
}

fn portfolio_card(item: &PortfolioItem, playing: bool, category: Option<Category>) -> String {
    format!(
        "<article class=\"card\" data-testid=\"portfolio-item-{id}\">\n  {media}\n  <span class=\"category\">{label}</span>\n  <h3>{title}</h3>\n  <p>{description}</p>\n  {tools}\n</article>",
        id = escape(&item.id),
        media = media(item, playing, category),
        label = item.category.label(),
        title = escape(&item.title),
        description = escape(&item.description),
        tools = tools(item),
    )
}

/// Playable featured work links into the portfolio player.
fn featured_card(item: &PortfolioItem) -> String {
    let id = escape(&item.id);
    let play = if media::is_playable(item.media_type, item.media_url.as_deref()) {
        format!(
            "<a class=\"play\" href=\"/portfolio?play={}\" data-testid=\"featured-play-{}\">Play</a>",
            id, id
        )
    } else {
        String::new()
    };
    format!(
        "<article class=\"card\" data-testid=\"featured-item-{}\">\n  <div class=\"thumb\">{}{}</div>\n  <span class=\"category\">{}</span>\n  <h3>{}</h3>\n  <p>{}</p>\n</article>",
        id,
        thumbnail(item),
        play,
        item.category.label(),
        escape(&item.title),
        escape(&item.description)
    )
}

// ============================================================================
// Pages
// ============================================================================

pub fn home(site: &SiteData) -> String {
    let c = &site.content;
    let services: String = SERVICES
        .iter()
        .map(|s| {
            format!(
                "<a class=\"service\" href=\"/services#{}\"><h3>{}</h3><p>{}</p></a>",
                s.id, s.title, escape(s.summary)
            )
        })
        .collect();
    let featured: String = site.featured().into_iter().map(featured_card).collect();

    let body = format!(
        r#"<section class="hero" data-testid="hero-section">
  <h1>{hero_title}</h1>
  <p>{hero_subtitle}</p>
  <a href="/portfolio" class="button" data-testid="hero-cta-primary">{hero_cta}</a>
  <a href="/contact" class="button secondary">Get in Touch</a>
</section>
<section class="services" data-testid="services-section">
  <h2>{services_title}</h2>
  <div class="grid">{services}</div>
</section>
<section class="featured" data-testid="featured-work-section">
  <h2>{featured_title}</h2>
  <a href="/portfolio">View All Work</a>
  <div class="grid">{featured}</div>
</section>
<section class="cta" data-testid="cta-section">
  <h2>{contact_title}</h2>
  <p>{contact_subtitle}</p>
  <a href="/contact" class="button">Start a Project</a>
</section>"#,
        hero_title = block(c, "hero_title"),
        hero_subtitle = block(c, "hero_subtitle"),
        hero_cta = block(c, "hero_cta"),
        services_title = block(c, "services_title"),
        services = services,
        featured_title = block(c, "featured_title"),
        featured = featured,
        contact_title = block(c, "contact_title"),
        contact_subtitle = block(c, "contact_subtitle"),
    );
    layout(site, &site.head("home"), "/", &body)
}

/// Portfolio grid. `category` narrows the list, `play` opens one card's player.
pub fn portfolio(site: &SiteData, category: Option<Category>, play: Option<&str>) -> String {
    let c = &site.content;
    let mut filters = format!(
        "<a href=\"/portfolio\"{}>All</a>",
        if category.is_none() { " class=\"active\"" } else { "" }
    );
    for cat in Category::ALL {
        filters.push_str(&format!(
            "<a href=\"/portfolio?category={}\"{}>{}</a>",
            cat.as_str(),
            if category == Some(cat) { " class=\"active\"" } else { "" },
            cat.label()
        ));
    }

    let items = in_category(&site.portfolio, category);
    let grid = if items.is_empty() {
        "<p class=\"empty\">No projects found in this category.</p>".to_string()
    } else {
        items
            .into_iter()
            .map(|item| portfolio_card(item, play == Some(item.id.as_str()), category))
            .collect()
    };

    let body = format!(
        "<section class=\"page-header\">\n  <h1>{}</h1>\n  <p>{}</p>\n</section>\n<nav class=\"filters\" data-testid=\"portfolio-filters\">{}</nav>\n<section class=\"grid\" data-testid=\"portfolio-grid\">{}</section>",
        block(c, "portfolio_title"),
        block(c, "portfolio_subtitle"),
        filters,
        grid
    );
    layout(site, &site.head("portfolio"), "/portfolio", &body)
}

pub fn services(site: &SiteData) -> String {
    let c = &site.content;
    let sections: String = SERVICES
        .iter()
        .map(|s| {
            let features: String = s
                .features
                .iter()
                .map(|f| format!("<li>{}</li>", escape(f)))
                .collect();
            format!(
                "<section id=\"{}\" class=\"service-detail\">\n  <h2>{}</h2>\n  <p>{}</p>\n  <ul>{}</ul>\n</section>",
                s.id,
                s.title,
                escape(s.description),
                features
            )
        })
        .collect();
    let body = format!(
        "<section class=\"page-header\">\n  <h1>{}</h1>\n  <p>{}</p>\n</section>\n{}\n<section class=\"cta\">\n  <h2>{}</h2>\n  <a href=\"/contact\" class=\"button\">Start a Project</a>\n</section>",
        block(c, "services_title"),
        block(c, "services_subtitle"),
        sections,
        block(c, "contact_title")
    );
    layout(site, &site.head("services"), "/services", &body)
}

pub fn about(site: &SiteData) -> String {
    let c = &site.content;
    let values: String = VALUES
        .iter()
        .map(|(title, text)| format!("<div class=\"value\"><h3>{}</h3><p>{}</p></div>", title, text))
        .collect();
    let body = format!(
        r#"<section class="page-header">
  <h1>{about_title}</h1>
  <p>{about_text}</p>
</section>
<section class="story">
  <h2>Our Story</h2>
  <p>IMA was founded with a simple mission: to bridge the gap between creative vision and technical execution. What started as a personal passion for design and technology has evolved into a comprehensive creative studio.</p>
  <p>Today, we work with businesses of all sizes, from startups to established brands, helping them tell their stories through compelling visuals, engaging content, and innovative solutions.</p>
</section>
<section class="values">
  <h2>Our Values</h2>
  <div class="grid">{values}</div>
</section>"#,
        about_title = block(c, "about_title"),
        about_text = block(c, "about_text"),
        values = values,
    );
    layout(site, &site.head("about"), "/about", &body)
}

fn contact_form(form: &ContactForm, configured: bool) -> String {
    if form.state == FormState::Submitted {
        return "<div class=\"submitted\" data-testid=\"contact-success\">\n  <h3>Message Sent!</h3>\n  <p>Thank you for reaching out. We will get back to you soon.</p>\n  <a href=\"/contact\">Send another message</a>\n</div>".to_string();
    }

    let banner = if configured {
        String::new()
    } else {
        "<div class=\"banner warning\" data-testid=\"config-banner\">The contact form is not connected to a backend yet. Messages cannot be sent.</div>\n".to_string()
    };
    let error = form
        .error()
        .map(|e| format!("<p class=\"error\" data-testid=\"contact-error\">{}</p>\n", escape(e)))
        .unwrap_or_default();
    let v = &form.values;
    let disabled = if configured && form.state != FormState::Submitting {
        ""
    } else {
        " disabled"
    };

    format!(
        r#"{banner}<form method="post" action="/contact" data-testid="contact-form">
{error}  <label>Name *<input type="text" name="name" required value="{name}"></label>
  <label>Email *<input type="email" name="email" required value="{email}"></label>
  <label>Subject<input type="text" name="subject" value="{subject}"></label>
  <label>Message *<textarea name="message" required rows="5">{message}</textarea></label>
  <label><input type="checkbox" name="subscribe_newsletter"{checked}> Subscribe to our newsletter</label>
  <button type="submit"{disabled}>Send Message</button>
</form>"#,
        banner = banner,
        error = error,
        name = escape(&v.name),
        email = escape(&v.email),
        subject = escape(&v.subject),
        message = escape(&v.message),
        checked = if v.subscribes() { " checked" } else { "" },
        disabled = disabled,
    )
}

pub fn contact(site: &SiteData, form: &ContactForm, configured: bool) -> String {
    let c = &site.content;
    let body = format!(
        "<section class=\"page-header\">\n  <h1>{}</h1>\n  <p>{}</p>\n</section>\n<section class=\"contact\">\n  <aside>\n    <p>{}</p>\n    <p>{}</p>\n  </aside>\n  {}\n</section>",
        block(c, "contact_title"),
        block(c, "contact_subtitle"),
        block(c, "contact_email"),
        block(c, "contact_location"),
        contact_form(form, configured)
    );
    layout(site, &site.head("contact"), "/contact", &body)
}
