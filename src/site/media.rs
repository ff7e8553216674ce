//! Resolve a portfolio item's media URL into something the card can play.

use regex::Regex;

use crate::db::models::MediaType;

lazy_static::lazy_static! {
    static ref YOUTUBE_ID: Regex =
        Regex::new(r"(?:youtube\.com/(?:watch\?v=|embed/|shorts/)|youtu\.be/)([a-zA-Z0-9_-]+)").unwrap();
    static ref INSTAGRAM_ID: Regex =
        Regex::new(r"instagram\.com/(?:p|reel)/([a-zA-Z0-9_-]+)").unwrap();
    static ref TIKTOK_ID: Regex =
        Regex::new(r"tiktok\.com/@[\w.-]+/video/(\d+)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    /// Player URL for an inline iframe
    Frame { src: String, vertical: bool },
    /// Shown as a link to the original post
    External { href: String, label: &'static str },
}

fn capture(re: &Regex, url: &str) -> Option<String> {
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Embeddable reference for `url` under `media_type`, or `None` when the URL
/// does not match the platform's known shapes. Images never embed.
pub fn resolve(media_type: MediaType, url: &str) -> Option<Embed> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match media_type {
        MediaType::Image => None,
        MediaType::Youtube => capture(&YOUTUBE_ID, url).map(|id| Embed::Frame {
            src: format!("https://www.youtube.com/embed/{}", id),
            vertical: false,
        }),
        MediaType::Instagram => capture(&INSTAGRAM_ID, url).map(|id| Embed::Frame {
            src: format!("https://www.instagram.com/p/{}/embed", id),
            vertical: true,
        }),
        MediaType::Tiktok => capture(&TIKTOK_ID, url).map(|id| Embed::Frame {
            src: format!("https://www.tiktok.com/embed/v2/{}", id),
            vertical: true,
        }),
        MediaType::Twitter => Some(Embed::External {
            href: url.to_string(),
            label: "View on X/Twitter",
        }),
    }
}

/// Whether a card should offer a play control.
pub fn is_playable(media_type: MediaType, url: Option<&str>) -> bool {
    url.and_then(|u| resolve(media_type, u)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_src(media_type: MediaType, url: &str) -> Option<String> {
        match resolve(media_type, url) {
            Some(Embed::Frame { src, .. }) => Some(src),
            _ => None,
        }
    }

    #[test]
    fn test_youtube_url_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
        ] {
            assert_eq!(
                frame_src(MediaType::Youtube, url).as_deref(),
                Some("https://www.youtube.com/embed/dQw4w9WgXcQ"),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_instagram_post_and_reel() {
        assert_eq!(
            frame_src(MediaType::Instagram, "https://www.instagram.com/reel/Cx1_ab-9/").as_deref(),
            Some("https://www.instagram.com/p/Cx1_ab-9/embed")
        );
        assert!(frame_src(MediaType::Instagram, "https://www.instagram.com/ima/").is_none());
    }

    #[test]
    fn test_tiktok_video_path() {
        assert_eq!(
            frame_src(
                MediaType::Tiktok,
                "https://www.tiktok.com/@ima.studio/video/7234567890123456789"
            )
            .as_deref(),
            Some("https://www.tiktok.com/embed/v2/7234567890123456789")
        );
    }

    #[test]
    fn test_twitter_is_always_a_link() {
        let embed = resolve(MediaType::Twitter, "https://x.com/ima/status/1").unwrap();
        assert!(matches!(embed, Embed::External { .. }));
    }

    #[test]
    fn test_unmatched_urls_yield_nothing() {
        assert!(resolve(MediaType::Youtube, "https://vimeo.com/12345").is_none());
        assert!(resolve(MediaType::Image, "https://example.com/a.png").is_none());
        assert!(!is_playable(MediaType::Youtube, None));
        assert!(!is_playable(MediaType::Tiktok, Some("  ")));
    }
}
