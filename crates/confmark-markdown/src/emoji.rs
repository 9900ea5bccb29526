//! Emoji rendering.

use confmark_adf::Emoji;

/// CDN serving platform emoji images.
const EMOJI_CDN: &str = "https://pf-emoji-service--cdn.us-east-1.prod.public.atl-paas.net/atlassian";

/// Id prefix of platform-specific emoji.
const PLATFORM_PREFIX: &str = "atlassian-";

/// Render an emoji as Unicode text, a CDN image, or its short name.
pub(crate) fn render_emoji(emoji: &Emoji) -> String {
    if let Some(id) = emoji.id.as_deref() {
        if let Some(text) = code_points(id) {
            return text;
        }
        if let Some(name) = id.strip_prefix(PLATFORM_PREFIX) {
            return format!("![{}]({EMOJI_CDN}/{name}_64.png)", emoji.short_name);
        }
    }

    if emoji.short_name.is_empty() {
        emoji.text.clone().unwrap_or_default()
    } else {
        emoji.short_name.clone()
    }
}

/// Decode `1f600` or `1f469-200d-1f4bb` style ids.
fn code_points(id: &str) -> Option<String> {
    id.split('-')
        .map(|part| {
            if !(4..=6).contains(&part.len()) {
                return None;
            }
            u32::from_str_radix(part, 16).ok().and_then(char::from_u32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emoji(short_name: &str, id: Option<&str>) -> Emoji {
        Emoji {
            short_name: short_name.to_owned(),
            id: id.map(str::to_owned),
            text: None,
        }
    }

    #[test]
    fn test_standard_emoji() {
        assert_eq!(render_emoji(&emoji(":grinning:", Some("1f600"))), "😀");
        assert_eq!(render_emoji(&emoji(":heart:", Some("2764"))), "❤");
    }

    #[test]
    fn test_zwj_sequence() {
        assert_eq!(
            render_emoji(&emoji(":woman_technologist:", Some("1f469-200d-1f4bb"))),
            "👩\u{200d}💻"
        );
    }

    #[test]
    fn test_platform_emoji_uses_cdn() {
        assert_eq!(
            render_emoji(&emoji(":check_mark:", Some("atlassian-check_mark"))),
            format!("![:check_mark:]({EMOJI_CDN}/check_mark_64.png)")
        );
    }

    #[test]
    fn test_custom_emoji_falls_back_to_short_name() {
        let uuid = "8f3c2a10-1b2c-4d5e-9f00-123456789abc";
        assert_eq!(render_emoji(&emoji(":party-parrot:", Some(uuid))), ":party-parrot:");
        assert_eq!(render_emoji(&emoji(":wave:", None)), ":wave:");
    }

    #[test]
    fn test_empty_short_name_uses_text() {
        let emoji = Emoji {
            short_name: String::new(),
            id: None,
            text: Some("🙂".to_owned()),
        };
        assert_eq!(render_emoji(&emoji), "🙂");
    }
}
