//! Turns a neighbourhood search result into carousels.

use cafehunter_core::config::ResponseConfig;
use cafehunter_core::types::{Cafe, Coordinate};

use crate::error::ChatError;
use crate::messages;
use crate::outbound::{Card, Outbound, MAX_CARDS, MAX_CARD_SUBTITLE_CHARS};

const FULL_GLYPH: char = '★';
const HALF_GLYPH: char = '½';
const OVERVIEW_MAP_SIZE: &str = "400x200";
const DETAIL_MAP_SIZE: &str = "300x150";

/// Render a 0 to 5 rating as one full glyph per whole point plus a half glyph
/// when there is a fractional part. Out-of-range values are clamped.
pub fn rating_glyphs(rating: f64) -> String {
    if !rating.is_finite() {
        return String::new();
    }
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.trunc() as usize;
    let mut glyphs: String = std::iter::repeat(FULL_GLYPH).take(full).collect();
    if rating.fract() > 0.0 {
        glyphs.push(HALF_GLYPH);
    }
    glyphs
}

/// Builds the reply for a set of nearby cafes.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    max_detail_cards: usize,
    static_map_url: String,
    static_map_key: String,
    map_viewer_url: String,
    map_zoom: u8,
}

impl ResponseComposer {
    pub fn new(config: &ResponseConfig) -> Self {
        Self {
            max_detail_cards: config.max_detail_cards.clamp(1, MAX_CARDS),
            static_map_url: config.static_map_url.clone(),
            static_map_key: config.static_map_key.clone(),
            map_viewer_url: config.map_viewer_url.clone(),
            map_zoom: config.map_zoom,
        }
    }

    /// Empty input gives the "nothing nearby" text. Otherwise one overview
    /// carousel with a single map card, then one carousel of detail cards in
    /// input order.
    pub fn compose(&self, cafes: &[Cafe]) -> Result<Vec<Outbound>, ChatError> {
        if cafes.is_empty() {
            return Ok(vec![Outbound::text(messages::NOTHING_NEARBY)?]);
        }

        let overview = Card::new(messages::OVERVIEW_TITLE)
            .subtitle(&format!("{} found around you", cafes.len()))
            .image_url(self.static_map(
                OVERVIEW_MAP_SIZE,
                cafes.iter().map(|c| c.location),
            ));

        let details = cafes
            .iter()
            .take(self.max_detail_cards)
            .map(|cafe| self.detail_card(cafe))
            .collect();

        Ok(vec![
            Outbound::carousel(vec![overview])?,
            Outbound::carousel(details)?,
        ])
    }

    fn detail_card(&self, cafe: &Cafe) -> Card {
        let map_link = self.map_link(cafe.location);
        let item_url = if cafe.url.trim().is_empty() {
            map_link.clone()
        } else {
            cafe.url.clone()
        };

        Card::new(&cafe.name)
            .subtitle(&subtitle(cafe))
            .image_url(self.static_map(DETAIL_MAP_SIZE, std::iter::once(cafe.location)))
            .item_url(item_url)
            .button(messages::BUTTON_MAP, &map_link)
            .button(messages::BUTTON_PAGE, &cafe.url)
    }

    fn static_map(&self, size: &str, points: impl Iterator<Item = Coordinate>) -> String {
        let markers: Vec<String> = points.map(|p| p.to_string()).collect();
        let mut url = format!(
            "{}?size={}&zoom={}&markers={}",
            self.static_map_url,
            size,
            self.map_zoom,
            markers.join("|")
        );
        if !self.static_map_key.is_empty() {
            url.push_str("&key=");
            url.push_str(&self.static_map_key);
        }
        url
    }

    fn map_link(&self, point: Coordinate) -> String {
        format!("{}?q={}&z={}", self.map_viewer_url, point, self.map_zoom)
    }
}

/// Ratings line, then address, then flags. Lines after the first are only
/// added while the whole subtitle stays within the card limit.
fn subtitle(cafe: &Cafe) -> String {
    let r = &cafe.ratings;
    let mut text = format!(
        "Tasty {} Wifi {} Quiet {} Cheap {}",
        rating_glyphs(r.tasty),
        rating_glyphs(r.wifi),
        rating_glyphs(r.quiet),
        rating_glyphs(r.cheap)
    );

    let mut flags = Vec::new();
    if !cafe.time_limited.is_empty() {
        flags.push(format!("Time limit: {}", cafe.time_limited));
    }
    if !cafe.plug.is_empty() {
        flags.push(format!("Plugs: {}", cafe.plug));
    }

    for line in [cafe.address.trim().to_string(), flags.join(", ")] {
        if line.is_empty() {
            continue;
        }
        let len = text.chars().count() + 1 + line.chars().count();
        if len <= MAX_CARD_SUBTITLE_CHARS {
            text.push('\n');
            text.push_str(&line);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafehunter_core::types::CafeRatings;

    fn composer() -> ResponseComposer {
        ResponseComposer::new(&ResponseConfig {
            static_map_key: "map-key".to_string(),
            ..ResponseConfig::default()
        })
    }

    fn cafe(n: usize) -> Cafe {
        Cafe {
            id: format!("cafe-{}", n),
            name: format!("Cafe {}", n),
            city: "taipei".to_string(),
            address: format!("No. {}, Hankou St.", n),
            url: format!("https://example.com/cafe/{}", n),
            location: Coordinate::new(25.0 + n as f64 * 0.25, 121.5),
            geohash: "wsqqky00".to_string(),
            ratings: CafeRatings {
                tasty: 3.5,
                wifi: 5.0,
                quiet: 0.0,
                cheap: 4.0,
                seat: 3.0,
                music: 2.0,
            },
            time_limited: "no".to_string(),
            plug: "yes".to_string(),
        }
    }

    fn cards(outbound: &Outbound) -> &[Card] {
        match outbound {
            Outbound::Carousel { cards } => cards,
            other => panic!("expected carousel, got {:?}", other),
        }
    }

    #[test]
    fn test_rating_glyphs() {
        assert_eq!(rating_glyphs(3.5), "★★★½");
        assert_eq!(rating_glyphs(0.0), "");
        assert_eq!(rating_glyphs(5.0), "★★★★★");
        assert_eq!(rating_glyphs(4.2), "★★★★½");
        assert_eq!(rating_glyphs(7.0), "★★★★★");
        assert_eq!(rating_glyphs(-1.0), "");
        assert_eq!(rating_glyphs(f64::NAN), "");
    }

    #[test]
    fn test_empty_result_is_single_text() {
        let out = composer().compose(&[]).unwrap();
        assert_eq!(
            out,
            vec![Outbound::Text {
                text: messages::NOTHING_NEARBY.to_string()
            }]
        );
    }

    #[test]
    fn test_overview_has_every_cafe_as_marker() {
        let cafes: Vec<Cafe> = (0..3).map(cafe).collect();
        let out = composer().compose(&cafes).unwrap();
        assert_eq!(out.len(), 2);

        let overview = cards(&out[0]);
        assert_eq!(overview.len(), 1);
        let image = overview[0].image_url.as_deref().unwrap();
        assert!(image.contains("markers=25,121.5|25.25,121.5|25.5,121.5"));
        assert!(image.contains("zoom=15"));
        assert!(image.ends_with("&key=map-key"));
    }

    #[test]
    fn test_detail_cards_capped_and_in_input_order() {
        let cafes: Vec<Cafe> = (0..25).map(cafe).collect();
        let out = composer().compose(&cafes).unwrap();
        let details = cards(&out[1]);
        assert_eq!(details.len(), 10);
        let names: Vec<&str> = details.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(names[0], "Cafe 0");
        assert_eq!(names[9], "Cafe 9");

        let overview_image = cards(&out[0])[0].image_url.as_deref().unwrap();
        assert_eq!(overview_image.matches('|').count(), 24);
    }

    #[test]
    fn test_detail_card_content() {
        let out = composer().compose(&[cafe(1)]).unwrap();
        let card = &cards(&out[1])[0];
        let subtitle = card.subtitle.as_deref().unwrap();
        assert!(subtitle.contains("Tasty ★★★½"));
        assert!(subtitle.contains("Wifi ★★★★★"));
        assert!(subtitle.contains("\nNo. 1, Hankou St."));
        // Flags would push the subtitle past the card limit.
        assert!(!subtitle.contains("Time limit"));
        assert!(subtitle.chars().count() <= MAX_CARD_SUBTITLE_CHARS);

        assert_eq!(card.item_url.as_deref(), Some("https://example.com/cafe/1"));
        assert_eq!(card.buttons.len(), 2);
        assert_eq!(card.buttons[0].url, "https://maps.google.com/?q=25.25,121.5&z=15");
        assert_eq!(card.buttons[1].url, "https://example.com/cafe/1");
    }

    #[test]
    fn test_cafe_without_url_links_to_map() {
        let mut c = cafe(2);
        c.url = String::new();
        let out = composer().compose(&[c]).unwrap();
        let card = &cards(&out[1])[0];
        assert_eq!(card.buttons.len(), 1);
        assert_eq!(card.item_url.as_deref(), Some(card.buttons[0].url.as_str()));
    }

    #[test]
    fn test_subtitle_keeps_flags_when_they_fit() {
        let mut short = cafe(1);
        short.address = "Hankou St.".to_string();
        let out = composer().compose(&[short]).unwrap();
        let subtitle = cards(&out[1])[0].subtitle.clone().unwrap();
        let lines: Vec<&str> = subtitle.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Hankou St.");
        assert_eq!(lines[2], "Time limit: no, Plugs: yes");
    }
}
