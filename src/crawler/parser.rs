//! HTML parser for extracting work statistics from a listing page
//!
//! Every work on a listing page is an `li.work.blurb.group` element whose `id`
//! is `work_<id>`. Inside it the stats live in `dd` elements classed
//! `chapters`, `words` and `kudos`, and the title is the first link of the
//! `h4.heading`.

use crate::storage::{WorkRecord, MISSING_TITLE};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

const BLURB_SELECTOR: &str = "li.work.blurb.group";
const CHAPTERS_SELECTOR: &str = "dd.chapters";
const WORDS_SELECTOR: &str = "dd.words";
const KUDOS_SELECTOR: &str = "dd.kudos";
const TITLE_SELECTOR: &str = "h4.heading a";
const ID_PREFIX: &str = "work_";

/// Works extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// One record per blurb that carried an identifier, in page order
    pub records: Vec<WorkRecord>,

    /// No blurbs at all were found; the listing is exhausted
    pub is_empty: bool,
}

/// Compiled selectors for a listing page
struct BlurbSelectors {
    blurb: Selector,
    chapters: Selector,
    words: Selector,
    kudos: Selector,
    title: Selector,
}

impl BlurbSelectors {
    fn parse() -> Option<Self> {
        Some(Self {
            blurb: Selector::parse(BLURB_SELECTOR).ok()?,
            chapters: Selector::parse(CHAPTERS_SELECTOR).ok()?,
            words: Selector::parse(WORDS_SELECTOR).ok()?,
            kudos: Selector::parse(KUDOS_SELECTOR).ok()?,
            title: Selector::parse(TITLE_SELECTOR).ok()?,
        })
    }
}

/// Selectors compiled once and shared by every page
fn blurb_selectors() -> Option<&'static BlurbSelectors> {
    static SELECTORS: OnceLock<Option<BlurbSelectors>> = OnceLock::new();
    SELECTORS.get_or_init(BlurbSelectors::parse).as_ref()
}

/// Extracts every work blurb from a listing page
///
/// A blurb whose fields cannot be read still produces a record, with the
/// unreadable fields left unknown. A blurb without an identifier is skipped.
///
/// # Example
///
/// ```
/// use blurb_harvest::crawler::extract_works;
///
/// let html = r#"<ol><li id="work_77" class="work blurb group">
///     <h4 class="heading"><a href="/works/77">Title</a></h4>
///     <dl><dd class="words">12,345</dd><dd class="chapters">3/5</dd><dd class="kudos">9</dd></dl>
/// </li></ol>"#;
/// let page = extract_works(html);
/// assert!(!page.is_empty);
/// assert_eq!(page.records[0].id, "77");
/// assert_eq!(page.records[0].words, Some(12345));
/// ```
pub fn extract_works(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    let Some(selectors) = blurb_selectors() else {
        tracing::error!("Listing selectors failed to compile; no works extracted");
        return ExtractedPage {
            records: Vec::new(),
            is_empty: true,
        };
    };

    let mut blurbs = 0;
    let mut records = Vec::new();

    for blurb in document.select(&selectors.blurb) {
        blurbs += 1;

        let Some(id) = work_id(&blurb) else {
            tracing::warn!("Skipping a work blurb without an id");
            continue;
        };

        records.push(extract_record(id, &blurb, selectors));
    }

    if blurbs == 0 {
        tracing::info!("No more works found.");
    }

    ExtractedPage {
        records,
        is_empty: blurbs == 0,
    }
}

fn work_id(blurb: &ElementRef) -> Option<String> {
    let id = blurb.value().attr("id")?;
    let id = id.strip_prefix(ID_PREFIX).unwrap_or(id);
    (!id.is_empty()).then(|| id.to_string())
}

fn extract_record(id: String, blurb: &ElementRef, selectors: &BlurbSelectors) -> WorkRecord {
    let title = extract_title(blurb, &selectors.title).unwrap_or_else(|| {
        tracing::warn!("Could not find title for work {}", id);
        MISSING_TITLE.to_string()
    });

    let chapters = field_text(blurb, &selectors.chapters)
        .and_then(|text| parse_count(text.split('/').next().unwrap_or_default()))
        .and_then(|n| u32::try_from(n).ok());
    if chapters.is_none() {
        tracing::warn!("Could not find chapter count for work {}", id);
    }

    let words = field_text(blurb, &selectors.words).and_then(|text| parse_count(&text));
    if words.is_none() {
        tracing::warn!("Could not find word count for work {}", id);
    }

    let kudos = field_text(blurb, &selectors.kudos).and_then(|text| parse_count(&text));
    if kudos.is_none() {
        tracing::warn!("Could not find kudos count for work {}", id);
    }

    WorkRecord {
        id,
        chapters,
        words,
        kudos,
        title,
    }
}

fn extract_title(blurb: &ElementRef, selector: &Selector) -> Option<String> {
    blurb
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn field_text(blurb: &ElementRef, selector: &Selector) -> Option<String> {
    blurb
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

/// Parses a displayed count such as `"12,345"`, ignoring thousands separators
pub fn parse_count(text: &str) -> Option<u64> {
    text.trim().replace(',', "").parse().ok()
}
