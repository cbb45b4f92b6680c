//! Generic headline extractor.
//!
//! One call handles one source with one resolved [`SelectorPlan`]: a single GET
//! of the source URL followed by [`parse_headlines`]. Fanning out over several
//! selectors is the aggregator's job.
//!
//! Parsing is a pure function of the page body and the configuration, so the
//! same HTML always yields the same headlines.

use crate::registry::{ExtractionMode, SelectorPlan, Source, TextSource};
use crate::scrapers::ScrapeError;
use crate::utils::{collapse_whitespace, truncate_for_log};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

static IMG_WITH_ALT: Lazy<Selector> = Lazy::new(|| Selector::parse("img[alt]").unwrap());

/// Fetch a source page and extract its headlines for one selector plan.
///
/// # Errors
///
/// Returns [`ScrapeError`] when the request fails, times out, gets a non-2xx
/// answer, or the selector is not valid CSS. Elements that simply yield no
/// text are skipped and are not errors.
#[instrument(level = "info", skip_all, fields(source = %source.name, selector = %plan.selector))]
pub async fn extract(
    client: &Client,
    source: &Source,
    plan: &SelectorPlan,
) -> Result<Vec<String>, ScrapeError> {
    let body = fetch_page(client, &source.url).await?;
    let headlines = parse_headlines(&body, source, plan)?;

    if headlines.is_empty() {
        debug!(body_preview = %truncate_for_log(&body, 300), "Page yielded no headlines");
    }
    info!(count = headlines.len(), "Extracted headlines");
    Ok(headlines)
}

/// Issue a single GET and return the body of a 2xx response.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, ScrapeError> {
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// Extract headlines from an HTML document.
///
/// Standard sources keep the first `limit` non-blank headlines in document
/// order; `start_index` is not used. Image-alt sources slice the `<img alt>`
/// list by `start_index` before filtering, as described on
/// [`ExtractionMode::ImageAlt`].
pub fn parse_headlines(
    html: &str,
    source: &Source,
    plan: &SelectorPlan,
) -> Result<Vec<String>, ScrapeError> {
    let document = Html::parse_document(html);

    let headlines: Vec<String> = match &source.mode {
        ExtractionMode::Standard => {
            let selector = Selector::parse(&plan.selector).map_err(|e| ScrapeError::Selector {
                selector: plan.selector.clone(),
                reason: e.to_string(),
            })?;
            document
                .select(&selector)
                .filter_map(|element| {
                    element_headline(element, &source.title_attribute, &source.fallback_attribute)
                })
                .take(plan.limit)
                .collect()
        }
        ExtractionMode::ImageAlt {
            exclusions,
            num_to_fetch,
        } => image_alt_headlines(&document, plan.start_index, *num_to_fetch, exclusions)
            .into_iter()
            .take(plan.limit)
            .collect(),
    };

    Ok(headlines)
}

/// Headline text of one element.
///
/// Visible text when `title` is [`TextSource::VisibleText`]; otherwise the
/// `title` attribute, then `fallback` (an attribute, or visible text) when the
/// first one is missing or blank.
pub fn element_headline(
    element: ElementRef<'_>,
    title: &TextSource,
    fallback: &TextSource,
) -> Option<String> {
    match title {
        TextSource::VisibleText => read_text(element, title),
        TextSource::Attribute(_) => {
            read_text(element, title).or_else(|| read_text(element, fallback))
        }
    }
}

fn read_text(element: ElementRef<'_>, from: &TextSource) -> Option<String> {
    let text = match from {
        TextSource::VisibleText => collapse_whitespace(&element.text().collect::<String>()),
        TextSource::Attribute(name) => collapse_whitespace(element.value().attr(name)?),
    };
    (!text.is_empty()).then_some(text)
}

/// Alt texts of `<img alt>` elements in `[start, start + count)`, minus any that
/// contain an exclusion term (case-insensitive substring match).
fn image_alt_headlines(
    document: &Html,
    start: usize,
    count: Option<usize>,
    exclusions: &[String],
) -> Vec<String> {
    let exclusions: Vec<String> = exclusions.iter().map(|term| term.to_lowercase()).collect();

    document
        .select(&IMG_WITH_ALT)
        .skip(start)
        .take(count.unwrap_or(usize::MAX))
        .filter_map(|img| img.value().attr("alt"))
        .filter(|alt| {
            let alt = alt.to_lowercase();
            !exclusions.iter().any(|term| alt.contains(term.as_str()))
        })
        .map(collapse_whitespace)
        .filter(|alt| !alt.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Selectors;
    use crate::scrapers::build_client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn plan(selector: &str, limit: usize, start_index: usize) -> SelectorPlan {
        SelectorPlan {
            selector: selector.to_string(),
            limit,
            start_index,
        }
    }

    fn source_with(mode: ExtractionMode, title: TextSource, fallback: TextSource) -> Source {
        Source {
            name: "Test".to_string(),
            url: Url::parse("https://example.com/").unwrap(),
            selectors: Selectors::Single(plan("h2", 15, 0)),
            title_attribute: title,
            fallback_attribute: fallback,
            mode,
            default_selected: false,
        }
    }

    fn standard() -> Source {
        source_with(
            ExtractionMode::Standard,
            TextSource::VisibleText,
            TextSource::VisibleText,
        )
    }

    fn image_alt(exclusions: &[&str], num_to_fetch: Option<usize>) -> Source {
        source_with(
            ExtractionMode::ImageAlt {
                exclusions: exclusions.iter().map(|s| s.to_string()).collect(),
                num_to_fetch,
            },
            TextSource::VisibleText,
            TextSource::VisibleText,
        )
    }

    const FIVE_H2: &str = r#"<html><body>
        <h2>A</h2><h2>  </h2><h2>B</h2><h2>C</h2><h2>D</h2>
    </body></html>"#;

    #[test]
    fn test_blank_entries_skipped_before_limit() {
        let headlines = parse_headlines(FIVE_H2, &standard(), &plan("h2", 3, 0)).unwrap();
        assert_eq!(headlines, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_limit_is_min_of_limit_and_matches() {
        let all = parse_headlines(FIVE_H2, &standard(), &plan("h2", 50, 0)).unwrap();
        assert_eq!(all, vec!["A", "B", "C", "D"]);

        let none = parse_headlines(FIVE_H2, &standard(), &plan("h2", 0, 0)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_start_index_does_not_offset_standard_mode() {
        let headlines = parse_headlines(FIVE_H2, &standard(), &plan("h2", 2, 1)).unwrap();
        assert_eq!(headlines, vec!["A", "B"]);

        let all = parse_headlines(FIVE_H2, &standard(), &plan("h2", 20, 3)).unwrap();
        assert_eq!(all, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_embedded_offset_sources_keep_every_headline() {
        let registry = crate::registry::Registry::embedded().unwrap();
        let marca = registry.get("Marca").unwrap();
        let marca_plan = &marca.selectors.plans()[0];
        assert!(marca_plan.start_index > 0);

        let html = "<h2>Uno</h2><h2>Dos</h2><h2>Tres</h2><h2>Cuatro</h2><h2>Cinco</h2>";
        let headlines = parse_headlines(html, marca, marca_plan).unwrap();
        assert_eq!(headlines.len(), marca_plan.limit.min(5));
        assert_eq!(headlines[0], "Uno");
    }

    #[test]
    fn test_visible_text_is_whitespace_normalized() {
        let html = "<h2>\n  Boca <b>gana</b>\n el   clásico </h2>";
        let headlines = parse_headlines(html, &standard(), &plan("h2", 5, 0)).unwrap();
        assert_eq!(headlines, vec!["Boca gana el clásico"]);
    }

    #[test]
    fn test_selector_list_keeps_document_order() {
        let html = "<h2>second level</h2><h1>first level</h1><h3>ignored</h3>";
        let headlines = parse_headlines(html, &standard(), &plan("h1, h2", 5, 0)).unwrap();
        assert_eq!(headlines, vec!["second level", "first level"]);
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let headlines = parse_headlines("<p>nothing</p>", &standard(), &plan("h2", 5, 0)).unwrap();
        assert!(headlines.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_error() {
        let err = parse_headlines(FIVE_H2, &standard(), &plan("h2[", 5, 0)).unwrap_err();
        assert!(matches!(err, ScrapeError::Selector { ref selector, .. } if selector == "h2["));
    }

    #[test]
    fn test_attribute_falls_back_to_visible_text() {
        let html = r#"
            <a aria-label="Labelled headline">ignored text</a>
            <a>Only visible text</a>
            <a aria-label="  ">Blank label</a>
        "#;
        let source = source_with(
            ExtractionMode::Standard,
            TextSource::Attribute("aria-label".into()),
            TextSource::VisibleText,
        );
        let headlines = parse_headlines(html, &source, &plan("a", 10, 0)).unwrap();
        assert_eq!(
            headlines,
            vec!["Labelled headline", "Only visible text", "Blank label"]
        );
    }

    #[test]
    fn test_attribute_falls_back_to_attribute() {
        let html = r#"
            <a title="From title">x</a>
            <a data-headline="From fallback">y</a>
            <a>no attributes</a>
        "#;
        let source = source_with(
            ExtractionMode::Standard,
            TextSource::Attribute("title".into()),
            TextSource::Attribute("data-headline".into()),
        );
        let headlines = parse_headlines(html, &source, &plan("a", 10, 0)).unwrap();
        assert_eq!(headlines, vec!["From title", "From fallback"]);
    }

    #[test]
    fn test_visible_text_title_does_not_fall_back() {
        let html = r#"<a aria-label="label"></a>"#;
        let source = source_with(
            ExtractionMode::Standard,
            TextSource::VisibleText,
            TextSource::Attribute("aria-label".into()),
        );
        let headlines = parse_headlines(html, &source, &plan("a", 10, 0)).unwrap();
        assert!(headlines.is_empty());
    }

    const GALLERY: &str = r#"<html><body>
        <img src="logo.png" alt="Logo">
        <img src="1.png" alt="Boca Juniors escudo">
        <img src="2.png" alt="Messi vuelve a la selección">
        <img src="3.png" alt="Vélez presentó refuerzos">
        <img src="4.png">
        <img src="5.png" alt="">
        <img src="6.png" alt="Dibu Martínez renueva">
        <img src="7.png" alt="Final de la Libertadores">
        <h2>A headline that image-alt mode never reads</h2>
    </body></html>"#;

    #[test]
    fn test_image_alt_slices_before_filtering() {
        // img[alt] list: Logo, Boca, Messi, Vélez, "", Dibu, Final
        let source = image_alt(&["boca juniors", "VÉLEZ"], Some(5));
        let headlines = parse_headlines(GALLERY, &source, &plan("h2", 15, 1)).unwrap();
        assert_eq!(
            headlines,
            vec!["Messi vuelve a la selección", "Dibu Martínez renueva"]
        );
    }

    #[test]
    fn test_image_alt_never_returns_excluded_terms() {
        let exclusions = ["boca", "vélez", "final"];
        let source = image_alt(&exclusions, None);
        let headlines = parse_headlines(GALLERY, &source, &plan("h2", 15, 0)).unwrap();
        for headline in &headlines {
            let lowered = headline.to_lowercase();
            assert!(exclusions.iter().all(|t| !lowered.contains(t)), "{headline}");
        }
        assert_eq!(
            headlines,
            vec!["Logo", "Messi vuelve a la selección", "Dibu Martínez renueva"]
        );
    }

    #[test]
    fn test_image_alt_respects_limit() {
        let source = image_alt(&[], None);
        let headlines = parse_headlines(GALLERY, &source, &plan("h2", 2, 0)).unwrap();
        assert_eq!(headlines, vec!["Logo", "Boca Juniors escudo"]);
    }

    #[test]
    fn test_standard_mode_ignores_images() {
        let headlines = parse_headlines(GALLERY, &standard(), &plan("h2", 15, 0)).unwrap();
        assert_eq!(headlines, vec!["A headline that image-alt mode never reads"]);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let source = standard();
        let plan = plan("h2", 3, 0);
        let first = parse_headlines(FIVE_H2, &source, &plan).unwrap();
        let second = parse_headlines(FIVE_H2, &source, &plan).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_extract_fetches_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/deportes"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIVE_H2))
            .expect(1)
            .mount(&server)
            .await;

        let mut source = standard();
        source.url = Url::parse(&format!("{}/deportes", server.uri())).unwrap();
        let client = build_client(Duration::from_secs(5)).unwrap();

        let headlines = extract(&client, &source, &plan("h2", 3, 0)).await.unwrap();
        assert_eq!(headlines, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let err = fetch_page(&client, &url).await.unwrap_err();
        assert!(
            matches!(err, ScrapeError::Status { status, .. } if status.as_u16() == 503),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_timeout_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(FIVE_H2)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = build_client(Duration::from_millis(200)).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let err = fetch_page(&client, &url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Http(_)), "{err}");
    }
}
