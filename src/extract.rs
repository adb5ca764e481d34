use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{FetchImagesError, Operation};

static IMG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

// ── Public API ───────────────────────────────────────────────────────────────

/// Collects the `src` of every `<img>` in document order.
///
/// Values starting with `http` are kept verbatim. Anything else is resolved
/// against the origin of `page_url` (not its path), so `a.png` on
/// `https://site.test/dir/page` becomes `https://site.test/a.png`.
/// Missing or empty `src` attributes are skipped; duplicates are kept.
pub fn extract_image_urls(html: &str, page_url: &str) -> Result<Vec<String>, FetchImagesError> {
    let document = Html::parse_document(html);
    let origin: OnceCell<Url> = OnceCell::new();
    let mut urls = Vec::new();

    for img in document.select(&IMG_SEL) {
        let src = match img.value().attr("src") {
            Some(s) if !s.is_empty() => s,
            _ => continue,
        };

        if src.starts_with("http") {
            urls.push(src.to_string());
            continue;
        }

        // Parsed lazily, on the first relative source.
        let base = origin.get_or_try_init(|| origin_of(page_url))?;
        let resolved = base.join(src).map_err(|e| {
            FetchImagesError::upstream(
                Operation::Extract,
                format!("cannot resolve {:?}: {}", src, e),
            )
        })?;
        urls.push(resolved.to_string());
    }

    Ok(urls)
}

// ── Origin handling ──────────────────────────────────────────────────────────

/// Scheme, host and port of `page_url` as a base URL with an empty path.
fn origin_of(page_url: &str) -> Result<Url, FetchImagesError> {
    let parsed = Url::parse(page_url).map_err(|e| {
        FetchImagesError::upstream(Operation::Extract, format!("bad page URL: {}", e))
    })?;

    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(FetchImagesError::upstream(
            Operation::Extract,
            format!("{} has an opaque origin", page_url),
        ));
    }

    Url::parse(&origin.ascii_serialization())
        .map_err(|e| FetchImagesError::upstream(Operation::Extract, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://site.test/page";

    #[test]
    fn absolute_src_is_kept_verbatim() {
        let html = r#"<html><body><img src="https://a.test/x.png"></body></html>"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls, vec!["https://a.test/x.png"]);
    }

    #[test]
    fn root_relative_src_resolves_against_origin() {
        let html = r#"<img src="/rel.png">"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls, vec!["https://site.test/rel.png"]);
    }

    #[test]
    fn path_relative_src_ignores_page_path() {
        let html = r#"<img src="img/a.png"><img src="../b.png">"#;
        let urls = extract_image_urls(html, "https://site.test/deep/dir/page.html").unwrap();
        assert_eq!(urls, vec!["https://site.test/img/a.png", "https://site.test/b.png"]);
    }

    #[test]
    fn origin_keeps_non_default_port() {
        let html = r#"<img src="/x.gif">"#;
        let urls = extract_image_urls(html, "http://127.0.0.1:8080/a/b?q=1").unwrap();
        assert_eq!(urls, vec!["http://127.0.0.1:8080/x.gif"]);
    }

    #[test]
    fn protocol_relative_src_takes_page_scheme() {
        let html = r#"<img src="//cdn.test/y.jpg">"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls, vec!["https://cdn.test/y.jpg"]);
    }

    #[test]
    fn no_images_gives_empty_list() {
        let html = "<html><head><title>t</title></head><body><p>text</p></body></html>";
        assert!(extract_image_urls(html, PAGE).unwrap().is_empty());
    }

    #[test]
    fn missing_and_empty_src_are_skipped() {
        let html = r#"<img alt="none"><img src=""><img data-src="/lazy.png"><img src="/ok.png">"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls, vec!["https://site.test/ok.png"]);
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let html = r#"
            <div><img src="/b.png"></div>
            <img src="https://a.test/a.png">
            <section><img src="/b.png"></section>
        "#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://site.test/b.png",
                "https://a.test/a.png",
                "https://site.test/b.png",
            ]
        );
    }

    #[test]
    fn http_prefix_check_is_case_sensitive() {
        // "httpish.png" counts as absolute; "HTTPS://" goes through resolution.
        let html = r#"<img src="httpish.png"><img src="HTTPS://up.test/z.png">"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls, vec!["httpish.png", "https://up.test/z.png"]);
    }

    #[test]
    fn absolute_sources_do_not_need_a_valid_page_url() {
        let html = r#"<img src="https://a.test/x.png">"#;
        let urls = extract_image_urls(html, "not a url").unwrap();
        assert_eq!(urls, vec!["https://a.test/x.png"]);
    }

    #[test]
    fn relative_source_on_opaque_origin_fails() {
        let html = r#"<img src="/x.png">"#;
        let err = extract_image_urls(html, "data:text/html,hello").unwrap_err();
        assert!(matches!(err, FetchImagesError::Upstream { op: Operation::Extract, .. }));
    }

    #[test]
    fn malformed_markup_is_tolerated() {
        let html = r#"<p><img src="/a.png"<img src='/b.png'></div></span><img src=/c.png>"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        // The unspaced second `<img` folds into the first tag as attributes;
        // its duplicate `src` is dropped.
        assert_eq!(urls, vec!["https://site.test/a.png", "https://site.test/c.png"]);
    }
}
