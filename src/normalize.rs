//! Result normalizer: one raw service exchange in, one [`ConversionResult`] out.
//!
//! The three endpoints answer with three different success shapes and a
//! common `{ detail }` failure shape. Any field may be missing; only
//! `success` is needed to interpret a 2xx body. The normalizer reconciles,
//! it never rewrites content: Markdown, metadata, pages and summary are
//! copied through untouched.
//!
//! | Exchange | Result |
//! |---|---|
//! | non-2xx | `Failure(detail ‖ error ‖ mode fallback)` |
//! | 2xx, body not a JSON object | `Failure(unreadable response)` |
//! | 2xx, no boolean `success` | `Failure(malformed response)` |
//! | 2xx, `success: false` | `Failure(error ‖ detail ‖ mode fallback)` |
//! | 2xx, `success: true` | `Success`, Markdown from the mode's field, else the other one, else `""` |

use crate::error::TransportError;
use crate::mode::ConversionMode;
use crate::result::{
    ContentKind, ConversionOutput, ConversionResult, CrawledPage, CrawlSummary,
};
use crate::service::RawExchange;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const UNREADABLE_RESPONSE: &str = "The conversion service returned an unreadable response.";
pub const MALFORMED_RESPONSE: &str =
    "The conversion service returned a response without a success flag.";

/// Map a completed HTTP exchange to the canonical result.
pub fn normalize(mode: ConversionMode, exchange: &RawExchange) -> ConversionResult {
    let body: Option<Value> = serde_json::from_slice(&exchange.body).ok();

    if !exchange.is_success_status() {
        let message = body
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|map| field_message(map, "detail").or_else(|| field_message(map, "error")))
            .unwrap_or_else(|| mode.fallback_error().to_string());
        debug!(status = exchange.status, "{} request failed: {}", mode, message);
        return ConversionResult::failure(message);
    }

    let Some(Value::Object(map)) = body else {
        warn!(status = exchange.status, "{} response body is not a JSON object", mode);
        return ConversionResult::failure(UNREADABLE_RESPONSE);
    };

    match map.get("success").and_then(Value::as_bool) {
        None => {
            warn!("{} response has no boolean `success` field", mode);
            ConversionResult::failure(MALFORMED_RESPONSE)
        }
        Some(false) => ConversionResult::failure(
            field_message(&map, "error")
                .or_else(|| field_message(&map, "detail"))
                .unwrap_or_else(|| mode.fallback_error().to_string()),
        ),
        Some(true) => ConversionResult::Success(success_output(mode, &map)),
    }
}

/// Synthesize the failure result for an exchange that never completed.
pub fn from_transport_error(mode: ConversionMode, err: &TransportError) -> ConversionResult {
    warn!("{} request did not complete: {}", mode, err);
    ConversionResult::failure(err.to_string())
}

fn success_output(mode: ConversionMode, map: &Map<String, Value>) -> ConversionOutput {
    let single = string_field(map, "markdown");
    let combined = string_field(map, "combined_markdown");
    let preferred = match mode {
        ConversionMode::Multipage => combined.or(single),
        ConversionMode::Webpage | ConversionMode::File => single.or(combined),
    };
    let markdown = preferred.unwrap_or_else(|| {
        warn!("{} response reports success but carries no Markdown", mode);
        String::new()
    });

    let kind = match mode {
        ConversionMode::Multipage => ContentKind::Crawl {
            pages: pages_field(map),
            summary: map
                .get("summary")
                .and_then(|v| serde_json::from_value::<CrawlSummary>(v.clone()).ok())
                .unwrap_or_default(),
        },
        ConversionMode::Webpage | ConversionMode::File => ContentKind::Document {
            metadata: map.get("metadata").filter(|v| !v.is_null()).cloned(),
        },
    };

    ConversionOutput {
        markdown,
        kind,
        saved_file: string_field(map, "saved_file"),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn pages_field(map: &Map<String, Value>) -> Vec<CrawledPage> {
    let Some(entries) = map.get("pages").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(page) => Some(page),
            Err(e) => {
                debug!("skipping unreadable crawl page entry: {}", e);
                None
            }
        })
        .collect()
}

/// Best-effort human message from a `detail`/`error` field.
///
/// Strings are used verbatim. Validation-error arrays (`[{ "msg": .. }, ..]`)
/// are joined with `"; "`.
fn field_message(map: &Map<String, Value>, key: &str) -> Option<String> {
    let message = match map.get(key)? {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj
                    .get("msg")
                    .or_else(|| obj.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(obj) => obj
            .get("msg")
            .or_else(|| obj.get("message"))
            .and_then(Value::as_str)?
            .to_string(),
        _ => return None,
    };
    (!message.trim().is_empty()).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exchange(status: u16, body: Value) -> RawExchange {
        RawExchange {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    #[test]
    fn webpage_success_copies_markdown_and_metadata() {
        let r = normalize(
            ConversionMode::Webpage,
            &exchange(
                200,
                json!({"success": true, "markdown": "# Hi", "metadata": {"title": "Hi"}}),
            ),
        );
        assert_eq!(r.markdown_text(), Some("# Hi"));
        assert_eq!(r.metadata(), Some(&json!({"title": "Hi"})));
        assert_eq!(r.error(), None);
    }

    #[test]
    fn crawl_success_uses_combined_markdown() {
        let r = normalize(
            ConversionMode::Multipage,
            &exchange(
                200,
                json!({
                    "success": true,
                    "combined_markdown": "all pages",
                    "pages": [{"url": "a", "success": true}, {"url": "b", "title": "B", "page_type": "guide", "success": false}],
                    "summary": {"successful_pages": 1, "total_pages": 2}
                }),
            ),
        );
        assert_eq!(r.markdown_text(), Some("all pages"));
        let pages = r.pages().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].page_type.as_deref(), Some("guide"));
        let summary = r.summary().unwrap();
        assert_eq!(summary.successful_pages, 1);
        assert_eq!(summary.extra.get("total_pages"), Some(&json!(2)));
    }

    #[test]
    fn falls_back_to_the_other_markdown_field() {
        let r = normalize(
            ConversionMode::Multipage,
            &exchange(200, json!({"success": true, "markdown": "single"})),
        );
        assert_eq!(r.markdown_text(), Some("single"));
        assert_eq!(r.pages().map(<[_]>::len), Some(0));
        assert_eq!(r.summary().map(|s| s.successful_pages), Some(0));
    }

    #[test]
    fn success_without_markdown_is_empty_string() {
        let r = normalize(ConversionMode::File, &exchange(200, json!({"success": true})));
        assert!(r.is_success());
        assert_eq!(r.markdown_text(), Some(""));
    }

    #[test]
    fn file_success_keeps_saved_file() {
        let r = normalize(
            ConversionMode::File,
            &exchange(
                200,
                json!({"success": true, "markdown": "x", "saved_file": "/srv/out/report.md"}),
            ),
        );
        assert_eq!(r.saved_file_path(), Some("/srv/out/report.md"));
    }

    #[test]
    fn error_status_uses_detail_verbatim() {
        let r = normalize(
            ConversionMode::File,
            &exchange(500, json!({"detail": "bad file"})),
        );
        assert_eq!(r.error(), Some("bad file"));
    }

    #[test]
    fn error_status_joins_validation_details() {
        let r = normalize(
            ConversionMode::Multipage,
            &exchange(
                422,
                json!({"detail": [{"loc": ["body", "url"], "msg": "field required"}, {"msg": "bad depth"}]}),
            ),
        );
        assert_eq!(r.error(), Some("field required; bad depth"));
    }

    #[test]
    fn error_status_without_detail_uses_fallback() {
        let r = normalize(
            ConversionMode::Multipage,
            &RawExchange {
                status: 502,
                body: b"<html>Bad Gateway</html>".to_vec(),
            },
        );
        assert_eq!(r.error(), Some(ConversionMode::Multipage.fallback_error()));

        let r = normalize(ConversionMode::Webpage, &exchange(404, json!({"detail": ""})));
        assert_eq!(r.error(), Some(ConversionMode::Webpage.fallback_error()));
    }

    #[test]
    fn non_json_success_body_is_failure() {
        let r = normalize(
            ConversionMode::Webpage,
            &RawExchange {
                status: 200,
                body: b"# not json".to_vec(),
            },
        );
        assert_eq!(r.error(), Some(UNREADABLE_RESPONSE));
    }

    #[test]
    fn missing_success_flag_is_failure() {
        let r = normalize(
            ConversionMode::Webpage,
            &exchange(200, json!({"markdown": "# Hi"})),
        );
        assert_eq!(r.error(), Some(MALFORMED_RESPONSE));
    }

    #[test]
    fn reported_failure_uses_error_then_detail() {
        let r = normalize(
            ConversionMode::Webpage,
            &exchange(200, json!({"success": false, "error": "blocked by robots.txt"})),
        );
        assert_eq!(r.error(), Some("blocked by robots.txt"));

        let r = normalize(
            ConversionMode::Webpage,
            &exchange(200, json!({"success": false, "markdown": "ignored"})),
        );
        assert_eq!(r.error(), Some(ConversionMode::Webpage.fallback_error()));
        assert_eq!(r.markdown_text(), None);
    }

    #[test]
    fn unreadable_page_entries_are_skipped() {
        let r = normalize(
            ConversionMode::Multipage,
            &exchange(
                200,
                json!({"success": true, "combined_markdown": "", "pages": [{"url": 3}, {"url": "ok"}]}),
            ),
        );
        let pages = r.pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "ok");
    }

    #[test]
    fn transport_error_becomes_failure() {
        let err = TransportError::Request {
            endpoint: "http://localhost:8000/convert".into(),
            reason: "connection refused".into(),
        };
        let r = from_transport_error(ConversionMode::Webpage, &err);
        assert!(!r.is_success());
        assert!(r.error().unwrap().contains("connection refused"));
    }
}
