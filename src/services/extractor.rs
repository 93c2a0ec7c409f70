use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, header, redirect::Policy};
use scraper::{Html, Selector};

use crate::error::TrackerError;
use crate::models::Currency;

/// Price selector candidates, most to least specific markup variant.
/// Site markup is unstable, so the first candidate with non-empty text wins;
/// later candidates are never merged in.
const PRICE_SELECTORS: &[&str] = &[
    ".a-offscreen",
    ".a-price.apexPriceToPay .a-offscreen",
    "#priceblock_ourprice",
    "#priceblock_dealprice",
    ".a-price .a-offscreen",
    "span.a-price-whole",
    "#corePrice_feature_div .a-offscreen",
    ".priceToPay .a-offscreen",
];

const TITLE_SELECTORS: &[&str] = &["#productTitle", "h1.a-size-large", "span#productTitle"];

const TITLE_META_SELECTOR: &str = r#"meta[property="og:title"]"#;

/// Titles at or below this length fall back to the sentinel.
const MIN_TITLE_LEN: usize = 3;

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn price_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d,]+\.?\d*").unwrap())
}

/// Result of one successful page extraction. Ephemeral; the batch runner
/// decides what to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub price: f64,
    pub title: String,
    pub currency: Currency,
}

/// Seam for the batch runner so tests can script fetch results.
#[async_trait]
pub trait Extract: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Extraction, TrackerError>;
}

#[derive(Clone)]
pub struct PriceExtractor {
    http: Client,
    usd_to_inr: f64,
}

impl PriceExtractor {
    pub fn new(timeout: Duration, usd_to_inr: f64) -> Result<Self, TrackerError> {
        let http = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(5))
            .build()?;

        Ok(Self { http, usd_to_inr })
    }

    async fn fetch(&self, url: &str) -> Result<String, TrackerError> {
        let res = self
            .http
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(header::CONNECTION, "keep-alive")
            .header(header::UPGRADE_INSECURE_REQUESTS, "1")
            .header(header::CACHE_CONTROL, "max-age=0")
            .header(header::REFERER, "https://www.amazon.com/")
            .send()
            .await?;

        let status = res.status();

        // 503 is how the site signals anti-automation blocking; keep it
        // distinct from ordinary transport failures for operational logs.
        if status.as_u16() == 503 {
            return Err(TrackerError::Blocked(format!("{url} answered 503")));
        }
        if status.is_server_error() {
            return Err(TrackerError::Network(format!("{url} answered {status}")));
        }

        // 4xx bodies still get parsed; some variants serve the product page
        // with a non-200 status.
        Ok(res.text().await?)
    }

    /// Parses a fetched page body. Split out of [`extract`] so fixture tests
    /// can exercise selector fallback and normalization without a server
    /// (and so the non-`Send` DOM never lives across an await).
    pub fn extract_from_html(&self, html: &str) -> Result<Extraction, TrackerError> {
        let doc = Html::parse_document(html);

        let price_text = first_selector_text(&doc, PRICE_SELECTORS).ok_or_else(|| {
            TrackerError::Parse("no price selector candidate matched".to_string())
        })?;

        let currency = detect_currency(&price_text);
        let raw_price = parse_price(&price_text)?;

        // Foreign prices normalize to the canonical unit; prices with no
        // recognizable symbol pass through unconverted.
        let (price, currency) = match currency {
            Currency::Usd => (round2(raw_price * self.usd_to_inr), Currency::Inr),
            other => (raw_price, other),
        };

        let title = extract_title(&doc);

        Ok(Extraction {
            price,
            title,
            currency,
        })
    }
}

#[async_trait]
impl Extract for PriceExtractor {
    async fn extract(&self, url: &str) -> Result<Extraction, TrackerError> {
        let body = self.fetch(url).await?;
        self.extract_from_html(&body)
    }
}

fn first_selector_text(doc: &Html, candidates: &[&str]) -> Option<String> {
    for candidate in candidates {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        if let Some(el) = doc.select(&selector).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn detect_currency(price_text: &str) -> Currency {
    if price_text.contains('₹') {
        Currency::Inr
    } else if price_text.contains('$') {
        Currency::Usd
    } else {
        Currency::Unknown
    }
}

/// First numeric run of the text, thousands separators stripped. Text that
/// matched a selector but carries no usable positive number is
/// `InvalidPrice`, not `Parse`: the element was found, its content wasn't.
fn parse_price(price_text: &str) -> Result<f64, TrackerError> {
    let m = price_regex().find(price_text).ok_or_else(|| {
        TrackerError::InvalidPrice(format!("no numeric value in {price_text:?}"))
    })?;

    let price = m
        .as_str()
        .replace(',', "")
        .parse::<f64>()
        .map_err(|e| TrackerError::InvalidPrice(format!("{price_text:?}: {e}")))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(TrackerError::InvalidPrice(format!(
            "non-positive price {price} in {price_text:?}"
        )));
    }

    Ok(price)
}

fn extract_title(doc: &Html) -> String {
    if let Some(title) = first_selector_text(doc, TITLE_SELECTORS) {
        if title.len() >= MIN_TITLE_LEN {
            return title;
        }
    }

    // Meta fallback; a missing title never fails price tracking.
    if let Ok(selector) = Selector::parse(TITLE_META_SELECTOR) {
        if let Some(el) = doc.select(&selector).next() {
            if let Some(content) = el.value().attr("content") {
                let title = content.trim();
                if title.len() >= MIN_TITLE_LEN {
                    return title.to_string();
                }
            }
        }
    }

    UNKNOWN_PRODUCT.to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
