//! Notification Formatter
//!
//! Pure mapping from a TokenRecord to the Markdown notification payload.
//! Fields render in a fixed order and only when present; presence is the
//! `Option` itself, so a genuine zero figure still renders.

use rust_decimal::prelude::ToPrimitive;

use super::record::{NotificationPayload, TokenRecord};

const EXPLORER_TOKEN_URL: &str = "https://solscan.io/token";
const EXPLORER_ACCOUNT_URL: &str = "https://solscan.io/account";

/// Holders above this share of supply are skipped in Top Accounts
const HOLDER_MAX_PCT: f64 = 10.0;
/// Holders at or below this share of supply are skipped in Top Accounts
const HOLDER_MIN_PCT: f64 = 1.0;
/// At most this many holders are rendered
const HOLDER_DISPLAY_CAP: usize = 6;

/// Ordered Markdown message builder: labeled fields are appended in call
/// order, absent values render nothing
struct MessageBuilder {
    out: String,
}

impl MessageBuilder {
    fn new(header: &str) -> Self {
        Self {
            out: format!("{}\n\n", header),
        }
    }

    fn field(&mut self, label: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.out.push_str(&format!("*{}:* {}\n", label, value));
        }
        self
    }

    fn blank_after(&mut self, value: Option<&str>) -> &mut Self {
        if value.is_some() {
            self.out.push('\n');
        }
        self
    }

    fn link(&mut self, label: &str, url: Option<&str>) -> &mut Self {
        if let Some(url) = url {
            self.out.push_str(&format!("[{}]({})\n", label, url));
        }
        self
    }

    fn raw(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Render a record into the notification text and optional image
pub fn format_record(record: &TokenRecord) -> NotificationPayload {
    let mut builder = MessageBuilder::new("*Token Information:*");

    let symbol = record.symbol.as_ref().map(|s| format!("${}", s));
    let supply = record.supply.map(|s| s.normalize().to_string());
    let decimals = record.decimals.map(|d| d.to_string());
    let address_link = format!("[Solscan]({}/{})", EXPLORER_TOKEN_URL, record.address);

    builder
        .field("Name", record.name.as_deref())
        .field("Symbol", symbol.as_deref())
        .blank_after(symbol.as_deref())
        .field("Address", Some(address_link.as_str()))
        .field("Supply", supply.as_deref())
        .field("Decimals", decimals.as_deref())
        .blank_after(decimals.as_deref())
        .field("Owner", record.owner.as_deref())
        .link("Website", record.links.website.as_deref())
        .link("Twitter", record.links.twitter.as_deref())
        .link("Telegram", record.links.telegram.as_deref())
        .link("Pump.Fun", record.listing_url.as_deref());

    if let Some(line) = top_accounts_line(record) {
        builder.raw(&line);
    }

    if let Some(progress) = &record.market.bonding_curve_progress {
        builder.raw(&format!("\n\n*Bonding Curve:* {}\n\n", progress));
    }
    if let Some(cap) = record.market.market_cap {
        builder.raw(&format!("\n\n*Market Cap:* {}\n\n", format_usd(cap)));
    }
    if let Some(volume) = record.market.one_hour_volume {
        builder.raw(&format!("*1 Hour Volume:* {}\n\n", format_usd(volume)));
    }
    if let Some(liquidity) = record.market.liquidity {
        builder.raw(&format!("*Liquidity:* {}\n\n", format_usd(liquidity)));
    }

    NotificationPayload {
        text: builder.finish(),
        image: record.image.clone(),
    }
}

/// Render the "interesting middle band" of top holders: shares over
/// HOLDER_MAX_PCT or at/below HOLDER_MIN_PCT are skipped
fn top_accounts_line(record: &TokenRecord) -> Option<String> {
    let supply = record.supply?.to_f64()?;
    if record.top_holders.is_empty() || supply <= 0.0 {
        return None;
    }

    let mut line = String::from("\n*Top Accounts:*\n");
    let mut shown = 0;
    for holder in &record.top_holders {
        if shown >= HOLDER_DISPLAY_CAP {
            break;
        }
        let pct = holder.balance / supply * 100.0;
        if pct > HOLDER_MAX_PCT || pct <= HOLDER_MIN_PCT {
            continue;
        }
        shown += 1;
        line.push_str(&format!(
            "[{:.2}%]({}/{}) - ",
            pct, EXPLORER_ACCOUNT_URL, holder.address
        ));
    }

    if let Some(stripped) = line.strip_suffix(" - ") {
        line = stripped.to_string();
    }
    Some(line)
}

/// Currency with thousands separators, two decimal places
fn format_usd(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, cents) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let whole: String = grouped.chars().rev().collect();

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, whole, cents)
}
