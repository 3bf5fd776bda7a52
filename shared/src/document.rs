//! Quote / invoice / receipt documents
//!
//! [`DocumentData`] is a self-contained snapshot (client, lines, prices) so a
//! stored document renders identically after catalog or profile edits.
//! [`render_html`] is a pure function; PDF conversion happens server-side.

use crate::models::text_enum;
use crate::money::{format_eur, round_cents};
use crate::util::escape_html;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Quote,
    Invoice,
    Receipt,
}

text_enum!(DocumentKind, "document kind", {
    Quote => "quote",
    Invoice => "invoice",
    Receipt => "receipt",
});

impl DocumentKind {
    /// Number prefix (`DEV-2025-0001`)
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Quote => "DEV",
            Self::Invoice => "FAC",
            Self::Receipt => "REC",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Quote => "Devis",
            Self::Invoice => "Facture",
            Self::Receipt => "Reçu",
        }
    }
}

/// `{PREFIX}-{YYYY}-{seq:04}`
pub fn document_number(kind: DocumentKind, year: i32, seq: u32) -> String {
    format!("{}-{}-{:04}", kind.prefix(), year, seq)
}

/// Restaurant identity printed in the header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub siret: Option<String>,
}

/// Client snapshot taken when the document is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DocumentClient {
    #[validate(length(min = 1, max = 160))]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub dish_id: Option<i64>,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl DocumentLine {
    /// `None` on overflow
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentData {
    pub kind: DocumentKind,
    pub number: String,
    pub issued_on: NaiveDate,
    /// Quotes only
    pub valid_until: Option<NaiveDate>,
    pub client: DocumentClient,
    pub lines: Vec<DocumentLine>,
    /// Replaces the computed sum when present
    pub manual_total: Option<Decimal>,
    pub notes: Option<String>,
}

impl DocumentData {
    /// Σ(quantity × unit_price), rounded to cents; `None` on overflow
    pub fn computed_total(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.line_total()?))
            .map(round_cents)
    }

    /// Manual override if supplied, otherwise the computed sum
    pub fn total(&self) -> Option<Decimal> {
        match self.manual_total {
            Some(manual) => Some(round_cents(manual)),
            None => self.computed_total(),
        }
    }
}

/// Persisted document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StoredDocument {
    pub id: i64,
    pub kind: DocumentKind,
    pub number: String,
    pub client_id: Option<String>,
    pub total: Decimal,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub data: DocumentData,
    pub created_at: DateTime<Utc>,
}

/// Requested line: a catalog dish (price from catalog unless overridden) or
/// a free-text line with an explicit price
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentLineInput {
    pub dish_id: Option<i64>,
    #[validate(length(min = 1, max = 300))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 100000))]
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
}

/// Admin document creation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentCreate {
    pub kind: DocumentKind,
    /// Registered client to snapshot; ignored when `client` is given
    pub client_id: Option<String>,
    #[validate(nested)]
    pub client: Option<DocumentClient>,
    /// Copy lines from an existing order (receipts)
    pub order_id: Option<i64>,
    pub issued_on: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub lines: Vec<DocumentLineInput>,
    pub manual_total: Option<Decimal>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

fn format_amount(amount: Option<Decimal>) -> String {
    amount.map(format_eur).unwrap_or_else(|| "#####".to_string())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn push_optional(html: &mut String, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        html.push_str("<br>");
        html.push_str(&escape_html(v));
    }
}

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;font-size:12px;color:#222;margin:32px}\
header{display:flex;justify-content:space-between;margin-bottom:24px}\
h1{font-size:20px;margin:0 0 4px}\
table{width:100%;border-collapse:collapse;margin-top:16px}\
th,td{padding:6px 8px;border-bottom:1px solid #ddd;text-align:left}\
td.num,th.num{text-align:right}\
tfoot td{font-weight:bold;border-bottom:none}\
.notes{margin-top:24px;white-space:pre-wrap}";

/// Render the document as a standalone HTML page
pub fn render_html(doc: &DocumentData, issuer: &Issuer) -> String {
    let mut html = String::with_capacity(4096);
    let title = format!("{} {}", doc.kind.label(), escape_html(&doc.number));

    html.push_str("<!DOCTYPE html><html lang=\"fr\"><head><meta charset=\"utf-8\"><title>");
    html.push_str(&title);
    html.push_str("</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body><header><div class=\"issuer\"><strong>");
    html.push_str(&escape_html(&issuer.name));
    html.push_str("</strong>");
    push_optional(&mut html, issuer.address.as_deref());
    push_optional(&mut html, issuer.phone.as_deref());
    push_optional(&mut html, issuer.email.as_deref());
    if let Some(siret) = issuer.siret.as_deref() {
        html.push_str("<br>SIRET ");
        html.push_str(&escape_html(siret));
    }
    html.push_str("</div><div class=\"meta\"><h1>");
    html.push_str(&title);
    html.push_str("</h1>Date : ");
    html.push_str(&format_date(doc.issued_on));
    if let Some(valid_until) = doc.valid_until {
        html.push_str("<br>Valable jusqu'au : ");
        html.push_str(&format_date(valid_until));
    }
    html.push_str("</div></header><section class=\"client\"><strong>Client</strong><br>");
    html.push_str(&escape_html(&doc.client.name));
    push_optional(&mut html, doc.client.address.as_deref());
    push_optional(&mut html, doc.client.phone.as_deref());
    push_optional(&mut html, doc.client.email.as_deref());
    html.push_str(
        "</section><table><thead><tr><th>Désignation</th><th class=\"num\">Quantité</th>\
         <th class=\"num\">Prix unitaire</th><th class=\"num\">Total</th></tr></thead><tbody>",
    );

    for line in &doc.lines {
        html.push_str("<tr><td>");
        html.push_str(&escape_html(&line.description));
        html.push_str("</td><td class=\"num\">");
        html.push_str(&line.quantity.to_string());
        html.push_str("</td><td class=\"num\">");
        html.push_str(&format_eur(line.unit_price));
        html.push_str("</td><td class=\"num\">");
        html.push_str(&format_amount(line.line_total()));
        html.push_str("</td></tr>");
    }

    html.push_str("</tbody><tfoot>");
    let computed = doc.computed_total();
    let total = doc.total();
    if total != computed {
        html.push_str("<tr><td colspan=\"3\">Sous-total</td><td class=\"num\">");
        html.push_str(&format_amount(computed));
        html.push_str("</td></tr>");
    }
    html.push_str("<tr><td colspan=\"3\">Total TTC</td><td class=\"num\">");
    html.push_str(&format_amount(total));
    html.push_str("</td></tr></tfoot></table>");

    if let Some(notes) = doc.notes.as_deref().filter(|n| !n.is_empty()) {
        html.push_str("<div class=\"notes\">");
        html.push_str(&escape_html(notes));
        html.push_str("</div>");
    }
    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample() -> DocumentData {
        DocumentData {
            kind: DocumentKind::Quote,
            number: document_number(DocumentKind::Quote, 2025, 7),
            issued_on: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2025, 6, 1),
            client: DocumentClient {
                name: "Association <Les Amis>".into(),
                email: Some("contact@amis.fr".into()),
                phone: None,
                address: None,
            },
            lines: vec![
                DocumentLine {
                    dish_id: Some(1),
                    description: "Plateau de fromages".into(),
                    quantity: 12,
                    unit_price: d("8.50"),
                },
                DocumentLine {
                    dish_id: None,
                    description: "Service & livraison".into(),
                    quantity: 1,
                    unit_price: d("1200"),
                },
            ],
            manual_total: None,
            notes: Some("Acompte de 30 %".into()),
        }
    }

    #[test]
    fn numbering() {
        assert_eq!(document_number(DocumentKind::Quote, 2025, 7), "DEV-2025-0007");
        assert_eq!(document_number(DocumentKind::Invoice, 2024, 123), "FAC-2024-0123");
        assert_eq!(document_number(DocumentKind::Receipt, 2026, 12345), "REC-2026-12345");
    }

    #[test]
    fn total_is_sum_of_lines() {
        let doc = sample();
        assert_eq!(doc.computed_total(), Some(d("1302.00")));
        assert_eq!(doc.total(), Some(d("1302.00")));
    }

    #[test]
    fn manual_total_overrides_sum() {
        let mut doc = sample();
        doc.manual_total = Some(d("1250"));
        assert_eq!(doc.total(), Some(d("1250")));
        assert_eq!(doc.computed_total(), Some(d("1302.00")));
    }

    #[test]
    fn empty_document_totals_zero() {
        let mut doc = sample();
        doc.lines.clear();
        assert_eq!(doc.total(), Some(Decimal::ZERO));
    }

    #[test]
    fn overflowing_lines_have_no_total() {
        let mut doc = sample();
        doc.lines[1].quantity = 2;
        doc.lines[1].unit_price = Decimal::MAX;
        assert_eq!(doc.lines[1].line_total(), None);
        assert_eq!(doc.computed_total(), None);
        assert_eq!(doc.total(), None);

        // a sum that overflows only when added up
        doc.lines[0].quantity = 1;
        doc.lines[0].unit_price = Decimal::MAX;
        doc.lines[1].quantity = 1;
        assert_eq!(doc.computed_total(), None);

        // rendering still works
        let html = render_html(&doc, &Issuer::default());
        assert!(html.contains("#####"));

        doc.manual_total = Some(d("10"));
        assert_eq!(doc.total(), Some(d("10.00")));
    }

    #[test]
    fn html_contains_escaped_content_and_totals() {
        let issuer = Issuer {
            name: "Cantine".into(),
            ..Issuer::default()
        };
        let html = render_html(&sample(), &issuer);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Devis DEV-2025-0007"));
        assert!(html.contains("Association &lt;Les Amis&gt;"));
        assert!(html.contains("Service &amp; livraison"));
        assert!(html.contains("102,00 €"));
        assert!(html.contains("1 302,00 €"));
        assert!(html.contains("Valable jusqu'au : 01/06/2025"));
        assert!(!html.contains("Sous-total"));
    }

    #[test]
    fn html_shows_subtotal_when_overridden() {
        let mut doc = sample();
        doc.manual_total = Some(d("1250"));
        let html = render_html(&doc, &Issuer::default());
        assert!(html.contains("Sous-total"));
        assert!(html.contains("1 250,00 €"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let issuer = Issuer::default();
        assert_eq!(render_html(&sample(), &issuer), render_html(&sample(), &issuer));
    }
}
