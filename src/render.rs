//! Styled HTML invoice rendering.
//!
//! Output is deterministic for identical inputs: the printed date comes in
//! as a parameter, nothing else reads the clock.

use chrono::NaiveDate;

use crate::aggregate::InvoiceBreakdown;
use crate::config::InvoiceConfig;

/// Accent forced onto the header and amount-due callout in map mode.
const MAP_MODE_ALERT: &str = "#FF0000";

const CELL: &str = "border:1px solid {b};padding:13px 10px;font-size:1em;";

fn cell_style(border: &str) -> String {
    CELL.replace("{b}", border)
}

fn money(symbol: &str, amount: f64) -> String {
    format!("{}{:.2}", symbol, amount)
}

fn address_lines(lines: [Option<&str>; 3]) -> String {
    lines
        .into_iter()
        .flatten()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Builds the complete invoice document for one billing period.
pub fn render_invoice(
    breakdown: &InvoiceBreakdown,
    config: &InvoiceConfig,
    period_label: &str,
    invoice_number: Option<&str>,
    generated_on: NaiveDate,
) -> String {
    let c = &config.clockify;
    let style = &config.invoice_style;

    let header_color = if config.invoice_map_mode {
        MAP_MODE_ALERT
    } else {
        &style.primary_color
    };
    let amount_due_color = if config.invoice_map_mode {
        MAP_MODE_ALERT
    } else {
        &style.secondary_color
    };
    let cell = cell_style(&style.table_border);

    let mut html = String::new();
    html.push_str(&format!(
        "<html><body style='background:{};color:{};font-family:{};font-weight:{};margin:0;padding:2em;min-height:100vh;'>\n",
        style.background_color,
        style.text_color,
        config.font_family(),
        config.font_weight()
    ));
    html.push_str(&format!(
        "<div style='max-width:730px;margin:0 auto;padding:0 2vw;background:{};color:{};border-radius:10px;box-shadow:0 2px 8px rgba(44,62,80,0.04);'>\n",
        style.section_bg, style.section_text
    ));

    // Header block: title, number, date, period, both address blocks.
    html.push_str(&format!(
        "<div style='background:{};border-radius:14px;padding:1.8em 2em 1.3em 2em;margin-bottom:2em;box-shadow:0 4px 16px rgba(44,62,80,0.09);color:{};'>\n",
        style.soft_heading_bg, style.text_color
    ));
    html.push_str(
        "<div style='display:flex;justify-content:space-between;align-items:flex-end;flex-wrap:wrap;margin-bottom:1em;'>\n",
    );
    html.push_str(&format!(
        "<div style='font-size:2.2em;color:{};font-weight:700;'>Developer Invoice</div>\n",
        header_color
    ));
    html.push_str(&format!(
        "<div style='font-size:1.1em;color:{};text-align:right;font-weight:600;'>\n",
        amount_due_color
    ));
    if let Some(number) = invoice_number.filter(|n| !n.trim().is_empty()) {
        html.push_str(&format!(
            "<div><span style='font-weight:700;'>Invoice #:</span> {}</div>\n",
            number
        ));
    }
    html.push_str(&format!(
        "<div><span style='font-weight:700;'>Date:</span> {}</div>\n",
        generated_on.format("%Y-%m-%d")
    ));
    html.push_str(&format!(
        "<div><span style='font-weight:700;'>Period:</span> {}</div>\n",
        period_label
    ));
    html.push_str("</div>\n</div>\n");

    html.push_str("<div style='display:flex;justify-content:space-between;gap:2em;flex-wrap:wrap;'>\n");
    html.push_str("<div style='width:48%;min-width:220px;'>\n");
    html.push_str(&format!(
        "<div style='margin:0 0 0.3em 0;color:{};font-size:1.15em;font-weight:700;'>From:</div>\n",
        header_color
    ));
    html.push_str(&format!(
        "<p style='margin:0.1em 0;font-size:1em;'>{}</p>\n",
        c.from_name
    ));
    html.push_str(&format!(
        "<p style='margin:0.1em 0;font-size:1em;'>{}</p>\n",
        address_lines([
            c.company_address_line1.as_deref(),
            c.company_address_line2.as_deref(),
            c.company_address_line3.as_deref(),
        ])
    ));
    html.push_str(&format!(
        "<p style='margin:0.1em 0;font-size:1em;'>Email: {}<br>Phone: {}</p>\n",
        c.contact_email, c.contact_phone
    ));
    html.push_str("</div>\n<div style='width:48%;min-width:220px;'>\n");
    html.push_str(&format!(
        "<div style='margin:0 0 0.3em 0;color:{};font-size:1.15em;font-weight:700;'>Bill To:</div>\n",
        header_color
    ));
    html.push_str(&format!(
        "<p style='margin:0.1em 0;font-size:1em;'>{}</p>\n",
        c.client_name
    ));
    html.push_str(&format!(
        "<p style='margin:0.1em 0;font-size:1em;'>{}</p>\n",
        address_lines([
            c.client_address1.as_deref(),
            c.client_address2.as_deref(),
            c.client_address3.as_deref(),
        ])
    ));
    html.push_str(&format!(
        "<p style='margin:0.1em 0;font-size:1em;'>Email: {}<br>Phone: {}</p>\n",
        c.client_email_address, c.client_number
    ));
    html.push_str("</div>\n</div>\n</div>\n");

    // Work summary table.
    html.push_str(&format!(
        "<h2 style='color:{};font-size:1.4em;font-weight:700;margin-top:2em;margin-bottom:0.7em;text-align:left;background:#fff;padding:0.5em 1em;border-radius:6px;'>Work Summary</h2>\n",
        amount_due_color
    ));
    html.push_str(&format!(
        "<table style='width:100%;max-width:100%;border-collapse:collapse;margin-bottom:2em;box-shadow:0 4px 16px rgba(44,62,80,0.09);background:{};border-radius:9px;overflow:hidden;'>\n",
        style.section_bg
    ));
    html.push_str(&format!(
        "<tr style='background:{};color:{};letter-spacing:0.03em;'>\n",
        style.table_header_bg, header_color
    ));
    for (label, align) in [
        ("Project", "left"),
        ("Hours", "right"),
        ("Rate", "right"),
        ("Amount", "right"),
    ] {
        html.push_str(&format!(
            "<th style='{}text-align:{};font-weight:700;'>{}</th>\n",
            cell, align, label
        ));
    }
    html.push_str("</tr>\n");

    let mut row_index = 0usize;
    let row_bg = |index: usize| {
        if index % 2 == 1 {
            format!("background:{};", style.soft_alt_row_bg)
        } else {
            "background:#fff;".to_string()
        }
    };

    for group in &breakdown.groups {
        html.push_str(&format!("<tr style='{}'>", row_bg(row_index)));
        html.push_str(&format!(
            "<td style='{}text-align:left;font-weight:500;color:{};'>{}</td>",
            cell, style.text_color, group.project_name
        ));
        html.push_str(&format!(
            "<td style='{}text-align:right;font-weight:500;color:{};'>{:.2}</td>",
            cell, style.text_color, group.hours
        ));
        html.push_str(&format!(
            "<td style='{}text-align:right;font-weight:500;color:{};'>{}</td>",
            cell,
            style.text_color,
            money(&c.currency_symbol, c.hourly_rate)
        ));
        html.push_str(&format!(
            "<td style='{}text-align:right;font-weight:500;color:{};'>{}</td>",
            cell,
            style.text_color,
            money(&c.currency_symbol, group.amount)
        ));
        html.push_str("</tr>\n");
        row_index += 1;
    }

    if !config.constant_line_items.is_empty() {
        html.push_str(&format!(
            "<tr><td colspan='4' style='background:{};color:{};text-align:left;font-weight:700;{}'>Other Charges</td></tr>\n",
            style.soft_heading_bg, header_color, cell
        ));
        for item in &config.constant_line_items {
            html.push_str(&format!("<tr style='{}'>", row_bg(row_index)));
            html.push_str(&format!(
                "<td style='{}text-align:left;font-weight:500;color:{};'>{}</td>",
                cell, style.text_color, item.description
            ));
            html.push_str(&format!("<td style='{}text-align:right;'></td>", cell));
            html.push_str(&format!("<td style='{}text-align:right;'></td>", cell));
            html.push_str(&format!(
                "<td style='{}text-align:right;font-weight:500;color:{};'>{}</td>",
                cell,
                style.text_color,
                money(&c.currency_symbol, item.amount)
            ));
            html.push_str("</tr>\n");
            row_index += 1;
        }
    }

    html.push_str("<tr>");
    html.push_str(&format!(
        "<td style='{}text-align:left;font-weight:700;background:{};color:{};'>Total</td>",
        cell, style.table_header_bg, header_color
    ));
    html.push_str(&format!(
        "<td style='{}text-align:right;font-weight:700;background:{};color:{};'>{:.2}</td>",
        cell, style.table_header_bg, header_color, breakdown.total_hours
    ));
    html.push_str(&format!(
        "<td style='{}text-align:right;background:{};'></td>",
        cell, style.table_header_bg
    ));
    html.push_str(&format!(
        "<td style='{}text-align:right;font-weight:700;background:{};color:{};'>{}</td>",
        cell,
        style.table_header_bg,
        header_color,
        money(&c.currency_symbol, breakdown.total_amount)
    ));
    html.push_str("</tr>\n</table>\n");

    html.push_str(&format!(
        "<div style='background:{};color:{};border-left:6px solid {};padding:1.3em 2.2em;border-radius:10px;display:inline-block;font-size:1.4em;margin-top:1.5em;margin-bottom:3em;font-weight:700;box-shadow:0 2px 8px rgba(44,62,80,0.06);'>Amount Due: {}</div>\n",
        style.soft_heading_bg,
        amount_due_color,
        style.accent_color,
        money(&c.currency_symbol, breakdown.total_amount)
    ));

    html.push_str("</div>\n</body></html>\n");
    html
}
