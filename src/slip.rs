//! Printable measurement slip.
//!
//! Renders a self-contained A5 HTML document in Urdu for a customer's
//! measurement record. The document is handed to the shell for printing
//! or preview; rendering itself touches no I/O, so it can be tested as a
//! pure function.

use crate::db::{Customer, CustomerMeasurement, Order, Settings};
use crate::format::format_date;
use crate::templates::{
    choice_label_ur, DESIGN_OPTIONS, EXTRA_FIELDS, MEASUREMENT_FIELDS, SELECT_FIELDS,
};

/// Order details printed on the slip when it is produced for a specific
/// order rather than the customer's record alone. Worker names are
/// resolved by the caller.
#[derive(Debug, Clone, Copy)]
pub struct SlipOrder<'a> {
    pub order: &'a Order,
    pub cutter: Option<&'a str>,
    pub checker: Option<&'a str>,
    pub karigar: Option<&'a str>,
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Shown in the farmaish box when no design option is ticked.
pub const NO_FARMAISH: &str = "کوئی فرمائش منتخب نہیں";

/// Stylesheet for the Urdu slip font; overridable through config.
pub const DEFAULT_FONT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Noto+Nastaliq+Urdu:wght@400;700&display=swap";

/// Render the slip document. `date` is the display date printed in the
/// header (DD/MM/YYYY); callers pass `format::today_display()` outside
/// of tests.
pub fn render_slip(
    customer: &Customer,
    measurement: &CustomerMeasurement,
    settings: &Settings,
    order: Option<&SlipOrder>,
    date: &str,
    font_url: &str,
) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str(
        r#"<!DOCTYPE html>
<html dir="rtl" lang="ur">
<head>
<meta charset="utf-8">
<title>Measurement Slip</title>
"#,
    );
    html.push_str(&format!(
        "<link href=\"{}\" rel=\"stylesheet\">\n",
        html_escape(font_url)
    ));
    html.push_str(
        r#"<style>
  @page { size: A5 portrait; margin: 8mm; }
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body {
    font-family: 'Noto Nastaliq Urdu', serif;
    font-size: 11pt;
    direction: rtl;
    color: #000;
  }
  .header { text-align: center; border-bottom: 2px solid #000; padding-bottom: 4mm; }
  .header .shop { font-size: 16pt; font-weight: 700; }
  .header .contact { font-size: 9pt; }
  .meta { display: flex; justify-content: space-between; padding: 3mm 0; font-size: 10pt; }
  .columns { display: flex; gap: 4mm; }
  .columns > div { flex: 1; }
  table { width: 100%; border-collapse: collapse; }
  td { border: 1px solid #000; padding: 1mm 2mm; line-height: 1.9; }
  td.label { font-weight: 700; width: 55%; }
  td.value { text-align: center; }
  .farmaish { margin-top: 4mm; border: 1px solid #000; padding: 2mm; }
  .farmaish .title { font-weight: 700; border-bottom: 1px solid #000; margin-bottom: 1mm; }
  .farmaish ul { list-style: none; }
  .farmaish li::before { content: '\2713 '; }
  .footer { margin-top: 4mm; text-align: center; font-size: 9pt; border-top: 1px dashed #000; padding-top: 2mm; }
</style>
</head>
<body>
"#,
    );

    // Header
    html.push_str("<div class=\"header\">\n");
    html.push_str(&format!(
        "  <div class=\"shop\">{}</div>\n",
        html_escape(&settings.shop_name)
    ));
    if !settings.address.is_empty() {
        html.push_str(&format!(
            "  <div class=\"contact\">{}</div>\n",
            html_escape(&settings.address)
        ));
    }
    let phones = settings.phones_line();
    if !phones.is_empty() {
        html.push_str(&format!(
            "  <div class=\"contact\">{}</div>\n",
            html_escape(&phones)
        ));
    }
    html.push_str("</div>\n");

    // Customer line
    html.push_str("<div class=\"meta\">\n");
    html.push_str(&format!(
        "  <span>نام: {}</span>\n",
        html_escape(&customer.name)
    ));
    html.push_str(&format!("  <span>تاریخ: {}</span>\n", html_escape(date)));
    html.push_str("</div>\n");

    // Order line, only on slips printed for a specific order
    if let Some(slip_order) = order {
        html.push_str("<div class=\"meta\">\n");
        if let Some(id) = slip_order.order.id {
            html.push_str(&format!("  <span>آرڈر نمبر: {}</span>\n", id));
        }
        html.push_str(&format!(
            "  <span>واپسی: {}</span>\n",
            html_escape(&format_date(&slip_order.order.due_date))
        ));
        if let Some(advance) = slip_order.order.advance_payment.as_deref() {
            if !advance.is_empty() {
                html.push_str(&format!("  <span>ایڈوانس: {}</span>\n", html_escape(advance)));
            }
        }
        html.push_str("</div>\n");

        let workers: Vec<String> = [
            ("کٹنگ", slip_order.cutter),
            ("چیکنگ", slip_order.checker),
            ("کاریگر", slip_order.karigar),
        ]
        .iter()
        .filter_map(|(label, name)| name.map(|n| format!("{}: {}", label, html_escape(n))))
        .collect();
        if !workers.is_empty() {
            html.push_str(&format!(
                "<div class=\"meta\">\n  <span>{}</span>\n</div>\n",
                workers.join(" &nbsp;|&nbsp; ")
            ));
        }
    }

    // Measurement tables: core fields on one side, style details on the
    // other. Core rows always print, even when blank, so the karigar can
    // fill gaps by hand.
    html.push_str("<div class=\"columns\">\n<div>\n<table>\n");
    for field in MEASUREMENT_FIELDS {
        html.push_str(&format!(
            "<tr><td class=\"label\">{}</td><td class=\"value\">{}</td></tr>\n",
            field.label_ur,
            html_escape(measurement.field(field.key)),
        ));
    }
    html.push_str("</table>\n</div>\n<div>\n<table>\n");
    let mut style_rows = 0;
    for select in SELECT_FIELDS {
        let value = measurement.field(select.key);
        if value.is_empty() {
            continue;
        }
        let label = choice_label_ur(select.choices, value)
            .map(str::to_string)
            .unwrap_or_else(|| html_escape(value));
        html.push_str(&format!(
            "<tr><td class=\"label\">{}</td><td class=\"value\">{}</td></tr>\n",
            select.label_ur, label,
        ));
        style_rows += 1;
    }
    for field in EXTRA_FIELDS {
        let value = measurement.field(field.key);
        if value.is_empty() {
            continue;
        }
        html.push_str(&format!(
            "<tr><td class=\"label\">{}</td><td class=\"value\">{}</td></tr>\n",
            field.label_ur,
            html_escape(value),
        ));
        style_rows += 1;
    }
    if style_rows == 0 {
        html.push_str("<tr><td class=\"value\">—</td></tr>\n");
    }
    html.push_str("</table>\n</div>\n</div>\n");

    // Farmaish checklist
    html.push_str("<div class=\"farmaish\">\n  <div class=\"title\">فرمائش</div>\n");
    let ticked: Vec<&str> = DESIGN_OPTIONS
        .iter()
        .filter(|opt| measurement.option(opt.key))
        .map(|opt| opt.label_ur)
        .collect();
    if ticked.is_empty() {
        html.push_str(&format!("  <div>{}</div>\n", NO_FARMAISH));
    } else {
        html.push_str("  <ul>\n");
        for label in ticked {
            html.push_str(&format!("    <li>{}</li>\n", label));
        }
        html.push_str("  </ul>\n");
    }
    html.push_str("</div>\n");

    // Footer
    html.push_str(&format!(
        "<div class=\"footer\">فون: {}</div>\n",
        html_escape(&customer.phone)
    ));
    html.push_str("</body>\n</html>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Settings;
    use std::collections::BTreeMap;

    fn customer(name: &str, phone: &str) -> Customer {
        Customer {
            id: Some(1),
            name: name.to_string(),
            phone: phone.to_string(),
            address: None,
            photo: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_empty_measurement_still_renders_core_rows() {
        let html = render_slip(
            &customer("Bilal", "0313-9001122"),
            &CustomerMeasurement::empty(1),
            &Settings::default(),
            None,
            "27/08/2026",
            DEFAULT_FONT_URL,
        );
        for field in MEASUREMENT_FIELDS {
            assert!(html.contains(field.label_ur), "missing row for {}", field.key);
        }
        assert!(html.contains(NO_FARMAISH));
        assert!(html.contains("27/08/2026"));
    }

    #[test]
    fn test_dropdowns_render_urdu_choice_labels() {
        let mut m = CustomerMeasurement::empty(1);
        m.fields.insert("cuff".to_string(), "double".to_string());
        m.fields.insert("length".to_string(), "42.5".to_string());
        let html = render_slip(
            &customer("Bilal", "0313-9001122"),
            &m,
            &Settings::default(),
            None,
            "27/08/2026",
            DEFAULT_FONT_URL,
        );
        assert!(html.contains("ڈبل کف"));
        assert!(html.contains("42.5"));
        // unset dropdowns stay off the slip
        assert!(!html.contains("کالر نوک"));
    }

    #[test]
    fn test_ticked_options_listed() {
        let mut m = CustomerMeasurement::empty(1);
        m.design_options.insert("zip_shalwar".to_string(), true);
        m.design_options.insert("double_silai".to_string(), false);
        let html = render_slip(
            &customer("Bilal", "0313-9001122"),
            &m,
            &Settings::default(),
            None,
            "27/08/2026",
            DEFAULT_FONT_URL,
        );
        assert!(html.contains("زپ شلوار"));
        assert!(!html.contains(NO_FARMAISH));
        assert!(!html.contains("ڈبل سلائی"));
    }

    #[test]
    fn test_hostile_input_is_escaped() {
        let mut m = CustomerMeasurement::empty(1);
        m.fields
            .insert("length".to_string(), "<script>alert(1)</script>".to_string());
        let html = render_slip(
            &customer("<b>Bilal</b>", "0313-9001122"),
            &m,
            &Settings::default(),
            None,
            "27/08/2026",
            DEFAULT_FONT_URL,
        );
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>Bilal</b>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_order_block_lists_due_date_and_workers() {
        use crate::db::OrderStatus;
        let order = Order {
            id: Some(17),
            customer_id: 1,
            status: OrderStatus::New,
            due_date: "2026-09-05".to_string(),
            advance_payment: Some("500".to_string()),
            delivery_notes: None,
            cutter_id: Some(2),
            checker_id: None,
            karigar_id: Some(3),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let slip_order = SlipOrder {
            order: &order,
            cutter: Some("Rashid"),
            checker: None,
            karigar: Some("Imran"),
        };
        let html = render_slip(
            &customer("Bilal", "0313-9001122"),
            &CustomerMeasurement::empty(1),
            &Settings::default(),
            Some(&slip_order),
            "27/08/2026",
            DEFAULT_FONT_URL,
        );
        assert!(html.contains("آرڈر نمبر: 17"));
        assert!(html.contains("05/09/2026"));
        assert!(html.contains("کٹنگ: Rashid"));
        assert!(html.contains("کاریگر: Imran"));
        assert!(!html.contains("چیکنگ"));
    }

    #[test]
    fn test_unknown_dropdown_value_falls_back_to_raw() {
        let mut m = CustomerMeasurement::empty(1);
        m.fields.insert("cuff".to_string(), "bespoke".to_string());
        let html = render_slip(
            &customer("Bilal", "0313-9001122"),
            &m,
            &Settings::default(),
            None,
            "27/08/2026",
            DEFAULT_FONT_URL,
        );
        assert!(html.contains("bespoke"));
    }
}
