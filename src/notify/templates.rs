use chrono::NaiveDateTime;

use crate::models::Report;

const RECEIPT_ID_CHARS: usize = 8;
const RECEIPT_DESCRIPTION_CHARS: usize = 100;

/// Returns the first `max` characters, plus whether anything was cut.
pub fn truncate_chars(s: &str, max: usize) -> (&str, bool) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (&s[..idx], true),
        None => (s, false),
    }
}

/// WhatsApp receipt sent to the reporter.
pub fn receipt_message(report_id: &str, description: &str, now: NaiveDateTime) -> String {
    let (short_id, _) = truncate_chars(report_id, RECEIPT_ID_CHARS);
    let (details, cut) = truncate_chars(description, RECEIPT_DESCRIPTION_CHARS);
    let ellipsis = if cut { "..." } else { "" };
    format!(
        "🆘 *RescueRadar Report Received*\n\
         \n\
         Thank you for reporting an animal in need!\n\
         \n\
         📋 Report ID: {short_id}\n\
         📝 Details: {details}{ellipsis}\n\
         ⏰ Time: {time}\n\
         \n\
         ✅ Your report has been forwarded to local rescue teams.\n\
         \n\
         🚨 Emergency? Also contact local authorities immediately.\n\
         \n\
         Reply to this message if you have updates.",
        time = now.format("%m/%d at %I:%M %p"),
    )
}

pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

pub fn rescue_team_alert(report: &Report) -> EmailContent {
    let severity = ai_field(report, "severity").unwrap_or_else(|| "Unknown".to_string());
    let mut details = format!(
        "<p><strong>Location:</strong> {}</p>\
         <p><strong>Description:</strong> {}</p>\
         <p><strong>Urgency Level:</strong> {}</p>\
         <p><strong>Animal:</strong> {}</p>\
         <p><strong>Situation:</strong> {}</p>\
         <p><strong>AI Severity:</strong> {}</p>",
        escape_html(&report.location),
        escape_html(&report.description),
        escape_html(&report.urgency_level),
        escape_html(report.animal_type.as_deref().unwrap_or("Unknown")),
        escape_html(report.situation_type.as_deref().unwrap_or("Unknown")),
        escape_html(&severity),
    );
    if let Some(email) = &report.contact_email {
        details.push_str(&format!("<p><strong>Reporter Contact:</strong> {}</p>", escape_html(email)));
    }
    if report.image_url.is_some() {
        details.push_str("<p><strong>Evidence:</strong> Image attached</p>");
    }

    EmailContent {
        subject: format!("🚨 RescueRadar Alert - New Animal Cruelty Report #{}", report.id),
        html: format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <div style=\"background: #dc2626; padding: 20px;\">\
             <h1 style=\"color: white; margin: 0; text-align: center;\">🚨 URGENT ALERT</h1>\
             <p style=\"color: white; text-align: center;\">New Animal Cruelty Report</p></div>\
             <div style=\"padding: 30px;\"><h2 style=\"color: #dc2626;\">Report ID: {}</h2>\
             <div style=\"background: #fef2f2; border: 1px solid #fecaca; padding: 20px;\">{}</div>\
             <p><strong>Action Required:</strong> Please investigate this report and take appropriate action based on the severity level.</p>\
             </div></div>",
            escape_html(&report.id),
            details
        ),
    }
}

pub fn reporter_confirmation(report: &Report) -> EmailContent {
    EmailContent {
        subject: format!("RescueRadar - Report Confirmation #{}", report.id),
        html: format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <div style=\"background: #f97316; padding: 20px;\">\
             <h1 style=\"color: white; margin: 0; text-align: center;\">🐾 RescueRadar</h1>\
             <p style=\"color: white; text-align: center;\">Animal Cruelty Report Confirmed</p></div>\
             <div style=\"padding: 30px;\"><h2 style=\"color: #f97316;\">Thank You for Your Report</h2>\
             <p>Your report has been successfully submitted and assigned ID: <strong>{}</strong></p>\
             <div style=\"background: #f9fafb; padding: 20px;\">\
             <p><strong>Location:</strong> {}</p>\
             <p><strong>Severity:</strong> {}</p>\
             <p><strong>Status:</strong> Pending Investigation</p></div>\
             <p><strong>Emergency:</strong> If this is an immediate life-threatening situation, please also call your local emergency services.</p>\
             <p style=\"color: #6b7280; font-size: 14px;\">Thank you for helping protect animals. Your report makes a difference.</p>\
             </div></div>",
            escape_html(&report.id),
            escape_html(&report.location),
            escape_html(&ai_field(report, "severity").unwrap_or_else(|| "Under analysis".to_string())),
        ),
    }
}

fn ai_field(report: &Report, key: &str) -> Option<String> {
    let value = report.ai_analysis.as_ref()?.get(key)?;
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
