//! Structural validation of a built pass.
//!
//! Findings are advisory. The pipeline logs them and ships the pass anyway,
//! since Wallet itself is the final arbiter of what it accepts.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::model::Pass;

static RGB_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^rgb\(\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*\)$").unwrap());

static ISO8601_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

/// Validate a pass document, returning all findings.
///
/// An empty result means the pass looks structurally sound.
pub fn validate_pass(pass: &Pass) -> Vec<String> {
    let mut findings = Vec::new();

    if pass.format_version != 1 {
        findings.push(format!(
            "formatVersion must be 1, got {}",
            pass.format_version
        ));
    }

    for (name, value) in [
        ("passTypeIdentifier", &pass.pass_type_identifier),
        ("serialNumber", &pass.serial_number),
        ("teamIdentifier", &pass.team_identifier),
        ("organizationName", &pass.organization_name),
        ("description", &pass.description),
    ] {
        if value.trim().is_empty() {
            findings.push(format!("{} must not be empty", name));
        }
    }

    for (name, value) in [
        ("foregroundColor", &pass.foreground_color),
        ("backgroundColor", &pass.background_color),
        ("labelColor", &pass.label_color),
    ] {
        if let Some(color) = value {
            if !RGB_COLOR.is_match(color) {
                findings.push(format!("{} is not an rgb(r,g,b) value: {}", name, color));
            }
        }
    }

    for (name, value) in [
        ("expirationDate", &pass.expiration_date),
        ("relevantDate", &pass.relevant_date),
    ] {
        if let Some(date) = value {
            if !ISO8601_DATE.is_match(date) {
                findings.push(format!("{} is not an ISO 8601 timestamp: {}", name, date));
            }
        }
    }

    let styles = pass.styles();
    match styles.len() {
        0 => findings.push("pass has no style key".to_string()),
        1 => validate_structure(pass, styles[0], &mut findings),
        _ => findings.push(format!("pass has multiple style keys: {}", styles.join(", "))),
    }

    if let Some(ref barcodes) = pass.barcodes {
        for (i, barcode) in barcodes.iter().enumerate() {
            if barcode.message.is_empty() {
                findings.push(format!("barcode {} has an empty message", i));
            }
            if barcode.message_encoding.is_empty() {
                findings.push(format!("barcode {} has an empty messageEncoding", i));
            }
        }
    }

    findings
}

fn validate_structure(pass: &Pass, style: &str, findings: &mut Vec<String>) {
    let Some(structure) = pass.structure() else {
        return;
    };

    let mut seen = std::collections::HashSet::new();
    for field in structure.all_fields() {
        if field.key.is_empty() {
            findings.push(format!("{} has a field with an empty key", style));
        }
        if !seen.insert(field.key.as_str()) {
            findings.push(format!("{} has duplicate field key: {}", style, field.key));
        }
    }

    if style == "boardingPass" {
        if structure.transit_type.is_none() {
            findings.push("boardingPass requires transitType".to_string());
        }
    } else if structure.transit_type.is_some() {
        findings.push(format!("{} must not set transitType", style));
    }
}
