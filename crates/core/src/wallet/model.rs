//! pass.json data model.
//!
//! Field names follow the Wallet package format, so everything serializes
//! with camelCase keys and barcode formats use the `PKBarcodeFormat*` names.

use serde::{Deserialize, Serialize};

/// Top-level pass.json document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pass {
    pub format_version: u32,
    pub pass_type_identifier: String,
    pub serial_number: String,
    pub team_identifier: String,
    pub organization_name: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,

    /// ISO 8601 timestamp after which Wallet may hide the pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    /// ISO 8601 timestamp used for lock-screen relevance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcodes: Option<Vec<Barcode>>,

    /// App Store ids of apps associated with this pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associated_store_identifiers: Option<Vec<i64>>,

    // Exactly one style key must be present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_ticket: Option<PassStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic: Option<PassStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boarding_pass: Option<PassStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<PassStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_card: Option<PassStructure>,
}

impl Pass {
    /// The style keys present on this pass, in declaration order.
    pub fn styles(&self) -> Vec<&'static str> {
        let mut present = Vec::new();
        if self.event_ticket.is_some() {
            present.push("eventTicket");
        }
        if self.generic.is_some() {
            present.push("generic");
        }
        if self.boarding_pass.is_some() {
            present.push("boardingPass");
        }
        if self.coupon.is_some() {
            present.push("coupon");
        }
        if self.store_card.is_some() {
            present.push("storeCard");
        }
        present
    }

    /// The single pass structure, if exactly one style is set.
    pub fn structure(&self) -> Option<&PassStructure> {
        let candidates = [
            self.event_ticket.as_ref(),
            self.generic.as_ref(),
            self.boarding_pass.as_ref(),
            self.coupon.as_ref(),
            self.store_card.as_ref(),
        ];
        let mut found = candidates.into_iter().flatten();
        let first = found.next()?;
        if found.next().is_some() {
            return None;
        }
        Some(first)
    }
}

/// Field groups for a pass style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassStructure {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header_fields: Vec<PassField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_fields: Vec<PassField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_fields: Vec<PassField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auxiliary_fields: Vec<PassField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub back_fields: Vec<PassField>,
    /// Required for boardingPass, forbidden elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_type: Option<String>,
}

impl PassStructure {
    /// All fields across every group.
    pub fn all_fields(&self) -> impl Iterator<Item = &PassField> {
        self.header_fields
            .iter()
            .chain(&self.primary_fields)
            .chain(&self.secondary_fields)
            .chain(&self.auxiliary_fields)
            .chain(&self.back_fields)
    }
}

/// A single labeled value on the pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassField {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
}

impl PassField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: Some(label.into()),
            value: value.into(),
        }
    }
}

/// Barcode rendered on the pass front.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barcode {
    pub format: BarcodeFormat,
    pub message: String,
    pub message_encoding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl Barcode {
    pub fn qr(message: impl Into<String>) -> Self {
        Self {
            format: BarcodeFormat::Qr,
            message: message.into(),
            message_encoding: "iso-8859-1".to_string(),
            alt_text: None,
        }
    }
}

/// Supported barcode formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarcodeFormat {
    #[serde(rename = "PKBarcodeFormatQR")]
    Qr,
    #[serde(rename = "PKBarcodeFormatPDF417")]
    Pdf417,
    #[serde(rename = "PKBarcodeFormatAztec")]
    Aztec,
    #[serde(rename = "PKBarcodeFormatCode128")]
    Code128,
}

/// Kind of source document, drives the pass style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Ticket-like documents get the eventTicket layout.
    EventTicket,
    /// Everything else gets the generic layout.
    Generic,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_pass(structure: PassStructure) -> Pass {
        Pass {
            format_version: 1,
            pass_type_identifier: "pass.com.example.test".to_string(),
            serial_number: "abc123".to_string(),
            team_identifier: "TEAM999999".to_string(),
            organization_name: "Example".to_string(),
            description: "Test pass".to_string(),
            logo_text: None,
            foreground_color: None,
            background_color: None,
            label_color: None,
            expiration_date: None,
            relevant_date: None,
            barcodes: None,
            associated_store_identifiers: None,
            event_ticket: Some(structure),
            generic: None,
            boarding_pass: None,
            coupon: None,
            store_card: None,
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let pass = minimal_pass(PassStructure::default());
        let json = serde_json::to_value(&pass).unwrap();

        assert_eq!(json["formatVersion"], 1);
        assert_eq!(json["passTypeIdentifier"], "pass.com.example.test");
        assert!(json.get("eventTicket").is_some());
        assert!(json.get("generic").is_none());
        assert!(json.get("expirationDate").is_none());
    }

    #[test]
    fn test_barcode_format_names() {
        let barcode = Barcode::qr("hello");
        let json = serde_json::to_value(&barcode).unwrap();
        assert_eq!(json["format"], "PKBarcodeFormatQR");
        assert_eq!(json["messageEncoding"], "iso-8859-1");
    }

    #[test]
    fn test_styles_and_structure() {
        let pass = minimal_pass(PassStructure {
            primary_fields: vec![PassField::new("event", "EVENT", "Concert")],
            ..Default::default()
        });

        assert_eq!(pass.styles(), vec!["eventTicket"]);
        let structure = pass.structure().unwrap();
        assert_eq!(structure.primary_fields[0].key, "event");
    }

    #[test]
    fn test_structure_none_when_two_styles() {
        let mut pass = minimal_pass(PassStructure::default());
        pass.generic = Some(PassStructure::default());

        assert_eq!(pass.styles().len(), 2);
        assert!(pass.structure().is_none());
    }

    #[test]
    fn test_empty_field_groups_omitted() {
        let json = serde_json::to_value(PassStructure::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
