//! Builds pass.json documents from extracted metadata.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::certificates::PassIdentifiers;
use crate::config::WalletConfig;
use crate::extract::PassMetadata;

use super::model::{Barcode, DocumentType, Pass, PassField, PassStructure};

/// Wallet renders about this many characters of logo text before clipping.
const MAX_LOGO_TEXT_LEN: usize = 30;
/// Header field values get even less room.
const MAX_HEADER_VALUE_LEN: usize = 20;

const DEFAULT_BACKGROUND: &str = "rgb(60,65,76)";
const DEFAULT_FOREGROUND: &str = "rgb(255,255,255)";
const DEFAULT_LABEL: &str = "rgb(255,255,255)";

/// Days a pass without a known event date stays valid.
const DEFAULT_EXPIRY_DAYS: i64 = 90;

/// Build a pass document for the given metadata.
///
/// Identifiers extracted from the signing certificate take precedence over
/// the configured defaults, so a signed pass always matches the certificate
/// it is signed with.
pub fn build_pass(
    metadata: &PassMetadata,
    serial_number: &str,
    config: &WalletConfig,
    identifiers: Option<&PassIdentifiers>,
) -> Pass {
    let (pass_type_identifier, team_identifier) = match identifiers {
        Some(ids) => (
            ids.pass_type_identifier.clone(),
            ids.team_identifier.clone(),
        ),
        None => (
            config.pass_type_identifier.clone(),
            config.team_identifier.clone(),
        ),
    };

    let structure = build_structure(metadata);
    let barcodes = metadata
        .barcode_message
        .as_ref()
        .map(|message| vec![Barcode::qr(message.clone())]);

    let mut pass = Pass {
        format_version: 1,
        pass_type_identifier,
        serial_number: serial_number.to_string(),
        team_identifier,
        organization_name: config.organization_name.clone(),
        description: metadata.title.clone(),
        logo_text: Some(truncate(&metadata.title, MAX_LOGO_TEXT_LEN)),
        foreground_color: Some(DEFAULT_FOREGROUND.to_string()),
        background_color: Some(DEFAULT_BACKGROUND.to_string()),
        label_color: Some(DEFAULT_LABEL.to_string()),
        expiration_date: Some(format_date(expiration_date(metadata.event_date, Utc::now()))),
        relevant_date: metadata.event_date.map(format_date),
        barcodes,
        associated_store_identifiers: config.app_store_id.map(|id| vec![id]),
        event_ticket: None,
        generic: None,
        boarding_pass: None,
        coupon: None,
        store_card: None,
    };

    match metadata.document_type {
        DocumentType::EventTicket => pass.event_ticket = Some(structure),
        DocumentType::Generic => pass.generic = Some(structure),
    }

    pass
}

fn build_structure(metadata: &PassMetadata) -> PassStructure {
    let mut structure = PassStructure {
        header_fields: vec![PassField::new(
            "title",
            "EVENT",
            truncate(&metadata.title, MAX_HEADER_VALUE_LEN),
        )],
        primary_fields: vec![PassField::new("event", "EVENT", metadata.title.clone())],
        ..Default::default()
    };

    if let Some(date) = metadata.event_date {
        structure.secondary_fields.push(PassField::new(
            "date",
            "DATE",
            date.format("%b %-d, %Y %H:%M").to_string(),
        ));
    }
    if let Some(ref venue) = metadata.venue {
        structure
            .secondary_fields
            .push(PassField::new("venue", "VENUE", venue.clone()));
    }
    if let Some(ref seat) = metadata.seat {
        structure
            .auxiliary_fields
            .push(PassField::new("seat", "SEAT", seat.clone()));
    }

    structure
}

/// Expiry policy: the morning after the event, or a fixed window from now
/// when no event date is known.
fn expiration_date(event_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match event_date {
        Some(event) => {
            let next_day = (event + Duration::days(1)).date_naive();
            match next_day.and_hms_opt(3, 0, 0) {
                Some(naive) => naive.and_utc(),
                None => event + Duration::days(1),
            }
        }
        None => now + Duration::days(DEFAULT_EXPIRY_DAYS),
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
