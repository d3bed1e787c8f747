use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::ExtractedBillData;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_kwh, r"(?i)(\d+(?:\.\d+)?)\s*kwh");
re!(re_kwh_upper, r"(\d+(?:\.\d+)?)\s*KWH");
re!(re_total_usage, r"(?i)total\s*usage:?\s*(\d+(?:\.\d+)?)");
re!(re_energy_used, r"(?i)energy\s*used:?\s*(\d+(?:\.\d+)?)");

re!(re_dollar, r"\$(\d+(?:\.\d+)?)");
re!(re_total_amount, r"(?i)total\s*amount:?\s*\$?(\d+(?:\.\d+)?)");
re!(re_amount_due, r"(?i)amount\s*due:?\s*\$?(\d+(?:\.\d+)?)");

re!(re_date, r"(\w+\s+\d{1,2},?\s+\d{4})");

// ── Rule table ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericField {
    Consumption,
    Amount,
}

const PERIOD_CONFIDENCE: f32 = 0.2;
const PROVIDER_CONFIDENCE: f32 = 0.1;

/// Priority-ordered (pattern, field, contribution) rules. Evaluated in
/// sequence; the first match for a field wins and later rules for that field
/// are skipped.
fn numeric_rules() -> [(&'static Regex, NumericField, f32); 7] {
    [
        (re_kwh(), NumericField::Consumption, 0.3),
        (re_kwh_upper(), NumericField::Consumption, 0.3),
        (re_total_usage(), NumericField::Consumption, 0.3),
        (re_energy_used(), NumericField::Consumption, 0.3),
        (re_dollar(), NumericField::Amount, 0.2),
        (re_total_amount(), NumericField::Amount, 0.2),
        (re_amount_due(), NumericField::Amount, 0.2),
    ]
}

const PROVIDERS: [&str; 5] =
    ["PG&E", "ConEd", "Duke Energy", "Southern Company", "Electric Company"];

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct BillExtractor;

impl BillExtractor {
    /// Extract structured bill fields from raw OCR text. A value that fails
    /// to parse leaves its field at the default with no confidence
    /// contribution; the remaining fields are still extracted.
    pub fn extract(text: &str) -> ExtractedBillData {
        let mut data = ExtractedBillData::default();
        let mut confidence = 0.0f32;

        let mut consumption_matched = false;
        let mut amount_matched = false;
        for (pattern, field, contribution) in numeric_rules() {
            let matched = match field {
                NumericField::Consumption => &mut consumption_matched,
                NumericField::Amount => &mut amount_matched,
            };
            if *matched {
                continue;
            }
            if let Some(captures) = pattern.captures(text) {
                // First match wins even when the number doesn't parse.
                *matched = true;
                if let Some(value) = captures.get(1).and_then(|m| parse_number(m.as_str())) {
                    match field {
                        NumericField::Consumption => data.consumption_kwh = value,
                        NumericField::Amount => data.amount = value,
                    }
                    confidence += contribution;
                }
            }
        }

        let dates: Vec<&str> = re_date().find_iter(text).map(|m| m.as_str()).collect();
        if dates.len() >= 2 {
            data.service_period = format!("{} - {}", dates[0], dates[1]);
            confidence += PERIOD_CONFIDENCE;
        }

        let lowered = text.to_lowercase();
        if let Some(provider) = PROVIDERS
            .iter()
            .find(|p| lowered.contains(&p.to_lowercase()))
        {
            data.provider = (*provider).to_string();
            confidence += PROVIDER_CONFIDENCE;
        }

        data.confidence = confidence.clamp(0.0, 1.0);
        data
    }
}

fn parse_number(s: &str) -> Option<f64> {
    Decimal::from_str(s).ok()?.to_f64()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
