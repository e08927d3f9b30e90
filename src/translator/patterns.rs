//! Pattern table stage
//!
//! One labeled expression per style property. Each matches a phrasing such
//! as "عرض رو 300 بذار" and captures the value; every matching entry adds its
//! own key, so one instruction can set several properties. Captures that
//! read as numbers become integers, anything else stays a string.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use super::{normalize_digits, SetupError, TranslateStage};
use crate::layout::patch::Patch;

const PATTERNS: &[(&str, &str)] = &[
    ("paddingTop", r"(?i)(?:فاصله|پدینگ)\s?(?:از\s)?بالا(?:یی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("paddingBottom", r"(?i)(?:فاصله|پدینگ)\s?(?:از\s)?پایین(?:ی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("marginTop", r"(?i)(?:حاشیه|مارجین)\s?(?:از\s)?بالا(?:یی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("marginBottom", r"(?i)(?:حاشیه|مارجین)\s?(?:از\s)?پایین(?:ی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("width", r"(?i)(?:عرض|پهنا)(?:ی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("height", r"(?i)(?:ارتفاع|طول)(?:ی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("fontSize", r"(?i)(?:سایز|اندازه)\s?(?:فونت|متن)(?:ی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("borderRadius", r"(?i)(?:گردی|شعاع)\s?(?:گوشه‌ها|لبه‌ها)(?:ی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:پیکسل)?\s?(?:بذار|کن|تنظیم کن)"),
    ("opacity", r"(?i)(?:شفافیت|تاری)(?:ی)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:درصد)?\s?(?:بذار|کن|تنظیم کن)"),
    ("backgroundColor", r"(?i)(?:رنگ|کالر)\s?(?:پس زمینه|بک گراند|زمینه)(?:ی)?\s?(?:را|رو)\s?(.*?)\s?(?:بذار|کن|تنظیم کن)"),
    ("color", r"(?i)(?:رنگ|کالر)\s?(?:متن|فونت)(?:ی)?\s?(?:را|رو)\s?(.*?)\s?(?:بذار|کن|تنظیم کن)"),
    ("display", r"(?i)(?:نمایش|دیسپلی)(?:ی)?\s?(?:را|رو)\s?(.*?)\s?(?:بذار|کن|تنظیم کن)"),
    ("position", r"(?i)(?:موقعیت|پوزیشن)(?:ی)?\s?(?:را|رو)\s?(.*?)\s?(?:بذار|کن|تنظیم کن)"),
    ("gridColumns", r"(?i)(?:تعداد|شمار)\s?(?:ستون|کالم)(?:ها)?\s?(?:را|رو)\s?(?:به|برامی)?\s?(\d+)\s?(?:بذار|کن|تنظیم کن)"),
];

pub struct PatternStage {
    table: Vec<(&'static str, Regex)>,
}

impl PatternStage {
    pub fn new() -> Result<Self, SetupError> {
        let table = PATTERNS
            .iter()
            .map(|(label, pattern)| {
                Regex::new(pattern)
                    .map(|regex| (*label, regex))
                    .map_err(|source| SetupError::Pattern { label: *label, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { table })
    }

    /// Every property the table recognizes in `text`
    pub fn extract(&self, text: &str) -> Patch {
        let text = normalize_digits(text);
        let mut patch = Patch::new();
        for (label, regex) in &self.table {
            let Some(captured) = regex.captures(&text).and_then(|c| c.get(1)) else {
                continue;
            };
            let value = captured.as_str().trim();
            if !value.is_empty() {
                patch.insert(label.to_string(), coerce(value));
            }
        }
        patch
    }
}

/// Numbers become integers (fractions are truncated), the rest stays text.
/// Numbers outside the `i64` range are kept as text.
fn coerce(value: &str) -> Value {
    if let Ok(integer) = value.parse::<i64>() {
        return Value::from(integer);
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => {
            let truncated = number.trunc();
            if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Value::from(truncated as i64)
            } else {
                Value::String(value.to_string())
            }
        }
        _ => Value::String(value.to_string()),
    }
}

#[async_trait]
impl TranslateStage for PatternStage {
    fn name(&self) -> &'static str {
        "patterns"
    }

    async fn attempt(&self, text: &str) -> Option<Patch> {
        let patch = self.extract(text);
        (!patch.is_empty()).then_some(patch)
    }
}
