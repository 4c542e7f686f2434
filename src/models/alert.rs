use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::ValidationError;

/// Identity assigned by the alert service when a draft is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trading horizon of an alert. The service stores it as an integer 0..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlertCategory {
    Intraday = 0,
    #[default]
    Swing = 1,
    Weekly = 2,
    Longterm = 3,
    StockOption = 4,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 5] = [
        AlertCategory::Intraday,
        AlertCategory::Swing,
        AlertCategory::Weekly,
        AlertCategory::Longterm,
        AlertCategory::StockOption,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Intraday),
            1 => Some(Self::Swing),
            2 => Some(Self::Weekly),
            3 => Some(Self::Longterm),
            4 => Some(Self::StockOption),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Intraday => "Intraday",
            Self::Swing => "Swing",
            Self::Weekly => "Weekly",
            Self::Longterm => "Longterm",
            Self::StockOption => "Stock Option",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AlertCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || ValidationError::InvalidValue {
            field: "category",
            value: s.to_string(),
        };

        if let Ok(code) = raw.parse::<i64>() {
            return Self::from_code(code).ok_or_else(invalid);
        }

        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "intraday" => Ok(Self::Intraday),
            "swing" => Ok(Self::Swing),
            "weekly" => Ok(Self::Weekly),
            "longterm" => Ok(Self::Longterm),
            "stockoption" | "option" => Ok(Self::StockOption),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for AlertCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Trade side of a listed alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HitSide {
    Buy,
    Short,
}

impl HitSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Short => "SHORT",
        }
    }
}

impl fmt::Display for HitSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HitSide {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SHORT" => Ok(Self::Short),
            _ => Err(ValidationError::InvalidValue {
                field: "side",
                value: s.to_string(),
            }),
        }
    }
}

/// Threshold direction chosen while placing a new alert.
/// On the create endpoint it travels as "UPPER" / "LOWER".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "UPPER", alias = "ABOVE")]
    Above,
    #[default]
    #[serde(rename = "LOWER", alias = "BELOW")]
    Below,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Above => "Above",
            Self::Below => "Below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ABOVE" | "UPPER" => Ok(Self::Above),
            "BELOW" | "LOWER" => Ok(Self::Below),
            _ => Err(ValidationError::InvalidValue {
                field: "direction",
                value: s.to_string(),
            }),
        }
    }
}

// A breakout above the threshold is a buy signal, a break below is a short.
impl From<Direction> for HitSide {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Above => HitSide::Buy,
            Direction::Below => HitSide::Short,
        }
    }
}

impl From<HitSide> for Direction {
    fn from(s: HitSide) -> Self {
        match s {
            HitSide::Buy => Direction::Above,
            HitSide::Short => Direction::Below,
        }
    }
}

/// A persisted alert as held in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireAlert")]
pub struct AlertRecord {
    #[serde(rename = "_id")]
    pub id: AlertId,

    #[serde(rename = "script_name")]
    pub instrument: String,

    #[serde(rename = "alert_for", skip_serializing_if = "Option::is_none")]
    pub category: Option<AlertCategory>,

    #[serde(rename = "hit_side", skip_serializing_if = "Option::is_none")]
    pub side: Option<HitSide>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    pub comment: String,
}

impl AlertRecord {
    pub fn category_or_default(&self) -> AlertCategory {
        self.category.unwrap_or_default()
    }

    pub fn comment_or_placeholder(&self) -> &str {
        if self.comment.trim().is_empty() {
            "No comment"
        } else {
            &self.comment
        }
    }
}

/// Draft sent to the create endpoint. It has no identity yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlert {
    #[serde(rename = "stockName")]
    pub instrument: String,
    pub price: f64,
    pub direction: Direction,
    pub comment: String,
    #[serde(rename = "alertFor")]
    pub category: AlertCategory,
}

/// Body of the update endpoint; unset fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertPatch {
    #[serde(rename = "script_name", skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,

    #[serde(rename = "alert_for", skip_serializing_if = "Option::is_none")]
    pub category: Option<AlertCategory>,

    #[serde(rename = "hit_side", skip_serializing_if = "Option::is_none")]
    pub side: Option<HitSide>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ---------------- Normalization ----------------

/// Lenient shape of an alert as the service returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireAlert {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<Value>,

    #[serde(alias = "stockName", default)]
    pub script_name: Option<String>,

    #[serde(alias = "alertFor", default)]
    pub alert_for: Option<Value>,

    #[serde(default)]
    pub hit_side: Option<String>,

    // create payloads echo the threshold direction instead of a side
    #[serde(default)]
    pub direction: Option<String>,

    #[serde(default)]
    pub price: Option<Value>,

    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("alert has no id")]
    MissingId,
    #[error("alert {0} has no instrument")]
    MissingInstrument(String),
}

impl TryFrom<WireAlert> for AlertRecord {
    type Error = NormalizeError;

    fn try_from(w: WireAlert) -> Result<Self, Self::Error> {
        let id = w.id.as_ref().and_then(coerce_id).ok_or(NormalizeError::MissingId)?;

        let instrument = w
            .script_name
            .as_deref()
            .map(crate::catalog::normalize_symbol)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NormalizeError::MissingInstrument(id.to_string()))?;

        let category = w.alert_for.as_ref().and_then(coerce_category);
        if category.is_none() && w.alert_for.as_ref().is_some_and(|v| !v.is_null()) {
            tracing::warn!("alert {}: ignoring unknown category {:?}", id, w.alert_for);
        }

        let side = w
            .hit_side
            .as_deref()
            .and_then(|s| s.parse::<HitSide>().ok())
            .or_else(|| {
                w.direction
                    .as_deref()
                    .and_then(|d| d.parse::<Direction>().ok())
                    .map(HitSide::from)
            });

        Ok(AlertRecord {
            id,
            instrument,
            category,
            side,
            price: w.price.as_ref().and_then(coerce_price),
            comment: w.comment.unwrap_or_default(),
        })
    }
}

/// Converts a fetched batch, dropping entries that are not persisted alerts.
pub fn normalize_all(items: Vec<WireAlert>) -> Vec<AlertRecord> {
    items
        .into_iter()
        .filter_map(|w| match AlertRecord::try_from(w) {
            Ok(a) => Some(a),
            Err(e) => {
                tracing::warn!("skipping alert from service: {}", e);
                None
            }
        })
        .collect()
}

fn coerce_id(v: &Value) -> Option<AlertId> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(AlertId::new(s.trim())),
        Value::Number(n) => Some(AlertId::new(n.to_string())),
        _ => None,
    }
}

pub fn coerce_category(v: &Value) -> Option<AlertCategory> {
    match v {
        Value::Number(n) => n.as_i64().and_then(AlertCategory::from_code),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn coerce_price(v: &Value) -> Option<f64> {
    let p = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    p.is_finite().then_some(p)
}

// ---------------- Field editing ----------------

/// One typed edit to a form or row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Instrument(String),
    // kept as typed until submit
    Price(String),
    Direction(Direction),
    Side(HitSide),
    Comment(String),
    Category(AlertCategory),
}

impl FieldUpdate {
    /// Coerces a raw `(name, value)` pair the way the input widgets deliver them.
    pub fn parse(name: &str, value: &str) -> Result<Self, ValidationError> {
        match name {
            "instrument" | "script_name" | "stockName" => Ok(Self::Instrument(value.to_string())),
            "price" => Ok(Self::Price(value.to_string())),
            "direction" => Ok(Self::Direction(value.parse()?)),
            "side" | "hit_side" => Ok(Self::Side(value.parse()?)),
            "comment" => Ok(Self::Comment(value.to_string())),
            "category" | "alert_for" | "alertFor" => Ok(Self::Category(value.parse()?)),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// Price rule shared by every submit path: present, numeric, not negative and not zero.
pub fn parse_price(text: &str) -> Result<f64, ValidationError> {
    let raw = text.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingPrice);
    }

    let p: f64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidPrice(raw.to_string()))?;

    if !p.is_finite() {
        return Err(ValidationError::InvalidPrice(raw.to_string()));
    }
    if p < 0.0 {
        return Err(ValidationError::NegativePrice(raw.to_string()));
    }
    if p == 0.0 {
        return Err(ValidationError::MissingPrice);
    }

    Ok(p)
}

pub fn format_price(p: f64) -> String {
    p.to_string()
}

// unparseable text counts as zero, like an empty number input
fn stepper_value(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

pub fn increment_price_text(text: &str) -> String {
    format_price(stepper_value(text) + 1.0)
}

pub fn decrement_price_text(text: &str) -> String {
    format_price((stepper_value(text) - 1.0).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listed_alert_is_normalized() {
        let a: AlertRecord = serde_json::from_value(json!({
            "_id": "65f0c0ffee",
            "script_name": "nifty",
            "alert_for": "3",
            "hit_side": "short",
            "price": "101.5",
        }))
        .unwrap();

        assert_eq!(a.id.as_str(), "65f0c0ffee");
        assert_eq!(a.instrument, "NIFTY");
        assert_eq!(a.category, Some(AlertCategory::Longterm));
        assert_eq!(a.side, Some(HitSide::Short));
        assert_eq!(a.price, Some(101.5));
        assert_eq!(a.comment, "");
        assert_eq!(a.comment_or_placeholder(), "No comment");
    }

    #[test]
    fn create_echo_maps_direction_to_side() {
        let a: AlertRecord = serde_json::from_value(json!({
            "_id": 7,
            "stockName": "DABUR",
            "alertFor": 1,
            "direction": "UPPER",
            "price": 100,
            "comment": "breakout"
        }))
        .unwrap();

        assert_eq!(a.id.as_str(), "7");
        assert_eq!(a.side, Some(HitSide::Buy));
        assert_eq!(a.category_or_default(), AlertCategory::Swing);
    }

    #[test]
    fn unset_or_unknown_category_defaults_to_swing() {
        let a: AlertRecord = serde_json::from_value(json!({
            "_id": "x", "script_name": "SENSEX", "alert_for": 9
        }))
        .unwrap();
        assert_eq!(a.category, None);
        assert_eq!(a.category_or_default(), AlertCategory::Swing);
        assert_eq!(a.price, None);
    }

    #[test]
    fn drafts_without_id_are_dropped_from_batches() {
        let batch: Vec<WireAlert> = serde_json::from_value(json!([
            { "script_name": "NIFTY", "price": 1 },
            { "_id": "a1", "script_name": "NIFTY", "price": 1 },
            { "_id": "a2", "script_name": "" },
        ]))
        .unwrap();

        let out = normalize_all(batch);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, AlertId::new("a1"));
    }

    #[test]
    fn draft_uses_create_wire_names() {
        let draft = NewAlert {
            instrument: "NIFTY".into(),
            price: 100.0,
            direction: Direction::Above,
            comment: String::new(),
            category: AlertCategory::Swing,
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({ "stockName": "NIFTY", "price": 100.0, "direction": "UPPER", "comment": "", "alertFor": 1 })
        );
    }

    #[test]
    fn patch_omits_unset_fields() {
        let patch = AlertPatch {
            side: Some(HitSide::Buy),
            price: Some(12.0),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "hit_side": "BUY", "price": 12.0 }));
    }

    #[test]
    fn category_parses_codes_and_labels() {
        assert_eq!("4".parse::<AlertCategory>().unwrap(), AlertCategory::StockOption);
        assert_eq!("Stock Option".parse::<AlertCategory>().unwrap(), AlertCategory::StockOption);
        assert_eq!("weekly".parse::<AlertCategory>().unwrap(), AlertCategory::Weekly);
        assert!("5".parse::<AlertCategory>().is_err());
    }

    #[test]
    fn field_update_coerces_by_name() {
        assert_eq!(
            FieldUpdate::parse("category", "2").unwrap(),
            FieldUpdate::Category(AlertCategory::Weekly)
        );
        assert_eq!(
            FieldUpdate::parse("price", "abc").unwrap(),
            FieldUpdate::Price("abc".into())
        );
        assert_eq!(
            FieldUpdate::parse("direction", "below").unwrap(),
            FieldUpdate::Direction(Direction::Below)
        );
        assert!(matches!(
            FieldUpdate::parse("colour", "red"),
            Err(ValidationError::UnknownField(_))
        ));
    }

    #[test]
    fn price_rule_rejects_empty_zero_negative_and_garbage() {
        assert_eq!(parse_price(" 12.5 "), Ok(12.5));
        assert_eq!(parse_price(""), Err(ValidationError::MissingPrice));
        assert_eq!(parse_price("0"), Err(ValidationError::MissingPrice));
        assert_eq!(parse_price("-3"), Err(ValidationError::NegativePrice("-3".into())));
        assert_eq!(parse_price("ten"), Err(ValidationError::InvalidPrice("ten".into())));
        assert_eq!(parse_price("inf"), Err(ValidationError::InvalidPrice("inf".into())));
    }

    #[test]
    fn stepper_floors_at_zero() {
        assert_eq!(decrement_price_text("0"), "0");
        assert_eq!(decrement_price_text("0.5"), "0");
        assert_eq!(decrement_price_text("-4"), "0");
        assert_eq!(decrement_price_text("10"), "9");
        assert_eq!(increment_price_text(""), "1");
        assert_eq!(increment_price_text("abc"), "1");
    }

    #[test]
    fn direction_and_side_map_both_ways() {
        for d in [Direction::Above, Direction::Below] {
            assert_eq!(Direction::from(HitSide::from(d)), d);
        }
    }
}
