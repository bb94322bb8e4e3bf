//! Single validation boundary between upstream records and [`Round`].
//!
//! Upstream feeds disagree on field names (English and Vietnamese variants),
//! so every lookup goes through an alias list. Nothing downstream ever sees a
//! raw record.

use crate::errors::NormalizationError;
use crate::model::{Outcome, Round};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const ID_FIELDS: &[&str] = &["id", "phien", "session", "sid", "round"];
// Upstream marks the round it is predicting with these keys; only trusted as a last resort.
const FALLBACK_ID_FIELDS: &[&str] = &["phiendudoan", "phien_hien_tai"];
const DICE_ARRAY_FIELDS: &[&str] = &["dice", "xuc_xac"];
const DICE_TRIPLE_FIELDS: &[[&str; 3]] = &[
    ["d1", "d2", "d3"],
    ["xuc_xac_1", "xuc_xac_2", "xuc_xac_3"],
    ["dice1", "dice2", "dice3"],
];
const SUM_FIELDS: &[&str] = &["sum", "total", "tong"];
const OUTCOME_FIELDS: &[&str] = &["result", "outcome", "ket_qua"];

const BIG_TOKENS: &[&str] = &["tài", "tai", "t", "big", "b"];
const SMALL_TOKENS: &[&str] = &["xỉu", "xiu", "x", "small", "s"];

pub fn normalize(raw: &Value, observed_at: DateTime<Utc>) -> Result<Round, NormalizationError> {
    let obj = raw.as_object().ok_or(NormalizationError::NotAnObject)?;

    let id = parse_id(obj)?;
    let dice = parse_dice(obj)?;
    let computed: u8 = dice.iter().sum();

    if let Some(declared) = field(obj, SUM_FIELDS) {
        match as_u64(declared) {
            Some(n) if n == u64::from(computed) => {}
            _ => {
                return Err(NormalizationError::SumMismatch {
                    declared: display(declared),
                    computed,
                })
            }
        }
    }

    let from_dice = Outcome::from_sum(computed);
    let outcome = match field(obj, OUTCOME_FIELDS) {
        Some(token) => {
            let declared = parse_outcome(token)?;
            if declared != from_dice {
                return Err(NormalizationError::OutcomeMismatch {
                    declared: display(token),
                    sum: computed,
                });
            }
            declared
        }
        None => from_dice,
    };

    Ok(Round {
        id,
        dice,
        sum: computed,
        outcome,
        observed_at,
    })
}

/// Normalizes a whole batch, splitting it into accepted rounds and per-record errors.
pub fn normalize_batch(
    raw: &[Value],
    observed_at: DateTime<Utc>,
) -> (Vec<Round>, Vec<NormalizationError>) {
    let mut rounds = Vec::with_capacity(raw.len());
    let mut errors = Vec::new();
    for record in raw {
        match normalize(record, observed_at) {
            Ok(r) => rounds.push(r),
            Err(e) => errors.push(e),
        }
    }
    (rounds, errors)
}

pub fn parse_outcome(token: &Value) -> Result<Outcome, NormalizationError> {
    let s = match token {
        Value::String(s) => s.trim().to_lowercase(),
        other => {
            return Err(NormalizationError::UnknownOutcome {
                token: other.to_string(),
            })
        }
    };
    if BIG_TOKENS.contains(&s.as_str()) {
        Ok(Outcome::Big)
    } else if SMALL_TOKENS.contains(&s.as_str()) {
        Ok(Outcome::Small)
    } else {
        Err(NormalizationError::UnknownOutcome { token: s })
    }
}

fn parse_id(obj: &Map<String, Value>) -> Result<u64, NormalizationError> {
    let v = field(obj, ID_FIELDS)
        .or_else(|| field(obj, FALLBACK_ID_FIELDS))
        .ok_or(NormalizationError::MissingId)?;
    as_u64(v).ok_or_else(|| NormalizationError::InvalidId { value: display(v) })
}

fn parse_dice(obj: &Map<String, Value>) -> Result<[u8; 3], NormalizationError> {
    let values: Vec<&Value> = if let Some(arr) = field(obj, DICE_ARRAY_FIELDS) {
        match arr.as_array() {
            Some(a) => a.iter().collect(),
            None => return Err(NormalizationError::DiceCount { found: 0 }),
        }
    } else {
        DICE_TRIPLE_FIELDS
            .iter()
            .map(|names| names.iter().filter_map(|n| field(obj, &[*n])).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    };

    if values.len() != 3 {
        return Err(NormalizationError::DiceCount {
            found: values.len(),
        });
    }

    let mut dice = [0u8; 3];
    for (i, v) in values.into_iter().enumerate() {
        dice[i] = match as_u64(v) {
            Some(n @ 1..=6) => n as u8,
            _ => {
                return Err(NormalizationError::DieOutOfRange {
                    index: i + 1,
                    value: display(v),
                })
            }
        };
    }
    Ok(dice)
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| obj.get(*n))
        .find(|v| !v.is_null())
}

fn as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().trim_start_matches('#').parse::<u64>().ok(),
        _ => None,
    }
}

fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_canonical_record() {
        let r = normalize(
            &json!({"id": 1001, "dice": [6, 5, 4], "sum": 15, "result": "Big"}),
            now(),
        )
        .unwrap();
        assert_eq!(r.id, 1001);
        assert_eq!(r.dice, [6, 5, 4]);
        assert_eq!(r.sum, 15);
        assert_eq!(r.outcome, Outcome::Big);
    }

    #[test]
    fn test_vietnamese_aliases() {
        let r = normalize(
            &json!({
                "phien": "#2045",
                "xuc_xac_1": 1, "xuc_xac_2": "2", "xuc_xac_3": 3,
                "tong": 6,
                "ket_qua": "Xỉu"
            }),
            now(),
        )
        .unwrap();
        assert_eq!(r.id, 2045);
        assert_eq!(r.sum, 6);
        assert_eq!(r.outcome, Outcome::Small);
    }

    #[test]
    fn test_fallback_id_only_when_nothing_else() {
        let r = normalize(
            &json!({"phien": 10, "phiendudoan": 11, "dice": [1, 1, 1]}),
            now(),
        )
        .unwrap();
        assert_eq!(r.id, 10);

        let r = normalize(&json!({"phiendudoan": 11, "dice": [1, 1, 1]}), now()).unwrap();
        assert_eq!(r.id, 11);

        let r = normalize(
            &json!({"phien_hien_tai": 12, "session": 11, "dice": [1, 1, 1]}),
            now(),
        )
        .unwrap();
        assert_eq!(r.id, 11);

        let r = normalize(&json!({"phien_hien_tai": 12, "dice": [1, 1, 1]}), now()).unwrap();
        assert_eq!(r.id, 12);
    }

    #[test]
    fn test_outcome_derived_when_absent() {
        let r = normalize(&json!({"id": 5, "d1": 6, "d2": 6, "d3": 1}), now()).unwrap();
        assert_eq!(r.outcome, Outcome::Big);
    }

    #[test]
    fn test_rejects_bad_records() {
        let cases = vec![
            (json!([1, 2, 3]), NormalizationError::NotAnObject),
            (json!({"dice": [1, 2, 3]}), NormalizationError::MissingId),
            (
                json!({"id": -4, "dice": [1, 2, 3]}),
                NormalizationError::InvalidId { value: "-4".into() },
            ),
            (
                json!({"id": 1, "dice": [1, 2]}),
                NormalizationError::DiceCount { found: 2 },
            ),
            (
                json!({"id": 1, "dice": [1, 7, 2]}),
                NormalizationError::DieOutOfRange {
                    index: 2,
                    value: "7".into(),
                },
            ),
            (
                json!({"id": 1, "dice": [1, 2, 3], "sum": 7}),
                NormalizationError::SumMismatch {
                    declared: "7".into(),
                    computed: 6,
                },
            ),
            (
                json!({"id": 1, "dice": [1, 2, 3], "result": "Even"}),
                NormalizationError::UnknownOutcome {
                    token: "even".into(),
                },
            ),
            (
                json!({"id": 1, "dice": [1, 2, 3], "result": "Tài"}),
                NormalizationError::OutcomeMismatch {
                    declared: "Tài".into(),
                    sum: 6,
                },
            ),
        ];

        for (raw, expected) in cases {
            assert_eq!(normalize(&raw, now()).unwrap_err(), expected, "record {raw}");
        }
    }

    #[test]
    fn test_batch_splits_errors() {
        let raw = vec![
            json!({"id": 1, "dice": [1, 2, 3]}),
            json!({"id": "x", "dice": [1, 2, 3]}),
            json!({"id": 2, "dice": [6, 6, 6]}),
        ];
        let (rounds, errors) = normalize_batch(&raw, now());
        assert_eq!(rounds.len(), 2);
        assert_eq!(errors.len(), 1);
    }
}
