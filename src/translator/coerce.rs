//! Coercion of loosely typed form values into wire values.

use super::error::TranslationError;
use crate::model::{KeyEntry, Value, ValueType};
use serde_json::Value as Json;

/// Largest value a colour picker can produce (24-bit RGB).
const MAX_COLOR: i64 = 0xFF_FFFF;

enum Clash {
    Mismatch,
    Range(String),
}

/// Coerces one present raw value to the entry's declared type.
pub(crate) fn coerce(entry: &KeyEntry, raw: &Json) -> Result<Value, TranslationError> {
    let result = match entry.value_type {
        ValueType::Int => integer(raw).and_then(|n| {
            i32::try_from(n)
                .map(Value::Int)
                .map_err(|_| Clash::Range(n.to_string()))
        }),
        ValueType::UInt => integer(raw).and_then(|n| {
            u32::try_from(n)
                .map(Value::UInt)
                .map_err(|_| Clash::Range(n.to_string()))
        }),
        ValueType::Bool => boolean(raw).map(|b| Value::Int(i32::from(b))),
        ValueType::Color => color(raw).map(Value::Int),
        ValueType::String => text(raw).map(Value::Str),
        ValueType::Bytes => bytes(raw).map(Value::Bytes),
    };

    result.map_err(|clash| match clash {
        Clash::Mismatch => TranslationError::TypeMismatch {
            name: entry.name.clone(),
            key: entry.key,
            expected: entry.value_type,
            found: describe(raw),
        },
        Clash::Range(value) => TranslationError::OutOfRange {
            name: entry.name.clone(),
            key: entry.key,
            expected: entry.value_type,
            value,
        },
    })
}

fn integer(raw: &Json) -> Result<i64, Clash> {
    match raw {
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Err(Clash::Range(n.to_string()))
            } else {
                let f = n.as_f64().ok_or(Clash::Mismatch)?;
                if f.fract() != 0.0 {
                    return Err(Clash::Mismatch);
                }
                if f < i64::MIN as f64 || f > i64::MAX as f64 {
                    return Err(Clash::Range(n.to_string()));
                }
                Ok(f as i64)
            }
        }
        Json::String(s) => s.trim().parse::<i64>().map_err(|_| Clash::Mismatch),
        Json::Bool(b) => Ok(i64::from(*b)),
        _ => Err(Clash::Mismatch),
    }
}

fn boolean(raw: &Json) -> Result<bool, Clash> {
    match raw {
        Json::Bool(b) => Ok(*b),
        Json::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(Clash::Range(n.to_string())),
        },
        Json::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(Clash::Mismatch),
        },
        _ => Err(Clash::Mismatch),
    }
}

fn color(raw: &Json) -> Result<i32, Clash> {
    let rgb = match raw {
        Json::Number(n) => n.as_i64().ok_or(Clash::Mismatch)?,
        Json::String(s) => {
            let s = s.trim();
            let hex = s
                .strip_prefix('#')
                .or_else(|| s.strip_prefix("0x"))
                .or_else(|| s.strip_prefix("0X"))
                .unwrap_or(s);
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Clash::Mismatch);
            }
            let hex = match hex.len() {
                6 => hex.to_string(),
                // CSS shorthand: #abc is #aabbcc
                3 => hex.chars().flat_map(|c| [c, c]).collect(),
                _ => return Err(Clash::Mismatch),
            };
            i64::from_str_radix(&hex, 16).map_err(|_| Clash::Mismatch)?
        }
        _ => return Err(Clash::Mismatch),
    };
    if !(0..=MAX_COLOR).contains(&rgb) {
        return Err(Clash::Range(rgb.to_string()));
    }
    i32::try_from(rgb).map_err(|_| Clash::Range(rgb.to_string()))
}

fn text(raw: &Json) -> Result<String, Clash> {
    match raw {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Bool(b) => Ok(b.to_string()),
        _ => Err(Clash::Mismatch),
    }
}

fn bytes(raw: &Json) -> Result<Vec<u8>, Clash> {
    match raw {
        Json::Array(items) => items
            .iter()
            .map(|item| match item.as_u64() {
                Some(b) => u8::try_from(b).map_err(|_| Clash::Range(b.to_string())),
                None => Err(Clash::Mismatch),
            })
            .collect(),
        Json::String(s) => Ok(s.as_bytes().to_vec()),
        _ => Err(Clash::Mismatch),
    }
}

fn describe(raw: &Json) -> String {
    match raw {
        Json::Null => "null".to_string(),
        Json::Bool(b) => format!("bool {}", b),
        Json::Number(n) => format!("number {}", n),
        Json::String(s) => format!("string {:?}", s),
        Json::Array(_) => "array".to_string(),
        Json::Object(_) => "object".to_string(),
    }
}
