//! Parameter types and raw-string conversion.
//!
//! Every declared parameter type converts a raw command-line string into a
//! non-empty list of values. Only `float` can yield more than one value, via
//! the `start:stop:count` interval syntax.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// Declared type of a runner parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Str,
    Int,
    Float,
    Path,
}

impl ParamType {
    /// Type name as written in a `name:type` declaration.
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Str => "str",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Path => "path",
        }
    }

    /// Look up a type by its declaration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "str" => Some(ParamType::Str),
            "int" => Some(ParamType::Int),
            "float" => Some(ParamType::Float),
            "path" => Some(ParamType::Path),
            _ => None,
        }
    }

    /// Convert a raw string into the list of values it denotes.
    ///
    /// The returned list is never empty.
    pub fn convert(&self, raw: &str) -> Result<Vec<ParamValue>, ConversionError> {
        match self {
            ParamType::Str => Ok(vec![ParamValue::Str(raw.to_string())]),
            ParamType::Path => Ok(vec![ParamValue::Path(PathBuf::from(raw))]),
            ParamType::Int => Ok(vec![ParamValue::Int(parse_scalar(raw, "int")?)]),
            ParamType::Float => convert_float_range(raw),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single converted parameter value.
///
/// Serialized with its type tag (`{"type": "path", "value": "/x"}`) so that a
/// path never reads back as a string and `1.0` never reads back as an int.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{value}"),
            // Debug keeps the fractional part: 1.0 renders as "1.0", not "1"
            ParamValue::Float(value) => write!(f, "{value:?}"),
            ParamValue::Str(value) => f.write_str(value),
            ParamValue::Path(value) => write!(f, "{}", value.display()),
        }
    }
}

fn parse_scalar<T: FromStr>(raw: &str, target: &'static str) -> Result<T, ConversionError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConversionError::InvalidValue {
            value: raw.to_string(),
            target,
        })
}

fn convert_float_range(raw: &str) -> Result<Vec<ParamValue>, ConversionError> {
    if !raw.contains(':') {
        return Ok(vec![ParamValue::Float(parse_scalar(raw, "float")?)]);
    }

    let parts: Vec<&str> = raw.split(':').collect();
    let [start, stop, count] = parts.as_slice() else {
        return Err(ConversionError::IntervalFormat {
            value: raw.to_string(),
        });
    };

    let start: f64 = parse_scalar(start, "float")?;
    let stop: f64 = parse_scalar(stop, "float")?;
    let count: i64 = count
        .trim()
        .parse()
        .map_err(|_| ConversionError::IntervalCount {
            value: count.to_string(),
        })?;

    if count < 1 {
        return Err(ConversionError::EmptyInterval { count });
    }

    let too_large = || ConversionError::IntervalTooLarge { count };
    let len = usize::try_from(count).map_err(|_| too_large())?;

    let mut values = Vec::new();
    values.try_reserve_exact(len).map_err(|_| too_large())?;
    values.extend(linspace(start, stop, len).map(ParamValue::Float));
    Ok(values)
}

/// `count` evenly spaced values over `[start, stop]`; the last value is exactly `stop`.
pub fn linspace(start: f64, stop: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (stop - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| {
        if count > 1 && i == count - 1 {
            stop
        } else {
            start + step * i as f64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[ParamValue]) -> Vec<f64> {
        values
            .iter()
            .map(|v| match v {
                ParamValue::Float(f) => *f,
                other => panic!("expected float, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_type_names_roundtrip() {
        for ty in [
            ParamType::Str,
            ParamType::Int,
            ParamType::Float,
            ParamType::Path,
        ] {
            assert_eq!(ParamType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ParamType::from_name("bool"), None);
    }

    #[test]
    fn test_str_and_path_are_passed_through() {
        assert_eq!(
            ParamType::Str.convert("a b:c").unwrap(),
            vec![ParamValue::Str("a b:c".to_string())]
        );
        assert_eq!(
            ParamType::Path.convert("/tmp/x.tif").unwrap(),
            vec![ParamValue::Path(PathBuf::from("/tmp/x.tif"))]
        );
    }

    #[test]
    fn test_int_conversion() {
        assert_eq!(
            ParamType::Int.convert(" 42 ").unwrap(),
            vec![ParamValue::Int(42)]
        );

        let err = ParamType::Int.convert("4.2").unwrap_err();
        assert_eq!(
            err,
            ConversionError::InvalidValue {
                value: "4.2".to_string(),
                target: "int"
            }
        );
    }

    #[test]
    fn test_float_without_colon_is_scalar() {
        assert_eq!(
            floats(&ParamType::Float.convert("2.5").unwrap()),
            vec![2.5]
        );
        assert!(ParamType::Float.convert("fast").is_err());
    }

    #[test]
    fn test_float_range_expansion() {
        let values = ParamType::Float.convert("1:5:3").unwrap();
        assert_eq!(floats(&values), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_float_range_single_value_is_start() {
        let values = ParamType::Float.convert("2:9:1").unwrap();
        assert_eq!(floats(&values), vec![2.0]);
    }

    #[test]
    fn test_float_range_descending_ends_at_stop() {
        let values = floats(&ParamType::Float.convert("1:0:4").unwrap());
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[3], 0.0);
    }

    #[test]
    fn test_float_range_wrong_part_count() {
        assert!(matches!(
            ParamType::Float.convert("1:5"),
            Err(ConversionError::IntervalFormat { .. })
        ));
        assert!(matches!(
            ParamType::Float.convert("1:2:3:4"),
            Err(ConversionError::IntervalFormat { .. })
        ));
    }

    #[test]
    fn test_float_range_bad_count() {
        assert!(matches!(
            ParamType::Float.convert("1:5:2.5"),
            Err(ConversionError::IntervalCount { .. })
        ));
        assert_eq!(
            ParamType::Float.convert("1:5:0").unwrap_err(),
            ConversionError::EmptyInterval { count: 0 }
        );
    }

    #[test]
    fn test_float_range_huge_count_is_an_error() {
        assert_eq!(
            ParamType::Float.convert("0:1:9000000000000000000").unwrap_err(),
            ConversionError::IntervalTooLarge {
                count: 9_000_000_000_000_000_000
            }
        );
    }

    #[test]
    fn test_linspace_is_lazy_and_exact() {
        assert_eq!(linspace(0.0, 1.0, 0).count(), 0);
        assert_eq!(linspace(3.0, 9.0, 1).collect::<Vec<_>>(), vec![3.0]);
        assert_eq!(
            linspace(0.0, 1.0, 5).collect::<Vec<_>>(),
            vec![0.0, 0.25, 0.5, 0.75, 1.0]
        );
        assert_eq!(linspace(0.0, 1.0, usize::MAX).take(2).count(), 2);
    }

    #[test]
    fn test_value_serde_keeps_type() {
        let values = vec![
            ParamValue::Int(1),
            ParamValue::Float(1.0),
            ParamValue::Str("/x".to_string()),
            ParamValue::Path(PathBuf::from("/x")),
        ];
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json[3], serde_json::json!({"type": "path", "value": "/x"}));

        let back: Vec<ParamValue> = serde_json::from_value(json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_float_range_bad_bound() {
        assert!(matches!(
            ParamType::Float.convert("a:5:3"),
            Err(ConversionError::InvalidValue { target: "float", .. })
        ));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(ParamValue::Int(7).to_string(), "7");
        assert_eq!(ParamValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ParamValue::Float(0.25).to_string(), "0.25");
        assert_eq!(ParamValue::Str("x".to_string()).to_string(), "x");
        assert_eq!(
            ParamValue::Path(PathBuf::from("data/in.raw")).to_string(),
            "data/in.raw"
        );
    }
}
