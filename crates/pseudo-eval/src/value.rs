//! Runtime data types and values.

use std::fmt;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};
use pseudo_types::ast::PrimitiveType;

use crate::scope::{Members, Place};

// ══════════════════════════════════════════════════════════════════════════════
// DataType
// ══════════════════════════════════════════════════════════════════════════════

/// The type of a variable or value.
///
/// User-defined kinds carry their definition name; two of them are equal
/// only when the names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Date,
    Enum(String),
    Pointer(String),
    Composite(String),
}

impl DataType {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Enum(_) | Self::Pointer(_) | Self::Composite(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Real)
    }
}

impl From<PrimitiveType> for DataType {
    fn from(p: PrimitiveType) -> Self {
        match p {
            PrimitiveType::Integer => Self::Integer,
            PrimitiveType::Real => Self::Real,
            PrimitiveType::Boolean => Self::Boolean,
            PrimitiveType::Char => Self::Char,
            PrimitiveType::String => Self::String,
            PrimitiveType::Date => Self::Date,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("INTEGER"),
            Self::Real => f.write_str("REAL"),
            Self::Boolean => f.write_str("BOOLEAN"),
            Self::Char => f.write_str("CHAR"),
            Self::String => f.write_str("STRING"),
            Self::Date => f.write_str("DATE"),
            Self::Enum(name) | Self::Pointer(name) | Self::Composite(name) => f.write_str(name),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Value
// ══════════════════════════════════════════════════════════════════════════════

/// An enumeration definition: its name and ordered value names.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub def: Rc<EnumDef>,
    pub index: usize,
}

impl EnumValue {
    /// The value's name, e.g. `Tue`.
    pub fn name(&self) -> &str {
        self.def.values.get(self.index).map_or("", String::as_str)
    }

    /// Move `offset` steps along the definition, wrapping in both directions.
    pub fn offset(&self, offset: i64) -> EnumValue {
        let len = self.def.values.len().max(1) as i64;
        let index = (self.index as i64).wrapping_add(offset).rem_euclid(len);
        EnumValue {
            def: Rc::clone(&self.def),
            index: index as usize,
        }
    }
}

/// A typed pointer; `target` is `None` until something is assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerValue {
    pub type_name: String,
    pub target: Option<Place>,
}

/// A record instance. Members are owned inline, so cloning copies them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_name: String,
    pub members: Members,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Char(char),
    String(String),
    Date(NaiveDate),
    Enum(EnumValue),
    Pointer(PointerValue),
    Composite(Record),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Integer(_) => DataType::Integer,
            Self::Real(_) => DataType::Real,
            Self::Boolean(_) => DataType::Boolean,
            Self::Char(_) => DataType::Char,
            Self::String(_) => DataType::String,
            Self::Date(_) => DataType::Date,
            Self::Enum(e) => DataType::Enum(e.def.name.clone()),
            Self::Pointer(p) => DataType::Pointer(p.type_name.clone()),
            Self::Composite(r) => DataType::Composite(r.type_name.clone()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Real(x) => Some(*x),
            _ => None,
        }
    }

    /// The coercions applied silently at assignment, binding, return and CASE:
    /// INTEGER to REAL, and CHAR to and from a one-character STRING.
    pub fn coerce(self, target: &DataType) -> Option<Value> {
        match (self, target) {
            (v, t) if &v.data_type() == t => Some(v),
            (Self::Integer(n), DataType::Real) => Some(Self::Real(n as f64)),
            (Self::String(s), DataType::Char) => single_char(&s).map(Self::Char),
            (Self::Char(c), DataType::String) => Some(Self::String(c.to_string())),
            _ => None,
        }
    }

    /// Explicit primitive conversion. `None` when the conversion is not
    /// defined or the text does not parse.
    pub fn convert(&self, target: &DataType) -> Option<Value> {
        if &self.data_type() == target {
            return Some(self.clone());
        }
        match (self, target) {
            (Self::Integer(n), DataType::Real) => Some(Self::Real(*n as f64)),
            (Self::Integer(n), DataType::Boolean) => Some(Self::Boolean(*n != 0)),
            (Self::Integer(n), DataType::Char) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .map(Self::Char),
            (Self::Real(x), DataType::Integer) => Some(Self::Integer(x.trunc() as i64)),
            (Self::Real(x), DataType::Boolean) => Some(Self::Boolean(*x != 0.0)),
            (Self::Boolean(b), DataType::Integer) => Some(Self::Integer(i64::from(*b))),
            (Self::Boolean(b), DataType::Real) => Some(Self::Real(if *b { 1.0 } else { 0.0 })),
            (Self::Char(c), DataType::Integer) => Some(Self::Integer(i64::from(u32::from(*c)))),
            (Self::Char(c), DataType::Real) => Some(Self::Real(f64::from(u32::from(*c)))),
            (Self::String(s), DataType::Integer) => s.trim().parse().ok().map(Self::Integer),
            (Self::String(s), DataType::Real) => s.trim().parse().ok().map(Self::Real),
            (Self::String(s), DataType::Boolean) => Some(Self::Boolean(s == "TRUE")),
            (Self::String(s), DataType::Char) => single_char(s).map(Self::Char),
            (v, DataType::String) if v.data_type().is_primitive() => {
                Some(Self::String(v.to_string()))
            }
            _ => None,
        }
    }

    /// Day count used to order dates.
    pub(crate) fn date_ordinal(date: &NaiveDate) -> i64 {
        i64::from(date.num_days_from_ce())
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// `3.0` keeps its `.0`; everything else uses the shortest round-trip form.
pub fn format_real(x: f64) -> String {
    let text = x.to_string();
    if x.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// OUTPUT formatting.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(x) => f.write_str(&format_real(*x)),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Char(c) => write!(f, "{c}"),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{:02}/{:02}/{:04}", d.day(), d.month(), d.year()),
            Self::Enum(e) => f.write_str(e.name()),
            Self::Pointer(p) => write!(f, "{} object", p.type_name),
            Self::Composite(r) => write!(f, "{} object", r.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn weekday(index: usize) -> EnumValue {
        EnumValue {
            def: Rc::new(EnumDef {
                name: "Day".into(),
                values: vec!["Mon".into(), "Tue".into(), "Wed".into()],
            }),
            index,
        }
    }

    #[test]
    fn real_formatting() {
        assert_eq!(Value::Real(3.0).to_string(), "3.0");
        assert_eq!(Value::Real(-2.5).to_string(), "-2.5");
        assert_eq!(Value::Real(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Real(1e21).to_string(), "1000000000000000000000.0");
    }

    #[test]
    fn date_and_bool_formatting() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(Value::Date(d).to_string(), "07/03/2024");
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
    }

    #[test]
    fn enum_offset_wraps_both_ways() {
        assert_eq!(weekday(0).offset(-1).index, 2);
        assert_eq!(weekday(2).offset(1).index, 0);
        assert_eq!(weekday(1).offset(-7).index, 0);
        assert_eq!(weekday(1).offset(300).name(), "Mon");
    }

    #[test]
    fn coercions() {
        assert_eq!(Value::Integer(2).coerce(&DataType::Real), Some(Value::Real(2.0)));
        assert_eq!(
            Value::String("a".into()).coerce(&DataType::Char),
            Some(Value::Char('a'))
        );
        assert_eq!(Value::String("ab".into()).coerce(&DataType::Char), None);
        assert_eq!(Value::Real(2.0).coerce(&DataType::Integer), None);
        assert_eq!(Value::Boolean(true).coerce(&DataType::String), None);
    }

    #[test]
    fn char_string_round_trip() {
        let s = Value::Char('q').convert(&DataType::String).unwrap();
        assert_eq!(s, Value::String("q".into()));
        assert_eq!(s.convert(&DataType::Char), Some(Value::Char('q')));
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::Real(-3.7).convert(&DataType::Integer), Some(Value::Integer(-3)));
        assert_eq!(Value::Char('A').convert(&DataType::Integer), Some(Value::Integer(65)));
        assert_eq!(Value::Integer(66).convert(&DataType::Char), Some(Value::Char('B')));
        assert_eq!(
            Value::String(" 12 ".into()).convert(&DataType::Integer),
            Some(Value::Integer(12))
        );
        assert_eq!(Value::String("x".into()).convert(&DataType::Real), None);
        assert_eq!(
            Value::Boolean(false).convert(&DataType::String),
            Some(Value::String("FALSE".into()))
        );
        assert_eq!(Value::Enum(weekday(0)).convert(&DataType::Integer), None);
    }

    #[test]
    fn named_types_compare_by_name() {
        assert_eq!(DataType::Enum("Day".into()), DataType::Enum("Day".into()));
        assert_ne!(DataType::Composite("A".into()), DataType::Composite("B".into()));
        assert_ne!(DataType::Enum("A".into()), DataType::Pointer("A".into()));
        assert_eq!(Value::Enum(weekday(1)).data_type().to_string(), "Day");
    }
}
