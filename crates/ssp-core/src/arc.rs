//! Arcs, arc kinds and arc handles.

use crate::error::ArcParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length coordinate. Reflect folds overshooting placements to `2T - end`,
/// which can be negative.
pub type Node = i64;

/// Stable handle of an arc inside a [`crate::Network`]: its insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ArcId(u32);

impl ArcId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn inner(self) -> u32 {
        self.0
    }

    /// Position of this arc in dense per-arc storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Role of an arc in a formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArcKind {
    /// Places one copy of an item.
    Segment,
    /// Item-free arc discarding length.
    Loss,
    /// Closes an object through the mirrored coordinate space.
    Reflect,
}

impl ArcKind {
    /// One-letter code used in arc names.
    pub fn code(self) -> &'static str {
        match self {
            ArcKind::Segment => "s",
            ArcKind::Loss => "l",
            ArcKind::Reflect => "r",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ArcParseError> {
        match code {
            "s" => Ok(ArcKind::Segment),
            "l" => Ok(ArcKind::Loss),
            "r" => Ok(ArcKind::Reflect),
            other => Err(ArcParseError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for ArcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Arc name layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArcNaming {
    /// `x[start,end,item]`
    #[default]
    Short,
    /// `x[start,end,item,kind]`
    Full,
}

/// A transition between two coordinates. Identity is the full 4-tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Arc {
    pub start: Node,
    pub end: Node,
    pub item: Option<usize>,
    pub kind: ArcKind,
}

impl Arc {
    pub fn new(start: Node, end: Node, item: Option<usize>, kind: ArcKind) -> Self {
        Self {
            start,
            end,
            item,
            kind,
        }
    }

    pub fn segment(start: Node, end: Node, item: usize) -> Self {
        Self::new(start, end, Some(item), ArcKind::Segment)
    }

    pub fn loss(start: Node, end: Node) -> Self {
        Self::new(start, end, None, ArcKind::Loss)
    }

    pub fn reflect(start: Node, end: Node, item: Option<usize>) -> Self {
        Self::new(start, end, item, ArcKind::Reflect)
    }

    /// Item index as written in names, `-1` for item-free arcs.
    pub fn item_code(&self) -> i64 {
        self.item.map_or(-1, |item| item as i64)
    }

    pub fn is_loss(&self) -> bool {
        self.kind == ArcKind::Loss
    }

    pub fn is_reflect(&self) -> bool {
        self.kind == ArcKind::Reflect
    }

    pub fn name(&self, naming: ArcNaming) -> String {
        match naming {
            ArcNaming::Short => format!("x[{},{},{}]", self.start, self.end, self.item_code()),
            ArcNaming::Full => format!(
                "x[{},{},{},{}]",
                self.start,
                self.end,
                self.item_code(),
                self.kind.code()
            ),
        }
    }

    /// Parse a name produced by [`Arc::name`]. Three-field names are segment arcs.
    pub fn parse_name(name: &str) -> Result<Self, ArcParseError> {
        let inner = name
            .trim()
            .strip_prefix("x[")
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| ArcParseError::Malformed(name.to_string()))?;
        let fields: Vec<&str> = inner.split(',').map(str::trim).collect();
        if fields.len() != 3 && fields.len() != 4 {
            return Err(ArcParseError::Malformed(name.to_string()));
        }

        let number = |field: usize| -> Result<i64, ArcParseError> {
            fields[field]
                .parse::<i64>()
                .map_err(|_| ArcParseError::InvalidField {
                    name: name.to_string(),
                    field,
                })
        };
        let start = number(0)?;
        let end = number(1)?;
        let item = match number(2)? {
            -1 => None,
            value if value >= 0 => Some(value as usize),
            _ => {
                return Err(ArcParseError::InvalidField {
                    name: name.to_string(),
                    field: 2,
                })
            }
        };
        let kind = match fields.get(3) {
            Some(code) => ArcKind::from_code(code)?,
            None => ArcKind::Segment,
        };
        Ok(Self::new(start, end, item, kind))
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name(ArcNaming::Full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_use_sentinel_for_item_free_arcs() {
        let arc = Arc::loss(8, 6);
        assert_eq!(arc.name(ArcNaming::Short), "x[8,6,-1]");
        assert_eq!(arc.name(ArcNaming::Full), "x[8,6,-1,l]");
        assert_eq!(Arc::segment(0, 6, 0).to_string(), "x[0,6,0,s]");
    }

    #[test]
    fn parse_name_accepts_both_layouts() {
        assert_eq!(Arc::parse_name("x[0,6,0]").unwrap(), Arc::segment(0, 6, 0));
        assert_eq!(
            Arc::parse_name("x[10,10,-1,r]").unwrap(),
            Arc::reflect(10, 10, None)
        );
        assert_eq!(
            Arc::parse_name("x[4,-2,1,r]").unwrap(),
            Arc::reflect(4, -2, Some(1))
        );
    }

    #[test]
    fn parse_name_reports_errors() {
        assert_eq!(
            Arc::parse_name("y[0,1,2]").unwrap_err().code(),
            "ARC_NAME_MALFORMED"
        );
        assert_eq!(
            Arc::parse_name("x[0,a,2]").unwrap_err(),
            ArcParseError::InvalidField {
                name: "x[0,a,2]".to_string(),
                field: 1
            }
        );
        assert_eq!(
            Arc::parse_name("x[0,1,2,q]").unwrap_err(),
            ArcParseError::UnknownKind("q".to_string())
        );
        assert!(Arc::parse_name("x[0,1,-3]").is_err());
    }

    #[test]
    fn kind_codes_roundtrip() {
        for kind in [ArcKind::Segment, ArcKind::Loss, ArcKind::Reflect] {
            assert_eq!(ArcKind::from_code(kind.code()).unwrap(), kind);
        }
    }
}
