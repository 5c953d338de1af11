//! Segmented rig-name codec.
//!
//! Every entity the engine touches is addressed by a segmented name with the
//! layout `[character, kind, name, side, id0..idN, class]`, serialized with a
//! fixed `_` delimiter. A namespace variant (`character:kind:rest`) is
//! normalized into the same segment list on parse. The string layout is the
//! persisted contract other tooling honors; inside the engine names are the
//! typed [`RigName`] struct and scene nodes carry stable ids besides their
//! display name.
//!
//! Segment count is variable only in the id region; all other positions are
//! fixed-index. `append_id` always inserts immediately before `class`.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RigError};

pub const DELIMITER: char = '_';
pub const NAMESPACE_DELIMITER: char = ':';

/// Structural role of a node, encoded as the final name segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    Jnt,
    Cntl,
    Grp,
    Hndl,
    Util,
    Space,
    Pivot,
    Constraint,
}

impl NodeClass {
    pub fn token(self) -> &'static str {
        match self {
            NodeClass::Jnt => "jnt",
            NodeClass::Cntl => "cntl",
            NodeClass::Grp => "grp",
            NodeClass::Hndl => "hndl",
            NodeClass::Util => "util",
            NodeClass::Space => "space",
            NodeClass::Pivot => "pivot",
            NodeClass::Constraint => "constraint",
        }
    }

    pub fn parse(token: &str) -> Option<NodeClass> {
        match token {
            "jnt" => Some(NodeClass::Jnt),
            "cntl" => Some(NodeClass::Cntl),
            "grp" => Some(NodeClass::Grp),
            "hndl" => Some(NodeClass::Hndl),
            "util" => Some(NodeClass::Util),
            "space" => Some(NodeClass::Space),
            "pivot" => Some(NodeClass::Pivot),
            "constraint" => Some(NodeClass::Constraint),
            _ => None,
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Symbolic segment tags. `Ids` addresses the whole id sub-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentTag {
    Character,
    Kind,
    Name,
    Side,
    Ids,
    Class,
}

/// Segment selector: positional (negative = from the end, Python-style) or
/// symbolic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSel {
    Index(isize),
    Tag(SegmentTag),
}

impl From<isize> for SegmentSel {
    fn from(i: isize) -> Self {
        SegmentSel::Index(i)
    }
}

impl From<SegmentTag> for SegmentSel {
    fn from(t: SegmentTag) -> Self {
        SegmentSel::Tag(t)
    }
}

/// Result of a segment lookup; `Ids` is the sub-list of all id segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    One(&'a str),
    Ids(&'a [String]),
}

impl<'a> Segment<'a> {
    /// The single segment value, or an error for the id sub-list.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Segment::One(s) => Some(s),
            Segment::Ids(_) => None,
        }
    }
}

/// A fully segmented entity name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RigName {
    pub character: String,
    pub kind: String,
    pub name: String,
    pub side: String,
    pub ids: Vec<String>,
    pub class: NodeClass,
}

impl RigName {
    pub fn new(
        character: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        side: impl Into<String>,
        class: NodeClass,
    ) -> Self {
        RigName {
            character: character.into(),
            kind: kind.into(),
            name: name.into(),
            side: side.into(),
            ids: Vec::new(),
            class,
        }
    }

    /// Parse a delimited name. A `:`-namespaced name folds into the same
    /// segment list before indexing.
    pub fn parse(raw: &str) -> Result<RigName> {
        let segments: Vec<&str> = if raw.contains(NAMESPACE_DELIMITER) {
            raw.split(NAMESPACE_DELIMITER)
                .flat_map(|part| part.split(DELIMITER))
                .collect()
        } else {
            raw.split(DELIMITER).collect()
        };

        if segments.iter().any(|s| s.is_empty()) {
            return Err(RigError::malformed(raw, "empty segment"));
        }
        if segments.len() < 5 {
            return Err(RigError::malformed(
                raw,
                format!("expected at least 5 segments, found {}", segments.len()),
            ));
        }

        let class_token = segments[segments.len() - 1];
        let class = NodeClass::parse(class_token)
            .ok_or_else(|| RigError::malformed(raw, format!("unknown class `{class_token}`")))?;

        Ok(RigName {
            character: segments[0].to_string(),
            kind: segments[1].to_string(),
            name: segments[2].to_string(),
            side: segments[3].to_string(),
            ids: segments[4..segments.len() - 1]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            class,
        })
    }

    /// Total segment count, including every id.
    pub fn segment_count(&self) -> usize {
        5 + self.ids.len()
    }

    fn flat(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.segment_count());
        out.push(self.character.as_str());
        out.push(self.kind.as_str());
        out.push(self.name.as_str());
        out.push(self.side.as_str());
        out.extend(self.ids.iter().map(|s| s.as_str()));
        out.push(self.class.token());
        out
    }

    fn resolve_index(&self, index: isize) -> Result<usize> {
        let count = self.segment_count() as isize;
        let pos = if index < 0 { count + index } else { index };
        if pos < 0 || pos >= count {
            return Err(RigError::malformed(
                self.to_string(),
                format!("segment index {index} out of range for {count} segments"),
            ));
        }
        Ok(pos as usize)
    }

    /// Look up a segment by index or symbolic tag.
    pub fn segment(&self, sel: impl Into<SegmentSel>) -> Result<Segment<'_>> {
        match sel.into() {
            SegmentSel::Tag(SegmentTag::Character) => Ok(Segment::One(&self.character)),
            SegmentSel::Tag(SegmentTag::Kind) => Ok(Segment::One(&self.kind)),
            SegmentSel::Tag(SegmentTag::Name) => Ok(Segment::One(&self.name)),
            SegmentSel::Tag(SegmentTag::Side) => Ok(Segment::One(&self.side)),
            SegmentSel::Tag(SegmentTag::Ids) => Ok(Segment::Ids(&self.ids)),
            SegmentSel::Tag(SegmentTag::Class) => Ok(Segment::One(self.class.token())),
            SegmentSel::Index(index) => {
                let pos = self.resolve_index(index)?;
                let last = self.segment_count() - 1;
                Ok(match pos {
                    0 => Segment::One(&self.character),
                    1 => Segment::One(&self.kind),
                    2 => Segment::One(&self.name),
                    3 => Segment::One(&self.side),
                    p if p == last => Segment::One(self.class.token()),
                    p => Segment::One(&self.ids[p - 4]),
                })
            }
        }
    }

    /// Produce a copy with one segment replaced. Segment count is preserved
    /// except when replacing the whole id region via `SegmentTag::Ids`,
    /// which collapses the ids to the single given value.
    pub fn replace_segment(&self, sel: impl Into<SegmentSel>, value: &str) -> Result<RigName> {
        let mut out = self.clone();
        match sel.into() {
            SegmentSel::Tag(SegmentTag::Character) => out.character = value.to_string(),
            SegmentSel::Tag(SegmentTag::Kind) => out.kind = value.to_string(),
            SegmentSel::Tag(SegmentTag::Name) => out.name = value.to_string(),
            SegmentSel::Tag(SegmentTag::Side) => out.side = value.to_string(),
            SegmentSel::Tag(SegmentTag::Ids) => out.ids = vec![value.to_string()],
            SegmentSel::Tag(SegmentTag::Class) => out.class = Self::parse_class(self, value)?,
            SegmentSel::Index(index) => {
                let pos = self.resolve_index(index)?;
                let last = self.segment_count() - 1;
                match pos {
                    0 => out.character = value.to_string(),
                    1 => out.kind = value.to_string(),
                    2 => out.name = value.to_string(),
                    3 => out.side = value.to_string(),
                    p if p == last => out.class = Self::parse_class(self, value)?,
                    p => out.ids[p - 4] = value.to_string(),
                }
            }
        }
        Ok(out)
    }

    fn parse_class(&self, value: &str) -> Result<NodeClass> {
        NodeClass::parse(value)
            .ok_or_else(|| RigError::malformed(self.to_string(), format!("unknown class `{value}`")))
    }

    /// Append an id immediately before the class segment, regardless of the
    /// current id count.
    pub fn append_id(&self, tag: impl Into<String>) -> RigName {
        let mut out = self.clone();
        out.ids.push(tag.into());
        out
    }

    /// Copy with a different kind segment.
    pub fn with_kind(&self, kind: impl Into<String>) -> RigName {
        let mut out = self.clone();
        out.kind = kind.into();
        out
    }

    /// Copy with a different base name segment.
    pub fn with_name(&self, name: impl Into<String>) -> RigName {
        let mut out = self.clone();
        out.name = name.into();
        out
    }

    /// Copy with a different class segment.
    pub fn with_class(&self, class: NodeClass) -> RigName {
        let mut out = self.clone();
        out.class = class;
        out
    }

    /// Namespace form: `character:kind:rest_of_name`.
    pub fn to_namespaced(&self) -> String {
        let flat = self.flat();
        format!(
            "{}{}{}{}{}",
            flat[0],
            NAMESPACE_DELIMITER,
            flat[1],
            NAMESPACE_DELIMITER,
            flat[2..].join("_")
        )
    }
}

impl fmt::Display for RigName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flat().join("_"))
    }
}

impl FromStr for RigName {
    type Err = RigError;
    fn from_str(s: &str) -> Result<RigName> {
        RigName::parse(s)
    }
}

impl Serialize for RigName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RigName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<RigName, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RigName::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        let n = RigName::parse("hero_bind_arm_l_jnt").unwrap();
        assert_eq!(n.character, "hero");
        assert_eq!(n.kind, "bind");
        assert_eq!(n.name, "arm");
        assert_eq!(n.side, "l");
        assert!(n.ids.is_empty());
        assert_eq!(n.class, NodeClass::Jnt);
        assert_eq!(n.to_string(), "hero_bind_arm_l_jnt");
    }

    #[test]
    fn parse_with_ids() {
        let n = RigName::parse("hero_fk_arm_l_fk_offset_grp").unwrap();
        assert_eq!(n.ids, vec!["fk".to_string(), "offset".to_string()]);
        assert_eq!(n.class, NodeClass::Grp);
    }

    #[test]
    fn namespace_form_folds() {
        let n = RigName::parse("hero:bind:arm_l_jnt").unwrap();
        assert_eq!(n.to_string(), "hero_bind_arm_l_jnt");
        assert_eq!(n.to_namespaced(), "hero:bind:arm_l_jnt");
    }

    #[test]
    fn rejects_short_and_unknown_class() {
        assert!(RigName::parse("hero_arm_jnt").is_err());
        assert!(RigName::parse("hero_bind_arm_l_widget").is_err());
        assert!(RigName::parse("hero__arm_l_jnt").is_err());
    }

    #[test]
    fn segment_by_tag_and_index() {
        let n = RigName::parse("hero_ik_leg_r_0_hndl").unwrap();
        assert_eq!(n.segment(SegmentTag::Kind).unwrap().as_str(), Some("ik"));
        assert_eq!(n.segment(SegmentTag::Class).unwrap().as_str(), Some("hndl"));
        assert_eq!(n.segment(-1).unwrap().as_str(), Some("hndl"));
        assert_eq!(n.segment(-2).unwrap().as_str(), Some("0"));
        assert_eq!(n.segment(0).unwrap().as_str(), Some("hero"));
        match n.segment(SegmentTag::Ids).unwrap() {
            Segment::Ids(ids) => assert_eq!(ids, &["0".to_string()]),
            _ => panic!("expected id sub-list"),
        }
        assert!(n.segment(9).is_err());
    }

    #[test]
    fn replace_preserves_count_outside_ids() {
        let n = RigName::parse("hero_bind_arm_l_jnt").unwrap();
        let replaced = n.replace_segment(SegmentTag::Kind, "fk").unwrap();
        assert_eq!(replaced.segment_count(), n.segment_count());
        assert_eq!(
            replaced.segment(SegmentTag::Kind).unwrap().as_str(),
            Some("fk")
        );
        // replacing the class with a non-class token is a type error
        assert!(n.replace_segment(SegmentTag::Class, "banana").is_err());
    }

    #[test]
    fn append_id_lands_before_class() {
        let n = RigName::parse("hero_fk_arm_l_cntl").unwrap();
        let once = n.append_id("a");
        let twice = once.append_id("b");
        assert_eq!(twice.to_string(), "hero_fk_arm_l_a_b_cntl");
        assert_eq!(twice.ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn serde_as_string() {
        let n = RigName::parse("hero_pv_leg_l_cntl").unwrap();
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "\"hero_pv_leg_l_cntl\"");
        let back: RigName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }
}
