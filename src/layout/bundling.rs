use std::collections::BTreeMap;
use std::fmt;

use crate::config::LayoutConfig;
use crate::ir::{Connection, ConnectionKind};

/// Unordered station pair; `first <= second`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub first: String,
    pub second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    pub fn of(conn: &Connection) -> Self {
        Self::new(&conn.from, &conn.to)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.first, self.second)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundledConnection {
    /// Position of the connection in the store's relationship list.
    pub index: usize,
    pub kind: ConnectionKind,
    pub offset: f32,
}

pub fn type_offset(kind: ConnectionKind, unit: f32) -> f32 {
    kind.offset_rank() as f32 * unit
}

/// Symmetric fan-out of member `index` among `count` parallel lines.
pub fn bundle_offset(index: usize, count: usize, gap: f32) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    (index as f32 - (count as f32 - 1.0) / 2.0) * gap
}

/// Groups connections by unordered pair, keeping insertion order inside each
/// bundle, and assigns every member its perpendicular offset.
pub fn bundle<'a>(
    connections: impl IntoIterator<Item = (usize, &'a Connection)>,
    config: &LayoutConfig,
) -> BTreeMap<PairKey, Vec<BundledConnection>> {
    let mut groups: BTreeMap<PairKey, Vec<(usize, ConnectionKind)>> = BTreeMap::new();
    for (index, conn) in connections {
        groups.entry(PairKey::of(conn)).or_default().push((index, conn.kind));
    }

    groups
        .into_iter()
        .map(|(key, members)| {
            let count = members.len();
            let bundled = members
                .into_iter()
                .enumerate()
                .map(|(position, (index, kind))| BundledConnection {
                    index,
                    kind,
                    offset: type_offset(kind, config.type_offset_unit)
                        + bundle_offset(position, count, config.bundle_gap),
                })
                .collect();
            (key, bundled)
        })
        .collect()
}

pub fn bundle_all(
    connections: &[Connection],
    config: &LayoutConfig,
) -> BTreeMap<PairKey, Vec<BundledConnection>> {
    bundle(connections.iter().enumerate(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_ignores_direction() {
        assert_eq!(PairKey::new("b", "a"), PairKey::new("a", "b"));
        assert_eq!(PairKey::new("b", "a").to_string(), "a|b");
    }

    #[test]
    fn single_line_sits_on_its_type_offset() {
        let config = LayoutConfig::default();
        let conns = [Connection::new("a", "b", ConnectionKind::Studio)];
        let bundles = bundle_all(&conns, &config);
        let members = &bundles[&PairKey::new("a", "b")];
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].offset, config.type_offset_unit);

        let conns = [Connection::new("a", "b", ConnectionKind::Membership)];
        assert_eq!(bundle_all(&conns, &config)[&PairKey::new("a", "b")][0].offset, 0.0);
    }

    #[test]
    fn bundle_offsets_straddle_the_type_offsets() {
        let config = LayoutConfig::default();
        let conns = [
            Connection::new("a", "b", ConnectionKind::Membership),
            Connection::new("b", "a", ConnectionKind::Label),
            Connection::new("a", "c", ConnectionKind::Cover),
            Connection::new("a", "b", ConnectionKind::Writing),
            Connection::new("b", "a", ConnectionKind::Membership),
        ];
        let bundles = bundle_all(&conns, &config);
        let members = &bundles[&PairKey::new("a", "b")];
        assert_eq!(
            members.iter().map(|m| m.index).collect::<Vec<_>>(),
            vec![0, 1, 3, 4]
        );
        let fan: f32 = members
            .iter()
            .map(|m| m.offset - type_offset(m.kind, config.type_offset_unit))
            .sum();
        assert!(fan.abs() < 1e-4);
        assert_eq!(members[0].offset, -1.5 * config.bundle_gap);
        assert_eq!(members[3].offset, 1.5 * config.bundle_gap);
    }

    #[test]
    fn bundle_offset_is_zero_for_lone_lines() {
        assert_eq!(bundle_offset(0, 1, 6.0), 0.0);
        assert_eq!(bundle_offset(0, 2, 6.0), -3.0);
        assert_eq!(bundle_offset(1, 2, 6.0), 3.0);
        assert_eq!(bundle_offset(1, 3, 6.0), 0.0);
    }
}
