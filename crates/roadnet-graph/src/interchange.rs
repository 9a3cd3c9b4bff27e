//! Parallel-array view of a graph, as read and written by file formats.
//!
//! Link lists use `-1` as the entry for "no links", mirroring the persisted
//! route format where every node carries at least one value.

use crate::node::push_unique;
use crate::road_map::{MapMarker, RoadMap};
use roadnet_core::{GraphError, NodeFlag, NodeId, Vec3};
use serde::{Deserialize, Serialize};

/// Placeholder for an empty link list.
pub const NO_LINKS: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub node: u32,
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphArrays {
    pub ids: Vec<u32>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub flags: Vec<i32>,
    pub outgoing: Vec<Vec<i64>>,
    pub incoming: Vec<Vec<i64>>,
    pub markers: Vec<MarkerRecord>,
}

/// Read the current graph into parallel arrays.
pub fn serialize_graph(map: &RoadMap) -> GraphArrays {
    let mut data = GraphArrays::default();
    for node in map.nodes() {
        let p = node.position();
        data.ids.push(node.id().0);
        data.x.push(p.x);
        data.y.push(p.y);
        data.z.push(p.z);
        data.flags.push(node.flag.as_i32());
        data.outgoing.push(link_values(node.outgoing()));
        data.incoming.push(link_values(node.incoming()));
    }
    data.markers = map.markers().iter().map(MarkerRecord::from).collect();
    data
}

fn link_values(ids: &[NodeId]) -> Vec<i64> {
    if ids.is_empty() {
        vec![NO_LINKS]
    } else {
        ids.iter().map(|id| i64::from(id.0)).collect()
    }
}

/// Build a fresh graph from parallel arrays.
///
/// Array lengths must agree, ids (when given) must be `1..=N` in order and
/// every link and marker must reference an existing node. Duplicate links
/// collapse into one.
pub fn load_graph(data: &GraphArrays) -> Result<RoadMap, GraphError> {
    let len = data.x.len();
    let lengths = [
        data.y.len(),
        data.z.len(),
        data.flags.len(),
        data.outgoing.len(),
        data.incoming.len(),
    ];
    if lengths.iter().any(|&l| l != len) || (!data.ids.is_empty() && data.ids.len() != len) {
        return Err(GraphError::InvalidGraphData(format!(
            "array lengths disagree: {} ids, {len} x, {lengths:?} y/z/flags/outgoing/incoming",
            data.ids.len()
        )));
    }
    for (index, &id) in data.ids.iter().enumerate() {
        if NodeId(id) != NodeId::from_index(index) {
            return Err(GraphError::InvalidGraphData(format!(
                "id {id} at position {index} breaks the 1..N numbering"
            )));
        }
    }

    let mut map = RoadMap::new();
    for index in 0..len {
        let flag = NodeFlag::try_from(data.flags[index])?;
        map.add_node(Vec3::new(data.x[index], data.y[index], data.z[index]), flag);
    }
    for index in 0..len {
        let outgoing = parse_links(&data.outgoing[index], len)?;
        let incoming = parse_links(&data.incoming[index], len)?;
        let node = map.require_mut(NodeId::from_index(index))?;
        for id in outgoing {
            push_unique(&mut node.outgoing, id);
        }
        for id in incoming {
            push_unique(&mut node.incoming, id);
        }
    }
    for record in &data.markers {
        let node = NodeId(record.node);
        if node.0 == 0 || node.index() >= len {
            return Err(GraphError::IdOutOfRange { id: node, len });
        }
        map.add_marker(node, &record.name, &record.group)?;
    }

    tracing::info!(
        "Loaded graph with {} nodes and {} markers",
        map.len(),
        map.markers().len()
    );
    Ok(map)
}

fn parse_links(values: &[i64], len: usize) -> Result<Vec<NodeId>, GraphError> {
    let mut ids = Vec::with_capacity(values.len());
    for &value in values {
        if value == NO_LINKS {
            continue;
        }
        match u32::try_from(value) {
            Ok(raw) if raw >= 1 && (raw as usize) <= len => ids.push(NodeId(raw)),
            _ => {
                return Err(GraphError::InvalidGraphData(format!(
                    "link {value} outside 1..={len}"
                )));
            }
        }
    }
    Ok(ids)
}

/// The same data as separator-joined strings: `;` between nodes, `,` between
/// the ids of one link list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimitedGraph {
    pub count: usize,
    pub x: String,
    pub y: String,
    pub z: String,
    pub flags: String,
    pub outgoing: String,
    pub incoming: String,
    pub markers: Vec<MarkerRecord>,
}

impl GraphArrays {
    pub fn to_delimited(&self) -> DelimitedGraph {
        fn join<T: ToString>(values: &[T]) -> String {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(";")
        }
        fn join_lists(lists: &[Vec<i64>]) -> String {
            lists
                .iter()
                .map(|list| {
                    list.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .collect::<Vec<_>>()
                .join(";")
        }

        DelimitedGraph {
            count: self.x.len(),
            x: join(&self.x),
            y: join(&self.y),
            z: join(&self.z),
            flags: join(&self.flags),
            outgoing: join_lists(&self.outgoing),
            incoming: join_lists(&self.incoming),
            markers: self.markers.clone(),
        }
    }
}

impl DelimitedGraph {
    pub fn parse(&self) -> Result<GraphArrays, GraphError> {
        fn split<T: std::str::FromStr>(
            field: &str,
            text: &str,
            count: usize,
        ) -> Result<Vec<T>, GraphError> {
            if count == 0 {
                return Ok(Vec::new());
            }
            text.split(';')
                .map(|item| {
                    item.trim().parse::<T>().map_err(|_| {
                        GraphError::InvalidGraphData(format!("bad {field} value '{item}'"))
                    })
                })
                .collect()
        }
        fn split_lists(field: &str, text: &str, count: usize) -> Result<Vec<Vec<i64>>, GraphError> {
            if count == 0 {
                return Ok(Vec::new());
            }
            text.split(';')
                .map(|list| split::<i64>(field, &list.replace(',', ";"), 1))
                .collect()
        }

        let data = GraphArrays {
            ids: (1..=self.count as u32).collect(),
            x: split("x", &self.x, self.count)?,
            y: split("y", &self.y, self.count)?,
            z: split("z", &self.z, self.count)?,
            flags: split("flag", &self.flags, self.count)?,
            outgoing: split_lists("outgoing", &self.outgoing, self.count)?,
            incoming: split_lists("incoming", &self.incoming, self.count)?,
            markers: self.markers.clone(),
        };
        if data.x.len() != self.count {
            return Err(GraphError::InvalidGraphData(format!(
                "expected {} nodes, found {} x values",
                self.count,
                data.x.len()
            )));
        }
        Ok(data)
    }
}

impl From<&MapMarker> for MarkerRecord {
    fn from(marker: &MapMarker) -> Self {
        Self {
            node: marker.node.0,
            name: marker.name.clone(),
            group: marker.group.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::toggle_connection;
    use roadnet_core::ConnectionType;

    fn sample() -> GraphArrays {
        GraphArrays {
            ids: vec![1, 2, 3],
            x: vec![0.0, 10.5, 20.0],
            y: vec![0.0, 1.25, 0.0],
            z: vec![0.0, 0.0, -4.0],
            flags: vec![0, 1, 0],
            outgoing: vec![vec![2], vec![3], vec![NO_LINKS]],
            incoming: vec![vec![NO_LINKS], vec![1], vec![2]],
            markers: vec![MarkerRecord {
                node: 3,
                name: "Barn".into(),
                group: "Farm".into(),
            }],
        }
    }

    #[test]
    fn test_load_then_serialize_is_identity() {
        let data = sample();
        let map = load_graph(&data).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.node(NodeId(2)).unwrap().flag, NodeFlag::SubPriority);
        assert_eq!(serialize_graph(&map), data);
    }

    #[test]
    fn test_serialize_uses_sentinel() {
        let mut map = RoadMap::new();
        map.add_node(Vec3::default(), NodeFlag::Standard);
        map.add_node(Vec3::new(1.0, 0.0, 1.0), NodeFlag::Standard);
        toggle_connection(&mut map, NodeId(1), NodeId(2), ConnectionType::Standard).unwrap();
        let data = serialize_graph(&map);
        assert_eq!(data.outgoing, vec![vec![2], vec![NO_LINKS]]);
        assert_eq!(data.incoming, vec![vec![NO_LINKS], vec![1]]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut data = sample();
        data.outgoing[0] = vec![4];
        assert!(matches!(load_graph(&data), Err(GraphError::InvalidGraphData(_))));

        let mut data = sample();
        data.y.pop();
        assert!(matches!(load_graph(&data), Err(GraphError::InvalidGraphData(_))));

        let mut data = sample();
        data.ids = vec![1, 3, 2];
        assert!(load_graph(&data).is_err());

        let mut data = sample();
        data.flags[0] = 7;
        assert!(matches!(load_graph(&data), Err(GraphError::EnumConversion(_))));
    }

    #[test]
    fn test_delimited_strings() {
        let delimited = sample().to_delimited();
        assert_eq!(delimited.x, "0;10.5;20");
        assert_eq!(delimited.flags, "0;1;0");
        assert_eq!(delimited.outgoing, "2;3;-1");
        assert_eq!(delimited.incoming, "-1;1;2");

        assert_eq!(delimited.parse().unwrap(), sample());
    }

    #[test]
    fn test_delimited_multi_link_lists() {
        let delimited = DelimitedGraph {
            count: 2,
            x: "0;1".into(),
            y: "0;0".into(),
            z: "0;1".into(),
            flags: "0;0".into(),
            outgoing: "2;1".into(),
            incoming: "2;1".into(),
            markers: Vec::new(),
        };
        let map = load_graph(&delimited.parse().unwrap()).unwrap();
        assert!(crate::connection::is_dual(&map, NodeId(1), NodeId(2)));

        let broken = DelimitedGraph {
            x: "0;a".into(),
            ..delimited
        };
        assert!(broken.parse().is_err());
    }
}
