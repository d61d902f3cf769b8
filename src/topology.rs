// Channel topology description and wire enumeration
//
// This module models the hierarchical channel-address scheme of the detector
// (wheel -> station -> sector -> superlayer -> layer -> wire) and derives the
// full ordered wire list from a topology description. Enumeration order is
// deterministic so that diagnostics from two runs over the same topology can
// be compared line by line.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TopologyError;

/// Address of a single wire within the channel hierarchy
///
/// Structural equality, total ordering and hashing follow the hierarchy:
/// wheel, then station, sector, superlayer, layer, wire. Wheel indices may
/// be negative (detector convention).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WireAddress {
    pub wheel: i32,
    pub station: i32,
    pub sector: i32,
    pub superlayer: i32,
    pub layer: i32,
    pub wire: i32,
}

impl WireAddress {
    pub fn new(wheel: i32, station: i32, sector: i32, superlayer: i32, layer: i32, wire: i32) -> Self {
        Self {
            wheel,
            station,
            sector,
            superlayer,
            layer,
            wire,
        }
    }

    /// Address of a superlayer-granular record, with layer and wire fixed
    /// to their first legal values
    ///
    /// Reference files key their records at superlayer granularity; this is
    /// the address such a record compares against.
    pub fn superlayer(wheel: i32, station: i32, sector: i32, superlayer: i32) -> Self {
        Self::new(wheel, station, sector, superlayer, 1, 0)
    }
}

impl fmt::Display for WireAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wh:{} St:{} Se:{} Sl:{} La:{} Wi:{}",
            self.wheel, self.station, self.sector, self.superlayer, self.layer, self.wire
        )
    }
}

/// Inclusive integer range within one hierarchy level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub first: i32,
    pub last: i32,
}

impl IndexRange {
    /// Iterate the range after checking it is not inverted
    fn checked_iter(
        &self,
        context: impl Fn() -> String,
    ) -> Result<std::ops::RangeInclusive<i32>, TopologyError> {
        if self.first > self.last {
            return Err(TopologyError::InvalidRange {
                context: context(),
                first: self.first,
                last: self.last,
            });
        }
        Ok(self.first..=self.last)
    }
}

/// Wire range of one layer within a superlayer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub layer: i32,
    /// First legal wire index in this layer
    pub first_wire: i32,
    /// Last legal wire index in this layer
    pub last_wire: i32,
}

/// One block of identically shaped chambers
///
/// Every combination of wheel, station, sector and superlayer in the given
/// ranges carries the same layer list. Real topology files describe the
/// detector as a handful of such blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamberSpec {
    pub wheels: IndexRange,
    pub stations: IndexRange,
    pub sectors: IndexRange,
    pub superlayers: IndexRange,
    pub layers: Vec<LayerSpec>,
}

/// Description of the full channel hierarchy
///
/// Loaded from JSON; holds no mutable state. The same topology always
/// enumerates the same ordered wire sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub chambers: Vec<ChamberSpec>,
}

impl Topology {
    /// Enumerate every wire address described by this topology, in order
    ///
    /// The order is the nesting order of the description: chamber blocks in
    /// file order, then wheel, station, sector, superlayer, layer (in listed
    /// order), wire.
    ///
    /// # Returns
    /// * `Ok(Vec<WireAddress>)` - Full ordered wire list
    /// * `Err(TopologyError)` - Inverted range or empty description
    pub fn wires(&self) -> Result<Vec<WireAddress>, TopologyError> {
        if self.chambers.is_empty() {
            return Err(TopologyError::Empty);
        }

        let mut out = Vec::new();
        for chamber in &self.chambers {
            for wheel in chamber.wheels.checked_iter(|| "wheels".to_string())? {
                for station in chamber
                    .stations
                    .checked_iter(|| format!("wheel {} stations", wheel))?
                {
                    for sector in chamber
                        .sectors
                        .checked_iter(|| format!("wheel {} station {} sectors", wheel, station))?
                    {
                        for superlayer in chamber.superlayers.checked_iter(|| {
                            format!(
                                "wheel {} station {} sector {} superlayers",
                                wheel, station, sector
                            )
                        })? {
                            for layer in &chamber.layers {
                                if layer.first_wire > layer.last_wire {
                                    return Err(TopologyError::InvalidRange {
                                        context: format!(
                                            "wheel {} station {} sector {} superlayer {} layer {}",
                                            wheel, station, sector, superlayer, layer.layer
                                        ),
                                        first: layer.first_wire,
                                        last: layer.last_wire,
                                    });
                                }
                                for wire in layer.first_wire..=layer.last_wire {
                                    out.push(WireAddress::new(
                                        wheel,
                                        station,
                                        sector,
                                        superlayer,
                                        layer.layer,
                                        wire,
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: a minimal one-chamber topology
    fn create_test_topology() -> Topology {
        Topology {
            chambers: vec![ChamberSpec {
                wheels: IndexRange { first: -1, last: 1 },
                stations: IndexRange { first: 1, last: 2 },
                sectors: IndexRange { first: 1, last: 1 },
                superlayers: IndexRange { first: 1, last: 3 },
                layers: vec![
                    LayerSpec {
                        layer: 1,
                        first_wire: 1,
                        last_wire: 4,
                    },
                    LayerSpec {
                        layer: 2,
                        first_wire: 1,
                        last_wire: 3,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_enumeration_count() {
        let topo = create_test_topology();
        let wires = topo.wires().unwrap();
        // 3 wheels * 2 stations * 1 sector * 3 superlayers * (4 + 3) wires
        assert_eq!(wires.len(), 3 * 2 * 3 * 7);
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let topo = create_test_topology();
        let first = topo.wires().unwrap();
        let second = topo.wires().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_enumeration_order_is_sorted_within_chamber() {
        let topo = create_test_topology();
        let wires = topo.wires().unwrap();
        let mut sorted = wires.clone();
        sorted.sort();
        assert_eq!(wires, sorted);
    }

    #[test]
    fn test_inverted_wire_range_fails() {
        let mut topo = create_test_topology();
        topo.chambers[0].layers[1].first_wire = 10;
        topo.chambers[0].layers[1].last_wire = 2;

        let result = topo.wires();
        assert!(result.is_err());
        match result.unwrap_err() {
            TopologyError::InvalidRange { first: 10, last: 2, .. } => {}
            e => panic!("Expected InvalidRange error, got: {:?}", e),
        }
    }

    #[test]
    fn test_inverted_sector_range_fails() {
        let mut topo = create_test_topology();
        topo.chambers[0].sectors = IndexRange { first: 12, last: 1 };

        let result = topo.wires();
        assert!(result.is_err());
        match result.unwrap_err() {
            TopologyError::InvalidRange { context, .. } => {
                assert!(context.contains("sectors"));
            }
            e => panic!("Expected InvalidRange error, got: {:?}", e),
        }
    }

    #[test]
    fn test_empty_topology_fails() {
        let topo = Topology { chambers: vec![] };
        match topo.wires().unwrap_err() {
            TopologyError::Empty => {}
            e => panic!("Expected Empty error, got: {:?}", e),
        }
    }

    #[test]
    fn test_address_display_has_full_hierarchy() {
        let addr = WireAddress::new(-2, 3, 11, 2, 4, 37);
        let text = format!("{}", addr);
        assert!(text.contains("Wh:-2"));
        assert!(text.contains("St:3"));
        assert!(text.contains("Se:11"));
        assert!(text.contains("Sl:2"));
        assert!(text.contains("La:4"));
        assert!(text.contains("Wi:37"));
    }

    #[test]
    fn test_superlayer_address_fixes_layer_and_wire() {
        let sl = WireAddress::superlayer(0, 1, 3, 2);
        assert_eq!(sl, WireAddress::new(0, 1, 3, 2, 1, 0));
    }

    #[test]
    fn test_topology_json_roundtrip() {
        let topo = create_test_topology();
        let json = serde_json::to_string(&topo).unwrap();
        let parsed: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, topo);
    }
}
