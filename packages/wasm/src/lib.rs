//! Spring Graph - WASM Module
//!
//! Force-directed layout for small interactive graphs. Nodes repel, edges act
//! as springs and a weak pull keeps everything near the origin. The host calls
//! `tick` once per animation frame and stops when the layout reports settled.
//! Compiled to WebAssembly, with a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `vector`: 2D vector arithmetic
//! - `graph`: Undirected topology on petgraph's StableGraph
//! - `layout`: Simulation state and the force model
//! - `spatial`: R-tree snapshots for hit testing
//! - `error`: Error type shared by every fallible operation

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod spatial;
pub mod vector;

use graph::{EdgeAttrs, EdgeId, Graph, NodeAttrs, NodeId};
use layout::{Layout, LayoutConfig};
use vector::Vector2;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for JavaScript.
///
/// Wraps a [`Layout`] over labelled nodes and edges with optional rest
/// lengths.
#[wasm_bindgen]
pub struct SpringLayoutWasm {
    layout: Layout<NodeAttrs, EdgeAttrs>,
}

#[wasm_bindgen]
impl SpringLayoutWasm {
    /// Create an empty layout.
    ///
    /// `config` is a plain object with any of the `LayoutConfig` fields in
    /// camelCase; missing fields take their defaults. `undefined` gives the
    /// defaults outright.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SpringLayoutWasm, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::with_config(config)?)
    }

    /// The effective configuration as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.layout.config())?)
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Add a node and return its id.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, label: Option<String>, mass: Option<f64>) -> u32 {
        let attrs = NodeAttrs {
            label,
            mass,
            ..NodeAttrs::default()
        };
        self.layout.graph_mut().add_node(attrs).raw()
    }

    /// Connect two nodes with a spring of the given rest length.
    ///
    /// Returns false for self-loops, unknown ids and already adjacent nodes.
    pub fn connect(&mut self, a: u32, b: u32, length: Option<f64>) -> bool {
        let attrs = EdgeAttrs {
            length,
            ..EdgeAttrs::default()
        };
        self.layout
            .graph_mut()
            .connect(NodeId(a), NodeId(b), attrs)
            .is_some()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.layout.graph().node_count()
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> usize {
        self.layout.graph().edge_count()
    }

    /// Returns a Uint32Array of neighbor node IDs.
    pub fn neighbors(&self, node_id: u32) -> Vec<u32> {
        self.layout
            .graph()
            .neighbor_ids(NodeId(node_id))
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }

    /// Edge endpoints as a Uint32Array `[s0, t0, s1, t1, ...]`.
    #[wasm_bindgen(js_name = edgePairs)]
    pub fn edge_pairs(&self) -> Vec<u32> {
        self.layout
            .graph()
            .edges()
            .flat_map(|edge| [edge.source().raw(), edge.target().raw()])
            .collect()
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> Result<(), JsError> {
        Ok(self.layout.try_tick(dt)?)
    }

    #[wasm_bindgen(js_name = totalEnergy)]
    pub fn total_energy(&self) -> f64 {
        self.layout.total_energy()
    }

    #[wasm_bindgen(js_name = isSettled)]
    pub fn is_settled(&self) -> bool {
        self.layout.is_settled()
    }

    /// Set damping in `[0, 1]`; zero freezes the animation.
    #[wasm_bindgen(js_name = setDamping)]
    pub fn set_damping(&mut self, damping: f64) -> Result<(), JsError> {
        Ok(self.layout.set_damping(damping)?)
    }

    /// Positions as a Float64Array `[x0, y0, x1, y1, ...]` in node order.
    pub fn positions(&mut self) -> Float64Array {
        Float64Array::from(&self.position_buffer()[..])
    }

    // =========================================================================
    // Hit Testing
    // =========================================================================

    /// Id of the node closest to `(x, y)`, if any.
    pub fn nearest(&mut self, x: f64, y: f64) -> Option<u32> {
        self.layout.nearest(Vector2::new(x, y)).node.map(NodeId::raw)
    }

    /// Find the nearest node within a maximum distance.
    #[wasm_bindgen(js_name = nearestWithin)]
    pub fn nearest_within(&mut self, x: f64, y: f64, max_distance: f64) -> Option<u32> {
        self.layout
            .spatial_index()
            .nearest_within(Vector2::new(x, y), max_distance)
            .map(NodeId::raw)
    }

    /// Returns a Uint32Array of the node IDs inside the rectangle.
    #[wasm_bindgen(js_name = findNodesInRect)]
    pub fn find_nodes_in_rect(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<u32> {
        self.layout
            .spatial_index()
            .in_rect(Vector2::new(min_x, min_y), Vector2::new(max_x, max_y))
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }

    /// Distance from `(x, y)` to the line through the edge `source`-`target`.
    #[wasm_bindgen(js_name = springDistanceTo)]
    pub fn spring_distance_to(&mut self, source: u32, target: u32, x: f64, y: f64) -> Result<f64, JsError> {
        let edge = EdgeId::new(NodeId(source), NodeId(target));
        Ok(self.layout.spring_distance_to(edge, Vector2::new(x, y))?)
    }

    /// Padded bounds as `[minX, minY, maxX, maxY]`.
    #[wasm_bindgen(js_name = boundingBox)]
    pub fn bounding_box(&mut self) -> Vec<f64> {
        let bbox = self.layout.bounding_box();
        vec![
            bbox.top_left.x,
            bbox.top_left.y,
            bbox.bottom_right.x,
            bbox.bottom_right.y,
        ]
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, node_id: u32) -> Result<(), JsError> {
        Ok(self.layout.begin_drag(NodeId(node_id))?)
    }

    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, node_id: u32, x: f64, y: f64) -> Result<(), JsError> {
        Ok(self.layout.drag_to(NodeId(node_id), Vector2::new(x, y))?)
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self, node_id: u32) -> Result<(), JsError> {
        Ok(self.layout.end_drag(NodeId(node_id))?)
    }

    /// Pin a node (exclude from simulation).
    pub fn pin(&mut self, node_id: u32) -> Result<(), JsError> {
        Ok(self.layout.set_pinned(NodeId(node_id), true)?)
    }

    /// Unpin a node (include in simulation).
    pub fn unpin(&mut self, node_id: u32) -> Result<(), JsError> {
        Ok(self.layout.set_pinned(NodeId(node_id), false)?)
    }
}

impl SpringLayoutWasm {
    /// Create an empty layout from an already-built config.
    pub fn with_config(config: LayoutConfig) -> error::Result<Self> {
        Ok(Self {
            layout: Layout::new(Graph::new(), config)?,
        })
    }

    pub fn layout(&self) -> &Layout<NodeAttrs, EdgeAttrs> {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout<NodeAttrs, EdgeAttrs> {
        &mut self.layout
    }

    /// Flattened positions backing [`SpringLayoutWasm::positions`].
    pub fn position_buffer(&mut self) -> Vec<f64> {
        self.layout
            .positions()
            .into_iter()
            .flat_map(|(_, position)| [position.x, position.y])
            .collect()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn interactive() -> LayoutConfig {
        LayoutConfig::new(800.0, 400.0, 0.25)
            .with_energy_threshold(1e-5)
            .with_max_speed(10.0)
            .with_seed(17)
    }

    /// Drive the wrapper the way a frame loop does.
    fn run_until_settled(wasm: &mut SpringLayoutWasm, max_frames: usize) -> usize {
        for frame in 1..=max_frames {
            if wasm.tick(0.033).is_err() {
                panic!("tick rejected a valid step");
            }
            if wasm.is_settled() {
                return frame;
            }
        }
        panic!("layout did not settle in {max_frames} frames");
    }

    #[test]
    fn test_path_graph_through_wrapper() {
        let mut wasm = SpringLayoutWasm::with_config(interactive()).unwrap();

        let ids: Vec<u32> = ["a", "b", "c", "d"]
            .iter()
            .map(|label| wasm.add_node(Some(label.to_string()), None))
            .collect();
        for pair in ids.windows(2) {
            assert!(wasm.connect(pair[0], pair[1], None));
        }
        assert!(!wasm.connect(ids[0], ids[0], None));
        assert!(!wasm.connect(ids[1], ids[0], None));
        assert!(!wasm.connect(ids[0], 99, None));

        assert_eq!(wasm.node_count(), 4);
        assert_eq!(wasm.edge_count(), 3);
        assert_eq!(wasm.neighbors(ids[1]), vec![ids[0], ids[2]]);
        assert_eq!(wasm.edge_pairs(), vec![0, 1, 1, 2, 2, 3]);

        run_until_settled(&mut wasm, 5000);

        let buffer = wasm.position_buffer();
        assert_eq!(buffer.len(), 8);
        assert!(buffer.iter().all(|v| v.is_finite()));

        let bounds = wasm.bounding_box();
        for xy in buffer.chunks(2) {
            assert!(xy[0] >= bounds[0] && xy[0] <= bounds[2]);
            assert!(xy[1] >= bounds[1] && xy[1] <= bounds[3]);
        }

        // Every node is its own nearest neighbour.
        for (id, xy) in ids.iter().zip(buffer.chunks(2)) {
            assert_eq!(wasm.nearest(xy[0], xy[1]), Some(*id));
            assert_eq!(wasm.nearest_within(xy[0], xy[1], 1e-6), Some(*id));
        }
        assert_eq!(
            wasm.find_nodes_in_rect(bounds[0], bounds[1], bounds[2], bounds[3]).len(),
            4
        );

        // A node lies on every spring it ends.
        let on_edge = wasm.spring_distance_to(ids[1], ids[2], buffer[2], buffer[3]);
        assert!(matches!(on_edge, Ok(distance) if distance < 1e-9));
    }

    #[test]
    fn test_drag_session_through_wrapper() {
        let mut wasm = SpringLayoutWasm::with_config(interactive()).unwrap();
        let hub = wasm.add_node(Some("hub".into()), None);
        for i in 0..3 {
            let leaf = wasm.add_node(Some(format!("leaf{i}")), Some(2.0));
            wasm.connect(hub, leaf, Some(1.5));
        }
        run_until_settled(&mut wasm, 5000);

        assert!(wasm.begin_drag(hub).is_ok());
        for frame in 0..30 {
            let x = 0.1 * frame as f64;
            assert!(wasm.drag_to(hub, x, -x).is_ok());
            assert!(wasm.tick(0.033).is_ok());

            let buffer = wasm.position_buffer();
            assert_eq!((buffer[0], buffer[1]), (x, -x));
        }
        assert!(!wasm.is_settled());

        assert!(wasm.end_drag(hub).is_ok());
        let released = *wasm.layout_mut().point(NodeId(hub)).unwrap();
        assert!(!released.pinned);
        assert_eq!(released.mass, 1.0);

        let leaf = *wasm.layout_mut().point(NodeId(1)).unwrap();
        assert_eq!(leaf.mass, 2.0);

        run_until_settled(&mut wasm, 5000);
    }

    #[test]
    fn test_pin_holds_through_settling() {
        let mut wasm = SpringLayoutWasm::with_config(interactive()).unwrap();
        let a = wasm.add_node(None, None);
        let b = wasm.add_node(None, None);
        wasm.connect(a, b, Some(2.0));

        assert!(wasm.drag_to(a, 1.0, 1.0).is_ok());
        assert!(wasm.pin(a).is_ok());
        run_until_settled(&mut wasm, 5000);
        assert_eq!(&wasm.position_buffer()[..2], &[1.0, 1.0]);

        assert!(wasm.unpin(a).is_ok());
        assert!(!wasm.layout().cached_point(NodeId(a)).unwrap().pinned);
    }

    #[test]
    fn test_growing_graph_between_frames() {
        let mut wasm = SpringLayoutWasm::with_config(interactive()).unwrap();
        let root = wasm.add_node(Some("root".into()), None);
        let mut previous = root;

        for i in 0..5 {
            let next = wasm.add_node(Some(format!("n{i}")), None);
            wasm.connect(previous, next, None);
            previous = next;
            for _ in 0..20 {
                assert!(wasm.tick(0.033).is_ok());
            }
            assert_eq!(wasm.position_buffer().len(), 2 * wasm.node_count());
        }

        run_until_settled(&mut wasm, 5000);
        assert!(wasm.total_energy() < 1e-5);
    }

    #[test]
    fn test_freeze_with_zero_damping() {
        let mut wasm = SpringLayoutWasm::with_config(interactive()).unwrap();
        let a = wasm.add_node(None, None);
        let b = wasm.add_node(None, None);
        wasm.connect(a, b, Some(3.0));
        for _ in 0..5 {
            assert!(wasm.tick(0.033).is_ok());
        }

        assert!(wasm.set_damping(0.0).is_ok());
        let frozen = wasm.position_buffer();
        for _ in 0..10 {
            assert!(wasm.tick(0.033).is_ok());
        }
        assert_eq!(wasm.position_buffer(), frozen);
        assert!(wasm.is_settled());
    }

    #[test]
    fn test_cloned_graphs_lay_out_independently() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeAttrs::labelled("a"));
        let b = graph.add_node(NodeAttrs::labelled("b"));
        let c = graph.add_node(NodeAttrs::labelled("c"));
        graph.connect(a, b, EdgeAttrs::default());
        graph.connect(b, c, EdgeAttrs::with_length(2.0));

        let mut moving = Layout::new(graph.clone(), interactive()).unwrap();
        let mut idle = Layout::new(graph, interactive()).unwrap();

        let before = idle.positions();
        for _ in 0..50 {
            moving.tick(0.033);
        }
        assert_eq!(idle.positions(), before);
        assert_ne!(moving.positions(), before);

        // Topology is shared by value, not by reference.
        moving.graph_mut().add_node(NodeAttrs::labelled("d"));
        assert_eq!(moving.graph().node_count(), 4);
        assert_eq!(idle.graph().node_count(), 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LayoutConfig::new(800.0, 400.0, -0.5);
        assert!(matches!(
            SpringLayoutWasm::with_config(config),
            Err(error::Error::InvalidConfig { field: "damping", .. })
        ));
    }
}
