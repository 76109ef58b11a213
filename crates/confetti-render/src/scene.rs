//! Retained scene-graph backend
//!
//! Keeps one sprite node per live particle, keyed by particle id, and
//! updates it in place each frame. Nodes use a bottom-left origin with y
//! pointing up. After `present` the packed instance buffer mirrors the
//! node set and can be uploaded to a GPU as-is.

use crate::renderer::Renderer;
use bytemuck::{Pod, Zeroable};
use confetti_core::{CanvasSize, ParticleId};
use confetti_particles::Particle;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Per-sprite instance data. 48 bytes, 16-byte aligned (3 x vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub pos_rot: [f32; 4], // xy = position, z = rotation, w = shape kind
    pub color: [f32; 4],   // rgba, alpha = opacity
    pub scale: [f32; 4],   // xy = scale, zw unused
}

/// Shape kinds as encoded in `SpriteInstance::pos_rot.w`
fn shape_code(kind: &str) -> f32 {
    match kind {
        "square" => 0.0,
        "circle" => 1.0,
        "star" => 2.0,
        "path" => 3.0,
        "bitmap" => 4.0,
        _ => 5.0,
    }
}

/// Cached visual state for one particle
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: ParticleId,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub alpha: f64,
    pub color: [f32; 3],
    pub kind: &'static str,
    /// Draw order within the current frame
    pub order: usize,
}

impl SceneNode {
    fn instance(&self) -> SpriteInstance {
        SpriteInstance {
            pos_rot: [
                self.x as f32,
                self.y as f32,
                self.rotation as f32,
                shape_code(self.kind),
            ],
            color: [self.color[0], self.color[1], self.color[2], self.alpha as f32],
            scale: [self.scale_x as f32, self.scale_y as f32, 0.0, 0.0],
        }
    }
}

/// Scene backend with an id-keyed node cache
#[derive(Default)]
pub struct SceneRenderer {
    nodes: HashMap<ParticleId, SceneNode>,
    touched: HashSet<ParticleId>,
    instances: Vec<SpriteInstance>,
    nodes_created: usize,
    frame_order: usize,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: ParticleId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes allocated since construction; reused nodes are not counted
    pub fn nodes_created(&self) -> usize {
        self.nodes_created
    }

    /// Instance data in draw order, as of the last `present`
    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Renderer for SceneRenderer {
    fn clear(&mut self) {
        self.touched.clear();
        self.frame_order = 0;
    }

    fn draw_particle(&mut self, particle: &Particle, canvas: CanvasSize) {
        let (x, y) = (particle.x, canvas.flip_y(particle.y));
        let [r, g, b, _] = particle.color.to_rgba_f32(1.0);
        let order = self.frame_order;
        self.frame_order += 1;

        let node = self.nodes.entry(particle.id).or_insert_with(|| {
            self.nodes_created += 1;
            SceneNode {
                id: particle.id,
                x,
                y,
                rotation: 0.0,
                scale_x: 1.0,
                scale_y: 1.0,
                alpha: 1.0,
                color: [r, g, b],
                kind: particle.shape.kind(),
                order,
            }
        });

        node.x = x;
        node.y = y;
        // scene rotation runs counter-clockwise
        node.rotation = -particle.tilt_angle;
        node.scale_x = particle.scalar;
        node.scale_y = if particle.flat {
            particle.scalar * 0.5
        } else {
            particle.scalar
        };
        node.alpha = particle.opacity();
        node.color = [r, g, b];
        node.order = order;

        self.touched.insert(particle.id);
    }

    fn present(&mut self) {
        let before = self.nodes.len();
        let touched = &self.touched;
        self.nodes.retain(|id, _| touched.contains(id));
        let removed = before - self.nodes.len();
        if removed > 0 {
            trace!(removed, "dropped stale scene nodes");
        }

        let mut ordered: Vec<&SceneNode> = self.nodes.values().collect();
        ordered.sort_by_key(|n| n.order);
        self.instances = ordered.into_iter().map(SceneNode::instance).collect();
    }

    fn name(&self) -> &str {
        "scene"
    }
}
