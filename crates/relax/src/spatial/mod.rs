//! Spatial index for brush queries.
//!
//! An octree over target-mesh vertex positions. Queries return every vertex
//! within an exact sphere; the tree only prunes the search.

use glam::Vec3;

use crate::mesh::VertexId;

/// Configuration for octree construction.
#[derive(Debug, Clone)]
pub struct OctreeConfig {
    /// Maximum depth of the octree.
    pub max_depth: u32,
    /// Maximum items per leaf node before splitting.
    pub max_items_per_leaf: usize,
    /// Minimum node size (prevents infinite subdivision).
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_items_per_leaf: 16,
            min_node_size: 0.01,
        }
    }
}

/// A spatial octree for vertex radius queries.
#[derive(Debug)]
pub struct VertexOctree {
    root: OctreeNode,
    config: OctreeConfig,
}

#[derive(Debug, Clone, Copy)]
struct OctreeItem {
    vertex_id: VertexId,
    position: Vec3,
}

#[derive(Debug)]
enum OctreeNode {
    Leaf {
        bounds: Aabb,
        items: Vec<OctreeItem>,
    },
    Internal {
        bounds: Aabb,
        children: Box<[Option<OctreeNode>; 8]>,
    },
}

impl OctreeNode {
    fn bounds(&self) -> &Aabb {
        match self {
            OctreeNode::Leaf { bounds, .. } | OctreeNode::Internal { bounds, .. } => bounds,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Squared distance from `point` to the box (zero inside).
    pub fn distance_squared(&self, point: Vec3) -> f32 {
        point.clamp(self.min, self.max).distance_squared(point)
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.distance_squared(center) <= radius * radius
    }

    /// Get the octant index for a point (0-7).
    fn octant_for_point(&self, point: Vec3) -> usize {
        let center = self.center();
        let mut index = 0;
        if point.x >= center.x {
            index |= 1;
        }
        if point.y >= center.y {
            index |= 2;
        }
        if point.z >= center.z {
            index |= 4;
        }
        index
    }

    /// Get the bounds for a specific octant.
    fn octant_bounds(&self, octant: usize) -> Aabb {
        let center = self.center();
        let min = Vec3::new(
            if octant & 1 != 0 { center.x } else { self.min.x },
            if octant & 2 != 0 { center.y } else { self.min.y },
            if octant & 4 != 0 { center.z } else { self.min.z },
        );
        let max = Vec3::new(
            if octant & 1 != 0 { self.max.x } else { center.x },
            if octant & 2 != 0 { self.max.y } else { center.y },
            if octant & 4 != 0 { self.max.z } else { center.z },
        );
        Aabb::new(min, max)
    }
}

impl VertexOctree {
    /// Create a new empty octree with the given bounds.
    pub fn new(bounds: Aabb) -> Self {
        Self::with_config(bounds, OctreeConfig::default())
    }

    /// Create a new octree with custom configuration.
    pub fn with_config(bounds: Aabb, config: OctreeConfig) -> Self {
        Self {
            root: OctreeNode::Leaf {
                bounds,
                items: Vec::new(),
            },
            config,
        }
    }

    /// Build an octree from vertex positions.
    pub fn from_vertices(vertices: impl Iterator<Item = (VertexId, Vec3)>) -> Self {
        let mut bounds = Aabb::empty();
        let items: Vec<OctreeItem> = vertices
            .map(|(id, pos)| {
                bounds.include_point(pos);
                OctreeItem {
                    vertex_id: id,
                    position: pos,
                }
            })
            .collect();

        if bounds.is_empty() {
            bounds = Aabb::new(Vec3::ZERO, Vec3::ZERO);
        }

        // Pad so vertices that drift a little during a gesture stay inside
        let padding = bounds.size() * 0.1 + Vec3::splat(0.001);
        bounds.min -= padding;
        bounds.max += padding;

        let mut octree = Self::new(bounds);
        for item in items {
            octree.insert(item.vertex_id, item.position);
        }
        octree
    }

    /// Root bounds of the tree.
    pub fn bounds(&self) -> &Aabb {
        self.root.bounds()
    }

    /// Whether `point` can be stored without rebuilding the tree.
    pub fn covers(&self, point: Vec3) -> bool {
        self.bounds().contains_point(point)
    }

    /// Insert a vertex into the octree.
    pub fn insert(&mut self, vertex_id: VertexId, position: Vec3) {
        let config = self.config.clone();
        Self::insert_into_node(&mut self.root, vertex_id, position, 0, &config);
    }

    fn insert_into_node(
        node: &mut OctreeNode,
        vertex_id: VertexId,
        position: Vec3,
        depth: u32,
        config: &OctreeConfig,
    ) {
        match node {
            OctreeNode::Leaf { bounds, items } => {
                items.push(OctreeItem { vertex_id, position });

                if items.len() > config.max_items_per_leaf
                    && depth < config.max_depth
                    && bounds.size().min_element() > config.min_node_size * 2.0
                {
                    let old_items = std::mem::take(items);
                    let old_bounds = *bounds;

                    *node = OctreeNode::Internal {
                        bounds: old_bounds,
                        children: Box::new([None, None, None, None, None, None, None, None]),
                    };

                    for item in old_items {
                        Self::insert_into_node(node, item.vertex_id, item.position, depth, config);
                    }
                }
            }
            OctreeNode::Internal { bounds, children } => {
                let octant = bounds.octant_for_point(position);

                if children[octant].is_none() {
                    let child_bounds = bounds.octant_bounds(octant);
                    children[octant] = Some(OctreeNode::Leaf {
                        bounds: child_bounds,
                        items: Vec::new(),
                    });
                }

                if let Some(child) = &mut children[octant] {
                    Self::insert_into_node(child, vertex_id, position, depth + 1, config);
                }
            }
        }
    }

    /// Query all vertices within a sphere, with their distance to the center.
    pub fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<(VertexId, f32)> {
        let mut results = Vec::new();
        Self::query_sphere_node(&self.root, center, radius, &mut results);
        results
    }

    fn query_sphere_node(
        node: &OctreeNode,
        center: Vec3,
        radius: f32,
        results: &mut Vec<(VertexId, f32)>,
    ) {
        if !node.bounds().intersects_sphere(center, radius) {
            return;
        }
        match node {
            OctreeNode::Leaf { items, .. } => {
                let radius_sq = radius * radius;
                for item in items {
                    let distance_sq = item.position.distance_squared(center);
                    if distance_sq <= radius_sq {
                        results.push((item.vertex_id, distance_sq.sqrt()));
                    }
                }
            }
            OctreeNode::Internal { children, .. } => {
                for child in children.iter().flatten() {
                    Self::query_sphere_node(child, center, radius, results);
                }
            }
        }
    }

    /// Get the total number of items in the octree.
    pub fn len(&self) -> usize {
        Self::count_items(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count_items(node: &OctreeNode) -> usize {
        match node {
            OctreeNode::Leaf { items, .. } => items.len(),
            OctreeNode::Internal { children, .. } => {
                children.iter().flatten().map(Self::count_items).sum()
            }
        }
    }

    /// Move a vertex inside the tree.
    ///
    /// Returns false when the vertex could not be found at `old_position` or
    /// `new_position` lies outside the root bounds; the caller should rebuild.
    pub fn update(&mut self, vertex_id: VertexId, old_position: Vec3, new_position: Vec3) -> bool {
        if !self.covers(new_position) {
            return false;
        }
        if !self.remove(vertex_id, old_position) {
            return false;
        }
        self.insert(vertex_id, new_position);
        true
    }

    /// Remove a vertex from the octree.
    pub fn remove(&mut self, vertex_id: VertexId, position: Vec3) -> bool {
        Self::remove_from_node(&mut self.root, vertex_id, position)
    }

    fn remove_from_node(node: &mut OctreeNode, vertex_id: VertexId, position: Vec3) -> bool {
        match node {
            OctreeNode::Leaf { items, .. } => {
                if let Some(idx) = items.iter().position(|item| item.vertex_id == vertex_id) {
                    items.swap_remove(idx);
                    return true;
                }
                false
            }
            OctreeNode::Internal { bounds, children } => {
                let octant = bounds.octant_for_point(position);
                if let Some(child) = &mut children[octant] {
                    Self::remove_from_node(child, vertex_id, position)
                } else {
                    false
                }
            }
        }
    }
}
