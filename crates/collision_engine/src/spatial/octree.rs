//! Octree spatial partitioning structure
//!
//! Divides a cubic world region into a hierarchy of cubic nodes. Elements are
//! keyed boxes; each lives in the deepest node whose region fully contains
//! it, so elements straddling a child boundary stay with the parent. A leaf
//! splits once it holds more than `split_threshold` elements and collapses
//! again when its subtree shrinks back under that threshold.

use crate::foundation::math::Vec3;
use crate::physics::collision::{AABox, Intersect, Ray};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Elements a leaf may hold before it splits
    pub split_threshold: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Smallest allowed node half-size (prevents excessive subdivision)
    pub min_radius: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            split_threshold: 8,
            max_depth: 8,
            min_radius: 1.0,
        }
    }
}

/// Distance at which `ray` enters `region` (0 if it starts inside)
///
/// Faces are inclusive and a zero direction component only checks the
/// origin against that slab, so rays running along a node boundary plane
/// still reach the nodes on both sides.
fn region_entry(ray: &Ray, region: &AABox) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;
    for i in 0..3 {
        let d = ray.direction[i];
        if d == 0.0 {
            if ray.origin[i] < region.min[i] || ray.origin[i] > region.max[i] {
                return None;
            }
            continue;
        }

        let t0 = (region.min[i] - ray.origin[i]) / d;
        let t1 = (region.max[i] - ray.origin[i]) / d;
        t_min = t_min.max(t0.min(t1));
        t_max = t_max.min(t0.max(t1));
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode<K> {
    /// Center of the node's cube
    pub center: Vec3,

    /// Half the edge length of the node's cube
    pub radius: f32,

    /// Depth in the tree (0 = root)
    pub depth: u32,

    /// Elements stored at this node
    pub elements: Vec<(K, AABox)>,

    /// Child nodes (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode<K>; 8]>>,
}

impl<K: Copy + Eq> OctreeNode<K> {
    fn new(center: Vec3, radius: f32, depth: u32) -> Self {
        Self {
            center,
            radius,
            depth,
            elements: Vec::new(),
            children: None,
        }
    }

    /// Region covered by this node
    pub fn bounds(&self) -> AABox {
        AABox::from_center_extents(self.center, Vec3::repeat(self.radius))
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Octant (bit 0 = +x, bit 1 = +y, bit 2 = +z) whose child fully
    /// contains `b`, or `None` if `b` straddles the center on some axis
    fn child_for(&self, b: &AABox) -> Option<usize> {
        let mut octant = 0;
        for i in 0..3 {
            if b.min[i] >= self.center[i] {
                octant |= 1 << i;
            } else if b.max[i] > self.center[i] {
                return None;
            }
        }
        Some(octant)
    }

    fn can_split(&self, config: &OctreeConfig) -> bool {
        self.depth < config.max_depth && self.radius * 0.5 >= config.min_radius
    }

    /// Subdivide this node into 8 children and push elements down
    fn subdivide(&mut self, config: &OctreeConfig) {
        let half = self.radius * 0.5;
        let children: [OctreeNode<K>; 8] = std::array::from_fn(|octant| {
            let offset = Vec3::new(
                if octant & 1 != 0 { half } else { -half },
                if octant & 2 != 0 { half } else { -half },
                if octant & 4 != 0 { half } else { -half },
            );
            OctreeNode::new(self.center + offset, half, self.depth + 1)
        });
        self.children = Some(Box::new(children));

        for (key, b) in std::mem::take(&mut self.elements) {
            self.insert(key, b, config);
        }
    }

    fn insert(&mut self, key: K, b: AABox, config: &OctreeConfig) {
        let octant = self.child_for(&b);
        if let (Some(children), Some(octant)) = (self.children.as_mut(), octant) {
            children[octant].insert(key, b, config);
            return;
        }

        self.elements.push((key, b));
        if self.is_leaf() && self.elements.len() > config.split_threshold && self.can_split(config) {
            self.subdivide(config);
        }
    }

    /// Remove `key`, descending along the path `b` was inserted with
    fn remove(&mut self, key: K, b: &AABox, config: &OctreeConfig) -> bool {
        let removed = if let Some(index) = self.elements.iter().position(|(k, _)| *k == key) {
            self.elements.swap_remove(index);
            true
        } else {
            match (self.child_for(b), self.children.as_mut()) {
                (Some(octant), Some(children)) => children[octant].remove(key, b, config),
                _ => false,
            }
        };

        if removed {
            self.try_collapse(config);
        }
        removed
    }

    /// Merge leaf children back into this node once they hold few enough elements
    fn try_collapse(&mut self, config: &OctreeConfig) {
        let Some(children) = self.children.as_ref() else {
            return;
        };
        if !children.iter().all(OctreeNode::is_leaf) {
            return;
        }
        let total = self.elements.len() + children.iter().map(|c| c.elements.len()).sum::<usize>();
        if total > config.split_threshold {
            return;
        }

        if let Some(children) = self.children.take() {
            let children: [OctreeNode<K>; 8] = *children;
            for child in children {
                self.elements.extend(child.elements);
            }
        }
    }

    fn query<F, G>(&self, region_test: &F, element_test: &G, results: &mut Vec<K>)
    where
        F: Fn(&AABox) -> bool,
        G: Fn(&K, &AABox) -> bool,
    {
        if !region_test(&self.bounds()) {
            return;
        }

        for (key, b) in &self.elements {
            if element_test(key, b) {
                results.push(*key);
            }
        }

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.query(region_test, element_test, results);
            }
        }
    }

    fn cast_ray(
        &self,
        ray: &Ray,
        test: &mut dyn FnMut(&K) -> Intersect,
        best: &mut (Option<K>, Intersect),
    ) {
        // Elements never extend past their node, so a missed or farther
        // region cannot hold a nearer hit
        match region_entry(ray, &self.bounds()) {
            Some(entry) if entry <= best.1.distance => {}
            _ => return,
        }

        for (key, _) in &self.elements {
            let hit = test(key);
            if hit.hit && hit.distance < best.1.distance {
                *best = (Some(*key), hit);
            }
        }

        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.cast_ray(ray, test, best);
            }
        }
    }

    fn collect_nodes<'a>(&'a self, nodes: &mut Vec<&'a OctreeNode<K>>) {
        nodes.push(self);
        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.collect_nodes(nodes);
            }
        }
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a OctreeNode<K>>) {
        if self.is_leaf() {
            leaves.push(self);
        } else if let Some(ref children) = self.children {
            for child in children.iter() {
                child.get_all_leaves(leaves);
            }
        }
    }

    /// Get all nodes at a specific depth (for visualization)
    pub fn get_nodes_at_depth<'a>(&'a self, target_depth: u32, nodes: &mut Vec<&'a OctreeNode<K>>) {
        if self.depth == target_depth {
            nodes.push(self);
        } else if let Some(ref children) = self.children {
            for child in children.iter() {
                child.get_nodes_at_depth(target_depth, nodes);
            }
        }
    }

    /// Count total elements in this node and all children
    pub fn count_elements(&self) -> usize {
        let mut count = self.elements.len();

        if let Some(ref children) = self.children {
            for child in children.iter() {
                count += child.count_elements();
            }
        }

        count
    }
}

/// Octree over keyed axis-aligned boxes
#[derive(Debug, Clone)]
pub struct Octree<K> {
    root: OctreeNode<K>,
    config: OctreeConfig,
    /// Box each key was stored with, used to find it again on removal
    locations: HashMap<K, AABox>,
}

impl<K: Copy + Eq + Hash> Octree<K> {
    /// Create an octree covering `world_bounds`
    ///
    /// The root is the cube centered on the bounds whose half-size is the
    /// largest half-extent, so non-cubic bounds are padded out.
    pub fn new(world_bounds: &AABox, config: OctreeConfig) -> Self {
        let radius = world_bounds.extents().max();
        Self {
            root: OctreeNode::new(world_bounds.center(), radius, 0),
            config,
            locations: HashMap::new(),
        }
    }

    /// Root node
    pub const fn root(&self) -> &OctreeNode<K> {
        &self.root
    }

    /// Configuration
    pub const fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Region covered by the whole tree
    pub fn bounds(&self) -> AABox {
        self.root.bounds()
    }

    /// Insert `key` with box `b`, replacing any previous entry for `key`
    ///
    /// Returns `false`, leaving `key` absent, if `b` is not fully inside the
    /// tree's region.
    pub fn set(&mut self, key: K, b: AABox) -> bool {
        self.remove(key);
        if !self.root.bounds().contains_box(&b) {
            return false;
        }
        self.root.insert(key, b, &self.config);
        self.locations.insert(key, b);
        true
    }

    /// Remove `key`; returns whether it was present
    pub fn remove(&mut self, key: K) -> bool {
        match self.locations.remove(&key) {
            Some(b) => self.root.remove(key, &b, &self.config),
            None => false,
        }
    }

    /// Whether `key` is stored
    pub fn contains(&self, key: K) -> bool {
        self.locations.contains_key(&key)
    }

    /// Box stored for `key`
    pub fn get(&self, key: K) -> Option<&AABox> {
        self.locations.get(&key)
    }

    /// Every key whose box satisfies `predicate`
    pub fn filter<F: Fn(&K, &AABox) -> bool>(&self, predicate: F) -> Vec<K> {
        let mut results = Vec::new();
        self.root.query(&|_: &AABox| true, &predicate, &mut results);
        results
    }

    /// Every key whose box overlaps `b` (inclusive)
    pub fn filter_box(&self, b: &AABox) -> Vec<K> {
        let mut results = Vec::new();
        self.root.query(
            &|region: &AABox| region.intersects(b),
            &|_: &K, e: &AABox| e.intersects(b),
            &mut results,
        );
        results
    }

    /// Every key whose box the ray passes through
    pub fn filter_ray(&self, ray: &Ray) -> Vec<K> {
        let mut results = Vec::new();
        self.root.query(
            &|region: &AABox| region_entry(ray, region).is_some(),
            &|_: &K, e: &AABox| region_entry(ray, e).is_some(),
            &mut results,
        );
        results
    }

    /// Nearest hit along `ray`, where `test` performs the exact per-element test
    pub fn cast_ray<F: FnMut(&K) -> Intersect>(&self, ray: &Ray, mut test: F) -> (Option<K>, Intersect) {
        let mut best = (None, Intersect::miss());
        self.root.cast_ray(ray, &mut test, &mut best);
        best
    }

    /// Every node, parents before children (for visualization)
    pub fn nodes(&self) -> Vec<&OctreeNode<K>> {
        let mut nodes = Vec::new();
        self.root.collect_nodes(&mut nodes);
        nodes
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves(&self) -> Vec<&OctreeNode<K>> {
        let mut leaves = Vec::new();
        self.root.get_all_leaves(&mut leaves);
        leaves
    }

    /// Get all nodes at a specific depth (for visualization)
    pub fn get_nodes_at_depth(&self, depth: u32) -> Vec<&OctreeNode<K>> {
        let mut nodes = Vec::new();
        self.root.get_nodes_at_depth(depth, &mut nodes);
        nodes
    }

    /// Get total element count
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the tree holds no elements
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Clear the octree
    pub fn clear(&mut self) {
        self.root = OctreeNode::new(self.root.center, self.root.radius, 0);
        self.locations.clear();
    }
}
