//! Static octree: build once, query many

use std::marker::PhantomData;

use log::{debug, trace, warn};

use super::subcluster::{self, OctantMask, Subclusters, SUBCLUSTERS_COUNT};
use super::traits::{DefaultOctreeTraits, OctreeQueryTraits, OctreeTraits};
use crate::config::{Config, OctreeConfig};
use crate::error::{GeometryError, Result};
use crate::foundation::math::Vec3;
use crate::volumes::Aabb;

/// Recursion limit for build
///
/// Reached only when many items share identical bounds and the diagonal
/// threshold is zero; the remaining items are stored in the node as-is.
const MAX_DEPTH: usize = 64;

/// Inserted primitive with its payload
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeItem<P, T> {
    /// Stored primitive
    pub primitive: P,
    /// Value returned by queries that hit `primitive`
    pub payload: T,
}

/// Tree node covering one octant of its parent
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeNode {
    bounds: Aabb,
    center: Vec3,
    items: Vec<usize>,
    children: [Option<Box<OctreeNode>>; SUBCLUSTERS_COUNT],
}

impl OctreeNode {
    fn leaf(bounds: Aabb, items: Vec<usize>) -> Self {
        Self {
            center: bounds.center(),
            bounds,
            items,
            children: Default::default(),
        }
    }

    /// Region covered by this node
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Split point between the children
    pub const fn center(&self) -> &Vec3 {
        &self.center
    }

    /// Indices into [`Octree::items`] stored directly in this node
    pub fn item_indices(&self) -> &[usize] {
        &self.items
    }

    /// Child for octant `index`, if one was created
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)?.as_deref()
    }

    /// All child slots, indexed by octant
    pub const fn children(&self) -> &[Option<Box<Self>>; SUBCLUSTERS_COUNT] {
        &self.children
    }

    /// No children
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    fn node_count(&self) -> usize {
        1 + self.existing_children().map(Self::node_count).sum::<usize>()
    }

    fn depth(&self) -> usize {
        1 + self.existing_children().map(Self::depth).max().unwrap_or(0)
    }

    fn existing_children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Option::as_deref)
    }
}

/// Static spatial index over primitives of type `P` carrying payloads `T`
///
/// Bounds and intersection tests come from the policy `Tr`. Items are
/// accumulated with [`insert`](Self::insert), partitioned once by
/// [`build`](Self::build) and then queried any number of times. Each item
/// lives in exactly one node: the deepest one whose single octant contains
/// its bounds.
#[derive(Debug, Clone)]
pub struct Octree<P, T, Tr = DefaultOctreeTraits> {
    root: Option<Box<OctreeNode>>,
    items: Vec<OctreeItem<P, T>>,
    bounds: Aabb,
    center: Vec3,
    config: OctreeConfig,
    built: bool,
    traits: PhantomData<fn() -> Tr>,
}

impl<P, T, Tr> Octree<P, T, Tr>
where
    Tr: OctreeTraits<P>,
{
    /// Empty tree over `bounds` with the default thresholds
    pub fn new(bounds: Aabb) -> Result<Self> {
        Self::with_config(bounds, OctreeConfig::default())
    }

    /// Empty tree over `bounds`
    ///
    /// Fails with [`GeometryError::InvalidBounds`] when `lo > hi` on any axis
    /// and with [`GeometryError::InvalidConfig`] when `config` does not validate.
    pub fn with_config(bounds: Aabb, config: OctreeConfig) -> Result<Self> {
        if !bounds.is_valid() {
            return Err(GeometryError::InvalidBounds {
                lo: bounds.lo.into(),
                hi: bounds.hi.into(),
            });
        }
        config
            .validate()
            .map_err(|e| GeometryError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            root: None,
            items: Vec::new(),
            center: bounds.center(),
            bounds,
            config,
            built: false,
            traits: PhantomData,
        })
    }

    /// Shorthand for [`with_config`](Self::with_config)
    pub fn with_thresholds(
        bounds: Aabb,
        leaf_items_threshold: usize,
        min_subcluster_diagonal_sq: f32,
    ) -> Result<Self> {
        Self::with_config(
            bounds,
            OctreeConfig::new(leaf_items_threshold, min_subcluster_diagonal_sq),
        )
    }

    /// Append an item; the tree must be rebuilt before the next query
    pub fn insert(&mut self, primitive: P, payload: T) {
        self.items.push(OctreeItem { primitive, payload });
        self.built = false;
    }

    /// Reserve capacity for `additional` more items
    pub fn reserve(&mut self, additional: usize) {
        self.items.reserve(additional);
    }

    /// Drop all items and the tree
    pub fn clear(&mut self) {
        self.items.clear();
        self.root = None;
        self.built = false;
    }

    /// Number of inserted items
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Same as [`size`](Self::size)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No items inserted
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserted items in insertion order
    pub fn items(&self) -> &[OctreeItem<P, T>] {
        &self.items
    }

    /// Build thresholds
    pub const fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Spatial extent of the tree
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Centre of [`bounds`](Self::bounds)
    pub const fn center(&self) -> &Vec3 {
        &self.center
    }

    /// Tree reflects every inserted item
    pub const fn is_built(&self) -> bool {
        self.built
    }

    /// Root node, present after a build
    pub fn root(&self) -> Option<&OctreeNode> {
        self.root.as_deref()
    }

    /// Root absent or without children
    pub fn is_leaf(&self) -> bool {
        self.root.as_ref().map_or(true, |root| root.is_leaf())
    }

    /// Nodes in the current tree
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.node_count())
    }

    /// Levels in the current tree; a lone root counts as 1
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }

    /// Partition all items into a fresh tree, replacing any previous one
    pub fn build(&mut self) {
        let item_bounds: Vec<Aabb> = self
            .items
            .iter()
            .map(|item| Tr::bounds(&item.primitive))
            .collect();
        let indices = (0..self.items.len()).collect();

        let root = build_node(self.bounds, indices, &item_bounds, &self.config, 0);
        self.root = Some(Box::new(root));
        self.built = true;

        debug!(
            "Built octree: {} items, {} nodes, depth {}",
            self.items.len(),
            self.node_count(),
            self.depth()
        );
    }

    /// Octant `index` of the root bounds
    pub fn subcluster_bounds(&self, index: usize) -> Result<Aabb> {
        if index >= SUBCLUSTERS_COUNT {
            return Err(GeometryError::index_out_of_range(index, SUBCLUSTERS_COUNT));
        }
        Ok(subcluster::subcluster_bounds(&self.bounds, index))
    }

    /// Root octant containing `point`
    pub fn subcluster_by_point(&self, point: &Vec3) -> usize {
        subcluster::subcluster_by_point(&self.center, point)
    }

    /// Root octants overlapped by `bounds`
    pub fn subclusters_by_aabb(&self, bounds: &Aabb) -> Subclusters {
        subcluster::subclusters_by_aabb(&self.center, bounds)
    }

    /// Root octants overlapped by `bounds`, as a bitmask
    pub fn subclusters_mask_by_aabb(&self, bounds: &Aabb) -> OctantMask {
        subcluster::subclusters_mask_by_aabb(&self.center, bounds)
    }

    /// Payloads of every item whose primitive intersects `query`
    ///
    /// A tree that was never built, or was modified since, yields nothing.
    /// So does a query whose bounds are inverted (`lo > hi` on some axis).
    pub fn query_intersection<Q>(&self, query: &Q) -> Vec<T>
    where
        Tr: OctreeQueryTraits<P, Q>,
        T: Clone,
    {
        let mut hits = Vec::new();
        self.query_intersection_into(query, &mut hits);
        hits
    }

    /// Append to `hits` the payloads of every item intersecting `query`
    pub fn query_intersection_into<Q>(&self, query: &Q, hits: &mut Vec<T>)
    where
        Tr: OctreeQueryTraits<P, Q>,
        T: Clone,
    {
        if !self.built && !self.items.is_empty() {
            warn!(
                "Querying an octree with {} items that has not been rebuilt",
                self.items.len()
            );
            return;
        }
        self.query_root(query, hits);
    }

    /// Like [`query_intersection`](Self::query_intersection), failing with
    /// [`GeometryError::NotBuilt`] on a stale tree
    pub fn try_query_intersection<Q>(&self, query: &Q) -> Result<Vec<T>>
    where
        Tr: OctreeQueryTraits<P, Q>,
        T: Clone,
    {
        if !self.built && !self.items.is_empty() {
            return Err(GeometryError::NotBuilt);
        }
        let mut hits = Vec::new();
        self.query_root(query, &mut hits);
        Ok(hits)
    }

    fn query_root<Q>(&self, query: &Q, hits: &mut Vec<T>)
    where
        Tr: OctreeQueryTraits<P, Q>,
        T: Clone,
    {
        if let Some(root) = &self.root {
            let query_bounds = <Tr as OctreeTraits<Q>>::bounds(query);
            if !query_bounds.is_valid() {
                warn!(
                    "Ignoring octree query with inverted bounds {:?} .. {:?}",
                    query_bounds.lo, query_bounds.hi
                );
                return;
            }
            self.query_node(root, query, &query_bounds, hits);
        }
    }

    fn query_node<Q>(&self, node: &OctreeNode, query: &Q, query_bounds: &Aabb, hits: &mut Vec<T>)
    where
        Tr: OctreeQueryTraits<P, Q>,
        T: Clone,
    {
        for &index in &node.items {
            let item = &self.items[index];
            if <Tr as OctreeQueryTraits<P, Q>>::intersects(&item.primitive, query) {
                hits.push(item.payload.clone());
            }
        }

        if node.is_leaf() {
            return;
        }

        for &octant in &subcluster::subclusters_by_aabb(&node.center, query_bounds) {
            if let Some(child) = node.children[octant].as_deref() {
                self.query_node(child, query, query_bounds, hits);
            }
        }
    }
}

fn build_node(
    bounds: Aabb,
    indices: Vec<usize>,
    item_bounds: &[Aabb],
    config: &OctreeConfig,
    depth: usize,
) -> OctreeNode {
    if indices.len() < config.leaf_items_threshold
        || bounds.diagonal().norm_squared() < config.min_subcluster_diagonal_sq
        || depth >= MAX_DEPTH
    {
        trace!("Octree leaf at depth {depth} with {} items", indices.len());
        return OctreeNode::leaf(bounds, indices);
    }

    let mut node = OctreeNode::leaf(bounds, Vec::new());
    let mut pending: [Vec<usize>; SUBCLUSTERS_COUNT] = Default::default();

    for index in indices {
        let octants = subcluster::subclusters_by_aabb(&node.center, &item_bounds[index]);
        match octants.as_slice() {
            [octant] => pending[*octant].push(index),
            _ => node.items.push(index),
        }
    }

    trace!(
        "Octree node at depth {depth} keeps {} spanning items",
        node.items.len()
    );

    for (octant, child_indices) in pending.into_iter().enumerate() {
        if child_indices.is_empty() {
            continue;
        }
        let child_bounds = subcluster::subcluster_bounds(&bounds, octant);
        node.children[octant] = Some(Box::new(build_node(
            child_bounds,
            child_indices,
            item_bounds,
            config,
            depth + 1,
        )));
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Triangle;
    use crate::volumes::Sphere;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cube(half: f32) -> Aabb {
        Aabb::new(Vec3::repeat(-half), Vec3::repeat(half))
    }

    fn sorted(mut ids: Vec<u32>) -> Vec<u32> {
        ids.sort_unstable();
        ids
    }

    fn octant_spheres() -> Octree<Sphere, u32> {
        let mut tree = Octree::with_thresholds(cube(1.0), 2, 0.0).unwrap();
        let mut id = 0;
        // ids follow octant numbering: x is the lowest bit
        for &z in &[-0.5, 0.5] {
            for &y in &[-0.5, 0.5] {
                for &x in &[-0.5, 0.5] {
                    tree.insert(Sphere::new(Vec3::new(x, y, z), 0.1), id);
                    id += 1;
                }
            }
        }
        tree.build();
        tree
    }

    #[test]
    fn test_empty_tree_queries() {
        let mut tree: Octree<Aabb, u32> = Octree::new(cube(5.0)).unwrap();
        assert!(tree.query_intersection(&cube(1.0)).is_empty());
        assert_eq!(tree.try_query_intersection(&cube(1.0)), Ok(Vec::new()));

        tree.build();
        assert!(tree.query_intersection(&cube(1.0)).is_empty());
        assert_eq!(tree.node_count(), 1);
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_invalid_bounds() {
        let inverted = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
        let result: Result<Octree<Aabb, u32>> = Octree::new(inverted);
        assert!(matches!(result, Err(GeometryError::InvalidBounds { .. })));
    }

    #[test]
    fn test_below_threshold_stays_leaf() {
        let mut tree: Octree<Sphere, u32> = Octree::with_thresholds(cube(10.0), 4, 1.0).unwrap();
        for i in 0..3u8 {
            let offset = f32::from(i) * 3.0 - 3.0;
            tree.insert(Sphere::new(Vec3::new(offset, offset, offset), 0.5), u32::from(i));
        }
        tree.build();

        assert!(tree.is_leaf());
        assert_eq!(tree.root().unwrap().item_indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_threshold_equal_to_size_subdivides() {
        let mut tree: Octree<Sphere, u32> = Octree::with_thresholds(cube(10.0), 3, 1.0).unwrap();
        for i in 0..3u8 {
            let offset = f32::from(i) * 3.0 - 3.0;
            tree.insert(Sphere::new(Vec3::new(offset, offset, offset), 0.5), u32::from(i));
        }
        tree.build();

        assert_eq!(tree.size(), tree.config().leaf_items_threshold);
        assert!(!tree.is_leaf());
        assert_eq!(tree.node_count(), 3);
        let root = tree.root().unwrap();
        assert_eq!(root.item_indices(), &[1]);
        assert_eq!(root.child(0).unwrap().item_indices(), &[0]);
        assert_eq!(root.child(7).unwrap().item_indices(), &[2]);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let nan: Result<Octree<Aabb, u32>> = Octree::with_thresholds(cube(1.0), 8, f32::NAN);
        assert!(matches!(nan, Err(GeometryError::InvalidConfig(_))));

        let negative: Result<Octree<Aabb, u32>> =
            Octree::with_config(cube(1.0), OctreeConfig::new(8, -1.0));
        assert!(matches!(negative, Err(GeometryError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_query_bounds_yield_nothing() {
        let tree = octant_spheres();
        let inverted = Aabb::new(Vec3::repeat(0.9), Vec3::repeat(-0.9));
        assert!(tree.query_intersection(&inverted).is_empty());
        assert_eq!(tree.try_query_intersection(&inverted), Ok(Vec::new()));

        let upright = inverted.normalize();
        assert_eq!(sorted(tree.query_intersection(&upright)), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_tiny_bounds_stay_leaf() {
        let mut tree: Octree<Sphere, u32> = Octree::with_thresholds(cube(0.1), 1, 1.0).unwrap();
        tree.insert(Sphere::new(Vec3::repeat(0.05), 0.01), 0);
        tree.insert(Sphere::new(Vec3::repeat(-0.05), 0.01), 1);
        tree.build();
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_subdivides_into_octants() {
        let tree = octant_spheres();
        let root = tree.root().unwrap();

        assert!(!root.is_leaf());
        assert!(root.item_indices().is_empty());
        for octant in 0..SUBCLUSTERS_COUNT {
            let child = root.child(octant).unwrap();
            assert_eq!(child.item_indices(), &[octant]);
            assert!(child.is_leaf());
            assert_eq!(*child.bounds(), tree.subcluster_bounds(octant).unwrap());
        }
        assert_eq!(tree.node_count(), 9);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_only_occupied_octants_get_children() {
        let mut tree: Octree<Aabb, u32> = Octree::with_thresholds(cube(4.0), 1, 0.0).unwrap();
        tree.insert(Aabb::from_center_size(Vec3::new(1.0, 1.0, 1.0), 0.5), 0);
        tree.insert(Aabb::from_center_size(Vec3::new(-3.0, -3.0, -3.0), 0.5), 1);
        tree.build();

        let root = tree.root().unwrap();
        let occupied: Vec<usize> = (0..SUBCLUSTERS_COUNT)
            .filter(|&i| root.child(i).is_some())
            .collect();
        assert_eq!(occupied, vec![0, 7]);
        assert!(root.child(SUBCLUSTERS_COUNT).is_none());
    }

    #[test]
    fn test_spanning_item_stays_in_root() {
        let mut tree: Octree<Aabb, u32> = Octree::with_thresholds(cube(8.0), 1, 0.0).unwrap();
        tree.insert(cube(1.0), 0);
        tree.insert(Aabb::from_center_size(Vec3::repeat(4.0), 1.0), 1);
        tree.insert(Aabb::from_center_size(Vec3::repeat(-4.0), 1.0), 2);
        tree.build();

        let root = tree.root().unwrap();
        assert_eq!(root.item_indices(), &[0]);
        assert_eq!(sorted(tree.query_intersection(&cube(8.0))), vec![0, 1, 2]);
    }

    #[test]
    fn test_coincident_items_terminate() {
        let mut tree: Octree<Aabb, u32> = Octree::with_thresholds(cube(1.0), 1, 0.0).unwrap();
        for id in 0..4 {
            tree.insert(Aabb::from_center_size(Vec3::repeat(0.5), 0.0), id);
        }
        tree.build();

        assert!(tree.depth() <= MAX_DEPTH + 1);
        let hits = tree.query_intersection(&Aabb::from_center_size(Vec3::repeat(0.5), 0.1));
        assert_eq!(sorted(hits), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut tree = octant_spheres();
        let query = Sphere::new(Vec3::new(0.3, 0.3, 0.3), 0.5);
        let first = sorted(tree.query_intersection(&query));
        let nodes = tree.node_count();

        tree.build();
        assert_eq!(sorted(tree.query_intersection(&query)), first);
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(first, vec![7]);
    }

    #[test]
    fn test_insert_after_build_marks_stale() {
        let mut tree = octant_spheres();
        assert!(tree.is_built());

        tree.insert(Sphere::new(Vec3::zeros(), 0.1), 8);
        assert!(!tree.is_built());
        assert!(tree.query_intersection(&cube(1.0)).is_empty());
        assert_eq!(tree.try_query_intersection(&cube(1.0)), Err(GeometryError::NotBuilt));

        tree.build();
        assert_eq!(tree.query_intersection(&cube(1.0)).len(), 9);
    }

    #[test]
    fn test_clear() {
        let mut tree = octant_spheres();
        tree.clear();
        assert_eq!(tree.size(), 0);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.query_intersection(&cube(1.0)).is_empty());
    }

    #[test]
    fn test_query_into_appends() {
        let tree = octant_spheres();
        let mut hits = vec![100];
        tree.query_intersection_into(&Sphere::new(Vec3::repeat(-0.5), 0.05), &mut hits);
        assert_eq!(hits, vec![100, 0]);
    }

    #[test]
    fn test_root_subcluster_helpers() {
        let tree: Octree<Aabb, u32> = Octree::new(cube(5.0)).unwrap();
        assert_eq!(
            tree.subcluster_bounds(8),
            Err(GeometryError::index_out_of_range(8, SUBCLUSTERS_COUNT))
        );
        assert_eq!(tree.subcluster_bounds(7).unwrap(), Aabb::new(Vec3::zeros(), Vec3::repeat(5.0)));
        assert_eq!(tree.subcluster_by_point(&Vec3::new(1.0, -1.0, 1.0)), 5);

        let straddle = Aabb::new(Vec3::repeat(-2.0), Vec3::repeat(2.0));
        assert_eq!(tree.subclusters_by_aabb(&straddle).len(), 8);
        assert_eq!(tree.subclusters_mask_by_aabb(&straddle).bits(), 255);
    }

    #[test]
    fn test_small_sphere_queries_match_brute_force() {
        let tree = octant_spheres();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let center = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let query = Sphere::new(center, rng.gen_range(0.0..0.9));

            let expected: Vec<u32> = tree
                .items()
                .iter()
                .filter(|item| item.primitive.intersects(&query))
                .map(|item| item.payload)
                .collect();
            assert_eq!(sorted(tree.query_intersection(&query)), expected);
        }
    }

    #[test]
    fn test_triangles_against_boxes() {
        let mut tree: Octree<Triangle, u32> = Octree::with_thresholds(cube(2.0), 1, 0.0).unwrap();
        tree.insert(
            Triangle::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.5, 1.0, 1.0), Vec3::new(1.0, 1.5, 1.0)),
            0,
        );
        tree.insert(
            Triangle::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(-1.5, -1.0, -1.0), Vec3::new(-1.0, -1.5, -1.0)),
            1,
        );
        tree.build();

        assert_eq!(tree.query_intersection(&cube(0.5)), Vec::<u32>::new());
        assert_eq!(tree.query_intersection(&Aabb::new(Vec3::repeat(0.9), Vec3::repeat(1.1))), vec![0]);
        assert_eq!(tree.query_intersection(&Sphere::new(Vec3::new(-1.2, -1.2, -1.0), 0.1)), vec![1]);
    }

    #[test]
    fn test_concurrent_queries() {
        let tree = octant_spheres();
        let queries: Vec<Vec3> = (0..8)
            .map(|i| tree.root().unwrap().child(i).unwrap().bounds().center())
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = queries
                .iter()
                .map(|center| {
                    let tree = &tree;
                    scope.spawn(move || tree.query_intersection(&Sphere::new(*center, 0.2)))
                })
                .collect();

            for (octant, handle) in handles.into_iter().enumerate() {
                let hits = handle.join().unwrap();
                assert_eq!(hits, vec![u32::try_from(octant).unwrap()]);
            }
        });
    }
}
