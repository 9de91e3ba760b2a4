//! Octree queries compared against brute-force scans

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rove::prelude::*;

fn random_point(rng: &mut StdRng, half: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
        rng.gen_range(-half..half),
    )
}

fn random_sphere(rng: &mut StdRng, max_radius: f32) -> Sphere {
    Sphere::new(random_point(rng, 1.0), rng.gen_range(0.01..max_radius))
}

fn random_aabb(rng: &mut StdRng) -> Aabb {
    let half = Vec3::new(
        rng.gen_range(0.01..0.2),
        rng.gen_range(0.01..0.2),
        rng.gen_range(0.01..0.2),
    );
    Aabb::from_center_extents(random_point(rng, 1.0), half)
}

fn random_triangle(rng: &mut StdRng) -> Triangle {
    loop {
        let anchor = random_point(rng, 1.0);
        let triangle = Triangle::new(
            anchor,
            anchor + random_point(rng, 0.3),
            anchor + random_point(rng, 0.3),
        );
        if triangle.area() > 1e-3 {
            return triangle;
        }
    }
}

fn unit_tree<P>(threshold: usize, min_diagonal_sq: f32) -> Octree<P, usize>
where
    DefaultOctreeTraits: OctreeTraits<P>,
{
    let bounds = Aabb::new(Vec3::repeat(-1.5), Vec3::repeat(1.5));
    Octree::with_thresholds(bounds, threshold, min_diagonal_sq).unwrap()
}

/// Query results as a set, asserting no payload is reported twice
fn hit_set(hits: Vec<usize>) -> HashSet<usize> {
    let count = hits.len();
    let set: HashSet<usize> = hits.into_iter().collect();
    assert_eq!(set.len(), count, "duplicate payloads in query result");
    set
}

fn check_against_brute_force<P, Q>(tree: &Octree<P, usize>, queries: &[Q])
where
    DefaultOctreeTraits: OctreeQueryTraits<P, Q>,
{
    for query in queries {
        let expected: HashSet<usize> = tree
            .items()
            .iter()
            .filter(|item| {
                <DefaultOctreeTraits as OctreeQueryTraits<P, Q>>::intersects(&item.primitive, query)
            })
            .map(|item| item.payload)
            .collect();
        assert_eq!(hit_set(tree.query_intersection(query)), expected);
    }
}

fn populated<P>(primitives: &[P], threshold: usize, min_diagonal_sq: f32) -> Octree<P, usize>
where
    P: Clone,
    DefaultOctreeTraits: OctreeTraits<P>,
{
    let mut tree = unit_tree(threshold, min_diagonal_sq);
    tree.reserve(primitives.len());
    for (id, primitive) in primitives.iter().enumerate() {
        tree.insert(primitive.clone(), id);
    }
    tree.build();
    tree
}

#[test]
fn test_spheres_against_spheres() {
    let mut rng = StdRng::seed_from_u64(1);
    let spheres: Vec<Sphere> = (0..500).map(|_| random_sphere(&mut rng, 0.2)).collect();
    let queries: Vec<Sphere> = (0..100).map(|_| random_sphere(&mut rng, 0.4)).collect();

    let tree = populated(&spheres, 8, 0.01);
    assert!(!tree.is_leaf());
    check_against_brute_force(&tree, &queries);
}

#[test]
fn test_boxes_against_boxes_and_spheres() {
    let mut rng = StdRng::seed_from_u64(2);
    let boxes: Vec<Aabb> = (0..500).map(|_| random_aabb(&mut rng)).collect();
    let box_queries: Vec<Aabb> = (0..100).map(|_| random_aabb(&mut rng)).collect();
    let sphere_queries: Vec<Sphere> = (0..100).map(|_| random_sphere(&mut rng, 0.4)).collect();

    let tree = populated(&boxes, 4, 0.0);
    check_against_brute_force(&tree, &box_queries);
    check_against_brute_force(&tree, &sphere_queries);
}

#[test]
fn test_triangles_against_all_query_kinds() {
    let mut rng = StdRng::seed_from_u64(3);
    let triangles: Vec<Triangle> = (0..200).map(|_| random_triangle(&mut rng)).collect();
    let triangle_queries: Vec<Triangle> = (0..80).map(|_| random_triangle(&mut rng)).collect();
    let box_queries: Vec<Aabb> = (0..80).map(|_| random_aabb(&mut rng)).collect();
    let sphere_queries: Vec<Sphere> = (0..80).map(|_| random_sphere(&mut rng, 0.4)).collect();

    let tree = populated(&triangles, 4, 0.0);
    check_against_brute_force(&tree, &triangle_queries);
    check_against_brute_force(&tree, &box_queries);
    check_against_brute_force(&tree, &sphere_queries);
}

#[test]
fn test_results_independent_of_thresholds() {
    let mut rng = StdRng::seed_from_u64(4);
    let spheres: Vec<Sphere> = (0..300).map(|_| random_sphere(&mut rng, 0.15)).collect();
    let queries: Vec<Aabb> = (0..60).map(|_| random_aabb(&mut rng)).collect();

    let reference = populated(&spheres, usize::MAX, 0.0);
    assert!(reference.is_leaf());

    for &(threshold, min_diagonal_sq) in &[(1, 0.0), (2, 0.0), (8, 1.0), (16, 0.1), (64, 0.0)] {
        let tree = populated(&spheres, threshold, min_diagonal_sq);
        for query in &queries {
            assert_eq!(
                hit_set(tree.query_intersection(query)),
                hit_set(reference.query_intersection(query)),
                "threshold {threshold}, min diagonal {min_diagonal_sq}"
            );
        }
    }
}

#[test]
fn test_every_item_stored_once() {
    let mut rng = StdRng::seed_from_u64(5);
    let triangles: Vec<Triangle> = (0..200).map(|_| random_triangle(&mut rng)).collect();
    let tree = populated(&triangles, 2, 0.0);

    let mut seen = vec![0usize; tree.size()];
    let mut stack = vec![tree.root().unwrap()];
    while let Some(node) = stack.pop() {
        for &index in node.item_indices() {
            seen[index] += 1;
        }
        stack.extend(node.children().iter().filter_map(|child| child.as_deref()));
    }
    assert!(seen.iter().all(|&count| count == 1));
}

#[test]
fn test_capsules_and_obbs() {
    let mut rng = StdRng::seed_from_u64(6);
    let capsules: Vec<Capsule> = (0..150)
        .map(|_| {
            let a = random_point(&mut rng, 1.0);
            Capsule::new(a, a + random_point(&mut rng, 0.3), rng.gen_range(0.01..0.1))
        })
        .collect();
    let boxes: Vec<Obb> = (0..150)
        .map(|_| Obb::from_aabb(&random_aabb(&mut rng)))
        .collect();
    let sphere_queries: Vec<Sphere> = (0..50).map(|_| random_sphere(&mut rng, 0.3)).collect();
    let box_queries: Vec<Aabb> = (0..50).map(|_| random_aabb(&mut rng)).collect();

    check_against_brute_force(&populated(&capsules, 4, 0.0), &sphere_queries);
    check_against_brute_force(&populated(&boxes, 4, 0.0), &box_queries);
}

#[test]
fn test_millimetre_obbs_match_brute_force() {
    let near_origin = Obb::from_aabb(&Aabb::from_center_size(Vec3::new(0.1, 0.1, 0.1), 0.0005));
    let far_corner = Obb::from_aabb(&Aabb::from_center_size(Vec3::repeat(-1.2), 0.0005));
    let mut rng = StdRng::seed_from_u64(8);
    let mut boxes = vec![near_origin, far_corner];
    boxes.extend((0..100).map(|_| {
        Obb::from_aabb(&Aabb::from_center_size(random_point(&mut rng, 1.2), 0.001))
    }));

    let tree = populated(&boxes, 2, 0.0);
    let corner_query = Aabb::from_center_size(Vec3::repeat(-1.2), 0.0002);
    assert_eq!(hit_set(tree.query_intersection(&corner_query)), HashSet::from([1]));

    let queries: Vec<Aabb> = (0..50)
        .map(|_| Aabb::from_center_size(random_point(&mut rng, 1.2), 0.05))
        .collect();
    check_against_brute_force(&tree, &queries);
    check_against_brute_force(&tree, &boxes);
}

#[test]
fn test_concurrent_readers() {
    let mut rng = StdRng::seed_from_u64(7);
    let spheres: Vec<Sphere> = (0..400).map(|_| random_sphere(&mut rng, 0.2)).collect();
    let queries: Vec<Sphere> = (0..64).map(|_| random_sphere(&mut rng, 0.3)).collect();
    let tree = populated(&spheres, 8, 0.0);

    let expected: Vec<HashSet<usize>> = queries
        .iter()
        .map(|query| hit_set(tree.query_intersection(query)))
        .collect();

    std::thread::scope(|scope| {
        for (chunk, expected) in queries.chunks(16).zip(expected.chunks(16)) {
            let tree = &tree;
            scope.spawn(move || {
                for (query, expected) in chunk.iter().zip(expected) {
                    assert_eq!(&hit_set(tree.query_intersection(query)), expected);
                }
            });
        }
    });
}
