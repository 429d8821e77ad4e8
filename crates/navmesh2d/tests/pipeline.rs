//! Runs the whole navmesh build on small scenes and checks the properties every build must have.

use glam::{IVec2, Vec2};
use navmesh2d::{
    Aabb2d, ContourSet, NavmeshConfig, NavmeshConfigBuilder, ObstaclePolygon,
    ObstacleRasterization, PathSimplifier, RasterizationGrid, RegionId, Viewpoint,
    build_navmesh_contours, simplify_path,
};

fn config(aabb: Aabb2d, cell_size: f32) -> NavmeshConfig {
    NavmeshConfigBuilder {
        aabb,
        cell_size,
        ..Default::default()
    }
    .build()
}

/// A 160x160 diamond in the middle of a 340x340 area.
fn diamond() -> ObstaclePolygon {
    ObstaclePolygon::new([[170.0, 90.0], [250.0, 170.0], [170.0, 250.0], [90.0, 170.0]])
}

/// Two rooms of 7x7 cells, joined by a corridor one cell wide.
fn dumbbell_walls() -> Vec<ObstaclePolygon> {
    vec![
        ObstaclePolygon::rectangle([70.5, 0.5], [79.5, 29.5]),
        ObstaclePolygon::rectangle([70.5, 40.5], [79.5, 69.5]),
    ]
}

fn dumbbell_config() -> NavmeshConfig {
    config(Aabb2d::new([0.0, 0.0], [150.0, 70.0]), 10.0)
}

fn diamond_grid() -> RasterizationGrid {
    let mut grid = RasterizationGrid::new(0.0, 0.0, 340.0, 340.0, 20.0).unwrap();
    grid.rasterize_obstacles(&[&diamond()], ObstacleRasterization::Outline);
    grid
}

fn mirrored(grid: &RasterizationGrid, x: u16, y: u16) -> [(u16, u16); 3] {
    let mx = grid.width - 1 - x;
    let my = grid.height - 1 - y;
    [(mx, y), (x, my), (mx, my)]
}

fn positions(cset: &ContourSet, region: u16) -> Vec<IVec2> {
    cset.region_contours(RegionId(region))
        .flat_map(|contour| contour.positions())
        .collect()
}

#[test]
fn open_area_is_a_single_rectangle() -> anyhow::Result<()> {
    let config = config(Aabb2d::new([0.0, 0.0], [320.0, 320.0]), 20.0);
    let obstacles: [&ObstaclePolygon; 0] = [];
    let cset = build_navmesh_contours(&config, &obstacles)?;

    assert_eq!(cset.contours.len(), 1);
    assert_eq!(
        cset.contours[0].positions(),
        vec![
            IVec2::new(1, 1),
            IVec2::new(1, 17),
            IVec2::new(17, 17),
            IVec2::new(17, 1),
        ]
    );
    assert_eq!(
        cset.to_world(1.0),
        vec![vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 320.0),
            Vec2::new(320.0, 320.0),
            Vec2::new(320.0, 0.0),
        ]]
    );
    Ok(())
}

#[test]
fn area_covered_by_an_obstacle_has_no_contours() -> anyhow::Result<()> {
    let config = config(Aabb2d::new([0.0, 0.0], [320.0, 320.0]), 20.0);
    let cover = ObstaclePolygon::rectangle([-40.0, -40.0], [360.0, 360.0]);
    let cset = build_navmesh_contours(&config, &[&cover])?;
    assert!(cset.contours.is_empty());
    Ok(())
}

#[test]
fn diamond_footprint_is_symmetric() {
    let grid = diamond_grid();
    assert_eq!((grid.width, grid.height), (19, 19));
    for y in 0..grid.height {
        for x in 0..grid.width {
            let obstacle = grid.cell_at(x, y).obstacle;
            for (mx, my) in mirrored(&grid, x, y) {
                assert_eq!(grid.cell_at(mx, my).obstacle, obstacle, "({x}, {y})");
            }
        }
    }
    // Widest row goes through the middle of the diamond
    let middle_row = (0..grid.width)
        .filter(|&x| grid.cell_at(x, 9).obstacle)
        .count();
    assert_eq!(middle_row, 9);
    assert!(grid.cell_at(9, 5).obstacle);
    assert!(!grid.cell_at(9, 4).obstacle);
}

#[test]
fn diamond_distance_field_is_bounded_and_symmetric() {
    let mut grid = diamond_grid();
    grid.build_distance_field();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let cell = grid.cell_at(x, y);
            for (mx, my) in mirrored(&grid, x, y) {
                assert_eq!(
                    grid.cell_at(mx, my).distance_to_obstacle,
                    cell.distance_to_obstacle,
                    "({x}, {y})"
                );
            }
            if cell.obstacle {
                assert_eq!(cell.distance_to_obstacle, 0);
                continue;
            }
            assert!(cell.distance_to_obstacle >= 1, "({x}, {y})");
            let touches_obstacle = (-1..=1).any(|dy| {
                (-1..=1).any(|dx| {
                    grid.get_cell_at(x as i32 + dx, y as i32 + dy)
                        .is_some_and(|neighbor| neighbor.obstacle)
                })
            });
            if touches_obstacle {
                assert!(cell.distance_to_obstacle <= 3, "({x}, {y})");
            }
        }
    }
    assert_eq!(grid.cell_at(4, 4).distance_to_obstacle, 8);
    assert_eq!(grid.max_distance(), 8);
}

#[test]
fn diamond_regions_partition_the_free_cells() {
    let mut grid = diamond_grid();
    grid.build_distance_field();
    grid.build_regions(0);

    assert_eq!(grid.region_count, 4);
    for cell in &grid.cells {
        assert_eq!(cell.has_region(), !cell.obstacle);
        assert!(cell.region.0 <= grid.region_count);
    }
    // One region per corner
    let corners = [(2, 2), (16, 2), (2, 16), (16, 16)].map(|(x, y)| grid.cell_at(x, y).region);
    for (i, a) in corners.iter().enumerate() {
        for b in &corners[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert_eq!(corners, [RegionId(1), RegionId(2), RegionId(3), RegionId(4)]);

    // Every region is connected
    for region in 1..=grid.region_count {
        let cells: Vec<(i32, i32)> = (0..grid.height as i32)
            .flat_map(|y| (0..grid.width as i32).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.get_cell_at(x, y).unwrap().region == RegionId(region))
            .collect();
        let mut reached = vec![cells[0]];
        let mut stack = vec![cells[0]];
        while let Some((x, y)) = stack.pop() {
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, 1), (-1, 1), (1, -1)] {
                let neighbor = (x + dx, y + dy);
                if cells.contains(&neighbor) && !reached.contains(&neighbor) {
                    reached.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }
        assert_eq!(reached.len(), cells.len(), "region {region} is split");
    }
}

#[test]
fn diamond_contours_surround_the_diamond() {
    let mut grid = diamond_grid();
    grid.build_distance_field();
    grid.build_regions(0);
    let cset = grid.build_contours(1.0);

    assert_eq!(cset.contours.len(), 4);
    for contour in &cset.contours {
        assert!(contour.vertices.len() >= 3);
        assert!(
            contour
                .vertices
                .iter()
                .any(|vertex| vertex.neighbor_region != RegionId::NONE),
            "region {} has no portal",
            contour.region.0
        );
        // Every simplified vertex comes from the raw contour
        for vertex in &contour.vertices {
            assert!(contour.raw_vertices.contains(vertex));
        }
    }
}

#[test]
fn corridor_is_a_portal_between_rooms() -> anyhow::Result<()> {
    let walls = dumbbell_walls();
    let config = dumbbell_config();
    let mut grid = RasterizationGrid::from_config(&config)?;
    grid.populate_from_obstacles(&[&walls], &config);
    for y in (1..=3).chain(5..=7) {
        assert!(grid.cell_at(8, y).obstacle);
    }
    assert_eq!(grid.obstacle_count(), 6);

    let cset = build_navmesh_contours(&config, &[&walls])?;
    assert_eq!(cset.contours.len(), 2);

    let left = positions(&cset, 1);
    let right = positions(&cset, 2);
    for portal in [IVec2::new(9, 4), IVec2::new(9, 5)] {
        assert!(left.contains(&portal));
        assert!(right.contains(&portal));
    }

    let left_contour = cset.region_contours(RegionId(1)).next().unwrap();
    let portal_start = left_contour
        .vertices
        .iter()
        .find(|vertex| vertex.position == IVec2::new(9, 4))
        .unwrap();
    assert_eq!(portal_start.neighbor_region, RegionId(2));

    let right_contour = cset.region_contours(RegionId(2)).next().unwrap();
    let portal_start = right_contour
        .vertices
        .iter()
        .find(|vertex| vertex.position == IVec2::new(9, 5))
        .unwrap();
    assert_eq!(portal_start.neighbor_region, RegionId(1));

    assert_eq!(cset.grid_to_world(IVec2::new(9, 4), 1.0), Vec2::new(80.0, 30.0));
    Ok(())
}

#[test]
fn extra_border_closes_narrow_corridors() -> anyhow::Result<()> {
    let walls = dumbbell_walls();
    let config = NavmeshConfigBuilder {
        aabb: Aabb2d::new([0.0, 0.0], [150.0, 70.0]),
        cell_size: 10.0,
        extra_border: 10.0,
        ..Default::default()
    }
    .build();
    assert_eq!(config.obstacle_cell_padding, 1);

    let cset = build_navmesh_contours(&config, &[&walls])?;
    assert_eq!(cset.contours.len(), 2);
    for contour in &cset.contours {
        assert!(
            contour
                .raw_vertices
                .iter()
                .all(|vertex| vertex.neighbor_region == RegionId::NONE)
        );
        // Stays a cell away from the walls
        for vertex in &contour.vertices {
            assert!(vertex.position.x >= 2 && vertex.position.x <= 15);
            assert!(vertex.position.y >= 2 && vertex.position.y <= 7);
        }
    }
    Ok(())
}

#[test]
fn isometric_contours_are_squashed_back() -> anyhow::Result<()> {
    let config = NavmeshConfigBuilder {
        aabb: Aabb2d::new([0.0, 0.0], [320.0, 160.0]),
        cell_size: 20.0,
        viewpoint: Viewpoint::Isometry2To1,
        ..Default::default()
    }
    .build();
    let obstacles: [&ObstaclePolygon; 0] = [];
    let cset = build_navmesh_contours(&config, &obstacles)?;
    assert_eq!(
        cset.to_world(config.viewpoint.scale_y()),
        vec![vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 160.0),
            Vec2::new(320.0, 160.0),
            Vec2::new(320.0, 0.0),
        ]]
    );
    Ok(())
}

#[test]
fn rasterizing_twice_gives_the_same_grid() {
    let walls = dumbbell_walls();
    let config = dumbbell_config();
    let mut once = RasterizationGrid::from_config(&config).unwrap();
    once.populate_from_obstacles(&[&walls], &config);
    let mut twice = RasterizationGrid::from_config(&config).unwrap();
    twice.populate_from_obstacles(&[&walls], &config);
    twice.populate_from_obstacles(&[&walls], &config);
    assert_eq!(once, twice);
}

/// Distance from `point` to the closest segment of `path`.
fn distance_to_path(point: Vec2, path: &[Vec2]) -> f32 {
    path.windows(2)
        .map(|segment| distance_to_segment(point, segment[0], segment[1]))
        .fold(f32::INFINITY, f32::min)
}

fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    if ab.length_squared() == 0.0 {
        return point.distance(a);
    }
    let u = ((point - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
    point.distance(a + ab * u)
}

#[test]
fn simplified_path_stays_within_the_gap() {
    let path: Vec<Vec2> = (0..80)
        .map(|i| Vec2::new(i as f32 * 0.5, (i as f32 * 0.3).sin() * 3.0))
        .collect();
    let mut simplifier = PathSimplifier::new();
    for max_gap in [0.05, 0.2, 1.0, 5.0] {
        let simplified = simplifier.simplify(&path, max_gap);
        assert_eq!(simplified.first(), path.first());
        assert_eq!(simplified.last(), path.last());
        assert!(simplified.len() <= path.len());
        for point in &path {
            assert!(
                distance_to_path(*point, &simplified) <= max_gap + 1e-4,
                "{point} is too far with a gap of {max_gap}"
            );
        }
    }
}

#[test]
fn simplified_path_cannot_lose_another_vertex() {
    // A staircase with dense, slightly noisy steps
    let corners = [
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(10.0, 10.0),
        Vec2::new(20.0, 10.0),
        Vec2::new(20.0, 20.0),
    ];
    let mut path = vec![corners[0]];
    for segment in corners.windows(2) {
        for i in 1..=10 {
            let t = i as f32 / 10.0;
            if i == 10 {
                path.push(segment[1]);
                continue;
            }
            let noise = if i % 2 == 0 { 0.02 } else { -0.02 };
            path.push(segment[0].lerp(segment[1], t) + Vec2::splat(noise));
        }
    }

    let max_gap = 0.5;
    let simplified = simplify_path(&path, max_gap);
    assert_eq!(simplified, corners.to_vec());

    for removed in 1..simplified.len() - 1 {
        let mut shorter = simplified.clone();
        shorter.remove(removed);
        let violated = path
            .iter()
            .any(|point| distance_to_path(*point, &shorter) > max_gap);
        assert!(violated, "vertex {removed} was not needed");
    }
}

#[cfg(feature = "serialize")]
#[test]
fn config_and_contours_serialize() -> anyhow::Result<()> {
    let config = NavmeshConfigBuilder {
        viewpoint: Viewpoint::TrueIsometry,
        rasterization: ObstacleRasterization::CellCenters,
        ..dumbbell_config_builder()
    }
    .build();
    let json = serde_json::to_string(&config)?;
    let deserialized: NavmeshConfig = serde_json::from_str(&json)?;
    assert_eq!(deserialized, config);

    let cset = build_navmesh_contours(&dumbbell_config(), &[&dumbbell_walls()])?;
    let json = serde_json::to_value(&cset)?;
    assert_eq!(json["contours"].as_array().map(Vec::len), Some(2));
    let deserialized: ContourSet = serde_json::from_value(json)?;
    assert_eq!(deserialized, cset);
    Ok(())
}

#[cfg(feature = "serialize")]
fn dumbbell_config_builder() -> NavmeshConfigBuilder {
    NavmeshConfigBuilder {
        aabb: Aabb2d::new([0.0, 0.0], [150.0, 70.0]),
        cell_size: 10.0,
        ..Default::default()
    }
}
