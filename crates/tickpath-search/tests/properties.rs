use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};
use tickpath_core::{Grid, Point};
use tickpath_search::{
    AStarPathfinding, DictionaryFrontier, EuclideanDistance, Frontier, GoalBoundPathfinding,
    Heuristic, HeapFrontier, MoveCosts, NodeArray, NodeRecord, NodeStatus, SearchResult,
    SimpleFrontier, UNBOUNDED, ZeroHeuristic, node_grid,
};

#[derive(Debug, Clone)]
struct Map {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    start: Point,
    goal: Point,
}

impl Map {
    fn grid(&self) -> Grid<NodeRecord> {
        let w = self.width;
        node_grid(self.width, self.height, 1.0, |p| !self.walls[(p.y * w + p.x) as usize]).unwrap()
    }
}

fn map_strategy(max_side: i32) -> impl Strategy<Value = Map> {
    (2..=max_side, 2..=max_side).prop_flat_map(|(width, height)| {
        let cells = (width * height) as usize;
        (
            prop::collection::vec(prop::bool::weighted(0.3), cells),
            0..width * height,
            0..width * height,
        )
            .prop_map(move |(mut walls, s, g)| {
                // Endpoints are always walkable.
                walls[s as usize] = false;
                walls[g as usize] = false;
                Map {
                    width,
                    height,
                    walls,
                    start: Point::new(s % width, s / width),
                    goal: Point::new(g % width, g / width),
                }
            })
    })
}

fn run_to_end<F: Frontier, H: Heuristic>(engine: &mut AStarPathfinding<F, H>, budget: u32) -> SearchResult {
    loop {
        let r = engine.search(budget);
        if r != SearchResult::Pending {
            return r;
        }
    }
}

fn solve<F: Frontier, H: Heuristic>(map: &Map, frontier: F, heuristic: H) -> (SearchResult, AStarPathfinding<F, H>) {
    let mut engine = AStarPathfinding::new(map.grid(), frontier, heuristic);
    assert!(engine.initialize_search(map.start, map.goal));
    let res = engine.search(UNBOUNDED);
    (res, engine)
}

fn cost(res: &SearchResult) -> Option<f64> {
    res.path().map(|p| p.cost())
}

/// Consecutive cells are neighbors, all walkable, and step costs add up.
fn check_path(map: &Map, res: &SearchResult) -> Result<(), TestCaseError> {
    let Some(path) = res.path() else {
        return Ok(());
    };
    let points = path.points();
    prop_assert_eq!(points.first().copied(), Some(map.start));
    prop_assert_eq!(points.last().copied(), Some(map.goal));
    let costs = MoveCosts::default();
    let mut total = 0.0;
    for w in points.windows(2) {
        let (dx, dy) = w[0].abs_delta(w[1]);
        prop_assert!(dx <= 1 && dy <= 1 && dx + dy > 0);
        prop_assert!(!map.walls[(w[1].y * map.width + w[1].x) as usize]);
        total += costs.between(w[0], w[1]);
    }
    prop_assert_eq!(total, path.cost());
    Ok(())
}

fn closed(grid: &Grid<NodeRecord>) -> Vec<Point> {
    grid.cells()
        .iter()
        .filter(|n| n.status == NodeStatus::Closed)
        .map(NodeRecord::pos)
        .collect()
}

proptest! {
    #[test]
    fn budgeted_search_matches_unbounded(map in map_strategy(9), budget in 1u32..12) {
        let (expected, _) = solve(&map, NodeArray::new(), EuclideanDistance);
        let mut engine = AStarPathfinding::new(map.grid(), NodeArray::new(), EuclideanDistance);
        prop_assert!(engine.initialize_search(map.start, map.goal));
        let res = run_to_end(&mut engine, budget);
        prop_assert!(res.is_done());
        prop_assert_eq!(res.path().map(|p| p.points()), expected.path().map(|p| p.points()));
        check_path(&map, &res)?;
    }

    #[test]
    fn backends_are_interchangeable(map in map_strategy(8)) {
        let (a, _) = solve(&map, SimpleFrontier::default(), EuclideanDistance);
        let (b, _) = solve(&map, DictionaryFrontier::default(), EuclideanDistance);
        let (c, _) = solve(&map, HeapFrontier::default(), EuclideanDistance);
        let (d, _) = solve(&map, NodeArray::new(), EuclideanDistance);
        let pa = a.path().map(|p| p.points());
        prop_assert_eq!(&pa, &b.path().map(|p| p.points()));
        prop_assert_eq!(&pa, &c.path().map(|p| p.points()));
        prop_assert_eq!(&pa, &d.path().map(|p| p.points()));
    }

    #[test]
    fn zero_heuristic_visits_a_superset(map in map_strategy(9)) {
        let (zero, zero_engine) = solve(&map, NodeArray::new(), ZeroHeuristic);
        let (eucl, eucl_engine) = solve(&map, NodeArray::new(), EuclideanDistance);
        prop_assert_eq!(cost(&zero), cost(&eucl));
        check_path(&map, &zero)?;
        check_path(&map, &eucl)?;
        let visited = closed(zero_engine.grid());
        for p in closed(eucl_engine.grid()) {
            prop_assert!(visited.contains(&p), "{} closed only with the euclidean heuristic", p);
        }
    }

    #[test]
    fn goal_bounds_never_prune_the_optimal_path(map in map_strategy(6)) {
        let (plain, _) = solve(&map, NodeArray::new(), EuclideanDistance);
        let mut gb = GoalBoundPathfinding::new(AStarPathfinding::new(map.grid(), NodeArray::new(), EuclideanDistance));
        gb.map_preprocess();
        prop_assert!(gb.initialize_search(map.start, map.goal).unwrap());
        let pruned = gb.search(UNBOUNDED);
        prop_assert!(pruned.is_done());
        prop_assert_eq!(cost(&pruned), cost(&plain));
        check_path(&map, &pruned)?;
    }
}

#[test]
fn random_maps_stress() {
    let mut rng = SmallRng::seed_from_u64(0x7a11_c0de);
    let (width, height) = (20, 16);
    let walls: Vec<bool> = (0..width * height).map(|_| rng.random_bool(0.25)).collect();
    let grid = || node_grid(width, height, 1.0, |p| !walls[(p.y * width + p.x) as usize]).unwrap();

    let mut gb = GoalBoundPathfinding::new(AStarPathfinding::new(grid(), HeapFrontier::default(), EuclideanDistance));
    let mut steps = 0;
    while gb.preprocess_step(500) != tickpath_search::PreprocessStatus::Done {
        steps += 1;
    }
    assert!(steps > 0);

    let mut plain = AStarPathfinding::new(grid(), NodeArray::new(), EuclideanDistance);
    let mut dijkstra = AStarPathfinding::new(grid(), DictionaryFrontier::default(), ZeroHeuristic);
    let walkable: Vec<Point> = grid()
        .cells()
        .iter()
        .filter(|n| n.walkable)
        .map(NodeRecord::pos)
        .collect();

    for _ in 0..40 {
        let start = walkable[rng.random_range(0..walkable.len())];
        let goal = walkable[rng.random_range(0..walkable.len())];
        let budget = rng.random_range(1..40);

        assert!(plain.initialize_search(start, goal));
        let expected = run_to_end(&mut plain, budget);
        assert!(dijkstra.initialize_search(start, goal));
        let reference = run_to_end(&mut dijkstra, UNBOUNDED);
        assert_eq!(cost(&expected), cost(&reference), "{start} -> {goal}");

        assert!(gb.initialize_search(start, goal).unwrap());
        let pruned = loop {
            let r = gb.search(budget);
            if r != SearchResult::Pending {
                break r;
            }
        };
        assert_eq!(cost(&pruned), cost(&expected), "{start} -> {goal}");
    }
}
