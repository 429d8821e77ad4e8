use crate::{
    RasterizationGrid, RegionId,
    math::{NEIGHBOR_8_OFFSETS, dir_offset_x, dir_offset_y},
    watershed_distance_field::ORTHOGONAL_STEP,
};

impl RasterizationGrid {
    /// Partitions the free cells into regions using a watershed.
    ///
    /// The water level starts at the largest obstacle distance and drops two units at a time.
    /// Cells revealed by a level first try to join a neighboring region. The ones that can't
    /// become the core of a new region, unless they touch an existing region, in which case they
    /// are left for the next expansion.
    ///
    /// Expansion sweeps the cells row by row and a cell joins a region as soon as one of its
    /// 4-neighbors has one, so a single sweep can carry a region across a whole open area.
    /// Every region cell has an expansion cost: its obstacle distance for the core cells, and
    /// the cost of the neighbor it joined through plus 2 for the others. When a cell could join
    /// several regions, it joins through the neighbor with the lowest cost, and the lowest region
    /// id on ties.
    ///
    /// Cells within `obstacle_cell_padding` cells of an obstacle stay in [`RegionId::NONE`],
    /// which keeps agents away from walls. With a padding of 0, every free cell gets a region.
    /// Free cells that only touch other free cells diagonally become regions of a single cell,
    /// which have no contour, see [`RasterizationGrid::build_contours`].
    ///
    /// Regions are numbered from 1 and their count is stored in [`RasterizationGrid::region_count`].
    ///
    /// The distance field must be created using [`RasterizationGrid::build_distance_field`] before
    /// attempting to build regions. It is built on the fly if that was forgotten.
    pub fn build_regions(&mut self, obstacle_cell_padding: u16) {
        let _span = tracing::debug_span!("build_regions", obstacle_cell_padding).entered();
        if self.cells.iter().any(|cell| cell.distance_to_obstacle == u32::MAX) {
            tracing::warn!("Building regions without a distance field. Building it now.");
            self.build_distance_field();
        }
        for cell in &mut self.cells {
            cell.region = RegionId::NONE;
            cell.distance_to_region_core = 0;
        }

        let distance_min = obstacle_cell_padding as u32 * 2;
        // How far the regions may overflow into the cells revealed by a new level
        let expand_iters = 4 + distance_min * 2;

        let mut entries: Vec<LevelStackEntry> = Vec::with_capacity(1024);
        let mut stack: Vec<LevelStackEntry> = Vec::with_capacity(256);
        // Core cells expand with their obstacle distance
        let mut expansion_costs: Vec<u32> =
            self.cells.iter().map(|cell| cell.distance_to_obstacle).collect();
        let mut region_id = RegionId::from(1);

        let mut level = self.max_distance() & !1;
        while level > distance_min {
            self.collect_unassigned_cells(level, &mut entries);
            if region_id > RegionId::from(1) {
                self.expand_regions(Some(expand_iters), &mut entries, &mut expansion_costs);
            }

            for entry in &entries {
                let Some(index) = entry.index else {
                    continue;
                };
                if self.cells[index].has_region() {
                    continue;
                }
                if region_id.0 == u16::MAX {
                    tracing::warn!("Ran out of region ids, the remaining cells join existing regions.");
                    break;
                }
                if self.flood_region(entry, level, region_id, false, &mut stack) {
                    region_id += 1;
                }
            }
            level = level.saturating_sub(2);
        }

        // Catch the cells that were not reached while the water was rising.
        self.collect_unassigned_cells(distance_min + 1, &mut entries);
        let final_iters = if distance_min > 0 {
            Some(expand_iters * 8)
        } else {
            None
        };
        self.expand_regions(final_iters, &mut entries, &mut expansion_costs);

        if distance_min == 0 {
            // Pockets only touching other regions diagonally can't be reached by an expansion.
            for entry in &entries {
                let Some(index) = entry.index else {
                    continue;
                };
                if self.cells[index].has_region() || region_id.0 == u16::MAX {
                    continue;
                }
                if self.flood_region(entry, distance_min + 1, region_id, true, &mut stack) {
                    region_id += 1;
                }
            }
        }

        self.region_count = region_id.0 - 1;
        tracing::debug!("Built {} regions", self.region_count);
    }

    /// Gathers the interior cells without a region whose distance is at least `min_distance`.
    fn collect_unassigned_cells(&self, min_distance: u32, entries: &mut Vec<LevelStackEntry>) {
        entries.clear();
        for y in 1..self.height as i32 - 1 {
            for x in 1..self.width as i32 - 1 {
                let index = self.index(x, y);
                let cell = &self.cells[index];
                if cell.obstacle || cell.has_region() || cell.distance_to_obstacle < min_distance {
                    continue;
                }
                entries.push(LevelStackEntry {
                    x,
                    y,
                    index: Some(index),
                });
            }
        }
    }

    /// Grows the existing regions into the given cells.
    /// Cells that joined a region have their entry's index cleared.
    ///
    /// `None` iterations means growing until no cell can join a region anymore.
    fn expand_regions(
        &mut self,
        max_iter: Option<u32>,
        entries: &mut [LevelStackEntry],
        expansion_costs: &mut [u32],
    ) {
        let mut iter = 0;
        while max_iter.is_none_or(|max_iter| iter < max_iter) {
            let mut expanded = false;

            for entry in entries.iter_mut() {
                let Some(i) = entry.index else {
                    continue;
                };
                if self.cells[i].has_region() {
                    entry.index = None;
                    continue;
                }

                // Region, expansion cost and distance to the region core
                let mut best: Option<(RegionId, u32, u32)> = None;
                for dir in 0..4 {
                    let a_index = self.index(entry.x + dir_offset_x(dir), entry.y + dir_offset_y(dir));
                    let neighbor = &self.cells[a_index];
                    if !neighbor.has_region() {
                        continue;
                    }
                    let a_cost = expansion_costs[a_index].saturating_add(ORTHOGONAL_STEP);
                    let is_better = best.is_none_or(|(region, cost, _)| {
                        a_cost < cost || (a_cost == cost && neighbor.region < region)
                    });
                    if is_better {
                        best = Some((
                            neighbor.region,
                            a_cost,
                            neighbor
                                .distance_to_region_core
                                .saturating_add(ORTHOGONAL_STEP),
                        ));
                    }
                }
                let Some((region, cost, distance)) = best else {
                    continue;
                };
                // Mark as used
                entry.index = None;
                expansion_costs[i] = cost;
                let cell = &mut self.cells[i];
                cell.region = region;
                cell.distance_to_region_core = distance;
                expanded = true;
            }

            if !expanded {
                break;
            }
            iter += 1;
        }
    }

    /// Floods a new region from `root` through the 4-connected cells with a distance of at least
    /// `level`. The flooded cells become the core of the region.
    ///
    /// Unless `allow_region_borders` is set, cells touching another region (8-connected) are
    /// left out so that the regions don't merge into each other.
    ///
    /// Returns whether the region got any cell.
    fn flood_region(
        &mut self,
        root: &LevelStackEntry,
        level: u32,
        region_id: RegionId,
        allow_region_borders: bool,
        stack: &mut Vec<LevelStackEntry>,
    ) -> bool {
        let Some(root_index) = root.index else {
            return false;
        };
        stack.clear();
        stack.push(root.clone());
        self.cells[root_index].region = region_id;
        self.cells[root_index].distance_to_region_core = 0;

        let mut region_size = 0;
        while let Some(entry) = stack.pop() {
            let Some(i) = entry.index else {
                continue;
            };
            let is_on_region_border = !allow_region_borders
                && NEIGHBOR_8_OFFSETS.iter().any(|(dx, dy)| {
                    let neighbor = &self.cells[self.index(entry.x + dx, entry.y + dy)];
                    neighbor.has_region() && neighbor.region != region_id
                });
            if is_on_region_border {
                self.cells[i].region = RegionId::NONE;
                continue;
            }
            region_size += 1;

            for dir in 0..4 {
                let a_x = entry.x + dir_offset_x(dir);
                let a_y = entry.y + dir_offset_y(dir);
                let a_index = self.index(a_x, a_y);
                let neighbor = &mut self.cells[a_index];
                if neighbor.obstacle
                    || neighbor.has_region()
                    || neighbor.distance_to_obstacle < level
                {
                    continue;
                }
                neighbor.region = region_id;
                neighbor.distance_to_region_core = 0;
                stack.push(LevelStackEntry {
                    x: a_x,
                    y: a_y,
                    index: Some(a_index),
                });
            }
        }
        region_size > 0
    }
}

#[derive(Clone, Debug)]
struct LevelStackEntry {
    x: i32,
    y: i32,
    index: Option<usize>,
}
