//! Per-tick snapshot serialization into the shared sensor region.
//!
//! The isolated process never observes absolute coordinates, only
//! bot-relative, heading-relative polar data, and never receives more than a
//! fixed worst-case volume, which bounds its compute cost and the region
//! footprint regardless of world density.

use crate::shm::layout::{BOT_MAX, FOOD_MAX, SEGMENT_MAX};
use crate::shm::view::{BotEntry, FoodEntry, SegmentEntry, SensorView};
use crate::world::{ArenaQuery, Vec2};
use std::collections::BTreeSet;
use std::f32::consts::PI;

/// Food below this value is invisible to bots.
const MIN_FOOD_VALUE: f32 = 1.0;

/// Writes a complete snapshot: self-status, then the distance-sorted food and
/// segment lists, then the distinct owning bots. Runs once per tick, before
/// the STEP request goes out.
///
/// Selection stops at capacity in index enumeration order and only then
/// sorts: under overcrowding, items beyond the cap are dropped even if closer
/// ones exist among them. This prefilter-then-cap-then-sort order is part of
/// the observable contract.
pub fn fill(view: &mut SensorView<'_>, world: &dyn ArenaQuery) {
    let status = world.self_status();
    view.write_self_status(&status);

    let head = world.head_position();
    let heading = world.heading();
    let sight = status.sight_radius;

    let mut food = Vec::new();
    for item in world.food_in_range(head, sight) {
        if food.len() >= FOOD_MAX {
            break;
        }
        if item.value < MIN_FOOD_VALUE {
            continue;
        }
        let rel = world.unwrap_offset(item.pos - head);
        let dist = rel.norm();
        // authoritative filter behind the index's coarse prefilter
        if dist > sight {
            continue;
        }
        food.push(FoodEntry {
            x: rel.x,
            y: rel.y,
            value: item.value,
            dir: relative_direction(rel, heading),
            dist,
        });
    }
    food.sort_by(|a, b| a.dist.total_cmp(&b.dist));
    view.write_food(&food);

    let self_id = world.self_id();
    // widen the query so large bodies partly outside the sight radius
    // are still found
    let reach = sight + world.largest_segment_radius();
    let mut segments = Vec::new();
    let mut owners = BTreeSet::new();
    for seg in world.segments_in_range(head, reach) {
        if segments.len() >= SEGMENT_MAX {
            break;
        }
        let rel = world.unwrap_offset(seg.pos - head);
        let dist = rel.norm();
        if dist > sight + seg.radius {
            continue;
        }
        segments.push(SegmentEntry {
            x: rel.x,
            y: rel.y,
            radius: seg.radius,
            dir: relative_direction(rel, heading),
            dist,
            bot_id: seg.owner,
            index: seg.index,
            is_self: seg.owner == self_id,
        });
        owners.insert(seg.owner);
    }
    segments.sort_by(|a, b| a.dist.total_cmp(&b.dist));
    view.write_segments(&segments);

    let bots: Vec<BotEntry> = owners
        .into_iter()
        .take(BOT_MAX)
        .map(|id| BotEntry {
            id,
            name: world.bot_name(id),
        })
        .collect();
    view.write_bots(&bots);

    view.clear_log_head();
}

/// Heading-relative direction of a relative offset.
pub fn relative_direction(rel: Vec2, heading: f32) -> f32 {
    normalize_angle(rel.y.atan2(rel.x) - heading)
}

/// Normalizes an angle into (−π, π].
pub fn normalize_angle(mut a: f32) -> f32 {
    while a <= -PI {
        a += 2.0 * PI;
    }
    while a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shm::layout::REGION_BYTES;
    use crate::world::{FoodSighting, SegmentSighting, SelfStatus};

    /// Torus world of fixed extent with canned index replies.
    struct TestArena {
        food: Vec<FoodSighting>,
        segments: Vec<SegmentSighting>,
        sight_radius: f32,
        heading: f32,
        head: Vec2,
        world_size: f32,
        largest_radius: f32,
    }

    impl Default for TestArena {
        fn default() -> Self {
            Self {
                food: Vec::new(),
                segments: Vec::new(),
                sight_radius: 50.0,
                heading: 0.0,
                head: Vec2::new(100.0, 100.0),
                world_size: 1000.0,
                largest_radius: 4.0,
            }
        }
    }

    impl ArenaQuery for TestArena {
        fn self_id(&self) -> u64 {
            1
        }

        fn self_status(&self) -> SelfStatus {
            SelfStatus {
                sight_radius: self.sight_radius,
                ..Default::default()
            }
        }

        fn head_position(&self) -> Vec2 {
            self.head
        }

        fn heading(&self) -> f32 {
            self.heading
        }

        fn largest_segment_radius(&self) -> f32 {
            self.largest_radius
        }

        fn food_in_range(&self, _center: Vec2, _radius: f32) -> Vec<FoodSighting> {
            self.food.clone()
        }

        fn segments_in_range(&self, _center: Vec2, _radius: f32) -> Vec<SegmentSighting> {
            self.segments.clone()
        }

        fn unwrap_offset(&self, delta: Vec2) -> Vec2 {
            let half = self.world_size / 2.0;
            let wrap = |v: f32| {
                let mut v = v % self.world_size;
                if v > half {
                    v -= self.world_size;
                } else if v < -half {
                    v += self.world_size;
                }
                v
            };
            Vec2::new(wrap(delta.x), wrap(delta.y))
        }

        fn bot_name(&self, id: u64) -> String {
            format!("bot-{}", id)
        }
    }

    fn snapshot_of(arena: &TestArena) -> Vec<u8> {
        let mut buf = vec![0u8; REGION_BYTES];
        let mut view = SensorView::new(&mut buf);
        fill(&mut view, arena);
        buf
    }

    #[test]
    fn empty_world_writes_zero_counts() {
        let arena = TestArena::default();
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);
        assert_eq!(view.food_count(), 0);
        assert_eq!(view.segment_count(), 0);
        assert_eq!(view.bot_count(), 0);
    }

    #[test]
    fn food_list_is_bounded_and_sorted() {
        let mut arena = TestArena::default();
        for i in 0..(FOOD_MAX + 500) {
            let offset = 1.0 + (i % 40) as f32;
            arena.food.push(FoodSighting {
                pos: Vec2::new(arena.head.x + offset, arena.head.y),
                value: 2.0,
            });
        }
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);

        assert_eq!(view.food_count() as usize, FOOD_MAX);
        for i in 1..view.food_count() as usize {
            assert!(view.food(i - 1).dist <= view.food(i).dist);
        }
    }

    #[test]
    fn low_value_food_is_dropped() {
        let mut arena = TestArena::default();
        arena.food.push(FoodSighting {
            pos: Vec2::new(arena.head.x + 5.0, arena.head.y),
            value: 0.5,
        });
        arena.food.push(FoodSighting {
            pos: Vec2::new(arena.head.x + 6.0, arena.head.y),
            value: 1.5,
        });
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);
        assert_eq!(view.food_count(), 1);
        assert_eq!(view.food(0).value, 1.5);
    }

    #[test]
    fn food_beyond_sight_radius_is_dropped_even_if_the_index_returned_it() {
        let mut arena = TestArena::default();
        arena.food.push(FoodSighting {
            pos: Vec2::new(arena.head.x + arena.sight_radius + 1.0, arena.head.y),
            value: 5.0,
        });
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);
        assert_eq!(view.food_count(), 0);
    }

    #[test]
    fn capacity_cuts_in_enumeration_order_not_by_distance() {
        let mut arena = TestArena::default();
        // fill capacity with far items, then offer one closer item
        for _ in 0..FOOD_MAX {
            arena.food.push(FoodSighting {
                pos: Vec2::new(arena.head.x + 40.0, arena.head.y),
                value: 2.0,
            });
        }
        arena.food.push(FoodSighting {
            pos: Vec2::new(arena.head.x + 1.0, arena.head.y),
            value: 2.0,
        });
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);

        assert_eq!(view.food_count() as usize, FOOD_MAX);
        // the late close item never made it in
        assert!(view.food(0).dist > 1.5);
    }

    #[test]
    fn food_offsets_are_toroidally_unwrapped() {
        let mut arena = TestArena::default();
        arena.head = Vec2::new(5.0, 5.0);
        // across the wrap seam: naive delta is ~-990, unwrapped is +10
        arena.food.push(FoodSighting {
            pos: Vec2::new(995.0, 5.0),
            value: 2.0,
        });
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);
        assert_eq!(view.food_count(), 1);
        assert!((view.food(0).x - (-10.0)).abs() < 1e-3);
        assert!((view.food(0).dist - 10.0).abs() < 1e-3);
    }

    #[test]
    fn segments_mark_self_and_collect_owners() {
        let mut arena = TestArena::default();
        arena.segments.push(SegmentSighting {
            pos: Vec2::new(arena.head.x + 3.0, arena.head.y),
            radius: 1.0,
            owner: 1, // self
            index: 0,
        });
        arena.segments.push(SegmentSighting {
            pos: Vec2::new(arena.head.x, arena.head.y + 8.0),
            radius: 2.0,
            owner: 7,
            index: 3,
        });
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);

        assert_eq!(view.segment_count(), 2);
        assert!(view.segment(0).is_self);
        assert!(!view.segment(1).is_self);
        assert_eq!(view.bot_count(), 2);
        assert_eq!(view.bot(0).id, 1);
        assert_eq!(view.bot(1), BotEntry {
            id: 7,
            name: "bot-7".to_string(),
        });
    }

    #[test]
    fn large_segments_are_kept_within_their_own_radius_margin() {
        let mut arena = TestArena::default();
        // center beyond sight radius, but its body reaches into sight
        arena.segments.push(SegmentSighting {
            pos: Vec2::new(arena.head.x + arena.sight_radius + 2.0, arena.head.y),
            radius: 3.0,
            owner: 2,
            index: 0,
        });
        // and one clearly out of reach
        arena.segments.push(SegmentSighting {
            pos: Vec2::new(arena.head.x + arena.sight_radius + 10.0, arena.head.y),
            radius: 3.0,
            owner: 3,
            index: 0,
        });
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);
        assert_eq!(view.segment_count(), 1);
        assert_eq!(view.segment(0).bot_id, 2);
    }

    #[test]
    fn polar_form_reconstructs_the_offset() {
        let mut arena = TestArena::default();
        arena.heading = 1.1;
        arena.food.push(FoodSighting {
            pos: Vec2::new(arena.head.x - 7.0, arena.head.y + 11.0),
            value: 2.0,
        });
        let mut buf = snapshot_of(&arena);
        let view = SensorView::new(&mut buf);

        let entry = view.food(0);
        assert!((entry.dist - Vec2::new(entry.x, entry.y).norm()).abs() < 1e-4);
        let world_angle = entry.dir + arena.heading;
        let rx = entry.dist * world_angle.cos();
        let ry = entry.dist * world_angle.sin();
        assert!((rx - entry.x).abs() < 1e-3);
        assert!((ry - entry.y).abs() < 1e-3);
    }

    #[test]
    fn normalize_angle_lands_in_half_open_range() {
        for a in [-10.0f32, -PI, -0.5, 0.0, 0.5, PI, 10.0, 42.0] {
            let n = normalize_angle(a);
            assert!(n > -PI && n <= PI, "{} normalized to {}", a, n);
        }
        assert_eq!(normalize_angle(-PI), PI);
    }
}
