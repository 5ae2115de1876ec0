// sprawl_world/server/src/world/population.rs
use crate::core::constants::*;
use crate::core::types::{DistrictType, Faction, LootSpawn, Npc, NpcBehavior, NpcType, Point};
use crate::world::map_generator::ChunkContext;
use crate::world::rng::{IdAllocator, SeededRandom};

#[derive(Clone, Copy, Debug)]
struct Archetype {
    npc_type: NpcType,
    behavior: NpcBehavior,
    faction: Faction,
    min_level: i32,
    max_level: i32,
}

const fn archetype(npc_type: NpcType, behavior: NpcBehavior, faction: Faction, min_level: i32, max_level: i32) -> Archetype {
    Archetype { npc_type, behavior, faction, min_level, max_level }
}

fn loot_count_range(district: DistrictType) -> (i32, i32) {
    match district {
        DistrictType::Corporate => (4, 8),
        DistrictType::Residential => (6, 10),
        DistrictType::Industrial => (5, 9),
        DistrictType::Underground => (8, 12),
        DistrictType::Wasteland => (3, 6),
    }
}

fn npc_count_range(district: DistrictType) -> (i32, i32) {
    match district {
        DistrictType::Corporate => (3, 6),
        DistrictType::Residential => (4, 8),
        DistrictType::Industrial => (2, 5),
        DistrictType::Underground => (5, 9),
        DistrictType::Wasteland => (1, 4),
    }
}

fn loot_tables(district: DistrictType) -> &'static [&'static str] {
    match district {
        DistrictType::Corporate => &["corporate_tech", "corporate_credits", "corporate_implants"],
        DistrictType::Residential => &["residential_common", "residential_consumables", "street_cache"],
        DistrictType::Industrial => &["industrial_parts", "industrial_tools", "scrap_metal"],
        DistrictType::Underground => &["black_market", "netrunner_gear", "street_cache"],
        DistrictType::Wasteland => &["wasteland_salvage", "scrap_metal", "rare_artifact"],
    }
}

fn archetypes(district: DistrictType) -> &'static [Archetype] {
    use Faction as F;
    use NpcBehavior as B;
    use NpcType as T;
    static CORPORATE: [Archetype; 4] = [
        archetype(T::CorporateGuard, B::Guard, F::Corporate, 4, 8),
        archetype(T::SecurityDrone, B::Patrol, F::Corporate, 3, 7),
        archetype(T::Civilian, B::Wander, F::Civilian, 1, 3),
        archetype(T::Merchant, B::Trade, F::Civilian, 2, 4),
    ];
    static RESIDENTIAL: [Archetype; 4] = [
        archetype(T::Civilian, B::Wander, F::Civilian, 1, 3),
        archetype(T::Civilian, B::Idle, F::Civilian, 1, 2),
        archetype(T::Merchant, B::Trade, F::Civilian, 2, 4),
        archetype(T::GangMember, B::Patrol, F::Gang, 2, 5),
    ];
    static INDUSTRIAL: [Archetype; 3] = [
        archetype(T::Worker, B::Wander, F::Civilian, 1, 3),
        archetype(T::CorporateGuard, B::Patrol, F::Corporate, 3, 6),
        archetype(T::SecurityDrone, B::Guard, F::Corporate, 2, 5),
    ];
    static UNDERGROUND: [Archetype; 4] = [
        archetype(T::Netrunner, B::Idle, F::Netrunners, 4, 9),
        archetype(T::GangMember, B::Hostile, F::Gang, 3, 7),
        archetype(T::Merchant, B::Trade, F::Netrunners, 3, 6),
        archetype(T::GangMember, B::Guard, F::Gang, 3, 6),
    ];
    static WASTELAND: [Archetype; 3] = [
        archetype(T::Scavenger, B::Wander, F::Scavengers, 2, 6),
        archetype(T::Mutant, B::Hostile, F::Scavengers, 5, 10),
        archetype(T::Scavenger, B::Patrol, F::Scavengers, 3, 7),
    ];
    match district {
        DistrictType::Corporate => &CORPORATE,
        DistrictType::Residential => &RESIDENTIAL,
        DistrictType::Industrial => &INDUSTRIAL,
        DistrictType::Underground => &UNDERGROUND,
        DistrictType::Wasteland => &WASTELAND,
    }
}

fn random_position(ctx: &ChunkContext, rng: &mut SeededRandom) -> Point {
    let size = ctx.size();
    ctx.origin.offset(rng.range_i32(0, size - 1), rng.range_i32(0, size - 1))
}

pub fn generate_loot_spawns(ctx: &ChunkContext, rng: &mut SeededRandom, ids: &mut IdAllocator) -> Vec<LootSpawn> {
    let (min, max) = loot_count_range(ctx.district);
    let count = rng.range_i32(min, max);
    (0..count)
        .map(|_| {
            let position = random_position(ctx, rng);
            let loot_table_id = rng.pick(loot_tables(ctx.district)).to_string();
            let respawn_time_secs = rng.range_i32(LOOT_RESPAWN_MIN_SECS as i32, LOOT_RESPAWN_MAX_SECS as i32) as u32;
            LootSpawn { id: ids.next_id(), position, loot_table_id, respawn_time_secs, last_spawned: None }
        })
        .collect()
}

fn build_patrol_route(anchor: Point, ctx: &ChunkContext, rng: &mut SeededRandom) -> Vec<Point> {
    let size = ctx.size();
    let waypoints = rng.range_i32(2, 4);
    let mut route = Vec::with_capacity(waypoints as usize + 1);
    route.push(anchor);
    for _ in 0..waypoints {
        let dx = rng.range_i32(-PATROL_RADIUS, PATROL_RADIUS);
        let dy = rng.range_i32(-PATROL_RADIUS, PATROL_RADIUS);
        let x = (anchor.x + dx).clamp(ctx.origin.x, ctx.origin.x + size - 1);
        let y = (anchor.y + dy).clamp(ctx.origin.y, ctx.origin.y + size - 1);
        route.push(Point::new(x, y));
    }
    route
}

pub fn generate_npcs(ctx: &ChunkContext, rng: &mut SeededRandom, ids: &mut IdAllocator) -> Vec<Npc> {
    let (min, max) = npc_count_range(ctx.district);
    let count = rng.range_i32(min, max);
    let mut npcs = Vec::with_capacity(count.max(0) as usize);
    for _ in 0..count {
        let position = random_position(ctx, rng);
        let archetype = *rng.pick(archetypes(ctx.district));
        let level = rng.range_i32(archetype.min_level, archetype.max_level);
        let patrol_route = archetype.behavior.has_patrol_route().then(|| build_patrol_route(position, ctx, rng));
        npcs.push(Npc {
            id: ids.next_id(),
            npc_type: archetype.npc_type,
            position,
            behavior: archetype.behavior,
            faction: archetype.faction,
            health: 50 + level as u32 * 20,
            level: level as u8,
            patrol_route,
        });
    }
    npcs
}
