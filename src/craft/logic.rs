//! Crafting game logic — pure functions over [`CraftState`], fully testable.
//!
//! The oracle and the persistence layer stay outside: `craft::CraftGame`
//! submits requests and feeds completions back into the `apply_*` functions
//! here, so every scoring and refund rule can be driven directly from tests.

use crate::oracle::parse::{Combination, CompanionSpec};

use super::economy;
use super::state::{
    Concept, CraftState, FloatKind, FloatingText, Overlay, ShopItemId, Spark, COMBO_WINDOW_TICKS,
};

/// Key identifying a recipe for first-time detection. Unlike the cache key it
/// carries no language suffix: discovery scoring is per pair per session.
pub fn recipe_key(a: &str, b: &str) -> String {
    let (x, y) = if a <= b { (a, b) } else { (b, a) };
    format!("{x}|{y}")
}

/// What a resolved craft did — picked up by the caller for cache bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum CraftResolution {
    /// First time this pair succeeded this session; points were awarded.
    Discovery { points: i64, new_concept: bool },
    /// Known recipe, re-synthesized without scoring.
    Repeat,
    /// No relation (or transport failure): the target card reverted.
    Rejected,
}

/// Advance cosmetic timers and combo decay by `delta_ticks`.
pub fn tick(state: &mut CraftState, delta_ticks: u32) {
    if delta_ticks == 0 {
        return;
    }
    state.anim_frame = state.anim_frame.wrapping_add(delta_ticks);
    state.score_flash = state.score_flash.saturating_sub(delta_ticks);
    state.combo_flash = state.combo_flash.saturating_sub(delta_ticks);

    for ft in &mut state.floats {
        ft.life = ft.life.saturating_sub(delta_ticks);
    }
    state.floats.retain(|ft| ft.life > 0);

    for s in &mut state.sparks {
        s.x += s.vx * delta_ticks as f32;
        s.y += s.vy * delta_ticks as f32;
        s.vy += 0.05 * delta_ticks as f32;
        s.life = s.life.saturating_sub(delta_ticks);
    }
    state.sparks.retain(|s| s.life > 0);

    decay_combo(state, delta_ticks);
}

/// Combo window countdown. Opening the recipe viewer freezes it entirely;
/// on expiry the multiplier snaps back to 1 — never a partial decrement.
fn decay_combo(state: &mut CraftState, delta_ticks: u32) {
    if state.overlay == Overlay::Recipes {
        return;
    }
    if state.combo_ticks_left == 0 {
        return;
    }
    state.combo_ticks_left = state.combo_ticks_left.saturating_sub(delta_ticks);
    if state.combo_ticks_left == 0 && state.combo > 1 {
        state.combo = 1;
    }
}

// ── craft resolution ───────────────────────────────────────────────

/// Start a craft: the source card leaves the board, the target card enters
/// its loading state. Returns the pair to resolve, or `None` when either
/// card is gone or busy.
pub fn begin_craft(state: &mut CraftState, source: u64, target: u64) -> Option<(String, String)> {
    let source_card = state.card(source)?.clone();
    let target_card = state.card(target)?;
    if target_card.loading || source_card.loading {
        return None;
    }
    let pair = (source_card.text.clone(), target_card.text.clone());

    state.remove_card(source);
    if let Some(card) = state.card_mut(target) {
        card.loading = true;
    }
    state.dirty = true;
    Some(pair)
}

/// Apply a successful combination to the target card and score it.
pub fn apply_craft_success(
    state: &mut CraftState,
    target: u64,
    source_text: &str,
    target_text: &str,
    outcome: &Combination,
) -> CraftResolution {
    let key = recipe_key(source_text, target_text);
    let first_time = !state.visited_recipes.contains(&key);
    let new_concept = !state.inventory_contains(&outcome.result);

    let concept = Concept::crafted(
        &outcome.result,
        &outcome.emoji,
        [source_text.to_string(), target_text.to_string()],
    );
    state.add_concept(concept);

    let (col, row) = state
        .card(target)
        .map(|c| (c.col, c.row))
        .unwrap_or((20, 10));
    if let Some(card) = state.card_mut(target) {
        card.text = outcome.result.clone();
        card.emoji = outcome.emoji.clone();
        card.loading = false;
    }

    let resolution = if first_time {
        state.visited_recipes.insert(key);
        state.base_multiplier *= 1.1;
        state.combo = state.combo.saturating_add(1).min(state.max_combo);
        state.combo_ticks_left = COMBO_WINDOW_TICKS;

        let base_points: i64 = if new_concept { 100 } else { 10 };
        // Uses the *just-updated* multiplier values.
        let points = (base_points as f64 * state.base_multiplier * state.combo as f64).round() as i64;
        state.score += points;
        state.score_flash = 3;

        let kind = if new_concept { FloatKind::Discovery } else { FloatKind::Recipe };
        add_float(state, col, row.saturating_sub(2), &format!("+{points}"), kind);
        if state.combo > 1 {
            state.combo_flash = 3;
            let combo = state.combo;
            add_float(state, col, row.saturating_sub(1), &format!("{combo}x COMBO!"), FloatKind::Combo);
        }
        let size = if new_concept { BurstSize::Big } else { BurstSize::Small };
        firework(state, col, row, &outcome.colors, size);
        CraftResolution::Discovery { points, new_concept }
    } else {
        add_float(state, col, row.saturating_sub(1), "再合成", FloatKind::Neutral);
        firework(state, col, row, &outcome.colors, BurstSize::Tiny);
        CraftResolution::Repeat
    };

    state.dirty = true;
    resolution
}

/// Revert the target card after a "no relation" outcome or a transport
/// failure. Score and combo are untouched; the source card stays gone.
pub fn apply_craft_failure(
    state: &mut CraftState,
    target: u64,
    prev_text: &str,
    prev_emoji: &str,
    message: &str,
) -> CraftResolution {
    let (col, row) = state
        .card(target)
        .map(|c| (c.col, c.row))
        .unwrap_or((20, 10));
    if let Some(card) = state.card_mut(target) {
        card.text = prev_text.to_string();
        card.emoji = prev_emoji.to_string();
        card.loading = false;
    }
    add_float(state, col, row.saturating_sub(1), message, FloatKind::Error);
    CraftResolution::Rejected
}

// ── purchases ──────────────────────────────────────────────────────

/// Unlock (and auto-equip) a decoration. Silent no-op when unaffordable or
/// already owned.
pub fn buy_decoration(state: &mut CraftState, item: ShopItemId) -> bool {
    if state.unlocked_items.contains(&item) {
        return false;
    }
    let cost = economy::decoration_cost(state.unlocked_items.len() as u32);
    if !economy::can_afford(state.score, cost) {
        return false;
    }
    state.score -= cost;
    state.unlocked_items.insert(item);
    state.active_items.insert(item);
    state.add_log(&format!("{} を解放した！", item.name()), true);
    state.dirty = true;
    true
}

/// Toggle an unlocked decoration on/off. Free.
pub fn toggle_decoration(state: &mut CraftState, item: ShopItemId) {
    if !state.unlocked_items.contains(&item) {
        return;
    }
    if !state.active_items.remove(&item) {
        state.active_items.insert(item);
    }
    state.dirty = true;
}

/// Raise the combo ceiling by one. Silent no-op when unaffordable.
pub fn buy_combo_upgrade(state: &mut CraftState) -> bool {
    let cost = economy::combo_upgrade_cost(state.max_combo);
    if !economy::can_afford(state.score, cost) {
        return false;
    }
    state.score -= cost;
    state.max_combo += 1;
    state.add_log(&format!("コンボ上限 +1 → {}", state.max_combo), true);
    state.dirty = true;
    true
}

/// Gate a companion summon. The cost is *not* deducted here — it is charged
/// on completion, so a failed transport never needs a refund on this path.
pub fn request_summon(state: &mut CraftState) -> Option<i64> {
    if state.summoning_pet {
        return None;
    }
    let cost = economy::pet_cost(state.pets.len() as u32);
    if !economy::can_afford(state.score, cost) {
        return None;
    }
    state.summoning_pet = true;
    Some(cost)
}

/// Up to 5 concept texts sampled from the board (inventory tail when the
/// board is empty) to inspire the companion.
pub fn summon_contexts(state: &mut CraftState) -> Vec<String> {
    let mut pool: Vec<String> = if state.board.is_empty() {
        state.inventory.iter().rev().take(5).map(|c| c.text.clone()).collect()
    } else {
        state.board.iter().map(|c| c.text.clone()).collect()
    };
    // Partial Fisher-Yates: the first 5 slots end up uniformly sampled.
    let n = pool.len();
    for i in 0..n.min(5) {
        let j = i + (state.next_random() as usize) % (n - i);
        pool.swap(i, j);
    }
    pool.truncate(5);
    pool
}

/// Deduct the summon cost and adopt the companion.
pub fn apply_summon(state: &mut CraftState, spec: &CompanionSpec, cost: i64, born_at_tick: u64) {
    state.summoning_pet = false;
    state.score -= cost;
    let id = format!("{:08x}", state.next_random());
    state.pets.push(super::state::Pet {
        id,
        name: spec.name.clone(),
        emoji: spec.emoji.clone(),
        color: spec.color.clone(),
        description: spec.description.clone(),
        born_at_tick,
    });
    state.add_log(&format!("{} {} が仲間になった！", spec.emoji, spec.name), true);
    add_float(state, 30, 8, &format!("{} 召喚！", spec.name), FloatKind::Discovery);
    firework(state, 30, 10, &[spec.color.clone(), "#FFFFFF".to_string()], BurstSize::Big);
    state.dirty = true;
}

/// Gate a custom item creation. The cost *is* deducted up front; a failed
/// creation refunds it in [`apply_custom_failure`].
pub fn request_custom(state: &mut CraftState) -> Option<(String, i64)> {
    if state.creating_custom {
        return None;
    }
    let name = state.custom_entry.submit()?.to_string();
    let cost = economy::custom_item_cost(state.custom_item_count);
    if !economy::can_afford(state.score, cost) {
        return None;
    }
    state.score -= cost;
    state.creating_custom = true;
    state.custom_entry.clear();
    state.dirty = true;
    Some((name, cost))
}

/// Custom creation came back: add the concept and place it on the board.
pub fn apply_custom_success(state: &mut CraftState, name: &str, emoji: &str) {
    state.creating_custom = false;
    state.custom_item_count += 1;
    state.add_concept(Concept::seeded(name, emoji));
    let col = 24 + (state.next_random() % 12) as u16;
    let row = 8 + (state.next_random() % 6) as u16;
    state.spawn_card(name, emoji, col, row);
    add_float(state, col, row, &format!("{name} を創造！"), FloatKind::Recipe);
    firework(
        state,
        col,
        row,
        &["#60A5FA".to_string(), "#A78BFA".to_string()],
        BurstSize::Small,
    );
    state.dirty = true;
}

/// Custom creation failed: roll the deducted cost back. This is the one
/// path where a spent cost is refunded.
pub fn apply_custom_failure(state: &mut CraftState, cost: i64) {
    state.creating_custom = false;
    state.score += cost;
    add_float(state, 30, 12, "創造に失敗…", FloatKind::Error);
    state.add_log("創造に失敗した。コストは返却された。", false);
    state.dirty = true;
}

/// Thousands-separated score display.
pub fn format_score(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── cosmetic helpers ───────────────────────────────────────────────

pub fn add_float(state: &mut CraftState, col: u16, row: u16, text: &str, kind: FloatKind) {
    let life = 8;
    state.floats.push(FloatingText {
        text: text.to_string(),
        col,
        row,
        kind,
        life,
        max_life: life,
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstSize {
    Big,
    Small,
    Tiny,
}

const SPARK_GLYPHS: [char; 4] = ['✦', '·', '*', '❋'];

/// Spawn a firework burst. The purchased upgrades scale it: colored
/// fireworks add particles, big fireworks add spread.
pub fn firework(state: &mut CraftState, col: u16, row: u16, colors: &[String], size: BurstSize) {
    let (base_count, base_speed) = match size {
        BurstSize::Big => (18, 1.2),
        BurstSize::Small => (8, 0.6),
        BurstSize::Tiny => (4, 0.3),
    };
    let count_mult = if state.active_items.contains(&ShopItemId::FireworkColor) { 1.5 } else { 1.0 };
    let speed_mult = if state.active_items.contains(&ShopItemId::FireworkBoom) { 1.5 } else { 1.0 };

    let count = (base_count as f64 * count_mult).round() as u32;
    for i in 0..count {
        let angle = (state.next_random() % 628) as f32 / 100.0;
        let speed = base_speed as f32 * speed_mult as f32 * (0.5 + (state.next_random() % 100) as f32 / 100.0);
        let glyph = SPARK_GLYPHS[(state.next_random() as usize) % SPARK_GLYPHS.len()];
        let hex = if colors.is_empty() {
            "#FFFFFF".to_string()
        } else {
            colors[i as usize % colors.len()].clone()
        };
        let life = 10 + state.next_random() % 10;
        state.sparks.push(Spark {
            x: col as f32,
            y: row as f32,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed * 0.5,
            glyph,
            hex,
            life,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::craft::state::BASE_MAX_COMBO;

    fn fresh() -> CraftState {
        let mut s = CraftState::new_session(
            vec![
                ("Fire".into(), "🔥".into()),
                ("Water".into(), "💧".into()),
                ("Earth".into(), "🌍".into()),
            ],
            "English".into(),
            "elements".into(),
        );
        s.dirty = false;
        s
    }

    fn lava() -> Combination {
        Combination {
            result: "Lava".into(),
            emoji: "🌋".into(),
            colors: ["#FF4500".into(), "#8B0000".into()],
        }
    }

    fn craft_pair(state: &mut CraftState, a: &str, b: &str, outcome: &Combination) -> CraftResolution {
        let sa = state.spawn_card(a, "🔥", 10, 10);
        let tb = state.spawn_card(b, "💧", 12, 10);
        let (src, tgt) = begin_craft(state, sa, tb).unwrap();
        apply_craft_success(state, tb, &src, &tgt, outcome)
    }

    // ── scoring ────────────────────────────────────────────────────

    #[test]
    fn first_discovery_scores_220() {
        let mut s = fresh();
        // base 100 (new concept) × 1.1 (updated base mult) × 2 (updated combo)
        let res = craft_pair(&mut s, "Fire", "Water", &lava());
        assert_eq!(res, CraftResolution::Discovery { points: 220, new_concept: true });
        assert_eq!(s.score, 220);
        assert!((s.base_multiplier - 1.1).abs() < 1e-9);
        assert_eq!(s.combo, 2);
        assert_eq!(s.combo_ticks_left, COMBO_WINDOW_TICKS);
    }

    #[test]
    fn known_result_scores_base_ten() {
        let mut s = fresh();
        // "Water" is already in the inventory: 10 × 1.1 × 2 = 22
        let outcome = Combination {
            result: "Water".into(),
            emoji: "💧".into(),
            colors: ["#1111AA".into(), "#2222BB".into()],
        };
        let res = craft_pair(&mut s, "Fire", "Earth", &outcome);
        assert_eq!(res, CraftResolution::Discovery { points: 22, new_concept: false });
        assert_eq!(s.score, 22);
    }

    #[test]
    fn a_pair_scores_at_most_once_per_session() {
        let mut s = fresh();
        craft_pair(&mut s, "Fire", "Water", &lava());
        let score_after_first = s.score;
        let mult_after_first = s.base_multiplier;

        // Same pair, both orders: never the discovery branch again.
        assert_eq!(craft_pair(&mut s, "Fire", "Water", &lava()), CraftResolution::Repeat);
        assert_eq!(craft_pair(&mut s, "Water", "Fire", &lava()), CraftResolution::Repeat);
        assert_eq!(s.score, score_after_first);
        assert!((s.base_multiplier - mult_after_first).abs() < 1e-12);
        assert_eq!(s.combo, 2);
    }

    #[test]
    fn crafted_concept_joins_inventory_with_parents() {
        let mut s = fresh();
        craft_pair(&mut s, "Fire", "Water", &lava());
        let lava = s.concept_by_text("Lava").expect("lava in inventory");
        assert_eq!(lava.parents, Some(["Fire".to_string(), "Water".to_string()]));
        // Repeat synthesis never duplicates it.
        craft_pair(&mut s, "Water", "Fire", &lava_dup());
        assert_eq!(s.inventory.iter().filter(|c| c.text == "Lava").count(), 1);
    }

    fn lava_dup() -> Combination {
        lava()
    }

    #[test]
    fn combo_never_exceeds_max() {
        let mut s = fresh();
        for i in 0i32..30 {
            let outcome = Combination {
                result: format!("Thing{i}"),
                emoji: "✨".into(),
                colors: ["#111111".into(), "#222222".into()],
            };
            craft_pair(&mut s, "Fire", &format!("Thing{}", i.wrapping_sub(1)), &outcome);
            assert!(s.combo >= 1 && s.combo <= s.max_combo);
        }
        assert_eq!(s.combo, BASE_MAX_COMBO);
    }

    #[test]
    fn combo_respects_a_raised_ceiling() {
        let mut s = fresh();
        s.max_combo = 12;
        for i in 0i32..30 {
            let outcome = Combination {
                result: format!("Thing{i}"),
                emoji: "✨".into(),
                colors: ["#111111".into(), "#222222".into()],
            };
            craft_pair(&mut s, "Water", &format!("Thing{}", i.wrapping_sub(1)), &outcome);
        }
        assert_eq!(s.combo, 12);
    }

    // ── combo decay ────────────────────────────────────────────────

    #[test]
    fn combo_expires_to_one_never_partially() {
        let mut s = fresh();
        craft_pair(&mut s, "Fire", "Water", &lava());
        assert_eq!(s.combo, 2);

        tick(&mut s, COMBO_WINDOW_TICKS - 1);
        assert_eq!(s.combo, 2, "still inside the window");
        tick(&mut s, 1);
        assert_eq!(s.combo, 1);
        assert_eq!(s.combo_ticks_left, 0);
    }

    #[test]
    fn recipe_viewer_freezes_decay() {
        let mut s = fresh();
        craft_pair(&mut s, "Fire", "Water", &lava());
        s.overlay = Overlay::Recipes;
        tick(&mut s, 10 * COMBO_WINDOW_TICKS);
        assert_eq!(s.combo, 2);
        assert_eq!(s.combo_ticks_left, COMBO_WINDOW_TICKS);

        s.overlay = Overlay::None;
        tick(&mut s, COMBO_WINDOW_TICKS);
        assert_eq!(s.combo, 1);
    }

    #[test]
    fn a_discovery_refreshes_the_window() {
        let mut s = fresh();
        craft_pair(&mut s, "Fire", "Water", &lava());
        tick(&mut s, COMBO_WINDOW_TICKS / 2);
        let outcome = Combination {
            result: "Mud".into(),
            emoji: "🟤".into(),
            colors: ["#664422".into(), "#332211".into()],
        };
        craft_pair(&mut s, "Water", "Earth", &outcome);
        assert_eq!(s.combo_ticks_left, COMBO_WINDOW_TICKS);
        assert_eq!(s.combo, 3);
    }

    // ── craft lifecycle ────────────────────────────────────────────

    #[test]
    fn begin_craft_removes_source_and_locks_target() {
        let mut s = fresh();
        let a = s.spawn_card("Fire", "🔥", 10, 10);
        let b = s.spawn_card("Water", "💧", 12, 10);
        let (src, tgt) = begin_craft(&mut s, a, b).unwrap();
        assert_eq!((src.as_str(), tgt.as_str()), ("Fire", "Water"));
        assert!(s.card(a).is_none());
        assert!(s.card(b).unwrap().loading);
        // A loading target cannot be crafted against again.
        let c = s.spawn_card("Earth", "🌍", 12, 11);
        assert!(begin_craft(&mut s, c, b).is_none());
    }

    #[test]
    fn failure_reverts_target_without_scoring() {
        let mut s = fresh();
        let a = s.spawn_card("Fire", "🔥", 10, 10);
        let b = s.spawn_card("Water", "💧", 12, 10);
        begin_craft(&mut s, a, b).unwrap();
        let res = apply_craft_failure(&mut s, b, "Water", "💧", "🚫 結びつかない");
        assert_eq!(res, CraftResolution::Rejected);
        let card = s.card(b).unwrap();
        assert_eq!(card.text, "Water");
        assert!(!card.loading);
        assert_eq!(s.score, 0);
        assert_eq!(s.combo, 1);
        // Source card is gone; the inventory still has the concept.
        assert!(s.card(a).is_none());
        assert!(s.inventory_contains("Fire"));
    }

    // ── purchases ──────────────────────────────────────────────────

    #[test]
    fn decoration_unlock_deducts_and_equips() {
        let mut s = fresh();
        s.score = 2000;
        assert!(buy_decoration(&mut s, ShopItemId::Nebula));
        assert_eq!(s.score, 0);
        assert!(s.unlocked_items.contains(&ShopItemId::Nebula));
        assert!(s.active_items.contains(&ShopItemId::Nebula));
    }

    #[test]
    fn unaffordable_purchase_is_a_silent_no_op() {
        let mut s = fresh();
        s.score = 1999;
        assert!(!buy_decoration(&mut s, ShopItemId::Nebula));
        assert_eq!(s.score, 1999);
        assert!(s.unlocked_items.is_empty());

        s.score = 4999;
        assert!(!buy_combo_upgrade(&mut s));
        assert_eq!(s.max_combo, BASE_MAX_COMBO);
        assert_eq!(s.score, 4999);
    }

    #[test]
    fn double_unlock_is_refused() {
        let mut s = fresh();
        s.score = 100_000;
        assert!(buy_decoration(&mut s, ShopItemId::Runes));
        let after = s.score;
        assert!(!buy_decoration(&mut s, ShopItemId::Runes));
        assert_eq!(s.score, after);
    }

    #[test]
    fn toggling_needs_no_score() {
        let mut s = fresh();
        s.score = 2000;
        buy_decoration(&mut s, ShopItemId::Bubbles);
        s.score = 0;
        toggle_decoration(&mut s, ShopItemId::Bubbles);
        assert!(!s.active_items.contains(&ShopItemId::Bubbles));
        toggle_decoration(&mut s, ShopItemId::Bubbles);
        assert!(s.active_items.contains(&ShopItemId::Bubbles));
        // Never unlocked → toggle is refused.
        toggle_decoration(&mut s, ShopItemId::Nebula);
        assert!(!s.active_items.contains(&ShopItemId::Nebula));
    }

    #[test]
    fn combo_upgrade_raises_ceiling_linearly() {
        let mut s = fresh();
        s.score = 5000 + 7500;
        assert!(buy_combo_upgrade(&mut s));
        assert_eq!(s.max_combo, 11);
        assert!(buy_combo_upgrade(&mut s));
        assert_eq!(s.max_combo, 12);
        assert_eq!(s.score, 0);
    }

    // ── companion summon ───────────────────────────────────────────

    #[test]
    fn summon_charges_only_on_completion() {
        let mut s = fresh();
        s.score = 5000;
        let cost = request_summon(&mut s).unwrap();
        assert_eq!(cost, 5000);
        assert_eq!(s.score, 5000, "not charged while in flight");
        assert!(s.summoning_pet);
        // No concurrent summons.
        assert!(request_summon(&mut s).is_none());

        apply_summon(&mut s, &CompanionSpec::error_born(), cost, 42);
        assert_eq!(s.score, 0);
        assert_eq!(s.pets.len(), 1);
        assert_eq!(s.pets[0].name, "Void Mite");
        assert_eq!(s.pets[0].born_at_tick, 42);
        assert!(!s.summoning_pet);
    }

    #[test]
    fn summon_contexts_sample_at_most_five() {
        let mut s = fresh();
        for i in 0..8 {
            s.spawn_card(&format!("C{i}"), "✨", 10 + i, 10);
        }
        let ctx = summon_contexts(&mut s);
        assert_eq!(ctx.len(), 5);
        // Board empty → inventory tail.
        s.board.clear();
        let ctx = summon_contexts(&mut s);
        assert_eq!(ctx.len(), 3);
        assert!(ctx.contains(&"Earth".to_string()));
    }

    // ── custom items ───────────────────────────────────────────────

    fn type_custom(s: &mut CraftState, name: &str) {
        s.custom_entry.clear();
        for c in name.chars() {
            s.custom_entry.push(c);
        }
    }

    #[test]
    fn custom_creation_deducts_up_front() {
        let mut s = fresh();
        s.score = 1000;
        type_custom(&mut s, "Quasar");
        let (name, cost) = request_custom(&mut s).unwrap();
        assert_eq!(name, "Quasar");
        assert_eq!(cost, 1000);
        assert_eq!(s.score, 0, "charged before the oracle answers");
        assert!(s.creating_custom);

        apply_custom_success(&mut s, &name, "🌌");
        assert!(s.inventory_contains("Quasar"));
        assert_eq!(s.custom_item_count, 1);
        assert!(s.board.iter().any(|c| c.text == "Quasar"));
        assert!(!s.creating_custom);
    }

    #[test]
    fn failed_custom_creation_refunds_the_cost() {
        let mut s = fresh();
        s.score = 1234;
        type_custom(&mut s, "Quasar");
        let before = s.score;
        let (_, cost) = request_custom(&mut s).unwrap();
        apply_custom_failure(&mut s, cost);
        assert_eq!(s.score, before);
        assert_eq!(s.custom_item_count, 0);
        assert!(!s.inventory_contains("Quasar"));
    }

    #[test]
    fn custom_creation_requires_text_and_score() {
        let mut s = fresh();
        s.score = 1_000_000;
        assert!(request_custom(&mut s).is_none(), "empty input");

        s.score = 999;
        type_custom(&mut s, "Quasar");
        assert!(request_custom(&mut s).is_none(), "unaffordable");
        assert_eq!(s.score, 999);
    }

    #[test]
    fn next_custom_item_costs_more() {
        let mut s = fresh();
        s.score = 10_000;
        type_custom(&mut s, "One");
        let (name, _) = request_custom(&mut s).unwrap();
        apply_custom_success(&mut s, &name, "✨");
        type_custom(&mut s, "Two");
        let (_, cost2) = request_custom(&mut s).unwrap();
        assert_eq!(cost2, 1500);
    }

    // ── cosmetics ──────────────────────────────────────────────────

    #[test]
    fn score_formatting_groups_thousands() {
        assert_eq!(format_score(0), "0");
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1000), "1,000");
        assert_eq!(format_score(1234567), "1,234,567");
        assert_eq!(format_score(-5000), "-5,000");
    }

    #[test]
    fn floats_and_sparks_expire() {
        let mut s = fresh();
        add_float(&mut s, 5, 5, "+100", FloatKind::Discovery);
        firework(&mut s, 5, 5, &["#FFFFFF".to_string()], BurstSize::Small);
        assert!(!s.floats.is_empty());
        assert!(!s.sparks.is_empty());
        tick(&mut s, 60);
        assert!(s.floats.is_empty());
        assert!(s.sparks.is_empty());
    }

    #[test]
    fn firework_upgrades_scale_particles() {
        let mut s = fresh();
        firework(&mut s, 5, 5, &["#FFFFFF".to_string()], BurstSize::Big);
        let plain = s.sparks.len();
        s.sparks.clear();
        s.active_items.insert(ShopItemId::FireworkColor);
        firework(&mut s, 5, 5, &["#FFFFFF".to_string()], BurstSize::Big);
        assert!(s.sparks.len() > plain);
    }
}
