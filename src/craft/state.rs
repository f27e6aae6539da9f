//! Concept crafting game state definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::input::TextEntry;
use crate::time::secs_to_ticks;

/// Combo window: a first-time discovery keeps the combo alive this long.
pub const COMBO_WINDOW_TICKS: u32 = secs_to_ticks(10);
/// Starting combo ceiling; raised by purchased upgrades.
pub const BASE_MAX_COMBO: u32 = 10;

/// Drop distance (in cells) below which two cards combine. Terminal cells
/// are roughly twice as tall as wide, so rows count double.
pub const CRAFT_RADIUS: f64 = 7.0;

/// A discovered concept. Never removed from the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    pub text: String,
    pub emoji: String,
    /// The two ingredient texts, present when crafted rather than seeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<[String; 2]>,
}

/// Identity derived from the display text.
pub fn concept_id(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

impl Concept {
    pub fn seeded(text: &str, emoji: &str) -> Self {
        Self {
            id: concept_id(text),
            text: text.to_string(),
            emoji: emoji.to_string(),
            parents: None,
        }
    }

    pub fn crafted(text: &str, emoji: &str, parents: [String; 2]) -> Self {
        Self {
            id: concept_id(text),
            text: text.to_string(),
            emoji: emoji.to_string(),
            parents: Some(parents),
        }
    }
}

/// A summoned companion. Immutable once created; the count drives pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub description: String,
    pub born_at_tick: u64,
}

impl Default for Pet {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            emoji: "👾".into(),
            color: "#FFFFFF".into(),
            description: String::new(),
            born_at_tick: 0,
        }
    }
}

/// Purchasable cosmetics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopItemId {
    Runes,
    Binary,
    Bubbles,
    Nebula,
    FireworkBoom,
    FireworkColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopCategory {
    Background,
    Upgrade,
}

impl ShopItemId {
    pub fn all() -> &'static [ShopItemId] {
        &[
            ShopItemId::Runes,
            ShopItemId::Binary,
            ShopItemId::Bubbles,
            ShopItemId::Nebula,
            ShopItemId::FireworkBoom,
            ShopItemId::FireworkColor,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShopItemId::Runes => "ルーンの刻印",
            ShopItemId::Binary => "ビット雨",
            ShopItemId::Bubbles => "泡沫の海",
            ShopItemId::Nebula => "星雲",
            ShopItemId::FireworkBoom => "大輪の花火",
            ShopItemId::FireworkColor => "彩りの花火",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ShopItemId::Runes => "ᚱ",
            ShopItemId::Binary => "🖥",
            ShopItemId::Bubbles => "🫧",
            ShopItemId::Nebula => "🌌",
            ShopItemId::FireworkBoom => "🎆",
            ShopItemId::FireworkColor => "🎇",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ShopItemId::Runes => "盤面に古代文字が浮かぶ",
            ShopItemId::Binary => "背景にビットが降る",
            ShopItemId::Bubbles => "泡が静かに漂う",
            ShopItemId::Nebula => "星雲が瞬く",
            ShopItemId::FireworkBoom => "花火が1.5倍に広がる",
            ShopItemId::FireworkColor => "花火の粒が1.5倍に増える",
        }
    }

    pub fn category(&self) -> ShopCategory {
        match self {
            ShopItemId::FireworkBoom | ShopItemId::FireworkColor => ShopCategory::Upgrade,
            _ => ShopCategory::Background,
        }
    }
}

/// A concept instance placed on the crafting board.
#[derive(Debug, Clone)]
pub struct BoardCard {
    pub id: u64,
    pub text: String,
    pub emoji: String,
    pub col: u16,
    pub row: u16,
    /// A loading card is waiting on the oracle and leaves adjacency
    /// detection, so it cannot be targeted twice.
    pub loading: bool,
}

/// Transient score/combo/error indicator floating above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatKind {
    Discovery,
    Recipe,
    Combo,
    Error,
    Neutral,
}

#[derive(Debug, Clone)]
pub struct FloatingText {
    pub text: String,
    pub col: u16,
    pub row: u16,
    pub kind: FloatKind,
    pub life: u32,
    pub max_life: u32,
}

/// One firework particle. Purely cosmetic; dropped frames are harmless.
#[derive(Debug, Clone)]
pub struct Spark {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub glyph: char,
    pub hex: String,
    pub life: u32,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Which full-screen overlay is open, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Shop,
    /// Recipe lineage viewer; while open, combo decay is frozen.
    Recipes,
    ConfirmReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopTab {
    Decorations,
    Upgrades,
    Companions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Discovery,
    Name,
}

/// Where typed characters go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Board,
    Search,
    Custom,
}

/// Full state of a crafting session.
pub struct CraftState {
    // Progression
    pub inventory: Vec<Concept>,
    pub score: i64,
    pub visited_recipes: HashSet<String>,
    pub base_multiplier: f64,
    pub combo: u32,
    pub combo_ticks_left: u32,
    pub max_combo: u32,
    pub language: String,
    pub topic: String,
    pub custom_item_count: u32,

    // Cosmetics & companions
    pub unlocked_items: HashSet<ShopItemId>,
    pub active_items: HashSet<ShopItemId>,
    pub pets: Vec<Pet>,

    // Board
    pub board: Vec<BoardCard>,
    pub grabbed: Option<u64>,
    next_card_id: u64,

    // UI
    pub overlay: Overlay,
    pub shop_tab: ShopTab,
    pub sort_mode: SortMode,
    pub focus: Focus,
    pub search: TextEntry,
    pub custom_entry: TextEntry,
    pub creating_custom: bool,
    pub summoning_pet: bool,
    pub recipe_selected: Option<String>,
    pub recipe_scroll: u16,
    pub sidebar_scroll: u16,
    pub log: Vec<LogEntry>,
    pub floats: Vec<FloatingText>,
    pub sparks: Vec<Spark>,
    pub anim_frame: u32,
    pub score_flash: u32,
    pub combo_flash: u32,

    /// Simple RNG state for cosmetic spread and companion ids.
    pub rng_state: u32,
    /// Set by every state-affecting action; drained by the autosave.
    pub dirty: bool,
}

impl CraftState {
    pub fn new_session(
        seeds: Vec<(String, String)>,
        language: String,
        topic: String,
    ) -> Self {
        let mut state = Self::empty(language, topic);
        for (text, emoji) in seeds {
            state.add_concept(Concept::seeded(&text, &emoji));
        }
        state.add_log("ことばの欠片が集まった。2枚を重ねて錬成しよう。", true);
        state.dirty = true;
        state
    }

    pub fn empty(language: String, topic: String) -> Self {
        Self {
            inventory: Vec::new(),
            score: 0,
            visited_recipes: HashSet::new(),
            base_multiplier: 1.0,
            combo: 1,
            combo_ticks_left: 0,
            max_combo: BASE_MAX_COMBO,
            language,
            topic,
            custom_item_count: 0,
            unlocked_items: HashSet::new(),
            active_items: HashSet::new(),
            pets: Vec::new(),
            board: Vec::new(),
            grabbed: None,
            next_card_id: 1,
            overlay: Overlay::None,
            shop_tab: ShopTab::Decorations,
            sort_mode: SortMode::Discovery,
            focus: Focus::Board,
            search: TextEntry::default(),
            custom_entry: TextEntry::default(),
            creating_custom: false,
            summoning_pet: false,
            recipe_selected: None,
            recipe_scroll: 0,
            sidebar_scroll: 0,
            log: Vec::new(),
            floats: Vec::new(),
            sparks: Vec::new(),
            anim_frame: 0,
            score_flash: 0,
            combo_flash: 0,
            rng_state: 0x2F6E2B1,
            dirty: false,
        }
    }

    /// xorshift32. Deterministic, save-friendly, good enough for cosmetics.
    pub fn next_random(&mut self) -> u32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > 50 {
            self.log.remove(0);
        }
    }

    /// Case-insensitive inventory membership (spec: concepts are unique by
    /// text, compared case-insensitively at insertion).
    pub fn inventory_contains(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.inventory.iter().any(|c| c.text.to_lowercase() == needle)
    }

    /// Insert unless an equivalent concept exists. Returns whether it was new.
    pub fn add_concept(&mut self, concept: Concept) -> bool {
        if self.inventory_contains(&concept.text) {
            return false;
        }
        self.inventory.push(concept);
        true
    }

    pub fn concept_by_text(&self, text: &str) -> Option<&Concept> {
        let needle = text.to_lowercase();
        self.inventory.iter().find(|c| c.text.to_lowercase() == needle)
    }

    // ── board ──────────────────────────────────────────────────────

    pub fn spawn_card(&mut self, text: &str, emoji: &str, col: u16, row: u16) -> u64 {
        let id = self.next_card_id;
        self.next_card_id += 1;
        self.board.push(BoardCard {
            id,
            text: text.to_string(),
            emoji: emoji.to_string(),
            col,
            row,
            loading: false,
        });
        id
    }

    pub fn card(&self, id: u64) -> Option<&BoardCard> {
        self.board.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: u64) -> Option<&mut BoardCard> {
        self.board.iter_mut().find(|c| c.id == id)
    }

    pub fn remove_card(&mut self, id: u64) {
        self.board.retain(|c| c.id != id);
    }

    /// The nearest non-loading card within [`CRAFT_RADIUS`] of `(col, row)`,
    /// excluding `except`. Rows weigh double to compensate cell aspect.
    pub fn find_craft_target(&self, col: u16, row: u16, except: u64) -> Option<u64> {
        self.board
            .iter()
            .filter(|c| c.id != except && !c.loading)
            .map(|c| {
                let dx = c.col as f64 - col as f64;
                let dy = (c.row as f64 - row as f64) * 2.0;
                (c.id, (dx * dx + dy * dy).sqrt())
            })
            .filter(|(_, d)| *d < CRAFT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Inventory indices matching the sidebar search/sort settings.
    pub fn sidebar_view(&self) -> Vec<usize> {
        let needle = self.search.buffer.trim().to_lowercase();
        let mut view: Vec<usize> = self
            .inventory
            .iter()
            .enumerate()
            .filter(|(_, c)| needle.is_empty() || c.text.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        if self.sort_mode == SortMode::Name {
            view.sort_by(|a, b| self.inventory[*a].text.cmp(&self.inventory[*b].text));
        }
        view
    }
}
