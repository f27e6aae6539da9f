//! Semantic action IDs for click targets.
//!
//! Each constant names one clickable action. IDs are registered during
//! render and come back through `InputEvent::Click`.

// ── Global chrome ───────────────────────────────────────────────
pub const OPEN_SHOP: u16 = 1;
pub const OPEN_RECIPES: u16 = 2;
pub const CLOSE_OVERLAY: u16 = 3;
pub const HARD_RESET: u16 = 4;
pub const CONFIRM_RESET_YES: u16 = 5;
pub const CONFIRM_RESET_NO: u16 = 6;
pub const CLEAR_BOARD: u16 = 7;

// ── Sidebar ─────────────────────────────────────────────────────
pub const SORT_TOGGLE: u16 = 20;
pub const FOCUS_SEARCH: u16 = 21;
pub const SIDEBAR_SCROLL_UP: u16 = 22;
pub const SIDEBAR_SCROLL_DOWN: u16 = 23;

// ── Custom creation bar ─────────────────────────────────────────
pub const FOCUS_CUSTOM: u16 = 30;
pub const SUBMIT_CUSTOM: u16 = 31;

// ── Setup screen ────────────────────────────────────────────────
pub const SUBMIT_TOPIC: u16 = 40;

// ── Shop overlay ────────────────────────────────────────────────
pub const SHOP_TAB_DECOR: u16 = 50;
pub const SHOP_TAB_UPGRADES: u16 = 51;
pub const SHOP_TAB_COMPANIONS: u16 = 52;
pub const BUY_COMBO_UPGRADE: u16 = 53;
pub const SUMMON_PET: u16 = 54;

// ── Recipe viewer ───────────────────────────────────────────────
pub const RECIPE_BACK: u16 = 60;
pub const RECIPE_SCROLL_UP: u16 = 61;
pub const RECIPE_SCROLL_DOWN: u16 = 62;

// ── Indexed ranges (base + index) ───────────────────────────────
/// Board cards: grab, or drop-onto when a card is already grabbed.
pub const CARD_BASE: u16 = 1000;
/// Sidebar inventory rows (index into the filtered view).
pub const SIDEBAR_ITEM_BASE: u16 = 2000;
/// Shop decoration rows: unlock when locked, toggle when owned.
pub const SHOP_ITEM_BASE: u16 = 3000;
/// Recipe viewer inventory rows (select a concept to inspect).
pub const RECIPE_ITEM_BASE: u16 = 4000;
