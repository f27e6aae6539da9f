//! Concept crafting game: wiring between input, logic, oracle and storage.
//!
//! `CraftGame` owns the session. Input events mutate state through `logic`,
//! oracle operations go out through the injected transport, completions come
//! back as events on the tick after they arrive, and a dirty flag drains
//! into the session store once per tick batch (fire-and-forget persistence).

pub mod actions;
pub mod economy;
pub mod lineage;
pub mod logic;
pub mod render;
pub mod save;
pub mod state;

use crate::input::{ClickState, InputEvent, TextEntry};
use crate::net::Transport;
use crate::oracle::cache::{pair_key, RecipeCache};
use crate::oracle::{OracleClient, OracleReply, RequestId};
use crate::store::KvStore;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use save::SessionStore;
use state::{CraftState, Focus, Overlay, ShopItemId, ShopTab, SortMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Collecting the topic/passage that seeds the session.
    Setup,
    Playing,
}

/// Setup screen state: one text field, one in-flight extraction at most.
pub struct SetupScreen {
    pub entry: TextEntry,
    pub error: Option<String>,
    pub request: Option<RequestId>,
}

impl SetupScreen {
    fn new() -> Self {
        Self {
            entry: TextEntry::default(),
            error: None,
            request: None,
        }
    }
}

struct PendingCraft {
    request: RequestId,
    target: u64,
    source_text: String,
    target_text: String,
    prev_text: String,
    prev_emoji: String,
}

struct PendingCustom {
    request: RequestId,
    name: String,
    cost: i64,
}

struct PendingSummon {
    request: RequestId,
    cost: i64,
}

pub struct CraftGame<S: KvStore, T: Transport> {
    pub phase: Phase,
    pub setup: SetupScreen,
    pub state: CraftState,
    session: SessionStore<S>,
    cache: RecipeCache<S>,
    oracle: OracleClient,
    transport: T,
    pending_crafts: Vec<PendingCraft>,
    pending_customs: Vec<PendingCustom>,
    pending_summons: Vec<PendingSummon>,
    total_ticks: u64,
}

impl<S: KvStore, T: Transport> CraftGame<S, T> {
    /// Load the persisted session (exactly once, at startup) and the
    /// combination cache, each from its own key.
    pub fn new(session_store: S, cache_store: S, transport: T) -> Self {
        let session = SessionStore::new(session_store);
        let cache = RecipeCache::load(cache_store);
        let (phase, state) = match session.load() {
            Some(state) => (Phase::Playing, state),
            None => (Phase::Setup, CraftState::empty("English".into(), String::new())),
        };
        Self {
            phase,
            setup: SetupScreen::new(),
            state,
            session,
            cache,
            oracle: OracleClient::new(),
            transport,
            pending_crafts: Vec::new(),
            pending_customs: Vec::new(),
            pending_summons: Vec::new(),
            total_ticks: 0,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        render::render(self, f, area, cs);
    }

    // ── input ──────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &InputEvent) {
        match self.phase {
            Phase::Setup => self.handle_setup_input(event),
            Phase::Playing => self.handle_play_input(event),
        }
    }

    fn handle_setup_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key(c) => self.setup.entry.push(*c),
            InputEvent::Backspace => self.setup.entry.backspace(),
            InputEvent::Submit | InputEvent::Click(actions::SUBMIT_TOPIC) => self.submit_topic(),
            _ => {}
        }
    }

    fn submit_topic(&mut self) {
        if self.setup.request.is_some() {
            return;
        }
        let Some(source) = self.setup.entry.submit().map(str::to_string) else {
            return;
        };
        self.setup.error = None;
        self.setup.request = Some(self.oracle.begin_extract(&mut self.transport, &source));
    }

    fn handle_play_input(&mut self, event: &InputEvent) {
        match self.state.overlay {
            Overlay::ConfirmReset => self.handle_confirm_reset(event),
            Overlay::Shop => self.handle_shop(event),
            Overlay::Recipes => self.handle_recipes(event),
            Overlay::None => self.handle_board(event),
        }
    }

    fn handle_confirm_reset(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Click(actions::CONFIRM_RESET_YES) => self.hard_reset(),
            InputEvent::Click(actions::CONFIRM_RESET_NO) | InputEvent::Cancel => {
                self.state.overlay = Overlay::None;
            }
            _ => {}
        }
    }

    /// Destroy the session record and return to setup. Deliberately leaves
    /// the combination cache untouched — it is oracle knowledge, not
    /// player progress.
    fn hard_reset(&mut self) {
        self.session.clear();
        self.state = CraftState::empty("English".into(), String::new());
        self.setup = SetupScreen::new();
        self.pending_crafts.clear();
        self.pending_customs.clear();
        self.pending_summons.clear();
        self.phase = Phase::Setup;
    }

    fn handle_shop(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Click(actions::CLOSE_OVERLAY) | InputEvent::Cancel => {
                self.state.overlay = Overlay::None;
            }
            InputEvent::Click(actions::SHOP_TAB_DECOR) => self.state.shop_tab = ShopTab::Decorations,
            InputEvent::Click(actions::SHOP_TAB_UPGRADES) => self.state.shop_tab = ShopTab::Upgrades,
            InputEvent::Click(actions::SHOP_TAB_COMPANIONS) => {
                self.state.shop_tab = ShopTab::Companions
            }
            InputEvent::Click(actions::BUY_COMBO_UPGRADE) => {
                logic::buy_combo_upgrade(&mut self.state);
            }
            InputEvent::Click(actions::SUMMON_PET) => self.start_summon(),
            InputEvent::Click(id) if *id >= actions::SHOP_ITEM_BASE && *id < actions::SHOP_ITEM_BASE + 100 => {
                let idx = (*id - actions::SHOP_ITEM_BASE) as usize;
                if let Some(item) = ShopItemId::all().get(idx).copied() {
                    if self.state.unlocked_items.contains(&item) {
                        logic::toggle_decoration(&mut self.state, item);
                    } else {
                        logic::buy_decoration(&mut self.state, item);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_recipes(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Click(actions::CLOSE_OVERLAY) | InputEvent::Cancel => {
                self.state.overlay = Overlay::None;
                self.state.recipe_selected = None;
                self.state.recipe_scroll = 0;
            }
            InputEvent::Click(actions::RECIPE_BACK) => {
                if self.state.recipe_selected.take().is_none() {
                    self.state.overlay = Overlay::None;
                }
                self.state.recipe_scroll = 0;
            }
            InputEvent::Click(actions::RECIPE_SCROLL_UP) => {
                self.state.recipe_scroll = self.state.recipe_scroll.saturating_sub(4);
            }
            InputEvent::Click(actions::RECIPE_SCROLL_DOWN) => {
                self.state.recipe_scroll = self.state.recipe_scroll.saturating_add(4);
            }
            InputEvent::Click(id) if *id >= actions::RECIPE_ITEM_BASE => {
                let idx = (*id - actions::RECIPE_ITEM_BASE) as usize;
                if let Some(concept) = self.state.inventory.get(idx) {
                    self.state.recipe_selected = Some(concept.text.clone());
                    self.state.recipe_scroll = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_board(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key(c) => self.handle_board_key(*c),
            InputEvent::Backspace => match self.state.focus {
                Focus::Search => self.state.search.backspace(),
                Focus::Custom => self.state.custom_entry.backspace(),
                Focus::Board => {}
            },
            InputEvent::Submit => match self.state.focus {
                Focus::Custom => self.start_custom(),
                Focus::Search => self.state.focus = Focus::Board,
                Focus::Board => {}
            },
            InputEvent::Cancel => {
                if self.state.grabbed.take().is_none() {
                    self.state.focus = Focus::Board;
                }
            }
            InputEvent::Click(action) => self.handle_board_click(*action),
            InputEvent::CellClick { col, row } => self.drop_grabbed(*col, *row),
        }
    }

    fn handle_board_key(&mut self, c: char) {
        match self.state.focus {
            Focus::Search => {
                self.state.search.push(c);
                self.state.sidebar_scroll = 0;
            }
            Focus::Custom => self.state.custom_entry.push(c),
            Focus::Board => match c {
                'm' => self.state.overlay = Overlay::Shop,
                'b' => self.state.overlay = Overlay::Recipes,
                'x' => {
                    self.state.board.clear();
                    self.state.grabbed = None;
                    self.state.add_log("盤面を片付けた。", false);
                }
                '/' => self.state.focus = Focus::Search,
                'n' => self.state.focus = Focus::Custom,
                _ => {}
            },
        }
    }

    fn handle_board_click(&mut self, action: u16) {
        // Any click moves typing focus back to the board unless the click
        // targets a text field itself.
        if action != actions::FOCUS_SEARCH && action != actions::FOCUS_CUSTOM {
            self.state.focus = Focus::Board;
        }
        match action {
            actions::OPEN_SHOP => self.state.overlay = Overlay::Shop,
            actions::OPEN_RECIPES => self.state.overlay = Overlay::Recipes,
            actions::HARD_RESET => self.state.overlay = Overlay::ConfirmReset,
            actions::CLEAR_BOARD => {
                self.state.board.clear();
                self.state.grabbed = None;
            }
            actions::SORT_TOGGLE => {
                self.state.sort_mode = match self.state.sort_mode {
                    SortMode::Discovery => SortMode::Name,
                    SortMode::Name => SortMode::Discovery,
                };
            }
            actions::FOCUS_SEARCH => self.state.focus = Focus::Search,
            actions::FOCUS_CUSTOM => self.state.focus = Focus::Custom,
            actions::SUBMIT_CUSTOM => self.start_custom(),
            actions::SIDEBAR_SCROLL_UP => {
                self.state.sidebar_scroll = self.state.sidebar_scroll.saturating_sub(4);
            }
            actions::SIDEBAR_SCROLL_DOWN => {
                self.state.sidebar_scroll = self.state.sidebar_scroll.saturating_add(4);
            }
            id if id >= actions::CARD_BASE && id < actions::SIDEBAR_ITEM_BASE => {
                self.click_card(id - actions::CARD_BASE);
            }
            id if id >= actions::SIDEBAR_ITEM_BASE && id < actions::SHOP_ITEM_BASE => {
                self.place_from_sidebar((id - actions::SIDEBAR_ITEM_BASE) as usize);
            }
            _ => {}
        }
    }

    /// First click grabs a card; a second click on another card drops the
    /// grabbed one onto it, which is a craft attempt.
    fn click_card(&mut self, index: u16) {
        let Some(card) = self.state.board.get(index as usize) else {
            return;
        };
        let card_id = card.id;
        let loading = card.loading;
        match self.state.grabbed {
            Some(grabbed) if grabbed != card_id => {
                self.state.grabbed = None;
                if !loading {
                    self.start_craft(grabbed, card_id);
                }
            }
            Some(_) => self.state.grabbed = None,
            None => {
                if !loading {
                    self.state.grabbed = Some(card_id);
                }
            }
        }
    }

    /// Drop the grabbed card at a board cell: craft when it lands near
    /// another card, otherwise just move it there.
    fn drop_grabbed(&mut self, col: u16, row: u16) {
        let Some(grabbed) = self.state.grabbed.take() else {
            return;
        };
        if let Some(card) = self.state.card_mut(grabbed) {
            card.col = col;
            card.row = row;
        }
        if let Some(target) = self.state.find_craft_target(col, row, grabbed) {
            self.start_craft(grabbed, target);
        }
    }

    fn place_from_sidebar(&mut self, view_index: usize) {
        let view = self.state.sidebar_view();
        let Some(&inv_index) = view.get(view_index) else {
            return;
        };
        let concept = self.state.inventory[inv_index].clone();
        let col = 22 + (self.state.next_random() % 16) as u16;
        let row = 7 + (self.state.next_random() % 8) as u16;
        self.state.spawn_card(&concept.text, &concept.emoji, col, row);
    }

    // ── oracle round trips ─────────────────────────────────────────

    /// Resolve a craft through the cache, falling back to the oracle.
    fn start_craft(&mut self, source: u64, target: u64) {
        let Some((prev_text, prev_emoji)) = self
            .state
            .card(target)
            .map(|c| (c.text.clone(), c.emoji.clone()))
        else {
            return;
        };
        let Some((source_text, target_text)) = logic::begin_craft(&mut self.state, source, target)
        else {
            return;
        };

        let key = pair_key(&source_text, &target_text, &self.state.language);
        if let Some(cached) = self.cache.lookup(&key).cloned() {
            let res =
                logic::apply_craft_success(&mut self.state, target, &source_text, &target_text, &cached);
            self.log_resolution(&res);
            return;
        }

        let request = self.oracle.begin_combine(
            &mut self.transport,
            &source_text,
            &target_text,
            &self.state.language,
        );
        self.pending_crafts.push(PendingCraft {
            request,
            target,
            source_text,
            target_text,
            prev_text,
            prev_emoji,
        });
    }

    fn start_custom(&mut self) {
        let Some((name, cost)) = logic::request_custom(&mut self.state) else {
            return;
        };
        let request = self.oracle.begin_single_emoji(&mut self.transport, &name);
        self.pending_customs.push(PendingCustom { request, name, cost });
    }

    fn start_summon(&mut self) {
        let Some(cost) = logic::request_summon(&mut self.state) else {
            return;
        };
        let contexts = logic::summon_contexts(&mut self.state);
        let request = self.oracle.begin_companion(&mut self.transport, contexts);
        self.pending_summons.push(PendingSummon { request, cost });
    }

    // ── tick ───────────────────────────────────────────────────────

    pub fn tick(&mut self, delta_ticks: u32) {
        if delta_ticks == 0 {
            return;
        }
        self.total_ticks += delta_ticks as u64;

        if self.phase == Phase::Playing {
            logic::tick(&mut self.state, delta_ticks);
        }

        for event in self.oracle.tick(&mut self.transport, delta_ticks) {
            self.apply_oracle_event(event.id, event.reply);
        }

        // Fire-and-forget persistence: save once per tick batch when any
        // action marked the state dirty.
        if self.phase == Phase::Playing && self.state.dirty {
            self.state.dirty = false;
            self.session.save(&self.state);
        }
    }

    fn apply_oracle_event(&mut self, id: RequestId, reply: OracleReply) {
        match reply {
            OracleReply::Extracted(result) => {
                if self.setup.request != Some(id) {
                    return;
                }
                self.setup.request = None;
                match result {
                    Ok(extraction) => {
                        let seeds = extraction
                            .concepts
                            .into_iter()
                            .map(|c| (c.text, c.emoji))
                            .collect();
                        let topic = self.setup.entry.submit().unwrap_or_default().to_string();
                        self.state =
                            CraftState::new_session(seeds, extraction.language, topic);
                        self.phase = Phase::Playing;
                        self.session.save(&self.state);
                        self.state.dirty = false;
                    }
                    Err(e) => {
                        self.setup.error =
                            Some(format!("ことばの抽出に失敗しました（{e}）。もう一度どうぞ。"));
                    }
                }
            }
            OracleReply::Combined(result) => {
                let Some(pos) = self.pending_crafts.iter().position(|p| p.request == id) else {
                    return;
                };
                let pending = self.pending_crafts.swap_remove(pos);
                match result {
                    Ok(Some(outcome)) => {
                        let key = pair_key(
                            &pending.source_text,
                            &pending.target_text,
                            &self.state.language,
                        );
                        self.cache.store(key, outcome.clone());
                        let res = logic::apply_craft_success(
                            &mut self.state,
                            pending.target,
                            &pending.source_text,
                            &pending.target_text,
                            &outcome,
                        );
                        self.log_resolution(&res);
                    }
                    Ok(None) => {
                        // Valid "no relation" outcome. Never cached: the
                        // pair will ask the oracle again next time.
                        logic::apply_craft_failure(
                            &mut self.state,
                            pending.target,
                            &pending.prev_text,
                            &pending.prev_emoji,
                            "🚫 結びつかない",
                        );
                    }
                    Err(e) => {
                        logic::apply_craft_failure(
                            &mut self.state,
                            pending.target,
                            &pending.prev_text,
                            &pending.prev_emoji,
                            "⚠ 錬成できなかった",
                        );
                        self.state.add_log(&format!("オラクル応答なし: {e}"), false);
                    }
                }
            }
            OracleReply::SingleEmoji(result) => {
                let Some(pos) = self.pending_customs.iter().position(|p| p.request == id) else {
                    return;
                };
                let pending = self.pending_customs.swap_remove(pos);
                match result {
                    Ok(emoji) => {
                        logic::apply_custom_success(&mut self.state, &pending.name, &emoji)
                    }
                    Err(_) => logic::apply_custom_failure(&mut self.state, pending.cost),
                }
            }
            OracleReply::Companion(spec) => {
                let Some(pos) = self.pending_summons.iter().position(|p| p.request == id) else {
                    return;
                };
                let pending = self.pending_summons.swap_remove(pos);
                logic::apply_summon(&mut self.state, &spec, pending.cost, self.total_ticks);
            }
        }
    }

    fn log_resolution(&mut self, res: &logic::CraftResolution) {
        if let logic::CraftResolution::Discovery { points, new_concept } = res {
            let text = if *new_concept {
                format!("新しいことばを発見！ +{points}")
            } else {
                format!("新しい組み合わせ +{points}")
            };
            self.state.add_log(&text, *new_concept);
        }
    }

    // ── render support ─────────────────────────────────────────────

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.total_ticks
    }

    pub fn oracle_busy(&self) -> bool {
        self.oracle.in_flight() > 0
    }
}
