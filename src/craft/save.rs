//! セッションのセーブ/ロード機能。
//!
//! ## 方針
//!
//! - ストレージキー自体にバージョンを含める (`_v1`)。破壊的変更時はキーを
//!   インクリメントし、旧データは「存在しない」扱いで新規セッションになる。
//! - フィールド追加のみなら `#[serde(default)]` で旧データをそのまま読める。
//! - 欠損・パース不能・インベントリが空のレコードは「セッションなし」と同義。
//! - スコアは永続化時に 0 未満へクランプする（カスタム作成の先払い中だけ
//!   一時的に負になり得るが、負のまま保存してはならない）。
//!
//! レシピキャッシュは別キーで独立して永続化される（`oracle::cache`）。
//! ハードリセットはセッションキーのみを消す。

use serde::{Deserialize, Serialize};

use crate::store::{warn, KvStore};

use super::state::{Concept, CraftState, Pet, ShopItemId, BASE_MAX_COMBO};

/// localStorage のセッションキー。
pub const SESSION_STORAGE_KEY: &str = "ccg_save_data_v1";

/// 永続化対象のみを持つセーブデータ。一時的なUI状態（パーティクル、
/// 検索文字列、オーバーレイ等）は含まない。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SaveData {
    inventory: Vec<Concept>,
    score: i64,
    visited_recipes: Vec<String>,
    base_multiplier: f64,
    language: String,
    topic: String,
    custom_item_count: u32,
    unlocked_items: Vec<ShopItemId>,
    active_items: Vec<ShopItemId>,
    pets: Vec<Pet>,
    max_combo: u32,
}

fn extract_save(state: &CraftState) -> SaveData {
    let mut visited: Vec<String> = state.visited_recipes.iter().cloned().collect();
    visited.sort();
    let mut unlocked: Vec<ShopItemId> = state.unlocked_items.iter().copied().collect();
    unlocked.sort_by_key(|i| format!("{i:?}"));
    let mut active: Vec<ShopItemId> = state.active_items.iter().copied().collect();
    active.sort_by_key(|i| format!("{i:?}"));

    SaveData {
        inventory: state.inventory.clone(),
        score: state.score.max(0),
        visited_recipes: visited,
        base_multiplier: state.base_multiplier,
        language: state.language.clone(),
        topic: state.topic.clone(),
        custom_item_count: state.custom_item_count,
        unlocked_items: unlocked,
        active_items: active,
        pets: state.pets.clone(),
        max_combo: state.max_combo,
    }
}

/// セーブデータから CraftState を再構築する。範囲外の値は黙って正規化する。
fn apply_save(save: SaveData) -> CraftState {
    let language = if save.language.trim().is_empty() {
        "English".to_string()
    } else {
        save.language
    };
    let mut state = CraftState::empty(language, save.topic);
    for concept in save.inventory {
        state.add_concept(concept);
    }
    state.score = save.score.max(0);
    state.visited_recipes = save.visited_recipes.into_iter().collect();
    state.base_multiplier = save.base_multiplier.max(1.0);
    state.custom_item_count = save.custom_item_count;
    state.unlocked_items = save.unlocked_items.into_iter().collect();
    state.active_items = save
        .active_items
        .into_iter()
        .filter(|i| state.unlocked_items.contains(i))
        .collect();
    state.pets = save.pets;
    state.max_combo = save.max_combo.max(BASE_MAX_COMBO);
    state
}

pub struct SessionStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 状態を保存する。失敗はログのみ（セッションはメモリ上で続行）。
    pub fn save(&self, state: &CraftState) {
        match serde_json::to_string(&extract_save(state)) {
            Ok(json) => self.store.set(SESSION_STORAGE_KEY, &json),
            Err(e) => warn(&format!("session serialization failed: {e}")),
        }
    }

    /// 保存済みセッションを読む。欠損・破損・空インベントリは `None`
    /// （＝新規セッション開始）。プロセス起動時に一度だけ呼ぶ。
    pub fn load(&self) -> Option<CraftState> {
        let json = self.store.get(SESSION_STORAGE_KEY)?;
        let save: SaveData = match serde_json::from_str(&json) {
            Ok(s) => s,
            Err(e) => {
                warn(&format!("session record unreadable, discarding: {e}"));
                self.store.remove(SESSION_STORAGE_KEY);
                return None;
            }
        };
        if save.inventory.is_empty() {
            return None;
        }
        Some(apply_save(save))
    }

    /// ハードリセット：セッションキーのみ削除する。レシピキャッシュは残す。
    pub fn clear(&self) {
        self.store.remove(SESSION_STORAGE_KEY);
    }
}
