//! Crafting board rendering: setup screen, board with cards and particles,
//! sidebar, shop / recipe / reset overlays.
//!
//! Overlays register a full-screen close target first and their own controls
//! afterwards, so hit-testing (last registered wins) resolves layering
//! without any extra bookkeeping.

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::net::Transport;
use crate::store::KvStore;
use crate::widgets::{ClickableList, TabBar};

use super::logic::format_score;
use super::state::{
    CraftState, FloatKind, Focus, Overlay, ShopCategory, ShopItemId, ShopTab, SortMode,
    COMBO_WINDOW_TICKS,
};
use super::{actions, economy, lineage, CraftGame, Phase};

const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

/// Background glyph sets for the purchasable decorations.
const RUNE_GLYPHS: &[char] = &['ᚠ', 'ᚢ', 'ᚦ', 'ᚨ', 'ᚱ', 'ᚲ'];
const BINARY_GLYPHS: &[char] = &['0', '1'];
const BUBBLE_GLYPHS: &[char] = &['°', 'o', 'O', '·'];
const NEBULA_GLYPHS: &[char] = &['✦', '✧', '·', '*'];

pub fn render<S: KvStore, T: Transport>(
    game: &CraftGame<S, T>,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    match game.phase {
        Phase::Setup => render_setup(game, f, area, cs),
        Phase::Playing => render_playing(game, f, area, cs),
    }
}

// ── setup ──────────────────────────────────────────────────────────

fn render_setup<S: KvStore, T: Transport>(
    game: &CraftGame<S, T>,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let busy = game.setup.request.is_some();
    let box_area = centered_rect(area, 56.min(area.width), 12.min(area.height));

    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        "ことばの錬成盤",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        "お題や文章を貼ると、ことばの欠片が採れます。",
        Style::default().fg(Color::Gray),
    )));
    cl.push(Line::from(""));
    cl.push(Line::from(vec![
        Span::styled("入力: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}▏", game.setup.entry.buffer),
            Style::default().fg(Color::White),
        ),
    ]));
    cl.push(Line::from(""));
    if busy {
        let spin = SPINNER[(game.tick_count() / 2) as usize % SPINNER.len()];
        cl.push(Line::from(Span::styled(
            format!("{spin} ことばを抽出しています…"),
            Style::default().fg(Color::Yellow),
        )));
    } else {
        cl.push_clickable(
            Line::from(Span::styled(
                " ▶ はじめる (Enter) ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            actions::SUBMIT_TOPIC,
        );
    }
    if let Some(err) = &game.setup.error {
        cl.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(Clear, box_area);
    cl.render(
        f,
        box_area,
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
        cs,
    );
}

// ── playing ────────────────────────────────────────────────────────

fn render_playing<S: KvStore, T: Transport>(
    game: &CraftGame<S, T>,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let state = &game.state;
    let narrow = is_narrow_layout(area.width);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Min(8),    // board + sidebar
            Constraint::Length(3), // custom creation bar
        ])
        .split(area);

    render_header(game, f, chunks[0], cs);

    let (board_area, sidebar_area) = if narrow {
        (chunks[1], None)
    } else {
        let h = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(30)])
            .split(chunks[1]);
        (h[0], Some(h[1]))
    };

    render_board(state, f, board_area, cs);
    if let Some(sidebar_area) = sidebar_area {
        render_sidebar(game, f, sidebar_area, cs);
    }
    render_custom_bar(state, f, chunks[2], cs);

    match state.overlay {
        Overlay::Shop => render_shop(state, f, area, cs),
        Overlay::Recipes => render_recipes(state, f, area, cs),
        Overlay::ConfirmReset => render_confirm_reset(f, area, cs),
        Overlay::None => {}
    }
}

fn render_header<S: KvStore, T: Transport>(
    game: &CraftGame<S, T>,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let state = &game.state;

    // Row 0: title, topic, language.
    let mut top = vec![
        Span::styled(
            " ことばの錬成盤 ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", state.language), Style::default().fg(Color::Gray)),
    ];
    if !state.topic.is_empty() {
        let mut topic = state.topic.clone();
        if topic.chars().count() > 18 {
            topic = topic.chars().take(18).collect::<String>() + "…";
        }
        top.push(Span::styled(
            format!(" 題:{topic} "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if game.oracle_busy() {
        let spin = SPINNER[(state.anim_frame / 2) as usize % SPINNER.len()];
        top.push(Span::styled(
            format!(" {spin} "),
            Style::default().fg(Color::Yellow),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(top)),
        Rect::new(area.x, area.y, area.width, 1),
    );

    // Row 1: score and base multiplier.
    let score_style = if state.score_flash > 0 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" スコア ", Style::default().fg(Color::DarkGray)),
            Span::styled(format_score(state.score), score_style),
            Span::styled("   倍率 ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("x{:.2}", state.base_multiplier),
                Style::default().fg(Color::Blue),
            ),
            Span::styled(
                format!("   記憶済み {}", game.cache_len()),
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        Rect::new(area.x, area.y + 1, area.width, 1),
    );

    // Row 2: combo gauge.
    let combo_style = if state.combo_flash > 0 {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
    };
    let mut combo_spans = vec![Span::styled(
        format!(" COMBO x{} /{} ", state.combo, state.max_combo),
        combo_style,
    )];
    let gauge_width = 20u32;
    let filled = (state.combo_ticks_left * gauge_width / COMBO_WINDOW_TICKS).min(gauge_width);
    combo_spans.push(Span::styled(
        "█".repeat(filled as usize),
        Style::default().fg(Color::Magenta),
    ));
    combo_spans.push(Span::styled(
        "░".repeat((gauge_width - filled) as usize),
        Style::default().fg(Color::DarkGray),
    ));
    if state.overlay == Overlay::Recipes {
        combo_spans.push(Span::styled(
            " 一時停止 ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(combo_spans)),
        Rect::new(area.x, area.y + 2, area.width, 1),
    );

    // Row 3: menu buttons, each with its own click rect.
    let buttons: [(&str, Style, u16); 4] = [
        (
            " 🎪 市場 (M) ",
            Style::default().fg(Color::Yellow),
            actions::OPEN_SHOP,
        ),
        (
            " 📖 レシピ帳 (B) ",
            Style::default().fg(Color::Cyan),
            actions::OPEN_RECIPES,
        ),
        (
            " 🧹 片付け (X) ",
            Style::default().fg(Color::Gray),
            actions::CLEAR_BOARD,
        ),
        (
            " データ消去 ",
            Style::default().fg(Color::DarkGray),
            actions::HARD_RESET,
        ),
    ];
    let mut spans = Vec::new();
    let mut x = area.x;
    let row = area.y + 3;
    for (label, style, action) in buttons {
        let w = Line::from(label).width() as u16;
        if x + w > area.x + area.width {
            break;
        }
        cs.add_click_target(Rect::new(x, row, w, 1), action);
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
        x += w + 1;
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)),
        Rect::new(area.x, row, area.width, 1),
    );
}

fn render_board(state: &CraftState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width < 2 || inner.height < 2 {
        return;
    }

    render_decorations(state, f, inner);

    if state.board.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "棚のことばをタップして盤面へ",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(ratzilla::ratatui::layout::Alignment::Center);
        let hint_area = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        f.render_widget(hint, hint_area);
    }

    // Cards.
    for (i, card) in state.board.iter().enumerate() {
        let label = if card.loading {
            let spin = SPINNER[(state.anim_frame / 2) as usize % SPINNER.len()];
            format!(" {spin} 錬成中… ")
        } else {
            format!(" {} {} ", card.emoji, card.text)
        };
        let w = (Line::from(label.as_str()).width() as u16).min(inner.width);
        let col = card.col.clamp(inner.x, (inner.x + inner.width).saturating_sub(w).max(inner.x));
        let row = card.row.clamp(inner.y, inner.y + inner.height.saturating_sub(1));
        let rect = Rect::new(col, row, w, 1);

        let style = if card.loading {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM)
        } else if state.grabbed == Some(card.id) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).bg(Color::Indexed(236))
        };
        f.render_widget(Paragraph::new(Line::from(Span::styled(label, style))), rect);
        cs.add_click_target(rect, actions::CARD_BASE + i as u16);
    }

    // Fireworks.
    for spark in &state.sparks {
        let col = spark.x.round();
        let row = spark.y.round();
        if col < inner.x as f32
            || col >= (inner.x + inner.width) as f32
            || row < inner.y as f32
            || row >= (inner.y + inner.height) as f32
        {
            continue;
        }
        let style = Style::default().fg(hex_to_color(&spark.hex));
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(spark.glyph.to_string(), style))),
            Rect::new(col as u16, row as u16, 1, 1),
        );
    }

    // Floating texts rise as they age.
    for ft in &state.floats {
        let age = ft.max_life.saturating_sub(ft.life);
        let row = ft.row.saturating_sub((age / 3) as u16).max(inner.y);
        if row >= inner.y + inner.height {
            continue;
        }
        let w = (Line::from(ft.text.as_str()).width() as u16).min(inner.width);
        let col = ft.col.clamp(inner.x, (inner.x + inner.width).saturating_sub(w).max(inner.x));
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(ft.text.as_str(), float_style(ft.kind)))),
            Rect::new(col, row, w, 1),
        );
    }

    // Companions wander along the bottom edge.
    if inner.height >= 2 && inner.width >= 4 {
        let pet_row = inner.y + inner.height - 1;
        for (i, pet) in state.pets.iter().enumerate() {
            let span = (inner.width - 2) as u32;
            let phase = (state.anim_frame / 4 + i as u32 * 37) % (span * 2);
            let offset = if phase < span { phase } else { span * 2 - phase - 1 };
            let col = inner.x + 1 + offset as u16;
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    pet.emoji.as_str(),
                    Style::default().fg(hex_to_color(&pet.color)),
                ))),
                Rect::new(col.min(inner.x + inner.width - 2), pet_row, 2, 1),
            );
        }
    }
}

/// Dim glyph fields for the active background decorations. Pseudo-random per
/// cell but stable across frames (except the slow scroll), so the board does
/// not shimmer.
fn render_decorations(state: &CraftState, f: &mut Frame, inner: Rect) {
    let sets: [(ShopItemId, &[char], Color); 4] = [
        (ShopItemId::Runes, RUNE_GLYPHS, Color::Indexed(58)),
        (ShopItemId::Binary, BINARY_GLYPHS, Color::Indexed(22)),
        (ShopItemId::Bubbles, BUBBLE_GLYPHS, Color::Indexed(24)),
        (ShopItemId::Nebula, NEBULA_GLYPHS, Color::Indexed(54)),
    ];
    let drift = state.anim_frame / 10;
    for (item, glyphs, color) in sets {
        if !state.active_items.contains(&item) {
            continue;
        }
        for row in inner.y..inner.y + inner.height {
            for col in inner.x..inner.x + inner.width {
                let h = cell_hash(col as u32, row as u32 + drift, item as u32);
                if h % 23 != 0 {
                    continue;
                }
                let glyph = glyphs[(h / 23) as usize % glyphs.len()];
                f.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        glyph.to_string(),
                        Style::default().fg(color),
                    ))),
                    Rect::new(col, row, 1, 1),
                );
            }
        }
    }
}

fn cell_hash(x: u32, y: u32, salt: u32) -> u32 {
    let mut h = x
        .wrapping_mul(0x9E3779B1)
        .wrapping_add(y.wrapping_mul(0x85EBCA77))
        .wrapping_add(salt.wrapping_mul(0xC2B2AE3D));
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B3C6D);
    h ^= h >> 12;
    h
}

fn render_sidebar<S: KvStore, T: Transport>(
    game: &CraftGame<S, T>,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let state = &game.state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(7)])
        .split(area);

    // Inventory shelf.
    let view = state.sidebar_view();
    let mut cl = ClickableList::new();

    let search_label = if state.focus == Focus::Search {
        format!("🔎 {}▏", state.search.buffer)
    } else if state.search.buffer.is_empty() {
        "🔎 さがす (/)".to_string()
    } else {
        format!("🔎 {}", state.search.buffer)
    };
    cl.push_clickable(
        Line::from(Span::styled(
            search_label,
            if state.focus == Focus::Search {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            },
        )),
        actions::FOCUS_SEARCH,
    );
    let sort_label = match state.sort_mode {
        SortMode::Discovery => "並び: 発見順 ⇄",
        SortMode::Name => "並び: 名前順 ⇄",
    };
    cl.push_clickable(
        Line::from(Span::styled(sort_label, Style::default().fg(Color::DarkGray))),
        actions::SORT_TOGGLE,
    );
    cl.push_clickable(
        Line::from(Span::styled("▲ 上へ", Style::default().fg(Color::DarkGray))),
        actions::SIDEBAR_SCROLL_UP,
    );

    let visible = chunks[0].height.saturating_sub(2) as usize; // borders
    let scroll = (state.sidebar_scroll as usize).min(view.len().saturating_sub(1));
    for &inv_idx in view.iter().skip(scroll).take(visible.saturating_sub(4)) {
        let concept = &state.inventory[inv_idx];
        let marker = if concept.parents.is_some() { "⚗" } else { "·" };
        // The action indexes into the *filtered view*, which is what the
        // input handler resolves against.
        let view_pos = view.iter().position(|&v| v == inv_idx).unwrap_or(0);
        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!("{marker} "), Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{} {}", concept.emoji, concept.text)),
            ]),
            actions::SIDEBAR_ITEM_BASE + view_pos as u16,
        );
    }
    cl.push_clickable(
        Line::from(Span::styled("▼ 下へ", Style::default().fg(Color::DarkGray))),
        actions::SIDEBAR_SCROLL_DOWN,
    );

    let title = format!(" ことばの棚 ({}) ", state.inventory.len());
    cl.render(
        f,
        chunks[0],
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(title),
        cs,
    );

    // Message log.
    let visible_log = chunks[1].height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(visible_log);
    let log_lines: Vec<Line> = state.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();
    f.render_widget(
        Paragraph::new(log_lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue))
                    .title(" 記録 "),
            )
            .wrap(Wrap { trim: false }),
        chunks[1],
    );
}

fn render_custom_bar(state: &CraftState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let cost = economy::custom_item_cost(state.custom_item_count);
    let affordable = economy::can_afford(state.score, cost);

    let field = if state.focus == Focus::Custom {
        format!(" ✏ {}▏", state.custom_entry.buffer)
    } else if state.custom_entry.buffer.is_empty() {
        " ✏ なんでも創造… (N)".to_string()
    } else {
        format!(" ✏ {}", state.custom_entry.buffer)
    };
    let field_style = if state.focus == Focus::Custom {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let button = if state.creating_custom {
        let spin = SPINNER[(state.anim_frame / 2) as usize % SPINNER.len()];
        format!(" {spin} 創造中… ")
    } else {
        format!(" 創造 {} ", format_score(cost))
    };
    let button_style = if state.creating_custom {
        Style::default().fg(Color::Yellow)
    } else if affordable {
        Style::default().fg(Color::Black).bg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let button_w = (Line::from(button.as_str()).width() as u16).min(inner.width);
    let field_w = inner.width.saturating_sub(button_w + 1);
    let field_rect = Rect::new(inner.x, inner.y, field_w, 1);
    let button_rect = Rect::new(inner.x + field_w + 1, inner.y, button_w, 1);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(field, field_style))),
        field_rect,
    );
    cs.add_click_target(field_rect, actions::FOCUS_CUSTOM);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(button, button_style))),
        button_rect,
    );
    cs.add_click_target(button_rect, actions::SUBMIT_CUSTOM);
}

// ── overlays ───────────────────────────────────────────────────────

fn render_shop(state: &CraftState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    // Clicks outside the panel close the shop.
    cs.add_click_target(area, actions::CLOSE_OVERLAY);

    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled("所持スコア ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_score(state.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push(Line::from(""));

    match state.shop_tab {
        ShopTab::Decorations => push_decoration_rows(state, &mut cl),
        ShopTab::Upgrades => push_upgrade_rows(state, &mut cl),
        ShopTab::Companions => push_companion_rows(state, &mut cl),
    }

    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(
            " 閉じる (Esc) ",
            Style::default().fg(Color::Black).bg(Color::Gray),
        )),
        actions::CLOSE_OVERLAY,
    );

    // Panel sized to its content: tab row + spacer + wrapped list + borders.
    let width = 52.min(area.width);
    let height = (cl.visual_height(width.saturating_sub(2)) + 4).min(area.height);
    let panel = centered_rect(area, width, height);
    f.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" 🎪 よろず市 ");
    let inner = block.inner(panel);
    f.render_widget(block, panel);
    // Swallow clicks that land inside the panel but miss every control.
    cs.add_click_target(panel, u16::MAX);
    if inner.width == 0 || inner.height < 3 {
        return;
    }

    let tab_style = |tab: ShopTab| {
        if state.shop_tab == tab {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        }
    };
    let tab_area = Rect::new(inner.x, inner.y, inner.width, 1);
    TabBar::new(" │ ")
        .tab("装飾", tab_style(ShopTab::Decorations), actions::SHOP_TAB_DECOR)
        .tab("強化", tab_style(ShopTab::Upgrades), actions::SHOP_TAB_UPGRADES)
        .tab("仲間", tab_style(ShopTab::Companions), actions::SHOP_TAB_COMPANIONS)
        .render(f, tab_area, cs);

    let content = Rect::new(
        inner.x,
        inner.y + 2,
        inner.width,
        inner.height.saturating_sub(2),
    );
    cl.register_targets(content, cs, 0, 0, 0, 0);
    f.render_widget(Paragraph::new(cl.into_lines()), content);
}

fn push_decoration_rows<'a>(state: &'a CraftState, cl: &mut ClickableList<'a>) {
    let next_cost = economy::decoration_cost(state.unlocked_items.len() as u32);
    for (i, item) in ShopItemId::all().iter().enumerate() {
        let owned = state.unlocked_items.contains(item);
        let active = state.active_items.contains(item);
        let category = match item.category() {
            ShopCategory::Background => "背景",
            ShopCategory::Upgrade => "演出",
        };
        let line = if owned {
            Line::from(vec![
                Span::styled(
                    if active { " ● " } else { " ○ " },
                    Style::default().fg(if active { Color::Green } else { Color::DarkGray }),
                ),
                Span::raw(format!("{} {} ", item.emoji(), item.name())),
                Span::styled(
                    format!("[{category}] {}", item.description()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            let affordable = economy::can_afford(state.score, next_cost);
            let cost_style = if affordable {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
            };
            Line::from(vec![
                Span::styled(" 🔒 ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{} {} ", item.emoji(), item.name())),
                Span::styled(format!("解放 {}", format_score(next_cost)), cost_style),
            ])
        };
        cl.push_clickable(line, actions::SHOP_ITEM_BASE + i as u16);
    }
}

fn push_upgrade_rows<'a>(state: &'a CraftState, cl: &mut ClickableList<'a>) {
    let cost = economy::combo_upgrade_cost(state.max_combo);
    let affordable = economy::can_afford(state.score, cost);
    let cost_style = if affordable {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
    };
    cl.push_clickable(
        Line::from(vec![
            Span::raw(format!("⚡ コンボ上限 +1（現在 {}） ", state.max_combo)),
            Span::styled(format_score(cost), cost_style),
        ]),
        actions::BUY_COMBO_UPGRADE,
    );
    cl.push(Line::from(Span::styled(
        "   価格は段階ごとに 1.5 倍になる",
        Style::default().fg(Color::DarkGray),
    )));
}

fn push_companion_rows<'a>(state: &'a CraftState, cl: &mut ClickableList<'a>) {
    let cost = economy::pet_cost(state.pets.len() as u32);
    let line = if state.summoning_pet {
        Line::from(Span::styled("🔮 召喚中…", Style::default().fg(Color::Yellow)))
    } else {
        let affordable = economy::can_afford(state.score, cost);
        let cost_style = if affordable {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
        };
        Line::from(vec![
            Span::raw("🔮 仲間を召喚 "),
            Span::styled(format_score(cost), cost_style),
        ])
    };
    cl.push_clickable(line, actions::SUMMON_PET);
    cl.push(Line::from(""));
    if state.pets.is_empty() {
        cl.push(Line::from(Span::styled(
            "   まだ誰もいない",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for pet in &state.pets {
        cl.push(Line::from(vec![
            Span::styled(
                format!("   {} ", pet.emoji),
                Style::default().fg(hex_to_color(&pet.color)),
            ),
            Span::raw(pet.name.as_str()),
            Span::styled(
                format!(" — {}", pet.description),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
}

fn render_recipes(state: &CraftState, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    cs.add_click_target(area, actions::CLOSE_OVERLAY);

    let panel = centered_rect(area, 56.min(area.width), area.height.saturating_sub(4).max(10));
    f.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📖 レシピ帳（コンボ停止中） ");
    let inner = block.inner(panel);
    f.render_widget(block, panel);
    cs.add_click_target(panel, u16::MAX);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut cl = ClickableList::new();
    match &state.recipe_selected {
        None => {
            cl.push(Line::from(Span::styled(
                "ことばを選ぶと由来をたどれる",
                Style::default().fg(Color::DarkGray),
            )));
            cl.push_clickable(
                Line::from(Span::styled("▲ 上へ", Style::default().fg(Color::DarkGray))),
                actions::RECIPE_SCROLL_UP,
            );
            for (i, concept) in state.inventory.iter().enumerate() {
                let marker = if concept.parents.is_some() { "⚗" } else { "·" };
                cl.push_clickable(
                    Line::from(vec![
                        Span::styled(format!(" {marker} "), Style::default().fg(Color::DarkGray)),
                        Span::raw(format!("{} {}", concept.emoji, concept.text)),
                    ]),
                    actions::RECIPE_ITEM_BASE + i as u16,
                );
            }
            cl.push_clickable(
                Line::from(Span::styled("▼ 下へ", Style::default().fg(Color::DarkGray))),
                actions::RECIPE_SCROLL_DOWN,
            );
        }
        Some(selected) => {
            cl.push_clickable(
                Line::from(Span::styled(
                    " ← 一覧へ ",
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                )),
                actions::RECIPE_BACK,
            );
            cl.push(Line::from(""));
            match lineage::build_lineage(&state.inventory, selected) {
                Some(tree) => {
                    for (depth, text, emoji) in lineage::flatten(&tree) {
                        let style = if depth == 0 {
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Gray)
                        };
                        let branch = if depth == 0 {
                            String::new()
                        } else {
                            format!("{}└ ", "  ".repeat(depth - 1))
                        };
                        cl.push(Line::from(Span::styled(
                            format!("{branch}{emoji} {text}"),
                            style,
                        )));
                    }
                }
                None => cl.push(Line::from(Span::styled(
                    "（見つからない）",
                    Style::default().fg(Color::DarkGray),
                ))),
            }
            cl.push(Line::from(""));
            cl.push_clickable(
                Line::from(Span::styled("▲ 上へ", Style::default().fg(Color::DarkGray))),
                actions::RECIPE_SCROLL_UP,
            );
            cl.push_clickable(
                Line::from(Span::styled("▼ 下へ", Style::default().fg(Color::DarkGray))),
                actions::RECIPE_SCROLL_DOWN,
            );
        }
    }

    let scroll = state.recipe_scroll.min(cl.len().saturating_sub(1) as u16);
    cl.register_targets(inner, cs, 0, 0, scroll, 0);
    f.render_widget(
        Paragraph::new(cl.into_lines()).scroll((scroll, 0)),
        inner,
    );
}

fn render_confirm_reset(f: &mut Frame, area: Rect, cs: &mut ClickState) {
    // The destructive action is the one place that demands a confirmation.
    cs.add_click_target(area, actions::CONFIRM_RESET_NO);

    let panel = centered_rect(area, 44.min(area.width), 8.min(area.height));
    f.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ データ消去 ");
    let inner = block.inner(panel);
    f.render_widget(block, panel);
    cs.add_click_target(panel, u16::MAX);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut cl = ClickableList::new();
    cl.push(Line::from("すべての進行が消えます。元に戻せません。"));
    cl.push(Line::from(Span::styled(
        "（ことばの記憶＝レシピキャッシュは残ります）",
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(
            " はい、消去する ",
            Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        actions::CONFIRM_RESET_YES,
    );
    cl.push_clickable(
        Line::from(Span::styled(" やめる (Esc) ", Style::default().fg(Color::Black).bg(Color::Gray))),
        actions::CONFIRM_RESET_NO,
    );
    cl.register_targets(inner, cs, 0, 0, 0, 0);
    f.render_widget(Paragraph::new(cl.into_lines()), inner);
}

// ── helpers ────────────────────────────────────────────────────────

fn float_style(kind: FloatKind) -> Style {
    match kind {
        FloatKind::Discovery => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        FloatKind::Recipe => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        FloatKind::Combo => Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        FloatKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        FloatKind::Neutral => Style::default().fg(Color::Gray),
    }
}

fn hex_to_color(hex: &str) -> Color {
    let h = hex.trim_start_matches('#');
    if h.len() == 6 && h.is_ascii() {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&h[0..2], 16),
            u8::from_str_radix(&h[2..4], 16),
            u8::from_str_radix(&h[4..6], 16),
        ) {
            return Color::Rgb(r, g, b);
        }
    }
    Color::White
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}
