mod craft;
mod input;
mod net;
mod oracle;
mod store;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use craft::CraftGame;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use net::BrowserTransport;
use store::{BrowserStorage, KvStore, MemoryStore};
use time::GameClock;

type Game = CraftGame<Rc<dyn KvStore>, BrowserTransport>;

/// Convert a DOM click to terminal cell coordinates.
/// DomBackend creates a `<div>` grid container inside `<body>`.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    // localStorage when the browser grants it, otherwise an in-memory
    // session without durability.
    let store: Rc<dyn KvStore> = match BrowserStorage::open() {
        Some(s) => Rc::new(s),
        None => {
            store::warn("localStorage unavailable; progress will not persist");
            Rc::new(MemoryStore::new())
        }
    };

    let game: Rc<RefCell<Game>> = Rc::new(RefCell::new(CraftGame::new(
        store.clone(),
        store,
        BrowserTransport::new(),
    )));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let clock = Rc::new(RefCell::new(GameClock::new()));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch handler: registered targets win, anything else on the
    // grid becomes a raw cell click (card drops).
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }
            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let event = match cs.hit_test(col, row) {
                Some(action) => InputEvent::Click(action),
                None => InputEvent::CellClick { col, row },
            };
            drop(cs);
            game.borrow_mut().handle_input(&event);
        }
    });

    // Keyboard handler.
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c),
                KeyCode::Backspace => InputEvent::Backspace,
                KeyCode::Enter => InputEvent::Submit,
                KeyCode::Esc => InputEvent::Cancel,
                _ => return,
            };
            game.borrow_mut().handle_input(&event);
        }
    });

    terminal.draw_web({
        let game = game.clone();
        let click_state = click_state.clone();
        move |f| {
            let now_ms = web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or(0.0);
            let ticks = clock.borrow_mut().advance(now_ms);
            game.borrow_mut().tick(ticks);

            let size = f.area();
            let mut cs = click_state.borrow_mut();
            cs.terminal_cols = size.width;
            cs.terminal_rows = size.height;
            cs.clear_targets();

            game.borrow().render(f, size, &mut cs);
        }
    });

    Ok(())
}
