mod console;
mod hustler;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use hustler::HustlerGame;
use input::{ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

#[cfg(target_arch = "wasm32")]
type Store = hustler::save::LocalStorage;
#[cfg(not(target_arch = "wasm32"))]
type Store = hustler::save::MemoryStore;

#[cfg(target_arch = "wasm32")]
fn open_store() -> Store {
    hustler::save::LocalStorage
}
#[cfg(not(target_arch = "wasm32"))]
fn open_store() -> Store {
    hustler::save::MemoryStore::default()
}

/// Query the grid container's bounding rect and resolve a click to an action.
fn dom_hit_test(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();

    cs.hit_test_pixels(click_x, click_y, rect.width(), rect.height())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let game = Rc::new(RefCell::new(HustlerGame::new(open_store(), time::now_ms())));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
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
            let action = dom_hit_test(mouse_event.x, mouse_event.y, &cs);
            drop(cs);

            if let Some(action_id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut()
                    .handle_input(&InputEvent::Key(c.to_ascii_lowercase()));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let mut game = game.borrow_mut();
            game.tick(time::now_ms());

            let size = f.area();
            click_state.borrow_mut().begin_frame(size.width, size.height);
            game.render(f, size, &click_state);
        }
    });

    Ok(())
}
