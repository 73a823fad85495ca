//! Level editor binary
//!
//! Window loop around `EditorSession`: samples input once per frame, converts
//! the cursor to world space, and draws the result.
//!
//! Keys: WASD pan, wheel zoom, C cut, R rotate, F flip, Del delete, -/= grid,
//! Esc cancel, F5 save, F9 load, F6 build, ` opens the command console.

use macroquad::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use level_editor::editor::{
    draw_session, menu_item_at, CommandRegistry, EditorCamera, EditorParams, EditorSession, FrameInput, Keymap,
};
use level_editor::storage::ResourceDir;
use level_editor::VERSION;

const DEFAULT_LEVEL: &str = "untitled";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Level Editor v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Single-line command console
#[derive(Default)]
struct Console {
    open: bool,
    line: String,
    last_output: String,
}

impl Console {
    /// Feed typed characters; returns a finished line on Enter
    fn update(&mut self) -> Option<String> {
        while let Some(c) = get_char_pressed() {
            if c == '`' {
                continue;
            }
            if !c.is_control() {
                self.line.push(c);
            }
        }
        if is_key_pressed(KeyCode::Backspace) {
            self.line.pop();
        }
        if is_key_pressed(KeyCode::Enter) {
            return Some(std::mem::take(&mut self.line));
        }
        None
    }

    fn draw(&self) {
        if self.open {
            draw_rectangle(0.0, 0.0, screen_width(), 44.0, Color::new(0.0, 0.0, 0.0, 0.7));
            draw_text(&format!("> {}_", self.line), 8.0, 18.0, 18.0, WHITE);
        }
        if !self.last_output.is_empty() {
            draw_text(&self.last_output, 8.0, 38.0, 16.0, GRAY);
        }
    }
}

fn pan_direction() -> Vec2 {
    let mut dir = Vec2::ZERO;
    if is_key_down(KeyCode::D) {
        dir.x += 1.0;
    }
    if is_key_down(KeyCode::A) {
        dir.x -= 1.0;
    }
    if is_key_down(KeyCode::W) {
        dir.y += 1.0;
    }
    if is_key_down(KeyCode::S) {
        dir.y -= 1.0;
    }
    dir
}

#[macroquad::main(window_conf)]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let level_name = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let resources = ResourceDir::new();
    let params = EditorParams::load_or_default(&resources.params_path());

    let mut camera = EditorCamera::new(&params);
    let mut session = EditorSession::new(params, resources);
    let keymap = Keymap::default();
    let commands = CommandRegistry::default();
    let mut console = Console::default();

    if session.resources.editor_path(&level_name).exists() {
        // Failures are logged by the session and leave an empty level
        let _ = session.read(&level_name);
    }
    info!("Editing '{}'.", level_name);

    loop {
        let size = vec2(screen_width(), screen_height());
        let mouse_screen: Vec2 = mouse_position().into();

        if is_key_pressed(KeyCode::GraveAccent) {
            console.open = !console.open;
            console.line.clear();
        }

        let mut input = FrameInput {
            time: get_time(),
            ..Default::default()
        };

        if console.open {
            if let Some(line) = console.update() {
                console.last_output = match commands.execute(&mut session, &line) {
                    Ok(output) => output.lines().next().unwrap_or_default().to_string(),
                    Err(e) => {
                        warn!("{}", e);
                        e.to_string()
                    }
                };
            }
        } else {
            let wheel = mouse_wheel().1;
            let scroll = if wheel > 0.0 {
                1.0
            } else if wheel < 0.0 {
                -1.0
            } else {
                0.0
            };
            camera.update(&session.params, pan_direction(), scroll, get_frame_time());
            input.actions = keymap.poll();

            for (key, command) in [(KeyCode::F5, "editor_write"), (KeyCode::F9, "editor_read"), (KeyCode::F6, "editor_build")] {
                if is_key_pressed(key) {
                    let line = format!("{} {}", command, level_name);
                    console.last_output = commands
                        .execute(&mut session, &line)
                        .unwrap_or_else(|e| e.to_string());
                }
            }
        }

        input.mouse_world = camera.screen_to_world(mouse_screen, size);
        input.left_pressed = is_mouse_button_pressed(MouseButton::Left);
        input.left_down = is_mouse_button_down(MouseButton::Left);
        input.left_released = is_mouse_button_released(MouseButton::Left);
        input.right_pressed = is_mouse_button_pressed(MouseButton::Right);
        input.additive = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
        input.chain = is_key_down(KeyCode::LeftAlt) || is_key_down(KeyCode::RightAlt);

        if input.left_pressed {
            if let Some(menu) = &session.context_menu {
                let anchor = camera.world_to_screen(menu.anchor, size);
                input.menu_choice = menu_item_at(menu, anchor, mouse_screen, &session.params);
            }
        }

        session.update(&input);

        draw_session(&session, &camera);
        console.draw();

        next_frame().await
    }
}
