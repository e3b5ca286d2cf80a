// ABOUTME: Entry point: one window, one coordinator event loop, surfaces wired to ShellState
// ABOUTME: Closing the window ends the process; there is no multi-window model

mod app;
mod compositor;
mod hotkey;
mod ipc;
mod menu;
mod pages;
mod router;
mod settings;
mod titles;

use anyhow::Result;
use app::{ShellEvent, ShellState};
use hotkey::KeyInput;
use tao::dpi::LogicalSize;
use tao::event::{ElementState, Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tao::keyboard::{Key, ModifiersState};
use tao::window::WindowBuilder;
use tracing::info;

fn key_input(key: &Key, modifiers: &ModifiersState) -> KeyInput {
    let name = match key {
        Key::Character(c) => c.to_string(),
        Key::Escape => "Escape".to_string(),
        Key::Enter => "Enter".to_string(),
        Key::F1 => "F1".to_string(),
        Key::F2 => "F2".to_string(),
        Key::F3 => "F3".to_string(),
        Key::F4 => "F4".to_string(),
        Key::F5 => "F5".to_string(),
        Key::F6 => "F6".to_string(),
        Key::F7 => "F7".to_string(),
        Key::F8 => "F8".to_string(),
        Key::F9 => "F9".to_string(),
        Key::F10 => "F10".to_string(),
        Key::F11 => "F11".to_string(),
        Key::F12 => "F12".to_string(),
        other => format!("{other:?}"),
    };
    KeyInput {
        key: name,
        shift: modifiers.shift_key(),
        alt: modifiers.alt_key(),
        meta: modifiers.super_key(),
        control: modifiers.control_key(),
    }
}

/// The one shell window: dark-backed so resize flashes stay black, with
/// the macOS titlebar drawn inset over the toolbar band (the toolbar's
/// 80px left padding clears the traffic lights).
fn shell_window() -> WindowBuilder {
    let builder = WindowBuilder::new()
        .with_title("Beacon")
        .with_inner_size(LogicalSize::new(1280.0, 800.0))
        .with_background_color((0, 0, 0, 255));
    #[cfg(target_os = "macos")]
    let builder = {
        use tao::platform::macos::WindowBuilderExtMacOS;
        builder
            .with_titlebar_transparent(true)
            .with_fullsize_content_view(true)
    };
    builder
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    info!("starting beacon");

    let event_loop = EventLoopBuilder::<ShellEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = shell_window().build(&event_loop)?;

    // Menu activations arrive like every other surface notification.
    let menu_proxy = proxy.clone();
    muda::MenuEvent::set_event_handler(Some(move |event: muda::MenuEvent| {
        let _ = menu_proxy.send_event(ShellEvent::Menu(event.id.0.clone()));
    }));

    let mut state = ShellState::new(&window, proxy)?;
    let mut modifiers = ModifiersState::default();

    event_loop.run(move |event, _target, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(_) | WindowEvent::Moved(_) => {
                    state.reposition(&window);
                }
                WindowEvent::ModifiersChanged(new_modifiers) => {
                    modifiers = new_modifiers;
                }
                WindowEvent::KeyboardInput { event: key_event, .. } => {
                    if key_event.state == ElementState::Pressed {
                        let input = key_input(&key_event.logical_key, &modifiers);
                        state.handle_key_down(&window, &input);
                    }
                }
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    state.on_window_closed();
                    *control_flow = ControlFlow::Exit;
                }
                _ => {}
            },
            Event::UserEvent(shell_event) => state.handle_event(&window, shell_event),
            _ => {}
        }
    });
}
