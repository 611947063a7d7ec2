#![allow(non_snake_case)]
use std::time::Duration;

use dioxus::prelude::*;
use shared::utils::now_ms;

use crate::components::{AssetPalette, ChartView, Toolbar};
use crate::config::theme::ThemePalette;
use crate::config::AppConfig;
use crate::state::AppState;

/// Vertical space taken by the toolbar above the chart.
const TOOLBAR_HEIGHT: f64 = 48.0;

#[component]
pub fn App() -> Element {
    let config = use_context::<AppConfig>();
    let frame_interval = Duration::from_millis(u64::from(1000 / config.chart.fps.max(1)).max(1));
    let mut app_state = use_context_provider(|| Signal::new(AppState::new(config, now_ms())));
    let window = dioxus_desktop::use_window();

    // Render loop: keep the surface sized to the window, then step, render and settle.
    use_future(move || {
        let window = window.clone();
        async move {
            loop {
                tokio::time::sleep(frame_interval).await;
                let size = window.inner_size().to_logical::<f64>(window.scale_factor());
                let mut state = app_state.write();
                state.resize_chart(size.width, (size.height - TOOLBAR_HEIGHT).max(1.0));
                state.frame(now_ms());
            }
        }
    });

    use_drop(move || {
        if let Ok(mut state) = app_state.try_write() {
            state.teardown();
        }
    });

    let background = ThemePalette::for_theme(&app_state.read().current_theme).background;

    rsx! {
        div {
            class: "app",
            tabindex: "0",
            style: "background-color: {background}; height: 100vh; overflow: hidden; font-family: sans-serif; outline: none;",
            onkeydown: move |evt: KeyboardEvent| {
                if evt.modifiers().ctrl() && evt.key() == Key::Character("k".to_string()) {
                    let visible = app_state.read().command_palette_visible;
                    app_state.write().command_palette_visible = !visible;
                }
            },
            Toolbar {}
            ChartView {}
            AssetPalette {}
        }
    }
}
