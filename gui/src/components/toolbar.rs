// Toolbar: asset picker, timeframe, stake, CALL/PUT and balance
#![allow(non_snake_case)]
use dioxus::prelude::*;
use shared::models::{Direction, TimeFrame};
use shared::utils::{format_price, now_ms};

use crate::config::theme::ThemePalette;
use crate::state::AppState;

fn place(mut app_state: Signal<AppState>, direction: Direction) {
    let result = app_state.write().place_trade(direction, now_ms());
    match result {
        Ok(_) => app_state.write().error_message = None,
        Err(e) => {
            tracing::warn!(%direction, error = %e, "Order rejected.");
            app_state.write().error_message = Some(e.to_string());
        }
    }
}

#[component]
pub fn Toolbar() -> Element {
    let mut app_state = use_context::<Signal<AppState>>();

    let state = app_state.read();
    let palette = ThemePalette::for_theme(&state.current_theme);
    let symbol = state.active_symbol.clone();
    let price = state.active_price().map(format_price).unwrap_or_default();
    let payout = state.active_asset().map(|a| a.payout).unwrap_or_default();
    let timeframe = state.timeframe_seconds();
    let stake = state.stake;
    let balance = format!("{:.2}", state.balance);
    let pending = state.orders().len();
    let error = state.error_message.clone().unwrap_or_default();
    drop(state);

    let has_error = !error.is_empty();
    let options = TimeFrame::ALL.iter().map(|tf| {
        let seconds = tf.seconds();
        let label = tf.label();
        rsx! {
            option { key: "{seconds}", value: "{seconds}", selected: seconds == timeframe, "{label}" }
        }
    });

    rsx! {
        div {
            class: "toolbar",
            style: "display: flex; align-items: center; gap: 12px; padding: 8px 12px; background-color: {palette.background}; color: {palette.foreground}; border-bottom: 1px solid {palette.grid};",
            button {
                class: "asset-button",
                style: "padding: 6px 12px; background: {palette.countdown_bg}; color: {palette.foreground}; border: none; border-radius: 4px; cursor: pointer;",
                onclick: move |_| {
                    let visible = app_state.read().command_palette_visible;
                    app_state.write().command_palette_visible = !visible;
                },
                "{symbol}  {price}  ({payout:.0}%)"
            }
            select {
                onchange: move |evt| match evt.value().parse::<u32>() {
                    Ok(seconds) => app_state.write().set_timeframe(seconds),
                    Err(e) => tracing::warn!(error = %e, "Ignoring invalid timeframe selection."),
                },
                {options}
            }
            label { "Stake" }
            input {
                r#type: "number",
                min: "1",
                step: "1",
                value: "{stake}",
                style: "width: 80px;",
                oninput: move |evt| {
                    if let Ok(value) = evt.value().parse::<f64>() {
                        app_state.write().stake = value;
                    }
                },
            }
            button {
                class: "call-button",
                style: "padding: 6px 18px; background: {palette.call}; color: #ffffff; border: none; border-radius: 4px; cursor: pointer;",
                onclick: move |_| place(app_state, Direction::Call),
                "CALL"
            }
            button {
                class: "put-button",
                style: "padding: 6px 18px; background: {palette.put}; color: #ffffff; border: none; border-radius: 4px; cursor: pointer;",
                onclick: move |_| place(app_state, Direction::Put),
                "PUT"
            }
            span { style: "margin-left: auto;", "Open: {pending}" }
            span { style: "font-weight: bold;", "Balance: {balance}" }
            button {
                class: "theme-toggle",
                style: "padding: 4px 8px; background: none; color: {palette.foreground}; border: 1px solid {palette.grid}; border-radius: 4px; cursor: pointer;",
                onclick: move |_| {
                    let next = app_state.read().current_theme.toggled();
                    app_state.write().set_theme(next);
                },
                "Theme"
            }
            if has_error {
                span { class: "toolbar-error", style: "color: {palette.put};", "{error}" }
            }
        }
    }
}
